//! The photo enhancement pipeline.
//!
//! A [`Pipeline`] owns an immutable decoded source buffer; every [`Pipeline::run`]
//! derives a fresh working copy from it, so repeated preview renders with the
//! same settings are deterministic relative to the source. The run order is
//! fixed: enhance, grade, filter, background, encode.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use tracing::{debug, warn};

use fbari_models::{
    BackgroundStyle, EditSettings, FilterKind, GradeName, OutputFormat, Subject, SubjectMask,
};

use crate::background;
use crate::detection::{ContourDetector, SubjectDetector};
use crate::error::{ImagingError, ImagingResult};
use crate::filters::{self, FilterParams};
use crate::grading;
use crate::ops;

/// One stage the pipeline actually applied during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppliedOp {
    Enhance,
    Grade(GradeName),
    Filter(FilterKind),
    BackgroundReplace(BackgroundStyle),
    Encode(OutputFormat),
}

/// Output of a full pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Final working buffer after all transforms
    pub image: RgbaImage,
    /// Encoded artifact in the requested output format
    pub encoded: Vec<u8>,
    /// Stages that were applied, in order
    pub operations: Vec<AppliedOp>,
}

/// An edit session over one decoded source image.
#[derive(Debug, Clone)]
pub struct Pipeline {
    source: RgbaImage,
}

impl Pipeline {
    /// Decode an image from raw bytes (JPEG, PNG, WEBP and friends).
    pub fn from_bytes(bytes: &[u8]) -> ImagingResult<Self> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| ImagingError::decode(e.to_string()))?;
        Ok(Self {
            source: decoded.to_rgba8(),
        })
    }

    /// Wrap an already-decoded buffer.
    pub fn from_image(source: RgbaImage) -> Self {
        Self { source }
    }

    /// The immutable decoded source.
    pub fn source(&self) -> &RgbaImage {
        &self.source
    }

    /// Aspect-preserving downscale for catalog previews. Images already
    /// within `max_dim` are returned at original size.
    pub fn thumbnail(&self, max_dim: u32) -> RgbaImage {
        let (w, h) = self.source.dimensions();
        let longest = w.max(h);
        if longest <= max_dim || max_dim == 0 {
            return self.source.clone();
        }
        let scale = max_dim as f32 / longest as f32;
        let nw = ((w as f32 * scale).round() as u32).max(1);
        let nh = ((h as f32 * scale).round() as u32).max(1);
        imageops::resize(&self.source, nw, nh, FilterType::Triangle)
    }

    /// Run the full ordered pipeline against a fresh copy of the source.
    ///
    /// Background replacement happens only when a detector is supplied; a
    /// detector reporting `CapabilityUnavailable` keeps the original
    /// background (logged) rather than failing the run.
    pub fn run(
        &self,
        settings: &EditSettings,
        detector: Option<&dyn SubjectDetector>,
        seed: u64,
    ) -> ImagingResult<PipelineResult> {
        let settings = settings.clamped();
        let mut buffer = self.source.clone();
        let mut operations = Vec::new();

        if has_adjustments(&settings) {
            buffer = enhance(&buffer, &settings);
            operations.push(AppliedOp::Enhance);
        }

        if let Some(name) = settings.color_grade.as_deref() {
            match name.parse::<GradeName>() {
                Ok(grade) => {
                    buffer = grading::apply_lut(&buffer, grade, settings.grade_intensity);
                    operations.push(AppliedOp::Grade(grade));
                }
                Err(_) => debug!(grade = name, "unknown color grade, skipping"),
            }
        }

        if let Some(name) = settings.filter.as_deref() {
            match name.parse::<FilterKind>() {
                Ok(kind) => {
                    let params = FilterParams {
                        seed,
                        ..Default::default()
                    };
                    buffer =
                        filters::apply_filter_with(&buffer, kind, settings.filter_intensity, &params);
                    operations.push(AppliedOp::Filter(kind));
                }
                Err(_) => debug!(filter = name, "unknown filter, skipping"),
            }
        }

        if detector.is_some() {
            match remove_background(&buffer, detector) {
                Ok((_, mask)) if mask.coverage() > 0.0 => {
                    buffer = replace_background(
                        &buffer,
                        &mask,
                        settings.background_rgb(),
                        settings.background_style,
                        seed,
                    );
                    operations.push(AppliedOp::BackgroundReplace(settings.background_style));
                }
                Ok(_) => debug!("no subject found, keeping original background"),
                Err(e) if e.is_capability_unavailable() => {
                    warn!(error = %e, "segmentation unavailable, keeping original background");
                }
                Err(e) => return Err(e),
            }
        }

        let encoded = encode(&buffer, settings.output_format, settings.quality)?;
        operations.push(AppliedOp::Encode(settings.output_format));

        Ok(PipelineResult {
            image: buffer,
            encoded,
            operations,
        })
    }
}

fn has_adjustments(settings: &EditSettings) -> bool {
    settings.brightness != 0
        || settings.contrast != 0
        || settings.saturation != 0
        || settings.vibrance != 0
        || settings.exposure != 0
}

/// Apply the basic adjustments in fixed order: brightness, contrast,
/// saturation, vibrance, exposure. Each stage is skipped entirely when its
/// parameter is 0, so an all-zero settings block is bit-identical.
///
/// Each stage composes on the current buffer; applying `enhance` twice
/// compounds the adjustments.
pub fn enhance(img: &RgbaImage, settings: &EditSettings) -> RgbaImage {
    let mut buffer = img.clone();

    if settings.brightness != 0 {
        let factor = 1.0 + settings.brightness as f32 / 100.0;
        buffer = ops::map_rgb(&buffer, |_, _, rgb| {
            [rgb[0] * factor, rgb[1] * factor, rgb[2] * factor]
        });
    }

    if settings.contrast != 0 {
        let factor = 1.0 + settings.contrast as f32 / 100.0;
        let mean = ops::mean_luma(&buffer);
        buffer = ops::map_rgb(&buffer, |_, _, rgb| {
            [
                mean + factor * (rgb[0] - mean),
                mean + factor * (rgb[1] - mean),
                mean + factor * (rgb[2] - mean),
            ]
        });
    }

    if settings.saturation != 0 {
        let factor = 1.0 + settings.saturation as f32 / 100.0;
        buffer = ops::scale_saturation(&buffer, factor);
    }

    if settings.vibrance != 0 {
        // Vibrance pushes muted colors harder than already-saturated ones.
        let factor = 1.0 + settings.vibrance as f32 / 100.0;
        buffer = ops::map_rgb(&buffer, |_, _, rgb| {
            let max = rgb[0].max(rgb[1]).max(rgb[2]);
            let min = rgb[0].min(rgb[1]).min(rgb[2]);
            let sat = (max - min) / 255.0;
            let eff = 1.0 + (factor - 1.0) * (1.0 - sat);
            let l = 0.299 * rgb[0] + 0.587 * rgb[1] + 0.114 * rgb[2];
            [
                l + eff * (rgb[0] - l),
                l + eff * (rgb[1] - l),
                l + eff * (rgb[2] - l),
            ]
        });
    }

    if settings.exposure != 0 {
        let gain = 1.0 + settings.exposure as f32 / 100.0;
        buffer = ops::map_rgb(&buffer, |_, _, rgb| {
            [rgb[0] * gain, rgb[1] * gain, rgb[2] * gain]
        });
    }

    buffer
}

/// Segment the subject and return the image with background pixels made
/// transparent, plus the union mask of every detected subject.
///
/// Errors with `CapabilityUnavailable` when no detector is supplied.
pub fn remove_background(
    img: &RgbaImage,
    detector: Option<&dyn SubjectDetector>,
) -> ImagingResult<(RgbaImage, SubjectMask)> {
    let Some(detector) = detector else {
        return Err(ImagingError::capability_unavailable(
            "background removal requires a subject detector",
        ));
    };

    let subjects = detector.detect(img)?;
    let (w, h) = img.dimensions();
    let mut mask = SubjectMask::filled(w, h, 0);
    for subject in &subjects {
        if subject.mask.width() != w || subject.mask.height() != h {
            continue;
        }
        for y in 0..h {
            for x in 0..w {
                let v = subject.mask.get(x, y);
                if v > mask.get(x, y) {
                    mask.set(x, y, v);
                }
            }
        }
    }

    let mut out = img.clone();
    for (x, y, px) in out.enumerate_pixels_mut() {
        px[3] = mask.get(x, y);
    }
    Ok((out, mask))
}

/// Generate a procedural background and composite the subject over it
/// through an edge-refined mask.
pub fn replace_background(
    img: &RgbaImage,
    mask: &SubjectMask,
    color: [u8; 3],
    style: BackgroundStyle,
    seed: u64,
) -> RgbaImage {
    let refined = background::refine_edges(mask);
    let bg = background::generate(style, img.width(), img.height(), color, seed);
    background::composite(img, &bg, &refined)
}

/// Detect subjects via the capability when present, falling back to the
/// local contour heuristic when it is absent or unavailable.
pub fn detect_subjects(
    img: &RgbaImage,
    detector: Option<&dyn SubjectDetector>,
) -> ImagingResult<Vec<Subject>> {
    match detector {
        Some(d) => match d.detect(img) {
            Ok(subjects) => Ok(subjects),
            Err(e) if e.is_capability_unavailable() => {
                warn!(backend = d.name(), error = %e, "detector unavailable, using contour fallback");
                ContourDetector::new().detect(img)
            }
            Err(e) => Err(e),
        },
        None => ContourDetector::new().detect(img),
    }
}

/// Encode a buffer into the requested format.
///
/// JPEG honors `quality`; PNG ignores it; WEBP accepts it but the encoder is
/// lossless. Encode failure is fatal for the invocation.
pub fn encode(img: &RgbaImage, format: OutputFormat, quality: u8) -> ImagingResult<Vec<u8>> {
    let quality = quality.clamp(1, 100);
    let mut out = Vec::new();
    let (w, h) = img.dimensions();

    match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = image::DynamicImage::ImageRgba8(img.clone()).to_rgb8();
            JpegEncoder::new_with_quality(Cursor::new(&mut out), quality)
                .write_image(rgb.as_raw(), w, h, ExtendedColorType::Rgb8)
                .map_err(|e| ImagingError::transform("encode", e.to_string()))?;
        }
        OutputFormat::Png => {
            PngEncoder::new(Cursor::new(&mut out))
                .write_image(img.as_raw(), w, h, ExtendedColorType::Rgba8)
                .map_err(|e| ImagingError::transform("encode", e.to_string()))?;
        }
        OutputFormat::Webp => {
            WebPEncoder::new_lossless(Cursor::new(&mut out))
                .write_image(img.as_raw(), w, h, ExtendedColorType::Rgba8)
                .map_err(|e| ImagingError::transform("encode", e.to_string()))?;
        }
    }

    Ok(out)
}

/// Encode with a client-supplied format name.
///
/// Unlike catalog names, an unknown output format cannot degrade to a
/// no-op; it is rejected as `UnsupportedFormat`.
pub fn encode_named(img: &RgbaImage, format: &str, quality: u8) -> ImagingResult<Vec<u8>> {
    let parsed = format
        .parse::<OutputFormat>()
        .map_err(|_| ImagingError::UnsupportedFormat(format.to_string()))?;
    encode(img, parsed, quality)
}

/// Encode and write the artifact to disk.
pub fn save(
    path: impl AsRef<Path>,
    img: &RgbaImage,
    format: OutputFormat,
    quality: u8,
) -> ImagingResult<()> {
    let bytes = encode(img, format, quality)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn test_image() -> RgbaImage {
        RgbaImage::from_fn(32, 24, |x, y| {
            Rgba([(x * 8) as u8, (y * 10) as u8, 100, 255])
        })
    }

    struct FixedMaskDetector;

    impl SubjectDetector for FixedMaskDetector {
        fn detect(&self, img: &RgbaImage) -> ImagingResult<Vec<Subject>> {
            let (w, h) = img.dimensions();
            let mut mask = SubjectMask::filled(w, h, 0);
            for y in h / 4..(3 * h / 4) {
                for x in w / 4..(3 * w / 4) {
                    mask.set(x, y, 255);
                }
            }
            Ok(vec![Subject {
                kind: fbari_models::SubjectKind::Person,
                confidence: 0.95,
                bbox: fbari_models::BoundingBox::new(w / 4, h / 4, w / 2, h / 2),
                mask,
            }])
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    struct UnavailableDetector;

    impl SubjectDetector for UnavailableDetector {
        fn detect(&self, _img: &RgbaImage) -> ImagingResult<Vec<Subject>> {
            Err(ImagingError::capability_unavailable("model offline"))
        }

        fn name(&self) -> &'static str {
            "offline"
        }
    }

    #[test]
    fn test_identity_settings_round_trip_losslessly() {
        let pipeline = Pipeline::from_image(test_image());
        let settings = EditSettings {
            output_format: OutputFormat::Png,
            ..Default::default()
        };
        let result = pipeline.run(&settings, None, 0).unwrap();
        assert_eq!(result.image, *pipeline.source());
        assert_eq!(result.operations, vec![AppliedOp::Encode(OutputFormat::Png)]);
        let decoded = image::load_from_memory(&result.encoded).unwrap().to_rgba8();
        assert_eq!(decoded, *pipeline.source());
    }

    #[test]
    fn test_enhance_all_zero_is_bit_identical() {
        let img = test_image();
        assert_eq!(enhance(&img, &EditSettings::default()), img);
    }

    #[test]
    fn test_enhance_brightness_compounds_on_repeat() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([100, 100, 100, 255]));
        let settings = EditSettings {
            brightness: 20,
            ..Default::default()
        };
        let once = enhance(&img, &settings);
        let twice = enhance(&once, &settings);
        assert_eq!(once.get_pixel(0, 0)[0], 120);
        assert_eq!(twice.get_pixel(0, 0)[0], 144);
    }

    #[test]
    fn test_run_records_operations_in_order() {
        let pipeline = Pipeline::from_image(test_image());
        let settings = EditSettings {
            brightness: 10,
            color_grade: Some("cinematic_warm".to_string()),
            filter: Some("sepia".to_string()),
            output_format: OutputFormat::Png,
            ..Default::default()
        };
        let result = pipeline.run(&settings, None, 0).unwrap();
        assert_eq!(
            result.operations,
            vec![
                AppliedOp::Enhance,
                AppliedOp::Grade(GradeName::Warm),
                AppliedOp::Filter(FilterKind::Sepia),
                AppliedOp::Encode(OutputFormat::Png),
            ]
        );
    }

    #[test]
    fn test_run_skips_unknown_catalog_names_silently() {
        let pipeline = Pipeline::from_image(test_image());
        let settings = EditSettings {
            color_grade: Some("technicolor".to_string()),
            filter: Some("glitter".to_string()),
            output_format: OutputFormat::Png,
            ..Default::default()
        };
        let result = pipeline.run(&settings, None, 0).unwrap();
        assert_eq!(result.image, *pipeline.source());
        assert_eq!(result.operations, vec![AppliedOp::Encode(OutputFormat::Png)]);
    }

    #[test]
    fn test_run_replaces_background_with_detector() {
        let pipeline = Pipeline::from_image(test_image());
        let settings = EditSettings {
            background_style: BackgroundStyle::Solid,
            background_color: "#FF0000".to_string(),
            output_format: OutputFormat::Png,
            ..Default::default()
        };
        let result = pipeline.run(&settings, Some(&FixedMaskDetector), 7).unwrap();
        assert!(result
            .operations
            .contains(&AppliedOp::BackgroundReplace(BackgroundStyle::Solid)));
        // A corner pixel is fully outside the subject mask
        assert_eq!(result.image.get_pixel(0, 0).0[..3], [255, 0, 0]);
    }

    #[test]
    fn test_run_downgrades_when_detector_unavailable() {
        let pipeline = Pipeline::from_image(test_image());
        let settings = EditSettings {
            output_format: OutputFormat::Png,
            ..Default::default()
        };
        let result = pipeline.run(&settings, Some(&UnavailableDetector), 0).unwrap();
        assert_eq!(result.image, *pipeline.source());
    }

    #[test]
    fn test_remove_background_requires_detector() {
        let err = remove_background(&test_image(), None).unwrap_err();
        assert!(err.is_capability_unavailable());
    }

    #[test]
    fn test_remove_background_sets_alpha_from_mask() {
        let (out, mask) = remove_background(&test_image(), Some(&FixedMaskDetector)).unwrap();
        assert!(mask.coverage() > 0.2);
        assert_eq!(out.get_pixel(0, 0)[3], 0);
        assert_eq!(out.get_pixel(16, 12)[3], 255);
    }

    #[test]
    fn test_detect_subjects_falls_back_to_contour() {
        let img = RgbaImage::from_pixel(32, 32, Rgba([128, 128, 128, 255]));
        // Flat image, so even the fallback finds nothing, but it must not error
        let subjects = detect_subjects(&img, Some(&UnavailableDetector)).unwrap();
        assert!(subjects.is_empty());
    }

    #[test]
    fn test_thumbnail_preserves_aspect() {
        let pipeline = Pipeline::from_image(RgbaImage::new(400, 200));
        let thumb = pipeline.thumbnail(100);
        assert_eq!(thumb.dimensions(), (100, 50));
        // Already small enough: untouched
        let small = Pipeline::from_image(RgbaImage::new(50, 40));
        assert_eq!(small.thumbnail(100).dimensions(), (50, 40));
    }

    #[test]
    fn test_encode_jpeg_honors_quality() {
        let img = test_image();
        let high = encode(&img, OutputFormat::Jpeg, 95).unwrap();
        let low = encode(&img, OutputFormat::Jpeg, 10).unwrap();
        assert!(!high.is_empty() && !low.is_empty());
        assert!(high.len() > low.len());
    }

    #[test]
    fn test_encode_named_rejects_unknown_format() {
        let img = test_image();
        let err = encode_named(&img, "TIFF", 85).unwrap_err();
        assert!(matches!(err, ImagingError::UnsupportedFormat(_)));
        let bytes = encode_named(&img, "png", 85).unwrap();
        assert_eq!(bytes, encode(&img, OutputFormat::Png, 85).unwrap());
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let err = Pipeline::from_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ImagingError::Decode(_)));
    }

    #[test]
    fn test_save_writes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        save(&path, &test_image(), OutputFormat::Png, 85).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded, test_image());
    }
}
