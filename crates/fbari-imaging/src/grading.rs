//! Color grading via per-channel lookup tables.
//!
//! Each named grade is a 256-entry-per-channel LUT built once from a pure
//! curve function and reused for every application. Blending with the
//! original buffer is an exact identity at intensity 0.

use std::collections::HashMap;
use std::sync::LazyLock;

use image::RgbaImage;
use tracing::warn;

use fbari_models::{GradeName, SubjectMask};

use crate::ops;

/// A per-channel lookup table mapping input intensity [0,255] to output.
#[derive(Debug, Clone)]
pub struct Lut {
    r: [u8; 256],
    g: [u8; 256],
    b: [u8; 256],
}

impl Lut {
    /// Build the LUT for a named grade. Pure in the channel-index domain.
    fn build(name: GradeName) -> Self {
        let mut r = [0u8; 256];
        let mut g = [0u8; 256];
        let mut b = [0u8; 256];

        for i in 0..256usize {
            let x = i as f32;
            let (cr, cg, cb) = match name {
                // Linear scale + offset, reds lifted
                GradeName::Warm => (x * 1.1 + 10.0, x * 1.05 + 5.0, x * 0.95 - 5.0),
                // Mirror of warm, blues lifted
                GradeName::Cool => (x * 0.95 - 5.0, x * 1.02, x * 1.1 + 10.0),
                // Power-law lift with a warm cast
                GradeName::Vintage => {
                    let s = 255.0 * (x / 255.0).powf(0.8);
                    (s * 1.05 + 15.0, s * 1.02 + 8.0, s * 0.9)
                }
                // High-contrast power curve, all channels
                GradeName::Dramatic => {
                    let d = 255.0 * (x / 255.0).powf(0.6);
                    (d, d, d)
                }
                // Grayscale then tint toward blue
                GradeName::MonoBlue => {
                    let gray = x * 0.299 + x * 0.587 + x * 0.114;
                    (gray * 0.2, gray * 0.4, gray * 1.2)
                }
                // Boost highlights, crush shadows, cold cast
                GradeName::Neon => {
                    let e = if x > 128.0 { x * 1.3 } else { x * 0.7 };
                    (e + 20.0, e, e + 40.0)
                }
            };
            r[i] = ops::clamp_u8(cr);
            g[i] = ops::clamp_u8(cg);
            b[i] = ops::clamp_u8(cb);
        }

        Self { r, g, b }
    }

    #[inline]
    fn map(&self, px: [u8; 4]) -> [u8; 4] {
        [
            self.r[px[0] as usize],
            self.g[px[1] as usize],
            self.b[px[2] as usize],
            px[3],
        ]
    }
}

// Built once, process-lifetime constant data.
static CATALOG: LazyLock<HashMap<GradeName, Lut>> = LazyLock::new(|| {
    GradeName::ALL
        .iter()
        .map(|name| (*name, Lut::build(*name)))
        .collect()
});

/// Get the immutable LUT for a grade.
pub fn lut_for(name: GradeName) -> &'static Lut {
    // Catalog is seeded from GradeName::ALL, so every variant is present.
    &CATALOG[&name]
}

/// Map every pixel through the named LUT, then blend with the original by
/// `intensity` (1.0 = fully graded, 0.0 = the input, bit-identical).
pub fn apply_lut(img: &RgbaImage, name: GradeName, intensity: f32) -> RgbaImage {
    let intensity = intensity.clamp(0.0, 1.0);
    if intensity == 0.0 {
        return img.clone();
    }

    let lut = lut_for(name);
    let mut graded = img.clone();
    for px in graded.pixels_mut() {
        px.0 = lut.map(px.0);
    }

    if intensity < 1.0 {
        ops::blend(img, &graded, intensity)
    } else {
        graded
    }
}

/// Apply the LUT only inside the masked region, blending per pixel by
/// `mask_value * intensity`. Pixels outside the mask are unchanged.
pub fn apply_subject_grading(
    img: &RgbaImage,
    mask: &SubjectMask,
    name: GradeName,
    intensity: f32,
) -> RgbaImage {
    let intensity = intensity.clamp(0.0, 1.0);
    if intensity == 0.0 {
        return img.clone();
    }
    if mask.width() != img.width() || mask.height() != img.height() {
        warn!(
            mask_w = mask.width(),
            mask_h = mask.height(),
            img_w = img.width(),
            img_h = img.height(),
            "subject mask dimensions do not match image; skipping grading"
        );
        return img.clone();
    }

    let lut = lut_for(name);
    let mut out = img.clone();
    for (x, y, px) in out.enumerate_pixels_mut() {
        let t = (mask.get(x, y) as f32 / 255.0) * intensity;
        if t == 0.0 {
            continue;
        }
        let graded = lut.map(px.0);
        for c in 0..3 {
            px[c] = ops::clamp_u8(px[c] as f32 * (1.0 - t) + graded[c] as f32 * t);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn test_image() -> RgbaImage {
        RgbaImage::from_fn(8, 8, |x, y| {
            Rgba([(x * 30) as u8, (y * 30) as u8, 128, 255])
        })
    }

    #[test]
    fn test_intensity_zero_is_exact_identity_for_every_grade() {
        let img = test_image();
        for name in GradeName::ALL {
            assert_eq!(apply_lut(&img, *name, 0.0), img, "grade {name}");
        }
    }

    #[test]
    fn test_warm_lifts_red_channel() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([100, 100, 100, 255]));
        let out = apply_lut(&img, GradeName::Warm, 1.0);
        let px = out.get_pixel(0, 0);
        assert!(px[0] > 100, "red should be lifted, got {}", px[0]);
        assert!(px[2] < 100, "blue should be pulled, got {}", px[2]);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_half_intensity_is_between_original_and_graded() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([100, 100, 100, 255]));
        let full = apply_lut(&img, GradeName::Warm, 1.0);
        let half = apply_lut(&img, GradeName::Warm, 0.5);
        let (o, f, h) = (
            img.get_pixel(0, 0)[0],
            full.get_pixel(0, 0)[0],
            half.get_pixel(0, 0)[0],
        );
        assert!(o < h && h < f, "expected {o} < {h} < {f}");
    }

    #[test]
    fn test_subject_grading_leaves_unmasked_pixels_unchanged() {
        let img = test_image();
        let mut mask = SubjectMask::filled(8, 8, 0);
        mask.set(2, 2, 255);
        let out = apply_subject_grading(&img, &mask, GradeName::Dramatic, 1.0);
        for (x, y, px) in out.enumerate_pixels() {
            if (x, y) == (2, 2) {
                continue;
            }
            assert_eq!(px, img.get_pixel(x, y), "pixel ({x},{y}) changed outside mask");
        }
        assert_ne!(out.get_pixel(2, 2), img.get_pixel(2, 2));
    }

    #[test]
    fn test_subject_grading_dimension_mismatch_is_noop() {
        let img = test_image();
        let mask = SubjectMask::filled(4, 4, 255);
        assert_eq!(apply_subject_grading(&img, &mask, GradeName::Neon, 1.0), img);
    }

    #[test]
    fn test_mono_blue_is_blue_dominant() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([180, 180, 180, 255]));
        let out = apply_lut(&img, GradeName::MonoBlue, 1.0);
        let px = out.get_pixel(0, 0);
        assert!(px[2] > px[1] && px[1] > px[0]);
    }
}
