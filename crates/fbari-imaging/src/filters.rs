//! The stylistic filter catalog.
//!
//! Every filter is a pure transform on an owned RGBA buffer that preserves
//! dimensions and channel count. `apply_filter` dispatches on the tagged
//! [`FilterKind`] variant and blends the result with the original by
//! intensity, an exact identity at 0.

use image::{imageops, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use fbari_models::FilterKind;

use crate::ops;

/// Extra parameters for filters that take them. Defaults match the catalog's
/// documented behavior; the seed makes grain deterministic in tests.
#[derive(Debug, Clone)]
pub struct FilterParams {
    /// Seed for stochastic texture (vintage grain)
    pub seed: u64,
    /// Gaussian radius for the blur filter
    pub blur_radius: f32,
    /// Unsharp amount for the sharpen filter
    pub sharpen_amount: f32,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            seed: 0,
            blur_radius: 2.0,
            sharpen_amount: 1.0,
        }
    }
}

/// Apply a named filter at the given blend intensity with default parameters.
pub fn apply_filter(img: &RgbaImage, kind: FilterKind, intensity: f32) -> RgbaImage {
    apply_filter_with(img, kind, intensity, &FilterParams::default())
}

/// Apply a named filter at the given blend intensity.
///
/// Intensity 1.0 is the full effect; 0.0 returns the input bit-identically.
pub fn apply_filter_with(
    img: &RgbaImage,
    kind: FilterKind,
    intensity: f32,
    params: &FilterParams,
) -> RgbaImage {
    let intensity = intensity.clamp(0.0, 1.0);
    if intensity == 0.0 {
        return img.clone();
    }

    let filtered = match kind {
        FilterKind::Blur => imageops::blur(img, params.blur_radius.max(0.1)),
        FilterKind::Sharpen => imageops::unsharpen(img, params.sharpen_amount.max(0.1), 0),
        FilterKind::Emboss => emboss(img),
        FilterKind::EdgeDetect => edge_detect(img),
        FilterKind::Vintage => vintage(img, params.seed),
        FilterKind::Sepia => sepia(img),
        FilterKind::BlackWhite => black_white(img),
        FilterKind::CrossProcess => cross_process(img),
        FilterKind::Lomography => lomography(img),
        FilterKind::Orton => orton(img),
        FilterKind::Hdr => hdr(img),
        FilterKind::OilPainting => oil_painting(img),
        FilterKind::Watercolor => watercolor(img),
        FilterKind::PencilSketch => pencil_sketch(img),
        FilterKind::Cartoon => cartoon(img),
        FilterKind::PopArt => pop_art(img),
    };

    if intensity < 1.0 {
        ops::blend(img, &filtered, intensity)
    } else {
        filtered
    }
}

/// Classic emboss: difference with the top-left neighbor around mid-gray.
fn emboss(img: &RgbaImage) -> RgbaImage {
    let mut out = img.clone();
    for (x, y, px) in out.enumerate_pixels_mut() {
        let (nx, ny) = (x.saturating_sub(1), y.saturating_sub(1));
        let neighbor = img.get_pixel(nx, ny);
        for c in 0..3 {
            let v = img.get_pixel(x, y)[c] as f32 - neighbor[c] as f32 + 128.0;
            px[c] = ops::clamp_u8(v);
        }
    }
    out
}

/// Laplacian edge magnitude on luma, rendered as grayscale RGB.
fn edge_detect(img: &RgbaImage) -> RgbaImage {
    let (w, h) = img.dimensions();
    let luma = ops::luma_plane(img);
    let at = |x: i64, y: i64| -> f32 {
        let x = x.clamp(0, w as i64 - 1);
        let y = y.clamp(0, h as i64 - 1);
        luma[(y * w as i64 + x) as usize]
    };

    let mut out = img.clone();
    for (x, y, px) in out.enumerate_pixels_mut() {
        let (xi, yi) = (x as i64, y as i64);
        let mut acc = 8.0 * at(xi, yi);
        for dy in -1..=1i64 {
            for dx in -1..=1i64 {
                if dx != 0 || dy != 0 {
                    acc -= at(xi + dx, yi + dy);
                }
            }
        }
        let v = ops::clamp_u8(acc.abs());
        px[0] = v;
        px[1] = v;
        px[2] = v;
    }
    out
}

/// Vignette, warm cast and seeded grain.
fn vintage(img: &RgbaImage, seed: u64) -> RgbaImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let vignetted = ops::apply_vignette(img, 0.5, 0.0);
    ops::map_rgb(&vignetted, |_, _, rgb| {
        let noise: f32 = rng.random_range(-10.0..=10.0);
        [rgb[0] * 1.1 + noise, rgb[1] + noise, rgb[2] * 0.9 + noise]
    })
}

/// Standard sepia transformation matrix.
fn sepia(img: &RgbaImage) -> RgbaImage {
    ops::map_rgb(img, |_, _, [r, g, b]| {
        [
            0.393 * r + 0.769 * g + 0.189 * b,
            0.349 * r + 0.686 * g + 0.168 * b,
            0.272 * r + 0.534 * g + 0.131 * b,
        ]
    })
}

/// Grayscale with a mild contrast lift around the image mean.
fn black_white(img: &RgbaImage) -> RgbaImage {
    let mean = ops::mean_luma(img);
    ops::map_rgb(img, |_, _, rgb| {
        let l = 0.299 * rgb[0] + 0.587 * rgb[1] + 0.114 * rgb[2];
        let v = mean + 1.2 * (l - mean);
        [v, v, v]
    })
}

/// Per-channel logistic S-curves with different steepness per channel.
fn cross_process(img: &RgbaImage) -> RgbaImage {
    fn s_curve(x: f32, steepness: f32) -> f32 {
        255.0 / (1.0 + (-steepness * (x / 255.0 - 0.5)).exp())
    }
    ops::map_rgb(img, |_, _, [r, g, b]| {
        [s_curve(r, 2.5), s_curve(g, 2.0), s_curve(b, 1.5)]
    })
}

/// Heavy vignette plus a saturation push.
fn lomography(img: &RgbaImage) -> RgbaImage {
    let vignetted = ops::apply_vignette(img, 0.8, 0.2);
    ops::scale_saturation(&vignetted, 1.5)
}

/// Dreamy glow: blend with a blurred, contrast-lifted copy.
fn orton(img: &RgbaImage) -> RgbaImage {
    let blurred = imageops::blur(img, 10.0);
    let mean = ops::mean_luma(&blurred);
    let lifted = ops::map_rgb(&blurred, |_, _, rgb| {
        [
            mean + 1.5 * (rgb[0] - mean),
            mean + 1.5 * (rgb[1] - mean),
            mean + 1.5 * (rgb[2] - mean),
        ]
    });
    ops::blend(img, &lifted, 0.5)
}

/// Tone-mapped look: gamma lift on luminance plus local-contrast boost.
fn hdr(img: &RgbaImage) -> RgbaImage {
    let (w, h) = img.dimensions();
    let luma = ops::luma_plane(img);
    let mapped: Vec<f32> = luma.iter().map(|l| 255.0 * (l / 255.0).powf(0.6)).collect();
    let local_mean = ops::box_blur_plane(&mapped, w, h, 7);

    let mut out = img.clone();
    for (x, y, px) in out.enumerate_pixels_mut() {
        let idx = (y * w + x) as usize;
        let original = luma[idx].max(1.0);
        let boosted = mapped[idx] + 0.5 * (mapped[idx] - local_mean[idx]);
        let gain = (boosted / original).clamp(0.0, 4.0);
        for c in 0..3 {
            px[c] = ops::clamp_u8(px[c] as f32 * gain);
        }
    }
    out
}

/// Painterly look: dominant-luma-bin average color over a small window.
fn oil_painting(img: &RgbaImage) -> RgbaImage {
    const RADIUS: i64 = 3;
    const BINS: usize = 16;
    let (w, h) = (img.width() as i64, img.height() as i64);
    let mut out = img.clone();

    for y in 0..h {
        for x in 0..w {
            let mut counts = [0u32; BINS];
            let mut sums = [[0.0f32; 3]; BINS];
            for dy in -RADIUS..=RADIUS {
                for dx in -RADIUS..=RADIUS {
                    let (sx, sy) = ((x + dx).clamp(0, w - 1), (y + dy).clamp(0, h - 1));
                    let px = img.get_pixel(sx as u32, sy as u32);
                    let bin = ((ops::luma(px) / 256.0) * BINS as f32) as usize;
                    let bin = bin.min(BINS - 1);
                    counts[bin] += 1;
                    for c in 0..3 {
                        sums[bin][c] += px[c] as f32;
                    }
                }
            }
            let best = (0..BINS).max_by_key(|&b| counts[b]).unwrap_or(0);
            let n = counts[best].max(1) as f32;
            let px = out.get_pixel_mut(x as u32, y as u32);
            for c in 0..3 {
                px[c] = ops::clamp_u8(sums[best][c] / n);
            }
        }
    }
    out
}

/// Edge map from a local-mean threshold; true marks an edge pixel.
fn adaptive_edges(img: &RgbaImage, radius: u32, offset: f32) -> Vec<bool> {
    let (w, h) = img.dimensions();
    let luma = ops::luma_plane(img);
    let local_mean = ops::box_blur_plane(&luma, w, h, radius);
    luma.iter()
        .zip(local_mean.iter())
        .map(|(l, m)| *l < m - offset)
        .collect()
}

/// Smoothed color with darkened edge strokes.
fn watercolor(img: &RgbaImage) -> RgbaImage {
    let smooth = imageops::blur(img, 2.5);
    let edges = adaptive_edges(img, 3, 7.0);
    paint_edges(&smooth, &edges)
}

/// High-contrast line drawing on white.
fn pencil_sketch(img: &RgbaImage) -> RgbaImage {
    let edges = adaptive_edges(&imageops::blur(img, 1.0), 3, 7.0);
    let (w, _h) = img.dimensions();
    let mut out = img.clone();
    for (x, y, px) in out.enumerate_pixels_mut() {
        let v = if edges[(y * w + x) as usize] { 0 } else { 255 };
        px[0] = v;
        px[1] = v;
        px[2] = v;
    }
    out
}

/// Smoothed color regions with black edge outlines.
fn cartoon(img: &RgbaImage) -> RgbaImage {
    let smooth = imageops::blur(img, 3.0);
    let edges = adaptive_edges(img, 3, 7.0);
    paint_edges(&smooth, &edges)
}

fn paint_edges(base: &RgbaImage, edges: &[bool]) -> RgbaImage {
    let (w, _h) = base.dimensions();
    let mut out = base.clone();
    for (x, y, px) in out.enumerate_pixels_mut() {
        if edges[(y * w + x) as usize] {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
        }
    }
    out
}

/// Saturation push followed by posterization, so quantization is the
/// final step and the output stays coarse.
fn pop_art(img: &RgbaImage) -> RgbaImage {
    const LEVELS: f32 = 4.0;
    let saturated = ops::scale_saturation(img, 2.0);
    ops::map_rgb(&saturated, |_, _, rgb| {
        let q = |v: f32| ((v / 255.0 * (LEVELS - 1.0)).round() / (LEVELS - 1.0)) * 255.0;
        [q(rgb[0]), q(rgb[1]), q(rgb[2])]
    })
}
