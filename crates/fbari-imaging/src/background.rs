//! Procedural background generation and mask compositing.
//!
//! Every generator is deterministic given its parameters; the stochastic
//! styles (`Geometric`, `Bokeh`) draw from a caller-supplied seed so tests
//! can pin their output.

use image::imageops::{self, FilterType};
use image::{GrayImage, Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use fbari_models::{BackgroundStyle, SubjectMask};

use crate::ops;

/// Generate a procedural background of the requested style and size.
///
/// `color` is the dominant RGB color; `seed` only matters for the
/// stochastic styles.
pub fn generate(
    style: BackgroundStyle,
    width: u32,
    height: u32,
    color: [u8; 3],
    seed: u64,
) -> RgbaImage {
    let width = width.max(1);
    let height = height.max(1);
    match style {
        BackgroundStyle::Solid => solid(width, height, color),
        BackgroundStyle::Gradient => gradient(width, height, color),
        BackgroundStyle::Wave => wave(width, height, color),
        BackgroundStyle::Neon => neon(width, height, color),
        BackgroundStyle::Metallic => metallic(width, height, color),
        BackgroundStyle::Geometric => geometric(width, height, color, seed),
        BackgroundStyle::Studio => studio(width, height, color),
        BackgroundStyle::Bokeh => bokeh(width, height, color, seed),
    }
}

/// Composite `fg` over `bg` through a soft mask: `mask*fg + (1-mask)*bg`
/// per pixel. The background is resized to the foreground's dimensions.
pub fn composite(fg: &RgbaImage, bg: &RgbaImage, mask: &SubjectMask) -> RgbaImage {
    let (w, h) = fg.dimensions();
    let bg = if bg.dimensions() == (w, h) {
        bg.clone()
    } else {
        imageops::resize(bg, w, h, FilterType::Triangle)
    };

    let mut out = fg.clone();
    for (x, y, px) in out.enumerate_pixels_mut() {
        let t = mask.get(x, y) as f32 / 255.0;
        let b = bg.get_pixel(x, y);
        for c in 0..3 {
            px[c] = ops::clamp_u8(px[c] as f32 * t + b[c] as f32 * (1.0 - t));
        }
        px[3] = 255;
    }
    out
}

/// Soften a binary mask edge with a small Gaussian blur so composited
/// subjects do not show a hard cutout line.
pub fn refine_edges(mask: &SubjectMask) -> SubjectMask {
    let (w, h) = (mask.width(), mask.height());
    let Some(gray) = GrayImage::from_raw(w, h, mask.as_raw().to_vec()) else {
        return mask.clone();
    };
    let blurred = imageops::blur(&gray, 1.5);
    SubjectMask::from_raw(w, h, blurred.into_raw()).unwrap_or_else(|| mask.clone())
}

fn solid(w: u32, h: u32, color: [u8; 3]) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba([color[0], color[1], color[2], 255]))
}

/// Vertical ramp from the full color at the top to 30% at the bottom.
fn gradient(w: u32, h: u32, color: [u8; 3]) -> RgbaImage {
    RgbaImage::from_fn(w, h, |_, y| {
        let t = y as f32 / (h.max(2) - 1) as f32;
        let factor = 1.0 - 0.7 * t;
        tinted(color, factor)
    })
}

/// Sinusoidal interference pattern tinted by the requested color.
fn wave(w: u32, h: u32, color: [u8; 3]) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        let v = 100.0 + 50.0 * (x as f32 * 0.02).sin() + 30.0 * (y as f32 * 0.03).cos();
        Rgba([
            ops::clamp_u8(v * color[0] as f32 / 255.0),
            ops::clamp_u8(v * color[1] as f32 / 255.0),
            ops::clamp_u8(v * color[2] as f32 / 255.0),
            255,
        ])
    })
}

/// Near-black base with bright lines every 50 px, softened by a blur.
fn neon(w: u32, h: u32, color: [u8; 3]) -> RgbaImage {
    let mut img = RgbaImage::from_fn(w, h, |_, _| tinted(color, 0.08));
    for (x, y, px) in img.enumerate_pixels_mut() {
        if x % 50 == 0 || y % 50 == 0 {
            px[0] = ops::clamp_u8(color[0] as f32 * 1.2 + 40.0);
            px[1] = ops::clamp_u8(color[1] as f32 * 1.2 + 40.0);
            px[2] = ops::clamp_u8(color[2] as f32 * 1.2 + 40.0);
        }
    }
    imageops::blur(&img, 3.0)
}

/// Concentric ripple sheen centered on the canvas.
fn metallic(w: u32, h: u32, color: [u8; 3]) -> RgbaImage {
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    RgbaImage::from_fn(w, h, |x, y| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        let dist = (dx * dx + dy * dy).sqrt();
        let v = 150.0 + 50.0 * (dist * 0.1).sin();
        Rgba([
            ops::clamp_u8(v * (0.7 + 0.3 * color[0] as f32 / 255.0)),
            ops::clamp_u8(v * (0.7 + 0.3 * color[1] as f32 / 255.0)),
            ops::clamp_u8(v * (0.7 + 0.3 * color[2] as f32 / 255.0)),
            255,
        ])
    })
}

/// Seeded random rectangles and circles over a muted base, then smoothed.
fn geometric(w: u32, h: u32, color: [u8; 3], seed: u64) -> RgbaImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut img = RgbaImage::from_fn(w, h, |_, _| tinted(color, 0.5));

    for _ in 0..20 {
        let shade = rng.random_range(0.3..1.3f32);
        let fill = tinted(color, shade);
        let cx = rng.random_range(0..w);
        let cy = rng.random_range(0..h);
        let size = rng.random_range(8..(w.max(h) / 3).max(9));
        if rng.random_bool(0.5) {
            draw_rect(&mut img, cx, cy, size, fill);
        } else {
            draw_circle(&mut img, cx, cy, size / 2, fill);
        }
    }
    imageops::blur(&img, 2.0)
}

/// Radial studio light: bright center falling off toward the edges.
fn studio(w: u32, h: u32, color: [u8; 3]) -> RgbaImage {
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    let max_dist = (cx * cx + cy * cy).sqrt().max(1.0);
    RgbaImage::from_fn(w, h, |x, y| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        let d = (dx * dx + dy * dy).sqrt() / max_dist;
        tinted(color, 1.15 - 0.8 * d)
    })
}

/// Seeded out-of-focus light discs over a dark base.
fn bokeh(w: u32, h: u32, color: [u8; 3], seed: u64) -> RgbaImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut img = RgbaImage::from_fn(w, h, |_, _| tinted(color, 0.2));

    for _ in 0..50 {
        let cx = rng.random_range(0..w);
        let cy = rng.random_range(0..h);
        let radius = rng.random_range(4..(w.min(h) / 5).max(5));
        let brightness = rng.random_range(0.8..1.6f32);
        draw_circle(&mut img, cx, cy, radius, tinted(color, brightness));
    }
    imageops::blur(&img, 4.0)
}

fn tinted(color: [u8; 3], factor: f32) -> Rgba<u8> {
    Rgba([
        ops::clamp_u8(color[0] as f32 * factor),
        ops::clamp_u8(color[1] as f32 * factor),
        ops::clamp_u8(color[2] as f32 * factor),
        255,
    ])
}

fn draw_rect(img: &mut RgbaImage, cx: u32, cy: u32, size: u32, fill: Rgba<u8>) {
    let (w, h) = img.dimensions();
    let half = size / 2;
    let x0 = cx.saturating_sub(half);
    let y0 = cy.saturating_sub(half);
    for y in y0..(cy + half).min(h) {
        for x in x0..(cx + half).min(w) {
            img.put_pixel(x, y, fill);
        }
    }
}

fn draw_circle(img: &mut RgbaImage, cx: u32, cy: u32, radius: u32, fill: Rgba<u8>) {
    let (w, h) = img.dimensions();
    let r2 = (radius * radius) as i64;
    let (cxi, cyi) = (cx as i64, cy as i64);
    let x0 = cx.saturating_sub(radius);
    let y0 = cy.saturating_sub(radius);
    for y in y0..(cy + radius + 1).min(h) {
        for x in x0..(cx + radius + 1).min(w) {
            let dx = x as i64 - cxi;
            let dy = y as i64 - cyi;
            if dx * dx + dy * dy <= r2 {
                img.put_pixel(x, y, fill);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLUE: [u8; 3] = [0, 102, 255];

    #[test]
    fn test_every_style_produces_requested_dimensions() {
        for style in BackgroundStyle::ALL {
            let bg = generate(*style, 64, 48, BLUE, 1);
            assert_eq!(bg.dimensions(), (64, 48), "style {style}");
        }
    }

    #[test]
    fn test_solid_is_uniform_fill() {
        let bg = generate(BackgroundStyle::Solid, 8, 8, BLUE, 0);
        for px in bg.pixels() {
            assert_eq!(px.0, [0, 102, 255, 255]);
        }
    }

    #[test]
    fn test_gradient_darkens_downward() {
        let bg = generate(BackgroundStyle::Gradient, 4, 32, [200, 200, 200], 0);
        assert!(bg.get_pixel(0, 0)[0] > bg.get_pixel(0, 31)[0]);
    }

    #[test]
    fn test_stochastic_styles_are_seed_deterministic() {
        for style in [BackgroundStyle::Geometric, BackgroundStyle::Bokeh] {
            let a = generate(style, 64, 64, BLUE, 42);
            let b = generate(style, 64, 64, BLUE, 42);
            assert_eq!(a, b, "style {style}");
            let c = generate(style, 64, 64, BLUE, 43);
            assert_ne!(a, c, "style {style}");
        }
    }

    #[test]
    fn test_composite_full_mask_keeps_foreground() {
        let fg = RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255]));
        let bg = RgbaImage::from_pixel(8, 8, Rgba([200, 200, 200, 255]));
        let mask = SubjectMask::filled(8, 8, 255);
        let out = composite(&fg, &bg, &mask);
        assert_eq!(out, fg);
    }

    #[test]
    fn test_composite_empty_mask_keeps_background() {
        let fg = RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255]));
        let bg = RgbaImage::from_pixel(8, 8, Rgba([200, 150, 100, 255]));
        let mask = SubjectMask::filled(8, 8, 0);
        let out = composite(&fg, &bg, &mask);
        for px in out.pixels() {
            assert_eq!(px.0, [200, 150, 100, 255]);
        }
    }

    #[test]
    fn test_composite_resizes_mismatched_background() {
        let fg = RgbaImage::from_pixel(16, 16, Rgba([10, 20, 30, 255]));
        let bg = RgbaImage::from_pixel(4, 4, Rgba([200, 200, 200, 255]));
        let mask = SubjectMask::filled(16, 16, 0);
        let out = composite(&fg, &bg, &mask);
        assert_eq!(out.dimensions(), (16, 16));
        assert_eq!(out.get_pixel(8, 8).0, [200, 200, 200, 255]);
    }

    #[test]
    fn test_refine_edges_softens_binary_boundary() {
        let mut mask = SubjectMask::filled(16, 16, 0);
        for y in 0..16 {
            for x in 8..16 {
                mask.set(x, y, 255);
            }
        }
        let refined = refine_edges(&mask);
        assert_eq!(refined.width(), 16);
        let edge = refined.get(8, 8);
        assert!(edge > 0 && edge < 255, "expected softened edge, got {edge}");
        // Far from the boundary the mask is unchanged in spirit
        assert!(refined.get(0, 8) < 10);
        assert!(refined.get(15, 8) > 245);
    }
}
