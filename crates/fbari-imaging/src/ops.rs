//! Shared per-pixel helpers used by the enhancement pass and the filter
//! catalog. All helpers return new buffers; callers own composition order.

use image::{Rgba, RgbaImage};

/// Rec. 601 luma of one pixel.
pub(crate) fn luma(px: &Rgba<u8>) -> f32 {
    0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32
}

/// Clamp an f32 channel value into u8 range.
pub(crate) fn clamp_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Mean luma over the whole buffer.
pub(crate) fn mean_luma(img: &RgbaImage) -> f32 {
    let count = (img.width() as u64 * img.height() as u64).max(1);
    let sum: f64 = img.pixels().map(|p| luma(p) as f64).sum();
    (sum / count as f64) as f32
}

/// Row-major luma plane.
pub(crate) fn luma_plane(img: &RgbaImage) -> Vec<f32> {
    img.pixels().map(luma).collect()
}

/// Separable box blur over a scalar plane. Radius is in pixels.
pub(crate) fn box_blur_plane(plane: &[f32], width: u32, height: u32, radius: u32) -> Vec<f32> {
    let (w, h) = (width as i64, height as i64);
    let r = radius as i64;
    let mut tmp = vec![0.0f32; plane.len()];
    let mut out = vec![0.0f32; plane.len()];

    // Horizontal pass
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0.0;
            let mut n = 0;
            for dx in -r..=r {
                let sx = x + dx;
                if sx >= 0 && sx < w {
                    sum += plane[(y * w + sx) as usize];
                    n += 1;
                }
            }
            tmp[(y * w + x) as usize] = sum / n as f32;
        }
    }

    // Vertical pass
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0.0;
            let mut n = 0;
            for dy in -r..=r {
                let sy = y + dy;
                if sy >= 0 && sy < h {
                    sum += tmp[(sy * w + x) as usize];
                    n += 1;
                }
            }
            out[(y * w + x) as usize] = sum / n as f32;
        }
    }

    out
}

/// Linear blend `orig*(1-t) + other*t` per channel. `t` is clamped to [0, 1].
pub(crate) fn blend(orig: &RgbaImage, other: &RgbaImage, t: f32) -> RgbaImage {
    let t = t.clamp(0.0, 1.0);
    let mut out = orig.clone();
    for (o, n) in out.pixels_mut().zip(other.pixels()) {
        for c in 0..4 {
            o[c] = clamp_u8(o[c] as f32 * (1.0 - t) + n[c] as f32 * t);
        }
    }
    out
}

/// Apply a function to the RGB channels of every pixel, preserving alpha.
pub(crate) fn map_rgb(img: &RgbaImage, mut f: impl FnMut(u32, u32, [f32; 3]) -> [f32; 3]) -> RgbaImage {
    let mut out = img.clone();
    for (x, y, px) in out.enumerate_pixels_mut() {
        let rgb = f(x, y, [px[0] as f32, px[1] as f32, px[2] as f32]);
        px[0] = clamp_u8(rgb[0]);
        px[1] = clamp_u8(rgb[1]);
        px[2] = clamp_u8(rgb[2]);
    }
    out
}

/// Scale saturation by mixing each pixel with its luma: `l + factor*(c - l)`.
pub(crate) fn scale_saturation(img: &RgbaImage, factor: f32) -> RgbaImage {
    map_rgb(img, |_, _, rgb| {
        let l = 0.299 * rgb[0] + 0.587 * rgb[1] + 0.114 * rgb[2];
        [
            l + factor * (rgb[0] - l),
            l + factor * (rgb[1] - l),
            l + factor * (rgb[2] - l),
        ]
    })
}

/// Radial vignette. `strength` is the darkening at the corners (0..1);
/// `floor` bounds how dark the falloff may get. Centered on the middle
/// pixel, so an odd-sized image keeps its center at unity gain.
pub(crate) fn apply_vignette(img: &RgbaImage, strength: f32, floor: f32) -> RgbaImage {
    let (w, h) = (img.width() as f32, img.height() as f32);
    let (cx, cy) = ((w - 1.0) / 2.0, (h - 1.0) / 2.0);
    let max_dist = (cx * cx + cy * cy).sqrt().max(1.0);
    map_rgb(img, |x, y, rgb| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        let dist = (dx * dx + dy * dy).sqrt();
        let factor = (1.0 - (dist / max_dist) * strength).max(floor);
        [rgb[0] * factor, rgb[1] * factor, rgb[2] * factor]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luma_of_white_and_black() {
        assert_eq!(luma(&Rgba([255, 255, 255, 255])).round(), 255.0);
        assert_eq!(luma(&Rgba([0, 0, 0, 255])), 0.0);
    }

    #[test]
    fn test_blend_endpoints() {
        let a = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255]));
        let b = RgbaImage::from_pixel(2, 2, Rgba([110, 120, 130, 255]));
        assert_eq!(blend(&a, &b, 0.0), a);
        assert_eq!(blend(&a, &b, 1.0), b);
        let mid = blend(&a, &b, 0.5);
        assert_eq!(mid.get_pixel(0, 0)[0], 60);
    }

    #[test]
    fn test_box_blur_preserves_constant_plane() {
        let plane = vec![42.0f32; 16];
        let blurred = box_blur_plane(&plane, 4, 4, 2);
        for v in blurred {
            assert!((v - 42.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_vignette_darkens_corners_not_center() {
        let img = RgbaImage::from_pixel(31, 31, Rgba([200, 200, 200, 255]));
        let out = apply_vignette(&img, 0.5, 0.0);
        let center = out.get_pixel(15, 15)[0];
        let corner = out.get_pixel(0, 0)[0];
        assert!(center > corner);
        assert_eq!(center, 200);
    }
}
