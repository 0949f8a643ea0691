//! Subject detection capability seam.
//!
//! Real segmentation runs behind [`SubjectDetector`], typically backed by an
//! external model service. [`ContourDetector`] is the built-in fallback: a
//! cheap edge-and-contour pass that finds coarse subject regions so the
//! pipeline still works when no model is available.

use image::RgbaImage;
use tracing::debug;

use fbari_models::{BoundingBox, Subject, SubjectKind, SubjectMask};

use crate::error::ImagingResult;
use crate::ops;

/// A segmentation backend. Implementations may be slow or unavailable;
/// callers treat `CapabilityUnavailable` as "fall back or skip".
pub trait SubjectDetector: Send + Sync {
    /// Detect subjects in an image. Masks must match the image dimensions.
    fn detect(&self, img: &RgbaImage) -> ImagingResult<Vec<Subject>>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}

/// Contour-based fallback detector.
///
/// Finds connected edge regions via a gradient-magnitude threshold and turns
/// each sufficiently large region into an `Object` subject with a span-filled
/// mask. Coarse by design of the capability: good enough for background
/// replacement when no model backend is configured.
#[derive(Debug, Clone)]
pub struct ContourDetector {
    /// Minimum component area in pixels for a region to count as a subject
    pub min_area: u64,
    /// Gradient magnitude above which a pixel is an edge
    pub edge_threshold: f32,
}

impl Default for ContourDetector {
    fn default() -> Self {
        Self {
            min_area: 1000,
            edge_threshold: 40.0,
        }
    }
}

impl ContourDetector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubjectDetector for ContourDetector {
    fn detect(&self, img: &RgbaImage) -> ImagingResult<Vec<Subject>> {
        let (w, h) = img.dimensions();
        if w == 0 || h == 0 {
            return Ok(Vec::new());
        }

        let edges = edge_map(img, self.edge_threshold);
        let components = connected_components(&edges, w, h);

        let mut subjects = Vec::new();
        for component in components {
            if (component.len() as u64) < self.min_area {
                continue;
            }
            let bbox = component_bbox(&component);
            let mask = span_fill_mask(&component, w, h);
            subjects.push(Subject {
                kind: SubjectKind::Object,
                confidence: 0.8,
                bbox,
                mask,
            });
        }

        debug!(
            subject_count = subjects.len(),
            width = w,
            height = h,
            "contour detection complete"
        );
        Ok(subjects)
    }

    fn name(&self) -> &'static str {
        "contour"
    }
}

/// Boolean edge map from blurred-luma gradient magnitude.
fn edge_map(img: &RgbaImage, threshold: f32) -> Vec<bool> {
    let (w, h) = img.dimensions();
    let luma = ops::luma_plane(img);
    let smooth = ops::box_blur_plane(&luma, w, h, 1);
    let at = |x: i64, y: i64| -> f32 {
        let x = x.clamp(0, w as i64 - 1);
        let y = y.clamp(0, h as i64 - 1);
        smooth[(y * w as i64 + x) as usize]
    };

    let mut edges = vec![false; (w * h) as usize];
    for y in 0..h as i64 {
        for x in 0..w as i64 {
            let gx = at(x + 1, y) - at(x - 1, y);
            let gy = at(x, y + 1) - at(x, y - 1);
            edges[(y * w as i64 + x) as usize] = (gx * gx + gy * gy).sqrt() > threshold;
        }
    }
    edges
}

/// 8-connected components over the edge map, BFS flood fill.
fn connected_components(edges: &[bool], w: u32, h: u32) -> Vec<Vec<(u32, u32)>> {
    let mut visited = vec![false; edges.len()];
    let mut components = Vec::new();

    for start in 0..edges.len() {
        if !edges[start] || visited[start] {
            continue;
        }
        let mut component = Vec::new();
        let mut queue = std::collections::VecDeque::new();
        visited[start] = true;
        queue.push_back(start);

        while let Some(idx) = queue.pop_front() {
            let (x, y) = ((idx as u32) % w, (idx as u32) / w);
            component.push((x, y));
            for dy in -1..=1i64 {
                for dx in -1..=1i64 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                        continue;
                    }
                    let nidx = (ny * w as i64 + nx) as usize;
                    if edges[nidx] && !visited[nidx] {
                        visited[nidx] = true;
                        queue.push_back(nidx);
                    }
                }
            }
        }
        components.push(component);
    }
    components
}

fn component_bbox(component: &[(u32, u32)]) -> BoundingBox {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    for &(x, y) in component {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    BoundingBox::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
}

/// Fill each row between the component's leftmost and rightmost edge pixel.
/// Turns an edge outline into a solid region mask.
fn span_fill_mask(component: &[(u32, u32)], w: u32, h: u32) -> SubjectMask {
    let mut spans: std::collections::HashMap<u32, (u32, u32)> = std::collections::HashMap::new();
    for &(x, y) in component {
        spans
            .entry(y)
            .and_modify(|(lo, hi)| {
                *lo = (*lo).min(x);
                *hi = (*hi).max(x);
            })
            .or_insert((x, x));
    }

    let mut mask = SubjectMask::filled(w, h, 0);
    for (y, (lo, hi)) in spans {
        for x in lo..=hi {
            mask.set(x, y, 255);
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn rect_image() -> RgbaImage {
        // Dark canvas with one bright 20x16 rectangle
        RgbaImage::from_fn(64, 64, |x, y| {
            if (20..40).contains(&x) && (24..40).contains(&y) {
                Rgba([240, 240, 240, 255])
            } else {
                Rgba([10, 10, 10, 255])
            }
        })
    }

    #[test]
    fn test_contour_detector_finds_bright_rectangle() {
        let detector = ContourDetector {
            min_area: 20,
            ..Default::default()
        };
        let subjects = detector.detect(&rect_image()).unwrap();
        assert_eq!(subjects.len(), 1);
        let subject = &subjects[0];
        assert_eq!(subject.kind, SubjectKind::Object);
        assert!(subject.bbox.contains(30, 30));
        assert_eq!(subject.mask.width(), 64);
        assert_eq!(subject.mask.get(30, 30), 255);
        assert_eq!(subject.mask.get(2, 2), 0);
    }

    #[test]
    fn test_contour_detector_flat_image_has_no_subjects() {
        let img = RgbaImage::from_pixel(32, 32, Rgba([128, 128, 128, 255]));
        let subjects = ContourDetector::new().detect(&img).unwrap();
        assert!(subjects.is_empty());
    }

    #[test]
    fn test_min_area_filters_small_regions() {
        let detector = ContourDetector {
            min_area: 1_000_000,
            ..Default::default()
        };
        let subjects = detector.detect(&rect_image()).unwrap();
        assert!(subjects.is_empty());
    }
}
