//! Detected subjects: kind, confidence, bounding box and per-pixel mask.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Categories a detector can assign to a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    Person,
    Object,
    Background,
    Sky,
    Water,
}

impl SubjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectKind::Person => "person",
            SubjectKind::Object => "object",
            SubjectKind::Background => "background",
            SubjectKind::Sky => "sky",
            SubjectKind::Water => "water",
        }
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubjectKind {
    type Err = SubjectKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "person" => Ok(SubjectKind::Person),
            "object" => Ok(SubjectKind::Object),
            "background" => Ok(SubjectKind::Background),
            "sky" => Ok(SubjectKind::Sky),
            "water" => Ok(SubjectKind::Water),
            _ => Err(SubjectKindParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown subject kind: {0}")]
pub struct SubjectKindParseError(pub String);

/// Axis-aligned bounding box in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }
}

/// Per-pixel membership map for a detected subject.
///
/// Values are soft alpha in `0..=255`; a binary mask uses only 0 and 255.
/// Dimensions always match the source image the subject was detected in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SubjectMask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl SubjectMask {
    /// Create a mask filled with a constant value.
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; (width * height) as usize],
        }
    }

    /// Create a mask from raw row-major alpha data.
    ///
    /// Returns `None` if `data.len() != width * height`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self { width, height, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, value: u8) {
        self.data[(y * self.width + x) as usize] = value;
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Fraction of pixels with nonzero membership.
    pub fn coverage(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let set = self.data.iter().filter(|&&v| v > 0).count();
        set as f32 / self.data.len() as f32
    }
}

/// One detected subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Subject {
    /// Category assigned by the detector
    #[serde(rename = "type")]
    pub kind: SubjectKind,
    /// Detector confidence in [0, 1]
    pub confidence: f32,
    /// Bounding box in pixel units
    pub bbox: BoundingBox,
    /// Per-pixel mask, same dimensions as the source image
    pub mask: SubjectMask,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_filled_and_coverage() {
        let mask = SubjectMask::filled(4, 4, 255);
        assert_eq!(mask.coverage(), 1.0);
        let empty = SubjectMask::filled(4, 4, 0);
        assert_eq!(empty.coverage(), 0.0);
    }

    #[test]
    fn test_mask_from_raw_rejects_bad_length() {
        assert!(SubjectMask::from_raw(3, 3, vec![0; 8]).is_none());
        assert!(SubjectMask::from_raw(3, 3, vec![0; 9]).is_some());
    }

    #[test]
    fn test_mask_get_set() {
        let mut mask = SubjectMask::filled(8, 4, 0);
        mask.set(7, 3, 200);
        assert_eq!(mask.get(7, 3), 200);
        assert_eq!(mask.get(0, 0), 0);
    }

    #[test]
    fn test_bbox_contains() {
        let bbox = BoundingBox::new(10, 10, 5, 5);
        assert!(bbox.contains(10, 10));
        assert!(bbox.contains(14, 14));
        assert!(!bbox.contains(15, 15));
        assert_eq!(bbox.area(), 25);
    }

    #[test]
    fn test_subject_serde_uses_type_field() {
        let subject = Subject {
            kind: SubjectKind::Person,
            confidence: 0.9,
            bbox: BoundingBox::new(0, 0, 2, 2),
            mask: SubjectMask::filled(2, 2, 255),
        };
        let json = serde_json::to_value(&subject).unwrap();
        assert_eq!(json["type"], "person");
        assert_eq!(json["bbox"]["width"], 2);
    }
}
