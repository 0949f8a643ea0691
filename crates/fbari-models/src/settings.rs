//! Edit settings: the declarative parameters for one pipeline run.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::style::BackgroundStyle;

/// Default background color (hex), used when the client sends none or garbage.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#0066FF";

/// Declarative edit parameters applied by the pipeline.
///
/// Numeric adjustment fields are integers in `[-100, 100]`; intensities are
/// floats in `[0, 1]`. Out-of-range values are rejected by the external
/// validator before reaching the pipeline, but [`EditSettings::clamped`]
/// defensively clamps anyway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct EditSettings {
    /// Brightness adjustment (-100 to 100, 0 = unchanged)
    pub brightness: i32,
    /// Contrast adjustment (-100 to 100, 0 = unchanged)
    pub contrast: i32,
    /// Saturation adjustment (-100 to 100, 0 = unchanged)
    pub saturation: i32,
    /// Vibrance adjustment (-100 to 100, 0 = unchanged)
    pub vibrance: i32,
    /// Exposure adjustment (-100 to 100, 0 = unchanged)
    pub exposure: i32,
    /// Compression quality (1 to 100); honored by JPEG and WEBP output
    pub quality: u8,
    /// Background color as "#RRGGBB"
    pub background_color: String,
    /// Procedural background style
    pub background_style: BackgroundStyle,
    /// Optional color grade name (see the LUT catalog); unknown names are a no-op
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_grade: Option<String>,
    /// Blend intensity for the color grade (0 = original, 1 = fully graded)
    pub grade_intensity: f32,
    /// Optional stylistic filter name; unknown names are a no-op
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Blend intensity for the filter (0 = original, 1 = full effect)
    pub filter_intensity: f32,
    /// Output encoding for saved artifacts
    pub output_format: OutputFormat,
}

impl Default for EditSettings {
    fn default() -> Self {
        Self {
            brightness: 0,
            contrast: 0,
            saturation: 0,
            vibrance: 0,
            exposure: 0,
            quality: 85,
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            background_style: BackgroundStyle::default(),
            color_grade: None,
            grade_intensity: 1.0,
            filter: None,
            filter_intensity: 1.0,
            output_format: OutputFormat::default(),
        }
    }
}

impl EditSettings {
    /// Return a copy with every field forced into its valid range.
    ///
    /// The pipeline runs on clamped settings so a bypassed validator can
    /// never push an adjustment outside the documented domain.
    pub fn clamped(&self) -> Self {
        Self {
            brightness: self.brightness.clamp(-100, 100),
            contrast: self.contrast.clamp(-100, 100),
            saturation: self.saturation.clamp(-100, 100),
            vibrance: self.vibrance.clamp(-100, 100),
            exposure: self.exposure.clamp(-100, 100),
            quality: self.quality.clamp(1, 100),
            background_color: self.background_color.clone(),
            background_style: self.background_style,
            color_grade: self.color_grade.clone(),
            grade_intensity: self.grade_intensity.clamp(0.0, 1.0),
            filter: self.filter.clone(),
            filter_intensity: self.filter_intensity.clamp(0.0, 1.0),
            output_format: self.output_format,
        }
    }

    /// True when no adjustment, grade, filter or background change is requested.
    pub fn is_identity(&self) -> bool {
        self.brightness == 0
            && self.contrast == 0
            && self.saturation == 0
            && self.vibrance == 0
            && self.exposure == 0
            && self.color_grade.is_none()
            && self.filter.is_none()
    }

    /// Parsed background color; falls back to the default blue on garbage
    /// input rather than failing (unknown catalog values degrade silently).
    pub fn background_rgb(&self) -> [u8; 3] {
        parse_hex_color(&self.background_color)
            .unwrap_or_else(|| parse_hex_color(DEFAULT_BACKGROUND_COLOR).unwrap_or([0, 102, 255]))
    }
}

/// Parse a "#RRGGBB" color string.
pub fn parse_hex_color(s: &str) -> Option<[u8; 3]> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some([r, g, b])
}

/// Supported output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    Webp,
}

impl OutputFormat {
    /// File extension used for stored artifacts.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
        }
    }

    /// Whether the encoder honors the quality setting.
    pub fn honors_quality(&self) -> bool {
        matches!(self, OutputFormat::Jpeg | OutputFormat::Webp)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Png => "PNG",
            OutputFormat::Webp => "WEBP",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = OutputFormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "JPEG" | "JPG" => Ok(OutputFormat::Jpeg),
            "PNG" => Ok(OutputFormat::Png),
            "WEBP" => Ok(OutputFormat::Webp),
            _ => Err(OutputFormatParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unsupported output format: {0}")]
pub struct OutputFormatParseError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_identity() {
        let settings = EditSettings::default();
        assert!(settings.is_identity());
        assert_eq!(settings.quality, 85);
        assert_eq!(settings.output_format, OutputFormat::Jpeg);
    }

    #[test]
    fn test_clamped_forces_ranges() {
        let settings = EditSettings {
            brightness: 250,
            contrast: -300,
            quality: 0,
            grade_intensity: 1.7,
            filter_intensity: -0.5,
            ..Default::default()
        };
        let clamped = settings.clamped();
        assert_eq!(clamped.brightness, 100);
        assert_eq!(clamped.contrast, -100);
        assert_eq!(clamped.quality, 1);
        assert_eq!(clamped.grade_intensity, 1.0);
        assert_eq!(clamped.filter_intensity, 0.0);
    }

    #[test]
    fn test_wire_format_camel_case() {
        let json = r##"{
            "brightness": 10,
            "contrast": -5,
            "saturation": 0,
            "vibrance": 0,
            "exposure": 0,
            "quality": 90,
            "backgroundColor": "#FF0000",
            "backgroundStyle": "gradient",
            "colorGrade": "vintage",
            "gradeIntensity": 0.5,
            "filter": "sepia",
            "filterIntensity": 0.8
        }"##;
        let settings: EditSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.brightness, 10);
        assert_eq!(settings.background_style, BackgroundStyle::Gradient);
        assert_eq!(settings.color_grade.as_deref(), Some("vintage"));
        assert_eq!(settings.filter_intensity, 0.8);
        // outputFormat omitted on the wire defaults to JPEG
        assert_eq!(settings.output_format, OutputFormat::Jpeg);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#0066FF"), Some([0, 102, 255]));
        assert_eq!(parse_hex_color("#ffffff"), Some([255, 255, 255]));
        assert_eq!(parse_hex_color("0066FF"), None);
        assert_eq!(parse_hex_color("#06F"), None);
        assert_eq!(parse_hex_color("#GGGGGG"), None);
    }

    #[test]
    fn test_background_rgb_falls_back_on_garbage() {
        let settings = EditSettings {
            background_color: "not-a-color".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.background_rgb(), [0, 102, 255]);
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JPEG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("webp".parse::<OutputFormat>().unwrap(), OutputFormat::Webp);
        assert!("TIFF".parse::<OutputFormat>().is_err());
    }
}
