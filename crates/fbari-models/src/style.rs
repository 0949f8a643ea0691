//! Catalog names: background styles, color grades and stylistic filters.
//!
//! Internally everything is tagged-variant dispatch; the string boundary is
//! where client-supplied names are parsed, and unknown names degrade to a
//! no-op/default there rather than failing.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Procedural background styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundStyle {
    /// Flat fill with the requested color
    #[default]
    Solid,
    /// Vertical gradient ramp
    Gradient,
    /// Sinusoidal wave interference pattern
    Wave,
    /// Dark base with blurred neon lines
    Neon,
    /// Radial-ripple metallic sheen
    Metallic,
    /// Seeded random rectangles and circles
    Geometric,
    /// Radial studio-light falloff
    Studio,
    /// Seeded out-of-focus light discs
    Bokeh,
}

impl BackgroundStyle {
    pub const ALL: &'static [BackgroundStyle] = &[
        BackgroundStyle::Solid,
        BackgroundStyle::Gradient,
        BackgroundStyle::Wave,
        BackgroundStyle::Neon,
        BackgroundStyle::Metallic,
        BackgroundStyle::Geometric,
        BackgroundStyle::Studio,
        BackgroundStyle::Bokeh,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackgroundStyle::Solid => "solid",
            BackgroundStyle::Gradient => "gradient",
            BackgroundStyle::Wave => "wave",
            BackgroundStyle::Neon => "neon",
            BackgroundStyle::Metallic => "metallic",
            BackgroundStyle::Geometric => "geometric",
            BackgroundStyle::Studio => "studio",
            BackgroundStyle::Bokeh => "bokeh",
        }
    }

    /// Parse a client-supplied name, degrading to `Solid` for unknown input.
    pub fn from_name_or_default(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for BackgroundStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BackgroundStyle {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "solid" => Ok(BackgroundStyle::Solid),
            "gradient" => Ok(BackgroundStyle::Gradient),
            "wave" => Ok(BackgroundStyle::Wave),
            "neon" => Ok(BackgroundStyle::Neon),
            "metallic" => Ok(BackgroundStyle::Metallic),
            "geometric" => Ok(BackgroundStyle::Geometric),
            "studio" => Ok(BackgroundStyle::Studio),
            "bokeh" => Ok(BackgroundStyle::Bokeh),
            _ => Err(StyleParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown style name: {0}")]
pub struct StyleParseError(pub String);

/// Named color-grade curves backed by the LUT catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum GradeName {
    /// Warm cinematic tone (reds lifted, blues pulled)
    Warm,
    /// Cool cinematic tone (blues lifted, reds pulled)
    Cool,
    /// Faded S-curve with a warm cast
    Vintage,
    /// High-contrast grayscale-leaning curve
    Dramatic,
    /// Grayscale tinted toward blue
    MonoBlue,
    /// Crushed shadows, boosted highlights, magenta/blue cast
    Neon,
}

impl GradeName {
    pub const ALL: &'static [GradeName] = &[
        GradeName::Warm,
        GradeName::Cool,
        GradeName::Vintage,
        GradeName::Dramatic,
        GradeName::MonoBlue,
        GradeName::Neon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GradeName::Warm => "cinematic_warm",
            GradeName::Cool => "cinematic_cool",
            GradeName::Vintage => "vintage",
            GradeName::Dramatic => "dramatic",
            GradeName::MonoBlue => "mono_blue",
            GradeName::Neon => "neon",
        }
    }
}

impl fmt::Display for GradeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GradeName {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cinematic_warm" | "warm" => Ok(GradeName::Warm),
            "cinematic_cool" | "cool" => Ok(GradeName::Cool),
            "vintage" => Ok(GradeName::Vintage),
            "dramatic" => Ok(GradeName::Dramatic),
            "mono_blue" => Ok(GradeName::MonoBlue),
            "neon" => Ok(GradeName::Neon),
            _ => Err(StyleParseError(s.to_string())),
        }
    }
}

/// Stylistic filters in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Blur,
    Sharpen,
    Emboss,
    EdgeDetect,
    Vintage,
    Sepia,
    BlackWhite,
    CrossProcess,
    Lomography,
    Orton,
    Hdr,
    OilPainting,
    Watercolor,
    PencilSketch,
    Cartoon,
    PopArt,
}

impl FilterKind {
    pub const ALL: &'static [FilterKind] = &[
        FilterKind::Blur,
        FilterKind::Sharpen,
        FilterKind::Emboss,
        FilterKind::EdgeDetect,
        FilterKind::Vintage,
        FilterKind::Sepia,
        FilterKind::BlackWhite,
        FilterKind::CrossProcess,
        FilterKind::Lomography,
        FilterKind::Orton,
        FilterKind::Hdr,
        FilterKind::OilPainting,
        FilterKind::Watercolor,
        FilterKind::PencilSketch,
        FilterKind::Cartoon,
        FilterKind::PopArt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::Blur => "blur",
            FilterKind::Sharpen => "sharpen",
            FilterKind::Emboss => "emboss",
            FilterKind::EdgeDetect => "edge_detect",
            FilterKind::Vintage => "vintage",
            FilterKind::Sepia => "sepia",
            FilterKind::BlackWhite => "black_white",
            FilterKind::CrossProcess => "cross_process",
            FilterKind::Lomography => "lomography",
            FilterKind::Orton => "orton",
            FilterKind::Hdr => "hdr",
            FilterKind::OilPainting => "oil_painting",
            FilterKind::Watercolor => "watercolor",
            FilterKind::PencilSketch => "pencil_sketch",
            FilterKind::Cartoon => "cartoon",
            FilterKind::PopArt => "pop_art",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "blur" => Ok(FilterKind::Blur),
            "sharpen" => Ok(FilterKind::Sharpen),
            "emboss" => Ok(FilterKind::Emboss),
            "edge_detect" => Ok(FilterKind::EdgeDetect),
            "vintage" => Ok(FilterKind::Vintage),
            "sepia" => Ok(FilterKind::Sepia),
            "black_white" => Ok(FilterKind::BlackWhite),
            "cross_process" => Ok(FilterKind::CrossProcess),
            "lomography" => Ok(FilterKind::Lomography),
            "orton" => Ok(FilterKind::Orton),
            "hdr" => Ok(FilterKind::Hdr),
            "oil_painting" => Ok(FilterKind::OilPainting),
            "watercolor" => Ok(FilterKind::Watercolor),
            "pencil_sketch" => Ok(FilterKind::PencilSketch),
            "cartoon" => Ok(FilterKind::Cartoon),
            "pop_art" => Ok(FilterKind::PopArt),
            _ => Err(StyleParseError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_style_parse() {
        assert_eq!("bokeh".parse::<BackgroundStyle>().unwrap(), BackgroundStyle::Bokeh);
        assert_eq!("GRADIENT".parse::<BackgroundStyle>().unwrap(), BackgroundStyle::Gradient);
        assert!("plaid".parse::<BackgroundStyle>().is_err());
    }

    #[test]
    fn test_background_style_unknown_degrades_to_solid() {
        assert_eq!(BackgroundStyle::from_name_or_default("plaid"), BackgroundStyle::Solid);
        assert_eq!(BackgroundStyle::from_name_or_default("wave"), BackgroundStyle::Wave);
    }

    #[test]
    fn test_grade_name_parse_accepts_both_spellings() {
        assert_eq!("cinematic_warm".parse::<GradeName>().unwrap(), GradeName::Warm);
        assert_eq!("warm".parse::<GradeName>().unwrap(), GradeName::Warm);
        assert_eq!("mono_blue".parse::<GradeName>().unwrap(), GradeName::MonoBlue);
        assert!("technicolor".parse::<GradeName>().is_err());
    }

    #[test]
    fn test_filter_kind_roundtrip() {
        for kind in FilterKind::ALL {
            assert_eq!(kind.as_str().parse::<FilterKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn test_style_serde_names() {
        let json = serde_json::to_string(&BackgroundStyle::Geometric).unwrap();
        assert_eq!(json, "\"geometric\"");
        let kind: FilterKind = serde_json::from_str("\"pencil_sketch\"").unwrap();
        assert_eq!(kind, FilterKind::PencilSketch);
    }
}
