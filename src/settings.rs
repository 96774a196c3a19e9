//! Variants, animation settings and the single update entry point.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LoopError, Result};
use crate::timing::Speed;

pub const SIZE_RANGE: RangeInclusive<u32> = 100..=1000;
pub const PAUSE_RANGE: RangeInclusive<u32> = 0..=5000;
pub const LINE_THICKNESS_RANGE: RangeInclusive<f64> = 0.5..=1000.0;
pub const LINE_LENGTH_RANGE: RangeInclusive<u32> = 1..=1000;
pub const INTERVAL_RANGE: RangeInclusive<u32> = 500..=20_000;
pub const TRANSITION_RANGE: RangeInclusive<u32> = 100..=5000;
pub const STEP_RANGE: RangeInclusive<u32> = 500..=10_000;

/// The five animation variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Continuous horizontal loop of one image.
    Loop,
    /// One image spinning in place.
    Rotation,
    /// A colored line shrinking downward, then holding.
    FallingLine,
    /// Cross-fading stack of images.
    Slideshow,
    /// Center-focus carousel with seamless slide extension.
    CoverFlow,
}

impl Variant {
    pub const ALL: [Variant; 5] = [
        Variant::Loop,
        Variant::Rotation,
        Variant::FallingLine,
        Variant::Slideshow,
        Variant::CoverFlow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Variant::Loop => "loop",
            Variant::Rotation => "rotation",
            Variant::FallingLine => "falling-line",
            Variant::Slideshow => "slideshow",
            Variant::CoverFlow => "cover-flow",
        }
    }

    /// How many images the variant holds at most.
    pub fn max_images(self) -> usize {
        match self {
            Variant::Loop | Variant::Rotation => 1,
            Variant::FallingLine => 0,
            Variant::Slideshow | Variant::CoverFlow => 6,
        }
    }

    /// Images required before the preview and embed sections appear.
    pub fn min_images(self) -> usize {
        match self {
            Variant::Loop | Variant::Rotation => 1,
            Variant::FallingLine => 0,
            Variant::Slideshow => 2,
            Variant::CoverFlow => 3,
        }
    }

    /// Single-image variants swap the image on every successful load
    /// instead of appending to a list.
    pub fn replaces_on_load(self) -> bool {
        self.max_images() == 1
    }

    pub fn uses_images(self) -> bool {
        self.max_images() > 0
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| format!("unknown variant '{s}'"))
    }
}

/// A `#RGB` or `#RRGGBB` color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    pub fn parse(raw: &str) -> Result<Self> {
        let value = raw.trim();
        let digits = value.strip_prefix('#').unwrap_or("");
        let well_formed = matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit());
        if well_formed {
            Ok(HexColor(value.to_string()))
        } else {
            Err(LoopError::out_of_range(
                "color",
                format!("expected #RGB or #RRGGBB (got {value:?})"),
            ))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for HexColor {
    fn default() -> Self {
        HexColor("#000000".to_string())
    }
}

impl TryFrom<String> for HexColor {
    type Error = LoopError;

    fn try_from(value: String) -> Result<Self> {
        HexColor::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> String {
        color.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Every tunable of every variant. Each variant reads the fields it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationSettings {
    pub speed: Speed,
    pub width: u32,
    pub height: u32,
    pub pause_ms: u32,
    pub line_thickness: f64,
    pub line_length: u32,
    pub color: HexColor,
    pub interval_ms: u32,
    pub transition_ms: u32,
    pub step_ms: u32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            speed: Speed::default(),
            width: 300,
            height: 220,
            pause_ms: 100,
            line_thickness: 2.0,
            line_length: 100,
            color: HexColor::default(),
            interval_ms: 2000,
            transition_ms: 600,
            step_ms: 3000,
        }
    }
}

impl AnimationSettings {
    /// Defaults tuned per variant: the list variants embed a larger frame.
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Slideshow | Variant::CoverFlow => Self {
                width: 800,
                height: 450,
                ..Self::default()
            },
            _ => Self::default(),
        }
    }

    /// Apply a partial update. Either every field of the patch lands or
    /// none does.
    pub fn apply(&mut self, patch: &SettingsPatch) -> Result<()> {
        let mut next = self.clone();

        if let Some(speed) = patch.speed {
            next.speed = Speed::clamped(speed);
        }
        if let Some(width) = patch.width {
            next.width = checked("width", width, SIZE_RANGE)?;
        }
        if let Some(height) = patch.height {
            next.height = checked("height", height, SIZE_RANGE)?;
        }
        if let Some(pause) = patch.pause_ms {
            next.pause_ms = clamped(pause, PAUSE_RANGE);
        }
        if let Some(thickness) = patch.line_thickness {
            if !thickness.is_finite() {
                return Err(LoopError::out_of_range("line_thickness", "must be a number"));
            }
            next.line_thickness = thickness.clamp(*LINE_THICKNESS_RANGE.start(), *LINE_THICKNESS_RANGE.end());
        }
        if let Some(length) = patch.line_length {
            if !length.is_finite() {
                return Err(LoopError::out_of_range("line_length", "must be a number"));
            }
            next.line_length = clamped(length.round() as i64, LINE_LENGTH_RANGE);
        }
        if let Some(color) = &patch.color {
            next.color = HexColor::parse(color)?;
        }
        if let Some(interval) = patch.interval_ms {
            next.interval_ms = clamped(interval, INTERVAL_RANGE);
        }
        if let Some(transition) = patch.transition_ms {
            next.transition_ms = clamped(transition, TRANSITION_RANGE);
        }
        if let Some(step) = patch.step_ms {
            next.step_ms = clamped(step, STEP_RANGE);
        }

        *self = next;
        Ok(())
    }
}

fn clamped(value: i64, range: RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start() as i64, *range.end() as i64) as u32
}

fn checked(field: &'static str, value: i64, range: RangeInclusive<u32>) -> Result<u32> {
    if value >= *range.start() as i64 && value <= *range.end() as i64 {
        Ok(value as u32)
    } else {
        Err(LoopError::out_of_range(
            field,
            format!("must be between {} and {} (got {value})", range.start(), range.end()),
        ))
    }
}

/// A partial settings update as it arrives from a form, a config file or
/// the dev server. Raw values; [`AnimationSettings::apply`] clamps or
/// rejects them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsPatch {
    pub speed: Option<i64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub pause_ms: Option<i64>,
    pub line_thickness: Option<f64>,
    pub line_length: Option<f64>,
    pub color: Option<String>,
    pub interval_ms: Option<i64>,
    pub transition_ms: Option<i64>,
    pub step_ms: Option<i64>,
}

impl SettingsPatch {
    pub fn speed(speed: i64) -> Self {
        Self {
            speed: Some(speed),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
