//! Timing model: speed scalar → cycle durations, hold fractions and the
//! qualitative speed label shown next to the slider.
//!
//! Everything here is pure. Callers clamp or reject out-of-range input before
//! it reaches this module; a valid [`Speed`] always yields a timing.

use serde::{Deserialize, Serialize};

use crate::error::{LoopError, Result};
use crate::settings::{AnimationSettings, Variant};

pub const SPEED_MIN: u8 = 1;
pub const SPEED_MAX: u8 = 50;
pub const DEFAULT_SPEED: u8 = 25;

/// Cycle length at the slowest speed.
pub const SLOWEST_CYCLE_MS: u32 = 100_000;
/// Cycle length at the fastest speed.
pub const FASTEST_CYCLE_MS: u32 = 100;

/// The falling-line's visible shrink runs this many times faster than the
/// base cycle.
pub const FALLING_LINE_COMPRESSION: u32 = 6;

/// Animation speed on the 1 (slowest) to 50 (fastest) scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Speed(u8);

impl Speed {
    pub const SLOWEST: Speed = Speed(SPEED_MIN);
    pub const FASTEST: Speed = Speed(SPEED_MAX);

    pub fn new(value: u8) -> Result<Self> {
        if (SPEED_MIN..=SPEED_MAX).contains(&value) {
            Ok(Speed(value))
        } else {
            Err(LoopError::out_of_range(
                "speed",
                format!("must be between {SPEED_MIN} and {SPEED_MAX} (got {value})"),
            ))
        }
    }

    /// Clamp an arbitrary slider reading into range.
    pub fn clamped(value: i64) -> Self {
        Speed(value.clamp(SPEED_MIN as i64, SPEED_MAX as i64) as u8)
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Speed {
    fn default() -> Self {
        Speed(DEFAULT_SPEED)
    }
}

impl TryFrom<u8> for Speed {
    type Error = LoopError;

    fn try_from(value: u8) -> Result<Self> {
        Speed::new(value)
    }
}

impl From<Speed> for u8 {
    fn from(speed: Speed) -> u8 {
        speed.0
    }
}

/// Language used when rendering a [`SpeedLabel`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ja,
}

/// The ten ordered speed categories, slowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpeedLabel {
    ExtremelySlow,
    VerySlow,
    QuiteSlow,
    Slow,
    SomewhatSlow,
    Normal,
    SomewhatFast,
    Fast,
    VeryFast,
    ExtremelyFast,
}

impl SpeedLabel {
    pub const ALL: [SpeedLabel; 10] = [
        SpeedLabel::ExtremelySlow,
        SpeedLabel::VerySlow,
        SpeedLabel::QuiteSlow,
        SpeedLabel::Slow,
        SpeedLabel::SomewhatSlow,
        SpeedLabel::Normal,
        SpeedLabel::SomewhatFast,
        SpeedLabel::Fast,
        SpeedLabel::VeryFast,
        SpeedLabel::ExtremelyFast,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SpeedLabel::ExtremelySlow => "extremely slow",
            SpeedLabel::VerySlow => "very slow",
            SpeedLabel::QuiteSlow => "quite slow",
            SpeedLabel::Slow => "slow",
            SpeedLabel::SomewhatSlow => "somewhat slow",
            SpeedLabel::Normal => "normal",
            SpeedLabel::SomewhatFast => "somewhat fast",
            SpeedLabel::Fast => "fast",
            SpeedLabel::VeryFast => "very fast",
            SpeedLabel::ExtremelyFast => "extremely fast",
        }
    }

    pub fn as_ja(self) -> &'static str {
        match self {
            SpeedLabel::ExtremelySlow => "極めて遅い",
            SpeedLabel::VerySlow => "非常に遅い",
            SpeedLabel::QuiteSlow => "とても遅い",
            SpeedLabel::Slow => "遅い",
            SpeedLabel::SomewhatSlow => "やや遅い",
            SpeedLabel::Normal => "普通",
            SpeedLabel::SomewhatFast => "やや速い",
            SpeedLabel::Fast => "速い",
            SpeedLabel::VeryFast => "非常に速い",
            SpeedLabel::ExtremelyFast => "極めて速い",
        }
    }

    pub fn text(self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => self.as_str(),
            Locale::Ja => self.as_ja(),
        }
    }
}

impl std::fmt::Display for SpeedLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper-inclusive band limits over the speed domain, one per label.
///
/// Bands are tested in ascending order and the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelBands([u8; 10]);

impl LabelBands {
    /// Ten even bands of five.
    pub const STANDARD: LabelBands = LabelBands([5, 10, 15, 20, 25, 30, 35, 40, 45, 50]);
    /// The falling line is only interesting near the fast end, so the slow
    /// half collapses into one band and the last five are one step wide.
    pub const FALLING_LINE: LabelBands = LabelBands([25, 30, 35, 40, 45, 46, 47, 48, 49, 50]);

    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::FallingLine => LabelBands::FALLING_LINE,
            _ => LabelBands::STANDARD,
        }
    }

    pub fn label(&self, speed: Speed) -> SpeedLabel {
        for (upper, label) in self.0.iter().zip(SpeedLabel::ALL) {
            if speed.get() <= *upper {
                return label;
            }
        }
        SpeedLabel::ExtremelyFast
    }
}

/// Durations derived from one settings snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedTiming {
    pub cycle_duration_ms: u32,
    /// Fraction of the cycle spent in motion before the hold segment.
    pub hold_fraction: f64,
    pub label: SpeedLabel,
}

impl DerivedTiming {
    /// Length of the motion segment in milliseconds.
    pub fn active_ms(&self) -> f64 {
        self.cycle_duration_ms as f64 * self.hold_fraction
    }
}

/// Single-phase cycle length: linear from 100000 ms at speed 1 down to
/// 100 ms at speed 50.
pub fn base_cycle_ms(speed: Speed) -> u32 {
    let steps_from_fastest = (SPEED_MAX - speed.get()) as u32;
    FASTEST_CYCLE_MS
        + steps_from_fastest * (SLOWEST_CYCLE_MS - FASTEST_CYCLE_MS) / (SPEED_MAX - SPEED_MIN) as u32
}

/// Speed-only timing for the continuous variants.
pub fn derive_speed_timing(speed: Speed) -> DerivedTiming {
    DerivedTiming {
        cycle_duration_ms: base_cycle_ms(speed),
        hold_fraction: 1.0,
        label: LabelBands::STANDARD.label(speed),
    }
}

/// Falling-line timing: a compressed shrink phase followed by `pause_ms`.
pub fn derive_falling_line_timing(speed: Speed, pause_ms: u32) -> DerivedTiming {
    let active = (base_cycle_ms(speed) as f64 / FALLING_LINE_COMPRESSION as f64).round() as u32;
    let total = active + pause_ms;
    let hold_fraction = if total == 0 {
        1.0
    } else {
        (active as f64 / total as f64).clamp(0.0, 1.0)
    };
    DerivedTiming {
        cycle_duration_ms: total,
        hold_fraction,
        label: LabelBands::FALLING_LINE.label(speed),
    }
}

/// Derive the timing a variant animates with from a settings snapshot.
pub fn derive_timing(variant: Variant, settings: &AnimationSettings) -> DerivedTiming {
    let speed = settings.speed;
    match variant {
        Variant::Loop | Variant::Rotation => derive_speed_timing(speed),
        Variant::FallingLine => derive_falling_line_timing(speed, settings.pause_ms),
        Variant::Slideshow => {
            let cycle = settings.interval_ms + settings.transition_ms;
            DerivedTiming {
                cycle_duration_ms: cycle,
                hold_fraction: settings.transition_ms as f64 / cycle.max(1) as f64,
                label: LabelBands::STANDARD.label(speed),
            }
        }
        Variant::CoverFlow => DerivedTiming {
            cycle_duration_ms: settings.step_ms,
            hold_fraction: 1.0,
            label: LabelBands::STANDARD.label(speed),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_speeds() -> impl Iterator<Item = Speed> {
        (SPEED_MIN..=SPEED_MAX).map(|s| Speed::new(s).unwrap())
    }

    #[test]
    fn endpoints_hit_declared_range() {
        assert_eq!(derive_speed_timing(Speed::SLOWEST).cycle_duration_ms, 100_000);
        assert_eq!(derive_speed_timing(Speed::FASTEST).cycle_duration_ms, 100);
    }

    #[test]
    fn cycle_strictly_decreasing() {
        let cycles: Vec<u32> = all_speeds().map(|s| base_cycle_ms(s)).collect();
        for pair in cycles.windows(2) {
            assert!(pair[0] > pair[1], "{} should exceed {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn labels_monotonic_and_cover_ten() {
        for bands in [LabelBands::STANDARD, LabelBands::FALLING_LINE] {
            let labels: Vec<SpeedLabel> = all_speeds().map(|s| bands.label(s)).collect();
            for pair in labels.windows(2) {
                assert!(pair[0] <= pair[1]);
            }
            assert_eq!(labels[0], SpeedLabel::ExtremelySlow);
            assert_eq!(*labels.last().unwrap(), SpeedLabel::ExtremelyFast);
            let mut distinct = labels.clone();
            distinct.dedup();
            assert_eq!(distinct.len(), 10);
        }
    }

    #[test]
    fn band_boundaries_are_upper_inclusive() {
        let s = |v| Speed::new(v).unwrap();
        assert_eq!(LabelBands::STANDARD.label(s(5)), SpeedLabel::ExtremelySlow);
        assert_eq!(LabelBands::STANDARD.label(s(6)), SpeedLabel::VerySlow);
        assert_eq!(LabelBands::STANDARD.label(s(25)), SpeedLabel::SomewhatSlow);
        assert_eq!(LabelBands::STANDARD.label(s(26)), SpeedLabel::Normal);
        assert_eq!(LabelBands::FALLING_LINE.label(s(25)), SpeedLabel::ExtremelySlow);
        assert_eq!(LabelBands::FALLING_LINE.label(s(49)), SpeedLabel::VeryFast);
    }

    #[test]
    fn falling_line_hold_fraction() {
        // speed 50: base 100 ms, active round(100 / 6) = 17
        let t = derive_falling_line_timing(Speed::FASTEST, 100);
        assert_eq!(t.cycle_duration_ms, 117);
        assert!((t.hold_fraction - 17.0 / 117.0).abs() < 1e-9);

        let no_pause = derive_falling_line_timing(Speed::default(), 0);
        assert_eq!(no_pause.hold_fraction, 1.0);
    }

    #[test]
    fn speed_rejects_and_clamps() {
        assert!(Speed::new(0).is_err());
        assert!(Speed::new(51).is_err());
        assert_eq!(Speed::clamped(-4).get(), 1);
        assert_eq!(Speed::clamped(400).get(), 50);
    }

    #[test]
    fn japanese_labels_match_slider_copy() {
        assert_eq!(SpeedLabel::ExtremelySlow.text(Locale::Ja), "極めて遅い");
        assert_eq!(SpeedLabel::Normal.text(Locale::En), "normal");
    }
}
