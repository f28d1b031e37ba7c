use serde::{Deserialize, Serialize};
use std::{fmt::Display, ops::RangeInclusive, time::Duration};
use strum::VariantArray;

/// tempo in beats per minute, always within [`Bpm::RANGE`]
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(from = "u16", into = "u16")]
pub struct Bpm(u16);

impl Bpm {
    pub const MIN: u16 = 40;
    pub const MAX: u16 = 240;
    pub const RANGE: RangeInclusive<u16> = Self::MIN..=Self::MAX;

    /// out-of-range values are clamped
    #[must_use]
    pub fn new(bpm: u16) -> Self {
        Self(bpm.clamp(Self::MIN, Self::MAX))
    }

    #[must_use]
    pub fn saturating_add_signed(self, delta: i16) -> Self {
        Self::new(self.0.saturating_add_signed(delta))
    }

    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl Default for Bpm {
    fn default() -> Self {
        Self(120)
    }
}

impl From<u16> for Bpm {
    fn from(value: u16) -> Self {
        Self::new(value)
    }
}

impl From<Bpm> for u16 {
    fn from(value: Bpm) -> Self {
        value.0
    }
}

impl Display for Bpm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// how many ticks are played per beat
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    strum::Display,
    VariantArray,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Subdivision {
    #[default]
    #[strum(to_string = "1x")]
    X1,
    #[strum(to_string = "2x")]
    X2,
    #[strum(to_string = "4x")]
    X4,
    #[strum(to_string = "8x")]
    X8,
}

impl Subdivision {
    #[must_use]
    pub const fn multiplier(self) -> u8 {
        match self {
            Self::X1 => 1,
            Self::X2 => 2,
            Self::X4 => 4,
            Self::X8 => 8,
        }
    }

    #[must_use]
    pub const fn from_multiplier(multiplier: u8) -> Option<Self> {
        match multiplier {
            1 => Some(Self::X1),
            2 => Some(Self::X2),
            4 => Some(Self::X4),
            8 => Some(Self::X8),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Subdivision {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_multiplier(value)
            .ok_or_else(|| format!("subdivision must be one of 1, 2, 4 or 8, got {value}"))
    }
}

impl From<Subdivision> for u8 {
    fn from(value: Subdivision) -> Self {
        value.multiplier()
    }
}

/// milliseconds between two ticks: `60000 / bpm / multiplier`
#[must_use]
pub fn tick_interval_ms(bpm: Bpm, subdivision: Subdivision) -> f64 {
    60000.0 / f64::from(bpm.get()) / f64::from(subdivision.multiplier())
}

#[must_use]
pub fn tick_interval(bpm: Bpm, subdivision: Subdivision) -> Duration {
    Duration::from_secs_f64(tick_interval_ms(bpm, subdivision) / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bpm_is_clamped() {
        assert_eq!(Bpm::new(0).get(), 40);
        assert_eq!(Bpm::new(39).get(), 40);
        assert_eq!(Bpm::new(40).get(), 40);
        assert_eq!(Bpm::new(240).get(), 240);
        assert_eq!(Bpm::new(u16::MAX).get(), 240);
        assert_eq!(Bpm::default().get(), 120);
    }

    #[test]
    fn bpm_nudge_saturates() {
        assert_eq!(Bpm::new(40).saturating_add_signed(-1).get(), 40);
        assert_eq!(Bpm::new(240).saturating_add_signed(5).get(), 240);
        assert_eq!(Bpm::new(120).saturating_add_signed(-10).get(), 110);
        assert_eq!(Bpm::new(41).saturating_add_signed(i16::MIN).get(), 40);
    }

    #[test]
    fn subdivision_labels() {
        let labels = Subdivision::VARIANTS
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();

        assert_eq!(labels, ["1x", "2x", "4x", "8x"]);
    }

    #[test]
    fn subdivision_rejects_unknown_multipliers() {
        for multiplier in [0, 3, 5, 6, 7, 9, 16, u8::MAX] {
            assert!(Subdivision::from_multiplier(multiplier).is_none());
            assert!(Subdivision::try_from(multiplier).is_err());
        }

        for subdivision in Subdivision::VARIANTS {
            assert_eq!(
                Subdivision::from_multiplier(subdivision.multiplier()),
                Some(*subdivision)
            );
        }
    }

    #[test]
    fn interval_matches_formula() {
        for bpm in Bpm::RANGE {
            for subdivision in Subdivision::VARIANTS {
                let expected = 60000.0 / f64::from(bpm) / f64::from(subdivision.multiplier());
                assert_eq!(tick_interval_ms(Bpm::new(bpm), *subdivision), expected);
            }
        }
    }

    #[test]
    fn interval_extremes() {
        assert_eq!(
            tick_interval(Bpm::new(120), Subdivision::X1),
            Duration::from_millis(500)
        );
        assert_eq!(tick_interval_ms(Bpm::new(240), Subdivision::X8), 31.25);
        assert_eq!(
            tick_interval(Bpm::new(240), Subdivision::X8),
            Duration::from_micros(31_250)
        );
        assert_eq!(
            tick_interval(Bpm::new(40), Subdivision::X1),
            Duration::from_millis(1500)
        );
    }
}
