//! Range-checked percent values.
//!
//! Sliders and gauges both carry integer percentages. Wrapping them in
//! newtypes keeps the 0..=100 domain check at construction time, so the
//! state containers and wire handlers never see an out-of-range value.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Slider position in percent (0..=100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SliderLevel(u8);

impl SliderLevel {
    pub const MIN: Self = Self(0);
    pub const MAX: Self = Self(100);

    /// Startup default (mid travel).
    pub const DEFAULT: Self = Self(50);

    /// Create a slider level, rejecting values above 100.
    pub fn new(value: u8) -> Result<Self> {
        if value > 100 {
            return Err(CoreError::InvalidLevel(format!(
                "slider level {value} outside 0..=100"
            )));
        }
        Ok(Self(value))
    }

    /// Raw percent value.
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for SliderLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for SliderLevel {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SliderLevel> for u8 {
    fn from(level: SliderLevel) -> u8 {
        level.0
    }
}

impl fmt::Display for SliderLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gauge reading in percent (0..=100).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct GaugeLevel(u8);

impl GaugeLevel {
    pub const MIN: Self = Self(0);
    pub const MAX: Self = Self(100);

    /// Create a gauge level, rejecting values above 100.
    pub fn new(value: u8) -> Result<Self> {
        if value > 100 {
            return Err(CoreError::InvalidLevel(format!(
                "gauge level {value} outside 0..=100"
            )));
        }
        Ok(Self(value))
    }

    /// Create a gauge level from generated data, clamping to 100.
    ///
    /// Only for values the process produces itself; wire input goes
    /// through `new`.
    pub fn clamped(value: u8) -> Self {
        Self(value.min(100))
    }

    /// Raw percent value.
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for GaugeLevel {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<GaugeLevel> for u8 {
    fn from(level: GaugeLevel) -> u8 {
        level.0
    }
}

impl fmt::Display for GaugeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slider_level_bounds() {
        assert!(SliderLevel::new(0).is_ok());
        assert!(SliderLevel::new(100).is_ok());
        assert!(SliderLevel::new(101).is_err());
    }

    #[test]
    fn test_slider_level_default_is_mid_travel() {
        assert_eq!(SliderLevel::default().value(), 50);
    }

    #[test]
    fn test_gauge_level_bounds() {
        assert!(GaugeLevel::new(100).is_ok());
        assert!(GaugeLevel::new(200).is_err());
        assert_eq!(GaugeLevel::default().value(), 0);
    }

    #[test]
    fn test_gauge_level_clamped() {
        assert_eq!(GaugeLevel::clamped(42).value(), 42);
        assert_eq!(GaugeLevel::clamped(200).value(), 100);
    }

    #[test]
    fn test_serde_rejects_out_of_range() {
        let ok: std::result::Result<SliderLevel, _> = serde_json::from_str("75");
        assert_eq!(ok.unwrap().value(), 75);

        let too_big: std::result::Result<SliderLevel, _> = serde_json::from_str("140");
        assert!(too_big.is_err());
    }

    #[test]
    fn test_serde_serializes_as_plain_number() {
        let json = serde_json::to_string(&GaugeLevel::new(42).unwrap()).unwrap();
        assert_eq!(json, "42");
    }
}
