//! Real-world units and result formatting

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Available real-world units, in picker order
pub const UNITS: [Unit; 6] =
    [Unit::Centimeter, Unit::Millimeter, Unit::Meter, Unit::Inch, Unit::Foot, Unit::Yard];

/// Unit the reference length and all results are expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Millimeter,
    #[default]
    Centimeter,
    Meter,
    Inch,
    Foot,
    Yard,
}

impl Unit {
    /// Short symbol shown next to values
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Millimeter => "mm",
            Self::Centimeter => "cm",
            Self::Meter => "m",
            Self::Inch => "in",
            Self::Foot => "ft",
            Self::Yard => "yd",
        }
    }

    pub fn format_length(self, value: f64) -> String {
        format!("{value:.1} {}", self.symbol())
    }

    pub fn format_area(self, value: f64) -> String {
        format!("{value:.2} {}²", self.symbol())
    }

    pub fn format_volume(self, value: f64) -> String {
        format!("{value:.2} {}³", self.symbol())
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Error returned when a unit symbol is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown unit '{0}' (expected one of mm, cm, m, in, ft, yd)")]
pub struct ParseUnitError(pub String);

impl FromStr for Unit {
    type Err = ParseUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        UNITS
            .iter()
            .copied()
            .find(|unit| unit.symbol().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseUnitError(trimmed.to_owned()))
    }
}
