//! Volume units.
//!
//! Volumes travel through the crate as native cubic meters and are converted
//! once, when a view is produced for the caller.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit in which volumes are handed to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeUnit {
    /// Native API unit, fractional cubic meters.
    CubicMeter,
    /// Whole litres, truncated toward zero.
    #[default]
    Litre,
}

impl VolumeUnit {
    /// Convert a native cubic-meter value into this unit.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn convert(self, cubic_meters: f64) -> Volume {
        match self {
            Self::CubicMeter => Volume::CubicMeters(cubic_meters),
            // `as` saturates on overflow and truncates toward zero.
            Self::Litre => Volume::Litres((cubic_meters * 1000.0) as i64),
        }
    }

    /// Returns the unit name as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CubicMeter => "cubic_meter",
            Self::Litre => "litre",
        }
    }
}

impl FromStr for VolumeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cubic_meter" | "cubic-meter" | "m3" => Ok(Self::CubicMeter),
            "litre" | "liter" | "l" => Ok(Self::Litre),
            other => Err(format!("unknown volume unit: {other}")),
        }
    }
}

impl fmt::Display for VolumeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A volume expressed in a caller-selected unit.
///
/// Serializes as a bare number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Volume {
    /// Fractional cubic meters.
    CubicMeters(f64),
    /// Whole litres.
    Litres(i64),
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CubicMeters(v) => write!(f, "{v} m³"),
            Self::Litres(v) => write!(f, "{v} L"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn litre_conversion_truncates() {
        assert_eq!(VolumeUnit::Litre.convert(1.234), Volume::Litres(1234));
        assert_eq!(VolumeUnit::Litre.convert(0.0009), Volume::Litres(0));
        assert_eq!(VolumeUnit::Litre.convert(12.5), Volume::Litres(12500));
    }

    #[test]
    fn cubic_meter_is_unchanged() {
        assert_eq!(VolumeUnit::CubicMeter.convert(1.234), Volume::CubicMeters(1.234));
        assert_eq!(VolumeUnit::CubicMeter.convert(0.0), Volume::CubicMeters(0.0));
    }

    #[test]
    fn default_unit_is_litre() {
        assert_eq!(VolumeUnit::default(), VolumeUnit::Litre);
    }

    #[test]
    fn unit_from_str() {
        assert_eq!("m3".parse::<VolumeUnit>().unwrap(), VolumeUnit::CubicMeter);
        assert_eq!("litre".parse::<VolumeUnit>().unwrap(), VolumeUnit::Litre);
        assert!("gallon".parse::<VolumeUnit>().is_err());
    }

    #[test]
    fn volume_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Volume::Litres(42)).unwrap(), "42");
        assert_eq!(serde_json::to_string(&Volume::CubicMeters(0.5)).unwrap(), "0.5");
    }
}
