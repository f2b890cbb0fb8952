//! # Unit Types
//!
//! Type-safe wrappers for the body measurements used by the fitness and
//! sizing calculators. These are plain f64 newtypes so JSON stays clean
//! (just numbers) while the code can't mix centimetres with inches.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::units::{Centimeters, Inches, Kilograms, Pounds};
//!
//! let height = Inches(70.0);
//! let height_cm: Centimeters = height.into();
//! assert!((height_cm.0 - 177.8).abs() < 1e-9);
//!
//! let weight: Kilograms = Pounds(220.0).into();
//! assert!((weight.0 - 99.79).abs() < 0.01);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

const CM_PER_INCH: f64 = 2.54;
const LB_PER_KG: f64 = 2.204_622_621_848_776;

// ============================================================================
// Length Units
// ============================================================================

/// Length in inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inches(pub f64);

/// Length in centimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Centimeters(pub f64);

impl From<Inches> for Centimeters {
    fn from(inches: Inches) -> Self {
        Centimeters(inches.0 * CM_PER_INCH)
    }
}

impl From<Centimeters> for Inches {
    fn from(cm: Centimeters) -> Self {
        Inches(cm.0 / CM_PER_INCH)
    }
}

// ============================================================================
// Mass Units
// ============================================================================

/// Mass in kilograms
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilograms(pub f64);

/// Mass in pounds
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pounds(pub f64);

impl From<Pounds> for Kilograms {
    fn from(lb: Pounds) -> Self {
        Kilograms(lb.0 / LB_PER_KG)
    }
}

impl From<Kilograms> for Pounds {
    fn from(kg: Kilograms) -> Self {
        Pounds(kg.0 * LB_PER_KG)
    }
}

// ============================================================================
// Unit selectors
// ============================================================================

/// Unit used for a single length measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    #[default]
    Inches,
    Centimeters,
}

impl LengthUnit {
    /// Convert a raw measurement in this unit to inches
    pub fn to_inches(self, value: f64) -> Inches {
        match self {
            LengthUnit::Inches => Inches(value),
            LengthUnit::Centimeters => Centimeters(value).into(),
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "in" | "inch" | "inches" | "\"" => Ok(LengthUnit::Inches),
            "cm" | "centimeter" | "centimeters" | "centimetre" | "centimetres" => Ok(LengthUnit::Centimeters),
            _ => Err(CalcError::not_found("length unit", s)),
        }
    }
}

/// Measurement system for paired weight/height inputs
///
/// - Metric: kilograms and centimetres
/// - Imperial: pounds and inches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Normalise a weight reading to kilograms
    pub fn weight_kg(self, value: f64) -> Kilograms {
        match self {
            UnitSystem::Metric => Kilograms(value),
            UnitSystem::Imperial => Pounds(value).into(),
        }
    }

    /// Normalise a height reading to centimetres
    pub fn height_cm(self, value: f64) -> Centimeters {
        match self {
            UnitSystem::Metric => Centimeters(value),
            UnitSystem::Imperial => Inches(value).into(),
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "metric" | "si" | "kg" => Ok(UnitSystem::Metric),
            "imperial" | "us" | "lb" => Ok(UnitSystem::Imperial),
            _ => Err(CalcError::not_found("unit system", s)),
        }
    }
}

macro_rules! impl_value {
    ($($type:ty),*) => {
        $(
            impl $type {
                /// Get the raw f64 value
                pub fn value(self) -> f64 {
                    self.0
                }
            }
        )*
    };
}

impl_value!(Inches, Centimeters, Kilograms, Pounds);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inches_to_centimeters() {
        let cm: Centimeters = Inches(10.0).into();
        assert!((cm.0 - 25.4).abs() < 1e-12);
        let back: Inches = cm.into();
        assert!((back.0 - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_pounds_to_kilograms() {
        let kg: Kilograms = Pounds(154.0).into();
        assert!((kg.0 - 69.85).abs() < 0.01);
    }

    #[test]
    fn test_unit_system_normalisation() {
        assert_eq!(UnitSystem::Metric.weight_kg(70.0), Kilograms(70.0));
        assert!((UnitSystem::Imperial.height_cm(70.0).0 - 177.8).abs() < 1e-9);
    }

    #[test]
    fn test_flexible_parsing() {
        assert_eq!(LengthUnit::from_str_flexible("CM").unwrap(), LengthUnit::Centimeters);
        assert_eq!(UnitSystem::from_str_flexible("imperial").unwrap(), UnitSystem::Imperial);
        assert!(LengthUnit::from_str_flexible("furlong").is_err());
    }

    #[test]
    fn test_value_unwraps_normalised_reading() {
        assert_eq!(UnitSystem::Metric.height_cm(180.0).value(), 180.0);
        assert!((UnitSystem::Imperial.weight_kg(220.0).value() - 99.79).abs() < 0.01);
    }

    #[test]
    fn test_serialization() {
        let kg = Kilograms(72.5);
        let json = serde_json::to_string(&kg).unwrap();
        assert_eq!(json, "72.5");
        let roundtrip: Kilograms = serde_json::from_str(&json).unwrap();
        assert_eq!(kg, roundtrip);
    }
}
