//! # Percentage Calculation
//!
//! | mode | question | formula |
//! |------|----------|---------|
//! | `percent_of` | what is x % of y? | `x × y / 100` |
//! | `what_percent` | x is what % of y? | `x / y × 100` |
//! | `change` | % change from x to y | `(y − x) / |x| × 100` |
//! | `difference` | % difference between x and y | `|x − y| / ((x + y) / 2) × 100` |

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_finite, CalcError, CalcResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentageMode {
    #[default]
    PercentOf,
    WhatPercent,
    Change,
    Difference,
}

impl PercentageMode {
    pub const ALL: [PercentageMode; 4] = [
        PercentageMode::PercentOf,
        PercentageMode::WhatPercent,
        PercentageMode::Change,
        PercentageMode::Difference,
    ];

    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "percent_of" | "of" => Ok(PercentageMode::PercentOf),
            "what_percent" | "what" | "ratio" => Ok(PercentageMode::WhatPercent),
            "change" | "percent_change" => Ok(PercentageMode::Change),
            "difference" | "diff" | "percent_difference" => Ok(PercentageMode::Difference),
            _ => Err(CalcError::not_found("percentage mode", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentageInput {
    #[serde(default)]
    pub mode: PercentageMode,
    pub x: f64,
    pub y: f64,
}

impl PercentageInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        ensure_finite("x", self.x)?;
        ensure_finite("y", self.y)?;
        match self.mode {
            PercentageMode::WhatPercent if self.y == 0.0 => {
                Err(CalcError::invalid_input("y", "0", "Cannot take a percentage of zero"))
            }
            PercentageMode::Change if self.x == 0.0 => {
                Err(CalcError::invalid_input("x", "0", "Percent change from zero is undefined"))
            }
            PercentageMode::Difference if self.x + self.y == 0.0 => Err(CalcError::invalid_input(
                "y",
                self.y.to_string(),
                "Values average to zero; percent difference is undefined",
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentageResult {
    pub mode: PercentageMode,
    pub value: f64,
    /// Human-readable statement, e.g. "15% of 200 = 30"
    pub statement: String,
}

/// Calculate a percentage.
pub fn calculate(input: &PercentageInput) -> CalcResult<PercentageResult> {
    input.validate()?;

    let PercentageInput { mode, x, y } = *input;
    let (value, statement) = match mode {
        PercentageMode::PercentOf => {
            let value = x * y / 100.0;
            (value, format!("{}% of {} = {}", x, y, value))
        }
        PercentageMode::WhatPercent => {
            let value = x / y * 100.0;
            (value, format!("{} is {}% of {}", x, value, y))
        }
        PercentageMode::Change => {
            let value = (y - x) / x.abs() * 100.0;
            let direction = if value >= 0.0 { "increase" } else { "decrease" };
            (value, format!("{} to {} is a {}% {}", x, y, value.abs(), direction))
        }
        PercentageMode::Difference => {
            let value = (x - y).abs() / ((x + y) / 2.0).abs() * 100.0;
            (value, format!("{} and {} differ by {}%", x, y, value))
        }
    };

    Ok(PercentageResult { mode, value, statement })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(mode: PercentageMode, x: f64, y: f64) -> f64 {
        calculate(&PercentageInput { mode, x, y }).unwrap().value
    }

    #[test]
    fn test_modes() {
        assert!((value(PercentageMode::PercentOf, 15.0, 200.0) - 30.0).abs() < 1e-12);
        assert!((value(PercentageMode::WhatPercent, 30.0, 200.0) - 15.0).abs() < 1e-12);
        assert!((value(PercentageMode::Change, 80.0, 100.0) - 25.0).abs() < 1e-12);
        assert!((value(PercentageMode::Change, 100.0, 80.0) + 20.0).abs() < 1e-12);
        assert!((value(PercentageMode::Difference, 80.0, 120.0) - 40.0).abs() < 1e-12);
    }

    #[test]
    fn test_change_from_negative_base() {
        // -50 to -25 is an increase
        assert!((value(PercentageMode::Change, -50.0, -25.0) - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_statement() {
        let result = calculate(&PercentageInput { mode: PercentageMode::PercentOf, x: 15.0, y: 200.0 }).unwrap();
        assert_eq!(result.statement, "15% of 200 = 30");
        let result = calculate(&PercentageInput { mode: PercentageMode::Change, x: 100.0, y: 80.0 }).unwrap();
        assert_eq!(result.statement, "100 to 80 is a 20% decrease");
    }

    #[test]
    fn test_undefined_cases() {
        assert!(calculate(&PercentageInput { mode: PercentageMode::WhatPercent, x: 1.0, y: 0.0 }).is_err());
        assert!(calculate(&PercentageInput { mode: PercentageMode::Change, x: 0.0, y: 5.0 }).is_err());
        assert!(calculate(&PercentageInput { mode: PercentageMode::Difference, x: 5.0, y: -5.0 }).is_err());
        assert!(calculate(&PercentageInput { mode: PercentageMode::PercentOf, x: f64::NAN, y: 1.0 }).is_err());
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(PercentageMode::from_str_flexible("what-percent").unwrap(), PercentageMode::WhatPercent);
        assert_eq!(PercentageMode::from_str_flexible("Percent Change").unwrap(), PercentageMode::Change);
        assert_eq!(PercentageMode::from_str_flexible("  of\n").unwrap(), PercentageMode::PercentOf);
        assert_eq!(PercentageMode::from_str_flexible("bogus").unwrap_err().error_code(), "NOT_FOUND");
    }
}
