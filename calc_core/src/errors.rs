//! # Error Types
//!
//! Structured error types for calc_core. Every calculator validates its input
//! before computing and reports the offending field, the value it saw, and
//! why it was rejected, so a form (or a script) can point at the exact input
//! that needs fixing.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::errors::{CalcError, CalcResult};
//!
//! fn validate_rate(annual_rate_pct: f64) -> CalcResult<()> {
//!     if annual_rate_pct <= 0.0 {
//!         return Err(CalcError::InvalidInput {
//!             field: "annual_rate_pct".to_string(),
//!             value: annual_rate_pct.to_string(),
//!             reason: "Rate must be positive".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for calc_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, wrong sign, policy violation)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// A named option (province, unit, activity level...) was not recognised
    #[error("Unknown {kind}: {name}")]
    NotFound { kind: String, name: String },

    /// The inputs were valid but the calculation cannot produce a result
    #[error("Calculation failed: {calculation_type} - {reason}")]
    CalculationFailed {
        calculation_type: String,
        reason: String,
    },

    /// JSON or query-string serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// An embedded reference table failed to load
    #[error("Reference table '{table}' is unusable: {reason}")]
    DataTable { table: String, reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create a NotFound error
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        CalcError::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(calculation_type: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::CalculationFailed {
            calculation_type: calculation_type.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        CalcError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Create a DataTable error
    pub fn data_table(table: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::DataTable {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// True when the error was caused by what the user typed
    /// (as opposed to a broken table or an internal bug).
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            CalcError::InvalidInput { .. }
                | CalcError::MissingField { .. }
                | CalcError::NotFound { .. }
                | CalcError::SerializationError { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::NotFound { .. } => "NOT_FOUND",
            CalcError::CalculationFailed { .. } => "CALCULATION_FAILED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::DataTable { .. } => "DATA_TABLE",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(err: serde_json::Error) -> Self {
        CalcError::serialization(err.to_string())
    }
}

/// Reject NaN and infinities before any range check sees them.
pub(crate) fn ensure_finite(field: &str, value: f64) -> CalcResult<()> {
    if !value.is_finite() {
        return Err(CalcError::invalid_input(field, value.to_string(), "Value must be a finite number"));
    }
    Ok(())
}

/// Require `value > 0`.
pub(crate) fn ensure_positive(field: &str, value: f64) -> CalcResult<()> {
    ensure_finite(field, value)?;
    if value <= 0.0 {
        return Err(CalcError::invalid_input(field, value.to_string(), "Value must be positive"));
    }
    Ok(())
}

/// Require `value >= 0`.
pub(crate) fn ensure_non_negative(field: &str, value: f64) -> CalcResult<()> {
    ensure_finite(field, value)?;
    if value < 0.0 {
        return Err(CalcError::invalid_input(field, value.to_string(), "Value cannot be negative"));
    }
    Ok(())
}

/// Require `min <= value <= max`.
pub(crate) fn ensure_range(field: &str, value: f64, min: f64, max: f64) -> CalcResult<()> {
    ensure_finite(field, value)?;
    if value < min || value > max {
        return Err(CalcError::invalid_input(
            field,
            value.to_string(),
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_input("home_price", "-5.0", "Value must be positive");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::missing_field("test").error_code(), "MISSING_FIELD");
        assert_eq!(CalcError::not_found("province", "XX").error_code(), "NOT_FOUND");
        assert_eq!(CalcError::data_table("cmhc", "bad").error_code(), "DATA_TABLE");
    }

    #[test]
    fn test_user_error_classification() {
        assert!(CalcError::invalid_input("a", "1", "bad").is_user_error());
        assert!(!CalcError::calculation_failed("Loan", "never repaid").is_user_error());
        assert!(!CalcError::data_table("provinces", "parse").is_user_error());
    }

    #[test]
    fn test_range_helpers() {
        assert!(ensure_positive("x", 1.0).is_ok());
        assert!(ensure_positive("x", 0.0).is_err());
        assert!(ensure_positive("x", f64::NAN).is_err());
        assert!(ensure_non_negative("x", 0.0).is_ok());
        assert!(ensure_range("x", 101.0, 0.0, 100.0).is_err());
        assert!(ensure_range("x", 100.0, 0.0, 100.0).is_ok());
    }
}
