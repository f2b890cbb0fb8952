//! # VAT Calculation
//!
//! Add VAT to a net price or extract it from a gross price.
//!
//! - `gross = net × (1 + rate)`
//! - `net = gross / (1 + rate)`
//!
//! For any rate ≥ 0, `remove_vat(add_vat(net, rate), rate) ≈ net`.

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_non_negative, ensure_range, CalcResult};

/// Which way to apply the rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VatMode {
    /// `amount` is net; compute gross
    #[default]
    Add,
    /// `amount` is gross; compute net
    Remove,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VatInput {
    pub amount: f64,
    pub rate_pct: f64,
    #[serde(default)]
    pub mode: VatMode,
}

impl VatInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        ensure_non_negative("amount", self.amount)?;
        ensure_range("rate_pct", self.rate_pct, 0.0, 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VatResult {
    pub net: f64,
    pub vat: f64,
    pub gross: f64,
    pub rate_pct: f64,
}

/// Gross price for a net price
pub fn add_vat(net: f64, rate_pct: f64) -> f64 {
    net * (1.0 + rate_pct / 100.0)
}

/// Net price for a gross price
pub fn remove_vat(gross: f64, rate_pct: f64) -> f64 {
    gross / (1.0 + rate_pct / 100.0)
}

/// Calculate VAT.
pub fn calculate(input: &VatInput) -> CalcResult<VatResult> {
    input.validate()?;

    let (net, gross) = match input.mode {
        VatMode::Add => (input.amount, add_vat(input.amount, input.rate_pct)),
        VatMode::Remove => (remove_vat(input.amount, input.rate_pct), input.amount),
    };

    Ok(VatResult {
        net,
        vat: gross - net,
        gross,
        rate_pct: input.rate_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_vat() {
        let result = calculate(&VatInput { amount: 100.0, rate_pct: 20.0, mode: VatMode::Add }).unwrap();
        assert!((result.gross - 120.0).abs() < 1e-9);
        assert!((result.vat - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_remove_vat() {
        let result = calculate(&VatInput { amount: 119.0, rate_pct: 19.0, mode: VatMode::Remove }).unwrap();
        assert!((result.net - 100.0).abs() < 1e-9);
        assert!((result.vat - 19.0).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip_law() {
        for rate in [0.0, 5.0, 7.7, 19.0, 20.0, 25.5, 100.0] {
            for net in [0.0, 0.01, 9.99, 1234.56, 1e7] {
                let back = remove_vat(add_vat(net, rate), rate);
                assert!((back - net).abs() <= 1e-9 * net.max(1.0));
            }
        }
    }

    #[test]
    fn test_zero_rate() {
        let result = calculate(&VatInput { amount: 50.0, rate_pct: 0.0, mode: VatMode::Add }).unwrap();
        assert_eq!(result.gross, 50.0);
        assert_eq!(result.vat, 0.0);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(calculate(&VatInput { amount: -1.0, rate_pct: 20.0, mode: VatMode::Add }).is_err());
        assert!(calculate(&VatInput { amount: 1.0, rate_pct: -5.0, mode: VatMode::Add }).is_err());
    }
}
