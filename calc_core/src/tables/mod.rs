//! # Reference Tables
//!
//! Rate tables the calculators look up at run time: provincial land
//! transfer tax and premium sales tax, and mortgage default insurance
//! premiums.
//!
//! Tables live as TOML under `calc_core/data/`, are embedded at compile time
//! and parsed once on first use. A table that fails to parse surfaces as
//! [`CalcError::DataTable`] from every lookup instead of panicking.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::tables::{apply_marginal, Bracket};
//!
//! let brackets = vec![
//!     Bracket { up_to: Some(50_000.0), rate_pct: 5.0 },
//!     Bracket { up_to: None, rate_pct: 10.0 },
//! ];
//! let total: f64 = apply_marginal(80_000.0, &brackets).iter().map(|s| s.amount).sum();
//! assert!((total - 5_500.0).abs() < 1e-9);
//! ```

pub mod cmhc;
pub mod provinces;

pub use cmhc::{CmhcTable, PremiumTier};
pub use provinces::{Province, ProvinceRecord};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// One marginal bracket: `rate_pct` applies to the slice of the amount
/// between the previous bracket's `up_to` and this one's.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    /// Upper bound of the slice; `None` for the open-ended top bracket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up_to: Option<f64>,
    /// Rate applied to the slice, in percent
    pub rate_pct: f64,
}

/// The part of an amount that fell into one bracket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BracketShare {
    pub from: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<f64>,
    pub rate_pct: f64,
    /// Portion of the amount inside this bracket
    pub base: f64,
    /// `base × rate`
    pub amount: f64,
}

/// Split `amount` across marginal brackets.
///
/// Only brackets the amount reaches are returned. Amounts beyond a bounded
/// final bracket are not taxed; [`validate_brackets`] rejects such tables for
/// user-supplied tiers.
pub fn apply_marginal(amount: f64, brackets: &[Bracket]) -> Vec<BracketShare> {
    let mut shares = Vec::new();
    let mut lower = 0.0;
    for bracket in brackets {
        if amount <= lower {
            break;
        }
        let upper = bracket.up_to.unwrap_or(f64::INFINITY);
        let base = amount.min(upper) - lower;
        shares.push(BracketShare {
            from: lower,
            to: bracket.up_to,
            rate_pct: bracket.rate_pct,
            base,
            amount: base * bracket.rate_pct / 100.0,
        });
        lower = upper;
    }
    shares
}

/// Check that brackets are non-empty, strictly ascending, use rates in
/// `0..=100`, and end with an open-ended bracket.
pub fn validate_brackets(field: &str, brackets: &[Bracket]) -> CalcResult<()> {
    if brackets.is_empty() {
        return Err(CalcError::missing_field(field));
    }
    let mut lower = 0.0;
    for (i, bracket) in brackets.iter().enumerate() {
        let name = format!("{}[{}]", field, i);
        if !bracket.rate_pct.is_finite() || !(0.0..=100.0).contains(&bracket.rate_pct) {
            return Err(CalcError::invalid_input(
                name,
                bracket.rate_pct.to_string(),
                "Rate must be between 0 and 100 percent",
            ));
        }
        let is_last = i + 1 == brackets.len();
        match bracket.up_to {
            Some(up_to) if is_last => {
                return Err(CalcError::invalid_input(
                    name,
                    up_to.to_string(),
                    "Last tier must be open-ended (no upper bound)",
                ));
            }
            Some(up_to) => {
                if !up_to.is_finite() || up_to <= lower {
                    return Err(CalcError::invalid_input(
                        name,
                        up_to.to_string(),
                        "Tier bounds must be strictly ascending",
                    ));
                }
                lower = up_to;
            }
            None if !is_last => {
                return Err(CalcError::invalid_input(
                    name,
                    "open-ended",
                    "Only the last tier may be open-ended",
                ));
            }
            None => {}
        }
    }
    Ok(())
}

/// Parse an embedded TOML table
pub(crate) fn parse_table<T: DeserializeOwned>(table: &str, source: &str) -> CalcResult<T> {
    tracing::debug!(table, "loading reference table");
    toml::from_str(source).map_err(|e| CalcError::data_table(table, e.to_string()))
}
