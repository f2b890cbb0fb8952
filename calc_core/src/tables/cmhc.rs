//! Mortgage default insurance (CMHC-style) premium table and down payment
//! rules, loaded from `data/cmhc.toml`.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::parse_table;
use crate::errors::{CalcError, CalcResult};

const CMHC_TOML: &str = include_str!("../../data/cmhc.toml");

/// Premium for loans up to `max_ltv_pct` loan-to-value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PremiumTier {
    pub max_ltv_pct: f64,
    pub premium_pct: f64,
}

/// Insurance rules and premium tiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmhcTable {
    /// Purchases at or above this price cannot be insured
    pub max_insured_price: f64,
    /// Smallest legal down payment (percent of price)
    pub min_down_payment_pct: f64,
    /// Down payments at or above this percentage are uninsured
    pub uninsured_down_payment_pct: f64,
    pub long_amortization_years: u32,
    pub long_amortization_surcharge_pct: f64,
    /// Sorted by `max_ltv_pct`
    #[serde(rename = "tier")]
    pub tiers: Vec<PremiumTier>,
}

static CMHC: Lazy<CalcResult<CmhcTable>> = Lazy::new(|| parse_table("cmhc", CMHC_TOML));

impl CmhcTable {
    /// The embedded table
    pub fn get() -> CalcResult<&'static CmhcTable> {
        CMHC.as_ref().map_err(Clone::clone)
    }

    /// Premium rate (percent of the loan) for a loan-to-value ratio.
    ///
    /// # Errors
    ///
    /// `InvalidInput` on `down_payment` when the ratio is above the highest
    /// insurable tier.
    pub fn premium_rate_pct(&self, ltv_pct: f64, amortization_years: u32) -> CalcResult<f64> {
        let tier = self
            .tiers
            .iter()
            .find(|t| ltv_pct <= t.max_ltv_pct + 1e-9)
            .ok_or_else(|| {
                CalcError::invalid_input(
                    "down_payment",
                    format!("{:.2}% loan-to-value", ltv_pct),
                    "Loan-to-value is above the highest insurable tier",
                )
            })?;

        let surcharge = if amortization_years > self.long_amortization_years {
            self.long_amortization_surcharge_pct
        } else {
            0.0
        };
        Ok(tier.premium_pct + surcharge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_loads_sorted() {
        let table = CmhcTable::get().unwrap();
        assert_eq!(table.tiers.len(), 6);
        assert!(table.tiers.windows(2).all(|w| w[0].max_ltv_pct < w[1].max_ltv_pct));
        assert_eq!(table.min_down_payment_pct, 5.0);
    }

    #[test]
    fn test_premium_lookup() {
        let table = CmhcTable::get().unwrap();
        assert_eq!(table.premium_rate_pct(95.0, 25).unwrap(), 4.00);
        assert_eq!(table.premium_rate_pct(90.0, 25).unwrap(), 3.10);
        assert_eq!(table.premium_rate_pct(85.5, 25).unwrap(), 3.10);
        assert_eq!(table.premium_rate_pct(60.0, 25).unwrap(), 0.60);
    }

    #[test]
    fn test_long_amortization_surcharge() {
        let table = CmhcTable::get().unwrap();
        assert!((table.premium_rate_pct(95.0, 30).unwrap() - 4.20).abs() < 1e-12);
    }

    #[test]
    fn test_uninsurable_ltv() {
        let table = CmhcTable::get().unwrap();
        assert!(table.premium_rate_pct(96.0, 25).is_err());
    }
}
