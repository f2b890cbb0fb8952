//! Canadian provinces and territories: land transfer tax brackets,
//! first-time buyer rebates, and the sales tax some provinces charge on
//! mortgage default insurance premiums.
//!
//! Values come from `data/provinces.toml`.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::{apply_marginal, parse_table, Bracket};
use crate::errors::{CalcError, CalcResult};

const PROVINCES_TOML: &str = include_str!("../../data/provinces.toml");

/// Province or territory, serialized as its two-letter code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Province {
    #[default]
    #[serde(rename = "ON")]
    Ontario,
    #[serde(rename = "BC")]
    BritishColumbia,
    #[serde(rename = "AB")]
    Alberta,
    #[serde(rename = "SK")]
    Saskatchewan,
    #[serde(rename = "MB")]
    Manitoba,
    #[serde(rename = "QC")]
    Quebec,
    #[serde(rename = "NB")]
    NewBrunswick,
    #[serde(rename = "NS")]
    NovaScotia,
    #[serde(rename = "PE")]
    PrinceEdwardIsland,
    #[serde(rename = "NL")]
    NewfoundlandLabrador,
    #[serde(rename = "YT")]
    Yukon,
    #[serde(rename = "NT")]
    NorthwestTerritories,
    #[serde(rename = "NU")]
    Nunavut,
}

impl Province {
    /// All provinces and territories for UI selection
    pub const ALL: [Province; 13] = [
        Province::Ontario,
        Province::BritishColumbia,
        Province::Alberta,
        Province::Saskatchewan,
        Province::Manitoba,
        Province::Quebec,
        Province::NewBrunswick,
        Province::NovaScotia,
        Province::PrinceEdwardIsland,
        Province::NewfoundlandLabrador,
        Province::Yukon,
        Province::NorthwestTerritories,
        Province::Nunavut,
    ];

    /// Two-letter postal code, also the key into the TOML table
    pub fn code(self) -> &'static str {
        match self {
            Province::Ontario => "ON",
            Province::BritishColumbia => "BC",
            Province::Alberta => "AB",
            Province::Saskatchewan => "SK",
            Province::Manitoba => "MB",
            Province::Quebec => "QC",
            Province::NewBrunswick => "NB",
            Province::NovaScotia => "NS",
            Province::PrinceEdwardIsland => "PE",
            Province::NewfoundlandLabrador => "NL",
            Province::Yukon => "YT",
            Province::NorthwestTerritories => "NT",
            Province::Nunavut => "NU",
        }
    }

    /// Parse a code or a full name ("on", "Ontario", "british columbia")
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        let wanted = s.trim().to_uppercase().replace(['-', '_'], " ");
        Province::ALL
            .into_iter()
            .find(|p| {
                p.code() == wanted
                    || p.record()
                        .map(|r| r.name.to_uppercase() == wanted)
                        .unwrap_or(false)
            })
            .ok_or_else(|| CalcError::not_found("province", s))
    }

    /// Table row for this province
    pub fn record(self) -> CalcResult<&'static ProvinceRecord> {
        let table = PROVINCES.as_ref().map_err(Clone::clone)?;
        table
            .province
            .iter()
            .find(|r| r.code == self.code())
            .ok_or_else(|| CalcError::data_table("provinces", format!("no row for {}", self.code())))
    }

    /// Full display name
    pub fn display_name(self) -> &'static str {
        self.record().map(|r| r.name.as_str()).unwrap_or_else(|_| self.code())
    }

    /// Land transfer tax on a purchase, after any first-time buyer rebate.
    pub fn land_transfer_tax(self, price: f64, first_time_buyer: bool) -> CalcResult<f64> {
        let record = self.record()?;
        let gross: f64 = apply_marginal(price, &record.brackets).iter().map(|s| s.amount).sum();
        let rebate = if first_time_buyer {
            gross.min(record.first_time_rebate_max)
        } else {
            0.0
        };
        Ok(gross - rebate)
    }

    /// Sales tax rate (percent) on a default insurance premium
    pub fn premium_sales_tax_pct(self) -> CalcResult<f64> {
        Ok(self.record()?.premium_sales_tax_pct)
    }
}

/// One row of `provinces.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvinceRecord {
    pub code: String,
    pub name: String,
    /// Sales tax on insurance premiums (percent), paid in cash at closing
    pub premium_sales_tax_pct: f64,
    /// Largest land transfer tax rebate for first-time buyers
    pub first_time_rebate_max: f64,
    /// Marginal land transfer tax brackets (empty = no tax)
    pub brackets: Vec<Bracket>,
}

#[derive(Debug, Clone, Deserialize)]
struct ProvinceTable {
    province: Vec<ProvinceRecord>,
}

static PROVINCES: Lazy<CalcResult<ProvinceTable>> = Lazy::new(|| parse_table("provinces", PROVINCES_TOML));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_province_has_a_row() {
        for province in Province::ALL {
            let record = province.record().unwrap();
            assert_eq!(record.code, province.code());
        }
    }

    #[test]
    fn test_ontario_land_transfer_tax() {
        // 500k: 275 + 1950 + 2250 + 2000
        let tax = Province::Ontario.land_transfer_tax(500_000.0, false).unwrap();
        assert!((tax - 6_475.0).abs() < 1e-6);

        let first_time = Province::Ontario.land_transfer_tax(500_000.0, true).unwrap();
        assert!((first_time - 2_475.0).abs() < 1e-6);
    }

    #[test]
    fn test_rebate_never_exceeds_tax() {
        let tax = Province::Ontario.land_transfer_tax(100_000.0, true).unwrap();
        assert_eq!(tax, 0.0);
    }

    #[test]
    fn test_province_without_tax() {
        assert_eq!(Province::Alberta.land_transfer_tax(750_000.0, false).unwrap(), 0.0);
    }

    #[test]
    fn test_premium_sales_tax() {
        assert_eq!(Province::Ontario.premium_sales_tax_pct().unwrap(), 8.0);
        assert_eq!(Province::Quebec.premium_sales_tax_pct().unwrap(), 9.0);
        assert_eq!(Province::BritishColumbia.premium_sales_tax_pct().unwrap(), 0.0);
    }

    #[test]
    fn test_flexible_parsing() {
        assert_eq!(Province::from_str_flexible("bc").unwrap(), Province::BritishColumbia);
        assert_eq!(Province::from_str_flexible("Nova Scotia").unwrap(), Province::NovaScotia);
        assert_eq!(Province::from_str_flexible("prince-edward-island").unwrap(), Province::PrinceEdwardIsland);
        assert!(Province::from_str_flexible("Texas").is_err());
    }

    #[test]
    fn test_serializes_as_code() {
        assert_eq!(serde_json::to_string(&Province::Quebec).unwrap(), "\"QC\"");
        let p: Province = serde_json::from_str("\"MB\"").unwrap();
        assert_eq!(p, Province::Manitoba);
    }
}
