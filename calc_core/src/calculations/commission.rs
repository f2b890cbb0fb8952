//! # Commission Calculation
//!
//! Sales commission under a flat rate or marginal tiers, plus the sales
//! volume needed to reach a target total pay.
//!
//! Tiered plans work like income tax brackets: each rate applies only to
//! the slice of sales inside its tier.

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_non_negative, ensure_range, CalcError, CalcResult};
use crate::tables::{apply_marginal, validate_brackets, Bracket, BracketShare};

/// How commission is earned on sales
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionPlan {
    /// One rate on every dollar
    Flat { rate_pct: f64 },
    /// Marginal tiers; the last tier must be open-ended
    Tiered { tiers: Vec<Bracket> },
}

impl Default for CommissionPlan {
    fn default() -> Self {
        CommissionPlan::Flat { rate_pct: 5.0 }
    }
}

impl CommissionPlan {
    fn brackets(&self) -> Vec<Bracket> {
        match self {
            CommissionPlan::Flat { rate_pct } => vec![Bracket { up_to: None, rate_pct: *rate_pct }],
            CommissionPlan::Tiered { tiers } => tiers.clone(),
        }
    }

    /// Commission earned on `sales`
    pub fn commission_on(&self, sales: f64) -> f64 {
        apply_marginal(sales, &self.brackets()).iter().map(|s| s.amount).sum()
    }

    /// Smallest sales volume that earns `commission`, or `None` when the
    /// plan can never pay that much.
    pub fn sales_for(&self, commission: f64) -> Option<f64> {
        if commission <= 0.0 {
            return Some(0.0);
        }
        let mut lower = 0.0;
        let mut earned = 0.0;
        for bracket in self.brackets() {
            let rate = bracket.rate_pct / 100.0;
            let upper = bracket.up_to.unwrap_or(f64::INFINITY);
            let capacity = (upper - lower) * rate;
            if rate > 0.0 && earned + capacity >= commission {
                return Some(lower + (commission - earned) / rate);
            }
            earned += capacity;
            lower = upper;
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionInput {
    pub sales: f64,
    #[serde(default)]
    pub plan: CommissionPlan,
    #[serde(default)]
    pub base_salary: f64,
    /// Total pay (base + commission) to solve the required sales for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_earnings: Option<f64>,
}

impl CommissionInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        ensure_non_negative("sales", self.sales)?;
        ensure_non_negative("base_salary", self.base_salary)?;
        match &self.plan {
            CommissionPlan::Flat { rate_pct } => ensure_range("rate_pct", *rate_pct, 0.0, 100.0)?,
            CommissionPlan::Tiered { tiers } => validate_brackets("tiers", tiers)?,
        }
        if let Some(target) = self.target_earnings {
            ensure_non_negative("target_earnings", target)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionResult {
    pub commission: f64,
    pub total_earnings: f64,
    /// Commission as a percent of sales
    pub effective_rate_pct: f64,
    pub breakdown: Vec<BracketShare>,
    /// Sales needed to reach `target_earnings`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_sales: Option<f64>,
}

/// Calculate commission.
pub fn calculate(input: &CommissionInput) -> CalcResult<CommissionResult> {
    input.validate()?;

    let breakdown = apply_marginal(input.sales, &input.plan.brackets());
    let commission: f64 = breakdown.iter().map(|s| s.amount).sum();
    let effective_rate_pct = if input.sales > 0.0 {
        commission / input.sales * 100.0
    } else {
        0.0
    };

    let required_sales = match input.target_earnings {
        Some(target) => {
            let needed = (target - input.base_salary).max(0.0);
            let sales = input.plan.sales_for(needed).ok_or_else(|| {
                CalcError::calculation_failed(
                    "Commission",
                    format!("The plan cannot pay {:.2} in commission at any sales volume", needed),
                )
            })?;
            Some(sales)
        }
        None => None,
    };

    Ok(CommissionResult {
        commission,
        total_earnings: input.base_salary + commission,
        effective_rate_pct,
        breakdown,
        required_sales,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiered() -> CommissionPlan {
        CommissionPlan::Tiered {
            tiers: vec![
                Bracket { up_to: Some(50_000.0), rate_pct: 5.0 },
                Bracket { up_to: Some(100_000.0), rate_pct: 7.5 },
                Bracket { up_to: None, rate_pct: 10.0 },
            ],
        }
    }

    #[test]
    fn test_flat_commission() {
        let result = calculate(&CommissionInput {
            sales: 80_000.0,
            plan: CommissionPlan::Flat { rate_pct: 4.0 },
            base_salary: 30_000.0,
            target_earnings: None,
        })
        .unwrap();
        assert!((result.commission - 3_200.0).abs() < 1e-9);
        assert!((result.total_earnings - 33_200.0).abs() < 1e-9);
        assert!((result.effective_rate_pct - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_tiered_commission() {
        let result = calculate(&CommissionInput {
            sales: 120_000.0,
            plan: tiered(),
            base_salary: 0.0,
            target_earnings: None,
        })
        .unwrap();
        // 2500 + 3750 + 2000
        assert!((result.commission - 8_250.0).abs() < 1e-9);
        assert_eq!(result.breakdown.len(), 3);
        assert!((result.effective_rate_pct - 6.875).abs() < 1e-9);
    }

    #[test]
    fn test_required_sales_inverts_commission() {
        let plan = tiered();
        for sales in [10_000.0, 50_000.0, 75_000.0, 250_000.0] {
            let commission = plan.commission_on(sales);
            let back = plan.sales_for(commission).unwrap();
            assert!((back - sales).abs() < 1e-6, "{} vs {}", back, sales);
        }

        let result = calculate(&CommissionInput {
            sales: 0.0,
            plan,
            base_salary: 40_000.0,
            target_earnings: Some(48_250.0),
        })
        .unwrap();
        assert!((result.required_sales.unwrap() - 120_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_target_below_base_needs_no_sales() {
        let result = calculate(&CommissionInput {
            sales: 0.0,
            plan: CommissionPlan::default(),
            base_salary: 50_000.0,
            target_earnings: Some(45_000.0),
        })
        .unwrap();
        assert_eq!(result.required_sales, Some(0.0));
        assert_eq!(result.effective_rate_pct, 0.0);
    }

    #[test]
    fn test_unreachable_target() {
        let result = calculate(&CommissionInput {
            sales: 0.0,
            plan: CommissionPlan::Flat { rate_pct: 0.0 },
            base_salary: 0.0,
            target_earnings: Some(1_000.0),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_plan_json_shape() {
        let input: CommissionInput = serde_json::from_str(
            r#"{"sales": 1000, "plan": {"tiered": {"tiers": [{"up_to": 500, "rate_pct": 1}, {"rate_pct": 2}]}}}"#,
        )
        .unwrap();
        assert!(matches!(input.plan, CommissionPlan::Tiered { .. }));
        assert!((calculate(&input).unwrap().commission - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_tiers() {
        let result = calculate(&CommissionInput {
            sales: 1_000.0,
            plan: CommissionPlan::Tiered {
                tiers: vec![Bracket { up_to: Some(500.0), rate_pct: 5.0 }],
            },
            base_salary: 0.0,
            target_earnings: None,
        });
        assert!(result.is_err());
    }
}
