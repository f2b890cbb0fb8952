//! # Retirement Calculation
//!
//! Projects savings month by month to retirement, then draws them down to
//! life expectancy.
//!
//! ## Accumulation
//!
//! - Monthly return: `(1 + R)^(1/12) − 1` for annual return `R`
//! - Monthly contribution grows by `contribution_growth_pct` once a year
//! - Real (today's dollars) balance: `balance / (1 + inflation)^years`
//!
//! ## Drawdown
//!
//! Withdrawals rise with inflation every month, so their present value at
//! retirement is a level annuity at the real rate
//! `q = ((1 + R) / (1 + I))^(1/12) − 1`:
//!
//! ```text
//! nest egg = W₀ · PVA(q, n) / (1 + i)
//! ```
//!
//! where `W₀` is the first monthly withdrawal and `i` the monthly inflation.

use serde::{Deserialize, Serialize};

use crate::amortization::{future_value, level_payment, periodic_rate, present_value_of_annuity, Compounding};
use crate::errors::{ensure_non_negative, ensure_range, CalcError, CalcResult};

const MAX_AGE: u32 = 120;

fn default_life_expectancy() -> u32 {
    90
}

fn default_return_pct() -> f64 {
    6.0
}

fn default_inflation_pct() -> f64 {
    2.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementInput {
    pub current_age: u32,
    pub retirement_age: u32,
    #[serde(default = "default_life_expectancy")]
    pub life_expectancy: u32,
    #[serde(default)]
    pub current_savings: f64,
    #[serde(default)]
    pub monthly_contribution: f64,
    /// Yearly raise applied to the monthly contribution
    #[serde(default)]
    pub contribution_growth_pct: f64,
    /// Expected annual return before retirement
    #[serde(default = "default_return_pct")]
    pub annual_return_pct: f64,
    /// Expected annual return after retirement (defaults to `annual_return_pct`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retirement_return_pct: Option<f64>,
    #[serde(default = "default_inflation_pct")]
    pub inflation_pct: f64,
    /// Desired yearly retirement income in today's dollars
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_annual_income: Option<f64>,
}

impl RetirementInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        if self.current_age >= self.retirement_age {
            return Err(CalcError::invalid_input(
                "retirement_age",
                self.retirement_age.to_string(),
                "Retirement age must be greater than current age",
            ));
        }
        if self.retirement_age >= self.life_expectancy {
            return Err(CalcError::invalid_input(
                "life_expectancy",
                self.life_expectancy.to_string(),
                "Life expectancy must be greater than retirement age",
            ));
        }
        if self.life_expectancy > MAX_AGE {
            return Err(CalcError::invalid_input(
                "life_expectancy",
                self.life_expectancy.to_string(),
                format!("Life expectancy cannot exceed {}", MAX_AGE),
            ));
        }
        ensure_non_negative("current_savings", self.current_savings)?;
        ensure_non_negative("monthly_contribution", self.monthly_contribution)?;
        ensure_range("contribution_growth_pct", self.contribution_growth_pct, 0.0, 50.0)?;
        ensure_range("annual_return_pct", self.annual_return_pct, -20.0, 30.0)?;
        if let Some(rate) = self.retirement_return_pct {
            ensure_range("retirement_return_pct", rate, -20.0, 30.0)?;
        }
        ensure_range("inflation_pct", self.inflation_pct, -5.0, 25.0)?;
        if let Some(income) = self.desired_annual_income {
            ensure_non_negative("desired_annual_income", income)?;
        }
        Ok(())
    }

    fn drawdown_return_pct(&self) -> f64 {
        self.retirement_return_pct.unwrap_or(self.annual_return_pct)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetirementPhase {
    Saving,
    Retired,
}

/// One year of the projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementRow {
    /// Age at the end of the year
    pub age: u32,
    pub phase: RetirementPhase,
    pub contributions: f64,
    pub withdrawals: f64,
    pub growth: f64,
    pub balance: f64,
    /// `balance` in today's dollars
    pub real_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementResult {
    pub years_to_retirement: u32,
    pub years_in_retirement: u32,
    /// Balance on the retirement date
    pub nest_egg: f64,
    /// `nest_egg` in today's dollars
    pub nest_egg_today: f64,
    pub total_contributions: f64,
    pub total_growth: f64,
    /// First monthly withdrawal that lasts exactly to life expectancy,
    /// rising with inflation afterwards
    pub sustainable_monthly_income: f64,
    pub sustainable_monthly_income_today: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_nest_egg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortfall: Option<f64>,
    /// Extra level monthly saving that closes the shortfall
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_monthly_savings: Option<f64>,
    /// Age the savings run out, when before life expectancy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depletion_age: Option<f64>,
    pub rows: Vec<RetirementRow>,
}

/// Calculate a retirement projection.
pub fn calculate(input: &RetirementInput) -> CalcResult<RetirementResult> {
    input.validate()?;

    let years_to_retirement = input.retirement_age - input.current_age;
    let years_in_retirement = input.life_expectancy - input.retirement_age;
    let saving_months = years_to_retirement * 12;
    let retired_months = years_in_retirement * 12;

    let growth_rate = periodic_rate(input.annual_return_pct, Compounding::Annual, 12);
    let drawdown_rate = periodic_rate(input.drawdown_return_pct(), Compounding::Annual, 12);
    let monthly_inflation = periodic_rate(input.inflation_pct, Compounding::Annual, 12);
    let inflation = 1.0 + input.inflation_pct / 100.0;
    let real_rate = (1.0 + drawdown_rate) / (1.0 + monthly_inflation) - 1.0;

    let mut rows = Vec::with_capacity((years_to_retirement + years_in_retirement) as usize);
    let mut balance = input.current_savings;
    let mut total_contributions = 0.0;
    let mut contribution = input.monthly_contribution;

    for year in 0..years_to_retirement {
        let opening = balance;
        let mut contributed = 0.0;
        for _ in 0..12 {
            balance = balance * (1.0 + growth_rate) + contribution;
            contributed += contribution;
        }
        total_contributions += contributed;
        rows.push(RetirementRow {
            age: input.current_age + year + 1,
            phase: RetirementPhase::Saving,
            contributions: contributed,
            withdrawals: 0.0,
            growth: balance - opening - contributed,
            balance,
            real_balance: balance / inflation.powi(year as i32 + 1),
        });
        contribution *= 1.0 + input.contribution_growth_pct / 100.0;
    }

    let nest_egg = balance;
    let deflator = inflation.powi(years_to_retirement as i32);
    let annuity_factor = present_value_of_annuity(1.0, real_rate, retired_months) / (1.0 + monthly_inflation);
    let sustainable_monthly_income = level_payment(nest_egg * (1.0 + monthly_inflation), real_rate, retired_months);

    let (required_nest_egg, shortfall, extra_monthly_savings, first_withdrawal) = match input.desired_annual_income {
        Some(income) => {
            let first = income / 12.0 * deflator;
            let required = first * annuity_factor;
            let gap = (required - nest_egg).max(0.0);
            let extra = gap / future_value(0.0, 1.0, growth_rate, saving_months);
            (Some(required), Some(gap), Some(extra), first)
        }
        None => (None, None, None, sustainable_monthly_income),
    };

    let tolerance = 1e-7 * nest_egg.max(1.0);
    let mut depletion_age = None;
    let mut withdrawal = first_withdrawal;
    let mut month = 0;

    for year in 0..years_in_retirement {
        let opening = balance;
        let mut withdrawn = 0.0;
        for _ in 0..12 {
            month += 1;
            let available = balance * (1.0 + drawdown_rate);
            if depletion_age.is_none() && available + tolerance < withdrawal {
                depletion_age = Some(input.retirement_age as f64 + (month - 1) as f64 / 12.0);
            }
            let paid = withdrawal.min(available.max(0.0));
            balance = (available - paid).max(0.0);
            withdrawn += paid;
            withdrawal *= 1.0 + monthly_inflation;
        }
        let age = input.retirement_age + year + 1;
        rows.push(RetirementRow {
            age,
            phase: RetirementPhase::Retired,
            contributions: 0.0,
            withdrawals: withdrawn,
            growth: balance - opening + withdrawn,
            balance,
            real_balance: balance / inflation.powi((age - input.current_age) as i32),
        });
    }

    tracing::debug!(nest_egg, months = month, "retirement projection complete");

    Ok(RetirementResult {
        years_to_retirement,
        years_in_retirement,
        nest_egg,
        nest_egg_today: nest_egg / deflator,
        total_contributions,
        total_growth: nest_egg - input.current_savings - total_contributions,
        sustainable_monthly_income,
        sustainable_monthly_income_today: sustainable_monthly_income / deflator,
        required_nest_egg,
        shortfall,
        extra_monthly_savings,
        depletion_age,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> RetirementInput {
        RetirementInput {
            current_age: 30,
            retirement_age: 60,
            life_expectancy: 90,
            current_savings: 0.0,
            monthly_contribution: 1_000.0,
            contribution_growth_pct: 0.0,
            annual_return_pct: 0.0,
            retirement_return_pct: None,
            inflation_pct: 0.0,
            desired_annual_income: None,
        }
    }

    #[test]
    fn test_zero_rates_are_plain_sums() {
        let result = calculate(&base_input()).unwrap();
        assert!((result.nest_egg - 360_000.0).abs() < 1e-6);
        assert!((result.sustainable_monthly_income - 1_000.0).abs() < 1e-6);
        assert_eq!(result.rows.len(), 60);
        assert!(result.depletion_age.is_none());
        assert!(result.rows.last().unwrap().balance.abs() < 1e-6);
    }

    #[test]
    fn test_shortfall_and_depletion() {
        let mut input = base_input();
        input.desired_annual_income = Some(24_000.0);
        let result = calculate(&input).unwrap();

        assert!((result.required_nest_egg.unwrap() - 720_000.0).abs() < 1e-6);
        assert!((result.shortfall.unwrap() - 360_000.0).abs() < 1e-6);
        // 360k extra over 360 months
        assert!((result.extra_monthly_savings.unwrap() - 1_000.0).abs() < 1e-6);
        // 360k lasts 180 months at 2k
        assert!((result.depletion_age.unwrap() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_desired_income_at_sustainable_level_lasts() {
        let mut input = base_input();
        input.annual_return_pct = 6.0;
        input.retirement_return_pct = Some(4.0);
        input.inflation_pct = 2.5;
        let sustainable = calculate(&input).unwrap();

        let deflator = 1.025_f64.powi(30);
        input.desired_annual_income = Some(sustainable.sustainable_monthly_income * 12.0 / deflator);
        let result = calculate(&input).unwrap();

        assert!(result.shortfall.unwrap() < 1e-6 * result.nest_egg);
        assert!((result.required_nest_egg.unwrap() - result.nest_egg).abs() < 1e-6 * result.nest_egg);
        assert!(result.depletion_age.is_none());
        assert!(result.rows.last().unwrap().balance < 1e-3 * result.nest_egg);
    }

    #[test]
    fn test_growth_and_inflation() {
        let mut input = base_input();
        input.current_savings = 50_000.0;
        input.annual_return_pct = 7.0;
        input.inflation_pct = 3.0;
        let result = calculate(&input).unwrap();

        assert!(result.nest_egg > 50_000.0 + 360_000.0);
        assert!(result.total_growth > 0.0);
        assert!(result.nest_egg_today < result.nest_egg);
        let row = &result.rows[10];
        assert!(row.real_balance < row.balance);
        assert!((result.total_contributions - 360_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_contribution_growth_raises_nest_egg() {
        let flat = calculate(&base_input()).unwrap();
        let mut input = base_input();
        input.contribution_growth_pct = 3.0;
        let growing = calculate(&input).unwrap();
        assert!(growing.nest_egg > flat.nest_egg);
        assert!((growing.rows[1].contributions - 12_360.0).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_ages() {
        let mut input = base_input();
        input.retirement_age = 30;
        assert!(calculate(&input).is_err());

        let mut input = base_input();
        input.life_expectancy = 60;
        assert!(calculate(&input).is_err());

        let mut input = base_input();
        input.life_expectancy = 130;
        assert!(calculate(&input).is_err());
    }
}
