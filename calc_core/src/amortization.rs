//! # Amortization Engine
//!
//! Shared time-value-of-money helpers used by the mortgage, loan and
//! retirement calculators.
//!
//! ## Conventions
//!
//! - Rates are nominal annual percentages (`5.0` = 5 %) compounded
//!   `Compounding::periods_per_year()` times a year. Canadian fixed-rate
//!   mortgages compound semi-annually; most other loans compound monthly.
//! - Payments are made at the end of each period.
//! - The schedule is reported per loan year, not per payment.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::amortization::{amortize, level_payment, periodic_rate, Compounding};
//!
//! let rate = periodic_rate(5.0, Compounding::SemiAnnual, 12);
//! let payment = level_payment(640_000.0, rate, 300);
//! let schedule = amortize(640_000.0, rate, payment, 12, 300).unwrap();
//!
//! assert_eq!(schedule.rows.len(), 25);
//! assert_eq!(schedule.rows.last().unwrap().balance, 0.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Residual balance (relative to the original principal) treated as paid off.
const RELATIVE_BALANCE_TOLERANCE: f64 = 1e-7;

// ============================================================================
// Frequencies
// ============================================================================

/// How often payments are made.
///
/// Accelerated frequencies pay the *monthly* payment split in two (or four)
/// but on a 26 (or 52) period calendar, which adds roughly one extra monthly
/// payment per year and retires the loan early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    #[default]
    Monthly,
    SemiMonthly,
    BiWeekly,
    Weekly,
    AcceleratedBiWeekly,
    AcceleratedWeekly,
}

impl PaymentFrequency {
    /// All frequencies for UI selection
    pub const ALL: [PaymentFrequency; 6] = [
        PaymentFrequency::Monthly,
        PaymentFrequency::SemiMonthly,
        PaymentFrequency::BiWeekly,
        PaymentFrequency::Weekly,
        PaymentFrequency::AcceleratedBiWeekly,
        PaymentFrequency::AcceleratedWeekly,
    ];

    /// Number of payments in a year
    pub fn periods_per_year(self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::SemiMonthly => 24,
            PaymentFrequency::BiWeekly | PaymentFrequency::AcceleratedBiWeekly => 26,
            PaymentFrequency::Weekly | PaymentFrequency::AcceleratedWeekly => 52,
        }
    }

    /// For accelerated schedules, the divisor applied to the monthly payment
    pub fn accelerated_divisor(self) -> Option<f64> {
        match self {
            PaymentFrequency::AcceleratedBiWeekly => Some(2.0),
            PaymentFrequency::AcceleratedWeekly => Some(4.0),
            _ => None,
        }
    }

    pub fn is_accelerated(self) -> bool {
        self.accelerated_divisor().is_some()
    }

    /// Get display name
    pub fn display_name(self) -> &'static str {
        match self {
            PaymentFrequency::Monthly => "Monthly",
            PaymentFrequency::SemiMonthly => "Semi-monthly",
            PaymentFrequency::BiWeekly => "Bi-weekly",
            PaymentFrequency::Weekly => "Weekly",
            PaymentFrequency::AcceleratedBiWeekly => "Accelerated bi-weekly",
            PaymentFrequency::AcceleratedWeekly => "Accelerated weekly",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "monthly" | "m" => Ok(PaymentFrequency::Monthly),
            "semi_monthly" | "semimonthly" => Ok(PaymentFrequency::SemiMonthly),
            "bi_weekly" | "biweekly" => Ok(PaymentFrequency::BiWeekly),
            "weekly" | "w" => Ok(PaymentFrequency::Weekly),
            "accelerated_bi_weekly" | "accelerated_biweekly" | "acc_biweekly" => {
                Ok(PaymentFrequency::AcceleratedBiWeekly)
            }
            "accelerated_weekly" | "acc_weekly" => Ok(PaymentFrequency::AcceleratedWeekly),
            _ => Err(CalcError::not_found("payment frequency", s)),
        }
    }
}

/// How often interest compounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compounding {
    #[default]
    Monthly,
    SemiAnnual,
    Annual,
}

impl Compounding {
    pub fn periods_per_year(self) -> u32 {
        match self {
            Compounding::Monthly => 12,
            Compounding::SemiAnnual => 2,
            Compounding::Annual => 1,
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "monthly" => Ok(Compounding::Monthly),
            "semi_annual" | "semiannual" | "semi_annually" => Ok(Compounding::SemiAnnual),
            "annual" | "annually" | "yearly" => Ok(Compounding::Annual),
            _ => Err(CalcError::not_found("compounding", s)),
        }
    }
}

// ============================================================================
// Closed-form helpers
// ============================================================================

/// Effective rate per payment period.
///
/// `r = (1 + j/m)^(m/f) - 1` for nominal annual rate `j` compounded `m`
/// times a year and `f` payments a year.
pub fn periodic_rate(annual_rate_pct: f64, compounding: Compounding, payments_per_year: u32) -> f64 {
    let j = annual_rate_pct / 100.0;
    let m = compounding.periods_per_year() as f64;
    (1.0 + j / m).powf(m / payments_per_year as f64) - 1.0
}

/// Level payment that retires `principal` in `periods` payments.
///
/// `payment = P · r / (1 − (1+r)^−n)`, or `P / n` for a zero rate.
pub fn level_payment(principal: f64, rate: f64, periods: u32) -> f64 {
    if periods == 0 {
        return principal;
    }
    let n = periods as f64;
    if rate.abs() < f64::EPSILON {
        return principal / n;
    }
    principal * rate / (1.0 - (1.0 + rate).powf(-n))
}

/// Value after `periods` of growth at `rate` with `payment` added at the end
/// of every period.
pub fn future_value(present: f64, payment: f64, rate: f64, periods: u32) -> f64 {
    let n = periods as f64;
    if rate.abs() < f64::EPSILON {
        return present + payment * n;
    }
    let growth = (1.0 + rate).powf(n);
    present * growth + payment * (growth - 1.0) / rate
}

/// Lump sum needed today to fund `periods` end-of-period payments.
pub fn present_value_of_annuity(payment: f64, rate: f64, periods: u32) -> f64 {
    let n = periods as f64;
    if rate.abs() < f64::EPSILON {
        return payment * n;
    }
    payment * (1.0 - (1.0 + rate).powf(-n)) / rate
}

// ============================================================================
// Schedule
// ============================================================================

/// One loan year of an amortization schedule.
///
/// `principal + interest == payment` for every row; `balance` is the balance
/// left at the end of the year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// Loan year, starting at 1
    pub year: u32,
    /// Total paid during the year
    pub payment: f64,
    /// Principal repaid during the year
    pub principal: f64,
    /// Interest charged during the year
    pub interest: f64,
    /// Balance at the end of the year
    pub balance: f64,
}

/// Complete schedule plus totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amortization {
    pub rows: Vec<AmortizationRow>,
    /// Number of payments actually made
    pub periods: u32,
    pub total_interest: f64,
    pub total_paid: f64,
}

impl Amortization {
    /// Time to pay off in years (fractional for early payoff)
    pub fn payoff_years(&self, periods_per_year: u32) -> f64 {
        self.periods as f64 / periods_per_year as f64
    }

    /// Sum of principal repaid across all rows
    pub fn total_principal(&self) -> f64 {
        self.rows.iter().map(|r| r.principal).sum()
    }
}

/// Run a loan down to zero.
///
/// Each period charges `interest = balance × rate` and applies
/// `payment − interest` to principal, capped at the remaining balance so
/// the last payment never overshoots. Periods are rolled up into yearly rows.
///
/// # Errors
///
/// * `InvalidInput` when principal, payment or period counts are unusable
/// * `CalculationFailed` when the payment does not cover the first period's
///   interest or leaves a balance after `max_periods`
pub fn amortize(
    principal: f64,
    rate: f64,
    payment: f64,
    periods_per_year: u32,
    max_periods: u32,
) -> CalcResult<Amortization> {
    if !principal.is_finite() || principal <= 0.0 {
        return Err(CalcError::invalid_input("principal", principal.to_string(), "Principal must be positive"));
    }
    if !payment.is_finite() || payment <= 0.0 {
        return Err(CalcError::invalid_input("payment", payment.to_string(), "Payment must be positive"));
    }
    if periods_per_year == 0 || max_periods == 0 {
        return Err(CalcError::invalid_input(
            "periods",
            max_periods.to_string(),
            "Schedule needs at least one payment period",
        ));
    }
    if rate < 0.0 || !rate.is_finite() {
        return Err(CalcError::invalid_input("rate", rate.to_string(), "Rate cannot be negative"));
    }
    if payment <= principal * rate {
        return Err(CalcError::calculation_failed(
            "Amortization",
            format!("Payment of {:.2} does not cover the first period's interest of {:.2}", payment, principal * rate),
        ));
    }

    let tolerance = principal * RELATIVE_BALANCE_TOLERANCE;
    let mut rows = Vec::with_capacity((max_periods / periods_per_year + 1) as usize);
    let mut balance = principal;
    let mut periods = 0;
    let mut current = AmortizationRow { year: 1, payment: 0.0, principal: 0.0, interest: 0.0, balance };

    for period in 1..=max_periods {
        let interest = balance * rate;
        let mut principal_part = (payment - interest).min(balance);
        balance -= principal_part;
        if balance <= tolerance {
            principal_part += balance;
            balance = 0.0;
        }

        current.payment += principal_part + interest;
        current.principal += principal_part;
        current.interest += interest;
        current.balance = balance;
        periods = period;

        if balance == 0.0 || period % periods_per_year == 0 {
            rows.push(current);
            if balance == 0.0 {
                break;
            }
            current = AmortizationRow {
                year: period / periods_per_year + 1,
                payment: 0.0,
                principal: 0.0,
                interest: 0.0,
                balance,
            };
        }
    }

    if balance > 0.0 {
        return Err(CalcError::calculation_failed(
            "Amortization",
            format!("Balance of {:.2} remains after {} payments", balance, max_periods),
        ));
    }

    let total_interest = rows.iter().map(|r| r.interest).sum();
    let total_paid = rows.iter().map(|r| r.payment).sum();

    Ok(Amortization {
        rows,
        periods,
        total_interest,
        total_paid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canadian_example() -> (f64, f64) {
        let rate = periodic_rate(5.0, Compounding::SemiAnnual, 12);
        (rate, level_payment(640_000.0, rate, 300))
    }

    #[test]
    fn test_semi_annual_periodic_rate() {
        let (rate, _) = canadian_example();
        // (1.025)^(1/6) - 1
        assert!((rate - 0.004_123_915).abs() < 1e-8);
    }

    #[test]
    fn test_level_payment() {
        let (_, payment) = canadian_example();
        assert!((payment - 3722.27).abs() < 0.01);
    }

    #[test]
    fn test_zero_rate_payment() {
        assert!((level_payment(1200.0, 0.0, 12) - 100.0).abs() < 1e-12);
        assert!((future_value(0.0, 100.0, 0.0, 12) - 1200.0).abs() < 1e-12);
        assert!((present_value_of_annuity(100.0, 0.0, 12) - 1200.0).abs() < 1e-12);
    }

    #[test]
    fn test_present_value_inverts_level_payment() {
        let rate = 0.06 / 12.0;
        let payment = level_payment(250_000.0, rate, 360);
        let pv = present_value_of_annuity(payment, rate, 360);
        assert!((pv - 250_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_schedule_balance_reaches_zero() {
        let (rate, payment) = canadian_example();
        let schedule = amortize(640_000.0, rate, payment, 12, 300).unwrap();

        assert_eq!(schedule.rows.len(), 25);
        assert_eq!(schedule.periods, 300);
        assert_eq!(schedule.rows.last().unwrap().balance, 0.0);
        assert!((schedule.total_principal() - 640_000.0).abs() < 1e-6);
        assert!(schedule.total_interest > 0.0);
    }

    #[test]
    fn test_rows_reconstruct_payment_and_never_increase() {
        let (rate, payment) = canadian_example();
        let schedule = amortize(640_000.0, rate, payment, 12, 300).unwrap();

        let mut previous = 640_000.0;
        for row in &schedule.rows {
            assert!((row.principal + row.interest - row.payment).abs() < 1e-6);
            assert!(row.balance <= previous);
            previous = row.balance;
        }
        // Every full year pays 12 level payments
        assert!((schedule.rows[0].payment - payment * 12.0).abs() < 1e-6);
    }

    #[test]
    fn test_larger_payment_pays_off_early() {
        let rate = periodic_rate(5.0, Compounding::SemiAnnual, 26);
        let monthly = level_payment(400_000.0, periodic_rate(5.0, Compounding::SemiAnnual, 12), 300);
        let schedule = amortize(400_000.0, rate, monthly / 2.0, 26, 26 * 25).unwrap();

        assert!(schedule.periods < 26 * 25);
        assert!(schedule.rows.len() < 25);
        assert_eq!(schedule.rows.last().unwrap().balance, 0.0);
        assert!((schedule.total_principal() - 400_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_payment_below_interest_rejected() {
        let err = amortize(100_000.0, 0.01, 500.0, 12, 360).unwrap_err();
        assert_eq!(err.error_code(), "CALCULATION_FAILED");
    }

    #[test]
    fn test_payment_too_small_for_term_rejected() {
        let rate = 0.05 / 12.0;
        let payment = level_payment(100_000.0, rate, 360);
        assert!(amortize(100_000.0, rate, payment, 12, 120).is_err());
    }

    #[test]
    fn test_frequency_parsing() {
        assert_eq!(
            PaymentFrequency::from_str_flexible("Accelerated Bi-Weekly").unwrap(),
            PaymentFrequency::AcceleratedBiWeekly
        );
        assert_eq!(PaymentFrequency::from_str_flexible("semi-monthly").unwrap(), PaymentFrequency::SemiMonthly);
        assert!(PaymentFrequency::from_str_flexible("daily").is_err());
        assert_eq!(Compounding::from_str_flexible("semi-annual").unwrap(), Compounding::SemiAnnual);
    }

    #[test]
    fn test_frequency_serialization() {
        let json = serde_json::to_string(&PaymentFrequency::AcceleratedWeekly).unwrap();
        assert_eq!(json, "\"accelerated_weekly\"");
    }
}
