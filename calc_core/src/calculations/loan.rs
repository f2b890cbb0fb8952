//! # Loan Calculation
//!
//! General level-payment loan (auto, personal, student) with an optional
//! extra payment every month.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::loan::{calculate, LoanInput};
//! use calc_core::amortization::Compounding;
//!
//! let input = LoanInput {
//!     principal: 30_000.0,
//!     annual_rate_pct: 6.5,
//!     term_months: 60,
//!     compounding: Compounding::Monthly,
//!     extra_monthly_payment: 0.0,
//! };
//! let result = calculate(&input).unwrap();
//! assert!((result.monthly_payment - 586.98).abs() < 0.01);
//! ```

use serde::{Deserialize, Serialize};

use crate::amortization::{amortize, level_payment, periodic_rate, AmortizationRow, Compounding};
use crate::errors::{ensure_non_negative, ensure_positive, ensure_range, CalcError, CalcResult};

const MAX_TERM_MONTHS: u32 = 50 * 12;

/// Input parameters for a loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInput {
    pub principal: f64,
    /// Nominal annual rate in percent (0 allowed)
    pub annual_rate_pct: f64,
    pub term_months: u32,
    #[serde(default)]
    pub compounding: Compounding,
    /// Paid on top of the scheduled payment every month
    #[serde(default)]
    pub extra_monthly_payment: f64,
}

impl LoanInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        ensure_positive("principal", self.principal)?;
        ensure_range("annual_rate_pct", self.annual_rate_pct, 0.0, 100.0)?;
        ensure_non_negative("extra_monthly_payment", self.extra_monthly_payment)?;
        if self.term_months == 0 || self.term_months > MAX_TERM_MONTHS {
            return Err(CalcError::invalid_input(
                "term_months",
                self.term_months.to_string(),
                format!("Term must be between 1 and {} months", MAX_TERM_MONTHS),
            ));
        }
        Ok(())
    }
}

/// Results from the loan calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanResult {
    /// Scheduled monthly payment (without the extra)
    pub monthly_payment: f64,
    pub total_interest: f64,
    pub total_paid: f64,
    /// Payments actually made (fewer than the term when paying extra)
    pub months_to_payoff: u32,
    /// Interest avoided thanks to the extra payment
    pub interest_saved: f64,
    pub schedule: Vec<AmortizationRow>,
}

/// Calculate a loan.
pub fn calculate(input: &LoanInput) -> CalcResult<LoanResult> {
    input.validate()?;

    let rate = periodic_rate(input.annual_rate_pct, input.compounding, 12);
    let monthly_payment = level_payment(input.principal, rate, input.term_months);
    let schedule = amortize(
        input.principal,
        rate,
        monthly_payment + input.extra_monthly_payment,
        12,
        input.term_months,
    )?;

    let interest_saved = if input.extra_monthly_payment > 0.0 {
        let baseline = amortize(input.principal, rate, monthly_payment, 12, input.term_months)?;
        baseline.total_interest - schedule.total_interest
    } else {
        0.0
    };

    Ok(LoanResult {
        monthly_payment,
        total_interest: schedule.total_interest,
        total_paid: schedule.total_paid,
        months_to_payoff: schedule.periods,
        interest_saved,
        schedule: schedule.rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_loan() -> LoanInput {
        LoanInput {
            principal: 30_000.0,
            annual_rate_pct: 6.5,
            term_months: 60,
            compounding: Compounding::Monthly,
            extra_monthly_payment: 0.0,
        }
    }

    #[test]
    fn test_monthly_payment() {
        let result = calculate(&test_loan()).unwrap();
        assert!((result.monthly_payment - 586.98).abs() < 0.01);
        assert_eq!(result.months_to_payoff, 60);
        assert_eq!(result.schedule.len(), 5);
        assert!((result.total_paid - result.monthly_payment * 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_rate_loan() {
        let mut input = test_loan();
        input.annual_rate_pct = 0.0;
        let result = calculate(&input).unwrap();
        assert!((result.monthly_payment - 500.0).abs() < 1e-9);
        assert!(result.total_interest.abs() < 1e-9);
    }

    #[test]
    fn test_extra_payment_saves_interest() {
        let mut input = test_loan();
        input.extra_monthly_payment = 200.0;
        let result = calculate(&input).unwrap();
        assert!(result.months_to_payoff < 60);
        assert!(result.interest_saved > 0.0);
        assert_eq!(result.schedule.last().unwrap().balance, 0.0);
    }

    #[test]
    fn test_partial_first_year() {
        let mut input = test_loan();
        input.term_months = 18;
        let result = calculate(&input).unwrap();
        assert_eq!(result.schedule.len(), 2);
        assert_eq!(result.schedule[1].year, 2);
    }

    #[test]
    fn test_invalid_inputs() {
        let mut input = test_loan();
        input.term_months = 0;
        assert!(calculate(&input).is_err());

        let mut input = test_loan();
        input.principal = 0.0;
        assert!(calculate(&input).is_err());

        let mut input = test_loan();
        input.annual_rate_pct = -1.0;
        assert!(calculate(&input).is_err());
    }
}
