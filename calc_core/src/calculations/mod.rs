//! # Calculators
//!
//! Every calculator follows the same pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Result` - Calculation results (JSON-serializable)
//! - `calculate(input) -> Result<*Result, CalcError>` - Pure calculation function
//!
//! [`CalculatorItem`] wraps any input so callers can route a JSON document
//! to the right calculator; [`CalculationOutput`] wraps the matching result.
//!
//! ## Available Calculators
//!
//! - [`mortgage`] - Canadian mortgage payment, insurance, closing costs, stress test
//! - [`loan`] - Generic level-payment loan
//! - [`tdee`] - Daily energy expenditure, BMI and calorie targets
//! - [`vat`] - Add or remove value-added tax
//! - [`probability`] - Dice sums, coin flips, two-event probabilities
//! - [`ratio`] - Simplify and scale ratios
//! - [`bra_size`] - Bra size with regional labels
//! - [`zodiac`] - Western and Chinese zodiac signs
//! - [`commission`] - Flat or tiered sales commission
//! - [`retirement`] - Savings projection and drawdown
//! - [`character_count`] - Text statistics
//! - [`percentage`] - Everyday percentage questions
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::{CalculatorItem, CalculationOutput};
//!
//! let item: CalculatorItem = serde_json::from_str(
//!     r#"{"type": "Vat", "amount": 100, "rate_pct": 20}"#,
//! ).unwrap();
//! match item.calculate().unwrap() {
//!     CalculationOutput::Vat(result) => assert!((result.gross - 120.0).abs() < 1e-9),
//!     _ => unreachable!(),
//! }
//! ```

pub mod bra_size;
pub mod character_count;
pub mod commission;
pub mod loan;
pub mod mortgage;
pub mod percentage;
pub mod probability;
pub mod ratio;
pub mod retirement;
pub mod tdee;
pub mod vat;
pub mod zodiac;

use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;

// Re-export commonly used types
pub use bra_size::{BraSizeInput, BraSizeResult};
pub use character_count::{CharacterCountInput, CharacterCountResult};
pub use commission::{CommissionInput, CommissionResult};
pub use loan::{LoanInput, LoanResult};
pub use mortgage::{MortgageInput, MortgageResult};
pub use percentage::{PercentageInput, PercentageResult};
pub use probability::{CoinFlipInput, CoinFlipResult, DiceInput, DiceResult, EventsInput, EventsResult};
pub use ratio::{RatioInput, RatioResult};
pub use retirement::{RetirementInput, RetirementResult};
pub use tdee::{TdeeInput, TdeeResult};
pub use vat::{VatInput, VatResult};
pub use zodiac::{ZodiacInput, ZodiacResult};

/// Input for any calculator, tagged by `"type"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CalculatorItem {
    Mortgage(MortgageInput),
    Loan(LoanInput),
    Tdee(TdeeInput),
    Vat(VatInput),
    Dice(DiceInput),
    CoinFlip(CoinFlipInput),
    Events(EventsInput),
    Ratio(RatioInput),
    BraSize(BraSizeInput),
    Zodiac(ZodiacInput),
    Commission(CommissionInput),
    Retirement(RetirementInput),
    CharacterCount(CharacterCountInput),
    Percentage(PercentageInput),
}

/// Result of any calculator, tagged by `"type"` like its input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CalculationOutput {
    Mortgage(MortgageResult),
    Loan(LoanResult),
    Tdee(TdeeResult),
    Vat(VatResult),
    Dice(DiceResult),
    CoinFlip(CoinFlipResult),
    Events(EventsResult),
    Ratio(RatioResult),
    BraSize(BraSizeResult),
    Zodiac(ZodiacResult),
    Commission(CommissionResult),
    Retirement(RetirementResult),
    CharacterCount(CharacterCountResult),
    Percentage(PercentageResult),
}

impl CalculatorItem {
    /// Validate and run the wrapped calculator
    pub fn calculate(&self) -> CalcResult<CalculationOutput> {
        tracing::debug!(calculator = self.calc_type(), "running calculation");
        let output = match self {
            CalculatorItem::Mortgage(i) => CalculationOutput::Mortgage(mortgage::calculate(i)?),
            CalculatorItem::Loan(i) => CalculationOutput::Loan(loan::calculate(i)?),
            CalculatorItem::Tdee(i) => CalculationOutput::Tdee(tdee::calculate(i)?),
            CalculatorItem::Vat(i) => CalculationOutput::Vat(vat::calculate(i)?),
            CalculatorItem::Dice(i) => CalculationOutput::Dice(probability::calculate_dice(i)?),
            CalculatorItem::CoinFlip(i) => CalculationOutput::CoinFlip(probability::calculate_coin_flip(i)?),
            CalculatorItem::Events(i) => CalculationOutput::Events(probability::calculate_events(i)?),
            CalculatorItem::Ratio(i) => CalculationOutput::Ratio(ratio::calculate(i)?),
            CalculatorItem::BraSize(i) => CalculationOutput::BraSize(bra_size::calculate(i)?),
            CalculatorItem::Zodiac(i) => CalculationOutput::Zodiac(zodiac::calculate(i)?),
            CalculatorItem::Commission(i) => CalculationOutput::Commission(commission::calculate(i)?),
            CalculatorItem::Retirement(i) => CalculationOutput::Retirement(retirement::calculate(i)?),
            CalculatorItem::CharacterCount(i) => CalculationOutput::CharacterCount(character_count::calculate(i)?),
            CalculatorItem::Percentage(i) => CalculationOutput::Percentage(percentage::calculate(i)?),
        };
        Ok(output)
    }

    /// Get the calculation type as a string (the serde tag)
    pub fn calc_type(&self) -> &'static str {
        match self {
            CalculatorItem::Mortgage(_) => "Mortgage",
            CalculatorItem::Loan(_) => "Loan",
            CalculatorItem::Tdee(_) => "Tdee",
            CalculatorItem::Vat(_) => "Vat",
            CalculatorItem::Dice(_) => "Dice",
            CalculatorItem::CoinFlip(_) => "CoinFlip",
            CalculatorItem::Events(_) => "Events",
            CalculatorItem::Ratio(_) => "Ratio",
            CalculatorItem::BraSize(_) => "BraSize",
            CalculatorItem::Zodiac(_) => "Zodiac",
            CalculatorItem::Commission(_) => "Commission",
            CalculatorItem::Retirement(_) => "Retirement",
            CalculatorItem::CharacterCount(_) => "CharacterCount",
            CalculatorItem::Percentage(_) => "Percentage",
        }
    }
}

impl CalculationOutput {
    pub fn calc_type(&self) -> &'static str {
        match self {
            CalculationOutput::Mortgage(_) => "Mortgage",
            CalculationOutput::Loan(_) => "Loan",
            CalculationOutput::Tdee(_) => "Tdee",
            CalculationOutput::Vat(_) => "Vat",
            CalculationOutput::Dice(_) => "Dice",
            CalculationOutput::CoinFlip(_) => "CoinFlip",
            CalculationOutput::Events(_) => "Events",
            CalculationOutput::Ratio(_) => "Ratio",
            CalculationOutput::BraSize(_) => "BraSize",
            CalculationOutput::Zodiac(_) => "Zodiac",
            CalculationOutput::Commission(_) => "Commission",
            CalculationOutput::Retirement(_) => "Retirement",
            CalculationOutput::CharacterCount(_) => "CharacterCount",
            CalculationOutput::Percentage(_) => "Percentage",
        }
    }

    /// Title for reports
    pub fn display_name(&self) -> &'static str {
        match self {
            CalculationOutput::Mortgage(_) => "Mortgage Payment",
            CalculationOutput::Loan(_) => "Loan Payment",
            CalculationOutput::Tdee(_) => "TDEE & Calorie Needs",
            CalculationOutput::Vat(_) => "VAT",
            CalculationOutput::Dice(_) => "Dice Probability",
            CalculationOutput::CoinFlip(_) => "Coin Flip Probability",
            CalculationOutput::Events(_) => "Two-Event Probability",
            CalculationOutput::Ratio(_) => "Ratio",
            CalculationOutput::BraSize(_) => "Bra Size",
            CalculationOutput::Zodiac(_) => "Zodiac Sign",
            CalculationOutput::Commission(_) => "Sales Commission",
            CalculationOutput::Retirement(_) => "Retirement Savings",
            CalculationOutput::CharacterCount(_) => "Character Count",
            CalculationOutput::Percentage(_) => "Percentage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_input_dispatch() {
        let item: CalculatorItem =
            serde_json::from_str(r#"{"type": "Dice", "dice": 2, "sides": 6, "target": 7}"#).unwrap();
        assert_eq!(item.calc_type(), "Dice");
        match item.calculate().unwrap() {
            CalculationOutput::Dice(result) => assert!((result.probability - 6.0 / 36.0).abs() < 1e-12),
            other => panic!("unexpected output {:?}", other),
        }
    }

    #[test]
    fn test_output_carries_same_tag() {
        let item = CalculatorItem::Ratio(RatioInput { a: 1920.0, b: 1080.0, scale_a: None });
        let output = item.calculate().unwrap();
        assert_eq!(output.calc_type(), item.calc_type());

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["type"], "Ratio");
        assert_eq!(json["simplified_a"], 16);
    }

    #[test]
    fn test_mortgage_document() {
        let item: CalculatorItem = serde_json::from_str(
            r#"{
                "type": "Mortgage",
                "home_price": 800000,
                "down_payment": {"percent": 20},
                "annual_rate_pct": 5,
                "amortization_years": 25
            }"#,
        )
        .unwrap();
        let output = item.calculate().unwrap();
        assert_eq!(output.display_name(), "Mortgage Payment");
        let roundtrip: CalculationOutput = serde_json::from_str(&serde_json::to_string(&output).unwrap()).unwrap();
        match roundtrip {
            CalculationOutput::Mortgage(result) => {
                assert!(!result.is_insured());
                assert_eq!(result.schedule.len(), 25);
            }
            other => panic!("unexpected output {:?}", other),
        }
    }

    #[test]
    fn test_validation_error_propagates() {
        let item = CalculatorItem::Vat(VatInput { amount: -5.0, rate_pct: 20.0, mode: Default::default() });
        let err = item.calculate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let result: Result<CalculatorItem, _> = serde_json::from_str(r#"{"type": "Horoscope"}"#);
        assert!(result.is_err());
    }
}
