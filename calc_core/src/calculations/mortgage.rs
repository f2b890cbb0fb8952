//! # Mortgage Calculation
//!
//! Canadian-style mortgage: level payment with semi-annual compounding,
//! default insurance when the down payment is under 20 %, provincial land
//! transfer tax, and the federal stress test.
//!
//! ## Rules Applied
//!
//! - Minimum down payment is 5 % of the price; purchases at or above the
//!   insured-price ceiling need 20 %
//! - Insurance premium (by loan-to-value tier) is added to the loan; the
//!   province's sales tax on the premium is paid at closing
//! - Accelerated frequencies pay the monthly payment ÷ 2 (or ÷ 4) on a
//!   26 (or 52) payment calendar
//! - Qualifying rate is the greater of contract rate + 2 points and 5.25 %
//! - Affordability limits: GDS ≤ 39 %, TDS ≤ 44 % (half of condo fees count)
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::mortgage::{calculate, DownPayment, MortgageInput};
//! use calc_core::amortization::PaymentFrequency;
//! use calc_core::tables::Province;
//!
//! let input = MortgageInput {
//!     home_price: 800_000.0,
//!     down_payment: DownPayment::Percent(20.0),
//!     annual_rate_pct: 5.0,
//!     amortization_years: 25,
//!     payment_frequency: PaymentFrequency::Monthly,
//!     province: Province::Ontario,
//!     costs: None,
//!     affordability: None,
//!     first_time_buyer: false,
//! };
//!
//! let result = calculate(&input).unwrap();
//! assert_eq!(result.schedule.len(), 25);
//! println!("Payment: {:.2}", result.payment);
//! ```

use serde::{Deserialize, Serialize};

use crate::amortization::{amortize, level_payment, periodic_rate, AmortizationRow, Compounding, PaymentFrequency};
use crate::errors::{ensure_non_negative, ensure_positive, ensure_range, CalcError, CalcResult};
use crate::tables::{CmhcTable, Province};

/// Points added to the contract rate for the stress test
pub const STRESS_TEST_BUFFER_PCT: f64 = 2.0;
/// Minimum qualifying rate
pub const STRESS_TEST_FLOOR_PCT: f64 = 5.25;
/// Gross debt service limit
pub const GDS_LIMIT_PCT: f64 = 39.0;
/// Total debt service limit
pub const TDS_LIMIT_PCT: f64 = 44.0;
/// Share of condo fees counted in debt service ratios
const CONDO_FEE_SHARE: f64 = 0.5;
pub const MAX_AMORTIZATION_YEARS: u32 = 30;
const MAX_RATE_PCT: f64 = 30.0;

/// Down payment given either as a dollar amount or as a share of the price.
///
/// Serializes as `{ "amount": 40000.0 }` or `{ "percent": 10.0 }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownPayment {
    Amount(f64),
    Percent(f64),
}

impl DownPayment {
    /// Dollar amount for a given price
    pub fn amount(self, home_price: f64) -> f64 {
        match self {
            DownPayment::Amount(a) => a,
            DownPayment::Percent(p) => home_price * p / 100.0,
        }
    }
}

/// Recurring ownership costs beyond the mortgage payment
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HousingCosts {
    #[serde(default)]
    pub property_tax_annual: f64,
    #[serde(default)]
    pub condo_fees_monthly: f64,
    #[serde(default)]
    pub heating_monthly: f64,
}

impl HousingCosts {
    fn validate(&self) -> CalcResult<()> {
        ensure_non_negative("costs.property_tax_annual", self.property_tax_annual)?;
        ensure_non_negative("costs.condo_fees_monthly", self.condo_fees_monthly)?;
        ensure_non_negative("costs.heating_monthly", self.heating_monthly)
    }

    /// Monthly property tax + heating + `condo_share` of condo fees
    fn monthly(&self, condo_share: f64) -> f64 {
        self.property_tax_annual / 12.0 + self.heating_monthly + self.condo_fees_monthly * condo_share
    }
}

/// Borrower income and debts for the GDS/TDS check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affordability {
    pub gross_annual_income: f64,
    #[serde(default)]
    pub other_debts_monthly: f64,
}

/// Input parameters for a mortgage.
///
/// ## JSON Example
///
/// ```json
/// {
///   "home_price": 500000.0,
///   "down_payment": { "percent": 10.0 },
///   "annual_rate_pct": 4.79,
///   "amortization_years": 25,
///   "payment_frequency": "accelerated_bi_weekly",
///   "province": "ON",
///   "costs": { "property_tax_annual": 4200.0, "heating_monthly": 120.0 },
///   "affordability": { "gross_annual_income": 135000.0, "other_debts_monthly": 450.0 },
///   "first_time_buyer": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageInput {
    /// Purchase price
    pub home_price: f64,

    pub down_payment: DownPayment,

    /// Nominal annual contract rate in percent
    pub annual_rate_pct: f64,

    /// Amortization period in years
    pub amortization_years: u32,

    #[serde(default)]
    pub payment_frequency: PaymentFrequency,

    #[serde(default)]
    pub province: Province,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub costs: Option<HousingCosts>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affordability: Option<Affordability>,

    /// Enables the provincial land transfer tax rebate
    #[serde(default)]
    pub first_time_buyer: bool,
}

impl Default for MortgageInput {
    fn default() -> Self {
        MortgageInput {
            home_price: 500_000.0,
            down_payment: DownPayment::Percent(20.0),
            annual_rate_pct: 5.0,
            amortization_years: 25,
            payment_frequency: PaymentFrequency::default(),
            province: Province::default(),
            costs: None,
            affordability: None,
            first_time_buyer: false,
        }
    }
}

impl MortgageInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        let rules = CmhcTable::get()?;

        ensure_positive("home_price", self.home_price)?;
        match self.down_payment {
            DownPayment::Amount(a) => ensure_non_negative("down_payment", a)?,
            DownPayment::Percent(p) => ensure_range("down_payment", p, 0.0, 100.0)?,
        }

        let down = self.down_payment_amount();
        if down >= self.home_price {
            return Err(CalcError::invalid_input(
                "down_payment",
                down.to_string(),
                "Down payment must be less than the home price",
            ));
        }
        let down_pct = self.down_payment_pct();
        if down_pct + 1e-9 < rules.min_down_payment_pct {
            return Err(CalcError::invalid_input(
                "down_payment",
                format!("{:.2}%", down_pct),
                format!("Minimum down payment is {}% of the home price", rules.min_down_payment_pct),
            ));
        }
        if self.home_price >= rules.max_insured_price && down_pct + 1e-9 < rules.uninsured_down_payment_pct {
            return Err(CalcError::invalid_input(
                "down_payment",
                format!("{:.2}%", down_pct),
                format!(
                    "Homes priced at {} or more need at least {}% down",
                    rules.max_insured_price, rules.uninsured_down_payment_pct
                ),
            ));
        }

        ensure_positive("annual_rate_pct", self.annual_rate_pct)?;
        if self.annual_rate_pct > MAX_RATE_PCT {
            return Err(CalcError::invalid_input(
                "annual_rate_pct",
                self.annual_rate_pct.to_string(),
                format!("Rate above {}% is not a mortgage rate", MAX_RATE_PCT),
            ));
        }
        if self.amortization_years == 0 || self.amortization_years > MAX_AMORTIZATION_YEARS {
            return Err(CalcError::invalid_input(
                "amortization_years",
                self.amortization_years.to_string(),
                format!("Amortization must be between 1 and {} years", MAX_AMORTIZATION_YEARS),
            ));
        }

        if let Some(costs) = &self.costs {
            costs.validate()?;
        }
        if let Some(aff) = &self.affordability {
            ensure_positive("affordability.gross_annual_income", aff.gross_annual_income)?;
            ensure_non_negative("affordability.other_debts_monthly", aff.other_debts_monthly)?;
        }
        Ok(())
    }

    /// Down payment in dollars
    pub fn down_payment_amount(&self) -> f64 {
        self.down_payment.amount(self.home_price)
    }

    /// Down payment as a percentage of the price
    pub fn down_payment_pct(&self) -> f64 {
        self.down_payment_amount() / self.home_price * 100.0
    }
}

/// Default insurance on a high-ratio mortgage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MortgageInsurance {
    /// Loan-to-value before the premium is added
    pub ltv_pct: f64,
    pub premium_rate_pct: f64,
    /// Premium added to the loan
    pub premium: f64,
    /// Provincial sales tax on the premium, paid at closing
    pub premium_sales_tax: f64,
}

/// Stress test and debt service ratios
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressTest {
    pub qualifying_rate_pct: f64,
    /// Monthly payment at the qualifying rate
    pub qualifying_payment: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gds_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tds_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifies: Option<bool>,
}

/// Results from the mortgage calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageResult {
    pub down_payment: f64,
    pub down_payment_pct: f64,
    /// Price minus down payment
    pub base_loan: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance: Option<MortgageInsurance>,
    /// Base loan plus any insurance premium
    pub total_loan: f64,
    pub payment_frequency: PaymentFrequency,
    /// Effective rate per payment period
    pub periodic_rate: f64,
    /// Payment per period
    pub payment: f64,
    /// Payment scaled to a monthly figure
    pub monthly_payment_equivalent: f64,
    pub number_of_payments: u32,
    pub total_interest: f64,
    pub total_paid: f64,
    pub payoff_years: f64,
    /// Interest saved by an accelerated schedule compared with monthly payments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_saved_vs_monthly: Option<f64>,
    pub land_transfer_tax: f64,
    /// Down payment + land transfer tax + premium sales tax
    pub cash_to_close: f64,
    /// Monthly payment equivalent + property tax + heating + condo fees
    pub monthly_housing_cost: f64,
    pub stress_test: StressTest,
    pub schedule: Vec<AmortizationRow>,
}

impl MortgageResult {
    pub fn is_insured(&self) -> bool {
        self.insurance.is_some()
    }
}

/// Qualifying rate for the stress test
pub fn qualifying_rate_pct(annual_rate_pct: f64) -> f64 {
    (annual_rate_pct + STRESS_TEST_BUFFER_PCT).max(STRESS_TEST_FLOOR_PCT)
}

/// Calculate a mortgage.
///
/// # Returns
///
/// * `Ok(MortgageResult)` - Payment, insurance, closing costs, stress test
///   and yearly schedule
/// * `Err(CalcError)` - If inputs are invalid
pub fn calculate(input: &MortgageInput) -> CalcResult<MortgageResult> {
    input.validate()?;
    let rules = CmhcTable::get()?;

    let down_payment = input.down_payment_amount();
    let down_payment_pct = input.down_payment_pct();
    let base_loan = input.home_price - down_payment;

    let insurance = if down_payment_pct < rules.uninsured_down_payment_pct {
        let ltv_pct = base_loan / input.home_price * 100.0;
        let premium_rate_pct = rules.premium_rate_pct(ltv_pct, input.amortization_years)?;
        let premium = base_loan * premium_rate_pct / 100.0;
        let premium_sales_tax = premium * input.province.premium_sales_tax_pct()? / 100.0;
        Some(MortgageInsurance {
            ltv_pct,
            premium_rate_pct,
            premium,
            premium_sales_tax,
        })
    } else {
        None
    };
    let total_loan = base_loan + insurance.map(|i| i.premium).unwrap_or(0.0);

    let frequency = input.payment_frequency;
    let periods_per_year = frequency.periods_per_year();
    let max_periods = input.amortization_years * periods_per_year;
    let rate = periodic_rate(input.annual_rate_pct, Compounding::SemiAnnual, periods_per_year);

    let monthly_rate = periodic_rate(input.annual_rate_pct, Compounding::SemiAnnual, 12);
    let monthly_periods = input.amortization_years * 12;
    let monthly_payment = level_payment(total_loan, monthly_rate, monthly_periods);

    let payment = match frequency.accelerated_divisor() {
        Some(divisor) => monthly_payment / divisor,
        None => level_payment(total_loan, rate, max_periods),
    };
    let schedule = amortize(total_loan, rate, payment, periods_per_year, max_periods)?;

    let interest_saved_vs_monthly = if frequency.is_accelerated() {
        let monthly = amortize(total_loan, monthly_rate, monthly_payment, 12, monthly_periods)?;
        Some(monthly.total_interest - schedule.total_interest)
    } else {
        None
    };

    let costs = input.costs.unwrap_or_default();
    let monthly_payment_equivalent = payment * periods_per_year as f64 / 12.0;
    let land_transfer_tax = input.province.land_transfer_tax(input.home_price, input.first_time_buyer)?;
    let premium_sales_tax = insurance.map(|i| i.premium_sales_tax).unwrap_or(0.0);

    let stress_test = stress_test(input, total_loan, &costs);

    tracing::debug!(
        total_loan,
        payment,
        periods = schedule.periods,
        insured = insurance.is_some(),
        "mortgage calculated"
    );

    Ok(MortgageResult {
        down_payment,
        down_payment_pct,
        base_loan,
        insurance,
        total_loan,
        payment_frequency: frequency,
        periodic_rate: rate,
        payment,
        monthly_payment_equivalent,
        number_of_payments: schedule.periods,
        total_interest: schedule.total_interest,
        total_paid: schedule.total_paid,
        payoff_years: schedule.payoff_years(periods_per_year),
        interest_saved_vs_monthly,
        land_transfer_tax,
        cash_to_close: down_payment + land_transfer_tax + premium_sales_tax,
        monthly_housing_cost: monthly_payment_equivalent + costs.monthly(1.0),
        stress_test,
        schedule: schedule.rows,
    })
}

fn stress_test(input: &MortgageInput, total_loan: f64, costs: &HousingCosts) -> StressTest {
    let qualifying_rate = qualifying_rate_pct(input.annual_rate_pct);
    let qualifying_payment = level_payment(
        total_loan,
        periodic_rate(qualifying_rate, Compounding::SemiAnnual, 12),
        input.amortization_years * 12,
    );

    let (gds_pct, tds_pct, qualifies) = match input.affordability {
        Some(aff) => {
            let monthly_income = aff.gross_annual_income / 12.0;
            let housing = qualifying_payment + costs.monthly(CONDO_FEE_SHARE);
            let gds = housing / monthly_income * 100.0;
            let tds = (housing + aff.other_debts_monthly) / monthly_income * 100.0;
            (Some(gds), Some(tds), Some(gds <= GDS_LIMIT_PCT && tds <= TDS_LIMIT_PCT))
        }
        None => (None, None, None),
    };

    StressTest {
        qualifying_rate_pct: qualifying_rate,
        qualifying_payment,
        gds_pct,
        tds_pct,
        qualifies,
    }
}
