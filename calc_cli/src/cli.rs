//! Command-line arguments and their mapping onto calculator inputs.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use calc_core::amortization::{Compounding, PaymentFrequency};
use calc_core::calculations::bra_size::BraSizeInput;
use calc_core::calculations::character_count::CharacterCountInput;
use calc_core::calculations::commission::{CommissionInput, CommissionPlan};
use calc_core::calculations::loan::LoanInput;
use calc_core::calculations::mortgage::{Affordability, DownPayment, HousingCosts, MortgageInput};
use calc_core::calculations::percentage::{PercentageInput, PercentageMode};
use calc_core::calculations::probability::{CoinFlipInput, Comparison, DiceInput, EventsInput};
use calc_core::calculations::ratio::RatioInput;
use calc_core::calculations::retirement::RetirementInput;
use calc_core::calculations::tdee::{ActivityLevel, BmrFormula, Sex, TdeeInput};
use calc_core::calculations::vat::{VatInput, VatMode};
use calc_core::calculations::zodiac::ZodiacInput;
use calc_core::calculations::CalculatorItem;
use calc_core::errors::CalcError;
use calc_core::tables::{Bracket, Province};
use calc_core::units::{LengthUnit, UnitSystem};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::config::{DefaultsConfig, OutputFormat};

#[derive(Debug, Parser)]
#[command(name = "calc_cli", version)]
#[command(about = "Everyday calculators: mortgages, loans, nutrition, probability and more")]
pub struct Cli {
    /// Output format (overrides the config file)
    #[arg(short, long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Path to a TOML config file (default: ./calcshelf.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also print a share link that reproduces this calculation
    #[arg(long, global = true)]
    pub share: bool,

    /// Limit the schedule table to this many rows
    #[arg(long, global = true)]
    pub schedule_rows: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Canadian mortgage payment, insurance, closing costs and stress test
    Mortgage(MortgageArgs),
    /// Level-payment loan
    Loan(LoanArgs),
    /// Daily energy expenditure and calorie targets
    Tdee(TdeeArgs),
    /// Add or remove VAT
    Vat(VatArgs),
    /// Probability of a dice sum
    Dice(DiceArgs),
    /// Probability of a number of heads
    CoinFlip(CoinFlipArgs),
    /// Combine two independent events
    Events(EventsArgs),
    /// Simplify and scale a ratio
    Ratio(RatioArgs),
    /// Bra size from underbust and bust measurements
    BraSize(BraSizeArgs),
    /// Western and Chinese zodiac signs
    Zodiac(ZodiacArgs),
    /// Flat or tiered sales commission
    Commission(CommissionArgs),
    /// Retirement savings projection
    Retirement(RetirementArgs),
    /// Count characters, words and sentences
    CharCount(CharCountArgs),
    /// Everyday percentage questions
    Percentage(PercentageArgs),
    /// Run a calculator from a JSON document
    Run(RunArgs),
    /// Rebuild a calculation from a share link or query string
    Open(OpenArgs),
}

#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct DownPaymentArgs {
    /// Down payment in dollars
    #[arg(long)]
    pub down: Option<f64>,
    /// Down payment as a percent of the price
    #[arg(long)]
    pub down_pct: Option<f64>,
}

#[derive(Debug, Clone, Args)]
pub struct MortgageArgs {
    /// Purchase price
    #[arg(long)]
    pub price: f64,
    #[command(flatten)]
    pub down_payment: DownPaymentArgs,
    /// Annual contract rate in percent
    #[arg(long)]
    pub rate: f64,
    /// Amortization period in years
    #[arg(long, default_value_t = 25)]
    pub years: u32,
    /// monthly, semi-monthly, bi-weekly, weekly, accelerated-bi-weekly, accelerated-weekly
    #[arg(long, value_parser = PaymentFrequency::from_str_flexible)]
    pub frequency: Option<PaymentFrequency>,
    /// Two-letter province code
    #[arg(long, value_parser = Province::from_str_flexible)]
    pub province: Option<Province>,
    #[arg(long)]
    pub first_time_buyer: bool,
    #[arg(long)]
    pub property_tax: Option<f64>,
    #[arg(long)]
    pub condo_fees: Option<f64>,
    #[arg(long)]
    pub heating: Option<f64>,
    /// Gross annual household income, enables the GDS/TDS check
    #[arg(long)]
    pub income: Option<f64>,
    /// Other monthly debt payments
    #[arg(long, requires = "income")]
    pub debts: Option<f64>,
}

#[derive(Debug, Clone, Args)]
pub struct LoanArgs {
    #[arg(long)]
    pub principal: f64,
    /// Annual rate in percent
    #[arg(long)]
    pub rate: f64,
    /// Term in months
    #[arg(long)]
    pub months: u32,
    #[arg(long, value_parser = Compounding::from_str_flexible)]
    pub compounding: Option<Compounding>,
    /// Extra amount paid every month
    #[arg(long, default_value_t = 0.0)]
    pub extra: f64,
}

#[derive(Debug, Clone, Args)]
pub struct TdeeArgs {
    #[arg(long, value_parser = Sex::from_str_flexible)]
    pub sex: Sex,
    #[arg(long)]
    pub age: u32,
    /// kg (metric) or lb (imperial)
    #[arg(long)]
    pub weight: f64,
    /// cm (metric) or in (imperial)
    #[arg(long)]
    pub height: f64,
    #[arg(long, value_parser = UnitSystem::from_str_flexible)]
    pub units: Option<UnitSystem>,
    #[arg(long, value_parser = ActivityLevel::from_str_flexible)]
    pub activity: Option<ActivityLevel>,
    #[arg(long, value_parser = BmrFormula::from_str_flexible)]
    pub formula: Option<BmrFormula>,
    #[arg(long)]
    pub body_fat: Option<f64>,
}

#[derive(Debug, Clone, Args)]
pub struct VatArgs {
    pub amount: f64,
    /// Rate in percent (default from config)
    #[arg(long)]
    pub rate: Option<f64>,
    /// Treat the amount as gross and extract the VAT
    #[arg(long)]
    pub remove: bool,
}

#[derive(Debug, Clone, Args)]
pub struct DiceArgs {
    #[arg(long, default_value_t = 2)]
    pub dice: u32,
    #[arg(long, default_value_t = 6)]
    pub sides: u32,
    #[arg(long)]
    pub target: u32,
    /// exactly, at-least or at-most
    #[arg(long, value_parser = Comparison::from_str_flexible)]
    pub comparison: Option<Comparison>,
}

#[derive(Debug, Clone, Args)]
pub struct CoinFlipArgs {
    #[arg(long)]
    pub flips: u32,
    #[arg(long)]
    pub heads: u32,
    #[arg(long, value_parser = Comparison::from_str_flexible)]
    pub comparison: Option<Comparison>,
    /// Probability of heads on one flip
    #[arg(long, default_value_t = 0.5)]
    pub p_heads: f64,
}

#[derive(Debug, Clone, Args)]
pub struct EventsArgs {
    /// P(A) as a fraction
    #[arg(long)]
    pub p_a: f64,
    /// P(B) as a fraction
    #[arg(long)]
    pub p_b: f64,
}

#[derive(Debug, Clone, Args)]
pub struct RatioArgs {
    pub a: f64,
    pub b: f64,
    /// Scale so the first term equals this value
    #[arg(long)]
    pub scale: Option<f64>,
}

#[derive(Debug, Clone, Args)]
pub struct BraSizeArgs {
    #[arg(long)]
    pub underbust: f64,
    #[arg(long)]
    pub bust: f64,
    /// in or cm
    #[arg(long, value_parser = LengthUnit::from_str_flexible)]
    pub unit: Option<LengthUnit>,
}

#[derive(Debug, Clone, Args)]
pub struct ZodiacArgs {
    /// Birth date, YYYY-MM-DD
    pub birth_date: NaiveDate,
}

#[derive(Debug, Clone, Args)]
pub struct CommissionArgs {
    #[arg(long)]
    pub sales: f64,
    /// Flat rate in percent
    #[arg(long, conflicts_with = "tier")]
    pub rate: Option<f64>,
    /// Marginal tier as UP_TO:RATE; leave UP_TO empty for the top tier (":10")
    #[arg(long, value_parser = parse_tier)]
    pub tier: Vec<Bracket>,
    #[arg(long, default_value_t = 0.0)]
    pub base_salary: f64,
    /// Total pay to solve the required sales for
    #[arg(long)]
    pub target: Option<f64>,
}

#[derive(Debug, Clone, Args)]
pub struct RetirementArgs {
    #[arg(long)]
    pub age: u32,
    #[arg(long)]
    pub retire_at: u32,
    #[arg(long, default_value_t = 90)]
    pub life_expectancy: u32,
    #[arg(long, default_value_t = 0.0)]
    pub savings: f64,
    #[arg(long, default_value_t = 0.0)]
    pub monthly: f64,
    /// Yearly raise of the monthly contribution, percent
    #[arg(long, default_value_t = 0.0)]
    pub contribution_growth: f64,
    /// Annual return before retirement, percent
    #[arg(long, default_value_t = 6.0)]
    pub return_pct: f64,
    /// Annual return after retirement, percent
    #[arg(long)]
    pub retirement_return: Option<f64>,
    #[arg(long, default_value_t = 2.0)]
    pub inflation: f64,
    /// Desired yearly income in today's dollars
    #[arg(long)]
    pub income: Option<f64>,
}

#[derive(Debug, Clone, Args)]
pub struct CharCountArgs {
    /// Text to analyse; reads stdin when omitted
    #[arg(conflicts_with = "file")]
    pub text: Option<String>,
    #[arg(long)]
    pub file: Option<PathBuf>,
    #[arg(long, default_value_t = 238.0)]
    pub reading_wpm: f64,
    #[arg(long, default_value_t = 150.0)]
    pub speaking_wpm: f64,
}

#[derive(Debug, Clone, Args)]
pub struct PercentageArgs {
    /// percent-of, what-percent, change or difference
    #[arg(long, value_parser = PercentageMode::from_str_flexible, default_value = "percent-of")]
    pub mode: PercentageMode,
    #[arg(allow_negative_numbers = true)]
    pub x: f64,
    #[arg(allow_negative_numbers = true)]
    pub y: f64,
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// JSON file with a tagged calculator input, or "-" for stdin
    #[arg(short, long)]
    pub input: String,
}

#[derive(Debug, Clone, Args)]
pub struct OpenArgs {
    /// Share URL or bare query string
    pub link: String,
}

/// Parse `UP_TO:RATE` (or `:RATE` for an open-ended tier)
pub fn parse_tier(s: &str) -> Result<Bracket, String> {
    let (up_to, rate) = s
        .split_once(':')
        .ok_or_else(|| format!("expected UP_TO:RATE, got '{}'", s))?;
    let rate_pct = rate
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid rate '{}': {}", rate, e))?;
    let up_to = match up_to.trim() {
        "" => None,
        bound => Some(bound.parse::<f64>().map_err(|e| format!("invalid bound '{}': {}", bound, e))?),
    };
    Ok(Bracket { up_to, rate_pct })
}

fn read_source(path: &str) -> Result<String> {
    if path == "-" {
        std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))
    }
}

/// Parse a tagged JSON document from a file or stdin
pub fn read_item(path: &str) -> Result<CalculatorItem> {
    let json = read_source(path)?;
    let item = serde_json::from_str(&json)
        .map_err(CalcError::from)
        .with_context(|| format!("{} is not a valid calculator input", path))?;
    Ok(item)
}

impl Command {
    /// Build the calculator input this command describes.
    pub fn to_item(&self, defaults: &DefaultsConfig) -> Result<CalculatorItem> {
        let item = match self {
            Command::Mortgage(a) => {
                let down_payment = match (a.down_payment.down, a.down_payment.down_pct) {
                    (Some(amount), _) => DownPayment::Amount(amount),
                    (None, Some(pct)) => DownPayment::Percent(pct),
                    (None, None) => bail!("either --down or --down-pct is required"),
                };
                let costs = if a.property_tax.is_some() || a.condo_fees.is_some() || a.heating.is_some() {
                    Some(HousingCosts {
                        property_tax_annual: a.property_tax.unwrap_or_default(),
                        condo_fees_monthly: a.condo_fees.unwrap_or_default(),
                        heating_monthly: a.heating.unwrap_or_default(),
                    })
                } else {
                    None
                };
                CalculatorItem::Mortgage(MortgageInput {
                    home_price: a.price,
                    down_payment,
                    annual_rate_pct: a.rate,
                    amortization_years: a.years,
                    payment_frequency: a.frequency.unwrap_or(defaults.payment_frequency),
                    province: a.province.unwrap_or(defaults.province),
                    costs,
                    affordability: a.income.map(|income| Affordability {
                        gross_annual_income: income,
                        other_debts_monthly: a.debts.unwrap_or_default(),
                    }),
                    first_time_buyer: a.first_time_buyer,
                })
            }
            Command::Loan(a) => CalculatorItem::Loan(LoanInput {
                principal: a.principal,
                annual_rate_pct: a.rate,
                term_months: a.months,
                compounding: a.compounding.unwrap_or_default(),
                extra_monthly_payment: a.extra,
            }),
            Command::Tdee(a) => CalculatorItem::Tdee(TdeeInput {
                sex: a.sex,
                age_years: a.age,
                weight: a.weight,
                height: a.height,
                units: a.units.unwrap_or(defaults.unit_system),
                activity: a.activity.unwrap_or_default(),
                formula: a.formula.unwrap_or_default(),
                body_fat_pct: a.body_fat,
            }),
            Command::Vat(a) => CalculatorItem::Vat(VatInput {
                amount: a.amount,
                rate_pct: a.rate.unwrap_or(defaults.vat_rate_pct),
                mode: if a.remove { VatMode::Remove } else { VatMode::Add },
            }),
            Command::Dice(a) => CalculatorItem::Dice(DiceInput {
                dice: a.dice,
                sides: a.sides,
                target: a.target,
                comparison: a.comparison.unwrap_or_default(),
            }),
            Command::CoinFlip(a) => CalculatorItem::CoinFlip(CoinFlipInput {
                flips: a.flips,
                heads: a.heads,
                comparison: a.comparison.unwrap_or_default(),
                p_heads: a.p_heads,
            }),
            Command::Events(a) => CalculatorItem::Events(EventsInput { p_a: a.p_a, p_b: a.p_b }),
            Command::Ratio(a) => CalculatorItem::Ratio(RatioInput { a: a.a, b: a.b, scale_a: a.scale }),
            Command::BraSize(a) => CalculatorItem::BraSize(BraSizeInput {
                underbust: a.underbust,
                bust: a.bust,
                unit: a.unit.unwrap_or_default(),
            }),
            Command::Zodiac(a) => CalculatorItem::Zodiac(ZodiacInput { birth_date: a.birth_date }),
            Command::Commission(a) => {
                let plan = if a.tier.is_empty() {
                    a.rate.map(|rate_pct| CommissionPlan::Flat { rate_pct }).unwrap_or_default()
                } else {
                    CommissionPlan::Tiered { tiers: a.tier.clone() }
                };
                CalculatorItem::Commission(CommissionInput {
                    sales: a.sales,
                    plan,
                    base_salary: a.base_salary,
                    target_earnings: a.target,
                })
            }
            Command::Retirement(a) => CalculatorItem::Retirement(RetirementInput {
                current_age: a.age,
                retirement_age: a.retire_at,
                life_expectancy: a.life_expectancy,
                current_savings: a.savings,
                monthly_contribution: a.monthly,
                contribution_growth_pct: a.contribution_growth,
                annual_return_pct: a.return_pct,
                retirement_return_pct: a.retirement_return,
                inflation_pct: a.inflation,
                desired_annual_income: a.income,
            }),
            Command::CharCount(a) => {
                let text = match (&a.text, &a.file) {
                    (Some(text), _) => text.clone(),
                    (None, Some(path)) => std::fs::read_to_string(path)
                        .with_context(|| format!("Failed to read {}", path.display()))?,
                    (None, None) => read_source("-")?,
                };
                CalculatorItem::CharacterCount(CharacterCountInput {
                    text,
                    reading_wpm: a.reading_wpm,
                    speaking_wpm: a.speaking_wpm,
                })
            }
            Command::Percentage(a) => CalculatorItem::Percentage(PercentageInput { mode: a.mode, x: a.x, y: a.y }),
            Command::Run(a) => read_item(&a.input)?,
            Command::Open(a) => {
                calc_core::share::from_query(&a.link).context("Could not rebuild the calculation from the link")?
            }
        };
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn item(args: &[&str]) -> CalculatorItem {
        let cli = Cli::try_parse_from(args).unwrap();
        cli.command.to_item(&DefaultsConfig::default()).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_mortgage_args() {
        let item = item(&[
            "calc_cli", "mortgage", "--price", "640000", "--down-pct", "5", "--rate", "5",
            "--frequency", "accelerated-bi-weekly", "--province", "bc", "--income", "150000",
        ]);
        match item {
            CalculatorItem::Mortgage(m) => {
                assert_eq!(m.down_payment, DownPayment::Percent(5.0));
                assert_eq!(m.amortization_years, 25);
                assert_eq!(m.payment_frequency, PaymentFrequency::AcceleratedBiWeekly);
                assert_eq!(m.province, Province::BritishColumbia);
                assert!(m.costs.is_none());
                assert_eq!(m.affordability.unwrap().gross_annual_income, 150_000.0);
            }
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_down_payment_is_required_and_exclusive() {
        assert!(Cli::try_parse_from(["calc_cli", "mortgage", "--price", "5e5", "--rate", "5"]).is_err());
        assert!(Cli::try_parse_from([
            "calc_cli", "mortgage", "--price", "5e5", "--rate", "5", "--down", "1e5", "--down-pct", "20",
        ])
        .is_err());
    }

    #[test]
    fn test_defaults_fill_missing_flags() {
        let defaults = DefaultsConfig {
            vat_rate_pct: 19.0,
            ..DefaultsConfig::default()
        };
        let cli = Cli::try_parse_from(["calc_cli", "vat", "119", "--remove"]).unwrap();
        match cli.command.to_item(&defaults).unwrap() {
            CalculatorItem::Vat(v) => {
                assert_eq!(v.rate_pct, 19.0);
                assert_eq!(v.mode, VatMode::Remove);
            }
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_commission_tiers() {
        assert_eq!(parse_tier("50000:5").unwrap(), Bracket { up_to: Some(50_000.0), rate_pct: 5.0 });
        assert_eq!(parse_tier(":10").unwrap(), Bracket { up_to: None, rate_pct: 10.0 });
        assert!(parse_tier("10").is_err());

        match item(&["calc_cli", "commission", "--sales", "1000", "--tier", "500:1", "--tier", ":2"]) {
            CalculatorItem::Commission(c) => assert!(matches!(c.plan, CommissionPlan::Tiered { ref tiers } if tiers.len() == 2)),
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["calc_cli", "dice", "--target", "7", "--format", "json", "--share"]).unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(cli.share);
        assert!(matches!(cli.command.to_item(&DefaultsConfig::default()).unwrap(), CalculatorItem::Dice(_)));
    }

    #[test]
    fn test_zodiac_and_percentage_args() {
        assert!(matches!(item(&["calc_cli", "zodiac", "1990-07-30"]), CalculatorItem::Zodiac(_)));
        match item(&["calc_cli", "percentage", "--mode", "change", "-50", "-25"]) {
            CalculatorItem::Percentage(p) => {
                assert_eq!(p.mode, PercentageMode::Change);
                assert_eq!(p.x, -50.0);
            }
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_open_share_query() {
        let item = item(&["calc_cli", "open", "type=Ratio&a=4&b=3"]);
        assert_eq!(item, CalculatorItem::Ratio(RatioInput { a: 4.0, b: 3.0, scale_a: None }));
    }
}
