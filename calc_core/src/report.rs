//! # Text Reports
//!
//! Renders any [`CalculationOutput`] as a plain-text report: a title banner,
//! aligned `label: value` lines and, where the calculator has one, a table.
//!
//! Output depends only on the result and the [`ReportOptions`], so the same
//! input always renders byte-for-byte the same report.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::{CalculatorItem, VatInput};
//! use calc_core::report::{render, ReportOptions};
//!
//! let item = CalculatorItem::Vat(VatInput { amount: 1000.0, rate_pct: 20.0, mode: Default::default() });
//! let text = render(&item.calculate().unwrap(), &ReportOptions::default());
//! assert!(text.contains("$1,200.00"));
//! ```

use serde::{Deserialize, Serialize};

use crate::amortization::AmortizationRow;
use crate::calculations::CalculationOutput;

const BANNER_WIDTH: usize = 48;
const LABEL_WIDTH: usize = 26;

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_decimals() -> usize {
    2
}

/// Formatting knobs for [`render`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOptions {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    /// Decimal places for money and percentages
    #[serde(default = "default_decimals")]
    pub decimals: usize,
    /// Maximum schedule rows to print; `None` prints all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_rows: Option<usize>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            currency_symbol: default_currency_symbol(),
            decimals: default_decimals(),
            schedule_rows: None,
        }
    }
}

/// Group the integer part with commas: `1234567.891` → `"1,234,567.89"`
pub fn format_number(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let negative = value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// `-1234.5` → `"-$1,234.50"`
pub fn format_money(value: f64, symbol: &str, decimals: usize) -> String {
    let number = format_number(value, decimals);
    match number.strip_prefix('-') {
        Some(rest) => format!("-{}{}", symbol, rest),
        None => format!("{}{}", symbol, number),
    }
}

/// Builds a report line by line
struct Report<'a> {
    opts: &'a ReportOptions,
    out: String,
}

impl<'a> Report<'a> {
    fn new(title: &str, opts: &'a ReportOptions) -> Self {
        let rule = "═".repeat(BANNER_WIDTH);
        let out = format!("{}\n  {}\n{}\n", rule, title.to_uppercase(), rule);
        Report { opts, out }
    }

    fn section(&mut self, name: &str) {
        self.out.push('\n');
        self.out.push_str(name);
        self.out.push_str(":\n");
    }

    fn line(&mut self, label: &str, value: impl AsRef<str>) {
        let label = format!("{}:", label);
        self.out
            .push_str(&format!("  {:<width$} {}\n", label, value.as_ref(), width = LABEL_WIDTH));
    }

    fn money(&self, value: f64) -> String {
        format_money(value, &self.opts.currency_symbol, self.opts.decimals)
    }

    fn pct(&self, value: f64) -> String {
        format!("{}%", format_number(value, self.opts.decimals))
    }

    fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>, limit: Option<usize>) {
        let total = rows.len();
        let shown = limit.unwrap_or(total).min(total);
        let rows = &rows[..shown];

        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        self.out.push('\n');
        let header: Vec<String> = headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| format!("{:>width$}", h, width = *w))
            .collect();
        self.out.push_str(&format!("  {}\n", header.join("  ")));
        let underline: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        self.out.push_str(&format!("  {}\n", underline.join("  ")));
        for row in rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:>width$}", c, width = *w))
                .collect();
            self.out.push_str(&format!("  {}\n", cells.join("  ")));
        }
        if shown < total {
            self.out.push_str(&format!("  ... {} more rows\n", total - shown));
        }
    }

    fn schedule(&mut self, schedule: &[AmortizationRow]) {
        let rows = schedule
            .iter()
            .map(|r| {
                vec![
                    r.year.to_string(),
                    self.money(r.payment),
                    self.money(r.principal),
                    self.money(r.interest),
                    self.money(r.balance),
                ]
            })
            .collect();
        let limit = self.opts.schedule_rows;
        self.table(&["Year", "Payment", "Principal", "Interest", "Balance"], rows, limit);
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Render a calculation result as plain text.
pub fn render(output: &CalculationOutput, opts: &ReportOptions) -> String {
    let mut r = Report::new(output.display_name(), opts);

    match output {
        CalculationOutput::Mortgage(m) => {
            r.line("Down payment", format!("{} ({})", r.money(m.down_payment), r.pct(m.down_payment_pct)));
            r.line("Base loan", r.money(m.base_loan));
            if let Some(ins) = &m.insurance {
                r.line("CMHC premium", format!("{} ({})", r.money(ins.premium), r.pct(ins.premium_rate_pct)));
                r.line("Premium sales tax", r.money(ins.premium_sales_tax));
            }
            r.line("Total mortgage", r.money(m.total_loan));
            r.section("Payments");
            r.line(m.payment_frequency.display_name(), r.money(m.payment));
            r.line("Monthly equivalent", r.money(m.monthly_payment_equivalent));
            r.line("Number of payments", m.number_of_payments.to_string());
            r.line("Paid off in", format!("{:.1} years", m.payoff_years));
            r.line("Total interest", r.money(m.total_interest));
            r.line("Total paid", r.money(m.total_paid));
            if let Some(saved) = m.interest_saved_vs_monthly {
                r.line("Interest saved", r.money(saved));
            }
            r.section("Closing");
            r.line("Land transfer tax", r.money(m.land_transfer_tax));
            r.line("Cash to close", r.money(m.cash_to_close));
            r.line("Monthly housing cost", r.money(m.monthly_housing_cost));
            r.section("Stress test");
            r.line("Qualifying rate", r.pct(m.stress_test.qualifying_rate_pct));
            r.line("Qualifying payment", r.money(m.stress_test.qualifying_payment));
            if let (Some(gds), Some(tds)) = (m.stress_test.gds_pct, m.stress_test.tds_pct) {
                r.line("GDS / TDS", format!("{} / {}", r.pct(gds), r.pct(tds)));
            }
            if let Some(ok) = m.stress_test.qualifies {
                r.line("Qualifies", if ok { "yes" } else { "no" });
            }
            r.schedule(&m.schedule);
        }
        CalculationOutput::Loan(l) => {
            r.line("Monthly payment", r.money(l.monthly_payment));
            r.line("Months to payoff", l.months_to_payoff.to_string());
            r.line("Total interest", r.money(l.total_interest));
            r.line("Total paid", r.money(l.total_paid));
            if l.interest_saved > 0.0 {
                r.line("Interest saved", r.money(l.interest_saved));
            }
            r.schedule(&l.schedule);
        }
        CalculationOutput::Tdee(t) => {
            r.line("BMR", format!("{:.0} kcal/day", t.bmr));
            r.line("Activity multiplier", format!("{:.3}", t.activity_multiplier));
            r.line("TDEE", format!("{:.0} kcal/day", t.tdee));
            r.line("BMI", format!("{:.1} ({:?})", t.bmi, t.bmi_category));
            r.section("Macros at maintenance");
            r.line("Protein", format!("{:.0} g", t.macros.protein_g));
            r.line("Carbohydrates", format!("{:.0} g", t.macros.carbs_g));
            r.line("Fat", format!("{:.0} g", t.macros.fat_g));
            let rows = t
                .targets
                .iter()
                .map(|target| {
                    vec![
                        target.goal.display_name().to_string(),
                        format!("{:.0}", target.calories),
                        format!("{:+.2}", target.weekly_change_kg),
                        if target.below_safe_minimum { "below minimum" } else { "" }.to_string(),
                    ]
                })
                .collect();
            r.table(&["Goal", "kcal/day", "kg/week", "Note"], rows, None);
        }
        CalculationOutput::Vat(v) => {
            r.line("Net", r.money(v.net));
            r.line(&format!("VAT ({})", r.pct(v.rate_pct)), r.money(v.vat));
            r.line("Gross", r.money(v.gross));
        }
        CalculationOutput::Dice(d) => {
            r.line("Probability", r.pct(d.percent));
            r.line("Favorable outcomes", format!("{} of {}", d.favorable_outcomes, d.total_outcomes));
            r.line("Possible sums", format!("{} to {}", d.min_sum, d.max_sum));
            if let Some(one_in) = d.one_in {
                r.line("Odds", format!("1 in {}", format_number(one_in, 2)));
            }
        }
        CalculationOutput::CoinFlip(c) => {
            r.line("Probability", r.pct(c.percent));
            r.line("Expected heads", format!("{:.2}", c.expected_heads));
            r.line("Standard deviation", format!("{:.3}", c.std_dev));
            r.line("Most likely heads", c.most_likely_heads.to_string());
        }
        CalculationOutput::Events(e) => {
            r.line("Both A and B", r.pct(e.both * 100.0));
            r.line("A or B", r.pct(e.either * 100.0));
            r.line("Exactly one", r.pct(e.exactly_one * 100.0));
            r.line("Neither", r.pct(e.neither * 100.0));
            r.line("A only", r.pct(e.a_only * 100.0));
            r.line("B only", r.pct(e.b_only * 100.0));
        }
        CalculationOutput::Ratio(q) => {
            r.line("Simplified", q.label());
            r.line("Decimal", format!("{:.6}", q.decimal));
            r.line("Shares", format!("{} / {}", r.pct(q.share_a_pct), r.pct(q.share_b_pct)));
            if let Some(scaled) = q.scaled {
                r.line("Scaled", format!("{}:{}", format_number(scaled.a, 4), format_number(scaled.b, 4)));
            }
        }
        CalculationOutput::BraSize(b) => {
            r.line("US", &b.us);
            r.line("UK", &b.uk);
            r.line("EU", &b.eu);
            r.line("FR", &b.fr);
            r.line("Sister sizes", b.sister_sizes.join(", "));
        }
        CalculationOutput::Zodiac(z) => {
            r.line("Sun sign", format!("{} {:?}", z.symbol, z.sun_sign));
            r.line("Dates", &z.date_range);
            r.line("Element", format!("{:?}", z.element));
            r.line("Modality", format!("{:?}", z.modality));
            r.line("Ruling planet", &z.ruling_planet);
            r.line(
                "Chinese zodiac",
                format!("{:?} {:?} ({:?})", z.chinese.element, z.chinese.animal, z.chinese.polarity),
            );
            if z.before_lunar_new_year_possible {
                r.line("Note", "Check the Lunar New Year date for births before late February");
            }
        }
        CalculationOutput::Commission(c) => {
            r.line("Commission", r.money(c.commission));
            r.line("Total earnings", r.money(c.total_earnings));
            r.line("Effective rate", r.pct(c.effective_rate_pct));
            if let Some(sales) = c.required_sales {
                r.line("Sales for target", r.money(sales));
            }
            let rows = c
                .breakdown
                .iter()
                .map(|s| {
                    vec![
                        r.money(s.from),
                        s.to.map(|t| r.money(t)).unwrap_or_else(|| "and up".to_string()),
                        r.pct(s.rate_pct),
                        r.money(s.base),
                        r.money(s.amount),
                    ]
                })
                .collect();
            r.table(&["From", "To", "Rate", "Sales", "Commission"], rows, None);
        }
        CalculationOutput::Retirement(p) => {
            r.line("Years to retirement", p.years_to_retirement.to_string());
            r.line("Nest egg", r.money(p.nest_egg));
            r.line("Nest egg (today's $)", r.money(p.nest_egg_today));
            r.line("Total contributions", r.money(p.total_contributions));
            r.line("Investment growth", r.money(p.total_growth));
            r.line("Sustainable income", format!("{}/month", r.money(p.sustainable_monthly_income)));
            r.line("  in today's dollars", format!("{}/month", r.money(p.sustainable_monthly_income_today)));
            if let Some(required) = p.required_nest_egg {
                r.line("Required nest egg", r.money(required));
            }
            if let Some(gap) = p.shortfall {
                r.line("Shortfall", r.money(gap));
            }
            if let Some(extra) = p.extra_monthly_savings.filter(|e| *e > 0.0) {
                r.line("Extra saving needed", format!("{}/month", r.money(extra)));
            }
            if let Some(age) = p.depletion_age {
                r.line("Savings run out at", format!("age {:.1}", age));
            }
            let rows = p
                .rows
                .iter()
                .map(|row| {
                    vec![
                        row.age.to_string(),
                        r.money(row.contributions),
                        r.money(row.withdrawals),
                        r.money(row.growth),
                        r.money(row.balance),
                        r.money(row.real_balance),
                    ]
                })
                .collect();
            let limit = opts.schedule_rows;
            r.table(&["Age", "Contributed", "Withdrawn", "Growth", "Balance", "Today's $"], rows, limit);
        }
        CalculationOutput::CharacterCount(c) => {
            r.line("Characters", c.characters.to_string());
            r.line("Without spaces", c.characters_no_spaces.to_string());
            r.line("Words", c.words.to_string());
            r.line("Sentences", c.sentences.to_string());
            r.line("Paragraphs", c.paragraphs.to_string());
            r.line("Lines", c.lines.to_string());
            r.line("Average word length", format!("{:.1}", c.average_word_length));
            r.line("Reading time", format!("{:.1} min", c.reading_time_minutes));
            r.line("Speaking time", format!("{:.1} min", c.speaking_time_minutes));
            if !c.top_words.is_empty() {
                let words: Vec<String> = c.top_words.iter().map(|w| format!("{} ({})", w.word, w.count)).collect();
                r.line("Top words", words.join(", "));
            }
            let rows = c
                .platforms
                .iter()
                .map(|p| {
                    vec![
                        p.platform.clone(),
                        p.limit.to_string(),
                        p.remaining.to_string(),
                        if p.fits { "ok" } else { "over" }.to_string(),
                    ]
                })
                .collect();
            r.table(&["Platform", "Limit", "Remaining", "Fits"], rows, None);
        }
        CalculationOutput::Percentage(p) => {
            r.line("Result", format_number(p.value, opts.decimals));
            r.line("Statement", &p.statement);
        }
    }

    r.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{CalculatorItem, LoanInput, RatioInput};
    use crate::amortization::Compounding;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0, 2), "0.00");
        assert_eq!(format_number(999.999, 2), "1,000.00");
        assert_eq!(format_number(1_234_567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-1_234.5, 1), "-1,234.5");
        assert_eq!(format_number(123_456.0, 0), "123,456");
        assert_eq!(format_number(-0.001, 2), "0.00");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(3_722.27, "$", 2), "$3,722.27");
        assert_eq!(format_money(-50.0, "€", 2), "-€50.00");
    }

    fn loan_output() -> CalculationOutput {
        CalculatorItem::Loan(LoanInput {
            principal: 30_000.0,
            annual_rate_pct: 6.5,
            term_months: 60,
            compounding: Compounding::Monthly,
            extra_monthly_payment: 0.0,
        })
        .calculate()
        .unwrap()
    }

    #[test]
    fn test_render_is_deterministic() {
        let output = loan_output();
        let opts = ReportOptions::default();
        assert_eq!(render(&output, &opts), render(&output, &opts));
    }

    #[test]
    fn test_loan_report() {
        let text = render(&loan_output(), &ReportOptions::default());
        assert!(text.starts_with(&"═".repeat(BANNER_WIDTH)));
        assert!(text.contains("LOAN PAYMENT"));
        assert!(text.contains("$586.98"));
        assert!(text.contains("Year"));
        assert!(!text.contains("more rows"));
    }

    #[test]
    fn test_schedule_row_limit() {
        let opts = ReportOptions { schedule_rows: Some(2), ..Default::default() };
        let text = render(&loan_output(), &opts);
        assert!(text.contains("... 3 more rows"));
    }

    #[test]
    fn test_currency_and_decimals() {
        let opts = ReportOptions { currency_symbol: "€".to_string(), decimals: 0, schedule_rows: Some(0) };
        let text = render(&loan_output(), &opts);
        assert!(text.contains("€587"));
    }

    #[test]
    fn test_ratio_report() {
        let output = CalculatorItem::Ratio(RatioInput { a: 1920.0, b: 1080.0, scale_a: None })
            .calculate()
            .unwrap();
        let text = render(&output, &ReportOptions::default());
        assert!(text.contains("16:9"));
    }
}
