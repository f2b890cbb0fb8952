//! # Probability Calculations
//!
//! - [`calculate_dice`] - sum of N fair S-sided dice, counted exactly
//! - [`calculate_coin_flip`] - binomial probability of k heads in n flips
//! - [`calculate_events`] - combinations of two independent events
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::probability::{calculate_dice, Comparison, DiceInput};
//!
//! let input = DiceInput { dice: 2, sides: 6, target: 7, comparison: Comparison::Exactly };
//! let result = calculate_dice(&input).unwrap();
//! assert_eq!(result.favorable_outcomes, 6);
//! assert_eq!(result.total_outcomes, 36);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_range, CalcError, CalcResult};

const MAX_DICE: u32 = 100;
const MAX_SIDES: u32 = 1000;
const MAX_FLIPS: u32 = 100_000;

/// How the observed value is compared with the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    #[default]
    Exactly,
    AtLeast,
    AtMost,
}

impl Comparison {
    /// Whether `value` satisfies the comparison against `target`
    pub fn matches(self, value: u32, target: u32) -> bool {
        match self {
            Comparison::Exactly => value == target,
            Comparison::AtLeast => value >= target,
            Comparison::AtMost => value <= target,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Exactly => "=",
            Comparison::AtLeast => "≥",
            Comparison::AtMost => "≤",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "exactly" | "exact" | "=" | "==" | "eq" => Ok(Comparison::Exactly),
            "at_least" | ">=" | "ge" | "min" => Ok(Comparison::AtLeast),
            "at_most" | "<=" | "le" | "max" => Ok(Comparison::AtMost),
            _ => Err(CalcError::not_found("comparison", s)),
        }
    }
}

// ============================================================================
// Dice
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiceInput {
    pub dice: u32,
    pub sides: u32,
    /// Target sum
    pub target: u32,
    #[serde(default)]
    pub comparison: Comparison,
}

impl DiceInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        if self.dice == 0 || self.dice > MAX_DICE {
            return Err(CalcError::invalid_input(
                "dice",
                self.dice.to_string(),
                format!("Number of dice must be between 1 and {}", MAX_DICE),
            ));
        }
        if self.sides < 2 || self.sides > MAX_SIDES {
            return Err(CalcError::invalid_input(
                "sides",
                self.sides.to_string(),
                format!("Dice must have between 2 and {} sides", MAX_SIDES),
            ));
        }
        total_outcomes(self.dice, self.sides)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiceResult {
    pub probability: f64,
    pub percent: f64,
    pub favorable_outcomes: u64,
    pub total_outcomes: u64,
    pub min_sum: u32,
    pub max_sum: u32,
    /// "1 in N"; absent when the event is impossible
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_in: Option<f64>,
}

fn total_outcomes(dice: u32, sides: u32) -> CalcResult<u64> {
    (sides as u64).checked_pow(dice).ok_or_else(|| {
        CalcError::invalid_input(
            "dice",
            dice.to_string(),
            format!("{} dice with {} sides have too many outcomes to count exactly", dice, sides),
        )
    })
}

/// Number of ways to roll each sum; index is the sum.
pub fn sum_distribution(dice: u32, sides: u32) -> CalcResult<Vec<u64>> {
    total_outcomes(dice, sides)?;
    let max_sum = (dice * sides) as usize;
    let mut ways = vec![0u64; max_sum + 1];
    ways[0] = 1;
    for rolled in 0..dice as usize {
        let mut next = vec![0u64; max_sum + 1];
        let reachable = rolled * sides as usize;
        for (sum, &count) in ways.iter().enumerate().take(reachable + 1) {
            if count == 0 {
                continue;
            }
            for face in 1..=sides as usize {
                next[sum + face] += count;
            }
        }
        ways = next;
    }
    Ok(ways)
}

/// Probability for a dice roll.
pub fn calculate_dice(input: &DiceInput) -> CalcResult<DiceResult> {
    input.validate()?;

    let ways = sum_distribution(input.dice, input.sides)?;
    let total = total_outcomes(input.dice, input.sides)?;
    let favorable: u64 = ways
        .iter()
        .enumerate()
        .filter(|(sum, _)| input.comparison.matches(*sum as u32, input.target))
        .map(|(_, &count)| count)
        .sum();
    let probability = favorable as f64 / total as f64;

    Ok(DiceResult {
        probability,
        percent: probability * 100.0,
        favorable_outcomes: favorable,
        total_outcomes: total,
        min_sum: input.dice,
        max_sum: input.dice * input.sides,
        one_in: (favorable > 0).then(|| total as f64 / favorable as f64),
    })
}

// ============================================================================
// Coin flips (binomial)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinFlipInput {
    pub flips: u32,
    pub heads: u32,
    #[serde(default)]
    pub comparison: Comparison,
    /// Probability of heads on one flip
    #[serde(default = "default_p_heads")]
    pub p_heads: f64,
}

fn default_p_heads() -> f64 {
    0.5
}

impl CoinFlipInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        if self.flips == 0 || self.flips > MAX_FLIPS {
            return Err(CalcError::invalid_input(
                "flips",
                self.flips.to_string(),
                format!("Number of flips must be between 1 and {}", MAX_FLIPS),
            ));
        }
        if self.heads > self.flips {
            return Err(CalcError::invalid_input(
                "heads",
                self.heads.to_string(),
                "Heads cannot exceed the number of flips",
            ));
        }
        ensure_range("p_heads", self.p_heads, 0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinFlipResult {
    pub probability: f64,
    pub percent: f64,
    pub expected_heads: f64,
    pub std_dev: f64,
    /// Mode of the distribution
    pub most_likely_heads: u32,
}

/// `ln(n choose k)`
pub fn ln_choose(n: u32, k: u32) -> f64 {
    let k = k.min(n - k);
    (1..=k).map(|i| ((n - k + i) as f64 / i as f64).ln()).sum()
}

/// `P(X = k)` for `X ~ Binomial(n, p)`, computed in log space.
pub fn binomial_pmf(n: u32, k: u32, p: f64) -> f64 {
    if k > n {
        return 0.0;
    }
    if p <= 0.0 {
        return if k == 0 { 1.0 } else { 0.0 };
    }
    if p >= 1.0 {
        return if k == n { 1.0 } else { 0.0 };
    }
    (ln_choose(n, k) + k as f64 * p.ln() + (n - k) as f64 * (1.0 - p).ln()).exp()
}

/// `P(X = k)` for every `k` in `0..=n`.
pub fn binomial_distribution(n: u32, p: f64) -> Vec<f64> {
    if p <= 0.0 || p >= 1.0 {
        return (0..=n).map(|k| binomial_pmf(n, k, p)).collect();
    }
    let log_odds = p.ln() - (1.0 - p).ln();
    let mut log_pmf = n as f64 * (1.0 - p).ln();
    let mut out = Vec::with_capacity(n as usize + 1);
    for k in 0..=n {
        out.push(log_pmf.exp());
        if k < n {
            log_pmf += ((n - k) as f64).ln() - ((k + 1) as f64).ln() + log_odds;
        }
    }
    out
}

/// Probability for a run of coin flips.
pub fn calculate_coin_flip(input: &CoinFlipInput) -> CalcResult<CoinFlipResult> {
    input.validate()?;

    let n = input.flips;
    let p = input.p_heads;
    let probability = match input.comparison {
        Comparison::Exactly => binomial_pmf(n, input.heads, p),
        _ => binomial_distribution(n, p)
            .iter()
            .enumerate()
            .filter(|(k, _)| input.comparison.matches(*k as u32, input.heads))
            .map(|(_, pk)| pk)
            .sum::<f64>()
            .clamp(0.0, 1.0),
    };

    let mode = (((n + 1) as f64) * p).floor() as u32;

    Ok(CoinFlipResult {
        probability,
        percent: probability * 100.0,
        expected_heads: n as f64 * p,
        std_dev: (n as f64 * p * (1.0 - p)).sqrt(),
        most_likely_heads: mode.min(n),
    })
}

// ============================================================================
// Two independent events
// ============================================================================

/// Probabilities as fractions in `[0, 1]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventsInput {
    pub p_a: f64,
    pub p_b: f64,
}

impl EventsInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        ensure_range("p_a", self.p_a, 0.0, 1.0)?;
        ensure_range("p_b", self.p_b, 0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventsResult {
    pub not_a: f64,
    pub not_b: f64,
    /// P(A ∩ B)
    pub both: f64,
    /// P(A ∪ B)
    pub either: f64,
    /// P(A Δ B)
    pub exactly_one: f64,
    pub neither: f64,
    pub a_only: f64,
    pub b_only: f64,
}

/// Combine two independent events.
pub fn calculate_events(input: &EventsInput) -> CalcResult<EventsResult> {
    input.validate()?;

    let (a, b) = (input.p_a, input.p_b);
    let both = a * b;
    let a_only = a * (1.0 - b);
    let b_only = (1.0 - a) * b;

    Ok(EventsResult {
        not_a: 1.0 - a,
        not_b: 1.0 - b,
        both,
        either: a + b - both,
        exactly_one: a_only + b_only,
        neither: (1.0 - a) * (1.0 - b),
        a_only,
        b_only,
    })
}
