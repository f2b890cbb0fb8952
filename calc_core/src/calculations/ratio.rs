//! # Ratio Calculation
//!
//! Reduce `a : b` to lowest terms and scale it.
//!
//! Decimal parts are scaled by the smallest power of ten (up to 10⁶) that
//! makes both integers, so `1.5 : 2.25` becomes `150 : 225` and then `2 : 3`.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::ratio::simplify;
//!
//! assert_eq!(simplify(1920, 1080), (16, 9));
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_positive, CalcError, CalcResult};

const MAX_DECIMALS: i32 = 6;
const MAX_PART: f64 = 1e12;

/// Greatest common divisor (Euclid)
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// `(a / gcd, b / gcd)`; the result parts are coprime.
pub fn simplify(a: u64, b: u64) -> (u64, u64) {
    let g = gcd(a, b);
    if g == 0 {
        return (0, 0);
    }
    (a / g, b / g)
}

/// Missing fourth term of `a : b = c : d`
pub fn solve_proportion(a: f64, b: f64, c: f64) -> f64 {
    b * c / a
}

/// Scale two decimals to integers sharing the same power of ten
fn integer_parts(a: f64, b: f64) -> (u64, u64) {
    // Only absorb rounding noise from the multiplication, never a real decimal digit
    let is_whole = |x: f64| (x - x.round()).abs() <= 4.0 * f64::EPSILON * x.abs().max(1.0);
    let mut factor = 1.0;
    for _ in 0..MAX_DECIMALS {
        if is_whole(a * factor) && is_whole(b * factor) {
            break;
        }
        factor *= 10.0;
    }
    ((a * factor).round() as u64, (b * factor).round() as u64)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioInput {
    pub a: f64,
    pub b: f64,
    /// Scale the ratio so its first term equals this value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_a: Option<f64>,
}

impl RatioInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        ensure_positive("a", self.a)?;
        ensure_positive("b", self.b)?;
        for (field, value) in [("a", self.a), ("b", self.b)] {
            if value > MAX_PART {
                return Err(CalcError::invalid_input(field, value.to_string(), "Ratio term is too large"));
            }
        }
        if let Some(scale) = self.scale_a {
            ensure_positive("scale_a", scale)?;
        }
        Ok(())
    }
}

/// `a : b` scaled to a new first term
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaledRatio {
    pub a: f64,
    pub b: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioResult {
    pub simplified_a: u64,
    pub simplified_b: u64,
    /// Common divisor removed from the integer-scaled terms
    pub gcd: u64,
    /// `a / b`
    pub decimal: f64,
    /// `a / (a + b)` in percent
    pub share_a_pct: f64,
    pub share_b_pct: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaled: Option<ScaledRatio>,
}

impl RatioResult {
    /// "16:9"
    pub fn label(&self) -> String {
        format!("{}:{}", self.simplified_a, self.simplified_b)
    }
}

/// Calculate a simplified ratio.
pub fn calculate(input: &RatioInput) -> CalcResult<RatioResult> {
    input.validate()?;

    let (a_int, b_int) = integer_parts(input.a, input.b);
    if a_int == 0 || b_int == 0 {
        return Err(CalcError::calculation_failed(
            "Ratio",
            format!("Terms smaller than 1e-{} cannot be simplified", MAX_DECIMALS),
        ));
    }
    let g = gcd(a_int, b_int);
    let (simplified_a, simplified_b) = simplify(a_int, b_int);
    let total = input.a + input.b;

    Ok(RatioResult {
        simplified_a,
        simplified_b,
        gcd: g,
        decimal: input.a / input.b,
        share_a_pct: input.a / total * 100.0,
        share_b_pct: input.b / total * 100.0,
        scaled: input.scale_a.map(|target| ScaledRatio {
            a: target,
            b: solve_proportion(input.a, input.b, target),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(a: f64, b: f64) -> RatioInput {
        RatioInput { a, b, scale_a: None }
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(48, 18), 6);
        assert_eq!(gcd(17, 5), 1);
        assert_eq!(gcd(0, 7), 7);
    }

    #[test]
    fn test_simplify_is_coprime() {
        for (a, b) in [(1920, 1080), (12, 8), (7, 13), (100, 25), (1, 1), (144, 89)] {
            let g = gcd(a, b);
            let (sa, sb) = simplify(a, b);
            assert_eq!((sa, sb), (a / g, b / g));
            assert_eq!(gcd(sa, sb), 1);
        }
    }

    #[test]
    fn test_whole_ratio() {
        let result = calculate(&input(1920.0, 1080.0)).unwrap();
        assert_eq!(result.label(), "16:9");
        assert_eq!(result.gcd, 120);
        assert!((result.decimal - 16.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_decimal_ratio() {
        let result = calculate(&input(1.5, 2.25)).unwrap();
        assert_eq!((result.simplified_a, result.simplified_b), (2, 3));
        assert!((result.share_a_pct - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_small_decimal_on_large_term_is_kept() {
        let result = calculate(&input(2_000_000.001, 1.0)).unwrap();
        assert_eq!((result.simplified_a, result.simplified_b), (2_000_000_001, 1000));

        let result = calculate(&input(12_345.000_01, 1.0)).unwrap();
        assert_eq!((result.simplified_a, result.simplified_b), (1_234_500_001, 100_000));
    }

    #[test]
    fn test_scaling() {
        let mut i = input(4.0, 3.0);
        i.scale_a = Some(1920.0);
        let scaled = calculate(&i).unwrap().scaled.unwrap();
        assert!((scaled.b - 1440.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(calculate(&input(0.0, 3.0)).is_err());
        assert!(calculate(&input(3.0, -1.0)).is_err());
        assert!(calculate(&input(1e13, 1.0)).is_err());
    }
}
