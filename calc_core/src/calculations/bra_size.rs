//! # Bra Size Calculation
//!
//! Band from the underbust measurement, cup from the bust-minus-band
//! difference (one cup letter per inch).
//!
//! - Band: underbust rounded to the nearest inch, odd values round up to the
//!   next even size
//! - Cup: `round(bust − band)` inches, 0 = AA, 1 = A, 2 = B, ...
//! - EU band: `70 + 5 × (US band − 32) / 2`; FR band: EU + 15
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::bra_size::{calculate, BraSizeInput};
//! use calc_core::units::LengthUnit;
//!
//! let result = calculate(&BraSizeInput { underbust: 33.0, bust: 37.0, unit: LengthUnit::Inches }).unwrap();
//! assert_eq!(result.us, "34C");
//! assert_eq!(result.eu, "75C");
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_range, CalcError, CalcResult};
use crate::units::LengthUnit;

const US_CUPS: [&str; 15] = ["AA", "A", "B", "C", "D", "DD", "DDD", "G", "H", "I", "J", "K", "L", "M", "N"];
const UK_CUPS: [&str; 15] = ["AA", "A", "B", "C", "D", "DD", "E", "F", "FF", "G", "GG", "H", "HH", "J", "JJ"];
const EU_CUPS: [&str; 15] = ["AA", "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N"];

const MIN_BAND: u32 = 28;
const MAX_BAND: u32 = 56;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BraSizeInput {
    /// Snug measurement around the ribcage
    pub underbust: f64,
    /// Loose measurement around the fullest part
    pub bust: f64,
    #[serde(default)]
    pub unit: LengthUnit,
}

impl BraSizeInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        let underbust = self.unit.to_inches(self.underbust).value();
        let bust = self.unit.to_inches(self.bust).value();
        ensure_range("underbust", underbust, 20.0, 60.0)?;
        ensure_range("bust", bust, 20.0, 80.0)?;
        if bust < underbust {
            return Err(CalcError::invalid_input(
                "bust",
                self.bust.to_string(),
                "Bust measurement cannot be smaller than the underbust",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BraSizeResult {
    pub band_us: u32,
    /// 0 = AA, 1 = A, ...
    pub cup_index: u32,
    /// Bust minus band, in inches
    pub difference_in: f64,
    pub us: String,
    pub uk: String,
    pub eu: String,
    pub fr: String,
    /// Same cup volume on a neighbouring band (US labels)
    pub sister_sizes: Vec<String>,
}

/// US band size for an underbust in inches
pub fn band_size(underbust_in: f64) -> u32 {
    let band = underbust_in.round() as u32;
    if band % 2 == 1 {
        band + 1
    } else {
        band
    }
}

/// EU band (cm-based) for a US band
pub fn eu_band(band_us: u32) -> u32 {
    let steps = (band_us as i64 - 32) / 2;
    (70 + 5 * steps) as u32
}

fn us_label(band: u32, cup: usize) -> String {
    format!("{}{}", band, US_CUPS[cup])
}

/// Calculate a bra size.
pub fn calculate(input: &BraSizeInput) -> CalcResult<BraSizeResult> {
    input.validate()?;

    let underbust = input.unit.to_inches(input.underbust).value();
    let bust = input.unit.to_inches(input.bust).value();

    let band = band_size(underbust);
    if !(MIN_BAND..=MAX_BAND).contains(&band) {
        return Err(CalcError::calculation_failed(
            "BraSize",
            format!("Band {} is outside standard sizes {}-{}", band, MIN_BAND, MAX_BAND),
        ));
    }

    let difference = bust - band as f64;
    let cup = difference.round().max(0.0) as usize;
    if cup >= US_CUPS.len() {
        return Err(CalcError::calculation_failed(
            "BraSize",
            format!("A {:.1}\" difference is beyond standard cup sizes", difference),
        ));
    }

    let eu = eu_band(band);
    let mut sister_sizes = Vec::new();
    if band - 2 >= MIN_BAND && cup + 1 < US_CUPS.len() {
        sister_sizes.push(us_label(band - 2, cup + 1));
    }
    if band + 2 <= MAX_BAND && cup > 0 {
        sister_sizes.push(us_label(band + 2, cup - 1));
    }

    Ok(BraSizeResult {
        band_us: band,
        cup_index: cup as u32,
        difference_in: difference,
        us: us_label(band, cup),
        uk: format!("{}{}", band, UK_CUPS[cup]),
        eu: format!("{}{}", eu, EU_CUPS[cup]),
        fr: format!("{}{}", eu + 15, EU_CUPS[cup]),
        sister_sizes,
    })
}
