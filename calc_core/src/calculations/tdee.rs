//! # TDEE Calculation
//!
//! Total Daily Energy Expenditure = BMR × activity factor.
//!
//! ## BMR Formulas
//!
//! - **Mifflin-St Jeor** (default): `10w + 6.25h − 5a + 5` (men), `− 161` (women)
//! - **Harris-Benedict** (Roza & Shizgal revision)
//! - **Katch-McArdle**: `370 + 21.6 × lean mass`, needs body fat %
//!
//! `w` in kg, `h` in cm, `a` in years. Imperial inputs are converted first.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::tdee::{calculate, ActivityLevel, BmrFormula, Sex, TdeeInput};
//! use calc_core::units::UnitSystem;
//!
//! let input = TdeeInput {
//!     sex: Sex::Male,
//!     age_years: 30,
//!     weight: 80.0,
//!     height: 180.0,
//!     units: UnitSystem::Metric,
//!     activity: ActivityLevel::Moderate,
//!     formula: BmrFormula::MifflinStJeor,
//!     body_fat_pct: None,
//! };
//! let result = calculate(&input).unwrap();
//! assert!((result.bmr - 1780.0).abs() < 1e-9);
//! assert!((result.tdee - 2759.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_positive, ensure_range, CalcError, CalcResult};
use crate::units::UnitSystem;

/// Energy in one kilogram of body fat (kcal), for weekly change estimates
const KCAL_PER_KG: f64 = 7700.0;

/// Share of maintenance calories from protein / carbohydrate / fat
const MACRO_SPLIT: (f64, f64, f64) = (0.30, 0.40, 0.30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Lowest daily intake generally considered safe without supervision
    pub fn safe_minimum_kcal(self) -> f64 {
        match self {
            Sex::Male => 1500.0,
            Sex::Female => 1200.0,
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" | "man" => Ok(Sex::Male),
            "f" | "female" | "woman" => Ok(Sex::Female),
            _ => Err(CalcError::not_found("sex", s)),
        }
    }
}

/// Physical activity level and its TDEE multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Desk job, little exercise
    #[default]
    Sedentary,
    /// Exercise 1-3 days a week
    Light,
    /// Exercise 3-5 days a week
    Moderate,
    /// Exercise 6-7 days a week
    Active,
    /// Hard daily exercise or a physical job
    VeryActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
        ActivityLevel::VeryActive,
    ];

    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" | "lightly_active" => Ok(ActivityLevel::Light),
            "moderate" | "moderately_active" => Ok(ActivityLevel::Moderate),
            "active" => Ok(ActivityLevel::Active),
            "very_active" | "extra_active" | "athlete" => Ok(ActivityLevel::VeryActive),
            _ => Err(CalcError::not_found("activity level", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmrFormula {
    #[default]
    MifflinStJeor,
    HarrisBenedict,
    KatchMcArdle,
}

impl BmrFormula {
    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "mifflin" | "mifflin_st_jeor" | "msj" => Ok(BmrFormula::MifflinStJeor),
            "harris" | "harris_benedict" | "hb" => Ok(BmrFormula::HarrisBenedict),
            "katch" | "katch_mcardle" | "km" => Ok(BmrFormula::KatchMcArdle),
            _ => Err(CalcError::not_found("BMR formula", s)),
        }
    }
}

/// Input parameters for TDEE.
///
/// `weight`/`height` are kg/cm for metric, lb/in for imperial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TdeeInput {
    pub sex: Sex,
    pub age_years: u32,
    pub weight: f64,
    pub height: f64,
    #[serde(default)]
    pub units: UnitSystem,
    #[serde(default)]
    pub activity: ActivityLevel,
    #[serde(default)]
    pub formula: BmrFormula,
    /// Required for Katch-McArdle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_fat_pct: Option<f64>,
}

impl TdeeInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        if !(15..=100).contains(&self.age_years) {
            return Err(CalcError::invalid_input(
                "age_years",
                self.age_years.to_string(),
                "Formulas are valid for ages 15 to 100",
            ));
        }
        ensure_positive("weight", self.weight)?;
        ensure_positive("height", self.height)?;
        ensure_range("weight", self.weight_kg(), 20.0, 650.0)?;
        ensure_range("height", self.height_cm(), 90.0, 275.0)?;
        if let Some(bf) = self.body_fat_pct {
            ensure_range("body_fat_pct", bf, 2.0, 70.0)?;
        }
        if self.formula == BmrFormula::KatchMcArdle && self.body_fat_pct.is_none() {
            return Err(CalcError::missing_field("body_fat_pct"));
        }
        Ok(())
    }

    pub fn weight_kg(&self) -> f64 {
        self.units.weight_kg(self.weight).value()
    }

    pub fn height_cm(&self) -> f64 {
        self.units.height_cm(self.height).value()
    }

    /// Basal metabolic rate (kcal/day) using the selected formula
    pub fn bmr(&self) -> f64 {
        let w = self.weight_kg();
        let h = self.height_cm();
        let a = self.age_years as f64;
        match (self.formula, self.sex) {
            (BmrFormula::MifflinStJeor, Sex::Male) => 10.0 * w + 6.25 * h - 5.0 * a + 5.0,
            (BmrFormula::MifflinStJeor, Sex::Female) => 10.0 * w + 6.25 * h - 5.0 * a - 161.0,
            (BmrFormula::HarrisBenedict, Sex::Male) => 88.362 + 13.397 * w + 4.799 * h - 5.677 * a,
            (BmrFormula::HarrisBenedict, Sex::Female) => 447.593 + 9.247 * w + 3.098 * h - 4.330 * a,
            (BmrFormula::KatchMcArdle, _) => {
                let lean_kg = w * (1.0 - self.body_fat_pct.unwrap_or(0.0) / 100.0);
                370.0 + 21.6 * lean_kg
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightGoal {
    ExtremeLoss,
    Loss,
    MildLoss,
    Maintain,
    MildGain,
    Gain,
}

impl WeightGoal {
    pub const ALL: [WeightGoal; 6] = [
        WeightGoal::ExtremeLoss,
        WeightGoal::Loss,
        WeightGoal::MildLoss,
        WeightGoal::Maintain,
        WeightGoal::MildGain,
        WeightGoal::Gain,
    ];

    /// Daily calorie adjustment relative to TDEE
    pub fn daily_delta_kcal(self) -> f64 {
        match self {
            WeightGoal::ExtremeLoss => -1000.0,
            WeightGoal::Loss => -500.0,
            WeightGoal::MildLoss => -250.0,
            WeightGoal::Maintain => 0.0,
            WeightGoal::MildGain => 250.0,
            WeightGoal::Gain => 500.0,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            WeightGoal::ExtremeLoss => "Extreme weight loss",
            WeightGoal::Loss => "Weight loss",
            WeightGoal::MildLoss => "Mild weight loss",
            WeightGoal::Maintain => "Maintain weight",
            WeightGoal::MildGain => "Mild weight gain",
            WeightGoal::Gain => "Weight gain",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalorieTarget {
    pub goal: WeightGoal,
    pub calories: f64,
    /// Expected change per week (negative = loss)
    pub weekly_change_kg: f64,
    pub below_safe_minimum: bool,
}

/// Grams per day of each macronutrient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroSplit {
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }
}

/// Results from the TDEE calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TdeeResult {
    pub bmr: f64,
    pub activity_multiplier: f64,
    pub tdee: f64,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub bmi: f64,
    pub bmi_category: BmiCategory,
    pub targets: Vec<CalorieTarget>,
    /// Macros at maintenance calories
    pub macros: MacroSplit,
}

/// Calculate TDEE.
pub fn calculate(input: &TdeeInput) -> CalcResult<TdeeResult> {
    input.validate()?;

    let bmr = input.bmr();
    let activity_multiplier = input.activity.multiplier();
    let tdee = bmr * activity_multiplier;
    let weight_kg = input.weight_kg();
    let height_cm = input.height_cm();
    let height_m = height_cm / 100.0;
    let bmi = weight_kg / (height_m * height_m);
    let minimum = input.sex.safe_minimum_kcal();

    let targets = WeightGoal::ALL
        .into_iter()
        .map(|goal| {
            let delta = goal.daily_delta_kcal();
            let calories = tdee + delta;
            CalorieTarget {
                goal,
                calories,
                weekly_change_kg: delta * 7.0 / KCAL_PER_KG,
                below_safe_minimum: calories < minimum,
            }
        })
        .collect();

    let (protein, carbs, fat) = MACRO_SPLIT;
    let macros = MacroSplit {
        protein_g: tdee * protein / 4.0,
        carbs_g: tdee * carbs / 4.0,
        fat_g: tdee * fat / 9.0,
    };

    Ok(TdeeResult {
        bmr,
        activity_multiplier,
        tdee,
        weight_kg,
        height_cm,
        bmi,
        bmi_category: BmiCategory::from_bmi(bmi),
        targets,
        macros,
    })
}
