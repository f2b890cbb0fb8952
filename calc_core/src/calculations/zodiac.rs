//! # Zodiac Calculation
//!
//! Western sun sign from the birth date, and the Chinese zodiac animal,
//! element and polarity from the birth year.
//!
//! The Chinese sign uses the Gregorian year. Births in January or early
//! February, before Lunar New Year, belong to the previous animal; the
//! result flags those dates with `before_lunar_new_year_possible`.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::zodiac::{calculate, ZodiacInput, ZodiacSign, ChineseAnimal};
//! use chrono::NaiveDate;
//!
//! let input = ZodiacInput { birth_date: NaiveDate::from_ymd_opt(1990, 7, 30).unwrap() };
//! let result = calculate(&input).unwrap();
//! assert_eq!(result.sun_sign, ZodiacSign::Leo);
//! assert_eq!(result.chinese.animal, ChineseAnimal::Horse);
//! ```

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Fire,
    Earth,
    Air,
    Water,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modality {
    Cardinal,
    Fixed,
    Mutable,
}

/// First day of each sign as (month, day), starting with Capricorn's
/// January tail so a linear scan works for any date.
const SIGN_STARTS: [(u32, u32, ZodiacSign); 13] = [
    (1, 1, ZodiacSign::Capricorn),
    (1, 20, ZodiacSign::Aquarius),
    (2, 19, ZodiacSign::Pisces),
    (3, 21, ZodiacSign::Aries),
    (4, 20, ZodiacSign::Taurus),
    (5, 21, ZodiacSign::Gemini),
    (6, 21, ZodiacSign::Cancer),
    (7, 23, ZodiacSign::Leo),
    (8, 23, ZodiacSign::Virgo),
    (9, 23, ZodiacSign::Libra),
    (10, 23, ZodiacSign::Scorpio),
    (11, 22, ZodiacSign::Sagittarius),
    (12, 22, ZodiacSign::Capricorn),
];

impl ZodiacSign {
    /// Sun sign for a calendar day
    pub fn from_month_day(month: u32, day: u32) -> Self {
        SIGN_STARTS
            .iter()
            .rev()
            .find(|(m, d, _)| (month, day) >= (*m, *d))
            .map(|(_, _, sign)| *sign)
            .unwrap_or(ZodiacSign::Capricorn)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "♈",
            ZodiacSign::Taurus => "♉",
            ZodiacSign::Gemini => "♊",
            ZodiacSign::Cancer => "♋",
            ZodiacSign::Leo => "♌",
            ZodiacSign::Virgo => "♍",
            ZodiacSign::Libra => "♎",
            ZodiacSign::Scorpio => "♏",
            ZodiacSign::Sagittarius => "♐",
            ZodiacSign::Capricorn => "♑",
            ZodiacSign::Aquarius => "♒",
            ZodiacSign::Pisces => "♓",
        }
    }

    pub fn element(self) -> Element {
        match self {
            ZodiacSign::Aries | ZodiacSign::Leo | ZodiacSign::Sagittarius => Element::Fire,
            ZodiacSign::Taurus | ZodiacSign::Virgo | ZodiacSign::Capricorn => Element::Earth,
            ZodiacSign::Gemini | ZodiacSign::Libra | ZodiacSign::Aquarius => Element::Air,
            ZodiacSign::Cancer | ZodiacSign::Scorpio | ZodiacSign::Pisces => Element::Water,
        }
    }

    pub fn modality(self) -> Modality {
        match self {
            ZodiacSign::Aries | ZodiacSign::Cancer | ZodiacSign::Libra | ZodiacSign::Capricorn => Modality::Cardinal,
            ZodiacSign::Taurus | ZodiacSign::Leo | ZodiacSign::Scorpio | ZodiacSign::Aquarius => Modality::Fixed,
            ZodiacSign::Gemini | ZodiacSign::Virgo | ZodiacSign::Sagittarius | ZodiacSign::Pisces => Modality::Mutable,
        }
    }

    /// Traditional ruling planet
    pub fn ruling_planet(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Mars",
            ZodiacSign::Taurus => "Venus",
            ZodiacSign::Gemini => "Mercury",
            ZodiacSign::Cancer => "Moon",
            ZodiacSign::Leo => "Sun",
            ZodiacSign::Virgo => "Mercury",
            ZodiacSign::Libra => "Venus",
            ZodiacSign::Scorpio => "Mars",
            ZodiacSign::Sagittarius => "Jupiter",
            ZodiacSign::Capricorn => "Saturn",
            ZodiacSign::Aquarius => "Saturn",
            ZodiacSign::Pisces => "Jupiter",
        }
    }

    /// Inclusive date range, e.g. "Jul 23 - Aug 22"
    pub fn date_range(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Mar 21 - Apr 19",
            ZodiacSign::Taurus => "Apr 20 - May 20",
            ZodiacSign::Gemini => "May 21 - Jun 20",
            ZodiacSign::Cancer => "Jun 21 - Jul 22",
            ZodiacSign::Leo => "Jul 23 - Aug 22",
            ZodiacSign::Virgo => "Aug 23 - Sep 22",
            ZodiacSign::Libra => "Sep 23 - Oct 22",
            ZodiacSign::Scorpio => "Oct 23 - Nov 21",
            ZodiacSign::Sagittarius => "Nov 22 - Dec 21",
            ZodiacSign::Capricorn => "Dec 22 - Jan 19",
            ZodiacSign::Aquarius => "Jan 20 - Feb 18",
            ZodiacSign::Pisces => "Feb 19 - Mar 20",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChineseAnimal {
    Rat,
    Ox,
    Tiger,
    Rabbit,
    Dragon,
    Snake,
    Horse,
    Goat,
    Monkey,
    Rooster,
    Dog,
    Pig,
}

const ANIMALS: [ChineseAnimal; 12] = [
    ChineseAnimal::Rat,
    ChineseAnimal::Ox,
    ChineseAnimal::Tiger,
    ChineseAnimal::Rabbit,
    ChineseAnimal::Dragon,
    ChineseAnimal::Snake,
    ChineseAnimal::Horse,
    ChineseAnimal::Goat,
    ChineseAnimal::Monkey,
    ChineseAnimal::Rooster,
    ChineseAnimal::Dog,
    ChineseAnimal::Pig,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChineseElement {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

const CHINESE_ELEMENTS: [ChineseElement; 5] = [
    ChineseElement::Wood,
    ChineseElement::Fire,
    ChineseElement::Earth,
    ChineseElement::Metal,
    ChineseElement::Water,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    Yang,
    Yin,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChineseSign {
    pub animal: ChineseAnimal,
    pub element: ChineseElement,
    pub polarity: Polarity,
}

impl ChineseSign {
    /// Sign for a Gregorian year (1984 = Wood Rat, the start of a cycle)
    pub fn for_year(year: i32) -> Self {
        let offset = (year - 4).rem_euclid(60);
        let stem = (offset % 10) as usize;
        ChineseSign {
            animal: ANIMALS[(offset % 12) as usize],
            element: CHINESE_ELEMENTS[stem / 2],
            polarity: if stem % 2 == 0 { Polarity::Yang } else { Polarity::Yin },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZodiacInput {
    /// ISO date, e.g. "1990-07-30"
    pub birth_date: NaiveDate,
}

impl ZodiacInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        let year = self.birth_date.year();
        if !(1800..=2200).contains(&year) {
            return Err(CalcError::invalid_input(
                "birth_date",
                self.birth_date.to_string(),
                "Year must be between 1800 and 2200",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZodiacResult {
    pub sun_sign: ZodiacSign,
    pub symbol: String,
    pub element: Element,
    pub modality: Modality,
    pub ruling_planet: String,
    pub date_range: String,
    pub chinese: ChineseSign,
    /// Date falls before Feb 21, when Lunar New Year may not have happened yet
    pub before_lunar_new_year_possible: bool,
}

/// Calculate zodiac signs for a birth date.
pub fn calculate(input: &ZodiacInput) -> CalcResult<ZodiacResult> {
    input.validate()?;

    let date = input.birth_date;
    let sign = ZodiacSign::from_month_day(date.month(), date.day());

    Ok(ZodiacResult {
        sun_sign: sign,
        symbol: sign.symbol().to_string(),
        element: sign.element(),
        modality: sign.modality(),
        ruling_planet: sign.ruling_planet().to_string(),
        date_range: sign.date_range().to_string(),
        chinese: ChineseSign::for_year(date.year()),
        before_lunar_new_year_possible: (date.month(), date.day()) < (2, 21),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on(year: i32, month: u32, day: u32) -> ZodiacResult {
        let birth_date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        calculate(&ZodiacInput { birth_date }).unwrap()
    }

    #[test]
    fn test_sign_boundaries() {
        assert_eq!(on(2000, 3, 20).sun_sign, ZodiacSign::Pisces);
        assert_eq!(on(2000, 3, 21).sun_sign, ZodiacSign::Aries);
        assert_eq!(on(2000, 1, 19).sun_sign, ZodiacSign::Capricorn);
        assert_eq!(on(2000, 1, 20).sun_sign, ZodiacSign::Aquarius);
        assert_eq!(on(2000, 12, 21).sun_sign, ZodiacSign::Sagittarius);
        assert_eq!(on(2000, 12, 22).sun_sign, ZodiacSign::Capricorn);
        assert_eq!(on(2000, 12, 31).sun_sign, ZodiacSign::Capricorn);
        assert_eq!(on(2000, 1, 1).sun_sign, ZodiacSign::Capricorn);
    }

    #[test]
    fn test_every_day_has_a_sign_matching_its_range() {
        let mut date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        while date.year() == 2024 {
            let sign = ZodiacSign::from_month_day(date.month(), date.day());
            assert!(!sign.date_range().is_empty());
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_sign_attributes() {
        let leo = on(1990, 7, 30);
        assert_eq!(leo.sun_sign, ZodiacSign::Leo);
        assert_eq!(leo.element, Element::Fire);
        assert_eq!(leo.modality, Modality::Fixed);
        assert_eq!(leo.ruling_planet, "Sun");
        assert_eq!(leo.symbol, "♌");
    }

    #[test]
    fn test_chinese_zodiac() {
        let rat = ChineseSign::for_year(2020);
        assert_eq!(rat.animal, ChineseAnimal::Rat);
        assert_eq!(rat.element, ChineseElement::Metal);
        assert_eq!(rat.polarity, Polarity::Yang);

        let dragon = ChineseSign::for_year(2024);
        assert_eq!(dragon.animal, ChineseAnimal::Dragon);
        assert_eq!(dragon.element, ChineseElement::Wood);

        let rabbit = ChineseSign::for_year(2023);
        assert_eq!(rabbit.animal, ChineseAnimal::Rabbit);
        assert_eq!(rabbit.polarity, Polarity::Yin);

        assert_eq!(ChineseSign::for_year(1984).animal, ChineseAnimal::Rat);
        assert_eq!(ChineseSign::for_year(1984).element, ChineseElement::Wood);
    }

    #[test]
    fn test_lunar_new_year_flag() {
        assert!(on(1990, 2, 1).before_lunar_new_year_possible);
        assert!(!on(1990, 7, 30).before_lunar_new_year_possible);
    }

    #[test]
    fn test_date_serialization() {
        let input: ZodiacInput = serde_json::from_str(r#"{"birth_date": "1990-07-30"}"#).unwrap();
        assert_eq!(input.birth_date, NaiveDate::from_ymd_opt(1990, 7, 30).unwrap());
    }

    #[test]
    fn test_out_of_range_year() {
        let birth_date = NaiveDate::from_ymd_opt(1500, 1, 1).unwrap();
        assert!(calculate(&ZodiacInput { birth_date }).is_err());
    }
}
