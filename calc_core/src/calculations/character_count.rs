//! # Character Count
//!
//! Text statistics: characters, words, sentences, reading time and
//! platform length limits.
//!
//! Characters are Unicode scalar values, so `"é"` counts once but an emoji
//! built from several code points counts once per code point.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_range, CalcError, CalcResult};

const MAX_TEXT_CHARS: usize = 1_000_000;
const TOP_WORDS: usize = 5;

/// Length limits checked against the character count
pub const PLATFORM_LIMITS: [(&str, usize); 6] = [
    ("X (Twitter) post", 280),
    ("SMS message", 160),
    ("Meta description", 160),
    ("Title tag", 60),
    ("Instagram caption", 2_200),
    ("LinkedIn post", 3_000),
];

fn default_reading_wpm() -> f64 {
    238.0
}

fn default_speaking_wpm() -> f64 {
    150.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterCountInput {
    pub text: String,
    #[serde(default = "default_reading_wpm")]
    pub reading_wpm: f64,
    #[serde(default = "default_speaking_wpm")]
    pub speaking_wpm: f64,
}

impl CharacterCountInput {
    pub fn new(text: impl Into<String>) -> Self {
        CharacterCountInput {
            text: text.into(),
            reading_wpm: default_reading_wpm(),
            speaking_wpm: default_speaking_wpm(),
        }
    }

    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        let chars = self.text.chars().count();
        if chars > MAX_TEXT_CHARS {
            return Err(CalcError::invalid_input(
                "text",
                format!("{} characters", chars),
                format!("Text cannot exceed {} characters", MAX_TEXT_CHARS),
            ));
        }
        ensure_range("reading_wpm", self.reading_wpm, 50.0, 1_000.0)?;
        ensure_range("speaking_wpm", self.speaking_wpm, 50.0, 1_000.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordFrequency {
    pub word: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformCheck {
    pub platform: String,
    pub limit: usize,
    /// Negative when over the limit
    pub remaining: i64,
    pub fits: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterCountResult {
    pub characters: usize,
    pub characters_no_spaces: usize,
    pub bytes: usize,
    pub words: usize,
    pub sentences: usize,
    pub paragraphs: usize,
    pub lines: usize,
    pub average_word_length: f64,
    pub reading_time_minutes: f64,
    pub speaking_time_minutes: f64,
    pub top_words: Vec<WordFrequency>,
    pub platforms: Vec<PlatformCheck>,
}

/// Whitespace-separated tokens with at least one letter or digit, lowercased
/// and stripped of surrounding punctuation
fn words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|word| !word.is_empty())
        .collect()
}

fn count_sentences(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|segment| segment.chars().any(char::is_alphanumeric))
        .count()
}

fn count_paragraphs(text: &str) -> usize {
    let mut paragraphs = 0;
    let mut in_paragraph = false;
    for line in text.lines() {
        let blank = line.trim().is_empty();
        if !blank && !in_paragraph {
            paragraphs += 1;
        }
        in_paragraph = !blank;
    }
    paragraphs
}

fn top_words(words: &[String]) -> Vec<WordFrequency> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for word in words {
        *counts.entry(word.as_str()).or_default() += 1;
    }
    let mut ranked: Vec<WordFrequency> = counts
        .into_iter()
        .map(|(word, count)| WordFrequency { word: word.to_string(), count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    ranked.truncate(TOP_WORDS);
    ranked
}

/// Count characters, words and friends.
pub fn calculate(input: &CharacterCountInput) -> CalcResult<CharacterCountResult> {
    input.validate()?;

    let text = input.text.as_str();
    let characters = text.chars().count();
    let words = words(text);
    let word_chars: usize = words
        .iter()
        .map(|w| w.chars().filter(|c| c.is_alphanumeric()).count())
        .sum();
    let word_count = words.len();

    let platforms = PLATFORM_LIMITS
        .iter()
        .map(|(platform, limit)| PlatformCheck {
            platform: platform.to_string(),
            limit: *limit,
            remaining: *limit as i64 - characters as i64,
            fits: characters <= *limit,
        })
        .collect();

    Ok(CharacterCountResult {
        characters,
        characters_no_spaces: text.chars().filter(|c| !c.is_whitespace()).count(),
        bytes: text.len(),
        words: word_count,
        sentences: count_sentences(text),
        paragraphs: count_paragraphs(text),
        lines: text.lines().count(),
        average_word_length: if word_count > 0 {
            word_chars as f64 / word_count as f64
        } else {
            0.0
        },
        reading_time_minutes: word_count as f64 / input.reading_wpm,
        speaking_time_minutes: word_count as f64 / input.speaking_wpm,
        top_words: top_words(&words),
        platforms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(text: &str) -> CharacterCountResult {
        calculate(&CharacterCountInput::new(text)).unwrap()
    }

    #[test]
    fn test_basic_counts() {
        let result = count("Hello world. How are you?");
        assert_eq!(result.characters, 25);
        assert_eq!(result.characters_no_spaces, 21);
        assert_eq!(result.words, 5);
        assert_eq!(result.sentences, 2);
        assert_eq!(result.paragraphs, 1);
        assert_eq!(result.lines, 1);
        // hello world how are you = 19 letters
        assert!((result.average_word_length - 3.8).abs() < 1e-9);
    }

    #[test]
    fn test_empty_text() {
        let result = count("");
        assert_eq!(result.characters, 0);
        assert_eq!(result.words, 0);
        assert_eq!(result.sentences, 0);
        assert_eq!(result.paragraphs, 0);
        assert_eq!(result.lines, 0);
        assert_eq!(result.average_word_length, 0.0);
        assert!(result.top_words.is_empty());
        assert!(result.platforms.iter().all(|p| p.fits));
    }

    #[test]
    fn test_paragraphs_and_lines() {
        let result = count("First line\nsecond line\n\n\nNew paragraph\n");
        assert_eq!(result.paragraphs, 2);
        assert_eq!(result.lines, 5);
    }

    #[test]
    fn test_unicode_scalars() {
        let result = count("café naïve");
        assert_eq!(result.characters, 10);
        assert_eq!(result.bytes, 12);
        assert_eq!(result.words, 2);
    }

    #[test]
    fn test_top_words_tie_break() {
        let result = count("The cat and the dog. The dog, the cat! A bird.");
        assert_eq!(result.top_words[0], WordFrequency { word: "the".to_string(), count: 4 });
        assert_eq!(result.top_words[1].word, "cat");
        assert_eq!(result.top_words[2].word, "dog");
        assert_eq!(result.top_words[3].word, "a");
        assert_eq!(result.top_words.len(), 5);
    }

    #[test]
    fn test_platform_limits() {
        let text = "x".repeat(200);
        let result = count(&text);
        let x = result.platforms.iter().find(|p| p.limit == 280).unwrap();
        assert!(x.fits);
        assert_eq!(x.remaining, 80);
        let title = result.platforms.iter().find(|p| p.limit == 60).unwrap();
        assert!(!title.fits);
        assert_eq!(title.remaining, -140);
    }

    #[test]
    fn test_reading_time() {
        let text = vec!["word"; 476].join(" ");
        let result = count(&text);
        assert!((result.reading_time_minutes - 2.0).abs() < 1e-9);
        assert!((result.speaking_time_minutes - 476.0 / 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_reading_speed() {
        let mut input = CharacterCountInput::new("text");
        input.reading_wpm = 0.0;
        assert!(calculate(&input).is_err());
    }
}
