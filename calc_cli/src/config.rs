//! Optional `calcshelf.toml` configuration.
//!
//! ```toml
//! [output]
//! format = "text"          # or "json"
//! currency_symbol = "$"
//! decimals = 2
//! schedule_rows = 10
//!
//! [defaults]
//! province = "ON"
//! payment_frequency = "monthly"
//! vat_rate_pct = 20.0
//! unit_system = "metric"
//!
//! [share]
//! base_url = "https://calcshelf.example/"
//! ```
//!
//! Every key is optional; missing keys take the defaults above.

use std::path::Path;

use anyhow::{bail, Context, Result};
use calc_core::amortization::PaymentFrequency;
use calc_core::report::ReportOptions;
use calc_core::tables::Province;
use calc_core::units::UnitSystem;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "calcshelf.toml";

const MAX_DECIMALS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub currency_symbol: String,
    pub decimals: usize,
    pub schedule_rows: Option<usize>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            format: OutputFormat::Text,
            currency_symbol: "$".to_string(),
            decimals: 2,
            schedule_rows: None,
        }
    }
}

/// Values used when a subcommand flag is left out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub province: Province,
    pub payment_frequency: PaymentFrequency,
    pub vat_rate_pct: f64,
    pub unit_system: UnitSystem,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        DefaultsConfig {
            province: Province::default(),
            payment_frequency: PaymentFrequency::default(),
            vat_rate_pct: 20.0,
            unit_system: UnitSystem::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    pub base_url: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        ShareConfig {
            base_url: "https://calcshelf.example/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub defaults: DefaultsConfig,
    pub share: ShareConfig,
}

impl Config {
    /// Load `path`, or `calcshelf.toml` from the working directory when it
    /// exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::from_file(Path::new(DEFAULT_CONFIG_FILE)),
            None => {
                tracing::debug!("no configuration file, using defaults");
                Ok(Config::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&content).with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("TOML parsing error")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.output.decimals > MAX_DECIMALS {
            bail!("output.decimals must be at most {}, got {}", MAX_DECIMALS, self.output.decimals);
        }
        let vat = self.defaults.vat_rate_pct;
        if !vat.is_finite() || !(0.0..=100.0).contains(&vat) {
            bail!("defaults.vat_rate_pct must be between 0 and 100, got {}", vat);
        }
        if self.share.base_url.trim().is_empty() {
            bail!("share.base_url cannot be empty");
        }
        Ok(())
    }

    /// Report options with an optional row limit from the command line
    pub fn report_options(&self, schedule_rows: Option<usize>) -> ReportOptions {
        ReportOptions {
            currency_symbol: self.output.currency_symbol.clone(),
            decimals: self.output.decimals,
            schedule_rows: schedule_rows.or(self.output.schedule_rows),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml_str(
            r#"
            [output]
            format = "json"
            currency_symbol = "€"
            decimals = 0
            schedule_rows = 5

            [defaults]
            province = "BC"
            payment_frequency = "accelerated_bi_weekly"
            vat_rate_pct = 19.0
            unit_system = "imperial"

            [share]
            base_url = "https://calc.example.org/s"
            "#,
        )
        .unwrap();
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.output.currency_symbol, "€");
        assert_eq!(config.defaults.province, Province::BritishColumbia);
        assert_eq!(config.defaults.payment_frequency, PaymentFrequency::AcceleratedBiWeekly);
        assert_eq!(config.defaults.unit_system, UnitSystem::Imperial);
        assert_eq!(config.share.base_url, "https://calc.example.org/s");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = Config::from_toml_str("[output]\ndecimals = 3\n").unwrap();
        assert_eq!(config.output.decimals, 3);
        assert_eq!(config.output.currency_symbol, "$");
        assert_eq!(config.defaults.vat_rate_pct, 20.0);
    }

    #[test]
    fn test_report_options_override() {
        let config = Config::from_toml_str("[output]\nschedule_rows = 5\n").unwrap();
        assert_eq!(config.report_options(None).schedule_rows, Some(5));
        assert_eq!(config.report_options(Some(2)).schedule_rows, Some(2));
    }

    #[test]
    fn test_invalid_config() {
        assert!(Config::from_toml_str("[output]\ndecimals = 40\n").is_err());
        assert!(Config::from_toml_str("[defaults]\nvat_rate_pct = 150.0\n").is_err());
        assert!(Config::from_toml_str("[defaults]\nprovince = \"XX\"\n").is_err());
        assert!(Config::from_toml_str("[output\n").is_err());
    }
}
