//! # Calcshelf CLI
//!
//! Command-line front end for `calc_core`: one subcommand per calculator,
//! text or JSON output, share links, and an optional `calcshelf.toml`.
//!
//! Exit codes: `0` success, `2` invalid input, `1` anything else.

mod cli;
mod config;
mod logger;

use std::process::ExitCode;

use anyhow::Result;
use calc_core::{render, share_url, CalcError};
use clap::Parser;

use crate::cli::Cli;
use crate::config::{Config, OutputFormat};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return fail(&e, cli.format.unwrap_or_default()),
    };
    let format = cli.format.unwrap_or(config.output.format);

    match run(&cli, &config, format) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e, format),
    }
}

fn run(cli: &Cli, config: &Config, format: OutputFormat) -> Result<()> {
    let item = cli.command.to_item(&config.defaults)?;
    tracing::info!(calculator = item.calc_type(), "calculating");

    let output = item.calculate()?;
    let link = if cli.share {
        Some(share_url(&config.share.base_url, &item)?)
    } else {
        None
    };

    match format {
        OutputFormat::Text => {
            print!("{}", render(&output, &config.report_options(cli.schedule_rows)));
            if let Some(link) = link {
                println!();
                println!("Share: {}", link);
            }
        }
        OutputFormat::Json => {
            let json = match link {
                Some(link) => serde_json::to_string_pretty(&serde_json::json!({
                    "result": output,
                    "share_url": link,
                }))?,
                None => serde_json::to_string_pretty(&output)?,
            };
            println!("{}", json);
        }
    }
    Ok(())
}

/// First `CalcError` anywhere in the context chain
fn calc_error(err: &anyhow::Error) -> Option<&CalcError> {
    err.chain().find_map(|e| e.downcast_ref::<CalcError>())
}

/// `2` for invalid input, `1` for everything else
fn exit_code(err: &anyhow::Error) -> ExitCode {
    match calc_error(err) {
        Some(e) if e.is_user_error() => ExitCode::from(2),
        _ => ExitCode::from(1),
    }
}

/// Text printed to stderr for a failed command
fn error_report(err: &anyhow::Error, format: OutputFormat) -> String {
    match (format, calc_error(err)) {
        (OutputFormat::Json, Some(e)) => {
            serde_json::to_string_pretty(e).unwrap_or_else(|_| format!("Error: {:#}", err))
        }
        _ => format!("Error: {:#}", err),
    }
}

/// Report an error and pick the exit code.
fn fail(err: &anyhow::Error, format: OutputFormat) -> ExitCode {
    tracing::debug!(error = ?err, "command failed");
    eprintln!("{}", error_report(err, format));
    exit_code(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context};

    fn user_error() -> anyhow::Error {
        Err::<(), _>(CalcError::invalid_input("rate_pct", "-1", "Must be positive"))
            .context("Could not rebuild the calculation from the link")
            .unwrap_err()
    }

    #[test]
    fn test_user_error_exits_with_two() {
        assert_eq!(exit_code(&user_error()), ExitCode::from(2));
        assert_eq!(fail(&user_error(), OutputFormat::Text), ExitCode::from(2));
        let missing = anyhow::Error::new(CalcError::missing_field("type"));
        assert_eq!(exit_code(&missing), ExitCode::from(2));
    }

    #[test]
    fn test_other_errors_exit_with_one() {
        let failed = anyhow::Error::new(CalcError::calculation_failed("Ratio", "Terms too small"));
        assert_eq!(exit_code(&failed), ExitCode::from(1));
        assert_eq!(exit_code(&anyhow!("Failed to read input.json")), ExitCode::from(1));
        assert_eq!(fail(&anyhow!("io"), OutputFormat::Json), ExitCode::from(1));
    }

    #[test]
    fn test_json_mode_prints_serialized_error() {
        let report = error_report(&user_error(), OutputFormat::Json);
        let json: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(json["type"], "InvalidInput");
        assert_eq!(json["details"]["field"], "rate_pct");

        let text = error_report(&user_error(), OutputFormat::Text);
        assert!(text.starts_with("Error: Could not rebuild the calculation from the link"));
        assert!(error_report(&anyhow!("io"), OutputFormat::Json).starts_with("Error: io"));
    }
}
