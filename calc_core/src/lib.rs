//! # calc_core - Everyday Calculator Engine
//!
//! `calc_core` is the formula engine behind Calcshelf: mortgages, loans,
//! nutrition, probability, ratios and other everyday calculators behind one
//! JSON-friendly API.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Shareable**: Any input round-trips through a URL query string
//!
//! ## Quick Start
//!
//! ```rust
//! use calc_core::calculations::mortgage::{calculate, DownPayment, MortgageInput};
//!
//! let input = MortgageInput {
//!     home_price: 800_000.0,
//!     down_payment: DownPayment::Percent(20.0),
//!     annual_rate_pct: 5.0,
//!     amortization_years: 25,
//!     ..Default::default()
//! };
//! let result = calculate(&input).unwrap();
//! assert_eq!(result.schedule.len(), 25);
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - All calculators and the [`CalculatorItem`] wrapper
//! - [`amortization`] - Level payments, rate conversion, schedules
//! - [`tables`] - Embedded provincial tax and mortgage insurance tables
//! - [`units`] - Type-safe length and weight wrappers
//! - [`report`] - Plain-text result rendering
//! - [`share`] - Input state as a URL query string
//! - [`errors`] - Structured error types

pub mod amortization;
pub mod calculations;
pub mod errors;
pub mod report;
pub mod share;
pub mod tables;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{CalculationOutput, CalculatorItem};
pub use errors::{CalcError, CalcResult};
pub use report::{render, ReportOptions};
pub use share::{from_query, share_url, to_query};
