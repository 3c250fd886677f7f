//! Scheduler demo CLI library
//!
//! Provides the Demo runner and supporting modules for the turnloop CLI.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod demo;
pub mod error;

pub use cli::Cli;
pub use demo::{Demo, ScenarioReport, SCENARIOS};
pub use error::{CliError, CliResult};
