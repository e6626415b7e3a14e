//! Steadyhand CLI Library
//!
//! Operator commands around the Steadyhand library: lint a locator catalog
//! before a suite runs, and show the session configuration a suite would get.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod lint;
mod output;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, LintArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use handlers::{resolve_config, run_config, run_lint, HighlightSource, ResolvedConfig};
pub use lint::{
    lint_catalog, lint_file, render_lint_json, render_lint_report, LintReport, LintResult,
    LintSeverity,
};
pub use output::Reporter;
