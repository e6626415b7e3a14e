//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Catalog lint found errors
    #[error("Lint failed: {errors} error(s) in {path}")]
    LintFailed {
        /// Catalog path
        path: String,
        /// Number of errors
        errors: usize,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON rendering error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Steadyhand library error
    #[error("Steadyhand error: {0}")]
    Steady(#[from] steadyhand::SteadyError),
}

impl CliError {
    /// Create a lint failure
    #[must_use]
    pub fn lint_failed(path: impl Into<String>, errors: usize) -> Self {
        Self::LintFailed {
            path: path.into(),
            errors,
        }
    }
}
