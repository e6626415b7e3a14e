//! Locator catalog linting
//!
//! Every entry of a catalog is resolved the way a session would resolve it,
//! so an unsupported `type` surfaces here instead of mid-suite.
//!
//! | Code   | Severity | Finding                                  |
//! |--------|----------|------------------------------------------|
//! | LOC001 | error    | locator type is not xpath/css/id/name    |
//! | LOC002 | error    | locator value is empty                   |
//! | LOC003 | warning  | catalog has no entries                   |
//! | LOC004 | warning  | id/name value contains whitespace        |

#![allow(clippy::format_push_string)]

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use steadyhand::{resolve, LocatorCatalog, LocatorSource, Strategy};

/// Lint severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    /// Error - the entry cannot be used
    Error,
    /// Warning - the entry will likely never match
    Warning,
}

impl LintSeverity {
    /// Get display string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARN",
        }
    }
}

/// A single lint finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintResult {
    /// Element name, absent for catalog-level findings
    pub element: Option<String>,
    /// Severity
    pub severity: LintSeverity,
    /// Rule code
    pub code: String,
    /// Message
    pub message: String,
}

impl LintResult {
    /// Create an error finding for an element
    #[must_use]
    pub fn error(element: &str, code: &str, message: impl Into<String>) -> Self {
        Self {
            element: Some(element.to_string()),
            severity: LintSeverity::Error,
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Create a warning finding for an element
    #[must_use]
    pub fn warning(element: &str, code: &str, message: impl Into<String>) -> Self {
        Self {
            element: Some(element.to_string()),
            severity: LintSeverity::Warning,
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Findings for one catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LintReport {
    /// Catalog path
    pub path: PathBuf,
    /// Findings, in element-name order
    pub results: Vec<LintResult>,
    /// Entries checked
    pub entries_checked: usize,
    /// Error count
    pub errors: usize,
    /// Warning count
    pub warnings: usize,
}

impl LintReport {
    /// Create an empty report
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Add a finding
    pub fn add(&mut self, result: LintResult) {
        match result.severity {
            LintSeverity::Error => self.errors += 1,
            LintSeverity::Warning => self.warnings += 1,
        }
        self.results.push(result);
    }

    /// Whether any errors were found
    #[must_use]
    pub const fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// Lint a catalog already in memory
#[must_use]
pub fn lint_catalog(path: &Path, catalog: &LocatorCatalog) -> LintReport {
    let mut report = LintReport::new(path);

    if catalog.is_empty() {
        report.add(LintResult {
            element: None,
            severity: LintSeverity::Warning,
            code: "LOC003".to_string(),
            message: "catalog has no entries".to_string(),
        });
        return report;
    }

    for name in catalog.names() {
        report.entries_checked += 1;
        let locator = match resolve(catalog, name) {
            Ok(locator) => locator,
            Err(e) => {
                tracing::debug!(element = name, error = %e, "entry failed to resolve");
                let kind = catalog.entry(name).map(|entry| entry.kind).unwrap_or_default();
                report.add(LintResult::error(
                    name,
                    "LOC001",
                    format!("unsupported locator type '{kind}'"),
                ));
                continue;
            }
        };

        if locator.value.trim().is_empty() {
            report.add(LintResult::error(name, "LOC002", "locator value is empty"));
        } else if matches!(locator.strategy, Strategy::Id | Strategy::Name)
            && locator.value.chars().any(char::is_whitespace)
        {
            report.add(LintResult::warning(
                name,
                "LOC004",
                format!("{} value '{}' contains whitespace", locator.strategy, locator.value),
            ));
        }
    }

    report
}

/// Load and lint a catalog file
pub fn lint_file(path: &Path) -> steadyhand::SteadyResult<LintReport> {
    let catalog = LocatorCatalog::load(path)?;
    Ok(lint_catalog(path, &catalog))
}

/// Render a report as plain text
#[must_use]
pub fn render_lint_report(report: &LintReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("LINT REPORT: {}\n", report.path.display()));
    output.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    if report.results.is_empty() {
        output.push_str("✓ All locators resolve\n");
    }
    for result in &report.results {
        let element = result.element.as_deref().unwrap_or("<catalog>");
        output.push_str(&format!(
            "  {} [{}] {}: {}\n",
            result.severity.as_str(),
            result.code,
            element,
            result.message
        ));
    }

    output.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    output.push_str(&format!(
        "Summary: {} errors, {} warnings, {} entries checked\n",
        report.errors, report.warnings, report.entries_checked
    ));
    output
}

/// Render a report as JSON
pub fn render_lint_json(report: &LintReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
