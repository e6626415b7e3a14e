//! Subcommand handlers

use crate::commands::{ConfigArgs, LintArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::lint::{lint_file, render_lint_json, render_lint_report};
use crate::output::{print_stdout, Reporter};
use serde::{Deserialize, Serialize};
use steadyhand::{highlight_override_from_env, parse_flag, SessionConfig, SettingsFile};

/// Where the effective highlight flag came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightSource {
    /// `--highlight` argument
    Flag,
    /// `STEADYHAND_HIGHLIGHT_ELEMENTS`
    Environment,
    /// Settings file
    File,
    /// Built-in default
    Default,
}

/// Session configuration plus the provenance of its highlight flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    /// Effective session settings
    pub config: SessionConfig,
    /// Highlight provenance
    pub highlight_source: HighlightSource,
}

/// Apply highlight precedence: flag, then environment, then file.
#[must_use]
pub fn resolve_config(
    flag: Option<&str>,
    env: Option<bool>,
    file: Option<&SettingsFile>,
) -> ResolvedConfig {
    let (explicit, source) = match (flag, env) {
        (Some(raw), _) => (Some(parse_flag(raw)), HighlightSource::Flag),
        (None, Some(value)) => (Some(value), HighlightSource::Environment),
        (None, None) if file.and_then(|f| f.highlight_elements).is_some() => {
            (None, HighlightSource::File)
        }
        (None, None) => (None, HighlightSource::Default),
    };
    ResolvedConfig {
        config: SessionConfig::resolve(explicit, file),
        highlight_source: source,
    }
}

/// Execute the lint command
pub fn run_lint(config: &CliConfig, args: &LintArgs) -> CliResult<()> {
    let reporter = Reporter::new(config.color.should_color(), config.verbosity.is_quiet());
    let report = lint_file(&args.path)?;
    tracing::info!(
        path = %args.path.display(),
        entries = report.entries_checked,
        errors = report.errors,
        "catalog linted"
    );

    if args.json {
        print_stdout(&render_lint_json(&report)?);
    } else {
        print_stdout(render_lint_report(&report).trim_end());
    }

    if report.has_errors() {
        return Err(CliError::lint_failed(
            args.path.display().to_string(),
            report.errors,
        ));
    }
    if report.warnings > 0 {
        reporter.warning(&format!("{} warning(s)", report.warnings));
    }
    reporter.success(&format!("{} locator(s) resolve", report.entries_checked));
    Ok(())
}

/// Execute the config command
pub fn run_config(_config: &CliConfig, args: &ConfigArgs) -> CliResult<()> {
    let file = args.file.as_deref().map(SettingsFile::load).transpose()?;
    let resolved = resolve_config(
        args.highlight.as_deref(),
        highlight_override_from_env(),
        file.as_ref(),
    );
    tracing::debug!(source = ?resolved.highlight_source, "highlight resolved");
    print_stdout(&serde_json::to_string_pretty(&resolved)?);
    Ok(())
}
