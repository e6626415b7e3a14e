//! Session configuration.
//!
//! Settings are resolved once, when the session is built. The highlight flag
//! follows a fixed precedence:
//!
//! 1. an explicit override (caller argument, or `STEADYHAND_HIGHLIGHT_ELEMENTS`)
//! 2. the settings file (`highlight_elements` / `highlightElements`)
//! 3. `false`

use crate::result::SteadyResult;
use crate::wait::{WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default scroll step for scroll search, in CSS pixels
pub const DEFAULT_SCROLL_STEP: u64 = 300;

/// Environment variable holding the highlight override
pub const HIGHLIGHT_ENV_VAR: &str = "STEADYHAND_HIGHLIGHT_ELEMENTS";

/// Parse a boolean flag the way `Boolean.parseBoolean` does: only a
/// case-insensitive `"true"` is true.
#[must_use]
pub fn parse_flag(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("true")
}

/// Highlight override from the environment, if set
#[must_use]
pub fn highlight_override_from_env() -> Option<bool> {
    std::env::var(HIGHLIGHT_ENV_VAR).ok().map(|v| parse_flag(&v))
}

/// Contents of a settings file; every key optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    /// Highlight elements before interacting
    #[serde(alias = "highlightElements")]
    pub highlight_elements: Option<bool>,
    /// Interactability wait budget
    #[serde(alias = "waitTimeoutMs")]
    pub wait_timeout_ms: Option<u64>,
    /// Poll interval for condition waits
    #[serde(alias = "pollIntervalMs")]
    pub poll_interval_ms: Option<u64>,
    /// Scroll search step
    #[serde(alias = "scrollStep")]
    pub scroll_step: Option<u64>,
    /// Base URL for the suite
    #[serde(alias = "baseUrl")]
    pub base_url: Option<String>,
}

impl SettingsFile {
    /// Parse settings from YAML text
    pub fn from_yaml_str(yaml: &str) -> SteadyResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load settings from a YAML file
    pub fn load(path: impl AsRef<Path>) -> SteadyResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }
}

/// Resolved configuration for one interaction session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Budget for each presence/visibility/clickable wait
    pub wait_timeout_ms: u64,
    /// Poll interval for condition waits
    pub poll_interval_ms: u64,
    /// Scroll search step
    pub scroll_step: u64,
    /// Highlight elements before interacting
    pub highlight_elements: bool,
    /// Base URL for the suite
    pub base_url: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            wait_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            scroll_step: DEFAULT_SCROLL_STEP,
            highlight_elements: false,
            base_url: None,
        }
    }
}

impl SessionConfig {
    /// Create config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve from an optional highlight override and optional settings file
    #[must_use]
    pub fn resolve(highlight_override: Option<bool>, file: Option<&SettingsFile>) -> Self {
        let mut config = Self::default();
        if let Some(file) = file {
            if let Some(timeout) = file.wait_timeout_ms {
                config.wait_timeout_ms = timeout;
            }
            if let Some(interval) = file.poll_interval_ms {
                config.poll_interval_ms = interval;
            }
            if let Some(step) = file.scroll_step.filter(|s| *s > 0) {
                config.scroll_step = step;
            }
            config.base_url.clone_from(&file.base_url);
        }
        config.highlight_elements = highlight_override
            .or_else(|| file.and_then(|f| f.highlight_elements))
            .unwrap_or(false);
        config
    }

    /// Resolve using the environment override and an optional settings file path
    pub fn from_env_and_file(path: Option<&Path>) -> SteadyResult<Self> {
        let file = path.map(SettingsFile::load).transpose()?;
        Ok(Self::resolve(highlight_override_from_env(), file.as_ref()))
    }

    /// Set the wait budget
    #[must_use]
    pub const fn with_wait_timeout(mut self, timeout_ms: u64) -> Self {
        self.wait_timeout_ms = timeout_ms;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    /// Set the scroll step
    #[must_use]
    pub const fn with_scroll_step(mut self, step: u64) -> Self {
        self.scroll_step = step;
        self
    }

    /// Enable or disable highlighting
    #[must_use]
    pub const fn with_highlight(mut self, enabled: bool) -> Self {
        self.highlight_elements = enabled;
        self
    }

    /// Set the base URL relative navigation is joined onto
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Wait options derived from this config
    #[must_use]
    pub const fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.wait_timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    /// Wait budget as Duration
    #[must_use]
    pub const fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse_flag_tests {
        use super::*;

        #[test]
        fn test_only_true_is_true() {
            assert!(parse_flag("true"));
            assert!(parse_flag("TRUE"));
            assert!(parse_flag(" True "));
            assert!(!parse_flag("yes"));
            assert!(!parse_flag("1"));
            assert!(!parse_flag(""));
        }
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = SessionConfig::default();
            assert_eq!(config.wait_timeout(), Duration::from_secs(10));
            assert_eq!(config.scroll_step, 300);
            assert!(!config.highlight_elements);
        }

        #[test]
        fn test_override_beats_file() {
            let file = SettingsFile {
                highlight_elements: Some(true),
                ..SettingsFile::default()
            };
            assert!(!SessionConfig::resolve(Some(false), Some(&file)).highlight_elements);
            assert!(SessionConfig::resolve(Some(true), None).highlight_elements);
        }

        #[test]
        fn test_file_beats_default() {
            let file = SettingsFile {
                highlight_elements: Some(true),
                ..SettingsFile::default()
            };
            assert!(SessionConfig::resolve(None, Some(&file)).highlight_elements);
        }

        #[test]
        fn test_nothing_means_false() {
            assert!(!SessionConfig::resolve(None, None).highlight_elements);
            let config = SessionConfig::resolve(None, Some(&SettingsFile::default()));
            assert!(!config.highlight_elements);
        }

        #[test]
        fn test_file_overrides_timings() {
            let file = SettingsFile::from_yaml_str(
                "waitTimeoutMs: 2500\nscroll_step: 150\nbaseUrl: https://example.com\n",
            )
            .unwrap();
            let config = SessionConfig::resolve(None, Some(&file));
            assert_eq!(config.wait_timeout_ms, 2500);
            assert_eq!(config.scroll_step, 150);
            assert_eq!(config.base_url.as_deref(), Some("https://example.com"));
        }

        #[test]
        fn test_zero_scroll_step_is_ignored() {
            let file = SettingsFile {
                scroll_step: Some(0),
                ..SettingsFile::default()
            };
            assert_eq!(SessionConfig::resolve(None, Some(&file)).scroll_step, 300);
        }

        #[test]
        fn test_builder() {
            let config = SessionConfig::new()
                .with_wait_timeout(500)
                .with_poll_interval(50)
                .with_scroll_step(100)
                .with_highlight(true);
            assert_eq!(
                config.wait_options(),
                WaitOptions::new().with_timeout(500).with_poll_interval(50)
            );
            assert_eq!(config.scroll_step, 100);
            assert!(config.highlight_elements);
        }
    }

    mod settings_file_tests {
        use super::*;

        #[test]
        fn test_load_yaml_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("steadyhand.yaml");
            std::fs::write(&path, "highlightElements: true\n").unwrap();

            let config = SessionConfig::from_env_and_file(Some(&path)).unwrap();
            // The env override is unset in the test environment.
            if std::env::var(HIGHLIGHT_ENV_VAR).is_err() {
                assert!(config.highlight_elements);
            }
        }

        #[test]
        fn test_missing_file_is_io_error() {
            let err = SettingsFile::load("/definitely/not/here.yaml").unwrap_err();
            assert!(matches!(err, crate::result::SteadyError::Io(_)));
        }

        #[test]
        fn test_bad_yaml_is_yaml_error() {
            let err = SettingsFile::from_yaml_str("highlight_elements: [").unwrap_err();
            assert!(matches!(err, crate::result::SteadyError::Yaml(_)));
        }
    }
}
