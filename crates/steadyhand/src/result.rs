//! Result and error types for Steadyhand.
//!
//! Two layers: [`DriverError`] is what a single browser capability reports,
//! [`SteadyError`] is what a public interaction operation reports.

use thiserror::Error;

/// Result type for Steadyhand operations
pub type SteadyResult<T> = Result<T, SteadyError>;

/// Result type for a single driver capability call
pub type DriverResult<T> = Result<T, DriverError>;

/// Errors reported by the underlying automation driver
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// No element matched the locator
    #[error("No such element: {locator}")]
    NoSuchElement {
        /// Rendered locator
        locator: String,
    },

    /// The element reference no longer points into the document
    #[error("Stale element reference: {element}")]
    StaleElement {
        /// Element reference id
        element: String,
    },

    /// The element exists but refused the interaction
    #[error("Element not interactable: {message}")]
    NotInteractable {
        /// Error message
        message: String,
    },

    /// Script evaluation failed in the page
    #[error("Script error: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// Any other driver command failure
    #[error("Driver command failed: {message}")]
    Command {
        /// Error message
        message: String,
    },
}

impl DriverError {
    /// Create a command error
    #[must_use]
    pub fn command(message: impl Into<String>) -> Self {
        Self::Command {
            message: message.into(),
        }
    }

    /// Create a script error
    #[must_use]
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script {
            message: message.into(),
        }
    }

    /// Create a not-interactable error
    #[must_use]
    pub fn not_interactable(message: impl Into<String>) -> Self {
        Self::NotInteractable {
            message: message.into(),
        }
    }
}

/// Errors that can occur in Steadyhand
#[derive(Debug, Error)]
pub enum SteadyError {
    /// Unknown element name or unsupported locator type
    #[error("Failed to get locator for element '{element}': {reason}")]
    Configuration {
        /// Element name
        element: String,
        /// Why resolution failed
        reason: String,
    },

    /// Scroll search exhausted the page without a visible match
    #[error("Element not found after scrolling: {element}")]
    NotFound {
        /// Element name
        element: String,
    },

    /// A wait condition was not met within its budget
    #[error("Timed out after {ms}ms waiting for {condition} of {locator}")]
    Timeout {
        /// Rendered locator
        locator: String,
        /// Condition that was not met
        condition: String,
        /// Budget in milliseconds
        ms: u64,
    },

    /// Every click strategy failed
    #[error("Failed to click element after trying all strategies: {element}")]
    Interaction {
        /// Element name
        element: String,
        /// Failure of the last strategy attempted
        #[source]
        source: DriverError,
    },

    /// Visibility assertion failed
    #[error("Assertion failed: {message}")]
    Assertion {
        /// Error message
        message: String,
    },

    /// Navigation failed
    #[error("Failed to navigate to URL '{url}': {source}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Driver failure
        #[source]
        source: DriverError,
    },

    /// Any other driver failure on an action path
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// The calling thread was interrupted during a wait
    #[error("Wait interrupted")]
    Interrupted,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl SteadyError {
    /// Create a configuration error for an element
    #[must_use]
    pub fn configuration(element: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            element: element.into(),
            reason: reason.into(),
        }
    }

    /// Create an assertion error
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion {
            message: message.into(),
        }
    }

    /// Whether this error means the calling thread was interrupted
    #[must_use]
    pub const fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}
