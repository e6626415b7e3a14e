//! Poll-with-timeout primitive.
//!
//! All condition waits (presence, visibility, clickability, document ready
//! state) go through [`poll_until`], which sleeps on the session [`Clock`]
//! between probes so a virtual clock can stand in for real time.

use crate::clock::Clock;
use crate::result::SteadyResult;
use std::time::Duration;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for interactability waits (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (250ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// WAIT OUTCOME
// =============================================================================

/// Outcome of a poll loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome<T> {
    /// The probe produced a value
    Satisfied {
        /// Value produced by the probe
        value: T,
        /// Time spent waiting
        elapsed: Duration,
    },
    /// The budget ran out first
    TimedOut {
        /// Time spent waiting
        elapsed: Duration,
    },
}

impl<T> WaitOutcome<T> {
    /// The satisfied value, if any
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Satisfied { value, .. } => Some(value),
            Self::TimedOut { .. } => None,
        }
    }

    /// Time spent waiting
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        match self {
            Self::Satisfied { elapsed, .. } | Self::TimedOut { elapsed } => *elapsed,
        }
    }
}

/// Probe `condition` until it yields a value or the timeout elapses.
///
/// The probe always runs at least once, and once more at the deadline. Only
/// an interrupted sleep is an error.
pub fn poll_until<C, T, F>(
    clock: &C,
    options: &WaitOptions,
    mut condition: F,
) -> SteadyResult<WaitOutcome<T>>
where
    C: Clock + ?Sized,
    F: FnMut() -> Option<T>,
{
    let start = clock.now();
    let timeout = options.timeout();
    let poll_interval = options.poll_interval().max(Duration::from_millis(1));

    loop {
        if let Some(value) = condition() {
            return Ok(WaitOutcome::Satisfied {
                value,
                elapsed: clock.now().saturating_sub(start),
            });
        }

        let elapsed = clock.now().saturating_sub(start);
        if elapsed >= timeout {
            return Ok(WaitOutcome::TimedOut { elapsed });
        }
        clock.sleep(poll_interval.min(timeout - elapsed))?;
    }
}
