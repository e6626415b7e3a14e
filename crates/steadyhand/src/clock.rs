//! Clocks for blocking waits.
//!
//! Every sleep in the engine goes through a [`Clock`]. [`SystemClock`] blocks
//! the calling thread and can be woken early by an [`Interrupter`];
//! [`VirtualClock`] advances instantly so tests can assert on elapsed time
//! without real delays.

use crate::result::{SteadyError, SteadyResult};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::Thread;
use std::time::{Duration, Instant};

/// Source of time and blocking sleeps
pub trait Clock {
    /// Time elapsed since the clock was created
    fn now(&self) -> Duration;

    /// Block for `duration`.
    ///
    /// Returns [`SteadyError::Interrupted`] if the wait was interrupted.
    fn sleep(&self, duration: Duration) -> SteadyResult<()>;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) -> SteadyResult<()> {
        (**self).sleep(duration)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) -> SteadyResult<()> {
        (**self).sleep(duration)
    }
}

// =============================================================================
// SYSTEM CLOCK
// =============================================================================

#[derive(Debug, Default)]
struct InterruptState {
    requested: AtomicBool,
    sleeper: Mutex<Option<Thread>>,
}

/// Handle that interrupts a [`SystemClock`] sleep from another thread
#[derive(Debug, Clone)]
pub struct Interrupter {
    state: Arc<InterruptState>,
}

impl Interrupter {
    /// Interrupt the current (or next) sleep
    pub fn interrupt(&self) {
        self.state.requested.store(true, Ordering::SeqCst);
        if let Ok(slot) = self.state.sleeper.lock() {
            if let Some(thread) = slot.as_ref() {
                thread.unpark();
            }
        }
    }
}

/// Wall-clock time with interruptible sleeps
#[derive(Debug)]
pub struct SystemClock {
    started: Instant,
    state: Arc<InterruptState>,
}

impl SystemClock {
    /// Create a new system clock
    #[must_use]
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            state: Arc::new(InterruptState::default()),
        }
    }

    /// Get a handle that can interrupt this clock's sleeps
    #[must_use]
    pub fn interrupter(&self) -> Interrupter {
        Interrupter {
            state: Arc::clone(&self.state),
        }
    }

    fn take_interrupt(&self) -> bool {
        self.state.requested.swap(false, Ordering::SeqCst)
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    fn sleep(&self, duration: Duration) -> SteadyResult<()> {
        if let Ok(mut slot) = self.state.sleeper.lock() {
            *slot = Some(std::thread::current());
        }

        let deadline = Instant::now() + duration;
        let outcome = loop {
            if self.take_interrupt() {
                break Err(SteadyError::Interrupted);
            }
            let now = Instant::now();
            if now >= deadline {
                break Ok(());
            }
            // Spurious wakeups are fine, the loop re-checks both exits.
            std::thread::park_timeout(deadline - now);
        };

        if let Ok(mut slot) = self.state.sleeper.lock() {
            *slot = None;
        }
        outcome
    }
}

// =============================================================================
// VIRTUAL CLOCK
// =============================================================================

/// Sentinel for "never interrupt"
const NEVER: u64 = u64::MAX;

/// Virtual time for deterministic tests.
///
/// `sleep` advances the clock instantly and records the requested duration.
#[derive(Debug)]
pub struct VirtualClock {
    /// Current virtual time in milliseconds
    current_ms: AtomicU64,
    /// Virtual time at which the next sleep reports an interruption
    interrupt_at_ms: AtomicU64,
    /// Every sleep requested, in order
    sleeps: Mutex<Vec<Duration>>,
}

impl VirtualClock {
    /// Create a virtual clock at time zero
    #[must_use]
    pub fn new() -> Self {
        Self {
            current_ms: AtomicU64::new(0),
            interrupt_at_ms: AtomicU64::new(NEVER),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// Create a shared virtual clock
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Current virtual time in milliseconds
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.current_ms.load(Ordering::SeqCst)
    }

    /// Fast-forward time without recording a sleep
    pub fn advance(&self, duration: Duration) {
        self.current_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    /// Interrupt the first sleep that would run past `time_ms`
    pub fn interrupt_at(&self, time_ms: u64) {
        self.interrupt_at_ms.store(time_ms, Ordering::SeqCst);
    }

    /// All sleeps requested so far
    #[must_use]
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Number of sleeps of exactly `duration`
    #[must_use]
    pub fn count_sleeps(&self, duration: Duration) -> usize {
        self.sleeps().iter().filter(|d| **d == duration).count()
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.now_ms())
    }

    fn sleep(&self, duration: Duration) -> SteadyResult<()> {
        let start = self.now_ms();
        let end = start.saturating_add(duration.as_millis() as u64);
        let interrupt_at = self.interrupt_at_ms.load(Ordering::SeqCst);
        if end > interrupt_at {
            self.interrupt_at_ms.store(NEVER, Ordering::SeqCst);
            self.current_ms.store(interrupt_at.max(start), Ordering::SeqCst);
            return Err(SteadyError::Interrupted);
        }

        if let Ok(mut sleeps) = self.sleeps.lock() {
            sleeps.push(duration);
        }
        self.current_ms.store(end, Ordering::SeqCst);
        Ok(())
    }
}
