//! Scroll search: find elements that only render once scrolled near.
//!
//! The page height is read once; the window then walks down in fixed steps
//! until the element is found and displayed, or the walk passes the bottom.
//! A miss always ends with the window back at the top.

use crate::clock::Clock;
use crate::driver::{Browser, ElementRef, PageScript, ScrollAlign};
use crate::locator::Locator;
use crate::result::{DriverError, SteadyResult};
use std::time::Duration;

/// Pause after centering a found element
pub const REVEAL_SETTLE: Duration = Duration::from_secs(1);

/// Pause after each scroll step
pub const STEP_SETTLE: Duration = Duration::from_millis(300);

/// Pause after scrolling back to the top
pub const RESET_SETTLE: Duration = Duration::from_secs(1);

/// Outcome of a scroll search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollSearch {
    /// Element found, displayed, and centered in the viewport
    Found {
        /// The element
        element: ElementRef,
        /// Window offset at which it was found
        offset: u64,
        /// Scroll steps taken before finding it
        steps: u32,
    },
    /// The whole page was scanned without a displayed match
    NotFound {
        /// Total scrollable height scanned
        total_height: u64,
        /// Scroll steps taken
        steps: u32,
    },
}

impl ScrollSearch {
    /// The found element, if any
    #[must_use]
    pub fn element(&self) -> Option<&ElementRef> {
        match self {
            Self::Found { element, .. } => Some(element),
            Self::NotFound { .. } => None,
        }
    }

    /// Consume into the found element, if any
    #[must_use]
    pub fn into_element(self) -> Option<ElementRef> {
        match self {
            Self::Found { element, .. } => Some(element),
            Self::NotFound { .. } => None,
        }
    }
}

/// Transient per-search state
#[derive(Debug, Clone, Copy)]
struct ScrollState {
    offset: u64,
    total_height: u64,
    step: u64,
    steps: u32,
}

impl ScrollState {
    fn exhausted(&self) -> bool {
        self.offset >= self.total_height
    }

    fn advance(&mut self) -> u64 {
        self.offset = self.offset.saturating_add(self.step);
        self.steps += 1;
        self.offset
    }
}

/// Read `document.documentElement.scrollHeight`
pub fn scroll_height<B: Browser + ?Sized>(browser: &B) -> SteadyResult<u64> {
    let value = browser.execute_script(&PageScript::ScrollHeight)?;
    let height = value
        .as_u64()
        .or_else(|| value.as_f64().map(|h| h.max(0.0).ceil() as u64))
        .ok_or_else(|| DriverError::script(format!("scrollHeight was not a number: {value}")))?;
    Ok(height)
}

fn find_displayed<B: Browser + ?Sized>(browser: &B, locator: &Locator) -> Option<ElementRef> {
    let element = browser.find_element(locator).ok()?;
    browser
        .is_displayed(&element)
        .ok()
        .filter(|shown| *shown)
        .map(|_| element)
}

/// Scroll the page until `locator` is found and displayed.
///
/// Misses on individual probes (absent, stale, hidden) are expected and only
/// advance the scan. Failures to read the page height or to scroll are
/// returned.
pub fn locate<B, C>(
    browser: &B,
    clock: &C,
    locator: &Locator,
    step: u64,
) -> SteadyResult<ScrollSearch>
where
    B: Browser + ?Sized,
    C: Clock + ?Sized,
{
    let mut state = ScrollState {
        offset: 0,
        total_height: scroll_height(browser)?,
        step: step.max(1),
        steps: 0,
    };
    tracing::debug!(
        locator = %locator,
        total_height = state.total_height,
        step = state.step,
        "scroll search started"
    );

    while !state.exhausted() {
        if let Some(element) = find_displayed(browser, locator) {
            let centered = browser.execute_script(&PageScript::ScrollIntoView {
                element: element.clone(),
                align: ScrollAlign::Center,
            });
            if centered.is_ok() {
                clock.sleep(REVEAL_SETTLE)?;
                tracing::debug!(
                    locator = %locator,
                    offset = state.offset,
                    steps = state.steps,
                    "element revealed"
                );
                return Ok(ScrollSearch::Found {
                    element,
                    offset: state.offset,
                    steps: state.steps,
                });
            }
        }

        let next = state.advance();
        browser.execute_script(&PageScript::ScrollWindowTo { top: next })?;
        clock.sleep(STEP_SETTLE)?;
    }

    browser.execute_script(&PageScript::ScrollWindowTo { top: 0 })?;
    clock.sleep(RESET_SETTLE)?;
    tracing::debug!(
        locator = %locator,
        total_height = state.total_height,
        "scroll search exhausted"
    );

    Ok(ScrollSearch::NotFound {
        total_height: state.total_height,
        steps: state.steps,
    })
}

/// Smooth-scroll the window back to the top
pub fn scroll_to_top<B, C>(browser: &B, clock: &C) -> SteadyResult<()>
where
    B: Browser + ?Sized,
    C: Clock + ?Sized,
{
    browser.execute_script(&PageScript::ScrollWindowTo { top: 0 })?;
    clock.sleep(RESET_SETTLE)
}
