//! Animation settle detection.
//!
//! An element is considered settled once its [`Fingerprint`] (class
//! attribute, computed transform, computed opacity) reads the same twice,
//! [`ANIMATION_CHECK_INTERVAL`] apart. The check is best-effort: it gives up
//! after [`SETTLE_ATTEMPTS`] and lets the caller carry on.

use crate::clock::Clock;
use crate::driver::{Driver, ElementRef};
use crate::result::{DriverResult, SteadyResult};
use std::time::Duration;

/// Maximum number of two-sample comparisons
pub const SETTLE_ATTEMPTS: u32 = 5;

/// Gap between the two samples of one comparison
pub const ANIMATION_CHECK_INTERVAL: Duration = Duration::from_millis(200);

/// Visual state used to detect running animations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    /// `class` attribute
    pub class: Option<String>,
    /// Computed `transform`
    pub transform: String,
    /// Computed `opacity`
    pub opacity: String,
}

impl Fingerprint {
    /// Read the element's current fingerprint
    pub fn capture<D: Driver + ?Sized>(driver: &D, element: &ElementRef) -> DriverResult<Self> {
        Ok(Self {
            class: driver.attribute(element, "class")?,
            transform: driver.css_value(element, "transform")?,
            opacity: driver.css_value(element, "opacity")?,
        })
    }
}

/// How a settle check ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    /// Two consecutive samples matched
    Stable {
        /// Comparison (1-based) that matched
        attempt: u32,
    },
    /// Every attempt saw a change or failed to read
    Unsettled,
}

impl Settle {
    /// Whether the element settled
    #[must_use]
    pub const fn is_stable(&self) -> bool {
        matches!(self, Self::Stable { .. })
    }
}

/// Wait for the element's fingerprint to stop changing.
///
/// Driver failures count as an unsettled attempt and are never returned.
/// Only an interrupted sleep is an error.
pub fn await_stable<D, C>(driver: &D, clock: &C, element: &ElementRef) -> SteadyResult<Settle>
where
    D: Driver + ?Sized,
    C: Clock + ?Sized,
{
    for attempt in 1..=SETTLE_ATTEMPTS {
        let before = match Fingerprint::capture(driver, element) {
            Ok(fp) => fp,
            Err(err) => {
                tracing::debug!(
                    element = %element,
                    attempt,
                    error = %err,
                    "fingerprint read failed"
                );
                continue;
            }
        };
        clock.sleep(ANIMATION_CHECK_INTERVAL)?;
        match Fingerprint::capture(driver, element) {
            Ok(after) if after == before => return Ok(Settle::Stable { attempt }),
            Ok(_) => tracing::debug!(element = %element, attempt, "element still animating"),
            Err(err) => {
                tracing::debug!(
                    element = %element,
                    attempt,
                    error = %err,
                    "fingerprint read failed"
                );
            }
        }
    }

    tracing::debug!(element = %element, "animation did not settle, continuing");
    Ok(Settle::Unsettled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::VirtualClock;
    use crate::locator::Locator;
    use crate::mock::{MockBrowser, MockElement};

    fn browser_with(element: MockElement) -> MockBrowser {
        let browser = MockBrowser::new();
        browser.add_element(element);
        browser
    }

    #[test]
    fn test_static_element_settles_first_attempt() {
        let browser = browser_with(MockElement::new("card", Locator::css(".card")));
        let clock = VirtualClock::new();

        let settle = await_stable(&browser, &clock, &ElementRef::new("card")).unwrap();

        assert_eq!(settle, Settle::Stable { attempt: 1 });
        assert_eq!(clock.sleeps(), vec![ANIMATION_CHECK_INTERVAL]);
    }

    #[test]
    fn test_fingerprint_reads_class_transform_opacity() {
        let browser = browser_with(
            MockElement::new("card", Locator::css(".card")).with_class("card is-open"),
        );

        let print = Fingerprint::capture(&browser, &ElementRef::new("card")).unwrap();

        assert_eq!(print.class.as_deref(), Some("card is-open"));
        assert_eq!(print.transform, "none");
        assert_eq!(print.opacity, "1");
    }

    #[test]
    fn test_animating_element_settles_when_frames_stop() {
        // Each fingerprint read advances one frame; frames 0..3 differ.
        let element = MockElement::new("card", Locator::css(".card"))
            .animating(&["scale(0.2)", "scale(0.6)", "scale(0.9)", "none"]);
        let browser = browser_with(element);
        let clock = VirtualClock::new();

        let settle = await_stable(&browser, &clock, &ElementRef::new("card")).unwrap();

        // reads: (0,1) (2,3) (3,3)
        assert_eq!(settle, Settle::Stable { attempt: 3 });
        assert_eq!(clock.now_ms(), 600);
    }

    #[test]
    fn test_gives_up_after_five_attempts() {
        let frames: Vec<String> = (0..20).map(|i| format!("translateX({i}px)")).collect();
        let frames: Vec<&str> = frames.iter().map(String::as_str).collect();
        let browser =
            browser_with(MockElement::new("card", Locator::css(".card")).animating(&frames));
        let clock = VirtualClock::new();

        let settle = await_stable(&browser, &clock, &ElementRef::new("card")).unwrap();

        assert!(!settle.is_stable());
        assert_eq!(clock.count_sleeps(ANIMATION_CHECK_INTERVAL), 5);
    }

    #[test]
    fn test_stale_element_is_soft_failure() {
        let browser = MockBrowser::new();
        let clock = VirtualClock::new();

        let settle = await_stable(&browser, &clock, &ElementRef::new("gone")).unwrap();

        assert_eq!(settle, Settle::Unsettled);
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn test_interrupt_is_fatal() {
        let browser = browser_with(MockElement::new("card", Locator::css(".card")));
        let clock = VirtualClock::new();
        clock.interrupt_at(100);

        let err = await_stable(&browser, &clock, &ElementRef::new("card")).unwrap_err();
        assert!(err.is_interrupted());
    }
}
