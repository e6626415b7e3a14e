//! Click with ordered fallback.
//!
//! Strategies are tried in a fixed order, native first. Each attempt waits
//! for the element to settle; a failed attempt backs off before the next.

use crate::animation::await_stable;
use crate::clock::Clock;
use crate::driver::{Browser, ElementRef, PageScript};
use crate::result::{DriverError, DriverResult, SteadyError, SteadyResult};
use std::fmt;
use std::time::Duration;

/// Pause between failed strategies
pub const CLICK_BACKOFF: Duration = Duration::from_millis(500);

/// A click mechanism
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickStrategy {
    /// The driver's element click
    Native,
    /// Pointer move, press, release
    Pointer,
    /// `HTMLElement.click()` injected as script
    Script,
}

/// Every strategy, in the order they are attempted
pub const CLICK_STRATEGIES: [ClickStrategy; 3] =
    [ClickStrategy::Native, ClickStrategy::Pointer, ClickStrategy::Script];

impl ClickStrategy {
    /// Name used in logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Pointer => "pointer",
            Self::Script => "script",
        }
    }

    /// Click `element` with this strategy
    pub fn perform<B>(&self, browser: &B, element: &ElementRef) -> DriverResult<()>
    where
        B: Browser + ?Sized,
    {
        match self {
            Self::Native => browser.click(element),
            Self::Pointer => browser.pointer_click(element),
            Self::Script => browser
                .execute_script(&PageScript::Click {
                    element: element.clone(),
                })
                .map(|_| ()),
        }
    }
}

impl fmt::Display for ClickStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Click `element`, falling back through [`CLICK_STRATEGIES`].
///
/// Returns the strategy that succeeded. If all fail, the error names
/// `name` and wraps the last strategy's failure.
pub fn click_with_fallback<B, C>(
    browser: &B,
    clock: &C,
    element: &ElementRef,
    name: &str,
) -> SteadyResult<ClickStrategy>
where
    B: Browser + ?Sized,
    C: Clock + ?Sized,
{
    let mut last_error =
        DriverError::not_interactable(format!("no click strategy attempted on {name}"));

    for strategy in CLICK_STRATEGIES {
        await_stable(browser, clock, element)?;
        match strategy.perform(browser, element) {
            Ok(()) => {
                tracing::info!(element = name, strategy = %strategy, "clicked element");
                return Ok(strategy);
            }
            Err(err) => {
                tracing::warn!(
                    element = name,
                    strategy = %strategy,
                    error = %err,
                    "click strategy failed"
                );
                last_error = err;
                clock.sleep(CLICK_BACKOFF)?;
            }
        }
    }

    tracing::error!(element = name, error = %last_error, "all click strategies failed");
    Err(SteadyError::Interaction {
        element: name.to_string(),
        source: last_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::ANIMATION_CHECK_INTERVAL;
    use crate::clock::VirtualClock;
    use crate::locator::Locator;
    use crate::mock::{MockBrowser, MockElement};
    use std::error::Error as _;

    fn browser_with(element: MockElement) -> MockBrowser {
        let browser = MockBrowser::new();
        browser.add_element(element);
        browser
    }

    #[test]
    fn test_strategy_order_is_fixed() {
        assert_eq!(
            CLICK_STRATEGIES,
            [ClickStrategy::Native, ClickStrategy::Pointer, ClickStrategy::Script]
        );
    }

    #[test]
    fn test_native_success_stops_early() {
        let browser = browser_with(MockElement::new("ok", Locator::id("ok")));
        let clock = VirtualClock::new();

        let used = click_with_fallback(&browser, &clock, &ElementRef::new("ok"), "ok").unwrap();

        assert_eq!(used, ClickStrategy::Native);
        assert_eq!(browser.clicks(), vec!["click:native:ok".to_string()]);
        assert_eq!(clock.count_sleeps(CLICK_BACKOFF), 0);
    }

    #[test]
    fn test_native_failure_falls_back_to_pointer_not_script() {
        let browser = browser_with(MockElement::new("btn", Locator::id("btn")).failing("click"));
        let clock = VirtualClock::new();

        let used = click_with_fallback(&browser, &clock, &ElementRef::new("btn"), "btn").unwrap();

        assert_eq!(used, ClickStrategy::Pointer);
        assert_eq!(
            browser.clicks(),
            vec!["click:native:btn".to_string(), "click:pointer:btn".to_string()]
        );
        assert!(!browser.was_called("click:script:btn"));
        assert_eq!(clock.count_sleeps(CLICK_BACKOFF), 1);
    }

    #[test]
    fn test_settles_before_every_attempt() {
        let element = MockElement::new("btn", Locator::id("btn"))
            .failing("click")
            .failing("pointer_click");
        let browser = browser_with(element);
        let clock = VirtualClock::new();

        let used = click_with_fallback(&browser, &clock, &ElementRef::new("btn"), "btn").unwrap();

        assert_eq!(used, ClickStrategy::Script);
        assert_eq!(clock.count_sleeps(ANIMATION_CHECK_INTERVAL), 3);
    }

    #[test]
    fn test_all_strategies_fail() {
        let element = MockElement::new("btn", Locator::id("btn"))
            .failing("click")
            .failing("pointer_click")
            .failing("script_click");
        let browser = browser_with(element);
        let clock = VirtualClock::new();

        let err = click_with_fallback(&browser, &clock, &ElementRef::new("btn"), "buyButton")
            .unwrap_err();

        match &err {
            SteadyError::Interaction { element, source } => {
                assert_eq!(element, "buyButton");
                assert!(source.to_string().contains("script_click"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.source().is_some());
        assert_eq!(clock.count_sleeps(CLICK_BACKOFF), 3);
        assert_eq!(browser.clicks().len(), 3);
    }

    #[test]
    fn test_interrupt_during_backoff_is_fatal() {
        let browser = browser_with(MockElement::new("btn", Locator::id("btn")).failing("click"));
        let clock = VirtualClock::new();
        // First settle check ends at 200ms, the backoff would run to 700ms.
        clock.interrupt_at(500);

        let err =
            click_with_fallback(&browser, &clock, &ElementRef::new("btn"), "btn").unwrap_err();

        assert!(err.is_interrupted());
        assert!(!browser.was_called("click:pointer:btn"));
    }
}
