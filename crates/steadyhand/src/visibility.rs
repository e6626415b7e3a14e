//! Interactability waits: presence, then visibility, then clickability.
//!
//! Each stage gets the full wait budget; budgets are not shared between
//! stages.

use crate::clock::Clock;
use crate::driver::{Driver, ElementRef};
use crate::locator::Locator;
use crate::result::{SteadyError, SteadyResult};
use crate::wait::{poll_until, WaitOptions, WaitOutcome};
use std::fmt;

/// A condition an element must meet before interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// At least one element matches
    Presence,
    /// The first match is displayed
    Visibility,
    /// The element is displayed and enabled
    Clickable,
    /// At least one element matches; all matches are returned
    PresenceOfAll,
}

impl Condition {
    /// Name used in timeout messages
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Presence => "presence",
            Self::Visibility => "visibility",
            Self::Clickable => "clickability",
            Self::PresenceOfAll => "presence of all elements",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn expect<T>(
    outcome: WaitOutcome<T>,
    locator: &Locator,
    condition: Condition,
    options: &WaitOptions,
) -> SteadyResult<T> {
    outcome.into_value().ok_or_else(|| {
        tracing::debug!(locator = %locator, condition = %condition, "wait timed out");
        SteadyError::Timeout {
            locator: locator.to_string(),
            condition: condition.to_string(),
            ms: options.timeout_ms,
        }
    })
}

/// Wait until some element matches `locator`
pub fn await_present<D, C>(
    driver: &D,
    clock: &C,
    locator: &Locator,
    options: &WaitOptions,
) -> SteadyResult<ElementRef>
where
    D: Driver + ?Sized,
    C: Clock + ?Sized,
{
    let outcome = poll_until(clock, options, || driver.find_element(locator).ok())?;
    expect(outcome, locator, Condition::Presence, options)
}

/// Wait until the first match of `locator` is displayed
pub fn await_visible<D, C>(
    driver: &D,
    clock: &C,
    locator: &Locator,
    options: &WaitOptions,
) -> SteadyResult<ElementRef>
where
    D: Driver + ?Sized,
    C: Clock + ?Sized,
{
    let outcome = poll_until(clock, options, || {
        let element = driver.find_element(locator).ok()?;
        matches!(driver.is_displayed(&element), Ok(true)).then_some(element)
    })?;
    expect(outcome, locator, Condition::Visibility, options)
}

/// Wait until `element` is displayed and enabled
pub fn await_clickable<D, C>(
    driver: &D,
    clock: &C,
    locator: &Locator,
    element: &ElementRef,
    options: &WaitOptions,
) -> SteadyResult<()>
where
    D: Driver + ?Sized,
    C: Clock + ?Sized,
{
    let outcome = poll_until(clock, options, || {
        let shown = matches!(driver.is_displayed(element), Ok(true));
        (shown && matches!(driver.is_enabled(element), Ok(true))).then_some(())
    })?;
    expect(outcome, locator, Condition::Clickable, options)
}

/// Wait until at least one element matches and return every match
pub fn await_all_present<D, C>(
    driver: &D,
    clock: &C,
    locator: &Locator,
    options: &WaitOptions,
) -> SteadyResult<Vec<ElementRef>>
where
    D: Driver + ?Sized,
    C: Clock + ?Sized,
{
    let outcome = poll_until(clock, options, || {
        driver
            .find_elements(locator)
            .ok()
            .filter(|found| !found.is_empty())
    })?;
    expect(outcome, locator, Condition::PresenceOfAll, options)
}

/// Presence, then visibility, then clickability, each with the full budget
pub fn await_interactable<D, C>(
    driver: &D,
    clock: &C,
    locator: &Locator,
    options: &WaitOptions,
) -> SteadyResult<ElementRef>
where
    D: Driver + ?Sized,
    C: Clock + ?Sized,
{
    await_present(driver, clock, locator, options)?;
    let element = await_visible(driver, clock, locator, options)?;
    await_clickable(driver, clock, locator, &element, options)?;
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::VirtualClock;
    use crate::mock::{MockBrowser, MockElement};

    fn options() -> WaitOptions {
        WaitOptions::new().with_timeout(1_000).with_poll_interval(100)
    }

    #[test]
    fn test_ready_element_passes_all_stages() {
        let browser = MockBrowser::new();
        browser.add_element(MockElement::new("submit", Locator::id("submit-btn")));
        let clock = VirtualClock::new();

        let element =
            await_interactable(&browser, &clock, &Locator::id("submit-btn"), &options()).unwrap();

        assert_eq!(element, ElementRef::new("submit"));
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn test_missing_element_times_out_on_presence() {
        let browser = MockBrowser::new();
        let clock = VirtualClock::new();

        let err =
            await_interactable(&browser, &clock, &Locator::id("nope"), &options()).unwrap_err();

        match err {
            SteadyError::Timeout { locator, condition, ms } => {
                assert_eq!(locator, "By.id: nope");
                assert_eq!(condition, "presence");
                assert_eq!(ms, 1_000);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(clock.now_ms(), 1_000);
    }

    #[test]
    fn test_late_visibility_is_awaited() {
        let browser = MockBrowser::new();
        browser.add_element(
            MockElement::new("menu", Locator::css(".menu")).visible_after_checks(3),
        );
        let clock = VirtualClock::new();

        let element = await_visible(&browser, &clock, &Locator::css(".menu"), &options()).unwrap();

        assert_eq!(element, ElementRef::new("menu"));
        assert_eq!(clock.now_ms(), 300);
    }

    #[test]
    fn test_disabled_element_times_out_on_clickability() {
        let browser = MockBrowser::new();
        browser.add_element(MockElement::new("buy", Locator::id("buy")).disabled());
        let clock = VirtualClock::new();

        let err =
            await_interactable(&browser, &clock, &Locator::id("buy"), &options()).unwrap_err();

        assert!(matches!(
            err,
            SteadyError::Timeout { ref condition, .. } if condition == "clickability"
        ));
    }

    #[test]
    fn test_stages_have_independent_budgets() {
        let browser = MockBrowser::new();
        browser.add_element(
            MockElement::new("late", Locator::id("late"))
                .visible_after_checks(8)
                .enabled_after_checks(8),
        );
        let clock = VirtualClock::new();

        // Visibility takes 800ms and clickability another 800ms, so the
        // whole call outlives a single 1s budget.
        await_interactable(&browser, &clock, &Locator::id("late"), &options()).unwrap();
        assert!(clock.now_ms() > 1_000);
    }

    #[test]
    fn test_all_present_returns_every_match() {
        let browser = MockBrowser::new();
        browser.add_element(MockElement::new("a", Locator::css(".row")));
        browser.add_element(MockElement::new("b", Locator::css(".row")));
        let clock = VirtualClock::new();

        let rows = await_all_present(&browser, &clock, &Locator::css(".row"), &options()).unwrap();
        assert_eq!(rows, vec![ElementRef::new("a"), ElementRef::new("b")]);
    }

    #[test]
    fn test_all_present_times_out_on_empty() {
        let browser = MockBrowser::new();
        let clock = VirtualClock::new();

        let err =
            await_all_present(&browser, &clock, &Locator::css(".row"), &options()).unwrap_err();
        assert!(err.to_string().contains("presence of all elements"));
    }
}
