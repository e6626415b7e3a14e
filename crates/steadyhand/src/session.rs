//! Interaction session: the public operations test scripts call.
//!
//! Every element operation follows the same path:
//!
//! ```text
//! name ──resolve──► Locator ──scroll search──► ElementRef
//!      ──await interactable──► highlight ──► action
//! ```
//!
//! Action operations (`click`, `hover`, ...) return the typed error of the
//! step that failed. Verification operations (`verify_*`) log the failure and
//! return `Ok(false)`; only an interrupted wait escapes them.

use crate::animation::await_stable;
use crate::click::{click_with_fallback, ClickStrategy};
use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::driver::{Browser, ElementRef, PageScript, ScrollAlign};
use crate::highlight::highlight;
use crate::locator::{resolve, Locator, LocatorCatalog, LocatorSource};
use crate::result::{SteadyError, SteadyResult};
use crate::scroll::{self, ScrollSearch};
use crate::tabs;
use crate::visibility::{await_all_present, await_interactable, await_visible};
use crate::wait::WaitOptions;
use std::time::Duration;

/// Element name looked up by [`InteractionSession::accept_cookies_if_present`]
pub const ACCEPT_COOKIES: &str = "acceptCookies";

/// Pause after moving the pointer onto an element
pub const HOVER_SETTLE: Duration = Duration::from_millis(300);

/// Pause after aligning an element to the top of the viewport
pub const ALIGN_SETTLE: Duration = Duration::from_secs(1);

/// Pause between pointer move and click
pub const POINTER_SETTLE: Duration = Duration::from_secs(1);

/// Pause after centering each element during text verification
pub const TEXT_CENTER_SETTLE: Duration = Duration::from_millis(300);

/// Pause after checking each element during text verification
pub const TEXT_NEXT_SETTLE: Duration = Duration::from_millis(500);

/// Pause before reading the URL in [`InteractionSession::verify_domain`]
pub const DOMAIN_SETTLE: Duration = Duration::from_secs(1);

/// Pause after navigation
pub const NAVIGATION_SETTLE: Duration = Duration::from_secs(2);

/// Log an action failure and pass it through
fn report<T>(operation: &'static str, subject: &str, result: SteadyResult<T>) -> SteadyResult<T> {
    if let Err(err) = &result {
        tracing::error!(operation, element = subject, error = %err, "operation failed");
    }
    result
}

/// Turn every failure except an interruption into `false`
fn soften(
    operation: &'static str,
    subject: &str,
    result: SteadyResult<bool>,
) -> SteadyResult<bool> {
    match result {
        Err(SteadyError::Interrupted) => Err(SteadyError::Interrupted),
        Err(err) => {
            tracing::warn!(operation, subject, error = %err, "verification failed");
            Ok(false)
        }
        ok => ok,
    }
}

/// Join a relative path onto the base URL; absolute URLs pass through
fn join_url(base: Option<&str>, url: &str) -> String {
    match base {
        Some(base) if !url.contains("://") => {
            format!("{}/{}", base.trim_end_matches('/'), url.trim_start_matches('/'))
        }
        _ => url.to_string(),
    }
}

/// One interaction session over a single browser.
///
/// Owns the driver handle, the locator source, and the clock; sub-steps
/// borrow them. Create one per test run.
///
/// # Example
///
/// ```rust
/// use steadyhand::mock::{MockBrowser, MockElement};
/// use steadyhand::{
///     ClickStrategy, InteractionSession, Locator, LocatorCatalog, SessionConfig, VirtualClock,
/// };
///
/// let browser = MockBrowser::new();
/// browser.add_element(MockElement::new("submit", Locator::id("submit-btn")));
/// let locators = LocatorCatalog::new().with_entry("submit", "id", "submit-btn");
///
/// let mut session = InteractionSession::new(browser, locators, SessionConfig::default())
///     .with_clock(VirtualClock::new());
/// assert_eq!(session.click("submit").unwrap(), ClickStrategy::Native);
/// ```
#[derive(Debug)]
pub struct InteractionSession<B, S = LocatorCatalog, C = SystemClock> {
    browser: B,
    locators: S,
    clock: C,
    config: SessionConfig,
    last_click: Option<ClickStrategy>,
}

impl<B: Browser, S: LocatorSource> InteractionSession<B, S, SystemClock> {
    /// Create a session on the system clock
    #[must_use]
    pub fn new(browser: B, locators: S, config: SessionConfig) -> Self {
        tracing::debug!(
            highlight = config.highlight_elements,
            wait_timeout_ms = config.wait_timeout_ms,
            scroll_step = config.scroll_step,
            "interaction session created"
        );
        Self {
            browser,
            locators,
            clock: SystemClock::new(),
            config,
            last_click: None,
        }
    }
}

impl<B: Browser, S: LocatorSource, C: Clock> InteractionSession<B, S, C> {
    /// Replace the clock
    #[must_use]
    pub fn with_clock<C2: Clock>(self, clock: C2) -> InteractionSession<B, S, C2> {
        InteractionSession {
            browser: self.browser,
            locators: self.locators,
            clock,
            config: self.config,
            last_click: self.last_click,
        }
    }

    /// The underlying browser
    #[must_use]
    pub const fn browser(&self) -> &B {
        &self.browser
    }

    /// The session clock
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Resolved configuration
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether elements are highlighted before interaction
    #[must_use]
    pub const fn highlight_enabled(&self) -> bool {
        self.config.highlight_elements
    }

    /// Strategy used by the last successful click
    #[must_use]
    pub const fn last_click_strategy(&self) -> Option<ClickStrategy> {
        self.last_click
    }

    /// Consume the session and return the browser
    pub fn into_browser(self) -> B {
        self.browser
    }

    fn options(&self) -> WaitOptions {
        self.config.wait_options()
    }

    // =========================================================================
    // SHARED STEPS
    // =========================================================================

    /// Resolve `name` against the locator source
    pub fn locator(&self, name: &str) -> SteadyResult<Locator> {
        resolve(&self.locators, name)
    }

    fn reveal(&self, name: &str, locator: &Locator) -> SteadyResult<ElementRef> {
        let search = scroll::locate(&self.browser, &self.clock, locator, self.config.scroll_step)?;
        search.into_element().ok_or_else(|| SteadyError::NotFound {
            element: name.to_string(),
        })
    }

    fn interactable(&self, name: &str) -> SteadyResult<ElementRef> {
        let locator = self.locator(name)?;
        self.reveal(name, &locator)?;
        let element = await_interactable(&self.browser, &self.clock, &locator, &self.options())?;
        self.mark(&element)?;
        Ok(element)
    }

    fn mark(&self, element: &ElementRef) -> SteadyResult<()> {
        highlight(&self.browser, &self.clock, element, self.config.highlight_elements).map(|_| ())
    }

    fn align_top(&self, element: &ElementRef) -> SteadyResult<()> {
        self.browser.execute_script(&PageScript::ScrollIntoView {
            element: element.clone(),
            align: ScrollAlign::Top,
        })?;
        self.clock.sleep(ALIGN_SETTLE)
    }

    // =========================================================================
    // ACTIONS
    // =========================================================================

    /// Click the named element, falling back through click strategies.
    ///
    /// When more than one window is open afterwards, switches to the first
    /// one that is not current.
    pub fn click(&mut self, name: &str) -> SteadyResult<ClickStrategy> {
        let result = self.click_inner(name);
        report("click", name, result)
    }

    fn click_inner(&mut self, name: &str) -> SteadyResult<ClickStrategy> {
        let element = self.interactable(name)?;
        let strategy = click_with_fallback(&self.browser, &self.clock, &element, name)?;
        self.last_click = Some(strategy);

        if self.browser.window_handles()?.len() > 1 && !self.switch_to_new_tab()? {
            tracing::warn!(
                element = name,
                "click left several windows open but no tab switch happened"
            );
        }
        Ok(strategy)
    }

    /// Click the named element with an injected script click only
    pub fn click_via_script(&mut self, name: &str) -> SteadyResult<()> {
        let result = self.interactable(name).and_then(|element| {
            ClickStrategy::Script
                .perform(&self.browser, &element)
                .map_err(|source| SteadyError::Interaction {
                    element: name.to_string(),
                    source,
                })
        });
        if result.is_ok() {
            self.last_click = Some(ClickStrategy::Script);
            tracing::info!(element = name, "clicked element via script");
        }
        report("click_via_script", name, result)
    }

    /// Move the pointer onto the named element and wait for hover effects
    pub fn hover(&self, name: &str) -> SteadyResult<()> {
        let result = self.interactable(name).and_then(|element| {
            self.browser.move_pointer_to(&element)?;
            self.clock.sleep(HOVER_SETTLE)?;
            await_stable(&self.browser, &self.clock, &element)?;
            tracing::info!(element = name, "hovered over element");
            Ok(())
        });
        report("hover", name, result)
    }

    /// Align the element to the top, move the pointer onto it, then click
    pub fn move_to_element_and_click(&mut self, name: &str) -> SteadyResult<()> {
        let result = self.interactable(name).and_then(|element| {
            self.align_top(&element)?;
            let interaction = |source| SteadyError::Interaction {
                element: name.to_string(),
                source,
            };
            self.browser.move_pointer_to(&element).map_err(interaction)?;
            self.clock.sleep(POINTER_SETTLE)?;
            self.browser.pointer_click(&element).map_err(interaction)?;
            tracing::info!(element = name, "moved to and clicked element");
            Ok(())
        });
        if result.is_ok() {
            self.last_click = Some(ClickStrategy::Pointer);
        }
        report("move_to_element_and_click", name, result)
    }

    /// Align the element to the top with a script, then click with fallback
    pub fn move_to_element_and_click_with_js(&mut self, name: &str) -> SteadyResult<ClickStrategy> {
        let result = self.interactable(name).and_then(|element| {
            self.align_top(&element)?;
            click_with_fallback(&self.browser, &self.clock, &element, name)
        });
        if let Ok(strategy) = result {
            self.last_click = Some(strategy);
        }
        report("move_to_element_and_click_with_js", name, result)
    }

    /// Load `url` in the current window.
    ///
    /// A URL without a scheme is joined onto the configured `base_url`.
    pub fn navigate_to_url(&self, url: &str) -> SteadyResult<()> {
        let target = join_url(self.config.base_url.as_deref(), url);
        let result = self
            .browser
            .navigate(&target)
            .map_err(|source| SteadyError::Navigation {
                url: target.clone(),
                source,
            })
            .and_then(|()| {
                tracing::info!(url = %target, "navigated");
                self.clock.sleep(NAVIGATION_SETTLE)
            });
        report("navigate_to_url", &target, result)
    }

    /// Switch to a newly opened tab; `Ok(false)` when there is none
    pub fn switch_to_new_tab(&self) -> SteadyResult<bool> {
        tabs::switch_to_new_tab(&self.browser, &self.clock, &self.options())
    }

    /// Click the cookie consent button if it is already on screen.
    ///
    /// Never fails: a missing locator, banner, or failed click is logged and
    /// reported as `false`.
    pub fn accept_cookies_if_present(&self) -> bool {
        let accept = || -> SteadyResult<bool> {
            let locator = self.locator(ACCEPT_COOKIES)?;
            let button = self.browser.find_element(&locator)?;
            if !self.browser.is_displayed(&button)? {
                return Ok(false);
            }
            self.browser.click(&button)?;
            Ok(true)
        };

        match accept() {
            Ok(true) => {
                tracing::info!("cookies accepted");
                true
            }
            Ok(false) => {
                tracing::info!("cookie banner not displayed");
                false
            }
            Err(err) => {
                tracing::info!(error = %err, "no cookie banner found or already accepted");
                false
            }
        }
    }

    /// Smooth-scroll back to the top of the page
    pub fn scroll_to_top(&self) -> SteadyResult<()> {
        scroll::scroll_to_top(&self.browser, &self.clock)?;
        tracing::info!("scrolled to the top of the page");
        Ok(())
    }

    /// Fixed wait on the session clock
    pub fn pause(&self, duration: Duration) -> SteadyResult<()> {
        self.clock.sleep(duration)
    }

    // =========================================================================
    // VERIFICATIONS
    // =========================================================================

    /// Whether the named element can be scrolled to and becomes visible.
    ///
    /// Returns `Ok(true)` or an error: a bad locator is a
    /// [`SteadyError::Configuration`], every other failure an
    /// [`SteadyError::Assertion`].
    pub fn is_element_visible(&self, name: &str) -> SteadyResult<bool> {
        let locator = self.locator(name)?;
        let search = scroll::locate(&self.browser, &self.clock, &locator, self.config.scroll_step);
        let visible = match search {
            Ok(ScrollSearch::Found { .. }) => {
                await_visible(&self.browser, &self.clock, &locator, &self.options())
                    .and_then(|element| self.mark(&element))
            }
            Ok(ScrollSearch::NotFound { .. }) => Err(SteadyError::assertion(format!(
                "Element '{name}' could not be found on the page"
            ))),
            Err(err) => Err(err),
        };

        match visible {
            Ok(()) => {
                tracing::info!(element = name, "element is visible");
                Ok(true)
            }
            Err(SteadyError::Interrupted) => Err(SteadyError::Interrupted),
            Err(err @ SteadyError::Assertion { .. }) => {
                tracing::error!(element = name, error = %err, "visibility check failed");
                Err(err)
            }
            Err(err) => {
                tracing::error!(element = name, error = %err, "visibility check failed");
                Err(SteadyError::assertion(format!("Element '{name}' is not visible: {err}")))
            }
        }
    }

    /// Fail with [`SteadyError::Assertion`] unless the element is visible
    pub fn assert_element_visible(&self, name: &str) -> SteadyResult<()> {
        if self.is_element_visible(name)? {
            Ok(())
        } else {
            Err(SteadyError::assertion(format!(
                "Element '{name}' is not visible on the screen"
            )))
        }
    }

    /// Whether every element matching `name` contains `expected` (case-sensitive).
    ///
    /// An empty match set is `false`.
    pub fn verify_text_in_elements(&self, name: &str, expected: &str) -> SteadyResult<bool> {
        let result = self.verify_text_inner(name, expected);
        soften("verify_text_in_elements", name, result)
    }

    fn verify_text_inner(&self, name: &str, expected: &str) -> SteadyResult<bool> {
        let locator = self.locator(name)?;
        if let ScrollSearch::NotFound { .. } =
            scroll::locate(&self.browser, &self.clock, &locator, self.config.scroll_step)?
        {
            tracing::warn!(element = name, "elements could not be found on the page");
            return Ok(false);
        }

        let elements = await_all_present(&self.browser, &self.clock, &locator, &self.options())?;
        if elements.is_empty() {
            tracing::warn!(element = name, "no elements found");
            return Ok(false);
        }

        let mut all_match = true;
        for (index, element) in elements.iter().enumerate() {
            self.browser.execute_script(&PageScript::ScrollIntoView {
                element: element.clone(),
                align: ScrollAlign::Center,
            })?;
            self.clock.sleep(TEXT_CENTER_SETTLE)?;

            let actual = self.browser.text(element)?;
            let actual = actual.trim();
            if actual.contains(expected) {
                self.mark(element)?;
                tracing::info!(
                    element = name,
                    position = index + 1,
                    text = actual,
                    "element contains expected text"
                );
            } else {
                tracing::warn!(
                    element = name,
                    position = index + 1,
                    expected,
                    text = actual,
                    "element does not contain expected text"
                );
                all_match = false;
            }
            self.clock.sleep(TEXT_NEXT_SETTLE)?;
        }

        Ok(all_match)
    }

    /// Whether the current URL contains `expected`, ignoring case
    pub fn verify_domain(&self, expected: &str) -> SteadyResult<bool> {
        let result = self.clock.sleep(DOMAIN_SETTLE).and_then(|()| {
            let url = self.browser.current_url()?;
            let valid = url.to_lowercase().contains(&expected.to_lowercase());
            if valid {
                tracing::info!(url = %url, expected, "current URL contains expected domain");
            } else {
                tracing::warn!(
                    url = %url,
                    expected,
                    "current URL does not contain expected domain"
                );
            }
            Ok(valid)
        });
        soften("verify_domain", expected, result)
    }
}
