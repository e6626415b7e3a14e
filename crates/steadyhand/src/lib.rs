//! Steadyhand: resilient element interaction for browser end-to-end tests
//!
//! Dynamically rendered pages make naive test scripts flaky: elements render
//! only once scrolled near, animate into place, or swallow the first click.
//! Steadyhand wraps a browser driver in a single contract per operation:
//! the call either succeeds or fails with a typed, diagnosable reason.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    STEADYHAND Architecture                       │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │  Locator   │    │  Scroll    │    │ Visibility │            │
//! │   │  Catalog   │───►│  Search    │───►│  Waiter    │            │
//! │   └────────────┘    └────────────┘    └─────┬──────┘            │
//! │                                             ▼                   │
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │    Tab     │◄───│   Click    │◄───│ Highlight  │            │
//! │   │ Coordinator│    │  Fallback  │    │ (optional) │            │
//! │   └────────────┘    └─────┬──────┘    └────────────┘            │
//! │                           ▼                                     │
//! │                     ┌────────────┐                              │
//! │                     │ Animation  │                              │
//! │                     │  Settler   │                              │
//! │                     └────────────┘                              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All waits block the calling thread and go through a [`Clock`], so tests
//! run against [`VirtualClock`] and [`mock::MockBrowser`] without real time
//! or a real browser.
//!
//! # Example
//!
//! ```rust
//! use steadyhand::mock::{MockBrowser, MockElement};
//! use steadyhand::{InteractionSession, Locator, LocatorCatalog, SessionConfig, VirtualClock};
//!
//! let browser = MockBrowser::new().with_url("https://USEINSIDER.com/careers");
//! browser.add_element(MockElement::new("role", Locator::css(".role")).with_text("QA Engineer"));
//! let locators = LocatorCatalog::new().with_entry("roles", "css", ".role");
//!
//! let session = InteractionSession::new(browser, locators, SessionConfig::default())
//!     .with_clock(VirtualClock::new());
//! assert!(session.verify_domain("useinsider.com").unwrap());
//! assert!(session.verify_text_in_elements("roles", "QA").unwrap());
//! ```

#![warn(missing_docs)]

mod animation;
#[cfg(feature = "browser")]
mod browser;
mod click;
mod clock;
mod config;
mod driver;
mod highlight;
mod locator;
mod result;
mod scroll;
mod session;
mod tabs;
mod visibility;
mod wait;

/// In-memory browser for testing interaction flows
pub mod mock;

pub use animation::{
    await_stable, Fingerprint, Settle, ANIMATION_CHECK_INTERVAL, SETTLE_ATTEMPTS,
};
#[cfg(feature = "browser")]
pub use browser::{BrowserConfig, ChromiumDriver};
pub use click::{click_with_fallback, ClickStrategy, CLICK_BACKOFF, CLICK_STRATEGIES};
pub use clock::{Clock, Interrupter, SystemClock, VirtualClock};
pub use config::{
    highlight_override_from_env, parse_flag, SessionConfig, SettingsFile, DEFAULT_SCROLL_STEP,
    HIGHLIGHT_ENV_VAR,
};
pub use driver::{
    Browser, Driver, ElementRef, PageScript, ScriptArg, ScriptExecutor, ScrollAlign, WindowHandle,
};
pub use highlight::{highlight, Highlight, HIGHLIGHT_DURATION, HIGHLIGHT_STYLE};
pub use locator::{resolve, Locator, LocatorCatalog, LocatorEntry, LocatorSource, Strategy};
pub use result::{DriverError, DriverResult, SteadyError, SteadyResult};
pub use scroll::{
    locate, scroll_height, scroll_to_top, ScrollSearch, RESET_SETTLE, REVEAL_SETTLE, STEP_SETTLE,
};
pub use session::{
    InteractionSession, ACCEPT_COOKIES, ALIGN_SETTLE, DOMAIN_SETTLE, HOVER_SETTLE,
    NAVIGATION_SETTLE, POINTER_SETTLE, TEXT_CENTER_SETTLE, TEXT_NEXT_SETTLE,
};
pub use tabs::{switch_to_new_tab, NEW_TAB_GRACE, READY_COMPLETE};
pub use visibility::{
    await_all_present, await_clickable, await_interactable, await_present, await_visible,
    Condition,
};
pub use wait::{
    poll_until, WaitOptions, WaitOutcome, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::clock::*;
    pub use super::config::*;
    pub use super::driver::*;
    pub use super::locator::*;
    pub use super::result::*;
    pub use super::session::*;
    pub use super::wait::*;
}
