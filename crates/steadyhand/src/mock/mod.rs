//! Mock Browser Module
//!
//! An in-memory page for testing interaction flows without a browser. The
//! mock models the parts of a real page the engine is sensitive to:
//!
//! - lazy rendering: elements enter the DOM once the window scrolls to them
//! - late visibility and enablement, counted in checks
//! - running CSS animations, one transform frame per read
//! - per-strategy click failures
//! - extra windows that stay `loading` for a number of ready-state reads
//!
//! ## Example
//!
//! ```rust
//! use steadyhand::mock::{MockBrowser, MockElement};
//! use steadyhand::Locator;
//!
//! let browser = MockBrowser::new().with_scroll_height(3000);
//! browser.add_element(
//!     MockElement::new("jobs", Locator::css(".jobs"))
//!         .revealed_at(900)
//!         .with_text("QA Engineer"),
//! );
//! assert!(!browser.was_called("click:"));
//! ```

mod browser;
mod element;

pub use browser::MockBrowser;
pub use element::MockElement;
