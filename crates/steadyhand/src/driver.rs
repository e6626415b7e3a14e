//! Driver capabilities the interaction engine needs.
//!
//! The engine never talks to a browser directly. It drives two narrow
//! traits, so a real binding (see `ChromiumDriver` behind the `browser`
//! feature) and the in-memory [`crate::mock::MockBrowser`] are interchangeable:
//!
//! ```text
//! ┌──────────────────────────────┐
//! │      InteractionSession      │
//! └──────────────┬───────────────┘
//!                │ &D
//!     ┌──────────┴───────────┐
//!     ▼                      ▼
//! ┌────────────┐     ┌────────────────┐
//! │   Driver   │     │ ScriptExecutor │
//! │ find/click │     │  PageScript →  │
//! │ windows    │     │  JSON value    │
//! └────────────┘     └────────────────┘
//! ```
//!
//! Every call into page JavaScript is a [`PageScript`] value: the real
//! binding renders it with [`PageScript::source`], fakes match on the variant.

use crate::locator::Locator;
use crate::result::DriverResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Opaque reference to one element in the current document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    /// Driver-assigned identifier
    pub id: String,
}

impl ElementRef {
    /// Create an element reference
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Identifier of one browsing context (window or tab)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowHandle(pub String);

impl WindowHandle {
    /// Create a window handle
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw handle string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// PAGE SCRIPTS
// =============================================================================

/// Where `scrollIntoView` puts the element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAlign {
    /// Smooth scroll to the vertical center of the viewport
    Center,
    /// Align the element with the top of the viewport
    Top,
}

/// Argument passed to a page script
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptArg {
    /// A DOM element
    Element(ElementRef),
    /// A plain JSON value
    Value(Value),
}

/// Every piece of JavaScript the engine runs in the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageScript {
    /// Total scrollable height of the document
    ScrollHeight,
    /// Smooth-scroll the window to a vertical offset
    ScrollWindowTo {
        /// Target offset from the top
        top: u64,
    },
    /// Scroll an element into view
    ScrollIntoView {
        /// Element to reveal
        element: ElementRef,
        /// Alignment
        align: ScrollAlign,
    },
    /// Replace an element's inline style
    SetStyle {
        /// Target element
        element: ElementRef,
        /// New `style` attribute value
        style: String,
    },
    /// Dispatch `HTMLElement.click()` from script
    Click {
        /// Target element
        element: ElementRef,
    },
    /// `document.readyState`
    ReadyState,
}

impl PageScript {
    /// JavaScript function body; arguments are `arguments[0..]`
    #[must_use]
    pub fn source(&self) -> String {
        match self {
            Self::ScrollHeight => "return document.documentElement.scrollHeight;".to_string(),
            Self::ScrollWindowTo { top } => {
                format!("window.scrollTo({{top: {top}, behavior: 'smooth'}});")
            }
            Self::ScrollIntoView {
                align: ScrollAlign::Center,
                ..
            } => "arguments[0].scrollIntoView({behavior: 'smooth', block: 'center'});".to_string(),
            Self::ScrollIntoView {
                align: ScrollAlign::Top,
                ..
            } => "arguments[0].scrollIntoView(true);".to_string(),
            Self::SetStyle { .. } => {
                "arguments[0].setAttribute('style', arguments[1]);".to_string()
            }
            Self::Click { .. } => "arguments[0].click();".to_string(),
            Self::ReadyState => "return document.readyState;".to_string(),
        }
    }

    /// Arguments for [`Self::source`], in order
    #[must_use]
    pub fn arguments(&self) -> Vec<ScriptArg> {
        match self {
            Self::ScrollHeight | Self::ScrollWindowTo { .. } | Self::ReadyState => Vec::new(),
            Self::ScrollIntoView { element, .. } | Self::Click { element } => {
                vec![ScriptArg::Element(element.clone())]
            }
            Self::SetStyle { element, style } => vec![
                ScriptArg::Element(element.clone()),
                ScriptArg::Value(Value::String(style.clone())),
            ],
        }
    }

    /// Short name for logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ScrollHeight => "scroll_height",
            Self::ScrollWindowTo { .. } => "scroll_window_to",
            Self::ScrollIntoView { .. } => "scroll_into_view",
            Self::SetStyle { .. } => "set_style",
            Self::Click { .. } => "script_click",
            Self::ReadyState => "ready_state",
        }
    }
}

// =============================================================================
// CAPABILITY TRAITS
// =============================================================================

/// Browser capabilities used by the interaction engine.
///
/// Methods take `&self`; a binding that needs to mutate state (the current
/// window, say) does so internally. The engine never calls a driver from
/// more than one thread.
pub trait Driver {
    /// First element matching `locator`
    fn find_element(&self, locator: &Locator) -> DriverResult<ElementRef>;

    /// All elements matching `locator`, possibly none
    fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>>;

    /// URL of the current browsing context
    fn current_url(&self) -> DriverResult<String>;

    /// Handle of the current browsing context
    fn window_handle(&self) -> DriverResult<WindowHandle>;

    /// Handles of all open browsing contexts
    fn window_handles(&self) -> DriverResult<Vec<WindowHandle>>;

    /// Make `handle` the current browsing context
    fn switch_to_window(&self, handle: &WindowHandle) -> DriverResult<()>;

    /// Load `url` in the current browsing context
    fn navigate(&self, url: &str) -> DriverResult<()>;

    /// Native element click
    fn click(&self, element: &ElementRef) -> DriverResult<()>;

    /// Move the pointer over the element
    fn move_pointer_to(&self, element: &ElementRef) -> DriverResult<()>;

    /// Pointer-simulated click: move to the element, press and release
    fn pointer_click(&self, element: &ElementRef) -> DriverResult<()>;

    /// Whether the element is rendered visible
    fn is_displayed(&self, element: &ElementRef) -> DriverResult<bool>;

    /// Whether the element accepts input
    fn is_enabled(&self, element: &ElementRef) -> DriverResult<bool>;

    /// DOM attribute value, `None` if absent
    fn attribute(&self, element: &ElementRef, name: &str) -> DriverResult<Option<String>>;

    /// Computed CSS property value
    fn css_value(&self, element: &ElementRef, name: &str) -> DriverResult<String>;

    /// Rendered text
    fn text(&self, element: &ElementRef) -> DriverResult<String>;
}

/// Runs [`PageScript`]s in the current document
pub trait ScriptExecutor {
    /// Execute a script and return its JSON result (`null` when it returns nothing)
    fn execute_script(&self, script: &PageScript) -> DriverResult<Value>;
}

/// A driver that can also run page scripts
pub trait Browser: Driver + ScriptExecutor {}

impl<T: Driver + ScriptExecutor + ?Sized> Browser for T {}
