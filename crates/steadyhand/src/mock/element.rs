//! Scriptable element for [`super::MockBrowser`].

use crate::locator::Locator;

/// A tab that opens when an element is clicked
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingWindow {
    pub(crate) handle: String,
    pub(crate) url: String,
    pub(crate) loading_polls: u32,
}

/// An element on the mock page.
///
/// Defaults: rendered from the top of the page, displayed, enabled, not
/// animating, no text, no inline style.
#[derive(Debug, Clone)]
pub struct MockElement {
    pub(crate) id: String,
    pub(crate) locator: Locator,
    pub(crate) reveal_offset: u64,
    pub(crate) hidden: bool,
    pub(crate) visible_after: u32,
    pub(crate) display_checks: u32,
    pub(crate) enabled: bool,
    pub(crate) enabled_after: u32,
    pub(crate) enable_checks: u32,
    pub(crate) frames: Vec<String>,
    pub(crate) frame: usize,
    pub(crate) failing: Vec<String>,
    pub(crate) text: String,
    pub(crate) class: Option<String>,
    pub(crate) style: Option<String>,
    pub(crate) style_writes_left: Option<u32>,
    pub(crate) opens: Option<PendingWindow>,
}

impl MockElement {
    /// Create an element with id `id` matched by `locator`
    #[must_use]
    pub fn new(id: impl Into<String>, locator: Locator) -> Self {
        Self {
            id: id.into(),
            locator,
            reveal_offset: 0,
            hidden: false,
            visible_after: 0,
            display_checks: 0,
            enabled: true,
            enabled_after: 0,
            enable_checks: 0,
            frames: Vec::new(),
            frame: 0,
            failing: Vec::new(),
            text: String::new(),
            class: None,
            style: None,
            style_writes_left: None,
            opens: None,
        }
    }

    /// Only render once the window has scrolled to `offset`
    #[must_use]
    pub const fn revealed_at(mut self, offset: u64) -> Self {
        self.reveal_offset = offset;
        self
    }

    /// Present in the DOM but never displayed
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Report not displayed for the first `checks` displayed checks
    #[must_use]
    pub const fn visible_after_checks(mut self, checks: u32) -> Self {
        self.visible_after = checks;
        self
    }

    /// Never enabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Report disabled for the first `checks` enabled checks
    #[must_use]
    pub const fn enabled_after_checks(mut self, checks: u32) -> Self {
        self.enabled_after = checks;
        self
    }

    /// Computed transform changes on each read, holding the last frame
    #[must_use]
    pub fn animating(mut self, frames: &[&str]) -> Self {
        self.frames = frames.iter().map(|f| (*f).to_string()).collect();
        self
    }

    /// Make an interaction fail.
    ///
    /// `method` is one of `click`, `pointer_click`, `script_click`,
    /// `move_pointer_to`, `scroll_into_view`, `text`.
    #[must_use]
    pub fn failing(mut self, method: &str) -> Self {
        self.failing.push(method.to_string());
        self
    }

    /// Rendered text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// `class` attribute
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Inline `style` attribute
    #[must_use]
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Let `writes` style writes succeed, then fail every later one
    #[must_use]
    pub const fn fail_style_writes_after(mut self, writes: u32) -> Self {
        self.style_writes_left = Some(writes);
        self
    }

    /// A successful click opens a new tab that reports `loading` for
    /// `loading_polls` ready-state reads
    #[must_use]
    pub fn opens_window(
        mut self,
        handle: impl Into<String>,
        url: impl Into<String>,
        loading_polls: u32,
    ) -> Self {
        self.opens = Some(PendingWindow {
            handle: handle.into(),
            url: url.into(),
            loading_polls,
        });
        self
    }

    pub(crate) fn fails(&self, method: &str) -> bool {
        self.failing.iter().any(|m| m == method)
    }

    pub(crate) fn check_displayed(&mut self) -> bool {
        self.display_checks = self.display_checks.saturating_add(1);
        !self.hidden && self.display_checks > self.visible_after
    }

    pub(crate) fn check_enabled(&mut self) -> bool {
        self.enable_checks = self.enable_checks.saturating_add(1);
        self.enabled && self.enable_checks > self.enabled_after
    }

    pub(crate) fn next_transform(&mut self) -> String {
        let Some(last) = self.frames.len().checked_sub(1) else {
            return "none".to_string();
        };
        let value = self.frames[self.frame.min(last)].clone();
        self.frame += 1;
        value
    }
}
