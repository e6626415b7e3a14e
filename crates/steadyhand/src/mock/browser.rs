//! In-memory page implementing [`Driver`] and [`ScriptExecutor`].

use super::element::{MockElement, PendingWindow};
use crate::driver::{Driver, ElementRef, PageScript, ScriptExecutor, ScrollAlign, WindowHandle};
use crate::locator::Locator;
use crate::result::{DriverError, DriverResult};
use serde_json::Value;
use std::cell::RefCell;

/// One browsing context
#[derive(Debug, Clone)]
struct MockWindow {
    handle: WindowHandle,
    url: String,
    loading_polls: u32,
}

impl MockWindow {
    fn new(handle: impl Into<String>, url: impl Into<String>, loading_polls: u32) -> Self {
        Self {
            handle: WindowHandle::new(handle),
            url: url.into(),
            loading_polls,
        }
    }
}

impl From<PendingWindow> for MockWindow {
    fn from(pending: PendingWindow) -> Self {
        Self::new(pending.handle, pending.url, pending.loading_polls)
    }
}

#[derive(Debug)]
struct MockState {
    elements: Vec<MockElement>,
    windows: Vec<MockWindow>,
    current: usize,
    scroll_height: Value,
    scroll_offset: u64,
    scroll_positions: Vec<u64>,
    centered: Option<ElementRef>,
    style_writes: Vec<(String, String)>,
    failing: Vec<String>,
    call_history: Vec<String>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            windows: vec![MockWindow::new("main", "about:blank", 0)],
            current: 0,
            scroll_height: Value::from(1000_u64),
            scroll_offset: 0,
            scroll_positions: Vec::new(),
            centered: None,
            style_writes: Vec::new(),
            failing: Vec::new(),
            call_history: Vec::new(),
        }
    }
}

impl MockState {
    fn check(&self, method: &str) -> DriverResult<()> {
        if self.failing.iter().any(|m| m == method) {
            return Err(DriverError::command(format!("{method} failed")));
        }
        Ok(())
    }

    fn element_mut(&mut self, element: &ElementRef) -> DriverResult<&mut MockElement> {
        self.elements
            .iter_mut()
            .find(|e| e.id == element.id)
            .ok_or_else(|| DriverError::StaleElement {
                element: element.id.clone(),
            })
    }

    fn matching(&self, locator: &Locator) -> Vec<ElementRef> {
        self.elements
            .iter()
            .filter(|e| e.locator == *locator && e.reveal_offset <= self.scroll_offset)
            .map(|e| ElementRef::new(e.id.clone()))
            .collect()
    }

    fn window(&self) -> &MockWindow {
        &self.windows[self.current]
    }

    fn open(&mut self, pending: Option<PendingWindow>) {
        if let Some(pending) = pending {
            self.windows.push(pending.into());
        }
    }

    /// Shared path for the three click strategies
    fn click(&mut self, element: &ElementRef, kind: &str, method: &str) -> DriverResult<()> {
        self.call_history.push(format!("click:{kind}:{}", element.id));
        let target = self.element_mut(element)?;
        if target.fails(method) {
            return Err(DriverError::not_interactable(format!(
                "{method} intercepted on {}",
                element.id
            )));
        }
        let opens = target.opens.take();
        self.open(opens);
        Ok(())
    }
}

/// Scriptable in-memory browser for unit and integration tests.
///
/// Starts with one window, `main`, at `about:blank`, and a 1000px page. The
/// window offset only changes through [`PageScript::ScrollWindowTo`];
/// elements added with [`MockElement::revealed_at`] are absent from the DOM
/// until the offset reaches them.
#[derive(Debug, Default)]
pub struct MockBrowser {
    state: RefCell<MockState>,
}

impl MockBrowser {
    /// Create new mock browser
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document scroll height
    #[must_use]
    pub fn with_scroll_height(self, height: u64) -> Self {
        self.state.borrow_mut().scroll_height = Value::from(height);
        self
    }

    /// Set the current window's URL
    #[must_use]
    pub fn with_url(self, url: impl Into<String>) -> Self {
        self.state.borrow_mut().windows[0].url = url.into();
        self
    }

    /// Add an element to the page
    pub fn add_element(&self, element: MockElement) {
        self.state.borrow_mut().elements.push(element);
    }

    /// Value returned for the scroll height script
    pub fn set_scroll_height_value(&self, value: Value) {
        self.state.borrow_mut().scroll_height = value;
    }

    /// Open another window; it reports `loading` for `loading_polls` reads
    pub fn open_window(
        &self,
        handle: impl Into<String>,
        url: impl Into<String>,
        loading_polls: u32,
    ) {
        self.state
            .borrow_mut()
            .windows
            .push(MockWindow::new(handle, url, loading_polls));
    }

    /// Make a browser-level command fail (`navigate`, `current_url`,
    /// `window_handle`, `window_handles`, `switch_to_window`, `scroll_height`,
    /// `scroll_window_to`)
    pub fn fail_command(&self, method: &str) {
        self.state.borrow_mut().failing.push(method.to_string());
    }

    /// Element most recently scrolled to the viewport center
    #[must_use]
    pub fn centered(&self) -> Option<ElementRef> {
        self.state.borrow().centered.clone()
    }

    /// Every window scroll target, in order
    #[must_use]
    pub fn scroll_positions(&self) -> Vec<u64> {
        self.state.borrow().scroll_positions.clone()
    }

    /// Current window offset
    #[must_use]
    pub fn scroll_offset(&self) -> u64 {
        self.state.borrow().scroll_offset
    }

    /// Handle of the current window
    #[must_use]
    pub fn current_window(&self) -> WindowHandle {
        self.state.borrow().window().handle.clone()
    }

    /// Successful inline style writes on element `id`, in order
    #[must_use]
    pub fn style_writes(&self, id: &str) -> Vec<String> {
        self.state
            .borrow()
            .style_writes
            .iter()
            .filter(|(el, _)| el == id)
            .map(|(_, style)| style.clone())
            .collect()
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state.borrow().call_history.clone()
    }

    /// Click attempts (`click:<strategy>:<id>`), in order
    #[must_use]
    pub fn clicks(&self) -> Vec<String> {
        self.history()
            .into_iter()
            .filter(|c| c.starts_with("click:"))
            .collect()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state
            .borrow()
            .call_history
            .iter()
            .any(|c| c.starts_with(method))
    }
}

impl Driver for MockBrowser {
    fn find_element(&self, locator: &Locator) -> DriverResult<ElementRef> {
        let mut state = self.state.borrow_mut();
        state.call_history.push(format!("find:{locator}"));
        state
            .matching(locator)
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::NoSuchElement {
                locator: locator.to_string(),
            })
    }

    fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>> {
        let mut state = self.state.borrow_mut();
        state.call_history.push(format!("find_all:{locator}"));
        Ok(state.matching(locator))
    }

    fn current_url(&self) -> DriverResult<String> {
        let state = self.state.borrow();
        state.check("current_url")?;
        Ok(state.window().url.clone())
    }

    fn window_handle(&self) -> DriverResult<WindowHandle> {
        let state = self.state.borrow();
        state.check("window_handle")?;
        Ok(state.window().handle.clone())
    }

    fn window_handles(&self) -> DriverResult<Vec<WindowHandle>> {
        let state = self.state.borrow();
        state.check("window_handles")?;
        Ok(state.windows.iter().map(|w| w.handle.clone()).collect())
    }

    fn switch_to_window(&self, handle: &WindowHandle) -> DriverResult<()> {
        let mut state = self.state.borrow_mut();
        state.call_history.push(format!("switch:{handle}"));
        state.check("switch_to_window")?;
        let index = state
            .windows
            .iter()
            .position(|w| w.handle == *handle)
            .ok_or_else(|| DriverError::command(format!("no such window: {handle}")))?;
        state.current = index;
        Ok(())
    }

    fn navigate(&self, url: &str) -> DriverResult<()> {
        let mut state = self.state.borrow_mut();
        state.call_history.push(format!("navigate:{url}"));
        state.check("navigate")?;
        let current = state.current;
        state.windows[current].url = url.to_string();
        state.scroll_offset = 0;
        Ok(())
    }

    fn click(&self, element: &ElementRef) -> DriverResult<()> {
        self.state.borrow_mut().click(element, "native", "click")
    }

    fn move_pointer_to(&self, element: &ElementRef) -> DriverResult<()> {
        let mut state = self.state.borrow_mut();
        state.call_history.push(format!("hover:{}", element.id));
        if state.element_mut(element)?.fails("move_pointer_to") {
            return Err(DriverError::not_interactable(format!(
                "move_pointer_to failed on {}",
                element.id
            )));
        }
        Ok(())
    }

    fn pointer_click(&self, element: &ElementRef) -> DriverResult<()> {
        self.state.borrow_mut().click(element, "pointer", "pointer_click")
    }

    fn is_displayed(&self, element: &ElementRef) -> DriverResult<bool> {
        Ok(self.state.borrow_mut().element_mut(element)?.check_displayed())
    }

    fn is_enabled(&self, element: &ElementRef) -> DriverResult<bool> {
        Ok(self.state.borrow_mut().element_mut(element)?.check_enabled())
    }

    fn attribute(&self, element: &ElementRef, name: &str) -> DriverResult<Option<String>> {
        let mut state = self.state.borrow_mut();
        let target = state.element_mut(element)?;
        Ok(match name {
            "class" => target.class.clone(),
            "style" => target.style.clone(),
            "id" => Some(target.id.clone()),
            _ => None,
        })
    }

    fn css_value(&self, element: &ElementRef, name: &str) -> DriverResult<String> {
        let mut state = self.state.borrow_mut();
        let target = state.element_mut(element)?;
        Ok(match name {
            "transform" => target.next_transform(),
            "opacity" => "1".to_string(),
            _ => String::new(),
        })
    }

    fn text(&self, element: &ElementRef) -> DriverResult<String> {
        let mut state = self.state.borrow_mut();
        let target = state.element_mut(element)?;
        if target.fails("text") {
            return Err(DriverError::command(format!("text failed on {}", element.id)));
        }
        Ok(target.text.clone())
    }
}

impl ScriptExecutor for MockBrowser {
    fn execute_script(&self, script: &PageScript) -> DriverResult<Value> {
        let mut state = self.state.borrow_mut();
        match script {
            PageScript::ScrollHeight => {
                state.call_history.push("script:scroll_height".to_string());
                state.check("scroll_height")?;
                Ok(state.scroll_height.clone())
            }
            PageScript::ScrollWindowTo { top } => {
                state.call_history.push(format!("script:scroll_window_to:{top}"));
                state.check("scroll_window_to")?;
                state.scroll_positions.push(*top);
                state.scroll_offset = *top;
                Ok(Value::Null)
            }
            PageScript::ScrollIntoView { element, align } => {
                state.call_history.push(format!("script:scroll_into_view:{}", element.id));
                if state.element_mut(element)?.fails("scroll_into_view") {
                    return Err(DriverError::script(format!(
                        "scroll_into_view failed on {}",
                        element.id
                    )));
                }
                if *align == ScrollAlign::Center {
                    state.centered = Some(element.clone());
                }
                Ok(Value::Null)
            }
            PageScript::SetStyle { element, style } => {
                state.call_history.push(format!("script:set_style:{}", element.id));
                let target = state.element_mut(element)?;
                match target.style_writes_left {
                    Some(0) => {
                        return Err(DriverError::script(format!(
                            "set_style failed on {}",
                            element.id
                        )));
                    }
                    Some(left) => target.style_writes_left = Some(left - 1),
                    None => {}
                }
                target.style = Some(style.clone());
                state.style_writes.push((element.id.clone(), style.clone()));
                Ok(Value::Null)
            }
            PageScript::Click { element } => {
                state.click(element, "script", "script_click")?;
                Ok(Value::Null)
            }
            PageScript::ReadyState => {
                state.call_history.push("script:ready_state".to_string());
                let current = state.current;
                let window = &mut state.windows[current];
                if window.loading_polls > 0 {
                    window.loading_polls -= 1;
                    Ok(Value::from("loading"))
                } else {
                    Ok(Value::from("complete"))
                }
            }
        }
    }
}
