//! Chromium binding over the Chrome `DevTools` Protocol.
//!
//! [`ChromiumDriver`] implements [`Driver`] and [`ScriptExecutor`] with
//! chromiumoxide. The engine is blocking, so the driver owns a private tokio
//! runtime and runs each CDP call to completion on it.
//!
//! Elements are addressed by a tag attribute written onto the DOM node the
//! first time a lookup returns it; an [`ElementRef`] is the tag value. Pages
//! (CDP targets) are the window handles.

use crate::driver::{Driver, ElementRef, PageScript, ScriptArg, ScriptExecutor, WindowHandle};
use crate::locator::{css_string, js_string, Locator};
use crate::result::{DriverError, DriverResult, SteadyError, SteadyResult};
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde_json::Value;
use std::future::Future;
use std::sync::Mutex;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

/// Attribute holding the element tag
const TAG_ATTR: &str = "data-steadyhand-id";

/// Marker returned by a script whose element argument no longer resolves
const STALE_MARKER: &str = "__steadyhand_stale";

/// Browser launch configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Window width
    pub viewport_width: u32,
    /// Window height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// User agent string
    pub user_agent: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 900,
            chromium_path: None,
            user_agent: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set window dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Set user agent
    #[must_use]
    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    fn to_cdp(&self) -> SteadyResult<CdpConfig> {
        let mut builder =
            CdpConfig::builder().window_size(self.viewport_width, self.viewport_height);
        if !self.headless {
            builder = builder.with_head();
        }
        if !self.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = self.chromium_path {
            builder = builder.chrome_executable(path);
        }
        if let Some(ref ua) = self.user_agent {
            builder = builder.arg(format!("--user-agent={ua}"));
        }
        builder.build().map_err(|e| DriverError::command(e).into())
    }
}

fn cdp_error(err: impl std::fmt::Display) -> DriverError {
    DriverError::command(err.to_string())
}

fn tag_selector(element: &ElementRef) -> String {
    format!("[{TAG_ATTR}={}]", css_string(&element.id))
}

fn element_expr(element: &ElementRef) -> String {
    format!("document.querySelector({})", js_string(&tag_selector(element)))
}

/// Wrap a [`PageScript`] as a self-invoking expression with its arguments bound
fn wrap_script(script: &PageScript) -> String {
    let args = script.arguments();
    let mut rendered = Vec::with_capacity(args.len());
    let mut element_slots = Vec::new();
    for (index, arg) in args.iter().enumerate() {
        match arg {
            ScriptArg::Element(element) => {
                element_slots.push(index.to_string());
                rendered.push(element_expr(element));
            }
            ScriptArg::Value(value) => rendered.push(value.to_string()),
        }
    }
    format!(
        "(() => {{ const args = [{}]; \
         if ([{}].some(i => args[i] === null)) {{ return {{ {STALE_MARKER}: true }}; }} \
         return (function() {{ {} }}).apply(null, args); }})()",
        rendered.join(", "),
        element_slots.join(", "),
        script.source()
    )
}

/// Expression that tags every match of `locator` and returns the tags
fn tag_matches(locator: &Locator) -> String {
    format!(
        "(() => {{ const nodes = {}; \
         return nodes.map(n => {{ \
           if (!n.getAttribute({TAG_ATTR:?})) {{ \
             window.__steadyhandSeq = (window.__steadyhandSeq || 0) + 1; \
             n.setAttribute({TAG_ATTR:?}, 'sh-' + window.__steadyhandSeq); \
           }} \
           return n.getAttribute({TAG_ATTR:?}); \
         }}); }})()",
        locator.to_query_all()
    )
}

/// A real Chromium instance driven over CDP
#[derive(Debug)]
pub struct ChromiumDriver {
    runtime: Runtime,
    browser: CdpBrowser,
    handler: JoinHandle<()>,
    current: Mutex<Page>,
}

impl ChromiumDriver {
    /// Launch a new browser and open a blank page
    pub fn launch(config: &BrowserConfig) -> SteadyResult<Self> {
        let cdp_config = config.to_cdp()?;
        let runtime = Runtime::new()?;
        let (browser, mut handler) = runtime
            .block_on(CdpBrowser::launch(cdp_config))
            .map_err(cdp_error)?;
        let handler = runtime.spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });
        tracing::info!(headless = config.headless, "launched chromium");
        Self::with_first_page(runtime, browser, handler)
    }

    /// Connect to a running browser through its `DevTools` websocket URL
    pub fn connect(ws_url: &str) -> SteadyResult<Self> {
        let runtime = Runtime::new()?;
        let (browser, mut handler) = runtime
            .block_on(CdpBrowser::connect(ws_url))
            .map_err(cdp_error)?;
        let handler = runtime.spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });
        tracing::info!(ws_url, "connected to chromium");
        Self::with_first_page(runtime, browser, handler)
    }

    fn with_first_page(
        runtime: Runtime,
        browser: CdpBrowser,
        handler: JoinHandle<()>,
    ) -> SteadyResult<Self> {
        let existing = runtime.block_on(browser.pages()).map_err(cdp_error)?;
        let page = match existing.into_iter().next() {
            Some(page) => page,
            None => runtime
                .block_on(browser.new_page("about:blank"))
                .map_err(cdp_error)?,
        };
        Ok(Self {
            runtime,
            browser,
            handler,
            current: Mutex::new(page),
        })
    }

    /// Close the browser and stop the CDP handler
    pub fn close(mut self) -> SteadyResult<()> {
        let closed = self.runtime.block_on(self.browser.close());
        self.handler.abort();
        closed.map_err(|e| SteadyError::Driver(cdp_error(e)))?;
        Ok(())
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    fn page(&self) -> DriverResult<Page> {
        self.current
            .lock()
            .map(|page| page.clone())
            .map_err(|_| DriverError::command("current page lock poisoned"))
    }

    fn evaluate(&self, expression: String) -> DriverResult<Value> {
        let page = self.page()?;
        let result = self
            .block_on(page.evaluate(expression))
            .map_err(|e| DriverError::script(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    /// Evaluate `body` with `el` bound to the tagged element
    fn on_element(&self, element: &ElementRef, body: &str) -> DriverResult<Value> {
        let value = self.evaluate(format!(
            "(() => {{ const el = {}; \
             if (el === null) {{ return {{ {STALE_MARKER}: true }}; }} {body} }})()",
            element_expr(element)
        ))?;
        if value.get(STALE_MARKER).is_some() {
            return Err(DriverError::StaleElement {
                element: element.id.clone(),
            });
        }
        Ok(value)
    }

    fn element(&self, element: &ElementRef) -> DriverResult<(Page, Element)> {
        let page = self.page()?;
        let found = self
            .block_on(page.find_element(tag_selector(element)))
            .map_err(|_| DriverError::StaleElement {
                element: element.id.clone(),
            })?;
        Ok((page, found))
    }
}

impl Drop for ChromiumDriver {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

impl Driver for ChromiumDriver {
    fn find_element(&self, locator: &Locator) -> DriverResult<ElementRef> {
        self.find_elements(locator)?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::NoSuchElement {
                locator: locator.to_string(),
            })
    }

    fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>> {
        let value = self.evaluate(tag_matches(locator))?;
        let tags: Vec<String> =
            serde_json::from_value(value).map_err(|e| DriverError::script(e.to_string()))?;
        Ok(tags.into_iter().map(ElementRef::new).collect())
    }

    fn current_url(&self) -> DriverResult<String> {
        let page = self.page()?;
        let url = self.block_on(page.url()).map_err(cdp_error)?;
        Ok(url.unwrap_or_default())
    }

    fn window_handle(&self) -> DriverResult<WindowHandle> {
        let page = self.page()?;
        Ok(WindowHandle::new(page.target_id().inner().clone()))
    }

    fn window_handles(&self) -> DriverResult<Vec<WindowHandle>> {
        let pages = self.block_on(self.browser.pages()).map_err(cdp_error)?;
        Ok(pages
            .iter()
            .map(|page| WindowHandle::new(page.target_id().inner().clone()))
            .collect())
    }

    fn switch_to_window(&self, handle: &WindowHandle) -> DriverResult<()> {
        let pages = self.block_on(self.browser.pages()).map_err(cdp_error)?;
        let page = pages
            .into_iter()
            .find(|page| page.target_id().inner() == handle.as_str())
            .ok_or_else(|| DriverError::command(format!("no such window: {handle}")))?;
        self.block_on(page.bring_to_front()).map_err(cdp_error)?;
        let mut current = self
            .current
            .lock()
            .map_err(|_| DriverError::command("current page lock poisoned"))?;
        *current = page;
        Ok(())
    }

    fn navigate(&self, url: &str) -> DriverResult<()> {
        let page = self.page()?;
        self.block_on(page.goto(url)).map_err(cdp_error)?;
        Ok(())
    }

    fn click(&self, element: &ElementRef) -> DriverResult<()> {
        let (_, found) = self.element(element)?;
        self.block_on(found.click())
            .map_err(|e| DriverError::not_interactable(e.to_string()))?;
        Ok(())
    }

    fn move_pointer_to(&self, element: &ElementRef) -> DriverResult<()> {
        let (_, found) = self.element(element)?;
        self.block_on(found.hover())
            .map_err(|e| DriverError::not_interactable(e.to_string()))?;
        Ok(())
    }

    fn pointer_click(&self, element: &ElementRef) -> DriverResult<()> {
        let (page, found) = self.element(element)?;
        self.block_on(async {
            let point = found.clickable_point().await?;
            page.move_mouse(point).await?;
            page.click(point).await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        })
        .map_err(|e| DriverError::not_interactable(e.to_string()))
    }

    fn is_displayed(&self, element: &ElementRef) -> DriverResult<bool> {
        let value = self.on_element(
            element,
            "const s = getComputedStyle(el); \
             return s.visibility !== 'hidden' && s.display !== 'none' \
               && el.getClientRects().length > 0;",
        )?;
        Ok(value.as_bool().unwrap_or(false))
    }

    fn is_enabled(&self, element: &ElementRef) -> DriverResult<bool> {
        let value = self.on_element(element, "return !el.disabled;")?;
        Ok(value.as_bool().unwrap_or(true))
    }

    fn attribute(&self, element: &ElementRef, name: &str) -> DriverResult<Option<String>> {
        let value =
            self.on_element(element, &format!("return el.getAttribute({});", js_string(name)))?;
        Ok(value.as_str().map(str::to_string))
    }

    fn css_value(&self, element: &ElementRef, name: &str) -> DriverResult<String> {
        let value = self.on_element(
            element,
            &format!("return getComputedStyle(el).getPropertyValue({});", js_string(name)),
        )?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    fn text(&self, element: &ElementRef) -> DriverResult<String> {
        let value = self.on_element(element, "return el.innerText;")?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }
}

impl ScriptExecutor for ChromiumDriver {
    fn execute_script(&self, script: &PageScript) -> DriverResult<Value> {
        tracing::debug!(script = script.name(), "executing page script");
        let value = self.evaluate(wrap_script(script))?;
        if value.get(STALE_MARKER).is_some() {
            let element = script
                .arguments()
                .into_iter()
                .find_map(|arg| match arg {
                    ScriptArg::Element(el) => Some(el.id),
                    ScriptArg::Value(_) => None,
                })
                .unwrap_or_default();
            return Err(DriverError::StaleElement { element });
        }
        Ok(value)
    }
}
