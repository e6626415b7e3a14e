//! New-tab detection and switching.

use crate::clock::Clock;
use crate::driver::{Browser, PageScript, WindowHandle};
use crate::result::{SteadyError, SteadyResult};
use crate::wait::{poll_until, WaitOptions};
use std::time::Duration;

/// Fixed grace period for a new tab to register
pub const NEW_TAB_GRACE: Duration = Duration::from_secs(2);

/// Ready state that ends the load wait
pub const READY_COMPLETE: &str = "complete";

/// First handle that is not `original`
fn first_other(handles: Vec<WindowHandle>, original: &WindowHandle) -> Option<WindowHandle> {
    handles.into_iter().find(|h| h != original)
}

fn is_complete<B: Browser + ?Sized>(browser: &B) -> bool {
    browser
        .execute_script(&PageScript::ReadyState)
        .map(|state| state.as_str() == Some(READY_COMPLETE))
        .unwrap_or(false)
}

/// Switch to a newly opened tab and wait for it to finish loading.
///
/// Returns `Ok(false)` when no other tab exists, when a driver call fails, or
/// when the ready-state wait times out. Only an interruption is an error.
pub fn switch_to_new_tab<B, C>(browser: &B, clock: &C, options: &WaitOptions) -> SteadyResult<bool>
where
    B: Browser + ?Sized,
    C: Clock + ?Sized,
{
    let attempt = || -> SteadyResult<bool> {
        let original = browser.window_handle()?;
        clock.sleep(NEW_TAB_GRACE)?;

        let Some(target) = first_other(browser.window_handles()?, &original) else {
            tracing::warn!(original = %original, "no new tab found to switch to");
            return Ok(false);
        };

        browser.switch_to_window(&target)?;
        let loaded = poll_until(clock, options, || is_complete(browser).then_some(()))?;
        if loaded.into_value().is_none() {
            tracing::warn!(
                handle = %target,
                timeout_ms = options.timeout_ms,
                "new tab did not finish loading"
            );
            return Ok(false);
        }

        let url = browser.current_url().unwrap_or_default();
        tracing::info!(handle = %target, url = %url, "switched to new tab");
        Ok(true)
    };

    match attempt() {
        Err(SteadyError::Interrupted) => Err(SteadyError::Interrupted),
        Err(err) => {
            tracing::warn!(error = %err, "failed to switch to new tab");
            Ok(false)
        }
        ok => ok,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::VirtualClock;
    use crate::mock::MockBrowser;

    fn options() -> WaitOptions {
        WaitOptions::new().with_timeout(2_000).with_poll_interval(250)
    }

    #[test]
    fn test_no_extra_tab_returns_false() {
        let browser = MockBrowser::new();
        let clock = VirtualClock::new();

        assert!(!switch_to_new_tab(&browser, &clock, &options()).unwrap());
        assert_eq!(clock.sleeps(), vec![NEW_TAB_GRACE]);
        assert_eq!(browser.current_window(), WindowHandle::new("main"));
    }

    #[test]
    fn test_switches_once_ready() {
        let browser = MockBrowser::new();
        browser.open_window("tab-2", "https://useinsider.com/careers", 3);
        let clock = VirtualClock::new();

        assert!(switch_to_new_tab(&browser, &clock, &options()).unwrap());

        assert_eq!(browser.current_window(), WindowHandle::new("tab-2"));
        // 2s grace, then three "loading" polls before "complete"
        assert_eq!(clock.now_ms(), 2_000 + 3 * 250);
        assert!(browser.was_called("switch:tab-2"));
    }

    #[test]
    fn test_ready_timeout_returns_false() {
        let browser = MockBrowser::new();
        browser.open_window("tab-2", "https://slow.example", 100);
        let clock = VirtualClock::new();

        assert!(!switch_to_new_tab(&browser, &clock, &options()).unwrap());
        assert_eq!(clock.now_ms(), 2_000 + 2_000);
    }

    #[test]
    fn test_driver_failure_returns_false() {
        let browser = MockBrowser::new();
        browser.open_window("tab-2", "https://example.com", 0);
        browser.fail_command("switch_to_window");
        let clock = VirtualClock::new();

        assert!(!switch_to_new_tab(&browser, &clock, &options()).unwrap());
    }

    #[test]
    fn test_interrupt_is_fatal() {
        let browser = MockBrowser::new();
        let clock = VirtualClock::new();
        clock.interrupt_at(1_000);

        let err = switch_to_new_tab(&browser, &clock, &options()).unwrap_err();
        assert!(err.is_interrupted());
    }

    #[test]
    fn test_first_other_skips_original() {
        let handles = vec![WindowHandle::new("a"), WindowHandle::new("b"), WindowHandle::new("c")];
        assert_eq!(first_other(handles, &WindowHandle::new("a")), Some(WindowHandle::new("b")));
        assert_eq!(first_other(vec![WindowHandle::new("a")], &WindowHandle::new("a")), None);
    }
}
