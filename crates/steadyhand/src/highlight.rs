//! Debug highlighting of elements before interaction.

use crate::clock::Clock;
use crate::driver::{Browser, ElementRef, PageScript};
use crate::result::SteadyResult;
use std::time::Duration;

/// Inline style applied while highlighting
pub const HIGHLIGHT_STYLE: &str = "border: 2px solid red; background: yellow";

/// How long the highlight stays on
pub const HIGHLIGHT_DURATION: Duration = Duration::from_secs(1);

/// Result of a highlight call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Highlight {
    /// Highlighting is disabled for the session
    Skipped,
    /// Style applied and original restored
    Restored,
    /// Style applied but the restore failed
    RestoreFailed {
        /// Driver error message
        reason: String,
    },
}

/// Mark `element` with [`HIGHLIGHT_STYLE`] for [`HIGHLIGHT_DURATION`], then
/// put its original inline style back.
///
/// Does nothing when `enabled` is false. Reading the original style and
/// applying the highlight propagate errors; a failed restore is logged and
/// reported as [`Highlight::RestoreFailed`]. Once applied, the restore is
/// always attempted, even when the wait is interrupted.
pub fn highlight<B, C>(
    browser: &B,
    clock: &C,
    element: &ElementRef,
    enabled: bool,
) -> SteadyResult<Highlight>
where
    B: Browser + ?Sized,
    C: Clock + ?Sized,
{
    if !enabled {
        return Ok(Highlight::Skipped);
    }

    let original = browser.attribute(element, "style")?.unwrap_or_default();
    browser.execute_script(&PageScript::SetStyle {
        element: element.clone(),
        style: HIGHLIGHT_STYLE.to_string(),
    })?;
    let waited = clock.sleep(HIGHLIGHT_DURATION);

    let restore = browser.execute_script(&PageScript::SetStyle {
        element: element.clone(),
        style: original,
    });
    if let Err(err) = waited {
        if let Err(restore_err) = &restore {
            tracing::warn!(
                element = %element,
                error = %restore_err,
                "failed to restore element style"
            );
        }
        return Err(err);
    }
    match restore {
        Ok(_) => Ok(Highlight::Restored),
        Err(err) => {
            tracing::warn!(element = %element, error = %err, "failed to restore element style");
            Ok(Highlight::RestoreFailed {
                reason: err.to_string(),
            })
        }
    }
}
