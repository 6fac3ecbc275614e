use crate::browser::PageDriver;
use crate::core::BrowserTrait;
use crate::errors::Result;
use crate::utils::{poll_until, PollOutcome};
use std::time::Duration;
use tracing::debug;

/// Wait until `document.readyState` reaches `interactive` or `complete`.
///
/// Timing out is not fatal: pages that never fire a clean load event are
/// still usually scriptable, so the caller gets the outcome and moves on.
pub async fn wait_for_dom_ready<B: BrowserTrait>(
    driver: &PageDriver<'_, B>,
    timeout: Duration,
    interval: Duration,
) -> Result<PollOutcome> {
    let outcome = poll_until(timeout, interval, || async {
        match driver.eval("document.readyState").await {
            Ok(v) => matches!(v.as_str(), Some("interactive") | Some("complete")),
            Err(_) => false,
        }
    })
    .await;

    if !outcome.is_satisfied() {
        debug!("DOM did not reach ready state within {:?}", timeout);
    }
    Ok(outcome)
}
