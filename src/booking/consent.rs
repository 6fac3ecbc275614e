use crate::booking::profile::SiteProfile;
use crate::browser::PageDriver;
use crate::core::{BrowserTrait, ResolverConfig};
use crate::errors::Result;
use crate::resolver::Scope;
use std::time::{Duration, Instant};
use tracing::debug;

/// Dismiss the cookie banner if one is up. Best effort; a missing banner is
/// the common case.
pub async fn accept_cookies<B: BrowserTrait>(
    driver: &PageDriver<'_, B>,
    profile: &SiteProfile,
) -> Result<bool> {
    let scope = Scope::page();
    for selector in &profile.cookie_consent_selectors {
        let token = format!("consent-{}", uuid::Uuid::new_v4().simple());
        if driver.tag_match(&scope, selector, &token).await? {
            let clicked = driver.click_tagged(&token).await?;
            if clicked {
                debug!(selector, "cookie banner dismissed");
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// Close popups/modals within a fixed wall-clock budget.
///
/// Keeps clicking close buttons until none remain or the budget runs out;
/// some sites stack a newsletter modal on top of an offer modal.
pub async fn close_overlays<B: BrowserTrait>(
    driver: &PageDriver<'_, B>,
    profile: &SiteProfile,
    budget: Duration,
) -> Result<u32> {
    let start = Instant::now();
    let scope = Scope::page();
    let mut closed = 0u32;
    while start.elapsed() < budget {
        let mut any = false;
        for selector in &profile.overlay_close_selectors {
            if start.elapsed() >= budget {
                break;
            }
            let token = format!("overlay-{}", uuid::Uuid::new_v4().simple());
            if driver.tag_match(&scope, selector, &token).await?
                && driver.click_tagged(&token).await?
            {
                closed += 1;
                any = true;
            }
        }
        if !any {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    if closed > 0 {
        debug!(closed, "overlays dismissed");
    }
    Ok(closed)
}

/// How the wait for the results page ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityWait {
    /// Room cards rendered (or an explicit no-availability notice did).
    Ready,
    /// Budget exhausted without a stable signal. Extraction still runs;
    /// slow sites often have usable cards that never settle cleanly.
    TimeoutButProceed,
}

/// Wait for the availability results to finish rendering.
///
/// Result grids flicker while rates stream in, so one positive probe is not
/// trusted: two consecutive probes must agree before the page counts as
/// ready.
pub async fn wait_for_results<B: BrowserTrait>(
    driver: &PageDriver<'_, B>,
    profile: &SiteProfile,
    config: &ResolverConfig,
) -> Result<AvailabilityWait> {
    let budget = Duration::from_millis(config.results_wait_ms);
    let interval = Duration::from_millis(config.poll_interval_ms);
    let start = Instant::now();
    let mut consecutive = 0u32;

    loop {
        let positive = probe_results(driver, profile).await;
        consecutive = if positive { consecutive + 1 } else { 0 };
        if consecutive >= 2 {
            return Ok(AvailabilityWait::Ready);
        }
        if start.elapsed() >= budget {
            debug!("results wait exhausted, proceeding to extraction anyway");
            return Ok(AvailabilityWait::TimeoutButProceed);
        }
        tokio::time::sleep(interval).await;
    }
}

async fn probe_results<B: BrowserTrait>(
    driver: &PageDriver<'_, B>,
    profile: &SiteProfile,
) -> bool {
    if let Ok(count) = driver.count(&profile.room_card_selector).await {
        if count > 0 {
            return true;
        }
    }
    driver
        .any_indicator_present(&profile.no_availability_texts)
        .await
        .unwrap_or(false)
}
