use crate::browser::PageDriver;
use crate::core::{BrowserTrait, ResolverConfig};
use crate::errors::{BookingError, Result};
use std::time::Duration;
use tracing::{debug, warn};

/// What to do with a resolved element.
#[derive(Debug, Clone)]
pub enum ActionKind {
    Click,
    Fill(String),
    /// Check a checkbox/radio, clicking only when not already checked.
    Check,
}

impl ActionKind {
    fn name(&self) -> &'static str {
        match self {
            ActionKind::Click => "click",
            ActionKind::Fill(_) => "fill",
            ActionKind::Check => "check",
        }
    }
}

/// How to decide whether an action actually took effect.
#[derive(Debug, Clone)]
pub enum Verification {
    /// The tab URL must differ from the one captured before the action.
    UrlChanged,
    /// One of these indicators must be present (CSS selector or body text).
    Indicator(Vec<String>),
    /// Either of the above; this is the usual "did navigation or an inline
    /// page swap happen" check.
    UrlChangedOrIndicator(Vec<String>),
    /// Fire and forget; the action reports Confirmed if the DOM call
    /// succeeded.
    None,
}

/// Whether an action's effect was observed.
///
/// Unconfirmed is not an error. The executor never guesses retries on its
/// own; the caller proceeds and lets the next stage's entry check be the
/// authoritative gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Confirmed,
    Unconfirmed { reason: String },
}

impl ActionOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, ActionOutcome::Confirmed)
    }
}

/// Performs one action on a tagged element and verifies its effect.
pub struct ActionExecutor<'a, B: BrowserTrait> {
    driver: &'a PageDriver<'a, B>,
    config: &'a ResolverConfig,
}

impl<'a, B: BrowserTrait> ActionExecutor<'a, B> {
    pub fn new(driver: &'a PageDriver<'a, B>, config: &'a ResolverConfig) -> Self {
        Self { driver, config }
    }

    pub async fn perform(
        &self,
        token: &str,
        action: ActionKind,
        verification: Verification,
    ) -> Result<ActionOutcome> {
        let url_before = self.driver.current_url().await.unwrap_or_default();

        self.driver.scroll_tagged_into_view(token).await;

        let applied = match &action {
            ActionKind::Click => self.driver.click_tagged(token).await?,
            ActionKind::Fill(value) => self.driver.fill_tagged(token, value).await?,
            ActionKind::Check => self.driver.check_tagged(token).await?,
        };
        if !applied {
            // The tag vanished between resolution and action, usually a page
            // re-render. Abort rather than act on the wrong element.
            return Err(BookingError::JavaScriptFailed(format!(
                "{} target disappeared before the action ran",
                action.name()
            )));
        }

        tokio::time::sleep(Duration::from_millis(self.config.settle_ms)).await;

        let outcome = self.verify(&url_before, &verification).await?;
        match &outcome {
            ActionOutcome::Confirmed => {
                debug!(action = action.name(), "action confirmed");
            }
            ActionOutcome::Unconfirmed { reason } => {
                warn!(action = action.name(), reason = %reason, "action unconfirmed, proceeding");
            }
        }
        Ok(outcome)
    }

    async fn verify(
        &self,
        url_before: &str,
        verification: &Verification,
    ) -> Result<ActionOutcome> {
        let budget = Duration::from_millis(self.config.element_timeout_ms);
        let interval = Duration::from_millis(self.config.poll_interval_ms);

        let outcome = match verification {
            Verification::None => return Ok(ActionOutcome::Confirmed),
            Verification::UrlChanged => {
                crate::utils::poll_until(budget, interval, || async {
                    match self.driver.current_url().await {
                        Ok(url) => url != url_before,
                        Err(_) => false,
                    }
                })
                .await
            }
            Verification::Indicator(indicators) => {
                crate::utils::poll_until(budget, interval, || async {
                    self.driver
                        .any_indicator_present(indicators)
                        .await
                        .unwrap_or(false)
                })
                .await
            }
            Verification::UrlChangedOrIndicator(indicators) => {
                crate::utils::poll_until(budget, interval, || async {
                    let url_moved = match self.driver.current_url().await {
                        Ok(url) => url != url_before,
                        Err(_) => false,
                    };
                    if url_moved {
                        return true;
                    }
                    self.driver
                        .any_indicator_present(indicators)
                        .await
                        .unwrap_or(false)
                })
                .await
            }
        };

        if outcome.is_satisfied() {
            Ok(ActionOutcome::Confirmed)
        } else {
            Ok(ActionOutcome::Unconfirmed {
                reason: "no URL change or expected marker observed".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ResolverConfig;
    use crate::testing::FakeBrowser;
    use serde_json::json;

    fn fast_config() -> ResolverConfig {
        ResolverConfig {
            element_timeout_ms: 50,
            settle_ms: 5,
            poll_interval_ms: 5,
            ..ResolverConfig::default()
        }
    }

    #[tokio::test]
    async fn unverified_click_is_confirmed_when_it_lands() {
        let fake = FakeBrowser::new();
        fake.respond("el.click();", json!({"success": true}));
        let tab = ();
        let driver = PageDriver::new(&fake, &tab);
        let config = fast_config();
        let executor = ActionExecutor::new(&driver, &config);

        let outcome = executor
            .perform("tok", ActionKind::Click, Verification::None)
            .await
            .unwrap();
        assert_eq!(outcome, ActionOutcome::Confirmed);
    }

    #[tokio::test]
    async fn vanished_target_is_an_error_not_an_outcome() {
        let fake = FakeBrowser::new();
        let tab = ();
        let driver = PageDriver::new(&fake, &tab);
        let config = fast_config();
        let executor = ActionExecutor::new(&driver, &config);

        let err = executor
            .perform("tok", ActionKind::Click, Verification::None)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::JavaScriptFailed(_)));
    }

    #[tokio::test]
    async fn static_url_leaves_the_click_unconfirmed() {
        let fake = FakeBrowser::new();
        fake.set_url("https://book.example/results");
        fake.respond("el.click();", json!({"success": true}));
        let tab = ();
        let driver = PageDriver::new(&fake, &tab);
        let config = fast_config();
        let executor = ActionExecutor::new(&driver, &config);

        let outcome = executor
            .perform("tok", ActionKind::Click, Verification::UrlChanged)
            .await
            .unwrap();
        assert!(!outcome.is_confirmed());
    }

    #[tokio::test]
    async fn fill_reports_confirmed_on_dispatched_events() {
        let fake = FakeBrowser::new();
        fake.respond("dispatchEvent", json!({"success": true}));
        let tab = ();
        let driver = PageDriver::new(&fake, &tab);
        let config = fast_config();
        let executor = ActionExecutor::new(&driver, &config);

        let outcome = executor
            .perform(
                "tok",
                ActionKind::Fill("ada@example.com".to_string()),
                Verification::None,
            )
            .await
            .unwrap();
        assert_eq!(outcome, ActionOutcome::Confirmed);
    }
}
