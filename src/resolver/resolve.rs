use crate::browser::PageDriver;
use crate::core::oracle::SelectorOracle;
use crate::core::{BrowserTrait, ResolverConfig};
use crate::errors::{BookingError, Result};
use crate::resolver::fuzzy::{self, FuzzyTarget};
use crate::resolver::scope::Scope;
use crate::resolver::strategy::Strategy;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Confidence attached to an oracle-suggested selector; below every
/// deterministic strategy.
const ORACLE_CONFIDENCE: f64 = 0.3;

/// Outcome of a successful resolution. The winning element has been tagged
/// in-page; actions address it through `token`.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub token: String,
    pub strategy: &'static str,
    pub confidence: f64,
}

/// Runs a strategy cascade against one tab.
///
/// Each strategy gets `element_timeout_ms` to produce a usable element; a
/// miss or timeout is soft and the cascade continues. Only when every
/// strategy has missed does the caller decide whether that is fatal.
pub struct ElementResolver<'a, B: BrowserTrait> {
    driver: &'a PageDriver<'a, B>,
    config: &'a ResolverConfig,
    oracle: Option<&'a dyn SelectorOracle>,
}

impl<'a, B: BrowserTrait> ElementResolver<'a, B> {
    pub fn new(driver: &'a PageDriver<'a, B>, config: &'a ResolverConfig) -> Self {
        Self {
            driver,
            config,
            oracle: None,
        }
    }

    /// Consult `oracle` after every listed strategy has missed.
    pub fn with_oracle(mut self, oracle: &'a dyn SelectorOracle) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Try each strategy in order; `Ok(None)` means all of them soft-missed.
    pub async fn resolve(
        &self,
        scope: &Scope,
        intent: &str,
        strategies: &[Strategy],
    ) -> Result<Option<Resolution>> {
        let budget = Duration::from_millis(self.config.element_timeout_ms);
        for strategy in strategies {
            let token = Uuid::new_v4().simple().to_string();
            let attempt = self.attempt(scope, strategy, &token);
            let hit = match tokio::time::timeout(budget, attempt).await {
                Ok(Ok(hit)) => hit,
                // A dead page or browser fails the whole resolution; only
                // in-page oddities count as a miss.
                Ok(Err(e)) if is_scope_loss(&e) => return Err(e),
                Ok(Err(e)) => {
                    debug!(intent, strategy = strategy.name(), error = %e, "strategy errored, treating as miss");
                    false
                }
                Err(_) => {
                    debug!(intent, strategy = strategy.name(), "strategy timed out");
                    false
                }
            };
            if hit {
                info!(
                    intent,
                    strategy = strategy.name(),
                    confidence = strategy.confidence(),
                    "element resolved"
                );
                return Ok(Some(Resolution {
                    token,
                    strategy: strategy.name(),
                    confidence: strategy.confidence(),
                }));
            }
            debug!(intent, strategy = %strategy.describe(), "soft miss");
        }
        self.consult_oracle(scope, intent).await
    }

    async fn consult_oracle(&self, scope: &Scope, intent: &str) -> Result<Option<Resolution>> {
        let Some(oracle) = self.oracle else {
            return Ok(None);
        };
        let html = self.driver.page_html().await?;
        let Some(suggestion) = oracle.suggest_selector(&html, intent).await? else {
            return Ok(None);
        };
        debug!(intent, selector = %suggestion.selector, "trying oracle suggestion");
        let token = Uuid::new_v4().simple().to_string();
        if self.driver.tag_match(scope, &suggestion.selector, &token).await? {
            info!(intent, selector = %suggestion.selector, "oracle suggestion resolved");
            return Ok(Some(Resolution {
                token,
                strategy: "oracle",
                confidence: ORACLE_CONFIDENCE,
            }));
        }
        Ok(None)
    }

    /// Like `resolve`, but an exhausted cascade is a hard failure carrying
    /// the full list of attempted strategies.
    pub async fn resolve_required(
        &self,
        scope: &Scope,
        stage: &str,
        intent: &str,
        strategies: &[Strategy],
    ) -> Result<Resolution> {
        match self.resolve(scope, intent, strategies).await? {
            Some(resolution) => Ok(resolution),
            None => Err(BookingError::HardResolutionFailure {
                stage: stage.to_string(),
                intent: intent.to_string(),
                attempted: strategies.iter().map(|s| s.describe()).collect(),
            }),
        }
    }

    async fn attempt(&self, scope: &Scope, strategy: &Strategy, token: &str) -> Result<bool> {
        match strategy {
            Strategy::Hint { selector } => self.driver.tag_match(scope, selector, token).await,
            Strategy::Index {
                container,
                index,
                target,
                exclude,
            } => {
                self.driver
                    .tag_nth_container(scope, container, *index, target, exclude, token)
                    .await
            }
            Strategy::Text {
                role,
                include,
                exclude,
            } => {
                self.driver
                    .tag_by_text(scope, role, include, exclude, token)
                    .await
            }
            Strategy::Generic {
                role,
                target_text,
                target_price,
            } => {
                // Harvest + score happens Rust-side; only the winner is tagged.
                let candidates = self.driver.harvest_candidates(scope, role).await?;
                let target = FuzzyTarget {
                    text: target_text.clone(),
                    price: *target_price,
                };
                let best = fuzzy::pick_best(
                    &candidates,
                    &target,
                    &self.config.weights,
                    self.config.acceptance_threshold,
                );
                match best {
                    Some(winner) => {
                        debug!(
                            order = winner.order,
                            score = winner.score,
                            "fuzzy match accepted"
                        );
                        self.driver.tag_candidate(scope, role, winner.order, token).await
                    }
                    None => Ok(false),
                }
            }
        }
    }
}

/// Errors that mean the page or browser is gone, as opposed to one strategy
/// finding nothing.
fn is_scope_loss(e: &BookingError) -> bool {
    matches!(
        e,
        BookingError::JavaScriptFailed(_)
            | BookingError::NavigationFailed(_)
            | BookingError::ResourceFailure(_)
            | BookingError::BrowserNotLaunched
            | BookingError::NoActiveTab
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::oracle::SelectorSuggestion;
    use crate::testing::FakeBrowser;
    use async_trait::async_trait;
    use serde_json::json;

    fn fast_config() -> ResolverConfig {
        ResolverConfig {
            element_timeout_ms: 50,
            poll_interval_ms: 5,
            ..ResolverConfig::default()
        }
    }

    fn strategies() -> Vec<Strategy> {
        vec![
            Strategy::Hint {
                selector: "#book-me".to_string(),
            },
            Strategy::Text {
                role: "button".to_string(),
                include: vec!["prenota".to_string()],
                exclude: vec![],
            },
        ]
    }

    #[tokio::test]
    async fn first_matching_strategy_wins() {
        let fake = FakeBrowser::new();
        fake.respond("#book-me", json!(true));
        let tab = ();
        let driver = PageDriver::new(&fake, &tab);
        let config = fast_config();
        let resolver = ElementResolver::new(&driver, &config);

        let resolution = resolver
            .resolve(&Scope::page(), "book button", &strategies())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolution.strategy, "hint");
        assert_eq!(resolution.confidence, 0.95);
    }

    #[tokio::test]
    async fn cascade_falls_through_soft_misses() {
        let fake = FakeBrowser::new();
        // Only the text strategy's script gets a hit.
        fake.respond("include.some", json!(true));
        let tab = ();
        let driver = PageDriver::new(&fake, &tab);
        let config = fast_config();
        let resolver = ElementResolver::new(&driver, &config);

        let resolution = resolver
            .resolve(&Scope::page(), "book button", &strategies())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolution.strategy, "text");
        assert_eq!(resolution.confidence, 0.65);
    }

    #[tokio::test]
    async fn exhausted_cascade_is_a_hard_failure_with_all_attempts() {
        let fake = FakeBrowser::new();
        let tab = ();
        let driver = PageDriver::new(&fake, &tab);
        let config = fast_config();
        let resolver = ElementResolver::new(&driver, &config);

        let err = resolver
            .resolve_required(&Scope::page(), "room-selection", "book button", &strategies())
            .await
            .unwrap_err();
        match err {
            BookingError::HardResolutionFailure {
                stage,
                intent,
                attempted,
            } => {
                assert_eq!(stage, "room-selection");
                assert_eq!(intent, "book button");
                assert_eq!(attempted.len(), 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn eval_failure_aborts_the_cascade() {
        let fake = FakeBrowser::new();
        fake.fail_on("#book-me");
        // Never reached: the first strategy's failure is fatal.
        fake.respond("include.some", json!(true));
        let tab = ();
        let driver = PageDriver::new(&fake, &tab);
        let config = fast_config();
        let resolver = ElementResolver::new(&driver, &config);

        let err = resolver
            .resolve(&Scope::page(), "book button", &strategies())
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::JavaScriptFailed(_)));
    }

    struct CannedOracle;

    #[async_trait]
    impl SelectorOracle for CannedOracle {
        async fn suggest_selector(
            &self,
            _page_html: &str,
            _intent: &str,
        ) -> crate::errors::Result<Option<SelectorSuggestion>> {
            Ok(Some(SelectorSuggestion {
                selector: "#oracle-pick".to_string(),
                rationale: None,
            }))
        }
    }

    #[tokio::test]
    async fn oracle_runs_only_after_every_strategy_missed() {
        let fake = FakeBrowser::new();
        fake.respond("#oracle-pick", json!(true));
        let tab = ();
        let driver = PageDriver::new(&fake, &tab);
        let config = fast_config();
        let oracle = CannedOracle;
        let resolver = ElementResolver::new(&driver, &config).with_oracle(&oracle);

        let resolution = resolver
            .resolve(&Scope::page(), "book button", &strategies())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolution.strategy, "oracle");
        assert!(resolution.confidence < 0.4);
    }
}
