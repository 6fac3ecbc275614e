use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A selector guess produced by an external page interpreter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorSuggestion {
    pub selector: String,
    pub rationale: Option<String>,
}

/// Last-resort page interpreter, typically backed by a language model.
///
/// The resolver consults it only after every deterministic and fuzzy
/// strategy has missed. Returning `Ok(None)` means "no idea"; the cascade
/// then reports not-found. Implementations must not be load-bearing: the
/// engine has to work with `NullOracle`.
#[async_trait]
pub trait SelectorOracle: Send + Sync {
    async fn suggest_selector(
        &self,
        page_html: &str,
        intent: &str,
    ) -> Result<Option<SelectorSuggestion>>;
}

/// Oracle that never has a suggestion. Used when no language-model backend
/// is configured.
pub struct NullOracle;

#[async_trait]
impl SelectorOracle for NullOracle {
    async fn suggest_selector(
        &self,
        _page_html: &str,
        _intent: &str,
    ) -> Result<Option<SelectorSuggestion>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_oracle_never_suggests() {
        let oracle = NullOracle;
        let suggestion = oracle
            .suggest_selector("<html></html>", "book button")
            .await
            .unwrap();
        assert!(suggestion.is_none());
    }
}
