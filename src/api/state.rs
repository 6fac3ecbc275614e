use crate::booking::{SessionStore, SiteProfile};
use crate::core::{BrowserTrait, Config};
use std::sync::Arc;

/// Everything the handlers need, injected rather than global.
///
/// The browser factory makes the whole API generic over the browser: the
/// binary hands in a Chrome factory, tests hand in a scripted double.
pub struct AppState<B: BrowserTrait> {
    pub config: Arc<Config>,
    pub profile: SiteProfile,
    pub store: Arc<SessionStore<B>>,
    pub browser_factory: Arc<dyn Fn() -> B + Send + Sync>,
}

impl<B: BrowserTrait> AppState<B> {
    pub fn new(
        config: Config,
        profile: SiteProfile,
        browser_factory: impl Fn() -> B + Send + Sync + 'static,
    ) -> Self {
        Self {
            config: Arc::new(config),
            profile,
            store: Arc::new(SessionStore::new()),
            browser_factory: Arc::new(browser_factory),
        }
    }
}

impl<B: BrowserTrait> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            profile: self.profile.clone(),
            store: self.store.clone(),
            browser_factory: self.browser_factory.clone(),
        }
    }
}
