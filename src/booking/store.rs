use crate::booking::session::BookingSession;
use crate::core::BrowserTrait;
use crate::errors::{BookingError, Result};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Shared registry of live booking sessions.
///
/// Each session sits behind its own async mutex so two requests for the same
/// session serialize while requests for different sessions run freely. The
/// store is handed to the API layer as a value, not reached through a
/// global, so tests can spin up as many as they like.
pub struct SessionStore<B: BrowserTrait> {
    sessions: DashMap<String, Arc<Mutex<BookingSession<B>>>>,
}

impl<B: BrowserTrait> SessionStore<B> {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn insert(&self, session: BookingSession<B>) -> Arc<Mutex<BookingSession<B>>> {
        let id = session.id.clone();
        let handle = Arc::new(Mutex::new(session));
        self.sessions.insert(id, handle.clone());
        handle
    }

    pub fn get(&self, id: &str) -> Result<Arc<Mutex<BookingSession<B>>>> {
        self.sessions
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BookingError::SessionNotFound(id.to_string()))
    }

    /// Remove a session, releasing its browser.
    pub async fn remove(&self, id: &str) -> Result<()> {
        let (_, handle) = self
            .sessions
            .remove(id)
            .ok_or_else(|| BookingError::SessionNotFound(id.to_string()))?;
        handle.lock().await.release().await;
        info!(session = id, "session removed");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop every session idle past its expiry, releasing each browser
    /// exactly once. Returns how many were evicted.
    pub async fn evict_expired(&self) -> usize {
        let expired: Vec<String> = self
            .sessions
            .iter()
            .filter_map(|entry| {
                entry
                    .value()
                    .try_lock()
                    .ok()
                    .filter(|session| session.is_expired())
                    .map(|_| entry.key().clone())
            })
            .collect();

        let mut evicted = 0;
        for id in expired {
            if let Some((_, handle)) = self.sessions.remove(&id) {
                handle.lock().await.release().await;
                info!(session = %id, "expired session evicted");
                evicted += 1;
            }
        }
        evicted
    }
}

impl<B: BrowserTrait> Default for SessionStore<B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::model::{Hotel, SearchParams};
    use crate::booking::SiteProfile;
    use crate::core::Config;
    use crate::testing::FakeBrowser;

    fn session(id: &str, idle_expiry_secs: u64) -> BookingSession<FakeBrowser> {
        let mut config = Config::default();
        config.session.idle_expiry_secs = idle_expiry_secs;
        BookingSession::new(
            id.to_string(),
            Hotel {
                id: "h1".to_string(),
                name: "Hotel Mare".to_string(),
                location: None,
                emoji: None,
                base_url: "https://book.example/h1".to_string(),
                description: None,
            },
            SearchParams {
                checkin_date: "2026-09-01".to_string(),
                checkout_date: "2026-09-02".to_string(),
                adults: 1,
                children: 0,
            },
            Arc::new(config),
            SiteProfile::default(),
            false,
        )
    }

    #[tokio::test]
    async fn insert_then_get() {
        let store = SessionStore::new();
        store.insert(session("s1", 900));
        assert_eq!(store.len(), 1);
        assert!(store.get("s1").is_ok());
    }

    #[tokio::test]
    async fn get_unknown_session_errors() {
        let store: SessionStore<FakeBrowser> = SessionStore::new();
        let err = store.get("nope").unwrap_err();
        assert!(matches!(err, BookingError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn remove_unknown_session_errors() {
        let store: SessionStore<FakeBrowser> = SessionStore::new();
        assert!(store.remove("nope").await.is_err());
    }

    #[tokio::test]
    async fn evicts_only_expired_sessions() {
        let store = SessionStore::new();
        store.insert(session("fresh", 900));
        store.insert(session("stale", 0));

        let evicted = store.evict_expired().await;
        assert_eq!(evicted, 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("fresh").is_ok());
        assert!(store.get("stale").is_err());
    }

    #[tokio::test]
    async fn eviction_releases_the_browser() {
        let store = SessionStore::new();
        let fake = FakeBrowser::new();
        fake.respond("readyState", serde_json::json!("complete"));
        fake.respond(").length", serde_json::json!(1));
        fake.respond("tryText", serde_json::json!([]));

        let handle = store.insert(session("stale", 0));
        handle.lock().await.start_search(fake.clone()).await.unwrap();
        assert!(fake.is_running());

        let evicted = store.evict_expired().await;
        assert_eq!(evicted, 1);
        assert!(store.is_empty());
        assert!(!fake.is_running());
    }
}
