//! In-memory browser double for exercising flows without Chrome.

use crate::core::{BrowserConfig, BrowserTrait};
use crate::errors::{BookingError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakeState {
    running: bool,
    url: String,
    scripts: Vec<String>,
    navigations: Vec<String>,
    responders: Vec<(String, Value)>,
    fail_keys: Vec<String>,
    fail_navigation: bool,
}

/// Scriptable `BrowserTrait` implementation.
///
/// Responds to `execute_script` by substring match: the first registered
/// responder whose key occurs in the script wins; anything unmatched gets
/// `null`, which every caller treats as a negative probe. Scripts matching
/// a `fail_on` key error instead, simulating a page that rejects the eval.
/// Clones share state, so a test can keep one handle for assertions while
/// the session owns another.
#[derive(Clone, Default)]
pub struct FakeBrowser {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a canned response for any script containing `key`.
    pub fn respond(&self, key: &str, value: Value) {
        if let Ok(mut state) = self.state.lock() {
            state.responders.push((key.to_string(), value));
        }
    }

    /// Make every script containing `key` fail with a JavaScript error.
    pub fn fail_on(&self, key: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_keys.push(key.to_string());
        }
    }

    /// Make every navigation attempt fail.
    pub fn fail_navigation(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_navigation = true;
        }
    }

    pub fn set_url(&self, url: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.url = url.to_string();
        }
    }

    /// Every script evaluated so far, in order.
    pub fn scripts(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|s| s.scripts.clone())
            .unwrap_or_default()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|s| s.navigations.clone())
            .unwrap_or_default()
    }

    pub fn script_ran(&self, needle: &str) -> bool {
        self.scripts().iter().any(|s| s.contains(needle))
    }
}

#[async_trait]
impl BrowserTrait for FakeBrowser {
    type TabHandle = ();

    async fn launch(&mut self, _config: &BrowserConfig) -> Result<()> {
        if let Ok(mut state) = self.state.lock() {
            state.running = true;
        }
        Ok(())
    }

    async fn new_tab(&self) -> Result<Self::TabHandle> {
        Ok(())
    }

    async fn navigate(&self, _tab: &Self::TabHandle, url: &str) -> Result<()> {
        if let Ok(mut state) = self.state.lock() {
            if state.fail_navigation {
                return Err(BookingError::NavigationFailed(
                    "simulated network failure".to_string(),
                ));
            }
            state.url = url.to_string();
            state.navigations.push(url.to_string());
        }
        Ok(())
    }

    async fn execute_script(&self, _tab: &Self::TabHandle, script: &str) -> Result<Value> {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(_) => return Ok(Value::Null),
        };
        state.scripts.push(script.to_string());
        if let Some(key) = state.fail_keys.iter().find(|k| script.contains(k.as_str())) {
            return Err(BookingError::JavaScriptFailed(format!(
                "simulated eval failure near '{key}'"
            )));
        }
        let response = state
            .responders
            .iter()
            .find(|(key, _)| script.contains(key.as_str()))
            .map(|(_, value)| value.clone())
            .unwrap_or(Value::Null);
        Ok(response)
    }

    async fn take_screenshot(&self, _tab: &Self::TabHandle) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    async fn get_url(&self, _tab: &Self::TabHandle) -> Result<String> {
        Ok(self.state.lock().map(|s| s.url.clone()).unwrap_or_default())
    }

    async fn get_title(&self, _tab: &Self::TabHandle) -> Result<String> {
        Ok(String::new())
    }

    fn is_running(&self) -> bool {
        self.state.lock().map(|s| s.running).unwrap_or(false)
    }

    async fn close(&mut self) -> Result<()> {
        if let Ok(mut state) = self.state.lock() {
            state.running = false;
        }
        Ok(())
    }
}
