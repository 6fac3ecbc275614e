use crate::errors::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Capability set the booking flow needs from a browser driver.
///
/// The flow never touches driver internals directly: every DOM query, click
/// and fill goes through `execute_script`, so any driver that can evaluate
/// JavaScript in a tab can back a booking session.
#[async_trait]
pub trait BrowserTrait: Send + Sync + 'static {
    type TabHandle: Send + Sync;

    /// Launch the underlying browser process.
    async fn launch(&mut self, config: &crate::core::BrowserConfig) -> Result<()>;

    /// Create a new tab/page.
    async fn new_tab(&self) -> Result<Self::TabHandle>;

    /// Navigate to a URL and wait for the initial load.
    async fn navigate(&self, tab: &Self::TabHandle, url: &str) -> Result<()>;

    /// Evaluate JavaScript in the tab, returning the JSON value it produced.
    async fn execute_script(&self, tab: &Self::TabHandle, script: &str) -> Result<Value>;

    /// Capture a PNG screenshot of the tab.
    async fn take_screenshot(&self, tab: &Self::TabHandle) -> Result<Vec<u8>>;

    /// Current URL of the tab.
    async fn get_url(&self, tab: &Self::TabHandle) -> Result<String>;

    /// Current document title.
    async fn get_title(&self, tab: &Self::TabHandle) -> Result<String>;

    /// Whether the browser process is still usable.
    fn is_running(&self) -> bool;

    /// Shut the browser down. Must be safe to call more than once.
    async fn close(&mut self) -> Result<()>;
}
