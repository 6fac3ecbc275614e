use serde::{Deserialize, Serialize};

use crate::resolver::ScoreWeights;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub browser: BrowserConfig,
    pub resolver: ResolverConfig,
    pub session: SessionConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    pub headless: bool,
    pub viewport: Viewport,
    pub user_agent: Option<String>,
    pub disable_images: bool,
    pub args: Vec<String>,
    pub timeout_ms: u64,
}

/// Timing and scoring knobs for element resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Per-strategy probe timeout; exceeding it is a soft miss.
    pub element_timeout_ms: u64,
    /// Settle period after an action before verification runs.
    pub settle_ms: u64,
    /// Interval between probes in bounded polling loops.
    pub poll_interval_ms: u64,
    /// Wall-clock budget for "wait for results to finish loading".
    pub results_wait_ms: u64,
    /// Budget for dismissing overlays/cookie banners.
    pub overlay_budget_ms: u64,
    pub weights: ScoreWeights,
    /// Minimum composite score the fuzzy matcher will accept.
    pub acceptance_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub navigation_timeout_ms: u64,
    pub navigation_retries: u32,
    /// Sessions idle longer than this are eligible for eviction.
    pub idle_expiry_secs: u64,
    /// Directory for diagnostic screenshots; None disables capture.
    pub screenshot_dir: Option<std::path::PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser: BrowserConfig::default(),
            resolver: ResolverConfig::default(),
            session: SessionConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: Viewport::default(),
            user_agent: None,
            disable_images: false,
            args: vec![],
            timeout_ms: 30000,
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            element_timeout_ms: 3000,
            settle_ms: 1500,
            poll_interval_ms: 500,
            results_wait_ms: 8000,
            overlay_budget_ms: 800,
            weights: ScoreWeights::default(),
            acceptance_threshold: 0.5,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: 20000,
            navigation_retries: 3,
            idle_expiry_secs: 900,
            screenshot_dir: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}
