pub mod browser;
pub mod config;
pub mod oracle;

pub use browser::BrowserTrait;
pub use config::{BrowserConfig, Config, ResolverConfig, ServerConfig, SessionConfig};
pub use oracle::{NullOracle, SelectorOracle, SelectorSuggestion};
