use thiserror::Error;

/// Error taxonomy for the booking engine.
///
/// Soft misses (one resolution strategy failing) and unconfirmed actions are
/// *not* errors: they are modeled as outcome values in the resolver and the
/// action executor. Only conditions that must abort the current operation
/// appear here.
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("Browser not launched")]
    BrowserNotLaunched,

    #[error("Tab creation failed: {0}")]
    TabCreationFailed(String),

    #[error("No active tab")]
    NoActiveTab,

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("JavaScript execution failed: {0}")]
    JavaScriptFailed(String),

    #[error("Screenshot failed: {0}")]
    ScreenshotFailed(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Invalid session stage: expected '{expected}', current stage is '{actual}'")]
    SessionStateViolation { expected: String, actual: String },

    #[error("No element resolved for {intent} during {stage} (strategies tried: {attempted:?})")]
    HardResolutionFailure {
        stage: String,
        intent: String,
        attempted: Vec<String>,
    },

    #[error("Browser resource failure: {0}")]
    ResourceFailure(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Timeout error: {0}")]
    TimeoutError(String),
}

pub type Result<T> = std::result::Result<T, BookingError>;
