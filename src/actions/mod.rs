pub mod executor;

pub use executor::{ActionExecutor, ActionKind, ActionOutcome, Verification};
