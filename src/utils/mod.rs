pub mod wait;

pub use wait::{poll_until, PollOutcome};
