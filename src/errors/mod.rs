pub mod types;

pub use types::{BookingError, Result};
