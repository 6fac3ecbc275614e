//! Browser automation engine for hotel booking flows.
//!
//! The engine drives a real browser through a booking storefront: search
//! availability, pick a room, enter guest data, pay. Element lookup runs a
//! cascade of typed strategies scoped to the right room card, actions verify
//! their own effect, and each guest gets an isolated session with a strict
//! forward-only stage machine. An HTTP API exposes the whole flow.

pub mod actions;
pub mod api;
pub mod booking;
pub mod browser;
pub mod core;
pub mod errors;
pub mod resolver;
pub mod testing;
pub mod utils;

pub use booking::{BookingSession, SessionStore, SiteProfile, Stage};
pub use browser::ChromeBrowser;
pub use core::{BrowserTrait, Config};
pub use errors::{BookingError, Result};
