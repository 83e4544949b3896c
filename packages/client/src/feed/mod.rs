//! Realtime feed client.
//!
//! Consumes the chat's WebSocket feed and forwards join and typing frames to
//! the caller, reconnecting on connection loss.

mod domain;
mod runner;
mod session;

pub use runner::{MAX_RECONNECT_ATTEMPTS, RECONNECT_INTERVAL, run_feed};
pub use session::run_feed_session;
