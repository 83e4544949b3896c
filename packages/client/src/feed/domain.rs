//! Reconnection decisions for the realtime feed.
//!
//! Pure functions, kept apart from the I/O so they are easy to test.

use crate::error::FeedError;

/// HTTP statuses meaning the server will never accept this client as-is
const REJECTION_STATUSES: [&str; 3] = ["401", "403", "409"];

/// Whether a handshake failure message describes a refusal rather than a
/// transient network problem.
pub fn is_rejection(error_message: &str) -> bool {
    REJECTION_STATUSES
        .iter()
        .any(|status| error_message.contains(status))
        || error_message.contains("Conflict")
        || error_message.contains("Unauthorized")
        || error_message.contains("Forbidden")
}

/// Check if the feed should stop immediately based on the error type.
pub fn should_exit_immediately(error: &FeedError) -> bool {
    matches!(error, FeedError::Rejected(_))
}

/// Check if the feed should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The feed error that occurred
/// * `current_attempt` - Number of reconnection attempts made so far
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(error: &FeedError, current_attempt: u32, max_attempts: u32) -> bool {
    if should_exit_immediately(error) {
        return false;
    }

    current_attempt < max_attempts
}
