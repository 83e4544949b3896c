//! Realtime feed execution with reconnection support.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::{error::FeedError, infrastructure::dto::FeedMessage};

use super::{
    domain::{should_attempt_reconnect, should_exit_immediately},
    session::run_feed_session,
};

pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;
pub const RECONNECT_INTERVAL: Duration = Duration::from_secs(5);

/// Run the realtime feed, reconnecting after connection loss.
///
/// Returns `Ok(())` once the consumer of `events` goes away, or the last
/// error when the server rejects the client or reconnection gives up.
pub async fn run_feed(
    url: String,
    client_id: String,
    events: mpsc::Sender<FeedMessage>,
) -> Result<(), FeedError> {
    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} as '{}' (attempt {}/{})",
            url,
            client_id,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        let error = match run_feed_session(&url, &client_id, &events).await {
            Ok(()) => {
                tracing::info!("Feed session ended normally");
                return Ok(());
            }
            Err(e) => e,
        };

        if should_exit_immediately(&error) {
            tracing::error!(
                "Realtime feed refused client_id '{}'. Giving up.",
                client_id
            );
            return Err(error);
        }

        tracing::warn!("Connection lost: {}", error);
        reconnect_count += 1;

        if !should_attempt_reconnect(&error, reconnect_count, MAX_RECONNECT_ATTEMPTS) {
            tracing::error!(
                "Failed to reconnect after {} attempts. Giving up.",
                MAX_RECONNECT_ATTEMPTS
            );
            return Err(error);
        }

        tracing::info!(
            "Reconnecting in {} seconds... (attempt {}/{})",
            RECONNECT_INTERVAL.as_secs(),
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        tokio::select! {
            _ = tokio::time::sleep(RECONNECT_INTERVAL) => {}
            _ = events.closed() => return Ok(()),
        }
    }
}
