//! A single realtime feed connection.

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::{error::FeedError, infrastructure::dto::FeedMessage};

use super::domain::is_rejection;

/// Connect to the feed and forward recognized frames until the connection ends.
///
/// Returns `Ok(())` when the receiving side of `events` is gone, which means
/// nobody is interested anymore.
pub async fn run_feed_session(
    url: &str,
    client_id: &str,
    events: &mpsc::Sender<FeedMessage>,
) -> Result<(), FeedError> {
    let url = feed_url(url, client_id)?;

    let (mut ws_stream, _response) = match connect_async(url.as_str()).await {
        Ok(result) => result,
        Err(e) => {
            let error_msg = e.to_string();
            if is_rejection(&error_msg) {
                return Err(FeedError::Rejected(client_id.to_string()));
            }
            return Err(FeedError::ConnectionError(error_msg));
        }
    };

    tracing::info!("Connected to realtime feed");

    // Read-only: tungstenite answers pings on its own.
    while let Some(message) = ws_stream.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<FeedMessage>(&text) {
                Ok(frame) => {
                    if events.send(frame).await.is_err() {
                        tracing::debug!("Feed consumer gone, closing session");
                        return Ok(());
                    }
                }
                Err(e) => tracing::debug!("Skipping unrecognized feed frame: {}", e),
            },
            Ok(Message::Close(_)) => {
                tracing::info!("Server closed the connection");
                return Err(FeedError::ConnectionError(
                    "Server closed the connection".to_string(),
                ));
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("WebSocket read error: {}", e);
                return Err(FeedError::ConnectionError(e.to_string()));
            }
        }
    }

    Err(FeedError::ConnectionError("Connection lost".to_string()))
}

/// Feed URL with `client_id` appended as a percent-encoded query parameter.
fn feed_url(url: &str, client_id: &str) -> Result<reqwest::Url, FeedError> {
    let mut url = reqwest::Url::parse(url)
        .map_err(|e| FeedError::ConnectionError(format!("Invalid feed URL '{}': {}", url, e)))?;
    url.query_pairs_mut().append_pair("client_id", client_id);
    Ok(url)
}
