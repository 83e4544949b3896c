//! Client analytics reporter.
//!
//! Analytics must never disturb the user: events without a client id are
//! skipped and delivery failures are only logged.

use std::sync::Arc;

use crate::domain::{AnalyticsSink, ClientIdProvider};

/// Sends named client events with a JSON payload.
///
/// Build one per session and share it through `Arc`.
pub struct AnalyticsReporter {
    sink: Arc<dyn AnalyticsSink>,
    client_id: ClientIdProvider,
}

impl AnalyticsReporter {
    pub fn new(sink: Arc<dyn AnalyticsSink>, client_id: ClientIdProvider) -> Self {
        Self { sink, client_id }
    }

    /// Track an event. Returns `true` when the event was delivered.
    pub async fn track(&self, event_name: &str, payload: serde_json::Value) -> bool {
        let Some(client_id) = (self.client_id)() else {
            tracing::debug!(event = event_name, "No client id yet, skipping analytics event");
            return false;
        };

        match self.sink.send_event(&client_id, event_name, &payload).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("[Analytics] Tracking '{}' failed: {}", event_name, e);
                false
            }
        }
    }
}
