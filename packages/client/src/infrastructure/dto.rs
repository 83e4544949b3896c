//! Wire payloads exchanged with the realtime feed and the HTTP API.

use serde::{Deserialize, Serialize};
use southmain_shared::time::{Clock, parse_rfc3339_millis};

use crate::{
    domain::{JoinEvent, Timestamp, TypingStatus, UserId},
    typing::TypingUpdate,
};

// ========================================
// Realtime feed
// ========================================

/// Frame received from the realtime feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedMessage {
    UserJoined(JoinEventPayload),
    TypingUpdate(TypingUpdatePayload),
}

/// Join time as sent by the feed: RFC 3339 text or epoch milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JoinedAt {
    Millis(i64),
    Text(String),
}

/// User-joined payload; every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinEventPayload {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub joined_at: Option<JoinedAt>,
}

impl JoinEventPayload {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            username: Some(username.into()),
            joined_at: None,
        }
    }

    /// Normalize into a [`JoinEvent`].
    ///
    /// A missing id falls back to the username and vice versa; a missing or
    /// unreadable join time becomes the clock's current time. Returns `None`
    /// only when neither id nor username is present.
    pub fn into_event(self, clock: &dyn Clock) -> Option<JoinEvent> {
        let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        let username = non_blank(self.username);
        let user_id = non_blank(self.user_id).or_else(|| username.clone())?;
        let user_id = UserId::new(user_id).ok()?;
        let username = username.unwrap_or_else(|| user_id.as_str().to_string());

        let joined_at = match self.joined_at {
            Some(JoinedAt::Millis(millis)) => Some(millis),
            Some(JoinedAt::Text(text)) => parse_rfc3339_millis(&text),
            None => None,
        }
        .unwrap_or_else(|| clock.now_millis());

        Some(JoinEvent {
            user_id,
            username,
            joined_at: Timestamp::new(joined_at),
        })
    }
}

/// Typing state frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingUpdatePayload {
    #[serde(alias = "activeUserIds", alias = "typing")]
    pub active_user_ids: TypingUpdate,
}

// ========================================
// HTTP API
// ========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypingRequest {
    pub status: TypingStatus,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsEventRequest<'a> {
    #[serde(rename = "eventName")]
    pub event_name: &'a str,
    pub payload: &'a serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct VoiceDropBroadcastRequest<'a> {
    #[serde(rename = "audioUrl")]
    pub audio_url: &'a str,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
}

/// Error body returned by the API and by storage
#[derive(Debug, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error).filter(|m| !m.is_empty())
    }
}
