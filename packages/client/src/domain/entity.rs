//! Domain entities.

use serde::{Deserialize, Serialize};

use super::value_object::{Timestamp, UserId};

/// A user-joined notification, normalized from the realtime feed.
///
/// Immutable once received; the join banner queues and displays it as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinEvent {
    pub user_id: UserId,
    pub username: String,
    pub joined_at: Timestamp,
}

/// Status sent to the backend while the local user types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypingStatus {
    Start,
    Stop,
}

/// Profile card data returned by the persona endpoint.
///
/// Only the fields the client renders are typed; everything else is kept.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersonaCard {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "display_name", alias = "displayName")]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, alias = "avatarUrl")]
    pub avatar_url: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Recorded audio ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl AudioClip {
    pub const WEBM: &'static str = "audio/webm";

    pub fn webm(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: Self::WEBM.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persona_card_keeps_unknown_fields() {
        // テスト項目: PersonaCard は既知のフィールドを型付けし、それ以外も保持する
        // given (前提条件):
        let json = r#"{"id":"p1","display_name":"Mika","mood":"sunny"}"#;

        // when (操作):
        let card: PersonaCard = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(card.id.as_deref(), Some("p1"));
        assert_eq!(card.name.as_deref(), Some("Mika"));
        assert_eq!(card.extra.get("mood"), Some(&serde_json::json!("sunny")));
    }

    #[test]
    fn test_typing_status_serializes_lowercase() {
        // テスト項目: TypingStatus は小文字でシリアライズされる
        // given (前提条件):
        let status = TypingStatus::Start;

        // when (操作):
        let json = serde_json::to_string(&status).unwrap();

        // then (期待する結果):
        assert_eq!(json, "\"start\"");
    }
}
