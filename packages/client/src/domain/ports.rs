//! Port traits
//!
//! The features depend on these interfaces; `infrastructure` provides the
//! HTTP implementations and tests provide mocks.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ApiError;

use super::{AudioClip, ClientId, PersonaCard, PersonaId, TypingStatus};

/// Provider of the current client id.
///
/// Returns `None` while the client has not been identified yet.
pub type ClientIdProvider = Arc<dyn Fn() -> Option<ClientId> + Send + Sync>;

/// Wrap a closure as a [`ClientIdProvider`].
pub fn client_id_provider<F>(provider: F) -> ClientIdProvider
where
    F: Fn() -> Option<ClientId> + Send + Sync + 'static,
{
    Arc::new(provider)
}

/// Typing status notifications to the chat backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TypingApi: Send + Sync {
    async fn notify(&self, status: TypingStatus) -> Result<(), ApiError>;
}

/// Destination for client analytics events
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn send_event(
        &self,
        client_id: &ClientId,
        event_name: &str,
        payload: &serde_json::Value,
    ) -> Result<(), ApiError>;
}

/// Persona profile lookups
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersonaApi: Send + Sync {
    async fn fetch_persona(&self, persona_id: &PersonaId) -> Result<PersonaCard, ApiError>;
}

/// Voice drop storage and broadcast
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoiceDropApi: Send + Sync {
    /// Store the clip under `filename` and return its public URL.
    async fn upload_clip(
        &self,
        filename: &str,
        clip: &AudioClip,
        token: &str,
    ) -> Result<String, ApiError>;

    /// Ask the backend to broadcast an uploaded clip to the chat.
    async fn broadcast(&self, audio_url: &str, duration_ms: u64, token: &str)
    -> Result<(), ApiError>;
}

/// Audio input device used by the voice recorder
#[cfg_attr(test, mockall::automock)]
pub trait AudioCapture: Send {
    /// Acquire the input device.
    fn open(&mut self) -> std::io::Result<()>;

    /// Release the input device.
    fn close(&mut self);
}
