//! Voice drop upload: store the clip, then ask the backend to broadcast it.

use std::sync::Arc;

use southmain_shared::time::Clock;
use uuid::Uuid;

use crate::{
    domain::{AudioClip, VoiceDropApi},
    error::{ApiError, VoiceDropError},
};

/// Storage bucket holding voice drop clips
pub const STORAGE_BUCKET: &str = "audio-drops";

const BROADCAST_FAILED: &str = "Broadcast Failed";

/// Result of a successful voice drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceDropReceipt {
    pub filename: String,
    pub audio_url: String,
}

pub struct VoiceDropUploader {
    api: Arc<dyn VoiceDropApi>,
    clock: Arc<dyn Clock>,
}

impl VoiceDropUploader {
    pub fn new(api: Arc<dyn VoiceDropApi>, clock: Arc<dyn Clock>) -> Self {
        Self { api, clock }
    }

    /// Upload a recorded clip and broadcast it to the chat.
    ///
    /// # Arguments
    ///
    /// * `clip` - Recorded audio (must not be empty)
    /// * `duration_ms` - Length of the recording
    /// * `token` - Bearer token of the signed-in user
    pub async fn upload(
        &self,
        clip: &AudioClip,
        duration_ms: u64,
        token: &str,
    ) -> Result<VoiceDropReceipt, VoiceDropError> {
        if clip.is_empty() {
            return Err(VoiceDropError::EmptyClip);
        }

        let filename = format!("{}_{}.webm", self.clock.now_millis(), Uuid::new_v4());
        tracing::debug!(
            size = clip.len(),
            mime = %clip.mime_type,
            token = %token_preview(token),
            %filename,
            "Starting voice drop upload"
        );

        let audio_url = self
            .api
            .upload_clip(&filename, clip, token)
            .await
            .map_err(|e| {
                tracing::error!("Storage upload error: {}", e);
                VoiceDropError::StorageUpload(e.to_string())
            })?;

        self.api
            .broadcast(&audio_url, duration_ms, token)
            .await
            .map_err(|e| {
                tracing::error!("Voice drop broadcast error: {}", e);
                match e {
                    ApiError::Status {
                        message: Some(message),
                        ..
                    } if !message.is_empty() => VoiceDropError::Broadcast(message),
                    _ => VoiceDropError::Broadcast(BROADCAST_FAILED.to_string()),
                }
            })?;

        Ok(VoiceDropReceipt {
            filename,
            audio_url,
        })
    }
}

/// Loggable form of a bearer token.
fn token_preview(token: &str) -> String {
    if token.is_empty() {
        return "MISSING!".to_string();
    }
    let prefix: String = token.chars().take(10).collect();
    format!("Present ({}...)", prefix)
}
