//! Error types for the Southmain client.

use thiserror::Error;

/// HTTP collaborator errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Request could not be sent or the connection failed
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with a non-success status. `message` is the error
    /// text the server sent in a JSON body, if any.
    #[error("HTTP {status}{}", status_detail(.message))]
    Status {
        status: u16,
        message: Option<String>,
    },

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

fn status_detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

/// Realtime feed errors
#[derive(Debug, Error)]
pub enum FeedError {
    /// The server refused the handshake (unauthorized or duplicate client id)
    #[error("Realtime feed rejected connection for '{0}'")]
    Rejected(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

/// Voice recorder errors
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("Microphone access denied: {0}")]
    MicrophoneDenied(#[source] std::io::Error),

    #[error("Recording already in progress")]
    AlreadyRecording,
}

/// Voice drop upload errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoiceDropError {
    #[error("No audio clip provided")]
    EmptyClip,

    #[error("Storage is not configured")]
    MissingStorageConfig,

    #[error("Storage upload failed: {0}")]
    StorageUpload(String),

    #[error("{0}")]
    Broadcast(String),
}
