//! Infrastructure layer: wire DTOs and HTTP implementations of the ports.

pub mod dto;
pub mod http;

pub use http::{ApiClient, HttpAnalyticsSink, HttpPersonaApi, HttpTypingApi, HttpVoiceDropApi};
