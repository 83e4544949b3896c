//! Domain layer: value objects, entities and the ports the features depend on.

pub mod entity;
pub mod ports;
pub mod value_object;

pub use entity::{AudioClip, JoinEvent, PersonaCard, TypingStatus};
pub use ports::{
    AnalyticsSink, AudioCapture, ClientIdProvider, PersonaApi, TypingApi, VoiceDropApi,
    client_id_provider,
};
pub use value_object::{ClientId, PersonaId, Timestamp, UserId, ValueObjectError};
