//! Voice drops: short recorded clips uploaded to storage and broadcast to the chat.

mod recorder;
mod uploader;

pub use recorder::{MAX_RECORDING, VoiceRecorder};
pub use uploader::{STORAGE_BUCKET, VoiceDropReceipt, VoiceDropUploader};
