//! Voice memo recorder.

use std::time::Duration;

use tokio::time::Instant;

use crate::{
    domain::{AudioCapture, AudioClip},
    error::RecorderError,
};

/// Recordings stop automatically after this long
pub const MAX_RECORDING: Duration = Duration::from_millis(5000);

/// Records audio chunks from an [`AudioCapture`] device into a webm clip.
///
/// Time is injected: the owner calls [`VoiceRecorder::tick`] periodically
/// to update the duration and enforce the auto-stop.
pub struct VoiceRecorder<C: AudioCapture> {
    capture: C,
    max_duration: Duration,
    recording: bool,
    started_at: Option<Instant>,
    duration: Duration,
    chunks: Vec<Vec<u8>>,
    clip: Option<AudioClip>,
    error: Option<String>,
}

impl<C: AudioCapture> VoiceRecorder<C> {
    pub fn new(capture: C) -> Self {
        Self::with_max_duration(capture, MAX_RECORDING)
    }

    pub fn with_max_duration(capture: C, max_duration: Duration) -> Self {
        Self {
            capture,
            max_duration,
            recording: false,
            started_at: None,
            duration: Duration::ZERO,
            chunks: Vec::new(),
            clip: None,
            error: None,
        }
    }

    /// Start a new recording, discarding the previous clip.
    pub fn start(&mut self, now: Instant) -> Result<(), RecorderError> {
        if self.recording {
            return Err(RecorderError::AlreadyRecording);
        }

        self.error = None;
        self.chunks.clear();
        self.clip = None;
        self.duration = Duration::ZERO;

        if let Err(e) = self.capture.open() {
            tracing::error!("Recorder error: {}", e);
            self.error = Some("Microphone access denied".to_string());
            return Err(RecorderError::MicrophoneDenied(e));
        }

        self.recording = true;
        self.started_at = Some(now);
        Ok(())
    }

    /// Append captured audio. Empty chunks and chunks arriving while idle are ignored.
    pub fn push_chunk(&mut self, chunk: Vec<u8>) {
        if self.recording && !chunk.is_empty() {
            self.chunks.push(chunk);
        }
    }

    /// Update the elapsed duration; returns the clip if the recording hit
    /// the maximum length and was stopped.
    pub fn tick(&mut self, now: Instant) -> Option<AudioClip> {
        let started_at = self.started_at.filter(|_| self.recording)?;
        self.duration = now.duration_since(started_at);
        if self.duration >= self.max_duration {
            tracing::debug!("Recording reached its maximum length");
            self.stop()
        } else {
            None
        }
    }

    /// Stop recording and finalize the clip. No-op when not recording.
    pub fn stop(&mut self) -> Option<AudioClip> {
        if !self.recording {
            return None;
        }
        self.recording = false;
        self.capture.close();

        let clip = AudioClip::webm(self.chunks.concat());
        self.chunks.clear();
        self.clip = Some(clip.clone());
        Some(clip)
    }

    /// Abort the recording without producing a clip. No-op when not recording.
    pub fn cancel(&mut self) {
        if !self.recording {
            return;
        }
        self.recording = false;
        self.capture.close();
        self.chunks.clear();
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration.as_millis() as u64
    }

    /// Clip produced by the last completed recording
    pub fn clip(&self) -> Option<&AudioClip> {
        self.clip.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl<C: AudioCapture> Drop for VoiceRecorder<C> {
    fn drop(&mut self) {
        if self.recording {
            self.capture.close();
        }
    }
}
