//! Typing indicator.
//!
//! Outbound: keystrokes are throttled into `start` notifications and
//! debounced into a single `stop`. Inbound: typing updates from the feed are
//! reduced to "is somebody else typing".

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::{sync::mpsc, time::Instant};

use crate::domain::{ClientId, TypingApi, TypingStatus};

/// Minimum spacing between two `start` notifications
pub const THROTTLE_INTERVAL: Duration = Duration::from_millis(2000);
/// Quiet period after the last keystroke before `stop` is sent
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(1000);

/// Typing state pushed by the realtime feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypingUpdate {
    /// Ids of everyone currently typing
    Users(Vec<String>),
    /// Legacy form: somebody is typing or not
    Flag(bool),
}

/// Whether the typing indicator should be shown to `me`.
pub fn is_typing_visible(update: &TypingUpdate, me: Option<&ClientId>) -> bool {
    match update {
        TypingUpdate::Users(ids) => ids
            .iter()
            .any(|id| me.is_none_or(|me| id.as_str() != me.as_str())),
        TypingUpdate::Flag(flag) => *flag,
    }
}

/// Throttle/debounce state for outgoing typing notifications.
#[derive(Debug, Clone)]
pub struct TypingThrottle {
    throttle: Duration,
    debounce: Duration,
    last_start: Option<Instant>,
    stop_at: Option<Instant>,
}

impl Default for TypingThrottle {
    fn default() -> Self {
        Self::new(THROTTLE_INTERVAL, DEBOUNCE_DELAY)
    }
}

impl TypingThrottle {
    pub fn new(throttle: Duration, debounce: Duration) -> Self {
        Self {
            throttle,
            debounce,
            last_start: None,
            stop_at: None,
        }
    }

    /// Register a keystroke; returns `Start` when a notification is due.
    pub fn keystroke(&mut self, now: Instant) -> Option<TypingStatus> {
        self.stop_at = Some(now + self.debounce);

        let due = self
            .last_start
            .is_none_or(|last| now.duration_since(last) > self.throttle);
        if due {
            self.last_start = Some(now);
            Some(TypingStatus::Start)
        } else {
            None
        }
    }

    /// Returns `Stop` once the debounce deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<TypingStatus> {
        match self.stop_at {
            Some(at) if at <= now => {
                self.stop_at = None;
                Some(TypingStatus::Stop)
            }
            _ => None,
        }
    }

    pub fn stop_deadline(&self) -> Option<Instant> {
        self.stop_at
    }

    /// Take the pending `stop`, if any, regardless of its deadline.
    pub fn flush(&mut self) -> Option<TypingStatus> {
        self.stop_at.take().map(|_| TypingStatus::Stop)
    }
}

/// Background task turning keystrokes into typing notifications.
///
/// Dropping the notifier flushes a pending `stop`.
pub struct TypingNotifier {
    keystrokes: mpsc::UnboundedSender<()>,
}

impl TypingNotifier {
    pub fn spawn(api: Arc<dyn TypingApi>) -> Self {
        Self::with_throttle(api, TypingThrottle::default())
    }

    pub fn with_throttle(api: Arc<dyn TypingApi>, throttle: TypingThrottle) -> Self {
        let (keystrokes, keystroke_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_notifier(throttle, keystroke_rx, api));
        Self { keystrokes }
    }

    /// Report that the local user typed something.
    pub fn start_typing(&self) {
        let _ = self.keystrokes.send(());
    }
}

async fn run_notifier(
    mut throttle: TypingThrottle,
    mut keystrokes: mpsc::UnboundedReceiver<()>,
    api: Arc<dyn TypingApi>,
) {
    loop {
        let stop_at = throttle.stop_deadline();

        let status = tokio::select! {
            keystroke = keystrokes.recv() => match keystroke {
                Some(()) => throttle.keystroke(Instant::now()),
                None => break,
            },
            _ = sleep_until(stop_at) => throttle.poll(Instant::now()),
        };

        if let Some(status) = status {
            notify(api.as_ref(), status).await;
        }
    }

    if let Some(status) = throttle.flush() {
        notify(api.as_ref(), status).await;
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

async fn notify(api: &dyn TypingApi, status: TypingStatus) {
    if let Err(e) = api.notify(status).await {
        tracing::error!("Failed to notify typing {:?}: {}", status, e);
    }
}
