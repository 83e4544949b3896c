//! Tokio driver for the join banner scheduler.
//!
//! A single task owns the [`JoinBannerScheduler`]; the [`JoinBanner`] handle
//! forwards submissions over a channel and exposes the displayed entry as a
//! `watch` value, so renderers are notified only when it actually changes.

use std::sync::Arc;

use southmain_shared::time::Clock;
use tokio::{
    sync::{mpsc, watch},
    time::Instant,
};

use crate::{domain::JoinEvent, infrastructure::dto::JoinEventPayload};

use super::scheduler::{BannerTimings, JoinBannerScheduler};

enum Command {
    Submit(JoinEvent),
    Dispose,
}

/// Handle to a running join banner.
///
/// Dropping the handle disposes the banner.
pub struct JoinBanner {
    commands: mpsc::UnboundedSender<Command>,
    display: watch::Receiver<Option<JoinEvent>>,
    clock: Arc<dyn Clock>,
}

impl JoinBanner {
    /// Spawn the scheduler task on the current tokio runtime.
    ///
    /// `clock` supplies the join time of events that arrive without one.
    pub fn spawn(timings: BannerTimings, clock: Arc<dyn Clock>) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (display_tx, display) = watch::channel(None);

        tokio::spawn(run_scheduler(
            JoinBannerScheduler::new(timings),
            command_rx,
            display_tx,
        ));

        Self {
            commands,
            display,
            clock,
        }
    }

    /// Submit a raw join payload from the event feed.
    ///
    /// Payloads that identify nobody are logged and dropped.
    pub fn submit(&self, payload: JoinEventPayload) {
        match payload.into_event(self.clock.as_ref()) {
            Some(event) => self.submit_event(event),
            None => tracing::warn!("Ignoring join event without user id or username"),
        }
    }

    /// Submit an already normalized join event.
    pub fn submit_event(&self, event: JoinEvent) {
        if self.commands.send(Command::Submit(event)).is_err() {
            tracing::debug!("Join banner already disposed, event dropped");
        }
    }

    /// Entry that should currently be rendered
    pub fn current_display(&self) -> Option<JoinEvent> {
        self.display.borrow().clone()
    }

    /// Subscribe to display changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<JoinEvent>> {
        self.display.clone()
    }

    /// Stop the banner: timers are cancelled, the queue and display cleared.
    ///
    /// Safe to call any number of times.
    pub fn dispose(&self) {
        let _ = self.commands.send(Command::Dispose);
    }
}

impl Drop for JoinBanner {
    fn drop(&mut self) {
        self.dispose();
    }
}

async fn run_scheduler(
    mut scheduler: JoinBannerScheduler,
    mut commands: mpsc::UnboundedReceiver<Command>,
    display: watch::Sender<Option<JoinEvent>>,
) {
    loop {
        let deadline = scheduler.next_deadline();

        // Due timers fire before a command that became ready at the same time.
        tokio::select! {
            biased;
            _ = sleep_until(deadline) => {
                scheduler.fire_due(Instant::now());
            }
            command = commands.recv() => match command {
                Some(Command::Submit(event)) => {
                    let now = Instant::now();
                    scheduler.fire_due(now);
                    scheduler.submit(event, now);
                }
                Some(Command::Dispose) | None => {
                    scheduler.dispose();
                    publish(&display, &scheduler);
                    break;
                }
            },
        }

        publish(&display, &scheduler);
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

fn publish(display: &watch::Sender<Option<JoinEvent>>, scheduler: &JoinBannerScheduler) {
    let next = scheduler.current_display().cloned();
    display.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });
}
