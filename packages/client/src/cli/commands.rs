//! Subcommand implementations.

use std::{path::Path, sync::Arc};

use rustyline::{DefaultEditor, error::ReadlineError};
use southmain_shared::time::Clock;
use tokio::sync::{mpsc, watch};

use crate::{
    analytics::AnalyticsReporter,
    domain::{AudioClip, ClientId, JoinEvent, client_id_provider},
    feed::run_feed,
    infrastructure::{
        ApiClient, HttpAnalyticsSink, HttpPersonaApi, HttpVoiceDropApi,
        dto::{FeedMessage, JoinEventPayload},
    },
    join_banner::JoinBanner,
    profile_card::ProfileCardStore,
    typing::is_typing_visible,
    voice::VoiceDropUploader,
};

use super::{
    formatter::BannerFormatter,
    ui::{PROMPT, redisplay_prompt},
};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Parse one line of interactive input into a join payload.
///
/// A line starting with `{` is read as a JSON payload, anything else as a
/// username. Blank lines and unreadable JSON yield `None`.
pub fn parse_input_line(line: &str) -> Option<JoinEventPayload> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if line.starts_with('{') {
        return match serde_json::from_str::<JoinEventPayload>(line) {
            Ok(payload) => Some(payload),
            Err(e) => {
                tracing::warn!("Invalid join payload: {}", e);
                None
            }
        };
    }
    Some(JoinEventPayload::new(line, line))
}

/// Print every banner change until the banner is disposed.
fn spawn_banner_printer(
    mut display: watch::Receiver<Option<JoinEvent>>,
    with_prompt: bool,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while display.changed().await.is_ok() {
            let formatted = BannerFormatter::format_banner(display.borrow_and_update().as_ref());
            print!("{}", formatted);
            if with_prompt {
                redisplay_prompt();
            }
        }
    })
}

/// Interactive banner playground: each entered line is a join event.
pub async fn run_banner_prompt(banner: JoinBanner) -> CommandResult {
    println!("\nType a username (or a JSON join payload) and press Enter. Ctrl+D to exit.\n");

    let printer = spawn_banner_printer(banner.subscribe(), true);

    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // rustyline is synchronous, so it gets its own thread
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    while let Some(line) = input_rx.recv().await {
        if let Some(payload) = parse_input_line(&line) {
            banner.submit(payload);
        }
    }

    banner.dispose();
    printer.await.ok();
    Ok(())
}

/// Follow the realtime feed: joins go to the banner, typing updates are printed.
pub async fn run_watch(banner: JoinBanner, url: String, client_id: ClientId) -> CommandResult {
    let printer = spawn_banner_printer(banner.subscribe(), false);

    let (events_tx, mut events_rx) = mpsc::channel::<FeedMessage>(256);
    let mut feed = tokio::spawn(run_feed(url, client_id.as_str().to_string(), events_tx));

    let mut typing_visible = false;
    let result = loop {
        tokio::select! {
            event = events_rx.recv() => match event {
                Some(FeedMessage::UserJoined(payload)) => banner.submit(payload),
                Some(FeedMessage::TypingUpdate(update)) => {
                    let visible = is_typing_visible(&update.active_user_ids, Some(&client_id));
                    if visible != typing_visible {
                        typing_visible = visible;
                        print!("{}", BannerFormatter::format_typing(visible));
                    }
                }
                None => break Ok(()),
            },
            feed_result = &mut feed => {
                break match feed_result {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(Box::new(e) as Box<dyn std::error::Error>),
                    Err(e) => Err(Box::new(e) as Box<dyn std::error::Error>),
                };
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break Ok(());
            }
        }
    };

    feed.abort();
    banner.dispose();
    printer.await.ok();
    result
}

/// Fetch and print one persona card.
pub async fn run_profile(api: ApiClient, persona_id: String) -> CommandResult {
    let store = ProfileCardStore::new(Arc::new(HttpPersonaApi::new(api)));
    store.open(&persona_id).await;

    match store.snapshot().card {
        Some(card) => {
            print!("{}", BannerFormatter::format_persona_card(&card));
            Ok(())
        }
        None => Err(format!("No profile card for '{}'", persona_id).into()),
    }
}

/// Send a single analytics event.
pub async fn run_track(
    api: ApiClient,
    client_id: Option<ClientId>,
    event_name: String,
    payload: serde_json::Value,
) -> CommandResult {
    let reporter = AnalyticsReporter::new(
        Arc::new(HttpAnalyticsSink::new(api)),
        client_id_provider(move || client_id.clone()),
    );

    if reporter.track(&event_name, payload).await {
        println!("Tracked '{}'", event_name);
    } else {
        println!("'{}' was not tracked", event_name);
    }
    Ok(())
}

/// Upload a recorded clip as a voice drop.
pub async fn run_voice_drop(
    api: ApiClient,
    clock: Arc<dyn Clock>,
    file: &Path,
    duration_ms: u64,
    token: String,
) -> CommandResult {
    let bytes = tokio::fs::read(file).await?;
    let uploader = VoiceDropUploader::new(Arc::new(HttpVoiceDropApi::new(api)?), clock);

    let receipt = uploader
        .upload(&AudioClip::webm(bytes), duration_ms, &token)
        .await?;
    println!("Voice drop sent: {}", receipt.audio_url);
    Ok(())
}
