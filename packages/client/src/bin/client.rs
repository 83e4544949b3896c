//! Southmain chat client.
//!
//! Drives the join banner, the realtime feed and the HTTP API from the command line.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin southmain-client -- banner
//! cargo run --bin southmain-client -- watch -c Alice
//! cargo run --bin southmain-client -- profile p1
//! cargo run --bin southmain-client -- track room_opened '{"room":"lobby"}' -c Alice
//! cargo run --bin southmain-client -- voice-drop clip.webm -d 3200 -t $TOKEN
//! ```

use std::{path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};

use southmain_client::{
    cli,
    domain::ClientId,
    infrastructure::ApiClient,
    join_banner::{BannerTimings, JoinBanner},
};
use southmain_shared::{
    config::ApiConfig,
    logger::setup_logger,
    time::{Clock, SystemClock},
};

#[derive(Parser, Debug)]
#[command(name = "southmain-client")]
#[command(about = "Southmain chat client: join banner, realtime feed and API tools", long_about = None)]
struct Args {
    /// API base URL (overrides SOUTHMAIN_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Host name used to pick the default API base
    #[arg(long, global = true)]
    host: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Type join events by hand and watch the banner rotate
    Banner,

    /// Follow the realtime feed
    Watch {
        /// Realtime feed URL
        #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
        url: String,

        /// Client ID of this session
        #[arg(short = 'c', long)]
        client_id: String,
    },

    /// Show a persona profile card
    Profile { persona_id: String },

    /// Send an analytics event
    Track {
        event: String,

        /// JSON payload
        #[arg(default_value = "{}")]
        payload: String,

        #[arg(short = 'c', long)]
        client_id: Option<String>,
    },

    /// Upload a recorded clip as a voice drop
    VoiceDrop {
        file: PathBuf,

        /// Clip duration in milliseconds
        #[arg(short = 'd', long)]
        duration_ms: u64,

        /// Access token of the signed-in user
        #[arg(short = 't', long)]
        token: String,
    },
}

fn api_client(
    api_base: Option<String>,
    host: Option<&str>,
) -> Result<ApiClient, Box<dyn std::error::Error>> {
    let mut config = ApiConfig::from_env(host);
    if let Some(api_base) = api_base {
        config.api_base = ApiConfig::new(api_base).api_base;
    }
    tracing::debug!("API config: {:?}", config);
    Ok(ApiClient::new(config)?)
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let host = args.host.as_deref();

    match args.command {
        Command::Banner => {
            let banner = JoinBanner::spawn(BannerTimings::default(), clock);
            cli::run_banner_prompt(banner).await
        }
        Command::Watch { url, client_id } => {
            let client_id = ClientId::new(client_id)?;
            let banner = JoinBanner::spawn(BannerTimings::default(), clock);
            cli::run_watch(banner, url, client_id).await
        }
        Command::Profile { persona_id } => {
            cli::run_profile(api_client(args.api_base, host)?, persona_id).await
        }
        Command::Track {
            event,
            payload,
            client_id,
        } => {
            let payload: serde_json::Value = serde_json::from_str(&payload)?;
            let client_id = client_id.map(ClientId::new).transpose()?;
            cli::run_track(api_client(args.api_base, host)?, client_id, event, payload).await
        }
        Command::VoiceDrop {
            file,
            duration_ms,
            token,
        } => {
            cli::run_voice_drop(
                api_client(args.api_base, host)?,
                clock,
                &file,
                duration_ms,
                token,
            )
            .await
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
