//! Renju client - terminal front end
//!
//! Plays five-in-a-row against a remote game service.

#![warn(missing_docs)]

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use renju_client::{
    Cli, ClientConfig, Command, Difficulty, RestGameClient, SessionId, TurnController, run_play,
    run_show,
};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_file)?;

    let config = ClientConfig::load(&cli.config)?;

    match cli.command {
        Command::Play {
            server_url,
            mode,
            difficulty,
        } => {
            let mut config = config;
            if let Some(url) = server_url {
                config = config.with_server_url(url)?;
            }
            if let Some(mode) = mode {
                config = config.with_mode(mode);
            }
            if let Some(difficulty) = difficulty {
                config = config.with_difficulty(Difficulty::new(difficulty))?;
            }
            play(config).await
        }
        Command::Show {
            session_id,
            server_url,
        } => {
            let config = match server_url {
                Some(url) => config.with_server_url(url)?,
                None => config,
            };
            let client = RestGameClient::with_timeout(config.server_url(), config.request_timeout())?;
            run_show(client, SessionId::new(session_id)).await
        }
    }
}

/// Run an interactive game
#[instrument(skip_all, fields(server_url = %config.server_url(), mode = %config.mode()))]
async fn play(config: ClientConfig) -> Result<()> {
    info!(difficulty = %config.difficulty(), "Starting Renju client");
    let client = RestGameClient::with_timeout(config.server_url(), config.request_timeout())?;
    let controller = TurnController::new(client, config.game_settings());
    run_play(controller).await
}

/// Sends logs to a file so they do not interleave with the board.
fn init_tracing(log_file: &Path) -> Result<()> {
    let file = std::fs::File::create(log_file)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,renju_client=debug")),
        )
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;
    info!(log_file = %log_file.display(), "Tracing initialized");
    Ok(())
}
