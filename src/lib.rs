//! Renju client - turn orchestration against a remote five-in-a-row service
//!
//! The game service owns the rules, the board, and the automated opponent.
//! This crate mirrors what the service reports and decides which request to
//! send next.
//!
//! # Architecture
//!
//! - **Service**: the [`GameService`] trait and its HTTP implementation,
//!   [`RestGameClient`]
//! - **Controller**: [`TurnController`], the session lifecycle and turn state
//!   machine, observable through [`Snapshot`]s
//! - **State**: the validated wire schema ([`GameState`], [`Board`])
//! - **Driver**: a line-oriented terminal front end
//!
//! # Example
//!
//! ```no_run
//! use renju_client::{Difficulty, GameSettings, RestGameClient, TurnController};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = RestGameClient::new("http://127.0.0.1:8000")?;
//! let controller = TurnController::new(
//!     client,
//!     GameSettings::versus_automated(Difficulty::intermediate()),
//! );
//!
//! controller.new_game().await?;
//! controller.submit_move(9, 9).await?;
//! println!("{}", controller.snapshot().message());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cli;
mod config;
mod controller;
mod driver;
mod error;
mod rest_client;
mod service;
mod settings;
mod state;

// Crate-level exports - Configuration
pub use cli::{Cli, Command};
pub use config::{ClientConfig, ConfigError, SERVER_URL_ENV};

// Crate-level exports - Controller
pub use controller::{Outcome, Rejection, Snapshot, Status, TurnController};

// Crate-level exports - Service client
pub use error::{ServiceError, ServiceErrorKind};
pub use rest_client::{DEFAULT_TIMEOUT, RestGameClient};
pub use service::{GameService, SessionId};

// Crate-level exports - Game state
pub use settings::{Difficulty, GameSettings, HUMAN_SIDE, Mode};
pub use state::{Board, GameState, Placement, Side, StateError, Stone};

// Crate-level exports - Terminal driver
pub use driver::{Input, parse_input, render, run_play, run_show};
