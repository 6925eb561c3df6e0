//! Line-oriented terminal driver.
//!
//! Reads commands from stdin, forwards them to a [`TurnController`], and
//! prints every snapshot the controller publishes. Commands run as their own
//! tasks, so `new` can be typed while a move is still waiting on the service.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::controller::{Outcome, Snapshot, TurnController};
use crate::service::{GameService, SessionId};
use crate::state::GameState;

/// A parsed line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Place a stone at column `x`, row `y`.
    Move {
        /// Column.
        x: i32,
        /// Row.
        y: i32,
    },
    /// Start a new game.
    NewGame,
    /// Re-read the session from the service.
    Refresh,
    /// Show the command list.
    Help,
    /// Leave.
    Quit,
}

/// Parses one line. Accepts `x y`, `move x y`, `new`, `refresh`, `help`, `quit`.
pub fn parse_input(line: &str) -> Option<Input> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        ["new" | "n" | "restart"] => Some(Input::NewGame),
        ["refresh" | "r"] => Some(Input::Refresh),
        ["help" | "h" | "?"] => Some(Input::Help),
        ["quit" | "q" | "exit"] => Some(Input::Quit),
        ["move" | "m", x, y] | [x, y] => {
            let x = x.trim_end_matches(',').parse().ok()?;
            let y = y.parse().ok()?;
            Some(Input::Move { x, y })
        }
        _ => None,
    }
}

const HELP: &str = "Commands: <x> <y> | move <x> <y> | new | refresh | help | quit";

/// Formats a snapshot for the terminal.
pub fn render(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    if let Some(state) = snapshot.state() {
        out.push_str(&state.board().display());
        out.push('\n');
        if let Some(summary) = summary_line(state, snapshot.message()) {
            out.push_str(&summary);
            out.push('\n');
        }
    }
    out.push_str(&format!("[{}] {}", snapshot.status(), snapshot.message()));
    out
}

/// The state summary, unless the status message already says it.
fn summary_line(state: &GameState, message: &str) -> Option<String> {
    let summary = state.summary();
    (!message.starts_with(&summary)).then_some(summary)
}

/// Runs an interactive game until the user quits or stdin closes.
#[instrument(skip(controller))]
pub async fn run_play<S>(controller: TurnController<S>) -> Result<()>
where
    S: GameService + 'static,
{
    info!("Starting interactive game");
    let printer = tokio::spawn(print_snapshots(controller.subscribe()));

    println!("{}", HELP);
    spawn_command(&controller, Input::NewGame);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            Some(Input::Quit) => {
                info!("User quit");
                break;
            }
            Some(Input::Help) => println!("{}", HELP),
            Some(input) => spawn_command(&controller, input),
            None if line.trim().is_empty() => {}
            None => println!("Unrecognized command. {}", HELP),
        }
    }

    printer.abort();
    Ok(())
}

/// Prints the state of one session without starting a controller.
#[instrument(skip(service))]
pub async fn run_show<S: GameService>(service: S, session: SessionId) -> Result<()> {
    let state = service.fetch_state(&session).await?;
    println!("{}", state.board().display());
    println!("{}", state.summary());
    Ok(())
}

fn spawn_command<S>(controller: &TurnController<S>, input: Input)
where
    S: GameService + 'static,
{
    let controller = controller.clone();
    tokio::spawn(async move {
        let result = match input {
            Input::Move { x, y } => controller.submit_move(x, y).await,
            Input::NewGame => controller.new_game().await,
            Input::Refresh => controller.refresh().await,
            Input::Help | Input::Quit => return,
        };
        match result {
            Ok(Outcome::Rejected(reason)) => println!("Ignored: {}.", reason),
            Ok(outcome) => debug!(?input, ?outcome, "Command finished"),
            Err(e) => warn!(?input, error = %e, "Command failed"),
        }
    });
}

async fn print_snapshots(mut snapshots: watch::Receiver<Snapshot>) {
    while snapshots.changed().await.is_ok() {
        let text = render(&snapshots.borrow_and_update());
        println!("\n{}", text);
    }
}
