//! Turn orchestration against the remote game service.
//!
//! [`TurnController`] owns the session handle and the last game state the
//! service reported. It decides which request to send next based on whose
//! turn it is, and publishes every change as a [`Snapshot`] on a watch
//! channel.
//!
//! # Lifecycle
//!
//! ```text
//! Idle -> Initializing -> AwaitingHuman <-> AwaitingAutomated -> Terminal
//!                \______________\___________________\__________-> Errored
//! ```
//!
//! [`TurnController::new_game`] is accepted from every status. Each call opens
//! a new generation; responses that arrive for an older generation are
//! dropped and the command reports [`Outcome::Superseded`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use derive_getters::Getters;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::error::ServiceError;
use crate::service::{GameService, SessionId};
use crate::settings::{GameSettings, HUMAN_SIDE};
use crate::state::{Board, GameState, Side};

/// Where the controller is in the turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Status {
    /// No game requested yet.
    Idle,
    /// Creating a session and loading its first state.
    Initializing,
    /// Waiting for a human to pick a cell.
    AwaitingHuman,
    /// Waiting for the service to play for the automated side.
    AwaitingAutomated,
    /// The service reported the game as finished.
    Terminal,
    /// The last request failed; see the snapshot message.
    Errored,
}

/// Why a command was refused without contacting the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Rejection {
    /// There is no live session to act on.
    #[strum(to_string = "no game in progress")]
    NoSession,
    /// The side to move is not controlled by a human.
    #[strum(to_string = "not your turn")]
    NotYourTurn,
    /// A request for this session is still in flight.
    #[strum(to_string = "still waiting for the game service")]
    Busy,
    /// The game has finished.
    #[strum(to_string = "the game is over")]
    GameOver,
    /// The controller is loading a session.
    #[strum(to_string = "the game is still starting")]
    NotReady,
}

/// Result of a command that did not fail at the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The service's answer was applied.
    Applied,
    /// The command was refused locally; nothing was sent.
    Rejected(Rejection),
    /// A newer game replaced the session before the answer arrived; the
    /// answer was dropped.
    Superseded,
}

/// Read-only view of the controller, published after every change.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Snapshot {
    /// Current status.
    #[getter(copy)]
    status: Status,
    /// Live session, if any.
    session: Option<SessionId>,
    /// Last state the service reported for the live session.
    state: Option<GameState>,
    /// True while a request for the live session is in flight.
    #[getter(copy)]
    busy: bool,
    /// Human-readable status line.
    message: String,
}

impl Snapshot {
    /// The board, once a game has loaded.
    pub fn board(&self) -> Option<&Board> {
        self.state.as_ref().map(GameState::board)
    }

    /// Side to move.
    pub fn current_turn(&self) -> Option<Side> {
        self.state.as_ref().map(GameState::current_turn)
    }

    /// True when the last known state is finished.
    pub fn game_over(&self) -> bool {
        self.state.as_ref().is_some_and(GameState::game_over)
    }

    /// Winner of a finished game.
    pub fn winner(&self) -> Option<Side> {
        self.state.as_ref().and_then(GameState::winner)
    }
}

/// Mutable bookkeeping, guarded by the controller's mutex.
#[derive(Debug)]
struct Inner {
    generation: u64,
    session: Option<SessionId>,
    state: Option<GameState>,
    status: Status,
    in_flight: bool,
    message: String,
}

impl Inner {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            status: self.status,
            session: self.session.clone(),
            state: self.state.clone(),
            busy: self.in_flight,
            message: self.message.clone(),
        }
    }

    /// Records a failure while keeping the session and last good state.
    fn fail(&mut self, err: &ServiceError) {
        self.in_flight = false;
        self.status = Status::Errored;
        self.message = err.user_message();
    }
}

struct Shared<S> {
    service: S,
    settings: GameSettings,
    inner: Mutex<Inner>,
    snapshots: watch::Sender<Snapshot>,
}

/// Drives one game at a time against a [`GameService`].
///
/// Cloning is cheap; clones share the same session. Commands take `&self`,
/// so a new game can be requested while a move is still waiting on the
/// network.
pub struct TurnController<S> {
    shared: Arc<Shared<S>>,
}

impl<S> Clone for TurnController<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S> std::fmt::Debug for TurnController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnController")
            .field("settings", &self.shared.settings)
            .field("inner", &*self.lock())
            .finish()
    }
}

impl<S> TurnController<S> {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.shared
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &Inner) {
        self.shared.snapshots.send_replace(inner.snapshot());
    }

    /// Settings fixed at construction.
    pub fn settings(&self) -> &GameSettings {
        &self.shared.settings
    }

    /// Current view of the controller.
    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot()
    }

    /// Subscribes to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.shared.snapshots.subscribe()
    }
}

impl<S: GameService> TurnController<S> {
    /// Creates an idle controller. No request is sent until [`Self::new_game`].
    #[instrument(skip(service))]
    pub fn new(service: S, settings: GameSettings) -> Self {
        info!("Creating turn controller");
        let inner = Inner {
            generation: 0,
            session: None,
            state: None,
            status: Status::Idle,
            in_flight: false,
            message: "Press new game to start.".to_string(),
        };
        let (snapshots, _) = watch::channel(inner.snapshot());
        Self {
            shared: Arc::new(Shared {
                service,
                settings,
                inner: Mutex::new(inner),
                snapshots,
            }),
        }
    }

    /// Abandons the current session and starts a fresh game.
    ///
    /// Accepted from every status. On failure the controller is left
    /// [`Status::Errored`] with no session.
    #[instrument(skip(self))]
    pub async fn new_game(&self) -> Result<Outcome, ServiceError> {
        let generation = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.session = None;
            inner.state = None;
            inner.in_flight = false;
            inner.status = Status::Initializing;
            inner.message = "Creating a new game...".to_string();
            self.publish(&inner);
            inner.generation
        };
        info!(generation, "Starting new game");

        let loaded = match self.shared.service.create_session().await {
            Ok(session) => {
                if !self.is_current(generation) {
                    debug!(generation, session_id = %session, "Dropping superseded session");
                    return Ok(Outcome::Superseded);
                }
                self.shared
                    .service
                    .fetch_state(&session)
                    .await
                    .map(|state| (session, state))
            }
            Err(e) => Err(e),
        };

        let mut inner = self.lock();
        if inner.generation != generation {
            debug!(generation, "Dropping superseded new-game response");
            return Ok(Outcome::Superseded);
        }
        match loaded {
            Ok((session, state)) => {
                info!(
                    session_id = %session,
                    width = state.board().width(),
                    height = state.board().height(),
                    "Game ready"
                );
                inner.status = if state.game_over() {
                    Status::Terminal
                } else {
                    Status::AwaitingHuman
                };
                inner.message = if state.game_over() {
                    state.summary()
                } else {
                    format!("New game. You play {}; make the first move.", HUMAN_SIDE)
                };
                inner.session = Some(session);
                inner.state = Some(state);
                self.publish(&inner);
                Ok(Outcome::Applied)
            }
            Err(e) => {
                error!(error = %e, "Failed to start game");
                inner.fail(&e);
                inner.message = format!("Could not start a game. {}", e.user_message());
                self.publish(&inner);
                Err(e)
            }
        }
    }

    /// Plays a human stone at column `x`, row `y`.
    ///
    /// Against the automated opponent, a successful move is followed
    /// immediately by the opponent's reply. Occupancy and legality are left
    /// to the service.
    #[instrument(skip(self))]
    pub async fn submit_move(&self, x: i32, y: i32) -> Result<Outcome, ServiceError> {
        let (generation, session) = {
            let mut inner = self.lock();
            if let Err(rejection) = self.check_human_turn(&inner) {
                debug!(%rejection, status = %inner.status, "Move refused");
                if rejection == Rejection::NotYourTurn {
                    inner.message = "Not your turn.".to_string();
                    self.publish(&inner);
                }
                return Ok(Outcome::Rejected(rejection));
            }
            let Some(session) = inner.session.clone() else {
                return Ok(Outcome::Rejected(Rejection::NoSession));
            };
            inner.in_flight = true;
            inner.status = Status::AwaitingHuman;
            inner.message = format!("Placing a stone at ({}, {})...", x, y);
            self.publish(&inner);
            (inner.generation, session)
        };

        let reply = self.shared.service.submit_human_move(&session, x, y).await;

        {
            let mut inner = self.lock();
            if inner.generation != generation {
                debug!(generation, session_id = %session, "Dropping superseded move response");
                return Ok(Outcome::Superseded);
            }
            let state = match reply {
                Ok(state) => state,
                Err(e) => {
                    warn!(error = %e, "Move failed");
                    inner.fail(&e);
                    self.publish(&inner);
                    return Err(e);
                }
            };
            info!(
                current_turn = %state.current_turn(),
                game_over = state.game_over(),
                "Move applied"
            );
            let automated_next = !state.game_over()
                && self.settings().mode().has_automated_opponent()
                && !self.settings().mode().is_human(state.current_turn());
            inner.in_flight = false;
            if automated_next {
                inner.status = Status::AwaitingAutomated;
                inner.message = "The automated opponent is thinking...".to_string();
            } else {
                settle(&mut inner, &state);
            }
            inner.state = Some(state);
            self.publish(&inner);
            if !automated_next {
                return Ok(Outcome::Applied);
            }
        }

        self.play_automated_turn(generation, session).await
    }

    /// Re-reads the live session from the service and resumes play.
    ///
    /// If the automated side is to move, its move is requested right away.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Outcome, ServiceError> {
        let (generation, session) = {
            let mut inner = self.lock();
            if inner.in_flight {
                return Ok(Outcome::Rejected(Rejection::Busy));
            }
            match inner.status {
                Status::Idle => return Ok(Outcome::Rejected(Rejection::NoSession)),
                Status::Initializing => return Ok(Outcome::Rejected(Rejection::NotReady)),
                Status::AwaitingAutomated => return Ok(Outcome::Rejected(Rejection::Busy)),
                Status::AwaitingHuman | Status::Terminal | Status::Errored => {}
            }
            let Some(session) = inner.session.clone() else {
                return Ok(Outcome::Rejected(Rejection::NoSession));
            };
            inner.in_flight = true;
            inner.message = "Refreshing...".to_string();
            self.publish(&inner);
            (inner.generation, session)
        };

        let reply = self.shared.service.fetch_state(&session).await;

        {
            let mut inner = self.lock();
            if inner.generation != generation {
                debug!(generation, session_id = %session, "Dropping superseded refresh");
                return Ok(Outcome::Superseded);
            }
            let state = match reply {
                Ok(state) => state,
                Err(e) => {
                    warn!(error = %e, "Refresh failed");
                    inner.fail(&e);
                    self.publish(&inner);
                    return Err(e);
                }
            };
            let automated_next = !state.game_over()
                && !self.settings().mode().is_human(state.current_turn());
            inner.in_flight = false;
            if automated_next {
                inner.status = Status::AwaitingAutomated;
                inner.message = "The automated opponent is thinking...".to_string();
            } else {
                settle(&mut inner, &state);
            }
            inner.state = Some(state);
            self.publish(&inner);
            if !automated_next {
                return Ok(Outcome::Applied);
            }
        }

        self.play_automated_turn(generation, session).await
    }

    /// Requests the automated move and applies it. Entered only from
    /// [`Status::AwaitingAutomated`].
    #[instrument(skip(self, session), fields(session_id = %session))]
    async fn play_automated_turn(
        &self,
        generation: u64,
        session: SessionId,
    ) -> Result<Outcome, ServiceError> {
        let difficulty = self.settings().difficulty();
        let reply = self
            .shared
            .service
            .request_automated_move(&session, difficulty)
            .await;

        let mut inner = self.lock();
        if inner.generation != generation {
            debug!(generation, "Dropping superseded automated move");
            return Ok(Outcome::Superseded);
        }
        match reply {
            Ok(state) => {
                let played = inner
                    .state
                    .as_ref()
                    .map(|previous| previous.board().changes_to(state.board()))
                    .unwrap_or_default();
                info!(
                    %difficulty,
                    current_turn = %state.current_turn(),
                    game_over = state.game_over(),
                    "Automated move applied"
                );
                settle(&mut inner, &state);
                if let [placement] = played.as_slice()
                    && !state.game_over()
                {
                    inner.message = format!(
                        "Opponent played ({}, {}). Your move.",
                        placement.x, placement.y
                    );
                }
                inner.state = Some(state);
                self.publish(&inner);
                Ok(Outcome::Applied)
            }
            Err(e) => {
                warn!(error = %e, "Automated move failed");
                inner.fail(&e);
                self.publish(&inner);
                Err(e)
            }
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock().generation == generation
    }

    /// Local precondition for a human move; no network involved.
    fn check_human_turn(&self, inner: &Inner) -> Result<(), Rejection> {
        if inner.in_flight {
            return Err(Rejection::Busy);
        }
        match inner.status {
            Status::Idle => return Err(Rejection::NoSession),
            Status::Initializing => return Err(Rejection::NotReady),
            Status::AwaitingAutomated => return Err(Rejection::NotYourTurn),
            Status::Terminal => return Err(Rejection::GameOver),
            Status::AwaitingHuman | Status::Errored => {}
        }
        let Some(state) = inner.state.as_ref() else {
            return Err(Rejection::NoSession);
        };
        if state.game_over() {
            return Err(Rejection::GameOver);
        }
        if !self.settings().mode().is_human(state.current_turn()) {
            return Err(Rejection::NotYourTurn);
        }
        Ok(())
    }
}

/// Picks the resting status for a state where a human (or nobody) moves next.
fn settle(inner: &mut Inner, state: &GameState) {
    if state.game_over() {
        inner.status = Status::Terminal;
        inner.message = state.summary();
    } else {
        inner.status = Status::AwaitingHuman;
        inner.message = format!("{} to move.", state.current_turn());
    }
}
