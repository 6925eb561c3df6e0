//! The remote game service as seen by the controller.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::settings::Difficulty;
use crate::state::GameState;

/// Server-assigned handle for one game.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The four operations the game service offers.
///
/// Implementations classify failures and pass responses through untouched:
/// no retries, no caching, no interpretation of game rules.
#[async_trait::async_trait]
pub trait GameService: Send + Sync {
    /// Creates a new game and returns its handle.
    async fn create_session(&self) -> Result<SessionId, ServiceError>;

    /// Fetches the current state of a game.
    async fn fetch_state(&self, session: &SessionId) -> Result<GameState, ServiceError>;

    /// Plays a stone for the side to move at column `x`, row `y`.
    ///
    /// Coordinates are forwarded as given; the service judges bounds,
    /// occupancy, turn order and forbidden moves.
    async fn submit_human_move(
        &self,
        session: &SessionId,
        x: i32,
        y: i32,
    ) -> Result<GameState, ServiceError>;

    /// Asks the service to play for the side to move.
    async fn request_automated_move(
        &self,
        session: &SessionId,
        difficulty: &Difficulty,
    ) -> Result<GameState, ServiceError>;
}

#[async_trait::async_trait]
impl<T: GameService + ?Sized> GameService for std::sync::Arc<T> {
    async fn create_session(&self) -> Result<SessionId, ServiceError> {
        (**self).create_session().await
    }

    async fn fetch_state(&self, session: &SessionId) -> Result<GameState, ServiceError> {
        (**self).fetch_state(session).await
    }

    async fn submit_human_move(
        &self,
        session: &SessionId,
        x: i32,
        y: i32,
    ) -> Result<GameState, ServiceError> {
        (**self).submit_human_move(session, x, y).await
    }

    async fn request_automated_move(
        &self,
        session: &SessionId,
        difficulty: &Difficulty,
    ) -> Result<GameState, ServiceError> {
        (**self).request_automated_move(session, difficulty).await
    }
}
