//! Type-safe HTTP client for the game service's REST API.

use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{ServiceError, ServiceErrorKind};
use crate::service::{GameService, SessionId};
use crate::settings::Difficulty;
use crate::state::GameState;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Which call a response belongs to. Status codes mean different things per
/// endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
enum Endpoint {
    CreateSession,
    FetchState,
    SubmitMove,
    AutomatedMove,
}

#[derive(Debug, Deserialize)]
struct NewGameResponse {
    game_id: String,
}

#[derive(Debug, Serialize)]
struct MoveRequest {
    x: i32,
    y: i32,
}

#[derive(Debug, Serialize)]
struct AutomatedMoveRequest<'a> {
    difficulty: &'a str,
}

/// Free-text note some replies carry next to the state.
#[derive(Debug, Default, Deserialize)]
struct ReplyNote {
    #[serde(default)]
    message: Option<String>,
}

/// Error body: `{"detail": ...}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// HTTP client for the game service.
#[derive(Debug, Clone)]
pub struct RestGameClient {
    base_url: String,
    client: reqwest::Client,
}

impl RestGameClient {
    /// Creates a client for the service at `base_url` with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ServiceError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a client whose requests give up after `timeout`.
    #[instrument(skip(base_url), fields(base_url = tracing::field::Empty))]
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        tracing::Span::current().record("base_url", base_url.as_str());

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::unavailable(format!("Failed to build HTTP client: {}", e)))?;

        info!(timeout_ms = timeout.as_millis() as u64, "Created game service client");
        Ok(Self { base_url, client })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn game_url(&self, session: &SessionId) -> String {
        format!("{}/api/game/{}", self.base_url, session)
    }

    /// Turns a non-success response into a classified error.
    async fn reject(endpoint: Endpoint, response: Response) -> ServiceError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| match e.detail {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .unwrap_or_else(|_| body.trim().to_string());
        let detail = if detail.is_empty() {
            format!("HTTP {}", status)
        } else {
            detail
        };

        let kind = classify(endpoint, status);
        warn!(%endpoint, %status, ?kind, detail = %detail, "Game service rejected request");
        ServiceError::new(kind, detail)
    }

    /// Reads a success body, or classifies the failure.
    async fn read_body(endpoint: Endpoint, response: Response) -> Result<String, ServiceError> {
        if !response.status().is_success() {
            return Err(Self::reject(endpoint, response).await);
        }
        let body = response.text().await?;
        debug!(%endpoint, body = %body, "Game service response");
        Ok(body)
    }

    /// Parses a state payload, logging the service's note if present.
    fn parse_state(endpoint: Endpoint, body: &str) -> Result<GameState, ServiceError> {
        let state: GameState = serde_json::from_str(body).map_err(|e| {
            warn!(%endpoint, error = %e, "Game state did not match schema");
            ServiceError::malformed(format!("Invalid game state from {}: {}", endpoint, e))
        })?;
        if let Ok(ReplyNote { message: Some(note) }) = serde_json::from_str::<ReplyNote>(body) {
            debug!(%endpoint, note = %note, "Service note");
        }
        Ok(state)
    }
}

/// Maps an HTTP status to an error kind for the given endpoint.
fn classify(endpoint: Endpoint, status: StatusCode) -> ServiceErrorKind {
    match (endpoint, status) {
        (Endpoint::CreateSession, _) => ServiceErrorKind::ServiceUnavailable,
        (_, StatusCode::NOT_FOUND) => ServiceErrorKind::SessionNotFound,
        (Endpoint::SubmitMove, StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY) => {
            ServiceErrorKind::IllegalMove
        }
        (Endpoint::AutomatedMove, StatusCode::BAD_REQUEST) => ServiceErrorKind::SessionTerminal,
        _ => ServiceErrorKind::ServiceUnavailable,
    }
}

#[async_trait::async_trait]
impl GameService for RestGameClient {
    #[instrument(skip(self))]
    async fn create_session(&self) -> Result<SessionId, ServiceError> {
        info!("Creating game session");
        let response = self
            .client
            .post(format!("{}/api/game/new", self.base_url))
            .send()
            .await?;
        let body = Self::read_body(Endpoint::CreateSession, response).await?;
        let created: NewGameResponse = serde_json::from_str(&body).map_err(|e| {
            ServiceError::malformed(format!("Invalid new-game response: {}", e))
        })?;
        if created.game_id.is_empty() {
            return Err(ServiceError::malformed("Service returned an empty game id"));
        }
        let session = SessionId::new(created.game_id);
        info!(session_id = %session, "Game session created");
        Ok(session)
    }

    #[instrument(skip(self, session), fields(session_id = %session))]
    async fn fetch_state(&self, session: &SessionId) -> Result<GameState, ServiceError> {
        debug!("Fetching game state");
        let response = self.client.get(self.game_url(session)).send().await?;
        let body = Self::read_body(Endpoint::FetchState, response).await?;
        Self::parse_state(Endpoint::FetchState, &body)
    }

    #[instrument(skip(self, session), fields(session_id = %session))]
    async fn submit_human_move(
        &self,
        session: &SessionId,
        x: i32,
        y: i32,
    ) -> Result<GameState, ServiceError> {
        info!("Submitting move");
        let response = self
            .client
            .post(format!("{}/move", self.game_url(session)))
            .json(&MoveRequest { x, y })
            .send()
            .await?;
        let body = Self::read_body(Endpoint::SubmitMove, response).await?;
        Self::parse_state(Endpoint::SubmitMove, &body)
    }

    #[instrument(skip(self, session, difficulty), fields(session_id = %session, difficulty = %difficulty))]
    async fn request_automated_move(
        &self,
        session: &SessionId,
        difficulty: &Difficulty,
    ) -> Result<GameState, ServiceError> {
        info!("Requesting automated move");
        let response = self
            .client
            .post(format!("{}/ai-move", self.game_url(session)))
            .json(&AutomatedMoveRequest {
                difficulty: difficulty.as_str(),
            })
            .send()
            .await?;
        let body = Self::read_body(Endpoint::AutomatedMove, response).await?;
        Self::parse_state(Endpoint::AutomatedMove, &body)
    }
}
