//! Error types for talking to the game service.

use derive_more::{Display, Error};
use strum::EnumIter;
use tracing::instrument;

/// Classification of a failed service call.
///
/// The client only classifies; the controller decides what a kind means for
/// the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, EnumIter)]
pub enum ServiceErrorKind {
    /// Transport failure, timeout, or a non-success status without a more
    /// specific meaning.
    #[strum(to_string = "service unavailable")]
    ServiceUnavailable,
    /// The service rejected a human move on rule grounds.
    #[strum(to_string = "illegal move")]
    IllegalMove,
    /// The session is unknown to the service.
    #[strum(to_string = "session not found")]
    SessionNotFound,
    /// The session has already finished.
    #[strum(to_string = "game already over")]
    SessionTerminal,
    /// The service answered with a payload that does not match the schema.
    #[strum(to_string = "malformed response")]
    MalformedResponse,
}

/// A failed call to the game service, with caller location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("{}: {} at {}:{}", kind, message, file, line)]
pub struct ServiceError {
    /// What went wrong.
    pub kind: ServiceErrorKind,
    /// Human-readable detail, usually the service's own text.
    pub message: String,
    /// Line number where the error was raised.
    pub line: u32,
    /// Source file where the error was raised.
    pub file: &'static str,
}

impl ServiceError {
    /// Creates a new service error at the caller's location.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Shorthand for [`ServiceErrorKind::ServiceUnavailable`].
    #[track_caller]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::ServiceUnavailable, message)
    }

    /// Shorthand for [`ServiceErrorKind::MalformedResponse`].
    #[track_caller]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::MalformedResponse, message)
    }

    /// Message suitable for a status line, without the source location.
    pub fn user_message(&self) -> String {
        match self.kind {
            ServiceErrorKind::ServiceUnavailable => {
                format!("Game service unavailable: {}", self.message)
            }
            ServiceErrorKind::IllegalMove => format!("Move rejected: {}", self.message),
            ServiceErrorKind::SessionNotFound => {
                "The game session no longer exists. Start a new game.".to_string()
            }
            ServiceErrorKind::SessionTerminal => {
                "The game is already over. Start a new game.".to_string()
            }
            ServiceErrorKind::MalformedResponse => {
                format!("Unexpected response from the game service: {}", self.message)
            }
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::malformed(format!("Failed to decode response: {}", err))
        } else {
            Self::unavailable(format!("HTTP request failed: {}", err))
        }
    }
}

impl From<crate::state::StateError> for ServiceError {
    #[track_caller]
    fn from(err: crate::state::StateError) -> Self {
        Self::malformed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_user_message_omits_location() {
        for kind in ServiceErrorKind::iter() {
            let err = ServiceError::new(kind, "detail");
            assert!(!err.user_message().contains(err.file));
        }
    }

    #[test]
    fn test_display_includes_kind_and_location() {
        let err = ServiceError::new(ServiceErrorKind::IllegalMove, "occupied");
        let text = err.to_string();
        assert!(text.starts_with("illegal move: occupied at "));
        assert!(text.contains("error.rs"));
    }
}
