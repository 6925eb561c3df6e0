//! Session settings chosen before a game starts.

use derive_getters::Getters;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::state::Side;

/// The side a human always plays. The human moves first.
pub const HUMAN_SIDE: Side = Side::Black;

/// Who sits on each side of the board.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    clap::ValueEnum,
)]
pub enum Mode {
    /// Two humans share the board.
    #[serde(rename = "pvp")]
    #[strum(serialize = "pvp")]
    #[value(name = "pvp")]
    HumanVsHuman,
    /// A human (black) plays the automated opponent (white).
    #[default]
    #[serde(rename = "pvai")]
    #[strum(serialize = "pvai")]
    #[value(name = "pvai")]
    HumanVsAutomated,
}

impl Mode {
    /// True when the service plays one side.
    pub fn has_automated_opponent(self) -> bool {
        matches!(self, Mode::HumanVsAutomated)
    }

    /// True when a human may move for `side` in this mode.
    pub fn is_human(self, side: Side) -> bool {
        match self {
            Mode::HumanVsHuman => true,
            Mode::HumanVsAutomated => side == HUMAN_SIDE,
        }
    }
}

/// Strength of the automated opponent.
///
/// Opaque to this crate: the string is forwarded verbatim on every
/// automated-move request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Difficulty(String);

impl Difficulty {
    /// Creates a difficulty from any label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Random play.
    pub fn beginner() -> Self {
        Self::new("beginner")
    }

    /// Heuristic play.
    pub fn intermediate() -> Self {
        Self::new("intermediate")
    }

    /// The label sent to the service.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::beginner()
    }
}

impl From<&str> for Difficulty {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// Mode and difficulty, fixed for the lifetime of a controller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Getters)]
pub struct GameSettings {
    /// Who plays each side.
    #[getter(copy)]
    mode: Mode,
    /// Strength of the automated opponent; ignored in [`Mode::HumanVsHuman`].
    difficulty: Difficulty,
}

impl GameSettings {
    /// Creates settings for a new controller.
    #[instrument]
    pub fn new(mode: Mode, difficulty: Difficulty) -> Self {
        Self { mode, difficulty }
    }

    /// Human against the automated opponent at the given strength.
    pub fn versus_automated(difficulty: Difficulty) -> Self {
        Self::new(Mode::HumanVsAutomated, difficulty)
    }

    /// Two humans.
    pub fn versus_human() -> Self {
        Self::new(Mode::HumanVsHuman, Difficulty::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ValueEnum;

    #[test]
    fn test_mode_names_match_across_surfaces() {
        for (mode, name) in [(Mode::HumanVsHuman, "pvp"), (Mode::HumanVsAutomated, "pvai")] {
            assert_eq!(mode.to_string(), name);
            assert_eq!(
                serde_json::from_value::<Mode>(serde_json::json!(name)).expect("serde name"),
                mode
            );
            assert_eq!(Mode::from_str(name, false).expect("clap name"), mode);
        }
    }
}
