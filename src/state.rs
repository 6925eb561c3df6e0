//! Mirrored game state as reported by the game service.
//!
//! Every type here is parsed and validated at the client boundary. Nothing in
//! this module can change a board after it has been received.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// One of the two players.
///
/// Encoded on the wire as `1` (black) or `2` (white).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(try_from = "u8", into = "u8")]
pub enum Side {
    /// Black moves first and is bound by the forbidden-move rule.
    Black,
    /// White.
    White,
}

impl Side {
    /// Returns the other side.
    pub fn opponent(self) -> Self {
        match self {
            Side::Black => Side::White,
            Side::White => Side::Black,
        }
    }

    /// Returns the stone this side places.
    pub fn stone(self) -> Stone {
        match self {
            Side::Black => Stone::Black,
            Side::White => Stone::White,
        }
    }
}

impl TryFrom<u8> for Side {
    type Error = StateError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Side::Black),
            2 => Ok(Side::White),
            other => Err(StateError::UnknownSide(other)),
        }
    }
}

impl From<Side> for u8 {
    fn from(side: Side) -> Self {
        match side {
            Side::Black => 1,
            Side::White => 2,
        }
    }
}

/// Content of a single intersection.
///
/// Encoded on the wire as `0` (empty), `1` (black) or `2` (white).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Stone {
    /// No stone.
    #[default]
    Empty,
    /// A black stone.
    Black,
    /// A white stone.
    White,
}

impl Stone {
    /// Returns the side owning this stone, if any.
    pub fn side(self) -> Option<Side> {
        match self {
            Stone::Empty => None,
            Stone::Black => Some(Side::Black),
            Stone::White => Some(Side::White),
        }
    }

    /// Single-character glyph used by [`Board::display`].
    pub fn glyph(self) -> char {
        match self {
            Stone::Empty => '.',
            Stone::Black => 'X',
            Stone::White => 'O',
        }
    }
}

impl TryFrom<u8> for Stone {
    type Error = StateError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Stone::Empty),
            1 => Ok(Stone::Black),
            2 => Ok(Stone::White),
            other => Err(StateError::UnknownStone(other)),
        }
    }
}

impl From<Stone> for u8 {
    fn from(stone: Stone) -> Self {
        match stone {
            Stone::Empty => 0,
            Stone::Black => 1,
            Stone::White => 2,
        }
    }
}

/// A stone that differs between two boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct Placement {
    /// Column.
    pub x: usize,
    /// Row.
    pub y: usize,
    /// Stone now at `(x, y)`.
    pub stone: Stone,
}

/// Rectangular grid of stones, indexed `rows[y][x]`.
///
/// Dimensions are whatever the service sends; the only requirement is a
/// non-empty rectangle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Stone>>", into = "Vec<Vec<Stone>>")]
pub struct Board {
    rows: Vec<Vec<Stone>>,
}

impl Board {
    /// Creates an empty `width` x `height` board.
    pub fn empty(width: usize, height: usize) -> Result<Self, StateError> {
        Self::from_rows(vec![vec![Stone::Empty; width]; height])
    }

    /// Builds a board from rows, checking that it is a non-empty rectangle.
    #[instrument(skip(rows), fields(height = rows.len()))]
    pub fn from_rows(rows: Vec<Vec<Stone>>) -> Result<Self, StateError> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(StateError::EmptyBoard);
        }
        if let Some((row, found)) = rows
            .iter()
            .enumerate()
            .map(|(y, r)| (y, r.len()))
            .find(|&(_, len)| len != width)
        {
            return Err(StateError::RaggedBoard {
                row,
                expected: width,
                found,
            });
        }
        Ok(Self { rows })
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.rows[0].len()
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Stone at column `x`, row `y`, or `None` when out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<Stone> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Rows of the board.
    pub fn rows(&self) -> &[Vec<Stone>] {
        &self.rows
    }

    /// Counts stones of the given kind.
    pub fn count(&self, stone: Stone) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&s| s == stone)
            .count()
    }

    /// True when no stone has been placed.
    pub fn is_empty(&self) -> bool {
        self.count(Stone::Empty) == self.width() * self.height()
    }

    /// Cells whose content in `newer` differs from `self`.
    ///
    /// Boards of different dimensions are not comparable and yield nothing.
    pub fn changes_to(&self, newer: &Board) -> Vec<Placement> {
        if self.width() != newer.width() || self.height() != newer.height() {
            return Vec::new();
        }
        let mut changes = Vec::new();
        for (y, (old_row, new_row)) in self.rows.iter().zip(&newer.rows).enumerate() {
            for (x, (old, new)) in old_row.iter().zip(new_row).enumerate() {
                if old != new {
                    changes.push(Placement::new(x, y, *new));
                }
            }
        }
        changes
    }

    /// Renders the board as text with column and row indices.
    pub fn display(&self) -> String {
        let mut out = String::from("   ");
        for x in 0..self.width() {
            out.push_str(&format!("{:>3}", x));
        }
        out.push('\n');
        for (y, row) in self.rows.iter().enumerate() {
            out.push_str(&format!("{:>3}", y));
            for stone in row {
                out.push_str("  ");
                out.push(stone.glyph());
            }
            out.push('\n');
        }
        out
    }
}

impl TryFrom<Vec<Vec<Stone>>> for Board {
    type Error = StateError;

    fn try_from(rows: Vec<Vec<Stone>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<Board> for Vec<Vec<Stone>> {
    fn from(board: Board) -> Self {
        board.rows
    }
}

/// Snapshot of one game as reported by the service.
///
/// The authoritative copy lives server-side. Values of this type are only
/// ever replaced wholesale by newer service responses.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(try_from = "RawGameState")]
pub struct GameState {
    /// The grid.
    board: Board,
    /// Side to move next.
    #[getter(copy)]
    current_turn: Side,
    /// Terminal flag.
    #[getter(copy)]
    game_over: bool,
    /// Winner, present only for a decided game.
    #[getter(copy)]
    winner: Option<Side>,
}

impl GameState {
    /// Creates a game state, enforcing that a winner implies a finished game.
    pub fn new(
        board: Board,
        current_turn: Side,
        game_over: bool,
        winner: Option<Side>,
    ) -> Result<Self, StateError> {
        if winner.is_some() && !game_over {
            return Err(StateError::WinnerWithoutGameOver);
        }
        Ok(Self {
            board,
            current_turn,
            game_over,
            winner,
        })
    }

    /// True when the game ended without a winner.
    pub fn is_draw(&self) -> bool {
        self.game_over && self.winner.is_none()
    }

    /// One-line summary of whose turn it is or how the game ended.
    pub fn summary(&self) -> String {
        match (self.game_over, self.winner) {
            (true, Some(side)) => format!("Game over! Winner: {}", side),
            (true, None) => "Game over! Draw.".to_string(),
            (false, _) => format!("{} to move", self.current_turn),
        }
    }
}

/// Wire shape of a game state before validation.
///
/// Extra fields (such as the service's `message`) are ignored.
#[derive(Debug, Deserialize)]
struct RawGameState {
    board: Board,
    current_turn: Side,
    game_over: bool,
    #[serde(default)]
    winner: Option<Side>,
}

impl TryFrom<RawGameState> for GameState {
    type Error = StateError;

    fn try_from(raw: RawGameState) -> Result<Self, Self::Error> {
        GameState::new(raw.board, raw.current_turn, raw.game_over, raw.winner)
    }
}

/// A service payload that violates the game-state schema.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum StateError {
    /// The board has no cells.
    #[display("board is empty")]
    EmptyBoard,
    /// A row's length differs from the first row's.
    #[display("row {} has {} cells, expected {}", row, found, expected)]
    RaggedBoard {
        /// Offending row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A cell value outside 0..=2.
    #[display("unknown cell value {}", _0)]
    UnknownStone(#[error(not(source))] u8),
    /// A side value outside 1..=2.
    #[display("unknown side value {}", _0)]
    UnknownSide(#[error(not(source))] u8),
    /// A winner was reported for a game that is not over.
    #[display("winner reported while the game is still in progress")]
    WinnerWithoutGameOver,
}
