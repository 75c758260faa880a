//! Common types: coordinates, guess outcomes, session status and errors.

use core::fmt;

use thiserror::Error;

/// A board cell, addressed as `(row, col)`.
///
/// Ordering is row-major, which is also the tie-break order used when
/// suggesting the next guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coordinate {
    pub row: usize,
    pub col: usize,
}

impl Coordinate {
    /// Construct a coordinate from `row` and `col`.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Chebyshev (king-move) distance between two cells.
    pub fn chebyshev(&self, other: &Coordinate) -> usize {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }
}

impl From<(usize, usize)> for Coordinate {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

impl From<Coordinate> for (usize, usize) {
    fn from(coord: Coordinate) -> Self {
        (coord.row, coord.col)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Result of a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuessOutcome {
    /// The guessed cell is occupied by a boat.
    Hit,
    /// The guessed cell is water.
    Miss,
}

impl GuessOutcome {
    /// Outcome for a cell whose occupancy is `occupied`.
    pub fn from_occupied(occupied: bool) -> Self {
        if occupied {
            GuessOutcome::Hit
        } else {
            GuessOutcome::Miss
        }
    }

    pub fn is_hit(self) -> bool {
        self == GuessOutcome::Hit
    }
}

/// A recorded guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guess {
    pub coord: Coordinate,
    pub outcome: GuessOutcome,
}

impl Guess {
    pub fn new(coord: impl Into<Coordinate>, outcome: GuessOutcome) -> Self {
        Self {
            coord: coord.into(),
            outcome,
        }
    }
}

/// Current status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    InProgress,
    Won,
}

/// Errors returned by the inference core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    /// The board size / fleet list cannot describe any game.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// The coordinate was already guessed in this session.
    #[error("coordinate {coord} was already guessed")]
    DuplicateGuess { coord: Coordinate },
    /// The coordinate lies outside the board.
    #[error("coordinate {coord} is outside the {board_size}x{board_size} board")]
    OutOfBounds {
        coord: Coordinate,
        board_size: usize,
    },
    /// No fleet is consistent with the guesses.
    #[error("no fleet is consistent with the recorded guesses")]
    Unsatisfiable,
    /// Eager enumeration would exceed the configured number of fleets.
    #[error("fleet enumeration exceeds the limit of {limit} fleets")]
    FleetLimitExceeded { limit: usize },
    /// Random placement gave up after the configured number of restarts.
    #[error("unable to place fleet after {restarts} restarts")]
    PlacementExhausted { restarts: usize },
}

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, InferenceError>;
