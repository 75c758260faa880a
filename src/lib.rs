//! Inference over Battleship fleet placements.
//!
//! Given a board size and a fleet list, the crate enumerates every
//! arrangement of boats that obeys the spacing rule (no overlap, no touching,
//! diagonals included), narrows that set as hit/miss guesses arrive, and turns
//! what is left into a per-cell occupancy probability and a suggested next
//! guess.
//!
//! ```
//! use fleet_inference::{FleetConfig, GameState, GuessOutcome};
//!
//! let config = FleetConfig::new(6, vec![3]).unwrap();
//! let mut state = GameState::new(config).unwrap();
//! state.apply_guess((0, 0), GuessOutcome::Miss).unwrap();
//! state.apply_guess((5, 5), GuessOutcome::Hit).unwrap();
//! assert!(state.is_satisfiable());
//! assert_eq!(state.live_fleet_count(), Ok(2));
//! ```

mod adjacency;
mod bitboard;
mod catalog;
mod common;
mod config;
mod constraint;
mod game;
mod logging;
mod probability;
mod sampler;
mod search;
mod ship;

pub use adjacency::{compatible, exclusion_mask, AdjacencyIndex};
pub use bitboard::{BitBoard, BitBoardError, CellMask, SetBits};
pub use catalog::{PlacementCatalog, Placements};
pub use common::*;
pub use config::*;
pub use constraint::ConstrainedSearch;
pub use game::{filter_fleets, GameState, OracleGame};
pub use logging::init_logging;
pub use probability::{Heatmap, ProbabilityAggregator};
pub use sampler::{random_fleet, SamplerLimits};
pub use search::{Fleet, FleetIter, FleetSearch};
pub use ship::{Orientation, Placement};
