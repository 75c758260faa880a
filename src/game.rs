//! Per-session guess tracking.
//!
//! [`GameState`] is the inference side: it owns the live fleet set and
//! narrows it with every recorded guess. [`OracleGame`] adds a hidden fleet
//! that answers guesses, which is what an external game loop plays against.

use std::sync::Arc;

use log::{debug, trace, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::adjacency::AdjacencyIndex;
use crate::bitboard::CellMask;
use crate::common::{Coordinate, Guess, GuessOutcome, InferenceError, Result, SessionStatus};
use crate::config::FleetConfig;
use crate::constraint::ConstrainedSearch;
use crate::probability::{Heatmap, ProbabilityAggregator};
use crate::sampler::{random_fleet, SamplerLimits};
use crate::search::{Fleet, FleetSearch};

/// Fleets from `fleets` that would have produced `guess`.
///
/// Filtering twice with the same guess gives the same set as filtering once.
pub fn filter_fleets(fleets: &[Fleet], guess: &Guess) -> Vec<Fleet> {
    fleets
        .iter()
        .filter(|f| f.consistent_with(guess))
        .cloned()
        .collect()
}

#[cfg(feature = "parallel")]
fn count_consistent(fleets: &[Fleet], guess: &Guess) -> usize {
    use rayon::prelude::*;
    fleets.par_iter().filter(|f| f.consistent_with(guess)).count()
}

#[cfg(not(feature = "parallel"))]
fn count_consistent(fleets: &[Fleet], guess: &Guess) -> usize {
    fleets.iter().filter(|f| f.consistent_with(guess)).count()
}

/// How a session holds its live fleet set.
enum LiveSet {
    /// Every consistent fleet, materialized.
    Enumerated(Vec<Fleet>),
    /// Too many fleets to hold. The hit/miss masks are the set; `witness` is
    /// one fleet known to satisfy them.
    Constrained { witness: Fleet },
}

/// Inference-mode session: guess history plus every fleet still consistent
/// with it.
///
/// Small configurations are enumerated at construction and filtered on each
/// guess. When the catalog sizes admit more fleets than the configured fleet
/// limit, the session keeps only its hit and miss masks and searches them
/// lazily, estimating the heatmap from sampled fleets. It switches to the
/// exact set once the consistent fleets number no more than the sample count.
pub struct GameState {
    config: FleetConfig,
    index: Arc<AdjacencyIndex>,
    history: Vec<Guess>,
    hits: CellMask,
    misses: CellMask,
    live: LiveSet,
}

impl GameState {
    /// Start a session. Where the fleet set fits under the fleet limit it is
    /// enumerated here, once; later guesses only ever filter it.
    pub fn new(config: FleetConfig) -> Result<Self> {
        config.validate()?;
        let search = FleetSearch::for_config(&config)?;
        let n = config.board_size();
        let mut state = GameState {
            index: Arc::clone(search.index()),
            history: Vec::new(),
            hits: CellMask::new(n),
            misses: CellMask::new(n),
            live: LiveSet::Enumerated(Vec::new()),
            config,
        };

        if search.upper_bound() <= state.config.fleet_limit() {
            #[cfg(feature = "parallel")]
            let live = search.enumerate_parallel(state.config.fleet_limit())?;
            #[cfg(not(feature = "parallel"))]
            let live = search.enumerate(state.config.fleet_limit())?;
            state.live = LiveSet::Enumerated(live);
        } else {
            let first = state.constrained().first();
            state.live = match first {
                Some(witness) => LiveSet::Constrained { witness },
                None => LiveSet::Enumerated(Vec::new()),
            };
            state.try_materialize();
        }

        if !state.is_satisfiable() {
            return Err(InferenceError::Configuration(format!(
                "fleet {:?} cannot be placed on a {}x{} board without touching",
                state.config.fleet(),
                n,
                n
            )));
        }
        debug!(
            "new session on {}x{} with fleet {:?}: {}",
            n,
            n,
            state.config.fleet(),
            match state.live_fleets() {
                Some(live) => format!("{} fleets", live.len()),
                None => "held as constraints".to_string(),
            }
        );
        Ok(state)
    }

    fn constrained(&self) -> ConstrainedSearch<'_> {
        ConstrainedSearch::new(&self.index, &self.hits, &self.misses)
    }

    /// Swap a constrained set for the exact one when it is small enough.
    fn try_materialize(&mut self) {
        if let LiveSet::Enumerated(_) = self.live {
            return;
        }
        let threshold = self.config.sample_count().min(self.config.fleet_limit());
        let narrowed = self.constrained().enumerate(threshold);
        if let Ok(live) = narrowed {
            debug!("fleet set narrowed to {} fleets, now exact", live.len());
            self.live = LiveSet::Enumerated(live);
        }
    }

    pub fn config(&self) -> &FleetConfig {
        &self.config
    }

    pub fn index(&self) -> &Arc<AdjacencyIndex> {
        &self.index
    }

    /// Guesses in the order they were applied.
    pub fn history(&self) -> &[Guess] {
        &self.history
    }

    pub fn hits(&self) -> &CellMask {
        &self.hits
    }

    pub fn misses(&self) -> &CellMask {
        &self.misses
    }

    /// Every cell guessed so far.
    pub fn guessed(&self) -> CellMask {
        &self.hits | &self.misses
    }

    /// The live fleets, or `None` while the set is held as constraints.
    pub fn live_fleets(&self) -> Option<&[Fleet]> {
        match &self.live {
            LiveSet::Enumerated(live) => Some(live),
            LiveSet::Constrained { .. } => None,
        }
    }

    /// True once the live set is held as an explicit list of fleets.
    pub fn is_exact(&self) -> bool {
        self.live_fleets().is_some()
    }

    /// Number of live fleets. A constrained set is counted by search and
    /// fails with `FleetLimitExceeded` past the fleet limit.
    pub fn live_fleet_count(&self) -> Result<usize> {
        match &self.live {
            LiveSet::Enumerated(live) => Ok(live.len()),
            LiveSet::Constrained { .. } => self.constrained().count(self.config.fleet_limit()),
        }
    }

    pub fn is_satisfiable(&self) -> bool {
        match &self.live {
            LiveSet::Enumerated(live) => !live.is_empty(),
            LiveSet::Constrained { .. } => true,
        }
    }

    /// Whether `fleet` is a fleet of this configuration consistent with
    /// every guess so far.
    pub fn admits(&self, fleet: &Fleet) -> bool {
        match &self.live {
            LiveSet::Enumerated(live) => live.contains(fleet),
            LiveSet::Constrained { .. } => {
                let rebuilt = Fleet::from_placements(
                    &self.index,
                    fleet.placements().iter().map(|p| (**p).clone()),
                );
                matches!(rebuilt, Ok(ref f) if f == fleet)
                    && self.history.iter().all(|g| fleet.consistent_with(g))
            }
        }
    }

    /// Reject coordinates that are off the board or already guessed.
    pub fn check_guess(&self, coord: Coordinate) -> Result<()> {
        let n = self.config.board_size();
        if coord.row >= n || coord.col >= n {
            return Err(InferenceError::OutOfBounds {
                coord,
                board_size: n,
            });
        }
        if self.hits.contains(coord.row, coord.col) || self.misses.contains(coord.row, coord.col)
        {
            return Err(InferenceError::DuplicateGuess { coord });
        }
        Ok(())
    }

    /// Record a guess and narrow the live set to fleets consistent with it.
    /// Returns the new live count, or `None` while the set is held as
    /// constraints. On error the session is left untouched.
    pub fn apply_guess(
        &mut self,
        coord: impl Into<Coordinate>,
        outcome: GuessOutcome,
    ) -> Result<Option<usize>> {
        let guess = Guess::new(coord, outcome);
        if let Err(err) = self.check_guess(guess.coord) {
            warn!("rejected guess {:?}: {}", guess, err);
            return Err(err);
        }

        let mut hits = self.hits.clone();
        let mut misses = self.misses.clone();
        let mask = match outcome {
            GuessOutcome::Hit => &mut hits,
            GuessOutcome::Miss => &mut misses,
        };
        // In bounds: checked above.
        let _ = mask.set(guess.coord.row, guess.coord.col);

        match &mut self.live {
            LiveSet::Enumerated(live) => {
                if count_consistent(live, &guess) == 0 {
                    warn!("guess {:?} contradicts every live fleet", guess);
                    return Err(InferenceError::Unsatisfiable);
                }
                live.retain(|f| f.consistent_with(&guess));
            }
            LiveSet::Constrained { witness } => {
                if !witness.consistent_with(&guess) {
                    match ConstrainedSearch::new(&self.index, &hits, &misses).first() {
                        Some(found) => *witness = found,
                        None => {
                            warn!("guess {:?} contradicts every live fleet", guess);
                            return Err(InferenceError::Unsatisfiable);
                        }
                    }
                }
            }
        }

        self.hits = hits;
        self.misses = misses;
        self.history.push(guess);
        self.try_materialize();
        let live = self.live_fleets().map(<[Fleet]>::len);
        trace!("guess {} -> {:?}: {:?} live fleets", guess.coord, outcome, live);
        Ok(live)
    }

    /// Occupancy counts and suggestion over the live set. A constrained set
    /// is estimated from `sample_count` drawn fleets; the draws are seeded by
    /// the guess history, so the same session state gives the same heatmap.
    pub fn heatmap(&self) -> Result<Heatmap> {
        match &self.live {
            LiveSet::Enumerated(live) => ProbabilityAggregator::compute(live, &self.guessed()),
            LiveSet::Constrained { .. } => {
                let search = self.constrained();
                let mut rng = SmallRng::seed_from_u64(self.history.len() as u64);
                let drawn: Vec<Fleet> = (0..self.config.sample_count())
                    .filter_map(|_| search.sample(&mut rng))
                    .collect();
                ProbabilityAggregator::compute(&drawn, &self.guessed())
            }
        }
    }

    /// Per-cell probability that a boat occupies the cell, rows first.
    pub fn probability_grid(&self) -> Result<Vec<Vec<f64>>> {
        Ok(self.heatmap()?.grid())
    }

    /// Most likely unguessed cell, or `None` when every cell was guessed.
    pub fn suggested_coordinate(&self) -> Result<Option<Coordinate>> {
        Ok(self.heatmap()?.suggestion())
    }

    /// `Won` once a single fleet remains and all of its cells were hit.
    pub fn status(&self) -> SessionStatus {
        let won = match &self.live {
            LiveSet::Enumerated(live) => {
                matches!(live.as_slice(), [only] if only.cells().is_subset(&self.hits))
            }
            // The witness covers every hit; with as many hits as boat cells
            // its cells are exactly the hits.
            LiveSet::Constrained { .. } => self.hits.count_ones() == self.config.total_cells(),
        };
        if won {
            SessionStatus::Won
        } else {
            SessionStatus::InProgress
        }
    }
}

/// Oracle-mode session: a hidden fleet answers every guess, and the answers
/// feed an inference [`GameState`].
pub struct OracleGame {
    state: GameState,
    hidden: Fleet,
}

impl OracleGame {
    /// Play against `hidden`, which must be one of the configuration's fleets.
    pub fn new(config: FleetConfig, hidden: Fleet) -> Result<Self> {
        let state = GameState::new(config)?;
        if !state.admits(&hidden) {
            return Err(InferenceError::Configuration(format!(
                "hidden fleet {:?} is not a fleet of {:?}",
                hidden,
                state.config.fleet()
            )));
        }
        Ok(OracleGame { state, hidden })
    }

    /// Play against a randomly placed fleet.
    pub fn random<R: Rng + ?Sized>(config: FleetConfig, rng: &mut R) -> Result<Self> {
        let index = AdjacencyIndex::shared(&config)?;
        let hidden = random_fleet(&index, rng, SamplerLimits::default())?;
        Self::new(config, hidden)
    }

    /// Guess `coord`; the hidden fleet decides the outcome.
    pub fn fire(&mut self, coord: impl Into<Coordinate>) -> Result<GuessOutcome> {
        let coord = coord.into();
        let outcome = GuessOutcome::from_occupied(self.hidden.covers(coord));
        self.state.apply_guess(coord, outcome)?;
        Ok(outcome)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn hidden(&self) -> &Fleet {
        &self.hidden
    }

    /// `Won` once every cell of the hidden fleet was hit.
    pub fn status(&self) -> SessionStatus {
        if self.hidden.cells().is_subset(self.state.hits()) {
            SessionStatus::Won
        } else {
            SessionStatus::InProgress
        }
    }
}
