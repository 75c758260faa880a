//! Random placement of a single concrete fleet, with bounded retries.

use std::sync::Arc;

use log::debug;
use rand::Rng;

use crate::adjacency::AdjacencyIndex;
use crate::common::{InferenceError, Result};
use crate::search::{Fleet, FleetSearch};

/// Retry bounds for [`random_fleet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerLimits {
    /// Random draws per boat before the fleet is started over.
    pub attempts_per_boat: usize,
    /// Times the whole fleet may be started over before giving up.
    pub max_restarts: usize,
}

impl Default for SamplerLimits {
    fn default() -> Self {
        SamplerLimits {
            attempts_per_boat: 1000,
            max_restarts: 100,
        }
    }
}

/// Place every boat of the index's fleet at random, each away from the
/// others. Boats go down in fleet list order; a boat that finds no spot
/// within `attempts_per_boat` draws restarts the whole fleet.
///
/// Fails with `Configuration` if the fleet cannot be placed at all, and with
/// `PlacementExhausted` if the retry budget runs out first.
pub fn random_fleet<R: Rng + ?Sized>(
    index: &Arc<AdjacencyIndex>,
    rng: &mut R,
    limits: SamplerLimits,
) -> Result<Fleet> {
    if FleetSearch::new(Arc::clone(index)).iter().next().is_none() {
        return Err(InferenceError::Configuration(format!(
            "fleet {:?} cannot be placed on a {}x{} board without touching",
            index.fleet(),
            index.board_size(),
            index.board_size()
        )));
    }

    let slots = index.slot_count();
    'restart: for restart in 0..=limits.max_restarts {
        let mut picks: Vec<usize> = Vec::with_capacity(slots);
        for slot in 0..slots {
            let n = index.placements(slot).len();
            let found = (0..limits.attempts_per_boat)
                .map(|_| rng.random_range(0..n))
                .find(|&candidate| {
                    picks
                        .iter()
                        .enumerate()
                        .all(|(other, &pick)| index.compatible(other, pick, slot, candidate))
                });
            match found {
                Some(candidate) => picks.push(candidate),
                None => {
                    debug!("no spot for boat {} on try {}, restarting", slot, restart);
                    continue 'restart;
                }
            }
        }
        canonicalize(index, &mut picks);
        return Ok(Fleet::from_picks(index, picks.into_boxed_slice()));
    }
    Err(InferenceError::PlacementExhausted {
        restarts: limits.max_restarts,
    })
}

/// Sort the picks of equal-length slots so the fleet matches the one
/// enumeration would produce.
pub(crate) fn canonicalize(index: &AdjacencyIndex, picks: &mut [usize]) {
    for slot in 0..picks.len() {
        let twins: Vec<usize> = (slot..picks.len())
            .filter(|&other| index.same_length(slot, other))
            .collect();
        if twins.len() < 2 || (0..slot).any(|earlier| index.same_length(earlier, slot)) {
            continue;
        }
        let mut values: Vec<usize> = twins.iter().map(|&s| picks[s]).collect();
        values.sort_unstable();
        for (&s, v) in twins.iter().zip(values) {
            picks[s] = v;
        }
    }
}
