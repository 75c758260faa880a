//! Fleet search restricted to what the recorded guesses allow.
//!
//! A session whose fleet set is too large to hold keeps only its hit and miss
//! masks; this search walks the fleets consistent with them. Placements over
//! a miss, or touching a hit they do not cover, are dropped up front.
//! Branching follows the lowest hit no chosen boat covers yet, so a
//! contradiction surfaces within a few steps.

use std::ops::ControlFlow;

use rand::seq::SliceRandom;
use rand::RngCore;

use crate::adjacency::AdjacencyIndex;
use crate::bitboard::CellMask;
use crate::common::{Coordinate, InferenceError, Result};
use crate::sampler::canonicalize;
use crate::search::Fleet;

/// Fleets of an index consistent with a set of hits and misses.
pub struct ConstrainedSearch<'a> {
    index: &'a AdjacencyIndex,
    hits: &'a CellMask,
    /// Surviving catalog indices per slot.
    candidates: Vec<Vec<usize>>,
}

/// Partial assignment during a walk.
struct Walk<'r> {
    picks: Vec<Option<usize>>,
    /// Slots filled after every hit was covered.
    free: Vec<bool>,
    /// Shuffles the options at every step when set.
    rng: Option<&'r mut dyn RngCore>,
}

type Visit<'v> = dyn FnMut(Fleet) -> ControlFlow<()> + 'v;

impl<'a> ConstrainedSearch<'a> {
    pub fn new(index: &'a AdjacencyIndex, hits: &'a CellMask, misses: &CellMask) -> Self {
        let candidates = (0..index.slot_count())
            .map(|slot| {
                index
                    .placements(slot)
                    .iter()
                    .enumerate()
                    .filter(|&(i, p)| {
                        !p.mask().intersects(misses)
                            && (index.exclusion(slot, i) & hits).is_subset(p.mask())
                    })
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();
        ConstrainedSearch {
            index,
            hits,
            candidates,
        }
    }

    /// Some consistent fleet, or `None` if the guesses contradict each other.
    pub fn first(&self) -> Option<Fleet> {
        let mut found = None;
        self.walk(None, &mut |fleet| {
            found = Some(fleet);
            ControlFlow::Break(())
        });
        found
    }

    /// A consistent fleet found by a randomized walk. Not uniform over the
    /// consistent set, but every consistent fleet can be drawn.
    pub fn sample<R: RngCore>(&self, rng: &mut R) -> Option<Fleet> {
        let mut found = None;
        self.walk(Some(rng as &mut dyn RngCore), &mut |fleet| {
            found = Some(fleet);
            ControlFlow::Break(())
        });
        found
    }

    /// Every consistent fleet, failing once more than `limit` exist.
    pub fn enumerate(&self, limit: usize) -> Result<Vec<Fleet>> {
        let mut out = Vec::new();
        let mut over = false;
        self.walk(None, &mut |fleet| {
            if out.len() == limit {
                over = true;
                return ControlFlow::Break(());
            }
            out.push(fleet);
            ControlFlow::Continue(())
        });
        if over {
            Err(InferenceError::FleetLimitExceeded { limit })
        } else {
            Ok(out)
        }
    }

    /// Number of consistent fleets, failing once more than `limit` exist.
    pub fn count(&self, limit: usize) -> Result<usize> {
        let mut n = 0;
        let mut over = false;
        self.walk(None, &mut |_| {
            if n == limit {
                over = true;
                return ControlFlow::Break(());
            }
            n += 1;
            ControlFlow::Continue(())
        });
        if over {
            Err(InferenceError::FleetLimitExceeded { limit })
        } else {
            Ok(n)
        }
    }

    fn walk(&self, rng: Option<&mut dyn RngCore>, visit: &mut Visit<'_>) {
        let slots = self.index.slot_count();
        let mut walk = Walk {
            picks: vec![None; slots],
            free: vec![false; slots],
            rng,
        };
        let covered = CellMask::new(self.index.board_size());
        let _ = self.descend(&mut walk, &covered, visit);
    }

    fn fits(&self, walk: &Walk<'_>, slot: usize, candidate: usize) -> bool {
        walk.picks
            .iter()
            .enumerate()
            .filter_map(|(s, p)| p.map(|p| (s, p)))
            .all(|(s, p)| self.index.compatible(s, p, slot, candidate))
    }

    fn descend(
        &self,
        walk: &mut Walk<'_>,
        covered: &CellMask,
        visit: &mut Visit<'_>,
    ) -> ControlFlow<()> {
        let mut uncovered = self
            .hits
            .iter_set_bits()
            .filter(|&(r, c)| !covered.contains(r, c));
        let target = uncovered.next().map(Coordinate::from);
        let open: Vec<usize> = (0..walk.picks.len())
            .filter(|&s| walk.picks[s].is_none())
            .collect();

        if open.is_empty() {
            if target.is_some() {
                return ControlFlow::Continue(());
            }
            let mut picks: Vec<usize> = walk.picks.iter().flatten().copied().collect();
            canonicalize(self.index, &mut picks);
            return visit(Fleet::from_picks(self.index, picks.into_boxed_slice()));
        }
        let room: usize = open.iter().map(|&s| self.index.fleet()[s]).sum();
        if target.is_some() && 1 + uncovered.count() > room {
            return ControlFlow::Continue(());
        }

        let mut options: Vec<(usize, usize)> = Vec::new();
        match target {
            Some(coord) => {
                for &slot in &open {
                    // Equal-length slots are interchangeable here.
                    if open
                        .iter()
                        .any(|&o| o < slot && self.index.same_length(o, slot))
                    {
                        continue;
                    }
                    let placements = self.index.placements(slot);
                    options.extend(
                        self.candidates[slot]
                            .iter()
                            .filter(|&&i| placements[i].covers(coord) && self.fits(walk, slot, i))
                            .map(|&i| (slot, i)),
                    );
                }
            }
            None => {
                let slot = open[0];
                let floor = (0..slot)
                    .rev()
                    .find(|&s| walk.free[s] && self.index.same_length(s, slot))
                    .and_then(|s| walk.picks[s])
                    .map_or(0, |p| p + 1);
                options.extend(
                    self.candidates[slot]
                        .iter()
                        .filter(|&&i| i >= floor && self.fits(walk, slot, i))
                        .map(|&i| (slot, i)),
                );
            }
        }
        if let Some(rng) = walk.rng.as_deref_mut() {
            options.shuffle(rng);
        }

        for (slot, i) in options {
            let mut next = covered.clone();
            next |= self.index.placements(slot)[i].mask();
            walk.picks[slot] = Some(i);
            walk.free[slot] = target.is_none();
            let flow = self.descend(walk, &next, visit);
            walk.picks[slot] = None;
            walk.free[slot] = false;
            if flow.is_break() {
                return flow;
            }
        }
        ControlFlow::Continue(())
    }
}
