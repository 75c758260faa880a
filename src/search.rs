//! Backtracking enumeration of compatible fleets.

use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use log::debug;

use crate::adjacency::AdjacencyIndex;
use crate::bitboard::CellMask;
use crate::common::{Coordinate, Guess, GuessOutcome, InferenceError, Result};
use crate::config::FleetConfig;
use crate::ship::Placement;

/// One complete assignment of placements, one per slot of the fleet
/// list, pairwise compatible.
///
/// Where the fleet list repeats a length, the placements of those slots
/// are stored in increasing catalog order, so each physical arrangement of
/// boats is exactly one `Fleet`.
#[derive(Clone)]
pub struct Fleet {
    placements: Box<[Arc<Placement>]>,
    picks: Box<[usize]>,
    cells: CellMask,
}

impl Fleet {
    /// Assemble a fleet from catalog indices, one per slot in fleet list
    /// order. Compatibility is the caller's responsibility.
    pub(crate) fn from_picks(index: &AdjacencyIndex, picks: Box<[usize]>) -> Self {
        let mut cells = CellMask::new(index.board_size());
        let placements: Box<[Arc<Placement>]> = picks
            .iter()
            .enumerate()
            .map(|(slot, &i)| {
                let p = Arc::clone(&index.placements(slot)[i]);
                cells |= p.mask();
                p
            })
            .collect();
        Fleet {
            placements,
            picks,
            cells,
        }
    }

    /// Build a fleet from explicit placements, checking that they match the
    /// index's fleet list and obey the spacing rule.
    pub fn from_placements(
        index: &AdjacencyIndex,
        placements: impl IntoIterator<Item = Placement>,
    ) -> Result<Self> {
        // Resolve each placement to its catalog position.
        let mut pool: Vec<(usize, usize)> = Vec::new();
        for p in placements {
            let slot = index
                .fleet()
                .iter()
                .position(|&len| len == p.length())
                .ok_or_else(|| {
                    InferenceError::Configuration(format!(
                        "no boat of length {} in fleet {:?}",
                        p.length(),
                        index.fleet()
                    ))
                })?;
            let i = index
                .placements(slot)
                .iter()
                .position(|candidate| **candidate == p)
                .ok_or_else(|| {
                    InferenceError::Configuration(format!("{:?} is not on the board", p))
                })?;
            pool.push((p.length(), i));
        }
        if pool.len() != index.slot_count() {
            return Err(InferenceError::Configuration(format!(
                "expected {} boats, got {}",
                index.slot_count(),
                pool.len()
            )));
        }
        pool.sort_unstable();

        let mut picks = Vec::with_capacity(index.slot_count());
        for &len in index.fleet() {
            let pos = pool
                .iter()
                .position(|&(l, _)| l == len)
                .ok_or_else(|| {
                    InferenceError::Configuration(format!(
                        "fleet is missing a boat of length {}",
                        len
                    ))
                })?;
            picks.push(pool.remove(pos).1);
        }

        for a in 0..picks.len() {
            for b in (a + 1)..picks.len() {
                if !index.compatible(a, picks[a], b, picks[b]) {
                    return Err(InferenceError::Configuration(format!(
                        "boats {} and {} overlap or touch",
                        a, b
                    )));
                }
            }
        }
        Ok(Self::from_picks(index, picks.into_boxed_slice()))
    }

    /// Placements in fleet list order.
    pub fn placements(&self) -> &[Arc<Placement>] {
        &self.placements
    }

    /// Catalog index of each slot's placement.
    pub fn picks(&self) -> &[usize] {
        &self.picks
    }

    /// Union of all boat cells.
    pub fn cells(&self) -> &CellMask {
        &self.cells
    }

    /// Returns `true` if some boat occupies `coord`.
    #[inline]
    pub fn covers(&self, coord: Coordinate) -> bool {
        self.cells.contains(coord.row, coord.col)
    }

    /// Whether this fleet would have produced `guess`.
    #[inline]
    pub fn consistent_with(&self, guess: &Guess) -> bool {
        match guess.outcome {
            GuessOutcome::Hit => self.covers(guess.coord),
            GuessOutcome::Miss => !self.covers(guess.coord),
        }
    }
}

impl PartialEq for Fleet {
    fn eq(&self, other: &Self) -> bool {
        self.placements == other.placements
    }
}

impl Eq for Fleet {}

impl Hash for Fleet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.placements.hash(state);
    }
}

impl fmt::Debug for Fleet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.placements.iter()).finish()
    }
}

/// Enumerates every fleet of a configuration.
///
/// Slots are searched fewest-placements first; each candidate is checked
/// against the placements already chosen through the index's O(1)
/// compatibility tables, so dead branches are cut as soon as they appear.
/// The emitted order depends only on the catalogs and this slot order.
pub struct FleetSearch {
    index: Arc<AdjacencyIndex>,
    order: Vec<usize>,
}

impl FleetSearch {
    pub fn new(index: Arc<AdjacencyIndex>) -> Self {
        let mut order: Vec<usize> = (0..index.slot_count()).collect();
        // Stable, so equal-length slots keep fleet list order.
        order.sort_by_key(|&slot| index.placements(slot).len());
        FleetSearch { index, order }
    }

    /// Search over the shared index for `config`.
    pub fn for_config(config: &FleetConfig) -> Result<Self> {
        Ok(Self::new(AdjacencyIndex::shared(config)?))
    }

    pub fn index(&self) -> &Arc<AdjacencyIndex> {
        &self.index
    }

    /// Slots in the order they are assigned.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Upper bound on the number of fleets: the product of the catalog
    /// sizes, divided by the orderings of equal-length boats. Saturates.
    pub fn upper_bound(&self) -> usize {
        let fleet = self.index.fleet();
        let mut bound: usize = 1;
        for slot in 0..fleet.len() {
            bound = bound.saturating_mul(self.index.placements(slot).len());
        }
        if bound == usize::MAX {
            return bound;
        }
        let mut seen: Vec<usize> = Vec::new();
        for &len in fleet {
            if seen.contains(&len) {
                continue;
            }
            seen.push(len);
            let twins = fleet.iter().filter(|&&l| l == len).count();
            bound /= (1..=twins).product::<usize>();
        }
        bound
    }

    /// Lazy depth-first sequence of fleets. Each call starts from scratch.
    pub fn iter(&self) -> FleetIter<'_> {
        FleetIter::new(self, None)
    }

    /// Materialize every fleet, failing once more than `limit` exist.
    pub fn enumerate(&self, limit: usize) -> Result<Vec<Fleet>> {
        let mut out = Vec::new();
        for fleet in self.iter() {
            if out.len() == limit {
                return Err(InferenceError::FleetLimitExceeded { limit });
            }
            out.push(fleet);
        }
        debug!("enumerated {} fleets for {:?}", out.len(), self.index.fleet());
        Ok(out)
    }

    /// Count fleets without materializing them.
    pub fn count(&self, limit: usize) -> Result<usize> {
        let mut it = self.iter();
        let mut n = 0;
        while it.advance() {
            if n == limit {
                return Err(InferenceError::FleetLimitExceeded { limit });
            }
            n += 1;
        }
        Ok(n)
    }

    /// Same result as [`enumerate`](Self::enumerate), with the first slot's
    /// candidates spread over the rayon pool.
    #[cfg(feature = "parallel")]
    pub fn enumerate_parallel(&self, limit: usize) -> Result<Vec<Fleet>> {
        use rayon::prelude::*;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let seen = AtomicUsize::new(0);
        let roots = self.index.placements(self.order[0]).len();
        let parts: Vec<Vec<Fleet>> = (0..roots)
            .into_par_iter()
            .map(|root| {
                let mut part = Vec::new();
                for fleet in FleetIter::new(self, Some(root)) {
                    if seen.fetch_add(1, Ordering::Relaxed) >= limit {
                        return Err(InferenceError::FleetLimitExceeded { limit });
                    }
                    part.push(fleet);
                }
                Ok(part)
            })
            .collect::<Result<_>>()?;
        let out: Vec<Fleet> = parts.into_iter().flatten().collect();
        debug!(
            "enumerated {} fleets for {:?} in parallel",
            out.len(),
            self.index.fleet()
        );
        Ok(out)
    }
}

/// Restartable depth-first fleet iterator. See [`FleetSearch::iter`].
pub struct FleetIter<'a> {
    search: &'a FleetSearch,
    /// Chosen catalog index per search depth.
    picks: Vec<usize>,
    /// Next candidate to try per search depth.
    cursor: Vec<usize>,
    /// Depth below which the iterator never backtracks.
    floor: usize,
    started: bool,
    done: bool,
}

impl<'a> FleetIter<'a> {
    fn new(search: &'a FleetSearch, root: Option<usize>) -> Self {
        let depth = search.order.len();
        let mut it = FleetIter {
            search,
            picks: Vec::with_capacity(depth),
            cursor: vec![0; depth],
            floor: 0,
            started: false,
            done: false,
        };
        if let Some(root) = root {
            it.picks.push(root);
            it.floor = 1;
            if depth > 1 {
                it.cursor[1] = it.start(1);
            }
        }
        it
    }

    /// First candidate worth trying at `depth`: past the last pick of any
    /// earlier equal-length slot, which keeps fleets canonical.
    fn start(&self, depth: usize) -> usize {
        let slot = self.search.order[depth];
        (0..depth)
            .rev()
            .find(|&d| self.search.index.same_length(self.search.order[d], slot))
            .map_or(0, |d| self.picks[d] + 1)
    }

    fn accepts(&self, depth: usize, candidate: usize) -> bool {
        let index = &self.search.index;
        let slot = self.search.order[depth];
        self.picks
            .iter()
            .enumerate()
            .all(|(d, &pick)| index.compatible(self.search.order[d], pick, slot, candidate))
    }

    fn next_candidate(&mut self, depth: usize) -> Option<usize> {
        let n = self.search.index.placements(self.search.order[depth]).len();
        while self.cursor[depth] < n {
            let c = self.cursor[depth];
            self.cursor[depth] += 1;
            if self.accepts(depth, c) {
                return Some(c);
            }
        }
        None
    }

    /// Move to the next complete assignment. Returns `false` when exhausted.
    fn advance(&mut self) -> bool {
        if self.done {
            return false;
        }
        let total = self.search.order.len();
        if self.started && self.picks.len() == total {
            self.picks.pop();
        }
        self.started = true;
        loop {
            let d = self.picks.len();
            if d < self.floor {
                self.done = true;
                return false;
            }
            if d == total {
                return true;
            }
            match self.next_candidate(d) {
                Some(c) => {
                    self.picks.push(c);
                    if d + 1 < total {
                        self.cursor[d + 1] = self.start(d + 1);
                    }
                }
                None if d == self.floor => {
                    self.done = true;
                    return false;
                }
                None => {
                    self.picks.pop();
                }
            }
        }
    }

    fn current(&self) -> Fleet {
        let mut by_slot = vec![0; self.picks.len()];
        for (d, &pick) in self.picks.iter().enumerate() {
            by_slot[self.search.order[d]] = pick;
        }
        Fleet::from_picks(&self.search.index, by_slot.into_boxed_slice())
    }
}

impl Iterator for FleetIter<'_> {
    type Item = Fleet;

    fn next(&mut self) -> Option<Fleet> {
        if self.advance() {
            Some(self.current())
        } else {
            None
        }
    }
}
