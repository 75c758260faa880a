//! Exclusion masks and precomputed pairwise compatibility of placements.
//!
//! A placement forbids its own cells and their full 8-neighbourhood to every
//! other boat. Two placements are compatible when neither lands in the
//! other's exclusion mask; because Chebyshev distance is symmetric, testing
//! one direction is enough.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::debug;
use once_cell::sync::Lazy;

use crate::bitboard::CellMask;
use crate::catalog::{PlacementCatalog, Placements};
use crate::common::Result;
use crate::config::FleetConfig;
use crate::ship::Placement;

static INDICES: Lazy<Mutex<HashMap<(usize, Vec<usize>), Arc<AdjacencyIndex>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Cells within Chebyshev distance 1 of any cell of `placement`, clipped to
/// the board.
pub fn exclusion_mask(placement: &Placement) -> CellMask {
    let n = placement.board_size();
    let mut mask = CellMask::new(n);
    for c in placement.cells() {
        for r in c.row.saturating_sub(1)..=(c.row + 1).min(n - 1) {
            for col in c.col.saturating_sub(1)..=(c.col + 1).min(n - 1) {
                let _ = mask.set(r, col);
            }
        }
    }
    mask
}

/// Direct compatibility test without an index.
pub fn compatible(a: &Placement, b: &Placement) -> bool {
    !exclusion_mask(a).intersects(b.mask())
}

/// Placements of one boat length with their exclusion masks.
struct LengthGroup {
    length: usize,
    placements: Placements,
    exclusions: Vec<CellMask>,
}

/// Row-major bit table, `rows × cols`.
struct CompatTable {
    cols: usize,
    bits: Vec<u64>,
}

impl CompatTable {
    fn build(a: &LengthGroup, b: &LengthGroup) -> Self {
        let cols = b.placements.len();
        let total = a.placements.len() * cols;
        let mut bits = vec![0u64; total.div_ceil(64)];
        for (i, excl) in a.exclusions.iter().enumerate() {
            for (j, other) in b.placements.iter().enumerate() {
                if !excl.intersects(other.mask()) {
                    let idx = i * cols + j;
                    bits[idx / 64] |= 1 << (idx % 64);
                }
            }
        }
        CompatTable { cols, bits }
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> bool {
        let idx = i * self.cols + j;
        (self.bits[idx / 64] >> (idx % 64)) & 1 == 1
    }
}

/// Per-configuration compatibility index.
///
/// Each entry of the fleet list is a *slot*. Slots of the same
/// length share one catalog, so a compatibility table exists for every
/// ordered pair of distinct lengths, a length paired with itself included.
pub struct AdjacencyIndex {
    board_size: usize,
    fleet: Vec<usize>,
    slot_group: Vec<usize>,
    groups: Vec<LengthGroup>,
    tables: Vec<CompatTable>,
}

impl AdjacencyIndex {
    /// Build the index for `config`.
    pub fn new(config: &FleetConfig) -> Result<Self> {
        config.validate()?;
        let board_size = config.board_size();

        let mut lengths: Vec<usize> = config.fleet().to_vec();
        lengths.sort_unstable();
        lengths.dedup();

        let mut groups = Vec::with_capacity(lengths.len());
        for &length in &lengths {
            let placements = PlacementCatalog::generate(board_size, length)?;
            let exclusions = placements.iter().map(|p| exclusion_mask(p)).collect();
            groups.push(LengthGroup {
                length,
                placements,
                exclusions,
            });
        }

        let mut tables = Vec::with_capacity(groups.len() * groups.len());
        for a in &groups {
            for b in &groups {
                tables.push(CompatTable::build(a, b));
            }
        }

        let slot_group = config
            .fleet()
            .iter()
            .map(|len| groups.iter().position(|g| g.length == *len).unwrap_or(0))
            .collect();

        debug!(
            "built adjacency index for {:?} on {}x{} ({} tables)",
            config.fleet(),
            board_size,
            board_size,
            tables.len()
        );
        Ok(AdjacencyIndex {
            board_size,
            fleet: config.fleet().to_vec(),
            slot_group,
            groups,
            tables,
        })
    }

    /// Process-wide shared index for `config`, built on first use.
    pub fn shared(config: &FleetConfig) -> Result<Arc<Self>> {
        let key = (config.board_size(), config.fleet().to_vec());
        if let Some(found) = INDICES
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
        {
            return Ok(Arc::clone(found));
        }
        // Built unlocked; a racing build of the same key loses to the first insert.
        let built = Arc::new(Self::new(config)?);
        let mut cache = INDICES.lock().unwrap_or_else(|e| e.into_inner());
        Ok(Arc::clone(cache.entry(key).or_insert(built)))
    }

    pub fn board_size(&self) -> usize {
        self.board_size
    }

    /// Boat length of every slot, in fleet list order.
    pub fn fleet(&self) -> &[usize] {
        &self.fleet
    }

    pub fn slot_count(&self) -> usize {
        self.fleet.len()
    }

    /// Candidate placements for `slot`.
    pub fn placements(&self, slot: usize) -> &Placements {
        &self.groups[self.slot_group[slot]].placements
    }

    /// Exclusion mask of placement `i` of `slot`.
    pub fn exclusion(&self, slot: usize, i: usize) -> &CellMask {
        &self.groups[self.slot_group[slot]].exclusions[i]
    }

    /// True when the two slots draw from the same catalog.
    pub fn same_length(&self, slot_a: usize, slot_b: usize) -> bool {
        self.slot_group[slot_a] == self.slot_group[slot_b]
    }

    /// O(1) compatibility of placement `i` of `slot_a` with placement `j`
    /// of `slot_b`.
    #[inline]
    pub fn compatible(&self, slot_a: usize, i: usize, slot_b: usize, j: usize) -> bool {
        let (ga, gb) = (self.slot_group[slot_a], self.slot_group[slot_b]);
        self.tables[ga * self.groups.len() + gb].get(i, j)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ship::Orientation;

    #[test]
    fn corner_exclusion_is_clipped() {
        let p = Placement::new(6, 2, Orientation::Horizontal, (0, 0)).unwrap();
        let mask = exclusion_mask(&p);
        // 2 boat cells widen to a 2×3 block in the corner.
        assert_eq!(mask.count_ones(), 6);
        assert!(mask.contains(1, 2));
        assert!(!mask.contains(0, 3));
    }

    #[test]
    fn diagonal_touch_is_incompatible() {
        let a = Placement::new(6, 2, Orientation::Horizontal, (0, 0)).unwrap();
        let b = Placement::new(6, 2, Orientation::Horizontal, (1, 2)).unwrap();
        let c = Placement::new(6, 2, Orientation::Horizontal, (2, 2)).unwrap();
        assert!(!compatible(&a, &b));
        assert!(compatible(&a, &c));
    }
}
