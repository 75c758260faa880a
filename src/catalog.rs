//! Enumeration of every legal placement of one boat length.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::debug;
use once_cell::sync::Lazy;

use crate::common::{Coordinate, InferenceError, Result};
use crate::ship::{Orientation, Placement};

/// Shared, immutable list of placements.
pub type Placements = Arc<[Arc<Placement>]>;

/// Catalogs built so far, keyed by `(board_size, length)`.
static CATALOGS: Lazy<Mutex<HashMap<(usize, usize), Placements>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Every legal placement of one boat length on a square board.
///
/// Horizontal placements come first, then vertical ones; within an
/// orientation they are ordered row-major by origin. This order is what makes
/// fleet enumeration reproducible.
pub struct PlacementCatalog;

impl PlacementCatalog {
    /// All placements of a boat of `length` on a `board_size×board_size`
    /// board, in both orientations. Cached for the life of the process.
    pub fn generate(board_size: usize, length: usize) -> Result<Placements> {
        check(board_size, length)?;
        // Entries are inserted whole, so a poisoned map is still consistent.
        if let Some(found) = CATALOGS
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(board_size, length))
        {
            return Ok(Arc::clone(found));
        }
        let built = Self::build(board_size, length)?;
        debug!(
            "built placement catalog for length {} on {}x{}: {} placements",
            length,
            board_size,
            board_size,
            built.len()
        );
        let mut cache = CATALOGS.lock().unwrap_or_else(|e| e.into_inner());
        Ok(Arc::clone(
            cache.entry((board_size, length)).or_insert(built),
        ))
    }

    /// Placements of a single orientation, uncached.
    pub fn for_orientation(
        board_size: usize,
        length: usize,
        orientation: Orientation,
    ) -> Result<Vec<Placement>> {
        check(board_size, length)?;
        // There are exactly `N - L + 1` start offsets along the boat's axis.
        let span = board_size - length + 1;
        let (rows, cols) = match orientation {
            Orientation::Horizontal => (board_size, span),
            Orientation::Vertical => (span, board_size),
        };
        let mut out = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                out.push(Placement::new(
                    board_size,
                    length,
                    orientation,
                    Coordinate::new(r, c),
                )?);
            }
        }
        Ok(out)
    }

    fn build(board_size: usize, length: usize) -> Result<Placements> {
        let mut all = Self::for_orientation(board_size, length, Orientation::Horizontal)?;
        // A single cell looks the same either way round.
        if length > 1 {
            all.extend(Self::for_orientation(
                board_size,
                length,
                Orientation::Vertical,
            )?);
        }
        Ok(all.into_iter().map(Arc::new).collect())
    }
}

fn check(board_size: usize, length: usize) -> Result<()> {
    if board_size == 0 || length == 0 {
        return Err(InferenceError::Configuration(format!(
            "cannot place a boat of length {} on a {}x{} board",
            length, board_size, board_size
        )));
    }
    if length > board_size {
        return Err(InferenceError::Configuration(format!(
            "boat of length {} does not fit on a {}x{} board",
            length, board_size, board_size
        )));
    }
    Ok(())
}
