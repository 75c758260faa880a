//! Boat placements on the board.

use core::fmt;

use crate::bitboard::CellMask;
use crate::common::{Coordinate, InferenceError, Result};

/// Orientation of a boat on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Orientation {
    /// Cells advance along the columns of one row.
    Horizontal,
    /// Cells advance along the rows of one column.
    Vertical,
}

impl Orientation {
    /// Cell `offset` steps from `origin` along this orientation, or `None` if
    /// the index overflows.
    #[inline]
    fn step(self, origin: Coordinate, offset: usize) -> Option<Coordinate> {
        let (row, col) = match self {
            Orientation::Horizontal => (origin.row, origin.col.checked_add(offset)?),
            Orientation::Vertical => (origin.row.checked_add(offset)?, origin.col),
        };
        Some(Coordinate::new(row, col))
    }
}

/// One candidate position of a single boat: a contiguous straight line of
/// `length` cells starting at `origin`.
///
/// Equality and hashing are structural, so two placements built from the same
/// cells compare equal no matter where they were constructed.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Placement {
    length: usize,
    orientation: Orientation,
    cells: Box<[Coordinate]>,
    mask: CellMask,
}

impl Placement {
    /// Place a boat of `length` at `origin` with `orientation` on a
    /// `board_size×board_size` board.
    pub fn new(
        board_size: usize,
        length: usize,
        orientation: Orientation,
        origin: impl Into<Coordinate>,
    ) -> Result<Self> {
        let origin = origin.into();
        if length == 0 {
            return Err(InferenceError::Configuration(
                "boat length must be positive".into(),
            ));
        }
        // The last cell decides whether the whole line fits.
        let last = orientation
            .step(origin, length - 1)
            .ok_or(InferenceError::OutOfBounds {
                coord: origin,
                board_size,
            })?;
        if last.row >= board_size || last.col >= board_size {
            return Err(InferenceError::OutOfBounds {
                coord: last,
                board_size,
            });
        }

        let cells: Box<[Coordinate]> = (0..length)
            .filter_map(|i| orientation.step(origin, i))
            .collect();
        let mut mask = CellMask::new(board_size);
        for c in cells.iter() {
            mask.set(c.row, c.col).map_err(|_| InferenceError::OutOfBounds {
                coord: *c,
                board_size,
            })?;
        }
        Ok(Placement {
            length,
            orientation,
            cells,
            mask,
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// First cell of the line (top-most / left-most).
    pub fn origin(&self) -> Coordinate {
        self.cells[0]
    }

    /// Cells in order from the origin.
    pub fn cells(&self) -> &[Coordinate] {
        &self.cells
    }

    /// Occupancy mask of the boat on the board.
    pub fn mask(&self) -> &CellMask {
        &self.mask
    }

    pub fn board_size(&self) -> usize {
        self.mask.size()
    }

    /// Returns `true` if the boat occupies `coord`.
    #[inline]
    pub fn covers(&self, coord: Coordinate) -> bool {
        self.mask.contains(coord.row, coord.col)
    }
}

impl fmt::Debug for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Placement {{ length: {}, origin: {}, orientation: {:?} }}",
            self.length,
            self.origin(),
            self.orientation,
        )
    }
}
