// Occupancy aggregation over the live fleet set and next-guess selection.

use rand::Rng;

use crate::bitboard::CellMask;
use crate::common::{Coordinate, InferenceError, Result};
use crate::search::Fleet;

/// Live fleets handled per rayon task.
#[cfg(feature = "parallel")]
const CHUNK: usize = 4096;

/// Occupancy counts of a live fleet set.
#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    board_size: usize,
    counts: Vec<u64>,
    fleets: usize,
    suggestion: Option<Coordinate>,
}

impl Heatmap {
    pub fn board_size(&self) -> usize {
        self.board_size
    }

    /// Number of fleets the counts were taken over.
    pub fn fleet_count(&self) -> usize {
        self.fleets
    }

    /// Row-major per-cell counts.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Number of fleets occupying `coord`; zero off the board.
    pub fn count(&self, coord: Coordinate) -> u64 {
        if coord.row >= self.board_size || coord.col >= self.board_size {
            return 0;
        }
        self.counts[coord.row * self.board_size + coord.col]
    }

    /// Fraction of fleets occupying `coord`; zero off the board.
    pub fn probability(&self, coord: Coordinate) -> f64 {
        self.count(coord) as f64 / self.fleets as f64
    }

    pub fn grid(&self) -> Vec<Vec<f64>> {
        let total = self.fleets as f64;
        self.counts
            .chunks(self.board_size)
            .map(|row| row.iter().map(|&c| c as f64 / total).collect())
            .collect()
    }

    /// Highest-probability unguessed cell; ties go to the lowest row, then
    /// the lowest column.
    pub fn suggestion(&self) -> Option<Coordinate> {
        self.suggestion
    }

    /// Draw an unguessed cell with weight `p^(1/temperature)`. Lower
    /// temperatures concentrate on likely cells. Falls back to
    /// [`suggestion`](Self::suggestion) when no cell carries weight.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        temperature: f64,
        guessed: &CellMask,
    ) -> Option<Coordinate> {
        if temperature.is_nan() || temperature <= 0.0 {
            return self.suggestion;
        }
        let n = self.board_size;
        let weights: Vec<f64> = (0..n * n)
            .map(|i| {
                if guessed.contains(i / n, i % n) {
                    0.0
                } else {
                    (self.counts[i] as f64 / self.fleets as f64).powf(1.0 / temperature)
                }
            })
            .collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return self.suggestion;
        }
        let threshold: f64 = rng.random_range(0.0..total);
        let mut cumulative = 0.0;
        for (i, w) in weights.iter().enumerate() {
            cumulative += w;
            if *w > 0.0 && threshold < cumulative {
                return Some(Coordinate::new(i / n, i % n));
            }
        }
        // Rounding can leave the threshold just past the last bucket.
        weights
            .iter()
            .rposition(|&w| w > 0.0)
            .map(|i| Coordinate::new(i / n, i % n))
    }
}

/// Reduces a live fleet set to a [`Heatmap`].
pub struct ProbabilityAggregator;

impl ProbabilityAggregator {
    /// Count, for every cell, how many fleets in `live` occupy it, and pick
    /// the best cell not in `already_guessed`, which must cover the same
    /// board as the fleets.
    pub fn compute(live: &[Fleet], already_guessed: &CellMask) -> Result<Heatmap> {
        let board_size = match live.first() {
            Some(fleet) => fleet.cells().size(),
            None => return Err(InferenceError::Unsatisfiable),
        };
        if already_guessed.size() != board_size {
            return Err(InferenceError::Configuration(format!(
                "guess mask is {}x{} but the fleets are on a {}x{} board",
                already_guessed.size(),
                already_guessed.size(),
                board_size,
                board_size
            )));
        }
        let counts = Self::occupancy(live, board_size);
        let suggestion = suggest(&counts, board_size, already_guessed);
        Ok(Heatmap {
            board_size,
            counts,
            fleets: live.len(),
            suggestion,
        })
    }

    /// Row-major occupancy counts. Partial counts over any partition of
    /// `live` sum to the same result.
    #[cfg(feature = "parallel")]
    pub fn occupancy(live: &[Fleet], board_size: usize) -> Vec<u64> {
        use rayon::prelude::*;
        live.par_chunks(CHUNK)
            .map(|chunk| count_into(vec![0; board_size * board_size], chunk, board_size))
            .reduce(|| vec![0; board_size * board_size], merge)
    }

    #[cfg(not(feature = "parallel"))]
    pub fn occupancy(live: &[Fleet], board_size: usize) -> Vec<u64> {
        count_into(vec![0; board_size * board_size], live, board_size)
    }

    /// Single-threaded reference implementation of [`occupancy`](Self::occupancy).
    pub fn occupancy_sequential(live: &[Fleet], board_size: usize) -> Vec<u64> {
        count_into(vec![0; board_size * board_size], live, board_size)
    }
}

fn count_into(mut counts: Vec<u64>, fleets: &[Fleet], board_size: usize) -> Vec<u64> {
    for fleet in fleets {
        for (r, c) in fleet.cells().iter_set_bits() {
            counts[r * board_size + c] += 1;
        }
    }
    counts
}

#[cfg(feature = "parallel")]
fn merge(mut a: Vec<u64>, b: Vec<u64>) -> Vec<u64> {
    for (x, y) in a.iter_mut().zip(b) {
        *x += y;
    }
    a
}

fn suggest(counts: &[u64], board_size: usize, guessed: &CellMask) -> Option<Coordinate> {
    let mut best: Option<(usize, u64)> = None;
    for (i, &count) in counts.iter().enumerate() {
        if guessed.contains(i / board_size, i % board_size) {
            continue;
        }
        // Strictly greater keeps the earliest cell on ties.
        if best.map_or(true, |(_, b)| count > b) {
            best = Some((i, count));
        }
    }
    best.map(|(i, _)| Coordinate::new(i / board_size, i % board_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestion_breaks_ties_row_major() {
        let guessed = CellMask::new(2);
        assert_eq!(
            suggest(&[1, 3, 3, 0], 2, &guessed),
            Some(Coordinate::new(0, 1))
        );
    }

    #[test]
    fn suggestion_skips_guessed_cells() {
        let guessed = CellMask::from_cells(2, [(0, 1)]).unwrap();
        assert_eq!(
            suggest(&[1, 3, 3, 0], 2, &guessed),
            Some(Coordinate::new(1, 0))
        );
        let all = CellMask::from_cells(2, [(0, 0), (0, 1), (1, 0), (1, 1)]).unwrap();
        assert_eq!(suggest(&[1, 3, 3, 0], 2, &all), None);
    }
}
