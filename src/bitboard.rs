//! A runtime-sized square bitboard.
//!
//! Boards are represented as an `N×N` grid packed row-major into a slice of
//! unsigned words `T`. Placements, exclusion masks, fleet occupancy and the
//! hit/miss history all share this representation so that overlap tests are
//! a handful of word-wise ANDs.

use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign};
use core::{any, fmt, mem};
use num_traits::{PrimInt, Unsigned, Zero};
use thiserror::Error;

/// Errors returned by bitboard operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BitBoardError {
    /// Row or column index is out of bounds [0..N).
    #[error("IndexOutOfBounds: row={row}, col={col}")]
    IndexOutOfBounds { row: usize, col: usize },
}

/// An N×N bitboard stored in words of the unsigned integer `T`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitBoard<T = u64>
where
    T: PrimInt + Unsigned,
{
    size: usize,
    words: Box<[T]>,
}

impl<T> BitBoard<T>
where
    T: PrimInt + Unsigned,
{
    #[inline]
    fn word_bits() -> usize {
        mem::size_of::<T>() * 8
    }

    /// Create a new empty `size×size` bitboard (all bits cleared).
    pub fn new(size: usize) -> Self {
        let cells = size * size;
        let len = cells.div_ceil(Self::word_bits());
        BitBoard {
            size,
            words: vec![T::zero(); len].into_boxed_slice(),
        }
    }

    /// Side length of the board.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the number of set bits (occupied cells).
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Gets the bit at (row, col).
    pub fn get(&self, row: usize, col: usize) -> Result<bool, BitBoardError> {
        self.check_bounds(row, col)?;
        let (word, bit) = self.locate(row, col);
        Ok(((self.words[word] >> bit) & T::one()) != T::zero())
    }

    /// Like [`get`](Self::get), but treats out-of-bounds cells as unset.
    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.get(row, col).unwrap_or(false)
    }

    /// Sets the bit at (row, col) to 1.
    pub fn set(&mut self, row: usize, col: usize) -> Result<(), BitBoardError> {
        self.check_bounds(row, col)?;
        let (word, bit) = self.locate(row, col);
        self.words[word] = self.words[word] | (T::one() << bit);
        Ok(())
    }

    /// Returns true if the two boards share at least one set cell.
    pub fn intersects(&self, other: &Self) -> bool {
        debug_assert_eq!(self.size, other.size);
        self.words
            .iter()
            .zip(other.words.iter())
            .any(|(&a, &b)| !(a & b).is_zero())
    }

    /// Returns true if every set cell of `self` is also set in `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        debug_assert_eq!(self.size, other.size);
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(&a, &b)| (a & !b).is_zero())
    }

    #[inline]
    fn check_bounds(&self, row: usize, col: usize) -> Result<(), BitBoardError> {
        if row >= self.size || col >= self.size {
            Err(BitBoardError::IndexOutOfBounds { row, col })
        } else {
            Ok(())
        }
    }

    #[inline]
    fn locate(&self, row: usize, col: usize) -> (usize, usize) {
        let idx = row * self.size + col;
        (idx / Self::word_bits(), idx % Self::word_bits())
    }

    /// Creates a bitboard from an iterator over `(row, col)` positions.
    pub fn from_cells<I>(size: usize, iter: I) -> Result<Self, BitBoardError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut board = Self::new(size);
        for (r, c) in iter {
            board.set(r, c)?;
        }
        Ok(board)
    }

    /// Iterator over the set bits of the board, in row-major order.
    #[inline]
    pub fn iter_set_bits(&self) -> SetBits<'_, T> {
        SetBits {
            board: self,
            idx: 0,
        }
    }
}

impl<T> fmt::Debug for BitBoard<T>
where
    T: PrimInt + Unsigned,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BitBoard<{}, {}>:", any::type_name::<T>(), self.size)?;
        for r in 0..self.size {
            for c in 0..self.size {
                write!(f, "{} ", if self.contains(r, c) { '■' } else { '□' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Iterator over the set bits of a bitboard.
#[derive(Clone)]
pub struct SetBits<'a, T>
where
    T: PrimInt + Unsigned,
{
    board: &'a BitBoard<T>,
    idx: usize,
}

impl<T> Iterator for SetBits<'_, T>
where
    T: PrimInt + Unsigned,
{
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.board.size;
        let bits = BitBoard::<T>::word_bits();
        while self.idx < n * n {
            let idx = self.idx;
            let word = self.board.words[idx / bits];
            // Skip whole empty words at once.
            if idx % bits == 0 && word.is_zero() {
                self.idx += bits;
                continue;
            }
            self.idx += 1;
            if ((word >> (idx % bits)) & T::one()) != T::zero() {
                return Some((idx / n, idx % n));
            }
        }
        None
    }
}

impl<T> BitAnd for &BitBoard<T>
where
    T: PrimInt + Unsigned,
{
    type Output = BitBoard<T>;

    fn bitand(self, rhs: Self) -> BitBoard<T> {
        let mut out = self.clone();
        out &= rhs;
        out
    }
}

impl<T> BitOr for &BitBoard<T>
where
    T: PrimInt + Unsigned,
{
    type Output = BitBoard<T>;

    fn bitor(self, rhs: Self) -> BitBoard<T> {
        let mut out = self.clone();
        out |= rhs;
        out
    }
}

impl<T> BitAndAssign<&BitBoard<T>> for BitBoard<T>
where
    T: PrimInt + Unsigned,
{
    fn bitand_assign(&mut self, rhs: &BitBoard<T>) {
        debug_assert_eq!(self.size, rhs.size);
        for (a, &b) in self.words.iter_mut().zip(rhs.words.iter()) {
            *a = *a & b;
        }
    }
}

impl<T> BitOrAssign<&BitBoard<T>> for BitBoard<T>
where
    T: PrimInt + Unsigned,
{
    fn bitor_assign(&mut self, rhs: &BitBoard<T>) {
        debug_assert_eq!(self.size, rhs.size);
        for (a, &b) in self.words.iter_mut().zip(rhs.words.iter()) {
            *a = *a | b;
        }
    }
}

/// Cell mask used throughout the crate.
pub type CellMask = BitBoard<u64>;
