//! Cell states and the full-road container.
//!
//! A road is a circular sequence of cells: the cell after the last one is the
//! first one.  `Road` itself is just an ordered `Vec<Cell>`; the wraparound is
//! a property of the transition rules that read it.

use std::fmt;

use crate::{CaError, CaResult};

// ── Cell ──────────────────────────────────────────────────────────────────────

/// One road cell: empty or holding exactly one car.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Cell {
    #[default]
    Empty    = 0,
    Occupied = 1,
}

impl Cell {
    #[inline(always)]
    pub fn is_occupied(self) -> bool {
        self == Cell::Occupied
    }

    #[inline(always)]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    /// `0` or `1`.
    #[inline(always)]
    pub fn bit(self) -> u8 {
        self as u8
    }
}

impl From<bool> for Cell {
    #[inline]
    fn from(occupied: bool) -> Self {
        if occupied { Cell::Occupied } else { Cell::Empty }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bit())
    }
}

/// Number of occupied cells in a slice.
#[inline]
pub fn count_cars(cells: &[Cell]) -> u64 {
    cells.iter().filter(|c| c.is_occupied()).count() as u64
}

// ── Road ──────────────────────────────────────────────────────────────────────

/// The complete road, in global cell order.
///
/// Only the coordinator ever holds one: before scatter, and again after a
/// gather for verification or snapshots.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Road {
    cells: Vec<Cell>,
}

impl Road {
    /// An all-empty road of `len` cells.
    pub fn empty(len: usize) -> Self {
        Self { cells: vec![Cell::Empty; len] }
    }

    pub fn from_cells(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Total number of cars on the road.
    pub fn car_count(&self) -> u64 {
        count_cars(&self.cells)
    }

    /// Occupied fraction in `[0, 1]`; 0 for an empty road.
    pub fn density(&self) -> f64 {
        if self.cells.is_empty() {
            0.0
        } else {
            self.car_count() as f64 / self.cells.len() as f64
        }
    }
}

impl std::str::FromStr for Road {
    type Err = CaError;

    /// Parse a compact `0101…` string.  Whitespace is ignored.
    fn from_str(s: &str) -> CaResult<Road> {
        let cells = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| match c {
                '0' => Ok(Cell::Empty),
                '1' => Ok(Cell::Occupied),
                other => Err(CaError::Parse(format!("unexpected road character {other:?}"))),
            })
            .collect::<CaResult<Vec<_>>>()?;
        Ok(Road { cells })
    }
}

impl fmt::Display for Road {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cell in &self.cells {
            write!(f, "{cell}")?;
        }
        Ok(())
    }
}
