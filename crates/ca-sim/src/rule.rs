//! The traffic transition rule.
//!
//! A car advances one cell per step if and only if the cell ahead of it is
//! empty.  All cars decide simultaneously from the current state, so a car
//! never moves into a cell that another car is leaving in the same step.
//!
//! Two formulations live here on purpose:
//!
//! - [`step_segment`] is what workers run.  It sees only its own cells plus
//!   two ghosts and never writes outside its own buffer; a car crossing to the
//!   right neighbour is removed here and added by the neighbour when it sees
//!   the car in its left ghost.
//! - [`step_ring`] advances a whole circular road directly by index
//!   arithmetic.  It shares no code with `step_segment`, so agreement between
//!   the two is evidence rather than tautology.

use ca_comm::Ghosts;
use ca_core::Cell;

/// Advance one segment by a step.  Returns the number of cars that left a
/// cell of this segment (including cars that crossed into the right
/// neighbour).
///
/// `next` is fully overwritten.
///
/// # Panics
/// Panics if `current` is empty or the two buffers differ in length.
pub fn step_segment(current: &[Cell], next: &mut [Cell], ghosts: Ghosts) -> u64 {
    assert!(!current.is_empty(), "segments are never empty");
    assert_eq!(current.len(), next.len(), "double buffers must match");

    next.copy_from_slice(current);
    let last = current.len() - 1;
    let mut moved = 0;

    for i in 0..current.len() {
        let ahead = if i == last { ghosts.right } else { current[i + 1] };
        if current[i].is_occupied() && ahead.is_empty() {
            next[i] = Cell::Empty;
            if i < last {
                next[i + 1] = Cell::Occupied;
            }
            moved += 1;
        }
    }

    // The left neighbour's last car enters our first cell.
    if current[0].is_empty() && ghosts.left.is_occupied() {
        next[0] = Cell::Occupied;
    }

    moved
}

/// Advance a complete circular road by a step.  Returns the number of cars
/// that moved.
///
/// # Panics
/// Panics if the two buffers differ in length.
pub fn step_ring(current: &[Cell], next: &mut [Cell]) -> u64 {
    assert_eq!(current.len(), next.len(), "double buffers must match");

    let n = current.len();
    let mut moved = 0;
    for (i, out) in next.iter_mut().enumerate() {
        let behind = current[(i + n - 1) % n];
        let ahead  = current[(i + 1) % n];
        *out = match current[i] {
            Cell::Occupied if ahead.is_empty() => {
                moved += 1;
                Cell::Empty
            }
            Cell::Occupied => Cell::Occupied,
            Cell::Empty    => behind,
        };
    }
    moved
}
