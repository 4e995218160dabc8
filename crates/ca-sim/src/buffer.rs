//! Two-slot cell buffer selected by a generation counter.

use ca_core::Cell;

/// Current/next buffers for one segment.
///
/// Slot `generation % 2` is the current state; the other slot receives the
/// next state.  [`swap`][Self::swap] only bumps the generation, so no cells
/// are copied between steps.
#[derive(Clone, Debug)]
pub struct DoubleBuffer {
    slots:      [Vec<Cell>; 2],
    generation: u64,
}

impl DoubleBuffer {
    /// Start with `initial` as the current state.
    pub fn new(initial: Vec<Cell>) -> Self {
        let scratch = vec![Cell::Empty; initial.len()];
        Self { slots: [initial, scratch], generation: 0 }
    }

    /// Number of swaps so far.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    fn current_slot(&self) -> usize {
        (self.generation % 2) as usize
    }

    #[inline]
    pub fn current(&self) -> &[Cell] {
        &self.slots[self.current_slot()]
    }

    /// Borrow the current buffer for reading and the next buffer for
    /// writing at the same time.
    pub fn split(&mut self) -> (&[Cell], &mut [Cell]) {
        let [a, b] = &mut self.slots;
        if self.generation % 2 == 0 {
            (a.as_slice(), b.as_mut_slice())
        } else {
            (b.as_slice(), a.as_mut_slice())
        }
    }

    /// Promote the next buffer to current.
    #[inline]
    pub fn swap(&mut self) {
        self.generation += 1;
    }

    /// Consume the buffer set, keeping only the current state.
    pub fn into_current(self) -> Vec<Cell> {
        let slot = self.current_slot();
        let [a, b] = self.slots;
        if slot == 0 { a } else { b }
    }
}
