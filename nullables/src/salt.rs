//! Nullable salts: predictable commitment salts.

use std::cell::Cell;

/// Hands out `start, start + 1, ...` so tests can recompute commitments.
pub struct NullSalts {
    next: Cell<u128>,
}

impl NullSalts {
    pub fn new(start: u128) -> Self {
        Self {
            next: Cell::new(start),
        }
    }

    pub fn next_salt(&self) -> u128 {
        let salt = self.next.get();
        self.next.set(salt.wrapping_add(1));
        salt
    }
}

impl Default for NullSalts {
    fn default() -> Self {
        Self::new(0x5eed)
    }
}
