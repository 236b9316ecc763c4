//! Nullable clock: deterministic time for testing.

use std::cell::Cell;
use tcrank_types::Timestamp;

/// A deterministic clock.
///
/// Time only advances when you tell it to.
pub struct NullClock {
    current: Cell<u64>,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: Cell::new(initial_secs),
        }
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.current.get())
    }

    /// Advance by `secs` and return the new reading.
    pub fn advance(&self, secs: u64) -> Timestamp {
        self.current.set(self.current.get().saturating_add(secs));
        self.now()
    }

    pub fn set(&self, secs: u64) {
        self.current.set(secs);
    }
}

impl Default for NullClock {
    fn default() -> Self {
        Self::new(1_000_000)
    }
}
