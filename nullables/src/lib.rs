//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies of the engine (clock, storage, salt randomness) get
//! test-friendly stand-ins here. They return deterministic values, can be
//! driven programmatically, and never touch the filesystem.

pub mod clock;
pub mod salt;
pub mod store;

pub use clock::NullClock;
pub use salt::NullSalts;
pub use store::NullStore;
