//! External collaborators of the ranking engine.
//!
//! The engine never holds balances itself. It talks to a fungible
//! [`BalanceLedger`] and asks an [`AccessControl`] whether a caller may run
//! privileged setup calls. In-memory implementations back tests and the
//! simulator.

pub mod access;
pub mod balance;
pub mod error;

pub use access::{AccessControl, AdminSet};
pub use balance::{BalanceLedger, MemoryLedger};
pub use error::{AccessError, LedgerError};
