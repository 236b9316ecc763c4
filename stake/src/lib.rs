//! Escrow of revealed stake and its gradual release.
//!
//! Revealed stake is held per `(poll, voter)`. When a poll finishes every
//! record is settled: winners (and every revealer of a tied poll) may withdraw
//! at most `unstake_speed` raw units per second since settlement, losers
//! forfeit. Releases are computed lazily from the caller's clock reading.

pub mod error;
pub mod record;
pub mod scheduler;

pub use error::StakeError;
pub use record::{StakeStatus, VoterStakeRecord};
pub use scheduler::{SettlementSummary, UnstakeScheduler};
