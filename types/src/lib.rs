//! Fundamental types for the TCRank ranking engine.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! identifiers, accounts, commitment digests, vote directions, timestamps and the
//! engine configuration.

pub mod address;
pub mod amount;
pub mod direction;
pub mod error;
pub mod hash;
pub mod params;
pub mod time;

pub use address::AccountId;
pub use amount::{format_tokens, TOKEN};
pub use direction::{MoveDirection, VoteDirection};
pub use error::ParamsError;
pub use hash::CommitHash;
pub use params::RankingConfig;
pub use time::Timestamp;

/// Identifier of a ranked item, assigned by the registry.
pub type ItemId = u64;

/// Identifier of a commit-reveal poll.
pub type PollId = u64;

/// Identifier of a rank trajectory.
pub type MovingId = u64;
