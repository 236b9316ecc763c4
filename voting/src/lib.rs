//! Commit-reveal polls for TCRank items.
//!
//! One poll is one voting round on one item:
//! Commit → Reveal → Closed → Finished. Phases follow the clock reading
//! supplied with each call; only `finish` records the terminal state.
//!
//! Voters first commit an opaque digest of `(direction, stake, salt)`, then
//! disclose the triple. Revealed stake is tallied per side; the heavier side
//! wins and a tie moves nothing.

pub mod commit_reveal;
pub mod error;
pub mod poll;

pub use commit_reveal::{CommitRevealBook, RevealedVote};
pub use error::PollError;
pub use poll::{Poll, PollOutcome, PollPhase};
