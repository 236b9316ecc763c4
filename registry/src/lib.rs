//! The TCRank ranking engine.
//!
//! Items carry a rank that moves continuously over time. A commit-reveal poll
//! on an item decides in which direction, and how fast, the rank moves next:
//! voters commit a hidden `(direction, stake, salt)` digest and pay a fixed
//! commission sized by the item's rank, then reveal and escrow their stake
//! paying a dynamic commission sized by it. Finishing the poll launches a new
//! linear trajectory from the rank at that instant. Winners withdraw their
//! escrow at a bounded rate; losers forfeit it to the treasury.
//!
//! [`RankingEngine`] wires the fee calculator, polls, rank mover and unstake
//! scheduler together behind one single-threaded API. Balances and admin
//! rights come from the [`tcrank_ledger`] collaborators.

pub mod engine;
pub mod error;
pub mod item;
pub mod snapshot;

pub use engine::RankingEngine;
pub use error::RankingError;
pub use item::Item;
