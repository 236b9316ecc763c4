//! Rank mover: the continuous rank of every item.
//!
//! An item's rank is a deterministic function of time, not a stored number:
//! `rank(t) = clamp(anchor + dir × speed × (t − anchor_at), 0, max_rank)`
//!
//! Nothing updates ranks in the background. A finished poll re-anchors the
//! item's trajectory at the rank computed at that instant, so successive
//! movings compose.

pub mod error;
pub mod mover;
pub mod trajectory;

pub use error::MovingError;
pub use mover::{ItemTrack, RankMover};
pub use trajectory::Moving;
