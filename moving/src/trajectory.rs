//! A single linear rank trajectory.

use serde::{Deserialize, Serialize};
use tcrank_types::{ItemId, MoveDirection, MovingId, PollId, Timestamp};

/// A time-linear rank trajectory launched by a finished poll.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Moving {
    pub id: MovingId,
    pub item_id: ItemId,
    pub direction: MoveDirection,
    /// Raw rank units per second.
    pub speed: u128,
    /// Rank at `anchor_at`.
    pub anchor_rank: u128,
    pub anchor_at: Timestamp,
    /// The poll whose outcome produced this trajectory.
    pub poll_id: PollId,
    pub active: bool,
    /// When the trajectory stopped (replaced, or floored at zero).
    /// Evaluation never runs past this instant.
    pub stopped_at: Option<Timestamp>,
}

impl Moving {
    pub fn new(
        id: MovingId,
        item_id: ItemId,
        direction: MoveDirection,
        speed: u128,
        anchor_rank: u128,
        anchor_at: Timestamp,
        poll_id: PollId,
    ) -> Self {
        Self {
            id,
            item_id,
            direction,
            speed,
            anchor_rank,
            anchor_at,
            poll_id,
            active: true,
            stopped_at: None,
        }
    }

    /// Rank at `now`, clamped to `[0, max_rank]`.
    ///
    /// Arithmetic overflow saturates toward the bound the trajectory is
    /// heading to, so the result is always in range.
    pub fn rank_at(&self, now: Timestamp, max_rank: u128) -> u128 {
        let anchor = self.anchor_rank.min(max_rank);
        let until = match self.stopped_at {
            Some(stop) if stop < now => stop,
            _ => now,
        };
        let elapsed = self.anchor_at.elapsed_since(until) as u128;
        let delta = self.speed.checked_mul(elapsed);
        match self.direction {
            MoveDirection::Up => delta
                .and_then(|d| anchor.checked_add(d))
                .map_or(max_rank, |r| r.min(max_rank)),
            MoveDirection::Down => delta.map_or(0, |d| anchor.saturating_sub(d)),
            MoveDirection::Neutral => anchor,
        }
    }

    /// The first whole second at which a downward trajectory reaches zero.
    pub fn floor_reached_at(&self, max_rank: u128) -> Option<Timestamp> {
        if self.direction != MoveDirection::Down || self.speed == 0 {
            return None;
        }
        let anchor = self.anchor_rank.min(max_rank);
        let secs = anchor.div_ceil(self.speed);
        let secs = u64::try_from(secs).unwrap_or(u64::MAX);
        Some(self.anchor_at.plus(secs))
    }

    /// A downward trajectory that has hit zero is spent.
    pub fn is_exhausted_at(&self, now: Timestamp, max_rank: u128) -> bool {
        self.floor_reached_at(max_rank)
            .map_or(false, |floor| floor <= now)
    }

    /// Active and not yet floored at `now`.
    pub fn is_active_at(&self, now: Timestamp, max_rank: u128) -> bool {
        self.active && !self.is_exhausted_at(now, max_rank)
    }

    /// Stop the trajectory at `at`; later reads return the rank reached then.
    pub(crate) fn stop(&mut self, at: Timestamp) {
        self.active = false;
        if self.stopped_at.is_none() {
            self.stopped_at = Some(at);
        }
    }
}
