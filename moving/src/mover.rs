//! Per-item rank tracks and the mover that owns them.

use crate::error::MovingError;
use crate::trajectory::Moving;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tcrank_types::{ItemId, MoveDirection, MovingId, PollId, Timestamp};

/// Rank state of one item.
///
/// Lightweight: a baseline plus at most one active trajectory. Replaced
/// trajectories move to `history`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemTrack {
    /// Rank when no trajectory is active (creation rank, or where the last
    /// trajectory stopped).
    pub base_rank: u128,
    pub base_at: Timestamp,
    pub active: Option<Moving>,
    pub history: Vec<Moving>,
}

impl ItemTrack {
    fn new(rank: u128, at: Timestamp) -> Self {
        Self {
            base_rank: rank,
            base_at: at,
            active: None,
            history: Vec::new(),
        }
    }

    fn rank_at(&self, now: Timestamp, max_rank: u128) -> u128 {
        match &self.active {
            Some(moving) => moving.rank_at(now, max_rank),
            None => self.base_rank.min(max_rank),
        }
    }
}

/// Holds every item's trajectory and answers "what is the rank right now".
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RankMover {
    next_moving_id: MovingId,
    max_rank: u128,
    tracks: HashMap<ItemId, ItemTrack>,
}

impl RankMover {
    pub fn new(max_rank: u128) -> Self {
        Self {
            next_moving_id: 1,
            max_rank,
            tracks: HashMap::new(),
        }
    }

    /// Rebuild a mover from persisted tracks.
    pub fn restore<I>(max_rank: u128, next_moving_id: MovingId, tracks: I) -> Self
    where
        I: IntoIterator<Item = (ItemId, ItemTrack)>,
    {
        Self {
            next_moving_id,
            max_rank,
            tracks: tracks.into_iter().collect(),
        }
    }

    pub fn max_rank(&self) -> u128 {
        self.max_rank
    }

    pub fn next_moving_id(&self) -> MovingId {
        self.next_moving_id
    }

    /// Start tracking an item at a baseline rank (clamped to `max_rank`).
    pub fn track(&mut self, item: ItemId, rank: u128, at: Timestamp) -> Result<(), MovingError> {
        if self.tracks.contains_key(&item) {
            return Err(MovingError::ItemAlreadyTracked(item));
        }
        self.tracks
            .insert(item, ItemTrack::new(rank.min(self.max_rank), at));
        Ok(())
    }

    /// Stop tracking an item, returning its final state.
    pub fn untrack(&mut self, item: ItemId) -> Result<ItemTrack, MovingError> {
        self.tracks
            .remove(&item)
            .ok_or(MovingError::ItemNotTracked(item))
    }

    pub fn is_tracked(&self, item: ItemId) -> bool {
        self.tracks.contains_key(&item)
    }

    pub fn track_of(&self, item: ItemId) -> Result<&ItemTrack, MovingError> {
        self.tracks.get(&item).ok_or(MovingError::ItemNotTracked(item))
    }

    /// The item's rank at `now`. Pure read.
    pub fn current_rank(&self, item: ItemId, now: Timestamp) -> Result<u128, MovingError> {
        Ok(self.track_of(item)?.rank_at(now, self.max_rank))
    }

    /// The trajectory still in effect at `now`, if any. A trajectory that has
    /// floored at zero is reported as gone even before a write records it.
    pub fn active_moving(
        &self,
        item: ItemId,
        now: Timestamp,
    ) -> Result<Option<&Moving>, MovingError> {
        Ok(self
            .track_of(item)?
            .active
            .as_ref()
            .filter(|m| m.is_active_at(now, self.max_rank)))
    }

    pub fn history(&self, item: ItemId) -> Result<&[Moving], MovingError> {
        Ok(&self.track_of(item)?.history)
    }

    /// Record the deactivation of a trajectory that floored at zero.
    pub fn settle(&mut self, item: ItemId, now: Timestamp) -> Result<(), MovingError> {
        let max_rank = self.max_rank;
        let track = self
            .tracks
            .get_mut(&item)
            .ok_or(MovingError::ItemNotTracked(item))?;
        let floor = match &track.active {
            Some(moving) if moving.is_exhausted_at(now, max_rank) => {
                moving.floor_reached_at(max_rank)
            }
            _ => None,
        };
        if let Some(floor) = floor {
            if let Some(mut spent) = track.active.take() {
                spent.stop(floor);
                track.history.push(spent);
            }
            track.base_rank = 0;
            track.base_at = floor;
        }
        Ok(())
    }

    /// Validate that [`Self::apply`] would succeed for `item`.
    pub fn check_apply(&self, item: ItemId) -> Result<(), MovingError> {
        self.track_of(item)?;
        self.next_moving_id
            .checked_add(1)
            .ok_or(MovingError::Overflow)?;
        Ok(())
    }

    /// Replace the item's trajectory with a new one anchored at the rank
    /// computed at `now`. The previous trajectory is stopped at `now`.
    pub fn apply(
        &mut self,
        item: ItemId,
        direction: MoveDirection,
        speed: u128,
        poll_id: PollId,
        now: Timestamp,
    ) -> Result<&Moving, MovingError> {
        self.check_apply(item)?;
        self.settle(item, now)?;
        let max_rank = self.max_rank;
        let id = self.next_moving_id;
        let track = self
            .tracks
            .get_mut(&item)
            .ok_or(MovingError::ItemNotTracked(item))?;

        let anchor = track.rank_at(now, max_rank);
        if let Some(mut previous) = track.active.take() {
            previous.stop(now);
            track.history.push(previous);
        }
        track.base_rank = anchor;
        track.base_at = now;
        self.next_moving_id = id + 1;
        let moving = track.active.insert(Moving::new(
            id, item, direction, speed, anchor, now, poll_id,
        ));
        Ok(&*moving)
    }

    /// Every tracked item id, ascending.
    pub fn items(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self.tracks.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
