//! Saving and restoring the engine through a [`RankingStore`].

use crate::engine::RankingEngine;
use crate::error::RankingError;
use crate::item::Item;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tcrank_ledger::{AccessControl, BalanceLedger};
use tcrank_moving::{ItemTrack, RankMover};
use tcrank_stake::{UnstakeScheduler, VoterStakeRecord};
use tcrank_store::{RankingStore, META_ENGINE_KEY};
use tcrank_types::{ItemId, MovingId, PollId, RankingConfig, Timestamp};
use tcrank_voting::Poll;

/// Engine-wide scalars kept in the meta table.
#[derive(Serialize, Deserialize)]
struct EngineMeta {
    config: Option<RankingConfig>,
    next_item_id: ItemId,
    next_poll_id: PollId,
    next_moving_id: MovingId,
    avg_stake: u128,
    last_seen: Timestamp,
}

impl<L: BalanceLedger, A: AccessControl> RankingEngine<L, A> {
    /// Write the whole engine state. Balances live in the ledger and are not
    /// part of the snapshot.
    pub fn save_to_store(&self, store: &dyn RankingStore) -> Result<(), RankingError> {
        let meta = EngineMeta {
            config: self.config.clone(),
            next_item_id: self.next_item_id,
            next_poll_id: self.next_poll_id,
            next_moving_id: self.mover.next_moving_id(),
            avg_stake: self.avg_stake,
            last_seen: self.last_seen,
        };
        store.put_meta(META_ENGINE_KEY, &bincode::serialize(&meta)?)?;

        // Items removed since the last save must not come back.
        for (id, _) in store.iter_items()? {
            if !self.items.contains_key(&id) {
                store.delete_item(id)?;
                store.delete_track(id)?;
            }
        }
        for (id, _) in store.iter_polls()? {
            if !self.polls.contains_key(&id) {
                store.delete_poll(id)?;
            }
        }

        for (id, item) in &self.items {
            store.put_item(*id, &bincode::serialize(item)?)?;
            store.put_track(*id, &bincode::serialize(self.mover.track_of(*id)?)?)?;
        }
        for (id, poll) in &self.polls {
            store.put_poll(*id, &bincode::serialize(poll)?)?;
        }
        for poll_id in self.stakes.poll_ids() {
            let records = self.stakes.records(poll_id);
            store.put_stakes(poll_id, &bincode::serialize(records)?)?;
        }
        tracing::debug!(
            items = self.items.len(),
            polls = self.polls.len(),
            "engine state saved"
        );
        Ok(())
    }

    /// Rebuild an engine from a store, around the given collaborators.
    pub fn load_from_store(
        store: &dyn RankingStore,
        ledger: L,
        access: A,
    ) -> Result<Self, RankingError> {
        let mut engine = Self::new(ledger, access);
        let meta: EngineMeta = match store.get_meta(META_ENGINE_KEY)? {
            Some(bytes) => bincode::deserialize(&bytes)?,
            None => return Ok(engine),
        };

        let mut items = BTreeMap::new();
        for (id, bytes) in store.iter_items()? {
            let item: Item = bincode::deserialize(&bytes)?;
            items.insert(id, item);
        }
        let mut tracks = Vec::new();
        for (id, bytes) in store.iter_tracks()? {
            if !items.contains_key(&id) {
                continue;
            }
            let track: ItemTrack = bincode::deserialize(&bytes)?;
            tracks.push((id, track));
        }
        if tracks.len() != items.len() {
            return Err(RankingError::Storage(format!(
                "{} items but {} rank tracks",
                items.len(),
                tracks.len()
            )));
        }
        let mut polls = BTreeMap::new();
        for (id, bytes) in store.iter_polls()? {
            let poll: Poll = bincode::deserialize(&bytes)?;
            polls.insert(id, poll);
        }
        let mut stakes = UnstakeScheduler::new();
        for (poll_id, bytes) in store.iter_stakes()? {
            if !polls.contains_key(&poll_id) {
                continue;
            }
            let records: Vec<VoterStakeRecord> = bincode::deserialize(&bytes)?;
            stakes.restore(poll_id, records);
        }

        let max_rank = meta.config.as_ref().map_or(0, |c| c.max_rank);
        engine.mover = RankMover::restore(max_rank, meta.next_moving_id, tracks);
        engine.config = meta.config;
        engine.items = items;
        engine.polls = polls;
        engine.stakes = stakes;
        engine.next_item_id = meta.next_item_id;
        engine.next_poll_id = meta.next_poll_id;
        engine.avg_stake = meta.avg_stake;
        engine.last_seen = meta.last_seen;
        tracing::info!(
            items = engine.items.len(),
            polls = engine.polls.len(),
            "engine state loaded"
        );
        Ok(engine)
    }
}
