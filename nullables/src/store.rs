//! Nullable store: thread-safe in-memory storage for testing.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};
use tcrank_store::{RankingStore, StoreError};
use tcrank_types::{ItemId, PollId};

type Table = Mutex<BTreeMap<u64, Vec<u8>>>;

/// An in-memory [`RankingStore`].
#[derive(Default)]
pub struct NullStore {
    items: Table,
    polls: Table,
    stakes: Table,
    tracks: Table,
    meta: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries across every table.
    pub fn len(&self) -> usize {
        [&self.items, &self.polls, &self.stakes, &self.tracks]
            .iter()
            .map(|t| lock(t).map_or(0, |g| g.len()))
            .sum::<usize>()
            + lock(&self.meta).map_or(0, |g| g.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    m.lock()
        .map_err(|_| StoreError::Backend("null store lock poisoned".into()))
}

fn put(table: &Table, id: u64, value: &[u8]) -> Result<(), StoreError> {
    lock(table)?.insert(id, value.to_vec());
    Ok(())
}

fn get(table: &Table, id: u64) -> Result<Option<Vec<u8>>, StoreError> {
    Ok(lock(table)?.get(&id).cloned())
}

fn delete(table: &Table, id: u64) -> Result<(), StoreError> {
    lock(table)?.remove(&id);
    Ok(())
}

fn iter(table: &Table) -> Result<Vec<(u64, Vec<u8>)>, StoreError> {
    Ok(lock(table)?
        .iter()
        .map(|(k, v)| (*k, v.clone()))
        .collect())
}

impl RankingStore for NullStore {
    fn put_item(&self, id: ItemId, item: &[u8]) -> Result<(), StoreError> {
        put(&self.items, id, item)
    }

    fn get_item(&self, id: ItemId) -> Result<Option<Vec<u8>>, StoreError> {
        get(&self.items, id)
    }

    fn delete_item(&self, id: ItemId) -> Result<(), StoreError> {
        delete(&self.items, id)
    }

    fn iter_items(&self) -> Result<Vec<(ItemId, Vec<u8>)>, StoreError> {
        iter(&self.items)
    }

    fn put_poll(&self, id: PollId, poll: &[u8]) -> Result<(), StoreError> {
        put(&self.polls, id, poll)
    }

    fn get_poll(&self, id: PollId) -> Result<Option<Vec<u8>>, StoreError> {
        get(&self.polls, id)
    }

    fn delete_poll(&self, id: PollId) -> Result<(), StoreError> {
        delete(&self.polls, id)
    }

    fn iter_polls(&self) -> Result<Vec<(PollId, Vec<u8>)>, StoreError> {
        iter(&self.polls)
    }

    fn put_stakes(&self, poll_id: PollId, records: &[u8]) -> Result<(), StoreError> {
        put(&self.stakes, poll_id, records)
    }

    fn get_stakes(&self, poll_id: PollId) -> Result<Option<Vec<u8>>, StoreError> {
        get(&self.stakes, poll_id)
    }

    fn iter_stakes(&self) -> Result<Vec<(PollId, Vec<u8>)>, StoreError> {
        iter(&self.stakes)
    }

    fn put_track(&self, item: ItemId, track: &[u8]) -> Result<(), StoreError> {
        put(&self.tracks, item, track)
    }

    fn get_track(&self, item: ItemId) -> Result<Option<Vec<u8>>, StoreError> {
        get(&self.tracks, item)
    }

    fn delete_track(&self, item: ItemId) -> Result<(), StoreError> {
        delete(&self.tracks, item)
    }

    fn iter_tracks(&self) -> Result<Vec<(ItemId, Vec<u8>)>, StoreError> {
        iter(&self.tracks)
    }

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(lock(&self.meta)?.get(key).cloned())
    }

    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        lock(&self.meta)?.insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}
