use crate::StoreError;
use tcrank_types::{ItemId, PollId};

/// Meta key under which the engine keeps its config, counters and average stake.
pub const META_ENGINE_KEY: &[u8] = b"engine";

/// Persistence for ranking engine state.
///
/// One table per record kind, keyed by id. Rank tracks (baseline, active
/// moving and history) are stored per item in the movings table.
pub trait RankingStore {
    fn put_item(&self, id: ItemId, item: &[u8]) -> Result<(), StoreError>;
    fn get_item(&self, id: ItemId) -> Result<Option<Vec<u8>>, StoreError>;
    fn delete_item(&self, id: ItemId) -> Result<(), StoreError>;
    fn iter_items(&self) -> Result<Vec<(ItemId, Vec<u8>)>, StoreError>;

    fn put_poll(&self, id: PollId, poll: &[u8]) -> Result<(), StoreError>;
    fn get_poll(&self, id: PollId) -> Result<Option<Vec<u8>>, StoreError>;
    fn delete_poll(&self, id: PollId) -> Result<(), StoreError>;
    fn iter_polls(&self) -> Result<Vec<(PollId, Vec<u8>)>, StoreError>;

    /// All stake records of one poll, as one blob.
    fn put_stakes(&self, poll_id: PollId, records: &[u8]) -> Result<(), StoreError>;
    fn get_stakes(&self, poll_id: PollId) -> Result<Option<Vec<u8>>, StoreError>;
    fn iter_stakes(&self) -> Result<Vec<(PollId, Vec<u8>)>, StoreError>;

    fn put_track(&self, item: ItemId, track: &[u8]) -> Result<(), StoreError>;
    fn get_track(&self, item: ItemId) -> Result<Option<Vec<u8>>, StoreError>;
    fn delete_track(&self, item: ItemId) -> Result<(), StoreError>;
    fn iter_tracks(&self) -> Result<Vec<(ItemId, Vec<u8>)>, StoreError>;

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;
}
