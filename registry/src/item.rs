use serde::{Deserialize, Serialize};
use tcrank_types::{AccountId, ItemId, PollId, Timestamp};

/// A ranked item. Its rank lives in the engine's rank mover.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub owner: AccountId,
    pub created_at: Timestamp,
    /// Rank at creation, after clamping.
    pub initial_rank: u128,
    /// The poll that has not finished yet, if any.
    pub open_poll: Option<PollId>,
    /// Every poll this item has hosted, oldest first.
    pub polls: Vec<PollId>,
}

impl Item {
    pub fn new(id: ItemId, owner: AccountId, initial_rank: u128, created_at: Timestamp) -> Self {
        Self {
            id,
            owner,
            created_at,
            initial_rank,
            open_poll: None,
            polls: Vec::new(),
        }
    }
}
