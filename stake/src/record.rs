use serde::{Deserialize, Serialize};
use tcrank_types::{AccountId, PollId, Timestamp};

/// Settlement state of one escrow record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakeStatus {
    /// Revealed; the poll has not finished.
    Escrowed,
    /// Revealed on the winning side.
    Won,
    /// Revealed in a poll that ended in a tie; stake comes back like a win.
    Refunded,
    /// Revealed on the losing side; never releasable.
    Forfeited,
}

/// Stake one voter escrowed in one poll.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterStakeRecord {
    pub poll_id: PollId,
    pub voter: AccountId,
    pub total: u128,
    pub released: u128,
    pub status: StakeStatus,
    /// Set when the poll settles; advanced on each release.
    pub last_release_at: Option<Timestamp>,
}

impl VoterStakeRecord {
    pub fn new(poll_id: PollId, voter: AccountId, total: u128) -> Self {
        Self {
            poll_id,
            voter,
            total,
            released: 0,
            status: StakeStatus::Escrowed,
            last_release_at: None,
        }
    }

    pub fn is_winner(&self) -> bool {
        self.status == StakeStatus::Won
    }

    pub fn is_forfeited(&self) -> bool {
        self.status == StakeStatus::Forfeited
    }

    pub fn is_releasable(&self) -> bool {
        matches!(self.status, StakeStatus::Won | StakeStatus::Refunded)
    }

    pub fn remaining(&self) -> u128 {
        self.total.saturating_sub(self.released)
    }

    /// Fully withdrawn.
    pub fn is_settled(&self) -> bool {
        self.released >= self.total
    }

    /// Amount that would be released at `now`, without mutating.
    ///
    /// `min(total - released, elapsed * speed)`; zero for non-releasable
    /// records, before settlement, or when the clock reads earlier than the
    /// last release.
    pub fn releasable_at(&self, now: Timestamp, speed: u128) -> u128 {
        if !self.is_releasable() {
            return 0;
        }
        let since = match self.last_release_at {
            Some(at) => at,
            None => return 0,
        };
        let elapsed = since.elapsed_since(now) as u128;
        let budget = elapsed.checked_mul(speed).unwrap_or(u128::MAX);
        budget.min(self.remaining())
    }
}
