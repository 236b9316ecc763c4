//! A single commit-reveal voting round and its lifecycle.

use crate::commit_reveal::{CommitRevealBook, RevealedVote};
use crate::error::PollError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tcrank_types::{AccountId, CommitHash, ItemId, MoveDirection, PollId, Timestamp, VoteDirection};

/// The phases of a poll, in order. A poll never moves backwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PollPhase {
    /// Accepting commitments (`now <= commit_deadline`).
    Commit,
    /// Accepting reveals (`commit_deadline < now <= reveal_deadline`).
    Reveal,
    /// Both windows are over; waiting for someone to finish the poll.
    Closed,
    /// Tallied. Terminal.
    Finished,
}

impl fmt::Display for PollPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Commit => "commit",
            Self::Reveal => "reveal",
            Self::Closed => "closed",
            Self::Finished => "finished",
        };
        write!(f, "{}", name)
    }
}

/// The recorded result of a finished poll.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOutcome {
    /// `Neutral` when both sides revealed the same stake (including none at all).
    pub direction: MoveDirection,
    pub up_stake: u128,
    pub down_stake: u128,
    /// `|up_stake - down_stake|`.
    pub imbalance: u128,
    pub reveal_count: usize,
    pub finished_at: Timestamp,
}

impl PollOutcome {
    /// The side whose voters keep their stake, if any.
    pub fn winning_side(&self) -> Option<VoteDirection> {
        match self.direction {
            MoveDirection::Up => Some(VoteDirection::Up),
            MoveDirection::Down => Some(VoteDirection::Down),
            MoveDirection::Neutral => None,
        }
    }
}

/// One voting round on one item.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Poll {
    pub id: PollId,
    pub item_id: ItemId,
    pub started_at: Timestamp,
    pub commit_deadline: Timestamp,
    pub reveal_deadline: Timestamp,
    /// Reference average stake, fixed when the poll opens.
    pub avg_stake: u128,
    pub up_stake: u128,
    pub down_stake: u128,
    book: CommitRevealBook,
    outcome: Option<PollOutcome>,
}

impl Poll {
    /// Open a poll at `now`. Both deadlines are fixed here and never move.
    pub fn open(
        id: PollId,
        item_id: ItemId,
        now: Timestamp,
        commit_ttl_secs: u64,
        reveal_ttl_secs: u64,
        avg_stake: u128,
    ) -> Self {
        let commit_deadline = now.plus(commit_ttl_secs);
        Self {
            id,
            item_id,
            started_at: now,
            commit_deadline,
            reveal_deadline: commit_deadline.plus(reveal_ttl_secs),
            avg_stake,
            up_stake: 0,
            down_stake: 0,
            book: CommitRevealBook::new(),
            outcome: None,
        }
    }

    pub fn phase_at(&self, now: Timestamp) -> PollPhase {
        if self.outcome.is_some() {
            PollPhase::Finished
        } else if now <= self.commit_deadline {
            PollPhase::Commit
        } else if now <= self.reveal_deadline {
            PollPhase::Reveal
        } else {
            PollPhase::Closed
        }
    }

    pub fn ensure_phase(&self, expected: PollPhase, now: Timestamp) -> Result<(), PollError> {
        let actual = self.phase_at(now);
        if actual != expected {
            return Err(PollError::InvalidPhase { expected, actual });
        }
        Ok(())
    }

    /// Whether `finish` has run.
    pub fn is_settled(&self) -> bool {
        self.outcome.is_some()
    }

    /// Store a voter's commitment. Overwriting one's own commitment is allowed
    /// until the commit deadline. Returns true when it replaced an earlier one.
    pub fn commit(
        &mut self,
        voter: &AccountId,
        hash: CommitHash,
        now: Timestamp,
    ) -> Result<bool, PollError> {
        self.ensure_phase(PollPhase::Commit, now)?;
        Ok(self.book.record_commitment(voter, hash))
    }

    /// Validate a reveal without changing anything.
    pub fn check_reveal(
        &self,
        voter: &AccountId,
        direction: VoteDirection,
        stake: u128,
        salt: u128,
        now: Timestamp,
    ) -> Result<(), PollError> {
        self.ensure_phase(PollPhase::Reveal, now)?;
        self.book.check_reveal(voter, direction, stake, salt)?;
        self.side_total(direction)
            .checked_add(stake)
            .ok_or(PollError::Overflow)?;
        Ok(())
    }

    /// Record a verified reveal and add its stake to its side.
    pub fn reveal(
        &mut self,
        voter: &AccountId,
        direction: VoteDirection,
        stake: u128,
        salt: u128,
        now: Timestamp,
    ) -> Result<(), PollError> {
        self.check_reveal(voter, direction, stake, salt, now)?;
        self.book
            .record_reveal(voter, RevealedVote { direction, stake });
        match direction {
            VoteDirection::Up => self.up_stake += stake,
            VoteDirection::Down => self.down_stake += stake,
        }
        Ok(())
    }

    pub fn check_finish(&self, now: Timestamp) -> Result<(), PollError> {
        if self.outcome.is_some() {
            return Err(PollError::AlreadyFinished(self.id));
        }
        self.ensure_phase(PollPhase::Closed, now)
    }

    /// Tally the revealed stake and record the outcome. Succeeds with a
    /// neutral outcome when nobody revealed.
    pub fn finish(&mut self, now: Timestamp) -> Result<&PollOutcome, PollError> {
        self.check_finish(now)?;
        let (direction, imbalance) = if self.up_stake > self.down_stake {
            (MoveDirection::Up, self.up_stake - self.down_stake)
        } else if self.down_stake > self.up_stake {
            (MoveDirection::Down, self.down_stake - self.up_stake)
        } else {
            (MoveDirection::Neutral, 0)
        };
        let outcome = self.outcome.insert(PollOutcome {
            direction,
            up_stake: self.up_stake,
            down_stake: self.down_stake,
            imbalance,
            reveal_count: self.book.reveal_count(),
            finished_at: now,
        });
        Ok(&*outcome)
    }

    pub fn outcome(&self) -> Option<&PollOutcome> {
        self.outcome.as_ref()
    }

    /// Winning direction; only available once the poll is finished.
    pub fn result(&self, now: Timestamp) -> Result<MoveDirection, PollError> {
        self.outcome
            .as_ref()
            .map(|o| o.direction)
            .ok_or(PollError::InvalidPhase {
                expected: PollPhase::Finished,
                actual: self.phase_at(now),
            })
    }

    /// `(up_stake, down_stake)` revealed so far.
    pub fn stakes(&self) -> (u128, u128) {
        (self.up_stake, self.down_stake)
    }

    pub fn overall_stake(&self) -> u128 {
        self.up_stake.saturating_add(self.down_stake)
    }

    /// Whether any revealed stake is held for this poll.
    pub fn has_escrow(&self) -> bool {
        self.overall_stake() > 0
    }

    /// True only after finish, for voters who revealed on the winning side.
    pub fn is_winner(&self, voter: &AccountId) -> bool {
        let side = match self.outcome.as_ref().and_then(PollOutcome::winning_side) {
            Some(side) => side,
            None => return false,
        };
        self.book
            .reveal(voter)
            .map_or(false, |vote| vote.direction == side)
    }

    pub fn voters(&self) -> &[AccountId] {
        self.book.voters()
    }

    pub fn commitment(&self, voter: &AccountId) -> Option<&CommitHash> {
        self.book.commitment(voter)
    }

    pub fn revealed_vote(&self, voter: &AccountId) -> Option<&RevealedVote> {
        self.book.reveal(voter)
    }

    /// Revealed votes in first-commit order.
    pub fn reveals(&self) -> impl Iterator<Item = (&AccountId, &RevealedVote)> {
        self.book.revealed()
    }

    pub fn reveal_count(&self) -> usize {
        self.book.reveal_count()
    }

    fn side_total(&self, direction: VoteDirection) -> u128 {
        match direction {
            VoteDirection::Up => self.up_stake,
            VoteDirection::Down => self.down_stake,
        }
    }
}
