//! Per-voter commitment and reveal tables.

use crate::error::PollError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tcrank_crypto::verify_commitment;
use tcrank_types::{AccountId, CommitHash, VoteDirection};

/// A disclosed vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedVote {
    pub direction: VoteDirection,
    pub stake: u128,
}

/// Commitments and reveals of one poll, keyed by voter.
///
/// `voters` keeps first-commit order so enumeration is deterministic.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CommitRevealBook {
    voters: Vec<AccountId>,
    commitments: HashMap<AccountId, CommitHash>,
    reveals: HashMap<AccountId, RevealedVote>,
}

impl CommitRevealBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or overwrite) a voter's commitment. Returns true when it replaced
    /// an earlier commitment of the same voter.
    pub fn record_commitment(&mut self, voter: &AccountId, hash: CommitHash) -> bool {
        let replaced = self.commitments.insert(voter.clone(), hash).is_some();
        if !replaced {
            self.voters.push(voter.clone());
        }
        replaced
    }

    /// Check a disclosed triple against the stored commitment without recording it.
    pub fn check_reveal(
        &self,
        voter: &AccountId,
        direction: VoteDirection,
        stake: u128,
        salt: u128,
    ) -> Result<(), PollError> {
        let stored = self
            .commitments
            .get(voter)
            .ok_or_else(|| PollError::NotCommitted(voter.clone()))?;
        if self.reveals.contains_key(voter) {
            return Err(PollError::AlreadyRevealed(voter.clone()));
        }
        if !verify_commitment(stored, direction, stake, salt) {
            return Err(PollError::HashMismatch(voter.clone()));
        }
        Ok(())
    }

    /// Record a reveal that has already passed [`Self::check_reveal`].
    pub(crate) fn record_reveal(&mut self, voter: &AccountId, vote: RevealedVote) {
        self.reveals.insert(voter.clone(), vote);
    }

    pub fn commitment(&self, voter: &AccountId) -> Option<&CommitHash> {
        self.commitments.get(voter)
    }

    pub fn reveal(&self, voter: &AccountId) -> Option<&RevealedVote> {
        self.reveals.get(voter)
    }

    /// Every voter who committed, in first-commit order.
    pub fn voters(&self) -> &[AccountId] {
        &self.voters
    }

    /// Revealed votes in first-commit order.
    pub fn revealed(&self) -> impl Iterator<Item = (&AccountId, &RevealedVote)> {
        self.voters
            .iter()
            .filter_map(move |v| self.reveals.get(v).map(|r| (v, r)))
    }

    pub fn commit_count(&self) -> usize {
        self.commitments.len()
    }

    pub fn reveal_count(&self) -> usize {
        self.reveals.len()
    }
}
