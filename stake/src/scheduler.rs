//! Escrow book and release scheduler.

use crate::error::StakeError;
use crate::record::{StakeStatus, VoterStakeRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tcrank_types::{AccountId, PollId, Timestamp};

/// Result of settling one poll's escrow.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SettlementSummary {
    pub winners: usize,
    pub refunded: usize,
    pub forfeited_voters: usize,
    /// Sum of forfeited stake, to be credited elsewhere by the caller.
    pub forfeited_amount: u128,
}

/// All escrow records, grouped per poll in reveal order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UnstakeScheduler {
    polls: HashMap<PollId, Vec<VoterStakeRecord>>,
}

impl UnstakeScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self, poll_id: PollId) -> &[VoterStakeRecord] {
        self.polls.get(&poll_id).map_or(&[], Vec::as_slice)
    }

    pub fn record(&self, poll_id: PollId, voter: &AccountId) -> Option<&VoterStakeRecord> {
        self.records(poll_id).iter().find(|r| &r.voter == voter)
    }

    pub fn has_poll(&self, poll_id: PollId) -> bool {
        self.polls.contains_key(&poll_id)
    }

    pub fn poll_ids(&self) -> Vec<PollId> {
        let mut ids: Vec<PollId> = self.polls.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Validate that [`Self::escrow`] would succeed.
    pub fn check_escrow(
        &self,
        poll_id: PollId,
        voter: &AccountId,
        amount: u128,
    ) -> Result<(), StakeError> {
        match self.record(poll_id, voter) {
            Some(existing) if existing.status != StakeStatus::Escrowed => {
                Err(StakeError::AlreadySettled(poll_id))
            }
            Some(existing) => existing
                .total
                .checked_add(amount)
                .map(|_| ())
                .ok_or(StakeError::Overflow),
            None => Ok(()),
        }
    }

    /// Hold `amount` for `voter` in `poll_id`.
    pub fn escrow(
        &mut self,
        poll_id: PollId,
        voter: &AccountId,
        amount: u128,
    ) -> Result<(), StakeError> {
        self.check_escrow(poll_id, voter, amount)?;
        let records = self.polls.entry(poll_id).or_default();
        match records.iter_mut().find(|r| &r.voter == voter) {
            Some(existing) => existing.total += amount,
            None => records.push(VoterStakeRecord::new(poll_id, voter.clone(), amount)),
        }
        Ok(())
    }

    /// Settle every record of a finished poll. `decide` maps each voter to
    /// `Won`, `Refunded` or `Forfeited`; release clocks start at `now`.
    pub fn settle_poll<F>(
        &mut self,
        poll_id: PollId,
        now: Timestamp,
        decide: F,
    ) -> Result<SettlementSummary, StakeError>
    where
        F: Fn(&AccountId) -> StakeStatus,
    {
        let mut summary = SettlementSummary::default();
        let records = match self.polls.get_mut(&poll_id) {
            Some(records) => records,
            None => return Ok(summary),
        };
        if records.iter().any(|r| r.status != StakeStatus::Escrowed) {
            return Err(StakeError::AlreadySettled(poll_id));
        }

        let decisions: Vec<StakeStatus> = records.iter().map(|r| decide(&r.voter)).collect();
        for (record, status) in records.iter().zip(&decisions) {
            match status {
                StakeStatus::Won => summary.winners += 1,
                StakeStatus::Refunded => summary.refunded += 1,
                StakeStatus::Forfeited => {
                    summary.forfeited_voters += 1;
                    summary.forfeited_amount = summary
                        .forfeited_amount
                        .checked_add(record.total)
                        .ok_or(StakeError::Overflow)?;
                }
                StakeStatus::Escrowed => {}
            }
        }

        for (record, status) in records.iter_mut().zip(decisions) {
            record.status = status;
            record.last_release_at = Some(now);
        }
        Ok(summary)
    }

    /// Amount `voter` could withdraw from `poll_id` at `now`. Pure read.
    pub fn releasable(
        &self,
        poll_id: PollId,
        voter: &AccountId,
        now: Timestamp,
        speed: u128,
    ) -> Result<u128, StakeError> {
        if !self.has_poll(poll_id) {
            return Err(StakeError::PollNotFound(poll_id));
        }
        let record = self
            .record(poll_id, voter)
            .ok_or_else(|| StakeError::RecordNotFound {
                poll_id,
                voter: voter.clone(),
            })?;
        if !record.is_releasable() {
            return Err(StakeError::NotReleasable {
                poll_id,
                voter: voter.clone(),
            });
        }
        Ok(record.releasable_at(now, speed))
    }

    /// Release what is due at `now` and advance the record's release clock.
    /// Returns the amount released; zero when nothing accrued or the record
    /// is already fully withdrawn.
    pub fn release(
        &mut self,
        poll_id: PollId,
        voter: &AccountId,
        now: Timestamp,
        speed: u128,
    ) -> Result<u128, StakeError> {
        let amount = self.releasable(poll_id, voter, now, speed)?;
        let record = self
            .polls
            .get_mut(&poll_id)
            .and_then(|records| records.iter_mut().find(|r| &r.voter == voter))
            .ok_or_else(|| StakeError::RecordNotFound {
                poll_id,
                voter: voter.clone(),
            })?;
        record.released += amount;
        if record.last_release_at.map_or(true, |last| last < now) {
            record.last_release_at = Some(now);
        }
        Ok(amount)
    }

    /// Total stake still held, across every poll.
    pub fn total_held(&self) -> u128 {
        self.polls
            .values()
            .flatten()
            .filter(|r| !r.is_forfeited())
            .fold(0u128, |acc, r| acc.saturating_add(r.remaining()))
    }

    /// Replace a poll's records wholesale (snapshot restore).
    pub fn restore(&mut self, poll_id: PollId, records: Vec<VoterStakeRecord>) {
        self.polls.insert(poll_id, records);
    }

    /// Drop the records of a poll that never settled with escrow.
    pub fn discard(&mut self, poll_id: PollId) -> Option<Vec<VoterStakeRecord>> {
        self.polls.remove(&poll_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voter(name: &str) -> AccountId {
        AccountId::new(name)
    }

    fn ts(secs: u64) -> Timestamp {
        Timestamp::new(secs)
    }

    fn settled_book() -> UnstakeScheduler {
        let mut book = UnstakeScheduler::new();
        book.escrow(7, &voter("alice"), 100).unwrap();
        book.escrow(7, &voter("bob"), 40).unwrap();
        book.escrow(7, &voter("carol"), 60).unwrap();
        let summary = book
            .settle_poll(7, ts(1_000), |v| {
                if v.as_str() == "bob" {
                    StakeStatus::Forfeited
                } else {
                    StakeStatus::Won
                }
            })
            .unwrap();
        assert_eq!(summary.winners, 2);
        assert_eq!(summary.forfeited_voters, 1);
        assert_eq!(summary.forfeited_amount, 40);
        book
    }

    #[test]
    fn escrow_accumulates() {
        let mut book = UnstakeScheduler::new();
        book.escrow(1, &voter("alice"), 10).unwrap();
        book.escrow(1, &voter("alice"), 5).unwrap();
        assert_eq!(book.record(1, &voter("alice")).unwrap().total, 15);
        assert_eq!(book.records(1).len(), 1);
    }

    #[test]
    fn escrow_overflow_is_rejected_without_change() {
        let mut book = UnstakeScheduler::new();
        book.escrow(1, &voter("alice"), u128::MAX).unwrap();
        assert_eq!(book.escrow(1, &voter("alice"), 1), Err(StakeError::Overflow));
        assert_eq!(book.record(1, &voter("alice")).unwrap().total, u128::MAX);
    }

    #[test]
    fn release_is_rate_bounded() {
        let mut book = settled_book();
        let alice = voter("alice");
        assert_eq!(book.release(7, &alice, ts(1_000), 10).unwrap(), 0);
        assert_eq!(book.release(7, &alice, ts(1_003), 10).unwrap(), 30);
        assert_eq!(book.release(7, &alice, ts(1_003), 10).unwrap(), 0);
        assert_eq!(book.release(7, &alice, ts(2_000), 10).unwrap(), 70);
        assert_eq!(book.release(7, &alice, ts(3_000), 10).unwrap(), 0);
        assert!(book.record(7, &alice).unwrap().is_settled());
    }

    #[test]
    fn losers_cannot_release() {
        let mut book = settled_book();
        assert!(matches!(
            book.release(7, &voter("bob"), ts(5_000), 10),
            Err(StakeError::NotReleasable { .. })
        ));
    }

    #[test]
    fn unknown_poll_and_voter() {
        let mut book = settled_book();
        assert_eq!(
            book.release(8, &voter("alice"), ts(5_000), 10),
            Err(StakeError::PollNotFound(8))
        );
        assert!(matches!(
            book.release(7, &voter("dave"), ts(5_000), 10),
            Err(StakeError::RecordNotFound { .. })
        ));
    }

    #[test]
    fn second_settlement_is_rejected() {
        let mut book = settled_book();
        assert_eq!(
            book.settle_poll(7, ts(2_000), |_| StakeStatus::Won),
            Err(StakeError::AlreadySettled(7))
        );
    }

    #[test]
    fn settling_empty_poll_is_a_no_op() {
        let mut book = UnstakeScheduler::new();
        let summary = book.settle_poll(3, ts(1), |_| StakeStatus::Won).unwrap();
        assert_eq!(summary, SettlementSummary::default());
    }

    #[test]
    fn total_held_excludes_forfeits_and_releases() {
        let mut book = settled_book();
        assert_eq!(book.total_held(), 160);
        book.release(7, &voter("carol"), ts(1_002), 10).unwrap();
        assert_eq!(book.total_held(), 140);
    }
}
