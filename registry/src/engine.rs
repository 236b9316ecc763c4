//! The ranking engine: item registry, polls, rank movement, fees and stake.

use crate::error::RankingError;
use crate::item::Item;
use std::collections::BTreeMap;
use tcrank_fees::FeeCalculator;
use tcrank_ledger::{AccessControl, BalanceLedger};
use tcrank_moving::{Moving, RankMover};
use tcrank_stake::{StakeStatus, UnstakeScheduler, VoterStakeRecord};
use tcrank_types::{
    AccountId, CommitHash, ItemId, MoveDirection, ParamsError, PollId, RankingConfig, Timestamp,
    VoteDirection,
};
use tcrank_voting::{Poll, PollOutcome, PollPhase};

/// Owns every item, poll, trajectory and escrow record.
///
/// Every state-changing method takes the caller's clock reading and either
/// completes fully or returns an error with no state changed: all validation
/// and the single ledger debit happen before anything is mutated.
pub struct RankingEngine<L, A> {
    pub(crate) config: Option<RankingConfig>,
    pub(crate) ledger: L,
    pub(crate) access: A,
    pub(crate) items: BTreeMap<ItemId, Item>,
    pub(crate) polls: BTreeMap<PollId, Poll>,
    pub(crate) mover: RankMover,
    pub(crate) stakes: UnstakeScheduler,
    pub(crate) next_item_id: ItemId,
    pub(crate) next_poll_id: PollId,
    pub(crate) avg_stake: u128,
    /// Latest clock reading accepted by a write.
    pub(crate) last_seen: Timestamp,
}

impl<L: BalanceLedger, A: AccessControl> RankingEngine<L, A> {
    /// An engine that accepts nothing but [`Self::init`] until configured.
    pub fn new(ledger: L, access: A) -> Self {
        Self {
            config: None,
            ledger,
            access,
            items: BTreeMap::new(),
            polls: BTreeMap::new(),
            mover: RankMover::new(0),
            stakes: UnstakeScheduler::new(),
            next_item_id: 1,
            next_poll_id: 1,
            avg_stake: 0,
            last_seen: Timestamp::EPOCH,
        }
    }

    /// One-time configuration. Admin only.
    pub fn init(&mut self, caller: &AccountId, config: RankingConfig) -> Result<(), RankingError> {
        self.access.require_admin(caller)?;
        if self.config.is_some() {
            return Err(RankingError::AlreadyInitialized);
        }
        config.validate()?;

        self.mover = RankMover::new(config.max_rank);
        self.avg_stake = config.initial_avg_stake;
        tracing::info!(
            %caller,
            max_rank = config.max_rank,
            commit_ttl = config.commit_ttl_secs,
            reveal_ttl = config.reveal_ttl_secs,
            "ranking engine initialised"
        );
        self.config = Some(config);
        Ok(())
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> Option<&RankingConfig> {
        self.config.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.config.is_some()
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Direct ledger access, for funding accounts in tests and simulation.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn access(&self) -> &A {
        &self.access
    }

    /// Current reference average stake; new polls snapshot it.
    pub fn avg_stake(&self) -> u128 {
        self.avg_stake
    }

    pub fn item(&self, item_id: ItemId) -> Option<&Item> {
        self.items.get(&item_id)
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items.keys().copied().collect()
    }

    pub fn poll(&self, poll_id: PollId) -> Option<&Poll> {
        self.polls.get(&poll_id)
    }

    pub fn poll_exists(&self, poll_id: PollId) -> bool {
        self.polls.contains_key(&poll_id)
    }

    /// The item's poll that has not been finished yet.
    pub fn open_poll(&self, item_id: ItemId) -> Option<&Poll> {
        self.items
            .get(&item_id)
            .and_then(|item| item.open_poll)
            .and_then(|id| self.polls.get(&id))
    }

    pub fn stake_record(&self, poll_id: PollId, voter: &AccountId) -> Option<&VoterStakeRecord> {
        self.stakes.record(poll_id, voter)
    }

    // ── Items and ranks ─────────────────────────────────────────────────

    /// Register an item at a baseline rank. Ranks above the ceiling are clamped.
    pub fn new_item(
        &mut self,
        owner: &AccountId,
        initial_rank: u128,
        now: Timestamp,
    ) -> Result<ItemId, RankingError> {
        let max_rank = self.require_config()?.max_rank;
        self.check_clock(now)?;
        let id = self.next_item_id;
        let next = id.checked_add(1).ok_or(RankingError::Overflow)?;

        let rank = if initial_rank > max_rank {
            tracing::warn!(
                item = id,
                requested = initial_rank,
                max_rank,
                "initial rank above ceiling, clamping"
            );
            max_rank
        } else {
            initial_rank
        };

        self.mover.track(id, rank, now)?;
        self.items.insert(id, Item::new(id, owner.clone(), rank, now));
        self.next_item_id = next;
        self.accept_clock(now);
        tracing::info!(item = id, %owner, rank, "item created");
        Ok(id)
    }

    /// Register several items, one per rank, in order.
    pub fn new_items(
        &mut self,
        owner: &AccountId,
        ranks: &[u128],
        now: Timestamp,
    ) -> Result<Vec<ItemId>, RankingError> {
        self.require_config()?;
        self.check_clock(now)?;
        let count = u64::try_from(ranks.len()).map_err(|_| RankingError::Overflow)?;
        self.next_item_id
            .checked_add(count)
            .ok_or(RankingError::Overflow)?;

        ranks
            .iter()
            .map(|rank| self.new_item(owner, *rank, now))
            .collect()
    }

    /// Remove an item. Owner or admin only.
    ///
    /// Refused while the item's open poll holds escrowed stake. An open poll
    /// with no escrow is discarded. Finished polls and their stake records
    /// stay so winners can still withdraw.
    pub fn remove_item(
        &mut self,
        caller: &AccountId,
        item_id: ItemId,
        now: Timestamp,
    ) -> Result<(), RankingError> {
        self.require_config()?;
        self.check_clock(now)?;
        let item = self.item_or_not_found(item_id)?;
        if &item.owner != caller && !self.access.is_admin(caller) {
            return Err(RankingError::Unauthorized(caller.clone()));
        }
        let open = item.open_poll;
        if let Some(poll) = open.and_then(|id| self.polls.get(&id)) {
            if poll.has_escrow() {
                return Err(RankingError::InvalidPhase {
                    expected: PollPhase::Finished,
                    actual: poll.phase_at(now),
                });
            }
        }

        if let Some(poll_id) = open {
            self.polls.remove(&poll_id);
            self.stakes.discard(poll_id);
            tracing::debug!(item = item_id, poll = poll_id, "discarded open poll");
        }
        self.mover.untrack(item_id)?;
        self.items.remove(&item_id);
        self.accept_clock(now);
        tracing::info!(item = item_id, %caller, "item removed");
        Ok(())
    }

    /// The item's rank at `now`. Pure read; any clock reading is accepted.
    pub fn current_rank(&self, item_id: ItemId, now: Timestamp) -> Result<u128, RankingError> {
        self.item_or_not_found(item_id)?;
        Ok(self.mover.current_rank(item_id, now)?)
    }

    /// Every item with its rank at `now`, in id order.
    pub fn items_with_rank(&self, now: Timestamp) -> Vec<(ItemId, u128)> {
        self.items
            .keys()
            .filter_map(|id| self.mover.current_rank(*id, now).ok().map(|r| (*id, r)))
            .collect()
    }

    /// The trajectory driving the item at `now`; `None` once it floored at zero.
    pub fn active_moving(
        &self,
        item_id: ItemId,
        now: Timestamp,
    ) -> Result<Option<&Moving>, RankingError> {
        self.item_or_not_found(item_id)?;
        Ok(self.mover.active_moving(item_id, now)?)
    }

    /// Trajectories the item has left behind, oldest first.
    pub fn moving_history(&self, item_id: ItemId) -> Result<&[Moving], RankingError> {
        self.item_or_not_found(item_id)?;
        Ok(self.mover.history(item_id)?)
    }

    // ── Fees ────────────────────────────────────────────────────────────

    /// Fixed commission a commit to this item would pay at `now`.
    pub fn fixed_commission(&self, item_id: ItemId, now: Timestamp) -> Result<u128, RankingError> {
        let config = self.require_config()?;
        let rank = self.current_rank(item_id, now)?;
        Ok(FeeCalculator::new(config).fixed_commission(rank)?)
    }

    /// Dynamic commission for `stake` against the current average stake.
    pub fn dynamic_commission(&self, stake: u128) -> Result<u128, RankingError> {
        let config = self.require_config()?;
        Ok(FeeCalculator::new(config).dynamic_commission(stake, self.avg_stake)?)
    }

    // ── Polls ───────────────────────────────────────────────────────────

    /// Open a poll on an item. Fails while the item has an unfinished poll.
    pub fn start_poll(
        &mut self,
        item_id: ItemId,
        commit_ttl_secs: u64,
        reveal_ttl_secs: u64,
        now: Timestamp,
    ) -> Result<PollId, RankingError> {
        self.require_config()?;
        self.check_clock(now)?;
        if commit_ttl_secs == 0 {
            return Err(ParamsError::Zero("commit_ttl_secs").into());
        }
        if reveal_ttl_secs == 0 {
            return Err(ParamsError::Zero("reveal_ttl_secs").into());
        }
        self.item_or_not_found(item_id)?;
        if let Some(open) = self.open_poll(item_id) {
            return Err(RankingError::InvalidPhase {
                expected: PollPhase::Finished,
                actual: open.phase_at(now),
            });
        }
        let id = self.next_poll_id;
        let next = id.checked_add(1).ok_or(RankingError::Overflow)?;

        let poll = Poll::open(id, item_id, now, commit_ttl_secs, reveal_ttl_secs, self.avg_stake);
        tracing::info!(
            poll = id,
            item = item_id,
            commit_deadline = %poll.commit_deadline,
            reveal_deadline = %poll.reveal_deadline,
            avg_stake = poll.avg_stake,
            "poll started"
        );
        self.polls.insert(id, poll);
        if let Some(item) = self.items.get_mut(&item_id) {
            item.open_poll = Some(id);
            item.polls.push(id);
        }
        self.next_poll_id = next;
        self.accept_clock(now);
        Ok(id)
    }

    /// [`Self::start_poll`] with the configured windows.
    pub fn start_default_poll(
        &mut self,
        item_id: ItemId,
        now: Timestamp,
    ) -> Result<PollId, RankingError> {
        let config = self.require_config()?;
        let (commit_ttl, reveal_ttl) = (config.commit_ttl_secs, config.reveal_ttl_secs);
        self.start_poll(item_id, commit_ttl, reveal_ttl, now)
    }

    /// Submit (or replace) a commitment, paying the fixed commission.
    pub fn commit_vote(
        &mut self,
        poll_id: PollId,
        voter: &AccountId,
        hash: CommitHash,
        now: Timestamp,
    ) -> Result<(), RankingError> {
        let fee = self.check_commit(poll_id, voter, now)?;
        let treasury = self.treasury()?;

        self.ledger.debit(voter, fee)?;
        self.ledger.credit(&treasury, fee);
        let poll = self.poll_mut_or_not_found(poll_id)?;
        let replaced = poll.commit(voter, hash, now)?;
        self.accept_clock(now);
        tracing::debug!(poll = poll_id, %voter, fee, replaced, "vote committed");
        Ok(())
    }

    /// Commit to the item's open poll, starting one with the configured
    /// windows when none is open. Returns the poll committed to.
    pub fn vote_commit(
        &mut self,
        item_id: ItemId,
        voter: &AccountId,
        hash: CommitHash,
        now: Timestamp,
    ) -> Result<PollId, RankingError> {
        self.require_config()?;
        self.check_clock(now)?;
        self.item_or_not_found(item_id)?;
        if let Some(poll_id) = self.open_poll(item_id).map(|poll| poll.id) {
            self.commit_vote(poll_id, voter, hash, now)?;
            return Ok(poll_id);
        }

        // The implicit poll must not outlive a commit that cannot be paid for.
        let fee = self.fixed_commission(item_id, now)?;
        self.ledger.can_debit(voter, fee)?;
        self.next_poll_id
            .checked_add(1)
            .ok_or(RankingError::Overflow)?;

        let poll_id = self.start_default_poll(item_id, now)?;
        self.commit_vote(poll_id, voter, hash, now)?;
        Ok(poll_id)
    }

    /// Disclose a committed vote. Pays the dynamic commission and escrows the stake
    /// in one debit.
    pub fn reveal_vote(
        &mut self,
        poll_id: PollId,
        voter: &AccountId,
        direction: VoteDirection,
        stake: u128,
        salt: u128,
        now: Timestamp,
    ) -> Result<(), RankingError> {
        let config = self.require_config()?;
        self.check_clock(now)?;
        let poll = self.poll_or_not_found(poll_id)?;
        poll.check_reveal(voter, direction, stake, salt, now)?;
        let fee = FeeCalculator::new(config).dynamic_commission(stake, poll.avg_stake)?;
        let total = fee.checked_add(stake).ok_or(RankingError::Overflow)?;
        self.stakes.check_escrow(poll_id, voter, stake)?;
        let treasury = config.treasury.clone();

        self.ledger.debit(voter, total)?;
        self.ledger.credit(&treasury, fee);
        self.stakes.escrow(poll_id, voter, stake)?;
        self.poll_mut_or_not_found(poll_id)?
            .reveal(voter, direction, stake, salt, now)?;
        self.accept_clock(now);
        tracing::debug!(poll = poll_id, %voter, %direction, stake, fee, "vote revealed");
        Ok(())
    }

    /// [`Self::reveal_vote`] on the item's open poll.
    pub fn vote_reveal(
        &mut self,
        item_id: ItemId,
        voter: &AccountId,
        direction: VoteDirection,
        stake: u128,
        salt: u128,
        now: Timestamp,
    ) -> Result<PollId, RankingError> {
        let poll_id = self.open_poll_id(item_id)?;
        self.reveal_vote(poll_id, voter, direction, stake, salt, now)?;
        Ok(poll_id)
    }

    /// Tally a closed poll, settle its escrow and launch the item's new
    /// trajectory from the rank it has at `now`.
    pub fn finish_voting(
        &mut self,
        poll_id: PollId,
        now: Timestamp,
    ) -> Result<PollOutcome, RankingError> {
        let config = self.require_config()?;
        self.check_clock(now)?;
        let poll = self
            .polls
            .get(&poll_id)
            .ok_or_else(|| RankingError::NotFound(format!("poll {poll_id}")))?;
        poll.check_finish(now)?;

        let (up, down) = poll.stakes();
        let (direction, imbalance) = if up > down {
            (MoveDirection::Up, up - down)
        } else if down > up {
            (MoveDirection::Down, down - up)
        } else {
            (MoveDirection::Neutral, 0)
        };
        let speed = FeeCalculator::new(config).movement_speed(imbalance, poll.avg_stake)?;
        let item_id = poll.item_id;
        self.mover.check_apply(item_id)?;
        let next_avg = next_avg_stake(self.avg_stake, poll.overall_stake(), poll.reveal_count());
        let treasury = config.treasury.clone();

        let winning_side = match direction {
            MoveDirection::Up => Some(VoteDirection::Up),
            MoveDirection::Down => Some(VoteDirection::Down),
            MoveDirection::Neutral => None,
        };
        let summary = self.stakes.settle_poll(poll_id, now, |voter| {
            let side = poll.revealed_vote(voter).map(|vote| vote.direction);
            match winning_side {
                None => StakeStatus::Refunded,
                Some(winner) if side == Some(winner) => StakeStatus::Won,
                Some(_) => StakeStatus::Forfeited,
            }
        })?;

        let outcome = self.poll_mut_or_not_found(poll_id)?.finish(now)?.clone();
        let moving = self.mover.apply(item_id, direction, speed, poll_id, now)?;
        let anchor = moving.anchor_rank;
        self.ledger.credit(&treasury, summary.forfeited_amount);
        if let Some(avg) = next_avg {
            self.avg_stake = avg;
        }
        if let Some(item) = self.items.get_mut(&item_id) {
            item.open_poll = None;
        }
        self.accept_clock(now);

        tracing::info!(
            poll = poll_id,
            item = item_id,
            %direction,
            up = outcome.up_stake,
            down = outcome.down_stake,
            speed,
            anchor,
            winners = summary.winners,
            forfeited = summary.forfeited_amount,
            avg_stake = self.avg_stake,
            "poll finished"
        );
        Ok(outcome)
    }

    /// [`Self::finish_voting`] on the item's open poll.
    pub fn finish_item_voting(
        &mut self,
        item_id: ItemId,
        now: Timestamp,
    ) -> Result<PollOutcome, RankingError> {
        let poll_id = self.open_poll_id(item_id)?;
        self.finish_voting(poll_id, now)
    }

    // ── Poll read side ──────────────────────────────────────────────────

    /// Winning direction of a finished poll.
    pub fn poll_result(&self, poll_id: PollId, now: Timestamp) -> Result<MoveDirection, RankingError> {
        Ok(self.poll_or_not_found(poll_id)?.result(now)?)
    }

    /// Revealed `(up, down)` stake.
    pub fn poll_stakes(&self, poll_id: PollId) -> Result<(u128, u128), RankingError> {
        Ok(self.poll_or_not_found(poll_id)?.stakes())
    }

    pub fn overall_stake(&self, poll_id: PollId) -> Result<u128, RankingError> {
        Ok(self.poll_or_not_found(poll_id)?.overall_stake())
    }

    pub fn is_winner(&self, poll_id: PollId, voter: &AccountId) -> Result<bool, RankingError> {
        Ok(self.poll_or_not_found(poll_id)?.is_winner(voter))
    }

    /// Voters of a poll in first-commit order.
    pub fn poll_voters(&self, poll_id: PollId) -> Result<&[AccountId], RankingError> {
        Ok(self.poll_or_not_found(poll_id)?.voters())
    }

    // ── Unstaking ───────────────────────────────────────────────────────

    /// Withdraw what has accrued on the voter's stake in a finished poll.
    /// Returns zero when nothing has accrued or all of it is already out.
    pub fn unstake(
        &mut self,
        poll_id: PollId,
        voter: &AccountId,
        now: Timestamp,
    ) -> Result<u128, RankingError> {
        let speed = self.require_config()?.unstake_speed;
        self.check_clock(now)?;
        self.poll_or_not_found(poll_id)?;
        if !self
            .stakes
            .record(poll_id, voter)
            .map_or(false, VoterStakeRecord::is_releasable)
        {
            return Err(RankingError::Unauthorized(voter.clone()));
        }

        let amount = self.stakes.release(poll_id, voter, now, speed)?;
        self.ledger.credit(voter, amount);
        self.accept_clock(now);
        tracing::debug!(poll = poll_id, %voter, amount, "stake released");
        Ok(amount)
    }

    /// Withdraw across every finished poll of an item in which the voter
    /// may withdraw. Works after the item was removed.
    pub fn unstake_item(
        &mut self,
        item_id: ItemId,
        voter: &AccountId,
        now: Timestamp,
    ) -> Result<u128, RankingError> {
        let speed = self.require_config()?.unstake_speed;
        self.check_clock(now)?;
        let poll_ids: Vec<PollId> = self
            .polls
            .values()
            .filter(|poll| poll.item_id == item_id)
            .map(|poll| poll.id)
            .collect();
        if poll_ids.is_empty() && !self.items.contains_key(&item_id) {
            return Err(RankingError::NotFound(format!("item {item_id}")));
        }

        let releasable: Vec<PollId> = poll_ids
            .into_iter()
            .filter(|id| {
                self.stakes
                    .record(*id, voter)
                    .map_or(false, VoterStakeRecord::is_releasable)
            })
            .collect();
        if releasable.is_empty() {
            return Err(RankingError::Unauthorized(voter.clone()));
        }
        let mut total = 0u128;
        for id in &releasable {
            let due = self.stakes.releasable(*id, voter, now, speed)?;
            total = total.checked_add(due).ok_or(RankingError::Overflow)?;
        }

        for id in releasable {
            self.stakes.release(id, voter, now, speed)?;
        }
        self.ledger.credit(voter, total);
        self.accept_clock(now);
        tracing::debug!(item = item_id, %voter, amount = total, "item stake released");
        Ok(total)
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    pub(crate) fn require_config(&self) -> Result<&RankingConfig, RankingError> {
        self.config.as_ref().ok_or(RankingError::NotInitialized)
    }

    fn treasury(&self) -> Result<AccountId, RankingError> {
        Ok(self.require_config()?.treasury.clone())
    }

    fn check_clock(&self, now: Timestamp) -> Result<(), RankingError> {
        if now < self.last_seen {
            return Err(RankingError::InvalidTimestamp {
                now,
                last: self.last_seen,
            });
        }
        Ok(())
    }

    fn accept_clock(&mut self, now: Timestamp) {
        if now > self.last_seen {
            self.last_seen = now;
        }
    }

    /// Everything `commit_vote` validates; returns the fee to charge.
    fn check_commit(
        &self,
        poll_id: PollId,
        voter: &AccountId,
        now: Timestamp,
    ) -> Result<u128, RankingError> {
        let config = self.require_config()?;
        self.check_clock(now)?;
        let poll = self.poll_or_not_found(poll_id)?;
        poll.ensure_phase(PollPhase::Commit, now)?;
        let rank = self.mover.current_rank(poll.item_id, now)?;
        let fee = FeeCalculator::new(config).fixed_commission(rank)?;
        self.ledger.can_debit(voter, fee)?;
        Ok(fee)
    }

    fn item_or_not_found(&self, item_id: ItemId) -> Result<&Item, RankingError> {
        self.items
            .get(&item_id)
            .ok_or_else(|| RankingError::NotFound(format!("item {item_id}")))
    }

    fn poll_or_not_found(&self, poll_id: PollId) -> Result<&Poll, RankingError> {
        self.polls
            .get(&poll_id)
            .ok_or_else(|| RankingError::NotFound(format!("poll {poll_id}")))
    }

    fn poll_mut_or_not_found(&mut self, poll_id: PollId) -> Result<&mut Poll, RankingError> {
        self.polls
            .get_mut(&poll_id)
            .ok_or_else(|| RankingError::NotFound(format!("poll {poll_id}")))
    }

    fn open_poll_id(&self, item_id: ItemId) -> Result<PollId, RankingError> {
        self.item_or_not_found(item_id)?
            .open_poll
            .ok_or_else(|| RankingError::NotFound(format!("open poll on item {item_id}")))
    }
}

/// `(avg + total / reveals) / 2`, never below 1. `None` when nobody revealed.
fn next_avg_stake(avg: u128, total: u128, reveals: usize) -> Option<u128> {
    if reveals == 0 {
        return None;
    }
    let mean = total / reveals as u128;
    let half_sum = avg / 2 + mean / 2 + (avg % 2 + mean % 2) / 2;
    Some(half_sum.max(1))
}
