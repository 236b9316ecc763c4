//! Random play: curators commit, reveal, finish and withdraw on a shared clock.

use crate::config::SimConfig;
use anyhow::Context;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tcrank_crypto::{commitment_hash, generate_salt};
use tcrank_ledger::{AdminSet, BalanceLedger, MemoryLedger};
use tcrank_nullables::{NullClock, NullStore};
use tcrank_registry::{RankingEngine, RankingError};
use tcrank_types::{AccountId, ItemId, MoveDirection, PollId, VoteDirection, TOKEN};

type Engine = RankingEngine<MemoryLedger, AdminSet>;

/// Tallies of one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SimStats {
    pub polls: usize,
    pub commits: usize,
    pub reveals: usize,
    pub up_outcomes: usize,
    pub down_outcomes: usize,
    pub neutral_outcomes: usize,
    pub released: u128,
    pub elapsed_secs: u64,
}

/// Final state of a run.
pub struct SimReport {
    /// `(item, rank)`, highest rank first.
    pub ranking: Vec<(ItemId, u128)>,
    /// `(account, balance)` for every voter, then the treasury.
    pub balances: Vec<(AccountId, u128)>,
    pub stats: SimStats,
}

struct Ballot {
    voter: AccountId,
    direction: VoteDirection,
    stake: u128,
    salt: u128,
}

pub struct Simulation {
    config: SimConfig,
    engine: Engine,
    clock: NullClock,
    rng: StdRng,
    voters: Vec<AccountId>,
    items: Vec<ItemId>,
    /// Polls a voter may still withdraw from.
    pending: Vec<(PollId, AccountId)>,
    stats: SimStats,
}

impl Simulation {
    pub fn new(config: SimConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let admin = AccountId::new("admin");
        let clock = NullClock::default();
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut engine = RankingEngine::new(MemoryLedger::new(), AdminSet::single(admin.clone()));
        engine.init(&admin, config.ranking.to_config())?;

        let voters: Vec<AccountId> = (0..config.voters)
            .map(|i| AccountId::new(format!("curator-{i}")))
            .collect();
        let funds = u128::from(config.initial_balance_tokens) * TOKEN;
        for voter in &voters {
            engine.ledger_mut().mint(voter, funds)?;
        }

        let max_rank = config.ranking.to_config().max_rank;
        let owner = AccountId::new("publisher");
        let ranks: Vec<u128> = (0..config.items)
            .map(|_| rng.gen_range(0..=max_rank / 10))
            .collect();
        let items = engine.new_items(&owner, &ranks, clock.now())?;
        tracing::info!(
            items = items.len(),
            voters = voters.len(),
            seed = config.seed,
            "simulation set up"
        );

        Ok(Self {
            config,
            engine,
            clock,
            rng,
            voters,
            items,
            pending: Vec::new(),
            stats: SimStats::default(),
        })
    }

    pub fn run(mut self) -> anyhow::Result<SimReport> {
        let started = self.clock.now();
        for round in 0..self.config.rounds {
            self.play_round(round)
                .with_context(|| format!("round {round}"))?;
            self.withdraw_due()?;
            let gap = self.rng.gen_range(0..=self.config.max_gap_secs);
            self.clock.advance(gap);
        }

        // Long enough for every winner to withdraw in full.
        let speed = self.engine.config().map_or(1, |c| c.unstake_speed);
        let max_stake = u128::from(self.config.max_stake_tokens) * TOKEN;
        let drain = u64::try_from(max_stake / speed + 1).unwrap_or(u64::MAX);
        self.clock.advance(drain);
        self.withdraw_due()?;
        self.stats.elapsed_secs = started.elapsed_since(self.clock.now());

        self.check_snapshot()?;
        Ok(self.report())
    }

    fn play_round(&mut self, round: usize) -> anyhow::Result<()> {
        let item = self.items[self.rng.gen_range(0..self.items.len())];
        let poll = self.engine.start_default_poll(item, self.clock.now())?;
        let config = self.config.ranking.to_config();
        self.stats.polls += 1;

        let mut ballots = Vec::new();
        for voter in &self.voters {
            if !self.rng.gen_ratio(u32::from(self.config.turnout_percent), 100) {
                continue;
            }
            let direction = if self.rng.gen_bool(0.5) {
                VoteDirection::Up
            } else {
                VoteDirection::Down
            };
            let stake = self.rng.gen_range(1..=self.config.max_stake_tokens);
            ballots.push(Ballot {
                voter: voter.clone(),
                direction,
                stake: u128::from(stake) * TOKEN,
                salt: generate_salt(),
            });
        }

        let mut committed = Vec::new();
        for ballot in ballots {
            let hash = commitment_hash(ballot.direction, ballot.stake, ballot.salt);
            match self.engine.commit_vote(poll, &ballot.voter, hash, self.clock.now()) {
                Ok(()) => {
                    self.stats.commits += 1;
                    committed.push(ballot);
                }
                Err(RankingError::InsufficientBalance { .. }) => {
                    tracing::debug!(voter = %ballot.voter, "cannot afford commit, skipping");
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.clock.advance(config.commit_ttl_secs + 1);
        for ballot in committed {
            if !self.rng.gen_ratio(u32::from(self.config.reveal_percent), 100) {
                continue;
            }
            let result = self.engine.reveal_vote(
                poll,
                &ballot.voter,
                ballot.direction,
                ballot.stake,
                ballot.salt,
                self.clock.now(),
            );
            match result {
                Ok(()) => {
                    self.stats.reveals += 1;
                    self.pending.push((poll, ballot.voter));
                }
                Err(RankingError::InsufficientBalance { .. }) => {
                    tracing::debug!(voter = %ballot.voter, "cannot afford reveal, skipping");
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.clock.advance(config.reveal_ttl_secs);
        let outcome = self.engine.finish_voting(poll, self.clock.now())?;
        match outcome.direction {
            MoveDirection::Up => self.stats.up_outcomes += 1,
            MoveDirection::Down => self.stats.down_outcomes += 1,
            MoveDirection::Neutral => self.stats.neutral_outcomes += 1,
        }
        let rank = self.engine.current_rank(item, self.clock.now())?;
        tracing::info!(
            round,
            item,
            poll,
            direction = %outcome.direction,
            rank,
            "round finished"
        );
        Ok(())
    }

    /// Withdraw whatever has accrued; forget records that are done or lost.
    fn withdraw_due(&mut self) -> anyhow::Result<()> {
        let now = self.clock.now();
        let mut still_pending = Vec::new();
        for (poll, voter) in std::mem::take(&mut self.pending) {
            match self.engine.unstake(poll, &voter, now) {
                Ok(amount) => {
                    self.stats.released += amount;
                    let done = self
                        .engine
                        .stake_record(poll, &voter)
                        .map_or(true, |r| r.is_settled());
                    if !done {
                        still_pending.push((poll, voter));
                    }
                }
                Err(RankingError::Unauthorized(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        self.pending = still_pending;
        Ok(())
    }

    /// Round-trip the engine through a store and make sure nothing changes.
    fn check_snapshot(&self) -> anyhow::Result<()> {
        let store = NullStore::new();
        self.engine.save_to_store(&store)?;
        let restored: Engine = RankingEngine::load_from_store(
            &store,
            self.engine.ledger().clone(),
            self.engine.access().clone(),
        )?;
        let now = self.clock.now();
        anyhow::ensure!(
            restored.items_with_rank(now) == self.engine.items_with_rank(now),
            "snapshot changed item ranks"
        );
        anyhow::ensure!(
            restored.avg_stake() == self.engine.avg_stake(),
            "snapshot changed the average stake"
        );
        tracing::debug!(entries = store.len(), "snapshot verified");
        Ok(())
    }

    fn report(&self) -> SimReport {
        let now = self.clock.now();
        let mut ranking = self.engine.items_with_rank(now);
        ranking.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let ledger = self.engine.ledger();
        let mut balances: Vec<(AccountId, u128)> = self
            .voters
            .iter()
            .map(|v| (v.clone(), ledger.balance_of(v)))
            .collect();
        if let Some(config) = self.engine.config() {
            balances.push((config.treasury.clone(), ledger.balance_of(&config.treasury)));
        }
        SimReport {
            ranking,
            balances,
            stats: self.stats.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(seed: u64) -> SimConfig {
        SimConfig {
            items: 3,
            voters: 4,
            rounds: 6,
            seed,
            ..SimConfig::default()
        }
    }

    #[test]
    fn same_seed_same_run() {
        let a = Simulation::new(small_config(7)).unwrap().run().unwrap();
        let b = Simulation::new(small_config(7)).unwrap().run().unwrap();
        assert_eq!(a.ranking, b.ranking);
        assert_eq!(a.balances, b.balances);
        assert_eq!(a.stats, b.stats);
    }

    #[test]
    fn tokens_are_conserved() {
        let config = small_config(3);
        let funds = u128::from(config.initial_balance_tokens) * TOKEN * config.voters as u128;
        let report = Simulation::new(config).unwrap().run().unwrap();
        let total: u128 = report.balances.iter().map(|(_, b)| b).sum();
        assert_eq!(total, funds);
        assert_eq!(report.stats.polls, 6);
        assert_eq!(
            report.stats.up_outcomes + report.stats.down_outcomes + report.stats.neutral_outcomes,
            6
        );
    }
}
