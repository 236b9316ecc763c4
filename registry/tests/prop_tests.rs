use proptest::prelude::*;

use tcrank_crypto::commitment_hash;
use tcrank_ledger::{AdminSet, MemoryLedger};
use tcrank_registry::RankingEngine;
use tcrank_types::{AccountId, RankingConfig, Timestamp, VoteDirection, TOKEN};

fn vote() -> impl Strategy<Value = (bool, u128)> {
    (any::<bool>(), 1u128..5_000)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Through any sequence of polls the rank stays within `[0, max_rank]`,
    /// and no voter ever gets back more than they escrowed.
    #[test]
    fn rank_bounded_and_releases_capped(
        initial in 0u128..20_000,
        rounds in proptest::collection::vec(proptest::collection::vec(vote(), 0..4), 1..6),
        probes in proptest::collection::vec(0u64..5_000, 1..8),
    ) {
        let admin = AccountId::new("admin");
        let config = RankingConfig {
            max_rank: 5_000 * TOKEN,
            ..RankingConfig::tcrank_defaults()
        };
        let max_rank = config.max_rank;
        let commit_ttl = config.commit_ttl_secs;
        let reveal_ttl = config.reveal_ttl_secs;
        let mut engine = RankingEngine::new(MemoryLedger::new(), AdminSet::single(admin.clone()));
        engine.init(&admin, config).unwrap();
        let item = engine
            .new_item(&AccountId::new("owner"), initial * TOKEN, Timestamp::new(0))
            .unwrap();

        let mut now = 0u64;
        let mut escrowed: Vec<(u64, AccountId, u128)> = Vec::new();
        for (round, votes) in rounds.iter().enumerate() {
            let poll = engine.start_default_poll(item, Timestamp::new(now)).unwrap();
            let voters: Vec<AccountId> = (0..votes.len())
                .map(|i| AccountId::new(format!("r{round}v{i}")))
                .collect();
            for (voter, (up, stake)) in voters.iter().zip(votes) {
                engine.ledger_mut().mint(voter, 100_000 * TOKEN).unwrap();
                let direction = if *up { VoteDirection::Up } else { VoteDirection::Down };
                let hash = commitment_hash(direction, stake * TOKEN, 7);
                engine.commit_vote(poll, voter, hash, Timestamp::new(now)).unwrap();
            }
            let reveal_at = Timestamp::new(now + commit_ttl + 1);
            for (voter, (up, stake)) in voters.iter().zip(votes) {
                let direction = if *up { VoteDirection::Up } else { VoteDirection::Down };
                engine
                    .reveal_vote(poll, voter, direction, stake * TOKEN, 7, reveal_at)
                    .unwrap();
                escrowed.push((poll, voter.clone(), stake * TOKEN));
            }
            now += commit_ttl + reveal_ttl + 1;
            engine.finish_voting(poll, Timestamp::new(now)).unwrap();

            for probe in &probes {
                let rank = engine.current_rank(item, Timestamp::new(now + probe)).unwrap();
                prop_assert!(rank <= max_rank);
            }
            now += 10;
        }

        let far = Timestamp::new(now + 10_000_000);
        for (poll, voter, stake) in escrowed {
            let mut released = 0u128;
            if engine.stake_record(poll, &voter).map_or(false, |r| r.is_releasable()) {
                released += engine.unstake(poll, &voter, far).unwrap();
                released += engine.unstake(poll, &voter, far).unwrap();
                prop_assert_eq!(released, stake);
            }
        }
    }
}
