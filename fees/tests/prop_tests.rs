use proptest::prelude::*;

use tcrank_fees::FeeCalculator;
use tcrank_types::{RankingConfig, TOKEN};

proptest! {
    /// A higher rank never costs less to contest.
    #[test]
    fn fixed_commission_monotonic(a in 0u128..100_000 * TOKEN, b in 0u128..100_000 * TOKEN) {
        let config = RankingConfig::default();
        let fees = FeeCalculator::new(&config);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(fees.fixed_commission(lo).unwrap() <= fees.fixed_commission(hi).unwrap());
    }

    /// A larger stake never pays a smaller dynamic commission, and the fee
    /// never exceeds the fee of the capped stake.
    #[test]
    fn dynamic_commission_monotonic_and_capped(
        a in 0u128..1_000_000 * TOKEN,
        b in 0u128..1_000_000 * TOKEN,
        avg in 1u128..1_000 * TOKEN,
    ) {
        let config = RankingConfig::default();
        let fees = FeeCalculator::new(&config);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let fee_lo = fees.dynamic_commission(lo, avg).unwrap();
        let fee_hi = fees.dynamic_commission(hi, avg).unwrap();
        prop_assert!(fee_lo <= fee_hi);
        let cap = fees.stake_cap(avg).unwrap();
        prop_assert!(fee_hi <= fees.dynamic_commission(cap, avg).unwrap());
    }
}
