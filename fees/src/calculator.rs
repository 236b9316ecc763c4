//! Commission and movement-speed curves.

use crate::error::FeeError;
use tcrank_types::RankingConfig;

/// Pure fee curves parameterised by a [`RankingConfig`].
#[derive(Clone, Copy, Debug)]
pub struct FeeCalculator<'a> {
    config: &'a RankingConfig,
}

impl<'a> FeeCalculator<'a> {
    pub fn new(config: &'a RankingConfig) -> Self {
        Self { config }
    }

    /// Fixed commission for committing to an item currently at `rank`.
    ///
    /// `min(rank, max_rank) × max_fixed_fee_rate / max_fixed_fee_precision`,
    /// monotonically non-decreasing in `rank`.
    pub fn fixed_commission(&self, rank: u128) -> Result<u128, FeeError> {
        let rank = rank.min(self.config.max_rank);
        mul_div(
            rank,
            self.config.max_fixed_fee_rate,
            self.config.max_fixed_fee_precision,
        )
    }

    /// The most a single stake can contribute to fee basis or movement speed.
    pub fn stake_cap(&self, avg_stake: u128) -> Result<u128, FeeError> {
        if avg_stake == 0 {
            return Err(FeeError::ZeroAverageStake);
        }
        self.config
            .max_over_stake_factor
            .checked_mul(avg_stake)
            .ok_or(FeeError::Overflow)
    }

    /// Dynamic commission for revealing `stake` in a poll whose reference
    /// average stake is `avg_stake`.
    ///
    /// Linear in the stake up to the cap, flat beyond it.
    pub fn dynamic_commission(&self, stake: u128, avg_stake: u128) -> Result<u128, FeeError> {
        let basis = stake.min(self.stake_cap(avg_stake)?);
        mul_div(
            basis,
            self.config.dynamic_fee_linear_rate,
            self.config.dynamic_fee_linear_precision,
        )
    }

    /// Rank units per second produced by a stake imbalance between the two sides.
    pub fn movement_speed(&self, imbalance: u128, avg_stake: u128) -> Result<u128, FeeError> {
        let basis = imbalance.min(self.stake_cap(avg_stake)?);
        mul_div(
            basis,
            self.config.movement_rate,
            self.config.movement_precision,
        )
    }
}

/// `value × rate / precision`, dividing first when the product would overflow.
fn mul_div(value: u128, rate: u128, precision: u128) -> Result<u128, FeeError> {
    if precision == 0 {
        return Err(FeeError::Overflow);
    }
    match value.checked_mul(rate) {
        Some(product) => Ok(product / precision),
        None => (value / precision)
            .checked_mul(rate)
            .ok_or(FeeError::Overflow),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tcrank_types::TOKEN;

    fn config() -> RankingConfig {
        RankingConfig::tcrank_defaults()
    }

    #[test]
    fn fixed_commission_is_a_tenth_of_rank() {
        let config = config();
        let fees = FeeCalculator::new(&config);
        assert_eq!(fees.fixed_commission(90 * TOKEN).unwrap(), 9 * TOKEN);
        assert_eq!(fees.fixed_commission(50 * TOKEN).unwrap(), 5 * TOKEN);
        assert_eq!(fees.fixed_commission(0).unwrap(), 0);
    }

    #[test]
    fn fixed_commission_stops_growing_at_max_rank() {
        let config = config();
        let fees = FeeCalculator::new(&config);
        let at_max = fees.fixed_commission(config.max_rank).unwrap();
        assert_eq!(fees.fixed_commission(config.max_rank * 2).unwrap(), at_max);
    }

    #[test]
    fn dynamic_commission_is_linear_below_cap() {
        let config = config();
        let fees = FeeCalculator::new(&config);
        let avg = config.initial_avg_stake;
        assert_eq!(fees.dynamic_commission(100 * TOKEN, avg).unwrap(), TOKEN);
        assert_eq!(fees.dynamic_commission(150 * TOKEN, avg).unwrap(), 3 * TOKEN / 2);
        assert_eq!(fees.dynamic_commission(200 * TOKEN, avg).unwrap(), 2 * TOKEN);
        assert_eq!(fees.dynamic_commission(250 * TOKEN, avg).unwrap(), 5 * TOKEN / 2);
    }

    #[test]
    fn dynamic_commission_is_flat_above_cap() {
        let config = config();
        let fees = FeeCalculator::new(&config);
        let avg = 10 * TOKEN;
        let cap = fees.stake_cap(avg).unwrap();
        assert_eq!(cap, 1_000 * TOKEN);
        let at_cap = fees.dynamic_commission(cap, avg).unwrap();
        assert_eq!(fees.dynamic_commission(cap * 5, avg).unwrap(), at_cap);
    }

    #[test]
    fn zero_average_stake_is_rejected() {
        let config = config();
        let fees = FeeCalculator::new(&config);
        assert_eq!(
            fees.dynamic_commission(TOKEN, 0),
            Err(FeeError::ZeroAverageStake)
        );
    }

    #[test]
    fn movement_speed_is_one_percent_of_imbalance() {
        let config = config();
        let fees = FeeCalculator::new(&config);
        let avg = config.initial_avg_stake;
        assert_eq!(fees.movement_speed(526 * TOKEN, avg).unwrap(), 526 * TOKEN / 100);
        assert_eq!(fees.movement_speed(0, avg).unwrap(), 0);
    }

    #[test]
    fn mul_div_survives_large_values() {
        assert_eq!(mul_div(u128::MAX, 1, 1).unwrap(), u128::MAX);
        assert_eq!(mul_div(u128::MAX, 2, 4).unwrap(), (u128::MAX / 4) * 2);
        assert_eq!(mul_div(u128::MAX, u128::MAX, 1), Err(FeeError::Overflow));
    }
}
