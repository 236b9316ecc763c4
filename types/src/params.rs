//! Engine configuration, written once by a privileged initializer.

use crate::address::AccountId;
use crate::amount::TOKEN;
use crate::error::ParamsError;
use serde::{Deserialize, Serialize};

/// Every tunable of the ranking engine.
///
/// Rates and precisions are integer fractions (`rate / precision`) so that all
/// fee and speed arithmetic stays in integers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    // ── Dynamic commission (charged at reveal, sized by stake) ───────────
    pub dynamic_fee_linear_rate: u128,
    pub dynamic_fee_linear_precision: u128,

    /// Stakes above `max_over_stake_factor × average stake` add no fee basis
    /// and no extra movement speed.
    pub max_over_stake_factor: u128,

    // ── Fixed commission (charged at commit, sized by current rank) ──────
    pub max_fixed_fee_rate: u128,
    pub max_fixed_fee_precision: u128,

    /// Raw units a winning voter may withdraw per second after a poll finishes.
    pub unstake_speed: u128,

    // ── Poll windows ─────────────────────────────────────────────────────
    pub commit_ttl_secs: u64,
    pub reveal_ttl_secs: u64,

    /// Reference average stake before any poll has finished.
    pub initial_avg_stake: u128,

    /// Ceiling of every item's rank.
    pub max_rank: u128,

    // ── Rank movement ────────────────────────────────────────────────────
    /// Speed (raw rank units per second) per raw unit of stake imbalance.
    pub movement_rate: u128,
    pub movement_precision: u128,

    /// Account credited with commissions and forfeited losing stake.
    pub treasury: AccountId,
}

impl RankingConfig {
    /// Production defaults.
    pub fn tcrank_defaults() -> Self {
        Self {
            dynamic_fee_linear_rate: 1,
            dynamic_fee_linear_precision: 100,
            max_over_stake_factor: 100,
            max_fixed_fee_rate: 1,
            max_fixed_fee_precision: 10,
            unstake_speed: TOKEN / 2,
            commit_ttl_secs: 180,
            reveal_ttl_secs: 180,
            initial_avg_stake: 300 * TOKEN,
            max_rank: 10_000 * TOKEN,
            movement_rate: 1,
            movement_precision: 100,
            treasury: AccountId::new("treasury"),
        }
    }

    /// Reject configurations that would divide by zero or freeze every poll.
    pub fn validate(&self) -> Result<(), ParamsError> {
        let non_zero: [(&'static str, u128); 7] = [
            ("dynamic_fee_linear_precision", self.dynamic_fee_linear_precision),
            ("max_fixed_fee_precision", self.max_fixed_fee_precision),
            ("movement_precision", self.movement_precision),
            ("initial_avg_stake", self.initial_avg_stake),
            ("max_rank", self.max_rank),
            ("max_over_stake_factor", self.max_over_stake_factor),
            ("unstake_speed", self.unstake_speed),
        ];
        for (name, value) in non_zero {
            if value == 0 {
                return Err(ParamsError::Zero(name));
            }
        }
        if self.commit_ttl_secs == 0 {
            return Err(ParamsError::Zero("commit_ttl_secs"));
        }
        if self.reveal_ttl_secs == 0 {
            return Err(ParamsError::Zero("reveal_ttl_secs"));
        }
        if self.treasury.is_empty() {
            return Err(ParamsError::EmptyTreasury);
        }
        Ok(())
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self::tcrank_defaults()
    }
}
