//! Simulator configuration with TOML file support.
//!
//! Token amounts are written in milli-tokens (1/1000 of a token) so that
//! every value fits a TOML integer.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tcrank_types::{AccountId, RankingConfig, TOKEN};

const MILLI: u128 = TOKEN / 1_000;

/// Engine parameters, token amounts in milli-tokens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingSection {
    pub dynamic_fee_linear_rate: u64,
    pub dynamic_fee_linear_precision: u64,
    pub max_over_stake_factor: u64,
    pub max_fixed_fee_rate: u64,
    pub max_fixed_fee_precision: u64,
    pub unstake_speed_milli: u64,
    pub commit_ttl_secs: u64,
    pub reveal_ttl_secs: u64,
    pub initial_avg_stake_milli: u64,
    pub max_rank_milli: u64,
    pub movement_rate: u64,
    pub movement_precision: u64,
    pub treasury: String,
}

impl Default for RankingSection {
    fn default() -> Self {
        let defaults = RankingConfig::tcrank_defaults();
        Self {
            dynamic_fee_linear_rate: 1,
            dynamic_fee_linear_precision: 100,
            max_over_stake_factor: 100,
            max_fixed_fee_rate: 1,
            max_fixed_fee_precision: 10,
            unstake_speed_milli: 500,
            commit_ttl_secs: defaults.commit_ttl_secs,
            reveal_ttl_secs: defaults.reveal_ttl_secs,
            initial_avg_stake_milli: 300_000,
            max_rank_milli: 10_000_000,
            movement_rate: 1,
            movement_precision: 100,
            treasury: defaults.treasury.to_string(),
        }
    }
}

impl RankingSection {
    pub fn to_config(&self) -> RankingConfig {
        RankingConfig {
            dynamic_fee_linear_rate: self.dynamic_fee_linear_rate.into(),
            dynamic_fee_linear_precision: self.dynamic_fee_linear_precision.into(),
            max_over_stake_factor: self.max_over_stake_factor.into(),
            max_fixed_fee_rate: self.max_fixed_fee_rate.into(),
            max_fixed_fee_precision: self.max_fixed_fee_precision.into(),
            unstake_speed: u128::from(self.unstake_speed_milli) * MILLI,
            commit_ttl_secs: self.commit_ttl_secs,
            reveal_ttl_secs: self.reveal_ttl_secs,
            initial_avg_stake: u128::from(self.initial_avg_stake_milli) * MILLI,
            max_rank: u128::from(self.max_rank_milli) * MILLI,
            movement_rate: self.movement_rate.into(),
            movement_precision: self.movement_precision.into(),
            treasury: AccountId::new(self.treasury.clone()),
        }
    }
}

/// One simulation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub items: usize,
    pub voters: usize,
    pub rounds: usize,
    /// Seed of the random play; equal seeds give equal runs.
    pub seed: u64,
    pub initial_balance_tokens: u64,
    /// Upper bound of a single random stake.
    pub max_stake_tokens: u64,
    /// Chance, in percent, that a voter joins a given poll.
    pub turnout_percent: u8,
    /// Chance, in percent, that a committed voter comes back to reveal.
    pub reveal_percent: u8,
    /// Longest idle gap between two polls.
    pub max_gap_secs: u64,
    /// Log format: "human" or "json".
    pub log_format: String,
    pub log_level: String,
    pub ranking: RankingSection,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            items: 5,
            voters: 8,
            rounds: 20,
            seed: 42,
            initial_balance_tokens: 10_000,
            max_stake_tokens: 500,
            turnout_percent: 60,
            reveal_percent: 90,
            max_gap_secs: 120,
            log_format: "human".to_string(),
            log_level: "info".to_string(),
            ranking: RankingSection::default(),
        }
    }
}

impl SimConfig {
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.items > 0, "items must be non-zero");
        anyhow::ensure!(self.voters > 0, "voters must be non-zero");
        anyhow::ensure!(self.max_stake_tokens > 0, "max_stake_tokens must be non-zero");
        anyhow::ensure!(self.turnout_percent <= 100, "turnout_percent must be at most 100");
        anyhow::ensure!(self.reveal_percent <= 100, "reveal_percent must be at most 100");
        self.ranking.to_config().validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_section_matches_tcrank_defaults() {
        assert_eq!(
            RankingSection::default().to_config(),
            RankingConfig::tcrank_defaults()
        );
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = SimConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(SimConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = SimConfig::from_toml_str(
            r#"
            rounds = 3

            [ranking]
            commit_ttl_secs = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.rounds, 3);
        assert_eq!(config.voters, 8);
        assert_eq!(config.ranking.commit_ttl_secs, 10);
        assert_eq!(config.ranking.reveal_ttl_secs, 180);
    }

    #[test]
    fn bad_values_are_rejected() {
        let config = SimConfig {
            turnout_percent: 101,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());
        let mut config = SimConfig::default();
        config.ranking.movement_precision = 0;
        assert!(config.validate().is_err());
    }
}
