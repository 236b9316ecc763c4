//! Fungible balances.

use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tcrank_types::AccountId;

/// A fungible token ledger.
///
/// `debit` is all-or-nothing: on error no balance changes.
pub trait BalanceLedger {
    fn balance_of(&self, account: &AccountId) -> u128;

    fn debit(&mut self, account: &AccountId, amount: u128) -> Result<(), LedgerError>;

    /// Credits saturate at `u128::MAX`.
    fn credit(&mut self, account: &AccountId, amount: u128);

    /// Whether `account` could be debited `amount` right now.
    fn can_debit(&self, account: &AccountId, amount: u128) -> Result<(), LedgerError> {
        let available = self.balance_of(account);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account: account.clone(),
                needed: amount,
                available,
            });
        }
        Ok(())
    }
}

/// In-memory ledger for tests and simulation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MemoryLedger {
    balances: BTreeMap<AccountId, u128>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create tokens out of thin air.
    pub fn mint(&mut self, account: &AccountId, amount: u128) -> Result<(), LedgerError> {
        let balance = self.balances.entry(account.clone()).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow(account.clone()))?;
        tracing::trace!(%account, amount, "minted");
        Ok(())
    }

    /// Sum of every balance, saturating.
    pub fn total_supply(&self) -> u128 {
        self.balances
            .values()
            .fold(0u128, |acc, b| acc.saturating_add(*b))
    }

    pub fn accounts(&self) -> impl Iterator<Item = (&AccountId, &u128)> {
        self.balances.iter()
    }
}

impl BalanceLedger for MemoryLedger {
    fn balance_of(&self, account: &AccountId) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn debit(&mut self, account: &AccountId, amount: u128) -> Result<(), LedgerError> {
        self.can_debit(account, amount)?;
        if amount == 0 {
            return Ok(());
        }
        if let Some(balance) = self.balances.get_mut(account) {
            *balance -= amount;
        }
        Ok(())
    }

    fn credit(&mut self, account: &AccountId, amount: u128) {
        if amount == 0 {
            return;
        }
        let balance = self.balances.entry(account.clone()).or_insert(0);
        *balance = balance.saturating_add(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AccountId {
        AccountId::new("alice")
    }

    #[test]
    fn debit_and_credit() {
        let mut ledger = MemoryLedger::new();
        ledger.mint(&alice(), 100).unwrap();
        ledger.debit(&alice(), 30).unwrap();
        assert_eq!(ledger.balance_of(&alice()), 70);
        ledger.credit(&alice(), 5);
        assert_eq!(ledger.balance_of(&alice()), 75);
    }

    #[test]
    fn failed_debit_changes_nothing() {
        let mut ledger = MemoryLedger::new();
        ledger.mint(&alice(), 10).unwrap();
        let err = ledger.debit(&alice(), 11).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                account: alice(),
                needed: 11,
                available: 10,
            }
        );
        assert_eq!(ledger.balance_of(&alice()), 10);
    }

    #[test]
    fn unknown_account_has_zero_balance() {
        let mut ledger = MemoryLedger::new();
        assert_eq!(ledger.balance_of(&alice()), 0);
        ledger.debit(&alice(), 0).unwrap();
        assert!(ledger.debit(&alice(), 1).is_err());
    }

    #[test]
    fn mint_overflow_is_rejected() {
        let mut ledger = MemoryLedger::new();
        ledger.mint(&alice(), u128::MAX).unwrap();
        assert_eq!(ledger.mint(&alice(), 1), Err(LedgerError::Overflow(alice())));
        ledger.credit(&alice(), 1);
        assert_eq!(ledger.balance_of(&alice()), u128::MAX);
    }
}
