use tcrank_types::AccountId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient balance for {account}: need {needed}, have {available}")]
    InsufficientBalance {
        account: AccountId,
        needed: u128,
        available: u128,
    },

    #[error("balance overflow for {0}")]
    Overflow(AccountId),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("{0} is not an administrator")]
    NotAdmin(AccountId),
}
