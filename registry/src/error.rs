use tcrank_fees::FeeError;
use tcrank_ledger::{AccessError, LedgerError};
use tcrank_moving::MovingError;
use tcrank_stake::StakeError;
use tcrank_store::StoreError;
use tcrank_types::{AccountId, ParamsError, PollId, Timestamp};
use tcrank_voting::{PollError, PollPhase};
use thiserror::Error;

/// Every way an engine operation can fail. A failed operation changes nothing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RankingError {
    #[error("poll is in {actual} phase, operation requires {expected}")]
    InvalidPhase {
        expected: PollPhase,
        actual: PollPhase,
    },

    #[error("revealed vote does not match the commitment of {0}")]
    HashMismatch(AccountId),

    #[error("insufficient balance for {account}: need {needed}, have {available}")]
    InsufficientBalance {
        account: AccountId,
        needed: u128,
        available: u128,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("poll {0} is already finished")]
    AlreadyFinished(PollId),

    #[error("engine is already initialised")]
    AlreadyInitialized,

    #[error("{0} is not allowed to do this")]
    Unauthorized(AccountId),

    #[error("{0} has already revealed")]
    AlreadyRevealed(AccountId),

    #[error("engine is not initialised")]
    NotInitialized,

    #[error("clock went backwards: {now} is earlier than {last}")]
    InvalidTimestamp { now: Timestamp, last: Timestamp },

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ParamsError),

    #[error("arithmetic overflow")]
    Overflow,

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<PollError> for RankingError {
    fn from(e: PollError) -> Self {
        match e {
            PollError::InvalidPhase { expected, actual } => Self::InvalidPhase { expected, actual },
            PollError::HashMismatch(voter) => Self::HashMismatch(voter),
            PollError::NotCommitted(voter) => Self::NotFound(format!("commitment of {voter}")),
            PollError::AlreadyRevealed(voter) => Self::AlreadyRevealed(voter),
            PollError::AlreadyFinished(id) => Self::AlreadyFinished(id),
            PollError::Overflow => Self::Overflow,
        }
    }
}

impl From<MovingError> for RankingError {
    fn from(e: MovingError) -> Self {
        match e {
            MovingError::ItemNotTracked(id) => Self::NotFound(format!("item {id}")),
            MovingError::ItemAlreadyTracked(id) => {
                Self::Storage(format!("item {id} tracked twice"))
            }
            MovingError::Overflow => Self::Overflow,
        }
    }
}

impl From<StakeError> for RankingError {
    fn from(e: StakeError) -> Self {
        match e {
            StakeError::PollNotFound(id) => Self::NotFound(format!("stake records of poll {id}")),
            StakeError::RecordNotFound { voter, .. } | StakeError::NotReleasable { voter, .. } => {
                Self::Unauthorized(voter)
            }
            StakeError::AlreadySettled(id) => Self::AlreadyFinished(id),
            StakeError::Overflow => Self::Overflow,
        }
    }
}

impl From<FeeError> for RankingError {
    fn from(e: FeeError) -> Self {
        match e {
            FeeError::Overflow => Self::Overflow,
            FeeError::ZeroAverageStake => Self::InvalidConfig(ParamsError::Zero("average stake")),
        }
    }
}

impl From<LedgerError> for RankingError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InsufficientBalance {
                account,
                needed,
                available,
            } => Self::InsufficientBalance {
                account,
                needed,
                available,
            },
            LedgerError::Overflow(_) => Self::Overflow,
        }
    }
}

impl From<AccessError> for RankingError {
    fn from(e: AccessError) -> Self {
        match e {
            AccessError::NotAdmin(caller) => Self::Unauthorized(caller),
        }
    }
}

impl From<StoreError> for RankingError {
    fn from(e: StoreError) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<bincode::Error> for RankingError {
    fn from(e: bincode::Error) -> Self {
        Self::Storage(format!("serialization: {e}"))
    }
}
