use crate::poll::PollPhase;
use tcrank_types::{AccountId, PollId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PollError {
    #[error("poll is in {actual} phase, operation requires {expected}")]
    InvalidPhase {
        expected: PollPhase,
        actual: PollPhase,
    },

    #[error("revealed vote does not match the commitment of {0}")]
    HashMismatch(AccountId),

    #[error("{0} has no commitment in this poll")]
    NotCommitted(AccountId),

    #[error("{0} has already revealed")]
    AlreadyRevealed(AccountId),

    #[error("poll {0} is already finished")]
    AlreadyFinished(PollId),

    #[error("arithmetic overflow in stake tally")]
    Overflow,
}
