use tcrank_types::{AccountId, PollId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StakeError {
    #[error("no stake records for poll {0}")]
    PollNotFound(PollId),

    #[error("{voter} has no stake in poll {poll_id}")]
    RecordNotFound { poll_id: PollId, voter: AccountId },

    #[error("{voter} may not withdraw from poll {poll_id}")]
    NotReleasable { poll_id: PollId, voter: AccountId },

    #[error("poll {0} is already settled")]
    AlreadySettled(PollId),

    #[error("arithmetic overflow in stake accounting")]
    Overflow,
}
