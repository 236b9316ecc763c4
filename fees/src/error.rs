use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeeError {
    #[error("arithmetic overflow in fee computation")]
    Overflow,

    #[error("average stake must be non-zero")]
    ZeroAverageStake,
}
