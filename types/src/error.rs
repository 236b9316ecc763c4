use thiserror::Error;

/// Rejections raised when validating a [`crate::RankingConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamsError {
    #[error("{0} must be non-zero")]
    Zero(&'static str),

    #[error("treasury account must not be empty")]
    EmptyTreasury,
}
