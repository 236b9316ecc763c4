use tcrank_types::ItemId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MovingError {
    #[error("item {0} has no rank track")]
    ItemNotTracked(ItemId),

    #[error("item {0} already has a rank track")]
    ItemAlreadyTracked(ItemId),

    #[error("moving id space exhausted")]
    Overflow,
}
