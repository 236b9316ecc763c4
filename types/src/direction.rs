//! Vote and movement directions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The side a voter reveals.
///
/// The numeric codes are part of the commitment preimage: `Down = 0`, `Up = 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteDirection {
    Down,
    Up,
}

impl VoteDirection {
    pub fn code(self) -> u8 {
        match self {
            Self::Down => 0,
            Self::Up => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Down),
            1 => Some(Self::Up),
            _ => None,
        }
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Down => write!(f, "down"),
            Self::Up => write!(f, "up"),
        }
    }
}

/// Direction of a rank trajectory. `Neutral` is the outcome of a tied poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveDirection {
    Up,
    Down,
    Neutral,
}

impl From<VoteDirection> for MoveDirection {
    fn from(d: VoteDirection) -> Self {
        match d {
            VoteDirection::Up => Self::Up,
            VoteDirection::Down => Self::Down,
        }
    }
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}
