//! Fee calculator for TCRank polls.
//!
//! Two commissions are charged to voters:
//! - the **fixed** commission at commit time, sized by the item's current rank,
//!   so that contesting a highly ranked item costs more;
//! - the **dynamic** commission at reveal time, sized by the revealed stake
//!   and capped at `max_over_stake_factor × average stake` of fee basis.
//!
//! The same cap bounds the speed at which a finished poll moves a rank.
//! Everything here is a pure integer computation; debiting is the caller's job.

pub mod calculator;
pub mod error;

pub use calculator::FeeCalculator;
pub use error::FeeError;
