//! Abstract storage for the ranking engine.
//!
//! Backends implement [`RankingStore`]; the engine depends only on the trait.
//! Values are opaque `Vec<u8>` so this crate does not depend on the engine's
//! own types. The engine serializes and deserializes them itself.

pub mod error;
pub mod ranking;

pub use error::StoreError;
pub use ranking::{RankingStore, META_ENGINE_KEY};
