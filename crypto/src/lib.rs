//! Cryptographic primitives for TCRank votes.
//!
//! - **Blake2b-256** for vote commitments
//! - OS-seeded random salts for voters who do not bring their own

pub mod hash;
pub mod salt;

pub use hash::{blake2b_256_multi, commitment_hash, verify_commitment};
pub use salt::generate_salt;
