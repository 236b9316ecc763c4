//! Blake2b hashing for vote commitments.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use tcrank_types::{CommitHash, VoteDirection};

type Blake2b256 = Blake2b<U32>;

/// Prepended to every commitment preimage.
const COMMIT_DOMAIN: &[u8] = b"tcrank/vote-commit/v1";

/// 256-bit Blake2b over several byte slices fed in sequence.
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Digest a hidden vote.
///
/// Preimage: domain ‖ direction code (1 byte) ‖ stake (16 bytes BE) ‖ salt (16 bytes BE).
/// Every field has a fixed width, so distinct triples never share a preimage.
pub fn commitment_hash(direction: VoteDirection, stake: u128, salt: u128) -> CommitHash {
    CommitHash::new(blake2b_256_multi(&[
        COMMIT_DOMAIN,
        &[direction.code()],
        &stake.to_be_bytes(),
        &salt.to_be_bytes(),
    ]))
}

/// Recompute the digest of a revealed triple and compare it with the stored one.
pub fn verify_commitment(
    expected: &CommitHash,
    direction: VoteDirection,
    stake: u128,
    salt: u128,
) -> bool {
    commitment_hash(direction, stake, salt) == *expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_points_do_not_matter() {
        let whole = blake2b_256_multi(&[b"helloworld"]);
        let split = blake2b_256_multi(&[b"hello", b"world"]);
        assert_eq!(whole, split);
    }

    #[test]
    fn commitment_is_deterministic() {
        let a = commitment_hash(VoteDirection::Up, 183, 2);
        let b = commitment_hash(VoteDirection::Up, 183, 2);
        assert_eq!(a, b);
        assert!(!a.is_zero());
    }

    #[test]
    fn each_field_changes_the_digest() {
        let base = commitment_hash(VoteDirection::Up, 100, 1);
        assert_ne!(base, commitment_hash(VoteDirection::Down, 100, 1));
        assert_ne!(base, commitment_hash(VoteDirection::Up, 101, 1));
        assert_ne!(base, commitment_hash(VoteDirection::Up, 100, 2));
    }

    #[test]
    fn verify_matches_only_the_committed_triple() {
        let stored = commitment_hash(VoteDirection::Down, 500, 42);
        assert!(verify_commitment(&stored, VoteDirection::Down, 500, 42));
        assert!(!verify_commitment(&stored, VoteDirection::Up, 500, 42));
        assert!(!verify_commitment(&stored, VoteDirection::Down, 499, 42));
    }
}
