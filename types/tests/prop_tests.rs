use proptest::prelude::*;

use tcrank_types::{CommitHash, Timestamp, VoteDirection};

proptest! {
    /// CommitHash::is_zero is true only for all-zero bytes.
    #[test]
    fn commit_hash_is_zero_correct(bytes in prop::array::uniform32(0u8..)) {
        let hash = CommitHash::new(bytes);
        prop_assert_eq!(hash.is_zero(), bytes == [0u8; 32]);
    }

    /// CommitHash survives a bincode snapshot unchanged.
    #[test]
    fn commit_hash_bincode_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = CommitHash::new(bytes);
        let encoded = bincode::serialize(&hash).unwrap();
        let decoded: CommitHash = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, hash);
    }

    /// Elapsed time never underflows, even when `now` precedes the timestamp.
    #[test]
    fn elapsed_since_saturates(a in any::<u64>(), b in any::<u64>()) {
        let elapsed = Timestamp::new(a).elapsed_since(Timestamp::new(b));
        prop_assert_eq!(elapsed, b.saturating_sub(a));
    }

    /// Only codes 0 and 1 name a vote direction.
    #[test]
    fn direction_codes_are_closed(code in any::<u8>()) {
        let decoded = VoteDirection::from_code(code);
        prop_assert_eq!(decoded.is_some(), code <= 1);
    }
}
