use proptest::prelude::*;

use tcrank_moving::{Moving, RankMover};
use tcrank_types::{MoveDirection, Timestamp};

fn direction() -> impl Strategy<Value = MoveDirection> {
    prop_oneof![
        Just(MoveDirection::Up),
        Just(MoveDirection::Down),
        Just(MoveDirection::Neutral),
    ]
}

proptest! {
    /// Whatever the trajectory, the evaluated rank stays within bounds.
    #[test]
    fn rank_always_in_bounds(
        dir in direction(),
        speed in any::<u128>(),
        anchor in any::<u128>(),
        max_rank in 1u128..u128::MAX,
        elapsed in any::<u64>(),
    ) {
        let m = Moving::new(1, 1, dir, speed, anchor, Timestamp::new(0), 1);
        let rank = m.rank_at(Timestamp::new(elapsed), max_rank);
        prop_assert!(rank <= max_rank);
    }

    /// Upward movement never lowers a rank; downward never raises it.
    #[test]
    fn movement_is_monotonic(
        speed in 0u128..1_000_000,
        anchor in 0u128..1_000_000,
        t1 in 0u64..100_000,
        dt in 0u64..100_000,
    ) {
        let max = 10_000_000u128;
        let up = Moving::new(1, 1, MoveDirection::Up, speed, anchor, Timestamp::new(0), 1);
        let down = Moving::new(2, 1, MoveDirection::Down, speed, anchor, Timestamp::new(0), 1);
        let (a, b) = (Timestamp::new(t1), Timestamp::new(t1 + dt));
        prop_assert!(up.rank_at(b, max) >= up.rank_at(a, max));
        prop_assert!(down.rank_at(b, max) <= down.rank_at(a, max));
    }

    /// A new trajectory starts exactly where the previous one left off.
    #[test]
    fn apply_reanchors_at_current_rank(
        start in 0u128..100_000,
        first in direction(),
        second in direction(),
        s1 in 0u128..1_000,
        s2 in 0u128..1_000,
        t1 in 0u64..10_000,
        dt in 0u64..10_000,
    ) {
        let max = 1_000_000u128;
        let mut mover = RankMover::new(max);
        mover.track(1, start, Timestamp::new(0)).unwrap();
        mover.apply(1, first, s1, 1, Timestamp::new(t1)).unwrap();
        let switch_at = Timestamp::new(t1 + dt);
        let before = mover.current_rank(1, switch_at).unwrap();
        let anchor = mover.apply(1, second, s2, 2, switch_at).unwrap().anchor_rank;
        prop_assert_eq!(before, anchor);
        prop_assert_eq!(mover.current_rank(1, switch_at).unwrap(), before);
    }
}
