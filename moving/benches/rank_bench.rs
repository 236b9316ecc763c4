use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tcrank_moving::RankMover;
use tcrank_types::{MoveDirection, Timestamp};

const MAX_RANK: u128 = 10_000_000;

fn make_mover_with_history(n: usize) -> RankMover {
    let mut mover = RankMover::new(MAX_RANK);
    mover.track(1, MAX_RANK / 2, Timestamp::new(0)).unwrap();
    for i in 0..n {
        let direction = if i % 2 == 0 {
            MoveDirection::Up
        } else {
            MoveDirection::Down
        };
        mover
            .apply(1, direction, 3, i as u64 + 1, Timestamp::new(i as u64 * 100))
            .unwrap();
    }
    mover
}

fn bench_current_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("current_rank");

    for moving_count in [1, 10, 100, 1000] {
        let mover = make_mover_with_history(moving_count);
        let now = Timestamp::new(moving_count as u64 * 100 + 50);

        group.bench_with_input(
            BenchmarkId::new("current_rank", moving_count),
            &moving_count,
            |b, _| {
                b.iter(|| black_box(mover.current_rank(black_box(1), black_box(now))));
            },
        );
    }

    group.finish();
}

fn bench_apply(c: &mut Criterion) {
    c.bench_function("apply_moving", |b| {
        b.iter_batched(
            || make_mover_with_history(1),
            |mut mover| {
                black_box(
                    mover
                        .apply(1, MoveDirection::Down, 7, 99, Timestamp::new(5_000))
                        .map(|m| m.anchor_rank),
                )
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

fn bench_many_items(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_all_items");

    for item_count in [10u64, 100, 1000] {
        let mut mover = RankMover::new(MAX_RANK);
        for item in 1..=item_count {
            mover.track(item, item as u128 * 10, Timestamp::new(0)).unwrap();
            mover
                .apply(item, MoveDirection::Up, 1, item, Timestamp::new(10))
                .unwrap();
        }
        let now = Timestamp::new(1_000);

        group.bench_with_input(
            BenchmarkId::new("items", item_count),
            &item_count,
            |b, _| {
                b.iter(|| {
                    let total: u128 = mover
                        .items()
                        .into_iter()
                        .filter_map(|id| mover.current_rank(id, now).ok())
                        .sum();
                    black_box(total)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_current_rank, bench_apply, bench_many_items);
criterion_main!(benches);
