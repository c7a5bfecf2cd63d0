//! Micro-benchmark for `BitmapRank::rank1`.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use succinct_index::bitmap::BitmapRank;

fn random_bitmap(bits: usize, density: f64, seed: u64) -> BitmapRank {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut bm = BitmapRank::new(bits).unwrap();
    for i in 0..bits {
        if rng.random_bool(density) {
            bm.set(i);
        }
    }
    bm.prepare();
    bm
}

fn bench_rank1(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank1");

    for bits in [1_000, 100_000, 10_000_000] {
        let bm = random_bitmap(bits, 0.5, 42);
        let mut rng = ChaCha8Rng::seed_from_u64(123);
        let queries: Vec<usize> = (0..10_000).map(|_| rng.random_range(0..bits)).collect();

        group.bench_with_input(
            BenchmarkId::new("rank1", format!("{}k", bits / 1_000)),
            &(&bm, &queries),
            |b, (bm, queries)| {
                b.iter(|| {
                    let mut sum = 0usize;
                    for &q in queries.iter() {
                        sum += bm.rank1(black_box(q));
                    }
                    sum
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_rank1);
criterion_main!(benches);
