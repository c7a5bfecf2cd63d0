//! Micro-benchmarks for the mutable `ArenaTree` phase: sequential
//! insert and random-order find.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use succinct_index::tree::ArenaTree;

fn keys(count: u32) -> Vec<Vec<u8>> {
    (0..count).map(|i| format!("k:{i:010}").into_bytes()).collect()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_insert");
    for count in [1_000, 50_000, 500_000] {
        let ks = keys(count);
        group.bench_with_input(BenchmarkId::new("sequential_insert", count), &ks, |b, ks| {
            b.iter(|| {
                let mut tree = ArenaTree::new();
                for k in ks {
                    tree.update(black_box(k)).unwrap();
                }
                tree.items()
            })
        });
    }
    group.finish();
}

fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_find");
    for count in [1_000, 50_000, 500_000] {
        let ks = keys(count);
        let mut tree = ArenaTree::new();
        for k in &ks {
            tree.update(k).unwrap();
        }
        let mut lookup_order = ks.clone();
        lookup_order.shuffle(&mut ChaCha8Rng::seed_from_u64(7));

        group.bench_function(BenchmarkId::new("random_order_find", count), |b| {
            b.iter(|| {
                let mut found = 0usize;
                for k in lookup_order.iter() {
                    if tree.find(black_box(k)).is_some() {
                        found += 1;
                    }
                }
                found
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_find);
criterion_main!(benches);
