// Copyright 2025 the Orthant Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use orthant_core::{Adapter, BoxN, EntityId, PointN};
use orthant_tree::{BoxTree, BuildOptions, Cartesian, PointTree};

type A = Cartesian<f64, 2>;

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_random_points(count: usize, extent: f64) -> Vec<PointN<f64, 2>> {
    let mut rng = Rng::new(0x5eed_f00d);
    (0..count)
        .map(|_| PointN::new([rng.next_f64() * extent, rng.next_f64() * extent]))
        .collect()
}

fn gen_clustered_boxes(count: usize, extent: f64, size: f64) -> Vec<BoxN<f64, 2>> {
    let mut rng = Rng::new(0xc105_7e12);
    (0..count)
        .map(|_| {
            // Quadratic bias clusters boxes towards the origin corner.
            let x = rng.next_f64() * rng.next_f64() * (extent - size);
            let y = rng.next_f64() * rng.next_f64() * (extent - size);
            BoxN::new([x, y], [x + size, y + size])
        })
        .collect()
}

fn bench_range_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_search");
    let extent = 1024.0;
    let domain = BoxN::new([0.0, 0.0], [extent, extent]);
    let n = 100_000usize;
    let points = gen_random_points(n, extent);
    let tree = PointTree::<A, 2>::build(&points, &domain, 8, &BuildOptions::default()).unwrap();
    let query = BoxN::new([100.0, 100.0], [228.0, 228.0]);
    group.throughput(Throughput::Elements(n as u64));

    group.bench_function("tree_n100k", |b| {
        b.iter(|| {
            let hits = tree.range_search(&query, &points).unwrap();
            black_box(hits.len());
        })
    });

    group.bench_function("naive_n100k", |b| {
        b.iter(|| {
            let hits: Vec<EntityId> = points
                .iter()
                .enumerate()
                .filter(|(_, p)| A::box_contains_point(&query, p))
                .map(|(i, _)| i as EntityId)
                .collect();
            black_box(hits.len());
        })
    });
    group.finish();
}

fn bench_collision_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("collision_pairs");
    group.sample_size(10);
    let extent = 1024.0;
    let domain = BoxN::new([0.0, 0.0], [extent, extent]);
    for &n in &[2_000usize, 10_000] {
        let boxes = gen_clustered_boxes(n, extent, 6.0);
        group.throughput(Throughput::Elements(n as u64));

        let tree = BoxTree::<A, 2>::build(&boxes, &domain, 8, &BuildOptions::default()).unwrap();
        group.bench_function(format!("tree_n{}", n), |b| {
            b.iter(|| black_box(tree.collision_pairs(&boxes, false).len()))
        });

        group.bench_function(format!("tree_par_n{}", n), |b| {
            b.iter(|| black_box(tree.collision_pairs_par(&boxes, false).len()))
        });

        if n <= 2_000 {
            group.bench_function(format!("naive_n{}", n), |b| {
                b.iter(|| {
                    let mut pairs = 0usize;
                    for i in 0..boxes.len() {
                        for j in (i + 1)..boxes.len() {
                            if A::boxes_overlap(&boxes[i], &boxes[j], false) {
                                pairs += 1;
                            }
                        }
                    }
                    black_box(pairs)
                })
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_range_search, bench_collision_pairs);
criterion_main!(benches);
