// Copyright 2025 the Orthant Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use orthant_core::{BoxN, PointN};
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
    let mut rng = Rng::new(0x0123_4567);
    (0..count)
        .map(|_| PointN::new([rng.next_f64() * extent, rng.next_f64() * extent]))
        .collect()
}

fn gen_random_boxes(count: usize, extent: f64, max_size: f64) -> Vec<BoxN<f64, 2>> {
    let mut rng = Rng::new(0x89ab_cdef);
    (0..count)
        .map(|_| {
            let x = rng.next_f64() * (extent - max_size);
            let y = rng.next_f64() * (extent - max_size);
            let w = rng.next_f64() * max_size;
            let h = rng.next_f64() * max_size;
            BoxN::new([x, y], [x + w, y + h])
        })
        .collect()
}

fn bench_point_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_build");
    let domain = BoxN::new([0.0, 0.0], [1024.0, 1024.0]);
    for &n in &[10_000usize, 100_000] {
        let points = gen_random_points(n, 1024.0);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_function(format!("sequential_n{}", n), |b| {
            b.iter(|| {
                let tree =
                    PointTree::<A, 2>::build(&points, &domain, 8, &BuildOptions::default())
                        .unwrap();
                black_box(tree.node_count());
            })
        });

        group.bench_function(format!("parallel_sort_n{}", n), |b| {
            let options = BuildOptions {
                parallel: true,
                ..Default::default()
            };
            b.iter(|| {
                let tree = PointTree::<A, 2>::build(&points, &domain, 8, &options).unwrap();
                black_box(tree.node_count());
            })
        });
    }
    group.finish();
}

fn bench_box_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("box_build");
    let domain = BoxN::new([0.0, 0.0], [1024.0, 1024.0]);
    for &n in &[10_000usize, 100_000] {
        let boxes = gen_random_boxes(n, 1024.0, 4.0);
        group.throughput(Throughput::Elements(n as u64));

        for split_depth in [0u32, 2] {
            group.bench_function(format!("split{}_n{}", split_depth, n), |b| {
                let options = BuildOptions {
                    split_depth,
                    ..Default::default()
                };
                b.iter_batched(
                    || boxes.clone(),
                    |boxes| {
                        let tree =
                            BoxTree::<A, 2>::build(&boxes, &domain, 8, &options).unwrap();
                        black_box(tree.node_count());
                    },
                    BatchSize::SmallInput,
                )
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_point_build, bench_box_build);
criterion_main!(benches);
