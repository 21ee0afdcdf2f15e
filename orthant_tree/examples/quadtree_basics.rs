// Copyright 2025 the Orthant Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic quadtree usage: bulk build, range search, and kNN over kurbo points.

use kurbo::{Point, Rect};
use orthant_tree::{BuildOptions, Quadtree};

fn main() {
    let points: Vec<Point> = (0..64)
        .map(|i| Point::new((i % 8) as f64 + 0.5, (i / 8) as f64 + 0.5))
        .collect();
    let domain = Rect::new(0.0, 0.0, 8.0, 8.0);

    let tree = Quadtree::build(&points, &domain, 3, &BuildOptions::default())
        .expect("build should succeed");
    println!("{tree:?}");

    let window = Rect::new(2.0, 2.0, 4.0, 4.0);
    let hits = tree.range_search(&window, &points).unwrap();
    println!("points in {window:?}: {hits:?}");

    let query = Point::new(3.3, 6.1);
    let nearest = tree.k_nearest(&query, 3, &points).unwrap();
    println!("3 nearest to {query:?}:");
    for (id, dist) in nearest {
        println!("  #{id} at {:?} (distance {dist:.3})", points[id as usize]);
    }
}
