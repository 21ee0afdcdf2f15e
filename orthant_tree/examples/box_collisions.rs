// Copyright 2025 the Orthant Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Box tree usage: self-collision pairs and ray picking over kurbo rects.

use kurbo::{Point, Rect};
use orthant_tree::{BuildOptions, QuadtreeBox};

fn main() {
    // A loose diagonal of rectangles with a few overlaps.
    let rects: Vec<Rect> = (0..12)
        .map(|i| {
            let o = i as f64 * 0.6;
            Rect::new(o, o, o + 1.0, o + 1.0)
        })
        .collect();
    let domain = Rect::new(0.0, 0.0, 8.0, 8.0);

    let tree = QuadtreeBox::build(&rects, &domain, 3, &BuildOptions::default())
        .expect("build should succeed");
    println!("{tree:?}");

    let pairs = tree.collision_pairs(&rects, false);
    println!("{} colliding pairs: {pairs:?}", pairs.len());

    let origin = Point::new(0.0, 3.05);
    let dir = Point::new(1.0, 0.0);
    match tree.ray_pick(&origin, &dir, &rects).unwrap() {
        Some((id, t)) => println!("ray from {origin:?} first hits #{id} at t = {t:.3}"),
        None => println!("ray from {origin:?} misses everything"),
    }
}
