// Copyright 2025 the Orthant Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Orthant Tree: linear orthant trees over points and axis-aligned boxes.
//!
//! An orthant tree generalises the quadtree (`D = 2`) and octree (`D = 3`) to
//! any dimension: each node splits into up to `2^D` children. The *linear*
//! representation keeps no pointers at all; nodes are addressed by Morton
//! location codes and stored in a sorted map, so bulk construction is a sort
//! plus one linear pass, and subtree sweeps are contiguous range scans.
//!
//! Two tree kinds share the machinery:
//!
//! - [`PointTree`]: each point lives at one maximum-depth leaf. Supports
//!   range search and k-nearest-neighbour queries.
//! - [`BoxTree`]: boxes are stored at (or just below, see
//!   [`BuildOptions::split_depth`]) their deepest enclosing node. Supports
//!   range search, point containment, ray pick/intersection, and pairwise
//!   self-collision detection.
//!
//! Trees store entity ids, never geometry: queries borrow the caller's
//! entity slice. The owning [`PointSet`] / [`BoxSet`] containers bundle the
//! two when that split is inconvenient.
//!
//! Geometry types are pluggable through [`Adapter`](orthant_core::Adapter);
//! this crate ships a [Kurbo](https://docs.rs/kurbo) 2D adapter
//! ([`Quadtree`], [`QuadtreeBox`]) and array-backed 3D aliases ([`Octree`],
//! [`OctreeBox`]).
//!
//! # Quadtree example
//!
//! ```
//! use kurbo::{Point, Rect};
//! use orthant_tree::{BuildOptions, Quadtree};
//!
//! let points = vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(8.0, 0.0),
//!     Point::new(0.0, 8.0),
//!     Point::new(8.0, 8.0),
//!     Point::new(4.0, 4.0),
//! ];
//! let domain = Rect::new(0.0, 0.0, 8.0, 8.0);
//! let tree = Quadtree::build(&points, &domain, 3, &BuildOptions::default()).unwrap();
//!
//! // Only the centre point falls inside the query window.
//! let hits = tree
//!     .range_search(&Rect::new(3.0, 3.0, 5.0, 5.0), &points)
//!     .unwrap();
//! assert_eq!(hits, vec![4]);
//!
//! // Two nearest neighbours of the origin, nearest first.
//! let nearest = tree.k_nearest(&Point::new(1.0, 1.0), 2, &points).unwrap();
//! assert_eq!(nearest[0].0, 0);
//! ```
//!
//! # Box collisions
//!
//! ```
//! use kurbo::Rect;
//! use orthant_tree::{BuildOptions, QuadtreeBox};
//!
//! let rects = vec![
//!     Rect::new(0.0, 0.0, 4.0, 4.0),
//!     Rect::new(4.0, 0.0, 8.0, 4.0),
//!     Rect::new(5.0, 5.0, 7.0, 7.0),
//! ];
//! let domain = Rect::new(0.0, 0.0, 8.0, 8.0);
//! let tree = QuadtreeBox::build(&rects, &domain, 3, &BuildOptions::default()).unwrap();
//!
//! // The first two rectangles share a face; that counts unless `strict`.
//! assert_eq!(tree.collision_pairs(&rects, false), vec![(0, 1)]);
//! assert!(tree.collision_pairs(&rects, true).is_empty());
//! ```
//!
//! # Parallelism
//!
//! With the `parallel` feature (default), [`BuildOptions::parallel`] switches
//! bulk build to a rayon sort, and [`BoxTree::collision_pairs_par`] shards
//! candidate-pair production across worker threads. Results are identical to
//! the sequential paths. Trees are single-writer: mutation must not overlap
//! any other access, while read-only queries may run concurrently.

pub mod box_tree;
pub mod build;
pub mod containers;
pub mod error;
pub mod kurbo2d;
pub mod point_tree;
pub mod search;

pub use box_tree::BoxTree;
pub use build::BuildOptions;
pub use containers::{BoxSet, PointSet};
pub use error::{Result, TreeError};
pub use kurbo2d::{
    KurboAdapter, Octree, OctreeBox, Quadtree, QuadtreeBox, QuadtreeBoxSet, QuadtreePointSet,
};
pub use point_tree::PointTree;
pub use search::Real;

pub use orthant_core::{Adapter, BoxN, Cartesian, Code, EntityId, PointN, Scalar};
