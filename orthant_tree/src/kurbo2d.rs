// Copyright 2025 the Orthant Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Kurbo-native 2D adapter and the named tree aliases.
//!
//! Quadtrees speak [`kurbo::Point`] / [`kurbo::Rect`] directly; the 3D
//! aliases use the array-backed defaults from `orthant_core`.

use kurbo::{Point, Rect};
use orthant_core::{Adapter, Cartesian};

use crate::box_tree::BoxTree;
use crate::containers::{BoxSet, PointSet};
use crate::point_tree::PointTree;

/// Adapter over `kurbo::Point` and `kurbo::Rect`.
#[derive(Copy, Clone, Debug, Default)]
pub struct KurboAdapter;

impl Adapter<2> for KurboAdapter {
    type Scalar = f64;
    type Point = Point;
    type Box = Rect;

    #[inline]
    fn point_comp(point: &Point, dim: usize) -> f64 {
        match dim {
            0 => point.x,
            _ => point.y,
        }
    }

    #[inline]
    fn point_comp_set(point: &mut Point, dim: usize, value: f64) {
        match dim {
            0 => point.x = value,
            _ => point.y = value,
        }
    }

    #[inline]
    fn point_from_comps(comps: [f64; 2]) -> Point {
        Point::new(comps[0], comps[1])
    }

    #[inline]
    fn box_min_comp(b: &Rect, dim: usize) -> f64 {
        match dim {
            0 => b.x0,
            _ => b.y0,
        }
    }

    #[inline]
    fn box_max_comp(b: &Rect, dim: usize) -> f64 {
        match dim {
            0 => b.x1,
            _ => b.y1,
        }
    }

    #[inline]
    fn box_from_corners(min: [f64; 2], max: [f64; 2]) -> Rect {
        Rect::new(min[0], min[1], max[0], max[1])
    }
}

/// Quadtree over kurbo points.
pub type Quadtree = PointTree<KurboAdapter, 2>;
/// Quadtree over kurbo rectangles.
pub type QuadtreeBox = BoxTree<KurboAdapter, 2>;
/// Owning quadtree point container.
pub type QuadtreePointSet = PointSet<KurboAdapter, 2>;
/// Owning quadtree rectangle container.
pub type QuadtreeBoxSet = BoxSet<KurboAdapter, 2>;

/// Octree over array-backed `f64` points.
pub type Octree = PointTree<Cartesian<f64, 3>, 3>;
/// Octree over array-backed `f64` boxes.
pub type OctreeBox = BoxTree<Cartesian<f64, 3>, 3>;
