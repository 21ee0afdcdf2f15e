// Copyright 2025 the Orthant Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry adapter: the only boundary that knows concrete geometry types.
//!
//! User point and box types plug into the trees through [`Adapter`]. The
//! required methods are per-component accessors and constructors; everything
//! geometric the trees need (enclosing boxes, containment, overlap, ray-slab
//! intersection, distances) is derived from those and provided here, so an
//! adapter implementation is a handful of one-liners.
//!
//! [`PointN`] / [`BoxN`] are plain array-backed defaults with the matching
//! [`Cartesian`] adapter for callers without their own geometry types.

use crate::scalar::{Scalar, max_t, min_t};

/// Per-component access to a caller-defined point type `P` and box type `B`.
///
/// The adapter is pure: no state, no allocation. `Box` values follow the
/// `min <= max` componentwise convention.
pub trait Adapter<const D: usize> {
    /// Coordinate scalar.
    type Scalar: Scalar;
    /// Caller point type.
    type Point;
    /// Caller axis-aligned box type.
    type Box;

    /// Read component `dim` of a point.
    fn point_comp(point: &Self::Point, dim: usize) -> Self::Scalar;

    /// Write component `dim` of a point.
    fn point_comp_set(point: &mut Self::Point, dim: usize, value: Self::Scalar);

    /// Construct a point from `D` components.
    fn point_from_comps(comps: [Self::Scalar; D]) -> Self::Point;

    /// Read component `dim` of a box's minimum corner.
    fn box_min_comp(b: &Self::Box, dim: usize) -> Self::Scalar;

    /// Read component `dim` of a box's maximum corner.
    fn box_max_comp(b: &Self::Box, dim: usize) -> Self::Scalar;

    /// Construct a box from corner components.
    fn box_from_corners(min: [Self::Scalar; D], max: [Self::Scalar; D]) -> Self::Box;

    /// All components of a point.
    fn point_comps(point: &Self::Point) -> [Self::Scalar; D] {
        core::array::from_fn(|d| Self::point_comp(point, d))
    }

    /// Minimum corner components of a box.
    fn box_min(b: &Self::Box) -> [Self::Scalar; D] {
        core::array::from_fn(|d| Self::box_min_comp(b, d))
    }

    /// Maximum corner components of a box.
    fn box_max(b: &Self::Box) -> [Self::Scalar; D] {
        core::array::from_fn(|d| Self::box_max_comp(b, d))
    }

    /// Smallest box enclosing all points. Empty input yields a degenerate box
    /// at the origin.
    fn box_of_points(points: &[Self::Point]) -> Self::Box {
        let mut it = points.iter();
        let Some(first) = it.next() else {
            let zero = [Self::Scalar::zero(); D];
            return Self::box_from_corners(zero, zero);
        };
        let mut min = Self::point_comps(first);
        let mut max = min;
        for p in it {
            for d in 0..D {
                let c = Self::point_comp(p, d);
                min[d] = min_t(min[d], c);
                max[d] = max_t(max[d], c);
            }
        }
        Self::box_from_corners(min, max)
    }

    /// Smallest box enclosing all boxes. Empty input yields a degenerate box
    /// at the origin.
    fn box_of_boxes(boxes: &[Self::Box]) -> Self::Box {
        let mut it = boxes.iter();
        let Some(first) = it.next() else {
            let zero = [Self::Scalar::zero(); D];
            return Self::box_from_corners(zero, zero);
        };
        let mut min = Self::box_min(first);
        let mut max = Self::box_max(first);
        for b in it {
            for d in 0..D {
                min[d] = min_t(min[d], Self::box_min_comp(b, d));
                max[d] = max_t(max[d], Self::box_max_comp(b, d));
            }
        }
        Self::box_from_corners(min, max)
    }

    /// Componentwise equality within `tolerance`.
    fn points_approx_eq(a: &Self::Point, b: &Self::Point, tolerance: Self::Scalar) -> bool {
        (0..D).all(|d| {
            let (ca, cb) = (Self::point_comp(a, d), Self::point_comp(b, d));
            // Two-sided check instead of abs: scalars only promise sub/compare.
            Self::Scalar::sub(ca, cb) <= tolerance && Self::Scalar::sub(cb, ca) <= tolerance
        })
    }

    /// Whether the box contains the point, boundaries included.
    fn box_contains_point(b: &Self::Box, p: &Self::Point) -> bool {
        (0..D).all(|d| {
            let c = Self::point_comp(p, d);
            Self::box_min_comp(b, d) <= c && c <= Self::box_max_comp(b, d)
        })
    }

    /// Whether `outer` contains `inner` entirely, boundaries included.
    fn box_contains_box(outer: &Self::Box, inner: &Self::Box) -> bool {
        (0..D).all(|d| {
            Self::box_min_comp(outer, d) <= Self::box_min_comp(inner, d)
                && Self::box_max_comp(inner, d) <= Self::box_max_comp(outer, d)
        })
    }

    /// Whether two boxes overlap.
    ///
    /// With `strict` the overlap must have positive extent on every axis.
    /// Without it, contact still counts as long as it spans a face: touching
    /// on one axis is an overlap, touching on two or more (corner or edge
    /// contact in 3D) is not.
    fn boxes_overlap(a: &Self::Box, b: &Self::Box, strict: bool) -> bool {
        if strict {
            return (0..D).all(|d| {
                Self::box_min_comp(a, d) < Self::box_max_comp(b, d)
                    && Self::box_min_comp(b, d) < Self::box_max_comp(a, d)
            });
        }
        let mut touching = 0usize;
        for d in 0..D {
            let (amin, amax) = (Self::box_min_comp(a, d), Self::box_max_comp(a, d));
            let (bmin, bmax) = (Self::box_min_comp(b, d), Self::box_max_comp(b, d));
            if amin > bmax || bmin > amax {
                return false;
            }
            if amax == bmin || bmax == amin {
                touching += 1;
            }
        }
        touching <= 1
    }

    /// Squared Euclidean distance between two points.
    fn distance_squared(a: &Self::Point, b: &Self::Point) -> Self::Scalar {
        let mut acc = Self::Scalar::zero();
        for d in 0..D {
            let diff = Self::Scalar::sub(Self::point_comp(a, d), Self::point_comp(b, d));
            acc = Self::Scalar::add(acc, Self::Scalar::mul(diff, diff));
        }
        acc
    }

    /// Squared distance from a point to the nearest point of a box.
    fn distance_squared_to_box(p: &Self::Point, b: &Self::Box) -> Self::Scalar {
        let mut acc = Self::Scalar::zero();
        for d in 0..D {
            let c = Self::point_comp(p, d);
            let lo = Self::box_min_comp(b, d);
            let hi = Self::box_max_comp(b, d);
            let gap = if c < lo {
                Self::Scalar::sub(lo, c)
            } else if c > hi {
                Self::Scalar::sub(c, hi)
            } else {
                Self::Scalar::zero()
            };
            acc = Self::Scalar::add(acc, Self::Scalar::mul(gap, gap));
        }
        acc
    }

    /// Slab intersection of a ray with a box.
    ///
    /// Returns the distance (in units of `dir`) to the nearest entry point,
    /// `0` when the origin is inside, `None` on a miss. A zero direction
    /// component turns that axis into a pure slab membership test.
    fn ray_box_intersection(
        origin: &Self::Point,
        dir: &Self::Point,
        b: &Self::Box,
    ) -> Option<Self::Scalar> {
        let zero = Self::Scalar::zero();
        let mut t_min: Option<Self::Scalar> = None;
        let mut t_max: Option<Self::Scalar> = None;
        for d in 0..D {
            let o = Self::point_comp(origin, d);
            let v = Self::point_comp(dir, d);
            let lo = Self::box_min_comp(b, d);
            let hi = Self::box_max_comp(b, d);
            if v == zero {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let mut t0 = Self::Scalar::div(Self::Scalar::sub(lo, o), v);
            let mut t1 = Self::Scalar::div(Self::Scalar::sub(hi, o), v);
            if t0 > t1 {
                core::mem::swap(&mut t0, &mut t1);
            }
            t_min = Some(match t_min {
                Some(t) => max_t(t, t0),
                None => t0,
            });
            t_max = Some(match t_max {
                Some(t) => min_t(t, t1),
                None => t1,
            });
        }
        let entry = t_min.unwrap_or(zero);
        let exit = t_max.unwrap_or(zero);
        if entry > exit || exit < zero {
            return None;
        }
        Some(max_t(entry, zero))
    }
}

/// Array-backed point in `D` dimensions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointN<T, const D: usize>(pub [T; D]);

/// Array-backed axis-aligned box in `D` dimensions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoxN<T, const D: usize> {
    /// Minimum corner.
    pub min: PointN<T, D>,
    /// Maximum corner.
    pub max: PointN<T, D>,
}

impl<T: Scalar, const D: usize> PointN<T, D> {
    /// Create a point from components.
    pub const fn new(comps: [T; D]) -> Self {
        Self(comps)
    }
}

impl<T: Scalar, const D: usize> BoxN<T, D> {
    /// Create a box from corner components.
    pub const fn new(min: [T; D], max: [T; D]) -> Self {
        Self {
            min: PointN(min),
            max: PointN(max),
        }
    }
}

/// Adapter for the array-backed [`PointN`] / [`BoxN`] types.
#[derive(Copy, Clone, Debug, Default)]
pub struct Cartesian<T, const D: usize>(core::marker::PhantomData<T>);

impl<T: Scalar, const D: usize> Adapter<D> for Cartesian<T, D> {
    type Scalar = T;
    type Point = PointN<T, D>;
    type Box = BoxN<T, D>;

    #[inline]
    fn point_comp(point: &Self::Point, dim: usize) -> T {
        point.0[dim]
    }

    #[inline]
    fn point_comp_set(point: &mut Self::Point, dim: usize, value: T) {
        point.0[dim] = value;
    }

    #[inline]
    fn point_from_comps(comps: [T; D]) -> Self::Point {
        PointN(comps)
    }

    #[inline]
    fn box_min_comp(b: &Self::Box, dim: usize) -> T {
        b.min.0[dim]
    }

    #[inline]
    fn box_max_comp(b: &Self::Box, dim: usize) -> T {
        b.max.0[dim]
    }

    #[inline]
    fn box_from_corners(min: [T; D], max: [T; D]) -> Self::Box {
        BoxN::new(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type A = Cartesian<f64, 2>;

    #[test]
    fn box_of_points_encloses_all() {
        let pts = [
            PointN::new([1.0, 5.0]),
            PointN::new([-2.0, 0.5]),
            PointN::new([3.0, 2.0]),
        ];
        let b = A::box_of_points(&pts);
        assert_eq!(b, BoxN::new([-2.0, 0.5], [3.0, 5.0]));
    }

    #[test]
    fn shared_face_counts_unless_strict() {
        let a = BoxN::new([0.0, 0.0], [4.0, 4.0]);
        let b = BoxN::new([4.0, 0.0], [8.0, 4.0]);
        assert!(A::boxes_overlap(&a, &b, false));
        assert!(!A::boxes_overlap(&a, &b, true));
    }

    #[test]
    fn corner_contact_never_counts() {
        let a = BoxN::new([0.0, 0.0], [1.0, 1.0]);
        let b = BoxN::new([1.0, 1.0], [2.0, 2.0]);
        assert!(!A::boxes_overlap(&a, &b, false));
        assert!(!A::boxes_overlap(&a, &b, true));
    }

    #[test]
    fn interior_overlap_counts_both_ways() {
        let a = BoxN::new([0.0, 0.0], [2.0, 2.0]);
        let b = BoxN::new([1.0, 1.0], [3.0, 3.0]);
        assert!(A::boxes_overlap(&a, &b, false));
        assert!(A::boxes_overlap(&a, &b, true));
    }

    #[test]
    fn degenerate_box_inside_still_overlaps() {
        let point_box = BoxN::new([1.0, 1.0], [1.0, 1.0]);
        let q = BoxN::new([0.0, 0.0], [2.0, 2.0]);
        assert!(A::boxes_overlap(&point_box, &q, false));
    }

    #[test]
    fn ray_hits_box_front_face() {
        let b = BoxN::new([2.0, -1.0], [4.0, 1.0]);
        let origin = PointN::new([0.0, 0.0]);
        let dir = PointN::new([1.0, 0.0]);
        assert_eq!(A::ray_box_intersection(&origin, &dir, &b), Some(2.0));

        let away = PointN::new([-1.0, 0.0]);
        assert_eq!(A::ray_box_intersection(&origin, &away, &b), None);

        let inside = PointN::new([3.0, 0.0]);
        assert_eq!(A::ray_box_intersection(&inside, &dir, &b), Some(0.0));
    }

    #[test]
    fn distance_to_box_is_zero_inside() {
        let b = BoxN::new([0.0, 0.0], [2.0, 2.0]);
        assert_eq!(A::distance_squared_to_box(&PointN::new([1.0, 1.0]), &b), 0.0);
        assert_eq!(A::distance_squared_to_box(&PointN::new([3.0, 0.0]), &b), 1.0);
        assert_eq!(A::distance_squared_to_box(&PointN::new([3.0, 3.0]), &b), 2.0);
    }
}
