// Copyright 2025 the Orthant Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Owning containers: tree plus geometry in one value.
//!
//! The bare trees store ids only and borrow geometry per call, which suits
//! callers that already own entity arrays. These wrappers bundle the two for
//! everyone else: they keep the geometry vector, reuse freed slots, and can
//! derive the domain from the input instead of requiring one up front.

use orthant_core::{Adapter, EntityId, Scalar};

use crate::box_tree::BoxTree;
use crate::build::BuildOptions;
use crate::error::{Result, TreeError};
use crate::point_tree::PointTree;
use crate::search::Real;

/// Grow a tight enclosing box into a usable domain: axes with zero extent get
/// unit extent so the grid mapper has something to subdivide.
fn padded_domain<A: Adapter<D>, const D: usize>(tight: &A::Box) -> A::Box {
    let min = A::box_min(tight);
    let mut max = A::box_max(tight);
    for d in 0..D {
        if !(min[d] < max[d]) {
            max[d] = A::Scalar::add(min[d], A::Scalar::one());
        }
    }
    A::box_from_corners(min, max)
}

/// A point tree owning its point vector.
pub struct PointSet<A: Adapter<D>, const D: usize> {
    points: Vec<A::Point>,
    free: Vec<EntityId>,
    tree: PointTree<A, D>,
}

impl<A: Adapter<D>, const D: usize> core::fmt::Debug for PointSet<A, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PointSet")
            .field("len", &self.len())
            .field("tree", &self.tree)
            .finish_non_exhaustive()
    }
}

impl<A: Adapter<D>, const D: usize> PointSet<A, D> {
    /// Build over `points` with a domain derived from their enclosing box.
    pub fn build(points: Vec<A::Point>, max_depth: u32, options: &BuildOptions) -> Result<Self> {
        let domain = padded_domain::<A, D>(&A::box_of_points(&points));
        Self::build_in(points, &domain, max_depth, options)
    }

    /// Build over `points` inside an explicit domain box.
    pub fn build_in(
        points: Vec<A::Point>,
        domain: &A::Box,
        max_depth: u32,
        options: &BuildOptions,
    ) -> Result<Self> {
        let tree = PointTree::build(&points, domain, max_depth, options)?;
        Ok(Self {
            points,
            free: Vec::new(),
            tree,
        })
    }

    /// Insert a point, returning its id. Freed slots are reused.
    pub fn insert(&mut self, point: A::Point) -> Result<EntityId> {
        let id = match self.free.last() {
            Some(&id) => id,
            None => {
                if self.points.len() >= u32::MAX as usize {
                    return Err(TreeError::CapacityExceeded);
                }
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "Length is bounded to u32 just above."
                )]
                let id = self.points.len() as EntityId;
                id
            }
        };
        self.tree.insert(id, &point)?;
        if self.free.pop().is_some() {
            self.points[id as usize] = point;
        } else {
            self.points.push(point);
        }
        Ok(id)
    }

    /// Erase a stored point by id.
    pub fn erase(&mut self, id: EntityId) -> Result<()> {
        let comps = A::point_comps(self.points.get(id as usize).ok_or(TreeError::NotFound)?);
        let point = A::point_from_comps(comps);
        self.tree.erase(id, &point)?;
        self.free.push(id);
        Ok(())
    }

    /// Move a stored point to new geometry.
    pub fn update(&mut self, id: EntityId, new: A::Point) -> Result<()> {
        let comps = A::point_comps(self.points.get(id as usize).ok_or(TreeError::NotFound)?);
        let old = A::point_from_comps(comps);
        self.tree.update(id, &old, &new)?;
        self.points[id as usize] = new;
        Ok(())
    }

    /// Stored geometry of an id, if alive.
    pub fn get(&self, id: EntityId) -> Option<&A::Point> {
        if self.tree.contains_id(id) {
            self.points.get(id as usize)
        } else {
            None
        }
    }

    /// Ids of stored points equal to `point` within `tolerance`.
    pub fn contains(&self, point: &A::Point, tolerance: A::Scalar) -> Vec<EntityId> {
        self.tree.contains(point, &self.points, tolerance)
    }

    /// Ids of stored points inside the closed query box, ascending.
    pub fn range_search(&self, query: &A::Box) -> Result<Vec<EntityId>> {
        self.tree.range_search(query, &self.points)
    }

    /// The `k` stored points nearest to `query`.
    pub fn k_nearest(&self, query: &A::Point, k: usize) -> Result<Vec<(EntityId, A::Scalar)>>
    where
        A::Scalar: Real,
    {
        self.tree.k_nearest(query, k, &self.points)
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.tree.entity_count()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The underlying tree.
    pub fn tree(&self) -> &PointTree<A, D> {
        &self.tree
    }
}

/// A box tree owning its box vector.
pub struct BoxSet<A: Adapter<D>, const D: usize> {
    boxes: Vec<A::Box>,
    free: Vec<EntityId>,
    tree: BoxTree<A, D>,
}

impl<A: Adapter<D>, const D: usize> core::fmt::Debug for BoxSet<A, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BoxSet")
            .field("len", &self.len())
            .field("tree", &self.tree)
            .finish_non_exhaustive()
    }
}

impl<A: Adapter<D>, const D: usize> BoxSet<A, D> {
    /// Build over `boxes` with a domain derived from their enclosing box.
    pub fn build(boxes: Vec<A::Box>, max_depth: u32, options: &BuildOptions) -> Result<Self> {
        let domain = padded_domain::<A, D>(&A::box_of_boxes(&boxes));
        Self::build_in(boxes, &domain, max_depth, options)
    }

    /// Build over `boxes` inside an explicit domain box.
    pub fn build_in(
        boxes: Vec<A::Box>,
        domain: &A::Box,
        max_depth: u32,
        options: &BuildOptions,
    ) -> Result<Self> {
        let tree = BoxTree::build(&boxes, domain, max_depth, options)?;
        Ok(Self {
            boxes,
            free: Vec::new(),
            tree,
        })
    }

    /// Insert a box, returning its id. Freed slots are reused.
    pub fn insert(&mut self, b: A::Box) -> Result<EntityId> {
        let id = match self.free.last() {
            Some(&id) => id,
            None => {
                if self.boxes.len() >= u32::MAX as usize {
                    return Err(TreeError::CapacityExceeded);
                }
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "Length is bounded to u32 just above."
                )]
                let id = self.boxes.len() as EntityId;
                id
            }
        };
        self.tree.insert(id, &b)?;
        if self.free.pop().is_some() {
            self.boxes[id as usize] = b;
        } else {
            self.boxes.push(b);
        }
        Ok(id)
    }

    /// Erase a stored box by id.
    pub fn erase(&mut self, id: EntityId) -> Result<()> {
        let min = A::box_min(self.boxes.get(id as usize).ok_or(TreeError::NotFound)?);
        let max = A::box_max(&self.boxes[id as usize]);
        let b = A::box_from_corners(min, max);
        self.tree.erase(id, &b)?;
        self.free.push(id);
        Ok(())
    }

    /// Replace a stored box's geometry.
    pub fn update(&mut self, id: EntityId, new: A::Box) -> Result<()> {
        let min = A::box_min(self.boxes.get(id as usize).ok_or(TreeError::NotFound)?);
        let max = A::box_max(&self.boxes[id as usize]);
        let old = A::box_from_corners(min, max);
        self.tree.update(id, &old, &new)?;
        self.boxes[id as usize] = new;
        Ok(())
    }

    /// Stored geometry of an id, if alive.
    pub fn get(&self, id: EntityId) -> Option<&A::Box> {
        if self.tree.contains_id(id) {
            self.boxes.get(id as usize)
        } else {
            None
        }
    }

    /// Ids of stored boxes containing the point.
    pub fn contains(&self, point: &A::Point) -> Vec<EntityId> {
        self.tree.contains(point, &self.boxes)
    }

    /// Ids of stored boxes overlapping the query box, ascending.
    pub fn range_search(&self, query: &A::Box, strict: bool) -> Result<Vec<EntityId>> {
        self.tree.range_search(query, &self.boxes, strict)
    }

    /// Nearest stored box hit by the ray.
    pub fn ray_pick(
        &self,
        origin: &A::Point,
        dir: &A::Point,
    ) -> Result<Option<(EntityId, A::Scalar)>> {
        self.tree.ray_pick(origin, dir, &self.boxes)
    }

    /// Every stored box hit by the ray, sorted by `(distance, id)`.
    pub fn ray_intersect_all(
        &self,
        origin: &A::Point,
        dir: &A::Point,
    ) -> Result<Vec<(EntityId, A::Scalar)>> {
        self.tree.ray_intersect_all(origin, dir, &self.boxes)
    }

    /// All overlapping pairs among the stored boxes, `first < second`.
    pub fn collision_pairs(&self, strict: bool) -> Vec<(EntityId, EntityId)> {
        self.tree.collision_pairs(&self.boxes, strict)
    }

    /// Number of stored boxes.
    pub fn len(&self) -> usize {
        self.tree.entity_count()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The underlying tree.
    pub fn tree(&self) -> &BoxTree<A, D> {
        &self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orthant_core::{BoxN, Cartesian, PointN};

    type PSet = PointSet<Cartesian<f64, 2>, 2>;
    type BSet = BoxSet<Cartesian<f64, 2>, 2>;

    fn pt(x: f64, y: f64) -> PointN<f64, 2> {
        PointN::new([x, y])
    }

    fn bx(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> BoxN<f64, 2> {
        BoxN::new([min_x, min_y], [max_x, max_y])
    }

    #[test]
    fn auto_domain_covers_the_input() {
        let set = PSet::build(
            vec![pt(-3.0, 2.0), pt(5.0, 9.0), pt(0.0, 4.0)],
            3,
            &BuildOptions::default(),
        )
        .unwrap();
        assert_eq!(set.len(), 3);
        // Every input point is findable again.
        for (i, p) in [pt(-3.0, 2.0), pt(5.0, 9.0), pt(0.0, 4.0)].iter().enumerate() {
            assert_eq!(set.contains(p, 0.0), vec![i as EntityId]);
        }
    }

    #[test]
    fn degenerate_input_still_builds() {
        let set = PSet::build(vec![pt(1.0, 1.0), pt(1.0, 1.0)], 2, &BuildOptions::default())
            .unwrap();
        assert_eq!(set.len(), 2);
        let hits = set.contains(&pt(1.0, 1.0), 0.0);
        assert_eq!(hits, vec![0, 1]);
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut set = PSet::build_in(
            vec![pt(1.0, 1.0), pt(2.0, 2.0)],
            &bx(0.0, 0.0, 8.0, 8.0),
            3,
            &BuildOptions::default(),
        )
        .unwrap();
        set.erase(0).unwrap();
        assert_eq!(set.get(0), None);
        assert_eq!(set.len(), 1);

        let id = set.insert(pt(3.0, 3.0)).unwrap();
        assert_eq!(id, 0, "freed slot comes back first");
        assert_eq!(set.get(0), Some(&pt(3.0, 3.0)));

        let id = set.insert(pt(4.0, 4.0)).unwrap();
        assert_eq!(id, 2);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn box_set_round_trip() {
        let mut set = BSet::build_in(
            vec![bx(0.0, 0.0, 2.0, 2.0), bx(1.0, 1.0, 3.0, 3.0)],
            &bx(0.0, 0.0, 8.0, 8.0),
            3,
            &BuildOptions::default(),
        )
        .unwrap();
        assert_eq!(set.collision_pairs(false), vec![(0, 1)]);

        set.update(1, bx(5.0, 5.0, 6.0, 6.0)).unwrap();
        assert!(set.collision_pairs(false).is_empty());

        let hits = set.range_search(&bx(4.5, 4.5, 7.0, 7.0), false).unwrap();
        assert_eq!(hits, vec![1]);

        set.erase(1).unwrap();
        assert_eq!(set.erase(1), Err(TreeError::NotFound));
        assert_eq!(set.len(), 1);
    }
}
