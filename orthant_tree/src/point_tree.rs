// Copyright 2025 the Orthant Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linear orthant tree over points.
//!
//! Every stored point lives at exactly one maximum-depth leaf; internal nodes
//! exist only to make the leaf reachable. The tree holds entity ids, never
//! geometry: callers pass their point slice to every query, and the ids index
//! into it.

use std::collections::BTreeSet;
use std::marker::PhantomData;

use orthant_core::{Adapter, Code, EntityId, GridMapper, NodeStore};

use crate::build::{BuildOptions, TreeCore, sort_pairs, validate_capacity, validate_domain};
use crate::error::{Result, TreeError};
use crate::search::{self, Real};

/// Linear orthant tree indexing points.
pub struct PointTree<A: Adapter<D>, const D: usize> {
    core: TreeCore<A::Scalar, D>,
    ids: BTreeSet<EntityId>,
    _adapter: PhantomData<A>,
}

impl<A: Adapter<D>, const D: usize> core::fmt::Debug for PointTree<A, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PointTree")
            .field("dim", &D)
            .field("max_depth", &self.core.mapper.max_depth())
            .field("entities", &self.ids.len())
            .field("nodes", &self.core.store.len())
            .finish_non_exhaustive()
    }
}

impl<A: Adapter<D>, const D: usize> PointTree<A, D> {
    /// Bulk-build a tree over `points` with ids `0..points.len()`.
    ///
    /// Out-of-domain points are clamped into the boundary cells (with a
    /// diagnostic); dynamic [`insert`](Self::insert) rejects them instead.
    /// Fails with [`TreeError::CapacityExceeded`] when the dimension/depth
    /// combination overflows the location-code word and with
    /// [`TreeError::InvalidArgument`] on a degenerate domain box.
    pub fn build(
        points: &[A::Point],
        domain: &A::Box,
        max_depth: u32,
        options: &BuildOptions,
    ) -> Result<Self> {
        validate_capacity::<D>(max_depth, points.len())?;
        let lo = A::box_min(domain);
        let hi = A::box_max(domain);
        validate_domain(&lo, &hi)?;
        let mapper = GridMapper::new(lo, hi, max_depth);

        let mut clamped = 0usize;
        let mut pairs: Vec<(Code<D>, EntityId)> = points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let comps = A::point_comps(p);
                if !mapper.in_domain(&comps) {
                    clamped += 1;
                }
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "validate_capacity bounds the entity count to u32."
                )]
                let id = i as EntityId;
                (mapper.code_clamped(&comps), id)
            })
            .collect();
        if clamped > 0 {
            log::warn!("point tree build clamped {clamped} out-of-domain points");
        }
        sort_pairs(&mut pairs, options.parallel);
        let store = NodeStore::from_sorted_pairs(max_depth, &pairs);
        log::debug!(
            "point tree built: {} entities in {} nodes",
            points.len(),
            store.len()
        );

        #[allow(
            clippy::cast_possible_truncation,
            reason = "validate_capacity bounds the entity count to u32."
        )]
        let ids = (0..points.len() as EntityId).collect();
        Ok(Self {
            core: TreeCore { mapper, store },
            ids,
            _adapter: PhantomData,
        })
    }

    /// Insert a point under a fresh id.
    pub fn insert(&mut self, id: EntityId, point: &A::Point) -> Result<()> {
        if self.ids.contains(&id) {
            return Err(TreeError::DuplicateId);
        }
        let comps = A::point_comps(point);
        let cell = self
            .core
            .mapper
            .cell_checked(&comps)
            .ok_or(TreeError::OutOfDomain)?;
        let code = Code::encode(cell, self.core.mapper.max_depth());
        self.core.store.push_entity(code, id);
        self.ids.insert(id);
        Ok(())
    }

    /// Erase a stored point. `point` must be the geometry it was stored with.
    pub fn erase(&mut self, id: EntityId, point: &A::Point) -> Result<()> {
        if !self.ids.contains(&id) {
            return Err(TreeError::NotFound);
        }
        let comps = A::point_comps(point);
        let code = self.core.mapper.code_clamped(&comps);
        if !self.core.store.remove_entity(code, id) {
            return Err(TreeError::NotFound);
        }
        self.ids.remove(&id);
        Ok(())
    }

    /// Move a stored point: erase plus insert, atomic with respect to errors.
    pub fn update(&mut self, id: EntityId, old: &A::Point, new: &A::Point) -> Result<()> {
        if !self.ids.contains(&id) {
            return Err(TreeError::NotFound);
        }
        let new_comps = A::point_comps(new);
        if self.core.mapper.cell_checked(&new_comps).is_none() {
            return Err(TreeError::OutOfDomain);
        }
        self.erase(id, old)?;
        self.insert(id, new)
    }

    /// Ids of stored points equal to `point` within `tolerance`.
    pub fn contains(
        &self,
        point: &A::Point,
        points: &[A::Point],
        tolerance: A::Scalar,
    ) -> Vec<EntityId> {
        let comps = A::point_comps(point);
        let Some(cell) = self.core.mapper.cell_checked(&comps) else {
            return Vec::new();
        };
        let code = self.core.locate_cell(cell);
        let Some(node) = self.core.store.get(code) else {
            return Vec::new();
        };
        node.entities()
            .iter()
            .copied()
            .filter(|&id| A::points_approx_eq(point, &points[id as usize], tolerance))
            .collect()
    }

    /// Ids of stored points inside the closed query box, ascending.
    pub fn range_search(&self, query: &A::Box, points: &[A::Point]) -> Result<Vec<EntityId>> {
        let q_min = A::box_min(query);
        let q_max = A::box_max(query);
        if (0..D).any(|d| q_min[d] > q_max[d]) {
            return Err(TreeError::InvalidArgument);
        }
        Ok(search::range_search_points::<A, D>(
            &self.core, points, query,
        ))
    }

    /// The `k` stored points nearest to `query`, as `(id, distance)` pairs in
    /// ascending `(distance, id)` order. Returns fewer when the tree holds
    /// fewer than `k` points.
    pub fn k_nearest(
        &self,
        query: &A::Point,
        k: usize,
        points: &[A::Point],
    ) -> Result<Vec<(EntityId, A::Scalar)>>
    where
        A::Scalar: Real,
    {
        if k == 0 {
            return Err(TreeError::InvalidArgument);
        }
        Ok(search::k_nearest_points::<A, D>(
            &self.core, points, query, k,
        ))
    }

    /// Whether an entity id is currently stored.
    pub fn contains_id(&self, id: EntityId) -> bool {
        self.ids.contains(&id)
    }

    /// Number of stored points.
    pub fn entity_count(&self) -> usize {
        self.ids.len()
    }

    /// Number of materialised nodes, root included.
    pub fn node_count(&self) -> usize {
        self.core.store.len()
    }

    /// Maximum subdivision depth.
    pub fn max_depth(&self) -> u32 {
        self.core.mapper.max_depth()
    }

    /// The construction domain box.
    pub fn domain(&self) -> A::Box {
        A::box_from_corners(*self.core.mapper.lo(), *self.core.mapper.hi())
    }
}
