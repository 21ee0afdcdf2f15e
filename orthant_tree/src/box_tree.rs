// Copyright 2025 the Orthant Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linear orthant tree over axis-aligned boxes.
//!
//! A box's *natural* owner is the deepest node whose cell spans both its
//! corners. Left there, large or boundary-straddling boxes pile up in shallow
//! nodes and destroy query selectivity, so the tree accepts an additional
//! *split depth* `K`: each box is recorded in every cell it overlaps at depth
//! `min(natural + K, max_depth)`. That multiplies storage by a small constant
//! and keeps per-node candidate sets small; it never changes query results.
//! A per-entity coverage count backs erase.
//!
//! Self-collision visits each node once: all pairs among the node's own
//! entities, plus its entities against every ancestor entity overlapping the
//! node's cell. Redundant copies make this complete without ever comparing
//! cousin nodes.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use orthant_core::{Adapter, Code, EntityId, GridMapper, Node, NodeStore, Scalar};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::build::{BuildOptions, TreeCore, sort_pairs, validate_capacity, validate_domain};
use crate::error::{Result, TreeError};
use crate::search;

/// Linear orthant tree indexing axis-aligned boxes.
pub struct BoxTree<A: Adapter<D>, const D: usize> {
    core: TreeCore<A::Scalar, D>,
    /// Per-entity count of the nodes holding a copy of it.
    coverage: BTreeMap<EntityId, u32>,
    split_depth: u32,
    _adapter: PhantomData<A>,
}

impl<A: Adapter<D>, const D: usize> core::fmt::Debug for BoxTree<A, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BoxTree")
            .field("dim", &D)
            .field("max_depth", &self.core.mapper.max_depth())
            .field("split_depth", &self.split_depth)
            .field("entities", &self.coverage.len())
            .field("nodes", &self.core.store.len())
            .finish_non_exhaustive()
    }
}

impl<A: Adapter<D>, const D: usize> BoxTree<A, D> {
    /// Bulk-build a tree over `boxes` with ids `0..boxes.len()`.
    ///
    /// Out-of-domain corners are clamped into the boundary cells (with a
    /// diagnostic); a box with inverted corners fails the whole build with
    /// [`TreeError::InvalidArgument`].
    pub fn build(
        boxes: &[A::Box],
        domain: &A::Box,
        max_depth: u32,
        options: &BuildOptions,
    ) -> Result<Self> {
        validate_capacity::<D>(max_depth, boxes.len())?;
        let lo = A::box_min(domain);
        let hi = A::box_max(domain);
        validate_domain(&lo, &hi)?;
        let mapper = GridMapper::new(lo, hi, max_depth);
        let split_depth = options.split_depth;

        for b in boxes {
            if (0..D).any(|d| A::box_min_comp(b, d) > A::box_max_comp(b, d)) {
                return Err(TreeError::InvalidArgument);
            }
        }

        let mut clamped = 0usize;
        let mut pairs: Vec<(Code<D>, EntityId)> = Vec::with_capacity(boxes.len());
        let mut coverage = BTreeMap::new();
        for (i, b) in boxes.iter().enumerate() {
            let min = A::box_min(b);
            let max = A::box_max(b);
            if !mapper.in_domain(&min) || !mapper.in_domain(&max) {
                clamped += 1;
            }
            let owners = effective_owners(
                &mapper,
                split_depth,
                mapper.cell_clamped(&min),
                mapper.cell_clamped(&max),
            );
            #[allow(
                clippy::cast_possible_truncation,
                reason = "validate_capacity bounds the entity count to u32; owner counts are small."
            )]
            let (id, copies) = (i as EntityId, owners.len() as u32);
            coverage.insert(id, copies);
            pairs.extend(owners.into_iter().map(|code| (code, id)));
        }
        if clamped > 0 {
            log::warn!("box tree build clamped {clamped} out-of-domain boxes");
        }
        sort_pairs(&mut pairs, options.parallel);
        let store = NodeStore::from_sorted_pairs(max_depth, &pairs);
        log::debug!(
            "box tree built: {} entities ({} copies) in {} nodes",
            boxes.len(),
            pairs.len(),
            store.len()
        );

        Ok(Self {
            core: TreeCore { mapper, store },
            coverage,
            split_depth,
            _adapter: PhantomData,
        })
    }

    /// Insert a box under a fresh id.
    pub fn insert(&mut self, id: EntityId, b: &A::Box) -> Result<()> {
        if self.coverage.contains_key(&id) {
            return Err(TreeError::DuplicateId);
        }
        let min = A::box_min(b);
        let max = A::box_max(b);
        if (0..D).any(|d| min[d] > max[d]) {
            return Err(TreeError::InvalidArgument);
        }
        if !self.core.mapper.in_domain(&min) || !self.core.mapper.in_domain(&max) {
            return Err(TreeError::OutOfDomain);
        }
        let owners = self.owners_of(&min, &max);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "owner counts are bounded by the grid size."
        )]
        let copies = owners.len() as u32;
        self.coverage.insert(id, copies);
        for code in owners {
            self.core.store.push_entity(code, id);
        }
        Ok(())
    }

    /// Erase a stored box. `b` must be the geometry it was stored with.
    pub fn erase(&mut self, id: EntityId, b: &A::Box) -> Result<()> {
        if !self.coverage.contains_key(&id) {
            return Err(TreeError::NotFound);
        }
        let min = A::box_min(b);
        let max = A::box_max(b);
        let owners = self.owners_of(&min, &max);
        // Validate before mutating so a geometry mismatch leaves the tree
        // untouched.
        for &code in &owners {
            let present = self
                .core
                .store
                .get(code)
                .is_some_and(|n| n.entities().contains(&id));
            if !present {
                return Err(TreeError::NotFound);
            }
        }
        debug_assert_eq!(self.coverage[&id] as usize, owners.len());
        for code in owners {
            self.core.store.remove_entity(code, id);
        }
        self.coverage.remove(&id);
        Ok(())
    }

    /// Replace a stored box's geometry: erase plus insert, atomic with
    /// respect to errors.
    pub fn update(&mut self, id: EntityId, old: &A::Box, new: &A::Box) -> Result<()> {
        if !self.coverage.contains_key(&id) {
            return Err(TreeError::NotFound);
        }
        let min = A::box_min(new);
        let max = A::box_max(new);
        if (0..D).any(|d| min[d] > max[d]) {
            return Err(TreeError::InvalidArgument);
        }
        if !self.core.mapper.in_domain(&min) || !self.core.mapper.in_domain(&max) {
            return Err(TreeError::OutOfDomain);
        }
        self.erase(id, old)?;
        self.insert(id, new)
    }

    /// Ids of stored boxes containing the point, boundaries included, in
    /// root-to-leaf discovery order.
    pub fn contains(&self, point: &A::Point, boxes: &[A::Box]) -> Vec<EntityId> {
        let comps = A::point_comps(point);
        if !self.core.mapper.in_domain(&comps) {
            return Vec::new();
        }
        let cell = self.core.mapper.cell_clamped(&comps);
        let mut out = Vec::new();
        for code in self.core.path_nodes(cell) {
            if let Some(node) = self.core.store.get(code) {
                out.extend(
                    node.entities()
                        .iter()
                        .copied()
                        .filter(|&id| A::box_contains_point(&boxes[id as usize], point)),
                );
            }
        }
        out
    }

    /// Ids of stored boxes overlapping the query box, ascending.
    ///
    /// With `strict` the overlap must have positive extent on every axis;
    /// otherwise face contact counts too.
    pub fn range_search(
        &self,
        query: &A::Box,
        boxes: &[A::Box],
        strict: bool,
    ) -> Result<Vec<EntityId>> {
        let q_min = A::box_min(query);
        let q_max = A::box_max(query);
        if (0..D).any(|d| q_min[d] > q_max[d]) {
            return Err(TreeError::InvalidArgument);
        }
        Ok(search::range_search_boxes::<A, D>(
            &self.core, boxes, query, strict,
        ))
    }

    /// Nearest stored box hit by the ray, as `(id, distance)`, or `None`.
    pub fn ray_pick(
        &self,
        origin: &A::Point,
        dir: &A::Point,
        boxes: &[A::Box],
    ) -> Result<Option<(EntityId, A::Scalar)>> {
        self.validate_dir(dir)?;
        Ok(search::ray_hits::<A, D>(&self.core, boxes, origin, dir, true)
            .into_iter()
            .next())
    }

    /// Every stored box hit by the ray, as `(id, distance)` pairs sorted by
    /// `(distance, id)`.
    pub fn ray_intersect_all(
        &self,
        origin: &A::Point,
        dir: &A::Point,
        boxes: &[A::Box],
    ) -> Result<Vec<(EntityId, A::Scalar)>> {
        self.validate_dir(dir)?;
        Ok(search::ray_hits::<A, D>(
            &self.core, boxes, origin, dir, false,
        ))
    }

    /// All unordered pairs of stored boxes that overlap, each emitted once
    /// with `first < second`, sorted.
    ///
    /// With `strict` the overlap must have positive extent on every axis.
    /// The pair set does not depend on the split depth the tree was built
    /// with.
    pub fn collision_pairs(&self, boxes: &[A::Box], strict: bool) -> Vec<(EntityId, EntityId)> {
        let mut out = Vec::new();
        for (code, node) in self.core.store.iter() {
            self.node_pairs(code, node, boxes, strict, &mut out);
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    /// [`collision_pairs`](Self::collision_pairs) with candidate production
    /// sharded across worker threads by owner node. The pair set is identical
    /// to the sequential one.
    #[cfg(feature = "parallel")]
    pub fn collision_pairs_par(
        &self,
        boxes: &[A::Box],
        strict: bool,
    ) -> Vec<(EntityId, EntityId)>
    where
        A: Sync,
        A::Scalar: Send + Sync,
        A::Box: Sync,
    {
        let nodes: Vec<(Code<D>, &Node)> = self.core.store.iter().collect();
        let mut out: Vec<(EntityId, EntityId)> = nodes
            .par_iter()
            .map(|&(code, node)| {
                let mut local = Vec::new();
                self.node_pairs(code, node, boxes, strict, &mut local);
                local
            })
            .reduce(Vec::new, |mut acc, mut chunk| {
                acc.append(&mut chunk);
                acc
            });
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Whether an entity id is currently stored.
    pub fn contains_id(&self, id: EntityId) -> bool {
        self.coverage.contains_key(&id)
    }

    /// Number of stored boxes.
    pub fn entity_count(&self) -> usize {
        self.coverage.len()
    }

    /// Number of materialised nodes, root included.
    pub fn node_count(&self) -> usize {
        self.core.store.len()
    }

    /// Maximum subdivision depth.
    pub fn max_depth(&self) -> u32 {
        self.core.mapper.max_depth()
    }

    /// Additional split depth applied below natural owners.
    pub fn split_depth(&self) -> u32 {
        self.split_depth
    }

    /// The construction domain box.
    pub fn domain(&self) -> A::Box {
        A::box_from_corners(*self.core.mapper.lo(), *self.core.mapper.hi())
    }

    fn validate_dir(&self, dir: &A::Point) -> Result<()> {
        let zero = A::Scalar::zero();
        if (0..D).all(|d| A::point_comp(dir, d) == zero) {
            return Err(TreeError::InvalidArgument);
        }
        Ok(())
    }

    fn owners_of(&self, min: &[A::Scalar; D], max: &[A::Scalar; D]) -> Vec<Code<D>> {
        effective_owners(
            &self.core.mapper,
            self.split_depth,
            self.core.mapper.cell_clamped(min),
            self.core.mapper.cell_clamped(max),
        )
    }

    /// Candidate pairs contributed by one node: its own entities against each
    /// other, and against every ancestor entity whose box reaches this
    /// node's cell.
    fn node_pairs(
        &self,
        code: Code<D>,
        node: &Node,
        boxes: &[A::Box],
        strict: bool,
        out: &mut Vec<(EntityId, EntityId)>,
    ) {
        let ents = node.entities();
        for (i, &a) in ents.iter().enumerate() {
            for &b in &ents[i + 1..] {
                let (lo, hi) = if a < b { (a, b) } else { (b, a) };
                if A::boxes_overlap(&boxes[lo as usize], &boxes[hi as usize], strict) {
                    out.push((lo, hi));
                }
            }
        }
        if ents.is_empty() {
            return;
        }
        let (c_min, c_max) = self.core.mapper.cell_box(code);
        let cell = A::box_from_corners(c_min, c_max);
        for anc in code.ancestors() {
            let Some(anc_node) = self.core.store.get(anc) else {
                continue;
            };
            for &p in anc_node.entities() {
                if !A::boxes_overlap(&boxes[p as usize], &cell, false) {
                    continue;
                }
                for &q in ents {
                    if p == q {
                        continue;
                    }
                    let (lo, hi) = if p < q { (p, q) } else { (q, p) };
                    if A::boxes_overlap(&boxes[lo as usize], &boxes[hi as usize], strict) {
                        out.push((lo, hi));
                    }
                }
            }
        }
    }
}

/// Every cell at depth `min(natural + split_depth, max_depth)` the corner
/// cells span, as codes. The natural owner is the common ancestor of the two
/// corner cells.
fn effective_owners<T: orthant_core::Scalar, const D: usize>(
    mapper: &GridMapper<T, D>,
    split_depth: u32,
    lo_cells: [u64; D],
    hi_cells: [u64; D],
) -> Vec<Code<D>> {
    let h = mapper.max_depth();
    let natural = Code::common_ancestor(Code::encode(lo_cells, h), Code::encode(hi_cells, h));
    let target = (natural.depth() + split_depth).min(h);
    let shift = (h - target) as usize;
    let lo = lo_cells.map(|c| c >> shift);
    let hi = hi_cells.map(|c| c >> shift);

    let mut out = Vec::new();
    let mut cur = lo;
    loop {
        out.push(Code::encode(cur, target));
        let mut axis = 0;
        loop {
            if axis == D {
                return out;
            }
            if cur[axis] < hi[axis] {
                cur[axis] += 1;
                break;
            }
            cur[axis] = lo[axis];
            axis += 1;
        }
    }
}
