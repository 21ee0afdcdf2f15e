// Copyright 2025 the Orthant Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Query kernels shared by the point and box trees.
//!
//! All kernels follow the same playbook: integer pruning on location codes
//! and grid cells first, precise geometry through the adapter only on the
//! surviving candidate set.
//!
//! Range search visits the query's ancestor chain, then sweeps the owner's
//! subtree in code order; a node whose cell lies strictly inside the query
//! contributes all its entities without individual tests. The kNN kernel is a
//! best-first walk over a frontier heap keyed by cell distance lower bounds.
//! Ray traversal is a depth-first descent ordered by the ray's per-axis sign.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::collections::HashSet;

use orthant_core::{Adapter, Code, EntityId, Scalar};

use crate::build::TreeCore;

/// Scalar with the handful of real-valued operations queries need on top of
/// [`Scalar`].
pub trait Real: Scalar {
    /// Square root, for turning squared distances into distances.
    fn sqrt(self) -> Self;
}

impl Real for f32 {
    #[inline]
    fn sqrt(self) -> Self {
        f32::sqrt(self)
    }
}

impl Real for f64 {
    #[inline]
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }
}

/// Total-order wrapper over a partially ordered scalar. Query scalars are
/// finite by contract (no NaNs), so incomparable pairs collapse to `Equal`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct OrdScalar<T>(pub T);

impl<T: PartialEq> Eq for OrdScalar<T> {}

impl<T: PartialOrd> PartialOrd for OrdScalar<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: PartialOrd> Ord for OrdScalar<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0
            .partial_cmp(&other.0)
            .unwrap_or(std::cmp::Ordering::Equal)
    }
}

/// Integer extent of a node's cell at maximum-depth resolution, one axis.
#[inline]
fn node_span(cell: u64, shift: usize) -> (u64, u64) {
    (cell << shift, ((cell + 1) << shift) - 1)
}

/// Whether a node's cell can intersect the query cell range at all.
fn node_touches_query<const D: usize>(
    code: Code<D>,
    max_depth: u32,
    q_lo: &[u64; D],
    q_hi: &[u64; D],
) -> bool {
    let (cell, depth) = code.decode();
    let shift = (max_depth - depth) as usize;
    (0..D).all(|d| {
        let (lo, hi) = node_span(cell[d], shift);
        lo <= q_hi[d] && q_lo[d] <= hi
    })
}

/// Whether a node's cell lies strictly inside the query box.
fn cell_strictly_inside<A: Adapter<D>, const D: usize>(
    core: &TreeCore<A::Scalar, D>,
    code: Code<D>,
    q_min: &[A::Scalar; D],
    q_max: &[A::Scalar; D],
) -> bool {
    let (c_min, c_max) = core.mapper.cell_box(code);
    (0..D).all(|d| q_min[d] < c_min[d] && c_max[d] < q_max[d])
}

/// Generic range sweep: ancestor chain plus subtree of the query's owner.
///
/// `hit` runs the precise per-entity test; nodes strictly inside the query
/// skip it. Output is ascending and deduplicated (box entities can be stored
/// in several nodes).
fn range_sweep<A: Adapter<D>, const D: usize>(
    core: &TreeCore<A::Scalar, D>,
    q_min: &[A::Scalar; D],
    q_max: &[A::Scalar; D],
    hit: impl Fn(EntityId) -> bool,
) -> Vec<EntityId> {
    let mapper = &core.mapper;
    let q_lo = mapper.cell_clamped(q_min);
    let q_hi = mapper.cell_clamped(q_max);
    let h = mapper.max_depth();
    let owner = Code::common_ancestor(Code::encode(q_lo, h), Code::encode(q_hi, h));

    let mut out = Vec::new();
    for anc in owner.ancestors() {
        if let Some(node) = core.store.get(anc) {
            out.extend(node.entities().iter().copied().filter(|&id| hit(id)));
        }
    }
    for (code, node) in core.store.descendants(owner) {
        if !node_touches_query(code, h, &q_lo, &q_hi) {
            continue;
        }
        if cell_strictly_inside::<A, D>(core, code, q_min, q_max) {
            out.extend_from_slice(node.entities());
        } else {
            out.extend(node.entities().iter().copied().filter(|&id| hit(id)));
        }
    }
    out.sort_unstable();
    out.dedup();
    out
}

/// Range search over stored points: entities whose point lies in the closed
/// query box.
pub(crate) fn range_search_points<A: Adapter<D>, const D: usize>(
    core: &TreeCore<A::Scalar, D>,
    points: &[A::Point],
    q: &A::Box,
) -> Vec<EntityId> {
    let q_min = A::box_min(q);
    let q_max = A::box_max(q);
    let q_box = A::box_from_corners(q_min, q_max);
    range_sweep::<A, D>(core, &q_min, &q_max, |id| {
        A::box_contains_point(&q_box, &points[id as usize])
    })
}

/// Range search over stored boxes: entities whose box overlaps the query.
pub(crate) fn range_search_boxes<A: Adapter<D>, const D: usize>(
    core: &TreeCore<A::Scalar, D>,
    boxes: &[A::Box],
    q: &A::Box,
    strict: bool,
) -> Vec<EntityId> {
    let q_min = A::box_min(q);
    let q_max = A::box_max(q);
    range_sweep::<A, D>(core, &q_min, &q_max, |id| {
        A::boxes_overlap(&boxes[id as usize], q, strict)
    })
}

/// Best-first k-nearest-neighbour walk over stored points.
///
/// The frontier heap is keyed by the squared distance from the query to each
/// node's cell; the walk stops once the next lower bound exceeds the current
/// k-th best. Ties break towards ascending entity id.
pub(crate) fn k_nearest_points<A: Adapter<D>, const D: usize>(
    core: &TreeCore<A::Scalar, D>,
    points: &[A::Point],
    query: &A::Point,
    k: usize,
) -> Vec<(EntityId, A::Scalar)>
where
    A::Scalar: Real,
{
    let mut frontier: BinaryHeap<Reverse<(OrdScalar<A::Scalar>, Code<D>)>> = BinaryHeap::new();
    frontier.push(Reverse((OrdScalar(A::Scalar::zero()), Code::ROOT)));
    // Max-heap of the best k found so far; the worst candidate is on top.
    let mut best: BinaryHeap<(OrdScalar<A::Scalar>, EntityId)> = BinaryHeap::new();

    while let Some(Reverse((OrdScalar(bound), code))) = frontier.pop() {
        if best.len() == k
            && let Some(&(OrdScalar(worst), _)) = best.peek()
            && bound > worst
        {
            break;
        }
        let Some(node) = core.store.get(code) else {
            continue;
        };
        for &id in node.entities() {
            let d2 = A::distance_squared(query, &points[id as usize]);
            if best.len() < k {
                best.push((OrdScalar(d2), id));
            } else if let Some(&(OrdScalar(worst), worst_id)) = best.peek()
                && (d2 < worst || (d2 == worst && id < worst_id))
            {
                best.pop();
                best.push((OrdScalar(d2), id));
            }
        }
        for child in core.store.children(code) {
            let (c_min, c_max) = core.mapper.cell_box(child);
            let cell = A::box_from_corners(c_min, c_max);
            let d2 = A::distance_squared_to_box(query, &cell);
            if best.len() == k
                && let Some(&(OrdScalar(worst), _)) = best.peek()
                && d2 > worst
            {
                continue;
            }
            frontier.push(Reverse((OrdScalar(d2), child)));
        }
    }

    best.into_sorted_vec()
        .into_iter()
        .map(|(OrdScalar(d2), id)| (id, d2.sqrt()))
        .collect()
}

/// Depth-first ray traversal over stored boxes.
///
/// Children are visited near to far by flipping the child index with the
/// ray's per-axis sign mask. With `first_only` the walk prunes cells whose
/// entry distance exceeds the best hit so far. Hits come back sorted by
/// `(distance, id)` with one entry per entity.
pub(crate) fn ray_hits<A: Adapter<D>, const D: usize>(
    core: &TreeCore<A::Scalar, D>,
    boxes: &[A::Box],
    origin: &A::Point,
    dir: &A::Point,
    first_only: bool,
) -> Vec<(EntityId, A::Scalar)> {
    let zero = A::Scalar::zero();
    let mut sign_mask = 0u64;
    for d in 0..D {
        if A::point_comp(dir, d) < zero {
            sign_mask |= 1 << d;
        }
    }

    let mut best: Option<A::Scalar> = None;
    let mut out: Vec<(EntityId, A::Scalar)> = Vec::new();
    let mut stack = vec![Code::<D>::ROOT];
    while let Some(code) = stack.pop() {
        let Some(node) = core.store.get(code) else {
            continue;
        };
        let (c_min, c_max) = core.mapper.cell_box(code);
        let cell = A::box_from_corners(c_min, c_max);
        let Some(t_cell) = A::ray_box_intersection(origin, dir, &cell) else {
            continue;
        };
        if first_only && best.is_some_and(|b| t_cell > b) {
            continue;
        }
        for &id in node.entities() {
            if let Some(t) = A::ray_box_intersection(origin, dir, &boxes[id as usize]) {
                if first_only {
                    best = Some(match best {
                        Some(b) if b < t => b,
                        _ => t,
                    });
                }
                out.push((id, t));
            }
        }
        // Reverse push order so the near child pops first.
        for i in (0..Code::<D>::CHILDREN).rev() {
            let child = i ^ sign_mask;
            if node.has_child(child) {
                stack.push(code.child(child));
            }
        }
    }

    out.sort_by(|a, b| {
        OrdScalar(a.1)
            .cmp(&OrdScalar(b.1))
            .then_with(|| a.0.cmp(&b.0))
    });
    let mut seen = HashSet::new();
    out.retain(|&(id, _)| seen.insert(id));
    if first_only {
        out.truncate(1);
    }
    out
}
