// Copyright 2025 the Orthant Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bulk-build plumbing shared by the point and box trees.
//!
//! Building is sort-then-synthesise: every entity gets an owner code, the
//! `(code, id)` pairs are sorted ascending, and the node store materialises
//! the tree in one linear pass. Only the sort is ever parallel; synthesis
//! mutates the store and stays sequential.

use orthant_core::{Code, EntityId, GridMapper, NodeStore, Scalar};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{Result, TreeError};

/// Construction options for both tree kinds.
#[derive(Copy, Clone, Debug)]
pub struct BuildOptions {
    /// Extra levels below a box's natural owner where it is redundantly
    /// stored (box trees only; ignored by point trees). Deeper placement
    /// multiplies storage by a small constant and sharply shrinks collision
    /// candidate sets for clustered data.
    pub split_depth: u32,
    /// Permit a parallel sort during bulk build. Requires the `parallel`
    /// feature; without it the flag is ignored.
    pub parallel: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            split_depth: 2,
            parallel: false,
        }
    }
}

/// Validate the dimension/depth/entity-count envelope.
///
/// The code payload needs `1 + D * max_depth` bits within the 64-bit word
/// (one bit held back for child arithmetic), the child bitmap is a `u64`
/// capping `D` at 6, and ids are dense `u32`.
pub(crate) fn validate_capacity<const D: usize>(max_depth: u32, entities: usize) -> Result<()> {
    if D == 0 || D > 6 {
        return Err(TreeError::CapacityExceeded);
    }
    if max_depth == 0 || max_depth > Code::<D>::MAX_DEPTH {
        return Err(TreeError::CapacityExceeded);
    }
    if entities > u32::MAX as usize {
        return Err(TreeError::CapacityExceeded);
    }
    Ok(())
}

/// Validate that the domain box has positive extent on every axis.
pub(crate) fn validate_domain<T: Scalar, const D: usize>(lo: &[T; D], hi: &[T; D]) -> Result<()> {
    if (0..D).all(|d| lo[d] < hi[d]) {
        Ok(())
    } else {
        Err(TreeError::InvalidArgument)
    }
}

/// Sort `(code, id)` pairs ascending, in parallel when requested and built
/// with the `parallel` feature.
///
/// Ids are distinct, so an unstable sort of the full pair is observationally
/// stable: entities sharing a code keep ascending-id (input) order.
pub(crate) fn sort_pairs<const D: usize>(pairs: &mut [(Code<D>, EntityId)], parallel: bool) {
    #[cfg(feature = "parallel")]
    if parallel {
        pairs.par_sort_unstable();
        return;
    }
    let _ = parallel;
    pairs.sort_unstable();
}

/// Grid mapper plus node store: the state both tree kinds share.
#[derive(Clone, Debug)]
pub(crate) struct TreeCore<T: Scalar, const D: usize> {
    pub(crate) mapper: GridMapper<T, D>,
    pub(crate) store: NodeStore<D>,
}

impl<T: Scalar, const D: usize> TreeCore<T, D> {
    /// Walk from the root towards the cell, descending through the child
    /// bitmap, and return the deepest stored node on the path.
    pub(crate) fn locate_cell(&self, cell: [u64; D]) -> Code<D> {
        let h = self.mapper.max_depth();
        let mut code = Code::<D>::ROOT;
        for depth in 1..=h {
            let shift = h - depth;
            let mut idx = 0u64;
            for (axis, c) in cell.iter().enumerate() {
                idx |= ((c >> shift) & 1) << axis;
            }
            match self.store.get(code) {
                Some(node) if node.has_child(idx) => code = code.child(idx),
                _ => break,
            }
        }
        code
    }

    /// Codes on the root path of the cell, root first, deepest stored node
    /// last. Only stored nodes are yielded.
    pub(crate) fn path_nodes(&self, cell: [u64; D]) -> Vec<Code<D>> {
        let deepest = self.locate_cell(cell);
        let mut path: Vec<Code<D>> = deepest.ancestors().collect();
        path.reverse();
        path.push(deepest);
        path
    }
}
