// Copyright 2025 the Orthant Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Domain-to-grid coordinate mapping.
//!
//! The mapper turns continuous coordinates inside the domain box into integer
//! cell indices at the tree's maximum depth, using one precomputed per-axis
//! scale. Cells are half-open except on the domain's upper faces: the maximum
//! corner of the domain belongs to the last cell, so boundary geometry is
//! indexable.

use crate::code::Code;
use crate::scalar::Scalar;

/// Maps domain coordinates to integer grid cells at a fixed maximum depth.
#[derive(Clone, Debug)]
pub struct GridMapper<T: Scalar, const D: usize> {
    lo: [T; D],
    hi: [T; D],
    scale: [T; D],
    max_depth: u32,
}

impl<T: Scalar, const D: usize> GridMapper<T, D> {
    /// Create a mapper over the domain `[lo, hi)` subdivided `2^max_depth`
    /// times per axis.
    ///
    /// Callers must have validated `lo < hi` per axis and
    /// `max_depth <= Code::<D>::MAX_DEPTH`.
    pub fn new(lo: [T; D], hi: [T; D], max_depth: u32) -> Self {
        debug_assert!(max_depth <= Code::<D>::MAX_DEPTH);
        let cells = T::from_cell(1u64 << max_depth);
        let scale = core::array::from_fn(|d| {
            debug_assert!(lo[d] < hi[d], "domain must have positive extent");
            T::div(cells, T::sub(hi[d], lo[d]))
        });
        Self {
            lo,
            hi,
            scale,
            max_depth,
        }
    }

    /// Domain minimum corner.
    #[inline]
    pub fn lo(&self) -> &[T; D] {
        &self.lo
    }

    /// Domain maximum corner.
    #[inline]
    pub fn hi(&self) -> &[T; D] {
        &self.hi
    }

    /// Maximum subdivision depth.
    #[inline]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Cells per axis at the maximum depth.
    #[inline]
    pub fn side(&self) -> u64 {
        1 << self.max_depth
    }

    /// Whether the components lie inside the domain, upper faces included.
    pub fn in_domain(&self, comps: &[T; D]) -> bool {
        (0..D).all(|d| self.lo[d] <= comps[d] && comps[d] <= self.hi[d])
    }

    /// Cell indices at the maximum depth, clamped into the grid.
    ///
    /// Coordinates on or beyond the upper faces land in the last cell, which
    /// is the upper-face inclusion rule for the domain's maximum corner.
    pub fn cell_clamped(&self, comps: &[T; D]) -> [u64; D] {
        core::array::from_fn(|d| {
            if comps[d] <= self.lo[d] {
                0
            } else {
                let scaled = T::mul(T::sub(comps[d], self.lo[d]), self.scale[d]);
                T::to_cell(scaled).min(self.side() - 1)
            }
        })
    }

    /// Cell indices at the maximum depth, or `None` when outside the domain.
    pub fn cell_checked(&self, comps: &[T; D]) -> Option<[u64; D]> {
        if self.in_domain(comps) {
            Some(self.cell_clamped(comps))
        } else {
            None
        }
    }

    /// Geometric bounds of the cell addressed by `code`.
    ///
    /// The upper bound of cells on the domain's upper faces is the domain
    /// maximum itself, keeping the outermost cell closed against it.
    pub fn cell_box(&self, code: Code<D>) -> ([T; D], [T; D]) {
        let (cell, depth) = code.decode();
        let shift = (self.max_depth - depth) as usize;
        let side = self.side();
        let min = core::array::from_fn(|d| {
            let c = cell[d] << shift;
            T::add(self.lo[d], T::div(T::from_cell(c), self.scale[d]))
        });
        let max = core::array::from_fn(|d| {
            let c = (cell[d] + 1) << shift;
            if c >= side {
                self.hi[d]
            } else {
                T::add(self.lo[d], T::div(T::from_cell(c), self.scale[d]))
            }
        });
        (min, max)
    }

    /// Full-depth location code of the cell containing `comps` (clamped).
    pub fn code_clamped(&self, comps: &[T; D]) -> Code<D> {
        Code::encode(self.cell_clamped(comps), self.max_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> GridMapper<f64, 2> {
        GridMapper::new([0.0, 0.0], [8.0, 8.0], 3)
    }

    #[test]
    fn interior_points_map_to_expected_cells() {
        let m = mapper();
        assert_eq!(m.cell_clamped(&[0.0, 0.0]), [0, 0]);
        assert_eq!(m.cell_clamped(&[0.5, 0.5]), [0, 0]);
        assert_eq!(m.cell_clamped(&[1.0, 0.0]), [1, 0]);
        assert_eq!(m.cell_clamped(&[4.0, 4.0]), [4, 4]);
        assert_eq!(m.cell_clamped(&[7.999, 7.999]), [7, 7]);
    }

    #[test]
    fn domain_max_corner_lands_in_last_cell() {
        let m = mapper();
        assert!(m.in_domain(&[8.0, 8.0]));
        assert_eq!(m.cell_clamped(&[8.0, 8.0]), [7, 7]);
        assert_eq!(m.cell_checked(&[8.0, 8.0]), Some([7, 7]));
        assert_eq!(m.cell_checked(&[8.0001, 4.0]), None);
        assert_eq!(m.cell_checked(&[-0.0001, 4.0]), None);
    }

    #[test]
    fn cell_box_round_trips_cells() {
        let m = mapper();
        let code = Code::<2>::encode([3, 5], 3);
        let (min, max) = m.cell_box(code);
        assert_eq!(min, [3.0, 5.0]);
        assert_eq!(max, [4.0, 6.0]);

        let root = Code::<2>::ROOT;
        let (min, max) = m.cell_box(root);
        assert_eq!(min, [0.0, 0.0]);
        assert_eq!(max, [8.0, 8.0]);
    }

    #[test]
    fn asymmetric_domain_scales_per_axis() {
        let m: GridMapper<f64, 2> = GridMapper::new([-4.0, 0.0], [4.0, 16.0], 2);
        assert_eq!(m.cell_clamped(&[-4.0, 0.0]), [0, 0]);
        assert_eq!(m.cell_clamped(&[0.0, 8.0]), [2, 2]);
        assert_eq!(m.cell_clamped(&[4.0, 16.0]), [3, 3]);
    }
}
