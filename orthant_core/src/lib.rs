// Copyright 2025 the Orthant Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Orthant Core: generic building blocks for linear orthant trees.
//!
//! An orthant tree is the `D`-dimensional generalisation of a quadtree
//! (`D = 2`) and octree (`D = 3`). The *linear* representation stores no
//! child or parent pointers: every node is addressed by a sentinel-prefixed
//! Morton location code, and the whole tree is a sorted mapping from code to
//! node record. This crate provides the pieces that representation is built
//! from; the trees themselves live in `orthant_tree`.
//!
//! - [`Code`]: the location-code codec (interleave, parent/child shifts,
//!   ancestor algebra).
//! - [`GridMapper`]: domain coordinates to integer grid cells at a depth.
//! - [`NodeStore`]: the code-keyed node mapping with contiguous descendant
//!   sweeps and the linear bulk-build synthesis pass.
//! - [`Adapter`]: the geometry boundary, with array-backed [`PointN`] /
//!   [`BoxN`] defaults.
//!
//! It is generic over the scalar type `T` and does not depend on any geometry
//! crate; higher layers adapt their own point and box types via [`Adapter`].
//!
//! # Example
//!
//! ```rust
//! use orthant_core::{Code, GridMapper, NodeStore};
//!
//! // Map a 2D domain onto an 8x8 grid (depth 3).
//! let mapper: GridMapper<f64, 2> = GridMapper::new([0.0, 0.0], [8.0, 8.0], 3);
//! let code = mapper.code_clamped(&[4.5, 1.0]);
//! assert_eq!(code.depth(), 3);
//!
//! // Build a store from sorted (code, entity) pairs.
//! let mut pairs = vec![(code, 0u32), (mapper.code_clamped(&[7.0, 7.0]), 1)];
//! pairs.sort_unstable();
//! let store = NodeStore::from_sorted_pairs(3, &pairs);
//! assert_eq!(store.get(code).unwrap().entities(), &[0]);
//!
//! // Codes form their own hierarchy: no pointers needed.
//! assert!(Code::<2>::ROOT.is_ancestor_of(code));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod adapter;
pub mod code;
pub mod grid;
pub mod scalar;
pub mod store;

pub use adapter::{Adapter, BoxN, Cartesian, PointN};
pub use code::Code;
pub use grid::GridMapper;
pub use scalar::Scalar;
pub use store::{EntityId, Node, NodeStore};
