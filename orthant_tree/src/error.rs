// Copyright 2025 the Orthant Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree error types.

use thiserror::Error;

/// Errors surfaced by tree construction, mutation, and queries.
///
/// Mutating operations are atomic: on any error the tree is left in its
/// pre-call state, and `build` is all-or-nothing.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// Geometry lies outside the construction domain.
    #[error("geometry lies outside the tree domain")]
    OutOfDomain,

    /// The dimension/depth combination overflows the location-code word, or
    /// the entity count overflows the id space.
    #[error("dimension, depth, or entity count exceeds capacity")]
    CapacityExceeded,

    /// Insert with an entity id that is already stored.
    #[error("entity id is already stored")]
    DuplicateId,

    /// Erase or update of an entity id that is not stored.
    #[error("entity id is not stored")]
    NotFound,

    /// Malformed query or entity input (inverted box, `k = 0`, zero ray
    /// direction).
    #[error("invalid argument")]
    InvalidArgument,
}

/// Convenience alias for tree results.
pub type Result<T, E = TreeError> = core::result::Result<T, E>;
