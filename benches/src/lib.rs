// Copyright 2025 the Orthant Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmark-only member crate; the targets live under `benches/`.
