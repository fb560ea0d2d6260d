// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core scene tree for retained-mode 2D rendering.
//!
//! `strata_core` provides the foundational data structures for managing a
//! display tree: affine matrices, axis-aligned bounds, cached per-node
//! transforms, and a struct-of-arrays node store with generational handles.
//! It is `no_std` compatible (with `alloc`) and leaves all GPU concerns to
//! the rendering crates layered on top.
//!
//! # Architecture
//!
//! A frame is produced by running two passes over the tree and handing the
//! results to a renderer:
//!
//! ```text
//!   caller mutations (transforms, children, content)
//!       │
//!       ▼
//!   SceneStore::update_transforms() ──► world matrices, world alpha
//!       │
//!       ▼
//!   SceneStore::calculate_bounds() ──► world-space Bounds per node
//!       │
//!       ▼
//!   renderer walks the tree in paint order
//! ```
//!
//! **[`matrix`]** — 2D affine [`Matrix`](matrix::Matrix) with the mapping,
//! composition, and decomposition operations the passes are built on.
//!
//! **[`bounds`]** — Fold-style axis-aligned [`Bounds`](bounds::Bounds)
//! accumulator with mask- and area-clipped union operations.
//!
//! **[`transform`]** — Per-node decomposed transform with version-counter
//! staleness tracking; composes local matrices into world matrices.
//!
//! **[`node`]** — Struct-of-arrays scene tree with generational handles.
//! Properties (transform, alpha, mask, content) are set by the caller;
//! world matrices, world alpha, and bounds are computed by the passes.
//!
//! **[`event`]** — Minimal per-resource signal dispatch used to decouple
//! asynchronously-loading content from the nodes that display it.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! pass instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one
//!   branch per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod bounds;
pub mod event;
pub mod matrix;
pub mod node;
pub mod trace;
pub mod transform;
