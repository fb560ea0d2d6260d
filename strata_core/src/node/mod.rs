// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene tree data model.
//!
//! A *node* is an element of a display tree. Each node has:
//!
//! - An identity ([`NodeId`]) — a generational handle that becomes stale when
//!   the node is destroyed, preventing use-after-free bugs at the API level.
//! - Topology — a parent back-reference and an ordered child list; child
//!   order is the paint order.
//! - **Local properties** set by the caller: the local
//!   [`Transform`](crate::transform::Transform),
//!   [`alpha`](SceneStore::set_alpha), [`visible`](SceneStore::set_visible),
//!   [`renderable`](SceneStore::set_renderable),
//!   [`name`](SceneStore::set_name), [`mask`](SceneStore::set_mask),
//!   [`filter_area`](SceneStore::set_filter_area), and
//!   [`content`](SceneStore::set_content).
//! - **Computed properties** produced by the passes: the world matrix and
//!   `world_alpha` (from [`update_transforms`](SceneStore::update_transforms))
//!   and world-space bounds (from
//!   [`calculate_bounds`](SceneStore::calculate_bounds)).
//!
//! Nodes are stored in struct-of-arrays layout with index-based handles
//! for cache-friendly traversal.
//!
//! # Staleness tracking
//!
//! There is no eager dirty propagation. Mutations bump version counters
//! (local transform id, world id, bounds id) and each pass compares the
//! counters it cares about, so an unchanged subtree is skipped with a few
//! integer comparisons per node.

mod bounds_pass;
mod content;
mod id;
mod store;
mod traverse;
mod update;

pub use content::{Content, ContentKind};
pub use id::{INVALID, NodeId, TextureRef};
pub use store::SceneStore;
pub use traverse::{Children, Descendants};
