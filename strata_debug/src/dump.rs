// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene-tree snapshots for inspection.
//!
//! [`tree_dump`] renders a subtree as indented text, one node per line.
//! [`tree_json`] produces the same information as a [`serde_json::Value`]
//! for tooling that wants structure instead of text.

use std::fmt::Write;

use serde_json::{Value, json};
use strata_core::node::{ContentKind, NodeId, SceneStore};

/// Renders the subtree under `root` as indented text, one node per line.
///
/// # Panics
///
/// Panics if `root` is stale.
#[must_use]
pub fn tree_dump(store: &SceneStore, root: NodeId) -> String {
    let mut out = String::new();
    dump_node(store, root, 0, &mut out);
    out
}

fn dump_node(store: &SceneStore, id: NodeId, depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    let _ = write!(out, "{id:?}");
    if let Some(name) = store.name(id) {
        let _ = write!(out, " {name:?}");
    }
    let pos = store.transform(id).position();
    let _ = write!(out, " pos=({}, {}) alpha={}", pos.x, pos.y, store.alpha(id));
    if !store.visible(id) {
        out.push_str(" hidden");
    }
    if !store.renderable(id) && !store.is_mask(id) {
        out.push_str(" non-renderable");
    }
    if store.is_mask(id) {
        out.push_str(" mask");
    }
    if let Some(mask) = store.mask(id) {
        let _ = write!(out, " masked-by={mask:?}");
    }
    if let Some(content) = store.content(id) {
        let _ = write!(out, " {}", kind_label(content.kind()));
    }
    out.push('\n');
    for child in store.children(id) {
        dump_node(store, child, depth + 1, out);
    }
}

fn kind_label(kind: &ContentKind) -> String {
    match kind {
        ContentKind::Image { .. } => "image".to_owned(),
        ContentKind::Frames { frames, current } => {
            format!("frames({}/{})", current + 1, frames.len())
        }
        ContentKind::NineSlice { .. } => "nine-slice".to_owned(),
    }
}

/// Renders the subtree under `root` as a JSON value.
///
/// # Panics
///
/// Panics if `root` is stale.
#[must_use]
pub fn tree_json(store: &SceneStore, root: NodeId) -> Value {
    let pos = store.transform(root).position();
    let children: Vec<Value> = store
        .children(root)
        .map(|child| tree_json(store, child))
        .collect();
    json!({
        "id": root.index(),
        "name": store.name(root),
        "position": [pos.x, pos.y],
        "alpha": store.alpha(root),
        "visible": store.visible(root),
        "renderable": store.renderable(root),
        "is_mask": store.is_mask(root),
        "mask": store.mask(root).map(|m| m.index()),
        "content": store.content(root).map(|c| kind_label(c.kind())),
        "children": children,
    })
}
