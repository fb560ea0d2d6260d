// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and property management.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Rect;

use crate::bounds::Bounds;
use crate::event::{Emitter, EventKind};
use crate::transform::Transform;

use super::content::Content;
use super::id::{INVALID, NodeId};

/// Struct-of-arrays storage for all nodes of a scene tree.
///
/// Nodes are addressed by [`NodeId`] handles. Internally, each node occupies
/// a slot in parallel arrays. Destroyed nodes are recycled via a free list,
/// and generation counters prevent stale handle access.
///
/// Every node is a container: any node can carry children, and a node with
/// [`Content`] additionally contributes its own quad to the bounds pass.
/// Child order is the paint order, kept as an explicit per-node index list so
/// that positional operations ([`add_child_at`](Self::add_child_at),
/// [`set_child_index`](Self::set_child_index), ...) are direct.
#[derive(Debug)]
pub struct SceneStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) children: Vec<Vec<u32>>,

    // -- Local properties (set by callers) --
    pub(crate) transform: Vec<Transform>,
    pub(crate) alpha: Vec<f64>,
    pub(crate) visible: Vec<bool>,
    pub(crate) renderable: Vec<bool>,
    pub(crate) name: Vec<Option<String>>,
    pub(crate) mask: Vec<u32>,
    pub(crate) is_mask: Vec<bool>,
    pub(crate) filter_area: Vec<Option<Rect>>,
    pub(crate) content: Vec<Option<Content>>,
    pub(crate) emitter: Vec<Emitter>,

    // -- Computed properties (written by the passes) --
    pub(crate) world_alpha: Vec<f64>,
    pub(crate) bounds: Vec<Bounds>,
    pub(crate) bounds_id: Vec<u32>,
    pub(crate) last_bounds_id: Vec<u32>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneStore {
    /// Creates an empty scene store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            children: Vec::new(),
            transform: Vec::new(),
            alpha: Vec::new(),
            visible: Vec::new(),
            renderable: Vec::new(),
            name: Vec::new(),
            mask: Vec::new(),
            is_mask: Vec::new(),
            filter_area: Vec::new(),
            content: Vec::new(),
            emitter: Vec::new(),
            world_alpha: Vec::new(),
            bounds: Vec::new(),
            bounds_id: Vec::new(),
            last_bounds_id: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    // -- Allocation API --

    /// Creates a new node and returns its handle.
    ///
    /// The node starts detached, with an identity transform, full alpha,
    /// visible and renderable, no name, no mask, and no content.
    pub fn create_node(&mut self) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.children[i].clear();
            self.transform[i] = Transform::new();
            self.alpha[i] = 1.0;
            self.visible[i] = true;
            self.renderable[i] = true;
            self.name[i] = None;
            self.mask[i] = INVALID;
            self.is_mask[i] = false;
            self.filter_area[i] = None;
            self.content[i] = None;
            self.emitter[i] = Emitter::new();
            self.world_alpha[i] = 1.0;
            self.bounds[i] = Bounds::new();
            self.bounds_id[i] = 0;
            self.last_bounds_id[i] = u32::MAX;
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.children.push(Vec::new());
            self.transform.push(Transform::new());
            self.alpha.push(1.0);
            self.visible.push(true);
            self.renderable.push(true);
            self.name.push(None);
            self.mask.push(INVALID);
            self.is_mask.push(false);
            self.filter_area.push(None);
            self.content.push(None);
            self.emitter.push(Emitter::new());
            self.world_alpha.push(1.0);
            self.bounds.push(Bounds::new());
            self.bounds_id.push(0);
            self.last_bounds_id.push(u32::MAX);
            self.generation.push(0);
            idx
        };

        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys a node, freeing its slot for reuse.
    ///
    /// Cross-references are cleared: the node is detached from its parent,
    /// its mask assignment is released, and any node that used it as a mask
    /// loses the assignment. Old handles fail validation immediately, so a
    /// second destroy through a stale handle panics rather than corrupting a
    /// reused slot.
    ///
    /// # Panics
    ///
    /// Panics if the node has children (remove them first) or if the handle
    /// is stale.
    pub fn destroy_node(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx;
        let i = idx as usize;
        assert!(
            self.children[i].is_empty(),
            "cannot destroy node with children"
        );

        if self.parent[i] != INVALID {
            let p = self.parent[i];
            self.unlink_from_parent(idx);
            self.on_children_change(p);
        }

        // Release the mask this node points at.
        if self.mask[i] != INVALID {
            let target = self.mask[i] as usize;
            self.is_mask[target] = false;
            self.renderable[target] = true;
            self.mask[i] = INVALID;
        }

        // Release any mask assignment pointing at this node.
        if self.is_mask[i] {
            for site in 0..self.len as usize {
                if self.mask[site] == idx {
                    self.mask[site] = INVALID;
                }
            }
            self.is_mask[i] = false;
        }

        self.content[i] = None;
        self.name[i] = None;
        self.emitter[i] = Emitter::new();

        // Bump generation so old handles immediately fail validation.
        self.generation[i] += 1;
        self.free_list.push(idx);
    }

    /// Destroys a node and every descendant.
    ///
    /// Children are destroyed before their parents, so each node's
    /// teardown (mask cross-reference release, handle invalidation) runs
    /// with an empty child list.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy_subtree(&mut self, id: NodeId) {
        self.validate(id);
        let mut order = Vec::new();
        let mut stack = alloc::vec![id.idx];
        while let Some(idx) = stack.pop() {
            order.push(idx);
            stack.extend(self.children[idx as usize].iter().copied());
        }
        while let Some(idx) = order.pop() {
            self.destroy_node(self.id_at(idx));
        }
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Panics with a diagnostic if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(self.is_alive(id), "stale NodeId: {id:?}");
    }

    /// Rebuilds a handle for a live slot index.
    pub(crate) fn id_at(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    // -- Topology API --

    /// Adds `child` as the last child of `parent`.
    ///
    /// If `child` already has a parent it is removed from that parent first,
    /// so a node is never resident in two child lists.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale or `parent == child`.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        assert!(parent.idx != child.idx, "cannot add a node to itself");

        if self.parent[child.idx as usize] != INVALID {
            self.unlink_from_parent(child.idx);
        }
        let index = self.children[parent.idx as usize].len();
        self.attach(parent.idx, child.idx, index);
    }

    /// Adds `child` at an explicit position in `parent`'s child list.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if `parent == child`, or if `index`
    /// is greater than the current child count.
    pub fn add_child_at(&mut self, parent: NodeId, child: NodeId, index: usize) {
        self.validate(parent);
        self.validate(child);
        assert!(parent.idx != child.idx, "cannot add a node to itself");

        if self.parent[child.idx as usize] != INVALID {
            self.unlink_from_parent(child.idx);
        }

        let count = self.children[parent.idx as usize].len();
        assert!(
            index <= count,
            "child index {index} out of range (have {count} children)"
        );
        self.attach(parent.idx, child.idx, index);
    }

    /// Removes `child` from `parent`'s child list.
    ///
    /// Returns `false` without touching anything if `child` is not a child
    /// of `parent`; removal of a non-child is an expected no-op, not an
    /// error.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        self.validate(parent);
        self.validate(child);
        if self.parent[child.idx as usize] != parent.idx {
            return false;
        }
        self.detach(child.idx);
        true
    }

    /// Removes and returns the child at `index`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or `index` is out of range.
    pub fn remove_child_at(&mut self, parent: NodeId, index: usize) -> NodeId {
        self.validate(parent);
        let p = parent.idx as usize;
        let count = self.children[p].len();
        assert!(
            index < count,
            "child index {index} out of range (have {count} children)"
        );
        let c = self.children[p][index];
        self.detach(c);
        self.id_at(c)
    }

    /// Removes the children in positions `[begin, end)` and returns them.
    ///
    /// `begin == end == 0` on an empty child list is a valid no-op returning
    /// an empty vector. Any other empty or inverted range is a caller bug.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the range is not
    /// `0 < end - begin <= child count` with `end` within the list.
    pub fn remove_children(&mut self, parent: NodeId, begin: usize, end: usize) -> Vec<NodeId> {
        self.validate(parent);
        let p = parent.idx as usize;
        let count = self.children[p].len();

        if begin == 0 && end == 0 && count == 0 {
            return Vec::new();
        }
        assert!(
            begin < end && end <= count,
            "removal range [{begin}, {end}) out of bounds (have {count} children)"
        );

        let removed: Vec<u32> = self.children[p].drain(begin..end).collect();
        for &c in &removed {
            self.parent[c as usize] = INVALID;
            self.transform[c as usize].invalidate_parent_id();
            self.emitter[c as usize].emit(EventKind::Removed);
        }
        self.on_children_change(parent.idx);
        removed.into_iter().map(|c| self.id_at(c)).collect()
    }

    /// Returns the child at `index`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or `index` is out of range.
    #[must_use]
    pub fn child_at(&self, parent: NodeId, index: usize) -> NodeId {
        self.validate(parent);
        let p = parent.idx as usize;
        let count = self.children[p].len();
        assert!(
            index < count,
            "child index {index} out of range (have {count} children)"
        );
        self.id_at(self.children[p][index])
    }

    /// Number of children of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn child_count(&self, parent: NodeId) -> usize {
        self.validate(parent);
        self.children[parent.idx as usize].len()
    }

    /// Position of `child` in `parent`'s child list.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale or `child` is not a child of
    /// `parent`. Asking for the index of a non-child is a caller bug, not a
    /// recoverable condition.
    #[must_use]
    pub fn child_index(&self, parent: NodeId, child: NodeId) -> usize {
        self.validate(parent);
        self.validate(child);
        self.children[parent.idx as usize]
            .iter()
            .position(|&c| c == child.idx)
            .unwrap_or_else(|| panic!("{child:?} is not a child of {parent:?}"))
    }

    /// Moves `child` to position `index` in `parent`'s child list.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, `child` is not a child of `parent`,
    /// or `index` is out of range.
    pub fn set_child_index(&mut self, parent: NodeId, child: NodeId, index: usize) {
        let current = self.child_index(parent, child);
        let p = parent.idx as usize;
        let count = self.children[p].len();
        assert!(
            index < count,
            "child index {index} out of range (have {count} children)"
        );
        self.children[p].remove(current);
        self.children[p].insert(index, child.idx);
        self.on_children_change(parent.idx);
    }

    /// Swaps the positions of two children of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if any handle is stale or either node is not a child of
    /// `parent`.
    pub fn swap_children(&mut self, parent: NodeId, a: NodeId, b: NodeId) {
        if a.idx == b.idx {
            return;
        }
        let ia = self.child_index(parent, a);
        let ib = self.child_index(parent, b);
        self.children[parent.idx as usize].swap(ia, ib);
        self.on_children_change(parent.idx);
    }

    /// Looks up a direct child of `parent` by name.
    ///
    /// Returns `None` when no child carries the name.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or more than one child carries the
    /// name; an ambiguous lookup masks a naming bug in the caller.
    #[must_use]
    pub fn child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.validate(parent);
        let mut found = None;
        for &c in &self.children[parent.idx as usize] {
            if self.name[c as usize].as_deref() == Some(name) {
                assert!(
                    found.is_none(),
                    "duplicate child name {name:?} under {parent:?}"
                );
                found = Some(self.id_at(c));
            }
        }
        found
    }

    /// The node's parent, if attached.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_at(p))
    }

    // -- Property API --

    /// The node's local transform.
    #[must_use]
    pub fn transform(&self, id: NodeId) -> &Transform {
        self.validate(id);
        &self.transform[id.idx as usize]
    }

    /// Mutable access to the node's local transform.
    ///
    /// The transform's own version counters make the mutation visible to the
    /// next pass; the container's bounds id moves when the world matrix
    /// actually recomputes.
    pub fn transform_mut(&mut self, id: NodeId) -> &mut Transform {
        self.validate(id);
        &mut self.transform[id.idx as usize]
    }

    /// Local alpha in `[0, 1]`.
    #[must_use]
    pub fn alpha(&self, id: NodeId) -> f64 {
        self.validate(id);
        self.alpha[id.idx as usize]
    }

    /// Sets the local alpha.
    pub fn set_alpha(&mut self, id: NodeId, alpha: f64) {
        self.validate(id);
        self.alpha[id.idx as usize] = alpha;
    }

    /// Alpha composed through the ancestry, as of the last transform pass.
    #[must_use]
    pub fn world_alpha(&self, id: NodeId) -> f64 {
        self.validate(id);
        self.world_alpha[id.idx as usize]
    }

    /// Whether the node and its subtree take part in the passes.
    #[must_use]
    pub fn visible(&self, id: NodeId) -> bool {
        self.validate(id);
        self.visible[id.idx as usize]
    }

    /// Sets visibility.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.validate(id);
        self.visible[id.idx as usize] = visible;
    }

    /// Whether the node itself is drawn. An invisible-but-renderable parent
    /// still hides its subtree; a visible-but-non-renderable node is
    /// traversed but contributes no draw.
    #[must_use]
    pub fn renderable(&self, id: NodeId) -> bool {
        self.validate(id);
        self.renderable[id.idx as usize]
    }

    /// Sets renderability.
    pub fn set_renderable(&mut self, id: NodeId, renderable: bool) {
        self.validate(id);
        self.renderable[id.idx as usize] = renderable;
    }

    /// The node's name, if any.
    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.validate(id);
        self.name[id.idx as usize].as_deref()
    }

    /// Sets or clears the node's name.
    pub fn set_name(&mut self, id: NodeId, name: Option<String>) {
        self.validate(id);
        self.name[id.idx as usize] = name;
    }

    /// The node this node is clipped by, if any.
    #[must_use]
    pub fn mask(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let m = self.mask[id.idx as usize];
        (m != INVALID).then(|| self.id_at(m))
    }

    /// Whether the node currently serves as a mask for another node.
    #[must_use]
    pub fn is_mask(&self, id: NodeId) -> bool {
        self.validate(id);
        self.is_mask[id.idx as usize]
    }

    /// Assigns or clears the node's mask.
    ///
    /// Assigning flips the target's mask flag and suppresses its own
    /// rendering; clearing restores both. A node can serve as a mask for at
    /// most one clip site at a time.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale, if `id == target`, or if the target
    /// already serves as a mask elsewhere.
    pub fn set_mask(&mut self, id: NodeId, target: Option<NodeId>) {
        self.validate(id);
        let i = id.idx as usize;

        // Release the previous assignment first.
        if self.mask[i] != INVALID {
            let old = self.mask[i] as usize;
            self.is_mask[old] = false;
            self.renderable[old] = true;
            self.mask[i] = INVALID;
        }

        if let Some(target) = target {
            self.validate(target);
            assert!(id.idx != target.idx, "a node cannot mask itself");
            let t = target.idx as usize;
            assert!(
                !self.is_mask[t],
                "{target:?} already serves as a mask elsewhere"
            );
            self.mask[i] = target.idx;
            self.is_mask[t] = true;
            self.renderable[t] = false;
        }
        self.bump_bounds_id(id.idx);
        if self.parent[i] != INVALID {
            self.bump_bounds_id(self.parent[i]);
        }
    }

    /// The node's filter area, if any.
    #[must_use]
    pub fn filter_area(&self, id: NodeId) -> Option<Rect> {
        self.validate(id);
        self.filter_area[id.idx as usize]
    }

    /// Sets or clears the world-space filter area.
    ///
    /// The area clips this node's contribution to its parent's bounds, so
    /// both cached results are marked stale.
    pub fn set_filter_area(&mut self, id: NodeId, area: Option<Rect>) {
        self.validate(id);
        let i = id.idx as usize;
        self.filter_area[i] = area;
        self.bump_bounds_id(id.idx);
        if self.parent[i] != INVALID {
            self.bump_bounds_id(self.parent[i]);
        }
    }

    /// The node's content record, if any.
    #[must_use]
    pub fn content(&self, id: NodeId) -> Option<&Content> {
        self.validate(id);
        self.content[id.idx as usize].as_ref()
    }

    /// Mutable access to the node's content record.
    pub fn content_mut(&mut self, id: NodeId) -> Option<&mut Content> {
        self.validate(id);
        self.bump_bounds_id(id.idx);
        self.content[id.idx as usize].as_mut()
    }

    /// Attaches or removes content.
    pub fn set_content(&mut self, id: NodeId, content: Option<Content>) {
        self.validate(id);
        self.content[id.idx as usize] = content;
        self.bump_bounds_id(id.idx);
    }

    /// Drops the node's cached content geometry, forcing recomputation on
    /// the next bounds pass. Called when a backing texture finishes loading.
    pub fn invalidate_content(&mut self, id: NodeId) {
        self.validate(id);
        if let Some(content) = self.content[id.idx as usize].as_mut() {
            content.invalidate();
        }
        self.bump_bounds_id(id.idx);
    }

    /// The node's lifecycle emitter.
    pub fn emitter_mut(&mut self, id: NodeId) -> &mut Emitter {
        self.validate(id);
        &mut self.emitter[id.idx as usize]
    }

    /// Version counter of the node's bounds; moves on every child-list or
    /// content mutation.
    #[must_use]
    pub fn bounds_id(&self, id: NodeId) -> u32 {
        self.validate(id);
        self.bounds_id[id.idx as usize]
    }

    // -- Internal helpers --

    /// Links `c` into `p`'s child list at `index` and dispatches the
    /// attachment event. `c` must already be detached.
    fn attach(&mut self, p: u32, c: u32, index: usize) {
        self.parent[c as usize] = p;
        self.children[p as usize].insert(index, c);
        self.transform[c as usize].invalidate_parent_id();
        self.on_children_change(p);
        self.emitter[c as usize].emit(EventKind::Added);
    }

    /// Detaches `idx` from its parent and dispatches the removal event.
    fn detach(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        self.unlink_from_parent(idx);
        self.on_children_change(p);
        self.emitter[idx as usize].emit(EventKind::Removed);
    }

    /// Removes `idx` from its parent's child list without side effects.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize] as usize;
        self.children[p].retain(|&c| c != idx);
        self.parent[idx as usize] = INVALID;
        self.transform[idx as usize].invalidate_parent_id();
    }

    /// Marks `idx`'s cached bounds stale after a child-list change.
    fn on_children_change(&mut self, idx: u32) {
        self.bump_bounds_id(idx);
    }

    fn bump_bounds_id(&mut self, idx: u32) {
        let b = &mut self.bounds_id[idx as usize];
        *b = b.wrapping_add(1);
    }
}
