// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The bounds pass: world-space bounds for every node in a subtree.

use crate::bounds::Bounds;
use crate::trace::{BoundsPassEvent, Tracer};

use super::id::{INVALID, NodeId};
use super::store::SceneStore;

impl SceneStore {
    /// Recomputes world-space bounds for `root`'s subtree.
    ///
    /// Runs after [`update_transforms`](Self::update_transforms); the fold
    /// reads cached world matrices. For each node the pass clears its
    /// bounds, folds in the node's own content quad, then unions each
    /// visible and renderable child:
    ///
    /// - a child with a mask contributes only the intersection of its
    ///   bounds with the mask's bounds (the mask subtree is computed on
    ///   demand, since masks are excluded from the regular fold);
    /// - a child with a filter area contributes only the intersection
    ///   with that area;
    /// - otherwise the child's full bounds are unioned.
    ///
    /// A degenerate intersection contributes nothing, so a fully
    /// off-screen mask leaves the container's bounds untouched.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn calculate_bounds(&mut self, root: NodeId, tracer: &mut Tracer<'_>) {
        self.validate(root);
        let mut visited = 0;
        let mut empty = 0;
        self.calc_node(root.idx, &mut visited, &mut empty);
        tracer.bounds_pass(&BoundsPassEvent { visited, empty });
    }

    /// The node's world-space bounds.
    ///
    /// Returns the cached value when nothing has changed since the last
    /// computation; otherwise recomputes the subtree first. An empty result
    /// is a sentinel, not an error; check [`Bounds::is_empty`].
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn bounds(&mut self, id: NodeId) -> Bounds {
        self.validate(id);
        let i = id.idx as usize;
        if self.last_bounds_id[i] != self.bounds_id[i] {
            let mut visited = 0;
            let mut empty = 0;
            self.calc_node(id.idx, &mut visited, &mut empty);
        }
        self.bounds[i]
    }

    fn calc_node(&mut self, idx: u32, visited: &mut u32, empty: &mut u32) {
        let i = idx as usize;
        *visited += 1;

        self.bounds[i].clear();

        // Own geometry.
        if self.renderable[i] || self.is_mask[i] {
            let world = *self.transform[i].world();
            let world_id = self.transform[i].world_id();
            if let Some(content) = self.content[i].as_mut() {
                let quad = *content.vertices(&world, world_id);
                self.bounds[i].add_quad(&quad);
            }
        }

        // Children, in paint order.
        for pos in 0..self.children[i].len() {
            let c = self.children[i][pos];
            let cu = c as usize;
            if !self.visible[cu] || !self.renderable[cu] {
                continue;
            }
            self.calc_node(c, visited, empty);
            let child_bounds = self.bounds[cu];

            let mask = self.mask[cu];
            if mask != INVALID {
                self.calc_node(mask, visited, empty);
                let mask_bounds = self.bounds[mask as usize];
                self.bounds[i].add_bounds_mask(&child_bounds, &mask_bounds);
            } else if let Some(area) = self.filter_area[cu] {
                self.bounds[i].add_bounds_area(&child_bounds, &area);
            } else {
                self.bounds[i].add_bounds(&child_bounds);
            }
        }

        if self.bounds[i].is_empty() {
            *empty += 1;
        }
        self.last_bounds_id[i] = self.bounds_id[i];
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;

    use crate::node::Content;
    use crate::node::id::TextureRef;

    use super::*;

    fn passes(store: &mut SceneStore, root: NodeId) {
        let mut tracer = Tracer::none();
        store.update_transforms(root, &mut tracer);
        store.calculate_bounds(root, &mut tracer);
    }

    fn leaf(store: &mut SceneStore, parent: NodeId, x: f64, y: f64, w: f64, h: f64) -> NodeId {
        let id = store.create_node();
        store.set_content(id, Some(Content::image(TextureRef(0), w, h)));
        store.transform_mut(id).set_position(x, y);
        store.add_child(parent, id);
        id
    }

    #[test]
    fn leaf_bounds_are_its_world_quad() {
        let mut store = SceneStore::new();
        let root = store.create_node();
        let sprite = leaf(&mut store, root, 10.0, 20.0, 100.0, 50.0);
        passes(&mut store, root);

        let b = store.bounds(sprite);
        assert_eq!(b.get_rectangle(), Rect::new(10.0, 20.0, 110.0, 70.0));
    }

    #[test]
    fn container_unions_children() {
        let mut store = SceneStore::new();
        let root = store.create_node();
        let _a = leaf(&mut store, root, 0.0, 0.0, 10.0, 10.0);
        let _b = leaf(&mut store, root, 50.0, 50.0, 10.0, 10.0);
        passes(&mut store, root);

        let b = store.bounds(root);
        assert_eq!(b.get_rectangle(), Rect::new(0.0, 0.0, 60.0, 60.0));
    }

    #[test]
    fn contentless_tree_has_empty_bounds() {
        let mut store = SceneStore::new();
        let root = store.create_node();
        let child = store.create_node();
        store.add_child(root, child);
        passes(&mut store, root);

        assert!(store.bounds(root).is_empty());
        assert_eq!(store.bounds(root).get_rectangle(), Rect::ZERO);
    }

    #[test]
    fn invisible_and_non_renderable_children_are_excluded() {
        let mut store = SceneStore::new();
        let root = store.create_node();
        let shown = leaf(&mut store, root, 0.0, 0.0, 10.0, 10.0);
        let hidden = leaf(&mut store, root, 100.0, 0.0, 10.0, 10.0);
        let ghost = leaf(&mut store, root, 0.0, 100.0, 10.0, 10.0);
        store.set_visible(hidden, false);
        store.set_renderable(ghost, false);
        passes(&mut store, root);

        assert_eq!(
            store.bounds(root).get_rectangle(),
            store.bounds(shown).get_rectangle()
        );
    }

    #[test]
    fn masked_child_contributes_only_the_intersection() {
        let mut store = SceneStore::new();
        let root = store.create_node();
        let child = leaf(&mut store, root, 0.0, 0.0, 100.0, 100.0);
        let mask = leaf(&mut store, root, 50.0, 50.0, 150.0, 150.0);
        store.set_mask(child, Some(mask));
        passes(&mut store, root);

        let b = store.bounds(root);
        assert_eq!(b.get_rectangle(), Rect::new(50.0, 50.0, 100.0, 100.0));
    }

    #[test]
    fn offscreen_mask_contributes_nothing() {
        let mut store = SceneStore::new();
        let root = store.create_node();
        let child = leaf(&mut store, root, 0.0, 0.0, 100.0, 100.0);
        let mask = leaf(&mut store, root, 500.0, 500.0, 10.0, 10.0);
        store.set_mask(child, Some(mask));
        passes(&mut store, root);

        assert!(store.bounds(root).is_empty());
    }

    #[test]
    fn filter_area_clips_the_contribution() {
        let mut store = SceneStore::new();
        let root = store.create_node();
        let child = leaf(&mut store, root, 0.0, 0.0, 100.0, 100.0);
        store.set_filter_area(child, Some(Rect::new(25.0, 25.0, 60.0, 60.0)));
        passes(&mut store, root);

        let b = store.bounds(root);
        assert_eq!(b.get_rectangle(), Rect::new(25.0, 25.0, 60.0, 60.0));
    }

    #[test]
    fn filter_area_change_refreshes_cached_bounds() {
        let mut store = SceneStore::new();
        let root = store.create_node();
        let child = leaf(&mut store, root, 0.0, 0.0, 100.0, 100.0);
        passes(&mut store, root);
        assert_eq!(
            store.bounds(root).get_rectangle(),
            Rect::new(0.0, 0.0, 100.0, 100.0)
        );

        // No pass in between; the cached read must refresh on its own.
        store.set_filter_area(child, Some(Rect::new(0.0, 0.0, 25.0, 25.0)));
        assert_eq!(
            store.bounds(root).get_rectangle(),
            Rect::new(0.0, 0.0, 25.0, 25.0)
        );
    }

    #[test]
    fn masked_and_plain_children_compose_container_bounds() {
        let mut store = SceneStore::new();
        let root = store.create_node();
        let plain = leaf(&mut store, root, 10.0, 0.0, 20.0, 20.0);
        let clipped = leaf(&mut store, root, 0.0, 10.0, 20.0, 20.0);
        let shape = leaf(&mut store, root, 0.0, 0.0, 15.0, 15.0);
        store.set_mask(clipped, Some(shape));
        passes(&mut store, root);

        // plain covers [10,0,30,20]; clipped contributes only its
        // intersection with the shape, [0,10,15,15].
        assert_eq!(
            store.bounds(plain).get_rectangle(),
            Rect::new(10.0, 0.0, 30.0, 20.0)
        );
        assert_eq!(
            store.bounds(root).get_rectangle(),
            Rect::new(0.0, 0.0, 30.0, 20.0)
        );
    }

    #[test]
    fn scaled_parent_scales_child_bounds() {
        let mut store = SceneStore::new();
        let root = store.create_node();
        store.transform_mut(root).set_scale(2.0, 2.0);
        let _child = leaf(&mut store, root, 5.0, 5.0, 10.0, 10.0);
        passes(&mut store, root);

        let b = store.bounds(root);
        assert_eq!(b.get_rectangle(), Rect::new(10.0, 10.0, 30.0, 30.0));
    }

    #[test]
    fn unchanged_tree_reuses_cached_bounds() {
        let mut store = SceneStore::new();
        let root = store.create_node();
        let sprite = leaf(&mut store, root, 0.0, 0.0, 10.0, 10.0);
        passes(&mut store, root);

        let first = store.bounds(sprite);
        let second = store.bounds(sprite);
        // No recomputation between the two queries, so the generation on
        // the cached value is unchanged.
        assert_eq!(first.update_id, second.update_id);

        store.transform_mut(sprite).set_position(5.0, 5.0);
        let mut tracer = Tracer::none();
        store.update_transforms(root, &mut tracer);
        let third = store.bounds(sprite);
        assert_ne!(second.update_id, third.update_id);
        assert_eq!(third.get_rectangle(), Rect::new(5.0, 5.0, 15.0, 15.0));
    }

    #[cfg(feature = "trace")]
    #[test]
    fn pass_reports_empty_subtrees() {
        use crate::trace::TraceSink;

        #[derive(Default)]
        struct Counts {
            visited: u32,
            empty: u32,
        }
        impl TraceSink for Counts {
            fn on_bounds_pass(&mut self, e: &BoundsPassEvent) {
                self.visited = e.visited;
                self.empty = e.empty;
            }
        }

        let mut store = SceneStore::new();
        let root = store.create_node();
        let _sprite = leaf(&mut store, root, 0.0, 0.0, 10.0, 10.0);
        let bare = store.create_node();
        store.add_child(root, bare);

        let mut tracer = Tracer::none();
        store.update_transforms(root, &mut tracer);

        let mut sink = Counts::default();
        let mut tracer = Tracer::new(&mut sink);
        store.calculate_bounds(root, &mut tracer);
        drop(tracer);
        assert_eq!(sink.visited, 3);
        assert_eq!(sink.empty, 1);
    }
}
