// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The transform pass: world matrices and composed alpha.

use kurbo::Point;

use crate::matrix::Matrix;
use crate::trace::{TransformPassEvent, Tracer};

use super::id::{INVALID, NodeId};
use super::store::SceneStore;

impl SceneStore {
    /// Recomputes world matrices and world alpha for `root`'s subtree.
    ///
    /// The pass walks depth-first in paint order. Each node composes its
    /// local matrix against the parent's world matrix, gated by the version
    /// counters in [`Transform`](crate::transform::Transform), so unchanged
    /// subtrees cost a pair of integer comparisons per node. Invisible
    /// children are skipped entirely; their cached state goes stale until
    /// they are made visible again.
    ///
    /// A detached root composes against the identity. An attached root
    /// composes against its parent's current world matrix, whatever pass
    /// last produced it.
    ///
    /// Returns the pass counts, which also go to the tracer.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn update_transforms(
        &mut self,
        root: NodeId,
        tracer: &mut Tracer<'_>,
    ) -> TransformPassEvent {
        self.validate(root);

        let (parent_world, parent_world_id, parent_alpha) = match self.parent[root.idx as usize] {
            INVALID => (Matrix::IDENTITY, 0, 1.0),
            p => (
                *self.transform[p as usize].world(),
                self.transform[p as usize].world_id(),
                self.world_alpha[p as usize],
            ),
        };

        let mut visited = 0;
        let mut recomputed = 0;
        self.update_node(
            root.idx,
            &parent_world,
            parent_world_id,
            parent_alpha,
            &mut visited,
            &mut recomputed,
        );

        let stats = TransformPassEvent {
            visited,
            recomputed,
        };
        tracer.transform_pass(&stats);
        stats
    }

    fn update_node(
        &mut self,
        idx: u32,
        parent_world: &Matrix,
        parent_world_id: u32,
        parent_alpha: f64,
        visited: &mut u32,
        recomputed: &mut u32,
    ) {
        let i = idx as usize;
        *visited += 1;

        let changed = self.transform[i].compose(parent_world, parent_world_id);
        if changed {
            *recomputed += 1;
        }
        self.world_alpha[i] = parent_alpha * self.alpha[i];

        if self.children[i].is_empty() {
            // A leaf's bounds follow its world matrix.
            if changed {
                let b = &mut self.bounds_id[i];
                *b = b.wrapping_add(1);
            }
            return;
        }

        // A container's union can change whenever any descendant moves, so
        // its cached bounds are treated as stale every pass.
        let b = &mut self.bounds_id[i];
        *b = b.wrapping_add(1);

        let world = *self.transform[i].world();
        let world_id = self.transform[i].world_id();
        let alpha = self.world_alpha[i];

        for pos in 0..self.children[i].len() {
            let c = self.children[i][pos];
            if self.visible[c as usize] {
                self.update_node(c, &world, world_id, alpha, visited, recomputed);
            }
        }
    }

    /// Maps a point from `id`'s local space to world space.
    ///
    /// Reads the cached world matrix; only valid after
    /// [`update_transforms`](Self::update_transforms) has covered the node.
    #[must_use]
    pub fn to_global(&self, id: NodeId, point: Point) -> Point {
        self.validate(id);
        self.transform[id.idx as usize].world().apply(point)
    }

    /// Maps a world-space point into `id`'s local space.
    ///
    /// Reads the cached world matrix; a singular world matrix produces
    /// non-finite coordinates the caller must check.
    #[must_use]
    pub fn to_local(&self, id: NodeId, point: Point) -> Point {
        self.validate(id);
        self.transform[id.idx as usize].world().apply_inverse(point)
    }
}
