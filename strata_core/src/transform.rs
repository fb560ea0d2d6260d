// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node local-to-world transform state.
//!
//! A [`Transform`] owns a decomposed local description (position, scale,
//! skew, rotation, pivot), the derived local [`Matrix`], and the cached world
//! matrix composed against a parent. Staleness is tracked with version
//! counters rather than eager invalidation walks:
//!
//! - `local_id` / `current_local_id` — a setter bumps `local_id`; the pair
//!   diverging means the local matrix must be rebuilt.
//! - `world_id` — bumped whenever the world matrix is actually recomputed.
//!   Dependents (the bounds pass, vertex caches) snapshot it to detect
//!   staleness cheaply.
//! - `parent_world_id` — the parent's `world_id` captured at the last
//!   composition; a mismatch means the ancestry moved underneath us.
//!
//! [`update_transform`](Transform::update_transform) therefore costs a few
//! comparisons on the steady-state path and recomputes only the subtrees
//! that actually changed.

use kurbo::{Point, Vec2};

use crate::matrix::Matrix;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Sentinel forcing the next composition regardless of the parent's id.
const UNSET: u32 = u32::MAX;

/// Local transform state plus the cached world matrix.
#[derive(Clone, Debug)]
pub struct Transform {
    position: Point,
    scale: Vec2,
    pivot: Point,
    skew: Vec2,
    rotation: f64,

    // Trig cache for rotation ± skew, refreshed by the rotation/skew setters.
    cx: f64,
    sx: f64,
    cy: f64,
    sy: f64,

    local: Matrix,
    world: Matrix,

    local_id: u32,
    current_local_id: u32,
    world_id: u32,
    parent_world_id: u32,
}

impl Transform {
    /// Creates an identity transform.
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Point::ORIGIN,
            scale: Vec2::new(1.0, 1.0),
            pivot: Point::ORIGIN,
            skew: Vec2::ZERO,
            rotation: 0.0,
            cx: 1.0,
            sx: 0.0,
            cy: 0.0,
            sy: 1.0,
            local: Matrix::IDENTITY,
            world: Matrix::IDENTITY,
            local_id: 0,
            current_local_id: 0,
            world_id: 0,
            parent_world_id: UNSET,
        }
    }

    // -- Local property getters --

    /// Local position.
    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    /// Per-axis local scale.
    #[must_use]
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Pivot point for rotation and scaling, in local coordinates.
    #[must_use]
    pub fn pivot(&self) -> Point {
        self.pivot
    }

    /// Per-axis skew in radians.
    #[must_use]
    pub fn skew(&self) -> Vec2 {
        self.skew
    }

    /// Rotation in radians.
    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    // -- Local property setters (each bumps the local version) --

    /// Sets the local position.
    pub fn set_position(&mut self, x: f64, y: f64) {
        self.position = Point::new(x, y);
        self.local_id = self.local_id.wrapping_add(1);
    }

    /// Sets the per-axis scale.
    pub fn set_scale(&mut self, x: f64, y: f64) {
        self.scale = Vec2::new(x, y);
        self.local_id = self.local_id.wrapping_add(1);
    }

    /// Sets the pivot point.
    pub fn set_pivot(&mut self, x: f64, y: f64) {
        self.pivot = Point::new(x, y);
        self.local_id = self.local_id.wrapping_add(1);
    }

    /// Sets the skew angles and refreshes the trig cache.
    pub fn set_skew(&mut self, x: f64, y: f64) {
        self.skew = Vec2::new(x, y);
        self.update_trig();
        self.local_id = self.local_id.wrapping_add(1);
    }

    /// Sets the rotation and refreshes the trig cache.
    pub fn set_rotation(&mut self, radians: f64) {
        self.rotation = radians;
        self.update_trig();
        self.local_id = self.local_id.wrapping_add(1);
    }

    /// Adopts position, scale, skew, and rotation from a matrix.
    pub fn set_from_matrix(&mut self, matrix: &Matrix) {
        let d = matrix.decompose();
        self.position = d.position;
        self.scale = d.scale;
        self.skew = d.skew;
        self.rotation = d.rotation;
        self.update_trig();
        self.local_id = self.local_id.wrapping_add(1);
    }

    // -- Derived matrices and versions --

    /// The local matrix as of the last update.
    #[must_use]
    pub fn local(&self) -> &Matrix {
        &self.local
    }

    /// The world matrix as of the last [`update_transform`](Self::update_transform).
    #[must_use]
    pub fn world(&self) -> &Matrix {
        &self.world
    }

    /// Version counter of the world matrix; bumped on every recomputation.
    #[must_use]
    pub fn world_id(&self) -> u32 {
        self.world_id
    }

    /// Forces the next [`update_transform`](Self::update_transform) to
    /// recompose against the parent, e.g. after reparenting.
    pub fn invalidate_parent_id(&mut self) {
        self.parent_world_id = UNSET;
    }

    /// Whether the local matrix is stale.
    #[must_use]
    pub fn local_dirty(&self) -> bool {
        self.current_local_id != self.local_id || self.local.require_update
    }

    /// Rebuilds the local matrix from the decomposed description if stale.
    pub fn update_local_transform(&mut self) {
        if !self.local_dirty() {
            return;
        }
        self.local.a = self.cx * self.scale.x;
        self.local.b = self.sx * self.scale.x;
        self.local.c = self.cy * self.scale.y;
        self.local.d = self.sy * self.scale.y;
        self.local.tx =
            self.position.x - (self.pivot.x * self.local.a + self.pivot.y * self.local.c);
        self.local.ty =
            self.position.y - (self.pivot.x * self.local.b + self.pivot.y * self.local.d);
        self.local.update();
        self.current_local_id = self.local_id;
        // The world matrix must follow, whatever the parent did.
        self.parent_world_id = UNSET;
    }

    /// Composes this transform against `parent`'s cached world matrix.
    ///
    /// Returns `true` when the world matrix was actually recomputed. The
    /// steady-state path (clean local matrix, unmoved parent) is a pair of
    /// integer comparisons.
    pub fn update_transform(&mut self, parent: &Self) -> bool {
        self.compose(&parent.world, parent.world_id)
    }

    /// Composition against an explicit parent world matrix and version, for
    /// store passes that cannot hold two node borrows at once.
    pub(crate) fn compose(&mut self, parent_world: &Matrix, parent_world_id: u32) -> bool {
        self.update_local_transform();

        if self.parent_world_id == parent_world_id {
            return false;
        }

        let lt = &self.local;
        let pt = parent_world;
        self.world.a = lt.a * pt.a + lt.b * pt.c;
        self.world.b = lt.a * pt.b + lt.b * pt.d;
        self.world.c = lt.c * pt.a + lt.d * pt.c;
        self.world.d = lt.c * pt.b + lt.d * pt.d;
        self.world.tx = lt.tx * pt.a + lt.ty * pt.c + pt.tx;
        self.world.ty = lt.tx * pt.b + lt.ty * pt.d + pt.ty;
        self.world.update();

        self.world_id = self.world_id.wrapping_add(1);
        self.parent_world_id = parent_world_id;
        true
    }

    fn update_trig(&mut self) {
        self.cx = (self.rotation + self.skew.y).cos();
        self.sx = (self.rotation + self.skew.y).sin();
        self.cy = -((self.rotation - self.skew.x).sin());
        self.sy = (self.rotation - self.skew.x).cos();
    }
}

impl Default for Transform {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
