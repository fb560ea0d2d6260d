// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned bounding box accumulator.
//!
//! A [`Bounds`] starts out *empty* — the extrema hold the `+∞/−∞` sentinel —
//! and grows monotonically as geometry is folded in. Every fold variant
//! follows the same rule: compute the candidate extrema, then merge them only
//! when the candidate region is non-degenerate. In particular a mask or
//! filter area that does not overlap the folded geometry contributes
//! *nothing* (a fully clipped child adds no area to its parent).
//!
//! [`add_quad`](Bounds::add_quad) is the hot path, invoked once per visible
//! leaf per frame; it branches per coordinate and never allocates.

use kurbo::Rect;

use crate::matrix::Matrix;

/// A mutable min/max accumulator over 2D points.
///
/// `update_id` increments on every [`clear`](Bounds::clear), letting
/// dependents detect a fresh recomputation without comparing extrema.
#[derive(Clone, Copy, Debug)]
pub struct Bounds {
    /// Minimum x extremum (`+∞` when empty).
    pub min_x: f64,
    /// Minimum y extremum (`+∞` when empty).
    pub min_y: f64,
    /// Maximum x extremum (`−∞` when empty).
    pub max_x: f64,
    /// Maximum y extremum (`−∞` when empty).
    pub max_y: f64,
    /// Bumped on every clear.
    pub update_id: u32,
}

impl Bounds {
    /// Creates an empty bounds.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
            update_id: 0,
        }
    }

    /// Whether no geometry has been folded in (or everything was degenerate).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Resets to the empty sentinel and bumps `update_id`.
    pub fn clear(&mut self) {
        self.update_id = self.update_id.wrapping_add(1);
        self.min_x = f64::INFINITY;
        self.min_y = f64::INFINITY;
        self.max_x = f64::NEG_INFINITY;
        self.max_y = f64::NEG_INFINITY;
    }

    /// Folds a single point into the extrema.
    #[inline]
    pub fn add_point(&mut self, x: f64, y: f64) {
        if x < self.min_x {
            self.min_x = x;
        }
        if x > self.max_x {
            self.max_x = x;
        }
        if y < self.min_y {
            self.min_y = y;
        }
        if y > self.max_y {
            self.max_y = y;
        }
    }

    /// Folds four `(x, y)` pairs into the extrema.
    ///
    /// This is the per-leaf hot path; the comparisons are branched per
    /// coordinate rather than routed through `min`/`max` calls.
    pub fn add_quad(&mut self, vertices: &[f64; 8]) {
        let mut min_x = self.min_x;
        let mut min_y = self.min_y;
        let mut max_x = self.max_x;
        let mut max_y = self.max_y;

        let mut i = 0;
        while i < 8 {
            let x = vertices[i];
            let y = vertices[i + 1];
            if x < min_x {
                min_x = x;
            }
            if x > max_x {
                max_x = x;
            }
            if y < min_y {
                min_y = y;
            }
            if y > max_y {
                max_y = y;
            }
            i += 2;
        }

        self.min_x = min_x;
        self.min_y = min_y;
        self.max_x = max_x;
        self.max_y = max_y;
    }

    /// Transforms the four corners of a local rectangle through `world` and
    /// folds them in.
    ///
    /// Used when a leaf has no precomputed vertex cache.
    pub fn add_frame(&mut self, world: &Matrix, x0: f64, y0: f64, x1: f64, y1: f64) {
        let a = world.a;
        let b = world.b;
        let c = world.c;
        let d = world.d;
        let tx = world.tx;
        let ty = world.ty;

        self.add_point(a * x0 + c * y0 + tx, b * x0 + d * y0 + ty);
        self.add_point(a * x1 + c * y0 + tx, b * x1 + d * y0 + ty);
        self.add_point(a * x0 + c * y1 + tx, b * x0 + d * y1 + ty);
        self.add_point(a * x1 + c * y1 + tx, b * x1 + d * y1 + ty);
    }

    /// Strides through a flat `(x, y)` buffer, transforming each pair through
    /// `world` and folding it in.
    ///
    /// `begin`/`end` are element offsets into `vertices` and must be even.
    pub fn add_vertices(&mut self, world: &Matrix, vertices: &[f64], begin: usize, end: usize) {
        let mut i = begin;
        while i < end {
            let x = vertices[i];
            let y = vertices[i + 1];
            self.add_point(
                world.a * x + world.c * y + world.tx,
                world.b * x + world.d * y + world.ty,
            );
            i += 2;
        }
    }

    /// Unions another bounds into this one.
    ///
    /// Folding an empty bounds is a no-op, so the union identity holds.
    pub fn add_bounds(&mut self, other: &Self) {
        if other.min_x < self.min_x {
            self.min_x = other.min_x;
        }
        if other.min_y < self.min_y {
            self.min_y = other.min_y;
        }
        if other.max_x > self.max_x {
            self.max_x = other.max_x;
        }
        if other.max_y > self.max_y {
            self.max_y = other.max_y;
        }
    }

    /// Unions the intersection of `other` and `mask` into this bounds.
    ///
    /// A degenerate intersection (the mask does not overlap `other`)
    /// contributes nothing.
    pub fn add_bounds_mask(&mut self, other: &Self, mask: &Self) {
        let min_x = if other.min_x > mask.min_x {
            other.min_x
        } else {
            mask.min_x
        };
        let min_y = if other.min_y > mask.min_y {
            other.min_y
        } else {
            mask.min_y
        };
        let max_x = if other.max_x < mask.max_x {
            other.max_x
        } else {
            mask.max_x
        };
        let max_y = if other.max_y < mask.max_y {
            other.max_y
        } else {
            mask.max_y
        };

        if min_x <= max_x && min_y <= max_y {
            self.add_point(min_x, min_y);
            self.add_point(max_x, max_y);
        }
    }

    /// Unions the intersection of `other` and a plain rectangle (a filter
    /// area) into this bounds, with the same degenerate-drop rule as
    /// [`add_bounds_mask`](Self::add_bounds_mask).
    pub fn add_bounds_area(&mut self, other: &Self, area: &Rect) {
        let min_x = if other.min_x > area.x0 {
            other.min_x
        } else {
            area.x0
        };
        let min_y = if other.min_y > area.y0 {
            other.min_y
        } else {
            area.y0
        };
        let max_x = if other.max_x < area.x1 {
            other.max_x
        } else {
            area.x1
        };
        let max_y = if other.max_y < area.y1 {
            other.max_y
        } else {
            area.y1
        };

        if min_x <= max_x && min_y <= max_y {
            self.add_point(min_x, min_y);
            self.add_point(max_x, max_y);
        }
    }

    /// Materializes the extrema as a rectangle.
    ///
    /// Returns the zero-rectangle sentinel when empty; callers that may see
    /// empty bounds should check [`is_empty`](Self::is_empty) first.
    #[must_use]
    pub fn get_rectangle(&self) -> Rect {
        if self.is_empty() {
            Rect::ZERO
        } else {
            Rect::new(self.min_x, self.min_y, self.max_x, self.max_y)
        }
    }
}

impl Default for Bounds {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
