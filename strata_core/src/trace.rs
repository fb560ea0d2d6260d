// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the scene passes.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! transform, bounds, and render passes call as they run. All method bodies
//! default to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after a transform pass over the scene tree.
#[derive(Clone, Copy, Debug)]
pub struct TransformPassEvent {
    /// Nodes visited by the pass.
    pub visited: u32,
    /// Nodes whose world matrix was actually recomputed.
    pub recomputed: u32,
}

/// Emitted after a bounds pass over the scene tree.
#[derive(Clone, Copy, Debug)]
pub struct BoundsPassEvent {
    /// Nodes visited by the pass.
    pub visited: u32,
    /// Subtrees that contributed no geometry.
    pub empty: u32,
}

/// Emitted after the render plan for a frame is built.
#[derive(Clone, Copy, Debug)]
pub struct PlanEvent {
    /// Draw items in the plan.
    pub items: u32,
}

/// Emitted after texture residency is ensured for a frame.
#[derive(Clone, Copy, Debug)]
pub struct ResidencyEvent {
    /// Distinct textures the plan references.
    pub textures: u32,
    /// Textures that required a GPU upload this frame.
    pub uploads: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the scene passes.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after the transform pass.
    fn on_transform_pass(&mut self, e: &TransformPassEvent) {
        _ = e;
    }

    /// Called after the bounds pass.
    fn on_bounds_pass(&mut self, e: &BoundsPassEvent) {
        _ = e;
    }

    /// Called after the render plan is built.
    fn on_plan(&mut self, e: &PlanEvent) {
        _ = e;
    }

    /// Called after texture residency is ensured.
    fn on_residency(&mut self, e: &ResidencyEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`TransformPassEvent`].
    #[inline]
    pub fn transform_pass(&mut self, e: &TransformPassEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_transform_pass(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`BoundsPassEvent`].
    #[inline]
    pub fn bounds_pass(&mut self, e: &BoundsPassEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_bounds_pass(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PlanEvent`].
    #[inline]
    pub fn plan(&mut self, e: &PlanEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_plan(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ResidencyEvent`].
    #[inline]
    pub fn residency(&mut self, e: &ResidencyEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_residency(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
