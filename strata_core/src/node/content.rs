// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Leaf content records and their cached world-space geometry.

use alloc::vec::Vec;

use kurbo::Vec2;

use crate::matrix::Matrix;

use super::id::TextureRef;

/// What a content-bearing node displays.
#[derive(Clone, Debug)]
pub enum ContentKind {
    /// A single texture region stretched over the quad.
    Image {
        /// Texture region to sample.
        texture: TextureRef,
    },
    /// A sequence of texture regions played one at a time.
    Frames {
        /// Texture regions in playback order. Never empty.
        frames: Vec<TextureRef>,
        /// Index of the frame currently shown.
        current: usize,
    },
    /// A texture split into a 3x3 grid whose corners keep their size.
    NineSlice {
        /// Texture region to slice.
        texture: TextureRef,
        /// Margins as `[left, top, right, bottom]` in texture pixels.
        margins: [f64; 4],
    },
}

/// Renderable content attached to a leaf node.
///
/// The quad geometry in world space is cached against the owning node's world
/// matrix version and this record's own `version`, so repeated reads during a
/// frame cost nothing once computed.
#[derive(Clone, Debug)]
pub struct Content {
    kind: ContentKind,
    width: f64,
    height: f64,
    anchor: Vec2,
    version: u32,

    // World-space quad cache: [x0,y0, x1,y1, x2,y2, x3,y3].
    vertex_data: [f64; 8],
    cached_world_id: u32,
    cached_version: u32,
}

impl Content {
    /// Creates image content of the given size.
    #[must_use]
    pub fn image(texture: TextureRef, width: f64, height: f64) -> Self {
        Self::with_kind(ContentKind::Image { texture }, width, height)
    }

    /// Creates frame-sequence content of the given size.
    ///
    /// # Panics
    ///
    /// Panics if `frames` is empty.
    #[must_use]
    pub fn frames(frames: Vec<TextureRef>, width: f64, height: f64) -> Self {
        assert!(!frames.is_empty(), "frame sequence must not be empty");
        Self::with_kind(ContentKind::Frames { frames, current: 0 }, width, height)
    }

    /// Creates nine-slice content of the given size.
    #[must_use]
    pub fn nine_slice(texture: TextureRef, margins: [f64; 4], width: f64, height: f64) -> Self {
        Self::with_kind(ContentKind::NineSlice { texture, margins }, width, height)
    }

    fn with_kind(kind: ContentKind, width: f64, height: f64) -> Self {
        Self {
            kind,
            width,
            height,
            anchor: Vec2::ZERO,
            version: 0,
            vertex_data: [0.0; 8],
            cached_world_id: u32::MAX,
            cached_version: u32::MAX,
        }
    }

    /// The content kind.
    #[must_use]
    pub fn kind(&self) -> &ContentKind {
        &self.kind
    }

    /// The texture the content currently samples from.
    #[must_use]
    pub fn texture(&self) -> TextureRef {
        match &self.kind {
            ContentKind::Image { texture } | ContentKind::NineSlice { texture, .. } => *texture,
            ContentKind::Frames { frames, current } => frames[*current],
        }
    }

    /// Untransformed size.
    #[must_use]
    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Normalized anchor: `(0, 0)` is the top-left corner, `(1, 1)` the
    /// bottom-right.
    #[must_use]
    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    /// Version counter, bumped on every geometry-affecting mutation.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Sets the untransformed size.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.bump();
    }

    /// Sets the normalized anchor.
    pub fn set_anchor(&mut self, x: f64, y: f64) {
        self.anchor = Vec2::new(x, y);
        self.bump();
    }

    /// Switches the texture of [`ContentKind::Image`] or
    /// [`ContentKind::NineSlice`] content.
    ///
    /// # Panics
    ///
    /// Panics on frame-sequence content; use [`set_frame`](Self::set_frame).
    pub fn set_texture(&mut self, texture: TextureRef) {
        match &mut self.kind {
            ContentKind::Image { texture: t } | ContentKind::NineSlice { texture: t, .. } => {
                *t = texture;
            }
            ContentKind::Frames { .. } => {
                panic!("cannot set a single texture on frame-sequence content")
            }
        }
        self.bump();
    }

    /// Shows frame `index` of a frame sequence.
    ///
    /// # Panics
    ///
    /// Panics if the content is not a frame sequence or `index` is past the
    /// last frame.
    pub fn set_frame(&mut self, index: usize) {
        match &mut self.kind {
            ContentKind::Frames { frames, current } => {
                assert!(
                    index < frames.len(),
                    "frame index {index} out of range (have {})",
                    frames.len()
                );
                *current = index;
            }
            _ => panic!("content is not a frame sequence"),
        }
        self.bump();
    }

    /// Advances a frame sequence by one frame, wrapping at the end.
    ///
    /// # Panics
    ///
    /// Panics if the content is not a frame sequence.
    pub fn advance_frame(&mut self) {
        match &mut self.kind {
            ContentKind::Frames { frames, current } => {
                *current = (*current + 1) % frames.len();
            }
            _ => panic!("content is not a frame sequence"),
        }
        self.bump();
    }

    /// Forces the next [`vertices`](Self::vertices) call to recompute.
    pub fn invalidate(&mut self) {
        self.cached_world_id = u32::MAX;
        self.cached_version = u32::MAX;
    }

    /// World-space corner positions of the content quad, cached against
    /// `world` (identified by `world_id`) and this record's version.
    ///
    /// Corner order is top-left, top-right, bottom-right, bottom-left.
    pub fn vertices(&mut self, world: &Matrix, world_id: u32) -> &[f64; 8] {
        if self.cached_world_id != world_id || self.cached_version != self.version {
            let x0 = -self.anchor.x * self.width;
            let y0 = -self.anchor.y * self.height;
            let x1 = x0 + self.width;
            let y1 = y0 + self.height;

            let a = world.a;
            let b = world.b;
            let c = world.c;
            let d = world.d;
            let tx = world.tx;
            let ty = world.ty;

            self.vertex_data = [
                a * x0 + c * y0 + tx,
                b * x0 + d * y0 + ty,
                a * x1 + c * y0 + tx,
                b * x1 + d * y0 + ty,
                a * x1 + c * y1 + tx,
                b * x1 + d * y1 + ty,
                a * x0 + c * y1 + tx,
                b * x0 + d * y1 + ty,
            ];
            self.cached_world_id = world_id;
            self.cached_version = self.version;
        }
        &self.vertex_data
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}
