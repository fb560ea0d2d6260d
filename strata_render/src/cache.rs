// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Texture registry: frame ids, scene-facing references, and source
//! deduplication.
//!
//! The scene core refers to textures through opaque
//! [`TextureRef`](strata_core::node::TextureRef) values; this cache is
//! where those references resolve to concrete [`Texture`] views. It also
//! deduplicates base textures by source key, so loading the same asset
//! twice shares one pixel source and one set of GPU handles.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use strata_core::node::TextureRef;

use crate::context::ScaleMode;
use crate::texture::{BaseTextureId, PixelSource, Texture, TextureStore};

/// Maps frame ids and [`TextureRef`]s to texture views.
#[derive(Debug, Default)]
pub struct ResourceCache {
    by_source: BTreeMap<String, BaseTextureId>,
    frames: BTreeMap<String, TextureRef>,
    textures: Vec<Texture>,
}

impl ResourceCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the base texture registered under `key`, creating it from
    /// `make` on first use. A key whose texture was since destroyed is
    /// re-created rather than served stale.
    pub fn get_or_create_base(
        &mut self,
        store: &mut TextureStore,
        key: &str,
        scale_mode: ScaleMode,
        make: impl FnOnce() -> Box<dyn PixelSource>,
    ) -> BaseTextureId {
        if let Some(&id) = self.by_source.get(key) {
            if store.is_alive(id) {
                return id;
            }
        }
        let id = store.create(make(), scale_mode);
        self.by_source.insert(key.to_string(), id);
        id
    }

    /// Registers a texture view and returns the reference the scene core
    /// uses to name it.
    pub fn register(&mut self, texture: Texture) -> TextureRef {
        let r = TextureRef(self.textures.len() as u32);
        self.textures.push(texture);
        r
    }

    /// Resolves a reference to its texture view.
    ///
    /// # Panics
    ///
    /// Panics if the reference was not issued by this cache (or the cache
    /// has been cleared since).
    #[must_use]
    pub fn texture(&self, r: TextureRef) -> &Texture {
        self.textures
            .get(r.0 as usize)
            .unwrap_or_else(|| panic!("unknown {r:?}"))
    }

    /// Registers a texture under a frame id and returns its reference.
    ///
    /// # Panics
    ///
    /// Panics if the frame id is already taken.
    pub fn add_frame(&mut self, frame_id: &str, texture: Texture) -> TextureRef {
        assert!(
            !self.frames.contains_key(frame_id),
            "frame id {frame_id:?} is already registered"
        );
        let r = self.register(texture);
        self.frames.insert(frame_id.to_string(), r);
        r
    }

    /// Looks up the reference registered under a frame id.
    ///
    /// # Panics
    ///
    /// Panics if no texture is registered under the id.
    #[must_use]
    pub fn from_frame(&self, frame_id: &str) -> TextureRef {
        *self
            .frames
            .get(frame_id)
            .unwrap_or_else(|| panic!("no texture registered for frame id {frame_id:?}"))
    }

    /// Whether a frame id is registered.
    #[must_use]
    pub fn contains_frame(&self, frame_id: &str) -> bool {
        self.frames.contains_key(frame_id)
    }

    /// Number of registered texture views.
    #[must_use]
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Whether no views are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Drops every registration. Previously issued references become
    /// invalid; base textures themselves are owned by the
    /// [`TextureStore`] and are not touched.
    pub fn clear(&mut self) {
        self.by_source.clear();
        self.frames.clear();
        self.textures.clear();
    }
}
