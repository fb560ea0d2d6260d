// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Base textures, their pixel sources, and rectangular texture views.
//!
//! A [`BaseTexture`] owns one pixel source and a table of per-context GPU
//! handles; a [`Texture`] is a lightweight named view (frame, trim, orig)
//! onto a base texture. Base textures live in a [`TextureStore`] and are
//! addressed by generational [`BaseTextureId`] handles, so a destroyed
//! texture's stale handles fail fast instead of touching a reused slot.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Rect;

use strata_core::event::{Emitter, EventKind};

use crate::context::{ContextId, ScaleMode, TextureHandle, WrapMode};

/// Provides pixel data for a [`BaseTexture`].
///
/// Sources load asynchronously: a source may report not-ready for any
/// number of frames, during which dependent operations silently no-op.
/// Once [`is_ready`](Self::is_ready) returns `true` the dimensions are
/// final and [`pixels`](Self::pixels) returns tightly packed RGBA8 data.
pub trait PixelSource: fmt::Debug {
    /// Width in texels. Meaningless before the source is ready.
    fn width(&self) -> u32;

    /// Height in texels. Meaningless before the source is ready.
    fn height(&self) -> u32;

    /// Whether the pixel data is available.
    fn is_ready(&self) -> bool;

    /// The pixel data, if ready. `width * height * 4` bytes.
    fn pixels(&self) -> Option<&[u8]>;
}

/// A handle to a base texture in a [`TextureStore`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BaseTextureId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl fmt::Debug for BaseTextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BaseTextureId({}@gen{})", self.idx, self.generation)
    }
}

/// Per-context GPU state of a base texture.
#[derive(Clone, Copy, Debug)]
pub(crate) struct GpuTexture {
    /// Backend handle for this context.
    pub(crate) handle: TextureHandle,
    /// Version of the pixel data last uploaded.
    pub(crate) uploaded_version: u32,
}

/// A raw texture: one pixel source plus per-context GPU handles.
#[derive(Debug)]
pub struct BaseTexture {
    source: Box<dyn PixelSource>,
    scale_mode: ScaleMode,
    wrap_mode: WrapMode,
    mipmap: bool,
    has_loaded: bool,
    render_target: bool,
    width: u32,
    height: u32,
    version: u32,
    // Keyed by context id. The residency invariant: at most one GPU
    // object per context.
    pub(crate) gpu: BTreeMap<ContextId, GpuTexture>,
    emitter: Emitter,
}

impl BaseTexture {
    /// Sampling filter.
    #[must_use]
    pub fn scale_mode(&self) -> ScaleMode {
        self.scale_mode
    }

    /// Requested addressing mode. The upload may downgrade it to
    /// [`WrapMode::Clamp`] for non-power-of-two sizes.
    #[must_use]
    pub fn wrap_mode(&self) -> WrapMode {
        self.wrap_mode
    }

    /// Sets the addressing mode for future uploads.
    pub fn set_wrap_mode(&mut self, wrap_mode: WrapMode) {
        self.wrap_mode = wrap_mode;
    }

    /// Whether the upload should build a mipmap chain. Only honored for
    /// power-of-two sizes.
    #[must_use]
    pub fn mipmap(&self) -> bool {
        self.mipmap
    }

    /// Enables or disables mipmapping for future uploads.
    pub fn set_mipmap(&mut self, mipmap: bool) {
        self.mipmap = mipmap;
    }

    /// Whether the source pixels are available (always `true` for render
    /// targets).
    #[must_use]
    pub fn has_loaded(&self) -> bool {
        self.has_loaded
    }

    /// Whether this texture is drawn into rather than loaded.
    #[must_use]
    pub fn is_render_target(&self) -> bool {
        self.render_target
    }

    /// Width in texels, valid once loaded.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in texels, valid once loaded.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether both dimensions are powers of two.
    #[must_use]
    pub fn is_power_of_two(&self) -> bool {
        self.width.is_power_of_two() && self.height.is_power_of_two()
    }

    /// Version of the pixel contents; uploads compare against it.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// The pixel data, if the source has it.
    #[must_use]
    pub fn pixels(&self) -> Option<&[u8]> {
        self.source.pixels()
    }

    /// The texture's lifecycle emitter. `Complete` fires when the source
    /// finishes loading, `Change` when pixel contents are replaced,
    /// `Unload` when GPU state is dropped.
    pub fn emitter_mut(&mut self) -> &mut Emitter {
        &mut self.emitter
    }

    /// Marks the pixel contents changed, forcing a re-upload on every
    /// context the texture is resident on.
    pub fn mark_changed(&mut self) {
        self.version = self.version.wrapping_add(1);
        self.emitter.emit(EventKind::Change);
    }

    /// Resizes a render target. The next residency pass reallocates GPU
    /// storage.
    ///
    /// # Panics
    ///
    /// Panics if the texture is not a render target.
    pub fn resize(&mut self, width: u32, height: u32) {
        assert!(self.render_target, "only render targets can be resized");
        self.width = width;
        self.height = height;
        self.mark_changed();
    }

    /// Polls the source for completion. Returns `true` the one time the
    /// source transitions to loaded; dimensions become valid and both
    /// `Change` (the pixels are new) and `Complete` are emitted.
    pub fn poll_source(&mut self) -> bool {
        if self.has_loaded || !self.source.is_ready() {
            return false;
        }
        self.width = self.source.width();
        self.height = self.source.height();
        self.has_loaded = true;
        self.version = self.version.wrapping_add(1);
        self.emitter.emit(EventKind::Change);
        self.emitter.emit(EventKind::Complete);
        true
    }
}

struct Slot {
    generation: u32,
    data: Option<BaseTexture>,
}

/// Slab storage for all base textures.
pub struct TextureStore {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
}

impl fmt::Debug for TextureStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureStore")
            .field("slots", &self.slots.len())
            .field("free", &self.free_list.len())
            .finish()
    }
}

impl Default for TextureStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Creates a base texture around a pixel source.
    ///
    /// The source is polled once immediately, so an already-loaded source
    /// produces a texture with valid dimensions from the start.
    pub fn create(&mut self, source: Box<dyn PixelSource>, scale_mode: ScaleMode) -> BaseTextureId {
        let mut texture = BaseTexture {
            source,
            scale_mode,
            wrap_mode: WrapMode::Clamp,
            mipmap: true,
            has_loaded: false,
            render_target: false,
            width: 0,
            height: 0,
            version: 0,
            gpu: BTreeMap::new(),
            emitter: Emitter::new(),
        };
        let _ = texture.poll_source();
        self.insert(texture)
    }

    /// Creates a render-target texture of the given size.
    pub fn create_render_target(
        &mut self,
        width: u32,
        height: u32,
        scale_mode: ScaleMode,
    ) -> BaseTextureId {
        self.insert(BaseTexture {
            source: Box::new(NoPixels),
            scale_mode,
            wrap_mode: WrapMode::Clamp,
            mipmap: false,
            has_loaded: true,
            render_target: true,
            width,
            height,
            version: 0,
            gpu: BTreeMap::new(),
            emitter: Emitter::new(),
        })
    }

    /// Returns whether the handle refers to a live texture.
    #[must_use]
    pub fn is_alive(&self, id: BaseTextureId) -> bool {
        self.slots
            .get(id.idx as usize)
            .is_some_and(|slot| slot.generation == id.generation && slot.data.is_some())
    }

    /// Borrows a base texture.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn get(&self, id: BaseTextureId) -> &BaseTexture {
        assert!(self.is_alive(id), "stale BaseTextureId: {id:?}");
        self.slots[id.idx as usize].data.as_ref().unwrap()
    }

    /// Mutably borrows a base texture.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn get_mut(&mut self, id: BaseTextureId) -> &mut BaseTexture {
        assert!(self.is_alive(id), "stale BaseTextureId: {id:?}");
        self.slots[id.idx as usize].data.as_mut().unwrap()
    }

    /// Removes a base texture from the store, returning it so callers can
    /// release its GPU state. Prefer
    /// [`TextureManager::destroy_texture`](crate::manager::TextureManager::destroy_texture),
    /// which does both.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale, so double-destroy through an old
    /// handle is caught instead of freeing a reused slot.
    pub fn remove(&mut self, id: BaseTextureId) -> BaseTexture {
        assert!(self.is_alive(id), "stale BaseTextureId: {id:?}");
        let slot = &mut self.slots[id.idx as usize];
        slot.generation += 1;
        self.free_list.push(id.idx);
        let mut texture = slot.data.take().unwrap();
        texture.emitter.emit(EventKind::Unload);
        texture
    }

    fn insert(&mut self, texture: BaseTexture) -> BaseTextureId {
        if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.data = Some(texture);
            BaseTextureId {
                idx,
                generation: slot.generation,
            }
        } else {
            let idx = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                data: Some(texture),
            });
            BaseTextureId { idx, generation: 0 }
        }
    }
}

/// The source behind render targets: no CPU-side pixels, ever.
#[derive(Debug)]
struct NoPixels;

impl PixelSource for NoPixels {
    fn width(&self) -> u32 {
        0
    }

    fn height(&self) -> u32 {
        0
    }

    fn is_ready(&self) -> bool {
        true
    }

    fn pixels(&self) -> Option<&[u8]> {
        None
    }
}

/// A rectangular view onto a [`BaseTexture`].
///
/// `frame` is the crop in source pixels. When an atlas packer strips
/// transparent padding, `trim` records where the retained pixels sit
/// inside the original image and `orig` keeps the untrimmed logical size;
/// anchor and scale math always use `orig`, so visual size is independent
/// of packing.
#[derive(Clone, Copy, Debug)]
pub struct Texture {
    /// The backing base texture.
    pub base: BaseTextureId,
    /// Crop rectangle in source pixels.
    pub frame: Rect,
    /// Placement of the retained pixels within the original image, if
    /// trimmed.
    pub trim: Option<Rect>,
    /// Original untrimmed logical size.
    pub orig: Rect,
}

impl Texture {
    /// A view covering `frame` of an untrimmed source.
    #[must_use]
    pub fn new(base: BaseTextureId, frame: Rect) -> Self {
        Self {
            base,
            frame,
            trim: None,
            orig: Rect::new(0.0, 0.0, frame.width(), frame.height()),
        }
    }

    /// A view for a trimmed atlas entry.
    #[must_use]
    pub fn with_trim(base: BaseTextureId, frame: Rect, trim: Rect, orig: Rect) -> Self {
        Self {
            base,
            frame,
            trim: Some(trim),
            orig,
        }
    }

    /// Logical width, from the untrimmed size.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.orig.width()
    }

    /// Logical height, from the untrimmed size.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.orig.height()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use alloc::rc::Rc;
    use core::cell::Cell;

    use super::*;

    /// A source that starts unready and can be completed by the test.
    #[derive(Debug)]
    pub(crate) struct FakeSource {
        width: u32,
        height: u32,
        ready: Rc<Cell<bool>>,
        data: Vec<u8>,
    }

    impl FakeSource {
        pub(crate) fn loaded(width: u32, height: u32) -> Self {
            Self::pending(width, height, Rc::new(Cell::new(true)))
        }

        pub(crate) fn pending(width: u32, height: u32, ready: Rc<Cell<bool>>) -> Self {
            Self {
                width,
                height,
                ready,
                data: alloc::vec![0; (width * height * 4) as usize],
            }
        }
    }

    impl PixelSource for FakeSource {
        fn width(&self) -> u32 {
            self.width
        }

        fn height(&self) -> u32 {
            self.height
        }

        fn is_ready(&self) -> bool {
            self.ready.get()
        }

        fn pixels(&self) -> Option<&[u8]> {
            self.ready.get().then_some(&self.data[..])
        }
    }

    #[test]
    fn loaded_source_has_dimensions_immediately() {
        let mut store = TextureStore::new();
        let id = store.create(Box::new(FakeSource::loaded(32, 16)), ScaleMode::Linear);
        let tex = store.get(id);
        assert!(tex.has_loaded());
        assert_eq!((tex.width(), tex.height()), (32, 16));
        assert!(tex.is_power_of_two());
    }

    #[test]
    fn pending_source_completes_on_poll() {
        let ready = Rc::new(Cell::new(false));
        let mut store = TextureStore::new();
        let id = store.create(
            Box::new(FakeSource::pending(20, 10, ready.clone())),
            ScaleMode::Linear,
        );
        assert!(!store.get(id).has_loaded());
        assert!(!store.get_mut(id).poll_source());

        ready.set(true);
        assert!(store.get_mut(id).poll_source());
        let tex = store.get(id);
        assert!(tex.has_loaded());
        assert_eq!((tex.width(), tex.height()), (20, 10));
        assert!(!tex.is_power_of_two());

        // Completion is a one-time transition.
        assert!(!store.get_mut(id).poll_source());
    }

    #[test]
    fn completion_reaches_listeners_once() {
        let ready = Rc::new(Cell::new(false));
        let hits = Rc::new(Cell::new(0));
        let mut store = TextureStore::new();
        let id = store.create(
            Box::new(FakeSource::pending(4, 4, ready.clone())),
            ScaleMode::Linear,
        );
        {
            let hits = hits.clone();
            store.get_mut(id).emitter_mut().on(move |kind| {
                if kind == EventKind::Complete {
                    hits.set(hits.get() + 1);
                }
            });
        }

        ready.set(true);
        store.get_mut(id).poll_source();
        store.get_mut(id).poll_source();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn load_completion_also_signals_change() {
        let ready = Rc::new(Cell::new(false));
        let changes = Rc::new(Cell::new(0));
        let mut store = TextureStore::new();
        let id = store.create(
            Box::new(FakeSource::pending(4, 4, ready.clone())),
            ScaleMode::Linear,
        );
        {
            let changes = changes.clone();
            store.get_mut(id).emitter_mut().on(move |kind| {
                if kind == EventKind::Change {
                    changes.set(changes.get() + 1);
                }
            });
        }

        // A poll before the source is ready signals nothing.
        store.get_mut(id).poll_source();
        assert_eq!(changes.get(), 0);

        ready.set(true);
        store.get_mut(id).poll_source();
        assert_eq!(changes.get(), 1);
    }

    #[test]
    fn remove_invalidates_handles_and_recycles() {
        let mut store = TextureStore::new();
        let id = store.create(Box::new(FakeSource::loaded(8, 8)), ScaleMode::Nearest);
        let _ = store.remove(id);
        assert!(!store.is_alive(id));

        let reused = store.create(Box::new(FakeSource::loaded(8, 8)), ScaleMode::Linear);
        assert_eq!(reused.idx, id.idx);
        assert_ne!(reused.generation, id.generation);
    }

    #[test]
    #[should_panic(expected = "stale BaseTextureId")]
    fn stale_handle_panics() {
        let mut store = TextureStore::new();
        let id = store.create(Box::new(FakeSource::loaded(8, 8)), ScaleMode::Linear);
        let _ = store.remove(id);
        let _ = store.get(id);
    }

    #[test]
    #[should_panic(expected = "only render targets can be resized")]
    fn resize_of_loaded_texture_panics() {
        let mut store = TextureStore::new();
        let id = store.create(Box::new(FakeSource::loaded(8, 8)), ScaleMode::Linear);
        store.get_mut(id).resize(16, 16);
    }

    #[test]
    fn trimmed_view_keeps_logical_size() {
        let mut store = TextureStore::new();
        let base = store.create(Box::new(FakeSource::loaded(64, 64)), ScaleMode::Linear);

        let packed = Texture::with_trim(
            base,
            Rect::new(10.0, 10.0, 40.0, 30.0),
            Rect::new(5.0, 8.0, 35.0, 28.0),
            Rect::new(0.0, 0.0, 48.0, 48.0),
        );
        assert_eq!(packed.width(), 48.0);
        assert_eq!(packed.height(), 48.0);

        let plain = Texture::new(base, Rect::new(0.0, 0.0, 64.0, 32.0));
        assert_eq!(plain.width(), 64.0);
        assert_eq!(plain.height(), 32.0);
        assert!(plain.trim.is_none());
    }
}
