// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! GPU texture residency against one render context.
//!
//! A [`TextureManager`] owns at most one [`RenderContext`] and mediates
//! every upload, bind, and destroy for textures on that context. The core
//! invariant is deduplication by context id: however many times
//! [`update_texture`](TextureManager::update_texture) runs for a texture,
//! the context ends up with exactly one GPU object for it, re-uploaded
//! only when the pixel version moved.
//!
//! A manager without a context (detached, or after
//! [`lose_context`](TextureManager::lose_context)) treats every operation
//! as a silent no-op; a missing context is an expected transient state,
//! not an error.

use alloc::vec::Vec;

use crate::context::{RenderContext, TextureHandle, TextureUpload, WrapMode};

/// Clears every unit a handle is bound to before the handle dies.
fn unbind_handle<C: RenderContext>(ctx: &mut C, handle: TextureHandle) {
    for unit in 0..ctx.texture_units() {
        if ctx.bound_texture(unit) == Some(handle) {
            ctx.unbind_texture(unit);
        }
    }
}
use crate::texture::{BaseTextureId, GpuTexture, TextureStore};

/// Outcome of one [`TextureManager::update_texture`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureUpdate {
    /// The context's GPU object for the texture.
    pub handle: TextureHandle,
    /// Whether this call performed an upload (first residency or stale
    /// pixel version).
    pub uploaded: bool,
}

/// Mediates texture upload, bind, and destroy for one render context.
#[derive(Debug)]
pub struct TextureManager<C> {
    context: Option<C>,
    managed: Vec<BaseTextureId>,
}

impl<C: RenderContext> TextureManager<C> {
    /// Creates a manager bound to a context.
    #[must_use]
    pub fn new(context: C) -> Self {
        Self {
            context: Some(context),
            managed: Vec::new(),
        }
    }

    /// Creates a manager with no context. Every operation no-ops until a
    /// context is attached.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            context: None,
            managed: Vec::new(),
        }
    }

    /// Whether a context is currently attached.
    #[must_use]
    pub fn has_context(&self) -> bool {
        self.context.is_some()
    }

    /// Attaches a context. GPU state for a previously lost context is
    /// already gone; textures become resident again on their next update.
    pub fn set_context(&mut self, context: C) {
        self.context = Some(context);
    }

    /// Borrows the attached context.
    #[must_use]
    pub fn context_mut(&mut self) -> Option<&mut C> {
        self.context.as_mut()
    }

    /// Makes a texture resident and bound, creating or refreshing the
    /// context's GPU object as needed.
    ///
    /// Returns `None` when no context is attached or the texture's source
    /// has not loaded yet; both are expected transient states. Otherwise
    /// guarantees on return: the context holds exactly one GPU object for
    /// this texture, its contents match the texture's version, and the
    /// object is bound to some texture unit. With `location: Some(unit)`
    /// the object ends up on that unit; with `None` an existing binding
    /// on any unit is reused, else unit 0 is claimed.
    ///
    /// Non-power-of-two textures are uploaded clamped and without
    /// mipmaps regardless of the requested modes.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn update_texture(
        &mut self,
        store: &mut TextureStore,
        id: BaseTextureId,
        location: Option<u32>,
    ) -> Option<TextureUpdate> {
        let ctx = self.context.as_mut()?;
        let texture = store.get_mut(id);
        if !texture.has_loaded() {
            return None;
        }

        let context_id = ctx.context_id();
        let version = texture.version();
        let pot = texture.is_power_of_two();

        let (handle, uploaded) = match texture.gpu.get(&context_id).copied() {
            Some(gpu) if gpu.uploaded_version == version => (gpu.handle, false),
            existing => {
                // First residency on this context, or stale contents.
                let handle = match existing {
                    Some(gpu) => gpu.handle,
                    None => ctx.create_texture(),
                };
                let upload = TextureUpload {
                    width: texture.width(),
                    height: texture.height(),
                    pixels: if texture.is_render_target() {
                        None
                    } else {
                        texture.pixels()
                    },
                    scale_mode: texture.scale_mode(),
                    wrap_mode: if pot { texture.wrap_mode() } else { WrapMode::Clamp },
                    mipmap: texture.mipmap() && pot && !texture.is_render_target(),
                };
                ctx.upload_texture(handle, &upload);
                texture.gpu.insert(
                    context_id,
                    GpuTexture {
                        handle,
                        uploaded_version: version,
                    },
                );
                if existing.is_none() {
                    self.managed.push(id);
                }
                (handle, true)
            }
        };

        match location {
            Some(unit) => {
                if ctx.bound_texture(unit) != Some(handle) {
                    ctx.bind_texture(handle, unit);
                }
            }
            None => {
                // Reuse an existing binding before claiming unit 0.
                let already_bound =
                    (0..ctx.texture_units()).any(|unit| ctx.bound_texture(unit) == Some(handle));
                if !already_bound {
                    ctx.bind_texture(handle, 0);
                }
            }
        }

        Some(TextureUpdate { handle, uploaded })
    }

    /// Destroys the context's GPU object for a texture, if resident.
    ///
    /// The texture itself stays in the store and can become resident
    /// again later. No-op without a context.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn release_texture(&mut self, store: &mut TextureStore, id: BaseTextureId) {
        self.release_gpu(store, id);
        self.managed.retain(|&m| m != id);
    }

    /// Unbinds and destroys this context's GPU object, leaving the
    /// managed list alone.
    fn release_gpu(&mut self, store: &mut TextureStore, id: BaseTextureId) {
        let Some(ctx) = self.context.as_mut() else {
            return;
        };
        let context_id = ctx.context_id();
        if let Some(gpu) = store.get_mut(id).gpu.remove(&context_id) {
            unbind_handle(ctx, gpu.handle);
            ctx.destroy_texture(gpu.handle);
        }
    }

    /// Removes a texture from the store entirely, destroying this
    /// context's GPU object first. `skip_remove` leaves the managed-list
    /// entry in place for callers that are iterating it.
    ///
    /// GPU objects on *other* contexts are dropped with the texture; each
    /// context's own manager is expected to have released them already.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale, which makes double-destroy a loud
    /// failure instead of silent slot corruption.
    pub fn destroy_texture(
        &mut self,
        store: &mut TextureStore,
        id: BaseTextureId,
        skip_remove: bool,
    ) {
        self.release_gpu(store, id);
        if !skip_remove {
            self.managed.retain(|&m| m != id);
        }
        let _ = store.remove(id);
    }

    /// Destroys this context's GPU objects for every managed texture.
    pub fn remove_all(&mut self, store: &mut TextureStore) {
        let Some(ctx) = self.context.as_mut() else {
            self.managed.clear();
            return;
        };
        let context_id = ctx.context_id();
        for id in self.managed.drain(..) {
            if store.is_alive(id) {
                if let Some(gpu) = store.get_mut(id).gpu.remove(&context_id) {
                    unbind_handle(ctx, gpu.handle);
                    ctx.destroy_texture(gpu.handle);
                }
            }
        }
    }

    /// Drops the context after it has been lost externally.
    ///
    /// The GPU objects died with the context, so only the bookkeeping is
    /// cleared; no destroy calls are issued.
    pub fn lose_context(&mut self, store: &mut TextureStore) {
        let Some(ctx) = self.context.take() else {
            return;
        };
        let context_id = ctx.context_id();
        for id in self.managed.drain(..) {
            if store.is_alive(id) {
                store.get_mut(id).gpu.remove(&context_id);
            }
        }
    }

    /// Tears the manager down, releasing every managed GPU object and the
    /// context itself. Consuming `self` makes a second teardown
    /// unrepresentable.
    pub fn destroy(mut self, store: &mut TextureStore) {
        self.remove_all(store);
        self.context = None;
    }

    /// Number of textures currently managed for this context.
    #[must_use]
    pub fn managed_count(&self) -> usize {
        self.managed.len()
    }
}
