// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`RenderContext`] trait that GPU backends implement.
//!
//! The trait deliberately mirrors the narrow slice of a GL-style API the
//! residency and buffer machinery actually uses: object creation and
//! destruction, data upload, texture-unit binding, and indexed draws.
//! Everything else (shaders, pipeline state, presentation) is the backend's
//! business and never crosses this boundary.
//!
//! A context is identified by [`context_id`](RenderContext::context_id).
//! The id is the deduplication key for per-context GPU state: a texture
//! uploaded once for a context must never receive a second GPU object for
//! the same id.

use core::fmt;

/// Stable identity of a render context, the deduplication key for
/// per-context GPU state.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextId(pub u32);

impl fmt::Debug for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContextId({})", self.0)
    }
}

/// An opaque handle to a GPU texture object, assigned by the backend.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureHandle(pub u32);

impl fmt::Debug for TextureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextureHandle({})", self.0)
    }
}

/// An opaque handle to a GPU buffer object, assigned by the backend.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferHandle(pub u32);

impl fmt::Debug for BufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BufferHandle({})", self.0)
    }
}

/// Sampling filter for texture reads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScaleMode {
    /// Smooth bilinear sampling.
    #[default]
    Linear,
    /// Pixelated nearest-neighbor sampling.
    Nearest,
}

/// Addressing mode outside the `[0, 1]` texture coordinate range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WrapMode {
    /// Clamp to the edge texel. The only mode valid for
    /// non-power-of-two textures.
    #[default]
    Clamp,
    /// Tile the texture.
    Repeat,
    /// Tile with alternating mirroring.
    MirroredRepeat,
}

/// Primitive topology for a draw call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Separate triangles, three indices each.
    Triangles,
    /// A connected triangle strip.
    TriangleStrip,
}

/// One texture upload: storage description plus optional pixel data.
///
/// `pixels: None` allocates storage without filling it, which is how
/// render-target textures are created and resized.
#[derive(Debug)]
pub struct TextureUpload<'a> {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Tightly packed RGBA8 pixel data, or `None` to allocate only.
    pub pixels: Option<&'a [u8]>,
    /// Sampling filter.
    pub scale_mode: ScaleMode,
    /// Addressing mode.
    pub wrap_mode: WrapMode,
    /// Whether to generate a mipmap chain after upload.
    pub mipmap: bool,
}

/// The GPU operations the residency and buffer machinery needs.
///
/// Backends implement this against their native API. All handles are
/// backend-assigned and opaque; passing a handle the backend did not hand
/// out is a caller bug and may panic in the backend.
pub trait RenderContext {
    /// Stable identity of this context, the deduplication key for
    /// per-context GPU state.
    fn context_id(&self) -> ContextId;

    /// Number of texture units available for binding.
    fn texture_units(&self) -> u32;

    /// The texture currently bound to `unit`, if any.
    fn bound_texture(&self, unit: u32) -> Option<TextureHandle>;

    /// Creates an empty texture object.
    fn create_texture(&mut self) -> TextureHandle;

    /// Uploads storage (and optionally pixels) to a texture object.
    fn upload_texture(&mut self, handle: TextureHandle, upload: &TextureUpload<'_>);

    /// Binds a texture to a unit.
    fn bind_texture(&mut self, handle: TextureHandle, unit: u32);

    /// Clears the binding on a unit.
    fn unbind_texture(&mut self, unit: u32);

    /// Destroys a texture object. Any unit it was bound to becomes empty.
    fn destroy_texture(&mut self, handle: TextureHandle);

    /// Creates an empty buffer object.
    fn create_buffer(&mut self) -> BufferHandle;

    /// Uploads a full buffer. `dynamic` hints per-frame rewrites.
    fn upload_buffer(&mut self, handle: BufferHandle, data: &[u8], dynamic: bool);

    /// Overwrites a byte range of a previously sized buffer.
    fn upload_buffer_range(&mut self, handle: BufferHandle, offset: usize, data: &[u8]);

    /// Destroys a buffer object.
    fn destroy_buffer(&mut self, handle: BufferHandle);

    /// Issues an indexed draw of `count` indices starting at `start`.
    fn draw(&mut self, primitive: Primitive, count: u32, start: u32);
}

#[cfg(test)]
pub(crate) mod recording {
    //! An in-memory [`RenderContext`] that records every call, for tests.

    use alloc::vec::Vec;

    use super::{
        BufferHandle, ContextId, Primitive, RenderContext, TextureHandle, TextureUpload,
    };

    /// One recorded backend call.
    #[derive(Clone, Debug, PartialEq)]
    pub(crate) enum Op {
        CreateTexture(TextureHandle),
        UploadTexture {
            handle: TextureHandle,
            width: u32,
            height: u32,
            with_pixels: bool,
            mipmap: bool,
        },
        BindTexture(TextureHandle, u32),
        UnbindTexture(u32),
        DestroyTexture(TextureHandle),
        CreateBuffer(BufferHandle),
        UploadBuffer {
            handle: BufferHandle,
            bytes: usize,
            dynamic: bool,
        },
        UploadBufferRange {
            handle: BufferHandle,
            offset: usize,
            bytes: usize,
        },
        DestroyBuffer(BufferHandle),
        Draw(Primitive, u32, u32),
    }

    /// Records every call and simulates texture-unit binding state.
    #[derive(Debug)]
    pub(crate) struct RecordingContext {
        id: u32,
        next_handle: u32,
        units: Vec<Option<TextureHandle>>,
        pub(crate) ops: Vec<Op>,
    }

    impl RecordingContext {
        pub(crate) fn new(id: u32) -> Self {
            Self {
                id,
                next_handle: 1,
                units: alloc::vec![None; 8],
                ops: Vec::new(),
            }
        }

        pub(crate) fn count(&self, pred: impl Fn(&Op) -> bool) -> usize {
            self.ops.iter().filter(|op| pred(op)).count()
        }
    }

    impl RenderContext for RecordingContext {
        fn context_id(&self) -> ContextId {
            ContextId(self.id)
        }

        fn texture_units(&self) -> u32 {
            self.units.len() as u32
        }

        fn bound_texture(&self, unit: u32) -> Option<TextureHandle> {
            self.units[unit as usize]
        }

        fn create_texture(&mut self) -> TextureHandle {
            let handle = TextureHandle(self.next_handle);
            self.next_handle += 1;
            self.ops.push(Op::CreateTexture(handle));
            handle
        }

        fn upload_texture(&mut self, handle: TextureHandle, upload: &TextureUpload<'_>) {
            self.ops.push(Op::UploadTexture {
                handle,
                width: upload.width,
                height: upload.height,
                with_pixels: upload.pixels.is_some(),
                mipmap: upload.mipmap,
            });
        }

        fn bind_texture(&mut self, handle: TextureHandle, unit: u32) {
            self.units[unit as usize] = Some(handle);
            self.ops.push(Op::BindTexture(handle, unit));
        }

        fn unbind_texture(&mut self, unit: u32) {
            self.units[unit as usize] = None;
            self.ops.push(Op::UnbindTexture(unit));
        }

        fn destroy_texture(&mut self, handle: TextureHandle) {
            for unit in &mut self.units {
                if *unit == Some(handle) {
                    *unit = None;
                }
            }
            self.ops.push(Op::DestroyTexture(handle));
        }

        fn create_buffer(&mut self) -> BufferHandle {
            let handle = BufferHandle(self.next_handle);
            self.next_handle += 1;
            self.ops.push(Op::CreateBuffer(handle));
            handle
        }

        fn upload_buffer(&mut self, handle: BufferHandle, data: &[u8], dynamic: bool) {
            self.ops.push(Op::UploadBuffer {
                handle,
                bytes: data.len(),
                dynamic,
            });
        }

        fn upload_buffer_range(&mut self, handle: BufferHandle, offset: usize, data: &[u8]) {
            self.ops.push(Op::UploadBufferRange {
                handle,
                offset,
                bytes: data.len(),
            });
        }

        fn destroy_buffer(&mut self, handle: BufferHandle) {
            self.ops.push(Op::DestroyBuffer(handle));
        }

        fn draw(&mut self, primitive: Primitive, count: u32, start: u32) {
            self.ops.push(Op::Draw(primitive, count, start));
        }
    }
}
