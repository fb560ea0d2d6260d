// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vertex data plumbing: attribute layouts, a vertex-array wrapper, and a
//! quad-batched particle buffer.
//!
//! All uploads go through [`RenderContext`] buffers as raw bytes;
//! `bytemuck` handles the safe reinterpretation of `f32` and `u16` slices.

use alloc::vec::Vec;

use crate::context::{BufferHandle, Primitive, RenderContext};

/// Component type of a vertex attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// 32-bit float.
    F32,
    /// Unsigned 16-bit integer.
    U16,
    /// Unsigned byte.
    U8,
}

impl AttributeKind {
    /// Size of one component in bytes.
    #[must_use]
    pub const fn byte_size(self) -> usize {
        match self {
            Self::F32 => 4,
            Self::U16 => 2,
            Self::U8 => 1,
        }
    }
}

/// One attribute within an interleaved vertex layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Attribute {
    /// Number of components (1 to 4).
    pub components: u8,
    /// Component type.
    pub kind: AttributeKind,
    /// Whether integer components are normalized to `[0, 1]`.
    pub normalized: bool,
    /// Byte offset within a vertex.
    pub offset: usize,
}

/// An interleaved vertex buffer, its attribute layout, and an optional
/// index buffer.
///
/// The layout is built by chained [`add_attribute`](Self::add_attribute)
/// calls; offsets and the overall stride are derived from declaration
/// order. Backends read the layout when translating
/// [`draw`](Self::draw) into native state.
#[derive(Debug)]
pub struct VertexArrayObject {
    vertex_buffer: BufferHandle,
    index_buffer: Option<BufferHandle>,
    attributes: Vec<Attribute>,
    stride: usize,
}

impl VertexArrayObject {
    /// Creates a vertex array with an empty layout.
    pub fn new(ctx: &mut impl RenderContext) -> Self {
        Self {
            vertex_buffer: ctx.create_buffer(),
            index_buffer: None,
            attributes: Vec::new(),
            stride: 0,
        }
    }

    /// Appends an attribute to the layout. Offsets follow declaration
    /// order.
    ///
    /// # Panics
    ///
    /// Panics if `components` is outside 1 to 4.
    pub fn add_attribute(
        &mut self,
        components: u8,
        kind: AttributeKind,
        normalized: bool,
    ) -> &mut Self {
        assert!(
            (1..=4).contains(&components),
            "attribute must have 1 to 4 components, got {components}"
        );
        self.attributes.push(Attribute {
            components,
            kind,
            normalized,
            offset: self.stride,
        });
        self.stride += components as usize * kind.byte_size();
        self
    }

    /// The declared attribute layout.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Bytes per interleaved vertex.
    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The underlying vertex buffer.
    #[must_use]
    pub fn vertex_buffer(&self) -> BufferHandle {
        self.vertex_buffer
    }

    /// Uploads the full interleaved vertex data.
    pub fn upload_vertices(&self, ctx: &mut impl RenderContext, data: &[f32], dynamic: bool) {
        ctx.upload_buffer(self.vertex_buffer, bytemuck::cast_slice(data), dynamic);
    }

    /// Uploads indices, creating the index buffer on first use.
    pub fn set_indices(&mut self, ctx: &mut impl RenderContext, indices: &[u16]) {
        let handle = *self
            .index_buffer
            .get_or_insert_with(|| ctx.create_buffer());
        ctx.upload_buffer(handle, bytemuck::cast_slice(indices), false);
    }

    /// Issues an indexed draw.
    ///
    /// # Panics
    ///
    /// Panics if no index buffer has been set.
    pub fn draw(&self, ctx: &mut impl RenderContext, primitive: Primitive, count: u32, start: u32) {
        assert!(
            self.index_buffer.is_some(),
            "draw requires an index buffer; call set_indices first"
        );
        ctx.draw(primitive, count, start);
    }

    /// Destroys the GPU buffers.
    pub fn destroy(self, ctx: &mut impl RenderContext) {
        ctx.destroy_buffer(self.vertex_buffer);
        if let Some(handle) = self.index_buffer {
            ctx.destroy_buffer(handle);
        }
    }
}

/// One per-particle attribute of a [`ParticleBuffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParticleProperty {
    /// Float components per vertex.
    pub components: u8,
    /// Whether the property is rewritten every frame.
    pub dynamic: bool,
}

/// Quad-batched particle storage split into static and dynamic streams.
///
/// Each particle is four vertices and six indices (two triangles). Static
/// properties are uploaded once at construction and patched on demand;
/// dynamic properties stream every frame into a separate buffer so the
/// per-frame upload touches only data that actually changes.
#[derive(Debug)]
pub struct ParticleBuffer {
    size: u32,
    static_buffer: BufferHandle,
    dynamic_buffer: BufferHandle,
    index_buffer: BufferHandle,
    static_stride: u32,
    dynamic_stride: u32,
}

impl ParticleBuffer {
    /// Creates a particle buffer for at most `size` particles.
    ///
    /// Both streams are pre-sized with zeroes and the quad index pattern
    /// `[0, 1, 2, 0, 2, 3]` is uploaded once; the index buffer never
    /// changes afterwards.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero or `size * 4` vertices exceed 16-bit index
    /// range. A stream with no properties is fine; it is simply never
    /// uploaded.
    pub fn new(ctx: &mut impl RenderContext, properties: &[ParticleProperty], size: u32) -> Self {
        assert!(size > 0, "particle buffer must hold at least one particle");
        assert!(
            size * 4 <= u32::from(u16::MAX) + 1,
            "{size} particles exceed 16-bit index range"
        );

        let static_stride: u32 = properties
            .iter()
            .filter(|p| !p.dynamic)
            .map(|p| u32::from(p.components))
            .sum();
        let dynamic_stride: u32 = properties
            .iter()
            .filter(|p| p.dynamic)
            .map(|p| u32::from(p.components))
            .sum();

        let static_buffer = ctx.create_buffer();
        let dynamic_buffer = ctx.create_buffer();
        let index_buffer = ctx.create_buffer();

        if static_stride > 0 {
            let zeroes = alloc::vec![0.0f32; (size * 4 * static_stride) as usize];
            ctx.upload_buffer(static_buffer, bytemuck::cast_slice(&zeroes), false);
        }
        if dynamic_stride > 0 {
            let zeroes = alloc::vec![0.0f32; (size * 4 * dynamic_stride) as usize];
            ctx.upload_buffer(dynamic_buffer, bytemuck::cast_slice(&zeroes), true);
        }

        let mut indices: Vec<u16> = Vec::with_capacity((size * 6) as usize);
        for i in 0..size {
            let base = (i * 4) as u16;
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        ctx.upload_buffer(index_buffer, bytemuck::cast_slice(&indices), false);

        Self {
            size,
            static_buffer,
            dynamic_buffer,
            index_buffer,
            static_stride,
            dynamic_stride,
        }
    }

    /// Capacity in particles.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Floats per vertex in the static stream.
    #[must_use]
    pub fn static_stride(&self) -> u32 {
        self.static_stride
    }

    /// Floats per vertex in the dynamic stream.
    #[must_use]
    pub fn dynamic_stride(&self) -> u32 {
        self.dynamic_stride
    }

    /// Patches the static stream for particles `[first, first + data_len)`.
    ///
    /// # Panics
    ///
    /// Panics if the data does not cover whole particles or runs past the
    /// buffer's capacity.
    pub fn upload_static(&self, ctx: &mut impl RenderContext, first: u32, data: &[f32]) {
        self.upload_stream(ctx, self.static_buffer, self.static_stride, first, data);
    }

    /// Streams the dynamic properties for particles
    /// `[first, first + data_len)`.
    ///
    /// # Panics
    ///
    /// Panics if the data does not cover whole particles or runs past the
    /// buffer's capacity.
    pub fn upload_dynamic(&self, ctx: &mut impl RenderContext, first: u32, data: &[f32]) {
        self.upload_stream(ctx, self.dynamic_buffer, self.dynamic_stride, first, data);
    }

    fn upload_stream(
        &self,
        ctx: &mut impl RenderContext,
        buffer: BufferHandle,
        stride: u32,
        first: u32,
        data: &[f32],
    ) {
        let floats_per_particle = (stride * 4) as usize;
        assert!(
            floats_per_particle > 0,
            "stream has no properties to upload"
        );
        assert!(
            data.len() % floats_per_particle == 0,
            "upload of {} floats does not cover whole particles ({floats_per_particle} each)",
            data.len()
        );
        let count = (data.len() / floats_per_particle) as u32;
        assert!(
            first + count <= self.size,
            "upload of particles [{first}, {}) exceeds capacity {}",
            first + count,
            self.size
        );
        let offset = first as usize * floats_per_particle * 4;
        ctx.upload_buffer_range(buffer, offset, bytemuck::cast_slice(data));
    }

    /// Draws the first `count` particles as indexed quads.
    ///
    /// # Panics
    ///
    /// Panics if `count` exceeds the buffer's capacity.
    pub fn draw(&self, ctx: &mut impl RenderContext, count: u32) {
        assert!(
            count <= self.size,
            "draw of {count} particles exceeds capacity {}",
            self.size
        );
        ctx.draw(Primitive::Triangles, count * 6, 0);
    }

    /// Destroys the GPU buffers.
    pub fn destroy(self, ctx: &mut impl RenderContext) {
        ctx.destroy_buffer(self.static_buffer);
        ctx.destroy_buffer(self.dynamic_buffer);
        ctx.destroy_buffer(self.index_buffer);
    }
}
