// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! GPU texture residency, vertex buffers, and render planning for strata.
//!
//! This crate sits between [`strata_core`]'s scene tree and a concrete
//! graphics backend. The backend implements [`RenderContext`]; everything
//! else here is backend-agnostic bookkeeping:
//!
//! - [`BaseTexture`] / [`Texture`] — pixel storage and sub-regions of it
//! - [`TextureManager`] — keeps textures resident per context, surviving
//!   context loss
//! - [`ResourceCache`] — deduplicates textures by source and resolves
//!   frame handles
//! - [`VertexArrayObject`] / [`ParticleBuffer`] — interleaved vertex
//!   streams with static/dynamic splits
//! - [`RenderPlan`] — an ordered list of draw commands for one frame,
//!   built by [`render_frame`]

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod buffer;
mod cache;
mod context;
mod frame;
mod manager;
mod texture;

pub use buffer::{Attribute, AttributeKind, ParticleBuffer, ParticleProperty, VertexArrayObject};
pub use cache::ResourceCache;
pub use context::{
    BufferHandle, ContextId, Primitive, RenderContext, ScaleMode, TextureHandle, TextureUpload,
    WrapMode,
};
pub use frame::{
    RenderItem, RenderPlan, ResidencyStats, build_plan, ensure_resident, render_frame,
};
pub use manager::{TextureManager, TextureUpdate};
pub use texture::{BaseTexture, BaseTextureId, PixelSource, Texture, TextureStore};
