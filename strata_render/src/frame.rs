// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render plans and the per-frame driver.
//!
//! A [`RenderPlan`] is the intermediate representation between the scene
//! tree's passes and a backend: an ordered list of textured quads in
//! paint order. [`render_frame`] strings the whole frame together:
//! transform pass, bounds pass, plan build, and texture residency.

use alloc::vec::Vec;

use strata_core::matrix::Matrix;
use strata_core::node::{NodeId, SceneStore, TextureRef};
use strata_core::trace::{PlanEvent, ResidencyEvent, Tracer};

use crate::cache::ResourceCache;
use crate::context::RenderContext;
use crate::manager::TextureManager;
use crate::texture::{BaseTextureId, TextureStore};

/// A single draw command in the render plan.
///
/// Items are produced in paint order, matching the scene tree's child
/// order.
#[derive(Clone, Copy, Debug)]
pub struct RenderItem {
    /// The node this item originates from.
    pub node: NodeId,
    /// The texture region to draw.
    pub texture: TextureRef,
    /// Cached world matrix at plan time.
    pub world: Matrix,
    /// Alpha composed through the ancestry.
    pub world_alpha: f64,
}

/// An ordered list of draw commands for a single frame.
#[derive(Clone, Debug, Default)]
pub struct RenderPlan {
    /// Draw items in paint order.
    pub items: Vec<RenderItem>,
}

impl RenderPlan {
    /// Creates an empty render plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the plan for reuse.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Counts produced by [`ensure_resident`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResidencyStats {
    /// Distinct base textures the plan references.
    pub textures: u32,
    /// How many of them required a GPU upload.
    pub uploads: u32,
}

/// Collects the draw items of `root`'s subtree into `plan`, in paint
/// order.
///
/// Invisible subtrees are skipped whole. Non-renderable nodes and mask
/// shapes are traversed for their children but contribute no item of
/// their own.
///
/// # Panics
///
/// Panics if the handle is stale.
pub fn build_plan(store: &SceneStore, root: NodeId, plan: &mut RenderPlan) {
    collect(store, root, plan);
}

fn collect(store: &SceneStore, id: NodeId, plan: &mut RenderPlan) {
    if !store.visible(id) {
        return;
    }
    if store.renderable(id) && !store.is_mask(id) {
        if let Some(content) = store.content(id) {
            plan.items.push(RenderItem {
                node: id,
                texture: content.texture(),
                world: *store.transform(id).world(),
                world_alpha: store.world_alpha(id),
            });
        }
    }
    for child in store.children(id) {
        collect(store, child, plan);
    }
}

/// Makes every texture the plan references resident on the manager's
/// context.
///
/// Pending pixel sources are polled once, so textures that finished
/// loading since the last frame come resident now; sources still pending
/// are skipped silently and picked up on a later frame.
pub fn ensure_resident<C: RenderContext>(
    manager: &mut TextureManager<C>,
    textures: &mut TextureStore,
    cache: &ResourceCache,
    plan: &RenderPlan,
) -> ResidencyStats {
    let mut bases: Vec<BaseTextureId> = Vec::new();
    for item in &plan.items {
        let base = cache.texture(item.texture).base;
        if !bases.contains(&base) {
            bases.push(base);
        }
    }

    let mut stats = ResidencyStats {
        textures: bases.len() as u32,
        uploads: 0,
    };
    for base in bases {
        let _ = textures.get_mut(base).poll_source();
        if let Some(update) = manager.update_texture(textures, base, None) {
            if update.uploaded {
                stats.uploads += 1;
            }
        }
    }
    stats
}

/// Runs one full frame: transform pass, bounds pass, plan build, and
/// texture residency.
///
/// The caller hands the resulting plan to its backend; what happens
/// beyond residency (pipeline state, actual draws, presentation) is the
/// backend's business.
///
/// # Panics
///
/// Panics if the root handle is stale.
pub fn render_frame<C: RenderContext>(
    scene: &mut SceneStore,
    root: NodeId,
    cache: &ResourceCache,
    textures: &mut TextureStore,
    manager: &mut TextureManager<C>,
    plan: &mut RenderPlan,
    tracer: &mut Tracer<'_>,
) {
    scene.update_transforms(root, tracer);
    scene.calculate_bounds(root, tracer);

    plan.clear();
    build_plan(scene, root, plan);
    tracer.plan(&PlanEvent {
        items: plan.items.len() as u32,
    });

    let stats = ensure_resident(manager, textures, cache, plan);
    tracer.residency(&ResidencyEvent {
        textures: stats.textures,
        uploads: stats.uploads,
    });
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use core::cell::Cell;

    use kurbo::Rect;

    use strata_core::node::Content;

    use crate::context::ScaleMode;
    use crate::context::recording::{Op, RecordingContext};
    use crate::texture::Texture;
    use crate::texture::tests::FakeSource;

    use super::*;

    struct Fixture {
        scene: SceneStore,
        cache: ResourceCache,
        textures: TextureStore,
        manager: TextureManager<RecordingContext>,
        plan: RenderPlan,
        root: NodeId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut scene = SceneStore::new();
            let root = scene.create_node();
            Self {
                scene,
                cache: ResourceCache::new(),
                textures: TextureStore::new(),
                manager: TextureManager::new(RecordingContext::new(1)),
                plan: RenderPlan::new(),
                root,
            }
        }

        fn texture(&mut self, key: &str) -> TextureRef {
            let base = self
                .cache
                .get_or_create_base(&mut self.textures, key, ScaleMode::Linear, || {
                    Box::new(FakeSource::loaded(16, 16))
                });
            self.cache
                .register(Texture::new(base, Rect::new(0.0, 0.0, 16.0, 16.0)))
        }

        fn sprite(&mut self, parent: NodeId, texture: TextureRef) -> NodeId {
            let id = self.scene.create_node();
            self.scene
                .set_content(id, Some(Content::image(texture, 16.0, 16.0)));
            self.scene.add_child(parent, id);
            id
        }

        fn frame(&mut self) {
            let mut tracer = Tracer::none();
            render_frame(
                &mut self.scene,
                self.root,
                &self.cache,
                &mut self.textures,
                &mut self.manager,
                &mut self.plan,
                &mut tracer,
            );
        }
    }

    #[test]
    fn plan_lists_content_nodes_in_paint_order() {
        let mut fx = Fixture::new();
        let tex = fx.texture("atlas.png");
        let root = fx.root;
        let a = fx.sprite(root, tex);
        let b = fx.sprite(root, tex);
        fx.scene.swap_children(root, a, b);
        fx.frame();

        let nodes: Vec<NodeId> = fx.plan.items.iter().map(|item| item.node).collect();
        assert_eq!(nodes, &[b, a]);
    }

    #[test]
    fn plan_skips_invisible_subtrees_and_masks() {
        let mut fx = Fixture::new();
        let tex = fx.texture("atlas.png");
        let root = fx.root;
        let shown = fx.sprite(root, tex);
        let hidden = fx.sprite(root, tex);
        let shape = fx.sprite(root, tex);
        fx.scene.set_visible(hidden, false);
        fx.scene.set_mask(shown, Some(shape));
        fx.frame();

        let nodes: Vec<NodeId> = fx.plan.items.iter().map(|item| item.node).collect();
        assert_eq!(nodes, &[shown]);
    }

    #[test]
    fn plan_items_carry_world_state() {
        let mut fx = Fixture::new();
        let tex = fx.texture("atlas.png");
        let root = fx.root;
        let sprite = fx.sprite(root, tex);
        fx.scene.transform_mut(sprite).set_position(30.0, 40.0);
        fx.scene.set_alpha(sprite, 0.5);
        fx.frame();

        let item = &fx.plan.items[0];
        assert_eq!((item.world.tx, item.world.ty), (30.0, 40.0));
        assert!((item.world_alpha - 0.5).abs() < 1e-12);
    }

    #[test]
    fn residency_is_idempotent_across_frames() {
        let mut fx = Fixture::new();
        let tex = fx.texture("atlas.png");
        let root = fx.root;
        let _ = fx.sprite(root, tex);
        let _ = fx.sprite(root, tex);

        fx.frame();
        fx.frame();
        fx.frame();

        let ctx = fx.manager.context_mut().unwrap();
        assert_eq!(ctx.count(|op| matches!(op, Op::CreateTexture(_))), 1);
        assert_eq!(ctx.count(|op| matches!(op, Op::UploadTexture { .. })), 1);
    }

    #[test]
    fn pending_texture_arrives_on_a_later_frame() {
        let mut fx = Fixture::new();
        let ready = Rc::new(Cell::new(false));
        let base = fx.textures.create(
            Box::new(FakeSource::pending(16, 16, ready.clone())),
            ScaleMode::Linear,
        );
        let tex = fx
            .cache
            .register(Texture::new(base, Rect::new(0.0, 0.0, 16.0, 16.0)));
        let root = fx.root;
        let _ = fx.sprite(root, tex);

        fx.frame();
        assert_eq!(
            fx.manager
                .context_mut()
                .unwrap()
                .count(|op| matches!(op, Op::UploadTexture { .. })),
            0
        );

        ready.set(true);
        fx.frame();
        assert_eq!(
            fx.manager
                .context_mut()
                .unwrap()
                .count(|op| matches!(op, Op::UploadTexture { .. })),
            1
        );
    }

    #[cfg(feature = "trace")]
    #[test]
    fn frame_reports_plan_and_residency() {
        use strata_core::trace::TraceSink;

        #[derive(Default)]
        struct Sink {
            items: u32,
            textures: u32,
            uploads: u32,
        }
        impl TraceSink for Sink {
            fn on_plan(&mut self, e: &PlanEvent) {
                self.items = e.items;
            }
            fn on_residency(&mut self, e: &ResidencyEvent) {
                self.textures = e.textures;
                self.uploads = e.uploads;
            }
        }

        let mut fx = Fixture::new();
        let tex = fx.texture("atlas.png");
        let root = fx.root;
        let _ = fx.sprite(root, tex);
        let _ = fx.sprite(root, tex);

        let mut sink = Sink::default();
        let mut tracer = Tracer::new(&mut sink);
        render_frame(
            &mut fx.scene,
            fx.root,
            &fx.cache,
            &mut fx.textures,
            &mut fx.manager,
            &mut fx.plan,
            &mut tracer,
        );
        drop(tracer);
        assert_eq!(sink.items, 2);
        assert_eq!(sink.textures, 1);
        assert_eq!(sink.uploads, 1);
    }
}
