// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal signal dispatch for resource lifecycle events.
//!
//! Texture sources load asynchronously and scene content caches against
//! them, so the two sides are decoupled through an [`Emitter`] per resource.
//! This is deliberately not a general event bus: events carry a kind and
//! nothing else, listeners run synchronously on [`emit`](Emitter::emit),
//! and there is no bubbling.

use alloc::boxed::Box;
use alloc::vec::Vec;

/// What happened to the resource that owns the emitter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// Pixel contents changed and any derived GPU state is stale.
    Change,
    /// The source finished loading and dimensions are now valid.
    Complete,
    /// Backing storage was released.
    Unload,
    /// The owner was attached to a parent.
    Added,
    /// The owner was detached from its parent.
    Removed,
}

/// Handle for removing a registered listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListenerId(u32);

struct Listener {
    id: u32,
    once: bool,
    callback: Box<dyn FnMut(EventKind)>,
}

/// A per-resource listener list.
#[derive(Default)]
pub struct Emitter {
    listeners: Vec<Listener>,
    next_id: u32,
}

impl Emitter {
    /// Creates an emitter with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` to run on every emitted event.
    pub fn on(&mut self, callback: impl FnMut(EventKind) + 'static) -> ListenerId {
        self.push(Box::new(callback), false)
    }

    /// Registers `callback` to run once, then be removed.
    pub fn once(&mut self, callback: impl FnMut(EventKind) + 'static) -> ListenerId {
        self.push(Box::new(callback), true)
    }

    /// Removes a listener. Removing an already-removed listener is a no-op.
    pub fn off(&mut self, id: ListenerId) {
        self.listeners.retain(|l| l.id != id.0);
    }

    /// Invokes every listener with `kind`, dropping `once` listeners after
    /// their call.
    pub fn emit(&mut self, kind: EventKind) {
        // Listeners may not re-enter this emitter; taking the list makes
        // that structurally impossible.
        let mut listeners = core::mem::take(&mut self.listeners);
        for l in &mut listeners {
            (l.callback)(kind);
        }
        listeners.retain(|l| !l.once);
        // Listeners registered during dispatch land after the survivors.
        listeners.append(&mut self.listeners);
        self.listeners = listeners;
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listeners are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    fn push(&mut self, callback: Box<dyn FnMut(EventKind)>, once: bool) -> ListenerId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.listeners.push(Listener { id, once, callback });
        ListenerId(id)
    }
}

impl core::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
