// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use alloc::vec::Vec;

use super::id::NodeId;
use super::store::SceneStore;

/// An iterator over the direct children of a node, in paint order.
///
/// Created by [`SceneStore::children`].
#[derive(Debug)]
pub struct Children<'a> {
    store: &'a SceneStore,
    slots: core::slice::Iter<'a, u32>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        self.slots.next().map(|&idx| self.store.id_at(idx))
    }
}

impl ExactSizeIterator for Children<'_> {
    fn len(&self) -> usize {
        self.slots.len()
    }
}

/// A depth-first pre-order iterator over a subtree, in paint order.
///
/// Created by [`SceneStore::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    store: &'a SceneStore,
    stack: Vec<u32>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let idx = self.stack.pop()?;
        // Push children reversed so the first child pops first.
        for &c in self.store.children[idx as usize].iter().rev() {
            self.stack.push(c);
        }
        Some(self.store.id_at(idx))
    }
}

impl SceneStore {
    /// Iterates over the direct children of `parent`, in paint order.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn children(&self, parent: NodeId) -> Children<'_> {
        self.validate(parent);
        Children {
            store: self,
            slots: self.children[parent.idx as usize].iter(),
        }
    }

    /// Iterates over `root` and all of its descendants, depth-first in
    /// paint order.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        self.validate(root);
        Descendants {
            store: self,
            stack: alloc::vec![root.idx],
        }
    }
}
