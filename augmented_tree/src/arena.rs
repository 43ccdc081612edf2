/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Arena storage for tree nodes.
//!
//! Nodes refer to each other through [`NodeIndex`] handles instead of boxed
//! pointers, so a rotation is a handful of index reassignments. Removed slots
//! are versioned by the underlying [`SlotMap`]: a stale index (one pointing
//! at a removed node) is detected instead of resolving to whichever node
//! reused the slot.

use std::ops::{Index, IndexMut};

use slotmap::{DefaultKey, SlotMap};

/// Index into the node arena.
///
/// Wraps a [`slotmap::DefaultKey`]. This is a lightweight handle that is
/// stable across mutations to other slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct NodeIndex(DefaultKey);

impl NodeIndex {
    /// Return the underlying [`DefaultKey`].
    pub const fn key(self) -> DefaultKey {
        self.0
    }
}

impl From<DefaultKey> for NodeIndex {
    fn from(key: DefaultKey) -> Self {
        Self(key)
    }
}

/// Arena storage for tree nodes.
///
/// Newtype wrapper around [`SlotMap`] that indexes by [`NodeIndex`] instead of
/// a raw key.
#[derive(Debug)]
pub(crate) struct NodeArena<T> {
    nodes: SlotMap<DefaultKey, T>,
}

impl<T> NodeArena<T> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: SlotMap::new(),
        }
    }

    /// Number of nodes currently stored.
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Store `node`, reusing a vacant slot when there is one.
    pub(crate) fn insert(&mut self, node: T) -> NodeIndex {
        NodeIndex(self.nodes.insert(node))
    }

    /// Remove the node at `idx` and return it.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is stale.
    pub(crate) fn remove(&mut self, idx: NodeIndex) -> T {
        self.nodes
            .remove(idx.key())
            .unwrap_or_else(|| panic!("stale node index {idx:?}"))
    }

    pub(crate) fn get(&self, idx: NodeIndex) -> Option<&T> {
        self.nodes.get(idx.key())
    }

    pub(crate) fn get_mut(&mut self, idx: NodeIndex) -> Option<&mut T> {
        self.nodes.get_mut(idx.key())
    }

    /// Mutable references to two distinct nodes at once.
    ///
    /// # Panics
    ///
    /// Panics if `a == b` or either index is stale.
    pub(crate) fn pair_mut(&mut self, a: NodeIndex, b: NodeIndex) -> (&mut T, &mut T) {
        let [first, second] = self
            .nodes
            .get_disjoint_mut([a.key(), b.key()])
            .unwrap_or_else(|| panic!("pair_mut needs two distinct live nodes, got {a:?} and {b:?}"));
        (first, second)
    }

    /// Iterate over every stored node.
    #[cfg_attr(
        not(all(feature = "unittest", not(miri))),
        expect(dead_code, reason = "used by invariant checks in unittest feature")
    )]
    pub(crate) fn iter(&self) -> impl Iterator<Item = (NodeIndex, &T)> {
        self.nodes.iter().map(|(key, node)| (NodeIndex(key), node))
    }
}

impl<T> Default for NodeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<NodeIndex> for NodeArena<T> {
    type Output = T;

    fn index(&self, idx: NodeIndex) -> &Self::Output {
        &self.nodes[idx.key()]
    }
}

impl<T> IndexMut<NodeIndex> for NodeArena<T> {
    fn index_mut(&mut self, idx: NodeIndex) -> &mut Self::Output {
        &mut self.nodes[idx.key()]
    }
}
