/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Node - a single key/value entry of the tree, with its links and cache.

use crate::arena::{NodeArena, NodeIndex};
use crate::cache::NodeCache;

/// A node of an [`AugmentedTree`](crate::AugmentedTree).
///
/// Children are referenced by [`NodeIndex`] into the tree's arena. The parent
/// link is a plain index too; it is only used to walk upwards after a
/// structural change.
#[derive(Debug)]
pub struct Node<K, V, R> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) parent: Option<NodeIndex>,
    pub(crate) left: Option<NodeIndex>,
    pub(crate) right: Option<NodeIndex>,
    /// Height of the subtree rooted here. A leaf has height 1.
    pub(crate) height: u32,
    /// Lazily built aggregate cache. `None` means "nothing cached".
    pub(crate) cache: Option<NodeCache<R>>,
}

impl<K, V, R> Node<K, V, R> {
    pub(crate) const fn leaf(key: K, value: V, parent: Option<NodeIndex>) -> Self {
        Self {
            key,
            value,
            parent,
            left: None,
            right: None,
            height: 1,
            cache: None,
        }
    }

    /// The node's key.
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// The node's value.
    pub const fn value(&self) -> &V {
        &self.value
    }

    /// Index of the parent node, `None` for the root.
    pub const fn parent_index(&self) -> Option<NodeIndex> {
        self.parent
    }

    /// Index of the left child.
    pub const fn left_index(&self) -> Option<NodeIndex> {
        self.left
    }

    /// Index of the right child.
    pub const fn right_index(&self) -> Option<NodeIndex> {
        self.right
    }

    /// Height of the subtree rooted at this node.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Returns true if this node has no children.
    pub const fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Returns true if this node currently holds an aggregate cache,
    /// regardless of which slots are valid.
    pub const fn has_cache(&self) -> bool {
        self.cache.is_some()
    }

    pub(crate) fn invalidate(&mut self) {
        self.cache = None;
    }
}

/// Height of an optional subtree; an absent child has height 0.
pub(crate) fn height_of<K, V, R>(nodes: &NodeArena<Node<K, V, R>>, idx: Option<NodeIndex>) -> u32 {
    idx.map_or(0, |idx| nodes[idx].height)
}

/// `height(left) - height(right)` for the node at `idx`.
pub(crate) fn balance_factor<K, V, R>(nodes: &NodeArena<Node<K, V, R>>, idx: NodeIndex) -> i64 {
    let node = &nodes[idx];
    i64::from(height_of(nodes, node.left)) - i64::from(height_of(nodes, node.right))
}

/// Recompute the height of the node at `idx` from its children and drop its
/// cache, since whatever changed below it also changed its aggregate.
pub(crate) fn refresh<K, V, R>(nodes: &mut NodeArena<Node<K, V, R>>, idx: NodeIndex) {
    let (left, right) = (nodes[idx].left, nodes[idx].right);
    let height = height_of(nodes, left).max(height_of(nodes, right)) + 1;
    let node = &mut nodes[idx];
    node.invalidate();
    node.height = height;
}
