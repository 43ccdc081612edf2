/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Write path: insertion, overwrite, and AVL balancing.
//!
//! Inserting a new key attaches a leaf, then walks back up to the root
//! refreshing heights, dropping caches and rotating where a node became
//! unbalanced. The same walk ([`AugmentedTree::retrace`]) is used by removal.

use std::cmp::Ordering;

use super::AugmentedTree;
use crate::arena::NodeIndex;
use crate::node::{self, Node};

impl<K, V, R> AugmentedTree<K, V, R> {
    /// Insert `value` under `key`.
    ///
    /// If the key is already present its value is replaced in place and the
    /// previous value is returned; the stored key is kept and `key` is
    /// dropped. Replaced values are not passed to the value release hook.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let previous = self._insert(key, value);

        #[cfg(all(feature = "unittest", not(miri)))]
        self.check_tree_invariants();

        previous
    }

    fn _insert(&mut self, key: K, value: V) -> Option<V> {
        let mut parent = None;
        let mut went_left = false;
        let mut current = self.root;
        while let Some(idx) = current {
            let node = &self.nodes[idx];
            match (self.cmp)(&key, &node.key) {
                Ordering::Less => {
                    current = node.left;
                    went_left = true;
                }
                Ordering::Greater => {
                    current = node.right;
                    went_left = false;
                }
                Ordering::Equal => {
                    let previous = std::mem::replace(&mut self.nodes[idx].value, value);
                    self.invalidate_path(idx);
                    return Some(previous);
                }
            }
            parent = Some(idx);
        }

        let leaf = self.nodes.insert(Node::leaf(key, value, parent));
        match parent {
            None => self.root = Some(leaf),
            Some(parent_idx) if went_left => self.nodes[parent_idx].left = Some(leaf),
            Some(parent_idx) => self.nodes[parent_idx].right = Some(leaf),
        }
        self.retrace(parent);
        None
    }

    /// Drop the cache of `idx` and of every ancestor. Heights are unaffected.
    pub(crate) fn invalidate_path(&mut self, idx: NodeIndex) {
        let mut current = Some(idx);
        while let Some(idx) = current {
            let node = &mut self.nodes[idx];
            node.invalidate();
            current = node.parent;
        }
    }

    /// Walk from `start` up to the root, rebalancing every node on the way.
    ///
    /// There is no early-out once heights stop changing: every ancestor's
    /// subtree changed, so every ancestor's cache has to go.
    pub(crate) fn retrace(&mut self, start: Option<NodeIndex>) {
        let mut current = start;
        while let Some(idx) = current {
            let top = self.rebalance_node(idx);
            current = self.nodes[top].parent;
        }
    }

    /// Refresh `idx` and rotate if it is unbalanced.
    ///
    /// Returns the index of the node now at the top of this subtree, which is
    /// `idx` itself unless a rotation happened.
    ///
    /// # Panics
    ///
    /// Panics if the balance factor is outside `[-2, 2]`: a single child's
    /// height can only have moved by one since the tree was last balanced.
    fn rebalance_node(&mut self, idx: NodeIndex) -> NodeIndex {
        node::refresh(&mut self.nodes, idx);
        let bf = node::balance_factor(&self.nodes, idx);
        assert!(
            (-2..=2).contains(&bf),
            "balance factor {bf} out of range at {idx:?}"
        );
        match bf {
            2 => {
                let left = self.nodes[idx]
                    .left
                    .expect("left-heavy node must have a left child");
                if node::balance_factor(&self.nodes, left) < 0 {
                    self.rotate_left(left);
                }
                self.rotate_right(idx)
            }
            -2 => {
                let right = self.nodes[idx]
                    .right
                    .expect("right-heavy node must have a right child");
                if node::balance_factor(&self.nodes, right) > 0 {
                    self.rotate_right(right);
                }
                self.rotate_left(idx)
            }
            _ => idx,
        }
    }

    /// Rotate the subtree at `idx` to the left: its right child becomes the
    /// subtree top and `idx` becomes that child's left child.
    ///
    /// Returns the new subtree top.
    fn rotate_left(&mut self, idx: NodeIndex) -> NodeIndex {
        let pivot = self.nodes[idx]
            .right
            .expect("cannot rotate left without a right child");
        let inner = self.nodes[pivot].left;
        let parent = self.nodes[idx].parent;

        self.nodes[idx].right = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(idx);
        }
        self.nodes[pivot].parent = parent;
        self.replace_child(parent, idx, Some(pivot));
        self.nodes[pivot].left = Some(idx);
        self.nodes[idx].parent = Some(pivot);

        // Demoted node first: the promoted node's height depends on it.
        node::refresh(&mut self.nodes, idx);
        node::refresh(&mut self.nodes, pivot);
        tracing::trace!(demoted = ?idx, promoted = ?pivot, "rotated left");
        pivot
    }

    /// Mirror image of [`Self::rotate_left`].
    fn rotate_right(&mut self, idx: NodeIndex) -> NodeIndex {
        let pivot = self.nodes[idx]
            .left
            .expect("cannot rotate right without a left child");
        let inner = self.nodes[pivot].right;
        let parent = self.nodes[idx].parent;

        self.nodes[idx].left = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(idx);
        }
        self.nodes[pivot].parent = parent;
        self.replace_child(parent, idx, Some(pivot));
        self.nodes[pivot].right = Some(idx);
        self.nodes[idx].parent = Some(pivot);

        node::refresh(&mut self.nodes, idx);
        node::refresh(&mut self.nodes, pivot);
        tracing::trace!(demoted = ?idx, promoted = ?pivot, "rotated right");
        pivot
    }

    /// Point whichever link of `parent` referenced `old` at `new` instead.
    /// A `None` parent means `old` was the root.
    pub(crate) fn replace_child(
        &mut self,
        parent: Option<NodeIndex>,
        old: NodeIndex,
        new: Option<NodeIndex>,
    ) {
        let Some(parent) = parent else {
            self.root = new;
            return;
        };
        let parent = &mut self.nodes[parent];
        if parent.left == Some(old) {
            parent.left = new;
        } else {
            debug_assert_eq!(parent.right, Some(old), "{old:?} is not a child of its parent");
            parent.right = new;
        }
    }
}
