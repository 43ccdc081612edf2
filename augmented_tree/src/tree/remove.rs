/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Removal path.
//!
//! A node with two children is never unlinked directly. Its key and value are
//! swapped with those of its in-order predecessor, and the predecessor's node
//! (which has at most one child) is unlinked instead. The removed key and value
//! therefore always leave the tree through the physically removed node, and
//! reach the release hooks exactly once.

use super::AugmentedTree;
use crate::arena::{NodeArena, NodeIndex};
use crate::node::Node;

impl<K, V, R> AugmentedTree<K, V, R> {
    /// Remove `key` from the tree.
    ///
    /// Returns false if the key was not present. The removed key and value are
    /// handed to the release hooks, if any, and dropped otherwise.
    pub fn remove(&mut self, key: &K) -> bool {
        let removed = self._remove(key);

        #[cfg(all(feature = "unittest", not(miri)))]
        self.check_tree_invariants();

        removed
    }

    fn _remove(&mut self, key: &K) -> bool {
        let Some(found) = self.find_node(key) else {
            return false;
        };

        let doomed = match (self.nodes[found].left, self.nodes[found].right) {
            (Some(left), Some(_)) => {
                let predecessor = self.rightmost(left);
                let (target, source) = self.nodes.pair_mut(found, predecessor);
                std::mem::swap(&mut target.key, &mut source.key);
                std::mem::swap(&mut target.value, &mut source.value);
                // `found` now aggregates a different entry.
                target.invalidate();
                predecessor
            }
            _ => found,
        };

        let Node {
            left,
            right,
            parent,
            ..
        } = self.nodes[doomed];
        assert!(
            left.is_none() || right.is_none(),
            "node to unlink must have at most one child"
        );
        let child = left.or(right);
        if let Some(child) = child {
            self.nodes[child].parent = parent;
        }
        self.replace_child(parent, doomed, child);

        let Node { key, value, .. } = self.nodes.remove(doomed);
        self.retrace(parent);
        tracing::trace!(len = self.len(), "removed entry");

        self.release(key, value);
        true
    }

    /// Remove every entry, handing each key and value to the release hooks
    /// in ascending key order.
    pub fn clear(&mut self) {
        let mut order = Vec::with_capacity(self.len());
        let mut current = self.root.map(|root| self.leftmost(root));
        while let Some(idx) = current {
            order.push(idx);
            current = self.successor(idx);
        }

        let entries: Vec<(K, V)> = order
            .into_iter()
            .map(|idx| {
                let Node { key, value, .. } = self.nodes.remove(idx);
                (key, value)
            })
            .collect();
        self.nodes = NodeArena::new();
        self.root = None;

        for (key, value) in entries {
            self.release(key, value);
        }

        #[cfg(all(feature = "unittest", not(miri)))]
        self.check_tree_invariants();
    }

    fn release(&mut self, key: K, value: V) {
        if let Some(hook) = self.key_release.as_mut() {
            hook(key);
        }
        if let Some(hook) = self.value_release.as_mut() {
            hook(value);
        }
    }

    pub(crate) fn leftmost(&self, mut idx: NodeIndex) -> NodeIndex {
        while let Some(left) = self.nodes[idx].left {
            idx = left;
        }
        idx
    }

    pub(crate) fn rightmost(&self, mut idx: NodeIndex) -> NodeIndex {
        while let Some(right) = self.nodes[idx].right {
            idx = right;
        }
        idx
    }

    /// In-order successor of `idx`, following parent links when needed.
    fn successor(&self, idx: NodeIndex) -> Option<NodeIndex> {
        if let Some(right) = self.nodes[idx].right {
            return Some(self.leftmost(right));
        }
        let mut child = idx;
        let mut parent = self.nodes[idx].parent;
        while let Some(p) = parent {
            if self.nodes[p].left == Some(child) {
                return Some(p);
            }
            child = p;
            parent = self.nodes[p].parent;
        }
        None
    }
}
