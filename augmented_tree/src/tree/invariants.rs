/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Debug invariant checks for the augmented tree.
//!
//! These checks are gated behind the `unittest` feature flag and run after
//! every mutation (`insert`, `remove`, `clear`) and every query to catch
//! structural violations and stale caches early.

use std::cmp::Ordering;

use super::AugmentedTree;
use crate::arena::NodeIndex;
use crate::augmentation::Augmentation;
use crate::node;

impl<K, V, R> AugmentedTree<K, V, R> {
    /// Verify all structural invariants of the tree, then the caches.
    ///
    /// Panics with a descriptive message if any invariant is violated.
    /// Called automatically after mutations when the `unittest` feature is enabled.
    pub fn check_tree_invariants(&self) {
        if let Some(root) = self.root {
            assert!(
                self.nodes[root].parent.is_none(),
                "root {root:?} has a parent link"
            );
        }
        let reachable = self.check_node_invariants(self.root);
        assert_eq!(
            reachable,
            self.nodes.len(),
            "arena holds {} nodes but only {reachable} are reachable from the root",
            self.nodes.len(),
        );

        // In-order keys must be strictly increasing.
        let mut previous: Option<NodeIndex> = None;
        let mut stack = Vec::new();
        let mut current = self.root;
        while current.is_some() || !stack.is_empty() {
            while let Some(idx) = current {
                stack.push(idx);
                current = self.nodes[idx].left;
            }
            let Some(idx) = stack.pop() else { break };
            if let Some(prev) = previous {
                assert_eq!(
                    (self.cmp)(&self.nodes[prev].key, &self.nodes[idx].key),
                    Ordering::Less,
                    "keys out of order between {prev:?} and {idx:?}",
                );
            }
            previous = Some(idx);
            current = self.nodes[idx].right;
        }

        self.check_cache_invariants();
    }

    /// Check the subtree at `idx` and return its node count.
    fn check_node_invariants(&self, idx: Option<NodeIndex>) -> usize {
        let Some(idx) = idx else {
            return 0;
        };
        let node = &self.nodes[idx];

        for child in [node.left, node.right].into_iter().flatten() {
            assert_eq!(
                self.nodes[child].parent,
                Some(idx),
                "child {child:?} does not point back at its parent {idx:?}",
            );
        }

        let count = 1 + self.check_node_invariants(node.left) + self.check_node_invariants(node.right);

        let left = node::height_of(&self.nodes, node.left);
        let right = node::height_of(&self.nodes, node.right);
        let expected = left.max(right) + 1;
        assert_eq!(
            node.height, expected,
            "height mismatch at node {idx:?}: stored {}, expected {expected} (left={left}, right={right})",
            node.height,
        );

        let bf = node::balance_factor(&self.nodes, idx);
        assert!(
            (-1..=1).contains(&bf),
            "balance factor {bf} at node {idx:?} (left={left}, right={right})",
        );

        count
    }

    /// Assert that every valid cached aggregate equals a from-scratch fold of
    /// its subtree, and that caches built for the current schema keep each
    /// aggregate at its owner's schema index.
    pub fn check_cache_invariants(&self) {
        for (idx, node) in self.nodes.iter() {
            let Some(cache) = &node.cache else {
                continue;
            };
            let current = cache.schema_version() == self.registry.schema_version();
            for (slot, aggregate) in cache.valid_slots() {
                let schema_index = self.registry.schema_index(aggregate.owner);
                if current {
                    assert_eq!(
                        schema_index,
                        Some(slot),
                        "node {idx:?} caches aggregate of {} at slot {slot}",
                        aggregate.owner,
                    );
                }
                // Unregistered owners are dropped at the next repack.
                let Some(registered) = self.registry.get(aggregate.owner) else {
                    continue;
                };
                let augmentation = &*registered.augmentation;
                let (length, payload) = self.fold_subtree(augmentation, idx);
                assert_eq!(
                    aggregate.length, length,
                    "node {idx:?} caches length {} for {} but the subtree holds {length}",
                    aggregate.length, aggregate.owner,
                );
                assert!(
                    augmentation.compare(&aggregate.payload, &payload),
                    "node {idx:?} caches a stale aggregate for {}",
                    aggregate.owner,
                );
            }
        }
    }

    /// Fold `idx`'s subtree without looking at any cache.
    fn fold_subtree(
        &self,
        augmentation: &dyn Augmentation<K, V, Output = R>,
        idx: NodeIndex,
    ) -> (usize, R) {
        let node = &self.nodes[idx];
        let mut length = 1;
        let mut payload = augmentation.base_case(&node.key, &node.value);
        if let Some(left) = node.left {
            let (left_len, left) = self.fold_subtree(augmentation, left);
            length += left_len;
            payload = augmentation.compute(&left, &payload);
        }
        if let Some(right) = node.right {
            let (right_len, right) = self.fold_subtree(augmentation, right);
            length += right_len;
            payload = augmentation.compute(&payload, &right);
        }
        (length, payload)
    }
}
