/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! In-order iteration over the entries of an augmented tree.

use std::fmt;

use crate::AugmentedTree;
use crate::arena::NodeIndex;

/// An iterator over the entries of an [`AugmentedTree`], in ascending key
/// order.
///
/// The traversal is done iteratively using an explicit stack holding the
/// path of nodes whose left subtree has been entered but whose own entry has
/// not been yielded yet.
#[derive(Debug)]
pub struct Iter<'a, K, V, R> {
    /// Reference to the tree (used to resolve node indices).
    tree: &'a AugmentedTree<K, V, R>,
    stack: Vec<NodeIndex>,
    /// Entries not yielded yet.
    remaining: usize,
}

impl<'a, K, V, R> Iter<'a, K, V, R> {
    pub(crate) fn new(tree: &'a AugmentedTree<K, V, R>) -> Self {
        let mut iter = Self {
            tree,
            stack: Vec::with_capacity(tree.height() as usize),
            remaining: tree.len(),
        };
        iter.descend_left(tree.root_index());
        iter
    }

    fn descend_left(&mut self, mut current: Option<NodeIndex>) {
        while let Some(idx) = current {
            self.stack.push(idx);
            current = self.tree.node(idx).left_index();
        }
    }
}

impl<'a, K, V, R> Iterator for Iter<'a, K, V, R> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let node = self.tree.node(idx);
        self.descend_left(node.right_index());
        self.remaining -= 1;
        Some((node.key(), node.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, R> ExactSizeIterator for Iter<'_, K, V, R> {}

impl<K, V, R> std::iter::FusedIterator for Iter<'_, K, V, R> {}

/// Formats the entries of a tree as a map, in key order.
pub(crate) struct DebugEntries<'a, K, V, R>(pub(crate) &'a AugmentedTree<K, V, R>);

impl<K: fmt::Debug, V: fmt::Debug, R> fmt::Debug for DebugEntries<'_, K, V, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}
