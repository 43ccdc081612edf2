/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Debug and introspection utilities for the augmented tree.
//!
//! The dump prints the tree sideways: the right subtree above its parent, the
//! left subtree below, each level indented by two spaces. A node with a single
//! child gets a `   ---` line in place of the missing one, so the shape stays
//! readable. The format is meant for humans and may change.

use std::fmt;

use crate::AugmentedTree;
use crate::arena::NodeIndex;

/// [`Display`](fmt::Display) adapter printing the structure of a tree.
///
/// ```
/// use augmented_tree::{AugmentedTree, debug::DebugDump};
///
/// let mut tree: AugmentedTree<u32, &str, ()> = AugmentedTree::new();
/// tree.insert(2, "b");
/// tree.insert(1, "a");
/// assert_eq!(DebugDump(&tree).to_string(), "   ---\n2: \"b\"\n  1: \"a\"\n");
/// ```
#[derive(Debug)]
pub struct DebugDump<'a, K, V, R>(pub &'a AugmentedTree<K, V, R>);

impl<K: fmt::Debug, V: fmt::Debug, R> fmt::Display for DebugDump<'_, K, V, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.root_index() {
            None => writeln!(f, "---"),
            Some(root) => write_subtree(f, self.0, root, 0),
        }
    }
}

/// Render the structure of `tree` as a string.
pub fn dump<K: fmt::Debug, V: fmt::Debug, R>(tree: &AugmentedTree<K, V, R>) -> String {
    DebugDump(tree).to_string()
}

fn write_subtree<K: fmt::Debug, V: fmt::Debug, R>(
    f: &mut fmt::Formatter<'_>,
    tree: &AugmentedTree<K, V, R>,
    idx: NodeIndex,
    depth: usize,
) -> fmt::Result {
    let node = tree.node(idx);
    let indent = depth * 2;

    match (node.right_index(), node.left_index()) {
        (Some(right), _) => write_subtree(f, tree, right, depth + 1)?,
        (None, Some(_)) => writeln!(f, "{:indent$}   ---", "")?,
        (None, None) => {}
    }
    writeln!(f, "{:indent$}{:?}: {:?}", "", node.key(), node.value())?;
    match (node.left_index(), node.right_index()) {
        (Some(left), _) => write_subtree(f, tree, left, depth + 1),
        (None, Some(_)) => writeln!(f, "{:indent$}   ---", ""),
        (None, None) => Ok(()),
    }
}
