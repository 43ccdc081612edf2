/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! AugmentedTree - An AVL-balanced ordered map with cached, range-queryable aggregates.
//!
//! Callers register any number of augmentations on a tree. Each augmentation is
//! described by three functions:
//!
//! - `base_case(key, value)` gives the aggregate of a single entry,
//! - `compute(left, right)` combines the aggregates of two adjacent key runs,
//! - `compare(a, b)` tells whether two aggregates are equal.
//!
//! The tree can then answer "what is the aggregate over all keys", "over all
//! keys below / above a pivot" and "over all keys in a range" in O(log n) node
//! visits once the caches are warm.
//!
//! # Overview
//!
//! - AVL balancing keeps the height within `1.44 log2(n)`.
//! - Whole-subtree aggregates are computed lazily and cached per node, one slot
//!   per registered augmentation.
//! - A structural change drops the caches of every node on the path to the
//!   root; nothing else is touched.
//! - Registering or unregistering an augmentation never discards the warm
//!   caches of the others; node caches are repacked lazily on their next visit.
//! - Aggregates are always folded in key order, so `compute` only needs to be
//!   associative, not commutative.
//!
//! # Example
//!
//! ```
//! use augmented_tree::{AugmentedTree, Relation, builtin::{Count, MaxValue}};
//!
//! let mut tree: AugmentedTree<u32, u32, u32> = AugmentedTree::new();
//! let max = tree.register(MaxValue);
//! for (key, value) in [(1, 40), (2, 10), (3, 30), (4, 20)] {
//!     tree.insert(key, value);
//! }
//!
//! assert_eq!(tree.aggregate_all(max).payload(), Some(&40));
//! assert_eq!(tree.aggregate_cut(max, &2, Relation::Greater).payload(), Some(&30));
//! assert_eq!(tree.aggregate_range(max, &2, true, &4, false).len(), 2);
//!
//! let mut sizes: AugmentedTree<u32, (), usize> = AugmentedTree::new();
//! let count = sizes.register(Count);
//! sizes.insert(7, ());
//! assert_eq!(sizes.aggregate_ge(count, &5).payload(), Some(&1));
//! ```

mod arena;
mod augmentation;
pub mod builtin;
mod cache;
pub mod debug;
mod iter;
mod node;
mod registry;
mod tree;

pub use arena::NodeIndex;
pub use augmentation::{Augmentation, AugmentationId, AugmentationResult, FnAugmentation};
pub use iter::Iter;
pub use node::Node;
pub use registry::AugmentationRegistry;
pub use tree::{AugmentedTree, Relation, TreeBuilder};

/// Whether this build re-checks the structural and cache invariants after
/// every mutation and query (the `unittest` feature).
pub const INVARIANT_CHECKS: bool = cfg!(all(feature = "unittest", not(miri)));
