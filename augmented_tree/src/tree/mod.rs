/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Augmented tree implementation.
//!
//! The implementation is split into sub-modules by concern:
//! - [`insert`]: Write path (insert, overwrite, AVL rebalancing)
//! - [`remove`]: Removal path (predecessor substitution, release hooks)
//! - [`query`]: Read path (whole-tree, cut and range aggregates)

mod insert;
#[cfg(all(feature = "unittest", not(miri)))]
mod invariants;
mod query;
mod remove;

pub use query::Relation;

use std::cmp::Ordering;
use std::fmt;

use crate::arena::{NodeArena, NodeIndex};
use crate::augmentation::{Augmentation, AugmentationId, FnAugmentation};
use crate::iter::Iter;
use crate::node::{self, Node};
use crate::registry::{AugmentationRegistry, BoxedAugmentation};

/// Total order over keys.
pub(crate) type Comparator<K> = Box<dyn Fn(&K, &K) -> Ordering>;

/// Hook receiving a key or value that is permanently leaving the tree.
pub(crate) type ReleaseHook<T> = Box<dyn FnMut(T)>;

/// An ordered map backed by an AVL tree, with cached, range-queryable
/// aggregates.
///
/// Every [`Augmentation`] registered on the tree produces an aggregate of type
/// `R`. Aggregates are computed lazily, cached per subtree, and invalidated
/// along the path to the root whenever the tree changes. Queries can ask for
/// the aggregate over the whole tree, over a one-sided cut (see [`Relation`]),
/// or over a range of keys; cached subtree aggregates are reused wherever a
/// subtree lies entirely inside the queried region.
///
/// # Arena Storage
///
/// All nodes are stored in an arena and reference each other by [`NodeIndex`].
/// Parent links are plain indices, so rotations are index reassignments and
/// walking back up after a structural change needs no shared ownership.
///
/// # Example
///
/// ```
/// use augmented_tree::{AugmentedTree, builtin::SumValues};
///
/// let mut tree: AugmentedTree<i64, i64, i64> = AugmentedTree::new();
/// let sum = tree.register(SumValues);
/// for i in 0..30 {
///     tree.insert(i, i);
/// }
///
/// let result = tree.aggregate_range(sum, &7, false, &26, true);
/// assert_eq!(result.payload(), Some(&323));
/// assert_eq!(result.len(), 19);
/// ```
pub struct AugmentedTree<K, V, R> {
    /// Root node index, `None` for an empty tree.
    root: Option<NodeIndex>,
    /// Arena holding all tree nodes.
    nodes: NodeArena<Node<K, V, R>>,
    /// Key order.
    cmp: Comparator<K>,
    /// Registered augmentations and their cache layout.
    registry: AugmentationRegistry<K, V, R>,
    key_release: Option<ReleaseHook<K>>,
    value_release: Option<ReleaseHook<V>>,
}

impl<K: Ord + 'static, V, R> AugmentedTree<K, V, R> {
    /// Create an empty tree ordered by `K`'s [`Ord`] implementation.
    pub fn new() -> Self {
        Self::with_comparator(K::cmp)
    }

    /// Start configuring a tree ordered by `K`'s [`Ord`] implementation.
    pub fn builder() -> TreeBuilder<K, V, R> {
        TreeBuilder::new()
    }
}

impl<K, V, R> AugmentedTree<K, V, R> {
    /// Create an empty tree ordered by `cmp`, which must be a total order.
    pub fn with_comparator(cmp: impl Fn(&K, &K) -> Ordering + 'static) -> Self {
        Self {
            root: None,
            nodes: NodeArena::new(),
            cmp: Box::new(cmp),
            registry: AugmentationRegistry::new(),
            key_release: None,
            value_release: None,
        }
    }

    /// Register an augmentation, returning the id used to query it.
    ///
    /// Existing node caches are not touched; they are repacked for the new
    /// schema the next time a query visits them.
    pub fn register<A>(&mut self, augmentation: A) -> AugmentationId
    where
        A: Augmentation<K, V, Output = R> + 'static,
    {
        self.registry.register(Box::new(augmentation))
    }

    /// Register an augmentation given as its three functions.
    pub fn register_fns<B, C, E>(&mut self, base_case: B, compute: C, compare: E) -> AugmentationId
    where
        B: Fn(&K, &V) -> R + 'static,
        C: Fn(&R, &R) -> R + 'static,
        E: Fn(&R, &R) -> bool + 'static,
        K: 'static,
        V: 'static,
        R: 'static,
    {
        self.register(FnAugmentation::new(base_case, compute, compare))
    }

    /// Unregister an augmentation. Returns false if `id` is unknown.
    ///
    /// Cached aggregates of the remaining augmentations survive.
    pub fn unregister(&mut self, id: AugmentationId) -> bool {
        self.registry.unregister(id)
    }

    /// The augmentations registered on this tree.
    pub const fn registry(&self) -> &AugmentationRegistry<K, V, R> {
        &self.registry
    }

    /// Compare two results of the augmentation `id` using its `compare`.
    ///
    /// Empty results are equal to each other and to nothing else.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not registered.
    pub fn results_equal(
        &self,
        id: AugmentationId,
        a: &crate::AugmentationResult<R>,
        b: &crate::AugmentationResult<R>,
    ) -> bool {
        let registered = self
            .registry
            .get(id)
            .unwrap_or_else(|| panic!("unknown augmentation id {id}"));
        a.len() == b.len()
            && match (a.payload(), b.payload()) {
                (Some(a), Some(b)) => registered.augmentation.compare(a, b),
                (None, None) => true,
                _ => false,
            }
    }

    /// Find the node holding `key`.
    pub(crate) fn find_node(&self, key: &K) -> Option<NodeIndex> {
        let mut current = self.root;
        while let Some(idx) = current {
            let node = &self.nodes[idx];
            current = match (self.cmp)(key, &node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(idx),
            };
        }
        None
    }

    /// The value stored under `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find_node(key).map(|idx| &self.nodes[idx].value)
    }

    /// The value stored under `key`, or `default` if there is none.
    pub fn get_or<'a>(&'a self, key: &K, default: &'a V) -> &'a V {
        self.get(key).unwrap_or(default)
    }

    /// Returns true if `key` is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.find_node(key).is_some()
    }

    /// Number of entries in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree holds no entries.
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree; 0 when empty.
    pub fn height(&self) -> u32 {
        node::height_of(&self.nodes, self.root)
    }

    /// The root node index, `None` for an empty tree.
    pub const fn root_index(&self) -> Option<NodeIndex> {
        self.root
    }

    /// Resolve a [`NodeIndex`] to the node.
    ///
    /// # Panics
    ///
    /// Panics if `idx` does not refer to a node currently in the tree.
    pub fn node(&self, idx: NodeIndex) -> &Node<K, V, R> {
        &self.nodes[idx]
    }

    /// `height(left) - height(right)` for the node at `idx`.
    pub fn balance_factor(&self, idx: NodeIndex) -> i64 {
        node::balance_factor(&self.nodes, idx)
    }

    /// Whether the node at `idx` holds a valid cached aggregate for `id`.
    ///
    /// Aggregates that survived a schema change but have not been relocated
    /// yet count as cached.
    pub fn is_cached(&self, idx: NodeIndex, id: AugmentationId) -> bool {
        self.registry.contains(id)
            && self.nodes[idx]
                .cache
                .as_ref()
                .is_some_and(|cache| cache.holds(id))
    }

    /// In-order iterator over the entries.
    pub fn iter(&self) -> Iter<'_, K, V, R> {
        Iter::new(self)
    }
}

impl<K: Ord + 'static, V, R> Default for AugmentedTree<K, V, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, R> fmt::Debug for AugmentedTree<K, V, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AugmentedTree")
            .field("len", &self.len())
            .field("height", &self.height())
            .field("registry", &self.registry)
            .field("entries", &crate::iter::DebugEntries(self))
            .finish_non_exhaustive()
    }
}

impl<'a, K, V, R> IntoIterator for &'a AugmentedTree<K, V, R> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Builder for an [`AugmentedTree`].
///
/// Collects the comparator, the release hooks and any augmentations to
/// register up front. Augmentations are registered in the order they were
/// added, so the first one gets id 1.
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use augmented_tree::{AugmentedTree, builtin::Count};
///
/// let released = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&released);
/// let mut tree: AugmentedTree<u32, String, usize> = AugmentedTree::builder()
///     .on_value_release(move |value: String| sink.borrow_mut().push(value))
///     .augmentation(Count)
///     .build();
///
/// tree.insert(1, "one".to_owned());
/// tree.remove(&1);
/// assert_eq!(*released.borrow(), ["one"]);
/// ```
pub struct TreeBuilder<K, V, R> {
    cmp: Comparator<K>,
    key_release: Option<ReleaseHook<K>>,
    value_release: Option<ReleaseHook<V>>,
    augmentations: Vec<BoxedAugmentation<K, V, R>>,
}

impl<K: Ord + 'static, V, R> TreeBuilder<K, V, R> {
    /// A builder ordering keys by `K`'s [`Ord`] implementation.
    pub fn new() -> Self {
        Self::with_comparator(K::cmp)
    }
}

impl<K: Ord + 'static, V, R> Default for TreeBuilder<K, V, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, R> TreeBuilder<K, V, R> {
    /// A builder ordering keys by `cmp`, which must be a total order.
    pub fn with_comparator(cmp: impl Fn(&K, &K) -> Ordering + 'static) -> Self {
        Self {
            cmp: Box::new(cmp),
            key_release: None,
            value_release: None,
            augmentations: Vec::new(),
        }
    }

    /// Replace the key order.
    pub fn comparator(mut self, cmp: impl Fn(&K, &K) -> Ordering + 'static) -> Self {
        self.cmp = Box::new(cmp);
        self
    }

    /// Hand every key permanently removed from the tree to `hook`.
    pub fn on_key_release(mut self, hook: impl FnMut(K) + 'static) -> Self {
        self.key_release = Some(Box::new(hook));
        self
    }

    /// Hand every value permanently removed from the tree to `hook`.
    ///
    /// Values replaced by [`AugmentedTree::insert`] are returned to the caller
    /// instead.
    pub fn on_value_release(mut self, hook: impl FnMut(V) + 'static) -> Self {
        self.value_release = Some(Box::new(hook));
        self
    }

    /// Register `augmentation` when the tree is built.
    pub fn augmentation<A>(mut self, augmentation: A) -> Self
    where
        A: Augmentation<K, V, Output = R> + 'static,
    {
        self.augmentations.push(Box::new(augmentation));
        self
    }

    /// Build the tree.
    pub fn build(self) -> AugmentedTree<K, V, R> {
        let mut registry = AugmentationRegistry::new();
        for augmentation in self.augmentations {
            registry.register(augmentation);
        }
        AugmentedTree {
            root: None,
            nodes: NodeArena::new(),
            cmp: self.cmp,
            registry,
            key_release: self.key_release,
            value_release: self.value_release,
        }
    }
}

impl<K, V, R> fmt::Debug for TreeBuilder<K, V, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeBuilder")
            .field("augmentations", &self.augmentations.len())
            .field("key_release", &self.key_release.is_some())
            .field("value_release", &self.value_release.is_some())
            .finish_non_exhaustive()
    }
}
