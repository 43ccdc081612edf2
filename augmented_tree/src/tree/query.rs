/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Read path: aggregate queries.
//!
//! Every query is a recursive descent that folds per-entry aggregates in key
//! order. Once the descent reaches a subtree that lies entirely inside the
//! queried region, it switches to the whole-subtree aggregate, which is
//! memoized in the node's cache. Only nodes along the region's boundary are
//! folded afresh, so a warm query touches O(height) nodes.

use std::cmp::Ordering;
use std::ops::{Bound, RangeBounds};

use super::AugmentedTree;
use crate::arena::{NodeArena, NodeIndex};
use crate::augmentation::{Augmentation, AugmentationId, AugmentationResult};
use crate::cache::{CachedAggregate, NodeCache};
use crate::node::Node;
use crate::registry::AugmentationRegistry;

/// The side of a pivot selected by a cut query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Keys strictly less than the pivot.
    Less,
    /// Keys less than or equal to the pivot.
    LessEqual,
    /// Keys greater than or equal to the pivot.
    GreaterEqual,
    /// Keys strictly greater than the pivot.
    Greater,
}

impl Relation {
    /// Whether a key comparing `key_vs_pivot` against the pivot is selected.
    pub const fn admits(self, key_vs_pivot: Ordering) -> bool {
        match self {
            Self::Less => key_vs_pivot.is_lt(),
            Self::LessEqual => key_vs_pivot.is_le(),
            Self::GreaterEqual => key_vs_pivot.is_ge(),
            Self::Greater => key_vs_pivot.is_gt(),
        }
    }

    /// The region lies below the pivot, so the left child is the one leading
    /// into it.
    const fn is_below(self) -> bool {
        matches!(self, Self::Less | Self::LessEqual)
    }

    const fn is_inclusive(self) -> bool {
        matches!(self, Self::LessEqual | Self::GreaterEqual)
    }
}

/// Number of folded entries and their aggregate. `None` means no entries.
type Partial<R> = Option<(usize, R)>;

/// Two-sided key range with per-end inclusivity. `low < high` always holds.
struct KeyRange<'k, K> {
    low: &'k K,
    low_inclusive: bool,
    high: &'k K,
    high_inclusive: bool,
}

/// Everything a recursive query needs, borrowed out of the tree so the node
/// caches can be filled while the augmentation is in use.
struct Query<'a, K, V, R> {
    nodes: &'a mut NodeArena<Node<K, V, R>>,
    registry: &'a AugmentationRegistry<K, V, R>,
    cmp: &'a dyn Fn(&K, &K) -> Ordering,
    augmentation: &'a dyn Augmentation<K, V, Output = R>,
    aug_id: AugmentationId,
    schema_index: usize,
}

impl<K, V, R: Clone> AugmentedTree<K, V, R> {
    /// Aggregate over every entry of the tree.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not registered.
    pub fn aggregate_all(&mut self, id: AugmentationId) -> AugmentationResult<R> {
        let (root, mut query) = self.query(id);
        let result = AugmentationResult::from_partial(id, root.map(|root| query.subtree(root)));

        #[cfg(all(feature = "unittest", not(miri)))]
        self.check_cache_invariants();

        result
    }

    /// Aggregate over every entry whose key stands in `relation` to `pivot`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not registered.
    pub fn aggregate_cut(
        &mut self,
        id: AugmentationId,
        pivot: &K,
        relation: Relation,
    ) -> AugmentationResult<R> {
        let (root, mut query) = self.query(id);
        let partial = root.and_then(|root| query.cut(root, pivot, relation, false));
        let result = AugmentationResult::from_partial(id, partial);

        #[cfg(all(feature = "unittest", not(miri)))]
        self.check_cache_invariants();

        result
    }

    /// Aggregate over every key `< pivot`.
    pub fn aggregate_lt(&mut self, id: AugmentationId, pivot: &K) -> AugmentationResult<R> {
        self.aggregate_cut(id, pivot, Relation::Less)
    }

    /// Aggregate over every key `<= pivot`.
    pub fn aggregate_le(&mut self, id: AugmentationId, pivot: &K) -> AugmentationResult<R> {
        self.aggregate_cut(id, pivot, Relation::LessEqual)
    }

    /// Aggregate over every key `>= pivot`.
    pub fn aggregate_ge(&mut self, id: AugmentationId, pivot: &K) -> AugmentationResult<R> {
        self.aggregate_cut(id, pivot, Relation::GreaterEqual)
    }

    /// Aggregate over every key `> pivot`.
    pub fn aggregate_gt(&mut self, id: AugmentationId, pivot: &K) -> AugmentationResult<R> {
        self.aggregate_cut(id, pivot, Relation::Greater)
    }

    /// Aggregate over every key between `low` and `high`, each end included
    /// or excluded as requested.
    ///
    /// `low > high` selects nothing. So does `low == high` unless both ends are
    /// inclusive, in which case the query is a point lookup of that key.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not registered.
    pub fn aggregate_range(
        &mut self,
        id: AugmentationId,
        low: &K,
        low_inclusive: bool,
        high: &K,
        high_inclusive: bool,
    ) -> AugmentationResult<R> {
        let (root, mut query) = self.query(id);
        let partial = match (query.cmp)(low, high) {
            Ordering::Greater => None,
            Ordering::Equal if low_inclusive && high_inclusive => {
                query.find(root, low).and_then(|idx| query.base(idx))
            }
            // [x, x), (x, x] and (x, x) are all empty.
            Ordering::Equal => None,
            Ordering::Less => {
                let bounds = KeyRange {
                    low,
                    low_inclusive,
                    high,
                    high_inclusive,
                };
                root.and_then(|root| query.range(root, &bounds, false, false))
            }
        };
        let result = AugmentationResult::from_partial(id, partial);

        #[cfg(all(feature = "unittest", not(miri)))]
        self.check_cache_invariants();

        result
    }

    /// Aggregate over the keys selected by a standard range expression.
    ///
    /// `..` is the whole tree, a one-sided range is a cut, and a two-sided
    /// range follows [`Self::aggregate_range`].
    ///
    /// ```
    /// use augmented_tree::{AugmentedTree, builtin::SumKeys};
    ///
    /// let mut tree: AugmentedTree<u64, (), u64> = AugmentedTree::new();
    /// let sum = tree.register(SumKeys);
    /// for key in 1..=10 {
    ///     tree.insert(key, ());
    /// }
    /// assert_eq!(tree.aggregate_bounds(sum, 3..6).payload(), Some(&12));
    /// assert_eq!(tree.aggregate_bounds(sum, ..=2).payload(), Some(&3));
    /// assert!(tree.aggregate_bounds(sum, 4..4).is_empty());
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `id` is not registered.
    pub fn aggregate_bounds(
        &mut self,
        id: AugmentationId,
        bounds: impl RangeBounds<K>,
    ) -> AugmentationResult<R> {
        match (bounds.start_bound(), bounds.end_bound()) {
            (Bound::Unbounded, Bound::Unbounded) => self.aggregate_all(id),
            (Bound::Included(low), Bound::Unbounded) => {
                self.aggregate_cut(id, low, Relation::GreaterEqual)
            }
            (Bound::Excluded(low), Bound::Unbounded) => {
                self.aggregate_cut(id, low, Relation::Greater)
            }
            (Bound::Unbounded, Bound::Included(high)) => {
                self.aggregate_cut(id, high, Relation::LessEqual)
            }
            (Bound::Unbounded, Bound::Excluded(high)) => {
                self.aggregate_cut(id, high, Relation::Less)
            }
            (low, high) => {
                let (low, low_inclusive) = match low {
                    Bound::Included(low) => (low, true),
                    Bound::Excluded(low) => (low, false),
                    Bound::Unbounded => unreachable!(),
                };
                let (high, high_inclusive) = match high {
                    Bound::Included(high) => (high, true),
                    Bound::Excluded(high) => (high, false),
                    Bound::Unbounded => unreachable!(),
                };
                self.aggregate_range(id, low, low_inclusive, high, high_inclusive)
            }
        }
    }

    /// Split the tree into the pieces a query needs.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not registered: augmentation ids are handles managed
    /// by the caller, so an unknown one is a contract violation.
    fn query(&mut self, id: AugmentationId) -> (Option<NodeIndex>, Query<'_, K, V, R>) {
        let Self {
            root,
            nodes,
            cmp,
            registry,
            ..
        } = self;
        let registry = &*registry;
        let registered = registry
            .get(id)
            .unwrap_or_else(|| panic!("unknown augmentation id {id}"));
        let query = Query {
            nodes,
            registry,
            cmp: &**cmp,
            augmentation: &*registered.augmentation,
            aug_id: id,
            schema_index: registered.schema_index,
        };
        (*root, query)
    }
}

impl<K, V, R: Clone> Query<'_, K, V, R> {
    /// Fold two adjacent partial aggregates, `left` covering smaller keys.
    fn combine(&self, left: Partial<R>, right: Partial<R>) -> Partial<R> {
        match (left, right) {
            (None, right) => right,
            (left, None) => left,
            (Some((left_len, left)), Some((right_len, right))) => Some((
                left_len + right_len,
                self.augmentation.compute(&left, &right),
            )),
        }
    }

    /// Fold the three pieces of a cut step in key order. `better` is the child
    /// on the region's side of the node.
    fn combine_oriented(
        &self,
        relation: Relation,
        better: Partial<R>,
        here: Partial<R>,
        worse: Partial<R>,
    ) -> Partial<R> {
        if relation.is_below() {
            self.combine(self.combine(better, here), worse)
        } else {
            self.combine(self.combine(worse, here), better)
        }
    }

    /// The node holding `key` in the subtree rooted at `root`. Leaves the
    /// caches untouched.
    fn find(&self, root: Option<NodeIndex>, key: &K) -> Option<NodeIndex> {
        let mut current = root;
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

    /// Aggregate of the single entry at `idx`.
    fn base(&self, idx: NodeIndex) -> Partial<R> {
        let node = &self.nodes[idx];
        Some((1, self.augmentation.base_case(&node.key, &node.value)))
    }

    /// The node's cache, created or repacked for the current schema.
    fn cache_mut(&mut self, idx: NodeIndex) -> &mut NodeCache<R> {
        let registry = self.registry;
        let cache = self.nodes[idx]
            .cache
            .get_or_insert_with(|| NodeCache::new(registry));
        cache.sync(registry);
        cache
    }

    /// Whole-subtree aggregate of `idx`, memoized in the node caches.
    fn subtree(&mut self, idx: NodeIndex) -> (usize, R) {
        let schema_index = self.schema_index;
        if let Some(hit) = self.cache_mut(idx).get(schema_index) {
            return (hit.length, hit.payload.clone());
        }

        let (left, right) = (self.nodes[idx].left, self.nodes[idx].right);
        let below = left.map(|left| self.subtree(left));
        let here = self.base(idx);
        let above = right.map(|right| self.subtree(right));
        let (length, payload) = self
            .combine(self.combine(below, here), above)
            .expect("a subtree holds at least its root");

        let owner = self.aug_id;
        self.cache_mut(idx).set(
            schema_index,
            CachedAggregate {
                owner,
                length,
                payload: payload.clone(),
            },
        );
        (length, payload)
    }

    /// Aggregate over the part of `idx`'s subtree standing in `relation` to
    /// `pivot`.
    ///
    /// `good_to_go` means an ancestor already established that the whole
    /// subtree lies inside the region.
    fn cut(&mut self, idx: NodeIndex, pivot: &K, relation: Relation, good_to_go: bool) -> Partial<R> {
        let node = &self.nodes[idx];
        // Orient the comparison so that `Greater` means "inside the region".
        let side = if relation.is_below() {
            (self.cmp)(&node.key, pivot).reverse()
        } else {
            (self.cmp)(&node.key, pivot)
        };
        let (better, worse) = if relation.is_below() {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        match side {
            // Outside: only the better child can still reach into the region.
            Ordering::Less => better.and_then(|better| self.cut(better, pivot, relation, false)),
            // On an exclusive boundary: the node is out, its better child entirely in.
            Ordering::Equal if !relation.is_inclusive() => {
                better.and_then(|better| self.cut(better, pivot, relation, true))
            }
            // On an inclusive boundary: the node and its better child.
            Ordering::Equal => {
                let here = self.base(idx);
                let rest = better.and_then(|better| self.cut(better, pivot, relation, true));
                self.combine_oriented(relation, rest, here, None)
            }
            Ordering::Greater if good_to_go => Some(self.subtree(idx)),
            Ordering::Greater => {
                let here = self.base(idx);
                let inside = better.and_then(|better| self.cut(better, pivot, relation, true));
                let crossing = worse.and_then(|worse| self.cut(worse, pivot, relation, good_to_go));
                self.combine_oriented(relation, inside, here, crossing)
            }
        }
    }

    /// Aggregate over the part of `idx`'s subtree inside `bounds`.
    ///
    /// `good_low` (`good_high`) means an ancestor already established that the
    /// whole subtree lies above the low (below the high) end.
    fn range(
        &mut self,
        idx: NodeIndex,
        bounds: &KeyRange<'_, K>,
        good_low: bool,
        good_high: bool,
    ) -> Partial<R> {
        let (left, right) = (self.nodes[idx].left, self.nodes[idx].right);

        let low = (self.cmp)(&self.nodes[idx].key, bounds.low);
        if low.is_lt() || (low.is_eq() && !bounds.low_inclusive) {
            return right.and_then(|right| self.range(right, bounds, low.is_eq(), good_high));
        }
        let high = (self.cmp)(&self.nodes[idx].key, bounds.high);
        if high.is_gt() || (high.is_eq() && !bounds.high_inclusive) {
            return left.and_then(|left| self.range(left, bounds, good_low, high.is_eq()));
        }

        // The node sits on an inclusive end: only one child can contribute.
        if low.is_eq() {
            let here = self.base(idx);
            let above = right.and_then(|right| self.range(right, bounds, true, good_high));
            return self.combine(here, above);
        }
        if high.is_eq() {
            let below = left.and_then(|left| self.range(left, bounds, good_low, true));
            let here = self.base(idx);
            return self.combine(below, here);
        }

        if good_low && good_high {
            return Some(self.subtree(idx));
        }
        let below = left.and_then(|left| self.range(left, bounds, good_low, true));
        let here = self.base(idx);
        let above = right.and_then(|right| self.range(right, bounds, true, good_high));
        self.combine(self.combine(below, here), above)
    }
}
