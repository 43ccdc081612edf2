/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Augmentation definitions and the results they produce.

use std::fmt;
use std::marker::PhantomData;

/// Stable identifier of a registered augmentation.
///
/// Ids are handed out by [`AugmentedTree::register`](crate::AugmentedTree::register)
/// starting at 1 and are never reused by the same tree, even after the
/// augmentation is unregistered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct AugmentationId(u32);

impl AugmentationId {
    pub(crate) const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for AugmentationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<AugmentationId> for u32 {
    fn from(id: AugmentationId) -> Self {
        id.0
    }
}

/// An aggregate computed bottom-up over the tree.
///
/// `compute` combines two *adjacent* aggregates, `left` covering keys that all
/// sort before the keys covered by `right`. The tree always calls it in key
/// order and never assumes it is commutative, so order-sensitive aggregates
/// (concatenations, first/last, matrix products, ...) are supported. It must be
/// associative.
pub trait Augmentation<K, V> {
    /// The aggregate type.
    type Output;

    /// Aggregate of a single entry.
    fn base_case(&self, key: &K, value: &V) -> Self::Output;

    /// Combine the aggregate of a run of keys with the aggregate of the run
    /// immediately following it.
    fn compute(&self, left: &Self::Output, right: &Self::Output) -> Self::Output;

    /// Whether two aggregates are the same.
    fn compare(&self, a: &Self::Output, b: &Self::Output) -> bool;
}

/// An [`Augmentation`] assembled from three closures.
///
/// # Example
///
/// ```
/// use augmented_tree::{AugmentedTree, FnAugmentation};
///
/// let mut tree: AugmentedTree<u32, u64, u64> = AugmentedTree::new();
/// let max = tree.register(FnAugmentation::new(
///     |_key: &u32, value: &u64| *value,
///     |a: &u64, b: &u64| *a.max(b),
///     |a: &u64, b: &u64| a == b,
/// ));
/// tree.insert(1, 10);
/// tree.insert(2, 30);
/// assert_eq!(tree.aggregate_all(max).payload(), Some(&30));
/// ```
pub struct FnAugmentation<K, V, R, B, C, E> {
    base_case: B,
    compute: C,
    compare: E,
    _marker: PhantomData<fn(&K, &V) -> R>,
}

impl<K, V, R, B, C, E> FnAugmentation<K, V, R, B, C, E>
where
    B: Fn(&K, &V) -> R,
    C: Fn(&R, &R) -> R,
    E: Fn(&R, &R) -> bool,
{
    /// Bundle `base_case`, `compute` and `compare` into an augmentation.
    pub const fn new(base_case: B, compute: C, compare: E) -> Self {
        Self {
            base_case,
            compute,
            compare,
            _marker: PhantomData,
        }
    }
}

impl<K, V, R, B, C, E> Augmentation<K, V> for FnAugmentation<K, V, R, B, C, E>
where
    B: Fn(&K, &V) -> R,
    C: Fn(&R, &R) -> R,
    E: Fn(&R, &R) -> bool,
{
    type Output = R;

    fn base_case(&self, key: &K, value: &V) -> R {
        (self.base_case)(key, value)
    }

    fn compute(&self, left: &R, right: &R) -> R {
        (self.compute)(left, right)
    }

    fn compare(&self, a: &R, b: &R) -> bool {
        (self.compare)(a, b)
    }
}

impl<K, V, R, B, C, E> fmt::Debug for FnAugmentation<K, V, R, B, C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAugmentation").finish_non_exhaustive()
    }
}

/// The answer to an aggregate query.
///
/// `length` counts the entries folded into the aggregate. A query whose region
/// holds no entries yields `length == 0` and no payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentationResult<R> {
    aug_id: AugmentationId,
    length: usize,
    payload: Option<R>,
}

impl<R> AugmentationResult<R> {
    pub(crate) const fn empty(aug_id: AugmentationId) -> Self {
        Self {
            aug_id,
            length: 0,
            payload: None,
        }
    }

    pub(crate) fn from_partial(aug_id: AugmentationId, partial: Option<(usize, R)>) -> Self {
        match partial {
            Some((length, payload)) => Self {
                aug_id,
                length,
                payload: Some(payload),
            },
            None => Self::empty(aug_id),
        }
    }

    /// The augmentation that produced this result.
    pub const fn aug_id(&self) -> AugmentationId {
        self.aug_id
    }

    /// Number of entries folded into the aggregate.
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns true if no entry matched the query.
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The aggregate, `None` when no entry matched.
    pub const fn payload(&self) -> Option<&R> {
        self.payload.as_ref()
    }

    /// Consume the result, returning the aggregate.
    pub fn into_payload(self) -> Option<R> {
        self.payload
    }
}
