/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Ready-made augmentations.

use std::ops::Add;

use crate::Augmentation;

/// Sum of the values.
#[derive(Debug, Clone, Copy, Default)]
pub struct SumValues;

impl<K, V> Augmentation<K, V> for SumValues
where
    V: Add<Output = V> + Clone + PartialEq,
{
    type Output = V;

    fn base_case(&self, _key: &K, value: &V) -> V {
        value.clone()
    }

    fn compute(&self, left: &V, right: &V) -> V {
        left.clone() + right.clone()
    }

    fn compare(&self, a: &V, b: &V) -> bool {
        a == b
    }
}

/// Sum of the keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct SumKeys;

impl<K, V> Augmentation<K, V> for SumKeys
where
    K: Add<Output = K> + Clone + PartialEq,
{
    type Output = K;

    fn base_case(&self, key: &K, _value: &V) -> K {
        key.clone()
    }

    fn compute(&self, left: &K, right: &K) -> K {
        left.clone() + right.clone()
    }

    fn compare(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Number of entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct Count;

impl<K, V> Augmentation<K, V> for Count {
    type Output = usize;

    fn base_case(&self, _key: &K, _value: &V) -> usize {
        1
    }

    fn compute(&self, left: &usize, right: &usize) -> usize {
        left + right
    }

    fn compare(&self, a: &usize, b: &usize) -> bool {
        a == b
    }
}

/// Smallest value.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinValue;

impl<K, V: Ord + Clone> Augmentation<K, V> for MinValue {
    type Output = V;

    fn base_case(&self, _key: &K, value: &V) -> V {
        value.clone()
    }

    fn compute(&self, left: &V, right: &V) -> V {
        left.min(right).clone()
    }

    fn compare(&self, a: &V, b: &V) -> bool {
        a == b
    }
}

/// Largest value.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxValue;

impl<K, V: Ord + Clone> Augmentation<K, V> for MaxValue {
    type Output = V;

    fn base_case(&self, _key: &K, value: &V) -> V {
        value.clone()
    }

    fn compute(&self, left: &V, right: &V) -> V {
        left.max(right).clone()
    }

    fn compare(&self, a: &V, b: &V) -> bool {
        a == b
    }
}

/// The keys themselves, in ascending order.
///
/// Concatenation is not commutative, which makes this the reference check for
/// fold order; it is also handy for debugging a query's region. Every cached
/// aggregate holds a copy of its subtree's keys, so memory grows with
/// `n log n`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyList;

impl<K: Clone + PartialEq, V> Augmentation<K, V> for KeyList {
    type Output = Vec<K>;

    fn base_case(&self, key: &K, _value: &V) -> Vec<K> {
        vec![key.clone()]
    }

    fn compute(&self, left: &Vec<K>, right: &Vec<K>) -> Vec<K> {
        let mut keys = Vec::with_capacity(left.len() + right.len());
        keys.extend_from_slice(left);
        keys.extend_from_slice(right);
        keys
    }

    fn compare(&self, a: &Vec<K>, b: &Vec<K>) -> bool {
        a == b
    }
}
