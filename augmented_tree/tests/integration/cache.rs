/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/


//! Cache filling, invalidation and schema repacking.

use std::collections::BTreeMap;

use augmented_tree::builtin::{MaxValue, SumValues};
use augmented_tree::{AugmentationId, AugmentedTree, NodeIndex};

use crate::helpers::{fold_range, identity_tree, init_tracing};

/// Index of the node holding `key`.
fn index_of<V, R>(tree: &AugmentedTree<i64, V, R>, key: i64) -> NodeIndex {
    let mut current = tree.root_index();
    while let Some(idx) = current {
        let node = tree.node(idx);
        current = match key.cmp(node.key()) {
            std::cmp::Ordering::Less => node.left_index(),
            std::cmp::Ordering::Greater => node.right_index(),
            std::cmp::Ordering::Equal => return idx,
        };
    }
    panic!("key {key} not in tree");
}

/// Keys whose node holds a cached aggregate for `id`.
fn cached_keys<R>(tree: &AugmentedTree<i64, i64, R>, id: AugmentationId) -> Vec<i64> {
    tree.iter()
        .map(|(key, _)| *key)
        .filter(|key| tree.is_cached(index_of(tree, *key), id))
        .collect()
}

#[test]
fn test_whole_tree_query_fills_every_cache() {
    init_tracing();
    let mut tree: AugmentedTree<i64, i64, i64> = identity_tree(0..15);
    let sum = tree.register(SumValues);
    assert!(cached_keys(&tree, sum).is_empty());

    assert_eq!(tree.aggregate_all(sum).payload(), Some(&105));
    assert_eq!(cached_keys(&tree, sum), (0..15).collect::<Vec<_>>());
}

#[test]
fn test_cut_query_caches_inner_subtrees_only() {
    let mut tree: AugmentedTree<i64, i64, i64> = identity_tree(0..15);
    let sum = tree.register(SumValues);

    // The root holds 7, so everything below it is its left subtree.
    let result = tree.aggregate_lt(sum, &7);
    assert_eq!(result.payload(), Some(&21));
    assert_eq!(result.len(), 7);
    assert_eq!(cached_keys(&tree, sum), (0..7).collect::<Vec<_>>());
}

#[test]
fn test_insert_invalidates_only_the_path() {
    let mut tree: AugmentedTree<i64, i64, i64> = identity_tree(0..15);
    let sum = tree.register(SumValues);
    tree.aggregate_all(sum);

    // Appending past the maximum of a perfect tree needs no rotation.
    tree.insert(15, 15);
    let path = [7, 11, 13, 14, 15];
    let expected: Vec<i64> = (0..16).filter(|key| !path.contains(key)).collect();
    assert_eq!(cached_keys(&tree, sum), expected);

    assert_eq!(tree.aggregate_all(sum).payload(), Some(&120));
    assert_eq!(cached_keys(&tree, sum), (0..16).collect::<Vec<_>>());
}

#[test]
fn test_overwrite_invalidates_the_path() {
    let mut tree: AugmentedTree<i64, i64, i64> = identity_tree(0..15);
    let sum = tree.register(SumValues);
    tree.aggregate_all(sum);

    assert_eq!(tree.insert(0, 100), Some(0));
    let path = [7, 3, 1, 0];
    let expected: Vec<i64> = (0..15).filter(|key| !path.contains(key)).collect();
    assert_eq!(cached_keys(&tree, sum), expected);
    assert_eq!(tree.aggregate_all(sum).payload(), Some(&205));
}

#[test]
fn test_remove_invalidates_and_recomputes() {
    let mut tree: AugmentedTree<i64, i64, i64> = identity_tree(0..40);
    let mut model: BTreeMap<i64, i64> = (0..40).map(|key| (key, key)).collect();
    let sum = tree.register(SumValues);

    for key in [20, 0, 39, 13, 14, 15, 7] {
        tree.aggregate_all(sum);
        tree.remove(&key);
        model.remove(&key);

        let (length, payload) = fold_range(&SumValues, &model, ..);
        let result = tree.aggregate_all(sum);
        assert_eq!(result.len(), length);
        assert_eq!(result.payload(), payload.as_ref());
    }
}

#[test]
fn test_schema_churn_keeps_warm_caches() {
    let mut tree: AugmentedTree<i64, i64, i64> = identity_tree(0..31);
    let max = tree.register(MaxValue);
    let sum = tree.register(SumValues);
    tree.aggregate_all(sum);
    tree.aggregate_all(max);
    let all: Vec<i64> = (0..31).collect();
    assert_eq!(tree.registry().schema_index(sum), Some(1));

    let count = tree.register_fns(
        |_: &i64, _: &i64| 1,
        |a: &i64, b: &i64| a + b,
        |a: &i64, b: &i64| a == b,
    );
    // Moves `sum` down to slot 0 of every cache on the next visit.
    assert!(tree.unregister(max));
    assert_eq!(cached_keys(&tree, sum), all);
    assert!(cached_keys(&tree, max).is_empty());
    assert!(cached_keys(&tree, count).is_empty());

    assert_eq!(tree.aggregate_all(sum).payload(), Some(&465));
    assert_eq!(tree.aggregate_all(count).payload(), Some(&31));
    assert_eq!(cached_keys(&tree, sum), all);
    assert_eq!(cached_keys(&tree, count), all);
    assert_eq!(tree.registry().schema_index(sum), Some(0));
    assert_eq!(tree.registry().schema_index(count), Some(1));
}

#[test]
fn test_unregister_then_register_issues_fresh_id() {
    let mut tree: AugmentedTree<i64, i64, i64> = identity_tree(0..5);
    let first = tree.register(SumValues);
    tree.aggregate_all(first);

    assert!(tree.unregister(first));
    assert!(!tree.unregister(first));
    let second = tree.register(SumValues);
    assert_ne!(first, second);
    assert!(u32::from(second) > u32::from(first));
    assert!(cached_keys(&tree, second).is_empty());
    assert_eq!(tree.aggregate_all(second).payload(), Some(&10));
}

#[test]
#[should_panic(expected = "unknown augmentation id")]
fn test_query_with_unregistered_id_panics() {
    let mut tree: AugmentedTree<i64, i64, i64> = identity_tree(0..5);
    let sum = tree.register(SumValues);
    tree.unregister(sum);
    tree.aggregate_all(sum);
}

#[test]
fn test_results_equal_uses_compare() {
    let mut tree: AugmentedTree<i64, i64, i64> = identity_tree(0..10);
    // Aggregates are considered equal modulo 10.
    let sum = tree.register_fns(
        |_: &i64, v: &i64| *v,
        |a: &i64, b: &i64| a + b,
        |a: &i64, b: &i64| a % 10 == b % 10,
    );

    let low = tree.aggregate_range(sum, &0, true, &4, true);
    let mid = tree.aggregate_range(sum, &2, true, &6, true);
    let shifted = tree.aggregate_range(sum, &1, true, &5, true);
    let shorter = tree.aggregate_range(sum, &1, true, &4, true);
    assert_eq!(low.payload(), Some(&10));
    assert_eq!(mid.payload(), Some(&20));
    assert_eq!(shifted.payload(), Some(&15));
    assert_eq!(shorter.payload(), Some(&10));

    assert!(tree.results_equal(sum, &low, &mid));
    assert!(!tree.results_equal(sum, &low, &shifted));
    // Same payload, different number of entries.
    assert!(!tree.results_equal(sum, &low, &shorter));

    let above = tree.aggregate_gt(sum, &9);
    let below = tree.aggregate_lt(sum, &0);
    assert!(tree.results_equal(sum, &above, &below));
    assert!(!tree.results_equal(sum, &above, &low));
}
