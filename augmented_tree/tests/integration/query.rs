/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/


//! Whole-tree, cut and range aggregates checked against reference folds.

use std::collections::BTreeMap;
use std::ops::Bound;

use augmented_tree::builtin::{Count, SumKeys, SumValues};
use augmented_tree::{AugmentedTree, Relation};
use rstest::rstest;

use crate::helpers::{fold_cut, fold_range, identity_tree, init_tracing};

/// Keys 0, 3, 6, ..., 57 mapped to `key * 2 + 1`, inserted in a scrambled order.
fn sparse_tree() -> (AugmentedTree<i64, i64, i64>, BTreeMap<i64, i64>) {
    let mut tree = AugmentedTree::new();
    let mut model = BTreeMap::new();
    for i in (0..20).map(|i| (i * 7) % 20) {
        let key = i * 3;
        tree.insert(key, key * 2 + 1);
        model.insert(key, key * 2 + 1);
    }
    (tree, model)
}

#[test]
fn test_empty_tree_queries_are_empty() {
    let mut tree: AugmentedTree<i64, i64, i64> = AugmentedTree::new();
    let sum = tree.register(SumValues);

    let all = tree.aggregate_all(sum);
    assert!(all.is_empty());
    assert_eq!(all.payload(), None);
    assert_eq!(all.aug_id(), sum);
    assert!(tree.aggregate_le(sum, &3).is_empty());
    assert!(tree.aggregate_range(sum, &1, true, &9, true).is_empty());
    assert!(tree.aggregate_range(sum, &1, true, &1, true).is_empty());
}

#[rstest]
fn test_cut_matches_reference(
    #[values(Relation::Less, Relation::LessEqual, Relation::GreaterEqual, Relation::Greater)]
    relation: Relation,
    #[values(-1, 0, 1, 3, 28, 29, 30, 57, 58, 100)] pivot: i64,
) {
    let (mut tree, model) = sparse_tree();
    let sum = tree.register(SumValues);

    // Cold and warm caches must agree.
    for _ in 0..2 {
        let result = tree.aggregate_cut(sum, &pivot, relation);
        let (length, payload) = fold_cut(&SumValues, &model, &pivot, relation);
        assert_eq!(result.len(), length, "{relation:?} {pivot}");
        assert_eq!(result.payload(), payload.as_ref(), "{relation:?} {pivot}");
    }
}

#[test]
fn test_cut_shorthands() {
    let mut tree: AugmentedTree<i64, i64, usize> = identity_tree(0..10);
    let count = tree.register(Count);

    assert_eq!(tree.aggregate_lt(count, &4).len(), 4);
    assert_eq!(tree.aggregate_le(count, &4).len(), 5);
    assert_eq!(tree.aggregate_ge(count, &4).len(), 6);
    assert_eq!(tree.aggregate_gt(count, &4).len(), 5);
    assert_eq!(tree.aggregate_gt(count, &4).payload(), Some(&5));
}

#[rstest]
fn test_range_matches_reference(
    #[values(-5, 0, 2, 3, 27, 30)] low: i64,
    #[values(3, 4, 30, 31, 57, 80)] high: i64,
    #[values(false, true)] low_inclusive: bool,
    #[values(false, true)] high_inclusive: bool,
) {
    let (mut tree, model) = sparse_tree();
    let sum = tree.register(SumValues);

    let lower = if low_inclusive { Bound::Included(low) } else { Bound::Excluded(low) };
    let upper = if high_inclusive { Bound::Included(high) } else { Bound::Excluded(high) };
    let (length, payload) = fold_range(&SumValues, &model, (lower, upper));

    for _ in 0..2 {
        let result = tree.aggregate_range(sum, &low, low_inclusive, &high, high_inclusive);
        assert_eq!(result.len(), length);
        assert_eq!(result.payload(), payload.as_ref());
    }
}

#[rstest]
#[case::singleton(5, true, 5, true, Some(5))]
#[case::excluded_low(5, false, 5, true, None)]
#[case::excluded_high(5, true, 5, false, None)]
#[case::both_excluded(5, false, 5, false, None)]
#[case::inverted(7, false, 3, true, None)]
#[case::inverted_inclusive(7, true, 3, true, None)]
#[case::absent_point(50, true, 50, true, None)]
fn test_degenerate_ranges(
    #[case] low: i64,
    #[case] low_inclusive: bool,
    #[case] high: i64,
    #[case] high_inclusive: bool,
    #[case] expected: Option<i64>,
) {
    let mut tree: AugmentedTree<i64, i64, i64> = identity_tree(0..10);
    let sum = tree.register(SumValues);

    let result = tree.aggregate_range(sum, &low, low_inclusive, &high, high_inclusive);
    assert_eq!(result.payload(), expected.as_ref());
    assert_eq!(result.len(), usize::from(expected.is_some()));
}

#[test]
fn test_point_range_reads_one_entry_without_warming_caches() {
    init_tracing();
    let mut tree: AugmentedTree<i64, i64, i64> = identity_tree(0..10);
    let dropped = tree.register(Count);
    let sum = tree.register(SumValues);
    assert!(tree.unregister(dropped));

    let result = tree.aggregate_range(sum, &4, true, &4, true);
    assert_eq!(result.payload(), Some(&4));
    assert_eq!(result.len(), 1);

    let root = tree.root_index().expect("tree is not empty");
    assert!(!tree.is_cached(root, sum));

    let mut empty: AugmentedTree<i64, i64, i64> = AugmentedTree::new();
    let sum = empty.register(SumValues);
    assert!(empty.aggregate_range(sum, &4, true, &4, true).is_empty());
}

#[test]
#[should_panic(expected = "unknown augmentation id")]
fn test_point_range_with_unregistered_id_panics() {
    let mut tree: AugmentedTree<i64, i64, i64> = identity_tree(0..10);
    let sum = tree.register(SumValues);
    assert!(tree.unregister(sum));
    tree.aggregate_range(sum, &4, true, &4, true);
}

#[test]
fn test_range_scenario_survives_reinsert_and_overwrite() {
    init_tracing();
    let mut tree: AugmentedTree<i64, i64, i64> = identity_tree(0..30);
    let keys = tree.register(SumKeys);
    let values = tree.register(SumValues);
    assert!(tree.height() <= 6);

    let check = |tree: &mut AugmentedTree<i64, i64, i64>, expected_values: i64| {
        let by_keys = tree.aggregate_range(keys, &7, false, &26, true);
        assert_eq!(by_keys.payload(), Some(&323));
        assert_eq!(by_keys.len(), 19);
        let by_values = tree.aggregate_range(values, &7, false, &26, true);
        assert_eq!(by_values.payload(), Some(&expected_values));
        assert_eq!(by_values.len(), 19);
    };

    check(&mut tree, 323);
    assert!(tree.remove(&15));
    assert_eq!(tree.aggregate_range(keys, &7, false, &26, true).len(), 18);
    assert_eq!(tree.insert(15, 20), None);
    check(&mut tree, 328);
    assert_eq!(tree.insert(1, 11), Some(1));
    check(&mut tree, 328);
}

#[test]
fn test_aggregate_bounds() {
    let mut tree: AugmentedTree<i64, i64, i64> = identity_tree(0..10);
    let sum = tree.register(SumKeys);

    assert_eq!(tree.aggregate_bounds(sum, ..).payload(), Some(&45));
    assert_eq!(tree.aggregate_bounds(sum, 5..).payload(), Some(&35));
    assert_eq!(
        tree.aggregate_bounds(sum, (Bound::Excluded(5), Bound::Unbounded)).payload(),
        Some(&30)
    );
    assert_eq!(tree.aggregate_bounds(sum, ..5).payload(), Some(&10));
    assert_eq!(tree.aggregate_bounds(sum, ..=5).payload(), Some(&15));
    assert_eq!(tree.aggregate_bounds(sum, 2..5).payload(), Some(&9));
    assert_eq!(tree.aggregate_bounds(sum, 2..=5).payload(), Some(&14));
    assert_eq!(
        tree.aggregate_bounds(sum, (Bound::Excluded(2), Bound::Excluded(5))).payload(),
        Some(&7)
    );
    assert!(tree.aggregate_bounds(sum, 5..5).is_empty());
    assert_eq!(tree.aggregate_bounds(sum, 5..=5).payload(), Some(&5));
}

#[test]
fn test_queries_after_removals_match_reference() {
    let (mut tree, mut model) = sparse_tree();
    let sum = tree.register(SumValues);
    tree.aggregate_all(sum);

    for key in [27, 0, 57, 30, 33, 3] {
        tree.remove(&key);
        model.remove(&key);
        for pivot in [0, 15, 30, 45] {
            let result = tree.aggregate_ge(sum, &pivot);
            let (length, payload) = fold_cut(&SumValues, &model, &pivot, Relation::GreaterEqual);
            assert_eq!(result.len(), length);
            assert_eq!(result.payload(), payload.as_ref());
        }
        let result = tree.aggregate_range(sum, &10, true, &40, false);
        let (length, payload) = fold_range(&SumValues, &model, 10..40);
        assert_eq!(result.len(), length);
        assert_eq!(result.payload(), payload.as_ref());
    }
}

#[test]
#[should_panic(expected = "unknown augmentation id")]
fn test_range_with_foreign_id_panics() {
    let mut tree: AugmentedTree<i64, i64, i64> = identity_tree(0..3);
    let mut other: AugmentedTree<i64, i64, i64> = AugmentedTree::new();
    other.register(SumValues);
    let second = other.register(SumValues);
    tree.aggregate_range(second, &0, true, &2, true);
}
