/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/


//! Fold order, checked with a non-commutative augmentation.

use augmented_tree::builtin::KeyList;
use augmented_tree::{AugmentedTree, Relation};
use rstest::rstest;

use crate::helpers::identity_tree;

fn key_list_tree() -> AugmentedTree<i64, i64, Vec<i64>> {
    // Scrambled insertion order so that rotations happen on both sides.
    identity_tree((0..32).map(|i| (i * 13) % 32))
}

#[test]
fn test_whole_tree_lists_keys_ascending() {
    let mut tree = key_list_tree();
    let list = tree.register(KeyList);
    let result = tree.aggregate_all(list);
    assert_eq!(result.payload(), Some(&(0..32).collect::<Vec<_>>()));
}

#[rstest]
#[case::less(Relation::Less, 0..10)]
#[case::less_equal(Relation::LessEqual, 0..11)]
#[case::greater_equal(Relation::GreaterEqual, 10..32)]
#[case::greater(Relation::Greater, 11..32)]
fn test_cut_lists_keys_ascending(#[case] relation: Relation, #[case] expected: std::ops::Range<i64>) {
    let mut tree = key_list_tree();
    let list = tree.register(KeyList);
    // Warm every cache first, then ask for the cut twice.
    tree.aggregate_all(list);
    for _ in 0..2 {
        let result = tree.aggregate_cut(list, &10, relation);
        assert_eq!(result.payload(), Some(&expected.clone().collect::<Vec<_>>()));
    }
}

#[test]
fn test_range_lists_keys_ascending() {
    let mut tree = key_list_tree();
    let list = tree.register(KeyList);

    for (low, high) in [(0, 31), (3, 17), (16, 16), (5, 6), (30, 31)] {
        for (low_inclusive, high_inclusive) in [(true, true), (true, false), (false, true), (false, false)] {
            let expected: Vec<i64> = (low..=high)
                .filter(|&key| (low_inclusive || key != low) && (high_inclusive || key != high))
                .collect();
            let result = tree.aggregate_range(list, &low, low_inclusive, &high, high_inclusive);
            assert_eq!(result.len(), expected.len(), "{low} {low_inclusive} {high} {high_inclusive}");
            if expected.is_empty() {
                assert!(result.payload().is_none());
            } else {
                assert_eq!(result.payload(), Some(&expected));
            }
        }
    }
}

#[test]
fn test_order_survives_churn() {
    let mut tree = key_list_tree();
    let list = tree.register(KeyList);
    tree.aggregate_all(list);

    for key in (0..32).step_by(3) {
        tree.remove(&key);
    }
    for key in [100, -4, 50] {
        tree.insert(key, key);
    }

    let mut expected: Vec<i64> = (0..32).filter(|key| key % 3 != 0).collect();
    expected.insert(0, -4);
    expected.extend([50, 100]);
    assert_eq!(tree.aggregate_all(list).payload(), Some(&expected));
    assert_eq!(
        tree.aggregate_range(list, &1, false, &50, true).payload(),
        Some(&expected[2..expected.len() - 1].to_vec())
    );
}
