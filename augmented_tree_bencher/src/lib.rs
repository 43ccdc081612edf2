/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Supporting functions for benchmarking augmented tree operations.

use augmented_tree::AugmentedTree;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Tree sizes every group is measured at.
pub const SIZES: &[u64] = &[1_000, 10_000, 100_000];

/// Keys `0..n` in a reproducible random order.
pub fn shuffled_keys(n: u64) -> Vec<u64> {
    let mut keys: Vec<u64> = (0..n).collect();
    keys.shuffle(&mut StdRng::seed_from_u64(0xA5A5));
    keys
}

/// A tree mapping every key to itself, inserted in the given order.
pub fn build(keys: &[u64]) -> AugmentedTree<u64, u64, u64> {
    let mut tree = AugmentedTree::new();
    for &key in keys {
        tree.insert(key, key);
    }
    tree
}

/// Refuse to measure a build that re-checks invariants after every operation.
///
/// Cargo passes `--bench` only when measuring; a `cargo test --all-targets`
/// run that happens to enable the checks is left alone.
///
/// # Panics
///
/// Panics if `invariant_checks` is set and `args` contains `--bench`.
pub fn ensure_measurable(invariant_checks: bool, mut args: impl Iterator<Item = String>) {
    if invariant_checks && args.any(|arg| arg == "--bench") {
        panic!(
            "augmented_tree was built with the `unittest` feature; \
             run `cargo bench -p augmented_tree_bencher` to measure without invariant checks"
        );
    }
}
