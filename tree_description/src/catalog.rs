/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/


//! The built-in comparators and augmentations a description can name.
//!
//! Descriptions carry names, never code: decoding maps each name onto one of
//! the variants here, and only those can be built.

use std::cmp::Ordering;
use std::fmt;

use augmented_tree::builtin::{MaxValue, MinValue, SumValues};
use augmented_tree::{AugmentationId, AugmentedTree};

/// The tree type every description builds.
pub type DescribedTree = AugmentedTree<i64, i64, i64>;

/// Key order of a described tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparatorKind {
    /// Ascending keys.
    Natural,
    /// Descending keys.
    Reverse,
}

impl ComparatorKind {
    /// All comparators, in name order.
    pub const ALL: [Self; 2] = [Self::Natural, Self::Reverse];

    /// The name stored in a description.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Natural => "natural",
            Self::Reverse => "reverse",
        }
    }

    /// Look a comparator up by its stored name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// An empty tree ordered by this comparator.
    pub fn build(self) -> DescribedTree {
        match self {
            Self::Natural => AugmentedTree::new(),
            Self::Reverse => AugmentedTree::with_comparator(|a: &i64, b: &i64| -> Ordering { b.cmp(a) }),
        }
    }
}

impl fmt::Display for ComparatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Aggregate over the values of a described tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AugmentationKind {
    /// Sum of the values.
    Sum,
    /// Number of entries.
    Count,
    /// Smallest value.
    Min,
    /// Largest value.
    Max,
}

impl AugmentationKind {
    /// All augmentations, in name order.
    pub const ALL: [Self; 4] = [Self::Count, Self::Max, Self::Min, Self::Sum];

    /// The name stored in a description.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Count => "count",
            Self::Min => "min",
            Self::Max => "max",
        }
    }

    /// Look an augmentation up by its stored name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Register this augmentation on `tree`.
    pub fn register(self, tree: &mut DescribedTree) -> AugmentationId {
        match self {
            Self::Sum => tree.register(SumValues),
            // The count has to share the tree's `i64` aggregate type.
            Self::Count => tree.register_fns(
                |_: &i64, _: &i64| 1,
                |a: &i64, b: &i64| a + b,
                |a: &i64, b: &i64| a == b,
            ),
            Self::Min => tree.register(MinValue),
            Self::Max => tree.register(MaxValue),
        }
    }
}

impl fmt::Display for AugmentationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
