/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/


//! Binary descriptions of augmented trees and their augmentations.
//!
//! A description is a small little-endian byte buffer naming built-in
//! behaviour: a tree description names its key order, an augmentation
//! description names an aggregate to register on a tree. Every description
//! starts with a fixed 16-byte header (magic, format version, kind) followed
//! by length-prefixed UTF-8 chunks. See [`header`] for the layout.
//!
//! # Example
//!
//! ```
//! use tree_description::{AugmentationKind, ComparatorKind};
//!
//! let tree_bytes = tree_description::encode_tree(ComparatorKind::Reverse);
//! let sum_bytes = tree_description::encode_augmentation(AugmentationKind::Sum);
//!
//! let mut tree = tree_description::unpack_tree(&tree_bytes)?;
//! let sum = tree_description::unpack_augmentation(&mut tree, &sum_bytes)?;
//! for key in 1..=5 {
//!     tree.insert(key, key * 10);
//! }
//! // In reverse order, "less than 3" means the larger keys.
//! assert_eq!(tree.aggregate_lt(sum, &3).payload(), Some(&90));
//! # Ok::<(), tree_description::DescriptionError>(())
//! ```

mod catalog;
mod error;
pub mod header;

use augmented_tree::AugmentationId;

pub use catalog::{AugmentationKind, ComparatorKind, DescribedTree};
pub use error::{DescriptionError, DescriptionKind, Result};

use header::Reader;

/// Decode a tree description into its comparator.
pub fn parse_tree(bytes: &[u8]) -> Result<ComparatorKind> {
    let mut reader = Reader::open(bytes, DescriptionKind::Tree)?;
    let name = reader.name()?;
    let kind = ComparatorKind::from_name(name)
        .ok_or_else(|| DescriptionError::UnknownComparator(name.to_owned()))?;
    reader.finish()?;
    Ok(kind)
}

/// Decode an augmentation description into the augmentation it names.
pub fn parse_augmentation(bytes: &[u8]) -> Result<AugmentationKind> {
    let mut reader = Reader::open(bytes, DescriptionKind::Augmentation)?;
    let name = reader.name()?;
    let kind = AugmentationKind::from_name(name)
        .ok_or_else(|| DescriptionError::UnknownAugmentation(name.to_owned()))?;
    reader.finish()?;
    Ok(kind)
}

/// Build an empty tree from its description.
pub fn unpack_tree(bytes: &[u8]) -> Result<DescribedTree> {
    let kind = parse_tree(bytes)?;
    tracing::debug!(comparator = %kind, "unpacked tree description");
    Ok(kind.build())
}

/// Register the augmentation described by `bytes` on `tree`.
///
/// Nothing is registered if the description is malformed.
pub fn unpack_augmentation(tree: &mut DescribedTree, bytes: &[u8]) -> Result<AugmentationId> {
    let kind = parse_augmentation(bytes)?;
    let id = kind.register(tree);
    tracing::debug!(augmentation = %kind, aug_id = %id, "unpacked augmentation description");
    Ok(id)
}

/// Encode a tree description.
pub fn encode_tree(comparator: ComparatorKind) -> Vec<u8> {
    let mut out = header::write_header(DescriptionKind::Tree);
    header::write_name(&mut out, comparator.name());
    out
}

/// Encode an augmentation description.
pub fn encode_augmentation(augmentation: AugmentationKind) -> Vec<u8> {
    let mut out = header::write_header(DescriptionKind::Augmentation);
    header::write_name(&mut out, augmentation.name());
    out
}
