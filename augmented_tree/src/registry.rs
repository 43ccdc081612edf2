/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! The set of augmentations registered on a tree.
//!
//! Every augmentation has a stable [`AugmentationId`] and a *schema index*:
//! its position in the per-node cache slot array. Whenever the set changes,
//! the surviving augmentations are repacked into dense schema indices
//! (ascending by id) and the schema version is bumped, so that node caches
//! built against an older schema know they have to be repacked before use.

use std::collections::BTreeMap;
use std::fmt;

use crate::augmentation::{Augmentation, AugmentationId};

/// A registered augmentation, type-erased to the tree's aggregate type.
pub(crate) type BoxedAugmentation<K, V, R> = Box<dyn Augmentation<K, V, Output = R>>;

pub(crate) struct Registered<K, V, R> {
    pub(crate) augmentation: BoxedAugmentation<K, V, R>,
    pub(crate) schema_index: usize,
}

/// The augmentations active on a tree and their cache layout.
pub struct AugmentationRegistry<K, V, R> {
    augmentations: BTreeMap<AugmentationId, Registered<K, V, R>>,
    next_id: u32,
    schema_version: u64,
}

impl<K, V, R> AugmentationRegistry<K, V, R> {
    pub(crate) const fn new() -> Self {
        Self {
            augmentations: BTreeMap::new(),
            next_id: 1,
            schema_version: 0,
        }
    }

    /// Add an augmentation, returning its freshly assigned id.
    pub(crate) fn register(&mut self, augmentation: BoxedAugmentation<K, V, R>) -> AugmentationId {
        let id = AugmentationId::new(self.next_id);
        self.next_id += 1;
        self.augmentations.insert(
            id,
            Registered {
                augmentation,
                schema_index: usize::MAX,
            },
        );
        self.recompute_schema();
        tracing::debug!(
            aug_id = %id,
            schema_version = self.schema_version,
            "registered augmentation"
        );
        id
    }

    /// Remove an augmentation. Returns false if `id` is not registered.
    pub(crate) fn unregister(&mut self, id: AugmentationId) -> bool {
        if self.augmentations.remove(&id).is_none() {
            return false;
        }
        self.recompute_schema();
        tracing::debug!(
            aug_id = %id,
            schema_version = self.schema_version,
            "unregistered augmentation"
        );
        true
    }

    /// Reassign dense schema indices, ascending by id, and bump the version.
    fn recompute_schema(&mut self) {
        for (schema_index, registered) in self.augmentations.values_mut().enumerate() {
            registered.schema_index = schema_index;
        }
        self.schema_version += 1;
    }

    pub(crate) fn get(&self, id: AugmentationId) -> Option<&Registered<K, V, R>> {
        self.augmentations.get(&id)
    }

    /// Number of registered augmentations, which is also the cache slot count.
    pub fn len(&self) -> usize {
        self.augmentations.len()
    }

    /// Returns true if no augmentation is registered.
    pub fn is_empty(&self) -> bool {
        self.augmentations.is_empty()
    }

    /// Returns true if `id` is currently registered.
    pub fn contains(&self, id: AugmentationId) -> bool {
        self.augmentations.contains_key(&id)
    }

    /// Version of the current schema. Incremented on every register/unregister.
    pub const fn schema_version(&self) -> u64 {
        self.schema_version
    }

    /// The cache slot currently assigned to `id`.
    pub fn schema_index(&self, id: AugmentationId) -> Option<usize> {
        self.augmentations.get(&id).map(|r| r.schema_index)
    }

    /// Registered ids, in schema order.
    pub fn ids(&self) -> impl Iterator<Item = AugmentationId> + '_ {
        self.augmentations.keys().copied()
    }
}

impl<K, V, R> fmt::Debug for AugmentationRegistry<K, V, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AugmentationRegistry")
            .field("ids", &self.augmentations.keys().collect::<Vec<_>>())
            .field("next_id", &self.next_id)
            .field("schema_version", &self.schema_version)
            .finish()
    }
}
