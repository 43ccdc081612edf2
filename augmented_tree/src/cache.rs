/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Per-node aggregate cache.
//!
//! Each node may hold one [`CacheSlot`] per registered augmentation, indexed by
//! schema index and stamped with the schema version the layout was built for.
//! Structural changes drop the whole cache (see [`crate::node::refresh`]);
//! schema changes only repack it.

use crate::augmentation::AugmentationId;
use crate::registry::AugmentationRegistry;

/// A whole-subtree aggregate remembered by a node.
#[derive(Debug, Clone)]
pub(crate) struct CachedAggregate<R> {
    pub(crate) owner: AugmentationId,
    pub(crate) length: usize,
    pub(crate) payload: R,
}

#[derive(Debug, Clone)]
pub(crate) enum CacheSlot<R> {
    Stale,
    Valid(CachedAggregate<R>),
}

#[derive(Debug)]
pub(crate) struct NodeCache<R> {
    schema_version: u64,
    slots: Vec<CacheSlot<R>>,
}

impl<R> NodeCache<R> {
    /// An all-stale cache laid out for the registry's current schema.
    pub(crate) fn new<K, V>(registry: &AugmentationRegistry<K, V, R>) -> Self {
        Self {
            schema_version: registry.schema_version(),
            slots: stale_slots(registry.len()),
        }
    }

    #[cfg_attr(
        not(any(test, all(feature = "unittest", not(miri)))),
        expect(dead_code, reason = "used by invariant checks in unittest feature")
    )]
    pub(crate) const fn schema_version(&self) -> u64 {
        self.schema_version
    }

    /// Bring the slot layout up to date with `registry`.
    ///
    /// Valid slots whose augmentation is still registered move to that
    /// augmentation's current schema index; everything else becomes stale.
    pub(crate) fn sync<K, V>(&mut self, registry: &AugmentationRegistry<K, V, R>) {
        if self.schema_version == registry.schema_version() {
            return;
        }
        let mut slots = stale_slots(registry.len());
        let mut kept = 0usize;
        for slot in self.slots.drain(..) {
            if let CacheSlot::Valid(aggregate) = slot
                && let Some(schema_index) = registry.schema_index(aggregate.owner)
            {
                slots[schema_index] = CacheSlot::Valid(aggregate);
                kept += 1;
            }
        }
        tracing::trace!(
            from = self.schema_version,
            to = registry.schema_version(),
            kept,
            "repacked node cache"
        );
        self.slots = slots;
        self.schema_version = registry.schema_version();
    }

    pub(crate) fn get(&self, schema_index: usize) -> Option<&CachedAggregate<R>> {
        match self.slots.get(schema_index)? {
            CacheSlot::Valid(aggregate) => Some(aggregate),
            CacheSlot::Stale => None,
        }
    }

    pub(crate) fn set(&mut self, schema_index: usize, aggregate: CachedAggregate<R>) {
        self.slots[schema_index] = CacheSlot::Valid(aggregate);
    }

    /// Whether a valid aggregate for `owner` is held anywhere in the cache,
    /// including slots that still sit at a pre-repack position.
    pub(crate) fn holds(&self, owner: AugmentationId) -> bool {
        self.valid().any(|aggregate| aggregate.owner == owner)
    }

    /// Every valid slot, with its schema index.
    pub(crate) fn valid_slots(&self) -> impl Iterator<Item = (usize, &CachedAggregate<R>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(schema_index, slot)| match slot {
                CacheSlot::Valid(aggregate) => Some((schema_index, aggregate)),
                CacheSlot::Stale => None,
            })
    }

    fn valid(&self) -> impl Iterator<Item = &CachedAggregate<R>> {
        self.valid_slots().map(|(_, aggregate)| aggregate)
    }
}

fn stale_slots<R>(len: usize) -> Vec<CacheSlot<R>> {
    std::iter::repeat_with(|| CacheSlot::Stale).take(len).collect()
}
