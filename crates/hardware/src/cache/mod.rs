//! Cache Levels.
//!
//! This module implements a single level of the simulated hierarchy. A level
//! bundles:
//! 1. **Geometry:** Size, block size, associativity and the derived tag store.
//! 2. **Policies:** Replacement (LRU or LFU) and write policy (WBWA or WTNA).
//! 3. **Statistics:** Counters mutated by the hierarchy engine.
//! 4. **Links:** The previous and next level, kept as plain identifiers.
//!
//! Levels do not process references on their own; the
//! [`Hierarchy`](crate::hierarchy::Hierarchy) owns them and drives lookups.

/// Cache replacement policy implementations (LRU, LFU).
pub mod policies;

/// Per-level block metadata storage.
pub mod tagstore;

use std::fmt;

use serde::Serialize;

use self::tagstore::{Block, TagStore};
use crate::common::addr::CacheLine;
use crate::common::data::AccessType;
use crate::common::error::ConfigError;
use crate::config::{LevelConfig, ReplacementPolicy, WritePolicy, names};
use crate::stats::CacheStats;

/// Role of a level in the hierarchy. At most one level of each kind exists,
/// so the kind doubles as the level's identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum LevelKind {
    /// Primary cache.
    L1,
    /// Fully-associative victim cache between L1 and L2.
    Victim,
    /// Secondary cache.
    L2,
}

impl LevelKind {
    /// Display name of the level.
    pub const fn name(self) -> &'static str {
        match self {
            Self::L1 => names::L1,
            Self::Victim => names::VICTIM,
            Self::L2 => names::L2,
        }
    }
}

impl fmt::Display for LevelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One level of the cache hierarchy.
#[derive(Clone, Debug)]
pub struct CacheLevel {
    kind: LevelKind,
    block_size: u32,
    config: LevelConfig,
    pub(crate) tags: TagStore,
    pub(crate) stats: CacheStats,
    pub(crate) prev: Option<LevelKind>,
    pub(crate) next: Option<LevelKind>,
}

impl CacheLevel {
    /// Builds a level with an empty tag store and zeroed counters.
    ///
    /// # Errors
    ///
    /// Fails when the geometry is invalid, or when a victim level is not a
    /// single fully-associative LRU set.
    pub fn new(kind: LevelKind, config: LevelConfig, block_size: u32) -> Result<Self, ConfigError> {
        let tags = TagStore::new(kind.name(), &config, block_size)?;

        if kind == LevelKind::Victim {
            if tags.num_sets() != 1 {
                return Err(ConfigError::VictimGeometry {
                    level: kind.name().to_owned(),
                    reason: "more than one set",
                });
            }
            if config.replacement != ReplacementPolicy::Lru {
                return Err(ConfigError::VictimGeometry {
                    level: kind.name().to_owned(),
                    reason: "replacement policy is not LRU",
                });
            }
        }

        tracing::debug!(
            level = %kind,
            size = config.size,
            assoc = config.associativity,
            block_size,
            sets = tags.num_sets(),
            tag_bits = tags.bits().tag_bits(),
            index_bits = tags.bits().index_bits(),
            offset_bits = tags.bits().offset_bits(),
            "built cache level"
        );

        Ok(Self {
            kind,
            block_size,
            config,
            tags,
            stats: CacheStats::default(),
            prev: None,
            next: None,
        })
    }

    /// Role of this level.
    #[inline]
    pub const fn kind(&self) -> LevelKind {
        self.kind
    }

    /// Display name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Total size in bytes.
    #[inline]
    pub const fn size(&self) -> u32 {
        self.config.size
    }

    /// Block size in bytes.
    #[inline]
    pub const fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Blocks per set.
    #[inline]
    pub const fn associativity(&self) -> u32 {
        self.config.associativity
    }

    /// Replacement policy.
    #[inline]
    pub const fn replacement(&self) -> ReplacementPolicy {
        self.config.replacement
    }

    /// Write policy.
    #[inline]
    pub const fn write_policy(&self) -> WritePolicy {
        self.config.write_policy
    }

    /// Counters accumulated so far.
    #[inline]
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Tag store, read-only.
    #[inline]
    pub const fn tags(&self) -> &TagStore {
        &self.tags
    }

    /// Level above this one, if any.
    #[inline]
    pub const fn prev(&self) -> Option<LevelKind> {
        self.prev
    }

    /// Level below this one, if any.
    #[inline]
    pub const fn next(&self) -> Option<LevelKind> {
        self.next
    }

    /// Returns `true` if the block holding `addr` is resident.
    pub fn contains(&self, addr: u32) -> bool {
        self.tags.find_matching_block(&self.tags.decode(addr)).is_some()
    }

    /// Returns `true` if the block holding `addr` is resident and dirty.
    pub fn is_dirty(&self, addr: u32) -> bool {
        let line = self.tags.decode(addr);
        self.tags
            .find_matching_block(&line)
            .is_some_and(|way| self.tags.block(line.index, way).dirty)
    }

    /// Iterates over every valid block as a [`ResidentBlock`].
    pub fn resident_blocks(&self) -> impl Iterator<Item = ResidentBlock> + '_ {
        self.tags
            .valid_blocks()
            .map(move |(set, way, block)| ResidentBlock {
                set,
                way,
                addr: self.tags.encode(block.tag, set),
                tag: block.tag,
                dirty: block.dirty,
            })
    }

    /// Applies a hit on `way` to the block and counters.
    ///
    /// A write hit dirties the block under write-back; under write-through it
    /// goes straight to the next level and only counts as traffic.
    pub(crate) fn record_hit(&mut self, line: &CacheLine, way: usize, kind: AccessType, stamp: u64) {
        self.tags.touch(line.index, way, stamp);
        self.stats.record_hit(kind);
        if kind.is_write() {
            if self.config.write_policy.is_write_back() {
                self.tags.block_mut(line.index, way).dirty = true;
            } else {
                self.stats.memory_traffic += 1;
            }
        }
        tracing::trace!(level = %self.kind, tag = line.tag, index = line.index, way, %kind, "hit");
    }

    /// Takes the block in `way` out of the set for reuse.
    ///
    /// Returns a copy of the block as it was. A dirty block is counted as a
    /// write-back and its dirty bit cleared; forwarding it to the next level
    /// is up to the caller.
    pub(crate) fn release(&mut self, index: u32, way: usize) -> Block {
        let block = *self.tags.block(index, way);
        if block.dirty {
            self.stats.write_backs += 1;
            self.stats.memory_traffic += 1;
            self.tags.block_mut(index, way).dirty = false;
        }
        tracing::trace!(
            level = %self.kind,
            tag = block.tag,
            index,
            way,
            dirty = block.dirty,
            "evict"
        );
        block
    }
}

/// A valid block as seen from outside the tag store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResidentBlock {
    /// Set index.
    pub set: u32,
    /// Way within the set.
    pub way: usize,
    /// Block-aligned address.
    pub addr: u32,
    /// Stored tag.
    pub tag: u32,
    /// Dirty bit.
    pub dirty: bool,
}
