//! Tag Store.
//!
//! Per-level metadata storage. Blocks are kept in one contiguous vector laid
//! out set by set, so block `way` of set `index` lives at
//! `index * blocks_per_set + way`:
//!
//! ```text
//!              way 0   way 1   way 2   way 3
//!   set 0    [  0   |   1   |   2   |   3   ]
//!   set 1    [  4   |   5   |   6 * |   7   ]
//!   set 2    [  8   |   9   |  10   |  11   ]
//! ```
//!
//! Each set also carries a carry-over reference count used by LFU: the count
//! of the block last evicted from the set, which the next occupant inherits.
//!
//! Blocks are allocated zeroed at construction and never reallocated.

use super::policies;
use crate::common::addr::{AddressBits, CacheLine};
use crate::common::error::ConfigError;
use crate::config::{LevelConfig, ReplacementPolicy};

/// Metadata for one cache block. No data is stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Block {
    /// Stored tag.
    pub tag: u32,
    /// Holds a block.
    pub valid: bool,
    /// Differs from the next level and must be written back before reuse.
    pub dirty: bool,
    /// Logical timestamp of the last fill or hit (LRU).
    pub age: u64,
    /// Number of references since the block was filled (LFU).
    pub ref_count: u32,
}

/// Tag storage for one cache level.
#[derive(Clone, Debug)]
pub struct TagStore {
    bits: AddressBits,
    num_sets: u32,
    blocks_per_set: u32,
    blocks: Vec<Block>,
    set_ref_counts: Vec<u32>,
}

impl TagStore {
    /// Builds a zeroed tag store for `config` with the given block size.
    ///
    /// # Errors
    ///
    /// Propagates geometry errors from [`LevelConfig::num_sets`] and
    /// [`AddressBits::new`].
    pub fn new(level: &str, config: &LevelConfig, block_size: u32) -> Result<Self, ConfigError> {
        if !block_size.is_power_of_two() {
            return Err(ConfigError::BlockSizeNotPowerOfTwo(block_size));
        }
        let num_sets = config.num_sets(level, block_size)?;
        let bits = AddressBits::new(level, block_size, num_sets)?;
        let num_blocks = num_sets as usize * config.associativity as usize;

        Ok(Self {
            bits,
            num_sets,
            blocks_per_set: config.associativity,
            blocks: vec![Block::default(); num_blocks],
            set_ref_counts: vec![0; num_sets as usize],
        })
    }

    /// Address split used by this store.
    #[inline]
    pub const fn bits(&self) -> AddressBits {
        self.bits
    }

    /// Number of sets.
    #[inline]
    pub const fn num_sets(&self) -> u32 {
        self.num_sets
    }

    /// Associativity.
    #[inline]
    pub const fn blocks_per_set(&self) -> u32 {
        self.blocks_per_set
    }

    /// Total number of blocks.
    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Decodes `addr` against this store's geometry.
    #[inline]
    pub const fn decode(&self, addr: u32) -> CacheLine {
        self.bits.decode(addr)
    }

    /// Block-aligned address of `tag` in set `index`.
    #[inline]
    pub const fn encode(&self, tag: u32, index: u32) -> u32 {
        self.bits.encode(tag, index)
    }

    /// Blocks of set `index`, in way order.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`Self::num_sets`].
    pub fn set(&self, index: u32) -> &[Block] {
        let range = self.set_range(index);
        &self.blocks[range]
    }

    /// Mutable view of set `index`.
    fn set_mut(&mut self, index: u32) -> &mut [Block] {
        let range = self.set_range(index);
        &mut self.blocks[range]
    }

    /// One block.
    #[inline]
    pub fn block(&self, index: u32, way: usize) -> &Block {
        &self.set(index)[way]
    }

    /// One block, mutably.
    #[inline]
    pub fn block_mut(&mut self, index: u32, way: usize) -> &mut Block {
        &mut self.set_mut(index)[way]
    }

    /// Carry-over reference count of set `index`.
    #[inline]
    pub fn set_ref_count(&self, index: u32) -> u32 {
        self.set_ref_counts[index as usize]
    }

    /// First valid block of the set whose tag matches, in way order.
    pub fn find_matching_block(&self, line: &CacheLine) -> Option<usize> {
        self.set(line.index)
            .iter()
            .position(|block| block.valid && block.tag == line.tag)
    }

    /// First invalid block of the set, in way order.
    pub fn find_free_block(&self, line: &CacheLine) -> Option<usize> {
        self.set(line.index).iter().position(|block| !block.valid)
    }

    /// Picks the block to evict from `line`'s set under `policy`.
    ///
    /// Ties go to the lowest way. Under LFU, the evicted block's reference
    /// count moves into the set's carry-over count and the block's own count
    /// is zeroed.
    ///
    /// Returns `None` only when the set holds no valid block; callers look
    /// for a free block first, so that never happens on the eviction path.
    pub fn select_victim(&mut self, line: &CacheLine, policy: ReplacementPolicy) -> Option<usize> {
        let way = policies::select(policy, self.set(line.index))?;
        if policy == ReplacementPolicy::Lfu {
            let block = self.block_mut(line.index, way);
            let evicted = std::mem::take(&mut block.ref_count);
            self.set_ref_counts[line.index as usize] = evicted;
        }
        Some(way)
    }

    /// Updates a block after a hit.
    pub fn touch(&mut self, index: u32, way: usize, stamp: u64) {
        let block = self.block_mut(index, way);
        block.age = stamp;
        block.ref_count += 1;
    }

    /// Places `line` in `way` as a freshly filled block.
    ///
    /// The reference count starts one above the set's carry-over count.
    pub fn fill(&mut self, line: &CacheLine, way: usize, stamp: u64, dirty: bool) {
        let ref_count = self.set_ref_count(line.index) + 1;
        *self.block_mut(line.index, way) = Block {
            tag: line.tag,
            valid: true,
            dirty,
            age: stamp,
            ref_count,
        };
    }

    /// Iterates `(set, way, block)` over every valid block.
    pub fn valid_blocks(&self) -> impl Iterator<Item = (u32, usize, &Block)> + '_ {
        let ways = self.blocks_per_set as usize;
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, block)| block.valid)
            .map(move |(i, block)| ((i / ways) as u32, i % ways, block))
    }

    fn set_range(&self, index: u32) -> std::ops::Range<usize> {
        let ways = self.blocks_per_set as usize;
        let base = index as usize * ways;
        base..base + ways
    }
}
