//! Least Recently Used (LRU) Replacement Policy.
//!
//! This policy evicts the block that has not been accessed for the longest
//! time. Every hit and fill stamps the block with a strictly increasing
//! logical timestamp, so the victim is the valid block with the smallest age.
//!
//! # Performance
//!
//! - **Time Complexity:** `get_victim()`: O(W) where W is the associativity
//! - **Space Complexity:** One 64-bit stamp per block, kept in the tag store
//! - **Best Case:** Workloads with good temporal locality
//! - **Worst Case:** Cyclic scans slightly larger than the set (thrashing)

use super::{ReplacementPolicy, min_valid_by_key};
use crate::cache::tagstore::Block;

/// LRU policy. Stateless: ages live in the blocks.
#[derive(Clone, Copy, Debug, Default)]
pub struct LruPolicy;

impl ReplacementPolicy for LruPolicy {
    /// Returns the valid way with the oldest stamp.
    fn get_victim(&self, set: &[Block]) -> Option<usize> {
        min_valid_by_key(set, |block| block.age)
    }
}
