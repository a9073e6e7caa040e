//! Least Frequently Used (LFU) Replacement Policy.
//!
//! This policy evicts the block with the fewest references since it was
//! filled. To keep newly filled blocks from being evicted straight away, the
//! tag store carries the evicted block's count over to the set, and the next
//! occupant starts from that count plus one instead of from one.
//!
//! # Performance
//!
//! - **Time Complexity:** `get_victim()`: O(W) where W is the associativity
//! - **Space Complexity:** One counter per block plus one per set
//! - **Best Case:** Skewed workloads with a stable hot set
//! - **Worst Case:** Phase changes, where formerly hot blocks linger

use super::{ReplacementPolicy, min_valid_by_key};
use crate::cache::tagstore::Block;

/// LFU policy. Stateless: counts live in the blocks and sets.
#[derive(Clone, Copy, Debug, Default)]
pub struct LfuPolicy;

impl ReplacementPolicy for LfuPolicy {
    /// Returns the valid way with the lowest reference count.
    fn get_victim(&self, set: &[Block]) -> Option<usize> {
        min_valid_by_key(set, |block| block.ref_count)
    }
}
