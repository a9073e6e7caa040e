//! Cache Replacement Policies.
//!
//! Implements the algorithms for selecting victim blocks in a set.
//!
//! # Policies
//!
//! - `Lru`: Least Recently Used, by block age.
//! - `Lfu`: Least Frequently Used, by block reference count.
//!
//! Selectors only read block metadata. The state they rank by (age and
//! reference count) is maintained by the tag store on every hit and fill.

/// Least Frequently Used replacement policy.
pub mod lfu;

/// Least Recently Used replacement policy.
pub mod lru;

pub use lfu::LfuPolicy;
pub use lru::LruPolicy;

use super::tagstore::Block;
use crate::config::ReplacementPolicy as PolicyType;

/// Trait for cache replacement policies.
pub trait ReplacementPolicy {
    /// Selects the way to evict from a set.
    ///
    /// Only valid blocks are candidates. Among equally ranked blocks the
    /// lowest way wins.
    ///
    /// # Arguments
    ///
    /// * `set` - The blocks of one set, in way order.
    ///
    /// # Returns
    ///
    /// The way to evict, or `None` if the set holds no valid block.
    fn get_victim(&self, set: &[Block]) -> Option<usize>;
}

/// Dispatches victim selection on the configured policy.
pub fn select(policy: PolicyType, set: &[Block]) -> Option<usize> {
    match policy {
        PolicyType::Lru => LruPolicy.get_victim(set),
        PolicyType::Lfu => LfuPolicy.get_victim(set),
    }
}

/// Lowest-ranked valid way; `min_by_key` keeps the first of equal minima.
fn min_valid_by_key<K: Ord>(set: &[Block], key: impl Fn(&Block) -> K) -> Option<usize> {
    set.iter()
        .enumerate()
        .filter(|(_, block)| block.valid)
        .min_by_key(|(_, block)| key(block))
        .map(|(way, _)| way)
}
