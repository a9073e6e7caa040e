//! Configuration system for the cache simulator.
//!
//! This module defines the structures and enums that parameterize a hierarchy.
//! It provides:
//! 1. **Defaults:** Baseline geometry used when a field is omitted.
//! 2. **Enums:** Replacement and write policies.
//! 3. **Structures:** Per-level geometry and the hierarchy as a whole.
//! 4. **Validation:** Geometry checks performed before any tag store is built.
//!
//! Configuration is supplied on the command line, or deserialized from JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::error::ConfigError;

/// Default configuration constants for the simulator.
mod defaults {
    /// Default block size in bytes.
    pub const BLOCK_SIZE: u32 = 16;

    /// Default L1 size in bytes (1 KiB).
    pub const L1_SIZE: u32 = 1024;

    /// Default L1 associativity.
    pub const L1_ASSOC: u32 = 2;

    /// Default L2 associativity, used when only an L2 size is given.
    pub const L2_ASSOC: u32 = 4;

    /// Victim cache disabled.
    pub const VICTIM_SIZE: u32 = 0;
}

/// Display names of the three level kinds.
pub mod names {
    /// Primary cache.
    pub const L1: &str = "L1";
    /// Victim cache.
    pub const VICTIM: &str = "Victim";
    /// Secondary cache.
    pub const L2: &str = "L2";
}

/// Cache replacement policy algorithms.
///
/// Specifies the algorithm used to select which block to evict when a new
/// block must be installed in a full set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplacementPolicy {
    /// Least Recently Used.
    ///
    /// Evicts the block with the oldest access stamp.
    #[default]
    #[serde(alias = "lru", alias = "Lru")]
    Lru,
    /// Least Frequently Used.
    ///
    /// Evicts the block with the lowest reference count. The evicted count
    /// seeds the next occupant of the set.
    #[serde(alias = "lfu", alias = "Lfu")]
    Lfu,
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lru => write!(f, "LRU"),
            Self::Lfu => write!(f, "LFU"),
        }
    }
}

impl FromStr for ReplacementPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lru" | "0" => Ok(Self::Lru),
            "lfu" | "1" => Ok(Self::Lfu),
            _ => Err(ConfigError::UnknownPolicy {
                what: "replacement",
                name: s.to_owned(),
            }),
        }
    }
}

/// Cache write policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum WritePolicy {
    /// Write-back, write-allocate.
    ///
    /// Write hits mark the block dirty; write misses allocate a block.
    #[default]
    #[serde(rename = "WBWA", alias = "wbwa")]
    WriteBackWriteAllocate,
    /// Write-through, no-allocate.
    ///
    /// Writes go straight to the next level; a write miss leaves the cache
    /// untouched.
    #[serde(rename = "WTNA", alias = "wtna")]
    WriteThroughNoAllocate,
}

impl WritePolicy {
    /// Returns `true` for write-back, write-allocate.
    #[inline]
    pub const fn is_write_back(self) -> bool {
        matches!(self, Self::WriteBackWriteAllocate)
    }
}

impl fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteBackWriteAllocate => write!(f, "WBWA"),
            Self::WriteThroughNoAllocate => write!(f, "WTNA"),
        }
    }
}

impl FromStr for WritePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wbwa" | "0" => Ok(Self::WriteBackWriteAllocate),
            "wtna" | "1" => Ok(Self::WriteThroughNoAllocate),
            _ => Err(ConfigError::UnknownPolicy {
                what: "write",
                name: s.to_owned(),
            }),
        }
    }
}

/// Root configuration of a cache hierarchy.
///
/// # Examples
///
/// Building a configuration in code:
///
/// ```
/// use cachesim_core::config::HierarchyConfig;
///
/// let config = HierarchyConfig::new(16, 1024, 2).with_victim(64).with_l2(8192, 4);
/// assert!(config.victim_present());
/// assert!(config.l2_present());
/// assert!(config.validate().is_ok());
/// ```
///
/// Deserializing from JSON:
///
/// ```
/// use cachesim_core::config::{HierarchyConfig, ReplacementPolicy, WritePolicy};
///
/// let json = r#"{
///     "block_size": 32,
///     "l1": { "size": 2048, "associativity": 4, "replacement": "LFU", "write_policy": "WTNA" },
///     "l2": { "size": 16384, "associativity": 8 }
/// }"#;
///
/// let config: HierarchyConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.l1.replacement, ReplacementPolicy::Lfu);
/// assert_eq!(config.l1.write_policy, WritePolicy::WriteThroughNoAllocate);
/// assert_eq!(config.victim_size, 0);
/// assert_eq!(config.l2.replacement, ReplacementPolicy::Lru);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HierarchyConfig {
    /// Block size in bytes, shared by every level.
    #[serde(default = "HierarchyConfig::default_block_size")]
    pub block_size: u32,

    /// Primary cache.
    #[serde(default)]
    pub l1: LevelConfig,

    /// Victim cache size in bytes; 0 disables it.
    #[serde(default = "HierarchyConfig::default_victim_size")]
    pub victim_size: u32,

    /// Secondary cache; a size of 0 disables it.
    #[serde(default = "LevelConfig::disabled")]
    pub l2: LevelConfig,
}

impl HierarchyConfig {
    /// Creates an L1-only configuration with default policies.
    pub const fn new(block_size: u32, l1_size: u32, l1_associativity: u32) -> Self {
        Self {
            block_size,
            l1: LevelConfig::new(l1_size, l1_associativity),
            victim_size: 0,
            l2: LevelConfig::disabled(),
        }
    }

    /// Adds a victim cache of `size` bytes.
    #[must_use]
    pub const fn with_victim(mut self, size: u32) -> Self {
        self.victim_size = size;
        self
    }

    /// Adds an L2 cache.
    #[must_use]
    pub const fn with_l2(mut self, size: u32, associativity: u32) -> Self {
        self.l2.size = size;
        self.l2.associativity = associativity;
        self
    }

    /// Sets the replacement policy of L1 and L2.
    #[must_use]
    pub const fn with_replacement(mut self, policy: ReplacementPolicy) -> Self {
        self.l1.replacement = policy;
        self.l2.replacement = policy;
        self
    }

    /// Sets the write policy of L1 and L2.
    #[must_use]
    pub const fn with_write_policy(mut self, policy: WritePolicy) -> Self {
        self.l1.write_policy = policy;
        self.l2.write_policy = policy;
        self
    }

    /// Returns `true` if a victim cache is configured.
    #[inline]
    pub const fn victim_present(&self) -> bool {
        self.victim_size != 0
    }

    /// Returns `true` if an L2 cache is configured.
    #[inline]
    pub const fn l2_present(&self) -> bool {
        self.l2.size != 0
    }

    /// Derives the victim cache geometry: a single fully-associative LRU set.
    ///
    /// Returns `None` when the victim cache is disabled.
    pub const fn victim_level(&self) -> Option<LevelConfig> {
        if !self.victim_present() || self.block_size == 0 {
            return None;
        }
        Some(LevelConfig {
            size: self.victim_size,
            associativity: self.victim_size / self.block_size,
            replacement: ReplacementPolicy::Lru,
            write_policy: WritePolicy::WriteBackWriteAllocate,
        })
    }

    /// Checks every present level against the block size.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found, checking the block size
    /// first, then L1, the victim cache and L2.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.block_size.is_power_of_two() {
            return Err(ConfigError::BlockSizeNotPowerOfTwo(self.block_size));
        }
        let _ = self.l1.num_sets(names::L1, self.block_size)?;
        if self.victim_present()
            && (self.victim_size < self.block_size || self.victim_size % self.block_size != 0)
        {
            return Err(ConfigError::UnevenGeometry {
                level: names::VICTIM.to_owned(),
                size: self.victim_size,
                associativity: self.victim_size / self.block_size,
                block_size: self.block_size,
            });
        }
        if self.l2_present() {
            let _ = self.l2.num_sets(names::L2, self.block_size)?;
        }
        Ok(())
    }

    /// Returns the default block size in bytes.
    const fn default_block_size() -> u32 {
        defaults::BLOCK_SIZE
    }

    /// Returns the default victim cache size (disabled).
    const fn default_victim_size() -> u32 {
        defaults::VICTIM_SIZE
    }
}

impl Default for HierarchyConfig {
    /// A 1 KiB 2-way L1 with 16-byte blocks, no victim cache and no L2.
    fn default() -> Self {
        Self {
            block_size: defaults::BLOCK_SIZE,
            l1: LevelConfig::default(),
            victim_size: defaults::VICTIM_SIZE,
            l2: LevelConfig::disabled(),
        }
    }
}

/// Geometry and policies of one cache level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct LevelConfig {
    /// Total size in bytes.
    pub size: u32,

    /// Blocks per set.
    #[serde(default = "LevelConfig::default_associativity")]
    pub associativity: u32,

    /// Replacement policy.
    #[serde(default)]
    pub replacement: ReplacementPolicy,

    /// Write policy.
    #[serde(default)]
    pub write_policy: WritePolicy,
}

impl LevelConfig {
    /// Creates a level with default (LRU, WBWA) policies.
    pub const fn new(size: u32, associativity: u32) -> Self {
        Self {
            size,
            associativity,
            replacement: ReplacementPolicy::Lru,
            write_policy: WritePolicy::WriteBackWriteAllocate,
        }
    }

    /// A level with size 0, which the hierarchy treats as absent.
    pub const fn disabled() -> Self {
        Self::new(0, defaults::L2_ASSOC)
    }

    /// Number of sets, `size / (associativity * block_size)`.
    ///
    /// # Errors
    ///
    /// Fails on a zero size or associativity, a size that does not divide
    /// evenly, or a set count that is not a power of two.
    pub fn num_sets(&self, level: &str, block_size: u32) -> Result<u32, ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::ZeroSize {
                level: level.to_owned(),
            });
        }
        if self.associativity == 0 {
            return Err(ConfigError::ZeroAssociativity {
                level: level.to_owned(),
            });
        }
        let uneven = || ConfigError::UnevenGeometry {
            level: level.to_owned(),
            size: self.size,
            associativity: self.associativity,
            block_size,
        };
        let set_bytes = self
            .associativity
            .checked_mul(block_size)
            .ok_or_else(uneven)?;
        if set_bytes == 0 || self.size % set_bytes != 0 {
            return Err(uneven());
        }
        let num_sets = self.size / set_bytes;
        if !num_sets.is_power_of_two() {
            return Err(ConfigError::SetCountNotPowerOfTwo {
                level: level.to_owned(),
                num_sets,
            });
        }
        Ok(num_sets)
    }

    /// Returns the default associativity.
    const fn default_associativity() -> u32 {
        defaults::L2_ASSOC
    }
}

impl Default for LevelConfig {
    /// The default primary cache: 1 KiB, 2-way, LRU, WBWA.
    fn default() -> Self {
        Self::new(defaults::L1_SIZE, defaults::L1_ASSOC)
    }
}
