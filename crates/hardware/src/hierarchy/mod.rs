//! Cache hierarchy construction and ownership.
//!
//! This module builds the complete hierarchy from configuration. It performs:
//! 1. **Level setup:** Creates L1, the optional victim cache and the optional L2.
//! 2. **Linking:** Records the `prev`/`next` chain
//!    (`L1 -> Victim -> L2`, skipping absent levels) as level identifiers.
//! 3. **Clock:** Owns the logical clock that stamps block ages.
//!
//! The hierarchy is the single owner of every level; the per-reference state
//! machine lives in [`engine`].

/// Per-reference lookup, fill, write-back and victim swap logic.
pub mod engine;

pub use engine::AccessOutcome;

use crate::cache::{CacheLevel, LevelKind};
use crate::common::error::ConfigError;
use crate::config::HierarchyConfig;
use crate::stats::CacheStats;

/// An L1 cache with an optional victim cache and an optional L2.
#[derive(Clone, Debug)]
pub struct Hierarchy {
    config: HierarchyConfig,
    l1: CacheLevel,
    victim: Option<CacheLevel>,
    l2: Option<CacheLevel>,
    clock: u64,
}

impl Hierarchy {
    /// Builds a hierarchy with empty tag stores.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any present level has an invalid
    /// geometry. No partially built hierarchy is ever returned.
    pub fn new(config: HierarchyConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut l1 = CacheLevel::new(LevelKind::L1, config.l1, config.block_size)?;
        let mut victim = config
            .victim_level()
            .map(|level| CacheLevel::new(LevelKind::Victim, level, config.block_size))
            .transpose()?;
        let mut l2 = if config.l2_present() {
            Some(CacheLevel::new(LevelKind::L2, config.l2, config.block_size)?)
        } else {
            None
        };

        let l2_kind = l2.as_ref().map(CacheLevel::kind);
        let victim_kind = victim.as_ref().map(CacheLevel::kind);

        l1.next = victim_kind.or(l2_kind);
        if let Some(victim) = victim.as_mut() {
            victim.prev = Some(LevelKind::L1);
            victim.next = l2_kind;
        }
        if let Some(l2) = l2.as_mut() {
            l2.prev = victim_kind.or(Some(LevelKind::L1));
        }

        tracing::debug!(
            block_size = config.block_size,
            victim = victim.is_some(),
            l2 = l2.is_some(),
            "built cache hierarchy"
        );

        Ok(Self {
            config,
            l1,
            victim,
            l2,
            clock: 0,
        })
    }

    /// Configuration the hierarchy was built from.
    #[inline]
    pub const fn config(&self) -> &HierarchyConfig {
        &self.config
    }

    /// Primary cache.
    #[inline]
    pub const fn l1(&self) -> &CacheLevel {
        &self.l1
    }

    /// Victim cache, if configured.
    #[inline]
    pub const fn victim(&self) -> Option<&CacheLevel> {
        self.victim.as_ref()
    }

    /// Secondary cache, if configured.
    #[inline]
    pub const fn l2(&self) -> Option<&CacheLevel> {
        self.l2.as_ref()
    }

    /// Level of the given kind, if present.
    pub const fn level(&self, kind: LevelKind) -> Option<&CacheLevel> {
        match kind {
            LevelKind::L1 => Some(&self.l1),
            LevelKind::Victim => self.victim.as_ref(),
            LevelKind::L2 => self.l2.as_ref(),
        }
    }

    /// Counters of the given level, if present.
    pub fn stats(&self, kind: LevelKind) -> Option<&CacheStats> {
        self.level(kind).map(CacheLevel::stats)
    }

    /// Present levels, from L1 down.
    pub fn levels(&self) -> impl Iterator<Item = &CacheLevel> + '_ {
        std::iter::once(&self.l1)
            .chain(self.victim.as_ref())
            .chain(self.l2.as_ref())
    }

    /// Current value of the logical clock.
    #[inline]
    pub const fn clock(&self) -> u64 {
        self.clock
    }

    /// Advances the logical clock and returns the new, unused stamp.
    pub(crate) const fn next_stamp(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Level of the given kind, which the engine has reached through a link.
    ///
    /// # Panics
    ///
    /// Panics if the level is absent: links only ever name present levels.
    pub(crate) fn level_mut(&mut self, kind: LevelKind) -> &mut CacheLevel {
        let level = match kind {
            LevelKind::L1 => Some(&mut self.l1),
            LevelKind::Victim => self.victim.as_mut(),
            LevelKind::L2 => self.l2.as_mut(),
        };
        level.unwrap_or_else(|| panic!("hierarchy invariant violated: {kind} cache is not present"))
    }
}
