//! Per-reference state machine.
//!
//! Every reference enters at L1 and is resolved completely before
//! [`Hierarchy::access`] returns:
//!
//! ```text
//! Decode -> HitCheck -+-> HitUpdate
//!                     |
//!                     +-> VictimProbe (L1 only) -+-> Swap
//!                                                |
//!                                                +-> Evict -> Fetch -> Fill
//! ```
//!
//! Fetches and write-backs re-enter the machine one level down, so recursion
//! is bounded by the depth of the hierarchy. The victim cache is never the
//! target of a fetch: it is probed on an L1 miss, and filled only with blocks
//! leaving L1.

use super::Hierarchy;
use crate::cache::{CacheLevel, LevelKind};
use crate::cache::tagstore::Block;
use crate::common::addr::CacheLine;
use crate::common::data::MemoryReference;
use crate::config::ReplacementPolicy;

/// How L1 resolved a reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessOutcome {
    /// The block was resident in L1.
    Hit,
    /// L1 missed and the victim cache supplied the block through a swap.
    VictimHit,
    /// L1 missed and the block came from L2 or memory (or, for a write under
    /// write-through no-allocate, was not brought in at all).
    Miss,
}

impl AccessOutcome {
    /// Returns `true` unless L1 held the block.
    #[inline]
    pub const fn is_l1_miss(self) -> bool {
        !matches!(self, Self::Hit)
    }
}

impl Hierarchy {
    /// Processes one demand reference.
    ///
    /// # Panics
    ///
    /// Panics only if an internal invariant is broken, such as a full set
    /// with no valid block to evict.
    pub fn access(&mut self, reference: MemoryReference) -> AccessOutcome {
        self.handle(LevelKind::L1, reference)
    }

    /// Presents `reference` to level `kind` (L1 or L2).
    fn handle(&mut self, kind: LevelKind, reference: MemoryReference) -> AccessOutcome {
        assert!(
            kind != LevelKind::Victim,
            "hierarchy invariant violated: the victim cache is probed, never accessed"
        );

        let level = self.level_mut(kind);
        let line = level.tags.decode(reference.addr);
        level.stats.record_access(reference.kind);
        tracing::trace!(
            level = %kind,
            addr = reference.addr,
            tag = line.tag,
            index = line.index,
            kind = %reference.kind,
            "decode"
        );

        if let Some(way) = level.tags.find_matching_block(&line) {
            let stamp = self.next_stamp();
            self.level_mut(kind).record_hit(&line, way, reference.kind, stamp);
            return AccessOutcome::Hit;
        }

        level.stats.record_miss(reference.kind);
        tracing::trace!(level = %kind, tag = line.tag, index = line.index, "miss");

        if kind == LevelKind::L1 && self.victim.is_some() && self.victim_swap(reference) {
            return AccessOutcome::VictimHit;
        }

        self.fill_after_miss(kind, &line, reference);
        AccessOutcome::Miss
    }

    /// Brings the missed block into `kind`: evict, fetch from below, fill.
    fn fill_after_miss(&mut self, kind: LevelKind, line: &CacheLine, reference: MemoryReference) {
        let level = self.level_mut(kind);
        let write_back = level.write_policy().is_write_back();

        if reference.kind.is_write() && !write_back {
            level.stats.memory_traffic += 1;
            tracing::trace!(level = %kind, tag = line.tag, index = line.index, "write around");
            return;
        }

        let way = match level.tags.find_free_block(line) {
            Some(way) => way,
            None => {
                let policy = level.replacement();
                let way = level.tags.select_victim(line, policy).unwrap_or_else(|| {
                    panic!("hierarchy invariant violated: {kind} set {} has no valid block", line.index)
                });
                self.evict(kind, line.index, way);
                way
            }
        };

        if let Some(source) = self.fetch_source(kind) {
            let _ = self.handle(source, MemoryReference::read(reference.addr));
        }

        let stamp = self.next_stamp();
        let level = self.level_mut(kind);
        level
            .tags
            .fill(line, way, stamp, reference.kind.is_write() && write_back);
        level.stats.memory_traffic += 1;
        tracing::trace!(level = %kind, tag = line.tag, index = line.index, way, "fill");
    }

    /// Level a miss in `kind` is served from; `None` means memory.
    fn fetch_source(&self, kind: LevelKind) -> Option<LevelKind> {
        match self.level(kind)?.next() {
            Some(LevelKind::Victim) => self.l2.as_ref().map(CacheLevel::kind),
            other => other,
        }
    }

    /// Frees `way` of set `index` in `kind`, passing the block down.
    ///
    /// Blocks leaving L1 go to the victim cache when there is one, clean or
    /// dirty. Otherwise only dirty blocks travel, as a write to the next level.
    fn evict(&mut self, kind: LevelKind, index: u32, way: usize) {
        let level = self.level_mut(kind);
        let block = level.release(index, way);
        let addr = level.tags.encode(block.tag, index);

        match level.next() {
            Some(LevelKind::Victim) => self.insert_victim(addr, block.dirty),
            Some(next) if block.dirty => {
                tracing::trace!(from = %kind, to = %next, addr, "write back");
                let _ = self.handle(next, MemoryReference::write(addr));
            }
            _ => {}
        }
    }

    /// Places a block evicted from L1 into the victim cache.
    fn insert_victim(&mut self, addr: u32, dirty: bool) {
        let victim = self.level_mut(LevelKind::Victim);
        let line = victim.tags.decode(addr);
        assert!(
            victim.tags.find_matching_block(&line).is_none(),
            "hierarchy invariant violated: block {addr:#x} is in both L1 and the victim cache"
        );

        let way = match victim.tags.find_free_block(&line) {
            Some(way) => way,
            None => {
                let policy = victim.replacement();
                let way = victim.tags.select_victim(&line, policy).unwrap_or_else(|| {
                    panic!("hierarchy invariant violated: full victim cache has no valid block")
                });
                self.evict(LevelKind::Victim, line.index, way);
                way
            }
        };

        let stamp = self.next_stamp();
        self.level_mut(LevelKind::Victim)
            .tags
            .fill(&line, way, stamp, dirty);
        tracing::trace!(level = %LevelKind::Victim, addr, way, dirty, "insert");
    }

    /// Probes the victim cache after an L1 miss and swaps on a hit.
    ///
    /// Returns `false` if the victim cache does not hold the block.
    fn victim_swap(&mut self, reference: MemoryReference) -> bool {
        let is_write = reference.kind.is_write();

        let victim = self.level_mut(LevelKind::Victim);
        let victim_line = victim.tags.decode(reference.addr);
        victim.stats.record_access(reference.kind);
        let Some(victim_way) = victim.tags.find_matching_block(&victim_line) else {
            victim.stats.record_miss(reference.kind);
            tracing::trace!(level = %LevelKind::Victim, addr = reference.addr, "miss");
            return false;
        };
        victim.stats.record_hit(reference.kind);
        victim.stats.swaps += 1;
        let moved_in = *victim.tags.block(victim_line.index, victim_way);

        let l1 = &mut self.l1;
        let line = l1.tags.decode(reference.addr);
        let way = l1
            .tags
            .find_free_block(&line)
            .or_else(|| l1.tags.select_victim(&line, ReplacementPolicy::Lru))
            .unwrap_or_else(|| {
                panic!("hierarchy invariant violated: L1 set {} has no valid block", line.index)
            });
        let moved_out = *l1.tags.block(line.index, way);
        let moved_out_addr = l1.tags.encode(moved_out.tag, line.index);
        let write_back = l1.write_policy().is_write_back();
        if is_write && !write_back {
            l1.stats.memory_traffic += 1;
        }

        let l1_stamp = self.next_stamp();
        *self.l1.tags.block_mut(line.index, way) = Block {
            tag: line.tag,
            valid: true,
            dirty: moved_in.dirty || (is_write && write_back),
            age: l1_stamp,
            ref_count: moved_in.ref_count + 1,
        };

        let victim_stamp = self.next_stamp();
        let victim = self.level_mut(LevelKind::Victim);
        let out_line = victim.tags.decode(moved_out_addr);
        *victim.tags.block_mut(victim_line.index, victim_way) = if moved_out.valid {
            Block {
                tag: out_line.tag,
                valid: true,
                dirty: moved_out.dirty,
                age: victim_stamp,
                ref_count: moved_out.ref_count,
            }
        } else {
            Block::default()
        };

        tracing::trace!(
            addr = reference.addr,
            l1_way = way,
            victim_way,
            evicted = moved_out.valid.then_some(moved_out_addr),
            "swap"
        );
        true
    }
}
