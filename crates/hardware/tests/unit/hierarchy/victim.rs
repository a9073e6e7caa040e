//! # Victim Cache Tests
//!
//! Covers insertion of L1 evictions, swaps, dirty-bit handling across swaps,
//! write-backs out of the victim cache, and the invariant that the victim
//! cache only ever holds blocks that once missed in L1.

use std::collections::HashSet;

use crate::common::{TestContext, configs};
use cachesim_core::cache::LevelKind;
use cachesim_core::common::MemoryReference;
use cachesim_core::config::WritePolicy;
use cachesim_core::hierarchy::AccessOutcome::{Miss, VictimHit};
use proptest::prelude::*;

#[test]
fn clean_evictions_enter_the_victim_cache() {
    let mut ctx = TestContext::new(configs::single_block_with_victim());
    let _ = ctx.read_all(&[0x0, 0x4]);

    assert_eq!(ctx.resident(LevelKind::Victim), vec![0x0]);
    assert!(!ctx.level(LevelKind::Victim).is_dirty(0x0));
    // Insertions are not references.
    let victim = ctx.stats(LevelKind::Victim);
    assert_eq!(victim.accesses(), 2);
    assert_eq!(victim.memory_traffic, 0);
}

#[test]
fn dirty_eviction_carries_dirty_bit() {
    let mut ctx = TestContext::new(configs::single_block_with_victim());
    let _ = ctx.write(0x0);
    let _ = ctx.read(0x4);

    assert_eq!(ctx.stats(LevelKind::L1).write_backs, 1);
    assert!(ctx.level(LevelKind::Victim).is_dirty(0x0));
}

#[test]
fn write_swap_forces_dirty() {
    let mut ctx = TestContext::new(configs::single_block_with_victim());
    let _ = ctx.read_all(&[0x0, 0x4]);
    assert_eq!(ctx.write(0x0), VictimHit);

    assert!(ctx.level(LevelKind::L1).is_dirty(0x0));
    assert!(!ctx.level(LevelKind::Victim).is_dirty(0x4));
    let victim = ctx.stats(LevelKind::Victim);
    assert_eq!(victim.write_hits, 1);
    assert_eq!(victim.swaps, 1);
}

/// Dirty bits travel with their blocks in both directions.
#[test]
fn swaps_exchange_dirty_bits() {
    let mut ctx = TestContext::new(configs::single_block_with_victim());
    let _ = ctx.write(0x0);
    let _ = ctx.read(0x4);

    assert_eq!(ctx.read(0x0), VictimHit);
    assert!(ctx.level(LevelKind::L1).is_dirty(0x0));
    assert!(!ctx.level(LevelKind::Victim).is_dirty(0x4));

    assert_eq!(ctx.read(0x4), VictimHit);
    assert!(!ctx.level(LevelKind::L1).is_dirty(0x4));
    assert!(ctx.level(LevelKind::Victim).is_dirty(0x0));

    assert_eq!(ctx.stats(LevelKind::Victim).swaps, 2);
    // A swap is not an eviction.
    assert_eq!(ctx.stats(LevelKind::L1).write_backs, 1);
}

/// Reference counts travel with swapped blocks; the block entering L1
/// gains one for the reference that found it.
#[test]
fn swap_carries_reference_counts() {
    let mut ctx = TestContext::new(configs::single_block_with_victim());
    let _ = ctx.read_all(&[0x0, 0x4, 0x4, 0x4]);
    assert_eq!(ctx.read(0x0), VictimHit);

    // 0x0 was inserted into the victim cache as a fresh block.
    assert_eq!(ctx.level(LevelKind::L1).tags().set(0)[0].ref_count, 2);
    assert_eq!(ctx.level(LevelKind::Victim).tags().set(0)[0].ref_count, 3);
}

#[test]
fn dirty_victim_eviction_without_l2_goes_to_memory() {
    let mut ctx = TestContext::new(configs::single_block_with_victim());
    let _ = ctx.write(0x0);
    let _ = ctx.read_all(&[0x4, 0x8]);

    assert_eq!(ctx.resident(LevelKind::Victim), vec![0x4]);
    let victim = ctx.stats(LevelKind::Victim);
    assert_eq!(victim.write_backs, 1);
    assert_eq!(victim.memory_traffic, 1);
    assert_eq!(victim.reads, 2);
    assert_eq!(victim.writes, 1);
    assert_eq!(victim.misses(), 3);
}

/// A dirty block pushed out of the victim cache is written into L2.
#[test]
fn dirty_victim_eviction_writes_to_l2() {
    // Block 4; L2 is 2 sets x 2 ways, index = addr[2].
    let mut ctx = TestContext::new(configs::single_block_with_victim().with_l2(16, 2));
    let _ = ctx.write(0x0);
    assert_eq!(ctx.read(0x4), Miss);
    assert_eq!(ctx.read(0x8), Miss);

    assert_eq!(ctx.stats(LevelKind::Victim).write_backs, 1);
    let l2 = ctx.stats(LevelKind::L2);
    assert_eq!(l2.reads, 3);
    assert_eq!(l2.read_misses, 3);
    assert_eq!(l2.writes, 1);
    assert_eq!(l2.write_hits, 1);
    assert!(ctx.level(LevelKind::L2).is_dirty(0x0));
}

/// An L1 miss that the victim cache serves never reaches L2.
#[test]
fn victim_hit_bypasses_l2() {
    let mut ctx = TestContext::new(configs::full_hierarchy());
    // L1 set 0 holds two blocks; 0x00, 0x20, 0x40 all map there.
    let _ = ctx.read_all(&[0x00, 0x20, 0x40]);
    let before = ctx.stats(LevelKind::L2);

    assert_eq!(ctx.read(0x00), VictimHit);
    assert_eq!(ctx.stats(LevelKind::L2), before);
}

#[test]
fn links_route_through_victim() {
    let ctx = TestContext::new(configs::full_hierarchy());
    let hierarchy = ctx.hierarchy();
    assert_eq!(hierarchy.l1().next(), Some(LevelKind::Victim));
    let victim = hierarchy.victim().unwrap();
    assert_eq!(victim.prev(), Some(LevelKind::L1));
    assert_eq!(victim.next(), Some(LevelKind::L2));
    assert_eq!(hierarchy.l2().unwrap().prev(), Some(LevelKind::Victim));
}

fn reference() -> impl Strategy<Value = MemoryReference> {
    (any::<bool>(), 0u32..0x200).prop_map(|(write, addr)| {
        if write {
            MemoryReference::write(addr)
        } else {
            MemoryReference::read(addr)
        }
    })
}

proptest! {
    /// Every victim block once missed in L1, L1 and the victim cache never
    /// share a block, and the probe counters agree with L1's misses.
    #[test]
    fn victim_holds_only_former_l1_misses(
        refs in proptest::collection::vec(reference(), 1..200),
        write_through in any::<bool>(),
    ) {
        let mut config = configs::full_hierarchy();
        if write_through {
            config = config.with_write_policy(WritePolicy::WriteThroughNoAllocate);
        }
        let mut ctx = TestContext::new(config);
        let mut missed = HashSet::new();

        for reference in refs {
            if ctx.sim.step(reference).is_l1_miss() {
                let _ = missed.insert(reference.addr & !0xF);
            }

            let l1 = ctx.resident(LevelKind::L1);
            for addr in ctx.resident(LevelKind::Victim) {
                prop_assert!(missed.contains(&addr), "{addr:#x} never missed in L1");
                prop_assert!(!l1.contains(&addr), "{addr:#x} is in L1 and the victim cache");
            }
        }

        let l1 = ctx.stats(LevelKind::L1);
        let victim = ctx.stats(LevelKind::Victim);
        prop_assert_eq!(l1.accesses(), ctx.sim.references());
        prop_assert_eq!(l1.hits() + l1.misses(), l1.accesses());
        prop_assert_eq!(victim.accesses(), l1.misses());
        prop_assert_eq!(victim.swaps, victim.hits());
    }
}
