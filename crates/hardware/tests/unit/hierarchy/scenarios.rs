//! # End-to-End Scenarios
//!
//! Short traces with fully worked expected counters.

use crate::common::{TestContext, configs};
use cachesim_core::cache::LevelKind;
use cachesim_core::hierarchy::AccessOutcome::{self, Hit, Miss, VictimHit};
use cachesim_core::stats::CacheStats;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// Direct-mapped, two sets: 0x0 and 0x4 live in different sets, so the
/// third reference hits.
#[test]
fn two_sets_keep_both_blocks() {
    let mut ctx = TestContext::new(configs::direct_mapped_two_sets());
    assert_eq!(ctx.read_all(&[0x0, 0x4, 0x0]), vec![Miss, Miss, Hit]);

    assert_eq!(
        ctx.stats(LevelKind::L1),
        CacheStats {
            reads: 3,
            read_hits: 1,
            read_misses: 2,
            memory_traffic: 2,
            ..CacheStats::default()
        }
    );
    assert_eq!(ctx.resident(LevelKind::L1), vec![0x0, 0x4]);
}

/// One block only: every reference evicts the previous one.
#[test]
fn single_block_thrashes() {
    let mut ctx = TestContext::new(configs::single_block());
    assert_eq!(ctx.read_all(&[0x0, 0x4, 0x0]), vec![Miss, Miss, Miss]);

    let l1 = ctx.stats(LevelKind::L1);
    assert_eq!(l1.read_misses, 3);
    assert_eq!(l1.read_hits, 0);
    assert_eq!(l1.write_backs, 0);
    assert_eq!(ctx.resident(LevelKind::L1), vec![0x0]);
}

/// A block pushed out of L1 comes back from the victim cache through a swap
/// instead of a fetch.
#[test]
fn victim_cache_serves_conflict_miss() {
    let mut ctx = TestContext::new(configs::single_block_with_victim());
    assert_eq!(ctx.read_all(&[0x0, 0x4, 0x0]), vec![Miss, Miss, VictimHit]);

    let l1 = ctx.stats(LevelKind::L1);
    assert_eq!(l1.read_misses, 3);
    assert_eq!(l1.memory_traffic, 2);

    assert_eq!(
        ctx.stats(LevelKind::Victim),
        CacheStats {
            reads: 3,
            read_hits: 1,
            read_misses: 2,
            swaps: 1,
            ..CacheStats::default()
        }
    );
    assert_eq!(ctx.resident(LevelKind::L1), vec![0x0]);
    assert_eq!(ctx.resident(LevelKind::Victim), vec![0x4]);
}

/// Offsets within a block hit the same block.
#[test]
fn offsets_share_a_block() {
    let mut ctx = TestContext::new(configs::two_way_single_set());
    assert_eq!(ctx.read_all(&[0x100, 0x10F, 0x108]), vec![Miss, Hit, Hit]);
    assert_eq!(ctx.resident(LevelKind::L1), vec![0x100]);
}

#[test]
fn outcome_classifies_l1_misses() {
    assert!(!AccessOutcome::Hit.is_l1_miss());
    assert!(AccessOutcome::VictimHit.is_l1_miss());
    assert!(AccessOutcome::Miss.is_l1_miss());
}

#[test]
fn clock_advances_on_every_stamp() {
    let mut ctx = TestContext::new(configs::two_way_single_set());
    let _ = ctx.read_all(&[0x0, 0x0, 0x10]);
    assert_eq!(ctx.hierarchy().clock(), 3);

    let set = ctx.level(LevelKind::L1).tags().set(0);
    assert_eq!(set[0].age, 2);
    assert_eq!(set[1].age, 3);
}

proptest! {
    /// No block is valid before its first reference.
    #[test]
    fn first_reference_always_misses(addr in any::<u32>(), write in any::<bool>()) {
        let mut ctx = TestContext::new(configs::full_hierarchy());
        let outcome = if write { ctx.write(addr) } else { ctx.read(addr) };
        prop_assert_eq!(outcome, Miss);
    }
}
