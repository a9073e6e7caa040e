//! # Address Codec Tests
//!
//! Verifies the tag/index/offset split for concrete geometries and, through
//! property tests, that `encode` inverts `decode` at block granularity for
//! every power-of-two geometry.

use cachesim_core::common::{AddressBits, CacheLine, ConfigError};
use proptest::prelude::*;

fn low_bits(value: u32, bits: u32) -> u32 {
    if bits >= 32 { value } else { value & ((1 << bits) - 1) }
}

/// 16-byte blocks, 64 sets: offset = addr[3:0], index = addr[9:4].
#[test]
fn decode_splits_fields() {
    let bits = AddressBits::new("L1", 16, 64).unwrap();
    assert_eq!(bits.offset_bits(), 4);
    assert_eq!(bits.index_bits(), 6);
    assert_eq!(bits.tag_bits(), 22);

    let line = bits.decode(0xDEAD_BEEF);
    assert_eq!(
        line,
        CacheLine {
            tag: 0x37_AB6F,
            index: 0x2E,
            offset: 0xF
        }
    );
}

/// Two sets of 4-byte blocks: 0x0 and 0x4 land in different sets.
#[test]
fn neighbouring_blocks_use_different_sets() {
    let bits = AddressBits::new("L1", 4, 2).unwrap();
    assert_eq!(bits.decode(0x0).index, 0);
    assert_eq!(bits.decode(0x4).index, 1);
    assert_eq!(bits.decode(0x8).index, 0);
    assert_eq!(bits.decode(0x8).tag, 1);
}

/// A single set has no index field at all.
#[test]
fn fully_associative_has_no_index() {
    let bits = AddressBits::new("Victim", 32, 1).unwrap();
    assert_eq!(bits.index_bits(), 0);
    assert_eq!(bits.tag_bits(), 27);
    assert_eq!(bits.decode(0xFFFF_FFFF).index, 0);
    assert_eq!(bits.encode(0x7FF_FFFF, 0), 0xFFFF_FFE0);
}

/// Offset and index may use the whole address, leaving a zero-width tag.
#[test]
fn zero_width_tag() {
    let bits = AddressBits::new("L1", 1 << 16, 1 << 16).unwrap();
    assert_eq!(bits.tag_bits(), 0);
    assert_eq!(bits.decode(0xFFFF_FFFF).tag, 0);
    assert_eq!(bits.encode(0, 0xABCD), 0xABCD_0000);
}

#[test]
fn oversized_split_is_rejected() {
    let err = AddressBits::new("L2", 1 << 20, 1 << 20).unwrap_err();
    assert_eq!(
        err,
        ConfigError::BitWidthOverflow {
            level: "L2".to_owned(),
            index_bits: 20,
            offset_bits: 20,
        }
    );
}

proptest! {
    #[test]
    fn fields_cover_the_address(block_exp in 0u32..=31, set_exp in 0u32..=31) {
        prop_assume!(block_exp + set_exp <= 32);
        let bits = AddressBits::new("L1", 1 << block_exp, 1 << set_exp).unwrap();
        prop_assert_eq!(bits.tag_bits() + bits.index_bits() + bits.offset_bits(), 32);
    }

    #[test]
    fn encode_inverts_decode(
        block_exp in 0u32..=12,
        set_exp in 0u32..=16,
        tag in any::<u32>(),
        index in any::<u32>(),
    ) {
        let bits = AddressBits::new("L1", 1 << block_exp, 1 << set_exp).unwrap();
        let tag = low_bits(tag, bits.tag_bits());
        let index = low_bits(index, bits.index_bits());

        let line = bits.decode(bits.encode(tag, index));
        prop_assert_eq!(line, CacheLine { tag, index, offset: 0 });
    }

    #[test]
    fn decode_then_encode_aligns_to_block(
        block_exp in 0u32..=12,
        set_exp in 0u32..=16,
        addr in any::<u32>(),
    ) {
        let block = 1u32 << block_exp;
        let bits = AddressBits::new("L1", block, 1 << set_exp).unwrap();
        let line = bits.decode(addr);
        prop_assert_eq!(line.offset, addr & (block - 1));
        prop_assert_eq!(bits.encode(line.tag, line.index), addr & !(block - 1));
    }
}
