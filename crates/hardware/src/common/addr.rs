//! Address decoding for a single cache geometry.
//!
//! A 32-bit memory address is split into three fields for every cache level:
//! 1. **Tag:** The high `tag_bits` bits, compared against the tag store.
//! 2. **Index:** The middle `index_bits` bits, selecting the set.
//! 3. **Offset:** The low `offset_bits` bits, the byte within the block.
//!
//! The split is derived once at construction time and checked so that the
//! three widths always cover exactly 32 bits.

use super::constants::ADDRESS_BITS;
use super::error::ConfigError;

/// An address decomposed against one cache geometry.
///
/// Derived on every lookup, never stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CacheLine {
    /// Tag field, right-aligned.
    pub tag: u32,
    /// Set index.
    pub index: u32,
    /// Byte offset within the block.
    pub offset: u32,
}

/// Bit-width split of a 32-bit address for one cache level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressBits {
    tag_bits: u32,
    index_bits: u32,
    offset_bits: u32,
}

impl AddressBits {
    /// Derives the split from a block size and a set count.
    ///
    /// Both values must be non-zero powers of two; the caller is expected to
    /// have validated that already, so this only guards the bit budget.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BitWidthOverflow`] when the offset and index
    /// fields together need more than 32 bits.
    pub fn new(level: &str, block_size: u32, num_sets: u32) -> Result<Self, ConfigError> {
        let offset_bits = log2(block_size);
        let index_bits = log2(num_sets);
        let Some(tag_bits) = ADDRESS_BITS.checked_sub(offset_bits + index_bits) else {
            return Err(ConfigError::BitWidthOverflow {
                level: level.to_owned(),
                index_bits,
                offset_bits,
            });
        };
        Ok(Self {
            tag_bits,
            index_bits,
            offset_bits,
        })
    }

    /// Width of the tag field.
    #[inline]
    pub const fn tag_bits(&self) -> u32 {
        self.tag_bits
    }

    /// Width of the index field.
    #[inline]
    pub const fn index_bits(&self) -> u32 {
        self.index_bits
    }

    /// Width of the offset field.
    #[inline]
    pub const fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// Splits `addr` into tag, index and offset.
    #[inline]
    pub const fn decode(&self, addr: u32) -> CacheLine {
        CacheLine {
            tag: shr(addr, self.index_bits + self.offset_bits),
            index: shr(addr, self.offset_bits) & low_mask(self.index_bits),
            offset: addr & low_mask(self.offset_bits),
        }
    }

    /// Rebuilds the block-aligned address of `tag` in set `index`.
    ///
    /// The offset is always zero: only whole blocks are re-injected into the
    /// hierarchy (write-backs and victim transfers).
    #[inline]
    pub const fn encode(&self, tag: u32, index: u32) -> u32 {
        shl(tag, self.index_bits + self.offset_bits) | shl(index, self.offset_bits)
    }
}

/// Mask with the low `bits` bits set.
const fn low_mask(bits: u32) -> u32 {
    if bits >= ADDRESS_BITS {
        u32::MAX
    } else {
        (1 << bits) - 1
    }
}

/// Shift right that yields zero instead of overflowing on a full-width shift.
const fn shr(value: u32, bits: u32) -> u32 {
    if bits >= ADDRESS_BITS { 0 } else { value >> bits }
}

/// Shift left that yields zero instead of overflowing on a full-width shift.
const fn shl(value: u32, bits: u32) -> u32 {
    if bits >= ADDRESS_BITS { 0 } else { value << bits }
}

/// Floor of log2; `value` is a power of two everywhere this is called.
const fn log2(value: u32) -> u32 {
    if value == 0 { 0 } else { value.trailing_zeros() }
}
