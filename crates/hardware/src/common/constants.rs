//! Global Simulator Constants.
//!
//! This module defines constants shared across the simulator. It includes:
//! 1. **Address Constants:** Width of a simulated memory address.
//! 2. **Timing Model Constants:** Parameters of the average access time model
//!    used when reporting results.

/// Width of a memory address in bits.
pub const ADDRESS_BITS: u32 = 32;

/// Area reference for the hit-time model (512 KiB).
pub const HIT_TIME_AREA_BYTES: f64 = 512.0 * 1024.0;

/// Fixed hit-time component of the primary cache (ns).
pub const L1_HIT_TIME_BASE_NS: f64 = 0.25;

/// Fixed hit-time component of the secondary cache (ns).
pub const L2_HIT_TIME_BASE_NS: f64 = 2.5;

/// Hit-time growth per [`HIT_TIME_AREA_BYTES`] of capacity (ns).
pub const HIT_TIME_PER_AREA_NS: f64 = 2.5;

/// Hit-time growth per 16 bytes of block size (ns).
pub const HIT_TIME_PER_16B_BLOCK_NS: f64 = 0.025;

/// Hit-time growth per way of associativity (ns).
pub const HIT_TIME_PER_WAY_NS: f64 = 0.025;

/// Fixed latency of main memory (ns).
pub const MEMORY_LATENCY_NS: f64 = 20.0;

/// Transfer time per 16 bytes of block from main memory (ns).
pub const MEMORY_TRANSFER_PER_16B_NS: f64 = 0.5;
