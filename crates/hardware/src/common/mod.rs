//! Common utilities and types used throughout the cache simulator.
//!
//! This module provides the building blocks shared by every cache level:
//! 1. **Address Types:** The tag/index/offset split and its inverse.
//! 2. **Constants:** Address width and the timing model parameters.
//! 3. **Memory Access:** Read/write references replayed from a trace.
//! 4. **Error Handling:** Configuration and trace errors.

/// Address decoding and encoding (tag, index, offset).
pub mod addr;

/// Common constants used throughout the simulator.
pub mod constants;

/// Memory reference definitions.
pub mod data;

/// Error types.
pub mod error;

pub use addr::{AddressBits, CacheLine};
pub use constants::ADDRESS_BITS;
pub use data::{AccessType, MemoryReference};
pub use error::{ConfigError, TraceError};
