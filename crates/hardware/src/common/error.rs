//! Error definitions.
//!
//! This module defines the user-facing failures of the simulator:
//! 1. **Configuration Errors:** Cache geometries that cannot be built.
//! 2. **Trace Errors:** Trace files that cannot be opened or parsed.
//!
//! Internal invariant violations are not represented here; they abort the
//! simulation with a panic naming the broken invariant.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A cache hierarchy configuration that cannot be constructed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Block size is zero or not a power of two.
    #[error("block size {0} is not a power of two")]
    BlockSizeNotPowerOfTwo(u32),

    /// A present level has a size of zero.
    #[error("{level}: cache size must be non-zero")]
    ZeroSize {
        /// Level name.
        level: String,
    },

    /// A present level has an associativity of zero.
    #[error("{level}: associativity must be non-zero")]
    ZeroAssociativity {
        /// Level name.
        level: String,
    },

    /// Size is not an exact multiple of `associativity * block_size`.
    #[error(
        "{level}: size {size} is not divisible by associativity {associativity} x block size {block_size}"
    )]
    UnevenGeometry {
        /// Level name.
        level: String,
        /// Size in bytes.
        size: u32,
        /// Blocks per set.
        associativity: u32,
        /// Block size in bytes.
        block_size: u32,
    },

    /// The derived number of sets cannot be addressed by an exact index field.
    #[error("{level}: set count {num_sets} is not a power of two")]
    SetCountNotPowerOfTwo {
        /// Level name.
        level: String,
        /// Derived number of sets.
        num_sets: u32,
    },

    /// Offset and index fields do not fit in a 32-bit address.
    #[error("{level}: {offset_bits} offset bits + {index_bits} index bits exceed a 32-bit address")]
    BitWidthOverflow {
        /// Level name.
        level: String,
        /// Width of the index field.
        index_bits: u32,
        /// Width of the offset field.
        offset_bits: u32,
    },

    /// A victim cache that is not a single fully-associative LRU set.
    #[error("{level}: victim cache must be fully associative with LRU replacement ({reason})")]
    VictimGeometry {
        /// Level name.
        level: String,
        /// Which part of the rule is broken.
        reason: &'static str,
    },

    /// A policy name that does not match any known policy.
    #[error("unknown {what} policy '{name}'")]
    UnknownPolicy {
        /// `replacement` or `write`.
        what: &'static str,
        /// The rejected name.
        name: String,
    },
}

/// A trace that cannot be read.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The trace file could not be opened.
    #[error("could not open trace file '{}': {source}", path.display())]
    Open {
        /// Path given by the caller.
        path: PathBuf,
        /// Underlying OS error.
        source: io::Error,
    },

    /// Reading from an already open trace failed.
    #[error("trace read failed: {0}")]
    Io(#[from] io::Error),

    /// A reference kind other than `r` or `w`.
    #[error("line {line}: unknown access kind '{kind}'")]
    UnknownAccessKind {
        /// 1-based line number, 0 outside of a file.
        line: usize,
        /// The offending token.
        kind: String,
    },

    /// A line with an access kind but no address.
    #[error("line {line}: missing address")]
    MissingAddress {
        /// 1-based line number.
        line: usize,
    },

    /// An address that is not a 32-bit hexadecimal number.
    #[error("line {line}: '{text}' is not a 32-bit hexadecimal address")]
    BadAddress {
        /// 1-based line number.
        line: usize,
        /// The offending token.
        text: String,
    },
}

impl TraceError {
    /// Attaches a line number to an error produced without file context.
    pub(crate) fn at_line(self, line: usize) -> Self {
        match self {
            Self::UnknownAccessKind { kind, .. } => Self::UnknownAccessKind { line, kind },
            Self::MissingAddress { .. } => Self::MissingAddress { line },
            Self::BadAddress { text, .. } => Self::BadAddress { line, text },
            other => other,
        }
    }
}
