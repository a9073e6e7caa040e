//! Memory Reference Types.
//!
//! This module defines the unit of work fed to the cache hierarchy:
//! 1. **Access Type:** Whether a reference reads or writes memory.
//! 2. **Memory Reference:** An access type paired with a 32-bit address.

use std::fmt;

use super::error::TraceError;

/// Type of memory access operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessType {
    /// Data read (`r` in a trace).
    Read,

    /// Data write (`w` in a trace).
    ///
    /// Marks blocks dirty under write-back and allocates on a miss only under
    /// write-allocate.
    Write,
}

impl AccessType {
    /// Returns `true` for [`AccessType::Write`].
    #[inline]
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Write)
    }
}

impl TryFrom<char> for AccessType {
    type Error = TraceError;

    fn try_from(kind: char) -> Result<Self, Self::Error> {
        match kind {
            'r' | 'R' => Ok(Self::Read),
            'w' | 'W' => Ok(Self::Write),
            other => Err(TraceError::UnknownAccessKind {
                line: 0,
                kind: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "r"),
            Self::Write => write!(f, "w"),
        }
    }
}

/// A single memory reference replayed against the hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MemoryReference {
    /// Read or write.
    pub kind: AccessType,
    /// Byte address.
    pub addr: u32,
}

impl MemoryReference {
    /// Creates a read reference.
    #[inline]
    pub const fn read(addr: u32) -> Self {
        Self {
            kind: AccessType::Read,
            addr,
        }
    }

    /// Creates a write reference.
    #[inline]
    pub const fn write(addr: u32) -> Self {
        Self {
            kind: AccessType::Write,
            addr,
        }
    }
}

impl fmt::Display for MemoryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:#x}", self.kind, self.addr)
    }
}
