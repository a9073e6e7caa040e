//! Simulation driver tests.

/// Trace line parsing and file reading.
pub mod trace;
