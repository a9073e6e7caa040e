//! Trace-driven cache hierarchy simulator library.
//!
//! This crate models an L1 cache with an optional victim cache and L2:
//! 1. **Common:** Address split, memory references and error types.
//! 2. **Cache:** Tag stores, LRU/LFU replacement and per-level state.
//! 3. **Hierarchy:** Level ownership and the per-reference state machine.
//! 4. **Simulation:** Trace parsing, the replay driver and statistics reporting.

/// Common types and constants (addresses, references, errors).
pub mod common;
/// Simulator configuration (defaults, policies, per-level geometry).
pub mod config;
/// Cache levels (tag store, replacement policies).
pub mod cache;
/// Hierarchy aggregate and reference engine.
pub mod hierarchy;
/// Trace reader and simulator driver.
pub mod sim;
/// Per-level statistics, timing model and reports.
pub mod stats;

/// Root configuration type; use `HierarchyConfig::default()` or deserialize from JSON.
pub use crate::config::HierarchyConfig;
/// Cache hierarchy; construct with `Hierarchy::new`.
pub use crate::hierarchy::{AccessOutcome, Hierarchy};
/// Replay driver over a hierarchy.
pub use crate::sim::Simulator;
