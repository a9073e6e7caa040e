//! Simulation driver and trace input.
//!
//! Provides the trace reader that turns text traces into references, and
//! the simulator that replays them through a hierarchy.

/// Top-level simulator driving the hierarchy.
pub mod simulator;

/// Line-oriented trace parsing.
pub mod trace;

pub use simulator::Simulator;
pub use trace::TraceReader;
