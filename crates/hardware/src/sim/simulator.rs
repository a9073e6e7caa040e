//! Simulator: owns the hierarchy and replays references through it.

use crate::common::data::MemoryReference;
use crate::common::error::{ConfigError, TraceError};
use crate::config::HierarchyConfig;
use crate::hierarchy::{AccessOutcome, Hierarchy};
use crate::stats::Report;

/// Top-level simulator: the cache hierarchy plus a reference counter.
#[derive(Clone, Debug)]
pub struct Simulator {
    hierarchy: Hierarchy,
    references: u64,
}

impl Simulator {
    /// Creates a simulator over an empty hierarchy.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the hierarchy cannot be built.
    pub fn new(config: HierarchyConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            hierarchy: Hierarchy::new(config)?,
            references: 0,
        })
    }

    /// Processes one reference.
    pub fn step(&mut self, reference: MemoryReference) -> AccessOutcome {
        self.references += 1;
        self.hierarchy.access(reference)
    }

    /// Processes every reference in order.
    pub fn run<I>(&mut self, references: I)
    where
        I: IntoIterator<Item = MemoryReference>,
    {
        for reference in references {
            let _ = self.step(reference);
        }
    }

    /// Processes references from a fallible source such as a
    /// [`TraceReader`](crate::sim::trace::TraceReader).
    ///
    /// References before the first error stay applied.
    ///
    /// # Errors
    ///
    /// Returns the first error the source yields.
    pub fn replay<I>(&mut self, references: I) -> Result<(), TraceError>
    where
        I: IntoIterator<Item = Result<MemoryReference, TraceError>>,
    {
        for reference in references {
            let _ = self.step(reference?);
        }
        tracing::debug!(references = self.references, "trace replayed");
        Ok(())
    }

    /// Number of references processed.
    #[inline]
    pub const fn references(&self) -> u64 {
        self.references
    }

    /// The simulated hierarchy.
    #[inline]
    pub const fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Report over the current state.
    pub const fn report(&self) -> Report<'_> {
        Report::new(&self.hierarchy)
    }
}
