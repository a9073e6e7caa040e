//! Simulation statistics collection and reporting.
//!
//! This module tracks the counters of every cache level. It provides:
//! 1. **Counters:** Reads, writes, hits, misses, write-backs, block traffic and swaps.
//! 2. **Rates:** Accesses, hits, misses and miss rate derived from the counters.
//! 3. **Timing model:** Hit time, miss penalty and average access time (AAT).
//! 4. **Reporting:** A sectioned text report and a JSON dump.

use std::fmt;

use serde::Serialize;

use crate::cache::{CacheLevel, LevelKind};
use crate::common::constants::{
    HIT_TIME_AREA_BYTES, HIT_TIME_PER_16B_BLOCK_NS, HIT_TIME_PER_AREA_NS, HIT_TIME_PER_WAY_NS,
    L1_HIT_TIME_BASE_NS, L2_HIT_TIME_BASE_NS, MEMORY_LATENCY_NS, MEMORY_TRANSFER_PER_16B_NS,
};
use crate::common::data::AccessType;
use crate::config::{ReplacementPolicy, WritePolicy};
use crate::hierarchy::Hierarchy;

/// Counters of one cache level.
///
/// Every reference presented to a level counts as a read or a write there,
/// including fetches and write-backs arriving from the level above and
/// probes of the victim cache. Victim insertions are not references.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Read references.
    pub reads: u64,
    /// Write references.
    pub writes: u64,
    /// Reads that found the block resident.
    pub read_hits: u64,
    /// Writes that found the block resident.
    pub write_hits: u64,
    /// Reads that missed.
    pub read_misses: u64,
    /// Writes that missed.
    pub write_misses: u64,
    /// Dirty blocks that left this level.
    pub write_backs: u64,
    /// Blocks moved between this level and the one below (fills, write-backs
    /// and write-through writes).
    pub memory_traffic: u64,
    /// Victim cache hits resolved by swapping with L1.
    pub swaps: u64,
}

impl CacheStats {
    pub(crate) const fn record_access(&mut self, kind: AccessType) {
        match kind {
            AccessType::Read => self.reads += 1,
            AccessType::Write => self.writes += 1,
        }
    }

    pub(crate) const fn record_hit(&mut self, kind: AccessType) {
        match kind {
            AccessType::Read => self.read_hits += 1,
            AccessType::Write => self.write_hits += 1,
        }
    }

    pub(crate) const fn record_miss(&mut self, kind: AccessType) {
        match kind {
            AccessType::Read => self.read_misses += 1,
            AccessType::Write => self.write_misses += 1,
        }
    }

    /// Reads plus writes.
    #[inline]
    pub const fn accesses(&self) -> u64 {
        self.reads + self.writes
    }

    /// Read hits plus write hits.
    #[inline]
    pub const fn hits(&self) -> u64 {
        self.read_hits + self.write_hits
    }

    /// Read misses plus write misses.
    #[inline]
    pub const fn misses(&self) -> u64 {
        self.read_misses + self.write_misses
    }

    /// Misses over accesses, or 0 before the first access.
    pub fn miss_rate(&self) -> f64 {
        ratio(self.misses(), self.accesses())
    }
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// Hit time of `level` in nanoseconds.
///
/// `base + 2.5 * size / 512 KiB + 0.025 * block / 16 + 0.025 * assoc`, with a
/// base of 0.25 ns for L1 and 2.5 ns for L2. The victim cache has no entry in
/// the model and yields `None`.
pub fn hit_time_ns(level: &CacheLevel) -> Option<f64> {
    let base = match level.kind() {
        LevelKind::L1 => L1_HIT_TIME_BASE_NS,
        LevelKind::L2 => L2_HIT_TIME_BASE_NS,
        LevelKind::Victim => return None,
    };
    Some(
        base + HIT_TIME_PER_AREA_NS * (level.size() as f64 / HIT_TIME_AREA_BYTES)
            + HIT_TIME_PER_16B_BLOCK_NS * (level.block_size() as f64 / 16.0)
            + HIT_TIME_PER_WAY_NS * level.associativity() as f64,
    )
}

/// Main memory penalty in nanoseconds: `20 + 0.5 * block / 16`.
pub fn miss_penalty_ns(block_size: u32) -> f64 {
    MEMORY_LATENCY_NS + MEMORY_TRANSFER_PER_16B_NS * (block_size as f64 / 16.0)
}

/// L1 miss rate after discounting misses the victim cache served.
pub fn l1_effective_miss_rate(hierarchy: &Hierarchy) -> f64 {
    let swaps = hierarchy.victim().map_or(0, |victim| victim.stats().swaps);
    let l1 = hierarchy.l1().stats();
    ratio(l1.misses().saturating_sub(swaps), l1.accesses())
}

/// Average access time in nanoseconds.
///
/// `HT_L1 + MR_L1 * (HT_L2 + MR_L2 * MP)` with an L2, `HT_L1 + MR_L1 * MP`
/// without. `MR_L2` only counts read misses over reads: write-backs arriving
/// from above are not demand traffic.
pub fn average_access_time_ns(hierarchy: &Hierarchy) -> f64 {
    let l1 = hierarchy.l1();
    let penalty = miss_penalty_ns(l1.block_size());
    let below_l1 = hierarchy.l2().map_or(penalty, |l2| {
        let stats = l2.stats();
        hit_time_ns(l2).unwrap_or_default() + ratio(stats.read_misses, stats.reads) * penalty
    });
    hit_time_ns(l1).unwrap_or_default() + l1_effective_miss_rate(hierarchy) * below_l1
}

/// Section names for selective report output.
///
/// Valid section identifiers: `"config"`, `"contents"`, `"raw"`, `"performance"`.
/// An empty selection renders every section.
pub const REPORT_SECTIONS: &[&str] = &["config", "contents", "raw", "performance"];

const RULE: &str = "==========================================================";
const THIN_RULE: &str = "----------------------------------------------------------";

/// End-of-run report over a hierarchy.
///
/// Rendered through [`fmt::Display`]:
///
/// ```
/// use cachesim_core::config::HierarchyConfig;
/// use cachesim_core::hierarchy::Hierarchy;
/// use cachesim_core::stats::Report;
///
/// let hierarchy = Hierarchy::new(HierarchyConfig::default()).unwrap();
/// let text = Report::new(&hierarchy).with_sections(&["raw"]).to_string();
/// assert!(text.contains("l1.reads"));
/// assert!(!text.contains("SIMULATOR CONFIGURATION"));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Report<'a> {
    hierarchy: &'a Hierarchy,
    trace_name: Option<&'a str>,
    sections: &'a [&'a str],
}

impl<'a> Report<'a> {
    /// Creates a report rendering every section.
    pub const fn new(hierarchy: &'a Hierarchy) -> Self {
        Self {
            hierarchy,
            trace_name: None,
            sections: &[],
        }
    }

    /// Names the trace in the configuration section.
    #[must_use]
    pub const fn with_trace_name(mut self, name: &'a str) -> Self {
        self.trace_name = Some(name);
        self
    }

    /// Restricts output to the given [`REPORT_SECTIONS`]; empty means all.
    #[must_use]
    pub const fn with_sections(mut self, sections: &'a [&'a str]) -> Self {
        self.sections = sections;
        self
    }

    fn wants(&self, section: &str) -> bool {
        self.sections.is_empty() || self.sections.contains(&section)
    }

    /// Serializes configuration, counters and timing as pretty JSON.
    ///
    /// # Errors
    ///
    /// Propagates serialization failures from `serde_json`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let levels = self
            .hierarchy
            .levels()
            .map(|level| LevelSummary {
                level: level.kind(),
                size: level.size(),
                associativity: level.associativity(),
                replacement: level.replacement(),
                write_policy: level.write_policy(),
                miss_rate: level.stats().miss_rate(),
                hit_time_ns: hit_time_ns(level),
                stats: *level.stats(),
            })
            .collect();
        serde_json::to_string_pretty(&ReportSummary {
            trace: self.trace_name,
            block_size: self.hierarchy.config().block_size,
            levels,
            l1_effective_miss_rate: l1_effective_miss_rate(self.hierarchy),
            miss_penalty_ns: miss_penalty_ns(self.hierarchy.config().block_size),
            average_access_time_ns: average_access_time_ns(self.hierarchy),
        })
    }

    fn fmt_config(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.hierarchy.config();
        writeln!(f, "CACHE SIMULATOR CONFIGURATION")?;
        writeln!(f, "  {:<24} {}", "block_size", config.block_size)?;
        for level in self.hierarchy.levels() {
            let name = level.name().to_ascii_lowercase();
            writeln!(f, "  {:<24} {}", format!("{name}.size"), level.size())?;
            writeln!(f, "  {:<24} {}", format!("{name}.assoc"), level.associativity())?;
            if level.kind() != LevelKind::Victim {
                writeln!(f, "  {:<24} {}", format!("{name}.replacement"), level.replacement())?;
                writeln!(f, "  {:<24} {}", format!("{name}.write_policy"), level.write_policy())?;
            }
        }
        if self.hierarchy.victim().is_none() {
            writeln!(f, "  {:<24} {}", "victim.size", 0)?;
        }
        if self.hierarchy.l2().is_none() {
            writeln!(f, "  {:<24} {}", "l2.size", 0)?;
        }
        if let Some(trace) = self.trace_name {
            writeln!(f, "  {:<24} {}", "trace_file", trace)?;
        }
        writeln!(f, "{THIN_RULE}")
    }

    fn fmt_contents(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for level in self.hierarchy.levels() {
            writeln!(f, "{} CONTENTS", level.name().to_ascii_uppercase())?;
            let tags = level.tags();
            for index in 0..tags.num_sets() {
                write!(f, "  set {index:>4}:")?;
                for block in tags.set(index) {
                    if block.valid {
                        let dirty = if block.dirty { 'D' } else { ' ' };
                        write!(f, " {:>8x} {dirty}", block.tag)?;
                    } else {
                        write!(f, " {:>8} {}", "-", ' ')?;
                    }
                }
                writeln!(f)?;
            }
            writeln!(f, "{THIN_RULE}")?;
        }
        Ok(())
    }

    fn fmt_raw(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RAW RESULTS")?;
        for level in self.hierarchy.levels() {
            let name = level.name().to_ascii_lowercase();
            let stats = level.stats();
            let row = |f: &mut fmt::Formatter<'_>, field: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:<24} {}", format!("{name}.{field}"), value)
            };
            row(f, "reads", &stats.reads)?;
            row(f, "read_misses", &stats.read_misses)?;
            row(f, "writes", &stats.writes)?;
            row(f, "write_misses", &stats.write_misses)?;
            row(f, "miss_rate", &format_args!("{:.4}", stats.miss_rate()))?;
            if level.kind() == LevelKind::Victim {
                row(f, "swaps", &stats.swaps)?;
            }
            row(f, "write_backs", &stats.write_backs)?;
            row(f, "memory_traffic", &stats.memory_traffic)?;
        }
        writeln!(f, "{THIN_RULE}")
    }

    fn fmt_performance(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PERFORMANCE")?;
        writeln!(
            f,
            "  {:<24} {:.4}",
            "l1.effective_miss_rate",
            l1_effective_miss_rate(self.hierarchy)
        )?;
        writeln!(
            f,
            "  {:<24} {:.4} ns",
            "average_access_time",
            average_access_time_ns(self.hierarchy)
        )
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        if self.wants("config") {
            self.fmt_config(f)?;
        }
        if self.wants("contents") {
            self.fmt_contents(f)?;
        }
        if self.wants("raw") {
            self.fmt_raw(f)?;
        }
        if self.wants("performance") {
            self.fmt_performance(f)?;
        }
        writeln!(f, "{RULE}")
    }
}

#[derive(Serialize)]
struct ReportSummary<'a> {
    trace: Option<&'a str>,
    block_size: u32,
    levels: Vec<LevelSummary>,
    l1_effective_miss_rate: f64,
    miss_penalty_ns: f64,
    average_access_time_ns: f64,
}

#[derive(Serialize)]
struct LevelSummary {
    level: LevelKind,
    size: u32,
    associativity: u32,
    replacement: ReplacementPolicy,
    write_policy: WritePolicy,
    miss_rate: f64,
    hit_time_ns: Option<f64>,
    stats: CacheStats,
}
