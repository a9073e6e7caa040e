//! Cache hierarchy simulator CLI.
//!
//! This binary replays a memory trace through an L1 cache with an optional
//! victim cache and L2. It performs:
//! 1. **Configuration:** Geometry from positional arguments, or a JSON file via `--config`.
//! 2. **Replay:** Streams the trace through the hierarchy, stopping at the first bad line.
//! 3. **Reporting:** Prints the selected report sections, or the whole report as JSON.
//!
//! Diagnostics go to stderr through `tracing`; `RUST_LOG` overrides `-v`.

use std::error::Error;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::{fs, process};

use clap::builder::PossibleValuesParser;
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use cachesim_core::config::{HierarchyConfig, LevelConfig, ReplacementPolicy, WritePolicy};
use cachesim_core::sim::{Simulator, TraceReader};
use cachesim_core::stats::REPORT_SECTIONS;

#[derive(Parser, Debug)]
#[command(
    name = "cachesim",
    author,
    version,
    about = "Trace-driven L1 / victim / L2 cache simulator",
    long_about = "Replay a memory trace of `r|w <hex-address>` lines through an L1 cache with an optional victim cache and L2, then report hit/miss counters and average access time.\n\nA size of 0 disables the victim cache or L2.\n\nExamples:\n  cachesim 16 1024 2 0 0 0 traces/gcc.trace\n  cachesim 32 2048 4 128 16384 8 traces/gcc.trace --section raw\n  cachesim 16 1024 2 0 8192 4 traces/gcc.trace --l1-policy lfu --json"
)]
struct Cli {
    /// Block size in bytes, shared by every level; a power of two.
    block_size: u32,

    /// L1 size in bytes.
    l1_size: u32,

    /// L1 associativity.
    l1_assoc: u32,

    /// Victim cache size in bytes; 0 disables it.
    victim_size: u32,

    /// L2 size in bytes; 0 disables it.
    l2_size: u32,

    /// L2 associativity.
    l2_assoc: u32,

    /// Trace file of `r|w <hex-address>` lines.
    trace_file: PathBuf,

    /// L1 replacement policy (`lru` or `lfu`).
    #[arg(long, default_value_t = ReplacementPolicy::Lru)]
    l1_policy: ReplacementPolicy,

    /// L2 replacement policy (`lru` or `lfu`).
    #[arg(long, default_value_t = ReplacementPolicy::Lru)]
    l2_policy: ReplacementPolicy,

    /// Write policy of L1 and L2 (`wbwa` or `wtna`).
    #[arg(long, default_value_t = WritePolicy::WriteBackWriteAllocate)]
    write_policy: WritePolicy,

    /// JSON hierarchy configuration; replaces the geometry and policy arguments.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report section to print; repeat for several. Default: all.
    #[arg(long = "section", value_parser = PossibleValuesParser::new(REPORT_SECTIONS.iter().copied()))]
    sections: Vec<String>,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Hierarchy described by the positional arguments and policy flags.
    fn hierarchy_config(&self) -> HierarchyConfig {
        HierarchyConfig {
            block_size: self.block_size,
            l1: LevelConfig {
                size: self.l1_size,
                associativity: self.l1_assoc,
                replacement: self.l1_policy,
                write_policy: self.write_policy,
            },
            victim_size: self.victim_size,
            l2: LevelConfig {
                size: self.l2_size,
                associativity: self.l2_assoc,
                replacement: self.l2_policy,
                write_policy: self.write_policy,
            },
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

/// Installs the stderr subscriber. `RUST_LOG`, when set, takes precedence.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Reads a [`HierarchyConfig`] from a JSON file.
fn load_config(path: &Path) -> Result<HierarchyConfig, Box<dyn Error>> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("could not read config '{}': {e}", path.display()))?;
    let config = serde_json::from_str(&text)
        .map_err(|e| format!("invalid config '{}': {e}", path.display()))?;
    Ok(config)
}

/// Builds the hierarchy, replays the trace and prints the report.
fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => cli.hierarchy_config(),
    };
    tracing::info!(?config, "configuration");

    let mut sim = Simulator::new(config)?;
    sim.replay(TraceReader::open(&cli.trace_file)?)?;
    tracing::info!(references = sim.references(), "simulation finished");

    let trace_name = cli.trace_file.display().to_string();
    let sections: Vec<&str> = cli.sections.iter().map(String::as_str).collect();
    let report = sim
        .report()
        .with_trace_name(&trace_name)
        .with_sections(&sections);

    let mut out = io::stdout().lock();
    if cli.json {
        writeln!(out, "{}", report.to_json()?)?;
    } else {
        write!(out, "{report}")?;
    }
    out.flush()?;
    Ok(())
}
