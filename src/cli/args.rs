//! CLI argument definitions using clap
//!
//! Commands:
//! - tribunal graph list|inspect|cycles|blast-radius|fragility
//! - tribunal snapshot create|list|show
//! - tribunal replay <run_id>
//! - tribunal verify <run_id> --trials <n>
//! - tribunal diff <run_a> <run_b>
//! - tribunal ledger recent

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// tribunal - audit decision transcripts and certify replays
#[derive(Parser, Debug)]
#[command(name = "tribunal")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect the transcript dependency graph
    Graph {
        #[command(subcommand)]
        action: GraphAction,
    },

    /// Create and inspect run snapshots
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },

    /// Replay a recorded run and compare hash stages
    Replay {
        /// Run to replay
        run_id: String,

        /// Resume from this pipeline step
        #[arg(long)]
        from_step: Option<u32>,

        /// Engine deadline in milliseconds (overrides the config)
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Tool registry JSON file to replay with
        #[arg(long)]
        registry: Option<PathBuf>,

        /// Persist the replay snapshot next to the original
        #[arg(long)]
        persist: bool,

        /// Report a divergence as an error instead of a FAIL verdict
        #[arg(long)]
        strict: bool,
    },

    /// Replay a run repeatedly and require identical chain hashes
    Verify {
        /// Run to verify
        run_id: String,

        /// Number of trials
        #[arg(long, default_value_t = 3)]
        trials: u32,
    },

    /// Structurally compare two runs
    Diff {
        /// Left run
        run_a: String,

        /// Right run
        run_b: String,
    },

    /// Read the execution ledger
    Ledger {
        #[command(subcommand)]
        action: LedgerAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum GraphAction {
    /// List every node with its edges
    List,

    /// Show one node
    Inspect {
        /// Transcript hash
        hash: String,
    },

    /// Report every elementary cycle
    Cycles,

    /// Transitive dependents of a node
    BlastRadius {
        /// Transcript hash
        hash: String,
    },

    /// Rank nodes by fragility
    Fragility {
        /// Only the most fragile N nodes
        #[arg(long)]
        top: Option<usize>,
    },
}

/// Built-in decision specs
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fixture {
    /// Vendor contract negotiation
    Negotiation,
    /// Production incident response
    Ops,
}

#[derive(Subcommand, Debug)]
pub enum SnapshotAction {
    /// Run the seeded engine and record a snapshot
    Create {
        /// Run identifier (generated when omitted)
        #[arg(long)]
        run_id: Option<String>,

        /// Decision spec JSON file
        #[arg(long, conflicts_with = "fixture")]
        spec: Option<PathBuf>,

        /// Built-in decision spec
        #[arg(long, value_enum, default_value_t = Fixture::Negotiation)]
        fixture: Fixture,

        /// Seed; runs without one cannot be replayed
        #[arg(long)]
        seed: Option<String>,

        /// Tool registry JSON file
        #[arg(long)]
        registry: Option<PathBuf>,
    },

    /// List runs with snapshots
    List,

    /// Show a snapshot
    Show {
        /// Run identifier
        run_id: String,

        /// Specific snapshot (the original when omitted)
        #[arg(long)]
        snapshot_id: Option<String>,

        /// Fail unless the snapshot is replayable by this build
        #[arg(long)]
        check_env: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum LedgerAction {
    /// Most recent artifacts, newest first
    Recent {
        /// Maximum number of artifacts
        #[arg(short, long, default_value_t = 10)]
        n: usize,

        /// Include a summary of the listed artifacts
        #[arg(long)]
        summary: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
