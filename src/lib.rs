//! tribunal - audit decision transcripts and certify deterministic replays
//!
//! Two subsystems share one content hasher:
//! - the transcript dependency graph (blast radius, fragility, cycles)
//! - snapshots and replay verification (hash chains, divergence, diff)

pub mod cli;
pub mod diff;
pub mod engine;
pub mod graph;
pub mod hashing;
pub mod ledger;
pub mod observability;
pub mod replay;
pub mod snapshot;
pub mod transcript;
