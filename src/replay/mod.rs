//! # Replay
//!
//! Re-executes a recorded run and certifies that it reproduces.
//!
//! - Loads the original snapshot and checks integrity and environment
//! - Refuses non-deterministic runs outright
//! - Recomputes with the recorded spec, options, seed and tool registry
//! - Compares hash stages in chain order and reports the first divergence
//!
//! A replay never mutates the original snapshot. The replay snapshot is
//! persisted only when the caller asks for it.

mod compare;
mod errors;
mod runner;
mod state;
mod trials;

pub use compare::{first_divergence, Divergence, HashStage};
pub use errors::ReplayError;
pub use runner::{replay_run, ReplayOptions, ReplayResult, Replayer, Verdict};
pub use state::ReplayState;
pub use trials::{verify_determinism, TrialReport};
