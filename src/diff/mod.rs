//! # Run Diff
//!
//! Structural comparison of two runs, for reviewing intended changes.
//!
//! Sections and identity:
//! - actions: by value
//! - graph nodes: by id
//! - graph edges: by (from, to, label)
//! - evaluations: by lens
//! - explanation: reasoning and flip conditions by value
//!
//! Each section reports `added`, `removed` and `changed`. Replay answers
//! "did anything diverge"; diff answers "what differs".

mod run;
mod section;

pub use run::{diff_runs, diff_snapshots, ExplanationDiff, RunDiff};
pub use section::{diff_keyed, diff_values, Changed, SectionDiff};
