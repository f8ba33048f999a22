//! # Ledger
//!
//! Read-only view of the execution ledger: a bounded, newest-first listing
//! of artifacts and a summary over it. Storing executions is the ledger
//! service's business, not ours.

mod artifact;
mod errors;
mod jsonl;
mod summary;

pub use artifact::{Artifact, FlipDistance};
pub use errors::{LedgerError, LedgerResult};
pub use jsonl::{JsonlLedger, LedgerSource};
pub use summary::{summarize, LedgerSummary};
