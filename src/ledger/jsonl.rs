//! JSON-lines ledger file
//!
//! One artifact per line. Blank lines are skipped; any other line that does
//! not parse fails the whole listing with its 1-based line number.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::observability::{log_event_with_fields, Event};

use super::artifact::Artifact;
use super::errors::{LedgerError, LedgerResult};

/// A bounded, time-ordered listing of recorded executions.
pub trait LedgerSource {
    /// At most `n` artifacts, newest first.
    fn list_recent_artifacts(&self, n: usize) -> LedgerResult<Vec<Artifact>>;
}

/// Ledger backed by a JSONL file.
#[derive(Debug, Clone)]
pub struct JsonlLedger {
    path: PathBuf,
}

impl JsonlLedger {
    /// Ledger reading `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the ledger file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every artifact in file order.
    pub fn read_all(&self) -> LedgerResult<Vec<Artifact>> {
        let contents = fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                LedgerError::NotFound(self.path.clone())
            } else {
                LedgerError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;
        parse_lines(&contents)
    }
}

impl LedgerSource for JsonlLedger {
    fn list_recent_artifacts(&self, n: usize) -> LedgerResult<Vec<Artifact>> {
        let mut artifacts = self.read_all()?;
        artifacts.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.decision_id.cmp(&b.decision_id))
        });
        artifacts.truncate(n);

        log_event_with_fields(
            Event::LedgerListed,
            &[
                ("path", &self.path.display().to_string()),
                ("count", &artifacts.len().to_string()),
            ],
        );
        Ok(artifacts)
    }
}

fn parse_lines(contents: &str) -> LedgerResult<Vec<Artifact>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|e| LedgerError::Parse {
                line: index + 1,
                reason: e.to_string(),
            })
        })
        .collect()
}
