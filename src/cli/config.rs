//! Configuration file
//!
//! ```json
//! {
//!   "snapshot_dir": "./tribunal/snapshots",
//!   "envelope_dir": "./tribunal/envelopes",
//!   "ledger_path": "./tribunal/ledger.jsonl",
//!   "replay_timeout_ms": 30000,
//!   "fragility": { "blast_radius": 1.0, "depth": 0.5, "assumptions": 0.25 }
//! }
//! ```
//!
//! Every field is optional.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::graph::FragilityWeights;
use crate::observability::{log_event_with_fields, Event};

use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Snapshot store root
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,

    /// Directory of transcript envelopes
    #[serde(default = "default_envelope_dir")]
    pub envelope_dir: PathBuf,

    /// JSONL ledger file; ledger commands fail without it
    #[serde(default)]
    pub ledger_path: Option<PathBuf>,

    /// Default replay deadline; no deadline when absent
    #[serde(default)]
    pub replay_timeout_ms: Option<u64>,

    /// Fragility score weights
    #[serde(default)]
    pub fragility: FragilityWeights,
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("./tribunal/snapshots")
}

fn default_envelope_dir() -> PathBuf {
    PathBuf::from("./tribunal/envelopes")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_dir: default_snapshot_dir(),
            envelope_dir: default_envelope_dir(),
            ledger_path: None,
            replay_timeout_ms: None,
            fragility: FragilityWeights::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config = Self::parse(&content)?;

        log_event_with_fields(
            Event::ConfigLoaded,
            &[("path", &path.display().to_string())],
        );
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Parse and validate configuration JSON
    pub fn parse(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.snapshot_dir.as_os_str().is_empty() {
            return Err(CliError::config_error("snapshot_dir must not be empty"));
        }

        if self.envelope_dir.as_os_str().is_empty() {
            return Err(CliError::config_error("envelope_dir must not be empty"));
        }

        if self.replay_timeout_ms == Some(0) {
            return Err(CliError::config_error("replay_timeout_ms must be > 0"));
        }

        self.fragility
            .validate()
            .map_err(|e| CliError::config_error(format!("Fragility config error: {}", e.message())))?;

        Ok(())
    }

    /// Replay deadline as a duration
    pub fn replay_timeout(&self) -> Option<Duration> {
        self.replay_timeout_ms.map(Duration::from_millis)
    }

    /// Ledger path, or a config error naming the missing field
    pub fn require_ledger_path(&self) -> CliResult<&Path> {
        self.ledger_path
            .as_deref()
            .ok_or_else(|| CliError::config_error("ledger_path is not configured"))
    }
}
