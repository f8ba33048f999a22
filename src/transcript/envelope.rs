//! Transcript envelopes
//!
//! An envelope is the persisted unit of exchange: one transcript, its hash,
//! and where it came from. On disk an envelope is a single `.json` file.
//!
//! Loading always recomputes the transcript hash; an envelope whose recorded
//! hash disagrees with its content is rejected.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hashing::HashResult;

use super::errors::{TranscriptError, TranscriptResult};
use super::model::DecisionTranscript;

/// File extension of envelope files.
pub const ENVELOPE_EXTENSION: &str = "json";

/// Where a transcript came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    /// Producing system or file
    pub source: String,
    /// Run that produced the transcript, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    /// When the envelope was sealed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Default for Provenance {
    fn default() -> Self {
        Self {
            source: "unknown".to_string(),
            run_id: None,
            created_at: None,
        }
    }
}

/// A transcript wrapped with its hash and provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEnvelope {
    /// The wrapped transcript
    pub transcript: DecisionTranscript,
    /// Content hash of `transcript`; the dependency graph's node key
    pub transcript_hash: String,
    /// Provenance metadata (not part of the hash)
    #[serde(default)]
    pub provenance: Provenance,
}

impl TranscriptEnvelope {
    /// Wrap a transcript, computing its hash.
    pub fn seal(transcript: DecisionTranscript, provenance: Provenance) -> HashResult<Self> {
        let transcript_hash = transcript.transcript_hash()?.to_string();
        Ok(Self {
            transcript,
            transcript_hash,
            provenance,
        })
    }

    /// Wrap a transcript under a caller-chosen key without hashing.
    ///
    /// Useful for graphs assembled from identifiers that are not content
    /// hashes; `verify` will reject such envelopes.
    pub fn with_hash(transcript_hash: impl Into<String>, transcript: DecisionTranscript) -> Self {
        Self {
            transcript,
            transcript_hash: transcript_hash.into(),
            provenance: Provenance::default(),
        }
    }

    /// Declared dependency hashes
    pub fn dependencies(&self) -> &[String] {
        &self.transcript.dependencies
    }

    /// Check the recorded hash against the transcript content.
    pub fn verify(&self) -> TranscriptResult<()> {
        let computed = self
            .transcript
            .transcript_hash()
            .map_err(|e| TranscriptError::hash_mismatch(&self.transcript_hash, e.message()))?
            .to_string();

        if computed != self.transcript_hash {
            return Err(TranscriptError::hash_mismatch(
                &self.transcript_hash,
                &computed,
            ));
        }
        Ok(())
    }

    /// Write the envelope as pretty JSON with fsync.
    pub fn write_to_file(&self, path: &Path) -> TranscriptResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| TranscriptError::parse_error(path, e))?;

        let mut file = File::create(path).map_err(|e| TranscriptError::io_error_at_path(path, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| TranscriptError::io_error_at_path(path, e))?;
        file.sync_all()
            .map_err(|e| TranscriptError::io_error_at_path(path, e))
    }
}

/// List envelope files in a directory, sorted by file name.
///
/// Only regular files with the `.json` extension are returned; the
/// directory is not searched recursively.
pub fn envelope_files_in_dir(dir: &Path) -> TranscriptResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| TranscriptError::io_error_at_path(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| TranscriptError::io_error_at_path(dir, e))?;
        let path = entry.path();
        let is_envelope = path.is_file()
            && path
                .extension()
                .map(|ext| ext == ENVELOPE_EXTENSION)
                .unwrap_or(false);
        if is_envelope {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Load and verify one envelope.
pub fn load_envelope_from_file(path: &Path) -> TranscriptResult<TranscriptEnvelope> {
    let contents =
        fs::read_to_string(path).map_err(|e| TranscriptError::io_error_at_path(path, e))?;

    let envelope: TranscriptEnvelope =
        serde_json::from_str(&contents).map_err(|e| TranscriptError::parse_error(path, e))?;

    envelope.verify()?;
    Ok(envelope)
}

/// Load and verify every envelope in a directory.
pub fn load_envelopes_from_dir(dir: &Path) -> TranscriptResult<Vec<TranscriptEnvelope>> {
    envelope_files_in_dir(dir)?
        .iter()
        .map(|path| load_envelope_from_file(path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{DecisionResult, DecisionSpec};
    use tempfile::TempDir;

    fn transcript(title: &str, dependencies: &[&str]) -> DecisionTranscript {
        DecisionTranscript {
            spec: DecisionSpec {
                title: title.to_string(),
                context: "ctx".to_string(),
                actions: vec!["hold".to_string()],
                assumptions: vec![],
            },
            result: DecisionResult::default(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn test_seal_then_verify() {
        let envelope = TranscriptEnvelope::seal(transcript("a", &[]), Provenance::default()).unwrap();
        assert!(envelope.transcript_hash.starts_with("sha256:"));
        envelope.verify().unwrap();
    }

    #[test]
    fn test_tampered_envelope_rejected() {
        let mut envelope =
            TranscriptEnvelope::seal(transcript("a", &[]), Provenance::default()).unwrap();
        envelope.transcript.spec.title = "b".to_string();

        let err = envelope.verify().unwrap_err();
        assert_eq!(err.code().code(), "TRIB_TRANSCRIPT_HASH_MISMATCH");
    }

    #[test]
    fn test_directory_listing_and_loading() {
        let dir = TempDir::new().unwrap();

        let first = TranscriptEnvelope::seal(transcript("first", &[]), Provenance::default()).unwrap();
        let second = TranscriptEnvelope::seal(
            transcript("second", &[first.transcript_hash.as_str()]),
            Provenance::default(),
        )
        .unwrap();

        first.write_to_file(&dir.path().join("b.json")).unwrap();
        second.write_to_file(&dir.path().join("a.json")).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let files = envelope_files_in_dir(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.json"));

        let loaded = load_envelopes_from_dir(dir.path()).unwrap();
        assert_eq!(loaded[0], second);
        assert_eq!(loaded[1], first);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();

        let err = load_envelope_from_file(&path).unwrap_err();
        assert_eq!(err.code().code(), "TRIB_TRANSCRIPT_PARSE");
    }
}
