//! File-backed snapshot store
//!
//! Layout:
//!
//! ```text
//! <root>/
//!   <run_id>/
//!     <snapshot_id>.json
//! ```
//!
//! The store is append-only. A snapshot file is created with create-new
//! semantics and fsynced together with its run directory; an existing file
//! is never overwritten. Each run holds at most one original snapshot and
//! any number of replays.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::observability::{log_event_with_fields, Event};

use super::errors::{SnapshotError, SnapshotResult};
use super::record::Snapshot;

const SNAPSHOT_EXTENSION: &str = "json";

/// fsync a directory so a newly created entry survives a crash.
fn fsync_dir(path: &Path) -> SnapshotResult<()> {
    let dir = OpenOptions::new()
        .read(true)
        .open(path)
        .map_err(|e| SnapshotError::io_error_at_path(path, e))?;

    dir.sync_all()
        .map_err(|e| SnapshotError::io_error_at_path(path, e))
}

/// Run and snapshot ids become path components; keep them to one.
fn validate_component(kind: &str, value: &str) -> SnapshotResult<()> {
    let unsafe_component = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(&['/', '\\', '\0'][..]);
    if unsafe_component {
        return Err(SnapshotError::invalid(format!(
            "{} '{}' is not a valid path component",
            kind, value
        )));
    }
    Ok(())
}

/// Snapshot store rooted at a directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    /// Store rooted at `root`. The directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding a run's snapshots
    pub fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root.join(run_id)
    }

    /// Path of one snapshot file
    pub fn snapshot_path(&self, run_id: &str, snapshot_id: &str) -> PathBuf {
        self.run_dir(run_id)
            .join(format!("{}.{}", snapshot_id, SNAPSHOT_EXTENSION))
    }

    /// Persist a snapshot. Returns the file path.
    pub fn save(&self, snapshot: &Snapshot) -> SnapshotResult<PathBuf> {
        validate_component("run id", &snapshot.run_id)?;
        validate_component("snapshot id", &snapshot.snapshot_id)?;

        if snapshot.origin.is_original() && self.find_original(&snapshot.run_id)?.is_some() {
            return Err(SnapshotError::collision(format!(
                "run '{}' already has an original snapshot",
                snapshot.run_id
            )));
        }

        let run_dir = self.run_dir(&snapshot.run_id);
        fs::create_dir_all(&run_dir).map_err(|e| SnapshotError::io_error_at_path(&run_dir, e))?;

        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| SnapshotError::serialization(e.to_string()))?;

        let path = self.snapshot_path(&snapshot.run_id, &snapshot.snapshot_id);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(SnapshotError::collision(format!(
                    "snapshot '{}' already exists",
                    snapshot.snapshot_id
                ))
                .with_details(path.display().to_string()));
            }
            Err(e) => return Err(SnapshotError::io_error_at_path(&path, e)),
        };

        file.write_all(json.as_bytes())
            .map_err(|e| SnapshotError::io_error_at_path(&path, e))?;
        file.sync_all()
            .map_err(|e| SnapshotError::io_error_at_path(&path, e))?;
        fsync_dir(&run_dir)?;

        let path_str = path.display().to_string();
        log_event_with_fields(
            Event::SnapshotSaved,
            &[
                ("run_id", &snapshot.run_id),
                ("snapshot_id", &snapshot.snapshot_id),
                ("path", &path_str),
            ],
        );
        Ok(path)
    }

    /// Load the original snapshot of a run.
    pub fn load_snapshot(&self, run_id: &str) -> SnapshotResult<Snapshot> {
        validate_component("run id", run_id)?;
        self.find_original(run_id)?
            .ok_or_else(|| SnapshotError::run_not_found(run_id))
    }

    /// Load one snapshot by id.
    pub fn load_by_id(&self, run_id: &str, snapshot_id: &str) -> SnapshotResult<Snapshot> {
        validate_component("run id", run_id)?;
        validate_component("snapshot id", snapshot_id)?;

        let path = self.snapshot_path(run_id, snapshot_id);
        if !path.is_file() {
            return Err(SnapshotError::snapshot_not_found(run_id, snapshot_id));
        }
        read_snapshot(&path)
    }

    /// Ids of every run with at least one snapshot, sorted.
    pub fn list_snapshots(&self) -> SnapshotResult<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let entries =
            fs::read_dir(&self.root).map_err(|e| SnapshotError::io_error_at_path(&self.root, e))?;

        let mut runs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SnapshotError::io_error_at_path(&self.root, e))?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            if snapshot_files(&path)?.is_empty() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                runs.push(name.to_string());
            }
        }
        runs.sort();
        Ok(runs)
    }

    /// Every snapshot of a run: the original first, then replays oldest first.
    pub fn list_run(&self, run_id: &str) -> SnapshotResult<Vec<Snapshot>> {
        validate_component("run id", run_id)?;
        let run_dir = self.run_dir(run_id);
        if !run_dir.is_dir() {
            return Err(SnapshotError::run_not_found(run_id));
        }

        let mut snapshots = snapshot_files(&run_dir)?
            .iter()
            .map(|path| read_snapshot(path))
            .collect::<SnapshotResult<Vec<_>>>()?;
        if snapshots.is_empty() {
            return Err(SnapshotError::run_not_found(run_id));
        }

        snapshots.sort_by(|a, b| {
            b.origin
                .is_original()
                .cmp(&a.origin.is_original())
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.snapshot_id.cmp(&b.snapshot_id))
        });
        Ok(snapshots)
    }

    fn find_original(&self, run_id: &str) -> SnapshotResult<Option<Snapshot>> {
        let run_dir = self.run_dir(run_id);
        if !run_dir.is_dir() {
            return Ok(None);
        }
        for path in snapshot_files(&run_dir)? {
            let snapshot = read_snapshot(&path)?;
            if snapshot.origin.is_original() {
                return Ok(Some(snapshot));
            }
        }
        Ok(None)
    }
}

fn snapshot_files(dir: &Path) -> SnapshotResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| SnapshotError::io_error_at_path(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| SnapshotError::io_error_at_path(dir, e))?;
        let path = entry.path();
        let is_snapshot = path.is_file()
            && path
                .extension()
                .map(|ext| ext == SNAPSHOT_EXTENSION)
                .unwrap_or(false);
        if is_snapshot {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn read_snapshot(path: &Path) -> SnapshotResult<Snapshot> {
    let file = File::open(path).map_err(|e| SnapshotError::io_error_at_path(path, e))?;
    serde_json::from_reader(io::BufReader::new(file)).map_err(|e| {
        SnapshotError::serialization(format!("invalid snapshot file: {}", e))
            .with_details(path.display().to_string())
    })
}
