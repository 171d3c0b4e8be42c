//! Timestamped snapshots and latest-snapshot lookup.
//!
//! Snapshots are named `<basename>.bak.<YYYYMMDD_HHMMSS>` and kept until an
//! operator removes them. Two snapshots of the same file taken within one
//! second share a name, and the later one overwrites the earlier.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use time::OffsetDateTime;
use time::format_description::FormatItem;
use time::macros::format_description;
use tracing::{debug, info};

use crate::error::EngineError;
use crate::files::copy_durable;

/// Tracing target for backup operations.
const BACKUP_TARGET: &str = "shctl_engine::backup";

const SNAPSHOT_MARKER: &str = ".bak.";

const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year][month][day]_[hour][minute][second]");

/// Source of snapshot timestamps.
pub trait Clock: Send + Sync {
    /// Current time used to name a snapshot.
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock in the local timezone, or UTC when the offset is unknown.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
    }
}

/// Creates and locates snapshots inside one backup directory.
pub struct BackupManager<'a> {
    dir: &'a Path,
    clock: &'a dyn Clock,
}

impl<'a> BackupManager<'a> {
    /// Creates a manager for `dir` stamping snapshots with `clock`.
    #[must_use]
    pub fn new(dir: &'a Path, clock: &'a dyn Clock) -> Self {
        Self { dir, clock }
    }

    /// Directory holding the snapshots.
    #[must_use]
    pub const fn dir(&self) -> &Path {
        self.dir
    }

    /// Copies `source` into a new snapshot and returns its path.
    ///
    /// The snapshot is fsync'd before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] when the directory cannot be created, the
    /// source cannot be read, or the snapshot cannot be written.
    pub fn snapshot(&self, source: &Path) -> Result<PathBuf, EngineError> {
        fs::create_dir_all(self.dir)
            .map_err(|error| EngineError::io("create backup directory", self.dir, error))?;

        let stamp = self.clock.now().format(TIMESTAMP_FORMAT).map_err(|error| {
            EngineError::io("timestamp backup of", source, io::Error::other(error))
        })?;
        let destination = self
            .dir
            .join(format!("{}{SNAPSHOT_MARKER}{stamp}", base_name(source)));

        copy_durable(source, &destination)
            .map_err(|error| EngineError::io("back up", source, error))?;

        info!(
            target: BACKUP_TARGET,
            source = %source.display(),
            snapshot = %destination.display(),
            "created backup snapshot"
        );
        Ok(destination)
    }

    /// Returns the most recently modified snapshot of `target_base_name`.
    ///
    /// Candidates are the entries named `<target_base_name>.bak.*`. Ties
    /// keep the first candidate seen.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoBackupFound`] when no snapshot exists,
    /// including when the directory itself is missing, and
    /// [`EngineError::Io`] when the directory or an entry cannot be read.
    pub fn latest(&self, target_base_name: &str) -> Result<PathBuf, EngineError> {
        let prefix = format!("{target_base_name}{SNAPSHOT_MARKER}");
        let not_found = || EngineError::NoBackupFound {
            dir: self.dir.to_path_buf(),
            target: target_base_name.to_owned(),
        };

        let list_error = |error| EngineError::io("list backups in", self.dir, error);
        let entries = match fs::read_dir(self.dir) {
            Ok(entries) => entries,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(error) => return Err(list_error(error)),
        };

        let mut latest: Option<(SystemTime, PathBuf)> = None;
        for entry in entries {
            let entry = entry.map_err(list_error)?;
            let matches = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(&prefix));
            if !matches {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|metadata| metadata.modified())
                .map_err(|error| EngineError::io("inspect backup", entry.path(), error))?;
            debug!(
                target: BACKUP_TARGET,
                candidate = %entry.path().display(),
                "considering snapshot"
            );
            if latest.as_ref().is_none_or(|(best, _)| modified > *best) {
                latest = Some((modified, entry.path()));
            }
        }

        latest.map(|(_, path)| path).ok_or_else(not_found)
    }
}

/// File name component of `path`, used to name and find its snapshots.
#[must_use]
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
