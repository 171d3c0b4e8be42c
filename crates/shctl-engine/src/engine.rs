//! Public operations over the rc and privilege files.
//!
//! The rc file is edited in place through [`LineStore`]'s atomic rewrite and
//! is never validated. The privilege file is only ever changed through a
//! [`ProtectedTransaction`], so every write to it passes the configured
//! validator first.

use std::io::Write;
use std::path::{Path, PathBuf};

use shctl_config::{Config, DEFAULT_SUDOERS_PATH, ResolvedPaths, TargetKind};
use tracing::{debug, info};

use crate::backup::{BackupManager, Clock, SystemClock, base_name};
use crate::commit::{Committer, CopyCommitter, ElevatedCommitter};
use crate::entry::{Entry, alias_key, alias_prefix, ensure_single_line, export_key, export_prefix};
use crate::error::EngineError;
use crate::line_store::LineStore;
use crate::transaction::{ProtectedTransaction, StagedEdit, TransactionOutcome};
use crate::validation::{CommandValidator, Validator};

/// Tracing target for engine operations.
const ENGINE_TARGET: &str = "shctl_engine::engine";

/// Safe read-modify-validate-commit operations on the configured files.
pub struct MutationEngine {
    paths: ResolvedPaths,
    validator: Box<dyn Validator>,
    committer: Box<dyn Committer>,
    clock: Box<dyn Clock>,
}

impl MutationEngine {
    /// Creates an engine with explicit collaborators and the system clock.
    #[must_use]
    pub fn new(
        paths: ResolvedPaths,
        validator: Box<dyn Validator>,
        committer: Box<dyn Committer>,
    ) -> Self {
        Self {
            paths,
            validator,
            committer,
            clock: Box::new(SystemClock),
        }
    }

    /// Wires the production collaborators described by `config`.
    ///
    /// Privilege changes are checked with the configured validator program,
    /// and commits to the system sudoers path escalate with the configured
    /// elevation program.
    #[must_use]
    pub fn from_config(config: &Config, paths: ResolvedPaths) -> Self {
        Self::new(
            paths,
            Box::new(CommandValidator::new(config.validator_program())),
            Box::new(ElevatedCommitter::new(
                config.elevation_program(),
                [PathBuf::from(DEFAULT_SUDOERS_PATH)],
            )),
        )
    }

    /// Replaces the clock used to name snapshots.
    #[must_use]
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Paths this engine operates on.
    #[must_use]
    pub const fn paths(&self) -> &ResolvedPaths {
        &self.paths
    }

    /// Appends `alias NAME='COMMAND'` to the rc file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidEntry`] for multi-line fields and
    /// [`EngineError::Io`] when the rc file cannot be created or written.
    pub fn add_alias(&self, name: &str, command: &str) -> Result<(), EngineError> {
        self.add_rc_entry(&Entry::Alias { name, command })
    }

    /// Appends `export NAME=VALUE` to the rc file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidEntry`] for multi-line fields and
    /// [`EngineError::Io`] when the rc file cannot be created or written.
    pub fn add_export(&self, name: &str, value: &str) -> Result<(), EngineError> {
        self.add_rc_entry(&Entry::Export { name, value })
    }

    /// Removes every definition of the alias `name`. Returns the number of
    /// lines removed; zero is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] when the rc file cannot be rewritten.
    pub fn remove_alias(&self, name: &str) -> Result<usize, EngineError> {
        self.remove_rc_entries(&alias_key(name))
    }

    /// Removes every definition of the export `name`. Returns the number of
    /// lines removed; zero is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] when the rc file cannot be rewritten.
    pub fn remove_export(&self, name: &str) -> Result<usize, EngineError> {
        self.remove_rc_entries(&export_key(name))
    }

    /// Writes every alias line of the rc file to `out`, in file order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] when the rc file cannot be read and
    /// [`EngineError::Output`] when `out` rejects a write.
    pub fn list_aliases(&self, out: &mut dyn Write) -> Result<usize, EngineError> {
        self.list_rc_entries(alias_prefix(), out)
    }

    /// Writes every export line of the rc file to `out`, in file order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] when the rc file cannot be read and
    /// [`EngineError::Output`] when `out` rejects a write.
    pub fn list_exports(&self, out: &mut dyn Write) -> Result<usize, EngineError> {
        self.list_rc_entries(export_prefix(), out)
    }

    /// Writes every non-blank, non-comment line of the privilege file to
    /// `out`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] when the privilege file cannot be read
    /// and [`EngineError::Output`] when `out` rejects a write.
    pub fn list_privilege_entries(&self, out: &mut dyn Write) -> Result<usize, EngineError> {
        LineStore::new(self.paths.sudoers_file())
            .scan_substantive_lines()
            .write_to(out)
    }

    /// Adds one privilege rule after validating the resulting file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] when the validator rejects the
    /// result (the live file is unchanged), [`EngineError::InvalidEntry`]
    /// when `entry` spans lines, and [`EngineError::Io`] for staging,
    /// validator spawn, or commit failures.
    pub fn add_privilege_entry(&self, entry: &str) -> Result<(), EngineError> {
        ensure_single_line(entry)?;
        self.protected(StagedEdit::Append(entry)).map(|_| ())
    }

    /// Removes every privilege line containing `pattern` after validating
    /// the resulting file. Returns the number of lines removed. An empty
    /// pattern removes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] when the validator rejects the
    /// result and [`EngineError::Io`] for staging, validator spawn, or
    /// commit failures.
    pub fn remove_privilege_entry(&self, pattern: &str) -> Result<usize, EngineError> {
        self.protected(StagedEdit::RemoveContaining(pattern))
    }

    /// Snapshots the privilege file, and the rc file first when
    /// `include_rc` is set. Returns the snapshot paths in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] when a source cannot be read or a
    /// snapshot cannot be written.
    pub fn backup(&self, include_rc: bool) -> Result<Vec<PathBuf>, EngineError> {
        let manager = self.backups();
        let mut snapshots = Vec::with_capacity(2);
        if include_rc {
            snapshots.push(manager.snapshot(self.paths.rc_file())?);
        }
        snapshots.push(manager.snapshot(self.paths.sudoers_file())?);
        Ok(snapshots)
    }

    /// Restores the latest snapshot of the `kind` target and returns the
    /// snapshot used.
    ///
    /// Privilege snapshots are staged and validated before being committed.
    /// Rc snapshots are copied directly over the live file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoBackupFound`] when no snapshot exists,
    /// [`EngineError::Validation`] when a privilege snapshot fails
    /// validation, and [`EngineError::Io`] for copy or commit failures.
    pub fn restore(&self, kind: TargetKind) -> Result<PathBuf, EngineError> {
        let target = self.paths.target(kind);
        let snapshot = self.backups().latest(&base_name(target))?;
        debug!(
            target: ENGINE_TARGET,
            snapshot = %snapshot.display(),
            "selected latest snapshot"
        );

        match kind {
            TargetKind::Privilege => {
                self.protected(StagedEdit::ReplaceFrom(&snapshot))?;
            }
            TargetKind::Rc => CopyCommitter.commit(&snapshot, target)?,
        }

        info!(
            target: ENGINE_TARGET,
            path = %target.display(),
            snapshot = %snapshot.display(),
            "restored from snapshot"
        );
        Ok(snapshot)
    }

    fn add_rc_entry(&self, entry: &Entry<'_>) -> Result<(), EngineError> {
        let line = entry.render()?;
        let store = self.rc_store();
        store.ensure_exists()?;
        store.append_line(&line)?;
        info!(target: ENGINE_TARGET, path = %store.path().display(), %line, "added rc entry");
        Ok(())
    }

    fn remove_rc_entries(&self, key: &str) -> Result<usize, EngineError> {
        let store = self.rc_store();
        store.ensure_exists()?;
        let removed = store.rewrite_excluding(|line| line.trim().starts_with(key))?;
        info!(
            target: ENGINE_TARGET,
            path = %store.path().display(),
            key,
            removed,
            "removed rc entries"
        );
        Ok(removed)
    }

    fn list_rc_entries(&self, prefix: &str, out: &mut dyn Write) -> Result<usize, EngineError> {
        let store = self.rc_store();
        store.ensure_exists()?;
        store.scan_lines_with_prefix(prefix).write_to(out)
    }

    fn protected(&self, edit: StagedEdit<'_>) -> Result<usize, EngineError> {
        let target = self.paths.sudoers_file();
        let outcome =
            ProtectedTransaction::new(target, self.validator.as_ref(), self.committer.as_ref())
                .execute(edit)?;
        match outcome {
            TransactionOutcome::Committed { removed_lines } => Ok(removed_lines),
            TransactionOutcome::Rejected { diagnostic } => {
                Err(validation_error(target, diagnostic))
            }
        }
    }

    fn rc_store(&self) -> LineStore {
        LineStore::new(self.paths.rc_file())
    }

    fn backups(&self) -> BackupManager<'_> {
        BackupManager::new(self.paths.backup_dir(), self.clock.as_ref())
    }
}

fn validation_error(target: &Path, diagnostic: String) -> EngineError {
    EngineError::Validation {
        target: target.to_path_buf(),
        diagnostic,
    }
}
