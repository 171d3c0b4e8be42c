//! Final writes that replace a live file with validated content.
//!
//! Validation always runs as the invoking user against a private staging
//! copy. Only the commit to a well-known system path runs with elevated
//! rights, through an external escalation tool.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::error::EngineError;
use crate::files::copy_durable;

/// Tracing target for commit operations.
const COMMIT_TARGET: &str = "shctl_engine::commit";

/// Replaces a live file with staged content.
pub trait Committer: Send + Sync {
    /// Copies `staged` over `target`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] when the copy fails.
    fn commit(&self, staged: &Path, target: &Path) -> Result<(), EngineError>;
}

/// Plain byte-for-byte copy with fsync.
#[derive(Debug, Default, Clone, Copy)]
pub struct CopyCommitter;

impl Committer for CopyCommitter {
    fn commit(&self, staged: &Path, target: &Path) -> Result<(), EngineError> {
        copy_durable(staged, target).map_err(|source| EngineError::io("commit", target, source))?;
        debug!(target: COMMIT_TARGET, path = %target.display(), "committed with plain copy");
        Ok(())
    }
}

/// Commits to protected system paths through `<program> cp`.
///
/// Targets outside the protected set fall back to [`CopyCommitter`]. The
/// escalation tool inherits the terminal so it can prompt for credentials.
#[derive(Debug, Clone)]
pub struct ElevatedCommitter {
    program: String,
    protected: Vec<PathBuf>,
}

impl ElevatedCommitter {
    /// Creates a committer that escalates with `program` for `protected`
    /// paths.
    pub fn new(program: impl Into<String>, protected: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            program: program.into(),
            protected: protected.into_iter().collect(),
        }
    }

    /// Returns true when commits to `target` need elevation.
    #[must_use]
    pub fn requires_elevation(&self, target: &Path) -> bool {
        self.protected.iter().any(|protected| protected == target)
    }

    fn elevated_copy(&self, staged: &Path, target: &Path) -> Result<(), EngineError> {
        info!(
            target: COMMIT_TARGET,
            program = %self.program,
            path = %target.display(),
            "committing with elevated copy"
        );
        let status = Command::new(&self.program)
            .arg("cp")
            .arg(staged)
            .arg(target)
            .status()
            .map_err(|source| EngineError::io("run elevated copy to", target, source))?;

        if status.success() {
            Ok(())
        } else {
            Err(EngineError::io(
                "commit",
                target,
                io::Error::other(format!("{} cp exited with {status}", self.program)),
            ))
        }
    }
}

impl Committer for ElevatedCommitter {
    fn commit(&self, staged: &Path, target: &Path) -> Result<(), EngineError> {
        if self.requires_elevation(target) {
            self.elevated_copy(staged, target)
        } else {
            CopyCommitter.commit(staged, target)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn plain_copy_replaces_target_content() {
        let dir = TempDir::new().expect("temp dir");
        let staged = dir.path().join("staged");
        let target = dir.path().join("sudoers");
        fs::write(&staged, "new\n").expect("seed staged");
        fs::write(&target, "old\n").expect("seed target");

        CopyCommitter.commit(&staged, &target).expect("commit");

        assert_eq!(fs::read_to_string(&target).expect("read"), "new\n");
    }

    #[test]
    fn unprotected_targets_skip_elevation() {
        let dir = TempDir::new().expect("temp dir");
        let staged = dir.path().join("staged");
        let target = dir.path().join("sudoers");
        fs::write(&staged, "new\n").expect("seed staged");

        let committer =
            ElevatedCommitter::new("/definitely/not/sudo", [PathBuf::from("/etc/sudoers")]);
        assert!(!committer.requires_elevation(&target));
        committer.commit(&staged, &target).expect("commit");

        assert_eq!(fs::read_to_string(&target).expect("read"), "new\n");
    }

    #[cfg(unix)]
    #[test]
    fn protected_targets_run_the_escalation_tool() {
        let dir = TempDir::new().expect("temp dir");
        let staged = dir.path().join("staged");
        let target = dir.path().join("protected");
        fs::write(&staged, "elevated\n").expect("seed staged");

        // `env cp a b` stands in for `sudo cp a b`.
        let committer = ElevatedCommitter::new("env", [target.clone()]);
        assert!(committer.requires_elevation(&target));
        committer.commit(&staged, &target).expect("commit");

        assert_eq!(fs::read_to_string(&target).expect("read"), "elevated\n");
    }

    #[cfg(unix)]
    #[test]
    fn failed_escalation_is_an_io_error() {
        let dir = TempDir::new().expect("temp dir");
        let staged = dir.path().join("staged");
        let target = dir.path().join("protected");
        fs::write(&staged, "x\n").expect("seed staged");

        let committer = ElevatedCommitter::new("false", [target.clone()]);
        let error = committer.commit(&staged, &target).expect_err("should fail");

        assert!(matches!(error, EngineError::Io { .. }));
        assert!(!target.exists());
    }
}
