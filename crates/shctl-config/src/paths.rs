//! Resolves the files `shctl` edits and where their snapshots live.
//!
//! Resolution never fails: every target yields a path whether or not it
//! exists yet. Callers decide how to treat missing files.

use std::env;
use std::path::{Path, PathBuf};

use crate::Config;
use crate::defaults::{DEFAULT_SUDOERS_PATH, default_backup_dir};

const BASH_RC: &str = ".bashrc";
const ZSH_RC: &str = ".zshrc";

/// The two kinds of file the engine mutates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// The invoking user's shell startup file.
    Rc,
    /// The system privilege-policy file.
    Privilege,
}

/// Derives target paths from configuration and the invoking environment.
#[derive(Debug, Clone)]
pub struct PathResolver<'a> {
    config: &'a Config,
    home: Option<PathBuf>,
    shell: Option<String>,
}

impl<'a> PathResolver<'a> {
    /// Builds a resolver from explicit inputs.
    #[must_use]
    pub const fn new(config: &'a Config, home: Option<PathBuf>, shell: Option<String>) -> Self {
        Self {
            config,
            home,
            shell,
        }
    }

    /// Builds a resolver from the process environment (`$HOME`, `$SHELL`).
    #[must_use]
    pub fn from_environment(config: &'a Config) -> Self {
        Self::new(config, dirs::home_dir(), env::var("SHELL").ok())
    }

    /// Returns the path edited for `kind`.
    #[must_use]
    pub fn target_path(&self, kind: TargetKind) -> PathBuf {
        match kind {
            TargetKind::Rc => self.config.rc_file().map_or_else(
                || self.default_rc_file(),
                |path| path.as_std_path().to_path_buf(),
            ),
            TargetKind::Privilege => self.config.sudoers_path().map_or_else(
                || PathBuf::from(DEFAULT_SUDOERS_PATH),
                |path| path.as_std_path().to_path_buf(),
            ),
        }
    }

    /// Returns the directory holding backup snapshots.
    #[must_use]
    pub fn backup_dir(&self) -> PathBuf {
        self.config
            .backup_dir()
            .map_or_else(default_backup_dir, |path| path.as_std_path().to_path_buf())
    }

    /// Resolves every path at once.
    #[must_use]
    pub fn resolve(&self) -> ResolvedPaths {
        ResolvedPaths {
            rc_file: self.target_path(TargetKind::Rc),
            sudoers_file: self.target_path(TargetKind::Privilege),
            backup_dir: self.backup_dir(),
        }
    }

    fn default_rc_file(&self) -> PathBuf {
        let file_name = match self.shell.as_deref() {
            Some(shell) if shell.ends_with("zsh") => ZSH_RC,
            _ => BASH_RC,
        };
        self.home
            .as_deref()
            .unwrap_or_else(|| Path::new(""))
            .join(file_name)
    }
}

/// Concrete paths handed to the mutation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    rc_file: PathBuf,
    sudoers_file: PathBuf,
    backup_dir: PathBuf,
}

impl ResolvedPaths {
    /// Builds resolved paths directly, bypassing configuration.
    #[must_use]
    pub const fn new(rc_file: PathBuf, sudoers_file: PathBuf, backup_dir: PathBuf) -> Self {
        Self {
            rc_file,
            sudoers_file,
            backup_dir,
        }
    }

    /// Path edited for `kind`.
    #[must_use]
    pub fn target(&self, kind: TargetKind) -> &Path {
        match kind {
            TargetKind::Rc => &self.rc_file,
            TargetKind::Privilege => &self.sudoers_file,
        }
    }

    /// Shell startup file.
    #[must_use]
    pub fn rc_file(&self) -> &Path {
        &self.rc_file
    }

    /// Privilege-policy file.
    #[must_use]
    pub fn sudoers_file(&self) -> &Path {
        &self.sudoers_file
    }

    /// Backup directory.
    #[must_use]
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }
}
