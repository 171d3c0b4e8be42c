//! Shared configuration for the `shctl` toolchain.
//!
//! Configuration is layered by `ortho_config`: built-in defaults, then an
//! optional TOML file (`--config-path`, `BASM_CONFIG_PATH`, or a discovered
//! `.basm.toml`), then `BASM_*` environment variables, then command-line
//! flags. Every field is optional so an empty configuration is valid; the
//! accessors below fold in the built-in defaults.
//!
//! Configuration is loaded once at the process boundary and handed to the
//! engine as an explicit value. Nothing in the workspace reads these
//! variables after start-up.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

mod defaults;
mod logging;
mod paths;

pub use defaults::{
    DEFAULT_BACKUP_DIR, DEFAULT_ELEVATION_PROGRAM, DEFAULT_LOG_FILTER, DEFAULT_SUDOERS_PATH,
    DEFAULT_VALIDATOR_PROGRAM, default_backup_dir, default_log_filter, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use ortho_config::OrthoConfig;
pub use paths::{PathResolver, ResolvedPaths, TargetKind};

/// Layered configuration consumed by the CLI and the mutation engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "BASM")]
pub struct Config {
    /// Shell startup file edited by the alias and export commands.
    pub rc_file: Option<Utf8PathBuf>,
    /// Privilege-policy file edited by the sudoers commands.
    pub sudoers_path: Option<Utf8PathBuf>,
    /// Directory holding backup snapshots.
    pub backup_dir: Option<Utf8PathBuf>,
    /// Syntax checker invoked as `<program> -c -f <candidate>`.
    pub validator_program: Option<String>,
    /// Privilege-escalation tool used to commit to the system sudoers file.
    pub elevation_program: Option<String>,
    /// Tracing filter expression.
    pub log_filter: Option<String>,
    /// Tracing output format.
    pub log_format: Option<LogFormat>,
}

impl Config {
    /// Explicit rc file override, if any.
    #[must_use]
    pub fn rc_file(&self) -> Option<&Utf8Path> {
        self.rc_file.as_deref()
    }

    /// Explicit sudoers override, if any.
    #[must_use]
    pub fn sudoers_path(&self) -> Option<&Utf8Path> {
        self.sudoers_path.as_deref()
    }

    /// Explicit backup directory override, if any.
    #[must_use]
    pub fn backup_dir(&self) -> Option<&Utf8Path> {
        self.backup_dir.as_deref()
    }

    /// Program used to validate candidate sudoers content.
    #[must_use]
    pub fn validator_program(&self) -> &str {
        self.validator_program
            .as_deref()
            .unwrap_or(DEFAULT_VALIDATOR_PROGRAM)
    }

    /// Program used to perform elevated commits.
    #[must_use]
    pub fn elevation_program(&self) -> &str {
        self.elevation_program
            .as_deref()
            .unwrap_or(DEFAULT_ELEVATION_PROGRAM)
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Tracing output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format.unwrap_or_else(default_log_format)
    }
}
