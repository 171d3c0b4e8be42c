//! CLI argument definitions for `shctl`.
//!
//! Configuration flags such as `--rc-file` are not declared here: they are
//! split off before parsing and handed to the configuration loader.

use clap::{Parser, Subcommand, ValueEnum};
use shctl_config::TargetKind;

/// Safely edit shell rc files and the sudoers policy.
#[derive(Parser, Debug)]
#[command(name = "shctl", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Top-level command groups.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Manages `alias` lines in the rc file.
    Alias {
        #[command(subcommand)]
        action: AliasAction,
    },
    /// Manages `export` lines in the rc file.
    Export {
        #[command(subcommand)]
        action: ExportAction,
    },
    /// Manages sudoers rules; every change is validated before commit.
    Sudoers {
        #[command(subcommand)]
        action: SudoersAction,
    },
    /// Snapshots the sudoers file and, unless skipped, the rc file.
    Backup {
        /// Leaves the rc file out of the backup.
        #[arg(long)]
        skip_rc: bool,
    },
    /// Restores the latest snapshot of a file.
    Restore {
        /// File to restore.
        #[arg(value_enum)]
        target: RestoreTarget,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum AliasAction {
    /// Appends `alias NAME='COMMAND'`.
    Add {
        #[arg(value_name = "NAME")]
        name: String,
        #[arg(value_name = "COMMAND")]
        command: String,
    },
    /// Removes every definition of the alias.
    Remove {
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Prints alias lines in file order.
    List,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum ExportAction {
    /// Appends `export NAME=VALUE`.
    Add {
        #[arg(value_name = "NAME")]
        name: String,
        #[arg(value_name = "VALUE")]
        value: String,
    },
    /// Removes every export of the variable.
    Remove {
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Prints export lines in file order.
    List,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum SudoersAction {
    /// Appends one rule.
    Add {
        #[arg(value_name = "ENTRY")]
        entry: String,
    },
    /// Removes every line containing the pattern.
    Remove {
        #[arg(value_name = "PATTERN")]
        pattern: String,
    },
    /// Prints rules, skipping blank lines and comments.
    List,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum RestoreTarget {
    /// The shell rc file.
    Rc,
    /// The sudoers file.
    Sudoers,
}

impl From<RestoreTarget> for TargetKind {
    fn from(target: RestoreTarget) -> Self {
        match target {
            RestoreTarget::Rc => Self::Rc,
            RestoreTarget::Sudoers => Self::Privilege,
        }
    }
}
