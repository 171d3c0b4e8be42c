//! Configuration loading helpers for the `shctl` CLI.
//!
//! Leading configuration flags are separated from the command tokens so the
//! loader only sees flags it understands and clap only sees the command.

use std::ffi::{OsStr, OsString};

use shctl_config::{Config, OrthoConfig};

use crate::AppError;

/// CLI flags recognised by the configuration loader.
///
/// Kept in sync with the fields of [`Config`].
pub(crate) const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--rc-file",
    "--sudoers-path",
    "--backup-dir",
    "--validator-program",
    "--elevation-program",
    "--log-filter",
    "--log-format",
];

pub(crate) trait ConfigLoader {
    /// Loads configuration for the CLI.
    ///
    /// # Flag Ordering
    ///
    /// Configuration flags must appear before the command. A flag that
    /// follows the command is parsed as part of the command and rejected.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

#[derive(Debug, Clone, Copy)]
enum FlagAction {
    Include { needs_value: bool },
    Skip,
}

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

fn process_config_flag(argument: &OsStr) -> FlagAction {
    let argument_text = argument.to_string_lossy();
    if !argument_text.starts_with("--") {
        return FlagAction::Skip;
    }

    let (flag, has_inline_value) = match argument_text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (argument_text.as_ref(), false),
    };

    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !has_inline_value,
        }
    } else {
        FlagAction::Skip
    }
}

pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_start: usize,
}

/// Splits leading configuration flags (with the program name) from the
/// command tokens that follow them.
pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ConfigArgumentSplit {
            config_arguments: Vec::new(),
            command_start: 0,
        };
    };

    let mut filtered = vec![program.clone()];
    let mut command_start = 1usize;
    let mut pending_value = false;

    for argument in rest {
        if pending_value {
            filtered.push(argument.clone());
            pending_value = false;
            command_start += 1;
            continue;
        }

        match process_config_flag(argument) {
            FlagAction::Include { needs_value } => {
                filtered.push(argument.clone());
                command_start += 1;
                pending_value = needs_value;
            }
            FlagAction::Skip => break,
        }
    }

    ConfigArgumentSplit {
        config_arguments: filtered,
        command_start,
    }
}

/// Program name followed by the command tokens.
pub(crate) fn prepare_cli_arguments(args: &[OsString], split: &ConfigArgumentSplit) -> Vec<OsString> {
    args.first()
        .into_iter()
        .chain(args.iter().skip(split.command_start))
        .cloned()
        .collect()
}
