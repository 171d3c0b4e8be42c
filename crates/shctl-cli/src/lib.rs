//! Command-line runtime for `shctl`.
//!
//! The runtime splits configuration flags from the command, loads layered
//! configuration, installs logging, and dispatches the command to the
//! mutation engine. Output streams and the configuration loader are
//! injectable so the whole pipeline runs in tests without touching the
//! process environment.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use shctl_config::{Config, PathResolver, TargetKind};
use shctl_engine::MutationEngine;
use tracing::debug;

mod cli;
mod config;
mod errors;
mod telemetry;

use cli::{AliasAction, Cli, CliCommand, ExportAction, SudoersAction};
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
use config::{prepare_cli_arguments, split_config_arguments};
pub(crate) use errors::AppError;

const CLI_TARGET: &str = "shctl_cli";

/// Runs the CLI using the provided arguments and output streams.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    match execute(args, stdout, loader) {
        Ok(()) => ExitCode::SUCCESS,
        // Help and version requests are clap "errors" that belong on stdout.
        Err(AppError::CliUsage(error)) if !error.use_stderr() => {
            let _ = write!(stdout, "{}", error.render());
            ExitCode::SUCCESS
        }
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            error.exit_code()
        }
    }
}

fn execute<I, W, L>(args: I, stdout: &mut W, loader: &L) -> Result<(), AppError>
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);
    let cli = Cli::try_parse_from(prepare_cli_arguments(&args, &split))
        .map_err(AppError::CliUsage)?;
    let config = loader.load(&split.config_arguments)?;
    telemetry::initialise(&config)?;

    let engine = build_engine(&config);
    debug!(target: CLI_TARGET, paths = ?engine.paths(), "resolved target paths");
    dispatch(cli.command, &engine, stdout)
}

fn build_engine(config: &Config) -> MutationEngine {
    let paths = PathResolver::from_environment(config).resolve();
    MutationEngine::from_config(config, paths)
}

fn dispatch<W: Write>(
    command: CliCommand,
    engine: &MutationEngine,
    stdout: &mut W,
) -> Result<(), AppError> {
    match command {
        CliCommand::Alias { action } => match action {
            AliasAction::Add { name, command } => engine.add_alias(&name, &command)?,
            AliasAction::Remove { name } => {
                let removed = engine.remove_alias(&name)?;
                report_removed(stdout, removed, &format!("alias {name}"))?;
            }
            AliasAction::List => {
                engine.list_aliases(stdout)?;
            }
        },
        CliCommand::Export { action } => match action {
            ExportAction::Add { name, value } => engine.add_export(&name, &value)?,
            ExportAction::Remove { name } => {
                let removed = engine.remove_export(&name)?;
                report_removed(stdout, removed, &format!("export {name}"))?;
            }
            ExportAction::List => {
                engine.list_exports(stdout)?;
            }
        },
        CliCommand::Sudoers { action } => match action {
            SudoersAction::Add { entry } => engine.add_privilege_entry(&entry)?,
            SudoersAction::Remove { pattern } => {
                let removed = engine.remove_privilege_entry(&pattern)?;
                report_removed(stdout, removed, &format!("sudoers entries matching {pattern:?}"))?;
            }
            SudoersAction::List => {
                engine.list_privilege_entries(stdout)?;
            }
        },
        CliCommand::Backup { skip_rc } => {
            for snapshot in engine.backup(!skip_rc)? {
                writeln!(stdout, "backup written to {}", snapshot.display())
                    .map_err(AppError::Output)?;
            }
        }
        CliCommand::Restore { target } => {
            let kind = TargetKind::from(target);
            let snapshot = engine.restore(kind)?;
            writeln!(
                stdout,
                "restored {} from {}",
                engine.paths().target(kind).display(),
                snapshot.display()
            )
            .map_err(AppError::Output)?;
        }
    }
    Ok(())
}

fn report_removed<W: Write>(stdout: &mut W, removed: usize, what: &str) -> Result<(), AppError> {
    let noun = if removed == 1 { "line" } else { "lines" };
    writeln!(stdout, "removed {removed} {noun} for {what}").map_err(AppError::Output)
}
