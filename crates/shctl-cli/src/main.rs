//! CLI entrypoint for `shctl`.
//!
//! The binary delegates to [`shctl_cli::run`], which loads configuration,
//! parses the command, and runs it against the mutation engine.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    shctl_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
