//! Error types and exit-code mapping for the CLI runtime.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use shctl_engine::{EngineError, ErrorKind};
use thiserror::Error;

use crate::telemetry::TelemetryError;

/// Exit status for I/O and usage failures.
pub(crate) const EXIT_FAILURE: u8 = 1;
/// Exit status when the validator rejected a change.
pub(crate) const EXIT_VALIDATION: u8 = 2;
/// Exit status when no backup snapshot was found.
pub(crate) const EXIT_NO_BACKUP: u8 = 3;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to write output: {0}")]
    Output(io::Error),
}

impl AppError {
    pub(crate) fn exit_code(&self) -> ExitCode {
        let status = match self {
            Self::Engine(error) => match error.kind() {
                ErrorKind::Validation => EXIT_VALIDATION,
                ErrorKind::NotFound => EXIT_NO_BACKUP,
                ErrorKind::Io | ErrorKind::InvalidEntry => EXIT_FAILURE,
            },
            Self::LoadConfiguration(_) | Self::CliUsage(_) | Self::Telemetry(_) | Self::Output(_) => {
                EXIT_FAILURE
            }
        };
        ExitCode::from(status)
    }
}
