//! Structured logging initialisation for the CLI.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use shctl_config::{Config, LogFormat};
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Errors encountered while configuring logging.
#[derive(Debug, thiserror::Error)]
pub(crate) enum TelemetryError {
    /// The configured log filter expression did not parse.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// The tracing subscriber could not be installed.
    #[error("failed to install logging subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the global subscriber on first use; later calls are no-ops.
pub(crate) fn initialise(config: &Config) -> Result<(), TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(config))
        .map(|_| ())
}

fn install_subscriber(config: &Config) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(config.log_filter())
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;

    let builder = |filter: EnvFilter| {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
            .with_timer(fmt::time::UtcTime::rfc_3339())
    };

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(builder(filter).json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder(filter).compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}
