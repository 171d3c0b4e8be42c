//! Validators decide whether candidate content may replace a live file.
//!
//! Validators are injected behind the [`Validator`] trait so the engine can
//! be exercised without real system tools. A rejection is a normal outcome,
//! reported as [`ValidationOutcome::Rejected`]; only failures to run the
//! check at all surface as errors.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::EngineError;

#[cfg(any(test, feature = "test-support"))]
mod test_doubles;

#[cfg(any(test, feature = "test-support"))]
pub use test_doubles::ConfigurableValidator;

/// Tracing target for validation.
const VALIDATION_TARGET: &str = "shctl_engine::validation";

/// Result of checking a candidate file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The candidate may be committed.
    Passed,
    /// The candidate was rejected.
    Rejected {
        /// Diagnostic text from the checker, verbatim.
        diagnostic: String,
    },
}

impl ValidationOutcome {
    /// Returns true when the candidate passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// Checks that a candidate file is structurally acceptable.
pub trait Validator: Send + Sync {
    /// Validates the file at `candidate`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] when the check cannot be run.
    fn validate(&self, candidate: &Path) -> Result<ValidationOutcome, EngineError>;
}

/// Validator for content whose syntax is not checked, such as shell rc
/// files.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl Validator for AcceptAll {
    fn validate(&self, _candidate: &Path) -> Result<ValidationOutcome, EngineError> {
        Ok(ValidationOutcome::Passed)
    }
}

/// Runs an external syntax checker as `<program> -c -f <candidate>`.
///
/// With the default `visudo` program this is the sudoers check-only mode.
/// A non-zero exit status rejects the candidate with the checker's stdout
/// and stderr as the diagnostic.
#[derive(Debug, Clone)]
pub struct CommandValidator {
    program: String,
}

impl CommandValidator {
    /// Creates a validator running `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Program this validator runs.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Validator for CommandValidator {
    fn validate(&self, candidate: &Path) -> Result<ValidationOutcome, EngineError> {
        debug!(
            target: VALIDATION_TARGET,
            program = %self.program,
            candidate = %candidate.display(),
            "running syntax check"
        );

        let output = Command::new(&self.program)
            .arg("-c")
            .arg("-f")
            .arg(candidate)
            .output()
            .map_err(|source| EngineError::io("run validator on", candidate, source))?;

        if output.status.success() {
            return Ok(ValidationOutcome::Passed);
        }

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        let trimmed = combined.trim();
        let diagnostic = if trimmed.is_empty() {
            format!("{} exited with {}", self.program, output.status)
        } else {
            trimmed.to_owned()
        };
        Ok(ValidationOutcome::Rejected { diagnostic })
    }
}
