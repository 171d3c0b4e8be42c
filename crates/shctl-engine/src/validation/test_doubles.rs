//! Test double implementations for validators.
//!
//! The configurable validator exists for tests and behavioural scenarios,
//! letting each case choose exact pass/fail behaviour.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::EngineError;

use super::{ValidationOutcome, Validator};

/// Configurable validator for testing purposes.
///
/// Records every candidate path it is asked to check so tests can assert
/// that validation ran against a staging copy rather than the live file.
#[derive(Debug, Default)]
pub struct ConfigurableValidator {
    diagnostic: Option<String>,
    seen: Mutex<Vec<PathBuf>>,
}

impl ConfigurableValidator {
    /// Creates a validator that always passes.
    #[must_use]
    pub fn passing() -> Self {
        Self::default()
    }

    /// Creates a validator that rejects every candidate with `diagnostic`.
    #[must_use]
    pub fn failing(diagnostic: impl Into<String>) -> Self {
        Self {
            diagnostic: Some(diagnostic.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Candidate paths checked so far.
    #[must_use]
    pub fn seen(&self) -> Vec<PathBuf> {
        self.seen
            .lock()
            .map(|paths| paths.clone())
            .unwrap_or_default()
    }
}

impl Validator for ConfigurableValidator {
    fn validate(&self, candidate: &Path) -> Result<ValidationOutcome, EngineError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(candidate.to_path_buf());
        }
        Ok(self.diagnostic.as_ref().map_or(ValidationOutcome::Passed, |diagnostic| {
            ValidationOutcome::Rejected {
                diagnostic: diagnostic.clone(),
            }
        }))
    }
}
