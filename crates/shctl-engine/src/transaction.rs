//! Stage, validate, and commit protocol for protected files.
//!
//! A transaction copies its source into a private staging file, applies one
//! edit there, and asks the validator about the result. Only a passing
//! candidate is handed to the committer; a rejection is reported as a
//! [`TransactionOutcome`] and leaves the live file untouched. The staging
//! copy is removed on every path out of [`ProtectedTransaction::execute`].

use std::path::Path;

use tracing::{debug, info, warn};

use crate::commit::Committer;
use crate::error::EngineError;
use crate::line_store::LineStore;
use crate::staging::StagingCopy;
use crate::validation::{ValidationOutcome, Validator};

/// Tracing target for transaction operations.
const TRANSACTION_TARGET: &str = "shctl_engine::transaction";

/// Edit applied to the staging copy before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagedEdit<'e> {
    /// Append one line.
    Append(&'e str),
    /// Delete every line containing the pattern. An empty pattern matches
    /// nothing.
    RemoveContaining(&'e str),
    /// Stage the content of another file in place of the target's.
    ReplaceFrom(&'e Path),
}

/// Result of a transaction that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
    /// The candidate passed validation and replaced the live file.
    Committed {
        /// Lines deleted by a [`StagedEdit::RemoveContaining`] edit.
        removed_lines: usize,
    },
    /// The validator rejected the candidate; nothing was committed.
    Rejected {
        /// Validator output, verbatim.
        diagnostic: String,
    },
}

impl TransactionOutcome {
    /// Returns true when the candidate was committed.
    #[must_use]
    pub const fn committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// One validated mutation of a protected file.
pub struct ProtectedTransaction<'a> {
    target: &'a Path,
    validator: &'a dyn Validator,
    committer: &'a dyn Committer,
}

impl<'a> ProtectedTransaction<'a> {
    /// Creates a transaction against `target`.
    #[must_use]
    pub fn new(
        target: &'a Path,
        validator: &'a dyn Validator,
        committer: &'a dyn Committer,
    ) -> Self {
        Self {
            target,
            validator,
            committer,
        }
    }

    /// Runs the protocol for `edit`.
    ///
    /// # Process
    ///
    /// 1. Copies the target (or the replacement source) to a staging file.
    /// 2. Applies the edit to the staging file, then gives it the target's
    ///    permission bits.
    /// 3. Validates the staging file.
    /// 4. Commits the staging file over the target if validation passed.
    /// 5. Removes the staging file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] when staging, editing, spawning the
    /// validator, or committing fails.
    pub fn execute(self, edit: StagedEdit<'_>) -> Result<TransactionOutcome, EngineError> {
        let source = match edit {
            StagedEdit::ReplaceFrom(source) => source,
            StagedEdit::Append(_) | StagedEdit::RemoveContaining(_) => self.target,
        };
        let staged = StagingCopy::of(source)?;

        let removed_lines = apply(staged.path(), edit)?;
        staged.mirror_permissions(self.target);

        if let ValidationOutcome::Rejected { diagnostic } = self.validator.validate(staged.path())? {
            warn!(
                target: TRANSACTION_TARGET,
                path = %self.target.display(),
                %diagnostic,
                "validation rejected staged change"
            );
            staged.close()?;
            return Ok(TransactionOutcome::Rejected { diagnostic });
        }

        self.committer.commit(staged.path(), self.target)?;
        info!(
            target: TRANSACTION_TARGET,
            path = %self.target.display(),
            removed_lines,
            "committed staged change"
        );
        staged.close()?;
        Ok(TransactionOutcome::Committed { removed_lines })
    }
}

fn apply(staged: &Path, edit: StagedEdit<'_>) -> Result<usize, EngineError> {
    let store = LineStore::new(staged);
    match edit {
        StagedEdit::Append(line) => {
            store.append_line(line)?;
            Ok(0)
        }
        StagedEdit::RemoveContaining("") => {
            debug!(target: TRANSACTION_TARGET, "empty pattern matches nothing");
            Ok(0)
        }
        StagedEdit::RemoveContaining(pattern) => {
            store.rewrite_excluding(|line| line.contains(pattern))
        }
        StagedEdit::ReplaceFrom(_) => Ok(0),
    }
}
