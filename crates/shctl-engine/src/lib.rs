//! Safe mutation engine for shell rc files and the sudoers policy.
//!
//! Every operation reads the file it touches from disk, applies exactly one
//! line-level change, and writes the result back without ever exposing a
//! partially written file.
//!
//! ## Protected files
//!
//! Changes to the privilege-policy file go through a
//! [`ProtectedTransaction`]:
//!
//! 1. **Stage**: the live file (or a backup being restored) is copied to a
//!    private temporary file.
//! 2. **Validate**: the staged candidate is checked by a [`Validator`],
//!    normally `visudo -c -f`.
//! 3. **Commit**: only a passing candidate replaces the live file, through
//!    an elevated copy when the target is the system sudoers path.
//!
//! The staging copy is removed on every exit path. A rejected candidate
//! surfaces from [`MutationEngine`] as [`EngineError::Validation`] and the
//! live file is left byte-for-byte as it was.
//!
//! ## Rc files
//!
//! Aliases and exports are appended in place and removed with an atomic
//! copy-and-rename rewrite. Rc files are never validated.
//!
//! ## Backups
//!
//! [`BackupManager`] writes timestamped snapshots and finds the most
//! recently modified one for [`MutationEngine::restore`].

mod backup;
mod commit;
mod engine;
mod entry;
mod error;
mod files;
mod line_store;
mod staging;
mod transaction;
mod validation;

pub use backup::{BackupManager, Clock, SystemClock, base_name};
pub use commit::{Committer, CopyCommitter, ElevatedCommitter};
pub use engine::MutationEngine;
pub use entry::{Entry, alias_key, alias_prefix, export_key, export_prefix};
pub use error::{EngineError, ErrorKind};
pub use line_store::{LineScan, LineStore, ScanLines};
pub use staging::StagingCopy;
pub use transaction::{ProtectedTransaction, StagedEdit, TransactionOutcome};
#[cfg(any(test, feature = "test-support"))]
pub use validation::ConfigurableValidator;
pub use validation::{AcceptAll, CommandValidator, ValidationOutcome, Validator};

#[cfg(test)]
mod tests;
