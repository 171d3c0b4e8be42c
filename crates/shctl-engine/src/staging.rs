//! Private working copies for protected mutations.
//!
//! A [`StagingCopy`] lives in the system temporary directory and is deleted
//! when dropped, so every exit path of a transaction cleans it up.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::{Builder, NamedTempFile};
use tracing::debug;

use crate::error::EngineError;

const STAGING_TARGET: &str = "shctl_engine::staging";
const STAGING_PREFIX: &str = "shctl_sudoers_";

/// Temporary copy of a file, removed on drop.
#[derive(Debug)]
pub struct StagingCopy {
    file: NamedTempFile,
}

impl StagingCopy {
    /// Copies `source` into a fresh, owner-writable temporary file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] when `source` cannot be read or the
    /// temporary file cannot be written.
    pub fn of(source: &Path) -> Result<Self, EngineError> {
        let content =
            fs::read(source).map_err(|source_err| EngineError::io("read", source, source_err))?;
        let mut file = Builder::new()
            .prefix(STAGING_PREFIX)
            .tempfile()
            .map_err(|error| EngineError::io("create staging copy of", source, error))?;
        file.write_all(&content)
            .and_then(|()| file.as_file().sync_all())
            .map_err(|error| EngineError::io("write staging copy of", source, error))?;

        debug!(
            target: STAGING_TARGET,
            source = %source.display(),
            staged = %file.path().display(),
            "staged working copy"
        );
        Ok(Self { file })
    }

    /// Path of the staged copy.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Gives the staged copy the permission bits of `reference`.
    ///
    /// Call this after the edit is applied: a read-only mode such as
    /// `0440` would otherwise block the edit itself. Mirroring is best
    /// effort; the commit copies content only.
    pub fn mirror_permissions(&self, reference: &Path) {
        let Ok(metadata) = fs::metadata(reference) else {
            return;
        };
        if let Err(error) = fs::set_permissions(self.file.path(), metadata.permissions()) {
            debug!(target: STAGING_TARGET, %error, "could not mirror source permissions");
        }
    }

    /// Removes the staged copy now, reporting any failure.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] when the file cannot be removed.
    pub fn close(self) -> Result<(), EngineError> {
        let path = self.file.path().to_path_buf();
        self.file
            .close()
            .map_err(|error| EngineError::io("remove staging copy", &path, error))?;
        debug!(target: STAGING_TARGET, staged = %path.display(), "removed staging copy");
        Ok(())
    }
}
