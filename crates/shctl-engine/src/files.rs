//! Low-level durable file writes shared by the line store, backups, and
//! commits.

use std::fs::{self, File, Permissions};
use std::io::{self, Write};
use std::path::Path;

use tempfile::Builder;

/// Directory a sibling temporary file must live in for `path`.
pub(crate) fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Replaces `path` with `contents` via a sibling temporary file and rename.
///
/// Data is flushed and fsync'd before the temporary file is renamed into
/// place so readers never observe a partially written payload. When
/// `permissions` is given the replacement carries them; otherwise it keeps
/// the temporary file's private mode.
pub(crate) fn atomic_write(
    path: &Path,
    contents: &[u8],
    permissions: Option<Permissions>,
) -> io::Result<()> {
    let mut builder = Builder::new();
    builder.prefix(".tmp_");
    let mut file = builder.tempfile_in(parent_dir(path))?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    if let Some(permissions) = permissions {
        fs::set_permissions(file.path(), permissions)?;
    }
    file.persist(path).map_err(|error| error.error)?;
    Ok(())
}

/// Copies `source` over `destination` byte for byte and syncs the result.
///
/// The destination is truncated in place rather than replaced, so an
/// existing file keeps its inode, owner, and mode.
pub(crate) fn copy_durable(source: &Path, destination: &Path) -> io::Result<u64> {
    let mut input = File::open(source)?;
    fs::create_dir_all(parent_dir(destination))?;
    let mut output = File::create(destination)?;
    let copied = io::copy(&mut input, &mut output)?;
    output.sync_all()?;
    Ok(copied)
}
