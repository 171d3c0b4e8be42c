//! Line-oriented access to plain text configuration files.
//!
//! [`LineStore`] never holds file content between calls: every operation
//! reads the current on-disk state. Rewrites go through a sibling temporary
//! file and a rename so a concurrent reader sees either the old file or the
//! new one, never a mixture.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::EngineError;
use crate::files::{atomic_write, parent_dir};

/// Line-level primitives over a single text file.
#[derive(Debug, Clone)]
pub struct LineStore {
    path: PathBuf,
}

impl LineStore {
    /// Creates a store for `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path this store operates on.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates parent directories and an empty file when absent.
    ///
    /// Idempotent and never truncates an existing file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] when the directory or file cannot be
    /// created.
    pub fn ensure_exists(&self) -> Result<(), EngineError> {
        let parent = parent_dir(&self.path);
        fs::create_dir_all(parent)
            .map_err(|source| EngineError::io("create directory", parent, source))?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| EngineError::io("create", &self.path, source))?;
        Ok(())
    }

    /// Appends `text` as one newline-terminated line.
    ///
    /// The file is opened in append mode so existing bytes are never
    /// rewritten. If the current last line lacks a terminator one is written
    /// first, keeping the appended entry on its own line.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] when the file cannot be opened or written.
    pub fn append_line(&self, text: &str) -> Result<(), EngineError> {
        let write_error = |source| EngineError::io("append to", &self.path, source);
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(write_error)?;

        let mut payload = String::with_capacity(text.len() + 2);
        if !ends_with_newline(&mut file).map_err(write_error)? {
            payload.push('\n');
        }
        payload.push_str(text);
        payload.push('\n');

        file.write_all(payload.as_bytes()).map_err(write_error)
    }

    /// Lines whose trimmed form starts with `prefix`.
    #[must_use]
    pub fn scan_lines_with_prefix(&self, prefix: &str) -> LineScan {
        LineScan {
            path: self.path.clone(),
            selector: LineSelector::Prefix(prefix.to_owned()),
        }
    }

    /// Lines that are neither blank nor `#` comments.
    #[must_use]
    pub fn scan_substantive_lines(&self) -> LineScan {
        LineScan {
            path: self.path.clone(),
            selector: LineSelector::Substantive,
        }
    }

    /// Atomically rewrites the file without the lines matching `predicate`.
    ///
    /// The predicate sees each line without its terminator. Surviving lines
    /// keep their exact bytes and order, and the replacement keeps the
    /// original permission bits. The copy-and-rename runs even when nothing
    /// matches. Returns the number of removed lines.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] when reading, writing the temporary file,
    /// or renaming fails. The original is untouched in every failure case.
    pub fn rewrite_excluding<F>(&self, mut predicate: F) -> Result<usize, EngineError>
    where
        F: FnMut(&str) -> bool,
    {
        let original =
            fs::read(&self.path).map_err(|source| EngineError::io("read", &self.path, source))?;
        let permissions = fs::metadata(&self.path)
            .map_err(|source| EngineError::io("stat", &self.path, source))?
            .permissions();

        let mut kept = Vec::with_capacity(original.len());
        let mut removed = 0;
        for line in original.split_inclusive(|byte| *byte == b'\n') {
            let text = String::from_utf8_lossy(strip_terminator(line));
            if predicate(text.as_ref()) {
                removed += 1;
            } else {
                kept.extend_from_slice(line);
            }
        }

        atomic_write(&self.path, &kept, Some(permissions))
            .map_err(|source| EngineError::io("rewrite", &self.path, source))?;
        Ok(removed)
    }
}

fn ends_with_newline(file: &mut File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0_u8; 1];
    file.read_exact(&mut last)?;
    Ok(last == *b"\n")
}

fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[derive(Debug, Clone)]
enum LineSelector {
    Prefix(String),
    Substantive,
}

impl LineSelector {
    /// Matches against a lossy text view so stray non-UTF-8 bytes never
    /// abort a scan.
    fn selects(&self, line: &[u8]) -> bool {
        let text = String::from_utf8_lossy(line);
        let trimmed = text.trim();
        match self {
            Self::Prefix(prefix) => trimmed.starts_with(prefix.as_str()),
            Self::Substantive => !trimmed.is_empty() && !trimmed.starts_with('#'),
        }
    }
}

/// A restartable, lazily evaluated selection of lines from a file.
///
/// Each call to [`LineScan::lines`] reopens the file, so a scan reflects
/// the content on disk at the time iteration starts.
#[derive(Debug, Clone)]
pub struct LineScan {
    path: PathBuf,
    selector: LineSelector,
}

impl LineScan {
    /// Starts a fresh pass over the file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] when the file cannot be opened.
    pub fn lines(&self) -> Result<ScanLines, EngineError> {
        let file =
            File::open(&self.path).map_err(|source| EngineError::io("open", &self.path, source))?;
        Ok(ScanLines {
            path: self.path.clone(),
            selector: self.selector.clone(),
            inner: BufReader::new(file).split(b'\n'),
        })
    }

    /// Writes every selected line, verbatim and newline-terminated, to `out`.
    ///
    /// Returns the number of lines written.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] when reading fails and
    /// [`EngineError::Output`] when writing to `out` fails.
    pub fn write_to(&self, out: &mut dyn Write) -> Result<usize, EngineError> {
        let mut written = 0;
        for line in self.lines()? {
            let mut line = line?;
            line.push(b'\n');
            out.write_all(&line).map_err(EngineError::Output)?;
            written += 1;
        }
        Ok(written)
    }
}

/// Iterator over the raw bytes of the lines selected by a [`LineScan`].
///
/// Lines come without their `\n` terminator; any other byte, including a
/// trailing `\r`, is kept.
#[derive(Debug)]
pub struct ScanLines {
    path: PathBuf,
    selector: LineSelector,
    inner: io::Split<BufReader<File>>,
}

impl Iterator for ScanLines {
    type Item = Result<Vec<u8>, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(line) if self.selector.selects(&line) => return Some(Ok(line)),
                Ok(_) => {}
                Err(source) => return Some(Err(EngineError::io("read", &self.path, source))),
            }
        }
    }
}
