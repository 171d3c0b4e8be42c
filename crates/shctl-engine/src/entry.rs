//! On-disk line formats for rc entries.
//!
//! Each entry occupies exactly one line with a recognisable prefix so it can
//! be found again by [`Entry::key_prefix`].

use crate::error::EngineError;

const ALIAS_PREFIX: &str = "alias ";
const EXPORT_PREFIX: &str = "export ";

/// A logical record in the shell rc file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry<'a> {
    /// `alias NAME='COMMAND'`
    Alias {
        /// Alias name.
        name: &'a str,
        /// Aliased command.
        command: &'a str,
    },
    /// `export NAME=VALUE`
    Export {
        /// Variable name.
        name: &'a str,
        /// Variable value, quoted on render when it contains a space.
        value: &'a str,
    },
}

impl Entry<'_> {
    /// Renders the entry as a single line without the terminator.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidEntry`] when any field contains a line
    /// break.
    pub fn render(&self) -> Result<String, EngineError> {
        match *self {
            Self::Alias { name, command } => {
                ensure_single_line(name)?;
                ensure_single_line(command)?;
                Ok(format!("{ALIAS_PREFIX}{name}='{command}'"))
            }
            Self::Export { name, value } => {
                ensure_single_line(name)?;
                ensure_single_line(value)?;
                if value.contains(' ') {
                    Ok(format!("{EXPORT_PREFIX}{name}=\"{value}\""))
                } else {
                    Ok(format!("{EXPORT_PREFIX}{name}={value}"))
                }
            }
        }
    }

    /// Prefix that identifies lines belonging to this entry's name.
    #[must_use]
    pub fn key_prefix(&self) -> String {
        match *self {
            Self::Alias { name, .. } => alias_key(name),
            Self::Export { name, .. } => export_key(name),
        }
    }
}

/// Prefix shared by every alias line.
#[must_use]
pub const fn alias_prefix() -> &'static str {
    ALIAS_PREFIX
}

/// Prefix shared by every export line.
#[must_use]
pub const fn export_prefix() -> &'static str {
    EXPORT_PREFIX
}

/// Prefix identifying the alias called `name`.
#[must_use]
pub fn alias_key(name: &str) -> String {
    format!("{ALIAS_PREFIX}{name}=")
}

/// Prefix identifying the export called `name`.
#[must_use]
pub fn export_key(name: &str) -> String {
    format!("{EXPORT_PREFIX}{name}=")
}

/// Rejects values that would span more than one line.
pub(crate) fn ensure_single_line(value: &str) -> Result<(), EngineError> {
    if value.contains(['\n', '\r']) {
        return Err(EngineError::InvalidEntry {
            entry: value.to_owned(),
        });
    }
    Ok(())
}
