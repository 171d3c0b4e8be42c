use std::path::PathBuf;

/// Well-known location of the system privilege-policy file.
pub const DEFAULT_SUDOERS_PATH: &str = "/etc/sudoers";

/// Fixed backup directory used when no override is configured.
pub const DEFAULT_BACKUP_DIR: &str = "/tmp";

/// Syntax checker used to validate sudoers candidates.
pub const DEFAULT_VALIDATOR_PROGRAM: &str = "visudo";

/// Privilege-escalation tool used for commits to the system sudoers file.
pub const DEFAULT_ELEVATION_PROGRAM: &str = "sudo";

/// Default log filter expression. The CLI stays quiet unless asked.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Default log filter expression used by the binary.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binary.
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Compact
}

/// Computes the backup directory used when no override is configured.
pub fn default_backup_dir() -> PathBuf {
    default_backup_dir_inner()
}

#[cfg(unix)]
fn default_backup_dir_inner() -> PathBuf {
    PathBuf::from(DEFAULT_BACKUP_DIR)
}

#[cfg(not(unix))]
fn default_backup_dir_inner() -> PathBuf {
    std::env::temp_dir()
}
