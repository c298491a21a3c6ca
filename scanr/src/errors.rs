use std::path::PathBuf;
use thiserror::Error;

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that can occur while scanning.
///
/// Only `InvalidPattern` is fatal: a pattern that fails to compile would
/// silently produce wrong results across every file, so it aborts the run
/// before any worker starts. Everything else is reported and skipped.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("{0} is a directory (use --recursive to search it)")]
    NotRecursive(PathBuf),
    #[error("Traversal error: {0}")]
    Traversal(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScanError {
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn not_recursive(path: impl Into<PathBuf>) -> Self {
        Self::NotRecursive(path.into())
    }

    pub fn traversal(msg: impl Into<String>) -> Self {
        Self::Traversal(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
