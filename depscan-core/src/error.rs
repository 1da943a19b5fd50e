//! Typed error handling for depscan.
//!
//! Errors fall into two groups: those recorded against a single unit of work
//! (an unreadable directory or file) and carried on the analysis result, and
//! those that abort the invocation (bad arguments, unwritable output).

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for depscan operations.
#[derive(Error, Debug)]
pub enum DepscanError {
    /// I/O error when reading a source file
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Directory could not be enumerated; the subtree was skipped
    #[error("Enumeration error at {path}: {message}")]
    Enumeration { path: PathBuf, message: String },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Invalid argument provided
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Report destination could not be written
    #[error("Output error at {path}: {message}")]
    Output { path: PathBuf, message: String },
}

impl DepscanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an enumeration error for a directory that could not be read.
    pub fn enumeration(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Enumeration {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an output error.
    pub fn output(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Output {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error (recorded, analysis continues).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Enumeration { .. })
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::Enumeration { path, .. } => Some(path),
            Self::Config { path, .. } => Some(path),
            Self::Output { path, .. } => Some(path),
            Self::InvalidArgument { .. } => None,
        }
    }
}

/// Convenience type alias for depscan results.
pub type DepscanResult<T> = Result<T, DepscanError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> DepscanResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> DepscanResult<T> {
        self.map_err(|e| DepscanError::io(path, e))
    }
}
