//! Error types for the tc-scanner crate.
//!
//! # Error Recovery Strategy
//!
//! - **Walker errors** ([`ScanError::Walk`]): fatal, propagate immediately
//! - **File read errors** ([`ScanError::Read`]): log, skip the file, continue
//! - **Write and backup errors**: fatal for the file being written

use camino::Utf8PathBuf;

/// Errors raised while walking, reading, writing, or backing up files.
///
/// # Examples
///
/// ```
/// use tc_scanner::ScanError;
///
/// fn describe(err: &ScanError) -> String {
///     match err.path() {
///         Some(path) => format!("{path}: {err}"),
///         None => err.to_string(),
///     }
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Failed to walk a directory.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// Failed to read a file.
    #[error("failed to read file {path}: {source}")]
    Read {
        /// The file that couldn't be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("failed to write file {path}: {source}")]
    Write {
        /// The file that couldn't be written.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or restore a backup.
    #[error("backup of {path} failed: {source}")]
    Backup {
        /// The file being backed up or restored.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid scanner configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// A blocking worker was cancelled or panicked.
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ScanError {
    /// Creates a [`ScanError::Read`] error.
    #[inline]
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a [`ScanError::Write`] error.
    #[inline]
    pub fn write(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Creates a [`ScanError::Backup`] error.
    #[inline]
    pub fn backup(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Backup {
            path: path.into(),
            source,
        }
    }

    /// Creates a [`ScanError::Config`] error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns `true` if other files can still be processed after this error.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Read { .. })
    }

    /// Returns `true` if the operation should stop.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Read { path, .. } | Self::Write { path, .. } | Self::Backup { path, .. } => {
                Some(path)
            }
            Self::Walk(_) | Self::Config(_) | Self::NonUtf8Path(_) | Self::Join(_) => None,
        }
    }
}
