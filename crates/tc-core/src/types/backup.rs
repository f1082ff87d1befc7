//! Backup records.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Where a file was backed up before being modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupInfo {
    /// The original file.
    pub original_path: Utf8PathBuf,

    /// The backup copy.
    pub backup_path: Utf8PathBuf,

    /// Unix timestamp in milliseconds of when the backup was taken.
    pub timestamp: u64,

    /// Size of the backup in bytes.
    pub size: u64,
}
