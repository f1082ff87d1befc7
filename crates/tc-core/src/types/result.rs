//! The terminal record of one conversion run.
//!
//! [`ConversionResult`] is the boundary artifact handed to reporting layers,
//! so everything here is plain data that serializes to JSON. Durations are
//! serialized as whole milliseconds.

use std::time::Duration;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use super::diagnostic::{ConversionError, ConversionWarning};
use super::file::SourceFile;

/// Kind of change made to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Code was added.
    Add,
    /// Code was removed.
    Remove,
    /// Code was rewritten in place.
    Modify,
    /// An identifier or file was renamed.
    Rename,
}

/// A single change made to a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Kind of change.
    pub kind: ChangeKind,

    /// Description of the change.
    pub description: String,

    /// Line where the change occurred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    /// Column where the change occurred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,

    /// Original snippet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,

    /// Replacement snippet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

impl FileChange {
    /// Creates a change with only a kind and description.
    #[must_use]
    pub fn new(kind: ChangeKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            line: None,
            column: None,
            before: None,
            after: None,
        }
    }

    /// Records the position of the change.
    #[must_use]
    pub const fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Records the snippet before and after the change.
    #[must_use]
    pub fn replacing(mut self, before: impl Into<String>, after: impl Into<String>) -> Self {
        self.before = Some(before.into());
        self.after = Some(after.into());
        self
    }
}

/// A file the transformer processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedFile {
    /// The file as read.
    pub source: SourceFile,

    /// The file as written.
    pub target: SourceFile,

    /// Changes made.
    pub changes: Vec<FileChange>,

    /// Whether the content changed.
    pub modified: bool,

    /// Where the original was backed up, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<Utf8PathBuf>,
}

/// A file the transformer chose not to process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    /// The skipped file.
    pub file: SourceFile,

    /// Why it was skipped.
    pub reason: String,
}

/// Aggregate counters for a run.
///
/// `processed + skipped + error_files <= total_files` is expected of
/// transformers but is not checked here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Total files considered.
    pub total_files: u64,
    /// Files processed.
    pub processed_files: u64,
    /// Files skipped.
    pub skipped_files: u64,
    /// Files that failed with an error.
    pub error_files: u64,
    /// Total discrete changes.
    pub total_changes: u64,
    /// Total errors reported.
    pub total_errors: u64,
    /// Total warnings reported.
    pub total_warnings: u64,
}

impl ConversionStats {
    /// Returns `true` when the per-file counters do not exceed the total.
    ///
    /// # Examples
    ///
    /// ```
    /// use tc_core::ConversionStats;
    ///
    /// let stats = ConversionStats {
    ///     total_files: 3,
    ///     processed_files: 2,
    ///     skipped_files: 1,
    ///     ..Default::default()
    /// };
    /// assert!(stats.is_consistent());
    /// ```
    #[inline]
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.processed_files + self.skipped_files + self.error_files <= self.total_files
    }
}

/// The outcome of one conversion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Whether the conversion succeeded.
    pub success: bool,

    /// Files that were processed.
    pub processed_files: Vec<ProcessedFile>,

    /// Files that were skipped.
    pub skipped_files: Vec<SkippedFile>,

    /// Errors encountered.
    pub errors: Vec<ConversionError>,

    /// Warnings generated.
    pub warnings: Vec<ConversionWarning>,

    /// Aggregate statistics.
    pub stats: ConversionStats,

    /// Wall-clock time of the run.
    #[serde(rename = "duration_ms", with = "duration_ms")]
    pub duration: Duration,
}

impl ConversionResult {
    /// Creates a failed result with no processed or skipped files.
    #[must_use]
    pub const fn failure(
        errors: Vec<ConversionError>,
        warnings: Vec<ConversionWarning>,
        stats: ConversionStats,
        duration: Duration,
    ) -> Self {
        Self {
            success: false,
            processed_files: Vec::new(),
            skipped_files: Vec::new(),
            errors,
            warnings,
            stats,
            duration,
        }
    }

    /// Creates a successful result from processed and skipped files.
    ///
    /// Stats are derived from the file lists; the duration is left at zero
    /// for the pipeline to fill in.
    ///
    /// # Examples
    ///
    /// ```
    /// use tc_core::ConversionResult;
    ///
    /// let result = ConversionResult::succeeded(Vec::new(), Vec::new());
    /// assert!(result.success);
    /// assert_eq!(result.stats.total_files, 0);
    /// ```
    #[must_use]
    pub fn succeeded(processed_files: Vec<ProcessedFile>, skipped_files: Vec<SkippedFile>) -> Self {
        let stats = ConversionStats {
            total_files: (processed_files.len() + skipped_files.len()) as u64,
            processed_files: processed_files.len() as u64,
            skipped_files: skipped_files.len() as u64,
            total_changes: processed_files.iter().map(|f| f.changes.len() as u64).sum(),
            ..ConversionStats::default()
        };
        Self {
            success: true,
            processed_files,
            skipped_files,
            errors: Vec::new(),
            warnings: Vec::new(),
            stats,
            duration: Duration::ZERO,
        }
    }

    /// Returns the total number of changes across processed files.
    #[must_use]
    pub fn change_count(&self) -> usize {
        self.processed_files.iter().map(|f| f.changes.len()).sum()
    }

    /// Returns the number of processed files whose content changed.
    #[must_use]
    pub fn modified_count(&self) -> usize {
        self.processed_files.iter().filter(|f| f.modified).count()
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::cast_possible_truncation)] // u64 milliseconds is ~584 million years
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
