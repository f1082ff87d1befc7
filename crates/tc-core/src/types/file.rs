//! Source file records read from the tree being migrated.
//!
//! A [`SourceFile`] is produced once by a file reader and then shared by
//! every phase of a run; nothing downstream mutates it.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// A source file as read from disk.
///
/// # Examples
///
/// ```
/// use tc_core::SourceFile;
/// use camino::Utf8PathBuf;
///
/// let file = SourceFile::new(
///     Utf8PathBuf::from("/repo/test/login.spec.js"),
///     Utf8PathBuf::from("test/login.spec.js"),
///     "const { expect } = require('chai');\n".to_owned(),
/// );
///
/// assert_eq!(file.extension, "js");
/// assert_eq!(file.size, 36);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Absolute path of the file.
    pub path: Utf8PathBuf,

    /// Raw file content.
    pub content: String,

    /// File extension without the leading dot (empty when there is none).
    pub extension: String,

    /// Path relative to the source root.
    pub relative_path: Utf8PathBuf,

    /// Size in bytes.
    pub size: u64,

    /// Unix timestamp in milliseconds of the last modification.
    pub last_modified: u64,
}

impl SourceFile {
    /// Creates a new `SourceFile` from its path and content.
    ///
    /// The extension and size are derived from the arguments; the
    /// modification time starts at zero and can be set with
    /// [`with_last_modified`](Self::with_last_modified).
    #[must_use]
    pub fn new(path: Utf8PathBuf, relative_path: Utf8PathBuf, content: String) -> Self {
        let extension = path.extension().unwrap_or_default().to_owned();
        let size = content.len() as u64;
        Self {
            path,
            content,
            extension,
            relative_path,
            size,
            last_modified: 0,
        }
    }

    /// Sets the last-modified timestamp (unix milliseconds).
    #[inline]
    #[must_use]
    pub const fn with_last_modified(mut self, last_modified: u64) -> Self {
        self.last_modified = last_modified;
        self
    }

    /// Returns the path used for include/exclude matching.
    #[inline]
    #[must_use]
    pub fn match_path(&self) -> &Utf8Path {
        &self.relative_path
    }

    /// Returns the number of lines in the content.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SourceFile {
        SourceFile::new(
            Utf8PathBuf::from("/repo/src/index.js"),
            Utf8PathBuf::from("src/index.js"),
            "a\nb\nc\n".to_owned(),
        )
    }

    #[test]
    fn test_source_file_new_derives_metadata() {
        let file = sample();
        assert_eq!(file.extension, "js");
        assert_eq!(file.size, 6);
        assert_eq!(file.last_modified, 0);
        assert_eq!(file.match_path().as_str(), "src/index.js");
        assert_eq!(file.line_count(), 3);
    }

    #[test]
    fn test_source_file_without_extension() {
        let file = SourceFile::new(
            Utf8PathBuf::from("/repo/Makefile"),
            Utf8PathBuf::from("Makefile"),
            String::new(),
        );
        assert_eq!(file.extension, "");
        assert_eq!(file.size, 0);
    }

    #[test]
    fn test_source_file_with_last_modified() {
        let file = sample().with_last_modified(1_704_067_200_000);
        assert_eq!(file.last_modified, 1_704_067_200_000);
    }

    #[test]
    fn test_source_file_serialization() {
        let file = sample().with_last_modified(42);
        let json = serde_json::to_string(&file).unwrap();
        let parsed: SourceFile = serde_json::from_str(&json).unwrap();
        assert_eq!(file, parsed);
    }
}
