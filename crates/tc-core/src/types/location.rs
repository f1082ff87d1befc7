//! Source location types for tracking spans in source files.
//!
//! This module provides the [`SourceLocation`] type used by validation
//! errors and warnings to point at the offending code.

use serde::{Deserialize, Serialize};

/// A span within a source file.
///
/// Start coordinates are always present; end coordinates are optional
/// because many validators only know where a problem begins.
///
/// # Field Conventions
///
/// - lines are 1-indexed (first line is line 1)
/// - columns are 0-indexed (first character is column 0)
///
/// # Examples
///
/// ```
/// use tc_core::SourceLocation;
///
/// let loc = SourceLocation::new(10, 5);
/// assert_eq!(loc.start_line, 10);
/// assert!(loc.end_line.is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Start line (1-indexed).
    pub start_line: u32,

    /// Start column (0-indexed).
    pub start_column: u32,

    /// End line, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,

    /// End column, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column: Option<u32>,
}

impl SourceLocation {
    /// Creates a location that only knows its start position.
    #[inline]
    #[must_use]
    pub const fn new(start_line: u32, start_column: u32) -> Self {
        Self {
            start_line,
            start_column,
            end_line: None,
            end_column: None,
        }
    }

    /// Sets the end position of the span.
    ///
    /// # Examples
    ///
    /// ```
    /// use tc_core::SourceLocation;
    ///
    /// let loc = SourceLocation::new(3, 0).with_end(3, 12);
    /// assert_eq!(loc.end_line, Some(3));
    /// assert_eq!(loc.end_column, Some(12));
    /// ```
    #[inline]
    #[must_use]
    pub const fn with_end(mut self, end_line: u32, end_column: u32) -> Self {
        self.end_line = Some(end_line);
        self.end_column = Some(end_column);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location_new() {
        let loc = SourceLocation::new(10, 5);
        assert_eq!(loc.start_line, 10);
        assert_eq!(loc.start_column, 5);
        assert_eq!(loc.end_line, None);
        assert_eq!(loc.end_column, None);
    }

    #[test]
    fn test_source_location_skips_missing_end() {
        let json = serde_json::to_string(&SourceLocation::new(1, 2)).unwrap();
        assert_eq!(json, r#"{"start_line":1,"start_column":2}"#);
    }

    #[test]
    fn test_source_location_deserialize_without_end() {
        let loc: SourceLocation =
            serde_json::from_str(r#"{"start_line":4,"start_column":1}"#).unwrap();
        assert_eq!(loc, SourceLocation::new(4, 1));
    }
}
