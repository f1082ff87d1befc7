//! Conversion errors and warnings reported in a [`ConversionResult`].
//!
//! Every error carries a namespaced code. Codes raised by a specific part of
//! a migration are built from an [`ErrorKind`] prefix plus a caller-supplied
//! sub-code (`PARSING_UNEXPECTED_TOKEN`, `FS_EACCES`, ...). Anything that
//! escapes a pipeline phase is reported as [`CONVERSION_FAILED`].
//!
//! [`ConversionResult`]: crate::ConversionResult

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Code used for any failure escaping the analyze/validate/transform phases.
pub const CONVERSION_FAILED: &str = "CONVERSION_FAILED";

/// The part of a migration an error originates from.
///
/// The kind determines the code prefix; see [`ErrorKind::prefix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Plan or output validation.
    Validation,
    /// Parsing source code.
    Parsing,
    /// Applying a transformation.
    Transformation,
    /// Reading or applying configuration.
    Configuration,
    /// Filesystem access.
    FileSystem,
}

impl ErrorKind {
    const ALL: [Self; 5] = [
        Self::Validation,
        Self::Parsing,
        Self::Transformation,
        Self::Configuration,
        Self::FileSystem,
    ];

    /// Returns the code prefix for this kind, including the trailing `_`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tc_core::ErrorKind;
    ///
    /// assert_eq!(ErrorKind::Configuration.prefix(), "CONFIG_");
    /// assert_eq!(ErrorKind::FileSystem.prefix(), "FS_");
    /// ```
    #[inline]
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_",
            Self::Parsing => "PARSING_",
            Self::Transformation => "TRANSFORMATION_",
            Self::Configuration => "CONFIG_",
            Self::FileSystem => "FS_",
        }
    }

    /// Builds the full code for a sub-code of this kind.
    #[must_use]
    pub fn code(self, sub_code: &str) -> String {
        format!("{}{sub_code}", self.prefix())
    }

    /// Recovers the kind from a namespaced code.
    ///
    /// Returns `None` for [`CONVERSION_FAILED`] and any code without a
    /// known prefix.
    ///
    /// # Examples
    ///
    /// ```
    /// use tc_core::{ErrorKind, CONVERSION_FAILED};
    ///
    /// assert_eq!(ErrorKind::from_code("PARSING_EOF"), Some(ErrorKind::Parsing));
    /// assert_eq!(ErrorKind::from_code(CONVERSION_FAILED), None);
    /// ```
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| code.starts_with(kind.prefix()))
    }
}

/// An error reported by a conversion run.
///
/// This is both a plain serializable record and a [`std::error::Error`], so
/// migration strategies can return it directly from a phase.
///
/// # Examples
///
/// ```
/// use tc_core::{ConversionError, ErrorKind};
///
/// let err = ConversionError::new(ErrorKind::Parsing, "UNEXPECTED_TOKEN", "Unexpected token '}'")
///     .in_file("test/login.spec.js")
///     .at(12, 4);
///
/// assert_eq!(err.code, "PARSING_UNEXPECTED_TOKEN");
/// assert_eq!(err.kind(), Some(ErrorKind::Parsing));
/// assert!(!err.recoverable);
/// assert_eq!(err.to_string(), "Unexpected token '}'");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct ConversionError {
    /// Namespaced error code.
    pub code: String,

    /// Error message.
    pub message: String,

    /// File where the error occurred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<Utf8PathBuf>,

    /// Line number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    /// Column number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,

    /// Captured backtrace, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,

    /// Whether the run can continue past this error.
    #[serde(default)]
    pub recoverable: bool,
}

impl ConversionError {
    /// Creates an error with a namespaced code.
    #[must_use]
    pub fn new(kind: ErrorKind, sub_code: &str, message: impl Into<String>) -> Self {
        Self::with_code(kind.code(sub_code), message)
    }

    /// Creates an error with a verbatim code.
    #[must_use]
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            file: None,
            line: None,
            column: None,
            stack: None,
            recoverable: false,
        }
    }

    /// Creates a [`CONVERSION_FAILED`] error.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::with_code(CONVERSION_FAILED, message)
    }

    /// Creates a `VALIDATION_` error.
    #[must_use]
    pub fn validation(sub_code: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, sub_code, message)
    }

    /// Creates a `PARSING_` error.
    #[must_use]
    pub fn parsing(sub_code: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parsing, sub_code, message)
    }

    /// Creates a `TRANSFORMATION_` error.
    #[must_use]
    pub fn transformation(sub_code: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transformation, sub_code, message)
    }

    /// Creates a `CONFIG_` error.
    #[must_use]
    pub fn configuration(sub_code: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, sub_code, message)
    }

    /// Creates an `FS_` error.
    #[must_use]
    pub fn file_system(sub_code: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FileSystem, sub_code, message)
    }

    /// Attaches the file the error occurred in.
    #[must_use]
    pub fn in_file(mut self, file: impl Into<Utf8PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Attaches a line and column.
    #[must_use]
    pub const fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Attaches a stack trace.
    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Sets whether the error is recoverable.
    #[must_use]
    pub const fn recoverable(mut self, recoverable: bool) -> Self {
        self.recoverable = recoverable;
        self
    }

    /// Returns the kind encoded in this error's code, if any.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        ErrorKind::from_code(&self.code)
    }

    /// Returns `true` if this is the catch-all [`CONVERSION_FAILED`] error.
    #[inline]
    #[must_use]
    pub fn is_conversion_failure(&self) -> bool {
        self.code == CONVERSION_FAILED
    }
}

/// A warning reported by a conversion run.
///
/// Warnings never halt a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionWarning {
    /// Warning code.
    pub code: String,

    /// Warning message.
    pub message: String,

    /// File the warning refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<Utf8PathBuf>,

    /// Line number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    /// Suggested fix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ConversionWarning {
    /// Creates a warning with the given code and message.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            file: None,
            line: None,
            suggestion: None,
        }
    }

    /// Attaches the file the warning refers to.
    #[must_use]
    pub fn in_file(mut self, file: impl Into<Utf8PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Attaches a line number.
    #[must_use]
    pub const fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Attaches a suggested fix.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_prefixes() {
        assert_eq!(ErrorKind::Validation.prefix(), "VALIDATION_");
        assert_eq!(ErrorKind::Parsing.prefix(), "PARSING_");
        assert_eq!(ErrorKind::Transformation.prefix(), "TRANSFORMATION_");
        assert_eq!(ErrorKind::Configuration.prefix(), "CONFIG_");
        assert_eq!(ErrorKind::FileSystem.prefix(), "FS_");
    }

    #[test]
    fn test_constructors_namespace_codes() {
        assert_eq!(ConversionError::validation("SYNTAX", "m").code, "VALIDATION_SYNTAX");
        assert_eq!(ConversionError::parsing("EOF", "m").code, "PARSING_EOF");
        assert_eq!(
            ConversionError::transformation("UNSUPPORTED", "m").code,
            "TRANSFORMATION_UNSUPPORTED"
        );
        assert_eq!(ConversionError::configuration("MISSING", "m").code, "CONFIG_MISSING");
        assert_eq!(ConversionError::file_system("EACCES", "m").code, "FS_EACCES");
    }

    #[test]
    fn test_kind_round_trips_through_code() {
        for kind in ErrorKind::ALL {
            let err = ConversionError::new(kind, "X", "m");
            assert_eq!(err.kind(), Some(kind));
        }
    }

    #[test]
    fn test_conversion_failed() {
        let err = ConversionError::failed("boom");
        assert_eq!(err.code, CONVERSION_FAILED);
        assert!(err.is_conversion_failure());
        assert_eq!(err.kind(), None);
        assert!(!err.recoverable);
    }

    #[test]
    fn test_error_builders() {
        let err = ConversionError::parsing("EOF", "unexpected end")
            .in_file("a.js")
            .at(3, 9)
            .with_stack("at parse")
            .recoverable(true);
        assert_eq!(err.file.as_deref().map(|p| p.as_str()), Some("a.js"));
        assert_eq!((err.line, err.column), (Some(3), Some(9)));
        assert_eq!(err.stack.as_deref(), Some("at parse"));
        assert!(err.recoverable);
    }

    #[test]
    fn test_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(ConversionError::failed("boom"));
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_error_serialization_omits_unset_fields() {
        let json = serde_json::to_value(ConversionError::failed("boom")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "code": "CONVERSION_FAILED",
                "message": "boom",
                "recoverable": false
            })
        );
    }

    #[test]
    fn test_warning_builders() {
        let warn = ConversionWarning::new("VALIDATION_DEPRECATION", "browser.pause is deprecated")
            .in_file("a.js")
            .at_line(7)
            .with_suggestion("use page.waitForTimeout");
        assert_eq!(warn.line, Some(7));
        assert_eq!(warn.suggestion.as_deref(), Some("use page.waitForTimeout"));
    }
}
