//! Validation results produced by the validation phase.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use super::location::SourceLocation;

/// Category of a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// The source or generated code does not parse.
    Syntax,
    /// The code parses but its meaning cannot be preserved.
    Semantic,
    /// A configuration file is invalid.
    Config,
    /// The target framework cannot express a construct.
    Compatibility,
}

impl ValidationErrorKind {
    /// Returns the upper-cased sub-code appended to the `VALIDATION_` prefix.
    ///
    /// # Examples
    ///
    /// ```
    /// use tc_core::ValidationErrorKind;
    ///
    /// assert_eq!(ValidationErrorKind::Syntax.code(), "SYNTAX");
    /// ```
    #[inline]
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Syntax => "SYNTAX",
            Self::Semantic => "SEMANTIC",
            Self::Config => "CONFIG",
            Self::Compatibility => "COMPATIBILITY",
        }
    }
}

/// Category of a validation warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationWarningKind {
    /// Use of a deprecated API.
    Deprecation,
    /// Works, but goes against the target framework's conventions.
    BestPractice,
    /// Likely to be slow.
    Performance,
    /// Might behave differently on the target framework.
    Compatibility,
}

impl ValidationWarningKind {
    /// Returns the upper-cased sub-code appended to the `VALIDATION_` prefix.
    ///
    /// Multi-word kinds are upper-cased without separators.
    ///
    /// # Examples
    ///
    /// ```
    /// use tc_core::ValidationWarningKind;
    ///
    /// assert_eq!(ValidationWarningKind::BestPractice.code(), "BESTPRACTICE");
    /// ```
    #[inline]
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Deprecation => "DEPRECATION",
            Self::BestPractice => "BESTPRACTICE",
            Self::Performance => "PERFORMANCE",
            Self::Compatibility => "COMPATIBILITY",
        }
    }
}

/// A single validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,

    /// Error message.
    pub message: String,

    /// File the error refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<Utf8PathBuf>,

    /// Location within the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl ValidationError {
    /// Creates an error with no file or location.
    #[must_use]
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            file: None,
            location: None,
        }
    }

    /// Attaches the file the error refers to.
    #[must_use]
    pub fn in_file(mut self, file: impl Into<Utf8PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Attaches a location.
    #[must_use]
    pub const fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

/// A single validation warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationWarning {
    /// Warning category.
    pub kind: ValidationWarningKind,

    /// Warning message.
    pub message: String,

    /// File the warning refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<Utf8PathBuf>,

    /// Location within the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,

    /// Suggested fix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationWarning {
    /// Creates a warning with no file, location, or suggestion.
    #[must_use]
    pub fn new(kind: ValidationWarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            file: None,
            location: None,
            suggestion: None,
        }
    }

    /// Attaches the file the warning refers to.
    #[must_use]
    pub fn in_file(mut self, file: impl Into<Utf8PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Attaches a location.
    #[must_use]
    pub const fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Attaches a suggested fix.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Outcome of validating a conversion plan.
///
/// # Examples
///
/// ```
/// use tc_core::{ValidationError, ValidationErrorKind, ValidationResult};
///
/// let ok = ValidationResult::passed();
/// assert!(ok.valid);
///
/// let failed = ValidationResult::failed(vec![
///     ValidationError::new(ValidationErrorKind::Syntax, "Invalid syntax").in_file("test.js"),
/// ]);
/// assert!(!failed.valid);
/// assert_eq!(failed.errors.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the plan passed validation.
    pub valid: bool,

    /// Validation errors.
    #[serde(default)]
    pub errors: Vec<ValidationError>,

    /// Validation warnings.
    #[serde(default)]
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// A passing result with no findings.
    #[must_use]
    pub const fn passed() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// A failing result carrying the given errors.
    #[must_use]
    pub const fn failed(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: false,
            errors,
            warnings: Vec::new(),
        }
    }

    /// Appends a warning without changing validity.
    #[must_use]
    pub fn with_warning(mut self, warning: ValidationWarning) -> Self {
        self.warnings.push(warning);
        self
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::passed()
    }
}
