//! Error and warning aggregation for a single run.

use tc_core::{ConversionError, ConversionStats, ConversionWarning};
use tracing::debug;

/// Append-only store of the errors and warnings raised during a run.
///
/// # Examples
///
/// ```
/// use tc_core::{ConversionError, ConversionWarning};
/// use tc_pipeline::Diagnostics;
///
/// let mut diagnostics = Diagnostics::new();
/// diagnostics.add_error(ConversionError::parsing("UNEXPECTED_TOKEN", "bad token").recoverable(true));
/// diagnostics.add_warning(ConversionWarning::new("DEPRECATED_API", "browser.pause is deprecated"));
///
/// assert!(!diagnostics.errors()[0].recoverable);
///
/// let stats = diagnostics.empty_stats();
/// assert_eq!(stats.total_files, 0);
/// assert_eq!(stats.total_errors, 1);
/// assert_eq!(stats.total_warnings, 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    errors: Vec<ConversionError>,
    warnings: Vec<ConversionWarning>,
}

impl Diagnostics {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error. Stored errors are never recoverable, whatever the
    /// caller set.
    pub fn add_error(&mut self, mut error: ConversionError) {
        error.recoverable = false;
        debug!(code = %error.code, file = ?error.file, "{}", error.message);
        self.errors.push(error);
    }

    /// Records a warning as given.
    pub fn add_warning(&mut self, warning: ConversionWarning) {
        debug!(code = %warning.code, file = ?warning.file, "{}", warning.message);
        self.warnings.push(warning);
    }

    /// Returns the recorded errors in insertion order.
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &[ConversionError] {
        &self.errors
    }

    /// Returns the recorded warnings in insertion order.
    #[inline]
    #[must_use]
    pub fn warnings(&self) -> &[ConversionWarning] {
        &self.warnings
    }

    /// Returns `true` if any error was recorded.
    #[inline]
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns stats with every file and change counter at zero and the
    /// error/warning totals taken from this store.
    #[must_use]
    pub fn empty_stats(&self) -> ConversionStats {
        ConversionStats {
            total_errors: self.errors.len() as u64,
            total_warnings: self.warnings.len() as u64,
            ..ConversionStats::default()
        }
    }

    /// Discards every recorded error and warning.
    pub fn reset(&mut self) {
        self.errors.clear();
        self.warnings.clear();
    }

    /// Consumes the store, returning errors and warnings.
    #[must_use]
    pub fn into_parts(self) -> (Vec<ConversionError>, Vec<ConversionWarning>) {
        (self.errors, self.warnings)
    }
}
