//! Progress notifications emitted while a run is in flight.
//!
//! Events are ephemeral: they are delivered to listeners and never stored.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Pipeline phase a progress event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Analyzing the source tree.
    Analysis,
    /// Building the conversion plan.
    Planning,
    /// Transforming files.
    Transformation,
    /// Validating the plan or results.
    Validation,
    /// Writing output files.
    Writing,
}

impl Phase {
    /// Returns a human-readable label for this phase.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Analysis => "Analysis",
            Self::Planning => "Planning",
            Self::Transformation => "Transformation",
            Self::Validation => "Validation",
            Self::Writing => "Writing",
        }
    }
}

/// A single progress notification.
///
/// # Examples
///
/// ```
/// use tc_core::{Phase, ProgressEvent};
///
/// let event = ProgressEvent::new(Phase::Transformation, 30, "Transforming files...")
///     .for_file("test/login.spec.js");
///
/// assert_eq!(event.progress, 30);
/// assert!(event.current_file.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Current phase.
    pub phase: Phase,

    /// File currently being processed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_file: Option<Utf8PathBuf>,

    /// Completion percentage, 0 to 100.
    pub progress: u8,

    /// Human-readable message.
    pub message: String,

    /// Current operation label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

impl ProgressEvent {
    /// Maximum progress value.
    pub const MAX_PROGRESS: u8 = 100;

    /// Creates an event; `progress` is clamped to [`MAX_PROGRESS`](Self::MAX_PROGRESS).
    #[must_use]
    pub fn new(phase: Phase, progress: u8, message: impl Into<String>) -> Self {
        Self {
            phase,
            current_file: None,
            progress: progress.min(Self::MAX_PROGRESS),
            message: message.into(),
            operation: None,
        }
    }

    /// Sets the file currently being processed.
    #[must_use]
    pub fn for_file(mut self, file: impl Into<Utf8PathBuf>) -> Self {
        self.current_file = Some(file.into());
        self
    }

    /// Sets the operation label.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }
}
