//! Domain types for test-converter.
//!
//! # Module Organization
//!
//! - [`file`] - Source files read from the tree being migrated
//! - [`location`] - Source spans
//! - [`plan`] - The conversion plan produced by analysis
//! - [`validation`] - Validation findings
//! - [`diagnostic`] - Conversion errors, warnings, and code namespacing
//! - [`result`] - The terminal result of a run
//! - [`progress`] - Progress notifications
//! - [`config_file`] - Project configuration files and merge conflicts
//! - [`backup`] - Backup records
//!
//! All public types are re-exported here and at the crate root:
//!
//! ```
//! use tc_core::{ConversionPlan, ConversionResult, ProgressEvent, SourceFile};
//! ```

pub mod backup;
pub mod config_file;
pub mod diagnostic;
pub mod file;
pub mod location;
pub mod plan;
pub mod progress;
pub mod result;
pub mod validation;

pub use backup::BackupInfo;
pub use config_file::{
    ConfigConflict, ConfigFile, ConfigFileKind, ConflictKind, ConflictResolution, ConflictValue,
    RawConfig, ResolutionOption, ResolvedConfig,
};
pub use diagnostic::{CONVERSION_FAILED, ConversionError, ConversionWarning, ErrorKind};
pub use file::SourceFile;
pub use location::SourceLocation;
pub use plan::{
    Complexity, ConfigChange, ConfigChangeKind, ConversionPlan, FileConversionPlan,
    PotentialIssue, Severity, TransformationStep,
};
pub use progress::{Phase, ProgressEvent};
pub use result::{
    ChangeKind, ConversionResult, ConversionStats, FileChange, ProcessedFile, SkippedFile,
};
pub use validation::{
    ValidationError, ValidationErrorKind, ValidationResult, ValidationWarning,
    ValidationWarningKind,
};
