//! Conversion plan types produced by the analysis phase.
//!
//! A [`ConversionPlan`] is built once per run by the analyzer and is then
//! read by both the validator and the transformer.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::file::SourceFile;
use crate::hash::FxHashSet;

/// Estimated complexity of converting one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    /// Mechanical rewrites only.
    #[default]
    Low,
    /// Some constructs need restructuring.
    Medium,
    /// Significant manual review expected.
    High,
}

/// Severity of a potential issue flagged during analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational.
    #[default]
    Low,
    /// Worth a look before running.
    Medium,
    /// Likely to break the converted output.
    High,
}

/// One named transformation to apply to a file.
///
/// `dependencies` name other steps of the same [`FileConversionPlan`].
/// Dangling names are a plan defect reported by
/// [`FileConversionPlan::dangling_dependencies`]; they are not rejected on
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformationStep {
    /// Step name, unique within its file plan.
    pub name: String,

    /// Human-readable description.
    pub description: String,

    /// Relative priority; higher runs earlier.
    pub priority: i32,

    /// Names of steps that must run before this one.
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub dependencies: SmallVec<[String; 2]>,
}

impl TransformationStep {
    /// Creates a step with no dependencies.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, priority: i32) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            priority,
            dependencies: SmallVec::new(),
        }
    }

    /// Adds a dependency on another step.
    #[must_use]
    pub fn depends_on(mut self, step: impl Into<String>) -> Self {
        self.dependencies.push(step.into());
        self
    }
}

/// The plan for converting a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConversionPlan {
    /// The file to convert.
    pub source: SourceFile,

    /// Where the converted file will be written.
    pub target_path: Utf8PathBuf,

    /// Transformations to apply, in plan order.
    pub transformations: Vec<TransformationStep>,

    /// Estimated conversion complexity.
    pub complexity: Complexity,
}

impl FileConversionPlan {
    /// Returns `(step, missing dependency)` pairs for every dependency that
    /// does not name a step in this plan.
    ///
    /// # Examples
    ///
    /// ```
    /// use tc_core::{Complexity, FileConversionPlan, SourceFile, TransformationStep};
    /// use camino::Utf8PathBuf;
    ///
    /// let plan = FileConversionPlan {
    ///     source: SourceFile::new("/r/a.js".into(), "a.js".into(), String::new()),
    ///     target_path: Utf8PathBuf::from("/r/a.ts"),
    ///     transformations: vec![
    ///         TransformationStep::new("imports", "require to import", 10),
    ///         TransformationStep::new("exports", "module.exports to export", 5)
    ///             .depends_on("imports")
    ///             .depends_on("hoisting"),
    ///     ],
    ///     complexity: Complexity::Low,
    /// };
    ///
    /// assert_eq!(plan.dangling_dependencies(), vec![("exports", "hoisting")]);
    /// ```
    #[must_use]
    pub fn dangling_dependencies(&self) -> Vec<(&str, &str)> {
        let names: FxHashSet<&str> = self
            .transformations
            .iter()
            .map(|step| step.name.as_str())
            .collect();

        self.transformations
            .iter()
            .flat_map(|step| {
                step.dependencies
                    .iter()
                    .filter(|dep| !names.contains(dep.as_str()))
                    .map(move |dep| (step.name.as_str(), dep.as_str()))
            })
            .collect()
    }
}

/// A problem the analyzer expects the conversion to run into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotentialIssue {
    /// How serious the issue is.
    pub severity: Severity,

    /// What the issue is.
    pub description: String,

    /// Files affected by the issue.
    pub affected_files: Vec<Utf8PathBuf>,

    /// Suggested resolution, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

/// Kind of change to a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigChangeKind {
    /// Create a new configuration file.
    Create,
    /// Modify an existing configuration file.
    Modify,
    /// Delete a configuration file.
    Delete,
}

/// A configuration file change the migration requires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigChange {
    /// Configuration file path.
    pub file: Utf8PathBuf,

    /// Kind of change.
    pub kind: ConfigChangeKind,

    /// Keys to set, as a raw mapping.
    pub changes: serde_json::Map<String, serde_json::Value>,

    /// Whether the user must confirm the change.
    pub requires_confirmation: bool,
}

/// The full plan for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionPlan {
    /// Per-file plans in processing order.
    pub files: Vec<FileConversionPlan>,

    /// Estimated duration in milliseconds.
    pub estimated_duration_ms: u64,

    /// Estimated disk-space delta in bytes (negative when output shrinks).
    pub required_disk_space: i64,

    /// Issues flagged during analysis.
    pub potential_issues: Vec<PotentialIssue>,

    /// Configuration files that need changing.
    pub config_changes: Vec<ConfigChange>,
}

impl ConversionPlan {
    /// Returns the number of files in the plan.
    #[inline]
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Returns the highest severity among flagged issues, if any.
    #[must_use]
    pub fn highest_severity(&self) -> Option<Severity> {
        self.potential_issues.iter().map(|i| i.severity).max()
    }

    /// Returns the total number of transformation steps across all files.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.files.iter().map(|f| f.transformations.len()).sum()
    }
}
