//! Run options and their normalization.
//!
//! - [`ConversionOptions`] - what the user supplied; every optional field may be unset
//! - [`RunConfig`] - the normalized configuration a run executes with
//!
//! [`ConversionOptions::normalize`] fills unset fields with defaults and
//! passes every supplied field through unchanged. Normalization is
//! idempotent: `config.to_options().normalize()` returns `config`.

use std::num::NonZeroUsize;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::RawConfig;

/// Default backup directory.
pub const DEFAULT_BACKUP_DIR: &str = ".backup";

/// Default number of files processed in parallel.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Default include patterns.
pub const DEFAULT_INCLUDE: &[&str] = &["**/*"];

/// Default exclude patterns.
pub const DEFAULT_EXCLUDE: &[&str] = &["**/node_modules/**", "**/.git/**"];

/// Options for a conversion run as supplied by the user.
///
/// Unset fields are filled in by [`normalize`](Self::normalize).
///
/// # Examples
///
/// ```
/// use tc_core::ConversionOptions;
///
/// let config = ConversionOptions::new("/s").normalize().unwrap();
///
/// assert!(!config.dry_run);
/// assert!(config.backup);
/// assert_eq!(config.backup_dir, ".backup");
/// assert_eq!(config.concurrency.get(), 5);
/// assert_eq!(config.include, vec!["**/*"]);
/// assert_eq!(config.exclude, vec!["**/node_modules/**", "**/.git/**"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionOptions {
    /// Source directory or file.
    pub source: Utf8PathBuf,

    /// Target directory for converted files; `None` converts in place.
    pub target: Option<Utf8PathBuf>,

    /// Preview changes without writing.
    pub dry_run: Option<bool>,

    /// Back up files before modifying them.
    pub backup: Option<bool>,

    /// Backup directory.
    pub backup_dir: Option<Utf8PathBuf>,

    /// Glob patterns of files to include.
    pub include: Option<Vec<String>>,

    /// Glob patterns of files to exclude.
    pub exclude: Option<Vec<String>>,

    /// Preserve the directory structure in the target.
    pub preserve_structure: Option<bool>,

    /// Ask before resolving conflicts.
    pub interactive: Option<bool>,

    /// Verbose logging.
    pub verbose: Option<bool>,

    /// Free-form overrides for the migration strategy.
    pub config: Option<RawConfig>,

    /// Maximum number of files processed in parallel.
    pub concurrency: Option<usize>,
}

impl ConversionOptions {
    /// Creates options for the given source with every other field unset.
    #[must_use]
    pub fn new(source: impl Into<Utf8PathBuf>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Loads options from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file can't be read and
    /// [`ConfigError::Parse`] if it isn't valid options JSON.
    pub fn from_json_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::parse(path, e))
    }

    /// Sets the target directory.
    #[must_use]
    pub fn target(mut self, target: impl Into<Utf8PathBuf>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Sets dry-run mode.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = Some(dry_run);
        self
    }

    /// Enables or disables backups.
    #[must_use]
    pub const fn backup(mut self, backup: bool) -> Self {
        self.backup = Some(backup);
        self
    }

    /// Sets the backup directory.
    #[must_use]
    pub fn backup_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.backup_dir = Some(dir.into());
        self
    }

    /// Sets the include patterns.
    #[must_use]
    pub fn include<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the exclude patterns.
    #[must_use]
    pub fn exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the concurrency limit.
    #[must_use]
    pub const fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Sets verbose mode.
    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Fills unset fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] if `concurrency` is zero.
    pub fn normalize(self) -> Result<RunConfig, ConfigError> {
        let concurrency = match self.concurrency {
            None => NonZeroUsize::new(DEFAULT_CONCURRENCY),
            Some(n) => NonZeroUsize::new(n),
        }
        .ok_or_else(|| ConfigError::invalid_option("concurrency", "must be at least 1"))?;

        Ok(RunConfig {
            source: self.source,
            target: self.target,
            dry_run: self.dry_run.unwrap_or(false),
            backup: self.backup.unwrap_or(true),
            backup_dir: self
                .backup_dir
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_BACKUP_DIR)),
            include: self.include.unwrap_or_else(|| owned(DEFAULT_INCLUDE)),
            exclude: self.exclude.unwrap_or_else(|| owned(DEFAULT_EXCLUDE)),
            preserve_structure: self.preserve_structure.unwrap_or(true),
            interactive: self.interactive.unwrap_or(false),
            verbose: self.verbose.unwrap_or(false),
            config: self.config.unwrap_or_default(),
            concurrency,
        })
    }
}

/// The normalized configuration of a run.
///
/// Every field has a value. `concurrency` is a hint forwarded to the
/// transformer; the pipeline itself never fans out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Source directory or file.
    pub source: Utf8PathBuf,
    /// Target directory; `None` converts in place.
    pub target: Option<Utf8PathBuf>,
    /// Preview changes without writing.
    pub dry_run: bool,
    /// Back up files before modifying them.
    pub backup: bool,
    /// Backup directory.
    pub backup_dir: Utf8PathBuf,
    /// Include patterns.
    pub include: Vec<String>,
    /// Exclude patterns.
    pub exclude: Vec<String>,
    /// Preserve the directory structure in the target.
    pub preserve_structure: bool,
    /// Ask before resolving conflicts.
    pub interactive: bool,
    /// Verbose logging.
    pub verbose: bool,
    /// Free-form overrides for the migration strategy.
    pub config: RawConfig,
    /// Maximum number of files processed in parallel.
    pub concurrency: NonZeroUsize,
}

impl RunConfig {
    /// Converts back to options with every field set.
    #[must_use]
    pub fn to_options(&self) -> ConversionOptions {
        ConversionOptions {
            source: self.source.clone(),
            target: self.target.clone(),
            dry_run: Some(self.dry_run),
            backup: Some(self.backup),
            backup_dir: Some(self.backup_dir.clone()),
            include: Some(self.include.clone()),
            exclude: Some(self.exclude.clone()),
            preserve_structure: Some(self.preserve_structure),
            interactive: Some(self.interactive),
            verbose: Some(self.verbose),
            config: Some(self.config.clone()),
            concurrency: Some(self.concurrency.get()),
        }
    }

    /// Returns the directory converted files are written to.
    #[must_use]
    pub fn output_root(&self) -> &Utf8Path {
        self.target.as_deref().unwrap_or(&self.source)
    }

    /// Returns the backup directory, resolved against the source when relative.
    #[must_use]
    pub fn resolved_backup_dir(&self) -> Utf8PathBuf {
        if self.backup_dir.is_absolute() {
            self.backup_dir.clone()
        } else {
            self.source.join(&self.backup_dir)
        }
    }
}

fn owned(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| (*p).to_owned()).collect()
}
