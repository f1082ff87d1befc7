//! Contracts for the collaborators a migration strategy relies on.
//!
//! The pipeline never touches the filesystem or parses code itself. These
//! traits describe the request/response shape of the pieces that do, so a
//! strategy can be assembled from interchangeable parts and tested with
//! in-memory doubles. Filesystem-backed implementations live in
//! `tc-scanner`.

use async_trait::async_trait;
use camino::Utf8Path;

use crate::types::{
    BackupInfo, ConfigFile, ProcessedFile, ProgressEvent, RawConfig, ResolvedConfig, SourceFile,
};

/// Reads project configuration files.
#[async_trait]
pub trait ConfigReader: Send + Sync {
    /// Reads the configuration at `path` as a raw mapping.
    async fn read_config(&self, path: &Utf8Path) -> anyhow::Result<RawConfig>;

    /// Finds and reads every known configuration file directly inside `dir`.
    async fn find_configs(&self, dir: &Utf8Path) -> anyhow::Result<Vec<ConfigFile>>;
}

/// Merges configuration mappings from several sources.
pub trait ConfigResolver: Send + Sync {
    /// Merges `configs` in order into one mapping.
    fn merge(&self, configs: &[RawConfig]) -> RawConfig;

    /// Merges `configs` in order, recording every top-level key the sources
    /// disagree on together with each competing source/value pair.
    fn resolve(&self, configs: &[ConfigFile]) -> ResolvedConfig;
}

/// Writes configuration changes back to disk.
#[async_trait]
pub trait ConfigUpdater: Send + Sync {
    /// Shallow-merges `changes` into the configuration at `path`.
    async fn update_config(&self, path: &Utf8Path, changes: &RawConfig) -> anyhow::Result<()>;

    /// Creates a new configuration file at `path`.
    async fn create_config(&self, path: &Utf8Path, content: &RawConfig) -> anyhow::Result<()>;
}

/// Reads source files.
#[async_trait]
pub trait FileReader: Send + Sync {
    /// Reads a single file.
    async fn read_file(&self, path: &Utf8Path) -> anyhow::Result<SourceFile>;

    /// Reads several files, preserving input order.
    async fn read_files(&self, paths: &[&Utf8Path]) -> anyhow::Result<Vec<SourceFile>> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            files.push(self.read_file(path).await?);
        }
        Ok(files)
    }

    /// Lists candidate files under `root` that the reader's filter accepts.
    async fn find_files(&self, root: &Utf8Path) -> anyhow::Result<Vec<camino::Utf8PathBuf>>;
}

/// Writes converted files.
#[async_trait]
pub trait FileWriter: Send + Sync {
    /// Writes the target of a processed file.
    async fn write_file(&self, file: &ProcessedFile) -> anyhow::Result<()>;

    /// Writes several processed files in order, stopping at the first failure.
    async fn write_files(&self, files: &[ProcessedFile]) -> anyhow::Result<()> {
        for file in files {
            self.write_file(file).await?;
        }
        Ok(())
    }
}

/// Backs files up before they are modified and restores them on request.
#[async_trait]
pub trait BackupManager: Send + Sync {
    /// Copies `file` into the backup area.
    async fn create_backup(&self, file: &SourceFile) -> anyhow::Result<BackupInfo>;

    /// Copies a backup over its original.
    async fn restore_backup(&self, backup: &BackupInfo) -> anyhow::Result<()>;

    /// Removes every backup this manager created.
    async fn cleanup_backups(&self) -> anyhow::Result<()>;
}

/// Counted progress over a known number of items.
///
/// Strategies use this for per-file progress inside a phase. Calls are
/// synchronous and never fail; a reporter that cannot deliver an event
/// drops it.
pub trait ProgressReporter: Send {
    /// Forwards a prepared event unchanged.
    fn report(&mut self, event: ProgressEvent);

    /// Begins counting `total_items` items.
    fn start(&mut self, total_items: usize);

    /// Marks `current` items as reached, with an optional message.
    fn update(&mut self, current: usize, message: Option<&str>);

    /// Marks every item as done.
    fn complete(&mut self);
}
