//! Writing converted files.

use async_trait::async_trait;
use tc_core::{FileWriter, ProcessedFile, RunConfig};
use tracing::{debug, info};

use crate::error::ScanError;

/// Writes processed targets to disk, creating parent directories.
///
/// In dry-run mode nothing is written.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileWriter {
    dry_run: bool,
}

impl FsFileWriter {
    /// Creates a writer.
    #[must_use]
    pub const fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Creates a writer honouring the run's dry-run flag.
    #[must_use]
    pub const fn from_config(config: &RunConfig) -> Self {
        Self::new(config.dry_run)
    }

    /// Returns `true` if writes are skipped.
    #[inline]
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

#[async_trait]
impl FileWriter for FsFileWriter {
    async fn write_file(&self, file: &ProcessedFile) -> anyhow::Result<()> {
        let target = &file.target.path;
        if !file.modified && *target == file.source.path {
            debug!(path = %target, "Unchanged, not rewriting");
            return Ok(());
        }
        if self.dry_run {
            info!(path = %target, changes = file.changes.len(), "Dry run, would write");
            return Ok(());
        }

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ScanError::write(parent, e))?;
        }
        tokio::fs::write(target, &file.target.content)
            .await
            .map_err(|e| ScanError::write(target, e))?;
        debug!(path = %target, bytes = file.target.content.len(), "Wrote file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::{Utf8Path, Utf8PathBuf};
    use tc_core::SourceFile;

    fn processed(root: &Utf8Path, modified: bool) -> ProcessedFile {
        let source = SourceFile::new(
            root.join("src/a.js"),
            Utf8PathBuf::from("src/a.js"),
            "const a = require('a');\n".to_owned(),
        );
        let target = SourceFile::new(
            root.join("out/src/a.js"),
            Utf8PathBuf::from("src/a.js"),
            "import a from 'a';\n".to_owned(),
        );
        ProcessedFile {
            source,
            target,
            changes: Vec::new(),
            modified,
            backup_path: None,
        }
    }

    fn temp_root() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        (dir, root)
    }

    #[tokio::test]
    async fn test_writes_target_creating_dirs() {
        let (_dir, root) = temp_root();
        let file = processed(&root, true);

        FsFileWriter::new(false).write_file(&file).await.unwrap();

        let written = std::fs::read_to_string(root.join("out/src/a.js")).unwrap();
        assert_eq!(written, "import a from 'a';\n");
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let (_dir, root) = temp_root();
        let writer = FsFileWriter::new(true);
        assert!(writer.is_dry_run());

        writer.write_files(&[processed(&root, true)]).await.unwrap();

        assert!(!root.join("out").exists());
    }
}
