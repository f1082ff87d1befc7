//! Backups of files taken before they are rewritten.
//!
//! Backups mirror the source layout under the backup directory, so
//! `src/a.js` is copied to `<backup_dir>/src/a.js`.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::Mutex;
use tc_core::{BackupInfo, BackupManager, RunConfig, SourceFile};
use tracing::{debug, info, warn};

use crate::error::ScanError;

/// Copies files into a backup directory and restores them on request.
#[derive(Debug)]
pub struct FsBackupManager {
    backup_dir: Utf8PathBuf,
    created: Mutex<Vec<BackupInfo>>,
}

impl FsBackupManager {
    /// Creates a manager writing into `backup_dir`.
    #[must_use]
    pub fn new(backup_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            backup_dir: backup_dir.into(),
            created: Mutex::new(Vec::new()),
        }
    }

    /// Creates a manager for the run's resolved backup directory.
    #[must_use]
    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.resolved_backup_dir())
    }

    /// Returns the backup directory.
    #[inline]
    #[must_use]
    pub fn backup_dir(&self) -> &Utf8Path {
        &self.backup_dir
    }

    /// Returns the backups taken so far.
    #[must_use]
    pub fn backups(&self) -> Vec<BackupInfo> {
        self.created.lock().clone()
    }

    /// Returns where `file` is backed up to.
    #[must_use]
    pub fn backup_path_for(&self, file: &SourceFile) -> Utf8PathBuf {
        if file.relative_path.is_relative() && !file.relative_path.as_str().is_empty() {
            self.backup_dir.join(&file.relative_path)
        } else {
            self.backup_dir.join(file.path.file_name().unwrap_or("unnamed"))
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

async fn copy_file(from: &Utf8Path, to: &Utf8Path) -> Result<u64, ScanError> {
    if let Some(parent) = to.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ScanError::backup(from, e))?;
    }
    tokio::fs::copy(from, to)
        .await
        .map_err(|e| ScanError::backup(from, e))
}

#[async_trait]
impl BackupManager for FsBackupManager {
    async fn create_backup(&self, file: &SourceFile) -> anyhow::Result<BackupInfo> {
        let backup_path = self.backup_path_for(file);
        let size = copy_file(&file.path, &backup_path).await?;

        let info = BackupInfo {
            original_path: file.path.clone(),
            backup_path,
            timestamp: now_millis(),
            size,
        };
        debug!(original = %info.original_path, backup = %info.backup_path, "Backed up file");
        self.created.lock().push(info.clone());
        Ok(info)
    }

    async fn restore_backup(&self, backup: &BackupInfo) -> anyhow::Result<()> {
        copy_file(&backup.backup_path, &backup.original_path).await?;
        info!(path = %backup.original_path, "Restored from backup");
        Ok(())
    }

    async fn cleanup_backups(&self) -> anyhow::Result<()> {
        let backups = std::mem::take(&mut *self.created.lock());
        for backup in &backups {
            match tokio::fs::remove_file(&backup.backup_path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!(path = %backup.backup_path, "Backup already removed");
                }
                Err(e) => return Err(ScanError::backup(&backup.backup_path, e).into()),
            }
        }
        // Only succeeds when nothing else lives in the directory
        if tokio::fs::remove_dir(&self.backup_dir).await.is_ok() {
            debug!(dir = %self.backup_dir, "Removed empty backup directory");
        }
        info!(removed = backups.len(), "Cleaned up backups");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn setup() -> (tempfile::TempDir, Utf8PathBuf, SourceFile) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/a.js"), "original\n").unwrap();
        let file = SourceFile::new(
            root.join("src/a.js"),
            Utf8PathBuf::from("src/a.js"),
            "original\n".to_owned(),
        );
        (dir, root, file)
    }

    #[tokio::test]
    async fn test_backup_and_restore() {
        let (_dir, root, file) = setup();
        let manager = FsBackupManager::new(root.join(".backup"));

        let info = manager.create_backup(&file).await.unwrap();
        assert_eq!(info.backup_path, root.join(".backup/src/a.js"));
        assert_eq!(info.size, 9);
        assert!(info.timestamp > 0);

        fs::write(&file.path, "rewritten\n").unwrap();
        manager.restore_backup(&info).await.unwrap();
        assert_eq!(fs::read_to_string(&file.path).unwrap(), "original\n");
    }

    #[tokio::test]
    async fn test_cleanup_removes_backups() {
        let (_dir, root, file) = setup();
        let manager = FsBackupManager::new(root.join(".backup"));
        let info = manager.create_backup(&file).await.unwrap();
        assert_eq!(manager.backups().len(), 1);

        manager.cleanup_backups().await.unwrap();

        assert!(!info.backup_path.exists());
        assert!(manager.backups().is_empty());
        assert!(file.path.exists());
    }

    #[tokio::test]
    async fn test_backup_of_missing_file_fails() {
        let (_dir, root, _file) = setup();
        let manager = FsBackupManager::new(root.join(".backup"));
        let ghost = SourceFile::new(
            root.join("src/ghost.js"),
            Utf8PathBuf::from("src/ghost.js"),
            String::new(),
        );
        assert!(manager.create_backup(&ghost).await.is_err());
    }

    #[test]
    fn test_backup_dir_from_config() {
        let config = tc_core::ConversionOptions::new("/project").normalize().unwrap();
        let manager = FsBackupManager::from_config(&config);
        assert_eq!(manager.backup_dir(), Utf8Path::new("/project/.backup"));
    }
}
