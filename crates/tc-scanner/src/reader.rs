//! Reading source files into [`SourceFile`] records.
//!
//! Single reads go through `tokio::fs`. Batches are read on a dedicated
//! rayon pool whose size comes from the run's `concurrency` setting, so a
//! large tree never has more than that many files open at once.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;
use tc_core::{FileReader, RunConfig, SourceFile};
use tc_pipeline::{FileFilter, PatternFilter};
use tracing::{debug, warn};

use crate::error::ScanError;
use crate::walker::SourceWalker;

/// Reads files under a source root.
#[derive(Clone)]
pub struct FsFileReader {
    root: Utf8PathBuf,
    filter: Arc<dyn FileFilter>,
    pool: Arc<rayon::ThreadPool>,
}

impl FsFileReader {
    /// Creates a reader for `root` reading at most `concurrency` files at a
    /// time.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if the thread pool can't be built.
    pub fn new(
        root: impl Into<Utf8PathBuf>,
        filter: impl FileFilter + 'static,
        concurrency: NonZeroUsize,
    ) -> Result<Self, ScanError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(concurrency.get())
            .thread_name(|i| format!("tc-reader-{i}"))
            .build()
            .map_err(|e| ScanError::config(format!("failed to build reader pool: {e}")))?;

        Ok(Self {
            root: root.into(),
            filter: Arc::new(filter),
            pool: Arc::new(pool),
        })
    }

    /// Creates a reader from a run configuration: its source root, its
    /// include/exclude patterns, and its concurrency.
    pub fn from_config(config: &RunConfig) -> Result<Self, ScanError> {
        Self::new(
            config.source.clone(),
            PatternFilter::from_config(config),
            config.concurrency,
        )
    }

    /// Returns the source root.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Returns the number of files read in parallel.
    #[inline]
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Reads `paths` on the reader pool, preserving input order.
    ///
    /// # Errors
    ///
    /// Fails if any file can't be read.
    pub fn read_batch(&self, paths: &[Utf8PathBuf]) -> Result<Vec<SourceFile>, ScanError> {
        self.pool.install(|| {
            paths
                .par_iter()
                .map(|path| read_source(&self.root, path))
                .collect()
        })
    }

    /// Reads `paths` on the reader pool, skipping files that can't be read.
    ///
    /// Returns the files read and the errors for the files skipped, both in
    /// input order.
    pub fn read_lenient(&self, paths: &[Utf8PathBuf]) -> (Vec<SourceFile>, Vec<ScanError>) {
        let results: Vec<_> = self.pool.install(|| {
            paths
                .par_iter()
                .map(|path| read_source(&self.root, path))
                .collect()
        });

        let mut files = Vec::with_capacity(results.len());
        let mut errors = Vec::new();
        for result in results {
            match result {
                Ok(file) => files.push(file),
                Err(err) => {
                    warn!(error = %err, "Skipping unreadable file");
                    errors.push(err);
                }
            }
        }
        (files, errors)
    }

    /// Walks the root and returns the paths the filter accepts.
    pub fn discover(&self) -> Result<Vec<Utf8PathBuf>, ScanError> {
        SourceWalker::with_shared_filter(&self.root, Arc::clone(&self.filter))?.collect_paths()
    }
}

impl std::fmt::Debug for FsFileReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsFileReader")
            .field("root", &self.root)
            .field("concurrency", &self.concurrency())
            .finish_non_exhaustive()
    }
}

/// Reads one file, resolving `path` against `root` if it is relative.
///
/// # Errors
///
/// Returns [`ScanError::Read`] if the file can't be read as UTF-8 text.
pub fn read_source(root: &Utf8Path, path: &Utf8Path) -> Result<SourceFile, ScanError> {
    let absolute = if path.is_absolute() {
        path.to_owned()
    } else {
        root.join(path)
    };
    let relative = absolute
        .strip_prefix(root)
        .map_or_else(|_| absolute.clone(), Utf8Path::to_owned);

    let content = std::fs::read_to_string(&absolute).map_err(|e| ScanError::read(&absolute, e))?;
    let metadata = std::fs::metadata(&absolute).map_err(|e| ScanError::read(&absolute, e))?;

    debug!(path = %relative, bytes = metadata.len(), "Read source file");
    Ok(SourceFile::new(absolute, relative, content).with_last_modified(modified_millis(&metadata)))
}

/// Returns the last-modified time in Unix milliseconds, or 0 when the
/// platform doesn't report one.
fn modified_millis(metadata: &std::fs::Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

#[async_trait]
impl FileReader for FsFileReader {
    async fn read_file(&self, path: &Utf8Path) -> anyhow::Result<SourceFile> {
        let root = self.root.clone();
        let path = path.to_owned();
        let file = tokio::task::spawn_blocking(move || read_source(&root, &path))
            .await
            .map_err(ScanError::from)??;
        Ok(file)
    }

    async fn read_files(&self, paths: &[&Utf8Path]) -> anyhow::Result<Vec<SourceFile>> {
        let reader = self.clone();
        let paths: Vec<Utf8PathBuf> = paths.iter().map(|p| (*p).to_owned()).collect();
        let files = tokio::task::spawn_blocking(move || reader.read_batch(&paths))
            .await
            .map_err(ScanError::from)??;
        Ok(files)
    }

    async fn find_files(&self, root: &Utf8Path) -> anyhow::Result<Vec<Utf8PathBuf>> {
        let walker = SourceWalker::with_shared_filter(root, Arc::clone(&self.filter))?;
        let paths = tokio::task::spawn_blocking(move || walker.collect_paths())
            .await
            .map_err(ScanError::from)??;
        Ok(paths)
    }
}
