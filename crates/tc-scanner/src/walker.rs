//! Discovery of in-scope source files.
//!
//! [`SourceWalker`] walks a source root with the `ignore` crate and keeps
//! the files a [`FileFilter`] accepts. Filters see paths relative to the
//! root, so `src/**/*.js` means the same thing wherever the project lives.
//!
//! # Examples
//!
//! ```no_run
//! use tc_pipeline::PatternFilter;
//! use tc_scanner::SourceWalker;
//! use camino::Utf8Path;
//!
//! let filter = PatternFilter::new(["**/*.js"], ["**/node_modules/**"]);
//! let walker = SourceWalker::new(Utf8Path::new("./project"), filter)?;
//!
//! for path in walker.collect_paths()? {
//!     println!("{path}");
//! }
//! # Ok::<(), tc_scanner::ScanError>(())
//! ```

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;
use tc_pipeline::FileFilter;
use tracing::debug;

use crate::error::ScanError;

/// Walks a source tree and keeps the files a filter accepts.
#[derive(Clone)]
pub struct SourceWalker {
    /// The root directory to walk.
    root: Utf8PathBuf,
    /// Decides which relative paths are kept.
    filter: Arc<dyn FileFilter>,
    /// Whether to follow symbolic links.
    follow_links: bool,
    /// Whether `.gitignore`, `.ignore`, and hidden-file rules apply.
    standard_filters: bool,
}

impl SourceWalker {
    /// Creates a walker for `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if `root` doesn't exist or isn't a
    /// directory.
    pub fn new(root: &Utf8Path, filter: impl FileFilter + 'static) -> Result<Self, ScanError> {
        Self::with_shared_filter(root, Arc::new(filter))
    }

    /// Creates a walker that shares an existing filter.
    pub fn with_shared_filter(
        root: &Utf8Path,
        filter: Arc<dyn FileFilter>,
    ) -> Result<Self, ScanError> {
        if !root.exists() {
            return Err(ScanError::config(format!("root path does not exist: {root}")));
        }
        if !root.is_dir() {
            return Err(ScanError::config(format!(
                "root path is not a directory: {root}"
            )));
        }

        Ok(Self {
            root: root.to_owned(),
            filter,
            follow_links: false,
            standard_filters: true,
        })
    }

    /// Configures whether to follow symbolic links. Off by default.
    #[must_use]
    pub const fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Configures whether ignore files and hidden-file rules apply. On by
    /// default; turn off to let the include/exclude patterns alone decide.
    #[must_use]
    pub const fn with_standard_filters(mut self, enabled: bool) -> Self {
        self.standard_filters = enabled;
        self
    }

    /// Returns the root directory being walked.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Collects the absolute paths of every accepted file, in walk order.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Walk`] if traversal fails and
    /// [`ScanError::NonUtf8Path`] for paths that aren't UTF-8.
    pub fn collect_paths(&self) -> Result<Vec<Utf8PathBuf>, ScanError> {
        let mut paths = Vec::new();
        let mut excluded = 0_usize;

        for result in self.build_walker() {
            let entry = result?;
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            let utf8_path =
                Utf8Path::from_path(path).ok_or_else(|| ScanError::NonUtf8Path(path.to_owned()))?;

            if self.filter.should_process(self.relative(utf8_path)) {
                paths.push(utf8_path.to_owned());
            } else {
                excluded += 1;
                debug!(path = %utf8_path, "Excluded by filter");
            }
        }

        debug!(root = %self.root, accepted = paths.len(), excluded, "Walk complete");
        Ok(paths)
    }

    /// Returns `path` relative to the root, or `path` itself if it lies
    /// outside the root.
    #[must_use]
    pub fn relative<'p>(&self, path: &'p Utf8Path) -> &'p Utf8Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    fn build_walker(&self) -> ignore::Walk {
        WalkBuilder::new(&self.root)
            .standard_filters(self.standard_filters)
            .follow_links(self.follow_links)
            // File reads are parallelized separately
            .threads(1)
            .require_git(false)
            .sort_by_file_path(Ord::cmp)
            .build()
    }
}

impl std::fmt::Debug for SourceWalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceWalker")
            .field("root", &self.root)
            .field("follow_links", &self.follow_links)
            .field("standard_filters", &self.standard_filters)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tc_pipeline::PatternFilter;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for file in [
            "src/index.js",
            "src/index.test.js",
            "src/nested/util.js",
            "lib/helpers.js",
            "node_modules/chai/index.js",
            "README.md",
        ] {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "// content\n").unwrap();
        }
        dir
    }

    fn relative_paths(walker: &SourceWalker) -> Vec<String> {
        walker
            .collect_paths()
            .unwrap()
            .iter()
            .map(|p| walker.relative(p).as_str().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_collects_filtered_paths() {
        let dir = project();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        let walker =
            SourceWalker::new(root, PatternFilter::new(["src/**/*.js"], ["**/*.test.js"])).unwrap();

        assert_eq!(
            relative_paths(&walker),
            vec!["src/index.js", "src/nested/util.js"]
        );
    }

    #[test]
    fn test_default_patterns_skip_node_modules() {
        let dir = project();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        let filter = PatternFilter::new(["**/*"], ["**/node_modules/**", "**/.git/**"]);
        let walker = SourceWalker::new(root, filter).unwrap();

        let paths = relative_paths(&walker);
        assert_eq!(paths.len(), 5);
        assert!(!paths.iter().any(|p| p.contains("node_modules")));
    }

    #[test]
    fn test_gitignore_respected() {
        let dir = project();
        fs::write(dir.path().join(".gitignore"), "lib/\n").unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        let walker = SourceWalker::new(root, PatternFilter::new(["**/*.js"], ["**/node_modules/**"]))
            .unwrap();

        let paths = relative_paths(&walker);
        assert!(!paths.contains(&"lib/helpers.js".to_owned()));

        let unfiltered = walker.with_standard_filters(false);
        assert!(relative_paths(&unfiltered).contains(&"lib/helpers.js".to_owned()));
    }

    #[test]
    fn test_missing_root_rejected() {
        let err = SourceWalker::new(
            Utf8Path::new("/definitely/not/a/real/dir"),
            PatternFilter::new(["**/*"], Vec::<String>::new()),
        )
        .unwrap_err();
        assert!(matches!(err, ScanError::Config(_)));
    }

    #[test]
    fn test_file_root_rejected() {
        let dir = project();
        let file = Utf8Path::from_path(dir.path()).unwrap().join("README.md");
        let err = SourceWalker::new(&file, PatternFilter::new(["**/*"], Vec::<String>::new()))
            .unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }
}
