//! Include/exclude filtering of candidate paths.
//!
//! A [`PatternFilter`] holds the include and exclude glob sets from a
//! [`RunConfig`] and answers, per path, whether the path is in scope.
//! Evaluation order is fixed:
//!
//! 1. If any exclude pattern matches, the path is rejected. Exclusion wins
//!    even when an include pattern also matches.
//! 2. Otherwise, if any include pattern matches, the path is accepted.
//! 3. Otherwise the path is rejected.
//!
//! Matching goes through the [`PatternMatcher`] trait so the glob engine
//! can be swapped. The default [`GlobMatcher`] uses the `glob` crate with
//! shell-style semantics:
//!
//! - `*` stays inside one path segment and `**` spans segments
//! - a `**` sharing its segment with other characters (`src/**.js`) acts
//!   as `*`
//! - wildcards never match a leading `.`, so dotfiles and dot directories
//!   are only in scope when a pattern names the dot literally
//!
//! # Examples
//!
//! ```
//! use tc_pipeline::{FileFilter, PatternFilter};
//! use camino::Utf8Path;
//!
//! let filter = PatternFilter::new(["src/**/*.js"], ["**/*.test.js"]);
//!
//! assert!(filter.should_process(Utf8Path::new("src/index.js")));
//! assert!(!filter.should_process(Utf8Path::new("src/index.test.js")));
//! assert!(!filter.should_process(Utf8Path::new("lib/utils.js")));
//! ```

use std::borrow::Cow;

use camino::Utf8Path;
use glob::{MatchOptions, Pattern};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tc_core::RunConfig;
use tracing::warn;

/// Options every pattern is matched with.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Rewrites any `**` that is not a whole segment into `*`.
fn collapse_embedded_globstars(pattern: &str) -> Cow<'_, str> {
    let embedded = |segment: &str| segment != "**" && segment.contains("**");
    if !pattern.split('/').any(embedded) {
        return Cow::Borrowed(pattern);
    }

    let segments: Vec<String> = pattern
        .split('/')
        .map(|segment| {
            if !embedded(segment) {
                return segment.to_owned();
            }
            let mut collapsed = String::with_capacity(segment.len());
            for c in segment.chars() {
                if c == '*' && collapsed.ends_with('*') {
                    continue;
                }
                collapsed.push(c);
            }
            collapsed
        })
        .collect();
    Cow::Owned(segments.join("/"))
}

/// Decides whether a candidate path is in scope for a run.
///
/// Filters are shared with strategies through the run context, so they
/// must be [`Send`] and [`Sync`].
///
/// # Examples
///
/// ```
/// use tc_pipeline::FileFilter;
/// use camino::Utf8Path;
///
/// struct OnlyJs;
///
/// impl FileFilter for OnlyJs {
///     fn should_process(&self, path: &Utf8Path) -> bool {
///         path.extension() == Some("js")
///     }
/// }
///
/// assert!(OnlyJs.should_process(Utf8Path::new("a/b.js")));
/// ```
pub trait FileFilter: Send + Sync {
    /// Returns `true` if `path` should be processed.
    fn should_process(&self, path: &Utf8Path) -> bool;
}

impl<F: FileFilter + ?Sized> FileFilter for Box<F> {
    #[inline]
    fn should_process(&self, path: &Utf8Path) -> bool {
        (**self).should_process(path)
    }
}

impl<F: FileFilter + ?Sized> FileFilter for std::sync::Arc<F> {
    #[inline]
    fn should_process(&self, path: &Utf8Path) -> bool {
        (**self).should_process(path)
    }
}

/// Tests a path against a single glob pattern.
///
/// Any closure of the same shape is a matcher, which keeps the filter
/// independent of a particular glob engine:
///
/// ```
/// use tc_pipeline::{FileFilter, PatternFilter};
/// use camino::Utf8Path;
///
/// let prefix = |path: &str, pattern: &str| path.starts_with(pattern);
/// let filter = PatternFilter::with_matcher(["src/"], ["src/vendor/"], prefix);
///
/// assert!(filter.should_process(Utf8Path::new("src/app.js")));
/// assert!(!filter.should_process(Utf8Path::new("src/vendor/lib.js")));
/// ```
pub trait PatternMatcher: Send + Sync {
    /// Returns `true` if `path` matches `pattern`.
    fn matches(&self, path: &str, pattern: &str) -> bool;
}

impl<F> PatternMatcher for F
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    #[inline]
    fn matches(&self, path: &str, pattern: &str) -> bool {
        self(path, pattern)
    }
}

/// Glob matcher backed by the `glob` crate.
///
/// Compiled patterns are cached, since a run's pattern sets are fixed for
/// its lifetime. A pattern that fails to compile is logged once and never
/// matches.
#[derive(Debug, Default)]
pub struct GlobMatcher {
    cache: RwLock<FxHashMap<String, Option<Pattern>>>,
}

impl GlobMatcher {
    /// Creates a matcher with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of distinct patterns seen so far.
    #[must_use]
    pub fn cached_patterns(&self) -> usize {
        self.cache.read().len()
    }

    fn compile(pattern: &str) -> Option<Pattern> {
        match Pattern::new(&collapse_embedded_globstars(pattern)) {
            Ok(compiled) => Some(compiled),
            Err(err) => {
                warn!(pattern, error = %err, "Invalid glob pattern will never match");
                None
            }
        }
    }
}

impl PatternMatcher for GlobMatcher {
    fn matches(&self, path: &str, pattern: &str) -> bool {
        if let Some(compiled) = self.cache.read().get(pattern) {
            return compiled
                .as_ref()
                .is_some_and(|p| p.matches_with(path, MATCH_OPTIONS));
        }

        let compiled = Self::compile(pattern);
        let matched = compiled
            .as_ref()
            .is_some_and(|p| p.matches_with(path, MATCH_OPTIONS));
        self.cache.write().insert(pattern.to_owned(), compiled);
        matched
    }
}

/// Include/exclude filter over glob patterns.
#[derive(Debug)]
pub struct PatternFilter<M = GlobMatcher> {
    include: Vec<String>,
    exclude: Vec<String>,
    matcher: M,
}

impl PatternFilter<GlobMatcher> {
    /// Creates a filter using the default glob matcher.
    #[must_use]
    pub fn new<I, E, S, T>(include: I, exclude: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self::with_matcher(include, exclude, GlobMatcher::new())
    }

    /// Creates a filter from a run configuration's pattern sets.
    #[must_use]
    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.include.iter().cloned(), config.exclude.iter().cloned())
    }
}

impl<M: PatternMatcher> PatternFilter<M> {
    /// Creates a filter with a custom matcher.
    #[must_use]
    pub fn with_matcher<I, E, S, T>(include: I, exclude: E, matcher: M) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            include: include.into_iter().map(Into::into).collect(),
            exclude: exclude.into_iter().map(Into::into).collect(),
            matcher,
        }
    }

    /// Returns the include patterns.
    #[inline]
    #[must_use]
    pub fn include(&self) -> &[String] {
        &self.include
    }

    /// Returns the exclude patterns.
    #[inline]
    #[must_use]
    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Returns the first exclude pattern matching `path`, if any.
    #[must_use]
    pub fn excluded_by(&self, path: &str) -> Option<&str> {
        self.exclude
            .iter()
            .find(|pattern| self.matcher.matches(path, pattern))
            .map(String::as_str)
    }
}

impl<M: PatternMatcher> FileFilter for PatternFilter<M> {
    fn should_process(&self, path: &Utf8Path) -> bool {
        let path = path.as_str();
        if self.excluded_by(path).is_some() {
            return false;
        }
        self.include
            .iter()
            .any(|pattern| self.matcher.matches(path, pattern))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tc_core::ConversionOptions;

    fn default_filter() -> PatternFilter {
        let config = ConversionOptions::new("/s").normalize().unwrap();
        PatternFilter::from_config(&config)
    }

    #[test]
    fn test_default_config_excludes_node_modules() {
        let filter = default_filter();
        assert!(!filter.should_process(Utf8Path::new("node_modules/pkg/index.js")));
        assert!(!filter.should_process(Utf8Path::new("web/node_modules/pkg/index.js")));
        assert!(!filter.should_process(Utf8Path::new(".git/HEAD")));
    }

    #[test]
    fn test_default_config_includes_sources() {
        let filter = default_filter();
        assert!(filter.should_process(Utf8Path::new("src/index.js")));
        assert!(filter.should_process(Utf8Path::new("README.md")));
    }

    #[test]
    fn test_default_config_skips_dotfiles() {
        let filter = default_filter();
        assert!(!filter.should_process(Utf8Path::new(".eslintrc.js")));
        assert!(!filter.should_process(Utf8Path::new("src/.hidden/a.js")));
        assert!(!filter.should_process(Utf8Path::new("src/.env")));
    }

    #[test]
    fn test_literal_dot_pattern_matches_dotfiles() {
        let filter = PatternFilter::new([".eslintrc.*", "src/.hidden/*.js"], Vec::<String>::new());
        assert!(filter.should_process(Utf8Path::new(".eslintrc.js")));
        assert!(filter.should_process(Utf8Path::new("src/.hidden/a.js")));
    }

    #[test]
    fn test_embedded_globstar_acts_as_star() {
        let filter = PatternFilter::new(["src/**.js"], Vec::<String>::new());
        assert!(filter.should_process(Utf8Path::new("src/a.js")));
        assert!(!filter.should_process(Utf8Path::new("src/nested/a.js")));
    }

    #[test]
    fn test_collapse_embedded_globstars() {
        assert!(matches!(
            collapse_embedded_globstars("**/src/**/*.js"),
            Cow::Borrowed("**/src/**/*.js")
        ));
        assert_eq!(collapse_embedded_globstars("src/**.js"), "src/*.js");
        assert_eq!(collapse_embedded_globstars("a***b/**/c**"), "a*b/**/c*");
    }

    #[test]
    fn test_include_and_exclude_sets() {
        let filter = PatternFilter::new(["src/**/*.js"], ["**/*.test.js"]);
        assert!(filter.should_process(Utf8Path::new("src/index.js")));
        assert!(filter.should_process(Utf8Path::new("src/deep/nested/util.js")));
        assert!(!filter.should_process(Utf8Path::new("src/index.test.js")));
        assert!(!filter.should_process(Utf8Path::new("lib/utils.js")));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let filter = PatternFilter::new(["src/index.js"], ["src/index.js"]);
        assert!(!filter.should_process(Utf8Path::new("src/index.js")));
    }

    #[test]
    fn test_empty_include_denies_everything() {
        let filter = PatternFilter::new(Vec::<String>::new(), Vec::<String>::new());
        assert!(!filter.should_process(Utf8Path::new("src/index.js")));
    }

    #[test]
    fn test_single_star_stays_in_segment() {
        let filter = PatternFilter::new(["src/*.js"], Vec::<String>::new());
        assert!(filter.should_process(Utf8Path::new("src/index.js")));
        assert!(!filter.should_process(Utf8Path::new("src/nested/index.js")));
    }

    #[test]
    fn test_invalid_pattern_never_matches() {
        let filter = PatternFilter::new(["src/[.js", "**/*.ts"], ["[invalid"]);
        assert!(!filter.should_process(Utf8Path::new("src/[.js")));
        assert!(filter.should_process(Utf8Path::new("src/app.ts")));
    }

    #[test]
    fn test_excluded_by_reports_pattern() {
        let filter = default_filter();
        assert_eq!(
            filter.excluded_by("node_modules/pkg/index.js"),
            Some("**/node_modules/**")
        );
        assert_eq!(filter.excluded_by("src/index.js"), None);
    }

    #[test]
    fn test_glob_matcher_caches_patterns() {
        let matcher = GlobMatcher::new();
        assert!(matcher.matches("a/b.js", "**/*.js"));
        assert!(matcher.matches("c.js", "**/*.js"));
        assert!(!matcher.matches("c.ts", "**/*.js"));
        assert_eq!(matcher.cached_patterns(), 1);
    }

    #[test]
    fn test_custom_matcher_is_consulted() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let matcher = move |path: &str, pattern: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            path == pattern
        };
        let filter = PatternFilter::with_matcher(["a.js", "b.js"], ["x.js"], matcher);

        assert!(filter.should_process(Utf8Path::new("b.js")));
        // one exclude check, then both includes
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_boxed_filter() {
        let filter: Box<dyn FileFilter> = Box::new(default_filter());
        assert!(filter.should_process(Utf8Path::new("src/index.js")));
    }
}
