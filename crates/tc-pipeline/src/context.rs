//! Per-run state handed to every phase.

use camino::Utf8Path;
use tc_core::{
    ConversionError, ConversionStats, ConversionWarning, Phase, ProgressEvent, RunConfig,
};

use crate::diagnostics::Diagnostics;
use crate::filter::FileFilter;
use crate::progress::{PhaseReporter, ProgressEmitter};

/// What a strategy sees of the pipeline while a phase runs.
///
/// A context is created fresh for every [`Pipeline::convert`] call, so
/// diagnostics never leak from one run into the next. It borrows the
/// pipeline's configuration, filter, and progress listeners and owns the
/// run's [`Diagnostics`].
///
/// [`Pipeline::convert`]: crate::Pipeline::convert
pub struct RunContext<'a> {
    config: &'a RunConfig,
    filter: &'a dyn FileFilter,
    progress: &'a ProgressEmitter,
    diagnostics: Diagnostics,
}

impl<'a> RunContext<'a> {
    /// Creates a context with empty diagnostics.
    #[must_use]
    pub fn new(
        config: &'a RunConfig,
        filter: &'a dyn FileFilter,
        progress: &'a ProgressEmitter,
    ) -> Self {
        Self {
            config,
            filter,
            progress,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Returns the normalized configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &'a RunConfig {
        self.config
    }

    /// Returns `true` if `path`, relative to the source root, is in scope.
    #[inline]
    #[must_use]
    pub fn should_process(&self, path: &Utf8Path) -> bool {
        self.filter.should_process(path)
    }

    /// Returns the run's file filter.
    #[inline]
    #[must_use]
    pub fn filter(&self) -> &'a dyn FileFilter {
        self.filter
    }

    /// Sends `event` to every progress listener.
    ///
    /// Returns the number of listeners that panicked.
    pub fn emit_progress(&self, event: &ProgressEvent) -> usize {
        self.progress.emit(event)
    }

    /// Returns the run's progress listeners.
    #[inline]
    #[must_use]
    pub const fn progress(&self) -> &'a ProgressEmitter {
        self.progress
    }

    /// Creates a counted reporter for `phase` over `low..=high`.
    ///
    /// The reporter borrows the listeners rather than the context, so
    /// diagnostics can still be recorded while it is alive.
    #[must_use]
    pub fn reporter(&self, phase: Phase, low: u8, high: u8) -> PhaseReporter<'a> {
        PhaseReporter::new(self.progress, phase, low, high)
    }

    /// Records an error; see [`Diagnostics::add_error`].
    pub fn add_error(&mut self, error: ConversionError) {
        self.diagnostics.add_error(error);
    }

    /// Records a warning.
    pub fn add_warning(&mut self, warning: ConversionWarning) {
        self.diagnostics.add_warning(warning);
    }

    /// Returns the run's diagnostics.
    #[inline]
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Returns the run's diagnostics mutably.
    #[inline]
    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Shorthand for [`Diagnostics::empty_stats`].
    #[must_use]
    pub fn empty_stats(&self) -> ConversionStats {
        self.diagnostics.empty_stats()
    }

    /// Consumes the context, returning its diagnostics.
    #[must_use]
    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }
}

impl std::fmt::Debug for RunContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("source", &self.config.source)
            .field("progress", self.progress)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::PatternFilter;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tc_core::{ConversionOptions, ProgressReporter};

    #[test]
    fn test_context_delegates() {
        let config = ConversionOptions::new("/project")
            .include(["src/**/*.js"])
            .normalize()
            .unwrap();
        let filter = PatternFilter::from_config(&config);
        let calls = Arc::new(AtomicUsize::new(0));
        let mut progress = ProgressEmitter::new();
        let counter = Arc::clone(&calls);
        progress.on_progress(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut ctx = RunContext::new(&config, &filter, &progress);
        assert!(ctx.should_process(Utf8Path::new("src/a.js")));
        assert!(!ctx.should_process(Utf8Path::new("test/a.js")));

        let failures = ctx.emit_progress(&ProgressEvent::new(Phase::Planning, 10, "planning"));
        assert_eq!(failures, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let mut reporter = ctx.reporter(Phase::Transformation, 30, 90);
        reporter.start(2);
        ctx.add_warning(ConversionWarning::new("W", "while reporting"));
        reporter.update(1, None);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        ctx.add_warning(ConversionWarning::new("W", "warn"));
        ctx.add_error(ConversionError::failed("boom").recoverable(true));
        assert_eq!(ctx.empty_stats().total_warnings, 2);

        let diagnostics = ctx.into_diagnostics();
        assert!(!diagnostics.errors()[0].recoverable);
    }

    #[test]
    fn test_emit_progress_reports_panicking_listeners() {
        let config = ConversionOptions::new("/project").normalize().unwrap();
        let filter = PatternFilter::from_config(&config);
        let mut progress = ProgressEmitter::new();
        progress.on_progress(|_| panic!("listener failure"));
        progress.on_progress(|_| {});

        let ctx = RunContext::new(&config, &filter, &progress);
        let failures = ctx.emit_progress(&ProgressEvent::new(Phase::Analysis, 0, "start"));

        assert_eq!(failures, 1);
        assert_eq!(ctx.progress().len(), 2);
    }
}
