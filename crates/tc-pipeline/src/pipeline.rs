//! The analyze, validate, transform state machine.
//!
//! ```text
//! Idle -> Analyzing -> Validating -> Transforming -> FinalValidating -> Complete
//!                                \-> Aborted
//! any phase error ---------------------------------------------------> Failed
//! ```
//!
//! A run issues one phase call at a time. Progress checkpoints at 0, 30,
//! and 90 percent mark the start of analysis, transformation, and final
//! validation; finer progress is up to the transformer.
//!
//! A plan that fails validation aborts the run with its findings re-coded
//! as `VALIDATION_*` diagnostics, unless the run is a dry run. Any error
//! escaping a phase ends the run with a single `CONVERSION_FAILED` error.
//! Either way [`Pipeline::convert`] returns a [`ConversionResult`]; it has
//! no error path of its own.

use std::backtrace::BacktraceStatus;
use std::time::{Duration, Instant};

use tc_core::{
    ConfigError, ConversionError, ConversionOptions, ConversionResult, ConversionWarning,
    ErrorKind, Phase, ProgressEvent, RunConfig, ValidationResult,
};
use tracing::{debug, error, info, warn};

use crate::context::RunContext;
use crate::diagnostics::Diagnostics;
use crate::filter::{FileFilter, PatternFilter};
use crate::progress::{ListenerId, ProgressEmitter};
use crate::strategy::MigrationStrategy;

/// Pause before analysis so every run has a measurable duration.
const MIN_RUN_DELAY: Duration = Duration::from_millis(1);

/// Where a run is, or where it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PipelineState {
    /// No run has started.
    #[default]
    Idle,
    /// Building the plan.
    Analyzing,
    /// Checking the plan.
    Validating,
    /// Executing the plan.
    Transforming,
    /// Stopped because the plan was invalid.
    Aborted,
    /// Reporting final validation of the results.
    FinalValidating,
    /// Finished normally.
    Complete,
    /// Stopped by an error escaping a phase.
    Failed,
}

impl PipelineState {
    /// Returns `true` for states a run ends in.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Aborted | Self::Complete | Self::Failed)
    }
}

/// Runs a [`MigrationStrategy`] under one configuration.
///
/// # Examples
///
/// ```no_run
/// # use tc_core::ConversionOptions;
/// # use tc_pipeline::{MigrationStrategy, Pipeline};
/// # async fn run<S: MigrationStrategy>(strategy: S) -> anyhow::Result<()> {
/// let mut pipeline = Pipeline::new(strategy, ConversionOptions::new("./tests"))?;
/// pipeline.on_progress(|event| println!("{:>3}% {}", event.progress, event.message));
///
/// let result = pipeline.convert().await;
/// println!("success: {}, changes: {}", result.success, result.change_count());
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<S> {
    strategy: S,
    config: RunConfig,
    filter: Box<dyn FileFilter>,
    progress: ProgressEmitter,
    states: Vec<PipelineState>,
}

impl<S: MigrationStrategy> Pipeline<S> {
    /// Normalizes `options` and builds a pipeline filtering by its patterns.
    pub fn new(strategy: S, options: ConversionOptions) -> Result<Self, ConfigError> {
        Ok(Self::with_config(strategy, options.normalize()?))
    }

    /// Builds a pipeline from an already normalized configuration.
    #[must_use]
    pub fn with_config(strategy: S, config: RunConfig) -> Self {
        let filter = PatternFilter::from_config(&config);
        Self {
            strategy,
            config,
            filter: Box::new(filter),
            progress: ProgressEmitter::new(),
            states: Vec::new(),
        }
    }

    /// Replaces the include/exclude filter.
    #[must_use]
    pub fn with_filter(mut self, filter: impl FileFilter + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    /// Registers a progress listener.
    pub fn on_progress<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&ProgressEvent) + Send + Sync + 'static,
    {
        self.progress.on_progress(listener)
    }

    /// Removes a progress listener.
    pub fn off_progress(&mut self, id: ListenerId) -> bool {
        self.progress.off_progress(id)
    }

    /// Returns the normalized configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Returns the strategy.
    #[inline]
    #[must_use]
    pub const fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Returns the state the last run reached, or `Idle` before any run.
    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.states.last().copied().unwrap_or_default()
    }

    /// Returns every state the last run passed through, in order.
    #[inline]
    #[must_use]
    pub fn transitions(&self) -> &[PipelineState] {
        &self.states
    }

    /// Runs the migration to completion.
    ///
    /// Each call starts with empty diagnostics. The returned duration is
    /// always greater than zero.
    pub async fn convert(&mut self) -> ConversionResult {
        let start = Instant::now();
        self.states.clear();
        info!(
            source = %self.config.source,
            dry_run = self.config.dry_run,
            "Starting conversion"
        );

        let mut ctx = RunContext::new(&self.config, &*self.filter, &self.progress);
        match run_phases(&self.strategy, &mut ctx, &mut self.states, start).await {
            Ok(result) => {
                info!(
                    success = result.success,
                    processed = result.processed_files.len(),
                    skipped = result.skipped_files.len(),
                    duration_ms = result.duration.as_millis(),
                    "Conversion finished"
                );
                result
            }
            Err(err) => {
                enter(&mut self.states, PipelineState::Failed);
                error!(error = %format!("{err:#}"), "Conversion failed");
                failure_result(&err, ctx.diagnostics(), start.elapsed())
            }
        }
    }
}

impl<S> std::fmt::Debug for Pipeline<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("progress", &self.progress)
            .field("states", &self.states)
            .finish_non_exhaustive()
    }
}

fn enter(states: &mut Vec<PipelineState>, state: PipelineState) {
    debug!(?state, "Pipeline state");
    states.push(state);
}

async fn run_phases<S: MigrationStrategy + ?Sized>(
    strategy: &S,
    ctx: &mut RunContext<'_>,
    states: &mut Vec<PipelineState>,
    start: Instant,
) -> anyhow::Result<ConversionResult> {
    enter(states, PipelineState::Analyzing);
    ctx.emit_progress(&ProgressEvent::new(
        Phase::Analysis,
        0,
        "Starting conversion...",
    ));
    tokio::time::sleep(MIN_RUN_DELAY).await;

    let plan = strategy.analyze(ctx).await?;
    info!(
        files = plan.file_count(),
        steps = plan.step_count(),
        issues = plan.potential_issues.len(),
        "Analysis complete"
    );

    enter(states, PipelineState::Validating);
    let validation = strategy.validate(&plan, ctx).await?;
    if !validation.valid {
        if !ctx.config().dry_run {
            enter(states, PipelineState::Aborted);
            warn!(
                errors = validation.errors.len(),
                warnings = validation.warnings.len(),
                "Plan failed validation, aborting"
            );
            return Ok(validation_failure(validation, ctx.diagnostics(), start.elapsed()));
        }
        warn!(
            errors = validation.errors.len(),
            "Plan failed validation, continuing because this is a dry run"
        );
    }

    enter(states, PipelineState::Transforming);
    ctx.emit_progress(&ProgressEvent::new(
        Phase::Transformation,
        30,
        "Transforming files...",
    ));
    let result = strategy.transform(&plan, ctx).await?;

    enter(states, PipelineState::FinalValidating);
    ctx.emit_progress(&ProgressEvent::new(
        Phase::Validation,
        90,
        "Validating results...",
    ));

    enter(states, PipelineState::Complete);
    Ok(ConversionResult {
        duration: start.elapsed(),
        ..result
    })
}

/// Builds the result of a run stopped by an invalid plan.
fn validation_failure(
    validation: ValidationResult,
    diagnostics: &Diagnostics,
    duration: Duration,
) -> ConversionResult {
    let errors = validation
        .errors
        .into_iter()
        .map(|err| {
            let mut error =
                ConversionError::new(ErrorKind::Validation, err.kind.code(), err.message);
            error.file = err.file;
            error.line = err.location.map(|loc| loc.start_line);
            error.column = err.location.map(|loc| loc.start_column);
            error
        })
        .collect();

    let warnings = diagnostics
        .warnings()
        .iter()
        .cloned()
        .chain(validation.warnings.into_iter().map(|warn| ConversionWarning {
            code: ErrorKind::Validation.code(warn.kind.code()),
            message: warn.message,
            file: warn.file,
            line: warn.location.map(|loc| loc.start_line),
            suggestion: warn.suggestion,
        }))
        .collect();

    ConversionResult::failure(errors, warnings, diagnostics.empty_stats(), duration)
}

/// Builds the result of a run stopped by a phase error.
///
/// The message is the raised error's own text. Its causes, one
/// `Caused by:` line each, and any captured backtrace go to the stack.
fn failure_result(
    err: &anyhow::Error,
    diagnostics: &Diagnostics,
    duration: Duration,
) -> ConversionResult {
    let mut failure = ConversionError::failed(err.to_string());
    if let Some(raised) = err.downcast_ref::<ConversionError>() {
        failure.file.clone_from(&raised.file);
        failure.line = raised.line;
        failure.column = raised.column;
    }

    let mut detail: Vec<String> = err
        .chain()
        .skip(1)
        .map(|cause| format!("Caused by: {cause}"))
        .collect();
    if err.backtrace().status() == BacktraceStatus::Captured {
        detail.push(err.backtrace().to_string());
    }
    if !detail.is_empty() {
        failure = failure.with_stack(detail.join("\n"));
    }

    ConversionResult::failure(
        vec![failure],
        diagnostics.warnings().to_vec(),
        diagnostics.empty_stats(),
        duration,
    )
}
