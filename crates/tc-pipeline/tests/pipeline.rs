//! End-to-end runs of the pipeline against stub strategies.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::Mutex;
use tc_core::{
    ChangeKind, ConversionError, ConversionOptions, ConversionPlan, ConversionResult,
    ConversionWarning, FileChange, FileConversionPlan, Phase, ProcessedFile, ProgressEvent,
    SourceFile, SourceLocation, ValidationError, ValidationErrorKind, ValidationResult,
    ValidationWarning, ValidationWarningKind,
};
use tc_pipeline::{
    Analyzer, MigrationStrategy, PhaseStrategy, Pipeline, PipelineState, RunContext, Transformer,
    Validator,
};

#[derive(Default)]
struct Stub {
    validation: ValidationResult,
    analyze_error: Option<&'static str>,
    transform_error: Option<&'static str>,
    warn_during_analysis: bool,
    calls: Mutex<Vec<&'static str>>,
}

impl Stub {
    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }
}

fn source_file(relative: &str) -> SourceFile {
    SourceFile::new(
        Utf8PathBuf::from(format!("/project/{relative}")),
        Utf8PathBuf::from(relative),
        "const { expect } = require('chai');\n".to_owned(),
    )
}

#[async_trait]
impl Analyzer for Stub {
    async fn analyze(&self, ctx: &mut RunContext<'_>) -> anyhow::Result<ConversionPlan> {
        self.calls.lock().push("analyze");
        if self.warn_during_analysis {
            ctx.add_warning(ConversionWarning::new("LEGACY_SYNTAX", "callback style test"));
        }
        if let Some(message) = self.analyze_error {
            anyhow::bail!(message);
        }

        let files = ["src/index.js", "node_modules/chai/index.js"]
            .into_iter()
            .filter(|path| ctx.should_process(Utf8Path::new(path)))
            .map(|path| FileConversionPlan {
                source: source_file(path),
                target_path: Utf8PathBuf::from(format!("/out/{path}")),
                transformations: Vec::new(),
                complexity: tc_core::Complexity::Low,
            })
            .collect();
        Ok(ConversionPlan {
            files,
            ..ConversionPlan::default()
        })
    }
}

#[async_trait]
impl Validator for Stub {
    async fn validate(
        &self,
        _plan: &ConversionPlan,
        _ctx: &mut RunContext<'_>,
    ) -> anyhow::Result<ValidationResult> {
        self.calls.lock().push("validate");
        Ok(self.validation.clone())
    }
}

#[async_trait]
impl Transformer for Stub {
    async fn transform(
        &self,
        plan: &ConversionPlan,
        ctx: &mut RunContext<'_>,
    ) -> anyhow::Result<ConversionResult> {
        self.calls.lock().push("transform");
        if let Some(message) = self.transform_error {
            anyhow::bail!(message);
        }

        let processed = plan
            .files
            .iter()
            .map(|file| {
                ctx.emit_progress(
                    &ProgressEvent::new(Phase::Writing, 50, "Converting")
                        .for_file(file.source.relative_path.clone()),
                );
                ProcessedFile {
                    source: file.source.clone(),
                    target: file.source.clone(),
                    changes: vec![FileChange::new(ChangeKind::Modify, "require to import")],
                    modified: true,
                    backup_path: None,
                }
            })
            .collect();
        Ok(ConversionResult::succeeded(processed, Vec::new()))
    }
}

fn invalid_syntax() -> ValidationResult {
    ValidationResult::failed(vec![
        ValidationError::new(ValidationErrorKind::Syntax, "Invalid syntax").in_file("test.js"),
    ])
}

fn pipeline<S: MigrationStrategy>(strategy: S) -> Pipeline<S> {
    Pipeline::new(strategy, ConversionOptions::new("/project")).unwrap()
}

type ProgressLog = Arc<Mutex<Vec<(Phase, u8)>>>;

fn record_progress<S: MigrationStrategy>(pipeline: &mut Pipeline<S>) -> ProgressLog {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    pipeline.on_progress(move |event| sink.lock().push((event.phase, event.progress)));
    events
}

#[tokio::test]
async fn test_successful_run_returns_transform_result() {
    let mut pipeline = pipeline(Stub::default());
    let events = record_progress(&mut pipeline);

    let result = pipeline.convert().await;

    assert!(result.success);
    assert!(result.errors.is_empty());
    // node_modules is excluded by the default patterns
    assert_eq!(result.processed_files.len(), 1);
    assert_eq!(result.stats.processed_files, 1);
    assert_eq!(result.change_count(), 1);
    assert!(result.duration > Duration::ZERO);
    assert_eq!(pipeline.strategy().calls(), vec!["analyze", "validate", "transform"]);
    assert_eq!(
        *events.lock(),
        vec![
            (Phase::Analysis, 0),
            (Phase::Transformation, 30),
            (Phase::Writing, 50),
            (Phase::Validation, 90),
        ]
    );
    assert_eq!(pipeline.state(), PipelineState::Complete);
    assert_eq!(
        pipeline.transitions(),
        &[
            PipelineState::Analyzing,
            PipelineState::Validating,
            PipelineState::Transforming,
            PipelineState::FinalValidating,
            PipelineState::Complete,
        ]
    );
}

#[tokio::test]
async fn test_invalid_plan_short_circuits() {
    let mut pipeline = pipeline(Stub {
        validation: invalid_syntax(),
        ..Stub::default()
    });
    let events = record_progress(&mut pipeline);

    let result = pipeline.convert().await;

    assert!(!result.success);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, "VALIDATION_SYNTAX");
    assert_eq!(result.errors[0].message, "Invalid syntax");
    assert_eq!(
        result.errors[0].file.as_deref(),
        Some(Utf8Path::new("test.js"))
    );
    assert!(result.processed_files.is_empty());
    assert!(result.duration > Duration::ZERO);
    assert_eq!(pipeline.strategy().calls(), vec!["analyze", "validate"]);
    assert_eq!(*events.lock(), vec![(Phase::Analysis, 0)]);
    assert_eq!(pipeline.state(), PipelineState::Aborted);
}

#[tokio::test]
async fn test_invalid_plan_keeps_warnings_in_order() {
    let validation = invalid_syntax().with_warning(
        ValidationWarning::new(ValidationWarningKind::Deprecation, "browser.url is deprecated")
            .in_file("test.js")
            .at(SourceLocation::new(7, 2))
            .with_suggestion("use page.goto"),
    );
    let mut pipeline = pipeline(Stub {
        validation,
        warn_during_analysis: true,
        ..Stub::default()
    });

    let result = pipeline.convert().await;

    let codes: Vec<_> = result.warnings.iter().map(|w| w.code.as_str()).collect();
    assert_eq!(codes, vec!["LEGACY_SYNTAX", "VALIDATION_DEPRECATION"]);
    assert_eq!(result.warnings[1].line, Some(7));
    assert_eq!(result.warnings[1].suggestion.as_deref(), Some("use page.goto"));
    assert_eq!(result.stats.total_warnings, 1);
    assert_eq!(result.stats.total_files, 0);
}

#[tokio::test]
async fn test_dry_run_ignores_invalid_plan() {
    let strategy = Stub {
        validation: invalid_syntax(),
        ..Stub::default()
    };
    let mut pipeline =
        Pipeline::new(strategy, ConversionOptions::new("/project").dry_run(true)).unwrap();

    let result = pipeline.convert().await;

    assert!(result.success);
    assert_eq!(pipeline.strategy().calls(), vec!["analyze", "validate", "transform"]);
    assert_eq!(pipeline.state(), PipelineState::Complete);
}

#[tokio::test]
async fn test_transform_error_becomes_conversion_failed() {
    let mut pipeline = pipeline(Stub {
        transform_error: Some("Transformation failed"),
        warn_during_analysis: true,
        ..Stub::default()
    });
    let events = record_progress(&mut pipeline);

    let result = pipeline.convert().await;

    assert!(!result.success);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, "CONVERSION_FAILED");
    assert_eq!(result.errors[0].message, "Transformation failed");
    assert!(!result.errors[0].recoverable);
    assert!(result.processed_files.is_empty());
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.stats.total_warnings, 1);
    assert!(result.duration > Duration::ZERO);
    assert_eq!(
        *events.lock(),
        vec![(Phase::Analysis, 0), (Phase::Transformation, 30)]
    );
    assert_eq!(pipeline.state(), PipelineState::Failed);
}

#[tokio::test]
async fn test_analyze_error_skips_later_phases() {
    let mut pipeline = pipeline(Stub {
        analyze_error: Some("cannot read source tree"),
        ..Stub::default()
    });

    let result = pipeline.convert().await;

    assert_eq!(result.errors[0].code, "CONVERSION_FAILED");
    assert_eq!(result.errors[0].message, "cannot read source tree");
    assert_eq!(pipeline.strategy().calls(), vec!["analyze"]);
    assert_eq!(
        pipeline.transitions(),
        &[PipelineState::Analyzing, PipelineState::Failed]
    );
}

#[tokio::test]
async fn test_raised_conversion_error_keeps_message() {
    struct Raising;

    #[async_trait]
    impl Analyzer for Raising {
        async fn analyze(&self, _ctx: &mut RunContext<'_>) -> anyhow::Result<ConversionPlan> {
            Err(ConversionError::configuration("MISSING", "no tsconfig.json found")
                .in_file("/project/tsconfig.json")
                .into())
        }
    }

    let strategy = PhaseStrategy::new(Raising, Stub::default(), Stub::default());
    let result = pipeline(strategy).convert().await;

    assert_eq!(result.errors[0].code, "CONVERSION_FAILED");
    assert_eq!(result.errors[0].message, "no tsconfig.json found");
    assert_eq!(
        result.errors[0].file.as_deref(),
        Some(Utf8Path::new("/project/tsconfig.json"))
    );
}

#[tokio::test]
async fn test_each_run_starts_with_fresh_diagnostics() {
    let mut pipeline = pipeline(Stub {
        transform_error: Some("boom"),
        warn_during_analysis: true,
        ..Stub::default()
    });

    let first = pipeline.convert().await;
    let second = pipeline.convert().await;

    assert_eq!(first.warnings.len(), 1);
    assert_eq!(second.warnings.len(), 1);
}

#[tokio::test]
async fn test_removed_listener_not_notified() {
    let mut pipeline = pipeline(Stub::default());
    let kept = record_progress(&mut pipeline);
    let removed = Arc::new(Mutex::new(0_usize));
    let counter = Arc::clone(&removed);
    let id = pipeline.on_progress(move |_| *counter.lock() += 1);
    assert!(pipeline.off_progress(id));

    pipeline.convert().await;

    assert_eq!(*removed.lock(), 0);
    assert_eq!(kept.lock().len(), 4);
}

#[tokio::test]
async fn test_boxed_strategy() {
    let strategy: Box<dyn MigrationStrategy> = Box::new(Stub::default());
    let mut pipeline = pipeline(strategy);

    let result = pipeline.convert().await;
    assert!(result.success);
}

#[tokio::test]
async fn test_custom_filter_replaces_patterns() {
    let filter = tc_pipeline::PatternFilter::new(["**/*.js"], Vec::<String>::new());
    let mut pipeline = pipeline(Stub::default()).with_filter(filter);

    let result = pipeline.convert().await;
    assert_eq!(result.processed_files.len(), 2);
}

#[test]
fn test_zero_concurrency_rejected() {
    let options = ConversionOptions::new("/project").concurrency(0);
    assert!(Pipeline::new(Stub::default(), options).is_err());
}
