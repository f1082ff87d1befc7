//! A read-only strategy that inventories the files a run would touch.
//!
//! Analysis reads every in-scope file into the plan, validation rejects an
//! empty plan, and transformation reports each file as processed without
//! changing anything. Running it shows what a real migration would see.

use async_trait::async_trait;
use tc_core::{
    Complexity, ConversionPlan, ConversionResult, ConversionWarning, ErrorKind,
    FileConversionPlan, Phase, ProcessedFile, ProgressReporter, SourceFile, ValidationError,
    ValidationErrorKind, ValidationResult,
};
use tc_pipeline::{Analyzer, RunContext, Transformer, Validator};
use tc_scanner::FsFileReader;
use tracing::debug;

/// Lines above which a file is rated medium complexity.
const MEDIUM_LINES: usize = 100;

/// Lines above which a file is rated high complexity.
const HIGH_LINES: usize = 500;

/// Progress at which the pipeline hands over to the transformer.
const TRANSFORM_START: u8 = 30;

/// Progress the pipeline reports once transformation returns.
const TRANSFORM_END: u8 = 90;

/// Inventory strategy over the run's source tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inventory;

fn complexity(file: &SourceFile) -> Complexity {
    match file.line_count() {
        n if n > HIGH_LINES => Complexity::High,
        n if n > MEDIUM_LINES => Complexity::Medium,
        _ => Complexity::Low,
    }
}

#[async_trait]
impl Analyzer for Inventory {
    async fn analyze(&self, ctx: &mut RunContext<'_>) -> anyhow::Result<ConversionPlan> {
        let config = ctx.config();
        let reader = FsFileReader::from_config(config)?;
        let paths = tokio::task::spawn_blocking({
            let reader = reader.clone();
            move || reader.discover()
        })
        .await??;
        let (files, skipped) =
            tokio::task::spawn_blocking(move || reader.read_lenient(&paths)).await?;

        for err in skipped {
            let mut warning =
                ConversionWarning::new(ErrorKind::FileSystem.code("READ"), err.to_string());
            warning.file = err.path().cloned();
            ctx.add_warning(warning);
        }

        let output_root = config.output_root();
        let files: Vec<FileConversionPlan> = files
            .into_iter()
            .map(|source| FileConversionPlan {
                target_path: output_root.join(&source.relative_path),
                complexity: complexity(&source),
                transformations: Vec::new(),
                source,
            })
            .collect();
        let bytes: u64 = files.iter().map(|f| f.source.size).sum();
        debug!(files = files.len(), bytes, "Inventory planned");

        Ok(ConversionPlan {
            files,
            ..ConversionPlan::default()
        })
    }
}

#[async_trait]
impl Validator for Inventory {
    async fn validate(
        &self,
        plan: &ConversionPlan,
        ctx: &mut RunContext<'_>,
    ) -> anyhow::Result<ValidationResult> {
        if plan.files.is_empty() {
            let message = format!(
                "no files under {} match the include patterns",
                ctx.config().source
            );
            return Ok(ValidationResult::failed(vec![ValidationError::new(
                ValidationErrorKind::Config,
                message,
            )]));
        }
        Ok(ValidationResult::passed())
    }
}

#[async_trait]
impl Transformer for Inventory {
    async fn transform(
        &self,
        plan: &ConversionPlan,
        ctx: &mut RunContext<'_>,
    ) -> anyhow::Result<ConversionResult> {
        let mut reporter = ctx
            .reporter(Phase::Transformation, TRANSFORM_START, TRANSFORM_END)
            .with_message("Inventorying");
        reporter.start(plan.files.len());

        let mut processed = Vec::with_capacity(plan.files.len());
        for (index, file) in plan.files.iter().enumerate() {
            reporter.update_file(index, file.source.relative_path.clone());
            processed.push(ProcessedFile {
                source: file.source.clone(),
                target: file.source.clone(),
                changes: Vec::new(),
                modified: false,
                backup_path: None,
            });
        }
        reporter.complete();

        let mut result = ConversionResult::succeeded(processed, Vec::new());
        result.warnings = ctx.diagnostics().warnings().to_vec();
        result.stats.total_warnings = result.warnings.len() as u64;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use std::sync::{Arc, Mutex};
    use tc_core::{ConversionOptions, ProgressEvent};
    use tc_pipeline::{Pipeline, PipelineState};

    fn project(files: &[(&str, &str)]) -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        for (path, content) in files {
            let path = root.join(path);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
        (dir, root)
    }

    #[tokio::test]
    async fn test_inventory_run() {
        let (_dir, root) = project(&[
            ("test/login.spec.js", "describe('login', () => {});\n"),
            ("node_modules/chai/index.js", "module.exports = {};\n"),
        ]);
        let options = ConversionOptions::new(&root).include(["**/*.js"]);
        let mut pipeline = Pipeline::new(Inventory, options).unwrap();

        let result = pipeline.convert().await;

        assert!(result.success, "{:?}", result.errors);
        assert_eq!(result.processed_files.len(), 1);
        assert_eq!(result.modified_count(), 0);
        assert_eq!(pipeline.state(), PipelineState::Complete);
    }

    #[tokio::test]
    async fn test_inventory_reports_each_file() {
        let (_dir, root) = project(&[
            ("src/a.js", "a();\n"),
            ("src/b.js", "b();\n"),
        ]);
        let options = ConversionOptions::new(&root).include(["src/*.js"]);
        let mut pipeline = Pipeline::new(Inventory, options).unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        pipeline.on_progress(move |event: &ProgressEvent| {
            if event.message == "Inventorying" {
                let file = event.current_file.as_ref().map(ToString::to_string);
                sink.lock().unwrap().push((event.progress, file));
            }
        });

        let result = pipeline.convert().await;

        assert!(result.success, "{:?}", result.errors);
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                (30, Some("src/a.js".to_owned())),
                (60, Some("src/b.js".to_owned())),
                (90, None),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_tree_fails_validation() {
        let (_dir, root) = project(&[("README.md", "# app\n")]);
        let options = ConversionOptions::new(&root).include(["**/*.js"]);
        let mut pipeline = Pipeline::new(Inventory, options).unwrap();

        let result = pipeline.convert().await;

        assert!(!result.success);
        assert_eq!(result.errors[0].code, "VALIDATION_CONFIG");
        assert_eq!(pipeline.state(), PipelineState::Aborted);
    }

    #[test]
    fn test_complexity_thresholds() {
        let file = |lines: usize| {
            SourceFile::new(
                Utf8PathBuf::from("/a.js"),
                Utf8PathBuf::from("a.js"),
                "x\n".repeat(lines),
            )
        };
        assert_eq!(complexity(&file(10)), Complexity::Low);
        assert_eq!(complexity(&file(101)), Complexity::Medium);
        assert_eq!(complexity(&file(501)), Complexity::High);
    }
}
