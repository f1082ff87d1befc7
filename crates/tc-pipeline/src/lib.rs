//! Orchestration of test-converter migrations.
//!
//! A [`Pipeline`] drives a [`MigrationStrategy`] through three phases:
//!
//! 1. **Analyze** the source tree into a [`ConversionPlan`](tc_core::ConversionPlan)
//! 2. **Validate** the plan, stopping early if it is invalid (unless dry-running)
//! 3. **Transform** files according to the plan
//!
//! and folds their outputs into one [`ConversionResult`](tc_core::ConversionResult).
//!
//! Supporting pieces:
//!
//! - [`PatternFilter`] decides which paths are in scope from include/exclude globs
//! - [`ProgressEmitter`] fans progress events out to listeners, and
//!   [`PhaseReporter`] places counted per-file progress inside a phase
//! - [`Diagnostics`] collects the errors and warnings of one run
//! - [`RunContext`] hands all of the above to each phase

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod context;
pub mod diagnostics;
pub mod filter;
pub mod pipeline;
pub mod progress;
pub mod strategy;

pub use context::RunContext;
pub use diagnostics::Diagnostics;
pub use filter::{FileFilter, GlobMatcher, PatternFilter, PatternMatcher};
pub use pipeline::{Pipeline, PipelineState};
pub use progress::{ListenerId, PhaseReporter, ProgressEmitter, ProgressListener};
pub use strategy::{Analyzer, MigrationStrategy, PhaseStrategy, Transformer, Validator};
