//! The three migration phases and how they combine into a strategy.
//!
//! Each phase is its own capability so analyzers, validators, and
//! transformers can be developed and reused independently. Anything that
//! implements all three is a [`MigrationStrategy`]; [`PhaseStrategy`]
//! assembles one from three separate parts.
//!
//! Phases report failure through [`anyhow::Result`]. The pipeline turns
//! any error escaping a phase into a `CONVERSION_FAILED` result, so phases
//! may raise a [`ConversionError`](tc_core::ConversionError) or any other
//! error type.

use async_trait::async_trait;
use tc_core::{ConversionPlan, ConversionResult, ValidationResult};

use crate::context::RunContext;

/// Inspects the source tree and produces a plan.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Builds the conversion plan for this run.
    async fn analyze(&self, ctx: &mut RunContext<'_>) -> anyhow::Result<ConversionPlan>;
}

/// Checks a plan before it is executed.
#[async_trait]
pub trait Validator: Send + Sync {
    /// Validates `plan`. An invalid result is not an error: it stops the run
    /// unless the run is a dry run.
    async fn validate(
        &self,
        plan: &ConversionPlan,
        ctx: &mut RunContext<'_>,
    ) -> anyhow::Result<ValidationResult>;
}

/// Executes a plan.
#[async_trait]
pub trait Transformer: Send + Sync {
    /// Applies `plan` and reports what happened. The returned result owns
    /// its stats and file lists; the pipeline only overwrites `duration`.
    async fn transform(
        &self,
        plan: &ConversionPlan,
        ctx: &mut RunContext<'_>,
    ) -> anyhow::Result<ConversionResult>;
}

/// A complete migration: analysis, validation, and transformation.
pub trait MigrationStrategy: Analyzer + Validator + Transformer {}

impl<T: Analyzer + Validator + Transformer + ?Sized> MigrationStrategy for T {}

/// A strategy assembled from three independent phases.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use tc_core::{ConversionPlan, ConversionResult, ValidationResult};
/// use tc_pipeline::{Analyzer, PhaseStrategy, RunContext, Transformer, Validator};
///
/// struct EmptyPlan;
/// #[async_trait]
/// impl Analyzer for EmptyPlan {
///     async fn analyze(&self, _ctx: &mut RunContext<'_>) -> anyhow::Result<ConversionPlan> {
///         Ok(ConversionPlan::default())
///     }
/// }
///
/// struct AlwaysValid;
/// #[async_trait]
/// impl Validator for AlwaysValid {
///     async fn validate(
///         &self,
///         _plan: &ConversionPlan,
///         _ctx: &mut RunContext<'_>,
///     ) -> anyhow::Result<ValidationResult> {
///         Ok(ValidationResult::passed())
///     }
/// }
///
/// struct Noop;
/// #[async_trait]
/// impl Transformer for Noop {
///     async fn transform(
///         &self,
///         _plan: &ConversionPlan,
///         _ctx: &mut RunContext<'_>,
///     ) -> anyhow::Result<ConversionResult> {
///         Ok(ConversionResult::succeeded(Vec::new(), Vec::new()))
///     }
/// }
///
/// let strategy = PhaseStrategy::new(EmptyPlan, AlwaysValid, Noop);
/// # let _ = strategy;
/// ```
#[derive(Debug, Clone)]
pub struct PhaseStrategy<A, V, T> {
    analyzer: A,
    validator: V,
    transformer: T,
}

impl<A, V, T> PhaseStrategy<A, V, T> {
    /// Combines the three phases.
    #[must_use]
    pub const fn new(analyzer: A, validator: V, transformer: T) -> Self {
        Self {
            analyzer,
            validator,
            transformer,
        }
    }

    /// Returns the analyzer.
    #[inline]
    pub const fn analyzer(&self) -> &A {
        &self.analyzer
    }

    /// Returns the validator.
    #[inline]
    pub const fn validator(&self) -> &V {
        &self.validator
    }

    /// Returns the transformer.
    #[inline]
    pub const fn transformer(&self) -> &T {
        &self.transformer
    }
}

#[async_trait]
impl<A: Analyzer, V: Send + Sync, T: Send + Sync> Analyzer for PhaseStrategy<A, V, T> {
    async fn analyze(&self, ctx: &mut RunContext<'_>) -> anyhow::Result<ConversionPlan> {
        self.analyzer.analyze(ctx).await
    }
}

#[async_trait]
impl<A: Send + Sync, V: Validator, T: Send + Sync> Validator for PhaseStrategy<A, V, T> {
    async fn validate(
        &self,
        plan: &ConversionPlan,
        ctx: &mut RunContext<'_>,
    ) -> anyhow::Result<ValidationResult> {
        self.validator.validate(plan, ctx).await
    }
}

#[async_trait]
impl<A: Send + Sync, V: Send + Sync, T: Transformer> Transformer for PhaseStrategy<A, V, T> {
    async fn transform(
        &self,
        plan: &ConversionPlan,
        ctx: &mut RunContext<'_>,
    ) -> anyhow::Result<ConversionResult> {
        self.transformer.transform(plan, ctx).await
    }
}

#[async_trait]
impl<S: Analyzer + ?Sized> Analyzer for Box<S> {
    async fn analyze(&self, ctx: &mut RunContext<'_>) -> anyhow::Result<ConversionPlan> {
        (**self).analyze(ctx).await
    }
}

#[async_trait]
impl<S: Validator + ?Sized> Validator for Box<S> {
    async fn validate(
        &self,
        plan: &ConversionPlan,
        ctx: &mut RunContext<'_>,
    ) -> anyhow::Result<ValidationResult> {
        (**self).validate(plan, ctx).await
    }
}

#[async_trait]
impl<S: Transformer + ?Sized> Transformer for Box<S> {
    async fn transform(
        &self,
        plan: &ConversionPlan,
        ctx: &mut RunContext<'_>,
    ) -> anyhow::Result<ConversionResult> {
        (**self).transform(plan, ctx).await
    }
}
