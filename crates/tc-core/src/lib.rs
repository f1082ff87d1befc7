//! Core types, errors, and collaborator contracts for test-converter.
//!
//! This crate provides the foundational types shared across the workspace:
//!
//! - Run configuration ([`ConversionOptions`] and its normalized form [`RunConfig`])
//! - Domain types for plans, validation findings, and results
//! - Namespaced error codes ([`ErrorKind`], [`CONVERSION_FAILED`])
//! - Contracts for the readers, writers, and syntax-tree tools a strategy uses
//! - Type aliases for `FxHashMap`/`FxHashSet` (faster than std)

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod ast;
pub mod config;
pub mod error;
pub mod hash;
pub mod interfaces;
pub mod types;

pub use config::{
    ConversionOptions, DEFAULT_BACKUP_DIR, DEFAULT_CONCURRENCY, DEFAULT_EXCLUDE, DEFAULT_INCLUDE,
    RunConfig,
};
pub use error::ConfigError;
pub use hash::{FxBuildHasher, FxHashMap, FxHashSet, fx_hash_map, fx_hash_map_with_capacity, fx_hash_set};
pub use interfaces::{
    BackupManager, ConfigReader, ConfigResolver, ConfigUpdater, FileReader, FileWriter,
    ProgressReporter,
};
pub use types::*;
