//! Filesystem-backed collaborators for test-converter.
//!
//! The pipeline itself never touches the disk. This crate provides the
//! implementations strategies use to do so:
//!
//! - [`SourceWalker`] - find the files a run's include/exclude patterns accept
//! - [`FsFileReader`] - read [`SourceFile`](tc_core::SourceFile)s, in parallel for batches
//! - [`FsFileWriter`] - write converted files (no-op in dry-run mode)
//! - [`FsBackupManager`] - back files up before rewriting them
//! - [`JsonConfigReader`] / [`merge_configs`] - discover, merge, and update
//!   project configuration files
//!
//! # Example
//!
//! ```no_run
//! use tc_core::ConversionOptions;
//! use tc_scanner::FsFileReader;
//!
//! let config = ConversionOptions::new("./project").normalize()?;
//! let reader = FsFileReader::from_config(&config)?;
//! let paths = reader.discover()?;
//! let (files, skipped) = reader.read_lenient(&paths);
//! println!("read {} files, skipped {}", files.len(), skipped.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod backup;
pub mod config_reader;
pub mod error;
pub mod reader;
pub mod walker;
pub mod writer;

pub use backup::FsBackupManager;
pub use config_reader::{ConfigMerger, JsonConfigReader, merge_configs, merge_raw};
pub use error::ScanError;
pub use reader::{FsFileReader, read_source};
pub use walker::SourceWalker;
pub use writer::FsFileWriter;
