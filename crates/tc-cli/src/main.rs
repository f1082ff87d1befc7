//! CLI entry point for test-converter.
//!
//! # Usage
//!
//! ```bash
//! tc-convert [OPTIONS] <COMMAND>
//!
//! # Show the normalized run configuration
//! tc-convert --source ./tests config
//!
//! # Inventory the files a migration would touch
//! tc-convert --source ./tests --include 'specs/**/*.js' scan --detailed
//!
//! # Merge the project's Babel/ESLint/TypeScript/package configuration
//! tc-convert --source . merge-config
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod inventory;

use std::collections::BTreeMap;
use std::io::Write;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use tc_core::{ConfigReader, ConversionOptions, ConversionResult, ProgressEvent, RunConfig};
use tc_pipeline::Pipeline;
use tc_scanner::{JsonConfigReader, merge_configs};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::inventory::Inventory;

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Orchestrates test-framework migrations: analyze, validate, transform.
#[derive(Parser)]
#[command(name = "tc-convert", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// JSON file with run options. Flags override its values.
    #[arg(short, long, global = true, env = "TC_CONVERT_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Source directory to migrate.
    #[arg(short, long, global = true, env = "TC_CONVERT_SOURCE")]
    source: Option<Utf8PathBuf>,

    /// Directory converted files are written to (defaults to the source).
    #[arg(short, long, global = true)]
    target: Option<Utf8PathBuf>,

    /// Glob of files to include (repeatable).
    #[arg(long, global = true)]
    include: Vec<String>,

    /// Glob of files to exclude (repeatable).
    #[arg(long, global = true)]
    exclude: Vec<String>,

    /// Preview only: keep going past validation failures, write nothing.
    #[arg(long, global = true)]
    dry_run: bool,

    /// Maximum number of files processed at once.
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Print the normalized run configuration as JSON.
    Config,

    /// Inventory the files in scope for a migration.
    Scan {
        /// Show the per-file list.
        #[arg(short, long)]
        detailed: bool,

        /// Print the full result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Discover and merge project configuration files.
    MergeConfig {
        /// Directory to search (defaults to the source).
        dir: Option<Utf8PathBuf>,
    },
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects `RUST_LOG` if set. Otherwise uses `debug` with `--verbose`, or
/// `info` by default.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},ignore=warn,globset=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_ansi(use_ansi))
        .with(filter)
        .init();
}

/// Builds the run configuration from the options file and flags.
///
/// # Errors
///
/// Returns an error if the options file can't be loaded, no source is
/// given, the source isn't a directory, or an option is invalid.
fn build_config(cli: &Cli) -> color_eyre::Result<RunConfig> {
    let mut options = match &cli.config {
        Some(path) => ConversionOptions::from_json_file(path)?,
        None => ConversionOptions::default(),
    };

    if let Some(source) = &cli.source {
        options.source.clone_from(source);
    }
    if options.source.as_str().is_empty() {
        return Err(color_eyre::eyre::eyre!(
            "No source directory given; pass --source or set it in the options file"
        ));
    }
    if !options.source.is_dir() {
        return Err(color_eyre::eyre::eyre!(
            "Source is not a directory: {}",
            options.source
        ));
    }

    if let Some(target) = &cli.target {
        options = options.target(target.clone());
    }
    if !cli.include.is_empty() {
        options = options.include(cli.include.iter().cloned());
    }
    if !cli.exclude.is_empty() {
        options = options.exclude(cli.exclude.iter().cloned());
    }
    if cli.dry_run {
        options = options.dry_run(true);
    }
    if let Some(concurrency) = cli.concurrency {
        options = options.concurrency(concurrency);
    }
    if cli.verbose {
        options = options.verbose(true);
    }

    Ok(options.normalize()?)
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Prints the normalized configuration.
fn run_config(config: &RunConfig) -> color_eyre::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", serde_json::to_string_pretty(config)?)?;
    Ok(())
}

/// Runs the inventory pipeline and reports what it found.
async fn run_scan(config: RunConfig, detailed: bool, json: bool) -> color_eyre::Result<()> {
    info!(source = %config.source, "Starting scan");

    let mut pipeline = Pipeline::with_config(Inventory, config);
    pipeline.on_progress(log_progress);
    let result = pipeline.convert().await;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    if json {
        writeln!(handle, "{}", serde_json::to_string_pretty(&result)?)?;
    } else {
        print_summary(&mut handle, &result)?;
        if detailed {
            print_detailed_file_list(&mut handle, &result)?;
        }
    }
    drop(handle);

    print_diagnostics(&result)?;
    if !result.success {
        return Err(color_eyre::eyre::eyre!(
            "Scan failed with {} error(s)",
            result.errors.len()
        ));
    }
    Ok(())
}

/// Finds, merges, and prints project configuration files.
async fn run_merge_config(
    config: &RunConfig,
    dir: Option<Utf8PathBuf>,
) -> color_eyre::Result<()> {
    let dir = dir.unwrap_or_else(|| config.source.clone());
    info!(dir = %dir, "Discovering configuration files");

    let found = JsonConfigReader
        .find_configs(&dir)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("{e:#}"))?;
    if found.is_empty() {
        warn!(dir = %dir, "No known configuration files found");
    }

    let resolved = merge_configs(&found);
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", serde_json::to_string_pretty(&resolved)?)?;

    if !resolved.is_clean() {
        let stderr = std::io::stderr();
        let mut handle = stderr.lock();
        writeln!(handle)?;
        writeln!(handle, "Conflicts ({}):", resolved.conflicts.len())?;
        for conflict in &resolved.conflicts {
            let sources: Vec<&str> = conflict.values.iter().map(|v| v.source.as_str()).collect();
            writeln!(handle, "  {} - set by {}", conflict.key, sources.join(", "))?;
        }
    }
    Ok(())
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Forwards pipeline progress to the log.
fn log_progress(event: &ProgressEvent) {
    match &event.current_file {
        Some(file) => tracing::debug!(
            phase = event.phase.label(),
            progress = event.progress,
            file = %file,
            "{}",
            event.message
        ),
        None => info!(phase = event.phase.label(), progress = event.progress, "{}", event.message),
    }
}

/// Prints a summary of the inventory.
fn print_summary(handle: &mut impl Write, result: &ConversionResult) -> std::io::Result<()> {
    let mut by_extension: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for file in &result.processed_files {
        let entry = by_extension.entry(file.source.extension.as_str()).or_default();
        entry.0 += 1;
        entry.1 += file.source.size;
    }

    writeln!(handle)?;
    writeln!(handle, "Migration Inventory")?;
    writeln!(handle, "===================")?;
    writeln!(handle)?;
    writeln!(handle, "Files in scope: {}", result.stats.total_files)?;
    for (extension, (count, bytes)) in &by_extension {
        let label = if extension.is_empty() { "(none)" } else { *extension };
        writeln!(handle, "  .{label:<10} {count:>6} files {bytes:>10} bytes")?;
    }
    writeln!(handle)?;
    writeln!(handle, "Duration: {} ms", result.duration.as_millis())?;
    Ok(())
}

/// Prints every file in the inventory.
fn print_detailed_file_list(
    handle: &mut impl Write,
    result: &ConversionResult,
) -> std::io::Result<()> {
    writeln!(handle)?;
    writeln!(handle, "Files:")?;
    for file in &result.processed_files {
        writeln!(
            handle,
            "  {} ({} lines)",
            file.source.relative_path,
            file.source.line_count()
        )?;
    }
    Ok(())
}

/// Prints errors and warnings to stderr.
fn print_diagnostics(result: &ConversionResult) -> std::io::Result<()> {
    if result.errors.is_empty() && result.warnings.is_empty() {
        return Ok(());
    }
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    writeln!(handle)?;
    for error in &result.errors {
        let file = error.file.as_ref().map(|f| format!(" {f}")).unwrap_or_default();
        writeln!(handle, "error[{}]{file}: {}", error.code, error.message)?;
    }
    for warning in &result.warnings {
        let file = warning.file.as_ref().map(|f| format!(" {f}")).unwrap_or_default();
        writeln!(handle, "warning[{}]{file}: {}", warning.code, warning.message)?;
    }
    Ok(())
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Route to appropriate command
    let config = build_config(&cli)?;
    match cli.command {
        Commands::Config => run_config(&config),
        Commands::Scan { detailed, json } => run_scan(config, detailed, json).await,
        Commands::MergeConfig { dir } => run_merge_config(&config, dir).await,
    }
}
