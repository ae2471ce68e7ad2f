//! Visual Profiler CLI
//!
//! Aggregates a recorded stream of stack samples into per-method metrics
//! and prints the hottest methods.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use visual_profiler::aggregator::{ProfilingMetricKind, SelectionPolicy};
use visual_profiler::commands::{execute_aggregate, validate_args, AggregateArgs};
use visual_profiler::utils::config::{EXECUTION_SAMPLE_EVENT, SCHEMA_VERSION};

/// Visual Profiler - per-method metrics from sampled stack traces
#[derive(Parser, Debug)]
#[command(name = "visual-profiler")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Aggregate a JSON-lines recording
    Aggregate {
        /// Recording with one JSON event per line
        #[arg(short, long)]
        events: PathBuf,

        /// TOML file listing include/exclude type prefixes
        #[arg(short, long, env = "VISUAL_PROFILER_SCOPE")]
        scope: Option<PathBuf>,

        /// Type prefix belonging to the codebase (repeatable)
        #[arg(short, long)]
        include: Vec<String>,

        /// Type prefix excluded from the codebase (repeatable)
        #[arg(short = 'x', long)]
        exclude: Vec<String>,

        /// Metric to accumulate
        #[arg(short, long, value_enum, default_value_t = ProfilingMetricKind::RunCount)]
        metric: ProfilingMetricKind,

        /// Frame attribution policy
        #[arg(short, long, value_enum, default_value_t = SelectionPolicy::Flat)]
        policy: SelectionPolicy,

        /// Event kind to aggregate
        #[arg(long, default_value = EXECUTION_SAMPLE_EVENT)]
        event_type: String,

        /// Number of methods to print
        #[arg(long, default_value = "20")]
        top: usize,

        /// Print a JSON report instead of a table
        #[arg(long)]
        json: bool,

        /// Reduce on a single thread
        #[arg(long)]
        sequential: bool,

        /// Dedicated worker threads (0 = one per core)
        #[arg(long, default_value = "0")]
        threads: usize,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Aggregate {
            events,
            scope,
            include,
            exclude,
            metric,
            policy,
            event_type,
            top,
            json,
            sequential,
            threads,
        } => {
            let args = AggregateArgs {
                events,
                scope_file: scope,
                include,
                exclude,
                metric,
                policy,
                event_type,
                top,
                json,
                sequential,
                threads,
            };

            // Validate args first
            validate_args(&args)?;

            execute_aggregate(args)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Display version information
///
/// **Private** - internal command implementation
fn display_version() {
    println!("Visual Profiler v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Per-method run counts and execution time from sampled stack traces.");
}
