//! Aggregate command implementation.
//!
//! The aggregate command:
//! 1. Builds the scope oracle (scope file or include prefixes)
//! 2. Opens the JSON-lines recording
//! 3. Runs one aggregation pass
//! 4. Prints a JSON report or a text summary

use crate::aggregator::{
    load_scope_config, AggregationEngine, PrefixScopeOracle, ProfilingMetricKind, ProfilingSession,
    SelectionPolicy,
};
use crate::output::{build_report, generate_text_summary, write_report};
use crate::parser::JsonLinesSource;
use crate::utils::config::{EngineConfig, EXECUTION_SAMPLE_EVENT};
use anyhow::{Context, Result};
use log::{debug, info};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Arguments for the aggregate command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AggregateArgs {
    /// JSON-lines recording to read
    pub events: PathBuf,

    /// TOML scope file (takes precedence over include/exclude)
    pub scope_file: Option<PathBuf>,

    /// Type prefixes belonging to the codebase
    pub include: Vec<String>,

    /// Type prefixes excluded from the codebase
    pub exclude: Vec<String>,

    /// Metric to accumulate
    pub metric: ProfilingMetricKind,

    /// Frame attribution policy
    pub policy: SelectionPolicy,

    /// Event kind to aggregate
    pub event_type: String,

    /// Number of methods to print
    pub top: usize,

    /// Print JSON instead of a text table
    pub json: bool,

    /// Reduce on the calling thread
    pub sequential: bool,

    /// Dedicated worker threads (0 = rayon default)
    pub threads: usize,
}

impl Default for AggregateArgs {
    fn default() -> Self {
        Self {
            events: PathBuf::from("events.jsonl"),
            scope_file: None,
            include: Vec::new(),
            exclude: Vec::new(),
            metric: ProfilingMetricKind::RunCount,
            policy: SelectionPolicy::Flat,
            event_type: EXECUTION_SAMPLE_EVENT.to_string(),
            top: 20,
            json: false,
            sequential: false,
            threads: 0,
        }
    }
}

/// Execute the aggregate command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Scope file read/parse failures
/// * Recording decode failures
/// * Unsupported metric for the recorded events
pub fn execute_aggregate(args: AggregateArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Aggregating recording: {}", args.events.display());

    // Step 1: Scope oracle
    let oracle = build_oracle(&args)?;

    // Step 2: Engine and session
    let config = EngineConfig::new()
        .with_sample_event_type(args.event_type.clone())
        .with_parallel(!args.sequential)
        .with_worker_threads(args.threads);

    let mut session = ProfilingSession::new(AggregationEngine::with_config(Arc::new(oracle), config));
    debug!("Engine config: {:?}", session.engine().config());
    session.set_active_metric(args.metric);
    session.set_policy(args.policy);

    // Step 3: Aggregate
    let mut source = JsonLinesSource::open(&args.events)
        .with_context(|| format!("Failed to open recording {}", args.events.display()))?;
    let results = session
        .process(&mut source)
        .context("Failed to aggregate profiling events")?;

    // Step 4: Output
    if args.json {
        let report = build_report(&results, args.policy, args.top);
        write_report(&report, io::stdout().lock()).context("Failed to write report")?;
    } else {
        println!("\n{}", "=".repeat(85));
        println!("PROFILE SUMMARY");
        println!("{}", "=".repeat(85));
        println!("Recording: {}", args.events.display());
        println!("Policy:    {}", args.policy);
        println!("{}", results.summary());
        println!("\n{}", generate_text_summary(&results, args.policy, args.top));
        println!("{}", "=".repeat(85));
    }

    info!("Aggregation completed in {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(())
}

/// Build the scope oracle from the scope file or prefixes
///
/// **Private** - internal helper for execute_aggregate
fn build_oracle(args: &AggregateArgs) -> Result<PrefixScopeOracle> {
    if let Some(path) = &args.scope_file {
        let config = load_scope_config(path)
            .with_context(|| format!("Failed to load scope file {}", path.display()))?;
        return config.into_oracle().context("Invalid scope file");
    }

    Ok(PrefixScopeOracle::new(args.include.clone()).with_excludes(args.exclude.clone()))
}

/// Validate aggregate arguments
///
/// **Public** - can be called before execute_aggregate for early validation
pub fn validate_args(args: &AggregateArgs) -> Result<()> {
    if args.events.as_os_str().is_empty() {
        anyhow::bail!("Recording path cannot be empty");
    }

    if args.scope_file.is_none() && args.include.is_empty() {
        anyhow::bail!("Either --scope or at least one --include prefix is required");
    }

    if args.event_type.trim().is_empty() {
        anyhow::bail!("Event type cannot be empty");
    }

    if args.top == 0 {
        anyhow::bail!("top must be greater than 0");
    }

    if args.top > 1000 {
        anyhow::bail!("top is too large (max 1000)");
    }

    Ok(())
}
