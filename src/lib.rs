//! Visual Profiler
//!
//! Reduces sampled JVM stack traces into per-method metrics
//! (run counts, execution time) for source-level visualization.
//!
//! ## Getting Started
//!
//! ```ignore
//! use std::sync::Arc;
//! use visual_profiler::aggregator::{AggregationEngine, PrefixScopeOracle, ProfilingMetricKind, SelectionPolicy};
//! use visual_profiler::parser::JsonLinesSource;
//!
//! let oracle = PrefixScopeOracle::new(vec!["com.acme.".to_string()]);
//! let engine = AggregationEngine::new(Arc::new(oracle));
//! let mut source = JsonLinesSource::open("recording.jsonl")?;
//! let results = engine.aggregate(&mut source, ProfilingMetricKind::RunCount, SelectionPolicy::Flat)?;
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;
