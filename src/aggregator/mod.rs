//! Aggregation of profiling samples into per-method metrics.
//!
//! This module transforms decoded stack samples into:
//! - Attribution frames (flat or inclusive)
//! - Per-method run counts or execution times
//! - An immutable result set with normalization helpers

pub mod engine;
pub mod identifier;
pub mod metrics;
pub mod result_set;
pub mod scope;
pub mod selector;
pub mod session;

// Re-export main types and functions
pub use engine::AggregationEngine;
pub use identifier::MethodIdentifier;
pub use metrics::ProfilingMetricKind;
pub use result_set::ResultSet;
pub use scope::{load_scope_config, PrefixScopeOracle, ScopeCache, ScopeConfig, ScopeOracle};
pub use selector::{FrameSelector, SelectionPolicy};
pub use session::ProfilingSession;
