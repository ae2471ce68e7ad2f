//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use crate::aggregator::metrics::ProfilingMetricKind;
use thiserror::Error;

/// Errors raised while pulling events out of an event source
///
/// Any of these aborts the aggregation pass.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to read event stream: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed event on line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Event source has no more events")]
    Exhausted,
}

/// The scope oracle could not decide whether a type belongs to the codebase
///
/// Never surfaced to callers of the engine; the frame is treated as out of scope.
#[derive(Error, Debug, Clone)]
#[error("Cannot resolve scope of type '{type_name}': {reason}")]
pub struct ScopeResolutionError {
    pub type_name: String,
    pub reason: String,
}

impl ScopeResolutionError {
    pub fn new(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }
}

/// The requested metric needs data the recorded events do not carry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Metric {metric} is not supported by event '{event_type}' (event #{event_index} has no duration)")]
pub struct UnsupportedMetricError {
    pub metric: ProfilingMetricKind,
    pub event_type: String,
    pub event_index: usize,
}

/// `normalize` was asked to scale a value over an empty range
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Cannot normalize over a degenerate range (min = max = {value})")]
pub struct DegenerateRangeError {
    pub value: u64,
}

/// Errors that abort an aggregation pass
#[derive(Error, Debug)]
pub enum AggregationError {
    #[error("Failed to decode profiling events: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    UnsupportedMetric(#[from] UnsupportedMetricError),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),
}

/// Errors that can occur while loading a scope configuration file
#[derive(Error, Debug)]
pub enum ScopeConfigError {
    #[error("Failed to read scope file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scope TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Scope configuration has no include prefixes")]
    NoIncludes,
}

/// Errors that can occur during report output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write report: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
