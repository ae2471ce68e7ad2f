//! Per-method metric accumulation.
//!
//! Each qualifying (frame, event) pair contributes a value to the shared
//! map under the frame's method identifier:
//! - RunCount: 1 per sample
//! - ExecutionTime: the sample's duration in nanoseconds
//!
//! Contributions are merged by addition, so workers can apply them in any
//! order and still reach the same totals.

use super::identifier::MethodIdentifier;
use crate::parser::{StackFrame, StackSampleEvent};
use crate::utils::error::UnsupportedMetricError;
use clap::ValueEnum;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Accumulation policy for an aggregation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ProfilingMetricKind {
    /// Number of samples attributed to the method
    #[default]
    RunCount,
    /// Sum of sample durations attributed to the method (ns)
    ExecutionTime,
}

impl ProfilingMetricKind {
    /// Whether events must carry a duration for this metric
    pub fn requires_duration(&self) -> bool {
        matches!(self, ProfilingMetricKind::ExecutionTime)
    }

    /// Unit label for display
    pub fn unit(&self) -> &'static str {
        match self {
            ProfilingMetricKind::RunCount => "samples",
            ProfilingMetricKind::ExecutionTime => "ns",
        }
    }
}

impl fmt::Display for ProfilingMetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfilingMetricKind::RunCount => write!(f, "RUN_COUNT"),
            ProfilingMetricKind::ExecutionTime => write!(f, "EXECUTION_TIME"),
        }
    }
}

/// Shared accumulation map written by all workers
pub type MetricMap = DashMap<MethodIdentifier, u64>;

/// Check that every event carries the data the metric needs
///
/// **Public** - run before any accumulation so a failing pass does no work
///
/// # Errors
/// * `UnsupportedMetricError` - first event missing a required field
pub fn check_metric_support(
    metric: ProfilingMetricKind,
    events: &[StackSampleEvent],
) -> Result<(), UnsupportedMetricError> {
    if !metric.requires_duration() {
        return Ok(());
    }

    match events.iter().position(|e| e.duration_nanos.is_none()) {
        Some(event_index) => Err(UnsupportedMetricError {
            metric,
            event_type: events[event_index].event_type.clone(),
            event_index,
        }),
        None => Ok(()),
    }
}

/// Value one event contributes to each credited method
///
/// # Errors
/// * `UnsupportedMetricError` - the metric needs a field the event lacks
pub fn contribution(
    metric: ProfilingMetricKind,
    event: &StackSampleEvent,
    event_index: usize,
) -> Result<u64, UnsupportedMetricError> {
    match metric {
        ProfilingMetricKind::RunCount => Ok(1),
        ProfilingMetricKind::ExecutionTime => {
            event.duration_nanos.ok_or_else(|| UnsupportedMetricError {
                metric,
                event_type: event.event_type.clone(),
                event_index,
            })
        }
    }
}

/// Merge a contribution for each selected frame into the shared map
///
/// **Public** - unseen keys start at 0
pub fn accumulate(map: &MetricMap, frames: &[&StackFrame], value: u64) {
    for frame in frames {
        let key = MethodIdentifier::from_frame(frame);
        let mut total = map.entry(key).or_insert(0);
        *total = total.saturating_add(value);
    }
}
