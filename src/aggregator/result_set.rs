//! Finished aggregation results.
//!
//! A `ResultSet` is built once from the final accumulation map and never
//! mutated afterwards. A new pass produces a new set, so readers can hold
//! one behind an `Arc` without locking.

use super::identifier::MethodIdentifier;
use super::metrics::{MetricMap, ProfilingMetricKind};
use crate::utils::error::DegenerateRangeError;
use std::collections::HashMap;

/// Per-method values plus their observed range
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    metric: ProfilingMetricKind,
    values: HashMap<MethodIdentifier, u64>,
    min_value: u64,
    max_value: u64,
}

impl ResultSet {
    /// Build from a plain map, computing min/max in one pass
    ///
    /// An empty map has min = max = 0.
    pub fn new(metric: ProfilingMetricKind, values: HashMap<MethodIdentifier, u64>) -> Self {
        let range = values
            .values()
            .fold(None, |range: Option<(u64, u64)>, &v| match range {
                None => Some((v, v)),
                Some((min, max)) => Some((min.min(v), max.max(v))),
            });
        let (min_value, max_value) = range.unwrap_or((0, 0));

        Self {
            metric,
            values,
            min_value,
            max_value,
        }
    }

    /// Freeze a shared accumulation map
    pub(crate) fn from_metric_map(metric: ProfilingMetricKind, map: MetricMap) -> Self {
        Self::new(metric, map.into_iter().collect())
    }

    /// Empty result for a metric
    pub fn empty(metric: ProfilingMetricKind) -> Self {
        Self::new(metric, HashMap::new())
    }

    /// Value accumulated for a method identifier
    pub fn get(&self, identifier: &str) -> Option<u64> {
        self.values.get(identifier).copied()
    }

    pub fn min_value(&self) -> u64 {
        self.min_value
    }

    pub fn max_value(&self) -> u64 {
        self.max_value
    }

    /// Metric the values were accumulated with
    pub fn metric(&self) -> ProfilingMetricKind {
        self.metric
    }

    /// True when values differ, i.e. `normalize` is meaningful
    pub fn has_variation(&self) -> bool {
        self.max_value > self.min_value
    }

    /// Scale a value into [0, 1] over the observed range
    ///
    /// **Public** - used by the presentation layer for color intensity
    ///
    /// Values outside the range are clamped.
    ///
    /// # Errors
    /// * `DegenerateRangeError` - min == max, including the empty set
    pub fn normalize(&self, value: u64) -> Result<f64, DegenerateRangeError> {
        if !self.has_variation() {
            return Err(DegenerateRangeError {
                value: self.min_value,
            });
        }

        let clamped = value.clamp(self.min_value, self.max_value);
        let span = (self.max_value - self.min_value) as f64;
        Ok((clamped - self.min_value) as f64 / span)
    }

    /// Normalized value for a method, if present
    pub fn normalized(&self, identifier: &str) -> Option<Result<f64, DegenerateRangeError>> {
        self.get(identifier).map(|v| self.normalize(v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MethodIdentifier, u64)> {
        self.values.iter().map(|(id, &v)| (id, v))
    }

    /// Underlying identifier -> value map
    pub fn values(&self) -> &HashMap<MethodIdentifier, u64> {
        &self.values
    }

    /// Highest-valued methods, ties broken by identifier
    pub fn top(&self, n: usize) -> Vec<(&MethodIdentifier, u64)> {
        let mut ranked: Vec<_> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(n);
        ranked
    }

    /// Sum of all values
    pub fn total(&self) -> u64 {
        self.values.values().fold(0u64, |acc, &v| acc.saturating_add(v))
    }

    /// Get human-readable summary
    ///
    /// **Public** - for logging and debugging
    pub fn summary(&self) -> String {
        format!(
            "{} | Methods: {} | Total: {} {} | Min: {} | Max: {}",
            self.metric,
            self.len(),
            self.total(),
            self.metric.unit(),
            self.min_value,
            self.max_value
        )
    }
}
