//! Aggregation engine.
//!
//! One pass:
//! 1. Drain the event source sequentially, keeping only sample events
//! 2. Verify the metric is supported by every buffered event
//! 3. Reduce events (in parallel by default) into a shared map
//! 4. Freeze the map into a `ResultSet`
//!
//! Any decode error or unsupported metric aborts the pass; no partial
//! result is ever returned.

use super::metrics::{accumulate, check_metric_support, contribution, MetricMap, ProfilingMetricKind};
use super::result_set::ResultSet;
use super::scope::{ScopeCache, ScopeOracle};
use super::selector::{FrameSelector, SelectionPolicy};
use crate::parser::{EventSource, StackSampleEvent};
use crate::utils::config::EngineConfig;
use crate::utils::error::{AggregationError, DecodeError, UnsupportedMetricError};
use log::{debug, info};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;

/// Reduces profiling samples into per-method metrics
///
/// **Public** - constructed once per analysis session
///
/// Holds only configuration and the scope cache. The cache survives across
/// passes of the same engine since the analyzed codebase is assumed stable
/// for the session; call [`AggregationEngine::reset_scope_cache`] if it changed.
pub struct AggregationEngine {
    config: EngineConfig,
    oracle: Arc<dyn ScopeOracle>,
    scope: ScopeCache,
}

impl AggregationEngine {
    pub fn new(oracle: Arc<dyn ScopeOracle>) -> Self {
        Self::with_config(oracle, EngineConfig::default())
    }

    pub fn with_config(oracle: Arc<dyn ScopeOracle>, config: EngineConfig) -> Self {
        Self {
            config,
            scope: ScopeCache::new(Arc::clone(&oracle)),
            oracle,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Scope lookups memoized so far
    pub fn scope_cache(&self) -> &ScopeCache {
        &self.scope
    }

    /// Forget every cached scope answer
    pub fn reset_scope_cache(&mut self) {
        self.scope = ScopeCache::new(Arc::clone(&self.oracle));
    }

    /// Run one aggregation pass
    ///
    /// **Public** - sole entry point for the presentation layer
    ///
    /// # Arguments
    /// * `source` - Event source, drained fully before reduction
    /// * `metric` - Accumulation policy
    /// * `policy` - Frame attribution policy
    ///
    /// # Errors
    /// * `AggregationError::Decode` - the source failed mid-stream
    /// * `AggregationError::UnsupportedMetric` - events lack a field the metric needs
    /// * `AggregationError::ThreadPool` - dedicated worker pool could not be built
    pub fn aggregate<S>(
        &self,
        source: &mut S,
        metric: ProfilingMetricKind,
        policy: SelectionPolicy,
    ) -> Result<ResultSet, AggregationError>
    where
        S: EventSource + ?Sized,
    {
        let start_time = Instant::now();
        info!("Starting {} aggregation ({} profile)", metric, policy);

        let events = self.drain(source)?;
        check_metric_support(metric, &events)?;

        let map = self.reduce(&events, metric, policy)?;
        let result = ResultSet::from_metric_map(metric, map);

        debug!(
            "Scope cache: {} types, {} in scope, {} oracle queries",
            self.scope.len(),
            self.scope.in_scope_count(),
            self.scope.oracle_queries()
        );
        info!(
            "Aggregated {} samples in {:.2}s: {}",
            events.len(),
            start_time.elapsed().as_secs_f64(),
            result.summary()
        );

        Ok(result)
    }

    /// Buffer every sample event, discarding other kinds
    fn drain<S>(&self, source: &mut S) -> Result<Vec<StackSampleEvent>, DecodeError>
    where
        S: EventSource + ?Sized,
    {
        let mut events = Vec::new();
        let mut discarded = 0usize;

        while source.has_next() {
            let event = source.next_event()?;
            if event.event_type == self.config.sample_event_type {
                events.push(event);
            } else {
                discarded += 1;
            }
        }

        debug!(
            "Drained {} '{}' events, discarded {} others",
            events.len(),
            self.config.sample_event_type,
            discarded
        );

        Ok(events)
    }

    fn reduce(
        &self,
        events: &[StackSampleEvent],
        metric: ProfilingMetricKind,
        policy: SelectionPolicy,
    ) -> Result<MetricMap, AggregationError> {
        let map = MetricMap::new();
        let selector = FrameSelector::new(policy, &self.scope);

        if !self.config.parallel {
            debug!("Reducing {} events sequentially ({} policy)", events.len(), selector.policy());
            events
                .iter()
                .enumerate()
                .try_for_each(|(index, event)| reduce_event(&selector, &map, metric, index, event))?;
            return Ok(map);
        }

        let run = || {
            events
                .par_iter()
                .enumerate()
                .try_for_each(|(index, event)| reduce_event(&selector, &map, metric, index, event))
        };

        if self.config.worker_threads > 0 {
            debug!(
                "Reducing {} events on {} dedicated workers ({} policy)",
                events.len(),
                self.config.worker_threads,
                selector.policy()
            );
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.worker_threads)
                .build()
                .map_err(|e| AggregationError::ThreadPool(e.to_string()))?;
            pool.install(run)?;
        } else {
            debug!("Reducing {} events on the global pool ({} policy)", events.len(), selector.policy());
            run()?;
        }

        Ok(map)
    }
}

/// Select frames for one event and merge its contribution
fn reduce_event(
    selector: &FrameSelector<'_>,
    map: &MetricMap,
    metric: ProfilingMetricKind,
    index: usize,
    event: &StackSampleEvent,
) -> Result<(), UnsupportedMetricError> {
    let frames = selector.select(event);
    if frames.is_empty() {
        return Ok(());
    }

    let value = contribution(metric, event, index)?;
    accumulate(map, &frames, value);
    Ok(())
}
