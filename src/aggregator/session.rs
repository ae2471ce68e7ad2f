//! Analysis session state.
//!
//! A session owns the engine, the active metric and policy, and the most
//! recently published `ResultSet`. Results are swapped wholesale and only
//! when a pass succeeds, so a failed pass leaves readers on the previous set.

use super::engine::AggregationEngine;
use super::metrics::ProfilingMetricKind;
use super::result_set::ResultSet;
use super::selector::SelectionPolicy;
use crate::parser::EventSource;
use crate::utils::error::AggregationError;
use log::{info, warn};
use std::sync::Arc;

pub struct ProfilingSession {
    engine: AggregationEngine,
    metric: ProfilingMetricKind,
    policy: SelectionPolicy,
    results: Option<Arc<ResultSet>>,
}

impl ProfilingSession {
    pub fn new(engine: AggregationEngine) -> Self {
        Self {
            engine,
            metric: ProfilingMetricKind::default(),
            policy: SelectionPolicy::default(),
            results: None,
        }
    }

    pub fn engine(&self) -> &AggregationEngine {
        &self.engine
    }

    pub fn active_metric(&self) -> ProfilingMetricKind {
        self.metric
    }

    /// Select the metric used by the next pass
    ///
    /// Published results keep their own metric until the next pass succeeds.
    pub fn set_active_metric(&mut self, metric: ProfilingMetricKind) {
        self.metric = metric;
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: SelectionPolicy) {
        self.policy = policy;
    }

    /// Run a pass with the active settings and publish its result
    ///
    /// **Public** - the previous result stays published if the pass fails
    pub fn process<S>(&mut self, source: &mut S) -> Result<Arc<ResultSet>, AggregationError>
    where
        S: EventSource + ?Sized,
    {
        match self.engine.aggregate(source, self.metric, self.policy) {
            Ok(result) => {
                let result = Arc::new(result);
                self.results = Some(Arc::clone(&result));
                info!("Published {} results for {} methods", result.metric(), result.len());
                Ok(result)
            }
            Err(e) => {
                warn!("Aggregation failed, keeping previous results: {}", e);
                Err(e)
            }
        }
    }

    /// Most recently published results
    pub fn results(&self) -> Option<Arc<ResultSet>> {
        self.results.clone()
    }

    /// Whether a pass has published results
    pub fn is_processed(&self) -> bool {
        self.results.is_some()
    }

    /// Drop published results
    pub fn clear(&mut self) {
        self.results = None;
    }
}
