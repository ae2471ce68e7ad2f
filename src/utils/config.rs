//! Configuration and constants for the aggregation engine.

/// Current report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Event kind carrying periodic execution samples
pub const EXECUTION_SAMPLE_EVENT: &str = "jdk.ExecutionSample";

/// Method name recorded for constructors
pub const CONSTRUCTOR_SENTINEL: &str = "<init>";

// javac names lambda bodies `lambda$<enclosing>$<n>`
pub const LAMBDA_PREFIX: &str = "lambda$";

/// Engine configuration
///
/// **Public** - one per analysis session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Only events of this kind are aggregated, everything else is discarded
    pub sample_event_type: String,

    /// Reduce buffered events on worker threads
    pub parallel: bool,

    /// Size of a dedicated worker pool (0 = rayon global pool)
    pub worker_threads: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_event_type: EXECUTION_SAMPLE_EVENT.to_string(),
            parallel: true,
            worker_threads: 0,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sample_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.sample_event_type = event_type.into();
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = worker_threads;
        self
    }
}
