use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use visual_profiler::aggregator::{
    AggregationEngine, ProfilingMetricKind, ResultSet, ScopeOracle, SelectionPolicy,
};
use visual_profiler::parser::{from_events, StackFrame, StackSampleEvent};
use visual_profiler::utils::config::EngineConfig;
use visual_profiler::utils::error::{AggregationError, ScopeResolutionError};

/// Oracle that counts how often each lookup reaches it
struct CountingOracle {
    calls: AtomicUsize,
}

impl CountingOracle {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ScopeOracle for CountingOracle {
    fn is_in_scope(&self, qualified_type_name: &str) -> Result<bool, ScopeResolutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(qualified_type_name.starts_with("com.acme."))
    }
}

fn engine_with(oracle: Arc<CountingOracle>, parallel: bool) -> AggregationEngine {
    AggregationEngine::with_config(oracle, EngineConfig::default().with_parallel(parallel))
}

fn engine(parallel: bool) -> AggregationEngine {
    engine_with(CountingOracle::new(), parallel)
}

fn frame(type_name: &str, method: &str) -> StackFrame {
    StackFrame::new(type_name, method, "()V")
}

fn sample(frames: Vec<StackFrame>) -> StackSampleEvent {
    StackSampleEvent::sample("jdk.ExecutionSample", frames)
}

fn run(
    engine: &AggregationEngine,
    events: Vec<StackSampleEvent>,
    metric: ProfilingMetricKind,
    policy: SelectionPolicy,
) -> Result<ResultSet, AggregationError> {
    engine.aggregate(&mut from_events(events), metric, policy)
}

/// A mixed recording exercising every filter
fn mixed_recording() -> Vec<StackSampleEvent> {
    let mut events = Vec::new();
    for i in 0..400u64 {
        let leaf = match i % 5 {
            0 => frame("com.acme.Cart", "add"),
            1 => frame("com.acme.Cart", "total"),
            2 => frame("java.util.HashMap", "get"),
            3 => frame("com.acme.Cart", "lambda$total$0"),
            _ => frame("com.acme.Repo", "load").native(),
        };
        events.push(
            sample(vec![
                leaf,
                frame("com.acme.Service", &format!("handle{}", i % 7)),
                frame("com.acme.Main", "main"),
            ])
            .with_duration(10 + i),
        );
    }
    events
}

#[test]
fn test_parallel_matches_sequential() {
    for metric in [ProfilingMetricKind::RunCount, ProfilingMetricKind::ExecutionTime] {
        for policy in [SelectionPolicy::Flat, SelectionPolicy::Inclusive] {
            let sequential = run(&engine(false), mixed_recording(), metric, policy).unwrap();
            let parallel = run(&engine(true), mixed_recording(), metric, policy).unwrap();

            assert_eq!(sequential.values(), parallel.values());
            assert_eq!(sequential.min_value(), parallel.min_value());
            assert_eq!(sequential.max_value(), parallel.max_value());
        }
    }
}

#[test]
fn test_run_count_identical_events() {
    let events = (0..25)
        .map(|_| sample(vec![frame("com.acme.Cart", "add")]))
        .collect();

    let rs = run(&engine(true), events, ProfilingMetricKind::RunCount, SelectionPolicy::Flat).unwrap();

    assert_eq!(rs.len(), 1);
    assert_eq!(rs.get("com.acme.Cart.add()V"), Some(25));
}

#[test]
fn test_execution_time_sums_durations() {
    let events = vec![
        sample(vec![frame("com.acme.Cart", "add")]).with_duration(100),
        sample(vec![frame("com.acme.Cart", "add")]).with_duration(250),
    ];

    let rs = run(&engine(true), events, ProfilingMetricKind::ExecutionTime, SelectionPolicy::Flat).unwrap();

    assert_eq!(rs.get("com.acme.Cart.add()V"), Some(350));
    assert_eq!(rs.metric(), ProfilingMetricKind::ExecutionTime);
}

#[test]
fn test_unattributable_events_contribute_nothing() {
    let events = vec![
        StackSampleEvent {
            event_type: "jdk.ExecutionSample".to_string(),
            stack_trace: None,
            duration_nanos: None,
        },
        sample(vec![]),
        sample(vec![
            frame("com.acme.Cart", "add").native(),
            frame("com.acme.Cart", "apply").synthetic(),
            frame("com.acme.Cart", "lambda$add$1"),
            frame("java.lang.Thread", "run"),
        ]),
    ];

    let rs = run(&engine(true), events, ProfilingMetricKind::RunCount, SelectionPolicy::Inclusive).unwrap();
    assert!(rs.is_empty());
}

#[test]
fn test_empty_input() {
    let rs = run(&engine(true), Vec::new(), ProfilingMetricKind::RunCount, SelectionPolicy::Flat).unwrap();

    assert!(rs.is_empty());
    assert_eq!(rs.min_value(), 0);
    assert_eq!(rs.max_value(), 0);
    assert!(!rs.has_variation());
}

#[test]
fn test_uniform_values_have_no_variation() {
    let mut events = Vec::new();
    for _ in 0..5 {
        events.push(sample(vec![frame("com.acme.A", "one")]));
        events.push(sample(vec![frame("com.acme.B", "two")]));
    }

    let rs = run(&engine(true), events, ProfilingMetricKind::RunCount, SelectionPolicy::Flat).unwrap();

    assert_eq!(rs.min_value(), 5);
    assert_eq!(rs.max_value(), 5);
    assert!(!rs.has_variation());
    assert!(rs.normalize(5).is_err());
}

#[test]
fn test_normalize_midpoint_from_aggregation() {
    let mut events = Vec::new();
    events.push(sample(vec![frame("com.acme.A", "low")]));
    for _ in 0..5 {
        events.push(sample(vec![frame("com.acme.A", "mid")]));
    }
    for _ in 0..9 {
        events.push(sample(vec![frame("com.acme.A", "high")]));
    }

    let rs = run(&engine(true), events, ProfilingMetricKind::RunCount, SelectionPolicy::Flat).unwrap();

    assert_eq!(rs.min_value(), 1);
    assert_eq!(rs.max_value(), 9);
    let mid = rs.get("com.acme.A.mid()V").unwrap();
    assert_eq!(rs.normalize(mid).unwrap(), 0.5);
}

#[test]
fn test_execution_time_without_durations_fails_fast() {
    let oracle = CountingOracle::new();
    let engine = engine_with(Arc::clone(&oracle), true);
    let events = vec![
        sample(vec![frame("com.acme.Cart", "add")]).with_duration(100),
        sample(vec![frame("com.acme.Cart", "add")]),
    ];

    let result = run(&engine, events, ProfilingMetricKind::ExecutionTime, SelectionPolicy::Flat);

    match result {
        Err(AggregationError::UnsupportedMetric(e)) => assert_eq!(e.event_index, 1),
        other => panic!("expected unsupported metric error, got {:?}", other.map(|rs| rs.len())),
    }
    // Failed before any frame was examined
    assert_eq!(oracle.calls(), 0);
}

#[test]
fn test_oracle_called_once_per_type_under_parallel_load() {
    let oracle = CountingOracle::new();
    let engine = AggregationEngine::with_config(
        Arc::clone(&oracle) as Arc<dyn ScopeOracle>,
        EngineConfig::default().with_worker_threads(8),
    );
    let events = (0..5_000)
        .map(|_| sample(vec![frame("java.util.ArrayList", "get"), frame("com.acme.Cart", "add")]))
        .collect();

    let rs = run(&engine, events, ProfilingMetricKind::RunCount, SelectionPolicy::Flat).unwrap();

    assert_eq!(rs.get("com.acme.Cart.add()V"), Some(5_000));
    assert_eq!(oracle.calls(), 2);
    assert_eq!(engine.scope_cache().oracle_queries(), 2);
}

#[test]
fn test_flat_and_inclusive_attribution() {
    let events = vec![sample(vec![
        frame("com.acme.Repo", "load"),
        frame("com.acme.Service", "handle"),
        frame("org.framework.Dispatcher", "dispatch"),
        frame("com.acme.Main", "main"),
    ])];

    let flat = run(&engine(true), events.clone(), ProfilingMetricKind::RunCount, SelectionPolicy::Flat).unwrap();
    let inclusive = run(&engine(true), events, ProfilingMetricKind::RunCount, SelectionPolicy::Inclusive).unwrap();

    assert_eq!(flat.len(), 1);
    assert_eq!(flat.get("com.acme.Repo.load()V"), Some(1));

    assert_eq!(inclusive.len(), 3);
    assert_eq!(inclusive.get("com.acme.Service.handle()V"), Some(1));
    assert_eq!(inclusive.get("com.acme.Main.main()V"), Some(1));
    assert_eq!(inclusive.get("org.framework.Dispatcher.dispatch()V"), None);
}

#[test]
fn test_overloads_are_distinct() {
    let events = vec![
        sample(vec![StackFrame::new("com.acme.Cart", "add", "(I)V")]),
        sample(vec![StackFrame::new("com/acme/Cart", "add", "(J)V")]),
        sample(vec![StackFrame::new("com.acme.Cart", "add", "(J)V")]),
    ];

    let rs = run(&engine(true), events, ProfilingMetricKind::RunCount, SelectionPolicy::Flat).unwrap();

    assert_eq!(rs.get("com.acme.Cart.add(I)V"), Some(1));
    assert_eq!(rs.get("com.acme.Cart.add(J)V"), Some(2));
}

#[test]
fn test_constructor_and_same_name_void_method_aggregate_separately() {
    let events = vec![
        sample(vec![StackFrame::new("com.acme.Cart", "<init>", "()V")]),
        sample(vec![StackFrame::new("com.acme.Cart", "Cart", "()V")]),
    ];

    let rs = run(&engine(true), events, ProfilingMetricKind::RunCount, SelectionPolicy::Flat).unwrap();

    assert_eq!(rs.len(), 2);
    assert_eq!(rs.get("com.acme.Cart.<init>()V"), Some(1));
    assert_eq!(rs.get("com.acme.Cart.Cart()V"), Some(1));
}
