//! Codebase membership lookups.
//!
//! The engine asks a [`ScopeOracle`] whether a declaring type belongs to the
//! code under analysis. Oracles can be slow (index lookups, file system
//! scans), so every answer is memoized in a [`ScopeCache`] for the rest of
//! the pass. The cache guarantees one oracle query per distinct type name,
//! even with many workers asking at once.

use super::identifier::normalize_type_name;
use crate::utils::error::{ScopeConfigError, ScopeResolutionError};
use dashmap::DashMap;
use log::{debug, warn};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Decides whether a qualified type belongs to the analyzed codebase
///
/// Implementations must be idempotent for a given name. Type names arrive
/// normalized to `.` separators.
///
/// During a parallel pass the oracle runs on the rayon worker that first
/// asked about a type, while other workers asking about the same type wait
/// on its cache cell. An implementation must not consult the engine's
/// `ScopeCache` or block on work scheduled onto the same rayon pool. Doing
/// either can re-enter the cell it is initializing and deadlock.
pub trait ScopeOracle: Send + Sync {
    fn is_in_scope(&self, qualified_type_name: &str) -> Result<bool, ScopeResolutionError>;
}

impl<F> ScopeOracle for F
where
    F: Fn(&str) -> Result<bool, ScopeResolutionError> + Send + Sync,
{
    fn is_in_scope(&self, qualified_type_name: &str) -> Result<bool, ScopeResolutionError> {
        self(qualified_type_name)
    }
}

/// Memoized oracle answers for one aggregation pass
///
/// Entries are append-only: once a type is resolved its answer never changes.
pub struct ScopeCache {
    oracle: Arc<dyn ScopeOracle>,
    entries: DashMap<String, Arc<OnceCell<bool>>>,
    oracle_queries: AtomicUsize,
}

impl ScopeCache {
    pub fn new(oracle: Arc<dyn ScopeOracle>) -> Self {
        Self {
            oracle,
            entries: DashMap::new(),
            oracle_queries: AtomicUsize::new(0),
        }
    }

    /// Cached membership check
    ///
    /// **Public** - called from worker threads during reduction
    ///
    /// The per-key cell is claimed under the map's shard lock, but the oracle
    /// runs outside it, so a slow lookup only blocks workers waiting on the
    /// same type.
    pub fn is_in_scope(&self, type_name: &str) -> bool {
        if type_name.is_empty() {
            return false;
        }
        let type_name = normalize_type_name(type_name);

        let cached = self.entries.get(&type_name).map(|cell| Arc::clone(cell.value()));
        let cell = match cached {
            Some(cell) => cell,
            None => Arc::clone(self.entries.entry(type_name.clone()).or_default().value()),
        };

        *cell.get_or_init(|| self.resolve(&type_name))
    }

    fn resolve(&self, type_name: &str) -> bool {
        self.oracle_queries.fetch_add(1, Ordering::Relaxed);
        match self.oracle.is_in_scope(type_name) {
            Ok(in_scope) => {
                debug!("Resolved scope of {}: {}", type_name, in_scope);
                in_scope
            }
            Err(e) => {
                warn!("{}; treating as out of scope", e);
                false
            }
        }
    }

    /// Number of distinct type names seen
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of times the oracle was consulted
    pub fn oracle_queries(&self) -> usize {
        self.oracle_queries.load(Ordering::Relaxed)
    }

    /// Number of cached types found in scope
    pub fn in_scope_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().get().copied().unwrap_or(false))
            .count()
    }
}

/// Oracle backed by package/type prefixes
///
/// A type is in scope when it starts with any include prefix and with no
/// exclude prefix. Excludes win.
#[derive(Debug, Clone, Default)]
pub struct PrefixScopeOracle {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl PrefixScopeOracle {
    pub fn new(include: Vec<String>) -> Self {
        Self {
            include: include.iter().map(|p| normalize_type_name(p)).collect(),
            exclude: Vec::new(),
        }
    }

    pub fn with_excludes(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude.iter().map(|p| normalize_type_name(p)).collect();
        self
    }
}

impl ScopeOracle for PrefixScopeOracle {
    fn is_in_scope(&self, qualified_type_name: &str) -> Result<bool, ScopeResolutionError> {
        let included = self
            .include
            .iter()
            .any(|prefix| qualified_type_name.starts_with(prefix.as_str()));
        let excluded = self
            .exclude
            .iter()
            .any(|prefix| qualified_type_name.starts_with(prefix.as_str()));
        Ok(included && !excluded)
    }
}

/// Scope configuration file
///
/// ```toml
/// include = ["com.acme."]
/// exclude = ["com.acme.generated."]
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScopeConfig {
    /// Type prefixes belonging to the codebase
    #[serde(default)]
    pub include: Vec<String>,

    /// Type prefixes carved back out of the includes
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl ScopeConfig {
    /// Build the prefix oracle for this configuration
    ///
    /// # Errors
    /// * `ScopeConfigError::NoIncludes` - nothing would ever be in scope
    pub fn into_oracle(self) -> Result<PrefixScopeOracle, ScopeConfigError> {
        if self.include.is_empty() {
            return Err(ScopeConfigError::NoIncludes);
        }
        Ok(PrefixScopeOracle::new(self.include).with_excludes(self.exclude))
    }
}

/// Load a scope configuration from a TOML file
///
/// # Errors
/// * `ScopeConfigError::Io` - If file cannot be read
/// * `ScopeConfigError::Parse` - If TOML is invalid
pub fn load_scope_config(path: impl AsRef<Path>) -> Result<ScopeConfig, ScopeConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: ScopeConfig = toml::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_oracle(counter: Arc<AtomicUsize>) -> Arc<dyn ScopeOracle> {
        Arc::new(move |name: &str| -> Result<bool, ScopeResolutionError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(name.starts_with("com.acme."))
        })
    }

    #[test]
    fn test_cache_queries_oracle_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let cache = ScopeCache::new(counting_oracle(Arc::clone(&counter)));

        assert!(cache.is_in_scope("com.acme.Foo"));
        assert!(cache.is_in_scope("com/acme/Foo"));
        assert!(!cache.is_in_scope("java.lang.String"));
        assert!(!cache.is_in_scope("java.lang.String"));

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(cache.oracle_queries(), 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.in_scope_count(), 1);
    }

    #[test]
    fn test_empty_type_never_queries() {
        let counter = Arc::new(AtomicUsize::new(0));
        let cache = ScopeCache::new(counting_oracle(Arc::clone(&counter)));

        assert!(!cache.is_in_scope(""));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_oracle_failure_is_out_of_scope_and_cached() {
        let counter = Arc::new(AtomicUsize::new(0));
        let calls = Arc::clone(&counter);
        let cache = ScopeCache::new(Arc::new(move |name: &str| -> Result<bool, ScopeResolutionError> {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ScopeResolutionError::new(name, "index not ready"))
        }));

        assert!(!cache.is_in_scope("com.acme.Foo"));
        assert!(!cache.is_in_scope("com.acme.Foo"));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_prefix_oracle_excludes_win() {
        let oracle = PrefixScopeOracle::new(vec!["com/acme/".to_string()])
            .with_excludes(vec!["com.acme.generated.".to_string()]);

        assert!(oracle.is_in_scope("com.acme.Cart").unwrap());
        assert!(!oracle.is_in_scope("com.acme.generated.Stub").unwrap());
        assert!(!oracle.is_in_scope("org.other.Thing").unwrap());
    }

    #[test]
    fn test_load_scope_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scope.toml");
        fs::write(&path, "include = [\"com.acme.\"]\nexclude = [\"com.acme.gen.\"]\n").unwrap();

        let config = load_scope_config(&path).unwrap();
        assert_eq!(config.include, vec!["com.acme."]);
        assert_eq!(config.exclude, vec!["com.acme.gen."]);
        assert!(config.into_oracle().is_ok());
    }

    #[test]
    fn test_scope_config_without_includes() {
        let config = ScopeConfig::default();
        assert!(matches!(config.into_oracle(), Err(ScopeConfigError::NoIncludes)));
    }
}
