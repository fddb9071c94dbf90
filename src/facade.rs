//! Engine facade
//!
//! [`DbEngine`] resolves the engine named by a configuration, builds it once
//! and forwards every query to it. [`EngineCell`] holds at most one
//! `DbEngine` and builds it on first use; the process-wide instance behind
//! [`DbEngine::get_instance`] is a static `EngineCell`.

use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::config::EngineConfig;
use crate::error::{DbError, Result};
use crate::registry::EngineRegistry;
use crate::traits::Engine;

static GLOBAL: EngineCell = EngineCell::new();

pub struct DbEngine {
    engine: Box<dyn Engine>,
    name: String,
    config: EngineConfig,
}

impl DbEngine {
    /// Resolve and construct the configured engine.
    ///
    /// Fails with [`DbError::EngineNotFound`] when `config` names no engine or
    /// an unregistered one. Factory errors are returned as-is.
    pub fn new(registry: &EngineRegistry, config: &EngineConfig) -> Result<Self> {
        let name = config
            .engine_name()
            .ok_or(DbError::EngineNotFound(None))?
            .to_string();

        tracing::debug!(engine = %name, "Resolving engine");
        let factory = registry
            .lookup(&name)
            .ok_or_else(|| DbError::EngineNotFound(Some(name.clone())))?;

        let engine = factory(config)?;
        tracing::info!(engine = %name, "Engine constructed");

        Ok(Self {
            engine,
            name,
            config: config.clone(),
        })
    }

    /// The process-wide engine, constructed from `config` on the first
    /// successful call.
    ///
    /// Later calls return the same instance and ignore `config`.
    pub fn get_instance(
        registry: &EngineRegistry,
        config: &EngineConfig,
    ) -> Result<&'static DbEngine> {
        GLOBAL.get_or_init(registry, config)
    }

    /// The process-wide engine, if it has been constructed
    pub fn instance() -> Option<&'static DbEngine> {
        GLOBAL.get()
    }

    pub fn execute(&self, query: &str, params: Option<Vec<Value>>) -> Result<Vec<Value>> {
        self.engine.execute(query, params)
    }

    pub fn engine_name(&self) -> &str {
        &self.name
    }

    /// Configuration the engine was built from
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl std::fmt::Debug for DbEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbEngine")
            .field("engine", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Lazily-populated holder for a single [`DbEngine`].
///
/// Concurrent first calls construct the engine exactly once. A failed
/// construction leaves the cell empty so a later call can retry.
#[derive(Debug, Default)]
pub struct EngineCell {
    cell: OnceCell<DbEngine>,
}

impl EngineCell {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    pub fn get_or_init(&self, registry: &EngineRegistry, config: &EngineConfig) -> Result<&DbEngine> {
        let engine = self
            .cell
            .get_or_try_init(|| DbEngine::new(registry, config))?;

        if engine.config() != config {
            tracing::warn!(
                engine = %engine.engine_name(),
                "Engine already initialized; ignoring new configuration"
            );
        }
        Ok(engine)
    }

    pub fn get(&self) -> Option<&DbEngine> {
        self.cell.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::memory::{CallLog, MemoryEngine, RecordedCall};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_registry(log: CallLog, counter: Arc<AtomicUsize>) -> EngineRegistry {
        let mut registry = EngineRegistry::new();
        registry.register("memory", move |config| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(MemoryEngine::with_log(config, log.clone())?))
        });
        registry
    }

    #[test]
    fn test_unknown_engine() {
        let registry = EngineRegistry::new();
        let err = DbEngine::new(&registry, &EngineConfig::for_engine("nonexistent")).unwrap_err();
        assert!(matches!(err, DbError::EngineNotFound(Some(name)) if name == "nonexistent"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_missing_engine_key() {
        let registry = EngineRegistry::with_builtin_engines();
        let err = DbEngine::new(&registry, &EngineConfig::new()).unwrap_err();
        assert!(matches!(err, DbError::EngineNotFound(None)));
    }

    #[test]
    fn test_execute_forwards_unchanged() {
        let log = CallLog::new();
        let registry = counting_registry(log.clone(), Arc::new(AtomicUsize::new(0)));
        let config = EngineConfig::for_engine("memory").with("rows", json!([{"n": 1}]));
        let engine = DbEngine::new(&registry, &config).unwrap();

        let rows = engine
            .execute("SELECT n FROM t WHERE a = ?", Some(vec![json!("x")]))
            .unwrap();

        assert_eq!(rows, vec![json!({"n": 1})]);
        assert_eq!(
            log.calls(),
            vec![RecordedCall {
                query: "SELECT n FROM t WHERE a = ?".to_string(),
                params: Some(vec![json!("x")]),
            }]
        );
        assert_eq!(engine.engine_name(), "memory");
        assert_eq!(engine.config(), &config);
    }

    #[test]
    fn test_cell_constructs_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(CallLog::new(), counter.clone());
        let config = EngineConfig::for_engine("memory");
        let cell = EngineCell::new();

        let first = cell.get_or_init(&registry, &config).unwrap();
        let second = cell.get_or_init(&registry, &config).unwrap();

        assert!(std::ptr::eq(first, second));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cell_ignores_later_configuration() {
        let registry = EngineRegistry::with_builtin_engines();
        let cell = EngineCell::new();

        let first = cell
            .get_or_init(&registry, &EngineConfig::for_engine("memory"))
            .unwrap();
        let second = cell
            .get_or_init(&registry, &EngineConfig::for_engine("nonexistent"))
            .unwrap();

        assert!(std::ptr::eq(first, second));
        assert_eq!(second.engine_name(), "memory");
    }

    #[test]
    fn test_cell_retries_after_failed_resolution() {
        let registry = EngineRegistry::with_builtin_engines();
        let cell = EngineCell::new();

        let err = cell
            .get_or_init(&registry, &EngineConfig::for_engine("nonexistent"))
            .unwrap_err();
        assert!(err.is_engine_not_found());
        assert!(!cell.is_initialized());

        let engine = cell
            .get_or_init(&registry, &EngineConfig::for_engine("memory"))
            .unwrap();
        assert_eq!(engine.engine_name(), "memory");
        assert!(cell.is_initialized());
    }

    #[test]
    fn test_cell_factory_error_leaves_cell_empty() {
        let mut registry = EngineRegistry::new();
        registry.register("broken", |_| {
            Err(DbError::Configuration("bad dsn".to_string()))
        });
        let cell = EngineCell::new();

        let err = cell
            .get_or_init(&registry, &EngineConfig::for_engine("broken"))
            .unwrap_err();
        assert!(matches!(err, DbError::Configuration(_)));
        assert!(cell.get().is_none());
    }

    #[test]
    fn test_concurrent_first_calls_construct_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(CallLog::new(), counter.clone());
        let config = EngineConfig::for_engine("memory");
        let cell = EngineCell::new();

        let addresses: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        let engine = cell.get_or_init(&registry, &config).unwrap();
                        engine as *const DbEngine as usize
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_plain_constructor_is_not_shared() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(CallLog::new(), counter.clone());
        let config = EngineConfig::for_engine("memory");

        DbEngine::new(&registry, &config).unwrap();
        DbEngine::new(&registry, &config).unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
