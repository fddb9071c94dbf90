//! In-memory engine that records the queries it receives

use serde::Deserialize;
use serde_json::Value;
use std::sync::{Arc, Mutex};

use crate::config::EngineConfig;
use crate::error::{DbError, Result};
use crate::traits::{Engine, NamedEngine};

/// One `execute` call as the engine received it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub query: String,
    pub params: Option<Vec<Value>>,
}

/// Shared, cloneable record of the calls made against a [`MemoryEngine`].
///
/// Keep a clone before handing the engine to a registry factory to inspect
/// the calls later.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every call recorded so far, oldest first
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record(&self, call: RecordedCall) -> Result<()> {
        self.calls
            .lock()
            .map_err(|_| DbError::Execution("memory engine call log poisoned".to_string()))?
            .push(call);
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct MemorySettings {
    #[serde(default)]
    rows: Vec<Value>,
}

/// Engine answering every query with the same rows.
///
/// Configuration keys:
/// - `rows`: JSON array returned by each `execute` call (default `[]`)
///
/// Every call is kept in the [`CallLog`] for the life of the engine and the
/// log is never trimmed. Meant for tests and demos, not long-running use.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    rows: Vec<Value>,
    log: CallLog,
}

impl MemoryEngine {
    pub fn new(rows: Vec<Value>) -> Self {
        Self {
            rows,
            log: CallLog::new(),
        }
    }

    /// Build from `config`, recording calls into `log`
    pub fn with_log(config: &EngineConfig, log: CallLog) -> Result<Self> {
        let settings: MemorySettings = config.deserialize()?;
        Ok(Self {
            rows: settings.rows,
            log,
        })
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }
}

impl Engine for MemoryEngine {
    fn execute(&self, query: &str, params: Option<Vec<Value>>) -> Result<Vec<Value>> {
        self.log.record(RecordedCall {
            query: query.to_string(),
            params,
        })?;
        Ok(self.rows.clone())
    }
}

impl NamedEngine for MemoryEngine {
    const NAME: &'static str = "memory";

    fn from_config(config: &EngineConfig) -> Result<Self> {
        Self::with_log(config, CallLog::new())
    }
}
