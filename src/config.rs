//! Configuration passed to engine factories
//!
//! An [`EngineConfig`] is an opaque key/value mapping. The facade only reads
//! the `engine` key; every other key belongs to the selected engine, which
//! usually deserializes the mapping into its own settings struct.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{DbError, Result};

/// Key naming the engine to resolve from the registry.
pub const ENGINE_KEY: &str = "engine";

/// Prefix for environment variables picked up by [`EngineConfig::load`].
pub const ENV_PREFIX: &str = "DBENGINE";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineConfig {
    values: Map<String, Value>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration selecting the engine registered as `name`
    pub fn for_engine(name: impl Into<String>) -> Self {
        Self::new().with(ENGINE_KEY, name.into())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// The configured engine name.
    ///
    /// A missing key and a non-string value both yield `None`.
    pub fn engine_name(&self) -> Option<&str> {
        self.get_str(ENGINE_KEY)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Deserialize the mapping into an engine-specific settings type.
    ///
    /// Unknown keys (including `engine`) are ignored unless the target type
    /// denies them. Failures are reported as [`DbError::Configuration`].
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.values.clone()))
            .map_err(|e| DbError::Configuration(e.to_string()))
    }

    /// Parse a configuration from a JSON object literal
    pub fn from_json(json: &str) -> Result<Self> {
        let values: Map<String, Value> = serde_json::from_str(json)?;
        Ok(Self { values })
    }

    /// Load a configuration from an optional file plus the environment.
    ///
    /// The file format follows its extension (toml, json, yaml, ...).
    /// Variables such as `DBENGINE_ENGINE=sqlite` or `DBENGINE_CREATE=false`
    /// are layered on top and override file values; their keys are
    /// lowercased and values that look like booleans or numbers are typed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// Same as [`EngineConfig::load`], reading `<prefix>_*` variables instead
    pub fn load_with_prefix(path: Option<&Path>, prefix: &str) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let values: Map<String, Value> = settings.try_deserialize()?;
        Ok(Self { values })
    }
}

impl From<Map<String, Value>> for EngineConfig {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

impl TryFrom<Value> for EngineConfig {
    type Error = DbError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(DbError::Configuration(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }
}
