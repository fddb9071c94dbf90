//! Engine registry
//!
//! Maps engine names to the factories that build them. A registry is filled
//! during start-up and then handed to the facade, which only reads from it.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::traits::{Engine, EngineFactory, NamedEngine};

#[derive(Default)]
pub struct EngineRegistry {
    factories: HashMap<String, EngineFactory>,
}

impl EngineRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every engine shipped with this crate
    pub fn with_builtin_engines() -> Self {
        let mut registry = Self::new();
        crate::engines::register_builtin(&mut registry);
        registry
    }

    /// Record `factory` under `name`.
    ///
    /// Registering an existing name replaces the previous factory.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&EngineConfig) -> Result<Box<dyn Engine>> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.insert(name.clone(), Arc::new(factory)).is_some() {
            tracing::debug!(engine = %name, "Replaced registered engine factory");
        } else {
            tracing::debug!(engine = %name, "Registered engine factory");
        }
        self
    }

    /// Register `E` under [`NamedEngine::NAME`]
    pub fn register_engine<E: NamedEngine>(&mut self) -> &mut Self {
        self.register(E::NAME, |config| {
            let engine = E::from_config(config)?;
            Ok(Box::new(engine) as Box<dyn Engine>)
        })
    }

    pub fn lookup(&self, name: &str) -> Option<EngineFactory> {
        self.factories.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered engine names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("engines", &self.names())
            .finish_non_exhaustive()
    }
}
