//! Traits every database engine implements

use serde_json::Value;
use std::sync::Arc;

use crate::config::EngineConfig;

/// Capability contract for a database backend.
///
/// Engines are shared behind the facade, so they must guard their own
/// mutable state.
pub trait Engine: Send + Sync {
    /// Run `query` with optional positional `params` and return the result rows.
    ///
    /// Errors are engine-specific and are handed to the caller untouched.
    fn execute(&self, query: &str, params: Option<Vec<Value>>) -> crate::Result<Vec<Value>>;
}

/// Builds an engine from a configuration.
pub type EngineFactory =
    Arc<dyn Fn(&EngineConfig) -> crate::Result<Box<dyn Engine>> + Send + Sync>;

/// An engine that knows the name it registers under
pub trait NamedEngine: Engine + Sized + 'static {
    const NAME: &'static str;

    fn from_config(config: &EngineConfig) -> crate::Result<Self>;
}
