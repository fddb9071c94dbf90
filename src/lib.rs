//! Pluggable database engines behind a single facade.
//!
//! Engines register a factory under a name in an [`EngineRegistry`]. The
//! [`DbEngine`] facade reads the `engine` key of an [`EngineConfig`], builds
//! that engine once, and forwards every query to it.
//!
//! ```no_run
//! use db_engine::{DbEngine, EngineConfig, EngineRegistry};
//!
//! let registry = EngineRegistry::with_builtin_engines();
//! let config = EngineConfig::for_engine("sqlite").with("path", "app.db");
//! let db = DbEngine::get_instance(&registry, &config)?;
//! let rows = db.execute("SELECT 1 AS one", None)?;
//! # Ok::<(), db_engine::DbError>(())
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod engines;
mod error;
mod facade;
pub mod registry;
pub mod traits;

pub use config::EngineConfig;
pub use error::{DbError, Result};
pub use facade::{DbEngine, EngineCell};
pub use registry::EngineRegistry;
pub use traits::{Engine, EngineFactory, NamedEngine};

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing if a global subscriber is already set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
