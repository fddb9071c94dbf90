//! Engines shipped with the crate
//!
//! - `memory`: records every call and answers with canned rows
//! - `sqlite`: rusqlite-backed engine (feature `sqlite`)

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::{CallLog, MemoryEngine, RecordedCall};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteEngine;

use crate::registry::EngineRegistry;

pub(crate) fn register_builtin(registry: &mut EngineRegistry) {
    registry.register_engine::<MemoryEngine>();
    #[cfg(feature = "sqlite")]
    registry.register_engine::<SqliteEngine>();
}
