//! Error types for engine registration, resolution and execution

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// Raised by an engine factory when the configuration is unusable for it.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The configuration names no engine, or one that is not registered.
    #[error("Engine not found: {}", .0.as_deref().unwrap_or("<unset>"))]
    EngineNotFound(Option<String>),

    #[error("Execution error: {0}")]
    Execution(String),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config source error: {0}")]
    ConfigSource(#[from] config::ConfigError),
}

impl DbError {
    pub fn is_engine_not_found(&self) -> bool {
        matches!(self, DbError::EngineNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_not_found_message_names_the_engine() {
        let err = DbError::EngineNotFound(Some("oracle".to_string()));
        assert_eq!(err.to_string(), "Engine not found: oracle");
    }

    #[test]
    fn test_engine_not_found_message_without_name() {
        let err = DbError::EngineNotFound(None);
        assert_eq!(err.to_string(), "Engine not found: <unset>");
        assert!(err.is_engine_not_found());
    }
}
