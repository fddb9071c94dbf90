use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, OpenFlags};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Mutex;

use crate::config::EngineConfig;
use crate::error::{DbError, Result};
use crate::traits::{Engine, NamedEngine};

const MEMORY_PATH: &str = ":memory:";

#[derive(Debug, Deserialize)]
struct SqliteSettings {
    #[serde(default = "default_path")]
    path: String,

    #[serde(default = "default_create")]
    create: bool,
}

fn default_path() -> String {
    MEMORY_PATH.to_string()
}

fn default_create() -> bool {
    true
}

/// SQLite engine.
///
/// Configuration keys:
/// - `path`: database file, or `:memory:` (default)
/// - `create`: create the file when missing (default `true`)
///
/// Rows come back as JSON objects keyed by column name. BLOB columns become
/// arrays of byte values; a non-finite REAL fails the query with
/// [`DbError::Execution`] since JSON cannot represent it.
pub struct SqliteEngine {
    conn: Mutex<Connection>,
    path: String,
}

impl SqliteEngine {
    pub fn open(path: &str, create: bool) -> Result<Self> {
        if path.is_empty() {
            return Err(DbError::Configuration("SQLite path not specified".to_string()));
        }

        let opened = if path == MEMORY_PATH {
            Connection::open_in_memory()
        } else if create {
            Connection::open(path)
        } else {
            Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
        };
        let conn = opened.map_err(|e| {
            DbError::Configuration(format!("cannot open SQLite database {}: {}", path, e))
        })?;

        tracing::info!(path = %path, "Opened SQLite database");
        Ok(Self {
            conn: Mutex::new(conn),
            path: path.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl std::fmt::Debug for SqliteEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteEngine")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Engine for SqliteEngine {
    fn execute(&self, query: &str, params: Option<Vec<Value>>) -> Result<Vec<Value>> {
        let bound = params
            .unwrap_or_default()
            .iter()
            .map(json_to_sql)
            .collect::<Result<Vec<_>>>()?;

        let conn = self
            .conn
            .lock()
            .map_err(|_| DbError::Execution("SQLite connection lock poisoned".to_string()))?;
        let mut stmt = conn.prepare(query)?;

        // Statements without result columns (DDL, plain DML) are executed, not queried.
        if stmt.column_count() == 0 {
            let changed = stmt.execute(params_from_iter(bound.iter()))?;
            tracing::debug!(query = %query, changed, "Executed statement");
            return Ok(Vec::new());
        }

        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let mut rows = stmt.query(params_from_iter(bound.iter()))?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            let mut json_row = Map::new();
            for (i, column) in columns.iter().enumerate() {
                json_row.insert(column.clone(), sql_to_json(row.get_ref(i)?)?);
            }
            results.push(Value::Object(json_row));
        }

        tracing::debug!(query = %query, rows = results.len(), "Executed query");
        Ok(results)
    }
}

impl NamedEngine for SqliteEngine {
    const NAME: &'static str = "sqlite";

    fn from_config(config: &EngineConfig) -> Result<Self> {
        let settings: SqliteSettings = config.deserialize()?;
        Self::open(&settings.path, settings.create)
    }
}

fn json_to_sql(value: &Value) -> Result<SqlValue> {
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                SqlValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                SqlValue::Real(f)
            } else {
                return Err(DbError::Execution("Invalid number parameter".to_string()));
            }
        }
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => {
            return Err(DbError::Execution("Unsupported parameter type".to_string()))
        }
    })
}

fn sql_to_json(value: ValueRef<'_>) -> Result<Value> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| DbError::Execution(format!("Non-finite real value {}", f)))?,
        ValueRef::Text(text) => Value::String(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(bytes) => Value::Array(bytes.iter().map(|&b| Value::from(b)).collect()),
    })
}
