//! Basic usage example for the db-engine crate
//!
//! Run with `RUST_LOG=debug cargo run --example basic_usage`.
//! Set `DBENGINE_ENGINE=memory` to pick a different engine, or pass a
//! configuration file path as the first argument.

use db_engine::{DbEngine, EngineConfig, EngineRegistry};
use serde_json::json;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    db_engine::init_tracing();

    // Registration phase: every engine is known before the first lookup.
    let registry = EngineRegistry::with_builtin_engines();
    println!("Available engines: {:?}", registry.names());

    let path = std::env::args().nth(1).map(PathBuf::from);
    let mut config = EngineConfig::load(path.as_deref())?;
    if config.engine_name().is_none() {
        config.insert("engine", "sqlite");
    }

    let db = DbEngine::get_instance(&registry, &config)?;
    println!("Using engine: {}", db.engine_name());

    if db.engine_name() == "sqlite" {
        sqlite_example(db)?;
    } else {
        let rows = db.execute("SELECT 1", None)?;
        println!("Rows: {}", serde_json::to_string_pretty(&rows)?);
    }

    // Later calls return the same engine whatever they pass.
    let again = DbEngine::get_instance(&registry, &EngineConfig::for_engine("memory"))?;
    println!("Still using engine: {}", again.engine_name());

    Ok(())
}

fn sqlite_example(db: &DbEngine) -> anyhow::Result<()> {
    db.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT UNIQUE NOT NULL,
            age INTEGER
        )",
        None,
    )?;

    db.execute(
        "INSERT OR IGNORE INTO users (name, email, age) VALUES (?, ?, ?), (?, ?, ?)",
        Some(vec![
            json!("Alice"),
            json!("alice@example.com"),
            json!(30),
            json!("Bob"),
            json!("bob@example.com"),
            json!(25),
        ]),
    )?;

    let users = db.execute("SELECT * FROM users WHERE age > ?", Some(vec![json!(20)]))?;

    println!("\nUsers older than 20:");
    for user in &users {
        println!("{}", serde_json::to_string_pretty(user)?);
    }

    Ok(())
}
