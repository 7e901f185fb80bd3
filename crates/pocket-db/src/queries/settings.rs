//! Settings query functions.
//!
//! Values are arbitrary JSON, stored as serialized text.

use pocket_types::Setting;
use rusqlite::Connection;
use serde_json::Value;

use crate::{DbError, Result};

/// Get a setting value by key.
pub fn get(conn: &Connection, key: &str) -> Result<Value> {
    let raw: String = conn
        .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| row.get(0))
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("setting '{key}'")),
            other => DbError::Sqlite(other),
        })?;
    Ok(serde_json::from_str(&raw)?)
}

/// Set a setting value.
pub fn set(conn: &Connection, key: &str, value: &Value) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
        rusqlite::params![key, serde_json::to_string(value)?],
    )?;
    Ok(())
}

/// Every setting, ordered by key.
pub fn list_all(conn: &Connection) -> Result<Vec<Setting>> {
    let mut stmt = conn.prepare("SELECT key, value FROM settings ORDER BY key")?;
    let raw = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    raw.into_iter()
        .map(|(key, value)| {
            Ok(Setting {
                key,
                value: serde_json::from_str(&value)?,
            })
        })
        .collect()
}
