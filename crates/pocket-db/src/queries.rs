//! Database query functions organized by entity.
//!
//! These functions store exactly what they are given. Default filling,
//! validation and encryption belong to [`crate::Store`].

pub mod attachments;
pub mod conversations;
pub mod messages;
pub mod models;
pub mod receipts;
pub mod settings;

use std::str::FromStr;

use pocket_types::ParseEnumError;
use rusqlite::types::Type;

/// Parse a TEXT column into one of the string-backed domain enums.
pub(crate) fn text_enum<T>(idx: usize, value: String) -> rusqlite::Result<T>
where
    T: FromStr<Err = ParseEnumError>,
{
    value
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Count rows in a table.
pub fn count(conn: &rusqlite::Connection, table: &str) -> crate::Result<u64> {
    let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
    Ok(n as u64)
}
