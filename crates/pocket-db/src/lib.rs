//! # pocket-db
//!
//! Offline-capable local store for the PocketAI chat client.
//! Persists messages, conversations, groups, attachments, voice-message
//! metadata, reactions, read receipts, model records and settings in a single
//! SQLite database.
//!
//! ## Layers
//!
//! - [`migrations`] / [`schema`]: versioned, additive schema
//! - [`queries`]: synchronous per-entity queries over a `Connection`
//! - [`snapshot`]: whole-store export and import
//! - [`store`]: the async [`Store`] handle with encryption hooks
//!
//! ## Conventions
//!
//! - WAL mode, busy timeout 5s
//! - All timestamps are Unix epoch milliseconds
//! - Schema version stored in `PRAGMA user_version`

pub mod migrations;
pub mod queries;
pub mod schema;
pub mod snapshot;
pub mod store;

use rusqlite::Connection;
use std::path::Path;

pub use snapshot::{ImportReport, Snapshot};
pub use store::{Location, Store, StoreStats, DECRYPT_FAILED_MARKER};

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 3;

/// Database error types.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("encryption failed: {0}")]
    Encryption(#[from] pocket_crypto::CryptoError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        DbError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Open or create the database at the given path.
///
/// Configures pragmas and runs any pending migrations.
pub fn open(path: &Path) -> Result<Connection> {
    let mut conn = Connection::open(path)?;
    configure(&conn)?;
    migrations::run(&mut conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing).
pub fn open_memory() -> Result<Connection> {
    let mut conn = Connection::open_in_memory()?;
    configure(&conn)?;
    migrations::run(&mut conn)?;
    Ok(conn)
}

/// Configure SQLite pragmas.
fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA busy_timeout = 5000;
         PRAGMA synchronous = NORMAL;
         PRAGMA cache_size = -8000;",
    )?;
    Ok(())
}
