//! Database migration system.
//!
//! Schema version stored in `PRAGMA user_version`. Migrations are an ordered
//! list of steps, each tagged with the version it upgrades from. Pending steps
//! run one at a time, each in its own transaction together with its version
//! bump. Steps only ever add tables, columns and indexes.

use rusqlite::{Connection, Transaction};

use crate::{schema, DbError, Result, SCHEMA_VERSION};

/// One schema upgrade step.
pub struct Migration {
    /// Version this step upgrades from. It leaves the database at `from + 1`.
    pub from: u32,
    pub description: &'static str,
    pub apply: fn(&Transaction<'_>) -> Result<()>,
}

/// Every migration, ordered by `from`.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        from: 0,
        description: "messages, models and settings",
        apply: migrate_v0_to_v1,
    },
    Migration {
        from: 1,
        description: "conversations, groups, attachments, reactions, read receipts",
        apply: migrate_v1_to_v2,
    },
    Migration {
        from: 2,
        description: "one reaction per user and message",
        apply: migrate_v2_to_v3,
    },
];

/// Read the schema version.
pub fn current_version(conn: &Connection) -> Result<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Run all pending migrations.
pub fn run(conn: &mut Connection) -> Result<()> {
    run_to(conn, SCHEMA_VERSION)
}

/// Run pending migrations up to and including `target`.
pub fn run_to(conn: &mut Connection, target: u32) -> Result<()> {
    let current = current_version(conn)?;

    if current > SCHEMA_VERSION {
        return Err(DbError::Migration(format!(
            "Database version {current} is newer than supported {SCHEMA_VERSION}"
        )));
    }
    if target > SCHEMA_VERSION {
        return Err(DbError::Migration(format!(
            "Unknown target version {target}"
        )));
    }

    for step in MIGRATIONS
        .iter()
        .filter(|m| m.from >= current && m.from < target)
    {
        let next = step.from + 1;
        tracing::info!("Running migration v{} -> v{next}: {}", step.from, step.description);

        let tx = conn.transaction()?;
        (step.apply)(&tx)?;
        tx.pragma_update(None, "user_version", next)?;
        tx.commit()?;
    }

    Ok(())
}

fn migrate_v0_to_v1(tx: &Transaction<'_>) -> Result<()> {
    tx.execute_batch(schema::SCHEMA_V1)?;
    Ok(())
}

fn migrate_v1_to_v2(tx: &Transaction<'_>) -> Result<()> {
    tx.execute_batch(schema::SCHEMA_V2)?;

    for (column, decl) in schema::MESSAGE_COLUMNS_V2 {
        if !has_column(tx, "messages", column)? {
            tx.execute_batch(&format!("ALTER TABLE messages ADD COLUMN {column} {decl};"))?;
        }
    }
    tx.execute_batch(schema::MESSAGE_INDEXES_V2)?;
    Ok(())
}

fn migrate_v2_to_v3(tx: &Transaction<'_>) -> Result<()> {
    let removed = collapse_duplicate_reactions(tx)?;
    if removed > 0 {
        tracing::info!("Removed {removed} superseded reactions before adding the unique index");
    }
    tx.execute_batch(schema::REACTIONS_UNIQUE_V3)?;
    Ok(())
}

/// Keep only the newest reaction per (message, user). Returns rows deleted.
fn collapse_duplicate_reactions(conn: &Connection) -> Result<usize> {
    Ok(conn.execute(schema::REACTIONS_DEDUP_V3, [])?)
}

/// Check whether `table` has a column called `column`.
pub fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(names.iter().any(|name| name == column))
}

/// Check whether an object of `kind` ("table" or "index") named `name` exists.
pub fn has_object(conn: &Connection, kind: &str, name: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = ?1 AND name = ?2",
        [kind, name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
