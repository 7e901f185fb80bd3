//! Reaction and read-receipt query functions.

use pocket_types::{Reaction, ReadReceipt};
use rusqlite::{Connection, OptionalExtension, Row};

use crate::Result;

fn reaction_from_row(row: &Row<'_>) -> rusqlite::Result<Reaction> {
    Ok(Reaction {
        id: row.get(0)?,
        message_id: row.get(1)?,
        user_id: row.get(2)?,
        emoji: row.get(3)?,
        timestamp: row.get::<_, i64>(4)? as u64,
    })
}

/// Record a user's reaction to a message.
///
/// A user holds at most one reaction per message: if one already exists its
/// emoji and timestamp are replaced and its id is kept. Returns the stored row.
/// `reaction.id` is only used when no row exists yet.
pub fn upsert_for_user(conn: &Connection, reaction: &Reaction) -> Result<Reaction> {
    conn.execute(
        "INSERT INTO reactions (id, message_id, user_id, emoji, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(message_id, user_id)
         DO UPDATE SET emoji = excluded.emoji, timestamp = excluded.timestamp",
        rusqlite::params![
            reaction.id,
            reaction.message_id,
            reaction.user_id,
            reaction.emoji,
            reaction.timestamp as i64,
        ],
    )?;
    let stored = conn.query_row(
        "SELECT id, message_id, user_id, emoji, timestamp FROM reactions
         WHERE message_id = ?1 AND user_id = ?2",
        [&reaction.message_id, &reaction.user_id],
        reaction_from_row,
    )?;
    Ok(stored)
}

/// Write a reaction row as-is, displacing any row that shares its id or its
/// (message, user) pair.
pub fn insert_or_replace(conn: &Connection, reaction: &Reaction) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO reactions (id, message_id, user_id, emoji, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            reaction.id,
            reaction.message_id,
            reaction.user_id,
            reaction.emoji,
            reaction.timestamp as i64,
        ],
    )?;
    Ok(())
}

/// Reactions on a message, oldest first.
pub fn reactions_by_message(conn: &Connection, message_id: &str) -> Result<Vec<Reaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, message_id, user_id, emoji, timestamp FROM reactions
         WHERE message_id = ?1 ORDER BY timestamp, id",
    )?;
    let rows = stmt
        .query_map([message_id], reaction_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// A user's reaction on a message, if any.
pub fn reaction_for_user(
    conn: &Connection,
    message_id: &str,
    user_id: &str,
) -> Result<Option<Reaction>> {
    let reaction = conn
        .query_row(
            "SELECT id, message_id, user_id, emoji, timestamp FROM reactions
             WHERE message_id = ?1 AND user_id = ?2",
            [message_id, user_id],
            reaction_from_row,
        )
        .optional()?;
    Ok(reaction)
}

/// Every reaction.
pub fn list_reactions(conn: &Connection) -> Result<Vec<Reaction>> {
    let mut stmt =
        conn.prepare("SELECT id, message_id, user_id, emoji, timestamp FROM reactions ORDER BY id")?;
    let rows = stmt
        .query_map([], reaction_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Remove a user's reaction on a message. Returns whether it existed.
pub fn remove_reaction(conn: &Connection, message_id: &str, user_id: &str) -> Result<bool> {
    let removed = conn.execute(
        "DELETE FROM reactions WHERE message_id = ?1 AND user_id = ?2",
        [message_id, user_id],
    )?;
    Ok(removed > 0)
}

// ---------------------------------------------------------------------------
// Read receipts
// ---------------------------------------------------------------------------

fn receipt_from_row(row: &Row<'_>) -> rusqlite::Result<ReadReceipt> {
    Ok(ReadReceipt {
        id: row.get(0)?,
        message_id: row.get(1)?,
        user_id: row.get(2)?,
        user_name: row.get(3)?,
        timestamp: row.get::<_, i64>(4)? as u64,
    })
}

/// Insert or overwrite a read receipt by id.
pub fn upsert_receipt(conn: &Connection, receipt: &ReadReceipt) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO read_receipts (id, message_id, user_id, user_name, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            receipt.id,
            receipt.message_id,
            receipt.user_id,
            receipt.user_name,
            receipt.timestamp as i64,
        ],
    )?;
    Ok(())
}

/// Read receipts on a message, earliest read first.
pub fn receipts_by_message(conn: &Connection, message_id: &str) -> Result<Vec<ReadReceipt>> {
    let mut stmt = conn.prepare(
        "SELECT id, message_id, user_id, user_name, timestamp FROM read_receipts
         WHERE message_id = ?1 ORDER BY timestamp, id",
    )?;
    let rows = stmt
        .query_map([message_id], receipt_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Every read receipt.
pub fn list_receipts(conn: &Connection) -> Result<Vec<ReadReceipt>> {
    let mut stmt = conn.prepare(
        "SELECT id, message_id, user_id, user_name, timestamp FROM read_receipts ORDER BY id",
    )?;
    let rows = stmt
        .query_map([], receipt_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
