//! Conversation and group query functions.

use pocket_types::{Conversation, Group};
use rusqlite::{Connection, OptionalExtension, Row};

use super::text_enum;
use crate::Result;

fn conversation_from_row(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        title: row.get(1)?,
        last_updated: row.get::<_, i64>(2)? as u64,
        conversation_type: text_enum(3, row.get(3)?)?,
        encrypted: row.get(4)?,
    })
}

/// Insert or overwrite a conversation by id.
pub fn upsert(conn: &Connection, conversation: &Conversation) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO conversations (id, title, last_updated, type, encrypted)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            conversation.id,
            conversation.title,
            conversation.last_updated as i64,
            conversation.conversation_type.as_str(),
            conversation.encrypted,
        ],
    )?;
    Ok(())
}

/// Get a conversation by id.
pub fn get(conn: &Connection, id: &str) -> Result<Option<Conversation>> {
    let conversation = conn
        .query_row(
            "SELECT id, title, last_updated, type, encrypted FROM conversations WHERE id = ?1",
            [id],
            conversation_from_row,
        )
        .optional()?;
    Ok(conversation)
}

/// All conversations, most recently updated first.
pub fn list(conn: &Connection) -> Result<Vec<Conversation>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, last_updated, type, encrypted FROM conversations
         ORDER BY last_updated DESC, id",
    )?;
    let rows = stmt
        .query_map([], conversation_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Remove a conversation row. Returns whether it existed.
pub fn remove(conn: &Connection, id: &str) -> Result<bool> {
    Ok(conn.execute("DELETE FROM conversations WHERE id = ?1", [id])? > 0)
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

/// Insert or overwrite a group by id.
pub fn upsert_group(conn: &Connection, group: &Group) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO groups (id, name, created_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![group.id, group.name, group.created_at as i64],
    )?;
    Ok(())
}

/// All groups, oldest first.
pub fn list_groups(conn: &Connection) -> Result<Vec<Group>> {
    let mut stmt = conn.prepare("SELECT id, name, created_at FROM groups ORDER BY created_at, id")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Group {
                id: row.get(0)?,
                name: row.get(1)?,
                created_at: row.get::<_, i64>(2)? as u64,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
