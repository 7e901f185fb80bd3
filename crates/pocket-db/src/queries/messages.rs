//! Message query functions.

use pocket_types::{Message, MessageStatus};
use rusqlite::{Connection, OptionalExtension, Row};

use super::text_enum;
use crate::Result;

const COLUMNS: &str = "id, conversation_id, group_id, role, content, timestamp, status,
                       encrypted, sender_id, voice_message_id, file_id";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        group_id: row.get(2)?,
        role: text_enum(3, row.get(3)?)?,
        content: row.get(4)?,
        timestamp: row.get::<_, i64>(5)? as u64,
        status: text_enum(6, row.get(6)?)?,
        encrypted: row.get(7)?,
        sender_id: row.get(8)?,
        voice_message_id: row.get(9)?,
        file_id: row.get(10)?,
    })
}

/// Insert or overwrite a message by id.
pub fn upsert(conn: &Connection, message: &Message) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO messages
         (id, conversation_id, group_id, role, content, timestamp, status,
          encrypted, sender_id, voice_message_id, file_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        rusqlite::params![
            message.id,
            message.conversation_id,
            message.group_id,
            message.role.as_str(),
            message.content,
            message.timestamp as i64,
            message.status.as_str(),
            message.encrypted,
            message.sender_id,
            message.voice_message_id,
            message.file_id,
        ],
    )?;
    Ok(())
}

/// Get a message by id.
pub fn get(conn: &Connection, id: &str) -> Result<Option<Message>> {
    let message = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM messages WHERE id = ?1"),
            [id],
            from_row,
        )
        .optional()?;
    Ok(message)
}

/// All messages in a conversation, oldest first.
pub fn list_by_conversation(conn: &Connection, conversation_id: &str) -> Result<Vec<Message>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM messages WHERE conversation_id = ?1 ORDER BY timestamp, id"
    ))?;
    let rows = stmt
        .query_map([conversation_id], from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// All messages in a given delivery state, oldest first.
pub fn list_by_status(conn: &Connection, status: MessageStatus) -> Result<Vec<Message>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM messages WHERE status = ?1 ORDER BY timestamp, id"
    ))?;
    let rows = stmt
        .query_map([status.as_str()], from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Every message.
pub fn list_all(conn: &Connection) -> Result<Vec<Message>> {
    let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM messages ORDER BY id"))?;
    let rows = stmt
        .query_map([], from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Set the status of a message. Returns whether a row was updated.
pub fn set_status(conn: &Connection, id: &str, status: MessageStatus) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE messages SET status = ?1 WHERE id = ?2",
        rusqlite::params![status.as_str(), id],
    )?;
    Ok(changed > 0)
}

/// Remove every message in a conversation. Returns the number removed.
pub fn remove_by_conversation(conn: &Connection, conversation_id: &str) -> Result<usize> {
    Ok(conn.execute("DELETE FROM messages WHERE conversation_id = ?1", [conversation_id])?)
}
