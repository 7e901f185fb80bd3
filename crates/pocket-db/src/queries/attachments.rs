//! File attachment and voice-message query functions.

use pocket_types::{StoredFile, VoiceMessage};
use rand::distributions::Alphanumeric;
use rand::Rng;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::Result;

const FILE_COLUMNS: &str =
    "id, name, mime_type, size, data, thumbnail, message_id, conversation_id, uploaded_at";

/// Generate a fresh attachment id: `file-<epoch ms>-<7 random chars>`.
pub fn new_file_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(7)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("file-{}-{suffix}", pocket_types::now_millis())
}

fn file_from_row(row: &Row<'_>) -> rusqlite::Result<StoredFile> {
    Ok(StoredFile {
        id: row.get(0)?,
        name: row.get(1)?,
        mime_type: row.get(2)?,
        size: row.get::<_, i64>(3)? as u64,
        data: row.get(4)?,
        thumbnail: row.get(5)?,
        message_id: row.get(6)?,
        conversation_id: row.get(7)?,
        uploaded_at: row.get::<_, i64>(8)? as u64,
    })
}

/// Insert or overwrite a file by id.
pub fn upsert_file(conn: &Connection, file: &StoredFile) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT OR REPLACE INTO files ({FILE_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
        ),
        rusqlite::params![
            file.id,
            file.name,
            file.mime_type,
            file.size as i64,
            file.data,
            file.thumbnail,
            file.message_id,
            file.conversation_id,
            file.uploaded_at as i64,
        ],
    )?;
    Ok(())
}

/// Get a file by id.
pub fn get_file(conn: &Connection, id: &str) -> Result<Option<StoredFile>> {
    let file = conn
        .query_row(
            &format!("SELECT {FILE_COLUMNS} FROM files WHERE id = ?1"),
            [id],
            file_from_row,
        )
        .optional()?;
    Ok(file)
}

/// Files attached in a conversation, oldest upload first.
pub fn files_by_conversation(conn: &Connection, conversation_id: &str) -> Result<Vec<StoredFile>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {FILE_COLUMNS} FROM files WHERE conversation_id = ?1 ORDER BY uploaded_at, id"
    ))?;
    let rows = stmt
        .query_map([conversation_id], file_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Every stored file.
pub fn list_files(conn: &Connection) -> Result<Vec<StoredFile>> {
    let mut stmt = conn.prepare(&format!("SELECT {FILE_COLUMNS} FROM files ORDER BY id"))?;
    let rows = stmt
        .query_map([], file_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Voice messages
// ---------------------------------------------------------------------------

fn voice_from_row(row: &Row<'_>) -> rusqlite::Result<VoiceMessage> {
    Ok(VoiceMessage {
        id: row.get(0)?,
        duration: row.get(1)?,
        message_id: row.get(2)?,
        conversation_id: row.get(3)?,
    })
}

/// Insert or overwrite voice-message metadata by id.
pub fn upsert_voice(conn: &Connection, voice: &VoiceMessage) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO voice_messages (id, duration, message_id, conversation_id)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![voice.id, voice.duration, voice.message_id, voice.conversation_id],
    )?;
    Ok(())
}

/// Get voice-message metadata by id.
pub fn get_voice(conn: &Connection, id: &str) -> Result<Option<VoiceMessage>> {
    let voice = conn
        .query_row(
            "SELECT id, duration, message_id, conversation_id FROM voice_messages WHERE id = ?1",
            [id],
            voice_from_row,
        )
        .optional()?;
    Ok(voice)
}

/// Every voice message.
pub fn list_voice(conn: &Connection) -> Result<Vec<VoiceMessage>> {
    let mut stmt = conn
        .prepare("SELECT id, duration, message_id, conversation_id FROM voice_messages ORDER BY id")?;
    let rows = stmt
        .query_map([], voice_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
