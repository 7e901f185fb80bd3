//! SQL schema definitions.
//!
//! Each constant is the DDL introduced by one migration step. Statements use
//! `IF NOT EXISTS` so a step can be replayed against a partially upgraded
//! database without touching existing rows.

/// Initial schema: messages, models and settings.
pub const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    conversation_id TEXT NOT NULL,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    timestamp INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'sent',
    sender_id TEXT
);

CREATE INDEX IF NOT EXISTS idx_messages_conversation ON messages(conversation_id);
CREATE INDEX IF NOT EXISTS idx_messages_timestamp ON messages(timestamp);
CREATE INDEX IF NOT EXISTS idx_messages_status ON messages(status);

CREATE TABLE IF NOT EXISTS models (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    size TEXT NOT NULL DEFAULT '',
    version TEXT NOT NULL DEFAULT '',
    active INTEGER NOT NULL DEFAULT 0,
    downloaded INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_models_active ON models(active);
CREATE INDEX IF NOT EXISTS idx_models_downloaded ON models(downloaded);

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Conversations, groups, attachments, reactions and read receipts.
pub const SCHEMA_V2: &str = r#"
CREATE TABLE IF NOT EXISTS conversations (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    last_updated INTEGER NOT NULL,
    type TEXT NOT NULL DEFAULT 'individual',
    encrypted INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_conversations_type ON conversations(type);
CREATE INDEX IF NOT EXISTS idx_conversations_last_updated ON conversations(last_updated);

CREATE TABLE IF NOT EXISTS groups (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_groups_name ON groups(name);
CREATE INDEX IF NOT EXISTS idx_groups_created_at ON groups(created_at);

CREATE TABLE IF NOT EXISTS files (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    mime_type TEXT NOT NULL,
    size INTEGER NOT NULL,
    data TEXT NOT NULL,
    thumbnail TEXT,
    message_id TEXT NOT NULL,
    conversation_id TEXT NOT NULL,
    uploaded_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_files_conversation ON files(conversation_id);
CREATE INDEX IF NOT EXISTS idx_files_message ON files(message_id);
CREATE INDEX IF NOT EXISTS idx_files_type ON files(mime_type);

CREATE TABLE IF NOT EXISTS voice_messages (
    id TEXT PRIMARY KEY,
    duration REAL NOT NULL,
    message_id TEXT NOT NULL,
    conversation_id TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_voice_conversation ON voice_messages(conversation_id);
CREATE INDEX IF NOT EXISTS idx_voice_message ON voice_messages(message_id);
CREATE INDEX IF NOT EXISTS idx_voice_duration ON voice_messages(duration);

CREATE TABLE IF NOT EXISTS reactions (
    id TEXT PRIMARY KEY,
    message_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    emoji TEXT NOT NULL,
    timestamp INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reactions_message ON reactions(message_id);
CREATE INDEX IF NOT EXISTS idx_reactions_user ON reactions(user_id);

CREATE TABLE IF NOT EXISTS read_receipts (
    id TEXT PRIMARY KEY,
    message_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    user_name TEXT NOT NULL,
    timestamp INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_receipts_message ON read_receipts(message_id);
CREATE INDEX IF NOT EXISTS idx_receipts_user ON read_receipts(user_id);
CREATE INDEX IF NOT EXISTS idx_receipts_timestamp ON read_receipts(timestamp);
"#;

/// Columns added to `messages` in v2, with their declarations.
pub const MESSAGE_COLUMNS_V2: &[(&str, &str)] = &[
    ("group_id", "TEXT"),
    ("encrypted", "INTEGER NOT NULL DEFAULT 0"),
    ("voice_message_id", "TEXT"),
    ("file_id", "TEXT"),
];

/// Indexes added to `messages` in v2. Run after [`MESSAGE_COLUMNS_V2`].
pub const MESSAGE_INDEXES_V2: &str = r#"
CREATE INDEX IF NOT EXISTS idx_messages_encrypted ON messages(encrypted);
CREATE INDEX IF NOT EXISTS idx_messages_group ON messages(group_id);
"#;

/// One reaction per (message, user): keep the newest, then enforce it.
pub const REACTIONS_DEDUP_V3: &str = r#"
DELETE FROM reactions
WHERE EXISTS (
    SELECT 1 FROM reactions AS newer
    WHERE newer.message_id = reactions.message_id
      AND newer.user_id = reactions.user_id
      AND (newer.timestamp > reactions.timestamp
           OR (newer.timestamp = reactions.timestamp AND newer.rowid > reactions.rowid))
)
"#;

pub const REACTIONS_UNIQUE_V3: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS idx_reactions_message_user ON reactions(message_id, user_id);
"#;

/// Logical object stores, as named in exported snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoreName {
    Messages,
    Models,
    Settings,
    Conversations,
    Groups,
    Files,
    VoiceMessages,
    Reactions,
    ReadReceipts,
}

impl StoreName {
    pub const ALL: [StoreName; 9] = [
        StoreName::Messages,
        StoreName::Models,
        StoreName::Settings,
        StoreName::Conversations,
        StoreName::Groups,
        StoreName::Files,
        StoreName::VoiceMessages,
        StoreName::Reactions,
        StoreName::ReadReceipts,
    ];

    /// Snapshot name.
    pub fn as_str(self) -> &'static str {
        match self {
            StoreName::Messages => "messages",
            StoreName::Models => "models",
            StoreName::Settings => "settings",
            StoreName::Conversations => "conversations",
            StoreName::Groups => "groups",
            StoreName::Files => "files",
            StoreName::VoiceMessages => "voiceMessages",
            StoreName::Reactions => "reactions",
            StoreName::ReadReceipts => "readReceipts",
        }
    }

    /// Backing SQLite table.
    pub fn table(self) -> &'static str {
        match self {
            StoreName::VoiceMessages => "voice_messages",
            StoreName::ReadReceipts => "read_receipts",
            other => other.as_str(),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|store| store.as_str() == name)
    }
}
