//! # pocket-types
//!
//! Shared domain types for the PocketAI local store.
//!
//! Every entity is a flat record keyed by a string identifier. Entities never
//! hold references to one another, only identifier fields. Field names
//! serialize in camelCase so snapshots stay readable by the web client.

pub mod attachment;
pub mod conversation;
pub mod message;
pub mod model;
pub mod receipt;

pub use attachment::{StoredFile, VoiceMessage};
pub use conversation::{Conversation, ConversationType, Group};
pub use message::{Message, MessageStatus, Role};
pub use model::{Model, Setting};
pub use receipt::{Reaction, ReadReceipt};

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Error produced when a stored enum column holds an unknown value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> Timestamp {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Returns `value`, or the current time when `value` is zero.
///
/// Zero timestamps are treated as "not set" by every write path.
pub fn or_now(value: Timestamp) -> Timestamp {
    if value == 0 {
        now_millis()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_now_keeps_explicit_value() {
        assert_eq!(or_now(1_700_000_000_000), 1_700_000_000_000);
    }

    #[test]
    fn test_or_now_fills_zero() {
        let before = now_millis();
        let filled = or_now(0);
        assert!(filled >= before);
    }

    #[test]
    #[ignore] // Run manually to generate bindings
    fn export_ts_bindings() {
        use ts_rs::TS;
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../bindings");
        std::fs::create_dir_all(&dir).expect("create bindings dir");
        crate::Message::export_all_to(&dir).expect("export Message");
        crate::Conversation::export_all_to(&dir).expect("export Conversation");
        crate::Group::export_all_to(&dir).expect("export Group");
        crate::StoredFile::export_all_to(&dir).expect("export StoredFile");
        crate::VoiceMessage::export_all_to(&dir).expect("export VoiceMessage");
        crate::Reaction::export_all_to(&dir).expect("export Reaction");
        crate::ReadReceipt::export_all_to(&dir).expect("export ReadReceipt");
        crate::Model::export_all_to(&dir).expect("export Model");
        crate::Setting::export_all_to(&dir).expect("export Setting");
    }
}
