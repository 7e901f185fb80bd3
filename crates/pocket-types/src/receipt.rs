//! Reactions and read receipts.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// An emoji reaction. At most one per (message, user).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    /// Assigned by the store on first insert.
    #[serde(default)]
    pub id: String,
    pub message_id: String,
    pub user_id: String,
    pub emoji: String,
    #[serde(default)]
    #[ts(type = "number")]
    pub timestamp: Timestamp,
}

impl Reaction {
    /// Id given to a reaction when it is first stored.
    pub fn synthesized_id(message_id: &str, user_id: &str, timestamp: Timestamp) -> String {
        format!("{}-{}-{timestamp}", id_part(message_id), id_part(user_id))
    }

    pub fn new(
        message_id: impl Into<String>,
        user_id: impl Into<String>,
        emoji: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            message_id: message_id.into(),
            user_id: user_id.into(),
            emoji: emoji.into(),
            timestamp: 0,
        }
    }
}

/// Proof that a user has read a message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceipt {
    /// Empty means "derive from message and user".
    #[serde(default)]
    pub id: String,
    pub message_id: String,
    pub user_id: String,
    pub user_name: String,
    #[serde(default)]
    #[ts(type = "number")]
    pub timestamp: Timestamp,
}

impl ReadReceipt {
    /// Deterministic id so repeated receipts from one reader collapse.
    ///
    /// Distinct (message, user) pairs never share an id, even when the ids
    /// themselves contain the separator.
    pub fn derived_id(message_id: &str, user_id: &str) -> String {
        format!("{}-{}", id_part(message_id), id_part(user_id))
    }
}

/// Escape `\` and `-` so joining parts with `-` stays reversible.
fn id_part(part: &str) -> Cow<'_, str> {
    if !part.contains(['-', '\\']) {
        return Cow::Borrowed(part);
    }
    let mut escaped = String::with_capacity(part.len() + 2);
    for c in part.chars() {
        if c == '-' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_id() {
        assert_eq!(ReadReceipt::derived_id("m1", "u7"), "m1-u7");
    }

    #[test]
    fn test_derived_id_keeps_pairs_apart() {
        let pairs = [
            ("msg-1", "u"),
            ("msg", "1-u"),
            ("msg\\", "-1-u"),
            ("msg\\-1", "u"),
        ];
        let ids: std::collections::HashSet<String> = pairs
            .iter()
            .map(|(m, u)| ReadReceipt::derived_id(m, u))
            .collect();
        assert_eq!(ids.len(), pairs.len());
        assert_eq!(ReadReceipt::derived_id("msg-1", "u"), "msg\\-1-u");
    }

    #[test]
    fn test_synthesized_reaction_id() {
        assert_eq!(Reaction::synthesized_id("m1", "u1", 42), "m1-u1-42");
        assert_ne!(
            Reaction::synthesized_id("m-1", "u", 42),
            Reaction::synthesized_id("m", "1-u", 42)
        );
    }

    #[test]
    fn test_reaction_id_optional_on_input() {
        let json = r#"{"messageId":"m1","userId":"u1","emoji":"👍"}"#;
        let reaction: Reaction = serde_json::from_str(json).expect("parse");
        assert!(reaction.id.is_empty());
        assert_eq!(reaction.timestamp, 0);
    }
}
