//! Conversations and groups.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ParseEnumError, Timestamp};

/// A conversation thread.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    /// Zero means "now" on write.
    #[serde(default)]
    #[ts(type = "number")]
    pub last_updated: Timestamp,
    #[serde(rename = "type", default)]
    pub conversation_type: ConversationType,
    #[serde(default)]
    pub encrypted: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ConversationType {
    #[default]
    Individual,
    Group,
}

impl ConversationType {
    pub fn as_str(self) -> &'static str {
        match self {
            ConversationType::Individual => "individual",
            ConversationType::Group => "group",
        }
    }
}

impl FromStr for ConversationType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "individual" => Ok(ConversationType::Individual),
            "group" => Ok(ConversationType::Group),
            other => Err(ParseEnumError {
                kind: "conversation type",
                value: other.to_string(),
            }),
        }
    }
}

/// A chat group. Membership lives outside the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    #[ts(type = "number")]
    pub created_at: Timestamp,
}
