//! On-device model records and key/value settings.

use serde::{Deserialize, Serialize};

/// An on-device language model known to the app.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Human-readable download size, e.g. "560 MB".
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub downloaded: bool,
}

/// A key/value setting. Values are arbitrary JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct Setting {
    pub key: String,
    #[ts(type = "unknown")]
    pub value: serde_json::Value,
}
