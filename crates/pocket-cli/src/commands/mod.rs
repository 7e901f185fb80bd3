//! `pocketctl` command handlers.
//!
//! Each handler returns a JSON value that `main` prints to stdout.

pub mod data;
pub mod messages;

type Result = anyhow::Result<serde_json::Value>;
