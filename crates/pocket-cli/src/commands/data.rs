//! Whole-store commands: info, export, import, clear.

use std::path::Path;

use anyhow::Context;
use pocket_crypto::Keyring;
use pocket_db::{Location, Snapshot, Store};
use serde_json::json;
use tracing::info;

use super::Result;

/// Schema version, record counts and identity summary.
pub async fn info(store: &Store, keyring: &Keyring) -> Result {
    let stats = store.stats().await?;
    let location = match store.location() {
        Location::Memory => "memory".to_string(),
        Location::File(path) => path.display().to_string(),
    };
    Ok(json!({
        "database": location,
        "schema_version": stats.schema_version,
        "counts": stats.counts,
        "identity": {
            "local_id": keyring.local_id(),
            "public_key": keyring.public_key().to_hex(),
            "fingerprint": keyring.fingerprint(),
        },
    }))
}

/// Write a snapshot of every store to `path`.
pub async fn export(store: &Store, path: &Path) -> Result {
    let snapshot = store.export_data().await?;
    std::fs::write(path, snapshot.to_json()?)
        .with_context(|| format!("writing {}", path.display()))?;
    info!("Exported {} records to {}", snapshot.len(), path.display());
    Ok(json!({
        "file": path.display().to_string(),
        "records": snapshot.len(),
    }))
}

/// Replace stores with the contents of a snapshot file.
pub async fn import(store: &Store, path: &Path) -> Result {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let snapshot = Snapshot::from_json(&content)?;
    let report = store.import_data(&snapshot).await?;
    Ok(json!({
        "imported": report.imported,
        "skipped": report.skipped,
    }))
}

/// Empty every store. Requires explicit confirmation.
pub async fn clear(store: &Store, confirmed: bool) -> Result {
    if !confirmed {
        anyhow::bail!("refusing to clear the database without --yes");
    }
    store.clear_database().await?;
    Ok(json!({"cleared": true}))
}
