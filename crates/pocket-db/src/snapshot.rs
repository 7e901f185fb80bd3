//! Whole-store export and import.
//!
//! A [`Snapshot`] maps each store name to every record in it, as JSON objects
//! with camelCase field names. Export reads each store in its own transaction.
//! Import replaces each named store in its own transaction, so a failure in one
//! store leaves it untouched while earlier stores stay replaced.

use std::collections::BTreeMap;

use rusqlite::{Connection, Transaction};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::queries::{attachments, conversations, messages, models, receipts, settings};
use crate::schema::StoreName;
use crate::{DbError, Result};

/// Every record of every store, keyed by store name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    pub stores: BTreeMap<String, Vec<Value>>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Records of one store, empty if the store is absent.
    pub fn records(&self, store: StoreName) -> &[Value] {
        self.stores
            .get(store.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total record count across stores.
    pub fn len(&self) -> usize {
        self.stores.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of an import.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Records written per store.
    pub imported: BTreeMap<String, usize>,
    /// Store names in the snapshot that the schema does not know.
    pub skipped: Vec<String>,
}

/// Read every store.
pub fn export(conn: &mut Connection) -> Result<Snapshot> {
    let mut snapshot = Snapshot::default();
    for store in StoreName::ALL {
        let tx = conn.transaction()?;
        let records = export_store(&tx, store)?;
        tx.commit()?;
        tracing::debug!("Exported {} records from {}", records.len(), store.as_str());
        snapshot.stores.insert(store.as_str().to_string(), records);
    }
    Ok(snapshot)
}

fn export_store(conn: &Connection, store: StoreName) -> Result<Vec<Value>> {
    let values = match store {
        StoreName::Messages => to_values(messages::list_all(conn)?)?,
        StoreName::Models => to_values(models::list(conn)?)?,
        StoreName::Settings => to_values(settings::list_all(conn)?)?,
        StoreName::Conversations => to_values(conversations::list(conn)?)?,
        StoreName::Groups => to_values(conversations::list_groups(conn)?)?,
        StoreName::Files => to_values(attachments::list_files(conn)?)?,
        StoreName::VoiceMessages => to_values(attachments::list_voice(conn)?)?,
        StoreName::Reactions => to_values(receipts::list_reactions(conn)?)?,
        StoreName::ReadReceipts => to_values(receipts::list_receipts(conn)?)?,
    };
    Ok(values)
}

fn to_values<T: Serialize>(records: Vec<T>) -> Result<Vec<Value>> {
    records
        .iter()
        .map(|r| serde_json::to_value(r).map_err(DbError::from))
        .collect()
}

/// Replace each store named in the snapshot with its records.
///
/// Records are written as-is: message content is not re-encrypted and
/// timestamps are not defaulted.
pub fn import(conn: &mut Connection, snapshot: &Snapshot) -> Result<ImportReport> {
    let mut report = ImportReport::default();

    for (name, records) in &snapshot.stores {
        let Some(store) = StoreName::from_name(name) else {
            tracing::warn!("Skipping unknown store '{name}' in import");
            report.skipped.push(name.clone());
            continue;
        };

        let tx = conn.transaction()?;
        clear_store(&tx, store)?;
        for value in records {
            import_record(&tx, store, value)?;
        }
        tx.commit()?;

        tracing::info!("Imported {} records into {name}", records.len());
        report.imported.insert(name.clone(), records.len());
    }

    Ok(report)
}

fn import_record(tx: &Transaction<'_>, store: StoreName, value: &Value) -> Result<()> {
    match store {
        StoreName::Messages => messages::upsert(tx, &record(store, value)?),
        StoreName::Models => models::upsert(tx, &record(store, value)?),
        StoreName::Settings => {
            let setting: pocket_types::Setting = record(store, value)?;
            settings::set(tx, &setting.key, &setting.value)
        }
        StoreName::Conversations => conversations::upsert(tx, &record(store, value)?),
        StoreName::Groups => conversations::upsert_group(tx, &record(store, value)?),
        StoreName::Files => attachments::upsert_file(tx, &record(store, value)?),
        StoreName::VoiceMessages => attachments::upsert_voice(tx, &record(store, value)?),
        StoreName::Reactions => receipts::insert_or_replace(tx, &record(store, value)?),
        StoreName::ReadReceipts => receipts::upsert_receipt(tx, &record(store, value)?),
    }
}

fn record<T: DeserializeOwned>(store: StoreName, value: &Value) -> Result<T> {
    T::deserialize(value)
        .map_err(|e| DbError::Serialization(format!("{} record: {e}", store.as_str())))
}

fn clear_store(conn: &Connection, store: StoreName) -> Result<()> {
    conn.execute(&format!("DELETE FROM {}", store.table()), [])?;
    Ok(())
}

/// Empty every store in one transaction.
pub fn clear_all(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    for store in StoreName::ALL {
        clear_store(&tx, store)?;
    }
    tx.commit()?;
    Ok(())
}
