//! Async store handle.
//!
//! A [`Store`] owns one SQLite connection behind a `tokio::sync::Mutex`. The
//! connection is opened lazily on first use and cached in the handle; clones
//! share it. If opening fails, every operation reports
//! [`DbError::Unavailable`] and the next operation tries again.
//!
//! Message content flagged `encrypted` is sealed through the injected
//! [`EncryptionProvider`] on write and opened on read. Read-side failures never
//! fail the read: the content is replaced by [`DECRYPT_FAILED_MARKER`].

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use pocket_crypto::EncryptionProvider;
use pocket_types::{
    now_millis, or_now, Conversation, Group, Message, MessageStatus, Model, Reaction, ReadReceipt,
    StoredFile, VoiceMessage,
};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard, OnceCell};

use crate::queries::{self, attachments, conversations, messages, models, receipts, settings};
use crate::schema::StoreName;
use crate::snapshot::{self, ImportReport, Snapshot};
use crate::{migrations, DbError, Result};

/// Content shown in place of an encrypted message that cannot be opened.
pub const DECRYPT_FAILED_MARKER: &str = "⚠️ Encrypted message (unable to decrypt)";

/// Where the database lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Location {
    /// Private in-memory database, gone when the last handle drops.
    Memory,
    File(PathBuf),
}

impl Location {
    fn open(&self) -> Result<Connection> {
        let opened = match self {
            Location::Memory => crate::open_memory(),
            Location::File(path) => crate::open(path),
        };
        opened.map_err(|e| match e {
            DbError::Migration(_) => e,
            other => DbError::Unavailable(other.to_string()),
        })
    }
}

/// Schema version and record count per store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub schema_version: u32,
    pub counts: BTreeMap<String, u64>,
}

/// Handle to the local structured store.
#[derive(Clone)]
pub struct Store {
    location: Location,
    conn: Arc<OnceCell<Mutex<Connection>>>,
    crypto: Arc<dyn EncryptionProvider>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("location", &self.location)
            .field("connected", &self.conn.initialized())
            .finish()
    }
}

impl Store {
    /// Create a handle. Nothing is opened until the first operation.
    pub fn open(location: Location, crypto: Arc<dyn EncryptionProvider>) -> Self {
        Self {
            location,
            conn: Arc::new(OnceCell::new()),
            crypto,
        }
    }

    /// Create a handle over a private in-memory database.
    pub fn in_memory(crypto: Arc<dyn EncryptionProvider>) -> Self {
        Self::open(Location::Memory, crypto)
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    async fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        let cell = self
            .conn
            .get_or_try_init(|| async {
                let conn = self.location.open()?;
                tracing::info!("Opened store at {:?}", self.location);
                Ok::<_, DbError>(Mutex::new(conn))
            })
            .await?;
        Ok(cell.lock().await)
    }

    // -----------------------------------------------------------------------
    // Messages
    // -----------------------------------------------------------------------

    /// All messages in a conversation, oldest first, with encrypted content
    /// opened.
    pub async fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let stored = {
            let conn = self.conn().await?;
            messages::list_by_conversation(&conn, conversation_id)?
        };
        Ok(stored.into_iter().map(|m| self.reveal(m)).collect())
    }

    /// One message by id, with encrypted content opened.
    pub async fn get_message(&self, id: &str) -> Result<Option<Message>> {
        let stored = {
            let conn = self.conn().await?;
            messages::get(&conn, id)?
        };
        Ok(stored.map(|m| self.reveal(m)))
    }

    /// Store a message as given, filling timestamp when unset.
    ///
    /// Content is written verbatim. A message flagged `encrypted` must carry a
    /// `sender_id`, since that is the only way to open it again.
    pub async fn save_message(&self, mut message: Message) -> Result<Message> {
        if message.encrypted && message.sender_id.is_none() {
            return Err(DbError::Constraint(format!(
                "encrypted message {} has no sender id",
                message.id
            )));
        }
        message.timestamp = or_now(message.timestamp);

        let conn = self.conn().await?;
        messages::upsert(&conn, &message)?;
        tracing::debug!("Saved message {} in {}", message.id, message.conversation_id);
        Ok(message)
    }

    /// Encrypt `content` for `recipient_id` and store the message.
    ///
    /// Returns the message as stored, content being the ciphertext. Nothing is
    /// written if encryption fails.
    pub async fn save_encrypted_message(
        &self,
        mut message: Message,
        recipient_id: &str,
    ) -> Result<Message> {
        if message.sender_id.is_none() {
            return Err(DbError::Constraint(format!(
                "encrypted message {} has no sender id",
                message.id
            )));
        }
        message.content = self.crypto.encrypt(&message.content, recipient_id)?;
        message.encrypted = true;
        self.save_message(message).await
    }

    /// Store a message for later delivery: status `pending`, timestamp now.
    pub async fn queue_message_for_sync(&self, mut message: Message) -> Result<Message> {
        message.status = MessageStatus::Pending;
        message.timestamp = now_millis();
        self.save_message(message).await
    }

    /// Messages waiting for delivery. Content is returned as stored, so
    /// encrypted messages stay sealed for transport.
    pub async fn get_pending_messages(&self) -> Result<Vec<Message>> {
        let conn = self.conn().await?;
        messages::list_by_status(&conn, MessageStatus::Pending)
    }

    /// Change the delivery status of an existing message.
    pub async fn update_message_status(&self, id: &str, status: MessageStatus) -> Result<()> {
        let mut conn = self.conn().await?;
        let tx = conn.transaction()?;
        if messages::get(&tx, id)?.is_none() {
            return Err(DbError::NotFound(format!("message '{id}'")));
        }
        messages::set_status(&tx, id, status)?;
        tx.commit()?;
        tracing::debug!("Message {id} is now {status}");
        Ok(())
    }

    fn reveal(&self, mut message: Message) -> Message {
        if !message.encrypted {
            return message;
        }
        let opened = match message.sender_id.as_deref() {
            Some(sender) => self
                .crypto
                .decrypt(&message.content, sender)
                .map_err(|e| e.to_string()),
            None => Err("no sender id".to_string()),
        };
        match opened {
            Ok(plaintext) => message.content = plaintext,
            Err(reason) => {
                tracing::warn!("Failed to decrypt message {}: {reason}", message.id);
                message.content = DECRYPT_FAILED_MARKER.to_string();
            }
        }
        message
    }

    // -----------------------------------------------------------------------
    // Conversations & groups
    // -----------------------------------------------------------------------

    pub async fn save_conversation(&self, mut conversation: Conversation) -> Result<Conversation> {
        conversation.last_updated = or_now(conversation.last_updated);
        let conn = self.conn().await?;
        conversations::upsert(&conn, &conversation)?;
        tracing::debug!("Saved conversation {}", conversation.id);
        Ok(conversation)
    }

    /// All conversations, most recently updated first.
    pub async fn get_conversations(&self) -> Result<Vec<Conversation>> {
        let conn = self.conn().await?;
        conversations::list(&conn)
    }

    pub async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>> {
        let conn = self.conn().await?;
        conversations::get(&conn, id)
    }

    /// Delete a conversation and every message in it, atomically.
    pub async fn delete_conversation(&self, id: &str) -> Result<()> {
        let mut conn = self.conn().await?;
        let tx = conn.transaction()?;
        conversations::remove(&tx, id)?;
        let removed = messages::remove_by_conversation(&tx, id)?;
        tx.commit()?;
        tracing::info!("Deleted conversation {id} and {removed} messages");
        Ok(())
    }

    pub async fn save_group(&self, mut group: Group) -> Result<Group> {
        group.created_at = or_now(group.created_at);
        let conn = self.conn().await?;
        conversations::upsert_group(&conn, &group)?;
        Ok(group)
    }

    pub async fn get_groups(&self) -> Result<Vec<Group>> {
        let conn = self.conn().await?;
        conversations::list_groups(&conn)
    }

    // -----------------------------------------------------------------------
    // Attachments
    // -----------------------------------------------------------------------

    /// Validate and store an attachment. An empty id is replaced by a fresh
    /// one.
    pub async fn save_file(&self, mut file: StoredFile) -> Result<StoredFile> {
        file.validate()
            .map_err(|e| DbError::Constraint(e.to_string()))?;
        if file.id.is_empty() {
            file.id = attachments::new_file_id();
        }
        file.uploaded_at = or_now(file.uploaded_at);

        let conn = self.conn().await?;
        attachments::upsert_file(&conn, &file)?;
        tracing::debug!("Saved file {} ({} bytes)", file.id, file.size);
        Ok(file)
    }

    pub async fn get_file(&self, id: &str) -> Result<Option<StoredFile>> {
        let conn = self.conn().await?;
        attachments::get_file(&conn, id)
    }

    pub async fn get_files_by_conversation(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<StoredFile>> {
        let conn = self.conn().await?;
        attachments::files_by_conversation(&conn, conversation_id)
    }

    pub async fn save_voice_message(&self, voice: VoiceMessage) -> Result<VoiceMessage> {
        let conn = self.conn().await?;
        attachments::upsert_voice(&conn, &voice)?;
        Ok(voice)
    }

    pub async fn get_voice_message(&self, id: &str) -> Result<Option<VoiceMessage>> {
        let conn = self.conn().await?;
        attachments::get_voice(&conn, id)
    }

    // -----------------------------------------------------------------------
    // Reactions & read receipts
    // -----------------------------------------------------------------------

    /// Record a reaction stamped with the current time. A user's earlier
    /// reaction on the same message is replaced in place and keeps its id;
    /// otherwise a fresh id is synthesized. Any id on the input is ignored.
    pub async fn save_reaction(&self, mut reaction: Reaction) -> Result<Reaction> {
        reaction.timestamp = now_millis();
        reaction.id =
            Reaction::synthesized_id(&reaction.message_id, &reaction.user_id, reaction.timestamp);

        let mut conn = self.conn().await?;
        let tx = conn.transaction()?;
        let stored = receipts::upsert_for_user(&tx, &reaction)?;
        tx.commit()?;
        tracing::debug!("Reaction {} on {} by {}", stored.emoji, stored.message_id, stored.user_id);
        Ok(stored)
    }

    pub async fn get_reactions_by_message(&self, message_id: &str) -> Result<Vec<Reaction>> {
        let conn = self.conn().await?;
        receipts::reactions_by_message(&conn, message_id)
    }

    /// Remove a user's reaction. Returns whether one existed.
    pub async fn remove_reaction(&self, message_id: &str, user_id: &str) -> Result<bool> {
        let conn = self.conn().await?;
        receipts::remove_reaction(&conn, message_id, user_id)
    }

    /// Record that a user has read a message. Repeated receipts from the same
    /// reader overwrite each other.
    pub async fn save_read_receipt(&self, mut receipt: ReadReceipt) -> Result<ReadReceipt> {
        if receipt.id.is_empty() {
            receipt.id = ReadReceipt::derived_id(&receipt.message_id, &receipt.user_id);
        }
        receipt.timestamp = or_now(receipt.timestamp);

        let conn = self.conn().await?;
        receipts::upsert_receipt(&conn, &receipt)?;
        Ok(receipt)
    }

    pub async fn get_read_receipts_by_message(&self, message_id: &str) -> Result<Vec<ReadReceipt>> {
        let conn = self.conn().await?;
        receipts::receipts_by_message(&conn, message_id)
    }

    // -----------------------------------------------------------------------
    // Models & settings
    // -----------------------------------------------------------------------

    /// Store a model record. Saving an active model deactivates the others.
    pub async fn save_model(&self, model: Model) -> Result<Model> {
        let mut conn = self.conn().await?;
        let tx = conn.transaction()?;
        if model.active {
            models::deactivate_others(&tx, &model.id)?;
        }
        models::upsert(&tx, &model)?;
        tx.commit()?;
        Ok(model)
    }

    pub async fn get_models(&self) -> Result<Vec<Model>> {
        let conn = self.conn().await?;
        models::list(&conn)
    }

    pub async fn get_active_model(&self) -> Result<Option<Model>> {
        let conn = self.conn().await?;
        models::get_active(&conn)
    }

    /// Setting value, or `None` when unset.
    pub async fn get_setting(&self, key: &str) -> Result<Option<Value>> {
        let conn = self.conn().await?;
        match settings::get(&conn, key) {
            Ok(value) => Ok(Some(value)),
            Err(DbError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Setting value decoded into `T`, or `None` when unset.
    pub async fn get_setting_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_setting(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn save_setting(&self, key: &str, value: Value) -> Result<()> {
        let conn = self.conn().await?;
        settings::set(&conn, key, &value)
    }

    // -----------------------------------------------------------------------
    // Whole store
    // -----------------------------------------------------------------------

    /// Every record of every store.
    pub async fn export_data(&self) -> Result<Snapshot> {
        let mut conn = self.conn().await?;
        snapshot::export(&mut conn)
    }

    /// Replace each store named in `snapshot` with its records.
    pub async fn import_data(&self, snapshot: &Snapshot) -> Result<ImportReport> {
        let mut conn = self.conn().await?;
        snapshot::import(&mut conn, snapshot)
    }

    /// Empty every store.
    pub async fn clear_database(&self) -> Result<()> {
        let mut conn = self.conn().await?;
        snapshot::clear_all(&mut conn)?;
        tracing::info!("Cleared every store");
        Ok(())
    }

    pub async fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn().await?;
        let mut counts = BTreeMap::new();
        for store in StoreName::ALL {
            counts.insert(store.as_str().to_string(), queries::count(&conn, store.table())?);
        }
        Ok(StoreStats {
            schema_version: migrations::current_version(&conn)?,
            counts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocket_crypto::{CryptoError, Keyring};
    use pocket_types::{ConversationType, Role};
    use serde_json::json;

    struct BrokenProvider;

    impl EncryptionProvider for BrokenProvider {
        fn encrypt(&self, _: &str, recipient_id: &str) -> pocket_crypto::Result<String> {
            Err(CryptoError::UnknownPeer(recipient_id.to_string()))
        }

        fn decrypt(&self, _: &str, sender_id: &str) -> pocket_crypto::Result<String> {
            Err(CryptoError::UnknownPeer(sender_id.to_string()))
        }
    }

    fn keyring_store() -> Store {
        Store::in_memory(Arc::new(Keyring::generate("me")))
    }

    fn message(id: &str, conversation: &str) -> Message {
        Message::new(id, conversation, Role::User, format!("hello from {id}"))
    }

    fn conversation(id: &str) -> Conversation {
        Conversation {
            id: id.into(),
            title: format!("Chat {id}"),
            last_updated: 0,
            conversation_type: ConversationType::Individual,
            encrypted: false,
        }
    }

    #[tokio::test]
    async fn test_plaintext_roundtrip_keeps_fields() {
        let store = keyring_store();
        let mut m = message("m1", "c1");
        m.timestamp = 1_700_000_000_000;
        m.status = MessageStatus::Offline;
        m.group_id = Some("g1".into());
        m.voice_message_id = Some("v1".into());
        store.save_message(m.clone()).await.expect("save");

        let got = store.get_messages("c1").await.expect("get");
        assert_eq!(got, vec![m]);
    }

    #[tokio::test]
    async fn test_save_fills_timestamp() {
        let store = keyring_store();
        let before = now_millis();
        let saved = store.save_message(message("m1", "c1")).await.expect("save");
        assert!(saved.timestamp >= before);
        assert_eq!(saved.status, MessageStatus::Sent);
    }

    #[tokio::test]
    async fn test_encrypted_roundtrip() {
        let store = keyring_store();
        let m = message("m1", "c1").with_sender("me");
        let stored = store.save_encrypted_message(m, "me").await.expect("save");
        assert!(stored.encrypted);
        assert_ne!(stored.content, "hello from m1");

        let got = store.get_messages("c1").await.expect("get");
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].content, "hello from m1");
        assert!(got[0].encrypted);
    }

    #[tokio::test]
    async fn test_sender_reads_own_message_to_peer() {
        let mut keys = Keyring::generate("me");
        keys.add_peer("bob", Keyring::generate("bob").public_key());
        let store = Store::in_memory(Arc::new(keys));

        let mut m = message("m1", "c1").with_sender("me");
        m.content = "see you at noon".into();
        let stored = store.save_encrypted_message(m, "bob").await.expect("save");
        assert!(!stored.content.contains("noon"));

        let got = store.get_message("m1").await.expect("get").expect("present");
        assert_eq!(got.content, "see you at noon");
        assert_eq!(store.get_messages("c1").await.expect("list")[0].content, "see you at noon");
    }

    #[tokio::test]
    async fn test_decrypt_failure_yields_marker() {
        let store = keyring_store();
        let mut forged = message("m1", "c1").with_sender("me");
        forged.encrypted = true;
        forged.content = "bm90IGFuIGVudmVsb3Bl".into();
        store.save_message(forged).await.expect("save");
        store.save_message(message("m2", "c1")).await.expect("save");

        let got = store.get_messages("c1").await.expect("list still succeeds");
        let m1 = got.iter().find(|m| m.id == "m1").expect("m1");
        assert_eq!(m1.content, DECRYPT_FAILED_MARKER);
        assert!(m1.encrypted);
        assert_eq!(m1.sender_id.as_deref(), Some("me"));
        let m2 = got.iter().find(|m| m.id == "m2").expect("m2");
        assert_eq!(m2.content, "hello from m2");
    }

    #[tokio::test]
    async fn test_unknown_sender_yields_marker() {
        let store = keyring_store();
        let sealed = store
            .save_encrypted_message(message("m1", "c1").with_sender("me"), "me")
            .await
            .expect("save");
        let mut moved = sealed;
        moved.id = "m2".into();
        moved.sender_id = Some("stranger".into());
        store.save_message(moved).await.expect("save");

        let m2 = store.get_message("m2").await.expect("get").expect("exists");
        assert_eq!(m2.content, DECRYPT_FAILED_MARKER);
    }

    #[tokio::test]
    async fn test_encryption_failure_writes_nothing() {
        let store = Store::in_memory(Arc::new(BrokenProvider));
        let result = store
            .save_encrypted_message(message("m1", "c1").with_sender("me"), "bob")
            .await;
        assert!(matches!(result, Err(DbError::Encryption(_))));
        assert!(store.get_messages("c1").await.expect("get").is_empty());
    }

    #[tokio::test]
    async fn test_encrypted_without_sender_rejected() {
        let store = keyring_store();
        let mut m = message("m1", "c1");
        m.encrypted = true;
        assert!(matches!(store.save_message(m.clone()).await, Err(DbError::Constraint(_))));
        assert!(matches!(
            store.save_encrypted_message(m, "me").await,
            Err(DbError::Constraint(_))
        ));
    }

    #[tokio::test]
    async fn test_pending_queue() {
        let store = keyring_store();
        store
            .queue_message_for_sync(message("m1", "c1"))
            .await
            .expect("queue");
        store.save_message(message("m2", "c1")).await.expect("save");

        let pending = store.get_pending_messages().await.expect("pending");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "m1");

        store
            .update_message_status("m1", MessageStatus::Sent)
            .await
            .expect("update");
        assert!(store.get_pending_messages().await.expect("pending").is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_message() {
        let store = keyring_store();
        let result = store.update_message_status("ghost", MessageStatus::Sent).await;
        assert!(matches!(result, Err(DbError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_conversation_cascades() {
        let store = keyring_store();
        store.save_conversation(conversation("c1")).await.expect("c1");
        store.save_conversation(conversation("c2")).await.expect("c2");
        store.save_message(message("m1", "c1")).await.expect("m1");
        store.save_message(message("m2", "c1")).await.expect("m2");
        store.save_message(message("m3", "c2")).await.expect("m3");

        store.delete_conversation("c1").await.expect("delete");

        assert!(store.get_conversation("c1").await.expect("get").is_none());
        assert!(store.get_messages("c1").await.expect("get").is_empty());
        assert_eq!(store.get_messages("c2").await.expect("get").len(), 1);
    }

    #[tokio::test]
    async fn test_failed_cascade_rolls_back() {
        let store = keyring_store();
        store.save_conversation(conversation("c1")).await.expect("c1");
        store.save_message(message("m1", "c1")).await.expect("m1");
        store.save_message(message("m2", "c1")).await.expect("m2");
        {
            let conn = store.conn().await.expect("conn");
            conn.execute_batch(
                "CREATE TRIGGER block_delete BEFORE DELETE ON messages
                 WHEN OLD.id = 'm2'
                 BEGIN SELECT RAISE(ABORT, 'blocked'); END;",
            )
            .expect("trigger");
        }

        assert!(store.delete_conversation("c1").await.is_err());

        assert!(store.get_conversation("c1").await.expect("get").is_some());
        assert_eq!(store.get_messages("c1").await.expect("get").len(), 2);
    }

    #[tokio::test]
    async fn test_conversations_newest_first() {
        let store = keyring_store();
        let mut old = conversation("old");
        old.last_updated = 10;
        store.save_conversation(old).await.expect("old");
        let fresh = store.save_conversation(conversation("new")).await.expect("new");
        assert!(fresh.last_updated > 10);

        let ids: Vec<String> = store
            .get_conversations()
            .await
            .expect("list")
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn test_reaction_dedup() {
        let store = keyring_store();
        let first = store
            .save_reaction(Reaction::new("m1", "u1", "👍"))
            .await
            .expect("first");
        assert!(first.id.starts_with("m1-u1-"));

        let second = store
            .save_reaction(Reaction::new("m1", "u1", "❤️"))
            .await
            .expect("second");
        assert_eq!(second.id, first.id);

        let reactions = store.get_reactions_by_message("m1").await.expect("list");
        assert_eq!(reactions.len(), 1);
        assert_eq!(reactions[0].emoji, "❤️");

        assert!(store.remove_reaction("m1", "u1").await.expect("remove"));
        assert!(store.get_reactions_by_message("m1").await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_reaction_ignores_caller_id_and_time() {
        let store = keyring_store();
        let mut first = Reaction::new("m1", "u1", "👍");
        first.id = "r1".into();
        first.timestamp = 5;
        let first = store.save_reaction(first).await.expect("u1");
        assert_ne!(first.id, "r1");
        assert!(first.timestamp > 5);

        let mut second = Reaction::new("m1", "u2", "😂");
        second.id = "r1".into();
        store.save_reaction(second).await.expect("u2 reuses the same id");

        let mut users: Vec<(String, String)> = store
            .get_reactions_by_message("m1")
            .await
            .expect("list")
            .into_iter()
            .map(|r| (r.user_id, r.emoji))
            .collect();
        users.sort();
        assert_eq!(
            users,
            vec![("u1".to_string(), "👍".to_string()), ("u2".to_string(), "😂".to_string())]
        );
    }

    #[tokio::test]
    async fn test_read_receipts_collapse() {
        let store = keyring_store();
        let receipt = ReadReceipt {
            id: String::new(),
            message_id: "m1".into(),
            user_id: "u1".into(),
            user_name: "Ana".into(),
            timestamp: 0,
        };
        let saved = store.save_read_receipt(receipt.clone()).await.expect("first");
        assert_eq!(saved.id, "m1-u1");
        assert!(saved.timestamp > 0);
        store.save_read_receipt(receipt).await.expect("second");

        assert_eq!(store.get_read_receipts_by_message("m1").await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn test_read_receipts_with_dashed_ids_stay_apart() {
        let store = keyring_store();
        for (message_id, user_id) in [("msg-1", "u"), ("msg", "1-u")] {
            store
                .save_read_receipt(ReadReceipt {
                    id: String::new(),
                    message_id: message_id.into(),
                    user_id: user_id.into(),
                    user_name: "Reader".into(),
                    timestamp: 0,
                })
                .await
                .expect("receipt");
        }

        let on_dashed = store.get_read_receipts_by_message("msg-1").await.expect("msg-1");
        assert_eq!(on_dashed.len(), 1);
        assert_eq!(on_dashed[0].user_id, "u");
        assert_eq!(store.get_read_receipts_by_message("msg").await.expect("msg").len(), 1);
    }

    #[tokio::test]
    async fn test_save_file_validates() {
        let store = keyring_store();
        let file = StoredFile {
            id: String::new(),
            name: "setup.exe".into(),
            mime_type: "application/x-msdownload".into(),
            size: 10,
            data: String::new(),
            thumbnail: None,
            message_id: "m1".into(),
            conversation_id: "c1".into(),
            uploaded_at: 0,
        };
        assert!(matches!(store.save_file(file.clone()).await, Err(DbError::Constraint(_))));

        let ok = StoredFile {
            mime_type: "application/pdf".into(),
            name: "notes.pdf".into(),
            ..file
        };
        let saved = store.save_file(ok).await.expect("save");
        assert!(saved.id.starts_with("file-"));
        assert!(saved.uploaded_at > 0);
        assert_eq!(store.get_files_by_conversation("c1").await.expect("list"), vec![saved.clone()]);
        assert_eq!(store.get_file(&saved.id).await.expect("get"), Some(saved));
    }

    #[tokio::test]
    async fn test_active_model_switch() {
        let store = keyring_store();
        let model = |id: &str| Model {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            size: "1 GB".into(),
            version: "1".into(),
            active: true,
            downloaded: true,
        };
        store.save_model(model("a")).await.expect("a");
        store.save_model(model("b")).await.expect("b");

        assert_eq!(store.get_active_model().await.expect("active").map(|m| m.id), Some("b".into()));
        assert_eq!(store.get_models().await.expect("list").len(), 2);
    }

    #[tokio::test]
    async fn test_settings() {
        let store = keyring_store();
        assert_eq!(store.get_setting("theme").await.expect("get"), None);

        store.save_setting("theme", json!("dark")).await.expect("save");
        store.save_setting("font_size", json!(14)).await.expect("save");

        assert_eq!(store.get_setting("theme").await.expect("get"), Some(json!("dark")));
        let size: Option<u32> = store.get_setting_as("font_size").await.expect("typed");
        assert_eq!(size, Some(14));
        let wrong: Result<Option<bool>> = store.get_setting_as("font_size").await;
        assert!(matches!(wrong, Err(DbError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_clones_share_connection() {
        let store = keyring_store();
        let other = store.clone();
        store.save_message(message("m1", "c1")).await.expect("save");
        assert_eq!(other.get_messages("c1").await.expect("get").len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_then_retry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("later").join("pocket.db");
        let store = Store::open(Location::File(path), Arc::new(Keyring::generate("me")));

        let result = store.get_conversations().await;
        assert!(matches!(result, Err(DbError::Unavailable(_))));

        std::fs::create_dir_all(dir.path().join("later")).expect("mkdir");
        assert!(store.get_conversations().await.expect("retry").is_empty());
    }

    #[tokio::test]
    async fn test_stats_and_clear() {
        let store = keyring_store();
        store.save_message(message("m1", "c1")).await.expect("save");
        store.save_setting("theme", json!("dark")).await.expect("save");

        let stats = store.stats().await.expect("stats");
        assert_eq!(stats.schema_version, crate::SCHEMA_VERSION);
        assert_eq!(stats.counts.get("messages"), Some(&1));
        assert_eq!(stats.counts.get("voiceMessages"), Some(&0));

        store.clear_database().await.expect("clear");
        let stats = store.stats().await.expect("stats");
        assert!(stats.counts.values().all(|n| *n == 0));
    }

    #[tokio::test]
    async fn test_export_import_between_stores() {
        let source = keyring_store();
        source.save_conversation(conversation("c1")).await.expect("c1");
        source
            .save_encrypted_message(message("m1", "c1").with_sender("me"), "me")
            .await
            .expect("m1");
        source.save_reaction(Reaction::new("m1", "u1", "👍")).await.expect("r");
        let snapshot = source.export_data().await.expect("export");

        let target = keyring_store();
        target.import_data(&snapshot).await.expect("import");
        assert_eq!(target.export_data().await.expect("export"), snapshot);
    }
}
