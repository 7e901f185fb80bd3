//! Message and conversation commands.

use pocket_db::Store;
use pocket_types::MessageStatus;
use serde_json::json;

use super::Result;

/// Messages waiting for delivery.
pub async fn pending(store: &Store) -> Result {
    let messages = store.get_pending_messages().await?;
    Ok(serde_json::to_value(messages)?)
}

/// Every message in a conversation, decrypted where possible.
pub async fn list(store: &Store, conversation_id: &str) -> Result {
    let messages = store.get_messages(conversation_id).await?;
    Ok(serde_json::to_value(messages)?)
}

/// Set a message's delivery status.
pub async fn mark(store: &Store, id: &str, status: &str) -> Result {
    let status: MessageStatus = status.parse()?;
    store.update_message_status(id, status).await?;
    Ok(json!({"id": id, "status": status.as_str()}))
}

/// Delete a conversation together with its messages.
pub async fn delete_conversation(store: &Store, id: &str) -> Result {
    store.delete_conversation(id).await?;
    Ok(json!({"deleted": id}))
}
