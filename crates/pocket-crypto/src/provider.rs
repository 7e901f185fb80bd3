//! Message-content encryption capability consumed by the store.

use crate::Result;

/// Encrypts message content for a peer and decrypts content from a peer.
///
/// The store treats implementations as opaque. Both directions fail when no
/// key material is associated with the peer, and `decrypt` also fails on
/// malformed or forged ciphertext.
pub trait EncryptionProvider: Send + Sync {
    /// Encrypt `plaintext` so that `recipient_id` can read it.
    fn encrypt(&self, plaintext: &str, recipient_id: &str) -> Result<String>;

    /// Decrypt `ciphertext` that was produced for a conversation with `sender_id`.
    fn decrypt(&self, ciphertext: &str, sender_id: &str) -> Result<String>;
}
