//! Domain-separated BLAKE3 hashing.
//!
//! Every derived key uses a registered context string so keys derived for
//! one purpose can never collide with keys derived for another.

/// Registered BLAKE3 context strings.
pub mod contexts {
    /// Pairwise message key shared between the local identity and a peer.
    pub const PEER_MESSAGE_KEY: &str = "PocketAI v1 peer-message-key";
    /// Short public-key fingerprints shown to users.
    pub const KEY_FINGERPRINT: &str = "PocketAI v1 key-fingerprint";

    pub const ALL_CONTEXTS: &[&str] = &[PEER_MESSAGE_KEY, KEY_FINGERPRINT];
}

/// Compute BLAKE3 hash of the input data.
pub fn hash(data: &[u8]) -> [u8; 32] {
    *::blake3::hash(data).as_bytes()
}

/// Derive a key using BLAKE3's key derivation mode.
///
/// `context` should be one of [`contexts`].
pub fn derive_key(context: &str, key_material: &[u8]) -> [u8; 32] {
    let mut hasher = ::blake3::Hasher::new_derive_key(context);
    hasher.update(key_material);
    *hasher.finalize().as_bytes()
}

pub fn is_registered_context(context: &str) -> bool {
    contexts::ALL_CONTEXTS.contains(&context)
}

/// Encode multiple dynamic fields using length-prefixed encoding.
///
/// `LE32(len(field1)) || field1 || LE32(len(field2)) || field2 || ...`
pub fn encode_multi_field(fields: &[&[u8]]) -> Vec<u8> {
    let total_len: usize = fields.iter().map(|f| 4 + f.len()).sum();
    let mut output = Vec::with_capacity(total_len);
    for field in fields {
        output.extend_from_slice(&(field.len() as u32).to_le_bytes());
        output.extend_from_slice(field);
    }
    output
}
