//! # pocket-crypto
//!
//! Message-content encryption for the PocketAI local store.
//!
//! The store only sees the [`EncryptionProvider`] trait. [`Keyring`] is the
//! bundled implementation, built from fixed primitives with no negotiation.
//!
//! ## Modules
//!
//! - [`blake3`]: Domain-separated BLAKE3 key derivation
//! - [`x25519`]: X25519 key agreement (RFC 7748)
//! - [`chacha20`]: ChaCha20-Poly1305 AEAD encryption (RFC 8439)
//! - [`provider`]: The encryption capability consumed by the store
//! - [`keyring`]: Pairwise peer encryption implementing the provider

pub mod blake3;
pub mod chacha20;
pub mod keyring;
pub mod provider;
pub mod x25519;

pub use keyring::Keyring;
pub use provider::EncryptionProvider;

/// Error types for cryptographic operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// No public key is registered for the peer.
    #[error("no key material for peer {0}")]
    UnknownPeer(String),

    /// AEAD encryption failed.
    #[error("AEAD encryption failed")]
    AeadEncryption,

    /// AEAD decryption failed (authentication tag mismatch).
    #[error("AEAD decryption failed")]
    AeadDecryption,

    /// Invalid key length.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// The envelope was neither sent by nor addressed to the local identity.
    #[error("envelope from {0} is not addressed to the local identity")]
    NotAddressed(String),

    /// Input could not be decoded.
    #[error("malformed input: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
