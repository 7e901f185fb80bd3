//! X25519 key agreement (RFC 7748).
//!
//! Static keys only: the local identity and each peer own one long-lived key,
//! and the pair agrees on a shared secret without a round trip.

use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroize;

use crate::{CryptoError, Result};

/// An X25519 static secret key.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct X25519StaticSecret {
    inner: StaticSecret,
}

/// An X25519 public key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct X25519PublicKey {
    bytes: [u8; 32],
}

/// The output of a Diffie-Hellman exchange.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct SharedSecret {
    bytes: [u8; 32],
}

impl X25519StaticSecret {
    pub fn random() -> Self {
        Self {
            inner: StaticSecret::random_from_rng(OsRng),
        }
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self {
            inner: StaticSecret::from(bytes),
        }
    }

    /// Parse a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        Ok(Self::from_bytes(decode_key_hex(s)?))
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.inner.to_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.inner.to_bytes())
    }

    pub fn public_key(&self) -> X25519PublicKey {
        X25519PublicKey {
            bytes: PublicKey::from(&self.inner).to_bytes(),
        }
    }

    pub fn diffie_hellman(&self, their_public: &X25519PublicKey) -> SharedSecret {
        let shared = self.inner.diffie_hellman(&PublicKey::from(their_public.bytes));
        SharedSecret {
            bytes: *shared.as_bytes(),
        }
    }
}

impl X25519PublicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        Ok(Self::from_bytes(decode_key_hex(s)?))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl SharedSecret {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}

fn decode_key_hex(s: &str) -> Result<[u8; 32]> {
    let raw = hex::decode(s.trim()).map_err(|e| CryptoError::Malformed(format!("key hex: {e}")))?;
    let actual = raw.len();
    raw.try_into()
        .map_err(|_| CryptoError::InvalidKeyLength { expected: 32, actual })
}
