//! Pairwise X25519 + ChaCha20-Poly1305 message encryption.
//!
//! ## Envelope
//!
//! ```text
//! key      = BLAKE3::derive_key("PocketAI v1 peer-message-key",
//!                               enc(DH(local_sk, peer_pk), min(pk_a, pk_b), max(pk_a, pk_b)))
//! aad      = enc("PocketAI message envelope v1", recipient_pk)
//! envelope = base64(0x01 || recipient_pk (32) || nonce (12) || ciphertext || tag (16))
//! ```
//!
//! Both sides of a conversation derive the same key, so a message sealed by
//! Alice for Bob opens on Bob's side with Alice as the sender. The recipient
//! key in the header lets Alice reopen her own copy: when the sender is the
//! local identity the pair key is taken against the recipient instead.
//! There is no forward secrecy: compromise of either static key exposes
//! every message.

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use zeroize::Zeroizing;

use crate::blake3::{self, contexts};
use crate::chacha20;
use crate::provider::EncryptionProvider;
use crate::x25519::{X25519PublicKey, X25519StaticSecret};
use crate::{CryptoError, Result};

/// Envelope format version byte.
pub const ENVELOPE_VERSION: u8 = 1;

/// Label bound into the associated data of every message envelope.
const ENVELOPE_LABEL: &[u8] = b"PocketAI message envelope v1";

const HEADER_SIZE: usize = 1 + 32;

/// Local identity plus the public keys of known peers.
#[derive(Clone)]
pub struct Keyring {
    local_id: String,
    identity: X25519StaticSecret,
    peers: HashMap<String, X25519PublicKey>,
}

impl Keyring {
    /// Build a keyring around an existing identity key.
    ///
    /// The local identity is registered as a peer of itself so that content
    /// addressed to the local user can be sealed and opened.
    pub fn new(local_id: impl Into<String>, identity: X25519StaticSecret) -> Self {
        let local_id = local_id.into();
        let mut peers = HashMap::new();
        peers.insert(local_id.clone(), identity.public_key());
        Self {
            local_id,
            identity,
            peers,
        }
    }

    /// Build a keyring with a freshly generated identity key.
    pub fn generate(local_id: impl Into<String>) -> Self {
        Self::new(local_id, X25519StaticSecret::random())
    }

    pub fn local_id(&self) -> &str {
        &self.local_id
    }

    pub fn public_key(&self) -> X25519PublicKey {
        self.identity.public_key()
    }

    pub fn identity(&self) -> &X25519StaticSecret {
        &self.identity
    }

    /// Register or replace a peer's public key.
    pub fn add_peer(&mut self, peer_id: impl Into<String>, public_key: X25519PublicKey) {
        let peer_id = peer_id.into();
        tracing::debug!(peer = %peer_id, "registered peer key");
        self.peers.insert(peer_id, public_key);
    }

    pub fn knows(&self, peer_id: &str) -> bool {
        self.peers.contains_key(peer_id)
    }

    /// Short human-comparable fingerprint of the local public key.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.public_key())
    }

    fn peer(&self, peer_id: &str) -> Result<&X25519PublicKey> {
        self.peers
            .get(peer_id)
            .ok_or_else(|| CryptoError::UnknownPeer(peer_id.to_string()))
    }

    fn pair_key(&self, peer_pk: &X25519PublicKey) -> Zeroizing<[u8; 32]> {
        let shared = self.identity.diffie_hellman(peer_pk);
        let own_pk = self.identity.public_key();
        let (low, high) = if own_pk.as_bytes() <= peer_pk.as_bytes() {
            (own_pk, *peer_pk)
        } else {
            (*peer_pk, own_pk)
        };

        let material = Zeroizing::new(blake3::encode_multi_field(&[
            shared.as_bytes(),
            low.as_bytes(),
            high.as_bytes(),
        ]));
        Zeroizing::new(blake3::derive_key(contexts::PEER_MESSAGE_KEY, &material))
    }
}

fn envelope_aad(recipient_pk: &X25519PublicKey) -> Vec<u8> {
    blake3::encode_multi_field(&[ENVELOPE_LABEL, recipient_pk.as_bytes()])
}

impl EncryptionProvider for Keyring {
    fn encrypt(&self, plaintext: &str, recipient_id: &str) -> Result<String> {
        let recipient_pk = *self.peer(recipient_id)?;
        let key = self.pair_key(&recipient_pk);
        let sealed = chacha20::seal(&key, plaintext.as_bytes(), &envelope_aad(&recipient_pk))?;

        let mut envelope = Vec::with_capacity(HEADER_SIZE + sealed.len());
        envelope.push(ENVELOPE_VERSION);
        envelope.extend_from_slice(recipient_pk.as_bytes());
        envelope.extend_from_slice(&sealed);
        Ok(STANDARD.encode(envelope))
    }

    fn decrypt(&self, ciphertext: &str, sender_id: &str) -> Result<String> {
        let sender_pk = *self.peer(sender_id)?;
        let envelope = STANDARD
            .decode(ciphertext)
            .map_err(|e| CryptoError::Malformed(format!("envelope base64: {e}")))?;

        let (recipient_pk, sealed) = match envelope.split_first() {
            Some((&ENVELOPE_VERSION, rest)) if rest.len() >= 32 => {
                let (pk, sealed) = rest.split_at(32);
                let mut bytes = [0u8; 32];
                bytes.copy_from_slice(pk);
                (X25519PublicKey::from_bytes(bytes), sealed)
            }
            Some((&ENVELOPE_VERSION, _)) => {
                return Err(CryptoError::Malformed("envelope header too short".into()))
            }
            Some((version, _)) => {
                return Err(CryptoError::Malformed(format!(
                    "unsupported envelope version {version}"
                )))
            }
            None => return Err(CryptoError::Malformed("empty envelope".into())),
        };

        let own_pk = self.public_key();
        let counterpart = if recipient_pk == own_pk {
            sender_pk
        } else if sender_pk == own_pk {
            recipient_pk
        } else {
            return Err(CryptoError::NotAddressed(sender_id.to_string()));
        };

        let key = self.pair_key(&counterpart);
        let plaintext = chacha20::open(&key, sealed, &envelope_aad(&recipient_pk))?;
        String::from_utf8(plaintext)
            .map_err(|_| CryptoError::Malformed("plaintext is not UTF-8".into()))
    }
}

/// First 8 bytes of a domain-separated hash of the key, hex encoded.
pub fn fingerprint(public_key: &X25519PublicKey) -> String {
    let digest = blake3::derive_key(contexts::KEY_FINGERPRINT, public_key.as_bytes());
    hex::encode(&digest[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (Keyring, Keyring) {
        let mut alice = Keyring::generate("alice");
        let mut bob = Keyring::generate("bob");
        alice.add_peer("bob", bob.public_key());
        bob.add_peer("alice", alice.public_key());
        (alice, bob)
    }

    #[test]
    fn test_peer_can_decrypt() {
        let (alice, bob) = pair();
        let ct = alice.encrypt("see you at 5", "bob").expect("encrypt");
        assert_eq!(bob.decrypt(&ct, "alice").expect("decrypt"), "see you at 5");
    }

    #[test]
    fn test_sender_can_reread_own_message() {
        let (alice, _bob) = pair();
        let ct = alice.encrypt("draft", "bob").expect("encrypt");
        assert_eq!(alice.decrypt(&ct, "alice").expect("decrypt"), "draft");
    }

    #[test]
    fn test_sender_needs_no_recipient_key_to_reread() {
        let (alice, bob) = pair();
        let ct = alice.encrypt("sent from phone", "bob").expect("encrypt");

        // Same identity on a second device that never registered bob.
        let laptop = Keyring::new("alice", alice.identity().clone());
        assert!(!laptop.knows("bob"));
        assert_eq!(laptop.decrypt(&ct, "alice").expect("decrypt"), "sent from phone");
        assert_eq!(bob.decrypt(&ct, "alice").expect("decrypt"), "sent from phone");
    }

    #[test]
    fn test_recipient_header_is_authenticated() {
        let (alice, bob) = pair();
        let carol = Keyring::generate("carol");
        let ct = alice.encrypt("for bob", "bob").expect("encrypt");

        let mut raw = STANDARD.decode(&ct).expect("base64");
        raw[1..HEADER_SIZE].copy_from_slice(carol.public_key().as_bytes());
        let forged = STANDARD.encode(raw);
        assert!(alice.decrypt(&forged, "alice").is_err());
        assert!(bob.decrypt(&forged, "alice").is_err());
    }

    #[test]
    fn test_self_addressed() {
        let keyring = Keyring::generate("me");
        let ct = keyring.encrypt("note to self", "me").expect("encrypt");
        assert_eq!(keyring.decrypt(&ct, "me").expect("decrypt"), "note to self");
    }

    #[test]
    fn test_ciphertext_hides_plaintext() {
        let (alice, _bob) = pair();
        let ct = alice.encrypt("secret", "bob").expect("encrypt");
        assert!(!ct.contains("secret"));
        assert_ne!(ct, STANDARD.encode("secret"));
    }

    #[test]
    fn test_unknown_recipient() {
        let keyring = Keyring::generate("me");
        let err = keyring.encrypt("hi", "stranger").expect_err("no key");
        assert!(matches!(err, CryptoError::UnknownPeer(ref id) if id == "stranger"));
    }

    #[test]
    fn test_wrong_peer_fails() {
        let (alice, bob) = pair();
        let mut carol = Keyring::generate("carol");
        carol.add_peer("alice", alice.public_key());

        let ct = alice.encrypt("for bob", "bob").expect("encrypt");
        assert!(matches!(
            carol.decrypt(&ct, "alice"),
            Err(CryptoError::NotAddressed(_))
        ));
        assert!(bob.decrypt(&ct, "bob").is_err());
        assert!(alice.decrypt(&ct, "bob").is_err());
    }

    #[test]
    fn test_malformed_input() {
        let (_alice, bob) = pair();
        assert!(matches!(
            bob.decrypt("not base64!!", "alice"),
            Err(CryptoError::Malformed(_))
        ));
        assert!(matches!(
            bob.decrypt("", "alice"),
            Err(CryptoError::Malformed(_))
        ));
        let short_header = STANDARD.encode([ENVELOPE_VERSION; 20]);
        assert!(matches!(
            bob.decrypt(&short_header, "alice"),
            Err(CryptoError::Malformed(_))
        ));
        let wrong_version = STANDARD.encode([9u8; 80]);
        assert!(matches!(
            bob.decrypt(&wrong_version, "alice"),
            Err(CryptoError::Malformed(_))
        ));
    }

    #[test]
    fn test_fingerprint_stable() {
        let keyring = Keyring::new("me", X25519StaticSecret::from_bytes([3u8; 32]));
        assert_eq!(keyring.fingerprint(), fingerprint(&keyring.public_key()));
        assert_eq!(keyring.fingerprint().len(), 16);
    }
}
