//! Local identity key and peer keyring.

use std::path::Path;

use anyhow::Context;
use pocket_crypto::x25519::{X25519PublicKey, X25519StaticSecret};
use pocket_crypto::Keyring;
use tracing::{debug, warn};

use crate::config::PocketConfig;

/// Build the keyring from the configured secret key and peers.
///
/// Without a secret key file an ephemeral identity is used, so encrypted
/// messages read back as undecryptable.
pub fn load_keyring(config: &PocketConfig) -> anyhow::Result<Keyring> {
    let key_path = config.secret_key_path();
    let local_id = config.identity.local_id.clone();

    let mut keyring = if key_path.exists() {
        Keyring::new(local_id, read_secret(&key_path)?)
    } else {
        warn!(
            "No identity key at {}; run `pocketctl keygen` to create one",
            key_path.display()
        );
        Keyring::generate(local_id)
    };

    for peer in &config.peers {
        let public_key = X25519PublicKey::from_hex(peer.public_key.trim())
            .with_context(|| format!("invalid public key for peer '{}'", peer.id))?;
        keyring.add_peer(peer.id.clone(), public_key);
        debug!("Registered peer {}", peer.id);
    }

    Ok(keyring)
}

fn read_secret(path: &Path) -> anyhow::Result<X25519StaticSecret> {
    let hex = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    X25519StaticSecret::from_hex(hex.trim())
        .with_context(|| format!("invalid secret key in {}", path.display()))
}

/// Generate and persist a new identity key. Refuses to overwrite unless
/// `force` is set.
pub fn generate(path: &Path, force: bool) -> anyhow::Result<X25519StaticSecret> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists; pass --force to replace it",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let secret = X25519StaticSecret::random();
    std::fs::write(path, secret.to_hex())
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(secret)
}
