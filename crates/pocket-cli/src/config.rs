//! Configuration file management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable that relocates the data directory (and config file).
pub const DATA_DIR_ENV: &str = "POCKET_DATA_DIR";

/// Complete `pocketctl` configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PocketConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Peers whose messages can be opened.
    #[serde(default)]
    pub peers: Vec<PeerConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory. Empty = platform default.
    #[serde(default)]
    pub data_dir: String,
    /// Database file name inside the data directory.
    #[serde(default = "default_db_file")]
    pub db_file: String,
}

/// Identity configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Hex-encoded X25519 secret. Relative paths resolve against the data dir.
    #[serde(default = "default_secret_key_file")]
    pub secret_key_file: String,
    /// Identifier other peers use for this user.
    #[serde(default = "default_local_id")]
    pub local_id: String,
}

/// A known peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerConfig {
    pub id: String,
    /// Hex-encoded X25519 public key.
    pub public_key: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_db_file() -> String {
    "pocket.db".to_string()
}

fn default_secret_key_file() -> String {
    "identity.key".to_string()
}

fn default_local_id() -> String {
    "me".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: String::new(),
            db_file: default_db_file(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            secret_key_file: default_secret_key_file(),
            local_id: default_local_id(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl PocketConfig {
    /// Load configuration from `path`, or from the default location.
    ///
    /// Falls back to defaults if the file does not exist.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path(),
        };
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: PocketConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> PathBuf {
        if self.storage.data_dir.is_empty() {
            Self::default_data_dir()
        } else {
            PathBuf::from(&self.storage.data_dir)
        }
    }

    /// Full path of the database file.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir().join(&self.storage.db_file)
    }

    /// Full path of the identity secret key file.
    pub fn secret_key_path(&self) -> PathBuf {
        let file = Path::new(&self.identity.secret_key_file);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.data_dir().join(file)
        }
    }

    fn config_path() -> PathBuf {
        Self::default_data_dir().join("config.toml")
    }

    /// Platform-specific default data directory.
    fn default_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            return PathBuf::from(dir);
        }
        #[cfg(target_os = "macos")]
        {
            dirs_fallback("Library/Application Support/PocketAI")
        }
        #[cfg(target_os = "windows")]
        {
            dirs_fallback("PocketAI")
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            dirs_fallback(".pocketai")
        }
    }
}

/// Fallback home directory resolution.
fn dirs_fallback(subpath: &str) -> PathBuf {
    std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(subpath))
        .unwrap_or_else(|_| PathBuf::from("/tmp/pocketai"))
}
