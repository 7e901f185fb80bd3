//! pocketctl: inspect and maintain a PocketAI local store.
//!
//! Reads `config.toml` from the data directory, opens the store with the
//! configured identity keyring and runs one command. Results are printed to
//! stdout as JSON; logs go to stderr.

mod commands;
mod config;
mod identity;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use pocket_crypto::Keyring;
use pocket_db::{Location, Store};
use tracing::info;

use crate::config::PocketConfig;

#[derive(Parser, Debug)]
#[command(name = "pocketctl", version, about = "PocketAI local store tool")]
struct Cli {
    /// Config file. Defaults to config.toml in the data directory.
    #[arg(short, long, env = "POCKET_CONFIG")]
    config: Option<PathBuf>,

    /// Database file, overriding the configured one.
    #[arg(long, env = "POCKET_DB")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Schema version, record counts and identity.
    Info,
    /// Write every store to a JSON snapshot.
    Export { file: PathBuf },
    /// Replace stores with a JSON snapshot.
    Import { file: PathBuf },
    /// List messages waiting for delivery.
    Pending,
    /// List the messages of a conversation.
    Messages { conversation: String },
    /// Set a message's status (sent, pending, offline).
    Mark { id: String, status: String },
    /// Delete a conversation and its messages.
    DeleteConversation { id: String },
    /// Empty every store.
    Clear {
        #[arg(long)]
        yes: bool,
    },
    /// Generate the identity key.
    Keygen {
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = PocketConfig::load(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.log_level.as_str().into()),
        )
        .init();

    let output = match cli.command {
        Command::Keygen { force } => keygen(&config, force)?,
        command => {
            let keyring = identity::load_keyring(&config)?;
            let db_path = cli.db.unwrap_or_else(|| config.db_path());
            if let Some(parent) = db_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let store = Store::open(Location::File(db_path), Arc::new(keyring.clone()));
            run(command, &config, &store, &keyring).await?
        }
    };
    print(output)
}

async fn run(
    command: Command,
    config: &PocketConfig,
    store: &Store,
    keyring: &Keyring,
) -> anyhow::Result<serde_json::Value> {
    match command {
        Command::Info => commands::data::info(store, keyring).await,
        Command::Export { file } => commands::data::export(store, &file).await,
        Command::Import { file } => commands::data::import(store, &file).await,
        Command::Pending => commands::messages::pending(store).await,
        Command::Messages { conversation } => commands::messages::list(store, &conversation).await,
        Command::Mark { id, status } => commands::messages::mark(store, &id, &status).await,
        Command::DeleteConversation { id } => {
            commands::messages::delete_conversation(store, &id).await
        }
        Command::Clear { yes } => commands::data::clear(store, yes).await,
        Command::Keygen { force } => keygen(config, force),
    }
}

fn keygen(config: &PocketConfig, force: bool) -> anyhow::Result<serde_json::Value> {
    let path = config.secret_key_path();
    let secret = identity::generate(&path, force)?;
    let public_key = secret.public_key();
    info!("Wrote identity key to {}", path.display());
    Ok(serde_json::json!({
        "secret_key_file": path.display().to_string(),
        "public_key": public_key.to_hex(),
        "fingerprint": pocket_crypto::keyring::fingerprint(&public_key),
    }))
}

fn print(value: serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_mark() {
        let cli = Cli::try_parse_from(["pocketctl", "mark", "m1", "sent"]).expect("parse");
        assert!(matches!(
            cli.command,
            Command::Mark { ref id, ref status } if id == "m1" && status == "sent"
        ));
    }

    #[test]
    fn test_parse_kebab_case_subcommand() {
        let cli = Cli::try_parse_from(["pocketctl", "delete-conversation", "c1"]).expect("parse");
        assert!(matches!(cli.command, Command::DeleteConversation { .. }));
    }
}
