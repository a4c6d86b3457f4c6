//! Parley command-line binary.
//!
//! # Usage
//!
//! ```bash
//! # Encrypt a message (creates the conversation key on first use)
//! parley encrypt conv-42 "hello"
//!
//! # Decrypt an envelope
//! parley decrypt conv-42 <ENVELOPE>
//!
//! # Inspect and prune stored keys
//! parley keys list
//! parley keys forget conv-42
//! ```

mod cli;
mod commands;

use clap::Parser;
use parley_client::{ConversationCipher, ConversationKeyManager, SystemEnv};
use parley_store::RedbKeyStore;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Args, CliConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = CliConfig::from(&args);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr)).with(filter).init();

    tracing::debug!("Opening key store at {}", config.store_path.display());
    let store = RedbKeyStore::open(&config.store_path)?;

    let keys = ConversationKeyManager::with_config(store, SystemEnv::new(), config.manager);
    let cipher = ConversationCipher::new(keys);

    let mut stdout = std::io::stdout().lock();
    commands::execute(args.command, &cipher, &mut stdout).await
}
