//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use parley_client::{CorruptKeyPolicy, ManagerConfig};

/// Parley conversation encryption
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(about = "Encrypt and decrypt chat messages with per-conversation keys")]
#[command(version)]
pub struct Args {
    /// Path to the key database
    #[arg(long, default_value = "parley-keys.redb")]
    pub store: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Overwrite undecodable key records with fresh keys instead of failing
    #[arg(long)]
    pub replace_corrupt_keys: bool,

    /// Operation to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level operations.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Encrypt a message and print its envelope
    Encrypt {
        /// Conversation id
        conversation: String,
        /// Message text
        text: String,
    },
    /// Decrypt an envelope and print its text
    Decrypt {
        /// Conversation id
        conversation: String,
        /// Base64 envelope
        envelope: String,
    },
    /// Manage stored keys
    #[command(subcommand)]
    Keys(KeysCommand),
}

/// Key maintenance operations.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum KeysCommand {
    /// List conversations with a stored key
    List,
    /// Delete one conversation's key
    Forget {
        /// Conversation id
        conversation: String,
    },
    /// Delete every stored key
    Clear,
}

/// Settings assembled from [`Args`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Key database location
    pub store_path: PathBuf,
    /// Fallback log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Key manager settings
    pub manager: ManagerConfig,
}

impl From<&Args> for CliConfig {
    fn from(args: &Args) -> Self {
        let corrupt_key_policy = if args.replace_corrupt_keys {
            CorruptKeyPolicy::Replace
        } else {
            CorruptKeyPolicy::Fail
        };

        Self {
            store_path: args.store.clone(),
            log_level: args.log_level.clone(),
            manager: ManagerConfig { corrupt_key_policy },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["parley", "keys", "list"]).unwrap();
        let config = CliConfig::from(&args);

        assert_eq!(config.store_path, PathBuf::from("parley-keys.redb"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.manager.corrupt_key_policy, CorruptKeyPolicy::Fail);
        assert_eq!(args.command, Command::Keys(KeysCommand::List));
    }

    #[test]
    fn encrypt_arguments() {
        let args = Args::try_parse_from([
            "parley",
            "--store",
            "/tmp/k.redb",
            "--replace-corrupt-keys",
            "encrypt",
            "conv-42",
            "hello",
        ])
        .unwrap();
        let config = CliConfig::from(&args);

        assert_eq!(config.store_path, PathBuf::from("/tmp/k.redb"));
        assert_eq!(config.manager.corrupt_key_policy, CorruptKeyPolicy::Replace);
        assert_eq!(
            args.command,
            Command::Encrypt { conversation: "conv-42".to_string(), text: "hello".to_string() }
        );
    }

    #[test]
    fn keys_forget_requires_conversation() {
        assert!(Args::try_parse_from(["parley", "keys", "forget"]).is_err());

        let args = Args::try_parse_from(["parley", "keys", "forget", "conv-1"]).unwrap();
        assert_eq!(
            args.command,
            Command::Keys(KeysCommand::Forget { conversation: "conv-1".to_string() })
        );
    }

    #[test]
    fn missing_subcommand_is_rejected() {
        assert!(Args::try_parse_from(["parley"]).is_err());
    }
}
