//! Command-line interface.

pub mod auth;
pub mod completions;
pub mod list;
pub mod output;
pub mod rm;
pub mod sync;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::core::config::Config;
use crate::core::domain::SyncResult;
use crate::core::engine::SyncEngine;
use crate::core::prompt::TerminalPrompt;
use crate::core::store::HttpConnector;
use crate::error::{Error, Result};

/// Syncrets - copy secrets between Vault backends and JSON files.
#[derive(Parser)]
#[command(
    name = "syncrets",
    about = "Copy secrets between Vault backends and JSON files",
    version,
    after_help = "Locators: vault://<alias>/<path> or http(s)://<host>:<port>/<path>"
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Diagnostic log format on stderr
    #[arg(
        long,
        global = true,
        env = "SYNCRETS_LOG_FORMAT",
        value_enum,
        default_value = "text"
    )]
    pub log_format: LogFormat,

    /// Configuration file [default: ./syncrets.toml, then ~/.syncrets/config.toml]
    #[arg(long, global = true, env = "SYNCRETS_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Authenticate against a vault and cache the token
    Auth {
        /// Vault locator (e.g., vault://vault-a/)
        locator: String,
    },

    /// List every secret path below a locator
    List {
        /// Vault locator (e.g., vault://vault-a/secret/)
        locator: String,
    },

    /// Delete every secret below a locator
    Rm {
        /// Vault locator (e.g., vault://vault-a/secret/app/)
        locator: String,
    },

    /// Copy secrets to another vault, a .json file or an encrypted .ejson file
    Sync {
        /// Source vault locator
        source: String,
        /// Destination vault locator or output file
        destination: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Diagnostic log formats.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Execute a parsed command line.
pub fn execute(cli: Cli) -> Result<()> {
    if let Command::Completions { shell } = cli.command {
        return completions::execute(shell);
    }

    let config = Config::load(cli.config.as_deref())?;
    debug!(aliases = config.vault.len(), "configuration ready");

    let connector = HttpConnector;
    let prompt = TerminalPrompt;
    let engine = SyncEngine::new(&config, &connector, &prompt);

    match cli.command {
        Command::Auth { locator } => auth::execute(&engine, &locator),
        Command::List { locator } => list::execute(&engine, &locator),
        Command::Rm { locator } => rm::execute(&engine, &locator),
        Command::Sync {
            source,
            destination,
        } => sync::execute(&engine, &source, &destination),
        Command::Completions { .. } => Ok(()),
    }
}

/// Report skipped paths and turn failed secrets into an error.
fn finish(result: &SyncResult) -> Result<()> {
    if result.skipped > 0 {
        output::warn(&format!(
            "{} path(s) could not be read and were skipped",
            result.skipped
        ));
    }
    if !result.is_complete() {
        return Err(Error::Incomplete {
            failed: result.failed,
            total: result.secrets,
        });
    }
    Ok(())
}
