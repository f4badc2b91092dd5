//! Syncrets - copy secrets between Vault backends and JSON files.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── auth          # Authenticate and cache a token
//! │   ├── list          # Print secret paths
//! │   ├── rm            # Delete secrets
//! │   ├── sync          # Copy secrets to a vault or file
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── config        # syncrets.toml management
//!     ├── domain/       # Secret, Endpoint, sync outcomes
//!     ├── store/        # Secret store backends
//!     │   ├── mod       # SecretStore trait
//!     │   ├── http      # Vault HTTP API client
//!     │   └── memory    # In-memory store
//!     ├── walker        # Breadth-first store traversal
//!     ├── tree          # Path tree and JSON output
//!     ├── session       # Token cache and authentication
//!     ├── sink          # Walk destinations
//!     ├── cipher/       # Encrypted output (age)
//!     └── engine        # auth, list, rm and sync
//! ```
//!
//! # Example
//!
//! ```no_run
//! use syncrets::core::config::Config;
//! use syncrets::core::domain::Outcome;
//! use syncrets::core::engine::SyncEngine;
//! use syncrets::core::prompt::TerminalPrompt;
//! use syncrets::core::store::HttpConnector;
//!
//! # fn main() -> syncrets::error::Result<()> {
//! let config = Config::load(None)?;
//! let engine = SyncEngine::new(&config, &HttpConnector, &TerminalPrompt);
//! let result = engine.sync("vault://vault-a/secret/", "secrets.json", &mut |_: &Outcome| {})?;
//! println!("{} secrets", result.secrets);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod error;
