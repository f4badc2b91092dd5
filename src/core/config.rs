//! Configuration file management.
//!
//! Reads `syncrets.toml` (or `~/.syncrets/config.toml`), which maps vault
//! aliases to server URLs, authentication settings and token cache files:
//!
//! ```toml
//! [vault.vault-a]
//! url = "http://localhost:8201"
//!
//! [vault.vault-a.auth]
//! method = "userpass"
//! username = "alice"
//!
//! [vault.vault-a.token]
//! file = "~/.syncrets/vault-a-token"
//!
//! [ejson]
//! public_key = "age1..."
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::core::constants;
use crate::error::{ConfigError, Result};

/// Parsed configuration
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Vault backends keyed by alias
    #[serde(default)]
    pub vault: BTreeMap<String, VaultConfig>,
    /// Settings for encrypted file output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ejson: Option<EjsonConfig>,
}

/// Settings for one vault alias
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Server URL the alias stands for
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub token: TokenConfig,
}

/// Authentication settings for a vault alias
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// "token" or "userpass"; unset falls back to `VAULT_TOKEN` or a prompt
    #[serde(default)]
    pub method: Option<String>,
    /// Username for userpass logins
    #[serde(default)]
    pub username: Option<String>,
}

/// Token cache settings for a vault alias
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// File the token is cached in (`~/` expands to the home directory)
    #[serde(default)]
    pub file: Option<String>,
}

/// Encrypted output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EjsonConfig {
    /// age public key (`age1...`) the output is encrypted for
    pub public_key: String,
}

impl Config {
    /// Locations searched when no config path is given, in order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(constants::CONFIG_FILE)];
        if let Some(home) = dirs::home_dir() {
            paths.push(
                home.join(constants::CONFIG_DIR)
                    .join(constants::USER_CONFIG_FILE),
            );
        }
        paths
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Otherwise the first existing file from
    /// [`Config::search_paths`] is used, and the empty configuration if there
    /// is none.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadFile` if the file cannot be read and
    /// `ConfigError::Parse` or `ConfigError::InvalidValue` if it is malformed.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        match Self::search_paths().into_iter().find(|p| p.exists()) {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::parse(&contents)?;

        debug!(aliases = config.vault.len(), "config loaded");
        Ok(config)
    }

    /// Parse and validate TOML configuration text
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` or `ConfigError::InvalidValue`.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Checks that every configured alias URL parses and has a host.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` on the first bad URL.
    pub fn validate(&self) -> Result<()> {
        for alias in self.vault.keys() {
            self.alias_url(alias)?;
        }
        Ok(())
    }

    /// Settings for `alias`
    pub fn alias(&self, alias: &str) -> Option<&VaultConfig> {
        self.vault.get(alias)
    }

    /// URL configured for `alias`, if any.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the configured URL is invalid.
    pub fn alias_url(&self, alias: &str) -> Result<Option<Url>> {
        let Some(raw) = self.alias(alias).and_then(|v| v.url.as_deref()) else {
            return Ok(None);
        };
        let url = Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
            field: "vault.<alias>.url",
            reason: format!("{}: {}: {}", alias, raw, e),
        })?;
        if url.host_str().is_none() {
            return Err(ConfigError::InvalidValue {
                field: "vault.<alias>.url",
                reason: format!("{}: {} has no host", alias, raw),
            }
            .into());
        }
        Ok(Some(url))
    }

    /// Alias whose configured URL addresses the same server as `url`.
    ///
    /// Scheme, host and port must all match.
    pub fn reverse_lookup_alias(&self, url: &Url) -> Option<String> {
        self.vault.keys().find_map(|alias| {
            let configured = self.alias_url(alias).ok().flatten()?;
            let same = configured.scheme() == url.scheme()
                && configured.host_str() == url.host_str()
                && configured.port_or_known_default() == url.port_or_known_default();
            same.then(|| alias.clone())
        })
    }

    /// Token cache file for `alias`, with `~/` expanded
    pub fn token_file(&self, alias: &str) -> Option<PathBuf> {
        let raw = self.alias(alias)?.token.file.as_deref()?;
        if raw.trim().is_empty() {
            return None;
        }
        Some(expand_home(raw))
    }

    /// Public key for encrypted output
    pub fn public_key(&self) -> Option<&str> {
        self.ejson.as_ref().map(|e| e.public_key.as_str())
    }
}

/// Expand a leading `~/` to the home directory.
fn expand_home(raw: &str) -> PathBuf {
    match (raw.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(raw),
    }
}
