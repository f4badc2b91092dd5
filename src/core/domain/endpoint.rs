//! Endpoint type.
//!
//! A backend reference resolved from a user-supplied locator such as
//! `vault://vault-a/secret/` or `http://localhost:8201/secret/`.

use tracing::debug;
use url::Url;

use crate::core::config::Config;
use crate::core::constants::ALIAS_SCHEME;
use crate::error::{ConfigError, Result};

/// A resolved backend locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    name: String,
    raw_url: Url,
    url: Url,
    path: String,
}

impl Endpoint {
    /// Resolve a locator against the configured aliases.
    ///
    /// The alias is the configured entry whose URL matches the locator's
    /// scheme, host and port, or else the locator's host name. The resolved
    /// URL is the alias's configured URL when there is one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidLocator` if the locator is not a URL with
    /// a host, and `ConfigError::UnknownAlias` for a `vault://` locator whose
    /// host is not a configured alias.
    pub fn resolve(locator: &str, config: &Config) -> Result<Self> {
        let raw_url = Url::parse(locator).map_err(|e| ConfigError::InvalidLocator {
            locator: locator.to_string(),
            reason: e.to_string(),
        })?;
        let Some(host) = raw_url.host_str() else {
            return Err(ConfigError::InvalidLocator {
                locator: locator.to_string(),
                reason: "missing host".to_string(),
            }
            .into());
        };

        let name = config
            .reverse_lookup_alias(&raw_url)
            .unwrap_or_else(|| host.to_string());

        let url = match config.alias_url(&name)? {
            Some(url) => url,
            None if raw_url.scheme() == ALIAS_SCHEME => {
                return Err(ConfigError::UnknownAlias(name).into());
            }
            None => raw_url.clone(),
        };

        debug!(alias = %name, url = %url, "resolved locator");

        Ok(Self {
            name,
            path: raw_url.path().to_string(),
            raw_url,
            url,
        })
    }

    /// Alias (or host name) identifying the backend
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Locator as given by the user
    pub fn raw_url(&self) -> &Url {
        &self.raw_url
    }

    /// Server URL after alias substitution
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Root prefix to operate on
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw_url)
    }
}
