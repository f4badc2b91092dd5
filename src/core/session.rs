//! Authentication state for one backend.
//!
//! ```text
//! Unauthenticated ──load──▶ Loaded ──is_valid──▶ Valid
//!                                        │
//!                                        ▼
//!                                     Invalid ──authenticate──▶ Valid
//! ```
//!
//! Validity is probed once with a self-lookup and memoized. The memo is
//! dropped whenever the credential changes, so a re-authenticated session is
//! probed exactly once more. A refreshed token is written back to the cache
//! file only after that probe succeeds.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::core::config::Config;
use crate::core::constants::TOKEN_ENV;
use crate::core::fs::write_private;
use crate::core::prompt::Prompt;
use crate::core::store::SecretStore;
use crate::error::{AuthError, ConfigError, Result};

/// How a session re-authenticates when its token is not valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// Prompt for a token
    Token,
    /// Prompt for a password and log in as `username`
    Userpass { username: String },
}

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No credential
    Unauthenticated,
    /// Credential present, validity not probed yet
    Loaded,
    /// Credential accepted by the backend
    Valid,
    /// Credential rejected by the backend
    Invalid,
}

/// How [`Session::authenticate`] succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The cached token was already valid
    Cached,
    /// A new credential was obtained and verified
    Reauthenticated,
}

/// Per-backend authentication state
#[derive(Debug)]
pub struct Session {
    alias: String,
    method: Option<AuthMethod>,
    token_file: Option<PathBuf>,
    env_token: Option<Zeroizing<String>>,
    validity: Option<bool>,
}

impl Session {
    /// Create a session for `alias` from its configured auth settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownAuthMethod` for a method other than
    /// `token` or `userpass`, and `ConfigError::MissingUsername` for a
    /// userpass alias without a username.
    pub fn new(alias: &str, config: &Config) -> Result<Self> {
        let auth = config.alias(alias).map(|v| &v.auth);
        let method = match auth.and_then(|a| a.method.as_deref()) {
            None | Some("") => None,
            Some("token") => Some(AuthMethod::Token),
            Some("userpass") => {
                let username = auth
                    .and_then(|a| a.username.clone())
                    .filter(|u| !u.is_empty())
                    .ok_or_else(|| ConfigError::MissingUsername {
                        alias: alias.to_string(),
                    })?;
                Some(AuthMethod::Userpass { username })
            }
            Some(other) => {
                return Err(ConfigError::UnknownAuthMethod {
                    alias: alias.to_string(),
                    method: other.to_string(),
                }
                .into())
            }
        };

        Ok(Self {
            alias: alias.to_string(),
            method,
            token_file: config.token_file(alias),
            env_token: None,
            validity: None,
        })
    }

    /// Set the token used when no auth method is configured
    pub fn with_env_token(mut self, token: Option<String>) -> Self {
        self.env_token = token.filter(|t| !t.is_empty()).map(Zeroizing::new);
        self
    }

    /// Configured re-authentication method
    pub fn method(&self) -> Option<&AuthMethod> {
        self.method.as_ref()
    }

    /// Token cache file, if configured
    pub fn token_file(&self) -> Option<&Path> {
        self.token_file.as_deref()
    }

    /// Current state given the credential held by `store`
    pub fn state(&self, store: &dyn SecretStore) -> SessionState {
        match (store.token(), self.validity) {
            (None, _) => SessionState::Unauthenticated,
            (Some(_), None) => SessionState::Loaded,
            (Some(_), Some(true)) => SessionState::Valid,
            (Some(_), Some(false)) => SessionState::Invalid,
        }
    }

    /// Load the cached token into `store`.
    ///
    /// A missing or unconfigured cache file is not an error; the session
    /// simply stays unauthenticated.
    ///
    /// # Returns
    ///
    /// `true` if a token was loaded.
    pub fn load(&mut self, store: &mut dyn SecretStore) -> bool {
        let Some(path) = &self.token_file else {
            debug!(alias = %self.alias, "no token file configured");
            return false;
        };

        let contents = match fs::read_to_string(path) {
            Ok(contents) => Zeroizing::new(contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no cached token");
                return false;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read cached token");
                return false;
            }
        };

        let token = contents.trim();
        if token.is_empty() {
            debug!(path = %path.display(), "cached token is empty");
            return false;
        }

        store.set_token(token);
        self.validity = None;
        debug!(alias = %self.alias, path = %path.display(), "loaded cached token");
        true
    }

    /// Whether the current credential is accepted by the backend.
    ///
    /// The first call probes with a self-lookup; later calls return the
    /// memoized answer until the credential changes.
    pub fn is_valid(&mut self, store: &dyn SecretStore) -> bool {
        if let Some(valid) = self.validity {
            return valid;
        }

        let valid = if store.token().is_none() {
            false
        } else {
            match store.lookup_self() {
                Ok(Some(principal)) => {
                    debug!(alias = %self.alias, principal = %principal, "token is valid");
                    true
                }
                Ok(None) => {
                    debug!(alias = %self.alias, "lookup-self returned no principal");
                    false
                }
                Err(e) => {
                    debug!(alias = %self.alias, error = %e, "lookup-self failed");
                    false
                }
            }
        };

        self.validity = Some(valid);
        valid
    }

    /// Ensure `store` holds a valid credential.
    ///
    /// Loads the cached token and returns immediately if it is valid.
    /// Otherwise makes exactly one attempt with the configured method,
    /// verifies the new credential and persists it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the prompt or login fails or the backend
    /// rejects the new credential. Nothing is persisted in that case.
    pub fn authenticate(
        &mut self,
        store: &mut dyn SecretStore,
        prompt: &dyn Prompt,
    ) -> Result<AuthOutcome> {
        self.load(store);
        if self.is_valid(store) {
            return Ok(AuthOutcome::Cached);
        }

        self.reauthenticate(store, prompt)?;
        self.validity = None;
        if !self.is_valid(store) {
            return Err(AuthError::Rejected(self.alias.clone()).into());
        }

        info!(alias = %self.alias, "authenticated");
        self.persist(store);
        Ok(AuthOutcome::Reauthenticated)
    }

    fn reauthenticate(&self, store: &mut dyn SecretStore, prompt: &dyn Prompt) -> Result<()> {
        match &self.method {
            Some(AuthMethod::Token) => {
                let token = prompt.secret("token")?;
                store.set_token(&token);
            }
            Some(AuthMethod::Userpass { username }) => {
                let password = prompt.secret("password")?;
                store
                    .userpass_login(username, &password)
                    .map_err(|e| AuthError::LoginFailed {
                        alias: self.alias.clone(),
                        reason: e.to_string(),
                    })?;
            }
            None => match &self.env_token {
                Some(token) => {
                    debug!(alias = %self.alias, "using {} environment variable", TOKEN_ENV);
                    store.set_token(token);
                }
                None => {
                    debug!(alias = %self.alias, "no auth method configured, prompting for token");
                    let token = prompt.secret("token")?;
                    store.set_token(&token);
                }
            },
        }
        Ok(())
    }

    /// Write the current token to the cache file with owner-only permissions.
    ///
    /// Failures are logged, not returned: the in-memory credential is still
    /// usable.
    ///
    /// # Returns
    ///
    /// `true` if the token was written.
    pub fn persist(&self, store: &dyn SecretStore) -> bool {
        let Some(path) = &self.token_file else {
            debug!(alias = %self.alias, "not storing token, no token file configured");
            return false;
        };
        let Some(token) = store.token() else {
            return false;
        };

        match write_private(path, token.as_bytes()) {
            Ok(()) => {
                debug!(path = %path.display(), "stored token");
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to store token");
                false
            }
        }
    }
}
