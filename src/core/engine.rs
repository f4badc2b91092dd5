//! Orchestration of the user-facing operations.
//!
//! Every operation follows the same order: resolve locators and build
//! sessions (configuration errors surface here, before any request is
//! sent), connect and authenticate, then walk.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::core::config::Config;
use crate::core::constants::{EJSON_SUFFIX, JSON_SUFFIX, TOKEN_ENV};
use crate::core::domain::{Endpoint, Outcome, SyncResult};
use crate::core::prompt::Prompt;
use crate::core::session::{AuthOutcome, Session};
use crate::core::sink::{FileFormat, FileSink, RemoveSink, StoreSink};
use crate::core::store::{Connector, SecretStore};
use crate::core::walker::{self, Visitor, WalkStats};
use crate::error::{ConfigError, Result};

/// Where a sync writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Another secret store
    Store(Endpoint),
    /// A local file
    File { path: PathBuf, format: FileFormat },
}

impl Destination {
    /// Classify a destination locator by its suffix.
    ///
    /// `.json` is plain file output, `.ejson` is encrypted file output for
    /// the configured public key, anything else is a store locator.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingPublicKey` for `.ejson` output without
    /// `ejson.public_key`, or any error of [`Endpoint::resolve`].
    pub fn parse(locator: &str, config: &Config) -> Result<Self> {
        if locator.ends_with(JSON_SUFFIX) {
            return Ok(Destination::File {
                path: PathBuf::from(locator),
                format: FileFormat::Json,
            });
        }
        if locator.ends_with(EJSON_SUFFIX) {
            let public_key = config
                .public_key()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingPublicKey(locator.to_string()))?;
            return Ok(Destination::File {
                path: PathBuf::from(locator),
                format: FileFormat::Encrypted {
                    public_key: public_key.to_string(),
                },
            });
        }
        Ok(Destination::Store(Endpoint::resolve(locator, config)?))
    }
}

/// Runs auth, list, remove and sync against configured backends
pub struct SyncEngine<'a> {
    config: &'a Config,
    connector: &'a dyn Connector,
    prompt: &'a dyn Prompt,
    env_token: Option<String>,
}

impl<'a> SyncEngine<'a> {
    /// Create an engine. The `VAULT_TOKEN` environment variable is read
    /// once here.
    pub fn new(config: &'a Config, connector: &'a dyn Connector, prompt: &'a dyn Prompt) -> Self {
        Self {
            config,
            connector,
            prompt,
            env_token: std::env::var(TOKEN_ENV).ok(),
        }
    }

    /// Override the token used for aliases without an auth method
    pub fn with_env_token(mut self, token: Option<String>) -> Self {
        self.env_token = token;
        self
    }

    fn session(&self, endpoint: &Endpoint) -> Result<Session> {
        Ok(Session::new(endpoint.name(), self.config)?.with_env_token(self.env_token.clone()))
    }

    fn connect(
        &self,
        endpoint: &Endpoint,
        session: &mut Session,
    ) -> Result<(Box<dyn SecretStore>, AuthOutcome)> {
        let mut store = self.connector.connect(endpoint)?;
        let outcome = session.authenticate(store.as_mut(), self.prompt)?;
        debug!(endpoint = %endpoint, ?outcome, "session ready");
        Ok((store, outcome))
    }

    /// Authenticate against `locator` and cache the token.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for a bad locator or auth settings, `StoreError`
    /// if no client can be built, and `AuthError` if authentication fails.
    pub fn authenticate(&self, locator: &str) -> Result<AuthOutcome> {
        let endpoint = Endpoint::resolve(locator, self.config)?;
        let mut session = self.session(&endpoint)?;
        let (_, outcome) = self.connect(&endpoint, &mut session)?;
        Ok(outcome)
    }

    /// Visit every secret below `locator`.
    ///
    /// # Errors
    ///
    /// See [`SyncEngine::authenticate`]. Traversal errors are counted in the
    /// returned stats, not returned.
    pub fn list(&self, locator: &str, visitor: &mut dyn Visitor) -> Result<WalkStats> {
        let endpoint = Endpoint::resolve(locator, self.config)?;
        let mut session = self.session(&endpoint)?;
        let (store, _) = self.connect(&endpoint, &mut session)?;

        Ok(walker::walk(store.as_ref(), endpoint.path(), visitor))
    }

    /// Delete every secret below `locator`, reporting each deletion.
    ///
    /// # Errors
    ///
    /// See [`SyncEngine::authenticate`]. Failed deletions are reported
    /// through `on_outcome` and counted, not returned.
    pub fn remove(&self, locator: &str, on_outcome: &mut dyn FnMut(&Outcome)) -> Result<SyncResult> {
        let endpoint = Endpoint::resolve(locator, self.config)?;
        let mut session = self.session(&endpoint)?;
        let (store, _) = self.connect(&endpoint, &mut session)?;

        let mut sink = RemoveSink::new(store.as_ref(), on_outcome);
        let stats = walker::walk(store.as_ref(), endpoint.path(), &mut sink);
        let tally = sink.tally();

        info!(endpoint = %endpoint, deleted = tally.succeeded, failed = tally.failed, "remove finished");
        Ok(SyncResult {
            secrets: stats.visited,
            failed: tally.failed,
            skipped: stats.skipped(),
        })
    }

    /// Copy every secret below `src` to `dst`.
    ///
    /// Store destinations receive each secret under its source path, and
    /// each write is reported through `on_outcome`. File destinations are
    /// written once after the walk.
    ///
    /// # Errors
    ///
    /// Returns configuration and authentication errors before anything is
    /// read, and `SinkError` or `CipherError` if file output fails.
    pub fn sync(
        &self,
        src: &str,
        dst: &str,
        on_outcome: &mut dyn FnMut(&Outcome),
    ) -> Result<SyncResult> {
        let source = Endpoint::resolve(src, self.config)?;
        let destination = Destination::parse(dst, self.config)?;
        let mut src_session = self.session(&source)?;

        match destination {
            Destination::Store(target) => {
                let mut dst_session = self.session(&target)?;
                let (src_store, _) = self.connect(&source, &mut src_session)?;
                let (dst_store, _) = self.connect(&target, &mut dst_session)?;

                let mut sink = StoreSink::new(dst_store.as_ref(), on_outcome);
                let stats = walker::walk(src_store.as_ref(), source.path(), &mut sink);
                let tally = sink.tally();

                info!(
                    from = %source,
                    to = %target,
                    written = tally.succeeded,
                    failed = tally.failed,
                    "sync finished"
                );
                Ok(SyncResult {
                    secrets: stats.visited,
                    failed: tally.failed,
                    skipped: stats.skipped(),
                })
            }
            Destination::File { path, format } => {
                let mut sink = FileSink::new(&format)?;
                let (src_store, _) = self.connect(&source, &mut src_session)?;

                let stats = walker::walk(src_store.as_ref(), source.path(), &mut sink);
                let failed = sink.rejected();
                sink.finish(&path)?;

                Ok(SyncResult {
                    secrets: stats.visited,
                    failed,
                    skipped: stats.skipped(),
                })
            }
        }
    }
}
