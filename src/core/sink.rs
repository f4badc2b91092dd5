//! Walk destinations.
//!
//! A sink is a [`Visitor`] that does something with each secret a walk
//! discovers:
//!
//! - [`StoreSink`] writes it to another store
//! - [`RemoveSink`] deletes it from the store being walked
//! - [`FileSink`] collects it into a [`PathTree`] that is written out once
//!   the walk is over
//!
//! Store sinks report an [`Outcome`] per secret and never stop a walk.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::core::cipher::{AgeCipher, Cipher};
use crate::core::constants::PUBLIC_KEY_FIELD;
use crate::core::domain::{Outcome, Secret};
use crate::core::fs::write_atomic;
use crate::core::store::SecretStore;
use crate::core::tree::PathTree;
use crate::core::walker::Visitor;
use crate::error::{Result, SinkError};

/// Counters shared by the store sinks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub succeeded: usize,
    pub failed: usize,
}

impl Tally {
    fn record(&mut self, outcome: &Outcome) {
        if outcome.is_ok() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Copies every visited secret to `dest` under the same path.
pub struct StoreSink<'a> {
    dest: &'a dyn SecretStore,
    on_outcome: &'a mut dyn FnMut(&Outcome),
    tally: Tally,
}

impl<'a> StoreSink<'a> {
    pub fn new(dest: &'a dyn SecretStore, on_outcome: &'a mut dyn FnMut(&Outcome)) -> Self {
        Self {
            dest,
            on_outcome,
            tally: Tally::default(),
        }
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }
}

impl Visitor for StoreSink<'_> {
    fn visit(&mut self, secret: Secret) {
        let outcome = match self.dest.write(secret.path(), secret.value()) {
            Ok(()) => {
                debug!(path = %secret.path(), "written");
                Outcome::Written(secret.path().to_string())
            }
            Err(e) => {
                warn!(path = %secret.path(), error = %e, "write failed");
                Outcome::Failed {
                    path: secret.path().to_string(),
                    reason: e.to_string(),
                }
            }
        };
        self.tally.record(&outcome);
        (self.on_outcome)(&outcome);
    }
}

/// Deletes every visited secret from `store`.
pub struct RemoveSink<'a> {
    store: &'a dyn SecretStore,
    on_outcome: &'a mut dyn FnMut(&Outcome),
    tally: Tally,
}

impl<'a> RemoveSink<'a> {
    pub fn new(store: &'a dyn SecretStore, on_outcome: &'a mut dyn FnMut(&Outcome)) -> Self {
        Self {
            store,
            on_outcome,
            tally: Tally::default(),
        }
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }
}

impl Visitor for RemoveSink<'_> {
    fn visit(&mut self, secret: Secret) {
        let outcome = match self.store.delete(secret.path()) {
            Ok(()) => {
                debug!(path = %secret.path(), "deleted");
                Outcome::Deleted(secret.path().to_string())
            }
            Err(e) => {
                warn!(path = %secret.path(), error = %e, "delete failed");
                Outcome::Failed {
                    path: secret.path().to_string(),
                    reason: e.to_string(),
                }
            }
        };
        self.tally.record(&outcome);
        (self.on_outcome)(&outcome);
    }
}

/// Serialization of a file destination, chosen by its suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileFormat {
    /// Plain nested JSON
    Json,
    /// Nested JSON plus `_public_key`, sealed for that key
    Encrypted { public_key: String },
}

/// Collects visited secrets into a tree and writes it to a file.
pub struct FileSink {
    tree: PathTree,
    cipher: Option<AgeCipher>,
    rejected: usize,
}

impl FileSink {
    /// Create a sink for `format`.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::InvalidPublicKey` if an encrypted format names a
    /// key that does not parse.
    pub fn new(format: &FileFormat) -> Result<Self> {
        let cipher = match format {
            FileFormat::Json => None,
            FileFormat::Encrypted { public_key } => Some(AgeCipher::for_public_key(public_key)?),
        };
        Ok(Self {
            tree: PathTree::new(),
            cipher,
            rejected: 0,
        })
    }

    /// Tree collected so far
    pub fn tree(&self) -> &PathTree {
        &self.tree
    }

    /// Secrets whose path could not be placed in the tree
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Serialize the collected tree, encrypting it if required.
    ///
    /// # Errors
    ///
    /// Returns `SinkError::ReservedKey` if encrypted output would clash with
    /// a secret named `_public_key`, `SinkError::Serialize` or `CipherError`.
    pub fn render(&self) -> Result<Vec<u8>> {
        let Some(cipher) = &self.cipher else {
            return self.tree.to_json();
        };

        if self.tree.root().contains_key(PUBLIC_KEY_FIELD) {
            return Err(SinkError::ReservedKey(PUBLIC_KEY_FIELD.to_string()).into());
        }
        let mut document = match serde_json::to_value(self.tree.root()) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(SinkError::Serialize("tree is not an object".to_string()).into()),
            Err(e) => return Err(SinkError::Serialize(e.to_string()).into()),
        };
        document.insert(
            PUBLIC_KEY_FIELD.to_string(),
            Value::String(cipher.public_key().to_string()),
        );
        let json = serde_json::to_vec(&document).map_err(|e| SinkError::Serialize(e.to_string()))?;

        debug!(cipher = cipher.name(), "encrypting output");
        Ok(cipher.encrypt(&json)?.into_bytes())
    }

    /// Render and write the output to `path`.
    ///
    /// Nothing is written unless rendering succeeds, and `path` is replaced
    /// in one step.
    ///
    /// # Returns
    ///
    /// Number of secrets written.
    ///
    /// # Errors
    ///
    /// See [`FileSink::render`]; returns `SinkError::Write` if the file
    /// cannot be written.
    pub fn finish(self, path: &Path) -> Result<usize> {
        let contents = self.render()?;
        write_atomic(path, &contents).map_err(|source| SinkError::Write {
            path: path.display().to_string(),
            source,
        })?;

        let count = self.tree.len();
        info!(path = %path.display(), secrets = count, "output written");
        Ok(count)
    }
}

impl Visitor for FileSink {
    fn visit(&mut self, secret: Secret) {
        if let Err(e) = self.tree.insert(&secret) {
            warn!(path = %secret.path(), error = %e, "cannot place secret in output");
            self.rejected += 1;
        }
    }
}
