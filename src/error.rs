//! Error types.
//!
//! Each concern has its own error enum; [`Error`] wraps them so that `?`
//! works across module boundaries.

use thiserror::Error;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error("{failed} of {total} secrets failed")]
    Incomplete { failed: usize, total: usize },
}

/// Configuration and locator errors. Raised before any backend I/O.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot parse locator '{locator}': {reason}")]
    InvalidLocator { locator: String, reason: String },

    #[error("no vault alias '{0}' is configured")]
    UnknownAlias(String),

    #[error("unknown auth method '{method}' configured for '{alias}'")]
    UnknownAuthMethod { alias: String, method: String },

    #[error("vault.{alias}.auth.username is required for userpass authentication")]
    MissingUsername { alias: String },

    #[error("ejson.public_key is required to write {0}")]
    MissingPublicKey(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Authentication errors for a single backend.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("authentication with '{0}' failed: credential rejected")]
    Rejected(String),

    #[error("login to '{alias}' failed: {reason}")]
    LoginFailed { alias: String, reason: String },

    #[error("failed to read credential: {0}")]
    Prompt(String),
}

/// Errors returned by a secret store client.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("request to {path} failed: {reason}")]
    Request { path: String, reason: String },

    #[error("{path}: backend returned {status}")]
    Status { path: String, status: u16 },

    #[error("{path}: unexpected response: {reason}")]
    Malformed { path: String, reason: String },

    #[error("permission denied: {0}")]
    Denied(String),

    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
}

/// Errors building a path tree.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TreeError {
    #[error("secret path '{0}' has no segments")]
    EmptyPath(String),

    #[error("secret path '{0}' uses the reserved segment '.'")]
    ReservedSegment(String),

    #[error("invalid tree document: {0}")]
    InvalidDocument(String),
}

/// File sink failures. Fatal: no partial output is left behind.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to serialize secrets: {0}")]
    Serialize(String),

    #[error("top-level key '{0}' is reserved in encrypted output")]
    ReservedKey(String),

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Encryption errors.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("armor failed: {0}")]
    ArmorFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
