//! Constants used throughout syncrets.
//!
//! Centralizes magic strings and configuration values.

/// Separator between path segments.
pub const SEPARATOR: char = '/';

/// Reserved key holding a scalar displaced by a branch at the same path.
pub const SENTINEL_KEY: &str = ".";

/// Configuration file looked up in the current directory.
pub const CONFIG_FILE: &str = "syncrets.toml";

/// Per-user configuration directory relative to HOME (`~/.syncrets`).
pub const CONFIG_DIR: &str = ".syncrets";

/// Configuration file name inside [`CONFIG_DIR`].
pub const USER_CONFIG_FILE: &str = "config.toml";

/// Environment variable consulted when no auth method is configured.
pub const TOKEN_ENV: &str = "VAULT_TOKEN";

/// URL scheme for alias-based locators (`vault://<alias>/<path>`).
pub const ALIAS_SCHEME: &str = "vault";

/// Field in a stored secret's data that holds its value.
pub const VALUE_FIELD: &str = "value";

/// Top-level field carrying the public key in encrypted output.
pub const PUBLIC_KEY_FIELD: &str = "_public_key";

/// File suffix selecting the plain JSON sink.
pub const JSON_SUFFIX: &str = ".json";

/// File suffix selecting the encrypted JSON sink.
pub const EJSON_SUFFIX: &str = ".ejson";
