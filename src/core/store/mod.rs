//! Secret store backends.
//!
//! A secret store is a hierarchical key/value backend that can list the
//! children of a prefix, read and write single paths, and manage its own
//! credential.
//!
//! ## Adding a New Store
//!
//! 1. Implement the `SecretStore` trait
//! 2. Add the implementation in a new file (e.g., `consul.rs`)
//! 3. Teach a `Connector` to build it and re-export from this module
//!
//! ## Example
//!
//! ```ignore
//! struct Consul { /* ... */ }
//!
//! impl SecretStore for Consul {
//!     fn read(&self, path: &str) -> Result<Option<String>> {
//!         // GET the key
//!     }
//!     fn list(&self, prefix: &str) -> Result<Vec<String>> {
//!         // list children, branches end with '/'
//!     }
//!     // ...
//! }
//! ```

use crate::error::Result;

mod backend;
mod http;
mod memory;

pub use backend::{Connector, HttpConnector, MemoryConnector};
pub use http::HttpVault;
pub use memory::MemoryStore;

/// Secret store capability.
///
/// Data operations take `&self` so that a store can be walked while a
/// visitor writes to or deletes from it. Credential changes take `&mut self`.
pub trait SecretStore {
    /// Read the value stored at `path`.
    ///
    /// # Returns
    ///
    /// `None` if nothing is stored at the path.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the request fails or the stored data has no
    /// string value.
    fn read(&self, path: &str) -> Result<Option<String>>;

    /// List the children of `prefix`.
    ///
    /// # Returns
    ///
    /// Child names in backend order. Names ending in `/` are branches,
    /// others are leaves. An unknown prefix has no children.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the request fails.
    fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Write `value` at `path`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend rejects the write.
    fn write(&self, path: &str, value: &str) -> Result<()>;

    /// Delete the value at `path`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend rejects the delete.
    fn delete(&self, path: &str) -> Result<()>;

    /// Replace the credential used for subsequent requests.
    fn set_token(&mut self, token: &str);

    /// Current credential, if any.
    fn token(&self) -> Option<&str>;

    /// Exchange a username and password for a credential and use it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the login request fails or is rejected.
    fn userpass_login(&mut self, username: &str, password: &str) -> Result<()>;

    /// Look up the principal owning the current credential.
    ///
    /// # Returns
    ///
    /// The principal identifier, or `None` if the backend answered without one.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the lookup fails (including a rejected token).
    fn lookup_self(&self) -> Result<Option<String>>;
}

/// Strip the leading separator the backend API does not expect.
pub(crate) fn api_path(path: &str) -> &str {
    path.trim_start_matches(crate::core::constants::SEPARATOR)
}
