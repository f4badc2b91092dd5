//! In-memory secret store.
//!
//! Mirrors the listing semantics of a Vault KV mount: listing a prefix yields
//! the next segment of every key below it, with a trailing `/` on segments
//! that have further children. Failures can be injected per path and
//! credential checks are counted.
//!
//! Clones share the stored data like two clients of one server; each clone
//! holds its own token.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use tracing::trace;

use super::{api_path, SecretStore};
use crate::core::constants::SEPARATOR;
use crate::core::domain::Secret;
use crate::error::{Result, StoreError};

#[derive(Debug, Default)]
struct Server {
    data: RefCell<BTreeMap<String, String>>,
    tokens: RefCell<HashMap<String, Option<String>>>,
    users: RefCell<HashMap<String, (String, String)>>,
    failing_lists: RefCell<HashSet<String>>,
    failing_reads: RefCell<HashSet<String>>,
    failing_writes: RefCell<HashSet<String>>,
    lookups: Cell<usize>,
    logins: Cell<usize>,
}

/// Secret store held in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    server: Rc<Server>,
    token: Option<String>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a secret
    pub fn with_secret(self, path: &str, value: &str) -> Self {
        self.insert(path, value);
        self
    }

    /// Accept `token`, reporting `principal` on self-lookup.
    pub fn with_token(self, token: &str, principal: Option<&str>) -> Self {
        self.server
            .tokens
            .borrow_mut()
            .insert(token.to_string(), principal.map(str::to_string));
        self
    }

    /// Accept a userpass login, issuing `token`.
    ///
    /// The issued token is accepted with the username as principal.
    pub fn with_user(self, username: &str, password: &str, token: &str) -> Self {
        self.server.users.borrow_mut().insert(
            username.to_string(),
            (password.to_string(), token.to_string()),
        );
        self.with_token(token, Some(username))
    }

    /// Fail every `list` of `prefix`
    pub fn fail_list(self, prefix: &str) -> Self {
        self.server.failing_lists.borrow_mut().insert(list_key(prefix));
        self
    }

    /// Fail every `read` of `path`
    pub fn fail_read(self, path: &str) -> Self {
        self.server
            .failing_reads
            .borrow_mut()
            .insert(api_path(path).to_string());
        self
    }

    /// Fail every `write` or `delete` of `path`
    pub fn fail_write(self, path: &str) -> Self {
        self.server
            .failing_writes
            .borrow_mut()
            .insert(api_path(path).to_string());
        self
    }

    /// Store a value without going through the trait
    pub fn insert(&self, path: &str, value: &str) {
        self.server
            .data
            .borrow_mut()
            .insert(api_path(path).to_string(), value.to_string());
    }

    /// Snapshot of every stored secret, in path order
    pub fn secrets(&self) -> Vec<Secret> {
        self.server
            .data
            .borrow()
            .iter()
            .map(|(path, value)| Secret::new(path.clone(), value.clone()))
            .collect()
    }

    /// Value stored at `path`
    pub fn get(&self, path: &str) -> Option<String> {
        self.server.data.borrow().get(api_path(path)).cloned()
    }

    /// Number of self-lookups performed against this server
    pub fn lookups(&self) -> usize {
        self.server.lookups.get()
    }

    /// Number of userpass logins attempted against this server
    pub fn logins(&self) -> usize {
        self.server.logins.get()
    }

    /// Drop this client's credential
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    fn rejected(set: &RefCell<HashSet<String>>, key: &str) -> bool {
        set.borrow().contains(key)
    }
}

/// Normalized list prefix: no leading separator, trailing separator unless root.
fn list_key(prefix: &str) -> String {
    let prefix = api_path(prefix);
    if prefix.is_empty() || prefix.ends_with(SEPARATOR) {
        prefix.to_string()
    } else {
        format!("{}{}", prefix, SEPARATOR)
    }
}

impl SecretStore for MemoryStore {
    fn read(&self, path: &str) -> Result<Option<String>> {
        let key = api_path(path);
        if Self::rejected(&self.server.failing_reads, key) {
            return Err(StoreError::Status {
                path: path.to_string(),
                status: 500,
            }
            .into());
        }
        trace!(path, "memory read");
        Ok(self.server.data.borrow().get(key).cloned())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix_key = list_key(prefix);
        if Self::rejected(&self.server.failing_lists, &prefix_key) {
            return Err(StoreError::Status {
                path: prefix.to_string(),
                status: 500,
            }
            .into());
        }

        let mut children: Vec<String> = Vec::new();
        for key in self.server.data.borrow().keys() {
            let Some(rest) = key.strip_prefix(prefix_key.as_str()) else {
                continue;
            };
            let child = match rest.find(SEPARATOR) {
                Some(idx) => &rest[..=idx],
                None => rest,
            };
            if !child.is_empty() && !children.iter().any(|c| c == child) {
                children.push(child.to_string());
            }
        }
        trace!(prefix, children = children.len(), "memory list");
        Ok(children)
    }

    fn write(&self, path: &str, value: &str) -> Result<()> {
        if Self::rejected(&self.server.failing_writes, api_path(path)) {
            return Err(StoreError::Denied(path.to_string()).into());
        }
        self.insert(path, value);
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<()> {
        if Self::rejected(&self.server.failing_writes, api_path(path)) {
            return Err(StoreError::Denied(path.to_string()).into());
        }
        self.server.data.borrow_mut().remove(api_path(path));
        Ok(())
    }

    fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn userpass_login(&mut self, username: &str, password: &str) -> Result<()> {
        self.server.logins.set(self.server.logins.get() + 1);
        let issued = match self.server.users.borrow().get(username) {
            Some((expected, token)) if expected == password => token.clone(),
            _ => return Err(StoreError::Denied(format!("login for {}", username)).into()),
        };
        self.set_token(&issued);
        Ok(())
    }

    fn lookup_self(&self) -> Result<Option<String>> {
        self.server.lookups.set(self.server.lookups.get() + 1);
        let tokens = self.server.tokens.borrow();
        match self.token.as_ref().and_then(|t| tokens.get(t)) {
            Some(principal) => Ok(principal.clone()),
            None => Err(StoreError::Denied("auth/token/lookup-self".to_string()).into()),
        }
    }
}
