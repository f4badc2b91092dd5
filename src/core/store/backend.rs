//! Store construction for resolved endpoints.
//!
//! The engine never builds clients itself; it asks a [`Connector`] for one.
//! Production code uses [`HttpConnector`], tests hand out in-memory stores.

use std::collections::HashMap;

use tracing::debug;

use super::{HttpVault, MemoryStore, SecretStore};
use crate::core::domain::Endpoint;
use crate::error::{Result, StoreError};

/// Builds a store client for an endpoint.
pub trait Connector {
    /// Create an unauthenticated client for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if no client can be built for the endpoint.
    fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn SecretStore>>;
}

/// Connects to Vault servers over HTTP
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpConnector;

impl Connector for HttpConnector {
    fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn SecretStore>> {
        debug!(alias = endpoint.name(), url = %endpoint.url(), "connecting");
        Ok(Box::new(HttpVault::new(endpoint.url())?))
    }
}

/// Hands out clients of in-memory stores keyed by endpoint name.
///
/// Every connection is a fresh clone without a token, sharing data with the
/// registered store.
#[derive(Debug, Default, Clone)]
pub struct MemoryConnector {
    stores: HashMap<String, MemoryStore>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `store` under the endpoint name `name`
    pub fn with_store(mut self, name: &str, store: MemoryStore) -> Self {
        self.stores.insert(name.to_string(), store);
        self
    }
}

impl Connector for MemoryConnector {
    fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn SecretStore>> {
        let store = self
            .stores
            .get(endpoint.name())
            .ok_or_else(|| StoreError::Request {
                path: endpoint.to_string(),
                reason: format!("no store registered for {}", endpoint.name()),
            })?;
        let mut client = store.clone();
        client.clear_token();
        Ok(Box::new(client))
    }
}
