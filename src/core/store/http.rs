//! Vault HTTP API client.
//!
//! Implements [`SecretStore`] over the Vault `/v1/` HTTP API using a
//! blocking reqwest client. Secrets are stored as `{"value": "<payload>"}`.

use std::collections::HashMap;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, trace};
use url::Url;
use zeroize::Zeroizing;

use super::{api_path, SecretStore};
use crate::core::constants::{ALIAS_SCHEME, SEPARATOR, VALUE_FIELD};
use crate::error::{Result, StoreError};

const TOKEN_HEADER: &str = "X-Vault-Token";
const LOOKUP_SELF: &str = "auth/token/lookup-self";
const USERPASS_LOGIN: &str = "auth/userpass/login/";
const API_VERSION: &str = "v1";

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct Keys {
    keys: Vec<String>,
}

#[derive(Deserialize)]
struct Principal {
    id: Option<String>,
}

#[derive(Deserialize)]
struct Login {
    auth: LoginAuth,
}

#[derive(Deserialize)]
struct LoginAuth {
    client_token: String,
}

/// Vault server reached over HTTP
pub struct HttpVault {
    client: Client,
    address: Url,
    token: Option<Zeroizing<String>>,
}

impl HttpVault {
    /// Create a client for the server addressed by `url`.
    ///
    /// Only the scheme, host and port are used. `vault://` addresses are
    /// reached over https.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidUrl` if the URL has no host, or
    /// `StoreError::Request` if the HTTP client cannot be built.
    pub fn new(url: &Url) -> Result<Self> {
        let address = server_address(url)?;
        let client = Client::builder()
            .user_agent(concat!("syncrets/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StoreError::Request {
                path: address.to_string(),
                reason: e.to_string(),
            })?;

        debug!(address = %address, "vault client created");

        Ok(Self {
            client,
            address,
            token: None,
        })
    }

    /// API URL for `path`, one percent-encoded segment per path segment.
    ///
    /// A trailing separator survives as an empty last segment, which list
    /// requests rely on.
    fn endpoint(&self, path: &str) -> Result<Url> {
        self.url_for(api_path(path).split(SEPARATOR))
    }

    fn url_for<'s>(&self, segments: impl IntoIterator<Item = &'s str>) -> Result<Url> {
        let mut url = self.address.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::InvalidUrl(self.address.to_string()))?
            .clear()
            .push(API_VERSION)
            .extend(segments);
        Ok(url)
    }

    /// Send a request, mapping 404 to `None` and other failures to errors.
    fn send(&self, path: &str, request: RequestBuilder) -> Result<Option<Response>> {
        let request = match &self.token {
            Some(token) => request.header(TOKEN_HEADER, token.as_str()),
            None => request,
        };

        let response = request.send().map_err(|e| StoreError::Request {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        trace!(path, status = status.as_u16(), "vault response");

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status == StatusCode::FORBIDDEN {
            return Err(StoreError::Denied(path.to_string()).into());
        }
        if !status.is_success() {
            return Err(StoreError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            }
            .into());
        }
        Ok(Some(response))
    }

    /// Send a request whose 404 is an error rather than an absent value.
    fn send_required(&self, path: &str, request: RequestBuilder) -> Result<Response> {
        self.send(path, request)?.ok_or_else(|| {
            StoreError::Status {
                path: path.to_string(),
                status: StatusCode::NOT_FOUND.as_u16(),
            }
            .into()
        })
    }
}

fn parse<T: DeserializeOwned>(path: &str, response: Response) -> Result<T> {
    response.json::<T>().map_err(|e| {
        StoreError::Malformed {
            path: path.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

impl SecretStore for HttpVault {
    fn read(&self, path: &str) -> Result<Option<String>> {
        let request = self.client.get(self.endpoint(path)?);
        let Some(response) = self.send(path, request)? else {
            return Ok(None);
        };

        let envelope: Envelope<serde_json::Map<String, serde_json::Value>> =
            parse(path, response)?;
        match envelope.data.get(VALUE_FIELD) {
            Some(serde_json::Value::String(value)) => Ok(Some(value.clone())),
            _ => Err(StoreError::Malformed {
                path: path.to_string(),
                reason: format!("no string '{}' field", VALUE_FIELD),
            }
            .into()),
        }
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut url = self.endpoint(prefix)?;
        url.query_pairs_mut().append_pair("list", "true");

        match self.send(prefix, self.client.get(url))? {
            Some(response) => Ok(parse::<Envelope<Keys>>(prefix, response)?.data.keys),
            None => Ok(Vec::new()),
        }
    }

    fn write(&self, path: &str, value: &str) -> Result<()> {
        let body = HashMap::from([(VALUE_FIELD, value)]);
        let request = self.client.put(self.endpoint(path)?).json(&body);
        self.send_required(path, request)?;
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<()> {
        let request = self.client.delete(self.endpoint(path)?);
        self.send_required(path, request)?;
        Ok(())
    }

    fn set_token(&mut self, token: &str) {
        self.token = Some(Zeroizing::new(token.to_string()));
    }

    fn token(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.as_str())
    }

    fn userpass_login(&mut self, username: &str, password: &str) -> Result<()> {
        let path = format!("{}{}", USERPASS_LOGIN, username);
        let url = self.url_for(USERPASS_LOGIN.split_terminator(SEPARATOR).chain([username]))?;
        let body = serde_json::json!({ "password": password });
        let request = self.client.post(url).json(&body);

        let response = self.send_required(&path, request)?;
        let login: Login = parse(&path, response)?;
        self.set_token(&login.auth.client_token);

        debug!(username, "userpass login succeeded");
        Ok(())
    }

    fn lookup_self(&self) -> Result<Option<String>> {
        let request = self.client.get(self.endpoint(LOOKUP_SELF)?);
        let response = self.send_required(LOOKUP_SELF, request)?;
        let envelope: Envelope<Principal> = parse(LOOKUP_SELF, response)?;
        Ok(envelope.data.id)
    }
}

/// Reduce a locator URL to the server origin requests are sent to.
fn server_address(url: &Url) -> Result<Url> {
    let host = url
        .host_str()
        .ok_or_else(|| StoreError::InvalidUrl(url.to_string()))?;
    let scheme = match url.scheme() {
        ALIAS_SCHEME => "https",
        other => other,
    };
    let origin = match url.port() {
        Some(port) => format!("{}://{}:{}/", scheme, host, port),
        None => format!("{}://{}/", scheme, host),
    };
    Url::parse(&origin).map_err(|e| StoreError::InvalidUrl(format!("{}: {}", origin, e)).into())
}
