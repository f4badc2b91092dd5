//! Minimal in-process Vault HTTP server.
//!
//! Speaks just enough of the `/v1/` API for the CLI: KV read, list, write
//! and delete, `auth/token/lookup-self` and userpass login. Every connection
//! serves one request and is closed.

use std::collections::{BTreeMap, HashMap};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use serde_json::{json, Value};

#[derive(Default)]
struct State {
    data: BTreeMap<String, String>,
    tokens: HashMap<String, String>,
    users: HashMap<String, (String, String)>,
    denied_writes: Vec<String>,
}

/// Handle to a running fake server; the thread lives until the test exits.
#[derive(Clone)]
pub struct FakeVault {
    url: String,
    state: Arc<Mutex<State>>,
}

impl FakeVault {
    /// Start a server on an ephemeral local port.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake vault");
        let url = format!("http://{}", listener.local_addr().unwrap());
        let state = Arc::new(Mutex::new(State::default()));

        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let _ = handle(stream, &shared);
            }
        });

        Self { url, state }
    }

    /// Base URL, e.g. `http://127.0.0.1:41234`
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Accept `token`, reporting `principal` on lookup-self.
    pub fn with_token(self, token: &str, principal: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .tokens
            .insert(token.to_string(), principal.to_string());
        self
    }

    /// Accept a userpass login issuing `token`.
    pub fn with_user(self, username: &str, password: &str, token: &str) -> Self {
        self.state.lock().unwrap().users.insert(
            username.to_string(),
            (password.to_string(), token.to_string()),
        );
        self.with_token(token, username)
    }

    /// Store a secret (path without leading `/`).
    pub fn with_secret(self, path: &str, value: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .data
            .insert(path.to_string(), value.to_string());
        self
    }

    /// Answer writes and deletes of `path` with 403.
    pub fn deny_write(self, path: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .denied_writes
            .push(path.to_string());
        self
    }

    /// Value stored at `path`.
    pub fn get(&self, path: &str) -> Option<String> {
        self.state.lock().unwrap().data.get(path).cloned()
    }

    /// Number of stored secrets.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().data.len()
    }
}

struct Request {
    method: String,
    path: String,
    query: String,
    token: Option<String>,
    body: Vec<u8>,
}

fn read_request(stream: &TcpStream) -> std::io::Result<Request> {
    let mut reader = BufReader::new(stream);

    let mut line = String::new();
    reader.read_line(&mut line)?;
    let mut parts = line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();
    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (decode(p), q.to_string()),
        None => (decode(&target), String::new()),
    };

    let mut token = None;
    let mut length = 0;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header)?;
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            let value = value.trim();
            if name.eq_ignore_ascii_case("x-vault-token") {
                token = Some(value.to_string());
            } else if name.eq_ignore_ascii_case("content-length") {
                length = value.parse().unwrap_or(0);
            }
        }
    }

    let mut body = vec![0; length];
    reader.read_exact(&mut body)?;

    Ok(Request {
        method,
        path,
        query,
        token,
        body,
    })
}

/// Percent-decode a request path.
fn decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let escaped = (bytes[i] == b'%')
            .then(|| raw.get(i + 1..i + 3))
            .flatten()
            .and_then(|hex| u8::from_str_radix(hex, 16).ok());
        match escaped {
            Some(byte) => {
                out.push(byte);
                i += 3;
            }
            None => {
                out.push(bytes[i]);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn respond(mut stream: TcpStream, status: u16, body: Option<Value>) -> std::io::Result<()> {
    let reason = match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        _ => "Error",
    };
    if status == 204 {
        write!(stream, "HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n")?;
        return stream.flush();
    }
    let body = body.map(|b| b.to_string()).unwrap_or_default();
    write!(
        stream,
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    )?;
    stream.flush()
}

fn handle(stream: TcpStream, state: &Mutex<State>) -> std::io::Result<()> {
    let request = read_request(&stream)?;
    let (status, body) = route(&request, &mut state.lock().unwrap());
    respond(stream, status, body)
}

fn route(request: &Request, state: &mut State) -> (u16, Option<Value>) {
    let Some(path) = request.path.strip_prefix("/v1/") else {
        return (404, None);
    };

    if let Some(user) = path.strip_prefix("auth/userpass/login/") {
        let password = serde_json::from_slice::<Value>(&request.body)
            .ok()
            .and_then(|b| b["password"].as_str().map(str::to_string));
        return match (state.users.get(user), password) {
            (Some((expected, token)), Some(given)) if *expected == given => {
                (200, Some(json!({ "auth": { "client_token": token } })))
            }
            _ => (400, Some(json!({ "errors": ["invalid username or password"] }))),
        };
    }

    let principal = request
        .token
        .as_ref()
        .and_then(|t| state.tokens.get(t))
        .cloned();
    let Some(principal) = principal else {
        return (403, Some(json!({ "errors": ["permission denied"] })));
    };

    if path == "auth/token/lookup-self" {
        return (200, Some(json!({ "data": { "id": principal } })));
    }

    match request.method.as_str() {
        "GET" if request.query.contains("list=true") => {
            let prefix = if path.is_empty() || path.ends_with('/') {
                path.to_string()
            } else {
                format!("{}/", path)
            };
            let mut keys: Vec<String> = Vec::new();
            for key in state.data.keys() {
                let Some(rest) = key.strip_prefix(&prefix) else {
                    continue;
                };
                let child = match rest.find('/') {
                    Some(idx) => &rest[..=idx],
                    None => rest,
                };
                if !child.is_empty() && !keys.iter().any(|k| k == child) {
                    keys.push(child.to_string());
                }
            }
            if keys.is_empty() {
                (404, Some(json!({ "errors": [] })))
            } else {
                (200, Some(json!({ "data": { "keys": keys } })))
            }
        }
        "GET" => match state.data.get(path) {
            Some(value) => (200, Some(json!({ "data": { "value": value } }))),
            None => (404, Some(json!({ "errors": [] }))),
        },
        "PUT" | "POST" | "DELETE" if state.denied_writes.iter().any(|d| d == path) => {
            (403, Some(json!({ "errors": ["permission denied"] })))
        }
        "PUT" | "POST" => {
            let value = serde_json::from_slice::<Value>(&request.body)
                .ok()
                .and_then(|b| b["value"].as_str().map(str::to_string));
            match value {
                Some(value) => {
                    state.data.insert(path.to_string(), value);
                    (204, None)
                }
                None => (400, Some(json!({ "errors": ["missing value"] }))),
            }
        }
        "DELETE" => {
            state.data.remove(path);
            (204, None)
        }
        _ => (405, None),
    }
}
