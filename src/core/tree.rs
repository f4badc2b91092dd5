//! Nested reconstruction of slash-delimited secret paths.
//!
//! A [`PathTree`] folds `(path, value)` pairs into nested branches keyed by
//! path segment. When one path is both a leaf and a branch prefix, the leaf's
//! value lives under the sentinel key `.` inside the branch, whichever of the
//! two arrived first:
//!
//! ```text
//! secret/citizen       = four
//! secret/citizen/kane  = Rosebud
//!
//! {"secret":{"citizen":{".":"four","kane":"Rosebud"}}}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::constants::{SENTINEL_KEY, SEPARATOR};
use crate::core::domain::Secret;
use crate::error::{Result, SinkError, TreeError};

/// Children of a branch, keyed by path segment.
pub type Branch = BTreeMap<String, Node>;

/// A node in the tree: a secret value or a branch of further segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Scalar(String),
    Branch(Branch),
}

impl Node {
    /// Turn this node into a branch, re-homing a scalar under the sentinel key.
    fn as_branch_mut(&mut self) -> &mut Branch {
        if let Node::Scalar(value) = self {
            let displaced = Node::Scalar(std::mem::take(value));
            *self = Node::Branch(Branch::from([(SENTINEL_KEY.to_string(), displaced)]));
        }
        match self {
            Node::Branch(children) => children,
            Node::Scalar(_) => unreachable!("scalar nodes are converted above"),
        }
    }
}

/// Nested representation of a set of secrets.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PathTree {
    root: Branch,
}

impl PathTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a secret at its path.
    ///
    /// Empty segments (leading, trailing or repeated separators) are ignored.
    ///
    /// # Errors
    ///
    /// Returns `TreeError::EmptyPath` if the path has no segments and
    /// `TreeError::ReservedSegment` if any segment is the sentinel `.`.
    pub fn insert(&mut self, secret: &Secret) -> std::result::Result<(), TreeError> {
        let segments = segments(secret.path())?;
        let Some((last, parents)) = segments.split_last() else {
            return Err(TreeError::EmptyPath(secret.path().to_string()));
        };

        let mut branch = &mut self.root;
        for segment in parents {
            branch = branch
                .entry((*segment).to_string())
                .or_insert_with(|| Node::Branch(Branch::new()))
                .as_branch_mut();
        }

        let value = Node::Scalar(secret.value().to_string());
        match branch.get_mut(*last) {
            Some(Node::Branch(children)) => {
                trace!(path = secret.path(), "leaf stored under sentinel");
                children.insert(SENTINEL_KEY.to_string(), value);
            }
            _ => {
                branch.insert((*last).to_string(), value);
            }
        }
        Ok(())
    }

    /// Top-level branch
    pub fn root(&self) -> &Branch {
        &self.root
    }

    /// Number of secret values held in the tree
    pub fn len(&self) -> usize {
        fn count(branch: &Branch) -> usize {
            branch
                .values()
                .map(|node| match node {
                    Node::Scalar(_) => 1,
                    Node::Branch(children) => count(children),
                })
                .sum()
        }
        count(&self.root)
    }

    /// Check whether the tree holds no secrets
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialize as compact JSON with keys in sorted order.
    ///
    /// # Errors
    ///
    /// Returns `SinkError::Serialize` if encoding fails.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.root).map_err(|e| SinkError::Serialize(e.to_string()).into())
    }

    /// Parse a tree previously produced by [`PathTree::to_json`].
    ///
    /// # Errors
    ///
    /// Returns `TreeError::InvalidDocument` unless the input is a JSON object
    /// whose leaves are all strings.
    pub fn from_json(bytes: &[u8]) -> std::result::Result<Self, TreeError> {
        let root: Branch = serde_json::from_slice(bytes)
            .map_err(|e| TreeError::InvalidDocument(e.to_string()))?;
        Ok(Self { root })
    }

    /// Flatten back into secrets.
    ///
    /// Sentinel values map back to the path of their branch. Paths carry no
    /// leading separator.
    pub fn secrets(&self) -> Vec<Secret> {
        fn flatten(prefix: &str, branch: &Branch, out: &mut Vec<Secret>) {
            for (key, node) in branch {
                let path = if key == SENTINEL_KEY {
                    prefix.to_string()
                } else if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}{}{}", prefix, SEPARATOR, key)
                };
                match node {
                    Node::Scalar(value) => out.push(Secret::new(path, value.clone())),
                    Node::Branch(children) => flatten(&path, children, out),
                }
            }
        }

        let mut out = Vec::with_capacity(self.len());
        flatten("", &self.root, &mut out);
        out
    }
}

/// Non-empty segments of a path.
fn segments(path: &str) -> std::result::Result<Vec<&str>, TreeError> {
    let segments: Vec<&str> = path.split(SEPARATOR).filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return Err(TreeError::EmptyPath(path.to_string()));
    }
    if segments.contains(&SENTINEL_KEY) {
        return Err(TreeError::ReservedSegment(path.to_string()));
    }
    Ok(segments)
}
