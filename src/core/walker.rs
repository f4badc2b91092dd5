//! Breadth-first traversal of a secret store.
//!
//! Starting from a root prefix, every listed branch is queued and every
//! listed leaf is read and handed to a [`Visitor`]. After its children, each
//! prefix is also read directly, because a path can be a listable branch and
//! hold its own value at the same time.
//!
//! Failures never abort the walk: a prefix whose listing fails is skipped
//! together with its subtree, and a leaf whose read fails is skipped alone.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, trace, warn};

use crate::core::constants::SEPARATOR;
use crate::core::domain::Secret;
use crate::core::store::SecretStore;

/// Receives each secret discovered by a walk.
///
/// Errors are the visitor's own business; nothing is reported back to the
/// walker.
pub trait Visitor {
    fn visit(&mut self, secret: Secret);
}

/// Collects visited secrets in visit order.
impl Visitor for Vec<Secret> {
    fn visit(&mut self, secret: Secret) {
        self.push(secret);
    }
}

/// Counters describing a finished walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Secrets handed to the visitor
    pub visited: usize,
    /// Prefixes skipped because listing failed
    pub list_errors: usize,
    /// Listed leaves skipped because reading failed
    pub read_errors: usize,
    /// Prefix value reads that failed; no listed path is lost
    pub probe_errors: usize,
}

impl WalkStats {
    /// Total listed paths skipped because of errors
    pub fn skipped(&self) -> usize {
        self.list_errors + self.read_errors
    }
}

/// Walk `store` below `root`, visiting every readable secret once.
///
/// Secrets are visited breadth first; siblings keep the order the store
/// listed them in.
pub fn walk(store: &dyn SecretStore, root: &str, visitor: &mut dyn Visitor) -> WalkStats {
    let mut queue = VecDeque::from([root.to_string()]);
    let mut seen = HashSet::new();
    let mut stats = WalkStats::default();

    debug!(root, "walk started");

    while let Some(prefix) = queue.pop_front() {
        let children = match store.list(&prefix) {
            Ok(children) => children,
            Err(e) => {
                warn!(prefix = %prefix, error = %e, "list failed, skipping prefix");
                stats.list_errors += 1;
                continue;
            }
        };
        trace!(prefix = %prefix, children = children.len(), "listed");

        for name in children {
            if name.ends_with(SEPARATOR) {
                queue.push_back(format!("{}{}", prefix, name));
                continue;
            }

            let path = join(&prefix, &name);
            match store.read(&path) {
                Ok(Some(value)) => visit(&mut seen, &mut stats, visitor, path, value),
                Ok(None) => debug!(path = %path, "listed leaf has no value"),
                Err(e) => {
                    warn!(path = %path, error = %e, "read failed, skipping");
                    stats.read_errors += 1;
                }
            }
        }

        let leaf = prefix.trim_end_matches(SEPARATOR);
        if leaf.is_empty() {
            continue;
        }
        match store.read(&prefix) {
            Ok(Some(value)) => {
                trace!(prefix = %prefix, "prefix holds a value");
                visit(&mut seen, &mut stats, visitor, leaf.to_string(), value);
            }
            Ok(None) => {}
            Err(e) => {
                debug!(prefix = %prefix, error = %e, "prefix read failed");
                stats.probe_errors += 1;
            }
        }
    }

    debug!(
        visited = stats.visited,
        list_errors = stats.list_errors,
        read_errors = stats.read_errors,
        probe_errors = stats.probe_errors,
        "walk finished"
    );
    stats
}

fn visit(
    seen: &mut HashSet<String>,
    stats: &mut WalkStats,
    visitor: &mut dyn Visitor,
    path: String,
    value: String,
) {
    if !seen.insert(path.clone()) {
        trace!(path = %path, "already visited");
        return;
    }
    stats.visited += 1;
    visitor.visit(Secret::new(path, value));
}

/// Join a prefix and a child name with exactly one separator.
fn join(prefix: &str, name: &str) -> String {
    if prefix.ends_with(SEPARATOR) {
        format!("{}{}", prefix, name)
    } else {
        format!("{}{}{}", prefix, SEPARATOR, name)
    }
}
