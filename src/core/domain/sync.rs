//! Sync result types.

/// What happened to one secret at the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Written to the destination store
    Written(String),
    /// Deleted from the store
    Deleted(String),
    /// Rejected by the destination; the walk carried on
    Failed { path: String, reason: String },
}

impl Outcome {
    /// Path the outcome refers to
    pub fn path(&self) -> &str {
        match self {
            Outcome::Written(path) | Outcome::Deleted(path) => path,
            Outcome::Failed { path, .. } => path,
        }
    }

    /// Whether the destination accepted the change
    pub fn is_ok(&self) -> bool {
        !matches!(self, Outcome::Failed { .. })
    }
}

/// Result of a sync, list or remove run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncResult {
    /// Secrets discovered by the walk
    pub secrets: usize,
    /// Secrets the destination rejected
    pub failed: usize,
    /// Prefixes or leaves skipped because a list or read failed
    pub skipped: usize,
}

impl SyncResult {
    /// Whether every discovered secret reached the destination
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}
