//! Sync command - copy secrets to a vault or a file.

use tracing::info;

use crate::cli::{finish, output};
use crate::core::domain::Outcome;
use crate::core::engine::SyncEngine;
use crate::error::Result;

/// Copy secrets from `source` to `destination`.
pub fn execute(engine: &SyncEngine, source: &str, destination: &str) -> Result<()> {
    info!(source, destination, "running sync");

    let mut report = |outcome: &Outcome| match outcome {
        Outcome::Failed { path, reason } => output::error(&format!("{}: {}", path, reason)),
        other => output::success(&format!("{} => {}", other.path(), other.path())),
    };

    let result = engine.sync(source, destination, &mut report)?;

    output::success(&format!(
        "synced {} secret(s) to {}",
        result.secrets.saturating_sub(result.failed),
        output::path(destination)
    ));
    finish(&result)
}
