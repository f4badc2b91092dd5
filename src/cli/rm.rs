//! Rm command - delete every secret below a locator.

use crate::cli::{finish, output};
use crate::core::domain::Outcome;
use crate::core::engine::SyncEngine;
use crate::error::Result;

/// Delete secrets below `locator`, reporting each one.
pub fn execute(engine: &SyncEngine, locator: &str) -> Result<()> {
    let mut report = |outcome: &Outcome| match outcome {
        Outcome::Failed { path, reason } => output::error(&format!("{}: {}", path, reason)),
        other => output::success(&format!("deleted {}", other.path())),
    };

    let result = engine.remove(locator, &mut report)?;
    if result.secrets == 0 {
        output::warn(&format!("no secrets found below {}", locator));
    }
    finish(&result)
}
