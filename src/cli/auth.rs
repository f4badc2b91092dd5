//! Auth command - establish and cache a vault token.

use tracing::info;

use crate::cli::output;
use crate::core::engine::SyncEngine;
use crate::core::session::AuthOutcome;
use crate::error::Result;

/// Authenticate against `locator`.
pub fn execute(engine: &SyncEngine, locator: &str) -> Result<()> {
    info!(locator, "authenticating");

    match engine.authenticate(locator)? {
        AuthOutcome::Cached => output::success(&format!(
            "cached token for {} is valid",
            output::path(locator)
        )),
        AuthOutcome::Reauthenticated => {
            output::success(&format!("authenticated to {}", output::path(locator)))
        }
    }
    Ok(())
}
