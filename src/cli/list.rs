//! List command - print every secret path below a locator.

use crate::cli::output;
use crate::core::domain::Secret;
use crate::core::engine::SyncEngine;
use crate::core::walker::Visitor;
use crate::error::Result;

/// Prints paths as the walk discovers them.
struct Printer;

impl Visitor for Printer {
    fn visit(&mut self, secret: Secret) {
        output::line(secret.path());
    }
}

/// List secrets below `locator`.
pub fn execute(engine: &SyncEngine, locator: &str) -> Result<()> {
    let stats = engine.list(locator, &mut Printer)?;

    if stats.skipped() > 0 {
        output::warn(&format!(
            "{} path(s) could not be read and were skipped",
            stats.skipped()
        ));
    }
    Ok(())
}
