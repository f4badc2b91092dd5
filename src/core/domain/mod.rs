//! Domain types.

mod endpoint;
mod secret;
mod sync;

pub use endpoint::Endpoint;
pub use secret::Secret;
pub use sync::{Outcome, SyncResult};
