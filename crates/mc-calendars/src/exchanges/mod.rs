//! Built-in exchange calendars.

use mc_core::errors::Result;

use crate::registry::Registry;

/// EUREX.
pub mod eurex;

pub use eurex::Eurex;

/// Register every built-in exchange with `registry`.
pub fn register_builtins(registry: &Registry) -> Result<()> {
    registry.register(Eurex)?;
    Ok(())
}
