//! # mc-core
//!
//! Core error definitions shared across the marketcal workspace.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Error types and the `ensure!` / `config_ensure!` macros.
pub mod errors;

pub use errors::{Error, Result};
