//! Error types for marketcal.
//!
//! Two failure classes matter to callers: a calendar definition that is
//! malformed ([`Error::Configuration`], fatal, raised while the definition is
//! built) and a lookup by an unknown name ([`Error::NotFound`], recoverable).
//! The `ensure!` and `config_ensure!` macros are shorthands for returning
//! the matching variant.

use thiserror::Error;

/// The top-level error type used throughout marketcal.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A calendar definition violates one of its construction invariants.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A name lookup failed.
    #[error("{kind} {name:?} is not one of the registered names: {}", available.join(", "))]
    NotFound {
        /// What was looked up (e.g. `"calendar"`, `"market time"`).
        kind: &'static str,
        /// The name that was requested.
        name: String,
        /// Every name that would have matched, sorted.
        available: Vec<String>,
    },

    /// Date-related error.
    #[error("date error: {0}")]
    Date(String),

    /// Precondition violated.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A configuration document could not be deserialized.
    #[error("malformed calendar document: {0}")]
    Json(String),

    /// General runtime error.
    #[error("{0}")]
    Runtime(String),
}

impl Error {
    /// Build a [`Error::NotFound`] from any iterator of candidate names.
    pub fn not_found<I, S>(kind: &'static str, name: impl Into<String>, available: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut available: Vec<String> = available.into_iter().map(Into::into).collect();
        available.sort();
        Error::NotFound {
            kind,
            name: name.into(),
            available,
        }
    }

    /// Return `true` for errors raised while building a definition.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}

/// Shorthand `Result` type used throughout marketcal.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Return `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use mc_core::{ensure, errors::Error};
/// fn positive(x: i32) -> mc_core::errors::Result<i32> {
///     ensure!(x > 0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1).is_ok());
/// assert!(positive(-1).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Return `Err(Error::Configuration(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use mc_core::{config_ensure, errors::Error};
/// fn one_default(defaults: usize) -> mc_core::errors::Result<()> {
///     config_ensure!(defaults == 1, "expected exactly one default, found {defaults}");
///     Ok(())
/// }
/// assert!(one_default(1).is_ok());
/// assert!(matches!(one_default(0), Err(Error::Configuration(_))));
/// ```
#[macro_export]
macro_rules! config_ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Configuration(
                format!($($msg)*)
            ));
        }
    };
}
