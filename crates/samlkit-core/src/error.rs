//! Error handling for samlkit configuration.
//!
//! Error messages name the offending setting but never echo secret values
//! such as keystore passwords.

use thiserror::Error;

/// Result type alias using the samlkit core error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// A setting holds a value outside its accepted range.
    #[error("invalid configuration value for {key}: {reason}")]
    InvalidValue {
        /// The environment variable or field name.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A setting that depends on another one was given on its own.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidValue`].
    #[must_use]
    pub fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            reason: reason.into(),
        }
    }
}
