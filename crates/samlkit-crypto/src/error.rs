//! Errors raised while coercing key material.
//!
//! Messages identify what was rejected, never the key bytes or passwords
//! involved.

use thiserror::Error;

/// Result type for crypto coercions.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Key, certificate, keystore and credential errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// The input variant is outside the set the coercion accepts.
    #[error("cannot coerce {input} to {target}")]
    UnsupportedCoercionInput {
        /// The coercion that was requested.
        target: &'static str,
        /// The variant that was supplied.
        input: &'static str,
    },

    /// No handler or provider key factory knows the algorithm.
    #[error("unsupported key algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The algorithm is known but the provider rejected the key bytes.
    #[error("malformed {algorithm} key: {reason}")]
    MalformedKey {
        /// Algorithm the bytes were decoded as.
        algorithm: String,
        /// Provider diagnostic.
        reason: String,
    },

    /// The bytes are not a DER X.509 certificate.
    #[error("malformed certificate: {0}")]
    MalformedCertificate(String),

    /// The text is not base64.
    #[error("base64 decode error: {0}")]
    Base64(String),

    /// The keystore exists but could not be read or decrypted.
    #[error("keystore error: {0}")]
    Keystore(String),

    /// The alias names an entry that holds no private key.
    #[error("keystore entry {alias} is not a private key entry")]
    WrongEntryType {
        /// The alias that was looked up.
        alias: String,
    },

    /// The two halves of a credential belong to different key families.
    #[error("credential key mismatch: public key is {public}, private key is {private}")]
    KeyMismatch {
        /// Algorithm of the public half.
        public: String,
        /// Algorithm of the private half.
        private: String,
    },

    /// Provider registration failed; fatal for the process.
    #[error("crypto bootstrap failed: {0}")]
    Bootstrap(String),
}

impl CryptoError {
    /// Shorthand for [`CryptoError::UnsupportedCoercionInput`].
    #[must_use]
    pub const fn unsupported(target: &'static str, input: &'static str) -> Self {
        Self::UnsupportedCoercionInput { target, input }
    }

    /// Shorthand for [`CryptoError::MalformedKey`].
    #[must_use]
    pub fn malformed_key(algorithm: &str, reason: impl ToString) -> Self {
        Self::MalformedKey {
            algorithm: algorithm.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<base64::DecodeError> for CryptoError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Base64(err.to_string())
    }
}

impl From<p12_keystore::error::Error> for CryptoError {
    fn from(err: p12_keystore::error::Error) -> Self {
        Self::Keystore(err.to_string())
    }
}

impl From<std::io::Error> for CryptoError {
    fn from(err: std::io::Error) -> Self {
        Self::Keystore(err.to_string())
    }
}
