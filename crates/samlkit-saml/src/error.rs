//! SAML error types.
//!
//! Provides error types for XML parsing and serialization, protocol object
//! marshalling, and narrowing between protocol types.

use samlkit_crypto::CryptoError;
use thiserror::Error;

use crate::types::ObjectKind;

/// Result type for SAML operations.
pub type SamlResult<T> = Result<T, SamlError>;

/// SAML coercion errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SamlError {
    /// Key, certificate or credential coercion failed.
    #[error(transparent)]
    Crypto(CryptoError),

    /// Text is not well-formed, namespace-valid XML.
    #[error("malformed XML: {0}")]
    MalformedXml(String),

    /// No marshaller is registered for the object kind.
    #[error("no marshaller registered for {0}")]
    NoMarshaller(ObjectKind),

    /// No unmarshaller is registered for the element.
    #[error("no unmarshaller registered for element {0}")]
    NoUnmarshaller(String),

    /// The element matched a protocol type but its content is invalid.
    #[error("invalid {element}: {reason}")]
    InvalidProtocolObject {
        /// Name of the offending element.
        element: String,
        /// What was missing or malformed.
        reason: String,
    },

    /// The object is a different protocol type than requested.
    #[error("incompatible protocol type: expected {expected}, got {actual}")]
    IncompatibleProtocolType {
        /// Requested type.
        expected: ObjectKind,
        /// Actual type.
        actual: ObjectKind,
    },

    /// Writing serialized XML failed.
    #[error("XML serialization error: {0}")]
    Serialization(String),
}

impl SamlError {
    /// Shorthand for [`SamlError::InvalidProtocolObject`].
    #[must_use]
    pub fn invalid(element: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidProtocolObject {
            element: element.into(),
            reason: reason.into(),
        }
    }
}

impl From<CryptoError> for SamlError {
    fn from(err: CryptoError) -> Self {
        Self::Crypto(err)
    }
}

impl From<quick_xml::Error> for SamlError {
    fn from(err: quick_xml::Error) -> Self {
        Self::MalformedXml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for SamlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::MalformedXml(err.to_string())
    }
}

impl From<std::io::Error> for SamlError {
    fn from(err: std::io::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
