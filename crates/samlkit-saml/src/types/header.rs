//! Identification attributes shared by every protocol message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, Issuer, SAML_VERSION};
use crate::xml::Element;

/// `ID`, `Version`, `IssueInstant`, `Destination` and the `Issuer`,
/// `ds:Signature` and `samlp:Extensions` children, common to requests and
/// responses.
///
/// The signature and extensions are opaque subtrees: they survive an
/// element round trip unchanged but are left out of the JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    /// Message ID, an XML `NCName`.
    pub id: String,
    /// Protocol version.
    pub version: String,
    /// When the message was issued.
    pub issue_instant: DateTime<Utc>,
    /// Who issued the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<Issuer>,
    /// Endpoint the message is addressed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    /// Enveloped `ds:Signature`.
    #[serde(skip)]
    pub signature: Option<Element>,
    /// `samlp:Extensions`.
    #[serde(skip)]
    pub extensions: Option<Element>,
}

impl MessageHeader {
    /// Fresh header issued now by `issuer`.
    #[must_use]
    pub fn new(issuer: impl Into<Issuer>) -> Self {
        Self {
            issuer: Some(issuer.into()),
            ..Self::anonymous()
        }
    }

    /// Fresh header issued now, without an issuer.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            id: new_id(),
            version: SAML_VERSION.to_string(),
            issue_instant: Utc::now(),
            issuer: None,
            destination: None,
            signature: None,
            extensions: None,
        }
    }

    /// Returns the issuer's entity ID.
    #[must_use]
    pub fn issuer_id(&self) -> Option<&str> {
        self.issuer.as_ref().map(|issuer| issuer.value.as_str())
    }

    /// Returns true if the message carries a `ds:Signature`.
    #[must_use]
    pub const fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}
