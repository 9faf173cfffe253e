//! Responses an identity provider sends back.

use serde::{Deserialize, Serialize};

use super::{Assertion, Issuer, MessageHeader, Status};
use crate::xml::Element;

/// `samlp:Response`: the answer to an authentication request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Identification attributes and issuer.
    #[serde(flatten)]
    pub header: MessageHeader,
    /// ID of the request being answered; absent for unsolicited responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_response_to: Option<String>,
    /// Consent URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent: Option<String>,
    /// Outcome.
    pub status: Status,
    /// Plain assertions, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertions: Vec<Assertion>,
    /// `saml:EncryptedAssertion` subtrees, written after the plain
    /// assertions. Not part of the JSON form.
    #[serde(skip)]
    pub encrypted_assertions: Vec<Element>,
}

impl Response {
    /// Response issued now by `issuer` with `status`.
    #[must_use]
    pub fn new(issuer: impl Into<Issuer>, status: Status) -> Self {
        Self {
            header: MessageHeader::new(issuer),
            in_response_to: None,
            consent: None,
            status,
            assertions: Vec::new(),
            encrypted_assertions: Vec::new(),
        }
    }

    /// Successful response.
    #[must_use]
    pub fn success(issuer: impl Into<Issuer>) -> Self {
        Self::new(issuer, Status::success())
    }

    /// Marks the response as answering `request_id`.
    #[must_use]
    pub fn in_response_to(mut self, request_id: impl Into<String>) -> Self {
        self.in_response_to = Some(request_id.into());
        self
    }

    /// Sets the destination.
    #[must_use]
    pub fn with_destination(mut self, url: impl Into<String>) -> Self {
        self.header.destination = Some(url.into());
        self
    }

    /// Appends an assertion.
    #[must_use]
    pub fn with_assertion(mut self, assertion: Assertion) -> Self {
        self.assertions.push(assertion);
        self
    }

    /// Appends an encrypted assertion.
    #[must_use]
    pub fn with_encrypted_assertion(mut self, encrypted: Element) -> Self {
        self.encrypted_assertions.push(encrypted);
        self
    }

    /// Returns true if the status is `Success`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// `samlp:LogoutResponse`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutResponse {
    /// Identification attributes and issuer.
    #[serde(flatten)]
    pub header: MessageHeader,
    /// ID of the logout request being answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_response_to: Option<String>,
    /// Outcome.
    pub status: Status,
}

impl LogoutResponse {
    /// Logout response issued now by `issuer` with `status`.
    #[must_use]
    pub fn new(issuer: impl Into<Issuer>, status: Status) -> Self {
        Self {
            header: MessageHeader::new(issuer),
            in_response_to: None,
            status,
        }
    }

    /// Every session ended.
    #[must_use]
    pub fn success(issuer: impl Into<Issuer>) -> Self {
        Self::new(issuer, Status::success())
    }

    /// Some session participants could not be reached.
    #[must_use]
    pub fn partial_logout(issuer: impl Into<Issuer>) -> Self {
        Self::new(issuer, Status::partial_logout())
    }

    /// Marks the response as answering `request_id`.
    #[must_use]
    pub fn in_response_to(mut self, request_id: impl Into<String>) -> Self {
        self.in_response_to = Some(request_id.into());
        self
    }

    /// Sets the destination.
    #[must_use]
    pub fn with_destination(mut self, url: impl Into<String>) -> Self {
        self.header.destination = Some(url.into());
        self
    }

    /// Returns true if the status is `Success`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
