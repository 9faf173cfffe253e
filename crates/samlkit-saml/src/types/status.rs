//! Protocol status.

use serde::{Deserialize, Serialize};

use super::status_codes;

/// `samlp:Status`: outcome of the request a response answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Top-level code, possibly with nested detail codes.
    pub code: StatusCode,
    /// Human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Status {
    /// Status with the given code and no message.
    #[must_use]
    pub const fn new(code: StatusCode) -> Self {
        Self { code, message: None }
    }

    /// `Success`.
    #[must_use]
    pub fn success() -> Self {
        Self::new(StatusCode::new(status_codes::SUCCESS))
    }

    /// `Requester` with a message.
    #[must_use]
    pub fn requester_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::new(status_codes::REQUESTER)).with_message(message)
    }

    /// `Responder` with a message.
    #[must_use]
    pub fn responder_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::new(status_codes::RESPONDER)).with_message(message)
    }

    /// `Requester` / `AuthnFailed` with a message.
    #[must_use]
    pub fn authn_failed(message: impl Into<String>) -> Self {
        let code = StatusCode::new(status_codes::REQUESTER)
            .with_sub(StatusCode::new(status_codes::AUTHN_FAILED));
        Self::new(code).with_message(message)
    }

    /// `Success` / `PartialLogout`.
    #[must_use]
    pub fn partial_logout() -> Self {
        Self::new(
            StatusCode::new(status_codes::SUCCESS)
                .with_sub(StatusCode::new(status_codes::PARTIAL_LOGOUT)),
        )
    }

    /// Sets the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Returns true if the top-level code is `Success`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code.value == status_codes::SUCCESS
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::success()
    }
}

/// `samlp:StatusCode`, recursively nested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCode {
    /// Code URI.
    pub value: String,
    /// More specific code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<Box<StatusCode>>,
}

impl StatusCode {
    /// Code without detail.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            sub: None,
        }
    }

    /// Nests a more specific code.
    #[must_use]
    pub fn with_sub(mut self, sub: Self) -> Self {
        self.sub = Some(Box::new(sub));
        self
    }

    /// Iterates the code values from the top level down.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        std::iter::successors(Some(self), |code| code.sub.as_deref()).map(|code| code.value.as_str())
    }
}
