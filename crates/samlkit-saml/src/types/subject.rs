//! Assertion subjects and how they are confirmed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{ConfirmationMethod, NameId};

/// Lifetime of the confirmation data built by
/// [`SubjectConfirmationData::for_request`].
pub const CONFIRMATION_LIFETIME_MINUTES: i64 = 5;

/// `saml:Subject`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Principal identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_id: Option<NameId>,
    /// Ways a relying party may confirm the presenter is the subject.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub confirmations: Vec<SubjectConfirmation>,
}

impl Subject {
    /// Subject identified by `name_id`, without confirmations.
    #[must_use]
    pub fn new(name_id: NameId) -> Self {
        Self {
            name_id: Some(name_id),
            confirmations: Vec::new(),
        }
    }

    /// Appends a confirmation.
    #[must_use]
    pub fn with_confirmation(mut self, confirmation: SubjectConfirmation) -> Self {
        self.confirmations.push(confirmation);
        self
    }
}

/// `saml:SubjectConfirmation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectConfirmation {
    /// Method URI, kept verbatim so unknown methods survive a round trip.
    pub method: String,
    /// Constraints on the confirmation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SubjectConfirmationData>,
}

impl SubjectConfirmation {
    /// Confirmation by `method`, without data.
    #[must_use]
    pub fn new(method: ConfirmationMethod) -> Self {
        Self {
            method: method.uri().to_string(),
            data: None,
        }
    }

    /// Bearer confirmation.
    #[must_use]
    pub fn bearer() -> Self {
        Self::new(ConfirmationMethod::Bearer)
    }

    /// Sets the data.
    #[must_use]
    pub fn with_data(mut self, data: SubjectConfirmationData) -> Self {
        self.data = Some(data);
        self
    }

    /// Returns the method if it is one of the standard ones.
    #[must_use]
    pub fn known_method(&self) -> Option<ConfirmationMethod> {
        ConfirmationMethod::from_uri(&self.method)
    }
}

/// `saml:SubjectConfirmationData`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectConfirmationData {
    /// Request the enclosing response answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_response_to: Option<String>,
    /// Confirmation is not possible before this instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<DateTime<Utc>>,
    /// Confirmation is not possible from this instant on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_on_or_after: Option<DateTime<Utc>>,
    /// Endpoint the assertion may be delivered to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    /// Network address of the presenter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl SubjectConfirmationData {
    /// Data binding an assertion to `request_id` and `recipient`,
    /// expiring [`CONFIRMATION_LIFETIME_MINUTES`] from now.
    #[must_use]
    pub fn for_request(request_id: impl Into<String>, recipient: impl Into<String>) -> Self {
        Self {
            in_response_to: Some(request_id.into()),
            not_on_or_after: Some(Utc::now() + Duration::minutes(CONFIRMATION_LIFETIME_MINUTES)),
            recipient: Some(recipient.into()),
            ..Self::default()
        }
    }
}
