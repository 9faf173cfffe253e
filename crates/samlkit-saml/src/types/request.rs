//! Requests a service provider sends: authentication and logout.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{AuthnContextClass, Issuer, LogoutReason, MessageHeader, NameId, NameIdFormat, SamlBinding};

// ============================================================================
// AuthnRequest
// ============================================================================

/// `samlp:AuthnRequest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthnRequest {
    /// Identification attributes and issuer.
    #[serde(flatten)]
    pub header: MessageHeader,
    /// `AssertionConsumerServiceURL`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acs_url: Option<String>,
    /// `AssertionConsumerServiceIndex`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acs_index: Option<u32>,
    /// `AttributeConsumingServiceIndex`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_consuming_service_index: Option<u32>,
    /// Binding URI the response should arrive over.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_binding: Option<String>,
    /// Human-readable requester name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    /// Constraints on the subject identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_id_policy: Option<NameIdPolicy>,
    /// Acceptable authentication methods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_authn_context: Option<RequestedAuthnContext>,
    /// Re-authenticate even with an existing session.
    #[serde(default)]
    pub force_authn: bool,
    /// Do not interact with the user.
    #[serde(default)]
    pub is_passive: bool,
}

impl AuthnRequest {
    /// Request issued now by `issuer`.
    #[must_use]
    pub fn new(issuer: impl Into<Issuer>) -> Self {
        Self {
            header: MessageHeader::new(issuer),
            acs_url: None,
            acs_index: None,
            attribute_consuming_service_index: None,
            protocol_binding: None,
            provider_name: None,
            name_id_policy: None,
            requested_authn_context: None,
            force_authn: false,
            is_passive: false,
        }
    }

    /// Sets the destination.
    #[must_use]
    pub fn with_destination(mut self, url: impl Into<String>) -> Self {
        self.header.destination = Some(url.into());
        self
    }

    /// Sets the assertion consumer service URL.
    #[must_use]
    pub fn with_acs_url(mut self, url: impl Into<String>) -> Self {
        self.acs_url = Some(url.into());
        self
    }

    /// Sets the response binding.
    #[must_use]
    pub fn with_binding(mut self, binding: SamlBinding) -> Self {
        self.protocol_binding = Some(binding.uri().to_string());
        self
    }

    /// Sets the provider name.
    #[must_use]
    pub fn with_provider_name(mut self, name: impl Into<String>) -> Self {
        self.provider_name = Some(name.into());
        self
    }

    /// Sets the name identifier policy.
    #[must_use]
    pub fn with_name_id_policy(mut self, policy: NameIdPolicy) -> Self {
        self.name_id_policy = Some(policy);
        self
    }

    /// Sets the requested authentication context.
    #[must_use]
    pub fn with_authn_context(mut self, context: RequestedAuthnContext) -> Self {
        self.requested_authn_context = Some(context);
        self
    }

    /// Sets `ForceAuthn`.
    #[must_use]
    pub const fn force_authn(mut self, force: bool) -> Self {
        self.force_authn = force;
        self
    }

    /// Sets `IsPassive`.
    #[must_use]
    pub const fn passive(mut self, passive: bool) -> Self {
        self.is_passive = passive;
        self
    }
}

/// `samlp:NameIDPolicy`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameIdPolicy {
    /// Requested identifier format URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Affiliation the identifier should be scoped to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sp_name_qualifier: Option<String>,
    /// Whether the identity provider may create a new identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_create: Option<bool>,
}

impl NameIdPolicy {
    /// Policy requesting `format`.
    #[must_use]
    pub fn with_format(format: NameIdFormat) -> Self {
        Self {
            format: Some(format.uri().to_string()),
            ..Self::default()
        }
    }

    /// Sets `AllowCreate`.
    #[must_use]
    pub const fn allow_create(mut self, allow: bool) -> Self {
        self.allow_create = Some(allow);
        self
    }
}

/// `samlp:RequestedAuthnContext` restricted to class references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedAuthnContext {
    /// How the class references are compared with the actual method.
    pub comparison: AuthnContextComparison,
    /// Class reference URIs in preference order.
    pub class_refs: Vec<String>,
}

impl RequestedAuthnContext {
    /// Exactly `class`.
    #[must_use]
    pub fn exact(class: AuthnContextClass) -> Self {
        Self {
            comparison: AuthnContextComparison::Exact,
            class_refs: vec![class.uri().to_string()],
        }
    }

    /// Appends a class reference.
    #[must_use]
    pub fn with_class_ref(mut self, class: AuthnContextClass) -> Self {
        self.class_refs.push(class.uri().to_string());
        self
    }

    /// Sets the comparison.
    #[must_use]
    pub const fn with_comparison(mut self, comparison: AuthnContextComparison) -> Self {
        self.comparison = comparison;
        self
    }
}

/// `Comparison` attribute of a requested authentication context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthnContextComparison {
    /// One of the listed classes.
    #[default]
    Exact,
    /// At least as strong as one of them.
    Minimum,
    /// At most as strong as one of them.
    Maximum,
    /// Stronger than all of them.
    Better,
}

impl AuthnContextComparison {
    const ALL: [Self; 4] = [Self::Exact, Self::Minimum, Self::Maximum, Self::Better];

    /// Returns the attribute value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Minimum => "minimum",
            Self::Maximum => "maximum",
            Self::Better => "better",
        }
    }

    /// Reads an attribute value.
    #[must_use]
    pub fn from_attribute(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|comparison| comparison.as_str() == value)
    }
}

impl fmt::Display for AuthnContextComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// LogoutRequest
// ============================================================================

/// `samlp:LogoutRequest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutRequest {
    /// Identification attributes and issuer.
    #[serde(flatten)]
    pub header: MessageHeader,
    /// Principal being logged out.
    pub name_id: NameId,
    /// Sessions to end; empty means all of them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub session_indexes: Vec<String>,
    /// Reason URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Request expiry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_on_or_after: Option<DateTime<Utc>>,
}

impl LogoutRequest {
    /// Request issued now by `issuer` for `name_id`.
    #[must_use]
    pub fn new(issuer: impl Into<Issuer>, name_id: NameId) -> Self {
        Self {
            header: MessageHeader::new(issuer),
            name_id,
            session_indexes: Vec::new(),
            reason: None,
            not_on_or_after: None,
        }
    }

    /// Sets the destination.
    #[must_use]
    pub fn with_destination(mut self, url: impl Into<String>) -> Self {
        self.header.destination = Some(url.into());
        self
    }

    /// Appends a session index.
    #[must_use]
    pub fn with_session_index(mut self, index: impl Into<String>) -> Self {
        self.session_indexes.push(index.into());
        self
    }

    /// Sets the reason.
    #[must_use]
    pub fn with_reason(mut self, reason: LogoutReason) -> Self {
        self.reason = Some(reason.uri().to_string());
        self
    }

    /// Expires the request `lifetime` after its issue instant.
    #[must_use]
    pub fn expires_in(mut self, lifetime: Duration) -> Self {
        self.not_on_or_after = Some(self.header.issue_instant + lifetime);
        self
    }

    /// Returns true if the request has expired at `instant`.
    #[must_use]
    pub fn is_expired_at(&self, instant: DateTime<Utc>) -> bool {
        self.not_on_or_after.is_some_and(|end| instant >= end)
    }
}
