//! `saml:Assertion` and its validity conditions.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, AttributeStatement, AuthnStatement, Issuer, Subject, SAML_VERSION};
use crate::xml::Element;

/// Statements an issuer makes about a subject.
///
/// Unlike protocol messages an assertion always names its issuer, so
/// it carries its own identification fields rather than a
/// [`MessageHeader`](super::MessageHeader). `ds:Signature` and
/// `saml:Advice` are carried as opaque subtrees and skipped in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assertion {
    /// Assertion ID.
    pub id: String,
    /// Protocol version.
    pub version: String,
    /// When the assertion was issued.
    pub issue_instant: DateTime<Utc>,
    /// Asserting party.
    pub issuer: Issuer,
    /// Enveloped `ds:Signature`.
    #[serde(skip)]
    pub signature: Option<Element>,
    /// Who the statements are about.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,
    /// Validity window and audience restrictions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Conditions>,
    /// `saml:Advice`.
    #[serde(skip)]
    pub advice: Option<Element>,
    /// How and when the subject authenticated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authn_statements: Vec<AuthnStatement>,
    /// Attributes of the subject.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attribute_statements: Vec<AttributeStatement>,
}

impl Assertion {
    /// Empty assertion issued now.
    #[must_use]
    pub fn new(issuer: impl Into<Issuer>) -> Self {
        Self {
            id: new_id(),
            version: SAML_VERSION.to_string(),
            issue_instant: Utc::now(),
            issuer: issuer.into(),
            signature: None,
            subject: None,
            conditions: None,
            advice: None,
            authn_statements: Vec::new(),
            attribute_statements: Vec::new(),
        }
    }

    /// Replaces the generated ID.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the subject.
    #[must_use]
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Sets the conditions.
    #[must_use]
    pub fn with_conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = Some(conditions);
        self
    }

    /// Appends an authentication statement.
    #[must_use]
    pub fn with_authn_statement(mut self, statement: AuthnStatement) -> Self {
        self.authn_statements.push(statement);
        self
    }

    /// Appends an attribute statement.
    #[must_use]
    pub fn with_attribute_statement(mut self, statement: AttributeStatement) -> Self {
        self.attribute_statements.push(statement);
        self
    }

    /// Returns true if the assertion carries its own `ds:Signature`.
    #[must_use]
    pub const fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Every audience named by any restriction.
    pub fn audiences(&self) -> impl Iterator<Item = &str> {
        self.conditions
            .iter()
            .flat_map(|conditions| &conditions.audience_restrictions)
            .flat_map(|restriction| &restriction.audiences)
            .map(String::as_str)
    }
}

/// `saml:Conditions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conditions {
    /// Start of the window, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<DateTime<Utc>>,
    /// End of the window, exclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_on_or_after: Option<DateTime<Utc>>,
    /// All of these must be satisfied.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audience_restrictions: Vec<AudienceRestriction>,
    /// Set when a `saml:OneTimeUse` child is present.
    #[serde(default)]
    pub one_time_use: bool,
}

impl Conditions {
    /// Window opening now and lasting `lifetime`.
    #[must_use]
    pub fn starting_now(lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            not_before: Some(now),
            not_on_or_after: Some(now + lifetime),
            ..Self::default()
        }
    }

    /// Adds a restriction to a single audience.
    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience_restrictions.push(AudienceRestriction {
            audiences: vec![audience.into()],
        });
        self
    }

    /// Adds `saml:OneTimeUse`.
    #[must_use]
    pub const fn one_time_use(mut self) -> Self {
        self.one_time_use = true;
        self
    }

    /// Returns true if `instant` lies inside the window. Open ends are
    /// unbounded.
    #[must_use]
    pub fn is_valid_at(&self, instant: DateTime<Utc>) -> bool {
        self.not_before.map_or(true, |start| instant >= start)
            && self.not_on_or_after.map_or(true, |end| instant < end)
    }
}

/// `saml:AudienceRestriction`: any one of the audiences satisfies it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudienceRestriction {
    /// Audience URIs.
    pub audiences: Vec<String>,
}
