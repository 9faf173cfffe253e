//! Name identifiers.

use serde::{Deserialize, Serialize};

use super::NameIdFormat;

/// `saml:NameID`: who an assertion or logout request is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameId {
    /// Identifier text.
    pub value: String,
    /// Format URI; `None` means unspecified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Domain of the identity provider that issued the identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_qualifier: Option<String>,
    /// Service provider the identifier was issued for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sp_name_qualifier: Option<String>,
}

impl NameId {
    /// Creates an identifier without a format.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            format: None,
            name_qualifier: None,
            sp_name_qualifier: None,
        }
    }

    /// Email address identifier.
    #[must_use]
    pub fn email(address: impl Into<String>) -> Self {
        Self::new(address).with_format(NameIdFormat::Email)
    }

    /// Persistent pseudonym.
    #[must_use]
    pub fn persistent(value: impl Into<String>) -> Self {
        Self::new(value).with_format(NameIdFormat::Persistent)
    }

    /// One-session pseudonym.
    #[must_use]
    pub fn transient(value: impl Into<String>) -> Self {
        Self::new(value).with_format(NameIdFormat::Transient)
    }

    /// Sets the format.
    #[must_use]
    pub fn with_format(mut self, format: NameIdFormat) -> Self {
        self.format = Some(format.uri().to_string());
        self
    }

    /// Sets the name qualifier.
    #[must_use]
    pub fn with_name_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.name_qualifier = Some(qualifier.into());
        self
    }

    /// Sets the service provider name qualifier.
    #[must_use]
    pub fn with_sp_name_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.sp_name_qualifier = Some(qualifier.into());
        self
    }

    /// Returns the known format, treating absent and unknown URIs as
    /// [`NameIdFormat::Unspecified`].
    #[must_use]
    pub fn known_format(&self) -> NameIdFormat {
        self.format
            .as_deref()
            .and_then(NameIdFormat::from_uri)
            .unwrap_or_default()
    }
}

/// `saml:Issuer`: the entity that produced a message or assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issuer {
    /// Entity ID.
    pub value: String,
    /// Format URI; usually omitted since the entity format is implied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Issuer {
    /// Creates an issuer with the implied format.
    #[must_use]
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            value: entity_id.into(),
            format: None,
        }
    }

    /// Creates an issuer that spells out the entity format.
    #[must_use]
    pub fn entity(entity_id: impl Into<String>) -> Self {
        Self {
            format: Some(NameIdFormat::Entity.uri().to_string()),
            ..Self::new(entity_id)
        }
    }
}

impl From<&str> for Issuer {
    fn from(entity_id: &str) -> Self {
        Self::new(entity_id)
    }
}

impl From<String> for Issuer {
    fn from(entity_id: String) -> Self {
        Self::new(entity_id)
    }
}
