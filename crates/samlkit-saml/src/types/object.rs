//! The closed set of protocol objects the toolkit marshals.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    Assertion, AuthnRequest, Issuer, LogoutRequest, LogoutResponse, NameId, Response, Status,
    SAMLP_NS, SAMLP_PREFIX, SAML_NS, SAML_PREFIX,
};

/// Kind of a protocol object; keys the marshaller registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// `samlp:Response`
    Response,
    /// `saml:Assertion`
    Assertion,
    /// `samlp:AuthnRequest`
    AuthnRequest,
    /// `samlp:LogoutRequest`
    LogoutRequest,
    /// `samlp:LogoutResponse`
    LogoutResponse,
    /// `saml:Issuer`
    Issuer,
    /// `saml:NameID`
    NameId,
    /// `samlp:Status`
    Status,
}

impl ObjectKind {
    /// Every kind, signable messages first.
    pub const ALL: [Self; 8] = [
        Self::Response,
        Self::Assertion,
        Self::AuthnRequest,
        Self::LogoutRequest,
        Self::LogoutResponse,
        Self::Issuer,
        Self::NameId,
        Self::Status,
    ];

    /// Returns true for kinds that can carry an enveloped signature.
    #[must_use]
    pub const fn is_signable(self) -> bool {
        !matches!(self, Self::Issuer | Self::NameId | Self::Status)
    }

    /// Returns the element's local name.
    #[must_use]
    pub const fn local_name(self) -> &'static str {
        match self {
            Self::Response => "Response",
            Self::Assertion => "Assertion",
            Self::AuthnRequest => "AuthnRequest",
            Self::LogoutRequest => "LogoutRequest",
            Self::LogoutResponse => "LogoutResponse",
            Self::Issuer => "Issuer",
            Self::NameId => "NameID",
            Self::Status => "Status",
        }
    }

    /// Returns the element's namespace URI.
    #[must_use]
    pub const fn namespace(self) -> &'static str {
        match self {
            Self::Assertion | Self::Issuer | Self::NameId => SAML_NS,
            _ => SAMLP_NS,
        }
    }

    /// Returns the prefix the marshallers write for this kind.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Assertion | Self::Issuer | Self::NameId => SAML_PREFIX,
            _ => SAMLP_PREFIX,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.local_name())
    }
}

/// A typed SAML construct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "object")]
pub enum ProtocolObject {
    /// Authentication response.
    Response(Response),
    /// Assertion.
    Assertion(Assertion),
    /// Authentication request.
    AuthnRequest(AuthnRequest),
    /// Logout request.
    LogoutRequest(LogoutRequest),
    /// Logout response.
    LogoutResponse(LogoutResponse),
    /// Message issuer.
    Issuer(Issuer),
    /// Subject name identifier.
    NameId(NameId),
    /// Protocol status.
    Status(Status),
}

impl ProtocolObject {
    /// Returns the object's kind.
    #[must_use]
    pub const fn kind(&self) -> ObjectKind {
        match self {
            Self::Response(_) => ObjectKind::Response,
            Self::Assertion(_) => ObjectKind::Assertion,
            Self::AuthnRequest(_) => ObjectKind::AuthnRequest,
            Self::LogoutRequest(_) => ObjectKind::LogoutRequest,
            Self::LogoutResponse(_) => ObjectKind::LogoutResponse,
            Self::Issuer(_) => ObjectKind::Issuer,
            Self::NameId(_) => ObjectKind::NameId,
            Self::Status(_) => ObjectKind::Status,
        }
    }

    /// Returns true for signable messages.
    #[must_use]
    pub const fn is_signable(&self) -> bool {
        self.kind().is_signable()
    }
}

/// A signable message type that a [`ProtocolObject`] can be narrowed to.
pub trait SignableMessage: Sized + Into<ProtocolObject> {
    /// Kind this type corresponds to.
    const KIND: ObjectKind;

    /// Extracts the message, or hands the object back if it is another kind.
    ///
    /// # Errors
    ///
    /// Returns the original object when its kind is not [`Self::KIND`].
    fn from_object(object: ProtocolObject) -> Result<Self, ProtocolObject>;

    /// Returns the message ID.
    fn id(&self) -> &str;
}

macro_rules! protocol_object {
    ($ty:ident) => {
        impl From<$ty> for ProtocolObject {
            fn from(value: $ty) -> Self {
                Self::$ty(value)
            }
        }
    };
    ($ty:ident, signable $(. $field:ident)*) => {
        protocol_object!($ty);

        impl SignableMessage for $ty {
            const KIND: ObjectKind = ObjectKind::$ty;

            fn from_object(object: ProtocolObject) -> Result<Self, ProtocolObject> {
                match object {
                    ProtocolObject::$ty(value) => Ok(value),
                    other => Err(other),
                }
            }

            fn id(&self) -> &str {
                &self$(.$field)*.id
            }
        }
    };
}

protocol_object!(Response, signable.header);
protocol_object!(Assertion, signable);
protocol_object!(AuthnRequest, signable.header);
protocol_object!(LogoutRequest, signable.header);
protocol_object!(LogoutResponse, signable.header);
protocol_object!(Issuer);
protocol_object!(NameId);
protocol_object!(Status);
