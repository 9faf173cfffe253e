//! Namespaces and the URI vocabularies SAML messages carry.

use std::fmt;

/// SAML 2.0 assertion namespace URI.
pub const SAML_NS: &str = "urn:oasis:names:tc:SAML:2.0:assertion";

/// SAML 2.0 protocol namespace URI.
pub const SAMLP_NS: &str = "urn:oasis:names:tc:SAML:2.0:protocol";

/// XML Signature namespace URI.
pub const DSIG_NS: &str = "http://www.w3.org/2000/09/xmldsig#";

/// Prefix written for [`SAML_NS`].
pub const SAML_PREFIX: &str = "saml";

/// Prefix written for [`SAMLP_NS`].
pub const SAMLP_PREFIX: &str = "samlp";

/// The only protocol version the marshallers accept.
pub const SAML_VERSION: &str = "2.0";

macro_rules! uri_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $uri:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the URI.
            #[must_use]
            pub const fn uri(self) -> &'static str {
                match self {
                    $(Self::$variant => $uri,)+
                }
            }

            /// Looks a value up by URI.
            #[must_use]
            pub fn from_uri(uri: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|value| value.uri() == uri)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.uri())
            }
        }
    };
}

uri_enum! {
    /// Protocol bindings a request can ask the response to use.
    pub enum SamlBinding {
        /// HTTP POST.
        HttpPost => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST",
        /// HTTP Redirect.
        HttpRedirect => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect",
        /// HTTP Artifact.
        HttpArtifact => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Artifact",
        /// SOAP.
        Soap => "urn:oasis:names:tc:SAML:2.0:bindings:SOAP",
    }
}

uri_enum! {
    /// `Format` values of a `NameID`.
    #[derive(Default)]
    pub enum NameIdFormat {
        /// Format left to the issuer.
        #[default]
        Unspecified => "urn:oasis:names:tc:SAML:1.1:nameid-format:unspecified",
        /// Email address.
        Email => "urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress",
        /// Entity identifier, the implied format of an `Issuer`.
        Entity => "urn:oasis:names:tc:SAML:2.0:nameid-format:entity",
        /// Opaque identifier stable across sessions.
        Persistent => "urn:oasis:names:tc:SAML:2.0:nameid-format:persistent",
        /// Opaque one-session identifier.
        Transient => "urn:oasis:names:tc:SAML:2.0:nameid-format:transient",
    }
}

uri_enum! {
    /// Authentication context class references.
    pub enum AuthnContextClass {
        /// No particular method.
        Unspecified => "urn:oasis:names:tc:SAML:2.0:ac:classes:unspecified",
        /// Password over an unprotected channel.
        Password => "urn:oasis:names:tc:SAML:2.0:ac:classes:Password",
        /// Password over TLS.
        PasswordProtectedTransport => "urn:oasis:names:tc:SAML:2.0:ac:classes:PasswordProtectedTransport",
        /// Client certificate.
        X509 => "urn:oasis:names:tc:SAML:2.0:ac:classes:X509",
    }
}

uri_enum! {
    /// Subject confirmation methods.
    pub enum ConfirmationMethod {
        /// Whoever presents the assertion.
        Bearer => "urn:oasis:names:tc:SAML:2.0:cm:bearer",
        /// Whoever proves possession of a key.
        HolderOfKey => "urn:oasis:names:tc:SAML:2.0:cm:holder-of-key",
        /// Vouched for by the attesting entity.
        SenderVouches => "urn:oasis:names:tc:SAML:2.0:cm:sender-vouches",
    }
}

uri_enum! {
    /// `NameFormat` values of an `Attribute`.
    pub enum AttributeNameFormat {
        /// Interpretation left to the parties.
        Unspecified => "urn:oasis:names:tc:SAML:2.0:attrname-format:unspecified",
        /// Name is a URI.
        Uri => "urn:oasis:names:tc:SAML:2.0:attrname-format:uri",
        /// Name is a plain string.
        Basic => "urn:oasis:names:tc:SAML:2.0:attrname-format:basic",
    }
}

uri_enum! {
    /// `Reason` values of a `LogoutRequest`.
    pub enum LogoutReason {
        /// The user ended the session.
        User => "urn:oasis:names:tc:SAML:2.0:logout:user",
        /// An administrator ended the session.
        Admin => "urn:oasis:names:tc:SAML:2.0:logout:admin",
    }
}

/// Status code URIs.
pub mod status_codes {
    /// Request succeeded.
    pub const SUCCESS: &str = "urn:oasis:names:tc:SAML:2.0:status:Success";
    /// Requester's fault.
    pub const REQUESTER: &str = "urn:oasis:names:tc:SAML:2.0:status:Requester";
    /// Responder's fault.
    pub const RESPONDER: &str = "urn:oasis:names:tc:SAML:2.0:status:Responder";
    /// Unsupported protocol version.
    pub const VERSION_MISMATCH: &str = "urn:oasis:names:tc:SAML:2.0:status:VersionMismatch";
    /// Second level: the principal could not be authenticated.
    pub const AUTHN_FAILED: &str = "urn:oasis:names:tc:SAML:2.0:status:AuthnFailed";
    /// Second level: some session participants were not logged out.
    pub const PARTIAL_LOGOUT: &str = "urn:oasis:names:tc:SAML:2.0:status:PartialLogout";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_uri_maps_back() {
        for binding in SamlBinding::ALL {
            assert_eq!(SamlBinding::from_uri(binding.uri()), Some(*binding));
        }
        for format in NameIdFormat::ALL {
            assert_eq!(NameIdFormat::from_uri(&format.to_string()), Some(*format));
        }
        assert_eq!(ConfirmationMethod::ALL.len(), 3);
    }

    #[test]
    fn unknown_uri() {
        assert_eq!(SamlBinding::from_uri("urn:example:binding"), None);
        assert_eq!(LogoutReason::from_uri(""), None);
    }

    #[test]
    fn name_id_format_defaults_to_unspecified() {
        assert_eq!(NameIdFormat::default(), NameIdFormat::Unspecified);
        assert!(NameIdFormat::default().uri().ends_with(":unspecified"));
    }
}
