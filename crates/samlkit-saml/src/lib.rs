//! # samlkit-saml
//!
//! XML and SAML 2.0 protocol object coercion for samlkit.
//!
//! XML arrives as text, structured markup literals, parsed trees or typed
//! protocol objects; this crate converts between them:
//!
//! - [`to_element`] and [`to_document`] produce a parsed tree
//! - [`to_protocol_object`] produces a typed [`ProtocolObject`]
//! - [`to_response`] and the other `to_*` narrowings produce one message type
//! - [`to_xml_string`] produces serialized text
//!
//! Key and credential coercion lives in `samlkit-crypto` and is re-exported
//! here as [`crypto`].
//!
//! ```rust,ignore
//! use samlkit_saml::{to_element, to_xml_string, Markup, XmlInput, SAMLP_NS};
//!
//! let input = XmlInput::from(Markup::new("samlp:Response").attr("xmlns:samlp", SAMLP_NS));
//! let text = to_xml_string(Some(&input))?;
//! let element = to_element(Some(&input))?;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod bootstrap;
pub mod coerce;
pub mod error;
pub mod markup;
pub mod marshal;
pub mod types;
pub mod xml;

pub use bootstrap::ensure_initialized;
pub use coerce::{
    to_assertion, to_authn_request, to_document, to_element, to_logout_request,
    to_logout_response, to_message, to_protocol_object, to_response, to_xml_string, XmlInput,
};
pub use error::{SamlError, SamlResult};
pub use markup::{Markup, MarkupNode};
pub use marshal::{Marshaller, ObjectRegistry, Unmarshaller};
pub use types::*;
pub use xml::{Document, Element, Node};

pub use samlkit_crypto as crypto;
