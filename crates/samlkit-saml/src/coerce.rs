//! Coercion of XML in any form into elements, documents, protocol objects
//! and text.
//!
//! Like the key coercions in `samlkit-crypto`, every entry point takes
//! `Option<&XmlInput>`: `None` gives `Ok(None)`, and an input already in the
//! requested form comes back unchanged.

use crate::bootstrap::{self, Toolkit};
use crate::error::{SamlError, SamlResult};
use crate::markup::Markup;
use crate::types::{
    Assertion, AuthnRequest, Issuer, LogoutRequest, LogoutResponse, NameId, ProtocolObject,
    Response, SignableMessage, Status,
};
use crate::xml::{self, writer, Document, Element};

/// XML in any of the shapes callers hand over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlInput {
    /// Serialized XML text.
    Text(String),
    /// Structured markup literal.
    Markup(Markup),
    /// Parsed document.
    Document(Document),
    /// Parsed element.
    Element(Element),
    /// Typed protocol object.
    Object(ProtocolObject),
}

impl XmlInput {
    /// Returns a short name of the variant for diagnostics.
    #[must_use]
    pub const fn variant_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Markup(_) => "markup",
            Self::Document(_) => "document",
            Self::Element(_) => "element",
            Self::Object(_) => "protocol object",
        }
    }
}

impl From<&str> for XmlInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for XmlInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Markup> for XmlInput {
    fn from(markup: Markup) -> Self {
        Self::Markup(markup)
    }
}

impl From<Document> for XmlInput {
    fn from(document: Document) -> Self {
        Self::Document(document)
    }
}

impl From<Element> for XmlInput {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<ProtocolObject> for XmlInput {
    fn from(object: ProtocolObject) -> Self {
        Self::Object(object)
    }
}

macro_rules! object_input {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for XmlInput {
                fn from(value: $ty) -> Self {
                    Self::Object(value.into())
                }
            }
        )+
    };
}

object_input!(Response, Assertion, AuthnRequest, LogoutRequest, LogoutResponse, Issuer, NameId, Status);

// ============================================================================
// Elements and documents
// ============================================================================

/// Coerces XML input to an element.
///
/// | Input | Result |
/// |---|---|
/// | element | unchanged |
/// | document | its root |
/// | protocol object | marshalled through the registry |
/// | text | parsed |
/// | markup | rendered, then parsed |
///
/// # Errors
///
/// Returns [`SamlError::MalformedXml`] for text that does not parse and
/// [`SamlError::NoMarshaller`] for objects without a marshaller.
pub fn to_element(input: Option<&XmlInput>) -> SamlResult<Option<Element>> {
    let toolkit = bootstrap::ensure_initialized()?;
    let Some(input) = input else {
        return Ok(None);
    };
    tracing::debug!(coercion = "element", input = input.variant_name(), "Coercing XML input");

    element_of(toolkit, input).map(Some)
}

/// Coerces XML input to an owned document.
///
/// Accepts the same inputs as [`to_element`]; a document comes back
/// unchanged and everything else is wrapped.
///
/// # Errors
///
/// Same as [`to_element`].
pub fn to_document(input: Option<&XmlInput>) -> SamlResult<Option<Document>> {
    let toolkit = bootstrap::ensure_initialized()?;
    let Some(input) = input else {
        return Ok(None);
    };
    tracing::debug!(coercion = "document", input = input.variant_name(), "Coercing XML input");

    match input {
        XmlInput::Document(document) => Ok(Some(document.clone())),
        other => element_of(toolkit, other).map(|root| Some(Document::new(root))),
    }
}

fn element_of(toolkit: &Toolkit, input: &XmlInput) -> SamlResult<Element> {
    match input {
        XmlInput::Element(element) => Ok(element.clone()),
        XmlInput::Document(document) => Ok(document.root().clone()),
        XmlInput::Object(object) => toolkit.registry().marshal(object),
        XmlInput::Text(text) => parse_root(text),
        XmlInput::Markup(markup) => parse_root(&markup.render(toolkit.indent())?),
    }
}

fn parse_root(text: &str) -> SamlResult<Element> {
    xml::parse(text).map(Document::into_root)
}

// ============================================================================
// Protocol objects
// ============================================================================

/// Coerces XML input to a protocol object.
///
/// Signable objects come back unchanged. Elements and documents are
/// unmarshalled by the element's namespace and local name; everything
/// else, including non-signable objects, is coerced to an element first.
///
/// # Errors
///
/// Returns [`SamlError::NoUnmarshaller`] for unknown elements,
/// [`SamlError::InvalidProtocolObject`] for elements with missing or
/// malformed content, plus any error of [`to_element`].
pub fn to_protocol_object(input: Option<&XmlInput>) -> SamlResult<Option<ProtocolObject>> {
    let toolkit = bootstrap::ensure_initialized()?;
    let Some(input) = input else {
        return Ok(None);
    };
    tracing::debug!(
        coercion = "protocol object",
        input = input.variant_name(),
        "Coercing XML input"
    );

    protocol_object_of(toolkit, input).map(Some)
}

fn protocol_object_of(toolkit: &Toolkit, input: &XmlInput) -> SamlResult<ProtocolObject> {
    let registry = toolkit.registry();
    match input {
        XmlInput::Object(object) if object.is_signable() => Ok(object.clone()),
        XmlInput::Element(element) => registry.unmarshal(element),
        XmlInput::Document(document) => registry.unmarshal(document.root()),
        other => registry.unmarshal(&element_of(toolkit, other)?),
    }
}

/// Coerces XML input to a specific signable message type.
///
/// A message of the requested type comes back unchanged; one of another
/// signable type is rejected without conversion. Everything else goes
/// through [`to_protocol_object`] and is then narrowed.
///
/// # Errors
///
/// Returns [`SamlError::IncompatibleProtocolType`] if the input is, or
/// unmarshals to, a different protocol type.
pub fn to_message<T: SignableMessage>(input: Option<&XmlInput>) -> SamlResult<Option<T>> {
    let toolkit = bootstrap::ensure_initialized()?;
    let Some(input) = input else {
        return Ok(None);
    };
    tracing::debug!(coercion = %T::KIND, input = input.variant_name(), "Narrowing XML input");

    let object = match input {
        XmlInput::Object(object) if object.kind() == T::KIND => object.clone(),
        XmlInput::Object(object) if object.is_signable() => {
            return Err(incompatible::<T>(object));
        }
        other => protocol_object_of(toolkit, other)?,
    };

    T::from_object(object)
        .map(Some)
        .map_err(|other| incompatible::<T>(&other))
}

fn incompatible<T: SignableMessage>(actual: &ProtocolObject) -> SamlError {
    SamlError::IncompatibleProtocolType {
        expected: T::KIND,
        actual: actual.kind(),
    }
}

/// Coerces XML input to a [`Response`].
///
/// # Errors
///
/// See [`to_message`].
pub fn to_response(input: Option<&XmlInput>) -> SamlResult<Option<Response>> {
    to_message(input)
}

/// Coerces XML input to an [`AuthnRequest`].
///
/// # Errors
///
/// See [`to_message`].
pub fn to_authn_request(input: Option<&XmlInput>) -> SamlResult<Option<AuthnRequest>> {
    to_message(input)
}

/// Coerces XML input to a [`LogoutRequest`].
///
/// # Errors
///
/// See [`to_message`].
pub fn to_logout_request(input: Option<&XmlInput>) -> SamlResult<Option<LogoutRequest>> {
    to_message(input)
}

/// Coerces XML input to a [`LogoutResponse`].
///
/// # Errors
///
/// See [`to_message`].
pub fn to_logout_response(input: Option<&XmlInput>) -> SamlResult<Option<LogoutResponse>> {
    to_message(input)
}

/// Coerces XML input to an [`Assertion`].
///
/// # Errors
///
/// See [`to_message`].
pub fn to_assertion(input: Option<&XmlInput>) -> SamlResult<Option<Assertion>> {
    to_message(input)
}

// ============================================================================
// Serialization
// ============================================================================

/// Serializes XML input to text.
///
/// Text comes back unchanged. Markup, elements and documents are written
/// with an XML declaration, UTF-8 encoding and the configured indentation;
/// protocol objects are marshalled first.
///
/// # Errors
///
/// Returns [`SamlError::Serialization`] if the writer fails, plus any
/// marshalling error for protocol objects.
pub fn to_xml_string(input: Option<&XmlInput>) -> SamlResult<Option<String>> {
    let toolkit = bootstrap::ensure_initialized()?;
    let Some(input) = input else {
        return Ok(None);
    };
    tracing::debug!(coercion = "text", input = input.variant_name(), "Coercing XML input");

    let indent = toolkit.indent();
    let text = match input {
        XmlInput::Text(text) => text.clone(),
        XmlInput::Markup(markup) => markup.render(indent)?,
        XmlInput::Element(element) => writer::element_to_string(element, indent)?,
        XmlInput::Document(document) => writer::document_to_string(document, indent)?,
        XmlInput::Object(object) => {
            writer::element_to_string(&toolkit.registry().marshal(object)?, indent)?
        }
    };
    Ok(Some(text))
}
