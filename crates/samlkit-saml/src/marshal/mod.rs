//! Marshalling between protocol objects and XML elements.
//!
//! [`ObjectRegistry`] maps each [`ObjectKind`] to a marshaller and each
//! element `(namespace, local name)` to an unmarshaller. The built-in set
//! covers every [`ProtocolObject`] variant; hosts may register more, or
//! replace a built-in, at any time.

mod assertion;
mod protocol;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use dashmap::DashMap;

use crate::error::{SamlError, SamlResult};
use crate::types::{ObjectKind, ProtocolObject, SAMLP_NS, SAML_NS};
use crate::xml::Element;

/// Converts a protocol object into its element.
pub type Marshaller = Arc<dyn Fn(&ProtocolObject) -> SamlResult<Element> + Send + Sync>;

/// Converts an element into a protocol object.
pub type Unmarshaller = Arc<dyn Fn(&Element) -> SamlResult<ProtocolObject> + Send + Sync>;

/// Thread-safe registry of marshallers and unmarshallers.
pub struct ObjectRegistry {
    marshallers: DashMap<ObjectKind, Marshaller>,
    unmarshallers: DashMap<(String, String), Unmarshaller>,
}

impl ObjectRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            marshallers: DashMap::new(),
            unmarshallers: DashMap::new(),
        }
    }

    /// Creates a registry populated with every built-in SAML type.
    #[must_use]
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        for kind in ObjectKind::ALL {
            registry.register_marshaller(kind, Arc::new(builtin_marshal));
        }

        registry.register_unmarshaller(SAMLP_NS, "Response", Arc::new(|e: &Element| {
            protocol::response_from_element(e).map(ProtocolObject::Response)
        }));
        registry.register_unmarshaller(SAMLP_NS, "AuthnRequest", Arc::new(|e: &Element| {
            protocol::authn_request_from_element(e).map(ProtocolObject::AuthnRequest)
        }));
        registry.register_unmarshaller(SAMLP_NS, "LogoutRequest", Arc::new(|e: &Element| {
            protocol::logout_request_from_element(e).map(ProtocolObject::LogoutRequest)
        }));
        registry.register_unmarshaller(SAMLP_NS, "LogoutResponse", Arc::new(|e: &Element| {
            protocol::logout_response_from_element(e).map(ProtocolObject::LogoutResponse)
        }));
        registry.register_unmarshaller(SAMLP_NS, "Status", Arc::new(|e: &Element| {
            protocol::status_from_element(e).map(ProtocolObject::Status)
        }));
        registry.register_unmarshaller(SAML_NS, "Assertion", Arc::new(|e: &Element| {
            assertion::assertion_from_element(e).map(ProtocolObject::Assertion)
        }));
        registry.register_unmarshaller(SAML_NS, "Issuer", Arc::new(|e: &Element| {
            assertion::issuer_from_element(e).map(ProtocolObject::Issuer)
        }));
        registry.register_unmarshaller(SAML_NS, "NameID", Arc::new(|e: &Element| {
            assertion::name_id_from_element(e).map(ProtocolObject::NameId)
        }));

        registry
    }

    /// Registers a marshaller, replacing any previous one for the kind.
    pub fn register_marshaller(&self, kind: ObjectKind, marshaller: Marshaller) {
        tracing::debug!(%kind, "Registering marshaller");
        self.marshallers.insert(kind, marshaller);
    }

    /// Registers an unmarshaller for an element, replacing any previous one.
    pub fn register_unmarshaller(&self, namespace: &str, local_name: &str, unmarshaller: Unmarshaller) {
        tracing::debug!(namespace, local_name, "Registering unmarshaller");
        self.unmarshallers
            .insert((namespace.to_string(), local_name.to_string()), unmarshaller);
    }

    /// Removes the marshaller for a kind. Returns true if one was registered.
    pub fn deregister_marshaller(&self, kind: ObjectKind) -> bool {
        self.marshallers.remove(&kind).is_some()
    }

    /// Removes the unmarshaller for an element. Returns true if one was registered.
    pub fn deregister_unmarshaller(&self, namespace: &str, local_name: &str) -> bool {
        self.unmarshallers
            .remove(&(namespace.to_string(), local_name.to_string()))
            .is_some()
    }

    /// Returns true if a marshaller is registered for the kind.
    #[must_use]
    pub fn has_marshaller(&self, kind: ObjectKind) -> bool {
        self.marshallers.contains_key(&kind)
    }

    /// Returns true if an unmarshaller is registered for the element name.
    #[must_use]
    pub fn has_unmarshaller(&self, namespace: &str, local_name: &str) -> bool {
        self.unmarshallers
            .contains_key(&(namespace.to_string(), local_name.to_string()))
    }

    /// Marshals an object into a fresh element.
    ///
    /// The returned root declares every namespace prefix its subtree uses.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::NoMarshaller`] if the kind has no marshaller, or
    /// the marshaller's own error.
    pub fn marshal(&self, object: &ProtocolObject) -> SamlResult<Element> {
        let kind = object.kind();
        let marshaller = self
            .marshallers
            .get(&kind)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(SamlError::NoMarshaller(kind))?;

        let mut element = marshaller(object)?;
        declare_namespaces(&mut element);
        Ok(element)
    }

    /// Unmarshals an element by its namespace and local name.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::NoUnmarshaller`] if nothing is registered for the
    /// element, or [`SamlError::InvalidProtocolObject`] if its content does
    /// not match the type.
    pub fn unmarshal(&self, element: &Element) -> SamlResult<ProtocolObject> {
        let namespace = element.namespace().unwrap_or_default();
        let local_name = element.local_name();
        let unmarshaller = self
            .unmarshallers
            .get(&(namespace.to_string(), local_name.to_string()))
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| SamlError::NoUnmarshaller(format!("{{{namespace}}}{local_name}")))?;

        unmarshaller(element)
    }
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for ObjectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRegistry")
            .field("marshallers", &self.marshallers.len())
            .field("unmarshallers", &self.unmarshallers.len())
            .finish()
    }
}

fn builtin_marshal(object: &ProtocolObject) -> SamlResult<Element> {
    Ok(match object {
        ProtocolObject::Response(response) => protocol::response_to_element(response),
        ProtocolObject::AuthnRequest(request) => protocol::authn_request_to_element(request),
        ProtocolObject::LogoutRequest(request) => protocol::logout_request_to_element(request),
        ProtocolObject::LogoutResponse(response) => protocol::logout_response_to_element(response),
        ProtocolObject::Status(status) => protocol::status_to_element(status),
        ProtocolObject::Assertion(value) => assertion::assertion_to_element(value),
        ProtocolObject::Issuer(issuer) => assertion::issuer_to_element(issuer),
        ProtocolObject::NameId(name_id) => assertion::name_id_to_element(name_id),
    })
}

/// Adds `xmlns` declarations on the root for every prefix the tree uses.
fn declare_namespaces(root: &mut Element) {
    let mut bindings: Vec<(String, String)> = Vec::new();
    for element in root.descendants() {
        let Some(namespace) = element.namespace() else {
            continue;
        };
        let prefix = element.prefix().unwrap_or_default();
        if !bindings.iter().any(|(p, _)| p == prefix) {
            bindings.push((prefix.to_string(), namespace.to_string()));
        }
    }

    for (prefix, namespace) in bindings {
        let declared = root.declares_prefix((!prefix.is_empty()).then_some(prefix.as_str()));
        if !declared {
            root.declare_namespace(&prefix, &namespace);
        }
    }
}

// ============================================================================
// Element helpers shared by the built-in marshallers
// ============================================================================

fn new_element(kind_prefix: &str, namespace: &str, local_name: &str) -> Element {
    Element::new_ns(format!("{kind_prefix}:{local_name}"), namespace)
}

/// Copies an opaque subtree and declares on its root every prefix it uses.
fn detached(element: &Element) -> Element {
    let mut copy = element.clone();
    declare_namespaces(&mut copy);
    copy
}

/// Fails on the first child element not named in `known`.
fn reject_unknown_children(element: &Element, known: &[(&str, &str)]) -> SamlResult<()> {
    let unknown = element
        .child_elements()
        .find(|child| !known.iter().any(|&(namespace, local)| child.is(namespace, local)));
    match unknown {
        Some(child) => Err(SamlError::invalid(
            element.local_name(),
            format!("unsupported child {}", child.name()),
        )),
        None => Ok(()),
    }
}

fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn expect_element(element: &Element, namespace: &str, local_name: &str) -> SamlResult<()> {
    if element.is(namespace, local_name) {
        Ok(())
    } else {
        Err(SamlError::invalid(
            local_name,
            format!("unexpected element {}", element.name()),
        ))
    }
}

fn required_attribute<'a>(element: &'a Element, name: &str) -> SamlResult<&'a str> {
    element
        .attribute(name)
        .ok_or_else(|| SamlError::invalid(element.local_name(), format!("missing {name} attribute")))
}

fn optional_string(element: &Element, name: &str) -> Option<String> {
    element.attribute(name).map(ToString::to_string)
}

fn parse_instant(element: &Element, name: &str, value: &str) -> SamlResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|e| SamlError::invalid(element.local_name(), format!("bad {name}: {e}")))
}

fn required_instant(element: &Element, name: &str) -> SamlResult<DateTime<Utc>> {
    parse_instant(element, name, required_attribute(element, name)?)
}

fn optional_instant(element: &Element, name: &str) -> SamlResult<Option<DateTime<Utc>>> {
    element
        .attribute(name)
        .map(|value| parse_instant(element, name, value))
        .transpose()
}

fn optional_bool(element: &Element, name: &str) -> SamlResult<Option<bool>> {
    match element.attribute(name) {
        None => Ok(None),
        Some("true" | "1") => Ok(Some(true)),
        Some("false" | "0") => Ok(Some(false)),
        Some(other) => Err(SamlError::invalid(
            element.local_name(),
            format!("bad {name}: {other}"),
        )),
    }
}

fn optional_u32(element: &Element, name: &str) -> SamlResult<Option<u32>> {
    element
        .attribute(name)
        .map(|value| {
            value.parse().map_err(|_| {
                SamlError::invalid(element.local_name(), format!("bad {name}: {value}"))
            })
        })
        .transpose()
}
