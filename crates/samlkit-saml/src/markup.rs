//! Structured markup literals.
//!
//! A [`Markup`] is a lightweight (tag, attributes, children) value built in
//! code. Rendering it produces XML text; namespaces are whatever `xmlns`
//! attributes the literal carries.

use crate::error::SamlResult;
use crate::xml::{writer, Element};

/// A child of a markup literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    /// Nested literal.
    Element(Markup),
    /// Text content.
    Text(String),
}

/// An XML element written as a Rust value.
///
/// ```rust,ignore
/// let markup = Markup::new("samlp:Response")
///     .attr("xmlns:samlp", SAMLP_NS)
///     .attr("ID", "_r1")
///     .child(Markup::new("saml:Issuer").attr("xmlns:saml", SAML_NS).text("idp"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markup {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<MarkupNode>,
}

impl Markup {
    /// Starts a literal for the given qualified tag name.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Sets an attribute; a repeated name replaces the earlier value.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
        self
    }

    /// Appends a child literal.
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(MarkupNode::Element(child));
        self
    }

    /// Appends text content.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(MarkupNode::Text(text.into()));
        self
    }

    /// Returns the tag name.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the attributes in insertion order.
    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Returns the children.
    #[must_use]
    pub fn children(&self) -> &[MarkupNode] {
        &self.children
    }

    /// Renders the literal as XML text with a declaration header.
    ///
    /// No namespace checking happens here; parse the result to get a
    /// resolved tree.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SamlError::Serialization`] if the writer fails.
    pub fn render(&self, indent: usize) -> SamlResult<String> {
        writer::element_to_string(&self.to_unresolved_element(), indent)
    }

    fn to_unresolved_element(&self) -> Element {
        let mut element = Element::new(self.tag.as_str());
        for (name, value) in &self.attributes {
            element.set_attribute(name.as_str(), value.as_str());
        }
        for child in &self.children {
            match child {
                MarkupNode::Element(markup) => element.push_child(markup.to_unresolved_element()),
                MarkupNode::Text(text) => element.push_text(text.as_str()),
            }
        }
        element
    }
}
