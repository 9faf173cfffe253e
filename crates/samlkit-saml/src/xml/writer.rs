//! Tree to text serialization.
//!
//! Output always starts with `<?xml version="1.0" encoding="UTF-8"?>`.
//! With a non-zero indent each element starts on its own line; text-only
//! elements stay on one line.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::{Document, Element, Node};
use crate::error::{SamlError, SamlResult};

/// Default number of spaces per nesting level.
pub const DEFAULT_INDENT: usize = 2;

/// Serializes an element as a standalone UTF-8 document.
///
/// # Errors
///
/// Returns [`SamlError::Serialization`] if the writer fails.
pub fn element_to_string(element: &Element, indent: usize) -> SamlResult<String> {
    let mut writer = if indent == 0 {
        Writer::new(Vec::new())
    } else {
        Writer::new_with_indent(Vec::new(), b' ', indent)
    };

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, element)?;

    String::from_utf8(writer.into_inner()).map_err(|e| SamlError::Serialization(e.to_string()))
}

/// Serializes a document.
///
/// # Errors
///
/// Returns [`SamlError::Serialization`] if the writer fails.
pub fn document_to_string(document: &Document, indent: usize) -> SamlResult<String> {
    element_to_string(document.root(), indent)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> SamlResult<()> {
    let mut start = BytesStart::new(element.name());
    for attr in element.attributes() {
        start.push_attribute((attr.name.as_str(), attr.value.as_str()));
    }

    if element.children().is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in element.children() {
        match child {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
            Node::Comment(comment) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))?;
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name())))?;
    Ok(())
}
