//! Text to tree parsing over `quick-xml`'s namespace-aware reader.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use super::{Document, Element};
use crate::error::{SamlError, SamlResult};

/// Parses XML text into a document.
///
/// Whitespace-only text between elements is dropped. Comments inside the
/// root are kept; the prolog's declaration, comments and processing
/// instructions are not.
///
/// # Errors
///
/// Returns [`SamlError::MalformedXml`] if the text is not well formed, uses
/// an undeclared prefix, contains a DOCTYPE, or does not have exactly one
/// root element.
pub fn parse(text: &str) -> SamlResult<Document> {
    let mut reader = NsReader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let (resolved, event) = reader.read_resolved_event()?;
        let namespace = namespace_of(resolved)?;
        match event {
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(malformed("multiple root elements"));
                }
                stack.push(start_element(&start, namespace)?);
            }
            Event::Empty(start) => {
                let element = start_element(&start, namespace)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| malformed("unexpected closing tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let parent = stack
                    .last_mut()
                    .ok_or_else(|| malformed("text outside the root element"))?;
                parent.push_text(text.unescape()?.into_owned());
            }
            Event::CData(data) => {
                let parent = stack
                    .last_mut()
                    .ok_or_else(|| malformed("CDATA outside the root element"))?;
                parent.push_text(utf8(&data)?);
            }
            Event::Comment(comment) => {
                if let Some(parent) = stack.last_mut() {
                    parent.push_comment(utf8(&comment)?);
                }
            }
            Event::DocType(_) => return Err(malformed("DOCTYPE declarations are not allowed")),
            Event::Decl(_) | Event::PI(_) => {}
            Event::Eof => break,
        }
    }

    if let Some(open) = stack.last() {
        return Err(malformed(format!("unclosed element {}", open.name())));
    }
    root.map(Document::new)
        .ok_or_else(|| malformed("document has no root element"))
}

fn namespace_of(resolved: ResolveResult<'_>) -> SamlResult<Option<String>> {
    match resolved {
        ResolveResult::Bound(ns) => utf8(ns.as_ref()).map(Some),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(malformed(format!(
            "undeclared namespace prefix {}",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn start_element(start: &BytesStart<'_>, namespace: Option<String>) -> SamlResult<Element> {
    let name = utf8(start.name().as_ref())?;
    let mut element = match namespace {
        Some(ns) => Element::new_ns(name, ns),
        None => Element::new(name),
    };
    for attr in start.attributes() {
        let attr = attr?;
        let key = utf8(attr.key.as_ref())?;
        let value = attr.unescape_value()?.into_owned();
        element.set_attribute(key, value);
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> SamlResult<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push_child(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(malformed("multiple root elements")),
    }
}

fn utf8(bytes: &[u8]) -> SamlResult<String> {
    std::str::from_utf8(bytes)
        .map(ToString::to_string)
        .map_err(|e| malformed(e.to_string()))
}

fn malformed(reason: impl Into<String>) -> SamlError {
    SamlError::MalformedXml(reason.into())
}
