//! Minimal XML document tree for controller responses
//!
//! Keeps what the API consumers need: attributes separate from child
//! elements, children in document order (repeated tags stay a sequence,
//! a single occurrence is simply a sequence of one) and concatenated text.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// Errors raised while building the document tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("malformed XML: {0}")]
    Malformed(String),

    #[error("element <{0}> is never closed")]
    Unclosed(String),

    #[error("unexpected closing tag </{0}>")]
    UnexpectedClose(String),

    #[error("document has more than one root element")]
    MultipleRoots,

    #[error("document has no root element")]
    Empty,
}

/// One element of a parsed document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    pub text: Option<String>,
}

impl XmlElement {
    /// Attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First child element with the given tag
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All child elements with the given tag, in document order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match &mut self.text {
            Some(existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }
}

/// Parse `xml` into its root element
pub fn parse_document(xml: &str) -> Result<XmlElement, DocumentError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(DocumentError::MultipleRoots);
                }
                stack.push(element_from_start(&start)?);
            }
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(end) => {
                let element = stack.pop().ok_or_else(|| {
                    DocumentError::UnexpectedClose(
                        String::from_utf8_lossy(end.name().as_ref()).into_owned(),
                    )
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(malformed)?;
                match stack.last_mut() {
                    Some(current) => current.push_text(&text),
                    None if !text.trim().is_empty() => {
                        return Err(DocumentError::Malformed(format!(
                            "text outside the root element: {}",
                            text.trim()
                        )));
                    }
                    None => {}
                }
            }
            Event::CData(cdata) => {
                let bytes = cdata.into_inner();
                if let Some(current) = stack.last_mut() {
                    current.push_text(&String::from_utf8_lossy(&bytes));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(DocumentError::Unclosed(open.name));
    }

    root.ok_or(DocumentError::Empty)
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement, DocumentError> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(malformed)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(malformed)?.into_owned();
        attributes.push((key, value));
    }

    Ok(XmlElement {
        name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        attributes,
        children: Vec::new(),
        text: None,
    })
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), DocumentError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        Ok(())
    } else if root.is_some() {
        Err(DocumentError::MultipleRoots)
    } else {
        *root = Some(element);
        Ok(())
    }
}

fn malformed(err: impl std::fmt::Display) -> DocumentError {
    DocumentError::Malformed(err.to_string())
}
