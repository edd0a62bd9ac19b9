//! Owned element tree for Ogre mesh XML
//!
//! The tree keeps element names, attributes (in source order) and child
//! elements. Text, comments and processing instructions are dropped here;
//! passes that must preserve them stream the original document instead
//! (see [`crate::normals`]).
//!
//! Every element records its document-order ordinal: the index of its
//! start tag among all start/empty tags in the file. Streaming passes count
//! tags the same way, so an ordinal addresses the same element in both.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// Failure to read a mesh XML document as a tree
#[derive(Error, Debug)]
pub enum TreeError {
    #[error("XML syntax error at byte {position}: {source}")]
    Syntax {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("Malformed attribute on <{element}>: {source}")]
    Attribute {
        element: String,
        #[source]
        source: quick_xml::Error,
    },

    #[error("Document has no root element")]
    NoRoot,

    #[error("Document has more than one root element (second is <{0}>)")]
    MultipleRoots(String),

    #[error("Unexpected end of document inside <{0}>")]
    Unclosed(String),

    #[error("Failed to write XML: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rewritten document is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A single XML element with its attributes and child elements
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    /// Document-order index of this element's start tag
    pub ordinal: usize,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Element {
    /// Unescaped value of an attribute, if present
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First direct child with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given name, in document order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// First descendant (depth-first, document order) with the given name
    ///
    /// Does not match `self`.
    pub fn find_descendant(&self, name: &str) -> Option<&Element> {
        for child in &self.children {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(name) {
                return Some(found);
            }
        }
        None
    }
}

/// Parse an XML document into its root element
pub fn parse_document(xml: &str) -> Result<Element, TreeError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut ordinal = 0usize;

    loop {
        let event = reader.read_event().map_err(|source| TreeError::Syntax {
            position: reader.buffer_position() as u64,
            source,
        })?;

        match event {
            Event::Start(e) => {
                stack.push(element_from_tag(&e, ordinal)?);
                ordinal += 1;
            }
            Event::Empty(e) => {
                let element = element_from_tag(&e, ordinal)?;
                ordinal += 1;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                // quick-xml rejects mismatched end tags, so the stack top is the match
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element)?;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(TreeError::Unclosed(open.name));
    }
    root.ok_or(TreeError::NoRoot)
}

fn element_from_tag(tag: &BytesStart<'_>, ordinal: usize) -> Result<Element, TreeError> {
    let name = String::from_utf8_lossy(tag.name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr in tag.attributes() {
        let attr = attr.map_err(|e| TreeError::Attribute {
            element: name.clone(),
            source: e.into(),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|source| TreeError::Attribute {
                element: name.clone(),
                source,
            })?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(Element {
        name,
        ordinal,
        attributes,
        children: Vec::new(),
    })
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), TreeError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(TreeError::MultipleRoots(element.name)),
    }
    Ok(())
}
