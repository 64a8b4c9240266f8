//! XML node model shared by the encoder, the decoder and the sinks.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;

use crate::common::xml::{escape_text, escape_xml};

/// A single attribute of a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The `<?xml ...?>` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDeclaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<bool>,
}

impl Default for XmlDeclaration {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            encoding: None,
            standalone: None,
        }
    }
}

/// A start tag; `empty` marks `<name/>`, which has no matching end node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartElement {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub empty: bool,
}

impl StartElement {
    /// Look up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }
}

/// One node of an XML document as produced by the reader.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Declaration(XmlDeclaration),
    StartElement(StartElement),
    /// Closes the element with this name
    EndElement(String),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction { target: String, data: String },
    Whitespace(String),
    /// Binary content, rendered as base64 in textual XML
    Bytes(Bytes),
}

impl XmlNode {
    /// Whether the node is content in the sense of `move_to_content`:
    /// anything except declarations, comments, processing instructions
    /// and insignificant whitespace.
    pub fn is_content(&self) -> bool {
        !matches!(
            self,
            XmlNode::Declaration(_)
                | XmlNode::Comment(_)
                | XmlNode::ProcessingInstruction { .. }
                | XmlNode::Whitespace(_)
        )
    }

    /// Element name for start and end nodes.
    pub fn name(&self) -> Option<&str> {
        match self {
            XmlNode::StartElement(start) => Some(&start.name),
            XmlNode::EndElement(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for XmlNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlNode::Declaration(decl) => {
                write!(f, "<?xml version=\"{}\"", escape_xml(&decl.version))?;
                if let Some(encoding) = &decl.encoding {
                    write!(f, " encoding=\"{}\"", escape_xml(encoding))?;
                }
                if let Some(standalone) = decl.standalone {
                    let value = if standalone { "yes" } else { "no" };
                    write!(f, " standalone=\"{}\"", value)?;
                }
                f.write_str("?>")
            },
            XmlNode::StartElement(start) => {
                write!(f, "<{}", start.name)?;
                for attr in &start.attributes {
                    write!(f, " {}=\"{}\"", attr.name, escape_xml(&attr.value))?;
                }
                f.write_str(if start.empty { "/>" } else { ">" })
            },
            XmlNode::EndElement(name) => write!(f, "</{}>", name),
            XmlNode::Text(text) => f.write_str(&escape_text(text)),
            // "]]>" cannot appear inside a CDATA section, so split it across two
            XmlNode::CData(text) => {
                write!(f, "<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
            },
            XmlNode::Comment(text) => write!(f, "<!--{}-->", text),
            XmlNode::ProcessingInstruction { target, data } => {
                if data.is_empty() {
                    write!(f, "<?{}?>", target)
                } else {
                    write!(f, "<?{} {}?>", target, data)
                }
            },
            XmlNode::Whitespace(text) => f.write_str(text),
            XmlNode::Bytes(data) => f.write_str(&STANDARD.encode(data)),
        }
    }
}
