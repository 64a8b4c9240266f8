//! Destinations for decoded XML nodes.
//!
//! [`XmlSink`] is the generic XML writer interface the buffer streams
//! sections into. Implementations exist for:
//!
//! - [`XmlTextWriter`]: textual XML over any `std::io::Write`
//! - [`BinaryXmlWriter`]: re-encode into another binary XML stream
//! - `Vec<XmlNode>`: collect the nodes
//!
//! # Example
//!
//! ```rust
//! use xmlbuf::binxml::{BinaryXmlReader, BinaryXmlWriter};
//! use xmlbuf::sink::{XmlTextWriter, copy_node};
//! use xmlbuf::ReaderQuotas;
//!
//! let mut writer = BinaryXmlWriter::new(Vec::new());
//! writer.write_element_string("greeting", "a < b")?;
//! let bytes = writer.into_inner()?;
//!
//! let mut reader = BinaryXmlReader::new(bytes.into(), ReaderQuotas::default());
//! reader.move_to_content()?;
//! let mut text = XmlTextWriter::new(Vec::new());
//! copy_node(&mut reader, &mut text)?;
//! assert_eq!(text.into_inner()?, b"<greeting>a &lt; b</greeting>");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod text;

pub use text::XmlTextWriter;

use std::io::Write;

use crate::binxml::{BinaryXmlReader, BinaryXmlWriter, XmlNode};
use crate::common::Result;

/// A writer accepting XML one node at a time.
pub trait XmlSink {
    /// Write a single node.
    fn write_node(&mut self, node: &XmlNode) -> Result<()>;

    /// Flush buffered output to the underlying destination.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<W: Write> XmlSink for BinaryXmlWriter<W> {
    fn write_node(&mut self, node: &XmlNode) -> Result<()> {
        Ok(BinaryXmlWriter::write_node(self, node)?)
    }
}

impl XmlSink for Vec<XmlNode> {
    fn write_node(&mut self, node: &XmlNode) -> Result<()> {
        self.push(node.clone());
        Ok(())
    }
}

impl<S: XmlSink + ?Sized> XmlSink for &mut S {
    fn write_node(&mut self, node: &XmlNode) -> Result<()> {
        (**self).write_node(node)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Copy the node the reader is positioned on into `sink`, then advance.
///
/// A non-empty start element is copied together with its whole subtree,
/// up to and including the matching end element. Does nothing when the
/// reader is not positioned on a node.
pub fn copy_node<S: XmlSink + ?Sized>(reader: &mut BinaryXmlReader, sink: &mut S) -> Result<()> {
    let Some(node) = reader.node() else {
        return Ok(());
    };
    let subtree = matches!(node, XmlNode::StartElement(start) if !start.empty);
    let depth = reader.depth();
    sink.write_node(node)?;

    if subtree {
        while reader.read()? {
            let Some(node) = reader.node() else { break };
            sink.write_node(node)?;
            if matches!(node, XmlNode::EndElement(_)) && reader.depth() == depth {
                break;
            }
        }
    }

    reader.read()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binxml::ReaderQuotas;

    fn reader_over(build: impl FnOnce(&mut BinaryXmlWriter<Vec<u8>>)) -> BinaryXmlReader {
        let mut writer = BinaryXmlWriter::new(Vec::new());
        build(&mut writer);
        let bytes = writer.into_inner().unwrap();
        BinaryXmlReader::new(bytes.into(), ReaderQuotas::default())
    }

    #[test]
    fn test_copy_node_copies_subtree_and_advances() {
        let mut reader = reader_over(|w| {
            w.write_start_element("b").unwrap();
            w.write_empty_element("c").unwrap();
            w.write_end_element().unwrap();
            w.write_comment("after").unwrap();
        });
        reader.move_to_content().unwrap();

        let mut nodes: Vec<XmlNode> = Vec::new();
        copy_node(&mut reader, &mut nodes).unwrap();

        let rendered: Vec<String> = nodes.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["<b>", "<c/>", "</b>"]);
        assert_eq!(reader.node(), Some(&XmlNode::Comment("after".to_string())));
    }

    #[test]
    fn test_copy_node_on_leaf() {
        let mut reader = reader_over(|w| {
            w.write_text("x").unwrap();
            w.write_text("y").unwrap();
        });
        reader.read().unwrap();

        let mut nodes: Vec<XmlNode> = Vec::new();
        copy_node(&mut reader, &mut nodes).unwrap();
        assert_eq!(nodes, vec![XmlNode::Text("x".to_string())]);
        assert_eq!(reader.node(), Some(&XmlNode::Text("y".to_string())));
    }

    #[test]
    fn test_copy_node_without_current_node() {
        let mut reader = reader_over(|_| {});
        let mut nodes: Vec<XmlNode> = Vec::new();
        copy_node(&mut reader, &mut nodes).unwrap();
        assert!(nodes.is_empty());
    }

    #[test]
    fn test_copy_into_binary_writer() {
        let mut reader = reader_over(|w| {
            w.write_start_element("a").unwrap();
            w.write_attribute("k", "v").unwrap();
            w.write_i32(42).unwrap();
            w.write_end_element().unwrap();
        });
        reader.move_to_content().unwrap();

        let mut target = BinaryXmlWriter::new(Vec::new());
        copy_node(&mut reader, &mut target).unwrap();
        let bytes = target.into_inner().unwrap();

        let mut copy = BinaryXmlReader::new(bytes.into(), ReaderQuotas::default());
        let rendered: Vec<String> = copy
            .nodes()
            .map(|node| node.unwrap().to_string())
            .collect();
        assert_eq!(rendered, vec![r#"<a k="v">"#, "42", "</a>"]);
    }
}
