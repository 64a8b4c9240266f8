//! Binary XML node encoder

use std::io::Write;

use bytes::BufMut;
use smallvec::SmallVec;

use super::record::{RecordWriter, put_string, put_varint};
use crate::binxml::error::{CodecError, CodecResult};
use crate::binxml::node::{Attribute, XmlDeclaration, XmlNode};
use crate::binxml::records::{declaration_flags, record_types};

/// Start tag held back until the next call decides between a start record
/// and an empty element record.
#[derive(Debug)]
struct PendingStart {
    name: String,
    attributes: Vec<Attribute>,
}

/// Encoder writing XML nodes as binary records.
///
/// The API follows the usual streaming XML writer shape: start tags stay
/// open for attributes until any other node is written, and a start tag
/// followed directly by its end tag is stored as a single empty element.
///
/// # Example
///
/// ```rust
/// use xmlbuf::binxml::{BinaryXmlReader, BinaryXmlWriter};
/// use xmlbuf::ReaderQuotas;
///
/// let mut writer = BinaryXmlWriter::new(Vec::new());
/// writer.write_start_element("b")?;
/// writer.write_attribute("id", "7")?;
/// writer.write_empty_element("c")?;
/// writer.write_end_element()?;
/// let bytes = writer.into_inner()?;
///
/// let mut reader = BinaryXmlReader::new(bytes.into(), ReaderQuotas::default());
/// let nodes = reader.nodes().collect::<Result<Vec<_>, _>>()?;
/// assert_eq!(nodes.len(), 3);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct BinaryXmlWriter<W: Write> {
    records: RecordWriter<W>,
    scratch: Vec<u8>,
    pending: Option<PendingStart>,
    open: SmallVec<[String; 8]>,
    wrote_node: bool,
}

impl<W: Write> BinaryXmlWriter<W> {
    /// Create a writer appending records to `writer`.
    pub fn new(writer: W) -> Self {
        BinaryXmlWriter {
            records: RecordWriter::new(writer),
            scratch: Vec::with_capacity(64),
            pending: None,
            open: SmallVec::new(),
            wrote_node: false,
        }
    }

    /// Number of elements currently open, including a pending start tag.
    pub fn depth(&self) -> usize {
        self.open.len() + usize::from(self.pending.is_some())
    }

    /// Write the `<?xml ...?>` declaration; only allowed as the first node.
    pub fn write_declaration(&mut self, decl: &XmlDeclaration) -> CodecResult<()> {
        if self.wrote_node {
            return Err(CodecError::InvalidWriterState(
                "declaration must be the first node",
            ));
        }

        let mut flags = 0u8;
        if decl.encoding.is_some() {
            flags |= declaration_flags::HAS_ENCODING;
        }
        match decl.standalone {
            Some(true) => flags |= declaration_flags::HAS_STANDALONE | declaration_flags::STANDALONE,
            Some(false) => flags |= declaration_flags::HAS_STANDALONE,
            None => {},
        }

        self.scratch.clear();
        put_string(&mut self.scratch, &decl.version)?;
        self.scratch.put_u8(flags);
        if let Some(encoding) = &decl.encoding {
            put_string(&mut self.scratch, encoding)?;
        }
        self.emit(record_types::DECLARATION)
    }

    /// Open an element; attributes may follow until the next node.
    pub fn write_start_element(&mut self, name: &str) -> CodecResult<()> {
        check_name(name)?;
        self.flush_pending()?;
        self.pending = Some(PendingStart {
            name: name.to_string(),
            attributes: Vec::new(),
        });
        self.wrote_node = true;
        Ok(())
    }

    /// Add an attribute to the start tag that was just written.
    pub fn write_attribute(&mut self, name: &str, value: &str) -> CodecResult<()> {
        check_name(name)?;
        let pending = self.pending.as_mut().ok_or(CodecError::InvalidWriterState(
            "attribute written outside a start tag",
        ))?;
        pending.attributes.push(Attribute::new(name, value));
        Ok(())
    }

    /// Close the innermost open element.
    pub fn write_end_element(&mut self) -> CodecResult<()> {
        if let Some(pending) = self.pending.take() {
            return self.emit_start(pending, record_types::EMPTY_ELEMENT);
        }
        if self.open.pop().is_none() {
            return Err(CodecError::UnbalancedEndElement);
        }
        self.scratch.clear();
        self.emit(record_types::END_ELEMENT)
    }

    /// Write `<name/>`.
    pub fn write_empty_element(&mut self, name: &str) -> CodecResult<()> {
        self.write_start_element(name)?;
        self.write_end_element()
    }

    /// Write `<name>text</name>`.
    pub fn write_element_string(&mut self, name: &str, text: &str) -> CodecResult<()> {
        self.write_start_element(name)?;
        self.write_text(text)?;
        self.write_end_element()
    }

    pub fn write_text(&mut self, text: &str) -> CodecResult<()> {
        self.write_string_record(record_types::TEXT, text)
    }

    pub fn write_cdata(&mut self, text: &str) -> CodecResult<()> {
        self.write_string_record(record_types::CDATA, text)
    }

    pub fn write_comment(&mut self, text: &str) -> CodecResult<()> {
        self.write_string_record(record_types::COMMENT, text)
    }

    pub fn write_whitespace(&mut self, text: &str) -> CodecResult<()> {
        if !text.chars().all(char::is_whitespace) {
            return Err(CodecError::InvalidWhitespace);
        }
        self.write_string_record(record_types::WHITESPACE, text)
    }

    pub fn write_processing_instruction(&mut self, target: &str, data: &str) -> CodecResult<()> {
        check_name(target)?;
        self.flush_pending()?;
        self.scratch.clear();
        put_string(&mut self.scratch, target)?;
        put_string(&mut self.scratch, data)?;
        self.emit(record_types::PROCESSING_INSTRUCTION)
    }

    /// Write binary content; it is rendered as base64 in textual XML.
    pub fn write_base64(&mut self, data: &[u8]) -> CodecResult<()> {
        self.flush_pending()?;
        self.scratch.clear();
        self.scratch.put_slice(data);
        self.emit(record_types::BYTES_TEXT)
    }

    pub fn write_i32(&mut self, value: i32) -> CodecResult<()> {
        self.flush_pending()?;
        self.scratch.clear();
        self.scratch.put_i32_le(value);
        self.emit(record_types::INT32_TEXT)
    }

    pub fn write_i64(&mut self, value: i64) -> CodecResult<()> {
        self.flush_pending()?;
        self.scratch.clear();
        self.scratch.put_i64_le(value);
        self.emit(record_types::INT64_TEXT)
    }

    pub fn write_f64(&mut self, value: f64) -> CodecResult<()> {
        self.flush_pending()?;
        self.scratch.clear();
        self.scratch.put_f64_le(value);
        self.emit(record_types::DOUBLE_TEXT)
    }

    pub fn write_bool(&mut self, value: bool) -> CodecResult<()> {
        self.flush_pending()?;
        self.scratch.clear();
        self.scratch.put_u8(u8::from(value));
        self.emit(record_types::BOOL_TEXT)
    }

    /// Write a node produced by a reader.
    ///
    /// End nodes close the innermost open element regardless of the name
    /// they carry; the reader guarantees the two agree.
    pub fn write_node(&mut self, node: &XmlNode) -> CodecResult<()> {
        match node {
            XmlNode::Declaration(decl) => self.write_declaration(decl),
            XmlNode::StartElement(start) => {
                self.write_start_element(&start.name)?;
                for attr in &start.attributes {
                    self.write_attribute(&attr.name, &attr.value)?;
                }
                if start.empty {
                    self.write_end_element()?;
                }
                Ok(())
            },
            XmlNode::EndElement(_) => self.write_end_element(),
            XmlNode::Text(text) => self.write_text(text),
            XmlNode::CData(text) => self.write_cdata(text),
            XmlNode::Comment(text) => self.write_comment(text),
            XmlNode::ProcessingInstruction { target, data } => {
                self.write_processing_instruction(target, data)
            },
            XmlNode::Whitespace(text) => self.write_whitespace(text),
            XmlNode::Bytes(data) => self.write_base64(data),
        }
    }

    /// Flush the pending start tag, close every open element and flush the
    /// underlying writer.
    pub fn finish(&mut self) -> CodecResult<()> {
        while self.depth() > 0 {
            self.write_end_element()?;
        }
        self.records.flush()
    }

    /// Finish the document and return the underlying writer.
    pub fn into_inner(mut self) -> CodecResult<W> {
        self.finish()?;
        Ok(self.records.into_inner())
    }

    fn write_string_record(&mut self, record_type: u16, text: &str) -> CodecResult<()> {
        self.flush_pending()?;
        self.scratch.clear();
        put_string(&mut self.scratch, text)?;
        self.emit(record_type)
    }

    fn flush_pending(&mut self) -> CodecResult<()> {
        self.wrote_node = true;
        match self.pending.take() {
            Some(pending) => {
                let name = pending.name.clone();
                self.emit_start(pending, record_types::START_ELEMENT)?;
                self.open.push(name);
                Ok(())
            },
            None => Ok(()),
        }
    }

    fn emit_start(&mut self, start: PendingStart, record_type: u16) -> CodecResult<()> {
        self.scratch.clear();
        put_string(&mut self.scratch, &start.name)?;
        put_varint(&mut self.scratch, start.attributes.len())?;
        for attr in &start.attributes {
            put_string(&mut self.scratch, &attr.name)?;
            put_string(&mut self.scratch, &attr.value)?;
        }
        self.emit(record_type)
    }

    #[inline]
    fn emit(&mut self, record_type: u16) -> CodecResult<()> {
        self.wrote_node = true;
        self.records.write_record(record_type, &self.scratch)
    }
}

fn check_name(name: &str) -> CodecResult<()> {
    if name.is_empty() || name.chars().any(|c| c.is_whitespace() || "<>&\"'/=".contains(c)) {
        return Err(CodecError::InvalidName(name.to_string()));
    }
    Ok(())
}
