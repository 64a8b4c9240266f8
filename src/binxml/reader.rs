//! Binary XML decoder
//!
//! [`BinaryXmlReader`] is a forward-only cursor over a byte range holding
//! binary XML records. It owns a reference-counted slice of the backing
//! store, so any number of readers can share one sealed buffer.

use std::collections::HashSet;

use bytes::Bytes;
use log::trace;
use smallvec::SmallVec;

use crate::binxml::error::{CodecError, CodecResult, Quota};
use crate::binxml::node::{Attribute, StartElement, XmlDeclaration, XmlNode};
use crate::binxml::quotas::ReaderQuotas;
use crate::binxml::records::{Payload, RecordHeader, declaration_flags, record_types};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    Initial,
    Interactive,
    EndOfFile,
    Error,
}

/// Forward-only decoder over one binary XML fragment.
#[derive(Debug)]
pub struct BinaryXmlReader {
    data: Bytes,
    pos: usize,
    quotas: ReaderQuotas,
    state: ReadState,
    node: Option<XmlNode>,
    depth: usize,
    open: SmallVec<[String; 8]>,
    names: HashSet<String>,
    name_chars: usize,
}

impl BinaryXmlReader {
    /// Create a reader over `data`, positioned before the first node.
    pub fn new(data: Bytes, quotas: ReaderQuotas) -> Self {
        BinaryXmlReader {
            data,
            pos: 0,
            quotas,
            state: ReadState::Initial,
            node: None,
            depth: 0,
            open: SmallVec::new(),
            names: HashSet::new(),
            name_chars: 0,
        }
    }

    /// Quotas this reader enforces.
    pub fn quotas(&self) -> &ReaderQuotas {
        &self.quotas
    }

    /// The node the reader is positioned on, if any.
    pub fn node(&self) -> Option<&XmlNode> {
        self.node.as_ref()
    }

    /// Number of elements enclosing the current node.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether the reader has moved past the last node.
    pub fn is_eof(&self) -> bool {
        self.state == ReadState::EndOfFile
    }

    /// Advance to the next node.
    ///
    /// Returns `Ok(false)` at the end of the data. After an error the reader
    /// stays at the end and keeps returning `Ok(false)`.
    pub fn read(&mut self) -> CodecResult<bool> {
        if matches!(self.state, ReadState::EndOfFile | ReadState::Error) {
            return Ok(false);
        }

        match self.read_node() {
            Ok(Some(node)) => {
                self.node = Some(node);
                self.state = ReadState::Interactive;
                Ok(true)
            },
            Ok(None) => {
                self.node = None;
                self.state = ReadState::EndOfFile;
                Ok(false)
            },
            Err(e) => {
                self.node = None;
                self.state = ReadState::Error;
                Err(e)
            },
        }
    }

    /// Skip declarations, comments, processing instructions and whitespace.
    ///
    /// Returns the content node the reader stopped on, or `None` when the
    /// fragment has no content left.
    pub fn move_to_content(&mut self) -> CodecResult<Option<&XmlNode>> {
        loop {
            let skip = match &self.node {
                Some(node) => !node.is_content(),
                None => self.state == ReadState::Initial,
            };
            if !skip || !self.read()? {
                break;
            }
        }
        Ok(self.node.as_ref())
    }

    /// Iterate over the current node and every node after it.
    pub fn nodes(&mut self) -> Nodes<'_> {
        Nodes {
            reader: self,
            first: true,
        }
    }

    fn read_node(&mut self) -> CodecResult<Option<XmlNode>> {
        if self.pos >= self.data.len() {
            if !self.open.is_empty() {
                return Err(CodecError::UnclosedElements(self.open.len()));
            }
            return Ok(None);
        }

        let mut cursor = &self.data[self.pos..];
        let available = cursor.len();
        let header = RecordHeader::read(&mut cursor)?;
        if header.data_len > cursor.len() {
            return Err(CodecError::UnexpectedEndOfStream(format!(
                "record 0x{:04X} needs {} bytes, {} left",
                header.record_type,
                header.data_len,
                cursor.len()
            )));
        }

        let start = self.pos + (available - cursor.len());
        let end = start + header.data_len;
        self.pos = end;
        trace!(
            "record 0x{:04X} at {}, {} payload bytes",
            header.record_type, start, header.data_len
        );

        let payload = self.data.slice(start..end);
        self.decode(header.record_type, payload).map(Some)
    }

    fn decode(&mut self, record_type: u16, data: Bytes) -> CodecResult<XmlNode> {
        let mut payload = Payload::new(&data);

        let node = match record_type {
            record_types::DECLARATION => {
                let version = payload.read_string("declaration version")?;
                let flags = payload.read_u8()?;
                let encoding = if flags & declaration_flags::HAS_ENCODING != 0 {
                    Some(payload.read_string("declaration encoding")?)
                } else {
                    None
                };
                let standalone = (flags & declaration_flags::HAS_STANDALONE != 0)
                    .then_some(flags & declaration_flags::STANDALONE != 0);
                XmlNode::Declaration(XmlDeclaration {
                    version,
                    encoding,
                    standalone,
                })
            },
            record_types::START_ELEMENT | record_types::EMPTY_ELEMENT => {
                self.check(Quota::MaxBytesPerRead, self.quotas.max_bytes_per_read, data.len())?;
                let empty = record_type == record_types::EMPTY_ELEMENT;
                let start = self.decode_start(&mut payload, empty)?;

                let depth = self.open.len() + 1;
                self.check(Quota::MaxDepth, self.quotas.max_depth, depth)?;
                self.depth = self.open.len();
                if !empty {
                    self.open.push(start.name.clone());
                }
                payload.finish()?;
                return Ok(XmlNode::StartElement(start));
            },
            record_types::END_ELEMENT => {
                let name = self.open.pop().ok_or(CodecError::UnbalancedEndElement)?;
                payload.finish()?;
                self.depth = self.open.len();
                return Ok(XmlNode::EndElement(name));
            },
            record_types::TEXT => XmlNode::Text(self.read_content(&mut payload, "text")?),
            record_types::CDATA => XmlNode::CData(self.read_content(&mut payload, "CDATA")?),
            record_types::COMMENT => XmlNode::Comment(self.read_content(&mut payload, "comment")?),
            record_types::WHITESPACE => {
                XmlNode::Whitespace(self.read_content(&mut payload, "whitespace")?)
            },
            record_types::PROCESSING_INSTRUCTION => {
                let target = payload.read_string("processing instruction target")?;
                self.intern(&target)?;
                let data = self.read_content(&mut payload, "processing instruction data")?;
                XmlNode::ProcessingInstruction { target, data }
            },
            record_types::BYTES_TEXT => {
                self.check(Quota::MaxArrayLength, self.quotas.max_array_length, data.len())?;
                let len = payload.remaining();
                payload.read_bytes(len)?;
                XmlNode::Bytes(data.clone())
            },
            record_types::INT32_TEXT => {
                XmlNode::Text(itoa::Buffer::new().format(payload.read_i32()?).to_string())
            },
            record_types::INT64_TEXT => {
                XmlNode::Text(itoa::Buffer::new().format(payload.read_i64()?).to_string())
            },
            record_types::DOUBLE_TEXT => XmlNode::Text(format_double(payload.read_f64()?)),
            record_types::BOOL_TEXT => {
                let value = if payload.read_u8()? != 0 { "true" } else { "false" };
                XmlNode::Text(value.to_string())
            },
            other => return Err(CodecError::InvalidRecordType(other)),
        };

        payload.finish()?;
        self.depth = self.open.len();
        Ok(node)
    }

    fn decode_start(&mut self, payload: &mut Payload<'_>, empty: bool) -> CodecResult<StartElement> {
        let name = payload.read_string("element name")?;
        self.intern(&name)?;

        let count = payload.read_varint()?;
        // Every attribute takes at least two bytes, so a bogus count cannot
        // trigger a huge allocation
        let mut attributes = Vec::with_capacity(count.min(payload.remaining() / 2));
        for _ in 0..count {
            let attr_name = payload.read_string("attribute name")?;
            self.intern(&attr_name)?;
            let value = self.read_content(payload, "attribute value")?;
            attributes.push(Attribute {
                name: attr_name,
                value,
            });
        }

        Ok(StartElement {
            name,
            attributes,
            empty,
        })
    }

    fn read_content(&self, payload: &mut Payload<'_>, what: &'static str) -> CodecResult<String> {
        let text = payload.read_string(what)?;
        // Byte length bounds the char count, so skip counting short strings
        if text.len() > self.quotas.max_string_content_length {
            self.check(
                Quota::MaxStringContentLength,
                self.quotas.max_string_content_length,
                text.chars().count(),
            )?;
        }
        Ok(text)
    }

    fn intern(&mut self, name: &str) -> CodecResult<()> {
        if self.names.contains(name) {
            return Ok(());
        }
        let total = self.name_chars + name.chars().count();
        self.check(
            Quota::MaxNameTableCharCount,
            self.quotas.max_name_table_char_count,
            total,
        )?;
        self.name_chars = total;
        self.names.insert(name.to_string());
        Ok(())
    }

    #[inline]
    fn check(&self, quota: Quota, limit: usize, found: usize) -> CodecResult<()> {
        if found > limit {
            return Err(CodecError::QuotaExceeded {
                quota,
                limit,
                found,
            });
        }
        Ok(())
    }
}

fn format_double(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let text = if value > 0.0 { "INF" } else { "-INF" };
        text.to_string()
    } else {
        ryu::Buffer::new().format_finite(value).to_string()
    }
}

/// Iterator over the nodes of a [`BinaryXmlReader`], starting with the
/// node it is positioned on.
pub struct Nodes<'r> {
    reader: &'r mut BinaryXmlReader,
    first: bool,
}

impl Iterator for Nodes<'_> {
    type Item = CodecResult<XmlNode>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.first {
            self.first = false;
            if let Some(node) = self.reader.node() {
                return Some(Ok(node.clone()));
            }
        }

        match self.reader.read() {
            Ok(true) => self.reader.node().cloned().map(Ok),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
