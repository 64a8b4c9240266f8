//! Import textual XML into a binary XML writer.
//!
//! The text is parsed with quick-xml and every node is re-encoded, so a
//! section can be filled from an existing document instead of being built
//! call by call.

use std::borrow::Cow;
use std::io::Write;

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};

use crate::binxml::BinaryXmlWriter;
use crate::binxml::node::XmlDeclaration;
use crate::common::{Error, Result};

/// Parse `xml` and write every node into `writer`.
///
/// Entity and character references are resolved, adjacent text is merged
/// into one node and whitespace-only text becomes a whitespace node. Open
/// elements are not closed here: the caller decides when the document ends.
///
/// # Examples
///
/// ```rust
/// use xmlbuf::binxml::{BinaryXmlReader, BinaryXmlWriter, import};
/// use xmlbuf::{ReaderQuotas, XmlNode};
///
/// let mut writer = BinaryXmlWriter::new(Vec::new());
/// import::copy_xml(r#"<b><c k="1 &amp; 2"/></b>"#, &mut writer)?;
/// let bytes = writer.into_inner()?;
///
/// let mut reader = BinaryXmlReader::new(bytes.into(), ReaderQuotas::default());
/// let nodes: Vec<XmlNode> = reader.nodes().collect::<Result<_, _>>()?;
/// assert_eq!(nodes[1].to_string(), r#"<c k="1 &amp; 2"/>"#);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn copy_xml<W: Write>(xml: &str, writer: &mut BinaryXmlWriter<W>) -> Result<()> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::XmlError(format!("XML parsing error: {}", e)))?;

        match event {
            // References arrive as separate events, so text needs no unescaping
            Event::Text(ref t) => {
                text.push_str(&utf8(t, "text content")?);
                continue;
            },
            Event::GeneralRef(ref r) => {
                if let Some(c) = r.resolve_char_ref()? {
                    text.push(c);
                } else {
                    let name = utf8(r, "entity reference")?;
                    let value = resolve_predefined_entity(&name).ok_or_else(|| {
                        Error::XmlError(format!("Unknown entity reference: &{};", name))
                    })?;
                    text.push_str(value);
                }
                continue;
            },
            Event::Eof => {
                flush_text(&mut text, writer)?;
                break;
            },
            _ => flush_text(&mut text, writer)?,
        }

        match event {
            Event::Decl(ref e) => {
                let version = String::from_utf8_lossy(&e.version()?).into_owned();
                let encoding = e
                    .encoding()
                    .transpose()?
                    .map(|v| String::from_utf8_lossy(&v).into_owned());
                let standalone = e
                    .standalone()
                    .transpose()?
                    .map(|v| v.as_ref() == b"yes");
                writer.write_declaration(&XmlDeclaration {
                    version,
                    encoding,
                    standalone,
                })?;
            },
            Event::Start(ref e) => write_start(e, writer)?,
            Event::Empty(ref e) => {
                write_start(e, writer)?;
                writer.write_end_element()?;
            },
            Event::End(_) => writer.write_end_element()?,
            Event::CData(ref t) => writer.write_cdata(&utf8(t, "CDATA")?)?,
            Event::Comment(ref t) => writer.write_comment(&utf8(t, "comment")?)?,
            Event::PI(ref e) => {
                let target = utf8(e.target(), "processing instruction target")?;
                let data = utf8(e.content(), "processing instruction data")?;
                writer.write_processing_instruction(&target, data.trim_start())?;
            },
            // Document type declarations have no binary form
            _ => {},
        }
    }

    Ok(())
}

fn write_start<W: Write>(e: &BytesStart<'_>, writer: &mut BinaryXmlWriter<W>) -> Result<()> {
    let qname = e.name();
    let name = utf8(qname.as_ref(), "tag name")?;
    writer.write_start_element(&name)?;

    for attr_result in e.attributes() {
        let attr = attr_result?;
        let key = utf8(attr.key.as_ref(), "attribute key")?;
        writer.write_attribute(&key, &attr.unescape_value()?)?;
    }
    Ok(())
}

fn flush_text<W: Write>(text: &mut String, writer: &mut BinaryXmlWriter<W>) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    if text.chars().all(char::is_whitespace) {
        writer.write_whitespace(text)?;
    } else {
        writer.write_text(text)?;
    }
    text.clear();
    Ok(())
}

fn utf8<'a>(bytes: &'a [u8], what: &str) -> Result<Cow<'a, str>> {
    std::str::from_utf8(bytes)
        .map(Cow::Borrowed)
        .map_err(|_| Error::XmlError(format!("Invalid UTF-8 in {}", what)))
}
