//! xmlbuf - A write-once, read-many buffer of binary XML sections
//!
//! This library collects several independently written XML fragments into
//! one contiguous in-memory store and, once sealed, re-opens any of them as
//! an independent reader without decoding the others.
//!
//! # Features
//!
//! - **Sectioned buffer**: strict Created / Writing / Sealed lifecycle with
//!   per-section reader quotas captured at open time
//! - **Binary XML codec**: compact record framing with varint headers and
//!   typed text records (integers, doubles, booleans, raw bytes)
//! - **Zero-copy readers**: every reader shares the sealed store through a
//!   reference-counted slice
//! - **Sinks**: stream sections as textual XML, into another binary stream
//!   or into a node list
//! - **Text import**: fill sections from textual XML (feature `xml-import`)
//!
//! # Example - Writing and reading sections
//!
//! ```rust
//! use xmlbuf::{ReaderQuotas, XmlBuffer};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut buffer = XmlBuffer::new(4096)?;
//!
//! let mut section = buffer.open_section(&ReaderQuotas::default())?;
//! section.write_start_element("order")?;
//! section.write_attribute("id", "17")?;
//! section.write_element_string("item", "tea")?;
//! drop(section);
//! buffer.close_section()?;
//!
//! buffer.seal()?;
//!
//! let reader = buffer.get_reader(0)?;
//! assert_eq!(reader.node().and_then(|n| n.name()), Some("order"));
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Streaming a section as text
//!
//! ```rust
//! use xmlbuf::{ReaderQuotas, XmlBuffer, XmlTextWriter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut buffer = XmlBuffer::new(1024)?;
//! let mut section = buffer.open_section(&ReaderQuotas::default())?;
//! section.write_element_string("note", "fish & chips")?;
//! drop(section);
//! buffer.close_section()?;
//! buffer.seal()?;
//!
//! let mut text = XmlTextWriter::new(Vec::new());
//! buffer.write_to(0, &mut text)?;
//! assert_eq!(text.into_inner()?, b"<note>fish &amp; chips</note>");
//! # Ok(())
//! # }
//! ```

/// Shared infrastructure: errors, binary helpers and XML escaping
pub mod common;

/// Binary XML codec
///
/// Record framing, the streaming encoder and decoder, reader quotas and the
/// node model shared by all of them.
pub mod binxml;

/// Destinations sections can be streamed into
pub mod sink;

/// The sectioned buffer itself
pub mod buffer;

// Re-export commonly used types for convenience
pub use binxml::{BinaryXmlReader, BinaryXmlWriter, ReaderQuotas, XmlNode};
pub use buffer::{BufferState, Section, SectionWriter, XmlBuffer};
pub use common::{Error, Result};
pub use sink::{XmlSink, XmlTextWriter};
