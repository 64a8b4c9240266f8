//! Binary XML codec
//!
//! Each XML node is stored as one record: a variable-length record type,
//! a variable-length payload size and the payload itself. The framing
//! follows the XLSB record layout, so a stream can be skipped record by
//! record without decoding payloads.
//!
//! - [`BinaryXmlWriter`]: streaming encoder with the usual XML writer API
//! - [`BinaryXmlReader`]: forward-only decoder enforcing [`ReaderQuotas`]
//! - [`import`]: re-encode textual XML (feature `xml-import`)

pub mod error;
pub mod node;
pub mod quotas;
pub mod reader;
pub mod records;
pub mod writer;

#[cfg(feature = "xml-import")]
pub mod import;

pub use error::{CodecError, CodecResult, Quota};
pub use node::{Attribute, StartElement, XmlDeclaration, XmlNode};
pub use quotas::ReaderQuotas;
pub use reader::{BinaryXmlReader, Nodes};
pub use writer::{BinaryXmlWriter, RecordWriter};
