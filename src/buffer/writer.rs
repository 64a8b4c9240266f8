use std::ops::{Deref, DerefMut};

use log::warn;

use crate::binxml::{BinaryXmlWriter, XmlNode};
use crate::common::Result;
use crate::sink::XmlSink;

/// Encoder for the section currently being written.
///
/// Derefs to [`BinaryXmlWriter`], so the whole writer API is available.
/// The writer borrows the buffer: it has to be dropped (or [`closed`]) before
/// [`XmlBuffer::close_section`] can be called. Dropping it flushes a pending
/// start tag and closes every element that is still open.
///
/// [`closed`]: SectionWriter::close
/// [`XmlBuffer::close_section`]: super::XmlBuffer::close_section
pub struct SectionWriter<'a> {
    writer: BinaryXmlWriter<&'a mut Vec<u8>>,
    index: usize,
}

impl<'a> SectionWriter<'a> {
    pub(crate) fn new(sink: &'a mut Vec<u8>, index: usize) -> Self {
        Self {
            writer: BinaryXmlWriter::new(sink),
            index,
        }
    }

    /// Index the section will have once it is closed.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Parse textual XML and append its nodes to the section.
    #[cfg(feature = "xml-import")]
    pub fn write_xml(&mut self, xml: &str) -> Result<()> {
        crate::binxml::import::copy_xml(xml, &mut self.writer)
    }

    /// Finish the section's content, reporting any encoder error that
    /// dropping the writer would only log.
    pub fn close(mut self) -> Result<()> {
        self.writer.finish()?;
        Ok(())
    }
}

impl<'a> Deref for SectionWriter<'a> {
    type Target = BinaryXmlWriter<&'a mut Vec<u8>>;

    fn deref(&self) -> &Self::Target {
        &self.writer
    }
}

impl DerefMut for SectionWriter<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.writer
    }
}

impl XmlSink for SectionWriter<'_> {
    fn write_node(&mut self, node: &XmlNode) -> Result<()> {
        Ok(self.writer.write_node(node)?)
    }
}

impl Drop for SectionWriter<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.writer.finish() {
            warn!("section {}: failed to finish encoder: {}", self.index, e);
        }
    }
}
