use std::io::{BufWriter, Write};

use super::XmlSink;
use crate::binxml::XmlNode;
use crate::common::Result;

/// Sink rendering nodes as textual XML.
///
/// Output is buffered; call [`XmlSink::flush`] or [`XmlTextWriter::into_inner`]
/// to push it to the underlying writer.
pub struct XmlTextWriter<W: Write> {
    inner: BufWriter<W>,
    scratch: String,
}

impl<W: Write> XmlTextWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: BufWriter::new(writer),
            scratch: String::with_capacity(128),
        }
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.inner
            .into_inner()
            .map_err(|e| e.into_error().into())
    }
}

impl<W: Write> XmlSink for XmlTextWriter<W> {
    fn write_node(&mut self, node: &XmlNode) -> Result<()> {
        use std::fmt::Write as _;

        self.scratch.clear();
        // Writing into a String cannot fail
        let _ = write!(self.scratch, "{}", node);
        self.inner.write_all(self.scratch.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}
