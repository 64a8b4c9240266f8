//! Sectioned binary XML buffer
//!
//! An [`XmlBuffer`] collects several independently written binary XML
//! fragments into one contiguous store. Once sealed, any fragment can be
//! re-opened as its own reader, any number of times, without decoding the
//! others.
//!
//! # Lifecycle
//!
//! ```text
//! Created --open_section--> Writing --close_section--> Created --seal--> Sealed
//! ```
//!
//! Writers are only handed out while Created, readers only while Sealed.
//!
//! # Example
//!
//! ```rust
//! use xmlbuf::{ReaderQuotas, XmlBuffer, XmlNode};
//!
//! let mut buffer = XmlBuffer::new(1024)?;
//!
//! let mut section = buffer.open_section(&ReaderQuotas::default())?;
//! section.write_empty_element("a")?;
//! drop(section);
//! buffer.close_section()?;
//!
//! let mut section = buffer.open_section(&ReaderQuotas::default().with_max_depth(4))?;
//! section.write_start_element("b")?;
//! section.write_empty_element("c")?;
//! drop(section);
//! buffer.close_section()?;
//!
//! buffer.seal()?;
//! assert_eq!(buffer.section_count(), 2);
//!
//! let mut reader = buffer.get_reader(1)?;
//! let text: String = reader.nodes().map(|n| n.map(|n| n.to_string())).collect::<Result<_, _>>()?;
//! assert_eq!(text, "<b><c/></b>");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod section;
mod writer;

#[cfg(test)]
mod tests;

pub use section::Section;
pub use writer::SectionWriter;

use std::fmt;

use bytes::Bytes;
use log::{debug, info, warn};

use crate::binxml::{BinaryXmlReader, ReaderQuotas};
use crate::common::{Error, Result};
use crate::sink::{XmlSink, copy_node};

/// Largest initial allocation for the shared sink.
const INITIAL_CAPACITY: usize = 512;

/// Lifecycle state of an [`XmlBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    /// Accepting new sections
    Created,
    /// A section is open
    Writing,
    /// Read-only; readers can be created
    Sealed,
}

impl fmt::Display for BufferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BufferState::Created => "created",
            BufferState::Writing => "writing",
            BufferState::Sealed => "sealed",
        };
        f.write_str(name)
    }
}

/// Storage for each lifecycle state. The growable sink only exists until
/// the buffer is sealed, the frozen bytes only afterwards.
#[derive(Debug)]
enum Phase {
    Created { sink: Vec<u8> },
    Writing { sink: Vec<u8>, quotas: ReaderQuotas },
    Sealed { bytes: Bytes },
}

impl Phase {
    fn state(&self) -> BufferState {
        match self {
            Phase::Created { .. } => BufferState::Created,
            Phase::Writing { .. } => BufferState::Writing,
            Phase::Sealed { .. } => BufferState::Sealed,
        }
    }
}

/// Write-once, read-many buffer of binary XML sections.
#[derive(Debug)]
pub struct XmlBuffer {
    max_size: usize,
    phase: Phase,
    sections: Vec<Section>,
    /// Bytes committed by closed sections
    cursor: usize,
}

impl XmlBuffer {
    /// Create an empty buffer.
    ///
    /// `max_size` sizes the initial allocation and is checked when the
    /// buffer is sealed; a value that is negative (or otherwise not a valid
    /// size) fails with [`Error::OutOfRange`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xmlbuf::{BufferState, XmlBuffer};
    ///
    /// let buffer = XmlBuffer::new(1024)?;
    /// assert_eq!(buffer.state(), BufferState::Created);
    /// assert!(XmlBuffer::new(-1).unwrap_err().is_out_of_range());
    /// # Ok::<(), xmlbuf::Error>(())
    /// ```
    pub fn new<N>(max_size: N) -> Result<Self>
    where
        N: TryInto<usize> + Copy + fmt::Display,
    {
        let max_size: usize = max_size.try_into().map_err(|_| Error::OutOfRange {
            name: "max_size",
            value: max_size.to_string(),
            reason: "must be a non-negative size".to_string(),
        })?;

        Ok(Self {
            max_size,
            phase: Phase::Created {
                sink: Vec::with_capacity(max_size.min(INITIAL_CAPACITY)),
            },
            sections: Vec::new(),
            cursor: 0,
        })
    }

    pub fn state(&self) -> BufferState {
        self.phase.state()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Start a new section and return the writer for its content.
    ///
    /// `quotas` is copied: changing the caller's value afterwards has no
    /// effect on the section.
    pub fn open_section(&mut self, quotas: &ReaderQuotas) -> Result<SectionWriter<'_>> {
        let index = self.sections.len();
        let offset = self.cursor;

        match &mut self.phase {
            Phase::Created { sink } => {
                let sink = std::mem::take(sink);
                self.phase = Phase::Writing {
                    sink,
                    quotas: *quotas,
                };
            },
            other => return Err(Error::invalid_state("open a section", other.state())),
        }
        debug!("opened section {} at offset {}", index, offset);

        match &mut self.phase {
            Phase::Writing { sink, .. } => Ok(SectionWriter::new(sink, index)),
            other => Err(Error::invalid_state("open a section", other.state())),
        }
    }

    /// Record the open section and return to the Created state.
    pub fn close_section(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.phase, Phase::Sealed { bytes: Bytes::new() }) {
            Phase::Writing { sink, quotas } => {
                let section = Section::new(self.cursor, sink.len() - self.cursor, quotas);
                debug!(
                    "closed section {} at offset {}, {} bytes",
                    self.sections.len(),
                    section.offset(),
                    section.len()
                );
                self.cursor = sink.len();
                self.sections.push(section);
                self.phase = Phase::Created { sink };
                Ok(())
            },
            other => {
                let state = other.state();
                self.phase = other;
                Err(Error::invalid_state("close a section", state))
            },
        }
    }

    /// Freeze the buffer. No sections can be added afterwards, and readers
    /// become available.
    pub fn seal(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.phase, Phase::Sealed { bytes: Bytes::new() }) {
            Phase::Created { sink } => {
                let bytes = Bytes::from(sink);
                info!(
                    "sealed XmlBuffer: {} bytes in {} sections",
                    bytes.len(),
                    self.sections.len()
                );
                if bytes.len() > self.max_size {
                    warn!(
                        "sealed XmlBuffer size {} exceeds max_size {}",
                        bytes.len(),
                        self.max_size
                    );
                }
                self.phase = Phase::Sealed { bytes };
                Ok(())
            },
            other => {
                let state = other.state();
                self.phase = other;
                Err(Error::invalid_state("seal", state))
            },
        }
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    /// Closed sections in creation order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Total size of the sealed buffer.
    pub fn buffer_size(&self) -> Result<usize> {
        Ok(self.sealed_bytes_for("report the buffer size")?.len())
    }

    /// The whole sealed store.
    pub fn sealed_bytes(&self) -> Result<&Bytes> {
        self.sealed_bytes_for("expose sealed bytes")
    }

    /// Open a reader over section `index`, positioned on its first content
    /// node.
    ///
    /// The reader shares the sealed store but is otherwise independent of
    /// the buffer and of other readers.
    pub fn get_reader(&self, index: usize) -> Result<BinaryXmlReader> {
        let bytes = self.sealed_bytes_for("create a reader")?;
        let section = self.sections.get(index).ok_or_else(|| Error::OutOfRange {
            name: "index",
            value: index.to_string(),
            reason: format!("buffer has {} sections", self.sections.len()),
        })?;

        let mut reader = BinaryXmlReader::new(bytes.slice(section.range()), *section.quotas());
        reader.move_to_content()?;
        Ok(reader)
    }

    /// Stream every node of section `index` into `sink`.
    pub fn write_to<S: XmlSink + ?Sized>(&self, index: usize, sink: &mut S) -> Result<()> {
        let mut reader = self.get_reader(index)?;
        while reader.node().is_some() {
            copy_node(&mut reader, sink)?;
        }
        sink.flush()
    }

    fn sealed_bytes_for(&self, operation: &'static str) -> Result<&Bytes> {
        match &self.phase {
            Phase::Sealed { bytes } => Ok(bytes),
            other => Err(Error::invalid_state(operation, other.state())),
        }
    }
}
