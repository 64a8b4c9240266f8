//! Binary record writer
//!
//! Implements variable-length encoding for record types and sizes, the
//! counterpart of [`RecordHeader::read`](crate::binxml::records::RecordHeader::read).

use std::io::Write;

use bytes::BufMut;

use crate::binxml::error::{CodecError, CodecResult};
use crate::binxml::records::MAX_LENGTH;

/// Record writer with variable-length encoding support
pub struct RecordWriter<W: Write> {
    writer: W,
}

impl<W: Write> RecordWriter<W> {
    /// Create a new record writer
    pub fn new(writer: W) -> Self {
        RecordWriter { writer }
    }

    /// Write a complete record with header and data
    ///
    /// # Arguments
    ///
    /// * `record_type` - The record type identifier
    /// * `data` - The record data bytes
    ///
    /// # Example
    ///
    /// ```rust
    /// use xmlbuf::binxml::RecordWriter;
    ///
    /// let mut buffer = Vec::new();
    /// let mut writer = RecordWriter::new(&mut buffer);
    /// writer.write_record(0x0005, b"hi")?;
    /// assert_eq!(buffer, [0x05, 0x02, b'h', b'i']);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn write_record(&mut self, record_type: u16, data: &[u8]) -> CodecResult<()> {
        // Validate before writing anything so a rejected record leaves no partial header
        check_length(data.len())?;
        self.write_record_header(record_type, data.len())?;
        self.writer.write_all(data)?;
        Ok(())
    }

    /// Write record header with variable-length encoding
    fn write_record_header(&mut self, record_type: u16, data_len: usize) -> CodecResult<()> {
        // Write record type (1-3 bytes, variable-length encoded)
        self.write_variable_length_u16(record_type)?;

        // Write data length (1-4 bytes, variable-length encoded)
        let mut header = Vec::with_capacity(4);
        put_varint(&mut header, data_len)?;
        self.writer.write_all(&header)?;

        Ok(())
    }

    /// Write a u16 value with variable-length encoding (1-3 bytes)
    fn write_variable_length_u16(&mut self, mut value: u16) -> CodecResult<()> {
        // First byte: lower 7 bits + continuation bit
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;

        if value > 0 {
            byte |= 0x80; // Set continuation bit
        }
        self.writer.write_all(&[byte])?;

        if value > 0 {
            // Second byte
            byte = (value & 0x7F) as u8;
            value >>= 7;

            if value > 0 {
                byte |= 0x80;
            }
            self.writer.write_all(&[byte])?;

            if value > 0 {
                // Third byte
                byte = (value & 0x7F) as u8;
                self.writer.write_all(&[byte])?;
            }
        }

        Ok(())
    }

    /// Flush the underlying writer
    pub fn flush(&mut self) -> CodecResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Consume the writer and return the inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[inline]
fn check_length(len: usize) -> CodecResult<()> {
    if len > MAX_LENGTH {
        return Err(CodecError::InvalidLength {
            expected: MAX_LENGTH,
            found: len,
        });
    }
    Ok(())
}

/// Append a value with 7-bit variable-length encoding (1-4 bytes).
///
/// At most 28 bits can be represented; larger values are rejected.
pub(crate) fn put_varint<B: BufMut>(buf: &mut B, mut value: usize) -> CodecResult<()> {
    check_length(value)?;

    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;

        if value > 0 {
            byte |= 0x80; // Set continuation bit
        }

        buf.put_u8(byte);

        if value == 0 {
            return Ok(());
        }
    }
}

/// Append a length-prefixed UTF-8 string.
pub(crate) fn put_string<B: BufMut>(buf: &mut B, s: &str) -> CodecResult<()> {
    put_varint(buf, s.len())?;
    buf.put_slice(s.as_bytes());
    Ok(())
}
