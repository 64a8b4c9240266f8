//! Binary XML record framing
//!
//! Every node is stored as one record: a variable-length record type
//! (7 bits per byte, up to 3 bytes), a variable-length payload size
//! (7 bits per byte, up to 4 bytes) and the payload itself.

use std::io::Read;

use crate::binxml::error::{CodecError, CodecResult};
use crate::common::binary;

/// Largest payload or string length the framing can express (28 bits).
pub const MAX_LENGTH: usize = (1 << 28) - 1;

/// Record header (variable length encoding)
#[derive(Debug, Clone, Copy)]
pub struct RecordHeader {
    pub record_type: u16,
    pub data_len: usize,
}

impl RecordHeader {
    /// Read record header with variable-length encoding
    #[inline]
    pub fn read<R: Read>(reader: &mut R) -> CodecResult<Self> {
        let mut b = [0u8; 1];
        read_header_byte(reader, &mut b)?;
        let mut record_type = (b[0] & 0x7F) as u16;

        if (b[0] & 0x80) != 0 {
            read_header_byte(reader, &mut b)?;
            record_type |= ((b[0] & 0x7F) as u16) << 7;

            if (b[0] & 0x80) != 0 {
                read_header_byte(reader, &mut b)?;
                record_type |= ((b[0] & 0x7F) as u16) << 14;
            }
        }

        // Read variable-length data size
        let mut data_len = 0usize;
        let mut shift = 0;

        loop {
            read_header_byte(reader, &mut b)?;
            data_len |= ((b[0] & 0x7F) as usize) << shift;
            shift += 7;

            if (b[0] & 0x80) == 0 {
                break;
            }

            if shift >= 28 {
                return Err(CodecError::InvalidLength {
                    expected: MAX_LENGTH,
                    found: data_len,
                });
            }
        }

        Ok(RecordHeader {
            record_type,
            data_len,
        })
    }
}

#[inline]
fn read_header_byte<R: Read>(reader: &mut R, b: &mut [u8; 1]) -> CodecResult<()> {
    reader.read_exact(b).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => {
            CodecError::UnexpectedEndOfStream("truncated record header".to_string())
        },
        _ => CodecError::Io(e),
    })
}

/// Record type identifiers
pub mod record_types {
    pub const DECLARATION: u16 = 0x0001;
    pub const START_ELEMENT: u16 = 0x0002;
    pub const EMPTY_ELEMENT: u16 = 0x0003;
    pub const END_ELEMENT: u16 = 0x0004;
    pub const TEXT: u16 = 0x0005;
    pub const CDATA: u16 = 0x0006;
    pub const COMMENT: u16 = 0x0007;
    pub const PROCESSING_INSTRUCTION: u16 = 0x0008;
    pub const WHITESPACE: u16 = 0x0009;

    // Typed content
    pub const BYTES_TEXT: u16 = 0x000A;
    pub const INT32_TEXT: u16 = 0x000B;
    pub const INT64_TEXT: u16 = 0x000C;
    pub const DOUBLE_TEXT: u16 = 0x000D;
    pub const BOOL_TEXT: u16 = 0x000E;
}

/// Declaration flag bits
pub mod declaration_flags {
    pub const HAS_ENCODING: u8 = 0x01;
    pub const HAS_STANDALONE: u8 = 0x02;
    pub const STANDALONE: u8 = 0x04;
}

/// Sequential reader over a record payload.
#[derive(Debug)]
pub struct Payload<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Payload<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Payload { data, pos: 0 }
    }

    /// Bytes not consumed yet.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn read_u8(&mut self) -> CodecResult<u8> {
        let b = *self.data.get(self.pos).ok_or_else(|| CodecError::InvalidLength {
            expected: self.pos + 1,
            found: self.data.len(),
        })?;
        self.pos += 1;
        Ok(b)
    }

    /// Read a 7-bit variable-length unsigned integer (at most 4 bytes).
    pub fn read_varint(&mut self) -> CodecResult<usize> {
        let mut value = 0usize;
        let mut shift = 0;

        loop {
            let b = self.read_u8()?;
            value |= ((b & 0x7F) as usize) << shift;
            shift += 7;

            if (b & 0x80) == 0 {
                return Ok(value);
            }

            if shift >= 28 {
                return Err(CodecError::InvalidLength {
                    expected: MAX_LENGTH,
                    found: value,
                });
            }
        }
    }

    pub fn read_bytes(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(CodecError::InvalidLength {
                expected: self.pos + len,
                found: self.data.len(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn read_string(&mut self, what: &'static str) -> CodecResult<String> {
        let len = self.read_varint()?;
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| CodecError::InvalidUtf8(what))
    }

    pub fn read_i32(&mut self) -> CodecResult<i32> {
        let value = binary::read_i32_le(self.data, self.pos)?;
        self.pos += 4;
        Ok(value)
    }

    pub fn read_i64(&mut self) -> CodecResult<i64> {
        let value = binary::read_i64_le(self.data, self.pos)?;
        self.pos += 8;
        Ok(value)
    }

    pub fn read_f64(&mut self) -> CodecResult<f64> {
        let value = binary::read_f64_le(self.data, self.pos)?;
        self.pos += 8;
        Ok(value)
    }

    /// Fail if the record carried more bytes than its fields used.
    pub fn finish(&self) -> CodecResult<()> {
        if self.remaining() != 0 {
            return Err(CodecError::InvalidLength {
                expected: self.pos,
                found: self.data.len(),
            });
        }
        Ok(())
    }
}
