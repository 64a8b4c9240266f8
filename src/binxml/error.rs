//! Error types for binary XML encoding and decoding

use std::fmt;

use thiserror::Error;

use crate::common::binary::BinaryError;

/// Result type alias for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Reader quota that a decoded stream ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quota {
    MaxDepth,
    MaxStringContentLength,
    MaxArrayLength,
    MaxBytesPerRead,
    MaxNameTableCharCount,
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Quota::MaxDepth => "max_depth",
            Quota::MaxStringContentLength => "max_string_content_length",
            Quota::MaxArrayLength => "max_array_length",
            Quota::MaxBytesPerRead => "max_bytes_per_read",
            Quota::MaxNameTableCharCount => "max_name_table_char_count",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while encoding or decoding binary XML
#[derive(Debug, Error)]
pub enum CodecError {
    /// I/O error from the underlying writer
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid record type
    #[error("Invalid record type: 0x{0:04X}")]
    InvalidRecordType(u16),

    /// Invalid data length
    #[error("Invalid length: expected {expected}, found {found}")]
    InvalidLength {
        /// Expected length
        expected: usize,
        /// Found length
        found: usize,
    },

    /// End of stream reached unexpectedly
    #[error("Unexpected end of stream: {0}")]
    UnexpectedEndOfStream(String),

    /// String payload is not valid UTF-8
    #[error("Invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),

    /// Decoding would exceed a reader quota
    #[error("Reader quota {quota} exceeded: limit {limit}, found {found}")]
    QuotaExceeded {
        quota: Quota,
        limit: usize,
        found: usize,
    },

    /// End element with no element open
    #[error("End element without a matching start element")]
    UnbalancedEndElement,

    /// Stream ended while elements were still open
    #[error("{0} element(s) left open at end of stream")]
    UnclosedElements(usize),

    /// Writer call made in a position where it is not allowed
    #[error("Invalid writer state: {0}")]
    InvalidWriterState(&'static str),

    /// Empty or otherwise unusable name
    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    /// Whitespace node containing non-whitespace characters
    #[error("Whitespace node contains non-whitespace characters")]
    InvalidWhitespace,
}

impl From<BinaryError> for CodecError {
    fn from(err: BinaryError) -> Self {
        match err {
            BinaryError::InsufficientData {
                expected,
                available,
            } => CodecError::InvalidLength {
                expected,
                found: available,
            },
            BinaryError::ParseError(msg) => CodecError::UnexpectedEndOfStream(msg),
        }
    }
}
