//! Unified error types for xmlbuf.
//!
//! This module provides a unified error type that covers buffer lifecycle
//! misuse, binary XML codec failures and failures of the XML writers that
//! sections are streamed into.
use thiserror::Error;

use crate::binxml::CodecError;
use crate::buffer::BufferState;

/// Main error type for xmlbuf operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Operation attempted outside the lifecycle state it requires
    #[error("XmlBuffer cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: BufferState,
    },

    /// Argument outside its accepted range
    #[error("{name} out of range: {value} ({reason})")]
    OutOfRange {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Binary XML encoding or decoding failed
    #[error("Binary XML error: {0}")]
    Codec(#[from] CodecError),

    /// Textual XML parsing or writing error
    #[error("XML error: {0}")]
    XmlError(String),

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    #[inline]
    pub(crate) fn invalid_state(operation: &'static str, state: BufferState) -> Self {
        Error::InvalidState { operation, state }
    }

    /// Whether this is a lifecycle error.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Error::InvalidState { .. })
    }

    /// Whether this is a range error.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Error::OutOfRange { .. })
    }
}

/// Result type for xmlbuf operations.
pub type Result<T> = std::result::Result<T, Error>;
