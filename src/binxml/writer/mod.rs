//! Binary XML writer modules
//!
//! - **Record framing**: variable-length encoded record headers
//! - **Node encoding**: streaming XML writer API producing one record per node

/// Binary record writer with variable-length encoding
mod record;

/// Streaming node encoder
mod node;

// Re-export main types for public API
pub use node::BinaryXmlWriter;
pub use record::RecordWriter;
