//! Common types, traits, and utilities shared across modules.
//!
//! This module provides the unified error type and the low-level binary and
//! XML text helpers used by both the codec and the buffer.

// Submodule declarations
pub mod binary;
pub mod error;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, Result};
