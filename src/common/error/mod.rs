//! Unified error types for xmlbuf.
//!
//! This module provides a unified error type that encompasses buffer, codec
//! and XML writer errors, presenting a consistent API to users.

// Submodule declarations
pub mod types;
pub mod conversions;

// Re-exports
pub use types::{Error, Result};
