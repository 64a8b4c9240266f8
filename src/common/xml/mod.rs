//! XML text helpers used when rendering nodes as textual XML.

mod escape;

pub use escape::{escape_text, escape_xml};
