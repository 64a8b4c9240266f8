//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert from the
//! errors of external collaborators to the unified Error type.

#[cfg(feature = "xml-import")]
use super::types::Error;

#[cfg(feature = "xml-import")]
impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlError(err.to_string())
    }
}

#[cfg(feature = "xml-import")]
impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlError(err.to_string())
    }
}
