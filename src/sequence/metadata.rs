use std::path::Path;
use thiserror::Error;

/// Name of the CXR header attribute carrying the element descriptors.
pub const ELEMENTS_ATTRIBUTE: &str = "corona.elements";

#[derive(Error, Debug)]
#[error("Failed to read 'corona.elements' from {path}: {message}")]
pub struct MetadataError {
    pub path: String,
    pub message: String,
}

impl MetadataError {
    pub fn new<P: AsRef<Path>, S: Into<String>>(path: P, message: S) -> Self {
        Self {
            path: path.as_ref().display().to_string(),
            message: message.into(),
        }
    }
}

/// Source of the raw element-descriptor string embedded in a CXR header.
///
/// `Ok(None)` means the attribute is absent; `Err` means the read failed.
/// Callers building a `SequenceEntry` treat both the same way (no extra
/// elements beyond the fixed defaults); the distinction only matters for
/// diagnostics and tests.
pub trait ElementSource {
    fn raw_elements(&self, path: &Path) -> Result<Option<String>, MetadataError>;
}

/// Element source for when no header decoder is available.
///
/// Every file reports no descriptor attribute, so entries fall back to the
/// fixed `[BEAUTY, Alpha]` element list.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullElementSource;

impl ElementSource for NullElementSource {
    fn raw_elements(&self, _path: &Path) -> Result<Option<String>, MetadataError> {
        Ok(None)
    }
}
