//! Error types for package operations

use thiserror::Error;

/// Errors that can occur while reading, rendering or writing a package
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// Error reading or writing the ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Required part not found in the package
    #[error("Required file not found: {0}")]
    MissingFile(String),

    /// A part parsed but does not have the expected shape
    #[error("Invalid document structure in {part}: {reason}")]
    InvalidStructure { part: String, reason: String },
}

impl OoxmlError {
    /// Create an invalid structure error
    pub fn invalid(part: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidStructure {
            part: part.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for package operations
pub type Result<T> = std::result::Result<T, OoxmlError>;
