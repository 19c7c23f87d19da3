//! Error types for slide deck rendering.

use lessondok_ooxml::OoxmlError;
use thiserror::Error;

/// Result type for PPTX operations
pub type Result<T> = std::result::Result<T, PptxError>;

/// Errors that can occur while rendering a slide deck
#[derive(Error, Debug)]
pub enum PptxError {
    /// Template file not found or inaccessible
    #[error("Template not found: {path}")]
    TemplateNotFound { path: String },

    /// Template is invalid or corrupted
    #[error("Invalid template: {reason}")]
    InvalidTemplate { reason: String },

    /// A configured slide number does not exist in the deck
    #[error("Slide {slide} is out of range (deck has {count} slides)")]
    SlideOutOfRange { slide: usize, count: usize },

    /// Package level failure
    #[error("Package error: {0}")]
    Ooxml(#[from] OoxmlError),

    /// Presentation part could not be scanned
    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::Error),
}

impl PptxError {
    /// Create a template not found error
    pub fn template_not_found(path: impl Into<String>) -> Self {
        Self::TemplateNotFound { path: path.into() }
    }

    /// Create an invalid template error
    pub fn invalid_template(reason: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            reason: reason.into(),
        }
    }

    /// Get the error code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::TemplateNotFound { .. } => "PPTX001",
            Self::InvalidTemplate { .. } => "PPTX002",
            Self::SlideOutOfRange { .. } => "PPTX003",
            Self::Ooxml(_) => "PPTX004",
            Self::XmlError(_) => "PPTX005",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(PptxError::template_not_found("deck.pptx").code(), "PPTX001");
        assert_eq!(PptxError::invalid_template("no slides").code(), "PPTX002");
        assert_eq!(
            PptxError::SlideOutOfRange { slide: 12, count: 8 }.code(),
            "PPTX003"
        );
    }

    #[test]
    fn test_error_display() {
        let err = PptxError::SlideOutOfRange { slide: 12, count: 8 };
        assert_eq!(err.to_string(), "Slide 12 is out of range (deck has 8 slides)");

        let err = PptxError::template_not_found("/tmp/missing.pptx");
        assert!(err.to_string().contains("/tmp/missing.pptx"));
    }

    #[test]
    fn test_from_package_error() {
        let err: PptxError = OoxmlError::MissingFile("ppt/presentation.xml".into()).into();
        assert_eq!(err.code(), "PPTX004");
        assert!(err.to_string().contains("ppt/presentation.xml"));
    }
}
