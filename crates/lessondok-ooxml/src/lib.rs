//! # lessondok-ooxml
//!
//! Office Open XML package handling and the `.docx` rendering engine for
//! lessondok.
//!
//! This crate provides functionality to:
//! - Unpack and repack OOXML packages (shared with `lessondok-pptx`)
//! - Replace `{{field}}` placeholders in body, header and footer parts
//! - Expand list fields into table rows or bulleted paragraphs
//!
//! ## Example: Rendering an Activity Document
//!
//! ```no_run
//! use std::path::Path;
//! use lessondok_core::{document_name, FieldRecord, OutputKind, SubstitutionPlan};
//! use lessondok_ooxml::DocxRenderer;
//!
//! let record = FieldRecord::from_pairs([("unit", "3"), ("period", "2")]);
//! let plan = SubstitutionPlan::activity_document();
//! let name = document_name(OutputKind::ActivityDocument, &record);
//!
//! let report = DocxRenderer::new(&plan)
//!     .with_title(name)
//!     .render_file(Path::new("activity.docx"), Path::new("out.docx"), &record)?;
//! println!("{}", report.summary());
//! # Ok::<(), lessondok_ooxml::OoxmlError>(())
//! ```

pub mod archive;
pub mod content_types;
pub mod document;
pub mod error;
pub mod expand;
pub mod numbering;
pub mod relationships;
pub mod render;
pub mod substitute;
pub mod xml;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use archive::OoxmlArchive;
pub use document::{PartKind, WordDocument};
pub use error::{OoxmlError, Result};
pub use expand::{expand_list, ExpandOutcome};
pub use relationships::{Relationship, Relationships};
pub use render::DocxRenderer;
pub use xml::{XmlDocument, XmlElement, XmlNode};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
