//! # lessondok-core
//!
//! Shared model for the lessondok pipeline: lesson records, list-field
//! normalisation, output kinds, substitution plans and render reports.
//!
//! The format crates (`lessondok-ooxml`, `lessondok-pptx`) consume these
//! types; nothing in here touches the filesystem.
//!
//! ## Example
//!
//! ```
//! use lessondok_core::{document_name, FieldRecord, OutputKind};
//!
//! let record = FieldRecord::from_pairs([
//!     ("unit", "3"),
//!     ("period", "2"),
//!     ("title", "Loops"),
//!     ("mainTopic", "Iteration"),
//! ]);
//!
//! assert_eq!(
//!     document_name(OutputKind::ActivityDocument, &record),
//!     "U3P2 Activity Document Loops Iteration"
//! );
//! ```

pub mod kind;
pub mod list;
pub mod naming;
pub mod placeholder;
pub mod plan;
pub mod record;
pub mod report;

pub use kind::{OutputKind, TemplateFormat};
pub use list::{join_items, normalize_item, split_items, EmptyItemPolicy, ListItems};
pub use naming::{document_name, file_name, interpolate};
pub use placeholder::{placeholders_in, token, FOOTER_TOKEN, TITLE_TOKEN};
pub use plan::{Strategy, SubstitutionPlan, COMPLETION_CHECKLIST, KEY_TERMS};
pub use record::{fields, FieldRecord, FieldValue};
pub use report::{RenderEvent, RenderReport, TemplateAnchor};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
