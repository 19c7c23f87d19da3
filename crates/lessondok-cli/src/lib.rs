//! lessondok CLI - Command-line interface library
//!
//! This library provides the CLI functionality for lessondok, including:
//! - Documents, Slides, Lesson plans: render missing resources from the store
//! - Content: fill the content table from lesson outlines via a chat model
//! - Import: copy Excel sheets into the CSV store
//!
//! # Library Usage
//!
//! ```ignore
//! use lessondok_cli::{documents_command, Settings};
//! use lessondok_core::OutputKind;
//!
//! let settings = Settings::load(None)?;
//! let report = documents_command(&settings, &[OutputKind::SlideDeck], false)?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Create every missing activity document
//! lessondok documents
//!
//! # Try the slide template without touching the store
//! lessondok slides --dry-run
//!
//! # Generate lesson content, then all documents
//! lessondok content && lessondok all
//!
//! # Start a store from an existing workbook
//! lessondok import lessons.xlsx
//! ```

pub mod app;
pub mod orchestrator;
pub mod settings;

// Re-export main entry point and types
pub use app::{content_command, documents_command, import_command, run_cli};
pub use orchestrator::{
    check_templates, CreatedDocument, Failure, Orchestrator, Pacer, RunReport, SleepPacer,
};
pub use settings::Settings;
