//! # lessondok-data
//!
//! Lesson table storage for lessondok.
//!
//! ## Features
//!
//! - **Record stores**: [`RecordStore`] over a directory of CSV tables or an
//!   in-memory set of tables
//! - **Excel import**: read lesson sheets from `.xlsx` files using `calamine`
//!
//! ## Example
//!
//! ```rust,ignore
//! use lessondok_data::{tables, CsvStore, RecordStore};
//!
//! let store = CsvStore::new("lessons")?;
//! for record in store.read_all(tables::ACTIVITY_CONTENT)? {
//!     println!("{:?}", record.id());
//! }
//! ```

pub mod error;
pub mod sources;
pub mod table;

// Re-exports
pub use error::{DataError, Result};
pub use sources::{CsvOptions, CsvStore, ExcelSource, MemoryStore, RecordStore};
pub use table::{tables, Table};

use std::path::Path;

use tracing::info;

/// Data engine for moving lesson tables between formats
pub struct DataEngine;

impl DataEngine {
    /// Copy sheets of an Excel workbook into a CSV store
    ///
    /// # Arguments
    /// * `path` - Path to the Excel file
    /// * `store` - Destination store; each sheet replaces the table of the same name
    /// * `sheets` - Sheet names to import (all sheets if empty)
    ///
    /// # Returns
    /// The imported table names with their row counts
    pub fn import_workbook(
        path: impl AsRef<Path>,
        store: &CsvStore,
        sheets: &[String],
    ) -> Result<Vec<(String, usize)>> {
        let source = ExcelSource::new(path)?;

        let names: Vec<String> = if sheets.is_empty() {
            source.sheet_names().to_vec()
        } else {
            sheets.to_vec()
        };

        let mut imported = Vec::with_capacity(names.len());
        for name in names {
            let table = source.read_sheet(&name)?;
            store.import(&name, &table)?;
            imported.push((name, table.rows.len()));
        }

        info!(tables = imported.len(), "workbook import finished");
        Ok(imported)
    }
}
