//! Record store implementations.
//!
//! The orchestrator talks to lesson tables only through [`RecordStore`], so
//! the CSV directory used in production and the in-memory store used by
//! tests and dry runs are interchangeable.

pub mod csv;
pub mod excel;
pub mod memory;

pub use self::csv::{CsvOptions, CsvStore};
pub use excel::ExcelSource;
pub use memory::MemoryStore;

use lessondok_core::{fields, FieldRecord, FieldValue};

use crate::error::{DataError, Result};

/// Row-oriented access to named lesson tables
pub trait RecordStore {
    /// Every row of a table, in row order
    fn read_all(&self, table: &str) -> Result<Vec<FieldRecord>>;

    /// Column names of a table, in order
    fn columns(&self, table: &str) -> Result<Vec<String>>;

    /// Set one field of the row whose id is `row_key`
    fn write_field(&mut self, table: &str, row_key: &str, field: &str, value: FieldValue) -> Result<()>;

    /// Append a row; fields are placed by column name
    fn append_row(&mut self, table: &str, record: &FieldRecord) -> Result<()>;

    /// The current row with id `row_key`
    fn find(&self, table: &str, row_key: &str) -> Result<Option<FieldRecord>> {
        Ok(self
            .read_all(table)?
            .into_iter()
            .find(|r| r.id().is_some_and(|id| id.trim() == row_key)))
    }

    /// Largest numeric id in the table
    fn last_id(&self, table: &str) -> Result<Option<u64>> {
        Ok(self
            .read_all(table)?
            .iter()
            .filter_map(|r| r.text(fields::ID).and_then(|id| id.trim().parse().ok()))
            .max())
    }

    /// Fail with [`DataError::MissingColumn`] for the first absent column
    fn require_columns(&self, table: &str, required: &[&str]) -> Result<()> {
        let columns = self.columns(table)?;
        match required.iter().find(|c| !columns.iter().any(|have| have == *c)) {
            Some(missing) => Err(DataError::missing_column(table, *missing)),
            None => Ok(()),
        }
    }

    /// Whether a table has a column
    fn has_column(&self, table: &str, column: &str) -> Result<bool> {
        Ok(self.columns(table)?.iter().any(|c| c == column))
    }
}
