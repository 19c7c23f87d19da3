//! In-memory record store for tests and dry runs.

use std::collections::BTreeMap;

use lessondok_core::{FieldRecord, FieldValue};
use tracing::debug;

use crate::error::{DataError, Result};
use crate::sources::RecordStore;
use crate::table::Table;

/// Tables held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, Table>,
    writes: usize,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a table
    pub fn with_table(mut self, name: impl Into<String>, table: Table) -> Self {
        self.insert_table(name, table);
        self
    }

    /// Add or replace a table
    pub fn insert_table(&mut self, name: impl Into<String>, table: Table) {
        self.tables.insert(name.into(), table);
    }

    /// A table by name
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Number of field writes and appended rows so far
    pub fn write_count(&self) -> usize {
        self.writes
    }

    fn require(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| DataError::TableNotFound(name.to_string()))
    }

    fn require_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| DataError::TableNotFound(name.to_string()))
    }
}

impl RecordStore for MemoryStore {
    fn read_all(&self, table: &str) -> Result<Vec<FieldRecord>> {
        Ok(self.require(table)?.records())
    }

    fn columns(&self, table: &str) -> Result<Vec<String>> {
        Ok(self.require(table)?.columns.clone())
    }

    fn write_field(&mut self, table: &str, row_key: &str, field: &str, value: FieldValue) -> Result<()> {
        self.require_mut(table)?.set_cell(table, row_key, field, &value)?;
        self.writes += 1;
        debug!(table, row_key, field, "wrote field");
        Ok(())
    }

    fn append_row(&mut self, table: &str, record: &FieldRecord) -> Result<()> {
        self.require_mut(table)?.append(table, record);
        self.writes += 1;
        Ok(())
    }
}
