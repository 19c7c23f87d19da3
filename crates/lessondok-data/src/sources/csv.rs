//! CSV directory store.
//!
//! Each table is a file `<root>/<table>.csv` whose first row holds the
//! column names. Every write rewrites the whole file: the new content goes
//! to a sibling temp file which then replaces the table, so a failed write
//! never leaves a half-written table behind.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use lessondok_core::{FieldRecord, FieldValue};
use tracing::{debug, info};

use crate::error::{DataError, Result};
use crate::sources::RecordStore;
use crate::table::Table;

/// Options for CSV parsing
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
    /// Quote character (default: double quote)
    pub quote: u8,
    /// Whether to trim whitespace from fields
    pub trim: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            trim: false,
        }
    }
}

impl CsvOptions {
    /// Create options for tab-separated values (TSV)
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            ..Default::default()
        }
    }

    /// Create options for semicolon-separated values (common in European locales)
    pub fn semicolon() -> Self {
        Self {
            delimiter: b';',
            ..Default::default()
        }
    }
}

/// A directory of CSV tables
#[derive(Debug, Clone)]
pub struct CsvStore {
    root: PathBuf,
    options: CsvOptions,
}

impl CsvStore {
    /// Open a store rooted at an existing directory
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(root, CsvOptions::default())
    }

    /// Open a store with custom options
    pub fn with_options(root: impl AsRef<Path>, options: CsvOptions) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(DataError::FileNotFound(root.display().to_string()));
        }
        Ok(Self {
            root: root.to_path_buf(),
            options,
        })
    }

    /// Directory holding the tables
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing a table
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{}.csv", table))
    }

    /// Read a whole table
    pub fn load(&self, table: &str) -> Result<Table> {
        let path = self.table_path(table);
        if !path.is_file() {
            return Err(DataError::TableNotFound(table.to_string()));
        }
        let reader = BufReader::new(File::open(&path)?);

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .has_headers(false) // the header row is handled by Table
            .trim(if self.options.trim {
                csv::Trim::All
            } else {
                csv::Trim::None
            })
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }
        Table::from_rows(table, rows)
    }

    /// Replace a table's file with `data`
    pub fn save(&self, table: &str, data: &Table) -> Result<()> {
        let path = self.table_path(table);
        let tmp_path = path.with_extension("csv.tmp");

        {
            let mut writer = csv::WriterBuilder::new()
                .delimiter(self.options.delimiter)
                .quote(self.options.quote)
                .from_path(&tmp_path)?;
            writer.write_record(&data.columns)?;
            for row in &data.rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp_path, &path)?;

        debug!(table, rows = data.rows.len(), path = %path.display(), "saved table");
        Ok(())
    }

    /// Create or replace a table from imported rows
    pub fn import(&self, table: &str, data: &Table) -> Result<()> {
        self.save(table, data)?;
        info!(table, rows = data.rows.len(), "imported table");
        Ok(())
    }
}

impl RecordStore for CsvStore {
    fn read_all(&self, table: &str) -> Result<Vec<FieldRecord>> {
        Ok(self.load(table)?.records())
    }

    fn columns(&self, table: &str) -> Result<Vec<String>> {
        Ok(self.load(table)?.columns)
    }

    fn write_field(&mut self, table: &str, row_key: &str, field: &str, value: FieldValue) -> Result<()> {
        let mut data = self.load(table)?;
        data.set_cell(table, row_key, field, &value)?;
        self.save(table, &data)
    }

    fn append_row(&mut self, table: &str, record: &FieldRecord) -> Result<()> {
        let mut data = self.load(table)?;
        data.append(table, record);
        self.save(table, &data)?;
        info!(table, id = record.id().unwrap_or_default(), "appended row");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with(table: &str, content: &str) -> (TempDir, CsvStore) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(format!("{}.csv", table)), content).unwrap();
        let store = CsvStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_read_all() {
        let (_dir, store) = store_with(
            "activity_content",
            "id,title,completionChecklist,slideCreated\n1,Loops,\"read ch1|do hw2\",FALSE\n2,Sets,,TRUE\n",
        );

        let rows = store.read_all("activity_content").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text("completionChecklist"), Some("read ch1|do hw2"));
        assert!(!rows[0].flag("slideCreated"));
        assert!(rows[1].flag("slideCreated"));
    }

    #[test]
    fn test_quoted_fields_round_trip() {
        let (_dir, mut store) = store_with(
            "activity_content",
            "id,warmUp,slideCreated\n1,\"Count, then \"\"stop\"\"\",FALSE\n",
        );

        store
            .write_field("activity_content", "1", "slideCreated", FieldValue::Bool(true))
            .unwrap();

        let rows = store.read_all("activity_content").unwrap();
        assert_eq!(rows[0].text("warmUp"), Some("Count, then \"stop\""));
        assert!(rows[0].flag("slideCreated"));
    }

    #[test]
    fn test_append_row() {
        let (dir, mut store) = store_with("activity_content", "id,title\n1,Loops\n");

        store
            .append_row("activity_content", &FieldRecord::from_pairs([("id", "2"), ("title", "Sets")]))
            .unwrap();

        let text = fs::read_to_string(dir.path().join("activity_content.csv")).unwrap();
        assert_eq!(text, "id,title\n1,Loops\n2,Sets\n");
        assert!(!dir.path().join("activity_content.csv.tmp").exists());
        assert_eq!(store.last_id("activity_content").unwrap(), Some(2));
    }

    #[test]
    fn test_missing_table_and_root() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::new(dir.path()).unwrap();
        assert!(matches!(
            store.read_all("lesson_sequence"),
            Err(DataError::TableNotFound(_))
        ));
        assert!(matches!(
            CsvStore::new(dir.path().join("nope")),
            Err(DataError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_semicolon_options() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("t.csv"), "id;title\n1;Loops\n").unwrap();
        let store = CsvStore::with_options(dir.path(), CsvOptions::semicolon()).unwrap();
        assert_eq!(store.columns("t").unwrap(), vec!["id", "title"]);
    }
}
