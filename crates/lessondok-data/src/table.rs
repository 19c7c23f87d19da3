//! In-memory lesson tables
//!
//! A [`Table`] is a header row plus data rows of raw cell text, the shape
//! every backend reads and writes. Rows are identified by the value in the
//! first column.

use lessondok_core::{FieldRecord, FieldValue};
use tracing::warn;

use crate::error::{DataError, Result};

/// Default table names
pub mod tables {
    /// Lesson outline rows; input to content generation
    pub const LESSON_SEQUENCE: &str = "lesson_sequence";
    /// Generated lesson content; input to document generation
    pub const ACTIVITY_CONTENT: &str = "activity_content";
    /// Prompt and model settings for content generation
    pub const PROMPT_DETAILS: &str = "prompt_details";
}

/// Header row and data rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with columns
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build from raw rows; the first row is the header
    pub fn from_rows(name: &str, mut rows: Vec<Vec<String>>) -> Result<Self> {
        if rows.is_empty() {
            return Err(DataError::EmptyTable(name.to_string()));
        }
        let columns: Vec<String> = rows.remove(0).into_iter().map(|c| c.trim().to_string()).collect();
        let width = columns.len();
        for row in &mut rows {
            row.resize(width, String::new());
        }
        // trailing blank rows left behind by spreadsheet exports
        while rows.last().is_some_and(|r| r.iter().all(|c| c.trim().is_empty())) {
            rows.pop();
        }
        Ok(Self { columns, rows })
    }

    /// Index of a column
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Every row as a record, in row order; flag columns become booleans
    pub fn records(&self) -> Vec<FieldRecord> {
        self.rows
            .iter()
            .map(|row| {
                let mut record = FieldRecord::new();
                for (column, cell) in self.columns.iter().zip(row) {
                    record.insert(column.clone(), FieldValue::from_column(column, cell));
                }
                record
            })
            .collect()
    }

    /// Set one cell of the row whose first column equals `row_key`
    pub fn set_cell(&mut self, table: &str, row_key: &str, column: &str, value: &FieldValue) -> Result<()> {
        let col = self
            .column_index(column)
            .ok_or_else(|| DataError::missing_column(table, column))?;
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.first().is_some_and(|id| id.trim() == row_key))
            .ok_or_else(|| DataError::RowNotFound {
                table: table.to_string(),
                id: row_key.to_string(),
            })?;
        row[col] = value.to_cell();
        Ok(())
    }

    /// Append a record, placing values by column name.
    ///
    /// Record fields without a column are dropped with a warning.
    pub fn append(&mut self, table: &str, record: &FieldRecord) {
        let mut row = vec![String::new(); self.columns.len()];
        for (name, value) in record.iter() {
            match self.column_index(name) {
                Some(col) => row[col] = value.to_cell(),
                None => warn!(table, field = name, "no column for field, value dropped"),
            }
        }
        self.rows.push(row);
    }

    /// Largest numeric id in the first column
    pub fn last_id(&self) -> Option<u64> {
        self.rows
            .iter()
            .filter_map(|r| r.first().and_then(|id| id.trim().parse::<u64>().ok()))
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_from_rows_pads_and_trims() {
        let table = Table::from_rows(
            "t",
            rows(&[&["id ", "title", "slideCreated"], &["1", "Loops"], &["", "", ""]]),
        )
        .unwrap();

        assert_eq!(table.columns, vec!["id", "title", "slideCreated"]);
        assert_eq!(table.rows, rows(&[&["1", "Loops", ""]]));
    }

    #[test]
    fn test_empty_table_is_an_error() {
        assert!(matches!(
            Table::from_rows("t", Vec::new()),
            Err(DataError::EmptyTable(_))
        ));
    }

    #[test]
    fn test_records_parse_flags() {
        let table = Table::from_rows(
            "t",
            rows(&[&["id", "title", "slideCreated"], &["1", "Loops", "TRUE"], &["2", "Sets", "FALSE"]]),
        )
        .unwrap();

        let records = table.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text("title"), Some("Loops"));
        assert!(records[0].flag("slideCreated"));
        assert!(!records[1].flag("slideCreated"));
    }

    #[test]
    fn test_true_false_text_is_not_a_flag() {
        let table = Table::from_rows(
            "t",
            rows(&[&["id", "akTrueFalse", "slideCreated"], &["1", "False", "false"]]),
        )
        .unwrap();

        let record = &table.records()[0];
        assert_eq!(record.text("akTrueFalse"), Some("False"));
        assert_eq!(record.get("slideCreated"), Some(&FieldValue::Bool(false)));
    }

    #[test]
    fn test_set_cell() {
        let mut table = Table::from_rows("t", rows(&[&["id", "slideCreated"], &["7", "FALSE"]])).unwrap();

        table
            .set_cell("t", "7", "slideCreated", &FieldValue::Bool(true))
            .unwrap();
        assert_eq!(table.rows[0][1], FieldValue::Bool(true).to_cell());

        assert!(matches!(
            table.set_cell("t", "8", "slideCreated", &FieldValue::Bool(true)),
            Err(DataError::RowNotFound { .. })
        ));
        assert!(matches!(
            table.set_cell("t", "7", "slideLink", &FieldValue::from("x")),
            Err(DataError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_append_by_column_name() {
        let mut table = Table::new(["id", "title", "warmUp"]);
        let record = FieldRecord::from_pairs([("warmUp", "Count"), ("id", "3"), ("extra", "x")]);

        table.append("t", &record);

        assert_eq!(table.rows, rows(&[&["3", "", "Count"]]));
        assert_eq!(table.last_id(), Some(3));
    }

    #[test]
    fn test_last_id_ignores_non_numeric() {
        let table = Table::from_rows("t", rows(&[&["id"], &["2"], &["x"], &["10"]])).unwrap();
        assert_eq!(table.last_id(), Some(10));
        assert_eq!(Table::new(["id"]).last_id(), None);
    }
}
