//! Error types for the record store.

use thiserror::Error;

/// Result type for data operations
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while reading or writing lesson tables
#[derive(Debug, Error)]
pub enum DataError {
    /// File or directory not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Table does not exist in the store
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// A required column is absent
    #[error("Column '{column}' not found in table '{table}'")]
    MissingColumn { table: String, column: String },

    /// No row carries the given id
    #[error("No row with id '{id}' in table '{table}'")]
    RowNotFound { table: String, id: String },

    /// Table file has no header row
    #[error("Table '{0}' has no header row")]
    EmptyTable(String),

    /// Failed to open workbook
    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    /// Sheet not found in workbook
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read or write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Calamine error
    #[error("Excel error: {0}")]
    Calamine(String),
}

impl DataError {
    /// Create a missing column error
    pub fn missing_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            table: table.into(),
            column: column.into(),
        }
    }
}

impl From<calamine::Error> for DataError {
    fn from(err: calamine::Error) -> Self {
        DataError::Calamine(err.to_string())
    }
}

impl From<calamine::XlsxError> for DataError {
    fn from(err: calamine::XlsxError) -> Self {
        DataError::Calamine(err.to_string())
    }
}
