//! Excel/XLSX import using calamine.
//!
//! Lesson workbooks keep one table per sheet with the column names in the
//! first row. Sheets are read into [`Table`]s which a [`CsvStore`] can then
//! take over.
//!
//! [`CsvStore`]: crate::sources::CsvStore

use std::path::Path;

use calamine::{open_workbook, Data, Range, Reader, Xlsx, XlsxError};
use tracing::debug;

use crate::error::{DataError, Result};
use crate::table::Table;

/// Excel workbook reader
pub struct ExcelSource {
    /// Path to the Excel file
    path: String,
    /// Sheet names cache
    sheet_names: Vec<String>,
}

impl ExcelSource {
    /// Open an Excel workbook
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();

        if !path.as_ref().exists() {
            return Err(DataError::FileNotFound(path_str));
        }

        let workbook: Xlsx<_> = open_workbook(path.as_ref())
            .map_err(|e: XlsxError| DataError::WorkbookOpen(e.to_string()))?;

        let sheet_names = workbook.sheet_names().to_vec();

        Ok(Self {
            path: path_str,
            sheet_names,
        })
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// Whether the workbook has a sheet
    pub fn has_sheet(&self, sheet: &str) -> bool {
        self.sheet_names.iter().any(|s| s == sheet)
    }

    /// Read a sheet as a table; the first used row is the header
    pub fn read_sheet(&self, sheet: &str) -> Result<Table> {
        if !self.has_sheet(sheet) {
            return Err(DataError::SheetNotFound(sheet.to_string()));
        }

        let mut workbook: Xlsx<_> = open_workbook(&self.path)
            .map_err(|e| DataError::WorkbookOpen(format!("{}: {}", self.path, e)))?;
        let range = workbook
            .worksheet_range(sheet)
            .map_err(|e| DataError::SheetNotFound(format!("{}: {}", sheet, e)))?;

        let rows = Self::range_rows(&range);
        debug!(sheet, rows = rows.len(), "read sheet");
        Table::from_rows(sheet, rows)
    }

    fn range_rows(range: &Range<Data>) -> Vec<Vec<String>> {
        range
            .rows()
            .map(|row| row.iter().map(Self::cell_to_string).collect())
            .collect()
    }

    /// Convert a calamine cell to table text
    fn cell_to_string(cell: &Data) -> String {
        match cell {
            Data::Empty => String::new(),
            Data::String(s) => s.clone(),
            Data::Int(i) => i.to_string(),
            Data::Float(f) => {
                // ids come back as floats
                if f.fract() == 0.0 {
                    format!("{:.0}", f)
                } else {
                    f.to_string()
                }
            }
            Data::Bool(true) => "TRUE".to_string(),
            Data::Bool(false) => "FALSE".to_string(),
            Data::Error(e) => format!("#ERROR: {:?}", e),
            Data::DateTime(dt) => format!("{}", dt),
            Data::DateTimeIso(s) => s.clone(),
            Data::DurationIso(s) => s.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn inline(cell: &str, text: &str) -> String {
        format!(r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#, cell, text)
    }

    fn workbook(sheet: &str, rows: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        let mut zip = ZipWriter::new(file.as_file_mut());
        let options = SimpleFileOptions::default();

        let parts = [
            (
                "[Content_Types].xml",
                r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#.to_string(),
            ),
            (
                "_rels/.rels",
                r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#.to_string(),
            ),
            (
                "xl/workbook.xml",
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
                    sheet
                ),
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#.to_string(),
            ),
            (
                "xl/worksheets/sheet1.xml",
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
                    rows
                ),
            ),
        ];
        for (name, content) in parts {
            zip.start_file(name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        file
    }

    #[test]
    fn test_read_sheet() {
        let rows = format!(
            r#"<row r="1">{}{}{}</row><row r="2"><c r="A2"><v>1</v></c>{}<c r="C2" t="b"><v>0</v></c></row>"#,
            inline("A1", "id"),
            inline("B1", "title"),
            inline("C1", "slideCreated"),
            inline("B2", "Loops"),
        );
        let file = workbook("activity_content", &rows);

        let source = ExcelSource::new(file.path()).unwrap();
        assert_eq!(source.sheet_names(), ["activity_content".to_string()]);

        let table = source.read_sheet("activity_content").unwrap();
        assert_eq!(table.columns, vec!["id", "title", "slideCreated"]);
        assert_eq!(table.rows, vec![vec!["1", "Loops", "FALSE"]]);
    }

    #[test]
    fn test_missing_sheet_and_file() {
        let file = workbook("lesson_sequence", &format!(r#"<row r="1">{}</row>"#, inline("A1", "id")));
        let source = ExcelSource::new(file.path()).unwrap();
        assert!(matches!(
            source.read_sheet("activity_content"),
            Err(DataError::SheetNotFound(_))
        ));
        assert!(matches!(
            ExcelSource::new("/nonexistent/lessons.xlsx"),
            Err(DataError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(ExcelSource::cell_to_string(&Data::Empty), "");
        assert_eq!(
            ExcelSource::cell_to_string(&Data::String("hello".to_string())),
            "hello"
        );
        assert_eq!(ExcelSource::cell_to_string(&Data::Int(42)), "42");
        assert_eq!(ExcelSource::cell_to_string(&Data::Float(3.5)), "3.5");
        assert_eq!(ExcelSource::cell_to_string(&Data::Float(10.0)), "10");
        assert_eq!(ExcelSource::cell_to_string(&Data::Bool(true)), "TRUE");
    }
}
