//! Shared test fixtures for lessondok-ooxml
//!
//! Builds small but valid `.docx` packages in memory. Enabled for this
//! crate's own tests and, through the `test-utils` feature, for dependants.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

use crate::archive::OoxmlArchive;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Builder for a `.docx` package with a given body and optional
/// header, footer and numbering parts
///
/// # Example
/// ```ignore
/// use lessondok_ooxml::test_utils::DocxFixture;
/// let bytes = DocxFixture::new("<w:p><w:r><w:t>{{title}}</w:t></w:r></w:p>").build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocxFixture {
    body: String,
    headers: Vec<String>,
    footers: Vec<String>,
    numbering: Option<String>,
}

impl DocxFixture {
    /// Start from body content (the children of `w:body`, without `w:sectPr`)
    pub fn new(body: &str) -> Self {
        Self {
            body: body.to_string(),
            ..Self::default()
        }
    }

    /// Add a header part with the given content
    pub fn header(mut self, content: &str) -> Self {
        self.headers.push(content.to_string());
        self
    }

    /// Add a footer part with the given content
    pub fn footer(mut self, content: &str) -> Self {
        self.footers.push(content.to_string());
        self
    }

    /// Add a `word/numbering.xml` with the given children of `w:numbering`
    pub fn numbering(mut self, content: &str) -> Self {
        self.numbering = Some(content.to_string());
        self
    }

    /// Zip the package
    pub fn build(&self) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        let mut overrides = String::from(
            r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
        );
        let mut rels = String::new();
        let mut sect_refs = String::new();
        let mut next_rel = 1;

        for (i, _) in self.headers.iter().enumerate() {
            let n = i + 1;
            overrides.push_str(&format!(
                r#"<Override PartName="/word/header{}.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml"/>"#,
                n
            ));
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header{}.xml"/>"#,
                next_rel, n
            ));
            sect_refs.push_str(&format!(r#"<w:headerReference w:type="default" r:id="rId{}"/>"#, next_rel));
            next_rel += 1;
        }
        for (i, _) in self.footers.iter().enumerate() {
            let n = i + 1;
            overrides.push_str(&format!(
                r#"<Override PartName="/word/footer{}.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"/>"#,
                n
            ));
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer{}.xml"/>"#,
                next_rel, n
            ));
            sect_refs.push_str(&format!(r#"<w:footerReference w:type="default" r:id="rId{}"/>"#, next_rel));
            next_rel += 1;
        }
        if self.numbering.is_some() {
            overrides.push_str(
                r#"<Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>"#,
            );
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/>"#,
                next_rel
            ));
        }

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  {}
</Types>"#,
                overrides
            )
            .as_bytes(),
        )
        .unwrap();

        zip.start_file("_rels/.rels", options).unwrap();
        zip.write_all(
            br#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#,
        )
        .unwrap();

        zip.start_file("word/_rels/document.xml.rels", options)
            .unwrap();
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
                rels
            )
            .as_bytes(),
        )
        .unwrap();

        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="{}" xmlns:r="{}">
  <w:body>
    {}
    <w:sectPr>{}</w:sectPr>
  </w:body>
</w:document>"#,
                W_NS, R_NS, self.body, sect_refs
            )
            .as_bytes(),
        )
        .unwrap();

        for (i, content) in self.headers.iter().enumerate() {
            zip.start_file(format!("word/header{}.xml", i + 1), options)
                .unwrap();
            zip.write_all(
                format!(r#"<w:hdr xmlns:w="{}">{}</w:hdr>"#, W_NS, content).as_bytes(),
            )
            .unwrap();
        }
        for (i, content) in self.footers.iter().enumerate() {
            zip.start_file(format!("word/footer{}.xml", i + 1), options)
                .unwrap();
            zip.write_all(
                format!(r#"<w:ftr xmlns:w="{}">{}</w:ftr>"#, W_NS, content).as_bytes(),
            )
            .unwrap();
        }
        if let Some(numbering) = &self.numbering {
            zip.start_file("word/numbering.xml", options).unwrap();
            zip.write_all(
                format!(r#"<w:numbering xmlns:w="{}">{}</w:numbering>"#, W_NS, numbering).as_bytes(),
            )
            .unwrap();
        }

        zip.finish().unwrap();
        buffer.into_inner()
    }
}

/// A heading paragraph followed by a three-row checklist table: a header
/// row, an anchor row whose right cell reads `anchor_text` and whose left
/// cell is shaded, and a closing `Total | end` row
pub fn checklist_table(anchor_text: &str) -> String {
    format!(
        r#"<w:p><w:r><w:t>Checklist</w:t></w:r></w:p>
<w:tbl>
  <w:tblPr><w:tblW w:w="0" w:type="auto"/></w:tblPr>
  <w:tblGrid><w:gridCol w:w="800"/><w:gridCol w:w="8000"/></w:tblGrid>
  <w:tr>
    <w:tc><w:p><w:r><w:t>Done</w:t></w:r></w:p></w:tc>
    <w:tc><w:p><w:r><w:t>Task</w:t></w:r></w:p></w:tc>
  </w:tr>
  <w:tr>
    <w:tc><w:tcPr><w:tcW w:w="800" w:type="dxa"/><w:shd w:val="clear" w:fill="D9E2F3"/></w:tcPr><w:p/></w:tc>
    <w:tc><w:tcPr><w:tcW w:w="8000" w:type="dxa"/></w:tcPr><w:p><w:pPr><w:spacing w:after="0"/></w:pPr><w:r><w:rPr><w:sz w:val="22"/></w:rPr><w:t>{}</w:t></w:r></w:p></w:tc>
  </w:tr>
  <w:tr>
    <w:tc><w:p><w:r><w:t>Total</w:t></w:r></w:p></w:tc>
    <w:tc><w:p><w:r><w:t>end</w:t></w:r></w:p></w:tc>
  </w:tr>
</w:tbl>"#,
        anchor_text
    )
}

/// Extract `word/document.xml` from package bytes
pub fn extract_document_xml(docx: &[u8]) -> String {
    extract_file(docx, "word/document.xml").unwrap()
}

/// Extract any part from package bytes
pub fn extract_file(docx: &[u8], path: &str) -> Option<String> {
    let archive = OoxmlArchive::from_bytes(docx).unwrap();
    archive.get_string(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_is_a_valid_package() {
        let bytes = DocxFixture::new("<w:p/>")
            .header("<w:p/>")
            .footer("<w:p/>")
            .build();
        let archive = OoxmlArchive::from_bytes(&bytes).unwrap();

        assert!(archive.contains("[Content_Types].xml"));
        assert!(archive.contains("word/header1.xml"));
        assert!(archive.contains("word/footer1.xml"));

        let rels = extract_file(&bytes, "word/_rels/document.xml.rels").unwrap();
        assert!(rels.contains("header1.xml"));
        assert!(rels.contains("footer1.xml"));
    }

    #[test]
    fn test_checklist_table_contains_anchor() {
        let bytes = DocxFixture::new(&checklist_table("{{steps}}")).build();
        let xml = extract_document_xml(&bytes);
        assert!(xml.contains("{{steps}}"));
        assert!(xml.contains("w:shd"));
    }
}
