//! WordprocessingML documents
//!
//! A [`WordDocument`] holds the unpacked package together with parsed trees
//! for the main document and every header and footer part. Edits happen on
//! the trees; [`WordDocument::into_archive`] writes them back.

use std::path::Path;

use crate::archive::OoxmlArchive;
use crate::error::{OoxmlError, Result};
use crate::substitute::paragraph_text;
use crate::xml::{XmlDocument, XmlElement};

/// Main document part
pub const DOCUMENT_PATH: &str = "word/document.xml";

/// Which part a tree came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Body,
    Header,
    Footer,
}

/// A parsed `.docx` package
#[derive(Debug, Clone)]
pub struct WordDocument {
    archive: OoxmlArchive,
    document: XmlDocument,
    headers: Vec<(String, XmlDocument)>,
    footers: Vec<(String, XmlDocument)>,
}

impl WordDocument {
    /// Open a `.docx` file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_archive(OoxmlArchive::open(path)?)
    }

    /// Load from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_archive(OoxmlArchive::from_bytes(bytes)?)
    }

    /// Parse the main, header and footer parts of a package
    pub fn from_archive(archive: OoxmlArchive) -> Result<Self> {
        let document = XmlDocument::parse(archive.require(DOCUMENT_PATH)?, DOCUMENT_PATH)?;
        if document.root.child("body").is_none() {
            return Err(OoxmlError::invalid(DOCUMENT_PATH, "missing w:body"));
        }

        let headers = parse_parts(&archive, "header")?;
        let footers = parse_parts(&archive, "footer")?;

        Ok(Self {
            archive,
            document,
            headers,
            footers,
        })
    }

    /// The `w:body` element
    pub fn body(&self) -> Result<&XmlElement> {
        self.document
            .root
            .child("body")
            .ok_or_else(|| OoxmlError::invalid(DOCUMENT_PATH, "missing w:body"))
    }

    /// The `w:body` element, mutably
    pub fn body_mut(&mut self) -> Result<&mut XmlElement> {
        self.document
            .root
            .child_mut("body")
            .ok_or_else(|| OoxmlError::invalid(DOCUMENT_PATH, "missing w:body"))
    }

    /// Root elements of every text-bearing part
    pub fn parts(&self) -> impl Iterator<Item = (PartKind, &XmlElement)> {
        std::iter::once((PartKind::Body, &self.document.root))
            .chain(self.headers.iter().map(|(_, d)| (PartKind::Header, &d.root)))
            .chain(self.footers.iter().map(|(_, d)| (PartKind::Footer, &d.root)))
    }

    /// Root elements of every text-bearing part, mutably
    pub fn parts_mut(&mut self) -> impl Iterator<Item = (PartKind, &mut XmlElement)> {
        std::iter::once((PartKind::Body, &mut self.document.root))
            .chain(
                self.headers
                    .iter_mut()
                    .map(|(_, d)| (PartKind::Header, &mut d.root)),
            )
            .chain(
                self.footers
                    .iter_mut()
                    .map(|(_, d)| (PartKind::Footer, &mut d.root)),
            )
    }

    /// Number of header and footer parts
    pub fn header_footer_count(&self) -> (usize, usize) {
        (self.headers.len(), self.footers.len())
    }

    /// The underlying package
    pub fn archive(&self) -> &OoxmlArchive {
        &self.archive
    }

    /// The underlying package, mutably (for numbering and relationship parts)
    pub fn archive_mut(&mut self) -> &mut OoxmlArchive {
        &mut self.archive
    }

    /// Text of each body paragraph, tables included, in document order
    pub fn body_paragraphs(&self) -> Vec<String> {
        let mut paragraphs = Vec::new();
        self.document.root.find_all("p", &mut paragraphs);
        paragraphs.into_iter().map(paragraph_text).collect()
    }

    /// Text of each paragraph in one kind of part
    pub fn part_paragraphs(&self, kind: PartKind) -> Vec<String> {
        let mut out = Vec::new();
        for (k, root) in self.parts() {
            if k == kind {
                let mut paragraphs = Vec::new();
                root.find_all("p", &mut paragraphs);
                out.extend(paragraphs.into_iter().map(paragraph_text));
            }
        }
        out
    }

    /// Write the edited trees back into the package
    pub fn into_archive(self) -> OoxmlArchive {
        let mut archive = self.archive;
        archive.set_string(DOCUMENT_PATH, self.document.to_xml());
        for (path, doc) in self.headers.into_iter().chain(self.footers) {
            archive.set_string(path, doc.to_xml());
        }
        archive
    }

    /// Serialise the package
    pub fn to_bytes(self) -> Result<Vec<u8>> {
        self.into_archive().to_bytes()
    }

    /// Write the package to a file
    pub fn save<P: AsRef<Path>>(self, path: P) -> Result<()> {
        self.into_archive().write_to_file(path)
    }
}

fn parse_parts(archive: &OoxmlArchive, stem: &str) -> Result<Vec<(String, XmlDocument)>> {
    archive
        .parts_named("word/", stem)
        .into_iter()
        .map(|path| {
            let doc = XmlDocument::parse(archive.require(&path)?, &path)?;
            Ok((path, doc))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::DocxFixture;

    #[test]
    fn test_loads_headers_and_footers() {
        let bytes = DocxFixture::new(r#"<w:p><w:r><w:t>Body</w:t></w:r></w:p>"#)
            .header(r#"<w:p><w:r><w:t>Head</w:t></w:r></w:p>"#)
            .footer(r#"<w:p><w:r><w:t>Foot</w:t></w:r></w:p>"#)
            .build();

        let doc = WordDocument::from_bytes(&bytes).unwrap();
        assert_eq!(doc.header_footer_count(), (1, 1));
        assert_eq!(doc.body_paragraphs(), vec!["Body"]);
        assert_eq!(doc.part_paragraphs(PartKind::Header), vec!["Head"]);
        assert_eq!(doc.part_paragraphs(PartKind::Footer), vec!["Foot"]);
    }

    #[test]
    fn test_missing_document_part() {
        let mut archive = OoxmlArchive::new();
        archive.set_string("word/styles.xml", "<w:styles/>");
        let err = WordDocument::from_archive(archive).unwrap_err();
        assert!(matches!(err, OoxmlError::MissingFile(_)));
    }

    #[test]
    fn test_round_trip_keeps_other_parts() {
        let bytes = DocxFixture::new(r#"<w:p><w:r><w:t>Body</w:t></w:r></w:p>"#).build();
        let doc = WordDocument::from_bytes(&bytes).unwrap();

        let out = doc.to_bytes().unwrap();
        let archive = OoxmlArchive::from_bytes(&out).unwrap();
        assert!(archive.contains("_rels/.rels"));
        assert!(archive.get_string(DOCUMENT_PATH).unwrap().contains("Body"));
    }
}
