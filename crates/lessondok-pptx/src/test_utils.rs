//! Shared test fixtures for lessondok-pptx
//!
//! Builds minimal `.pptx` packages in memory: a presentation part with a
//! slide id list and one part per slide. Masters and layouts are left out;
//! rendering never looks at them.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

use crate::constants::{
    DEFAULT_SLIDE_HEIGHT_EMU, DEFAULT_SLIDE_WIDTH_EMU, NS_DRAWING, NS_PRESENTATION,
    NS_RELATIONSHIPS, REL_TYPE_SLIDE,
};

/// Builder for a `.pptx` package
#[derive(Debug, Clone)]
pub struct PptxFixture {
    slides: Vec<String>,
    size: (i64, i64),
    reversed: bool,
}

impl Default for PptxFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl PptxFixture {
    /// An empty 4:3 deck
    pub fn new() -> Self {
        Self {
            slides: Vec::new(),
            size: (DEFAULT_SLIDE_WIDTH_EMU, DEFAULT_SLIDE_HEIGHT_EMU),
            reversed: false,
        }
    }

    /// Add a slide whose shape tree holds `shapes` (after the group properties)
    pub fn slide(mut self, shapes: &str) -> Self {
        self.slides.push(shapes.to_string());
        self
    }

    /// Set the slide size in EMU
    pub fn size(mut self, width: i64, height: i64) -> Self {
        self.size = (width, height);
        self
    }

    /// Store slide N of the presentation in part `slide{count - N + 1}.xml`
    pub fn reversed_parts(mut self) -> Self {
        self.reversed = true;
        self
    }

    fn part_number(&self, position: usize) -> usize {
        if self.reversed {
            self.slides.len() - position
        } else {
            position + 1
        }
    }

    /// Zip the package
    pub fn build(&self) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        let mut overrides = String::from(
            r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#,
        );
        let mut slide_ids = String::new();
        let mut rels = String::new();
        for position in 0..self.slides.len() {
            let part = self.part_number(position);
            overrides.push_str(&format!(
                r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
                part
            ));
            slide_ids.push_str(&format!(
                r#"<p:sldId id="{}" r:id="rId{}"/>"#,
                256 + position,
                position + 1
            ));
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="{}" Target="slides/slide{}.xml"/>"#,
                position + 1,
                REL_TYPE_SLIDE,
                part
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
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#,
        )
        .unwrap();

        zip.start_file("ppt/presentation.xml", options).unwrap();
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">
  <p:sldIdLst>{}</p:sldIdLst>
  <p:sldSz cx="{}" cy="{}"/>
  <p:notesSz cx="6858000" cy="9144000"/>
</p:presentation>"#,
                NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION, slide_ids, self.size.0, self.size.1
            )
            .as_bytes(),
        )
        .unwrap();

        zip.start_file("ppt/_rels/presentation.xml.rels", options)
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

        for (position, shapes) in self.slides.iter().enumerate() {
            zip.start_file(format!("ppt/slides/slide{}.xml", self.part_number(position)), options)
                .unwrap();
            zip.write_all(
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?>
<p:sld xmlns:a="{}" xmlns:p="{}"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>"#,
                    NS_DRAWING, NS_PRESENTATION, shapes
                )
                .as_bytes(),
            )
            .unwrap();
        }

        zip.finish().unwrap();
        buffer.into_inner()
    }
}

/// A text box holding one paragraph
pub fn text_shape(id: u32, text: &str) -> String {
    text_shape_lines(id, &[text])
}

/// A text box holding one paragraph per line; every paragraph carries
/// paragraph, run and end-of-paragraph properties
pub fn text_shape_lines(id: u32, lines: &[&str]) -> String {
    let paragraphs: String = lines
        .iter()
        .map(|line| {
            format!(
                r#"<a:p><a:pPr marL="0" indent="0"/><a:r><a:rPr lang="en-US" sz="1800" dirty="0"/><a:t>{}</a:t></a:r><a:endParaRPr lang="en-US" sz="1800"/></a:p>"#,
                line
            )
        })
        .collect();
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="457200" y="274638"/><a:ext cx="8229600" cy="1143000"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use lessondok_ooxml::OoxmlArchive;

    #[test]
    fn test_fixture_is_a_valid_package() {
        let bytes = PptxFixture::new()
            .slide(&text_shape(2, "one"))
            .slide(&text_shape(2, "two"))
            .build();
        let archive = OoxmlArchive::from_bytes(&bytes).unwrap();

        assert!(archive.contains("ppt/presentation.xml"));
        assert!(archive.contains("ppt/slides/slide2.xml"));
        let rels = archive.get_string("ppt/_rels/presentation.xml.rels").unwrap();
        assert!(rels.contains("slides/slide1.xml"));
    }

    #[test]
    fn test_reversed_parts() {
        let fixture = PptxFixture::new()
            .slide("")
            .slide("")
            .slide("")
            .reversed_parts();
        assert_eq!(fixture.part_number(0), 3);
        assert_eq!(fixture.part_number(2), 1);
    }
}
