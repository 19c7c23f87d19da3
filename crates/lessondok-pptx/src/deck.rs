//! Slide deck loading.
//!
//! A [`SlideDeck`] holds the unpacked package and a parsed tree for every
//! slide, in presentation order. Presentation order comes from the slide id
//! list in `ppt/presentation.xml`, not from part names: a deck whose slides
//! were reordered in PowerPoint still keeps `slide3.xml` as its third part.

use std::path::Path;

use lessondok_ooxml::relationships::{rels_path_for, resolve_target};
use lessondok_ooxml::substitute::paragraph_text;
use lessondok_ooxml::{OoxmlArchive, Relationships, XmlDocument, XmlElement};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::constants::{DEFAULT_SLIDE_HEIGHT_EMU, DEFAULT_SLIDE_WIDTH_EMU, NS_RELATIONSHIPS};
use crate::error::{PptxError, Result};

/// Main presentation part
pub const PRESENTATION_PATH: &str = "ppt/presentation.xml";

/// One slide of a deck
#[derive(Debug, Clone)]
pub struct Slide {
    /// Position in the deck, counted from 1
    pub number: usize,
    /// Part path, e.g. `ppt/slides/slide6.xml`
    pub path: String,
    pub xml: XmlDocument,
}

impl Slide {
    /// Whether the slide is skipped during a slide show
    pub fn is_hidden(&self) -> bool {
        self.xml.root.attr("show") == Some("0")
    }

    /// Skip the slide during a slide show; returns false when it already was
    pub fn hide(&mut self) -> bool {
        if self.is_hidden() {
            return false;
        }
        self.xml.root.set_attr("show", "0");
        true
    }

    /// Text of every paragraph on the slide, in document order
    pub fn paragraphs(&self) -> Vec<String> {
        let mut paragraphs = Vec::new();
        self.xml.root.find_all("p", &mut paragraphs);
        paragraphs.into_iter().map(paragraph_text).collect()
    }

    /// The `p:spTree` that holds the slide's shapes
    pub fn shape_tree_mut(&mut self) -> Result<&mut XmlElement> {
        let path = self.path.clone();
        self.xml
            .root
            .child_mut("cSld")
            .and_then(|c| c.child_mut("spTree"))
            .ok_or_else(|| PptxError::invalid_template(format!("{} has no shape tree", path)))
    }

    /// An unused shape id (one past the largest `cNvPr` id)
    pub fn next_shape_id(&self) -> u32 {
        let mut props = Vec::new();
        self.xml.root.find_all("cNvPr", &mut props);
        props
            .iter()
            .filter_map(|p| p.attr("id").and_then(|id| id.parse::<u32>().ok()))
            .max()
            .unwrap_or(1)
            + 1
    }
}

/// A parsed `.pptx` package
#[derive(Debug, Clone)]
pub struct SlideDeck {
    archive: OoxmlArchive,
    slides: Vec<Slide>,
    slide_size: (i64, i64),
}

impl SlideDeck {
    /// Open a `.pptx` file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PptxError::template_not_found(path.display().to_string()));
        }
        Self::from_archive(OoxmlArchive::open(path)?)
    }

    /// Load from bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_archive(OoxmlArchive::from_bytes(data)?)
    }

    /// Parse the presentation and every slide it lists
    pub fn from_archive(archive: OoxmlArchive) -> Result<Self> {
        let presentation_xml = archive
            .get(PRESENTATION_PATH)
            .ok_or_else(|| PptxError::invalid_template("missing ppt/presentation.xml"))?;
        let slide_size = extract_slide_size(presentation_xml)?;
        let presentation = XmlDocument::parse(presentation_xml, PRESENTATION_PATH)?;

        let rels = match archive.get(&rels_path_for(PRESENTATION_PATH)) {
            Some(bytes) => Relationships::parse(bytes)?,
            None => Relationships::new(),
        };

        let mut slides = Vec::new();
        if let Some(list) = presentation.root.child("sldIdLst") {
            for entry in list.elements().filter(|e| e.is("sldId")) {
                let rel_id = entry
                    .attr("r:id")
                    .ok_or_else(|| PptxError::invalid_template("slide id without r:id"))?;
                let rel = rels.get(rel_id).ok_or_else(|| {
                    PptxError::invalid_template(format!("slide relationship {} not found", rel_id))
                })?;
                let path = resolve_target(PRESENTATION_PATH, &rel.target);
                let xml = XmlDocument::parse(archive.require(&path)?, &path)?;
                slides.push(Slide {
                    number: slides.len() + 1,
                    path,
                    xml,
                });
            }
        }

        debug!(slides = slides.len(), width = slide_size.0, height = slide_size.1, "loaded deck");
        Ok(Self {
            archive,
            slides,
            slide_size,
        })
    }

    /// Number of slides
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Slide dimensions (width, height) in EMU
    pub fn slide_size(&self) -> (i64, i64) {
        self.slide_size
    }

    /// All slides in presentation order
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// All slides, mutably
    pub fn slides_mut(&mut self) -> &mut [Slide] {
        &mut self.slides
    }

    /// Slide by 1-based number
    pub fn slide(&self, number: usize) -> Result<&Slide> {
        let count = self.slides.len();
        number
            .checked_sub(1)
            .and_then(|i| self.slides.get(i))
            .ok_or(PptxError::SlideOutOfRange {
                slide: number,
                count,
            })
    }

    /// Slide by 1-based number, mutably
    pub fn slide_mut(&mut self, number: usize) -> Result<&mut Slide> {
        let count = self.slides.len();
        number
            .checked_sub(1)
            .and_then(|i| self.slides.get_mut(i))
            .ok_or(PptxError::SlideOutOfRange {
                slide: number,
                count,
            })
    }

    /// Add an external hyperlink relationship to a slide; returns its id
    pub fn add_slide_link(&mut self, number: usize, url: &str, rel_type: &str) -> Result<String> {
        let path = self.slide(number)?.path.clone();
        let rels_path = rels_path_for(&path);
        let mut rels = match self.archive.get(&rels_path) {
            Some(bytes) => Relationships::parse(bytes)?,
            None => Relationships::new(),
        };
        let id = rels.add_external(url, rel_type);
        self.archive.set_string(rels_path, rels.to_xml());

        let root = &mut self.slide_mut(number)?.xml.root;
        if root.attr("xmlns:r").is_none() {
            root.set_attr("xmlns:r", NS_RELATIONSHIPS);
        }
        Ok(id)
    }

    /// Write the slide trees back and return the package
    pub fn into_archive(mut self) -> OoxmlArchive {
        for slide in &self.slides {
            self.archive.set_string(slide.path.clone(), slide.xml.to_xml());
        }
        self.archive
    }

    /// Serialise to `.pptx` bytes
    pub fn to_bytes(self) -> Result<Vec<u8>> {
        Ok(self.into_archive().to_bytes()?)
    }

    /// Write to a new file
    pub fn save(self, path: impl AsRef<Path>) -> Result<()> {
        self.into_archive().write_to_file(path)?;
        Ok(())
    }
}

/// Read `p:sldSz` from the presentation part, falling back to 4:3
fn extract_slide_size(presentation_xml: &[u8]) -> Result<(i64, i64)> {
    let mut reader = Reader::from_reader(presentation_xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut width = DEFAULT_SLIDE_WIDTH_EMU;
    let mut height = DEFAULT_SLIDE_HEIGHT_EMU;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(ref e) | Event::Start(ref e) if e.local_name().as_ref() == b"sldSz" => {
                for attr in e.attributes().flatten() {
                    let Ok(value) = std::str::from_utf8(&attr.value) else {
                        continue;
                    };
                    match attr.key.as_ref() {
                        b"cx" => width = value.parse().unwrap_or(width),
                        b"cy" => height = value.parse().unwrap_or(height),
                        _ => {}
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok((width, height))
}
