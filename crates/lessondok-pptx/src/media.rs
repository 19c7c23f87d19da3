//! Video slots
//!
//! Two slides of the lesson deck carry videos: the lecture and the topic
//! short. Videos are linked, not embedded. A usable URL becomes a centred
//! text box whose text and click action point at the video. Anything else
//! becomes a note asking the teacher to add a video or drop the slide, and
//! the slide is hidden so an unfinished slide never shows in class.

use std::sync::OnceLock;

use lessondok_core::FieldRecord;
use lessondok_ooxml::XmlElement;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::{points_to_emu, REL_TYPE_HYPERLINK};
use crate::deck::SlideDeck;
use crate::error::Result;

/// Text of the box that replaces an unusable video
pub const FALLBACK_TEXT: &str = "Insert video or if not needed, delete this slide.";

/// Which slide shows which video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSlot {
    /// Slide number, counted from 1
    pub slide: usize,
    /// Record field holding the video URL
    pub url_field: String,
    /// Record field holding the video title shown in the box
    pub title_field: String,
}

impl VideoSlot {
    /// Create a slot
    pub fn new(slide: usize, url_field: impl Into<String>, title_field: impl Into<String>) -> Self {
        Self {
            slide,
            url_field: url_field.into(),
            title_field: title_field.into(),
        }
    }
}

/// Size and vertical offset of the video box, in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoGeometry {
    pub width_pt: f64,
    pub height_pt: f64,
    pub top_pt: f64,
}

impl Default for VideoGeometry {
    fn default() -> Self {
        Self {
            width_pt: 480.0,
            height_pt: 270.0,
            top_pt: 40.0,
        }
    }
}

/// Position and size of a shape in EMU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl VideoGeometry {
    /// The box, centred horizontally on a slide of the given width
    pub fn frame(&self, slide_width: i64) -> Frame {
        let cx = points_to_emu(self.width_pt);
        Frame {
            x: ((slide_width - cx) / 2).max(0),
            y: points_to_emu(self.top_pt),
            cx,
            cy: points_to_emu(self.height_pt),
        }
    }
}

/// Per-deck media settings: the `[slides]` configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideMedia {
    pub videos: Vec<VideoSlot>,
    /// Slides hidden in every generated deck (answer keys)
    pub hidden: Vec<usize>,
    pub geometry: VideoGeometry,
}

impl Default for SlideMedia {
    fn default() -> Self {
        Self {
            videos: vec![
                VideoSlot::new(6, "videoLecture", "lectureVideoTitle"),
                VideoSlot::new(7, "videoTopic", "shortsVideoTitle"),
            ],
            hidden: vec![11, 12],
            geometry: VideoGeometry::default(),
        }
    }
}

impl SlideMedia {
    /// No videos and no hidden slides
    pub fn none() -> Self {
        Self {
            videos: Vec::new(),
            hidden: Vec::new(),
            geometry: VideoGeometry::default(),
        }
    }
}

/// What happened to a video slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaOutcome {
    /// A link box was added; `rel_id` is its hyperlink relationship
    Linked { rel_id: String },
    /// The fallback note was added
    Fallback { reason: String, hidden: bool },
}

fn video_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^https?://[^\s/?#]+\S*$").expect("video url pattern is valid"))
}

/// Why a video reference cannot be linked, or `None` when it can
pub fn video_url_problem(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        Some("no video reference".to_string())
    } else if !video_url_regex().is_match(url) {
        Some(format!("not an http(s) URL: {}", url))
    } else {
        None
    }
}

/// Fill one video slot from the record
pub fn place_video(
    deck: &mut SlideDeck,
    slot: &VideoSlot,
    record: &FieldRecord,
    geometry: &VideoGeometry,
) -> Result<MediaOutcome> {
    let url = record.text_or_empty(&slot.url_field).trim().to_string();
    let frame = geometry.frame(deck.slide_size().0);

    if let Some(reason) = video_url_problem(&url) {
        warn!(slide = slot.slide, field = %slot.url_field, %reason, "video not inserted");
        let slide = deck.slide_mut(slot.slide)?;
        let id = slide.next_shape_id();
        slide
            .shape_tree_mut()?
            .push_element(text_box(id, "Video placeholder", &frame, FALLBACK_TEXT, None));
        let hidden = slide.hide();
        return Ok(MediaOutcome::Fallback { reason, hidden });
    }

    let rel_id = deck.add_slide_link(slot.slide, &url, REL_TYPE_HYPERLINK)?;
    let title = match record.text_or_empty(&slot.title_field).trim() {
        "" => url.as_str(),
        t => t,
    };
    let slide = deck.slide_mut(slot.slide)?;
    let id = slide.next_shape_id();
    slide
        .shape_tree_mut()?
        .push_element(text_box(id, "Video", &frame, title, Some(&rel_id)));
    debug!(slide = slot.slide, %url, %rel_id, "linked video");
    Ok(MediaOutcome::Linked { rel_id })
}

/// A centred text box; with `link`, both the shape and its text click
/// through to the relationship
fn text_box(id: u32, name: &str, frame: &Frame, text: &str, link: Option<&str>) -> XmlElement {
    let mut c_nv_pr = XmlElement::new("p:cNvPr")
        .with_attr("id", id.to_string())
        .with_attr("name", format!("{} {}", name, id));
    let mut run_props = XmlElement::new("a:rPr").with_attr("lang", "en-US");
    if let Some(rel_id) = link {
        c_nv_pr.push_element(XmlElement::new("a:hlinkClick").with_attr("r:id", rel_id));
        run_props.push_element(XmlElement::new("a:hlinkClick").with_attr("r:id", rel_id));
    }

    let nv_sp_pr = XmlElement::new("p:nvSpPr")
        .with_child(c_nv_pr)
        .with_child(XmlElement::new("p:cNvSpPr").with_attr("txBox", "1"))
        .with_child(XmlElement::new("p:nvPr"));

    let sp_pr = XmlElement::new("p:spPr")
        .with_child(
            XmlElement::new("a:xfrm")
                .with_child(
                    XmlElement::new("a:off")
                        .with_attr("x", frame.x.to_string())
                        .with_attr("y", frame.y.to_string()),
                )
                .with_child(
                    XmlElement::new("a:ext")
                        .with_attr("cx", frame.cx.to_string())
                        .with_attr("cy", frame.cy.to_string()),
                ),
        )
        .with_child(
            XmlElement::new("a:prstGeom")
                .with_attr("prst", "rect")
                .with_child(XmlElement::new("a:avLst")),
        );

    let tx_body = XmlElement::new("p:txBody")
        .with_child(
            XmlElement::new("a:bodyPr")
                .with_attr("wrap", "square")
                .with_attr("anchor", "ctr"),
        )
        .with_child(XmlElement::new("a:lstStyle"))
        .with_child(
            XmlElement::new("a:p")
                .with_child(XmlElement::new("a:pPr").with_attr("algn", "ctr"))
                .with_child(
                    XmlElement::new("a:r")
                        .with_child(run_props)
                        .with_child(XmlElement::new("a:t").with_text(text)),
                ),
        );

    XmlElement::new("p:sp")
        .with_child(nv_sp_pr)
        .with_child(sp_pr)
        .with_child(tx_body)
}
