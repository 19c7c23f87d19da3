//! # lessondok-pptx
//!
//! Slide deck rendering for lessondok.
//!
//! A copy of the deck template is filled from a lesson record:
//!
//! - **Placeholders**: every `{{field}}` in any text shape is replaced
//! - **Lists**: list fields become one `•` line per item
//! - **Videos**: configured slides get a centred link box for the lecture and
//!   topic videos, or a fallback note and a hidden slide when the link is
//!   unusable
//! - **Answer keys**: configured slides are hidden from the slide show
//!
//! ## Example
//!
//! ```rust,ignore
//! use lessondok_core::{FieldRecord, SubstitutionPlan};
//! use lessondok_pptx::{SlideMedia, SlideRenderer};
//!
//! let plan = SubstitutionPlan::slide_deck();
//! let media = SlideMedia::default();
//! let report = SlideRenderer::new(&plan, &media)
//!     .render_file("deck.pptx".as_ref(), "U3P2 Presentation.pptx".as_ref(), &record)?;
//! println!("{}", report.summary());
//! ```

pub mod bullets;
pub mod deck;
pub mod error;
pub mod media;
pub mod render;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-exports
pub use bullets::{bullet_line, expand_bullet_lines, BULLET_GLYPH};
pub use deck::{Slide, SlideDeck};
pub use error::{PptxError, Result};
pub use media::{MediaOutcome, SlideMedia, VideoGeometry, VideoSlot, FALLBACK_TEXT};
pub use render::SlideRenderer;

/// PPTX-related constants
pub mod constants {
    /// Default slide width in EMU (914400 EMU = 1 inch, standard 10" width)
    pub const DEFAULT_SLIDE_WIDTH_EMU: i64 = 9_144_000;

    /// Default slide height in EMU (standard 7.5" height for 4:3)
    pub const DEFAULT_SLIDE_HEIGHT_EMU: i64 = 6_858_000;

    /// EMU per point
    pub const EMU_PER_POINT: i64 = 12_700;

    /// PresentationML namespace
    pub const NS_PRESENTATION: &str =
        "http://schemas.openxmlformats.org/presentationml/2006/main";

    /// DrawingML namespace
    pub const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

    /// Relationships namespace
    pub const NS_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    /// Slide relationship type
    pub const REL_TYPE_SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

    /// Hyperlink relationship type
    pub const REL_TYPE_HYPERLINK: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

    /// Convert points to EMU
    pub fn points_to_emu(points: f64) -> i64 {
        (points * EMU_PER_POINT as f64).round() as i64
    }
}
