//! Slide deck rendering
//!
//! Order of work on a deck copy:
//!
//! 1. placeholders split across runs are merged;
//! 2. video slots are filled (link box, or fallback note and hidden slide);
//! 3. answer-key slides are hidden;
//! 4. text fields replace their tokens on every slide;
//! 5. list fields become bullet lines wherever their token appears;
//! 6. the `{{footer}}` composite is filled when the plan has one;
//! 7. tokens still present are reported as unresolved.

use std::path::Path;

use lessondok_core::{
    interpolate, split_items, token, FieldRecord, FieldValue, RenderEvent, RenderReport,
    Strategy, SubstitutionPlan, TemplateAnchor, FOOTER_TOKEN,
};
use lessondok_ooxml::substitute::{merge_split_tokens_in, remaining_placeholders, replace_in};
use tracing::debug;

use crate::bullets::expand_bullet_lines;
use crate::deck::SlideDeck;
use crate::error::Result;
use crate::media::{place_video, MediaOutcome, SlideMedia};

/// Renders `.pptx` templates
#[derive(Debug, Clone)]
pub struct SlideRenderer<'a> {
    plan: &'a SubstitutionPlan,
    media: &'a SlideMedia,
}

impl<'a> SlideRenderer<'a> {
    /// Create a renderer
    pub fn new(plan: &'a SubstitutionPlan, media: &'a SlideMedia) -> Self {
        Self { plan, media }
    }

    /// Render a template file into `output`
    pub fn render_file(&self, template: &Path, output: &Path, record: &FieldRecord) -> Result<RenderReport> {
        let mut deck = SlideDeck::open(template)?;
        let report = self.render_deck(&mut deck, record)?;
        deck.save(output)?;
        debug!(output = %output.display(), "{}", report.summary());
        Ok(report)
    }

    /// Render template bytes into new package bytes
    pub fn render_bytes(&self, template: &[u8], record: &FieldRecord) -> Result<(Vec<u8>, RenderReport)> {
        let mut deck = SlideDeck::from_bytes(template)?;
        let report = self.render_deck(&mut deck, record)?;
        Ok((deck.to_bytes()?, report))
    }

    /// Render in place
    pub fn render_deck(&self, deck: &mut SlideDeck, record: &FieldRecord) -> Result<RenderReport> {
        let mut report = RenderReport::new();

        for slide in deck.slides_mut() {
            merge_split_tokens_in(&mut slide.xml.root);
        }

        self.place_media(deck, record, &mut report)?;

        for &number in &self.media.hidden {
            if deck.slide_mut(number)?.hide() {
                debug!(slide = number, "hid slide");
                report.push(RenderEvent::SlideHidden { slide: number });
            }
        }

        for (field, value) in record.iter() {
            let FieldValue::Text(text) = value else {
                continue;
            };
            match self.plan.strategy_for(field) {
                Strategy::Text => {
                    let count = replace_everywhere(deck, &token(field), text);
                    if count > 0 {
                        debug!(field, count, "replaced");
                        report.push(RenderEvent::Replaced {
                            field: field.to_string(),
                            count,
                        });
                    }
                }
                _ => self.expand_field(deck, field, text, &mut report),
            }
        }

        if let Some(format) = &self.plan.footer {
            let footer = interpolate(format, record);
            let count = replace_everywhere(deck, &token(FOOTER_TOKEN), &footer);
            if count > 0 {
                report.push(RenderEvent::Replaced {
                    field: FOOTER_TOKEN.to_string(),
                    count,
                });
            }
        }

        let mut unresolved: Vec<String> = Vec::new();
        for slide in deck.slides() {
            for name in remaining_placeholders(&slide.xml.root) {
                if !unresolved.contains(&name) {
                    unresolved.push(name);
                }
            }
        }
        for placeholder in unresolved {
            report.push(RenderEvent::Unresolved { placeholder });
        }

        Ok(report)
    }

    fn place_media(&self, deck: &mut SlideDeck, record: &FieldRecord, report: &mut RenderReport) -> Result<()> {
        for slot in &self.media.videos {
            match place_video(deck, slot, record, &self.media.geometry)? {
                MediaOutcome::Linked { .. } => {}
                MediaOutcome::Fallback { reason, hidden } => {
                    report.push(RenderEvent::MediaFallback {
                        slide: slot.slide,
                        field: slot.url_field.clone(),
                        reason,
                    });
                    if hidden {
                        report.push(RenderEvent::SlideHidden { slide: slot.slide });
                    }
                }
            }
        }
        Ok(())
    }

    /// Both list strategies render as bullet lines on slides
    fn expand_field(&self, deck: &mut SlideDeck, field: &str, raw: &str, report: &mut RenderReport) {
        let list = split_items(raw, self.plan.empty_items);
        for position in &list.empty_positions {
            debug!(field, position, "empty list item");
            report.push(RenderEvent::EmptyListItem {
                field: field.to_string(),
                position: *position,
            });
        }

        let tok = token(field);
        let mut found = false;
        for slide in deck.slides_mut() {
            if expand_bullet_lines(&mut slide.xml.root, &tok, &list.items) > 0 {
                found = true;
                debug!(field, slide = slide.number, items = list.items.len(), "expanded bullet lines");
                report.push(RenderEvent::Expanded {
                    field: field.to_string(),
                    items: list.items.len(),
                    anchor: TemplateAnchor::Slide {
                        slide: slide.number,
                    },
                });
            }
        }
        if !found {
            report.push(RenderEvent::AnchorNotFound {
                field: field.to_string(),
            });
        }
    }
}

fn replace_everywhere(deck: &mut SlideDeck, tok: &str, value: &str) -> usize {
    deck.slides_mut()
        .iter_mut()
        .map(|slide| replace_in(&mut slide.xml.root, tok, value))
        .sum()
}
