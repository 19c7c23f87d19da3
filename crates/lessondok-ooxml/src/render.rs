//! Document rendering
//!
//! Fills a `.docx` template from a [`FieldRecord`] according to a
//! [`SubstitutionPlan`]:
//!
//! 1. placeholders split across runs are merged back together;
//! 2. text fields replace their `{{field}}` tokens in body, headers and footers;
//! 3. list fields are normalised and expanded at their anchor;
//! 4. the `{{footer}}` composite fills footer parts and `{{title}}` fills
//!    header parts;
//! 5. tokens still present are reported as unresolved.
//!
//! The template file is only read; output goes to a new file.

use std::path::Path;

use lessondok_core::{
    interpolate, split_items, token, FieldRecord, FieldValue, RenderEvent, RenderReport,
    Strategy, SubstitutionPlan, FOOTER_TOKEN, TITLE_TOKEN,
};
use tracing::debug;

use crate::document::{PartKind, WordDocument};
use crate::error::Result;
use crate::expand::expand_list;
use crate::substitute::{merge_split_tokens_in, remaining_placeholders, replace_in};

/// Renders `.docx` templates
#[derive(Debug, Clone)]
pub struct DocxRenderer<'a> {
    plan: &'a SubstitutionPlan,
    title: Option<String>,
}

impl<'a> DocxRenderer<'a> {
    /// Create a renderer for a plan
    pub fn new(plan: &'a SubstitutionPlan) -> Self {
        Self { plan, title: None }
    }

    /// Set the value of the `{{title}}` header composite (the document name)
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Render a template file into `output`
    pub fn render_file(&self, template: &Path, output: &Path, record: &FieldRecord) -> Result<RenderReport> {
        let mut doc = WordDocument::open(template)?;
        let report = self.render_document(&mut doc, record)?;
        doc.save(output)?;
        Ok(report)
    }

    /// Render template bytes into new package bytes
    pub fn render_bytes(&self, template: &[u8], record: &FieldRecord) -> Result<(Vec<u8>, RenderReport)> {
        let mut doc = WordDocument::from_bytes(template)?;
        let report = self.render_document(&mut doc, record)?;
        Ok((doc.to_bytes()?, report))
    }

    /// Render in place
    pub fn render_document(&self, doc: &mut WordDocument, record: &FieldRecord) -> Result<RenderReport> {
        let mut report = RenderReport::new();

        for (_, root) in doc.parts_mut() {
            merge_split_tokens_in(root);
        }

        for (field, value) in record.iter() {
            let FieldValue::Text(text) = value else {
                continue;
            };
            match self.plan.strategy_for(field) {
                Strategy::Text => {
                    let count = replace_text_field(doc, field, text);
                    if count > 0 {
                        debug!(field, count, "replaced");
                        report.push(RenderEvent::Replaced {
                            field: field.to_string(),
                            count,
                        });
                    }
                }
                strategy => self.expand_field(doc, field, text, strategy, &mut report)?,
            }
        }

        if let Some(format) = &self.plan.footer {
            let footer = interpolate(format, record);
            let count = replace_in_parts(doc, PartKind::Footer, &token(FOOTER_TOKEN), &footer);
            push_composite(&mut report, FOOTER_TOKEN, count);
        }
        if let Some(title) = &self.title {
            let count = replace_in_parts(doc, PartKind::Header, &token(TITLE_TOKEN), title);
            push_composite(&mut report, TITLE_TOKEN, count);
        }

        let mut unresolved: Vec<String> = Vec::new();
        for (_, root) in doc.parts() {
            for name in remaining_placeholders(root) {
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

    fn expand_field(
        &self,
        doc: &mut WordDocument,
        field: &str,
        raw: &str,
        strategy: Strategy,
        report: &mut RenderReport,
    ) -> Result<()> {
        let list = split_items(raw, self.plan.empty_items);
        for position in &list.empty_positions {
            debug!(field, position, "empty list item");
            report.push(RenderEvent::EmptyListItem {
                field: field.to_string(),
                position: *position,
            });
        }

        let outcome = expand_list(doc, field, &list.items, strategy)?;
        match outcome.anchor {
            Some(anchor) => report.push(RenderEvent::Expanded {
                field: field.to_string(),
                items: outcome.items,
                anchor,
            }),
            None => report.push(RenderEvent::AnchorNotFound {
                field: field.to_string(),
            }),
        }
        Ok(())
    }
}

/// Replace a text field everywhere, except in the part kind whose composite
/// shares its name (`title` in headers, `footer` in footers)
fn replace_text_field(doc: &mut WordDocument, field: &str, value: &str) -> usize {
    let tok = token(field);
    let mut count = 0;
    for (kind, root) in doc.parts_mut() {
        let composite = match kind {
            PartKind::Header => field == TITLE_TOKEN,
            PartKind::Footer => field == FOOTER_TOKEN,
            PartKind::Body => false,
        };
        if !composite {
            count += replace_in(root, &tok, value);
        }
    }
    count
}

fn replace_in_parts(doc: &mut WordDocument, kind: PartKind, tok: &str, value: &str) -> usize {
    doc.parts_mut()
        .filter(|(k, _)| *k == kind)
        .map(|(_, root)| replace_in(root, tok, value))
        .sum()
}

fn push_composite(report: &mut RenderReport, name: &str, count: usize) {
    if count > 0 {
        debug!(composite = name, count, "replaced composite");
        report.push(RenderEvent::Replaced {
            field: name.to_string(),
            count,
        });
    }
}
