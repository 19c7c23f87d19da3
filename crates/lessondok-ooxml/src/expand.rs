//! List and table expansion
//!
//! A list field's token marks an anchor. For [`Strategy::TableRows`] the
//! anchor is the first table cell containing the token; the anchor cell takes
//! the first item and one new row per further item is inserted below it. For
//! [`Strategy::BulletList`] the anchor is the first body paragraph containing
//! the token; its run takes the first item and one bulleted paragraph per
//! further item follows it.
//!
//! Only the first anchor is expanded. Later occurrences of the same token
//! stay literal.

use lessondok_core::{token, Strategy, TemplateAnchor};
use tracing::debug;

use crate::document::WordDocument;
use crate::error::Result;
use crate::numbering::ensure_bullet_numbering;
use crate::substitute::{merge_split_tokens_in, paragraph_text, set_run_text, text_elements_mut};
use crate::xml::{XmlElement, XmlNode};

/// Result of expanding one list field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandOutcome {
    /// Where the list landed; `None` when no anchor was found
    pub anchor: Option<TemplateAnchor>,
    /// Number of items written
    pub items: usize,
}

impl ExpandOutcome {
    fn not_found() -> Self {
        Self {
            anchor: None,
            items: 0,
        }
    }
}

/// Expand `items` at the first anchor of `{{field}}`.
///
/// A missing anchor leaves the document untouched.
pub fn expand_list(
    doc: &mut WordDocument,
    field: &str,
    items: &[String],
    strategy: Strategy,
) -> Result<ExpandOutcome> {
    let tok = token(field);
    merge_split_tokens_in(doc.body_mut()?);

    match strategy {
        Strategy::TableRows => {
            let body = doc.body_mut()?;
            Ok(match find_table_anchor(body, &tok) {
                Some(anchor) => {
                    expand_rows(body, anchor, items);
                    debug!(field, items = items.len(), %anchor, "expanded table rows");
                    ExpandOutcome {
                        anchor: Some(anchor),
                        items: items.len(),
                    }
                }
                None => ExpandOutcome::not_found(),
            })
        }
        Strategy::BulletList => {
            let Some(anchor) = find_paragraph_anchor(doc.body()?, &tok) else {
                return Ok(ExpandOutcome::not_found());
            };
            let num_id = if items.len() > 1 {
                Some(ensure_bullet_numbering(doc.archive_mut())?)
            } else {
                None
            };
            expand_bullets(doc.body_mut()?, anchor, &tok, items, num_id.as_deref());
            debug!(field, items = items.len(), %anchor, "expanded bullet list");
            Ok(ExpandOutcome {
                anchor: Some(anchor),
                items: items.len(),
            })
        }
        Strategy::Text => Ok(ExpandOutcome::not_found()),
    }
}

/// First table cell (document order, rows top to bottom, cells left to right)
/// whose text contains `tok`
pub fn find_table_anchor(body: &XmlElement, tok: &str) -> Option<TemplateAnchor> {
    for (block, table) in body.elements().enumerate() {
        if !table.is("tbl") {
            continue;
        }
        for (row, tr) in table.elements().filter(|e| e.is("tr")).enumerate() {
            for (cell, tc) in tr.elements().filter(|e| e.is("tc")).enumerate() {
                if cell_text(tc).contains(tok) {
                    return Some(TemplateAnchor::Cell {
                        table: block,
                        row,
                        cell,
                    });
                }
            }
        }
    }
    None
}

/// First body paragraph whose text contains `tok`
pub fn find_paragraph_anchor(body: &XmlElement, tok: &str) -> Option<TemplateAnchor> {
    body.elements()
        .enumerate()
        .find(|(_, el)| el.is("p") && paragraph_text(el).contains(tok))
        .map(|(index, _)| TemplateAnchor::Block { index })
}

fn cell_text(tc: &XmlElement) -> String {
    tc.elements()
        .filter(|e| e.is("p"))
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n")
}

fn expand_rows(body: &mut XmlElement, anchor: TemplateAnchor, items: &[String]) {
    let TemplateAnchor::Cell { table, row, cell } = anchor else {
        return;
    };
    let Some(tbl) = body
        .element_index(table)
        .and_then(|i| body.element_at_mut(i))
    else {
        return;
    };
    let Some(&row_pos) = tbl.positions_of("tr").get(row) else {
        return;
    };
    let Some(anchor_row) = tbl.element_at_mut(row_pos) else {
        return;
    };

    let template_row = anchor_row.clone();
    if let Some(tc) = nth_cell_mut(anchor_row, cell) {
        set_cell_text(tc, items.first().map_or("", String::as_str));
    }

    let mut insert_at = row_pos;
    for item in items.iter().skip(1) {
        let mut new_row = template_row.clone();
        for (c, tc) in new_row.elements_mut().filter(|e| e.is("tc")).enumerate() {
            if c == cell {
                set_cell_text(tc, item);
            } else {
                set_cell_text(tc, "");
            }
        }
        insert_at += 1;
        tbl.insert_element(insert_at, new_row);
    }
}

fn nth_cell_mut(tr: &mut XmlElement, n: usize) -> Option<&mut XmlElement> {
    tr.elements_mut().filter(|e| e.is("tc")).nth(n)
}

/// Replace a cell's content with one paragraph holding `text`.
///
/// Cell properties, the first paragraph's properties and the first run's
/// properties are kept; an empty `text` leaves the paragraph without runs.
fn set_cell_text(tc: &mut XmlElement, text: &str) {
    let mut first_p = true;
    tc.retain_elements(|e| {
        if e.is("p") {
            let keep = first_p;
            first_p = false;
            keep
        } else {
            true
        }
    });

    if tc.child("p").is_none() {
        let p = XmlElement::new(qualified(tc, "p"));
        tc.push_element(p);
    }
    let Some(p) = tc.child_mut("p") else {
        return;
    };

    let run_props = p
        .elements()
        .find(|e| e.is("r"))
        .and_then(|r| r.child("rPr"))
        .cloned();
    p.retain_elements(|e| e.is("pPr"));

    if !text.is_empty() {
        let run = text_run(p, run_props, text);
        p.push_element(run);
    }
}

fn expand_bullets(
    body: &mut XmlElement,
    anchor: TemplateAnchor,
    tok: &str,
    items: &[String],
    num_id: Option<&str>,
) {
    let TemplateAnchor::Block { index } = anchor else {
        return;
    };
    let Some(pos) = body.element_index(index) else {
        return;
    };
    let Some(p) = body.element_at_mut(pos) else {
        return;
    };

    let run_props = replace_token_run(p, tok, items.first().map_or("", String::as_str));
    let template = p.clone();

    let Some(num_id) = num_id else {
        return;
    };
    let mut insert_at = pos;
    for item in items.iter().skip(1) {
        insert_at += 1;
        body.insert_element(insert_at, bullet_paragraph(&template, run_props.clone(), num_id, item));
    }
}

/// Set the text of the `t` holding `tok` to `text`; returns the holding run's
/// properties
fn replace_token_run(p: &mut XmlElement, tok: &str, text: &str) -> Option<XmlElement> {
    for run in p.elements_mut().filter(|e| e.is("r")) {
        let holds = run
            .elements()
            .any(|e| e.is("t") && e.text().contains(tok));
        if holds {
            let props = run.child("rPr").cloned();
            if let Some(t) = run.elements_mut().find(|e| e.is("t") && e.text().contains(tok)) {
                set_run_text(t, text);
            }
            return props;
        }
    }

    // token inside a hyperlink or field: fall back to any text element
    for t in text_elements_mut(p) {
        if t.text().contains(tok) {
            set_run_text(t, text);
            break;
        }
    }
    None
}

fn bullet_paragraph(
    template: &XmlElement,
    run_props: Option<XmlElement>,
    num_id: &str,
    text: &str,
) -> XmlElement {
    let mut p = XmlElement::new(template.name.clone());
    p.attributes = template
        .attributes
        .iter()
        .filter(|(k, _)| !k.starts_with("w14:"))
        .cloned()
        .collect();

    let mut props = template
        .child("pPr")
        .cloned()
        .unwrap_or_else(|| XmlElement::new(qualified(template, "pPr")));
    props.remove_children("numPr");
    props.remove_children("sectPr");
    props.remove_children("pPrChange");

    let num_pr = XmlElement::new(qualified(template, "numPr"))
        .with_child(XmlElement::new(qualified(template, "ilvl")).with_attr(qualified(template, "val"), "0"))
        .with_child(XmlElement::new(qualified(template, "numId")).with_attr(qualified(template, "val"), num_id));

    // numPr follows pStyle, keepNext, keepLines, pageBreakBefore, framePr, widowControl
    const BEFORE_NUM_PR: [&str; 6] = [
        "pStyle",
        "keepNext",
        "keepLines",
        "pageBreakBefore",
        "framePr",
        "widowControl",
    ];
    let at = props
        .children
        .iter()
        .enumerate()
        .filter(|(_, n)| matches!(n, XmlNode::Element(e) if BEFORE_NUM_PR.contains(&e.local_name())))
        .map(|(i, _)| i + 1)
        .last()
        .unwrap_or(0);
    props.insert_element(at, num_pr);

    p.push_element(props);
    let run = text_run(template, run_props, text);
    p.push_element(run);
    p
}

fn text_run(context: &XmlElement, run_props: Option<XmlElement>, text: &str) -> XmlElement {
    let mut run = XmlElement::new(qualified(context, "r"));
    if let Some(props) = run_props {
        run.push_element(props);
    }
    let mut t = XmlElement::new(qualified(context, "t"));
    set_run_text(&mut t, text);
    run.push_element(t);
    run
}

/// Name `local` with the same prefix as `context`
fn qualified(context: &XmlElement, local: &str) -> String {
    match context.prefix() {
        Some(prefix) => format!("{}:{}", prefix, local),
        None => local.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{PartKind, DOCUMENT_PATH};
    use crate::test_utils::{checklist_table, DocxFixture};

    fn items(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn rows(doc: &WordDocument) -> Vec<Vec<String>> {
        let body = doc.body().unwrap();
        let table = body.child("tbl").unwrap();
        table
            .elements()
            .filter(|e| e.is("tr"))
            .map(|tr| tr.elements().filter(|e| e.is("tc")).map(cell_text).collect())
            .collect()
    }

    #[test]
    fn test_three_items_add_two_rows() {
        let bytes = DocxFixture::new(&checklist_table("{{completionChecklist}}")).build();
        let mut doc = WordDocument::from_bytes(&bytes).unwrap();

        let outcome = expand_list(
            &mut doc,
            "completionChecklist",
            &items(&["a.", "b.", "c."]),
            Strategy::TableRows,
        )
        .unwrap();

        assert_eq!(
            outcome.anchor,
            Some(TemplateAnchor::Cell {
                table: 1,
                row: 1,
                cell: 1
            })
        );
        let rows = rows(&doc);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[1], vec!["", "a."]);
        assert_eq!(rows[2], vec!["", "b."]);
        assert_eq!(rows[3], vec!["", "c."]);
        assert_eq!(rows[4], vec!["Total", "end"]);
    }

    #[test]
    fn test_inserted_rows_keep_left_cell_properties() {
        let bytes = DocxFixture::new(&checklist_table("{{completionChecklist}}")).build();
        let mut doc = WordDocument::from_bytes(&bytes).unwrap();
        expand_list(&mut doc, "completionChecklist", &items(&["a.", "b."]), Strategy::TableRows).unwrap();

        let table = doc.body().unwrap().child("tbl").unwrap();
        let left_cells: Vec<_> = table
            .elements()
            .filter(|e| e.is("tr"))
            .skip(1)
            .take(2)
            .map(|tr| tr.child("tc").unwrap().child("tcPr").unwrap().clone())
            .collect();
        assert_eq!(left_cells[0], left_cells[1]);
        assert!(left_cells[0].find("shd").is_some());
    }

    #[test]
    fn test_single_item_keeps_row_count() {
        let bytes = DocxFixture::new(&checklist_table("{{completionChecklist}}")).build();
        let mut doc = WordDocument::from_bytes(&bytes).unwrap();
        expand_list(&mut doc, "completionChecklist", &items(&["only."]), Strategy::TableRows).unwrap();

        let rows = rows(&doc);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][1], "only.");
    }

    #[test]
    fn test_first_anchor_wins() {
        let body = format!(
            "{}{}",
            checklist_table("{{steps}}"),
            checklist_table("{{steps}}")
        );
        let bytes = DocxFixture::new(&body).build();
        let mut doc = WordDocument::from_bytes(&bytes).unwrap();
        let outcome = expand_list(&mut doc, "steps", &items(&["x.", "y."]), Strategy::TableRows).unwrap();

        assert_eq!(
            outcome.anchor,
            Some(TemplateAnchor::Cell {
                table: 1,
                row: 1,
                cell: 1
            })
        );
        let text = doc.body_paragraphs().join("|");
        assert_eq!(text.matches("{{steps}}").count(), 1);
    }

    #[test]
    fn test_missing_anchor_is_noop() {
        let bytes = DocxFixture::new(r#"<w:p><w:r><w:t>Nothing here</w:t></w:r></w:p>"#).build();
        let mut doc = WordDocument::from_bytes(&bytes).unwrap();
        let before = doc.clone().into_archive().get_string(DOCUMENT_PATH);

        let outcome = expand_list(&mut doc, "steps", &items(&["a."]), Strategy::TableRows).unwrap();
        assert_eq!(outcome, ExpandOutcome::not_found());
        assert_eq!(doc.into_archive().get_string(DOCUMENT_PATH), before);
    }

    #[test]
    fn test_bullets_follow_anchor_paragraph() {
        let bytes = DocxFixture::new(
            r#"<w:p><w:r><w:t>Key terms</w:t></w:r></w:p><w:p><w:pPr><w:jc w:val="left"/></w:pPr><w:r><w:rPr><w:i/></w:rPr><w:t>{{keyTermsAndDefinitions}}</w:t></w:r></w:p><w:p><w:r><w:t>After</w:t></w:r></w:p>"#,
        )
        .build();
        let mut doc = WordDocument::from_bytes(&bytes).unwrap();

        let outcome = expand_list(
            &mut doc,
            "keyTermsAndDefinitions",
            &items(&["Loop: repeats.", "Index: position."]),
            Strategy::BulletList,
        )
        .unwrap();
        assert_eq!(outcome.anchor, Some(TemplateAnchor::Block { index: 1 }));
        assert_eq!(
            doc.body_paragraphs(),
            vec!["Key terms", "Loop: repeats.", "Index: position.", "After"]
        );

        let body = doc.body().unwrap();
        let bullet = body.elements().nth(2).unwrap();
        let num_pr = bullet.child("pPr").unwrap().child("numPr").unwrap();
        assert_eq!(num_pr.child("numId").unwrap().attr("w:val"), Some("1"));
        assert!(bullet.child("r").unwrap().child("rPr").unwrap().child("i").is_some());
        assert!(doc.archive().contains(crate::numbering::NUMBERING_PATH));
        assert!(doc.part_paragraphs(PartKind::Header).is_empty());
    }

    #[test]
    fn test_single_bullet_item_needs_no_numbering() {
        let bytes = DocxFixture::new(r#"<w:p><w:r><w:t>{{keyTerms}}</w:t></w:r></w:p>"#).build();
        let mut doc = WordDocument::from_bytes(&bytes).unwrap();
        expand_list(&mut doc, "keyTerms", &items(&["Only."]), Strategy::BulletList).unwrap();

        assert_eq!(doc.body_paragraphs(), vec!["Only."]);
        assert!(!doc.archive().contains(crate::numbering::NUMBERING_PATH));
    }
}
