//! Bullet lines on slides
//!
//! Slide text boxes have no numbering part to hang a list on, so a list
//! field is written as one paragraph per item, each starting with a bullet
//! glyph. The paragraph holding the token keeps its position and takes the
//! first item; the others follow it with the same paragraph and run
//! properties.

use lessondok_ooxml::substitute::{paragraph_text, replace_in_paragraph, set_run_text};
use lessondok_ooxml::XmlElement;

/// Glyph prefixed to every list line
pub const BULLET_GLYPH: &str = "\u{2022}";

/// One list line
pub fn bullet_line(item: &str) -> String {
    format!("{} {}", BULLET_GLYPH, item)
}

/// Expand every paragraph below `root` that holds `tok`.
///
/// Returns the number of paragraphs expanded. With no items the token is
/// removed and nothing is inserted.
pub fn expand_bullet_lines(root: &mut XmlElement, tok: &str, items: &[String]) -> usize {
    let mut expanded = 0;

    let anchors: Vec<usize> = root
        .positions_of("p")
        .into_iter()
        .filter(|&i| {
            root.element_at(i)
                .is_some_and(|p| paragraph_text(p).contains(tok))
        })
        .collect();

    // back to front so earlier positions stay valid
    for &pos in anchors.iter().rev() {
        let Some(p) = root.element_at_mut(pos) else {
            continue;
        };
        let lines = split_paragraph(p, tok, items);
        for (offset, line) in lines.into_iter().enumerate() {
            root.insert_element(pos + 1 + offset, line);
        }
        expanded += 1;
    }

    for child in root.elements_mut() {
        if !child.is("p") {
            expanded += expand_bullet_lines(child, tok, items);
        }
    }
    expanded
}

/// Put the first item in place of the token and build paragraphs for the rest
fn split_paragraph(p: &mut XmlElement, tok: &str, items: &[String]) -> Vec<XmlElement> {
    let run = p
        .elements()
        .find(|r| r.is("r") && r.child("t").is_some_and(|t| t.text().contains(tok)))
        .or_else(|| p.child("r"))
        .cloned();

    let first = items.first().map(|i| bullet_line(i)).unwrap_or_default();
    replace_in_paragraph(p, tok, &first);

    let Some(run) = run else {
        return Vec::new();
    };
    let props = p.child("pPr").cloned();
    let end_props = p.child("endParaRPr").cloned();

    items
        .iter()
        .skip(1)
        .map(|item| {
            let mut line = XmlElement::new(p.name.clone());
            line.attributes = p.attributes.clone();
            if let Some(props) = &props {
                line.push_element(props.clone());
            }

            let mut r = run.clone();
            r.retain_elements(|e| e.is("rPr") || e.is("t"));
            if let Some(t) = r.child_mut("t") {
                set_run_text(t, &bullet_line(item));
            }
            line.push_element(r);

            if let Some(end) = &end_props {
                line.push_element(end.clone());
            }
            line
        })
        .collect()
}
