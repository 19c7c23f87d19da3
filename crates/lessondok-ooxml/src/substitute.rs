//! Literal token replacement inside paragraphs
//!
//! These helpers work on any paragraph whose text lives in `*:t` elements,
//! so WordprocessingML (`w:p`/`w:t`) and DrawingML (`a:p`/`a:t`) share them.

use lessondok_core::{placeholders_in, token};
use tracing::trace;

use crate::xml::XmlElement;

/// Text of a paragraph: its `t` elements concatenated, nested paragraphs excluded
pub fn paragraph_text(p: &XmlElement) -> String {
    let mut out = String::new();
    collect_text(p, &mut out);
    out
}

fn collect_text(el: &XmlElement, out: &mut String) {
    for child in el.elements() {
        if child.is("t") {
            out.push_str(&child.text());
        } else if !child.is("p") {
            collect_text(child, out);
        }
    }
}

/// The `t` elements of a paragraph, in order, nested paragraphs excluded
pub fn text_elements_mut(p: &mut XmlElement) -> Vec<&mut XmlElement> {
    let mut out = Vec::new();
    collect_text_mut(p, &mut out);
    out
}

fn collect_text_mut<'a>(el: &'a mut XmlElement, out: &mut Vec<&'a mut XmlElement>) {
    for child in el.elements_mut() {
        if child.is("t") {
            out.push(child);
        } else if !child.is("p") {
            collect_text_mut(child, out);
        }
    }
}

/// Call `f` on every paragraph below `root`, including paragraphs in tables
/// and text boxes
pub fn for_each_paragraph_mut(root: &mut XmlElement, f: &mut dyn FnMut(&mut XmlElement)) {
    for child in root.elements_mut() {
        if child.is("p") {
            f(&mut *child);
        }
        for_each_paragraph_mut(child, f);
    }
}

/// Set the text of a `t` element.
///
/// WordprocessingML collapses leading and trailing spaces unless the run
/// asks for them to be kept.
pub fn set_run_text(t: &mut XmlElement, text: &str) {
    t.set_text(text);
    let padded = text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace);
    if padded && t.prefix() == Some("w") {
        t.set_attr("xml:space", "preserve");
    }
}

/// Merge a paragraph's text into its first run when a placeholder is split
/// across runs.
///
/// Editors split `{{name}}` into several runs when formatting or spell
/// checking touches part of it. Returns true when the paragraph was merged.
pub fn merge_split_tokens(p: &mut XmlElement) -> bool {
    let full = paragraph_text(p);
    let names = placeholders_in(&full);
    if names.is_empty() {
        return false;
    }

    let mut texts = text_elements_mut(p);
    let split = names.iter().any(|name| {
        let tok = token(name);
        let whole: usize = texts.iter().map(|t| t.text().matches(&tok).count()).sum();
        whole < full.matches(&tok).count()
    });
    if !split {
        return false;
    }

    trace!(text = %full, "merging split placeholder runs");
    let mut iter = texts.iter_mut();
    if let Some(first) = iter.next() {
        set_run_text(first, &full);
    }
    for rest in iter {
        set_run_text(rest, "");
    }
    true
}

/// Merge split placeholders in every paragraph of a part; returns the number
/// of paragraphs merged
pub fn merge_split_tokens_in(root: &mut XmlElement) -> usize {
    let mut merged = 0;
    for_each_paragraph_mut(root, &mut |p| {
        if merge_split_tokens(p) {
            merged += 1;
        }
    });
    merged
}

/// Replace every occurrence of `token` in one paragraph; returns the count
pub fn replace_in_paragraph(p: &mut XmlElement, token: &str, value: &str) -> usize {
    let mut count = 0;
    for t in text_elements_mut(p) {
        let text = t.text();
        let n = text.matches(token).count();
        if n > 0 {
            set_run_text(t, &text.replace(token, value));
            count += n;
        }
    }
    count
}

/// Replace every occurrence of `token` below `root`; returns the count
pub fn replace_in(root: &mut XmlElement, token: &str, value: &str) -> usize {
    let mut count = 0;
    for_each_paragraph_mut(root, &mut |p| {
        count += replace_in_paragraph(p, token, value);
    });
    count
}

/// Placeholder names still present below `root`, in order of first appearance
pub fn remaining_placeholders(root: &XmlElement) -> Vec<String> {
    let mut paragraphs = Vec::new();
    root.find_all("p", &mut paragraphs);

    let mut names: Vec<String> = Vec::new();
    for p in paragraphs {
        for name in placeholders_in(&paragraph_text(p)) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;

    fn paragraph(xml: &str) -> XmlElement {
        let wrapped = format!(
            r#"<w:p xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">{}</w:p>"#,
            xml
        );
        XmlDocument::parse(wrapped.as_bytes(), "test").unwrap().root
    }

    #[test]
    fn test_replace_all_occurrences() {
        let mut p = paragraph(r#"<w:r><w:t>{{unit}} and {{unit}}</w:t></w:r><w:r><w:t>{{unit}}</w:t></w:r>"#);
        assert_eq!(replace_in_paragraph(&mut p, "{{unit}}", "3"), 3);
        assert_eq!(paragraph_text(&p), "3 and 33");
    }

    #[test]
    fn test_replace_is_case_sensitive() {
        let mut p = paragraph(r#"<w:r><w:t>{{Unit}}</w:t></w:r>"#);
        assert_eq!(replace_in_paragraph(&mut p, "{{unit}}", "3"), 0);
        assert_eq!(paragraph_text(&p), "{{Unit}}");
    }

    #[test]
    fn test_merge_split_token() {
        let mut p = paragraph(
            r#"<w:r><w:rPr><w:b/></w:rPr><w:t>Topic: {{main</w:t></w:r><w:r><w:t>Topic}}</w:t></w:r>"#,
        );
        assert!(merge_split_tokens(&mut p));
        assert_eq!(replace_in_paragraph(&mut p, "{{mainTopic}}", "Loops"), 1);
        assert_eq!(paragraph_text(&p), "Topic: Loops");

        let first_run = p.child("r").unwrap();
        assert!(first_run.child("rPr").is_some());
    }

    #[test]
    fn test_no_merge_when_tokens_are_whole() {
        let mut p = paragraph(r#"<w:r><w:t>{{a}}</w:t></w:r><w:r><w:t> {{b}}</w:t></w:r>"#);
        assert!(!merge_split_tokens(&mut p));
        assert_eq!(p.elements().count(), 2);
    }

    #[test]
    fn test_leading_space_is_preserved() {
        let mut p = paragraph(r#"<w:r><w:t>{{x}}</w:t></w:r>"#);
        replace_in_paragraph(&mut p, "{{x}}", " padded");
        let t = p.find("t").unwrap();
        assert_eq!(t.attr("xml:space"), Some("preserve"));
    }

    #[test]
    fn test_remaining_placeholders() {
        let doc = XmlDocument::parse(
            br#"<w:body xmlns:w="w"><w:p><w:r><w:t>{{left}} {{other}}</w:t></w:r></w:p><w:p><w:r><w:t>{{left}}</w:t></w:r></w:p></w:body>"#,
            "test",
        )
        .unwrap();
        assert_eq!(remaining_placeholders(&doc.root), vec!["left", "other"]);
    }
}
