//! Bullet numbering definitions
//!
//! Bulleted paragraphs reference a `w:num` in `word/numbering.xml`. Templates
//! usually carry one already; when they do not, a single-level bullet
//! definition is added along with its relationship and content type.

use tracing::debug;

use crate::archive::OoxmlArchive;
use crate::content_types::{ensure_override, NUMBERING_CONTENT_TYPE};
use crate::document::DOCUMENT_PATH;
use crate::error::Result;
use crate::relationships::{rels_path_for, Relationships};
use crate::xml::{XmlDocument, XmlElement};

/// Numbering part path
pub const NUMBERING_PATH: &str = "word/numbering.xml";

/// WordprocessingML main namespace
pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Glyph used for generated bullet levels
pub const BULLET_GLYPH: &str = "\u{2022}";

/// Return the `w:numId` of a bullet list, creating one if needed
pub fn ensure_bullet_numbering(archive: &mut OoxmlArchive) -> Result<String> {
    match archive.get(NUMBERING_PATH) {
        Some(bytes) => {
            let mut numbering = XmlDocument::parse(bytes, NUMBERING_PATH)?;
            if let Some(num_id) = find_bullet_num(&numbering.root) {
                debug!(num_id = %num_id, "using template bullet numbering");
                return Ok(num_id);
            }
            let num_id = add_bullet_definition(&mut numbering.root);
            archive.set_string(NUMBERING_PATH, numbering.to_xml());
            debug!(num_id = %num_id, "added bullet numbering definition");
            Ok(num_id)
        }
        None => {
            let mut root = XmlElement::new("w:numbering").with_attr("xmlns:w", W_NS);
            let num_id = add_bullet_definition(&mut root);
            archive.set_string(NUMBERING_PATH, XmlDocument::new(root).to_xml());
            link_numbering_part(archive)?;
            debug!(num_id = %num_id, "created numbering part");
            Ok(num_id)
        }
    }
}

/// Find a `w:num` whose abstract definition has a bullet at level 0
fn find_bullet_num(root: &XmlElement) -> Option<String> {
    let bullet_abstracts: Vec<&str> = root
        .elements()
        .filter(|e| e.is("abstractNum"))
        .filter(|abs| {
            abs.elements()
                .filter(|lvl| lvl.is("lvl") && lvl.attr("w:ilvl") == Some("0"))
                .any(|lvl| {
                    lvl.child("numFmt")
                        .and_then(|f| f.attr("w:val"))
                        == Some("bullet")
                })
        })
        .filter_map(|abs| abs.attr("w:abstractNumId"))
        .collect();

    root.elements()
        .filter(|e| e.is("num"))
        .find(|num| {
            num.child("abstractNumId")
                .and_then(|a| a.attr("w:val"))
                .is_some_and(|id| bullet_abstracts.contains(&id))
        })
        .and_then(|num| num.attr("w:numId"))
        .map(str::to_string)
}

fn max_id(root: &XmlElement, local: &str, attr: &str) -> Option<u32> {
    root.elements()
        .filter(|e| e.is(local))
        .filter_map(|e| e.attr(attr).and_then(|v| v.parse().ok()))
        .max()
}

/// Append an abstract bullet definition and a `w:num` pointing at it
fn add_bullet_definition(root: &mut XmlElement) -> String {
    let abstract_id = max_id(root, "abstractNum", "w:abstractNumId").map_or(0, |n| n + 1);
    let num_id = max_id(root, "num", "w:numId").map_or(1, |n| n + 1);

    let level = XmlElement::new("w:lvl")
        .with_attr("w:ilvl", "0")
        .with_child(XmlElement::new("w:start").with_attr("w:val", "1"))
        .with_child(XmlElement::new("w:numFmt").with_attr("w:val", "bullet"))
        .with_child(XmlElement::new("w:lvlText").with_attr("w:val", BULLET_GLYPH))
        .with_child(XmlElement::new("w:lvlJc").with_attr("w:val", "left"))
        .with_child(
            XmlElement::new("w:pPr").with_child(
                XmlElement::new("w:ind")
                    .with_attr("w:left", "720")
                    .with_attr("w:hanging", "360"),
            ),
        );
    let abstract_num = XmlElement::new("w:abstractNum")
        .with_attr("w:abstractNumId", abstract_id.to_string())
        .with_child(XmlElement::new("w:multiLevelType").with_attr("w:val", "hybridMultilevel"))
        .with_child(level);
    let num = XmlElement::new("w:num")
        .with_attr("w:numId", num_id.to_string())
        .with_child(XmlElement::new("w:abstractNumId").with_attr("w:val", abstract_id.to_string()));

    // abstractNum elements precede every num element
    let abstract_at = match root.positions_of("abstractNum").last() {
        Some(&last) => last + 1,
        None => root
            .positions_of("num")
            .first()
            .copied()
            .unwrap_or(root.children.len()),
    };
    root.insert_element(abstract_at, abstract_num);

    let num_at = match root.positions_of("num").last() {
        Some(&last) => last + 1,
        None => abstract_at + 1,
    };
    root.insert_element(num_at, num);

    num_id.to_string()
}

/// Register the numbering part with the main document
fn link_numbering_part(archive: &mut OoxmlArchive) -> Result<()> {
    let rels_path = rels_path_for(DOCUMENT_PATH);
    let mut rels = match archive.get(&rels_path) {
        Some(bytes) => Relationships::parse(bytes)?,
        None => Relationships::new(),
    };
    if rels.find_by_type(Relationships::TYPE_NUMBERING).is_none() {
        rels.add("numbering.xml", Relationships::TYPE_NUMBERING);
        archive.set_string(rels_path, rels.to_xml());
    }
    ensure_override(archive, "/word/numbering.xml", NUMBERING_CONTENT_TYPE)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::CONTENT_TYPES_PATH;
    use crate::test_utils::DocxFixture;

    const DECIMAL_ONLY: &str = r#"<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:abstractNum w:abstractNumId="3"><w:lvl w:ilvl="0"><w:numFmt w:val="decimal"/></w:lvl></w:abstractNum><w:num w:numId="4"><w:abstractNumId w:val="3"/></w:num></w:numbering>"#;

    const WITH_BULLET: &str = r#"<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:abstractNum w:abstractNumId="0"><w:lvl w:ilvl="0"><w:numFmt w:val="decimal"/></w:lvl></w:abstractNum><w:abstractNum w:abstractNumId="1"><w:lvl w:ilvl="0"><w:numFmt w:val="bullet"/></w:lvl></w:abstractNum><w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num><w:num w:numId="2"><w:abstractNumId w:val="1"/></w:num></w:numbering>"#;

    #[test]
    fn test_reuses_existing_bullet() {
        let mut archive = OoxmlArchive::new();
        archive.set_string(NUMBERING_PATH, WITH_BULLET);
        assert_eq!(ensure_bullet_numbering(&mut archive).unwrap(), "2");
        assert_eq!(archive.get_string(NUMBERING_PATH).unwrap(), WITH_BULLET);
    }

    #[test]
    fn test_adds_definition_after_existing() {
        let mut archive = OoxmlArchive::new();
        archive.set_string(NUMBERING_PATH, DECIMAL_ONLY);

        let num_id = ensure_bullet_numbering(&mut archive).unwrap();
        assert_eq!(num_id, "5");

        let root = XmlDocument::parse(archive.get(NUMBERING_PATH).unwrap(), "n").unwrap().root;
        let order: Vec<_> = root.elements().map(|e| e.local_name().to_string()).collect();
        assert_eq!(order, vec!["abstractNum", "abstractNum", "num", "num"]);
        assert_eq!(find_bullet_num(&root).as_deref(), Some("5"));

        // second call finds the one just added
        assert_eq!(ensure_bullet_numbering(&mut archive).unwrap(), "5");
    }

    #[test]
    fn test_creates_part_with_relationship() {
        let bytes = DocxFixture::new("<w:p/>").build();
        let mut archive = OoxmlArchive::from_bytes(&bytes).unwrap();
        assert!(!archive.contains(NUMBERING_PATH));

        assert_eq!(ensure_bullet_numbering(&mut archive).unwrap(), "1");
        assert!(archive.contains(NUMBERING_PATH));

        let rels = Relationships::parse(archive.get("word/_rels/document.xml.rels").unwrap()).unwrap();
        assert_eq!(
            rels.find_by_type(Relationships::TYPE_NUMBERING).map(|r| r.target.as_str()),
            Some("numbering.xml")
        );
        let types = archive.get_string(CONTENT_TYPES_PATH).unwrap();
        assert!(types.contains("/word/numbering.xml"));
    }
}
