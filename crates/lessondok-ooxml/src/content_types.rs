//! `[Content_Types].xml` edits

use crate::archive::{OoxmlArchive, CONTENT_TYPES_PATH};
use crate::error::Result;
use crate::xml::{XmlDocument, XmlElement};

/// Content types namespace
pub const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Content type of `word/numbering.xml`
pub const NUMBERING_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml";

/// Register an override for `part_name` (leading `/` included) unless one exists.
///
/// Returns true when the map was changed.
pub fn ensure_override(archive: &mut OoxmlArchive, part_name: &str, content_type: &str) -> Result<bool> {
    let mut types = match archive.get(CONTENT_TYPES_PATH) {
        Some(bytes) => XmlDocument::parse(bytes, CONTENT_TYPES_PATH)?,
        None => XmlDocument::new(XmlElement::new("Types").with_attr("xmlns", CONTENT_TYPES_NS)),
    };

    let exists = types
        .root
        .elements()
        .any(|e| e.is("Override") && e.attr("PartName") == Some(part_name));
    if exists {
        return Ok(false);
    }

    types.root.push_element(
        XmlElement::new("Override")
            .with_attr("PartName", part_name)
            .with_attr("ContentType", content_type),
    );
    archive.set_string(CONTENT_TYPES_PATH, types.to_xml());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adds_override_once() {
        let mut archive = OoxmlArchive::new();
        archive.set_string(
            CONTENT_TYPES_PATH,
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#,
        );

        assert!(ensure_override(&mut archive, "/word/numbering.xml", NUMBERING_CONTENT_TYPE).unwrap());
        assert!(!ensure_override(&mut archive, "/word/numbering.xml", NUMBERING_CONTENT_TYPE).unwrap());

        let xml = archive.get_string(CONTENT_TYPES_PATH).unwrap();
        assert_eq!(xml.matches("/word/numbering.xml").count(), 1);
        assert!(xml.contains(r#"<Default Extension="xml""#));
    }
}
