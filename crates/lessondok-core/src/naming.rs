//! Document naming and footer formatting

use std::sync::OnceLock;

use regex::Regex;

use crate::kind::OutputKind;
use crate::record::{fields, FieldRecord};

/// Name of a generated document: `U<unit>P<period> <label> <title> <mainTopic>`
pub fn document_name(kind: OutputKind, record: &FieldRecord) -> String {
    format!(
        "U{}P{} {} {} {}",
        record.text_or_empty(fields::UNIT),
        record.text_or_empty(fields::PERIOD),
        kind.label(),
        record.text_or_empty(fields::TITLE),
        record.text_or_empty(fields::MAIN_TOPIC),
    )
}

/// File name for a document name: path separators and characters that most
/// filesystems reject are replaced with `-`, and the kind's extension is added.
pub fn file_name(name: &str, kind: OutputKind) -> String {
    let safe: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();
    format!("{}.{}", safe.trim(), kind.format().extension())
}

fn field_ref_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("field pattern is valid"))
}

/// Fill `{field}` references in a format string from a record.
///
/// Missing or non-text fields expand to an empty string.
pub fn interpolate(format: &str, record: &FieldRecord) -> String {
    field_ref_regex()
        .replace_all(format, |caps: &regex::Captures| {
            record.text_or_empty(&caps[1]).to_string()
        })
        .into_owned()
}
