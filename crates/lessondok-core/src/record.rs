//! Field records
//!
//! A [`FieldRecord`] is one row of a lesson table: an ordered mapping from
//! column name to value. Column names double as template placeholder names.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Well-known column names shared by the lesson tables
pub mod fields {
    /// Row identity, always column 1
    pub const ID: &str = "id";
    /// Unit number
    pub const UNIT: &str = "unit";
    /// Class period
    pub const PERIOD: &str = "period";
    /// Lesson title
    pub const TITLE: &str = "title";
    /// Main topic of the lesson
    pub const MAIN_TOPIC: &str = "mainTopic";
    /// Set on lesson-sequence rows once their content was generated
    pub const PROCESSED: &str = "processed";

    /// Whether a column holds a completion flag rather than text
    pub fn is_flag(column: &str) -> bool {
        column == PROCESSED
            || crate::OutputKind::ALL
                .iter()
                .any(|kind| kind.flag_column() == column)
    }
}

/// A single cell value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Completion flags and other checkbox columns
    Bool(bool),
    /// Free text
    Text(String),
}

impl FieldValue {
    /// Text content, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Bool(_) => None,
        }
    }

    /// Boolean content, if this is a flag
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            FieldValue::Text(_) => None,
        }
    }

    /// True only for `Bool(true)`
    pub fn is_true(&self) -> bool {
        matches!(self, FieldValue::Bool(true))
    }

    /// Parse a raw flag cell.
    ///
    /// `TRUE`/`FALSE` (any case) become flags, everything else is text.
    pub fn from_cell(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("true") {
            FieldValue::Bool(true)
        } else if raw.eq_ignore_ascii_case("false") {
            FieldValue::Bool(false)
        } else {
            FieldValue::Text(raw.to_string())
        }
    }

    /// Parse a cell of `column`; only flag columns yield booleans, so an
    /// answer key reading `False` stays text
    pub fn from_column(column: &str, raw: &str) -> Self {
        if fields::is_flag(column) {
            Self::from_cell(raw)
        } else {
            FieldValue::Text(raw.to_string())
        }
    }

    /// Render back to a spreadsheet cell
    pub fn to_cell(&self) -> String {
        match self {
            FieldValue::Bool(true) => "TRUE".to_string(),
            FieldValue::Bool(false) => "FALSE".to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

/// An ordered, field-keyed record
///
/// Insertion order is kept so that substitution walks fields in column order.
/// Inserting an existing key overwrites the value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRecord {
    entries: Vec<(String, FieldValue)>,
}

impl FieldRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `(name, value)` pairs
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let mut record = Self::new();
        for (k, v) in pairs {
            record.insert(k, v);
        }
        record
    }

    /// Insert or overwrite a field
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Get a field value
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Get a text field
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    /// Get a text field, empty when absent or not text
    pub fn text_or_empty(&self, name: &str) -> &str {
        self.text(name).unwrap_or("")
    }

    /// Whether a flag field is set to `true`
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).is_some_and(FieldValue::is_true)
    }

    /// The row identity (`id` column)
    pub fn id(&self) -> Option<&str> {
        self.text(fields::ID)
    }

    /// Check if a field exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove a field, returning its value
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        let pos = self.entries.iter().position(|(k, _)| k == name)?;
        Some(self.entries.remove(pos).1)
    }

    /// Iterate fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Field names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy every field of `other` into this record, overwriting duplicates
    pub fn merge(&mut self, other: &FieldRecord) {
        for (k, v) in other.iter() {
            self.insert(k, v.clone());
        }
    }

    /// Project a subset of fields, in the order given.
    ///
    /// Missing fields are skipped.
    pub fn project(&self, names: &[&str]) -> FieldRecord {
        let mut out = FieldRecord::new();
        for name in names {
            if let Some(value) = self.get(name) {
                out.insert(*name, value.clone());
            }
        }
        out
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FieldRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}

impl Serialize for FieldRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order_and_overwrites() {
        let mut record = FieldRecord::new();
        record.insert("id", "1");
        record.insert("title", "Loops");
        record.insert("id", "2");

        let keys: Vec<_> = record.keys().collect();
        assert_eq!(keys, vec!["id", "title"]);
        assert_eq!(record.id(), Some("2"));
    }

    #[test]
    fn test_cell_parsing() {
        assert_eq!(FieldValue::from_cell("TRUE"), FieldValue::Bool(true));
        assert_eq!(FieldValue::from_cell("false"), FieldValue::Bool(false));
        assert_eq!(FieldValue::from_cell("Truely"), FieldValue::from("Truely"));
        assert_eq!(FieldValue::from_cell(""), FieldValue::from(""));
        assert_eq!(FieldValue::Bool(true).to_cell(), "TRUE");
    }

    #[test]
    fn test_only_flag_columns_parse_as_bool() {
        assert_eq!(
            FieldValue::from_column("slideCreated", "TRUE"),
            FieldValue::Bool(true)
        );
        assert_eq!(
            FieldValue::from_column("processed", "false"),
            FieldValue::Bool(false)
        );
        assert_eq!(FieldValue::from_column("akTrueFalse", "False"), FieldValue::from("False"));
        assert_eq!(FieldValue::from_column("title", "TRUE"), FieldValue::from("TRUE"));
        assert!(fields::is_flag("lessonPlanCreated"));
        assert!(!fields::is_flag("activityLink"));
    }

    #[test]
    fn test_flag_only_for_true_bool() {
        let record = FieldRecord::from_pairs([
            ("a", FieldValue::Bool(true)),
            ("b", FieldValue::Bool(false)),
            ("c", FieldValue::from("TRUE")),
        ]);
        assert!(record.flag("a"));
        assert!(!record.flag("b"));
        assert!(!record.flag("c"));
        assert!(!record.flag("missing"));
    }

    #[test]
    fn test_text_accessors() {
        let record = FieldRecord::from_pairs([("title", FieldValue::from("Loops"))]);
        assert_eq!(record.text("title"), Some("Loops"));
        assert_eq!(record.text_or_empty("unit"), "");
    }

    #[test]
    fn test_merge_and_project() {
        let mut base = FieldRecord::from_pairs([("unit", "1"), ("title", "Old")]);
        let update = FieldRecord::from_pairs([("title", "New"), ("period", "4")]);
        base.merge(&update);

        assert_eq!(base.text("title"), Some("New"));
        assert_eq!(base.len(), 3);

        let projected = base.project(&["period", "missing", "unit"]);
        let keys: Vec<_> = projected.keys().collect();
        assert_eq!(keys, vec!["period", "unit"]);
    }

    #[test]
    fn test_serialize_as_ordered_map() {
        let record = FieldRecord::from_pairs([
            ("unit", FieldValue::from("3")),
            ("done", FieldValue::Bool(true)),
        ]);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"unit":"3","done":true}"#);
    }
}
