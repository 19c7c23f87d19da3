//! Lesson summaries in, activity-content rows out.
//!
//! The model answers with a JSON object keyed by section headings
//! (`Introduction`, `Warm Up`, ...). [`ResponseMapping`] maps those keys onto
//! `activity_content` columns; lesson-sequence fields that the model never
//! sees again are carried over unchanged.

use std::collections::BTreeMap;

use lessondok_core::FieldRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{GeneratorError, Result};
use crate::prompt::PromptTemplate;
use crate::ContentGenerator;

/// Lesson-sequence fields sent to the model, in send order
pub const SUMMARY_FIELDS: &[&str] = &[
    "unit",
    "title",
    "period",
    "mainTopic",
    "subTopics",
    "apObjectives",
    "bigIdeaQuiz",
    "previousLessonTopic",
    "nextLessonTopic",
    "lectureVideoTitle",
    "shortsVideoTitle",
];

/// Lesson-sequence fields copied into the activity row, as (source, column)
pub const CARRIED_FIELDS: &[(&str, &str)] = &[
    ("unit", "unit"),
    ("title", "title"),
    ("period", "period"),
    ("mainTopic", "mainTopic"),
    ("subTopics", "subTopics"),
    ("apObjectives", "apObjectives"),
    ("previousLessonTopic", "previousLessonTopic"),
    ("nextLessonTopic", "nextLessonTopic"),
    ("bigIdeaQuiz", "endOfLessonQuiz"),
    ("lectureVideoTitle", "lectureVideoTitle"),
    ("videoLecture", "videoLecture"),
    ("shortsVideoTitle", "shortsVideoTitle"),
    ("videoTopic", "videoTopic"),
];

/// Column receiving the model name
pub const MODEL_COLUMN: &str = "model";

/// The summary record sent to the model
pub fn lesson_summary(sequence: &FieldRecord) -> FieldRecord {
    SUMMARY_FIELDS
        .iter()
        .map(|name| (*name, sequence.text_or_empty(name).to_string()))
        .collect()
}

/// Remove Markdown code fences around a JSON answer
pub fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Parse model output into a JSON object
pub fn parse_content(raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(strip_fences(raw)) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(GeneratorError::parse_failure(
            format!("expected a JSON object, got {}", json_kind(&other)),
            raw,
        )),
        Err(e) => Err(GeneratorError::parse_failure(e.to_string(), raw)),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Cell text for a JSON value; arrays become `|`-delimited lists
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(cell_text).collect::<Vec<_>>().join("|"),
        other => other.to_string(),
    }
}

/// Response key to column mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseMapping(BTreeMap<String, String>);

impl Default for ResponseMapping {
    fn default() -> Self {
        Self::from_pairs([
            ("Introduction", "introduction"),
            ("Learning Objective 1", "learningObjectiveOne"),
            ("Learning Objective 2", "learningObjectiveTwo"),
            ("Warm Up", "warmUp"),
            ("Key Terms and Definitions", "keyTermsAndDefinitions"),
            ("Essential Question", "essentialQuestion"),
            ("True or False Question", "trueOrFalseQuestion"),
            ("Next Lesson Preview", "nextLessonPreview"),
            ("Answer Key for Essential Question", "akEssentialQuestion"),
            ("Answer Key for True or False Question", "akTrueFalse"),
            ("Completion Checklist", "completionChecklist"),
        ])
    }
}

impl ResponseMapping {
    /// Build from (response key, column) pairs
    pub fn from_pairs<K: Into<String>, C: Into<String>>(pairs: impl IntoIterator<Item = (K, C)>) -> Self {
        Self(pairs.into_iter().map(|(k, c)| (k.into(), c.into())).collect())
    }

    /// Column for a response key
    pub fn column(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// (response key, column) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, c)| (k.as_str(), c.as_str()))
    }

    /// Number of mapped keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if nothing is mapped
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Assemble an activity-content row (without id) from the model's answer
pub fn activity_record(
    content: &Map<String, Value>,
    sequence: &FieldRecord,
    mapping: &ResponseMapping,
    model: &str,
) -> FieldRecord {
    let mut record = FieldRecord::new();

    for (key, column) in mapping.iter() {
        match content.get(key) {
            Some(value) => record.insert(column, cell_text(value)),
            None => debug!(key, "response has no value for key"),
        }
    }
    for key in content.keys().filter(|k| mapping.column(k).is_none()) {
        debug!(key = key.as_str(), "unmapped response key ignored");
    }

    for (source, column) in CARRIED_FIELDS {
        if let Some(value) = sequence.get(source) {
            record.insert(*column, value.clone());
        }
    }
    record.insert(MODEL_COLUMN, model);
    record
}

/// Generate the activity-content row for one lesson-sequence row
pub fn generate_lesson_content<G: ContentGenerator + ?Sized>(
    generator: &G,
    sequence: &FieldRecord,
    prompt: &PromptTemplate,
    mapping: &ResponseMapping,
) -> Result<FieldRecord> {
    let raw = generator.generate(&lesson_summary(sequence), prompt)?;
    let content = parse_content(&raw)?;
    Ok(activity_record(&content, sequence, mapping, generator.model_name()))
}
