//! Substitution plans
//!
//! A plan declares, per output kind, which record fields are lists and how
//! each list grows the document. Fields not named in the plan are replaced
//! as plain text.
//!
//! ```toml
//! [plans.activity_document]
//! footer = "U{unit}P{period} {mainTopic}"
//!
//! [plans.activity_document.lists]
//! completionChecklist = "table_rows"
//! keyTermsAndDefinitions = "bullet_list"
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::kind::OutputKind;
use crate::list::EmptyItemPolicy;

/// Checklist column, anchored in a table
pub const COMPLETION_CHECKLIST: &str = "completionChecklist";

/// Key terms column, anchored in running text
pub const KEY_TERMS: &str = "keyTermsAndDefinitions";

/// How a field reaches the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Literal replacement of every `{{field}}`
    Text,
    /// One table row per item, starting at the anchor cell
    TableRows,
    /// One bulleted paragraph per item, starting at the anchor paragraph
    BulletList,
}

impl Strategy {
    /// Whether the field value is a delimited list
    pub fn is_list(self) -> bool {
        !matches!(self, Strategy::Text)
    }
}

/// Field strategies and composite formats for one output kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubstitutionPlan {
    /// List fields and their expansion strategy
    pub lists: BTreeMap<String, Strategy>,
    /// Format of the `{{footer}}` composite, `{field}` references allowed
    pub footer: Option<String>,
    /// Treatment of empty list items, set from the `[lists]` section
    #[serde(skip)]
    pub empty_items: EmptyItemPolicy,
}

impl SubstitutionPlan {
    /// Create an empty plan (every field is plain text)
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a list field
    pub fn with_list(mut self, field: impl Into<String>, strategy: Strategy) -> Self {
        self.lists.insert(field.into(), strategy);
        self
    }

    /// Set the footer format
    pub fn with_footer(mut self, format: impl Into<String>) -> Self {
        self.footer = Some(format.into());
        self
    }

    /// Set the empty item policy
    pub fn with_empty_items(mut self, policy: EmptyItemPolicy) -> Self {
        self.empty_items = policy;
        self
    }

    /// Strategy for a field; undeclared fields are text
    pub fn strategy_for(&self, field: &str) -> Strategy {
        self.lists.get(field).copied().unwrap_or(Strategy::Text)
    }

    /// Declared list fields
    pub fn list_fields(&self) -> impl Iterator<Item = (&str, Strategy)> {
        self.lists.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Activity sheet: checklist table, key-term bullets
    pub fn activity_document() -> Self {
        Self::new()
            .with_list(COMPLETION_CHECKLIST, Strategy::TableRows)
            .with_list(KEY_TERMS, Strategy::BulletList)
            .with_footer("U{unit}P{period} {mainTopic}")
    }

    /// Lesson plan: both lists live in tables
    pub fn lesson_plan() -> Self {
        Self::new()
            .with_list(COMPLETION_CHECKLIST, Strategy::TableRows)
            .with_list(KEY_TERMS, Strategy::TableRows)
            .with_footer("U{unit} P{period} {title} {mainTopic}")
    }

    /// Slide deck: both lists become bullet lines, no footer
    pub fn slide_deck() -> Self {
        Self::new()
            .with_list(COMPLETION_CHECKLIST, Strategy::BulletList)
            .with_list(KEY_TERMS, Strategy::BulletList)
    }

    /// Default plan for an output kind
    pub fn for_kind(kind: OutputKind) -> Self {
        match kind {
            OutputKind::ActivityDocument => Self::activity_document(),
            OutputKind::SlideDeck => Self::slide_deck(),
            OutputKind::LessonPlan => Self::lesson_plan(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undeclared_fields_are_text() {
        let plan = SubstitutionPlan::activity_document();
        assert_eq!(plan.strategy_for("warmUp"), Strategy::Text);
        assert_eq!(plan.strategy_for(COMPLETION_CHECKLIST), Strategy::TableRows);
        assert_eq!(plan.strategy_for(KEY_TERMS), Strategy::BulletList);
    }

    #[test]
    fn test_lesson_plan_uses_tables() {
        let plan = SubstitutionPlan::for_kind(OutputKind::LessonPlan);
        assert!(plan.list_fields().all(|(_, s)| s == Strategy::TableRows));
        assert_eq!(plan.list_fields().count(), 2);
    }

    #[test]
    fn test_strategy_is_list() {
        assert!(!Strategy::Text.is_list());
        assert!(Strategy::TableRows.is_list());
        assert!(Strategy::BulletList.is_list());
    }

    #[test]
    fn test_plan_deserializes_with_defaults() {
        let json = r#"{"lists": {"steps": "bullet_list"}}"#;
        let plan: SubstitutionPlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.strategy_for("steps"), Strategy::BulletList);
        assert_eq!(plan.footer, None);
        assert_eq!(plan.empty_items, EmptyItemPolicy::Keep);
    }
}
