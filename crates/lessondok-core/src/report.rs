//! Render reports
//!
//! Renderers never fail on template content they do not understand. Instead
//! every substitution, expansion and miss is recorded as a [`RenderEvent`].

use std::fmt;

use serde::Serialize;

/// Location of a placeholder inside a document body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TemplateAnchor {
    /// Table cell; `table` is the table's body block index, `row` and `cell`
    /// are indices within that table and row
    Cell { table: usize, row: usize, cell: usize },
    /// Body block (paragraph) index
    Block { index: usize },
    /// Slide number, counted from 1
    Slide { slide: usize },
}

impl fmt::Display for TemplateAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateAnchor::Cell { table, row, cell } => {
                write!(f, "table {} row {} cell {}", table, row, cell)
            }
            TemplateAnchor::Block { index } => write!(f, "block {}", index),
            TemplateAnchor::Slide { slide } => write!(f, "slide {}", slide),
        }
    }
}

/// One thing that happened during a render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RenderEvent {
    /// A text field replaced `count` token occurrences
    Replaced { field: String, count: usize },
    /// A list field was expanded at an anchor
    Expanded {
        field: String,
        items: usize,
        anchor: TemplateAnchor,
    },
    /// No anchor was found for a list field
    AnchorNotFound { field: String },
    /// A token is still present after rendering
    Unresolved { placeholder: String },
    /// A list piece was empty after trimming
    EmptyListItem { field: String, position: usize },
    /// A media slot fell back to placeholder text
    MediaFallback {
        slide: usize,
        field: String,
        reason: String,
    },
    /// A slide was hidden
    SlideHidden { slide: usize },
}

/// Ordered log of render events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderReport {
    events: Vec<RenderEvent>,
}

impl RenderReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event
    pub fn push(&mut self, event: RenderEvent) {
        self.events.push(event);
    }

    /// All events in order
    pub fn events(&self) -> &[RenderEvent] {
        &self.events
    }

    /// Append another report's events
    pub fn extend(&mut self, other: RenderReport) {
        self.events.extend(other.events);
    }

    /// Total token replacements for a field
    pub fn replaced_count(&self, field: &str) -> usize {
        self.events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::Replaced { field: f, count } if f == field => Some(*count),
                _ => None,
            })
            .sum()
    }

    /// Anchor used for an expanded list field
    pub fn expansion_of(&self, field: &str) -> Option<(usize, TemplateAnchor)> {
        self.events.iter().find_map(|e| match e {
            RenderEvent::Expanded {
                field: f,
                items,
                anchor,
            } if f == field => Some((*items, *anchor)),
            _ => None,
        })
    }

    /// Placeholders left in the output
    pub fn unresolved(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::Unresolved { placeholder } => Some(placeholder.as_str()),
                _ => None,
            })
            .collect()
    }

    /// List fields whose anchor was missing
    pub fn anchors_not_found(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::AnchorNotFound { field } => Some(field.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Slides hidden during rendering
    pub fn hidden_slides(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::SlideHidden { slide } => Some(*slide),
                _ => None,
            })
            .collect()
    }

    /// Number of media fallbacks
    pub fn media_fallbacks(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, RenderEvent::MediaFallback { .. }))
            .count()
    }

    /// True when nothing was missed or left behind
    pub fn is_clean(&self) -> bool {
        !self.events.iter().any(|e| {
            matches!(
                e,
                RenderEvent::AnchorNotFound { .. }
                    | RenderEvent::Unresolved { .. }
                    | RenderEvent::MediaFallback { .. }
            )
        })
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        let replaced: usize = self
            .events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::Replaced { count, .. } => Some(*count),
                _ => None,
            })
            .sum();
        let expanded = self
            .events
            .iter()
            .filter(|e| matches!(e, RenderEvent::Expanded { .. }))
            .count();
        format!(
            "{} replacements, {} lists expanded, {} unresolved, {} anchors missing",
            replaced,
            expanded,
            self.unresolved().len(),
            self.anchors_not_found().len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaced_count_sums_events() {
        let mut report = RenderReport::new();
        report.push(RenderEvent::Replaced {
            field: "title".into(),
            count: 2,
        });
        report.push(RenderEvent::Replaced {
            field: "title".into(),
            count: 1,
        });
        report.push(RenderEvent::Replaced {
            field: "unit".into(),
            count: 4,
        });
        assert_eq!(report.replaced_count("title"), 3);
        assert_eq!(report.replaced_count("missing"), 0);
        assert!(report.is_clean());
    }

    #[test]
    fn test_misses_make_report_unclean() {
        let mut report = RenderReport::new();
        report.push(RenderEvent::Unresolved {
            placeholder: "teacherNotes".into(),
        });
        report.push(RenderEvent::AnchorNotFound {
            field: "completionChecklist".into(),
        });
        assert!(!report.is_clean());
        assert_eq!(report.unresolved(), vec!["teacherNotes"]);
        assert_eq!(report.anchors_not_found(), vec!["completionChecklist"]);
        assert!(report.summary().contains("1 unresolved"));
    }

    #[test]
    fn test_expansion_lookup() {
        let mut report = RenderReport::new();
        let anchor = TemplateAnchor::Cell {
            table: 0,
            row: 1,
            cell: 1,
        };
        report.push(RenderEvent::Expanded {
            field: "completionChecklist".into(),
            items: 2,
            anchor,
        });
        assert_eq!(report.expansion_of("completionChecklist"), Some((2, anchor)));
        assert_eq!(anchor.to_string(), "table 0 row 1 cell 1");
        assert_eq!(TemplateAnchor::Slide { slide: 4 }.to_string(), "slide 4");
    }

    #[test]
    fn test_serializes_tagged() {
        let event = RenderEvent::SlideHidden { slide: 11 };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event":"slide_hidden","slide":11}"#);
    }
}
