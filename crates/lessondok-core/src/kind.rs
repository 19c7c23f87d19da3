//! Output kinds
//!
//! Each lesson record can produce three resources. A kind knows its filename
//! label, the store columns that track it, and its template format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Package format of a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateFormat {
    /// WordprocessingML (`.docx`)
    Docx,
    /// PresentationML (`.pptx`)
    Pptx,
}

impl TemplateFormat {
    /// File extension without the dot
    pub fn extension(self) -> &'static str {
        match self {
            TemplateFormat::Docx => "docx",
            TemplateFormat::Pptx => "pptx",
        }
    }
}

/// A generated resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// Student activity sheet
    ActivityDocument,
    /// Classroom slide deck
    SlideDeck,
    /// Teacher lesson plan
    LessonPlan,
}

impl OutputKind {
    /// All kinds, in processing order
    pub const ALL: [OutputKind; 3] = [
        OutputKind::ActivityDocument,
        OutputKind::SlideDeck,
        OutputKind::LessonPlan,
    ];

    /// Label used in generated file names
    pub fn label(self) -> &'static str {
        match self {
            OutputKind::ActivityDocument => "Activity Document",
            OutputKind::SlideDeck => "Presentation",
            OutputKind::LessonPlan => "Lesson Plan",
        }
    }

    /// Completion flag column in the content table
    pub fn flag_column(self) -> &'static str {
        match self {
            OutputKind::ActivityDocument => "activityDocCreated",
            OutputKind::SlideDeck => "slideCreated",
            OutputKind::LessonPlan => "lessonPlanCreated",
        }
    }

    /// Column receiving the generated document reference
    pub fn link_column(self) -> &'static str {
        match self {
            OutputKind::ActivityDocument => "activityLink",
            OutputKind::SlideDeck => "slideLink",
            OutputKind::LessonPlan => "lessonPlanLink",
        }
    }

    /// Template package format
    pub fn format(self) -> TemplateFormat {
        match self {
            OutputKind::SlideDeck => TemplateFormat::Pptx,
            OutputKind::ActivityDocument | OutputKind::LessonPlan => TemplateFormat::Docx,
        }
    }

    /// Stable snake_case key, as used in configuration
    pub fn key(self) -> &'static str {
        match self {
            OutputKind::ActivityDocument => "activity_document",
            OutputKind::SlideDeck => "slide_deck",
            OutputKind::LessonPlan => "lesson_plan",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OutputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputKind::ALL
            .into_iter()
            .find(|k| k.key() == s)
            .ok_or_else(|| format!("unknown output kind '{}'", s))
    }
}
