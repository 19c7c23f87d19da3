//! Configuration settings
//!
//! Settings are loaded from `lessondok.toml` in the working directory, or
//! from the file given with `--config`:
//!
//! ```toml
//! [store]
//! root = "lessons"
//!
//! [templates]
//! activity_document = "templates/activity.docx"
//! slide_deck = "templates/deck.pptx"
//! lesson_plan = "templates/lesson-plan.docx"
//! output_dir = "generated"
//!
//! [lists]
//! empty_items = "drop"
//!
//! [plans.activity_document]
//! footer = "U{unit}P{period} {mainTopic}"
//!
//! [plans.activity_document.lists]
//! completionChecklist = "table_rows"
//!
//! [slides]
//! hidden = [11, 12]
//!
//! [[slides.videos]]
//! slide = 6
//! url_field = "videoLecture"
//! title_field = "lectureVideoTitle"
//!
//! [generator]
//! model = "gpt-4o-mini"
//! api_key_env = "OPENAI_API_KEY"
//!
//! [pacing]
//! render_ms = 300
//! generate_ms = 1000
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lessondok_core::{EmptyItemPolicy, OutputKind, SubstitutionPlan};
use lessondok_data::tables;
use lessondok_generator::client::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS};
use lessondok_generator::{ResponseMapping, DEFAULT_API_KEY_ENV};
use lessondok_pptx::SlideMedia;
use serde::{Deserialize, Serialize};

/// Configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "lessondok.toml";

/// Top-level settings structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Record store location and table names
    pub store: StoreSettings,
    /// Template paths per output kind
    pub templates: TemplateSettings,
    /// List-field handling shared by every plan
    pub lists: ListSettings,
    /// Substitution plans per output kind
    pub plans: PlanSettings,
    /// Video slots and hidden slides of the deck
    pub slides: SlideMedia,
    /// Content generation
    pub generator: GeneratorSettings,
    /// Delays between external calls
    pub pacing: PacingSettings,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load settings from `path`, or from `lessondok.toml` when present.
    ///
    /// Relative paths in the file resolve against the file's directory.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(CONFIG_FILE);
                if !default.is_file() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let settings = Self::from_toml_str(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(settings.relative_to(base))
    }

    /// Resolve relative paths against `base`
    pub fn relative_to(mut self, base: &Path) -> Self {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.store.root);
        for path in [
            &mut self.templates.activity_document,
            &mut self.templates.slide_deck,
            &mut self.templates.lesson_plan,
            &mut self.templates.output_dir,
        ]
        .into_iter()
        .flatten()
        {
            resolve(path);
        }
        self
    }

    /// Substitution plan for a kind, with the shared list settings applied
    pub fn plan_for(&self, kind: OutputKind) -> SubstitutionPlan {
        let configured = match kind {
            OutputKind::ActivityDocument => &self.plans.activity_document,
            OutputKind::SlideDeck => &self.plans.slide_deck,
            OutputKind::LessonPlan => &self.plans.lesson_plan,
        };
        configured
            .clone()
            .unwrap_or_else(|| SubstitutionPlan::for_kind(kind))
            .with_empty_items(self.lists.empty_items)
    }

    /// Template path for a kind
    pub fn template_for(&self, kind: OutputKind) -> Option<&Path> {
        match kind {
            OutputKind::ActivityDocument => self.templates.activity_document.as_deref(),
            OutputKind::SlideDeck => self.templates.slide_deck.as_deref(),
            OutputKind::LessonPlan => self.templates.lesson_plan.as_deref(),
        }
    }
}

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Directory of CSV tables
    pub root: PathBuf,
    /// Lesson outline table
    pub lesson_sequence: String,
    /// Generated content table
    pub activity_content: String,
    /// Prompt settings table
    pub prompt_details: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("lessons"),
            lesson_sequence: tables::LESSON_SEQUENCE.to_string(),
            activity_content: tables::ACTIVITY_CONTENT.to_string(),
            prompt_details: tables::PROMPT_DETAILS.to_string(),
        }
    }
}

/// Template locations
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TemplateSettings {
    pub activity_document: Option<PathBuf>,
    pub slide_deck: Option<PathBuf>,
    pub lesson_plan: Option<PathBuf>,
    /// Where generated files go; defaults to each template's directory
    pub output_dir: Option<PathBuf>,
}

/// List-field settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ListSettings {
    /// Keep or drop empty items after a trailing delimiter
    pub empty_items: EmptyItemPolicy,
}

/// Plan overrides; a missing plan uses the built-in one
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PlanSettings {
    pub activity_document: Option<SubstitutionPlan>,
    pub slide_deck: Option<SubstitutionPlan>,
    pub lesson_plan: Option<SubstitutionPlan>,
}

/// Content generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Endpoint override; otherwise the `modelEndpoint` column
    pub endpoint: Option<String>,
    /// Model override; otherwise the `model` column
    pub model: Option<String>,
    /// Environment variable holding the API key when the table has none
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Response key to `activity_content` column mapping
    pub response_keys: ResponseMapping,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            response_keys: ResponseMapping::default(),
        }
    }
}

/// Minimum delays between successive external calls
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PacingSettings {
    /// Between document renders, in milliseconds
    pub render_ms: u64,
    /// Between generator calls, in milliseconds
    pub generate_ms: u64,
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            render_ms: 300,
            generate_ms: 1000,
        }
    }
}
