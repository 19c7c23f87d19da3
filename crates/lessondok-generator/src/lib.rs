//! # lessondok-generator
//!
//! Lesson content generation for lessondok.
//!
//! A lesson-sequence row is summarised, sent to a chat model together with
//! the prompt from the `prompt_details` table, and the model's JSON answer
//! is turned into an `activity_content` row.
//!
//! ## Example
//!
//! ```no_run
//! use lessondok_core::FieldRecord;
//! use lessondok_generator::{
//!     generate_lesson_content, ModelSettings, OpenAiClient, PromptTemplate, ResponseMapping,
//! };
//!
//! let prompt_row = FieldRecord::from_pairs([
//!     ("model", "gpt-4o-mini"),
//!     ("apiKey", "sk-..."),
//!     ("promptRole", "You are a computer science teacher."),
//! ]);
//! let prompt = PromptTemplate::from_record(&prompt_row)?;
//! let client = OpenAiClient::new(ModelSettings::from_record(&prompt_row, None, None, "OPENAI_API_KEY")?);
//!
//! let lesson = FieldRecord::from_pairs([("unit", "3"), ("title", "Loops")]);
//! let row = generate_lesson_content(&client, &lesson, &prompt, &ResponseMapping::default())?;
//! # Ok::<(), lessondok_generator::GeneratorError>(())
//! ```

pub mod client;
pub mod content;
pub mod error;
pub mod prompt;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use client::{ChatMessage, ChatRequest, OpenAiClient};
pub use content::{
    activity_record, generate_lesson_content, lesson_summary, parse_content, strip_fences,
    ResponseMapping,
};
pub use error::{GeneratorError, Result};
pub use prompt::{ModelSettings, PromptTemplate, DEFAULT_API_KEY_ENV, DEFAULT_ENDPOINT};

use lessondok_core::FieldRecord;

/// A source of lesson content
pub trait ContentGenerator {
    /// Raw model output for a lesson summary
    fn generate(&self, context: &FieldRecord, prompt: &PromptTemplate) -> Result<String>;

    /// Model name recorded with the generated row
    fn model_name(&self) -> &str;
}
