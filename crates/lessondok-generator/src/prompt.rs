//! Prompt and model settings
//!
//! Both come from the first row of the `prompt_details` table, so teachers
//! can tune the prompt without touching configuration files.

use lessondok_core::FieldRecord;
use serde::{Deserialize, Serialize};

use crate::error::{GeneratorError, Result};

/// Columns of the `prompt_details` table
pub mod columns {
    pub const MODEL_ENDPOINT: &str = "modelEndpoint";
    pub const MODEL: &str = "model";
    pub const API_KEY: &str = "apiKey";
    pub const PROMPT_ROLE: &str = "promptRole";
    pub const PROMPT_DETAILS: &str = "promptDetails";
    pub const PROMPT_FORMAT: &str = "promptFormat";
    pub const PROMPT_STRUCTURE: &str = "promptStructure";
}

/// Default chat-completions endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Environment variable consulted when the table carries no key
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// The system instructions sent with every lesson summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Who the model should act as
    pub role: String,
    /// Layout of the expected JSON object; optional
    pub structure_rules: String,
    /// What each section of the lesson should contain
    pub content_rules: String,
    /// Output format instructions
    pub format_rules: String,
}

impl PromptTemplate {
    /// Read the prompt from a `prompt_details` row
    pub fn from_record(record: &FieldRecord) -> Result<Self> {
        let prompt = Self {
            role: record.text_or_empty(columns::PROMPT_ROLE).trim().to_string(),
            structure_rules: record.text_or_empty(columns::PROMPT_STRUCTURE).trim().to_string(),
            content_rules: record.text_or_empty(columns::PROMPT_DETAILS).trim().to_string(),
            format_rules: record.text_or_empty(columns::PROMPT_FORMAT).trim().to_string(),
        };
        if prompt.role.is_empty() {
            return Err(GeneratorError::MissingSetting(columns::PROMPT_ROLE.to_string()));
        }
        Ok(prompt)
    }

    /// System messages in send order: role, content, format, then structure when set
    pub fn system_messages(&self) -> Vec<&str> {
        let mut messages = vec![
            self.role.as_str(),
            self.content_rules.as_str(),
            self.format_rules.as_str(),
        ];
        if !self.structure_rules.is_empty() {
            messages.push(self.structure_rules.as_str());
        }
        messages
    }
}

/// Endpoint, model and credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSettings {
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
}

impl ModelSettings {
    /// Read model settings from a `prompt_details` row.
    ///
    /// Blank cells fall back to `endpoint`/`model` overrides, then to the
    /// defaults; a blank key falls back to the `api_key_env` variable.
    pub fn from_record(
        record: &FieldRecord,
        endpoint: Option<&str>,
        model: Option<&str>,
        api_key_env: &str,
    ) -> Result<Self> {
        let cell = |name: &str| {
            record
                .text(name)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let endpoint = endpoint
            .map(str::to_string)
            .or_else(|| cell(columns::MODEL_ENDPOINT))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let model = model
            .map(str::to_string)
            .or_else(|| cell(columns::MODEL))
            .ok_or_else(|| GeneratorError::MissingSetting(columns::MODEL.to_string()))?;
        let api_key = cell(columns::API_KEY)
            .or_else(|| std::env::var(api_key_env).ok().filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| GeneratorError::MissingApiKey(api_key_env.to_string()))?;

        Ok(Self {
            endpoint,
            model,
            api_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt_row() -> FieldRecord {
        FieldRecord::from_pairs([
            ("modelEndpoint", "https://llm.example/v1/chat/completions"),
            ("model", "gpt-4o-mini"),
            ("apiKey", "sk-test"),
            ("promptRole", "You are a teacher."),
            ("promptDetails", "Write a lesson."),
            ("promptFormat", "Answer in JSON."),
            ("promptStructure", ""),
        ])
    }

    #[test]
    fn test_prompt_from_record() {
        let prompt = PromptTemplate::from_record(&prompt_row()).unwrap();
        assert_eq!(
            prompt.system_messages(),
            vec!["You are a teacher.", "Write a lesson.", "Answer in JSON."]
        );

        let mut row = prompt_row();
        row.insert("promptStructure", "Keys: Introduction");
        let prompt = PromptTemplate::from_record(&row).unwrap();
        assert_eq!(prompt.system_messages().len(), 4);
        assert_eq!(prompt.system_messages()[3], "Keys: Introduction");
    }

    #[test]
    fn test_prompt_requires_role() {
        let mut row = prompt_row();
        row.insert("promptRole", "  ");
        assert!(matches!(
            PromptTemplate::from_record(&row),
            Err(GeneratorError::MissingSetting(ref s)) if s == "promptRole"
        ));
    }

    #[test]
    fn test_model_settings_from_record() {
        let settings =
            ModelSettings::from_record(&prompt_row(), None, None, "LESSONDOK_TEST_UNSET_KEY").unwrap();
        assert_eq!(settings.endpoint, "https://llm.example/v1/chat/completions");
        assert_eq!(settings.model, "gpt-4o-mini");
        assert_eq!(settings.api_key, "sk-test");
    }

    #[test]
    fn test_model_settings_overrides_and_defaults() {
        let row = FieldRecord::from_pairs([("model", "gpt-4o"), ("apiKey", "sk-test")]);
        let settings =
            ModelSettings::from_record(&row, None, Some("gpt-4.1"), "LESSONDOK_TEST_UNSET_KEY").unwrap();
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.model, "gpt-4.1");
    }

    #[test]
    fn test_missing_key() {
        let row = FieldRecord::from_pairs([("model", "gpt-4o")]);
        let err = ModelSettings::from_record(&row, None, None, "LESSONDOK_TEST_UNSET_KEY").unwrap_err();
        assert!(matches!(err, GeneratorError::MissingApiKey(ref v) if v == "LESSONDOK_TEST_UNSET_KEY"));
    }
}
