//! Scripted generator for tests

use std::cell::RefCell;
use std::collections::VecDeque;

use lessondok_core::FieldRecord;

use crate::error::{GeneratorError, Result};
use crate::prompt::PromptTemplate;
use crate::ContentGenerator;

/// Answers with queued payloads and records every context it was given
#[derive(Debug, Default)]
pub struct StubGenerator {
    answers: RefCell<VecDeque<String>>,
    calls: RefCell<Vec<FieldRecord>>,
    model: String,
}

impl StubGenerator {
    /// A stub reporting `model` as its model name
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Queue a raw answer
    pub fn answer(self, raw: impl Into<String>) -> Self {
        self.answers.borrow_mut().push_back(raw.into());
        self
    }

    /// Contexts passed to `generate`, in call order
    pub fn calls(&self) -> Vec<FieldRecord> {
        self.calls.borrow().clone()
    }

    /// Number of `generate` calls
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl ContentGenerator for StubGenerator {
    fn generate(&self, context: &FieldRecord, _prompt: &PromptTemplate) -> Result<String> {
        self.calls.borrow_mut().push(context.clone());
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or(GeneratorError::EmptyResponse)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
