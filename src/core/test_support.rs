use crate::infra::summarizer::{GenerationOptions, Summarizer, SummarizerError};
use std::cell::RefCell;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub prompt: String,
    pub options: GenerationOptions,
}

/// Backend double that records every request and answers `summary #n`.
pub struct RecordingSummarizer {
    calls: RefCell<Vec<RecordedCall>>,
    fail_when: Box<dyn Fn(&str) -> bool>,
}

impl RecordingSummarizer {
    pub fn new() -> Self {
        Self::failing_when(|_| false)
    }

    pub fn failing_when(predicate: impl Fn(&str) -> bool + 'static) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_when: Box::new(predicate),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }
}

impl Summarizer for RecordingSummarizer {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, SummarizerError> {
        let mut calls = self.calls.borrow_mut();
        calls.push(RecordedCall {
            model: model.to_string(),
            prompt: prompt.to_string(),
            options: options.clone(),
        });

        if (self.fail_when)(prompt) {
            return Err(SummarizerError::Backend("model crashed".to_string()));
        }
        Ok(format!("summary #{}", calls.len()))
    }
}
