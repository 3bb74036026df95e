use crate::core::chunker::{chunk, chunk_request, direct_request, merge_request, needs_chunking};
use crate::domain::models::ChunkPolicy;
use crate::infra::summarizer::{GenerationOptions, Summarizer, SummarizerError};
use log::{debug, info};
use std::thread;

/// Summarizes one file's content, either in a single request or as one
/// request per chunk followed by a merge request.
pub struct FileSummarizer<S> {
    summarizer: S,
    model: String,
    policy: ChunkPolicy,
    direct_options: GenerationOptions,
    section_options: GenerationOptions,
}

impl<S: Summarizer> FileSummarizer<S> {
    pub fn new(summarizer: S, model: impl Into<String>, policy: ChunkPolicy) -> Self {
        Self {
            summarizer,
            model: model.into(),
            policy,
            direct_options: GenerationOptions::direct(),
            section_options: GenerationOptions::sectioned(),
        }
    }

    pub fn with_hardware(mut self, num_gpu: Option<u32>, num_thread: Option<u32>) -> Self {
        self.direct_options = self.direct_options.with_hardware(num_gpu, num_thread);
        self.section_options = self.section_options.with_hardware(num_gpu, num_thread);
        self
    }

    pub fn summarize(&self, content: &str, label: &str) -> Result<String, SummarizerError> {
        if needs_chunking(content, self.policy.threshold_chars) {
            return self.summarize_chunked(content, label);
        }

        info!("Analyzing {}", label);
        let prompt = direct_request(content, label);
        self.summarizer
            .generate(&self.model, &prompt, &self.direct_options)
    }

    fn summarize_chunked(&self, content: &str, label: &str) -> Result<String, SummarizerError> {
        let chunks = chunk(content, self.policy.chunk_chars);
        info!("Processing {} in {} chunks", label, chunks.len());

        let mut summaries = Vec::with_capacity(chunks.len());
        for piece in &chunks {
            info!("Processing chunk {}/{}", piece.index + 1, chunks.len());
            let prompt = chunk_request(piece, chunks.len(), label);
            summaries.push(
                self.summarizer
                    .generate(&self.model, &prompt, &self.section_options)?,
            );
            self.pause();
        }

        // A failure here discards every chunk summary gathered above.
        info!("Creating final summary for {}", label);
        let prompt = merge_request(&summaries, label);
        self.summarizer
            .generate(&self.model, &prompt, &self.section_options)
    }

    fn pause(&self) {
        if !self.policy.delay.is_zero() {
            debug!("Pausing {:?} before next request", self.policy.delay);
            thread::sleep(self.policy.delay);
        }
    }
}
