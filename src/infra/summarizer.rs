//! Text generation backends.
//!
//! The rest of the crate only sees the [`Summarizer`] trait; the Ollama
//! client below is the implementation wired up by the CLI.

use log::{debug, info};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummarizerError {
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode backend response: {0}")]
    Decode(String),

    #[error("{0}")]
    Backend(String),
}

/// Sampling and hardware hints forwarded verbatim to the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_gpu: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_thread: Option<u32>,
}

impl GenerationOptions {
    /// Options for a whole-file request.
    pub fn direct() -> Self {
        Self {
            temperature: Some(0.2),
            top_p: Some(0.9),
            num_ctx: Some(4096),
            ..Self::default()
        }
    }

    /// Options for chunk and merge requests.
    pub fn sectioned() -> Self {
        Self {
            temperature: Some(0.2),
            num_ctx: Some(4096),
            ..Self::default()
        }
    }

    pub fn with_hardware(mut self, num_gpu: Option<u32>, num_thread: Option<u32>) -> Self {
        self.num_gpu = num_gpu;
        self.num_thread = num_thread;
        self
    }
}

pub trait Summarizer {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, SummarizerError>;
}

impl<S: Summarizer + ?Sized> Summarizer for &S {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, SummarizerError> {
        (**self).generate(model, prompt, options)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: &'a GenerationOptions,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for a local Ollama server's `/api/generate` endpoint.
pub struct OllamaSummarizer {
    client: Client,
    endpoint: String,
}

impl OllamaSummarizer {
    pub fn new(host: &str) -> anyhow::Result<Self> {
        // Local models can take minutes on a large prompt; never time out.
        let client = Client::builder().timeout(None::<Duration>).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/generate", host.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Loads the model into memory with a tiny prompt so the first real
    /// request doesn't pay the load time.
    pub fn warm_up(&self, model: &str) -> Result<(), SummarizerError> {
        info!("Initializing {}", model);
        let options = GenerationOptions {
            num_ctx: Some(512),
            ..GenerationOptions::default()
        };
        self.generate(model, "Hello", &options)?;
        info!("Model loaded and ready");
        Ok(())
    }
}

impl Summarizer for OllamaSummarizer {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, SummarizerError> {
        debug!(
            "POST {} model={} prompt_chars={}",
            self.endpoint,
            model,
            prompt.chars().count()
        );
        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
            options,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|source| SummarizerError::Request {
                endpoint: self.endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SummarizerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateResponse = response
            .json()
            .map_err(|e| SummarizerError::Decode(e.to_string()))?;
        Ok(body.response)
    }
}
