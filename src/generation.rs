//! Text generation via a local Ollama `/api/generate` endpoint.
//!
//! Generation failures are the only errors the assistant converts into a
//! normal answer instead of propagating, so they get their own error type
//! with user-facing wording.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::config::GenerationConfig;
use crate::types::AssistantError;

/// Why a generation request produced no answer.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request timed out")]
    Timeout,
    #[error("generation endpoint unreachable: {0}")]
    Connectivity(String),
}

impl GenerationError {
    /// Plain-language message shown in place of an answer. The two cases
    /// stay distinguishable so the user knows whether to wait or to start
    /// the model.
    pub fn user_message(&self) -> String {
        match self {
            Self::Timeout => {
                "The model took too long to respond. Try again, or ask a shorter question."
                    .to_string()
            }
            Self::Connectivity(detail) => format!(
                "I could not reach the local model ({detail}). \
                 Check that Ollama is running and try again."
            ),
        }
    }
}

/// Prompt in, generated text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Blocking (non-streaming) completion against Ollama.
#[derive(Clone)]
pub struct OllamaGenerator {
    client: Client,
    endpoint: Url,
    model: String,
}

impl OllamaGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self, AssistantError> {
        Self::from_parts(config.endpoint.clone(), &config.model, config.timeout)
    }

    pub fn from_parts(
        endpoint: Url,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, AssistantError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AssistantError::Config(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            model: model.to_string(),
        })
    }
}

fn classify(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::Connectivity(err.to_string())
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(classify)?;
        let body: GenerateResponse = response.json().await.map_err(classify)?;
        Ok(body.response.trim().to_string())
    }
}
