//! LLM Client — the single point of entry for text-generation calls.
//!
//! No other module talks to the inference endpoint directly; the feedback
//! pipeline depends only on the `TextGenerator` trait.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod guard;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The endpoint answered 2xx with a body that carries no generated text.
    /// A body that is not JSON at all is carried as a string.
    #[error("Unexpected response format: {0}")]
    UnexpectedFormat(serde_json::Value),
}

/// A hosted text-generation capability.
///
/// Implementations return the generated text only; prompt budgeting happens
/// before this is called (see [`guard`]).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, max_new_tokens: u32) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedText {
    pub generated_text: String,
}

/// Every body shape the text-generation endpoint is known to return.
/// Normalized to a plain string by [`GenerationPayload::into_text`] and never
/// passed further.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GenerationPayload {
    Plain(String),
    Structured(GeneratedText),
    Batch(Vec<GeneratedText>),
    Unrecognized(serde_json::Value),
}

impl GenerationPayload {
    pub fn into_text(self) -> Result<String, LlmError> {
        match self {
            GenerationPayload::Plain(text) => Ok(text),
            GenerationPayload::Structured(g) => Ok(g.generated_text),
            GenerationPayload::Batch(batch) => match batch.into_iter().next() {
                Some(g) => Ok(g.generated_text),
                None => Err(LlmError::UnexpectedFormat(serde_json::Value::Array(vec![]))),
            },
            GenerationPayload::Unrecognized(value) => Err(LlmError::UnexpectedFormat(value)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HfErrorBody {
    error: String,
}

/// Client for the Hugging Face Inference text-generation endpoint.
#[derive(Clone)]
pub struct HfInferenceClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HfInferenceClient {
    pub fn new(
        api_base: &str,
        model: &str,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/models/{}", api_base.trim_end_matches('/'), model),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for HfInferenceClient {
    /// Single POST, no retries. Transport and API failures propagate.
    async fn generate(&self, prompt: &str, max_new_tokens: u32) -> Result<String, LlmError> {
        let request_body = GenerationRequest {
            inputs: prompt,
            parameters: GenerationParameters {
                max_new_tokens,
                return_full_text: false,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<HfErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        let payload: GenerationPayload = serde_json::from_slice(&body).map_err(|e| {
            debug!("Generation body is not JSON: {e}");
            LlmError::UnexpectedFormat(serde_json::Value::String(
                String::from_utf8_lossy(&body).into_owned(),
            ))
        })?;
        let text = payload.into_text()?;

        debug!(
            "Generation succeeded: max_new_tokens={}, output_chars={}",
            max_new_tokens,
            text.len()
        );

        Ok(text)
    }
}
