use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EmbedError, Embedder, Embedding};

#[derive(Debug, Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a str,
}

/// Sentence-transformers models answer with a pooled vector; some deployments
/// wrap it in a batch dimension.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeatureExtractionResponse {
    Flat(Vec<f32>),
    Nested(Vec<Vec<f32>>),
}

#[derive(Debug, Deserialize)]
struct HfErrorBody {
    error: String,
}

/// Embeddings from the Hugging Face feature-extraction pipeline.
#[derive(Clone)]
pub struct RemoteEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl RemoteEmbedder {
    pub fn new(
        api_base: &str,
        model: &str,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, EmbedError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/pipeline/feature-extraction/{}",
                api_base.trim_end_matches('/'),
                model
            ),
            model: model.to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl Embedder for RemoteEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbedError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&FeatureExtractionRequest { inputs: text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<HfErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(EmbedError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let vector = match response.json::<FeatureExtractionResponse>().await? {
            FeatureExtractionResponse::Flat(v) => v,
            FeatureExtractionResponse::Nested(rows) => {
                rows.into_iter().next().ok_or(EmbedError::Empty)?
            }
        };

        if vector.is_empty() {
            return Err(EmbedError::Empty);
        }

        debug!("Remote embedding: model={}, dim={}", self.model, vector.len());
        Ok(vector)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn embedder_for(server: &MockServer) -> RemoteEmbedder {
        RemoteEmbedder::new(
            &server.uri(),
            "sentence-transformers/all-MiniLM-L6-v2",
            "hf_test".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_flat_vector_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(
                "/pipeline/feature-extraction/sentence-transformers/all-MiniLM-L6-v2",
            ))
            .and(body_json(json!({"inputs": "Rust engineer"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([0.25, -0.5, 1.0])))
            .mount(&server)
            .await;

        let vector = embedder_for(&server).embed("Rust engineer").await.unwrap();
        assert_eq!(vector, vec![0.25, -0.5, 1.0]);
    }

    #[tokio::test]
    async fn test_nested_vector_response_takes_first_row() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([[1.0, 2.0], [3.0, 4.0]])),
            )
            .mount(&server)
            .await;

        let vector = embedder_for(&server).embed("text").await.unwrap();
        assert_eq!(vector, vec![1.0, 2.0]);
    }

    #[tokio::test]
    async fn test_empty_response_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let result = embedder_for(&server).embed("text").await;
        assert!(matches!(result, Err(EmbedError::Empty)));
    }

    #[tokio::test]
    async fn test_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(503)
                    .set_body_json(json!({"error": "Model is currently loading"})),
            )
            .mount(&server)
            .await;

        match embedder_for(&server).embed("text").await {
            Err(EmbedError::Api { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "Model is currently loading");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }
}
