//! Embedding provider client.
//!
//! The search core depends only on [`EmbeddingProvider`]; [`EmbeddingService`] is the
//! HTTP adapter for OpenAI-compatible `/embeddings` endpoints.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::EmbeddingSettings;
use crate::error::{Error, Result};

/// A fixed-length embedding vector.
pub type Embedding = Vec<f32>;

/// Source of query embeddings.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier sent with each request.
    fn model(&self) -> &str;

    /// Expected vector length.
    fn dimensions(&self) -> usize;

    /// Embed a single text.
    ///
    /// Any transport failure, non-success status or malformed payload is reported
    /// as [`Error::EmbeddingUnavailable`].
    async fn embed(&self, text: &str) -> Result<Embedding>;
}

/// Configuration for [`EmbeddingService`].
#[derive(Debug, Clone)]
pub struct EmbeddingServiceConfig {
    pub endpoint: String,
    pub model: String,
    pub dimensions: usize,
    pub timeout: Duration,
}

impl From<&EmbeddingSettings> for EmbeddingServiceConfig {
    fn from(settings: &EmbeddingSettings) -> Self {
        Self {
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            dimensions: settings.dimensions,
            timeout: Duration::from_millis(settings.timeout_ms),
        }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// OpenAI-compatible embedding client.
#[derive(Debug, Clone)]
pub struct EmbeddingService {
    client: Client,
    config: EmbeddingServiceConfig,
    api_key: String,
}

impl EmbeddingService {
    pub fn new(config: EmbeddingServiceConfig, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::ConfigurationMissing(
                "embedding API key cannot be empty".into(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn url(&self) -> String {
        format!("{}/embeddings", self.config.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl EmbeddingProvider for EmbeddingService {
    fn model(&self) -> &str {
        &self.config.model
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let response = self
            .client
            .post(self.url())
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.config.model,
                input: text,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::EmbeddingUnavailable(format!(
                        "request timed out after {}ms",
                        self.config.timeout.as_millis()
                    ))
                } else {
                    Error::EmbeddingUnavailable(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::EmbeddingUnavailable(format!(
                "provider returned {}: {}",
                status, body
            )));
        }

        let payload: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::EmbeddingUnavailable(format!("malformed payload: {}", e)))?;

        let embedding = payload
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| Error::EmbeddingUnavailable("response contained no embedding".into()))?;

        if embedding.len() != self.config.dimensions {
            return Err(Error::EmbeddingUnavailable(format!(
                "expected {} dimensions, got {}",
                self.config.dimensions,
                embedding.len()
            )));
        }

        debug!(model = %self.config.model, dims = embedding.len(), "Query embedded");
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn service(endpoint: String, dimensions: usize) -> EmbeddingService {
        EmbeddingService::new(
            EmbeddingServiceConfig {
                endpoint,
                model: "text-embedding-3-small".into(),
                dimensions,
                timeout: Duration::from_secs(5),
            },
            "sk-test",
        )
        .unwrap()
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let config = EmbeddingServiceConfig::from(&EmbeddingSettings::default());
        let result = EmbeddingService::new(config, "  ");
        assert!(matches!(result, Err(Error::ConfigurationMissing(_))));
    }

    #[tokio::test]
    async fn test_embed_sends_model_and_literal_input() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/embeddings")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::Json(json!({
                "model": "text-embedding-3-small",
                "input": "voice AI for real estate",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"embedding":[0.1,0.2,0.3]}]}"#)
            .create_async()
            .await;

        let embedding = service(server.url(), 3)
            .embed("voice AI for real estate")
            .await
            .unwrap();

        assert_eq!(embedding, vec![0.1, 0.2, 0.3]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_embedding_unavailable() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/embeddings")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let err = service(server.url(), 3).embed("crm").await.unwrap_err();
        assert!(matches!(err, Error::EmbeddingUnavailable(_)));
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn test_missing_vector_field() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"index":0}]}"#)
            .create_async()
            .await;

        let err = service(server.url(), 3).embed("crm").await.unwrap_err();
        assert!(matches!(err, Error::EmbeddingUnavailable(_)));
    }

    #[tokio::test]
    async fn test_empty_data_array() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[]}"#)
            .create_async()
            .await;

        let err = service(server.url(), 3).embed("crm").await.unwrap_err();
        assert!(err.to_string().contains("no embedding"));
    }

    #[tokio::test]
    async fn test_dimension_mismatch() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"embedding":[0.1,0.2]}]}"#)
            .create_async()
            .await;

        let err = service(server.url(), 3).embed("crm").await.unwrap_err();
        assert!(err.to_string().contains("expected 3 dimensions"));
    }

    #[tokio::test]
    async fn test_unreachable_provider() {
        // Nothing listens on port 9 locally
        let err = service("http://127.0.0.1:9".into(), 3)
            .embed("crm")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmbeddingUnavailable(_)));
    }
}
