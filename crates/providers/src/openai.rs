use crate::{EmbedResponse, Embedding, EmbeddingProvider, ProviderError};
use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub embedding_model: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("base_url", &self.base_url)
            .field("embedding_model", &self.embedding_model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Hosted embeddings API. One POST per batch, no retries.
#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client,
    cfg: Arc<OpenAiConfig>,
}

impl OpenAiProvider {
    pub fn new(cfg: OpenAiConfig) -> Result<Self, ProviderError> {
        if cfg.api_key.trim().is_empty() {
            return Err(ProviderError::Initialization(
                "missing API key (set OPENAI_API_KEY)".into(),
            ));
        }
        if cfg.timeout.is_zero() {
            return Err(ProviderError::Initialization(
                "request timeout must be greater than zero".into(),
            ));
        }
        let client = Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| ProviderError::Initialization(e.to_string()))?;
        Ok(Self {
            client,
            cfg: Arc::new(cfg),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/embeddings", self.cfg.base_url.trim_end_matches('/'))
    }
}

#[derive(Deserialize)]
struct EmbeddingApiResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: Option<usize>,
    embedding: Embedding,
}

/// Put the returned vectors back into input order and check none are missing.
fn into_vectors(
    parsed: EmbeddingApiResponse,
    expected: usize,
) -> Result<Vec<Embedding>, ProviderError> {
    let mut data = parsed.data;
    if data.len() != expected {
        return Err(ProviderError::MalformedResponse(format!(
            "expected {} embeddings, got {}",
            expected,
            data.len()
        )));
    }
    if data.iter().all(|d| d.index.is_some()) {
        data.sort_by_key(|d| d.index);
        if data.iter().enumerate().any(|(i, d)| d.index != Some(i)) {
            return Err(ProviderError::MalformedResponse(
                "embedding indices are not a permutation of the input".into(),
            ));
        }
    }
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

#[async_trait::async_trait]
impl EmbeddingProvider for OpenAiProvider {
    async fn embed(&self, texts: &[String]) -> Result<EmbedResponse, ProviderError> {
        #[derive(serde::Serialize)]
        struct EmbedRequest<'a> {
            model: &'a str,
            input: &'a [String],
        }

        if texts.is_empty() {
            return Ok(EmbedResponse { vectors: vec![] });
        }

        let body = EmbedRequest {
            model: &self.cfg.embedding_model,
            input: texts,
        };

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.cfg.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::RequestFailed(format!("timed out after {:?}", self.cfg.timeout))
                } else {
                    ProviderError::RequestFailed(e.to_string())
                }
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.bytes().await.unwrap_or(Bytes::from_static(b""));
            return Err(ProviderError::RequestFailed(format!(
                "status {} body {}",
                status,
                String::from_utf8_lossy(&body)
            )));
        }

        let parsed: EmbeddingApiResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        Ok(EmbedResponse {
            vectors: into_vectors(parsed, texts.len())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: &str, timeout: Duration) -> OpenAiConfig {
        OpenAiConfig {
            api_key: api_key.to_string(),
            base_url: "http://localhost:9/".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            timeout,
        }
    }

    #[test]
    fn construction_requires_key_and_timeout() {
        assert!(matches!(
            OpenAiProvider::new(config("  ", Duration::from_secs(5))),
            Err(ProviderError::Initialization(_))
        ));
        assert!(matches!(
            OpenAiProvider::new(config("sk-test", Duration::ZERO)),
            Err(ProviderError::Initialization(_))
        ));
        let provider = OpenAiProvider::new(config("sk-test", Duration::from_secs(5))).unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:9/v1/embeddings");
    }

    #[test]
    fn debug_output_hides_the_key() {
        let rendered = format!("{:?}", config("sk-secret", Duration::from_secs(1)));
        assert!(!rendered.contains("sk-secret"));
    }

    #[test]
    fn vectors_are_reordered_by_index() {
        let parsed: EmbeddingApiResponse = serde_json::from_value(serde_json::json!({
            "data": [
                { "index": 1, "embedding": [0.0, 1.0] },
                { "index": 0, "embedding": [1.0, 0.0] }
            ]
        }))
        .unwrap();
        let vectors = into_vectors(parsed, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn short_responses_are_rejected() {
        let parsed: EmbeddingApiResponse = serde_json::from_value(serde_json::json!({
            "data": [ { "index": 0, "embedding": [1.0] } ]
        }))
        .unwrap();
        assert!(matches!(
            into_vectors(parsed, 2),
            Err(ProviderError::MalformedResponse(_))
        ));
    }

    #[test]
    fn duplicate_indices_are_rejected() {
        let parsed: EmbeddingApiResponse = serde_json::from_value(serde_json::json!({
            "data": [
                { "index": 0, "embedding": [1.0] },
                { "index": 0, "embedding": [2.0] }
            ]
        }))
        .unwrap();
        assert!(matches!(
            into_vectors(parsed, 2),
            Err(ProviderError::MalformedResponse(_))
        ));
    }
}
