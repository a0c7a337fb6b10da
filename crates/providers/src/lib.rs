//! Embedding backends and the registry that resolves them by name.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod hashing;
pub mod local;
pub mod openai;
pub mod registry;

pub use config::{BackendConfig, LocalModel, ProviderSpec};
pub use registry::{BackendFactory, ProviderFactory, ProviderHandle, ProviderRegistry};

/// A fixed-length vector produced by one provider.
pub type Embedding = Vec<f32>;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("provider {provider} unavailable: {reason}")]
    Unavailable { provider: String, reason: String },
    #[error("initialization failed: {0}")]
    Initialization(String),
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedResponse {
    pub vectors: Vec<Embedding>,
}

/// Text canonicalization convention a provider expects its input in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationProfile {
    /// Whitespace collapse only.
    #[default]
    CasePreserving,
    /// Whitespace collapse followed by lower-casing.
    LowerCase,
}

#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed every text of the batch in one backend call, preserving order.
    async fn embed(&self, texts: &[String]) -> Result<EmbedResponse, ProviderError>;
}
