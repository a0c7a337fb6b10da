//! Request orchestration: validate, embed once, score once.

use crate::classifier;
use crate::config::AppConfig;
use crate::error::AnalysisError;
use crate::models::{AnalysisRequest, AnalysisResult, TextItem};
use crate::normalizer::normalize;
use crate::similarity;
use providers::{Embedding, ProviderRegistry};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Embedding,
    Scoring,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Validating => "validating",
            Stage::Embedding => "embedding",
            Stage::Scoring => "scoring",
        };
        f.write_str(label)
    }
}

pub fn build_registry(config: &AppConfig) -> ProviderRegistry {
    ProviderRegistry::new(config.providers.clone())
}

/// Reject anything that cannot be compared before a backend is touched.
pub fn validate(request: &AnalysisRequest) -> Result<(), AnalysisError> {
    if request.items.len() < 2 {
        return Err(AnalysisError::InsufficientBatchSize {
            found: request.items.len(),
        });
    }
    let mut seen = HashSet::with_capacity(request.items.len());
    for item in &request.items {
        if item.content.trim().is_empty() {
            return Err(AnalysisError::EmptyInput {
                id: item.id.clone(),
            });
        }
        if !seen.insert(item.id.as_str()) {
            return Err(AnalysisError::DuplicateId {
                id: item.id.clone(),
            });
        }
    }
    classifier::validate_threshold(request.threshold)
}

async fn embed_items(
    items: &[TextItem],
    provider: &str,
    registry: &ProviderRegistry,
) -> Result<Vec<Embedding>, AnalysisError> {
    let handle = registry
        .resolve(provider)
        .await
        .map_err(|e| AnalysisError::from_resolve(provider, e))?;

    let profile = handle.normalization();
    let texts: Vec<String> = items
        .iter()
        .map(|item| normalize(&item.content, profile))
        .collect();

    let vectors = registry
        .embed(&handle, &texts)
        .await
        .map_err(|e| AnalysisError::from_embed(provider, texts.len(), e))?;

    if vectors.len() != texts.len() {
        return Err(AnalysisError::EmbeddingBackend {
            provider: provider.to_string(),
            batch_size: texts.len(),
            cause: format!("backend returned {} vectors", vectors.len()),
        });
    }
    if let Some(index) = vectors
        .iter()
        .position(|v| v.iter().any(|x| !x.is_finite()))
    {
        return Err(AnalysisError::EmbeddingBackend {
            provider: provider.to_string(),
            batch_size: texts.len(),
            cause: format!("vector {index} has non-finite components"),
        });
    }
    Ok(vectors)
}

/// Run one analysis request end to end. Any failure aborts the request; no
/// partial matrix or pair list is returned.
pub async fn analyze(
    request: AnalysisRequest,
    registry: &ProviderRegistry,
) -> Result<AnalysisResult, AnalysisError> {
    let batch = request.items.len();
    debug!(stage = %Stage::Validating, batch, provider = %request.provider, "analysis stage");
    validate(&request)?;

    debug!(stage = %Stage::Embedding, batch, provider = %request.provider, "analysis stage");
    let embeddings = embed_items(&request.items, &request.provider, registry).await?;

    debug!(stage = %Stage::Scoring, batch, provider = %request.provider, "analysis stage");
    let similarity_matrix = similarity::build(&embeddings)?;
    let text_ids: Vec<String> = request.items.into_iter().map(|item| item.id).collect();
    let pairs = classifier::classify(&similarity_matrix, &text_ids, request.threshold)?;

    Ok(AnalysisResult {
        similarity_matrix,
        text_ids,
        pairs,
        provider_used: request.provider,
    })
}
