//! Name-keyed registry of embedding backends.
//!
//! The set of names is fixed when the registry is built. Each name owns its
//! own once-cell, so a slow cold start of one model never blocks another, and
//! concurrent first use of the same name constructs the backend exactly once.
//! A failed or cancelled construction leaves the cell empty.

use crate::config::{BackendConfig, ProviderSpec};
use crate::hashing::HashingProvider;
use crate::local::LocalProvider;
use crate::openai::{OpenAiConfig, OpenAiProvider};
use crate::{Embedding, EmbeddingProvider, NormalizationProfile, ProviderError};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Builds a backend instance for a configured provider.
#[async_trait::async_trait]
pub trait ProviderFactory: Send + Sync {
    async fn build(&self, spec: &ProviderSpec)
        -> Result<Arc<dyn EmbeddingProvider>, ProviderError>;
}

/// Maps each [`BackendConfig`] variant to its concrete backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct BackendFactory;

#[async_trait::async_trait]
impl ProviderFactory for BackendFactory {
    async fn build(
        &self,
        spec: &ProviderSpec,
    ) -> Result<Arc<dyn EmbeddingProvider>, ProviderError> {
        match &spec.backend {
            BackendConfig::Local {
                model,
                cache_dir,
                load_timeout_secs,
            } => {
                let provider = LocalProvider::load(
                    *model,
                    cache_dir.as_ref().map(PathBuf::from),
                    Duration::from_secs(*load_timeout_secs),
                )
                .await?;
                Ok(Arc::new(provider))
            }
            BackendConfig::OpenAi {
                model,
                base_url,
                api_key,
                timeout_secs,
            } => {
                let provider = OpenAiProvider::new(OpenAiConfig {
                    api_key: api_key.clone().unwrap_or_default(),
                    base_url: base_url.clone(),
                    embedding_model: model.clone(),
                    timeout: Duration::from_secs(*timeout_secs),
                })?;
                Ok(Arc::new(provider))
            }
            BackendConfig::Hashing { dimension } => Ok(Arc::new(HashingProvider::new(*dimension)?)),
        }
    }
}

/// A resolved provider: cheap to clone, shares the underlying backend.
#[derive(Clone)]
pub struct ProviderHandle {
    name: String,
    normalization: NormalizationProfile,
    backend: Arc<dyn EmbeddingProvider>,
}

impl ProviderHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn normalization(&self) -> NormalizationProfile {
        self.normalization
    }

    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>, ProviderError> {
        Ok(self.backend.embed(texts).await?.vectors)
    }
}

impl fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("name", &self.name)
            .field("normalization", &self.normalization)
            .finish_non_exhaustive()
    }
}

struct Slot {
    spec: ProviderSpec,
    cell: OnceCell<ProviderHandle>,
}

pub struct ProviderRegistry {
    order: Vec<String>,
    slots: HashMap<String, Slot>,
    factory: Arc<dyn ProviderFactory>,
}

impl ProviderRegistry {
    pub fn new(specs: Vec<ProviderSpec>) -> Self {
        Self::with_factory(specs, Arc::new(BackendFactory))
    }

    pub fn with_factory(specs: Vec<ProviderSpec>, factory: Arc<dyn ProviderFactory>) -> Self {
        let mut order = Vec::with_capacity(specs.len());
        let mut slots = HashMap::with_capacity(specs.len());
        for spec in specs {
            if slots.contains_key(&spec.name) {
                warn!(provider = %spec.name, "duplicate provider name ignored");
                continue;
            }
            order.push(spec.name.clone());
            slots.insert(
                spec.name.clone(),
                Slot {
                    spec,
                    cell: OnceCell::new(),
                },
            );
        }
        Self {
            order,
            slots,
            factory,
        }
    }

    /// Configured provider names, in configuration order.
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn spec(&self, name: &str) -> Option<&ProviderSpec> {
        self.slots.get(name).map(|slot| &slot.spec)
    }

    /// Whether the backend for `name` has been constructed.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.slots
            .get(name)
            .map(|slot| slot.cell.initialized())
            .unwrap_or(false)
    }

    pub async fn resolve(&self, name: &str) -> Result<ProviderHandle, ProviderError> {
        let slot = self
            .slots
            .get(name)
            .ok_or_else(|| ProviderError::UnknownProvider(name.to_string()))?;

        let handle = slot
            .cell
            .get_or_try_init(|| async {
                info!(
                    provider = name,
                    kind = slot.spec.backend.kind(),
                    "initializing embedding provider"
                );
                let backend = self.factory.build(&slot.spec).await.map_err(|e| {
                    warn!(provider = name, error = %e, "embedding provider failed to initialize");
                    match e {
                        ProviderError::Unavailable { .. } => e,
                        other => ProviderError::Unavailable {
                            provider: name.to_string(),
                            reason: other.to_string(),
                        },
                    }
                })?;
                Ok::<_, ProviderError>(ProviderHandle {
                    name: name.to_string(),
                    normalization: slot.spec.normalization(),
                    backend,
                })
            })
            .await?;

        Ok(handle.clone())
    }

    pub async fn embed(
        &self,
        handle: &ProviderHandle,
        texts: &[String],
    ) -> Result<Vec<Embedding>, ProviderError> {
        handle.embed(texts).await
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.order)
            .finish_non_exhaustive()
    }
}
