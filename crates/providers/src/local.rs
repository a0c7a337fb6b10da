//! In-process sentence-transformers models served by fastembed (ONNX).
//!
//! Loading may download weights on first use; both loading and inference are
//! CPU-bound and run on the blocking pool.

use crate::config::LocalModel;
use crate::{EmbedResponse, EmbeddingProvider, ProviderError};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

fn fastembed_model(model: LocalModel) -> EmbeddingModel {
    match model {
        LocalModel::AllMiniLmL6V2 => EmbeddingModel::AllMiniLML6V2,
        LocalModel::ParaphraseMultilingualMiniLmL12V2 => EmbeddingModel::ParaphraseMLMiniLML12V2,
    }
}

pub struct LocalProvider {
    engine: Arc<Mutex<TextEmbedding>>,
}

impl LocalProvider {
    /// Load `model`, giving up after `load_timeout`. A timed-out loader thread
    /// is left to finish on its own; the result is discarded.
    pub async fn load(
        model: LocalModel,
        cache_dir: Option<PathBuf>,
        load_timeout: Duration,
    ) -> Result<Self, ProviderError> {
        if load_timeout.is_zero() {
            return Err(ProviderError::Initialization(
                "load timeout must be greater than zero".into(),
            ));
        }
        let loader = tokio::task::spawn_blocking(move || {
            let mut options =
                InitOptions::new(fastembed_model(model)).with_show_download_progress(false);
            if let Some(dir) = cache_dir {
                options = options.with_cache_dir(dir);
            }
            TextEmbedding::try_new(options)
        });
        let engine = join_within(load_timeout, &format!("{model:?}"), loader).await?;

        debug!(?model, "local embedding model loaded");
        Ok(Self {
            engine: Arc::new(Mutex::new(engine)),
        })
    }
}

async fn join_within<T, E: fmt::Display>(
    limit: Duration,
    what: &str,
    task: JoinHandle<Result<T, E>>,
) -> Result<T, ProviderError> {
    tokio::time::timeout(limit, task)
        .await
        .map_err(|_| {
            ProviderError::Initialization(format!(
                "loading {what} did not finish within {}s",
                limit.as_secs_f32()
            ))
        })?
        .map_err(|e| ProviderError::Initialization(format!("model loader aborted: {e}")))?
        .map_err(|e| ProviderError::Initialization(format!("failed to load {what}: {e}")))
}

#[async_trait::async_trait]
impl EmbeddingProvider for LocalProvider {
    async fn embed(&self, texts: &[String]) -> Result<EmbedResponse, ProviderError> {
        if texts.is_empty() {
            return Ok(EmbedResponse { vectors: vec![] });
        }
        let engine = Arc::clone(&self.engine);
        let batch = texts.to_vec();
        let vectors = tokio::task::spawn_blocking(move || {
            let mut engine = engine
                .lock()
                .map_err(|_| ProviderError::RequestFailed("embedding engine poisoned".into()))?;
            let vectors = engine
                .embed(batch, None)
                .map_err(|e| ProviderError::RequestFailed(format!("local inference failed: {e}")))?;
            Ok::<_, ProviderError>(vectors)
        })
        .await
        .map_err(|e| ProviderError::RequestFailed(format!("inference task aborted: {e}")))??;

        Ok(EmbedResponse { vectors })
    }
}
