use providers::ProviderError;
use thiserror::Error;

/// Broad classes callers act on: fix the input, retry or reconfigure the
/// provider, or report a bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Provider,
    Internal,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("unsupported provider: {provider}")]
    UnsupportedProvider { provider: String },
    #[error("provider {provider} unavailable: {cause}")]
    ProviderUnavailable { provider: String, cause: String },
    #[error("embedding call to {provider} failed for a batch of {batch_size}: {cause}")]
    EmbeddingBackend {
        provider: String,
        batch_size: usize,
        cause: String,
    },
    #[error("embedding {index} has {found} dimensions, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("{ids} text ids for a {size}x{size} similarity matrix")]
    IdCountMismatch { ids: usize, size: usize },
    #[error("threshold {0} is outside [-1.0, 1.0]")]
    InvalidThreshold(f32),
    #[error("text {id} is empty")]
    EmptyInput { id: String },
    #[error("duplicate text id: {id}")]
    DuplicateId { id: String },
    #[error("at least 2 texts are required, got {found}")]
    InsufficientBatchSize { found: usize },
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::UnsupportedProvider { .. }
            | AnalysisError::InvalidThreshold(_)
            | AnalysisError::EmptyInput { .. }
            | AnalysisError::DuplicateId { .. }
            | AnalysisError::InsufficientBatchSize { .. } => ErrorKind::InvalidInput,
            AnalysisError::ProviderUnavailable { .. } | AnalysisError::EmbeddingBackend { .. } => {
                ErrorKind::Provider
            }
            AnalysisError::DimensionMismatch { .. } | AnalysisError::IdCountMismatch { .. } => {
                ErrorKind::Internal
            }
        }
    }

    /// Only provider-side failures may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Provider
    }

    /// Map a failure from resolving `provider` into the analysis taxonomy.
    pub(crate) fn from_resolve(provider: &str, err: ProviderError) -> Self {
        match err {
            ProviderError::UnknownProvider(name) => AnalysisError::UnsupportedProvider { provider: name },
            ProviderError::Unavailable { provider, reason } => AnalysisError::ProviderUnavailable {
                provider,
                cause: reason,
            },
            other => AnalysisError::ProviderUnavailable {
                provider: provider.to_string(),
                cause: other.to_string(),
            },
        }
    }

    pub(crate) fn from_embed(provider: &str, batch_size: usize, err: ProviderError) -> Self {
        AnalysisError::EmbeddingBackend {
            provider: provider.to_string(),
            batch_size,
            cause: err.to_string(),
        }
    }
}
