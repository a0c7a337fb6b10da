use crate::NormalizationProfile;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Local models may download weights on first load.
pub const DEFAULT_LOAD_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_HASHING_DIMENSION: usize = 384;

/// Sentence-transformers models that can be run in-process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocalModel {
    #[serde(rename = "all-MiniLM-L6-v2")]
    AllMiniLmL6V2,
    #[serde(rename = "paraphrase-multilingual-MiniLM-L12-v2")]
    ParaphraseMultilingualMiniLmL12V2,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    Local {
        model: LocalModel,
        #[serde(default)]
        cache_dir: Option<String>,
        #[serde(default = "default_load_timeout_secs")]
        load_timeout_secs: u64,
    },
    #[serde(rename = "openai")]
    OpenAi {
        model: String,
        #[serde(default = "default_openai_base_url")]
        base_url: String,
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    Hashing {
        #[serde(default = "default_hashing_dimension")]
        dimension: usize,
    },
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendConfig::Local {
                model,
                cache_dir,
                load_timeout_secs,
            } => f
                .debug_struct("Local")
                .field("model", model)
                .field("cache_dir", cache_dir)
                .field("load_timeout_secs", load_timeout_secs)
                .finish(),
            BackendConfig::OpenAi {
                model,
                base_url,
                api_key,
                timeout_secs,
            } => f
                .debug_struct("OpenAi")
                .field("model", model)
                .field("base_url", base_url)
                .field("api_key", &api_key.as_ref().map(|_| "<redacted>"))
                .field("timeout_secs", timeout_secs)
                .finish(),
            BackendConfig::Hashing { dimension } => f
                .debug_struct("Hashing")
                .field("dimension", dimension)
                .finish(),
        }
    }
}

impl BackendConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            BackendConfig::Local { .. } => "local",
            BackendConfig::OpenAi { .. } => "openai",
            BackendConfig::Hashing { .. } => "hashing",
        }
    }

    /// Local sentence-transformers checkpoints were tuned on lower-cased input;
    /// everything else receives text with its case intact.
    pub fn default_normalization(&self) -> NormalizationProfile {
        match self {
            BackendConfig::Local { .. } => NormalizationProfile::LowerCase,
            BackendConfig::OpenAi { .. } | BackendConfig::Hashing { .. } => {
                NormalizationProfile::CasePreserving
            }
        }
    }
}

/// One configured provider: the name callers select it by and how to build it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSpec {
    pub name: String,
    #[serde(default)]
    pub normalization: Option<NormalizationProfile>,
    pub backend: BackendConfig,
}

impl ProviderSpec {
    pub fn new(name: &str, backend: BackendConfig) -> Self {
        Self {
            name: name.to_string(),
            normalization: None,
            backend,
        }
    }

    pub fn with_normalization(mut self, profile: NormalizationProfile) -> Self {
        self.normalization = Some(profile);
        self
    }

    pub fn normalization(&self) -> NormalizationProfile {
        self.normalization
            .unwrap_or_else(|| self.backend.default_normalization())
    }
}

/// Providers available when no configuration overrides the list.
pub fn default_catalog() -> Vec<ProviderSpec> {
    vec![
        ProviderSpec::new(
            "sentence-transformers/all-MiniLM-L6-v2",
            BackendConfig::Local {
                model: LocalModel::AllMiniLmL6V2,
                cache_dir: None,
                load_timeout_secs: DEFAULT_LOAD_TIMEOUT_SECS,
            },
        ),
        ProviderSpec::new(
            "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2",
            BackendConfig::Local {
                model: LocalModel::ParaphraseMultilingualMiniLmL12V2,
                cache_dir: None,
                load_timeout_secs: DEFAULT_LOAD_TIMEOUT_SECS,
            },
        ),
        ProviderSpec::new(
            "openai/text-embedding-ada-002",
            BackendConfig::OpenAi {
                model: "text-embedding-ada-002".to_string(),
                base_url: default_openai_base_url(),
                api_key: None,
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
        ),
        ProviderSpec::new(
            "hashing/bow-384",
            BackendConfig::Hashing {
                dimension: DEFAULT_HASHING_DIMENSION,
            },
        ),
    ]
}

fn default_openai_base_url() -> String {
    DEFAULT_OPENAI_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_load_timeout_secs() -> u64 {
    DEFAULT_LOAD_TIMEOUT_SECS
}

fn default_hashing_dimension() -> usize {
    DEFAULT_HASHING_DIMENSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_config_reads_tagged_json() {
        let spec: ProviderSpec = serde_json::from_value(serde_json::json!({
            "name": "remote",
            "backend": { "kind": "openai", "model": "text-embedding-3-small" }
        }))
        .unwrap();
        match &spec.backend {
            BackendConfig::OpenAi {
                base_url,
                timeout_secs,
                api_key,
                ..
            } => {
                assert_eq!(base_url, DEFAULT_OPENAI_BASE_URL);
                assert_eq!(*timeout_secs, DEFAULT_TIMEOUT_SECS);
                assert!(api_key.is_none());
            }
            other => panic!("unexpected backend {other:?}"),
        }
        assert_eq!(spec.normalization(), NormalizationProfile::CasePreserving);
    }

    #[test]
    fn local_models_default_to_lower_case() {
        let spec: ProviderSpec = serde_json::from_value(serde_json::json!({
            "name": "mini",
            "backend": { "kind": "local", "model": "all-MiniLM-L6-v2" }
        }))
        .unwrap();
        assert_eq!(spec.normalization(), NormalizationProfile::LowerCase);
        match &spec.backend {
            BackendConfig::Local {
                cache_dir,
                load_timeout_secs,
                ..
            } => {
                assert!(cache_dir.is_none());
                assert_eq!(*load_timeout_secs, DEFAULT_LOAD_TIMEOUT_SECS);
            }
            other => panic!("unexpected backend {other:?}"),
        }

        let spec = spec.with_normalization(NormalizationProfile::CasePreserving);
        assert_eq!(spec.normalization(), NormalizationProfile::CasePreserving);
    }

    #[test]
    fn debug_output_hides_the_api_key() {
        let spec = ProviderSpec::new(
            "remote",
            BackendConfig::OpenAi {
                model: "text-embedding-ada-002".into(),
                base_url: DEFAULT_OPENAI_BASE_URL.into(),
                api_key: Some("sk-live-secret".into()),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
        );
        let rendered = format!("{spec:?}");
        assert!(!rendered.contains("sk-live-secret"), "{rendered}");
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("text-embedding-ada-002"));
    }

    #[test]
    fn default_catalog_names_are_unique() {
        let catalog = default_catalog();
        let mut names: Vec<&str> = catalog.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), catalog.len());
    }
}
