use crate::models::DEFAULT_THRESHOLD;
use anyhow::Context;
use providers::config::default_catalog;
use providers::{BackendConfig, ProviderSpec};
use serde::{Deserialize, Serialize};

/// Prefix for environment overrides, e.g. `DETECTOR__ANALYSIS__DEFAULT_THRESHOLD=0.9`.
pub const ENV_PREFIX: &str = "DETECTOR";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default = "default_catalog")]
    pub providers: Vec<ProviderSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_threshold")]
    pub default_threshold: f32,
    /// Provider used when a request does not name one.
    #[serde(default = "default_provider")]
    pub default_provider: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_threshold: DEFAULT_THRESHOLD,
            default_provider: default_provider(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            providers: default_catalog(),
        }
    }
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

fn default_provider() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_string()
}

/// Credentials and endpoints the surrounding process exposes as plain
/// environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: std::env::var("OPENAI_API_KEY").ok().filter(|v| !v.is_empty()),
            openai_base_url: std::env::var("OPENAI_BASE_URL").ok().filter(|v| !v.is_empty()),
        }
    }
}

impl AppConfig {
    /// Fill `openai` backends that have no key (or base URL) in the file.
    pub fn apply_env(&mut self, env: &EnvOverrides) {
        for spec in &mut self.providers {
            if let BackendConfig::OpenAi {
                api_key, base_url, ..
            } = &mut spec.backend
            {
                if api_key.is_none() {
                    api_key.clone_from(&env.openai_api_key);
                }
                if let Some(url) = &env.openai_base_url {
                    if base_url.as_str() == providers::config::DEFAULT_OPENAI_BASE_URL {
                        base_url.clone_from(url);
                    }
                }
            }
        }
    }
}

/// Load configuration from `path` (or `config/default` when present), then
/// `DETECTOR__*` environment variables, then the OpenAI environment contract.
pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut app = load_with(path, config::Environment::with_prefix(ENV_PREFIX))?;
    app.apply_env(&EnvOverrides::from_env());
    Ok(app)
}

fn load_with(path: Option<&str>, env: config::Environment) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(env.separator("__").try_parsing(true));
    let cfg = settings.build().context("reading configuration")?;
    cfg.try_deserialize().context("invalid configuration")
}
