use anyhow::{Context, Result};
use detector_core::config::AnalysisConfig;
use detector_core::{AnalysisRequest, TextItem};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// Request body accepted by `detect`: the texts plus optional model and
/// threshold.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestDocument {
    pub texts: Vec<TextItem>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub threshold: Option<f32>,
}

impl RequestDocument {
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("request is not a valid JSON document")
    }

    /// Read from a file, or stdin when `path` is `-`.
    pub fn read(path: &Path) -> Result<Self> {
        let raw = if path == Path::new("-") {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading request from stdin")?;
            buf
        } else {
            std::fs::read_to_string(path)
                .with_context(|| format!("reading request {}", path.display()))?
        };
        Self::parse(&raw)
    }

    /// Command-line flags win over the document, which wins over config.
    pub fn into_request(
        self,
        defaults: &AnalysisConfig,
        model: Option<&str>,
        threshold: Option<f32>,
    ) -> AnalysisRequest {
        let provider = model
            .map(str::to_string)
            .or(self.model)
            .unwrap_or_else(|| defaults.default_provider.clone());
        let threshold = threshold
            .or(self.threshold)
            .unwrap_or(defaults.default_threshold);
        AnalysisRequest::new(self.texts, &provider).with_threshold(threshold)
    }
}
