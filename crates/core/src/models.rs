use crate::similarity::SimilarityMatrix;
use serde::{Deserialize, Serialize};

/// Default similarity at or above which a pair is reported as a clone.
pub const DEFAULT_THRESHOLD: f32 = 0.8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextItem {
    pub id: String,
    pub content: String,
}

impl TextItem {
    pub fn new(id: &str, content: &str) -> Self {
        Self {
            id: id.to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub items: Vec<TextItem>,
    pub provider: String,
    pub threshold: f32,
}

impl AnalysisRequest {
    pub fn new(items: Vec<TextItem>, provider: &str) -> Self {
        Self {
            items,
            provider: provider.to_string(),
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }
}

/// One unordered pair of texts, produced only by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityPair {
    id1: String,
    id2: String,
    similarity: f32,
    is_clone: bool,
}

impl SimilarityPair {
    pub(crate) fn new(id1: &str, id2: &str, similarity: f32, is_clone: bool) -> Self {
        Self {
            id1: id1.to_string(),
            id2: id2.to_string(),
            similarity,
            is_clone,
        }
    }

    pub fn id1(&self) -> &str {
        &self.id1
    }

    pub fn id2(&self) -> &str {
        &self.id2
    }

    pub fn similarity(&self) -> f32 {
        self.similarity
    }

    pub fn is_clone(&self) -> bool {
        self.is_clone
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub similarity_matrix: SimilarityMatrix,
    pub text_ids: Vec<String>,
    pub pairs: Vec<SimilarityPair>,
    pub provider_used: String,
}

impl AnalysisResult {
    pub fn clones(&self) -> impl Iterator<Item = &SimilarityPair> {
        self.pairs.iter().filter(|p| p.is_clone())
    }
}
