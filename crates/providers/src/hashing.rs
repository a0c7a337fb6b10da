//! Deterministic offline backend: signed feature hashing over word tokens.
//!
//! Texts with the same multiset of alphanumeric tokens map to the same unit
//! vector, so punctuation and case differences disappear. No model, no I/O.

use crate::{EmbedResponse, Embedding, EmbeddingProvider, ProviderError};

#[derive(Debug, Clone)]
pub struct HashingProvider {
    dimension: usize,
}

impl HashingProvider {
    pub fn new(dimension: usize) -> Result<Self, ProviderError> {
        if dimension == 0 {
            return Err(ProviderError::Initialization(
                "hashing dimension must be greater than zero".into(),
            ));
        }
        Ok(Self { dimension })
    }

    pub fn embed_one(&self, text: &str) -> Embedding {
        let mut vector = vec![0f32; self.dimension];
        for token in tokens(text) {
            let digest = blake3::hash(token.as_bytes());
            let bytes = digest.as_bytes();
            let mut word = [0u8; 8];
            word.copy_from_slice(&bytes[..8]);
            let bucket = (u64::from_le_bytes(word) % self.dimension as u64) as usize;
            let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        unit_length(vector)
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Scale to unit length; a zero vector is returned unchanged.
fn unit_length(mut vector: Embedding) -> Embedding {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut vector {
            *x /= norm;
        }
    }
    vector
}

#[async_trait::async_trait]
impl EmbeddingProvider for HashingProvider {
    async fn embed(&self, texts: &[String]) -> Result<EmbedResponse, ProviderError> {
        Ok(EmbedResponse {
            vectors: texts.iter().map(|t| self.embed_one(t)).collect(),
        })
    }
}
