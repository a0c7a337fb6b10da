//! All-pairs cosine similarity.

use crate::error::AnalysisError;
use serde::Serialize;

/// Square, symmetric grid of cosine similarities; row `i` belongs to the
/// `i`-th text of the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SimilarityMatrix {
    rows: Vec<Vec<f32>>,
}

impl SimilarityMatrix {
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.rows[i][j]
    }

    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }
}

/// Cosine similarity accumulated in f64; 0.0 when either vector has zero norm.
fn cosine(a: &[f32], norm_a: f64, b: &[f32], norm_b: f64) -> f32 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let dot: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum();
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0) as f32
}

fn norm(v: &[f32]) -> f64 {
    v.iter().map(|x| f64::from(*x) * f64::from(*x)).sum::<f64>().sqrt()
}

/// Build the matrix for a batch of equally sized embeddings.
///
/// Only the upper triangle is computed; the lower triangle is a mirror, so
/// the result is exactly symmetric. The diagonal is 1.0 for non-zero vectors
/// and 0.0 for zero vectors.
pub fn build(embeddings: &[Vec<f32>]) -> Result<SimilarityMatrix, AnalysisError> {
    let n = embeddings.len();
    if let Some(first) = embeddings.first() {
        let expected = first.len();
        if let Some((index, v)) = embeddings
            .iter()
            .enumerate()
            .find(|(_, v)| v.len() != expected)
        {
            return Err(AnalysisError::DimensionMismatch {
                index,
                expected,
                found: v.len(),
            });
        }
    }

    let norms: Vec<f64> = embeddings.iter().map(|v| norm(v)).collect();
    let mut rows = vec![vec![0f32; n]; n];
    for i in 0..n {
        rows[i][i] = if norms[i] == 0.0 { 0.0 } else { 1.0 };
        for j in (i + 1)..n {
            let s = cosine(&embeddings[i], norms[i], &embeddings[j], norms[j]);
            rows[i][j] = s;
            rows[j][i] = s;
        }
    }
    Ok(SimilarityMatrix { rows })
}
