use crate::error::AnalysisError;
use crate::models::SimilarityPair;
use crate::similarity::SimilarityMatrix;

pub fn validate_threshold(threshold: f32) -> Result<(), AnalysisError> {
    if (-1.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(AnalysisError::InvalidThreshold(threshold))
    }
}

/// Emit one pair per `i < j` in row-major order. A pair is a clone when its
/// similarity is greater than or equal to `threshold`.
pub fn classify(
    matrix: &SimilarityMatrix,
    ids: &[String],
    threshold: f32,
) -> Result<Vec<SimilarityPair>, AnalysisError> {
    validate_threshold(threshold)?;
    let n = matrix.size();
    if ids.len() != n {
        return Err(AnalysisError::IdCountMismatch {
            ids: ids.len(),
            size: n,
        });
    }

    let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            let similarity = matrix.get(i, j);
            pairs.push(SimilarityPair::new(
                &ids[i],
                &ids[j],
                similarity,
                similarity >= threshold,
            ));
        }
    }
    Ok(pairs)
}
