use serde::Serialize;

use crate::vocabulary::ClassVocabulary;

/// Default number of ranked predictions returned to callers.
pub const DEFAULT_TOP_K: usize = 3;

/// One ranked prediction: a class label, its probability, and its 1-based
/// rank within the distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: String,
    pub probability: f32,
    pub rank: usize,
}

/// Converts unnormalized scores into a probability distribution, preserving
/// order. If every score was clamped to zero, returns the uniform
/// distribution instead of dividing by zero.
pub(crate) fn normalize(scores: &[f32]) -> Vec<f32> {
    let total: f32 = scores.iter().sum();
    if total <= 0.0 {
        return uniform(scores.len());
    }
    scores.iter().map(|&s| s / total).collect()
}

/// The uniform distribution over `len` classes.
pub(crate) fn uniform(len: usize) -> Vec<f32> {
    vec![1.0 / len as f32; len]
}

/// Selects the top `k` classes by probability, descending, with ties broken
/// by original vocabulary order.
pub fn top_k(probabilities: &[f32], vocabulary: &ClassVocabulary, k: usize) -> Vec<Prediction> {
    let mut indexed: Vec<(usize, f32)> = probabilities.iter().copied().enumerate().collect();
    // Stable sort keeps vocabulary order for equal probabilities.
    indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    indexed
        .into_iter()
        .take(k)
        .enumerate()
        .map(|(i, (index, probability))| Prediction {
            label: vocabulary.label(index).to_string(),
            probability,
            rank: i + 1,
        })
        .collect()
}
