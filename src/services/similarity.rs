//! Vector helpers backing the similarity sub-score.
//!
//! Degenerate inputs (mismatched lengths, zero-magnitude vectors, zero-width
//! ranges) are expected steady state, not errors: they all yield 0.0.

/// Cosine similarity between two equal-length vectors.
///
/// Returns 0.0 for mismatched lengths (maximally dissimilar) and for vectors
/// with zero magnitude, avoiding a division by zero. Otherwise the standard
/// dot-product-over-norms ratio in [-1, 1].
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Builds a 0/1 indicator vector for an item's genres over the full genre
/// universe. Every vector compared must be built from the same universe
/// ordering.
pub fn genre_vector(item_genres: &[u32], universe: &[u32]) -> Vec<f64> {
    universe
        .iter()
        .map(|id| if item_genres.contains(id) { 1.0 } else { 0.0 })
        .collect()
}

/// Linear min-max scaling to [0, 1]; a degenerate range yields 0.0
pub fn normalize_score(value: f64, min: f64, max: f64) -> f64 {
    if max == min {
        return 0.0;
    }
    (value - min) / (max - min)
}
