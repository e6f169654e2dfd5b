use std::cmp::Ordering;

use super::vector_store::VectorStore;
use crate::error::{RagError, RagResult};

/// A ranked hit: store index, document text and its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Retrieved {
    pub index: usize,
    pub document: String,
    pub score: f32,
}

/// Cosine similarity; zero when either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let sim = dot / (norm_a * norm_b);
    if sim.is_finite() {
        sim
    } else {
        0.0
    }
}

/// Highest score first; equal scores keep insertion order.
fn rank(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.partial_cmp(&a.1)
        .unwrap_or(Ordering::Equal)
        .then(a.0.cmp(&b.0))
}

/// Returns the `k` stored documents most similar to `query`, best first.
pub fn retrieve(query: &[f32], store: &VectorStore, k: usize) -> RagResult<Vec<Retrieved>> {
    let expected = store.dimension().ok_or(RagError::EmptyStore)?;
    if query.len() != expected {
        return Err(RagError::DimensionMismatch {
            expected,
            actual: query.len(),
        });
    }

    let mut scored: Vec<(usize, f32)> = store
        .all_vectors()
        .iter()
        .enumerate()
        .map(|(index, vector)| (index, cosine_similarity(query, vector)))
        .collect();

    let k = k.min(scored.len());
    if k == 0 {
        return Ok(Vec::new());
    }
    if k < scored.len() {
        scored.select_nth_unstable_by(k - 1, rank);
        scored.truncate(k);
    }
    scored.sort_by(rank);

    scored
        .into_iter()
        .map(|(index, score)| {
            Ok(Retrieved {
                index,
                document: store.document_at(index)?.to_string(),
                score,
            })
        })
        .collect()
}
