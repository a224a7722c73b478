//! Feature vectors, cosine similarity and ranking

use crate::error::{RecommenderError, Result};
use serde::Serialize;
use std::cmp::Ordering;

/// Sparse vector with entries sorted by index.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseVector {
    dim: usize,
    entries: Vec<(usize, f32)>,
}

impl SparseVector {
    /// Entries outside `0..dim` or equal to zero are dropped; duplicates are summed.
    pub fn new(dim: usize, mut entries: Vec<(usize, f32)>) -> Self {
        entries.retain(|&(i, v)| i < dim && v != 0.0);
        entries.sort_by_key(|&(i, _)| i);
        entries.dedup_by(|next, kept| {
            if next.0 == kept.0 {
                kept.1 += next.1;
                true
            } else {
                false
            }
        });
        Self { dim, entries }
    }

    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            entries: Vec::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn entries(&self) -> &[(usize, f32)] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> f32 {
        self.entries
            .binary_search_by_key(&index, |&(i, _)| i)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|&(_, v)| v * v).sum::<f32>().sqrt()
    }

    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (a, b) = (&self.entries, &other.entries);
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    sum += a[i].1 * b[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorKind {
    Lexical,
    Semantic,
}

impl std::fmt::Display for VectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VectorKind::Lexical => write!(f, "lexical"),
            VectorKind::Semantic => write!(f, "semantic"),
        }
    }
}

/// A comparable representation of one entity.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureVector {
    /// TF-IDF weights
    Lexical(SparseVector),
    /// Sentence embedding
    Semantic(Vec<f32>),
}

impl FeatureVector {
    pub fn kind(&self) -> VectorKind {
        match self {
            FeatureVector::Lexical(_) => VectorKind::Lexical,
            FeatureVector::Semantic(_) => VectorKind::Semantic,
        }
    }

    pub fn dim(&self) -> usize {
        match self {
            FeatureVector::Lexical(v) => v.dim(),
            FeatureVector::Semantic(v) => v.len(),
        }
    }
}

/// Cosine similarity of two dense vectors of equal length. Zero vectors score 0.
pub fn dense_cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

/// Cosine similarity between two vectors of the same kind and dimensionality.
pub fn cosine_similarity(a: &FeatureVector, b: &FeatureVector) -> Result<f32> {
    if a.dim() != b.dim() {
        return Err(RecommenderError::IncompatibleVectorKind(format!(
            "dimensions don't match: {} vs {}",
            a.dim(),
            b.dim()
        )));
    }

    let score = match (a, b) {
        (FeatureVector::Lexical(x), FeatureVector::Lexical(y)) => {
            let (norm_x, norm_y) = (x.norm(), y.norm());
            if norm_x == 0.0 || norm_y == 0.0 {
                0.0
            } else {
                x.dot(y) / (norm_x * norm_y)
            }
        }
        (FeatureVector::Semantic(x), FeatureVector::Semantic(y)) => dense_cosine(x, y),
        _ => {
            return Err(RecommenderError::IncompatibleVectorKind(format!(
                "cannot compare a {} vector with a {} vector",
                a.kind(),
                b.kind()
            )))
        }
    };

    Ok(if score.is_finite() { score } else { 0.0 })
}

/// An item with its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked<T> {
    pub item: T,
    pub score: f32,
}

/// Order `candidate_items` by descending cosine similarity to `query`.
///
/// `candidate_vectors[i]` represents `candidate_items[i]`. Items with equal
/// scores keep their input order.
pub fn rank_scored<T>(
    query: &FeatureVector,
    candidate_vectors: &[FeatureVector],
    candidate_items: Vec<T>,
) -> Result<Vec<Ranked<T>>> {
    if candidate_vectors.len() != candidate_items.len() {
        return Err(RecommenderError::InvalidInput(format!(
            "{} candidate vectors for {} candidate items",
            candidate_vectors.len(),
            candidate_items.len()
        )));
    }

    let scores = candidate_vectors
        .iter()
        .map(|candidate| cosine_similarity(query, candidate))
        .collect::<Result<Vec<f32>>>()?;

    let mut ranked: Vec<Ranked<T>> = candidate_items
        .into_iter()
        .zip(scores)
        .map(|(item, score)| Ranked { item, score })
        .collect();

    // Vec::sort_by is stable.
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    Ok(ranked)
}

pub fn rank<T>(
    query: &FeatureVector,
    candidate_vectors: &[FeatureVector],
    candidate_items: Vec<T>,
) -> Result<Vec<T>> {
    Ok(rank_scored(query, candidate_vectors, candidate_items)?
        .into_iter()
        .map(|r| r.item)
        .collect())
}
