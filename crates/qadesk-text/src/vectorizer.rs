//! TF-IDF vectorization against a fixed vocabulary.
//!
//! Weight of vocabulary term `t` in text `x` is
//! `count(t, x) / tokens(x) * idf(t)`; the dense vector is then L2-normalized.
//! Text sharing no terms with the vocabulary maps to the zero vector, which is
//! returned as-is instead of being normalized.

use std::collections::BTreeMap;

use crate::tokenize::Tokenizer;
use crate::vocabulary::{IdfTable, Vocabulary};

/// Norms below this are treated as zero.
pub const NORM_EPSILON: f64 = 1e-12;

pub struct Vectorizer<'a> {
    tokenizer: Tokenizer,
    vocabulary: &'a Vocabulary,
    idf: &'a IdfTable,
}

impl<'a> Vectorizer<'a> {
    pub fn new(tokenizer: Tokenizer, vocabulary: &'a Vocabulary, idf: &'a IdfTable) -> Self {
        Self { tokenizer, vocabulary, idf }
    }

    pub fn dim(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn vectorize(&self, text: &str) -> Vec<f32> {
        self.vectorize_with_norm(text).0
    }

    /// Vectorize and also return the L2 norm of the returned vector (1 or 0).
    pub fn vectorize_with_norm(&self, text: &str) -> (Vec<f32>, f32) {
        self.vectorize_tokens(&self.tokenizer.tokenize(text))
    }

    pub fn vectorize_tokens(&self, tokens: &[String]) -> (Vec<f32>, f32) {
        let dim = self.vocabulary.len();
        if tokens.is_empty() || dim == 0 {
            return (vec![0.0; dim], 0.0);
        }

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for token in tokens.iter().filter(|t| self.vocabulary.contains(t)) {
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }

        let total = tokens.len() as f64;
        let mut weights = vec![0.0f64; dim];
        for (term, count) in counts {
            if let Some(idx) = self.vocabulary.index_of(term) {
                weights[idx] = (count as f64 / total) * self.idf.weight(term);
            }
        }

        let norm = weights.iter().map(|w| w * w).sum::<f64>().sqrt();
        if norm < NORM_EPSILON {
            return (vec![0.0; dim], 0.0);
        }
        let vector: Vec<f32> = weights.iter().map(|w| (w / norm) as f32).collect();
        let stored_norm = l2_norm(&vector);
        (vector, stored_norm)
    }
}

/// Euclidean norm, accumulated in f64.
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt() as f32
}

/// Cosine similarity of two vectors, 0 when either has zero norm or the
/// lengths differ. Never NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < NORM_EPSILON {
        return 0.0;
    }

    (dot / denom).clamp(0.0, 1.0) as f32
}
