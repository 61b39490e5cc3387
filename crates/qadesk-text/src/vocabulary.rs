//! Vocabulary and IDF construction over one chunk corpus.
//!
//! Terms are admitted by document frequency (distinct chunks containing the
//! term), never by raw term frequency. Index values are assigned in sorted term
//! order so an unchanged corpus always yields the same term→index mapping.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use qadesk_core::config::VocabularySettings;
use qadesk_core::error::{Error, Result};
use qadesk_core::types::DocumentChunk;

use crate::tokenize::Tokenizer;

/// Ordered term → dense 0-based index mapping for one generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vocabulary {
    terms: BTreeMap<String, usize>,
}

impl Vocabulary {
    /// Assign indices `0..n` in iteration (sorted) order.
    pub fn from_sorted_terms<I: IntoIterator<Item = String>>(terms: I) -> Self {
        let terms = terms.into_iter().enumerate().map(|(i, t)| (t, i)).collect();
        Self { terms }
    }

    /// Accept an externally supplied mapping after checking the indices are a
    /// permutation of `0..n`.
    pub fn from_map(terms: BTreeMap<String, usize>) -> Result<Self> {
        let n = terms.len();
        let mut seen = vec![false; n];
        for (term, &idx) in &terms {
            if idx >= n || seen[idx] {
                return Err(Error::IndexMismatch(format!(
                    "vocabulary index {} for term '{}' is out of range or duplicated (size {})",
                    idx, term, n
                )));
            }
            seen[idx] = true;
        }
        Ok(Self { terms })
    }

    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.terms.get(term).copied()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.terms.iter().map(|(t, &i)| (t.as_str(), i))
    }
}

/// Term → inverse document frequency. Absent terms weigh 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdfTable {
    weights: BTreeMap<String, f64>,
}

impl IdfTable {
    pub fn from_map(weights: BTreeMap<String, f64>) -> Result<Self> {
        if let Some((term, w)) = weights.iter().find(|(_, w)| !w.is_finite() || **w < 0.0) {
            return Err(Error::IndexMismatch(format!("idf weight {} for term '{}' is not a nonnegative number", w, term)));
        }
        Ok(Self { weights })
    }

    pub fn weight(&self, term: &str) -> f64 {
        self.weights.get(term).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(t, &w)| (t.as_str(), w))
    }

    /// True when both tables cover exactly the same terms.
    pub fn covers(&self, vocabulary: &Vocabulary) -> bool {
        self.weights.len() == vocabulary.len() && vocabulary.iter().all(|(t, _)| self.weights.contains_key(t))
    }
}

/// `ln(total_chunks / document_frequency)`, 0 for degenerate inputs.
pub fn inverse_document_frequency(total_chunks: usize, document_frequency: usize) -> f64 {
    if total_chunks == 0 || document_frequency == 0 {
        return 0.0;
    }
    (total_chunks as f64 / document_frequency as f64).ln().max(0.0)
}

/// Output of one vocabulary pass.
#[derive(Debug, Clone)]
pub struct BuiltVocabulary {
    pub vocabulary: Vocabulary,
    pub idf: IdfTable,
    pub total_chunks: usize,
    pub min_document_frequency: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct VocabularyBuilder {
    tokenizer: Tokenizer,
    min_document_frequency: usize,
}

impl Default for VocabularyBuilder {
    fn default() -> Self {
        Self::new(VocabularySettings::default())
    }
}

impl VocabularyBuilder {
    pub fn new(settings: VocabularySettings) -> Self {
        Self {
            tokenizer: Tokenizer::new(settings.min_token_len),
            min_document_frequency: settings.min_document_frequency.max(1),
        }
    }

    pub fn tokenizer(&self) -> Tokenizer {
        self.tokenizer
    }

    /// The admission threshold actually applied to a corpus of `total_chunks`.
    ///
    /// Never more than half the corpus: on a tiny corpus the configured
    /// threshold would otherwise admit only terms present everywhere, all of
    /// which have IDF 0.
    pub fn effective_min_document_frequency(&self, total_chunks: usize) -> usize {
        self.min_document_frequency.min((total_chunks / 2).max(1))
    }

    /// Whether a corpus of `total_chunks` lowers the configured threshold.
    pub fn threshold_clamped(&self, total_chunks: usize) -> bool {
        self.effective_min_document_frequency(total_chunks) < self.min_document_frequency
    }

    pub fn build_from_chunks(&self, chunks: &[DocumentChunk]) -> BuiltVocabulary {
        self.build(chunks.iter().map(|c| c.content.as_str()))
    }

    pub fn build<'a, I>(&self, texts: I) -> BuiltVocabulary
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        let mut total_chunks = 0usize;
        for text in texts {
            total_chunks += 1;
            let distinct: BTreeSet<String> = self.tokenizer.tokenize(text).into_iter().collect();
            for term in distinct {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let min_df = self.effective_min_document_frequency(total_chunks);
        if self.threshold_clamped(total_chunks) {
            debug!(
                configured = self.min_document_frequency,
                applied = min_df,
                total_chunks,
                "small corpus, lowered min document frequency"
            );
        }
        let admitted: BTreeMap<String, usize> =
            document_frequency.into_iter().filter(|(_, df)| *df >= min_df).collect();

        let idf = admitted
            .iter()
            .map(|(term, &df)| (term.clone(), inverse_document_frequency(total_chunks, df)))
            .collect();
        let vocabulary = Vocabulary::from_sorted_terms(admitted.into_keys());

        BuiltVocabulary { vocabulary, idf: IdfTable { weights: idf }, total_chunks, min_document_frequency: min_df }
    }
}
