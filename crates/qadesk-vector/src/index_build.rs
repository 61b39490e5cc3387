use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::hash::Hasher;
use tracing::{debug, info, warn};
use twox_hash::XxHash64;

use qadesk_core::error::{Error, Result};
use qadesk_core::types::DocumentChunk;
use qadesk_text::{IdfTable, Tokenizer, Vectorizer, Vocabulary, VocabularyBuilder};

/// Tolerance for "unit or zero" checks on stored vectors.
const NORM_TOLERANCE: f32 = 1e-4;

/// One indexed chunk vector. `vector.len()` always equals the vocabulary size.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorEntry {
    pub chunk_id: String,
    pub doc_id: String,
    pub vector: Vec<f32>,
    pub norm: f32,
}

/// Summary of one index generation, as reported by `qadesk status`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexStatus {
    pub generation: u64,
    pub built_at: Option<DateTime<Utc>>,
    pub fingerprint: String,
    pub chunks: usize,
    pub documents: usize,
    pub vocabulary_size: usize,
}

/// Immutable snapshot of one generation: vocabulary, IDF, vectors and chunk
/// metadata. Never mutated after construction; a rebuild produces a new value.
#[derive(Debug, Clone)]
pub struct Index {
    generation: u64,
    built_at: Option<DateTime<Utc>>,
    fingerprint: String,
    tokenizer: Tokenizer,
    vocabulary: Vocabulary,
    idf: IdfTable,
    entries: Vec<VectorEntry>,
    chunks: Vec<DocumentChunk>,
    positions: HashMap<String, usize>,
}

impl Index {
    /// Generation 0: no vocabulary, no entries. Every query against it yields
    /// zero results.
    pub fn empty() -> Self {
        Self {
            generation: 0,
            built_at: None,
            fingerprint: corpus_fingerprint(&[]),
            tokenizer: Tokenizer::default(),
            vocabulary: Vocabulary::default(),
            idf: IdfTable::default(),
            entries: Vec::new(),
            chunks: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Build vocabulary and IDF over `chunks`, then vectorize every chunk.
    /// Entry order follows chunk insertion order. A repeated chunk id keeps
    /// its first occurrence only.
    pub fn build(generation: u64, chunks: Vec<DocumentChunk>, builder: &VocabularyBuilder) -> Self {
        let chunks = dedup_chunk_ids(chunks);
        let fingerprint = corpus_fingerprint(&chunks);
        let built = builder.build_from_chunks(&chunks);
        let tokenizer = builder.tokenizer();

        let entries: Vec<VectorEntry> = {
            let vectorizer = Vectorizer::new(tokenizer, &built.vocabulary, &built.idf);
            chunks
                .par_iter()
                .map(|chunk| {
                    let (vector, norm) = vectorizer.vectorize_with_norm(&chunk.content);
                    VectorEntry { chunk_id: chunk.id.clone(), doc_id: chunk.doc_id.clone(), vector, norm }
                })
                .collect()
        };

        let zero_vectors = entries.iter().filter(|e| e.norm == 0.0).count();
        if zero_vectors > 0 {
            debug!(zero_vectors, "chunks share no terms with the vocabulary");
        }
        info!(
            generation,
            chunks = chunks.len(),
            vocabulary = built.vocabulary.len(),
            min_df = built.min_document_frequency,
            "built index generation"
        );

        let positions = positions_of(&chunks);
        Self {
            generation,
            built_at: Some(Utc::now()),
            fingerprint,
            tokenizer,
            vocabulary: built.vocabulary,
            idf: built.idf,
            entries,
            chunks,
            positions,
        }
    }

    /// Reassemble a generation from stored parts, rejecting any structural
    /// inconsistency. Norms are recomputed from the vectors.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        generation: u64,
        built_at: Option<DateTime<Utc>>,
        fingerprint: String,
        tokenizer: Tokenizer,
        vocabulary: Vocabulary,
        idf: IdfTable,
        chunks: Vec<DocumentChunk>,
        vectors: Vec<Vec<f32>>,
    ) -> Result<Self> {
        if !idf.covers(&vocabulary) {
            return Err(Error::IndexMismatch(format!(
                "idf table has {} terms but vocabulary has {}, or their terms differ",
                idf.len(),
                vocabulary.len()
            )));
        }
        if chunks.len() != vectors.len() {
            return Err(Error::IndexMismatch(format!("{} chunks but {} vectors", chunks.len(), vectors.len())));
        }

        let dim = vocabulary.len();
        let mut entries = Vec::with_capacity(vectors.len());
        for (chunk, vector) in chunks.iter().zip(vectors) {
            if vector.len() != dim {
                return Err(Error::IndexMismatch(format!(
                    "vector for chunk '{}' has length {} but vocabulary size is {}",
                    chunk.id,
                    vector.len(),
                    dim
                )));
            }
            if vector.iter().any(|x| !x.is_finite()) {
                return Err(Error::IndexMismatch(format!("vector for chunk '{}' is not finite", chunk.id)));
            }
            let norm = qadesk_text::l2_norm(&vector);
            if norm != 0.0 && (norm - 1.0).abs() > NORM_TOLERANCE {
                return Err(Error::IndexMismatch(format!("vector for chunk '{}' has norm {}", chunk.id, norm)));
            }
            entries.push(VectorEntry { chunk_id: chunk.id.clone(), doc_id: chunk.doc_id.clone(), vector, norm });
        }

        let positions = positions_of(&chunks);
        if positions.len() != chunks.len() {
            return Err(Error::IndexMismatch("duplicate chunk ids".into()));
        }

        Ok(Self { generation, built_at, fingerprint, tokenizer, vocabulary, idf, entries, chunks, positions })
    }

    /// Same content under a new generation number.
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn built_at(&self) -> Option<DateTime<Utc>> {
        self.built_at
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn tokenizer(&self) -> Tokenizer {
        self.tokenizer
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn idf(&self) -> &IdfTable {
        &self.idf
    }

    pub fn entries(&self) -> &[VectorEntry] {
        &self.entries
    }

    pub fn chunks(&self) -> &[DocumentChunk] {
        &self.chunks
    }

    pub fn chunk(&self, chunk_id: &str) -> Option<&DocumentChunk> {
        self.positions.get(chunk_id).map(|&i| &self.chunks[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vectorizer bound to this generation's vocabulary and IDF.
    pub fn vectorizer(&self) -> Vectorizer<'_> {
        Vectorizer::new(self.tokenizer, &self.vocabulary, &self.idf)
    }

    pub fn status(&self) -> IndexStatus {
        let mut documents: Vec<&str> = self.chunks.iter().map(|c| c.doc_id.as_str()).collect();
        documents.sort_unstable();
        documents.dedup();
        IndexStatus {
            generation: self.generation,
            built_at: self.built_at,
            fingerprint: self.fingerprint.clone(),
            chunks: self.entries.len(),
            documents: documents.len(),
            vocabulary_size: self.vocabulary.len(),
        }
    }
}

impl Default for Index {
    fn default() -> Self {
        Self::empty()
    }
}

fn dedup_chunk_ids(chunks: Vec<DocumentChunk>) -> Vec<DocumentChunk> {
    let mut seen = HashSet::with_capacity(chunks.len());
    let before = chunks.len();
    let kept: Vec<DocumentChunk> = chunks.into_iter().filter(|c| seen.insert(c.id.clone())).collect();
    if kept.len() != before {
        warn!(dropped = before - kept.len(), "duplicate chunk ids, keeping first occurrence");
    }
    kept
}

fn positions_of(chunks: &[DocumentChunk]) -> HashMap<String, usize> {
    chunks.iter().enumerate().map(|(i, c)| (c.id.clone(), i)).collect()
}

/// Deterministic 64-bit digest of chunk ids and texts, hex encoded.
pub fn corpus_fingerprint(chunks: &[DocumentChunk]) -> String {
    let mut hasher = XxHash64::with_seed(0);
    for chunk in chunks {
        hasher.write(chunk.id.as_bytes());
        hasher.write_u8(0);
        hasher.write(chunk.content.as_bytes());
        hasher.write_u8(0xff);
    }
    hasher.write_usize(chunks.len());
    format!("{:016x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qadesk_core::config::VocabularySettings;

    fn chunk(id: &str, doc: &str, content: &str) -> DocumentChunk {
        DocumentChunk {
            id: id.into(),
            doc_id: doc.into(),
            title: doc.into(),
            content: content.into(),
            word_count: content.split_whitespace().count(),
            chunk_index: 0,
            total_chunks: 1,
        }
    }

    fn sample() -> Vec<DocumentChunk> {
        vec![
            chunk("a:0", "a", "Mid semester exams start on 15th October 2025."),
            chunk("b:0", "b", "Sports competition begins on 1st November 2025."),
            chunk("b:1", "b", "Sports teams register in October."),
        ]
    }

    #[test]
    fn build_produces_one_entry_per_chunk_in_order() {
        let index = Index::build(3, sample(), &VocabularyBuilder::default());
        assert_eq!(index.generation(), 3);
        let ids: Vec<&str> = index.entries().iter().map(|e| e.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["a:0", "b:0", "b:1"]);
        for e in index.entries() {
            assert_eq!(e.vector.len(), index.vocabulary().len());
        }
        assert_eq!(index.chunk("b:1").map(|c| c.doc_id.as_str()), Some("b"));
        assert!(index.chunk("missing").is_none());

        let status = index.status();
        assert_eq!(status.chunks, 3);
        assert_eq!(status.documents, 2);
        assert!(status.built_at.is_some());
    }

    #[test]
    fn repeated_chunk_id_keeps_first_occurrence() {
        let mut chunks = sample();
        chunks.push(chunk("a:0", "a", "Canteen closes at six."));
        let index = Index::build(1, chunks, &VocabularyBuilder::default());

        assert_eq!(index.len(), 3);
        assert_eq!(index.chunk("a:0").map(|c| c.content.as_str()), Some("Mid semester exams start on 15th October 2025."));
        let vectors: Vec<Vec<f32>> = index.entries().iter().map(|e| e.vector.clone()).collect();
        let rebuilt = Index::from_parts(
            1,
            index.built_at(),
            index.fingerprint().to_string(),
            index.tokenizer(),
            index.vocabulary().clone(),
            index.idf().clone(),
            index.chunks().to_vec(),
            vectors,
        );
        assert!(rebuilt.is_ok());
    }

    #[test]
    fn empty_index_has_no_entries() {
        let index = Index::empty();
        assert!(index.is_empty());
        assert_eq!(index.generation(), 0);
        assert!(index.vocabulary().is_empty());
        assert_eq!(index.status().documents, 0);
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = corpus_fingerprint(&sample());
        assert_eq!(a, corpus_fingerprint(&sample()));
        let mut changed = sample();
        changed[2].content.push_str(" Late entries welcome.");
        assert_ne!(a, corpus_fingerprint(&changed));
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn from_parts_rejects_dimension_mismatch() {
        let built = VocabularyBuilder::new(VocabularySettings { min_token_len: 3, min_document_frequency: 1 })
            .build(["alpha beta", "beta gamma"]);
        let chunks = vec![chunk("x:0", "x", "alpha beta")];
        let err = Index::from_parts(
            1,
            None,
            String::new(),
            Tokenizer::default(),
            built.vocabulary,
            built.idf,
            chunks,
            vec![vec![1.0]],
        )
        .unwrap_err();
        assert!(matches!(err, Error::IndexMismatch(_)));
    }

    #[test]
    fn from_parts_roundtrips_built_index() {
        let index = Index::build(2, sample(), &VocabularyBuilder::default());
        let vectors = index.entries().iter().map(|e| e.vector.clone()).collect();
        let rebuilt = Index::from_parts(
            index.generation(),
            index.built_at(),
            index.fingerprint().to_string(),
            index.tokenizer(),
            index.vocabulary().clone(),
            index.idf().clone(),
            index.chunks().to_vec(),
            vectors,
        )
        .expect("valid parts");
        assert_eq!(rebuilt.entries(), index.entries());
    }
}
