//! Cosine-similarity retrieval over one index snapshot.

use tracing::debug;

use qadesk_core::config::RetrievalSettings;
use qadesk_core::types::RetrievalResult;
use qadesk_text::cosine_similarity;

use crate::index_build::Index;

/// Ranked results plus the two confidence signals the strategy selector reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Retrieval {
    pub results: Vec<RetrievalResult>,
    /// Best similarity in `results`, 0 when empty.
    pub max_similarity: f32,
    /// Mean similarity of `results`, 0 when empty.
    pub average_similarity: f32,
}

impl Retrieval {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn top(&self) -> Option<&RetrievalResult> {
        self.results.first()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Retriever {
    top_k: usize,
    similarity_floor: f32,
}

impl Default for Retriever {
    fn default() -> Self {
        Self::new(RetrievalSettings::default())
    }
}

impl Retriever {
    pub fn new(settings: RetrievalSettings) -> Self {
        Self { top_k: settings.top_k, similarity_floor: settings.similarity_floor }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Rank every entry of `index` against `query`: keep similarity ≥ floor,
    /// order by descending similarity (ties keep chunk insertion order), then
    /// truncate to `top_k`.
    pub fn retrieve(&self, index: &Index, query: &str) -> Retrieval {
        let query_vector = index.vectorizer().vectorize(query);

        let mut scored: Vec<(usize, f32)> = index
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(&query_vector, &entry.vector)))
            .filter(|(_, sim)| *sim >= self.similarity_floor)
            .collect();
        // sort_by is stable, so equal scores stay in insertion order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(self.top_k);

        let chunks = index.chunks();
        let entries = index.entries();
        let results: Vec<RetrievalResult> = scored
            .into_iter()
            .map(|(i, similarity)| RetrievalResult {
                chunk_id: entries[i].chunk_id.clone(),
                doc_id: entries[i].doc_id.clone(),
                content: chunks[i].content.clone(),
                similarity,
            })
            .collect();

        let max_similarity = results.first().map(|r| r.similarity).unwrap_or(0.0);
        let average_similarity = if results.is_empty() {
            0.0
        } else {
            results.iter().map(|r| r.similarity).sum::<f32>() / results.len() as f32
        };

        debug!(
            generation = index.generation(),
            hits = results.len(),
            max_similarity,
            average_similarity,
            "retrieved"
        );
        Retrieval { results, max_similarity, average_similarity }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qadesk_core::types::DocumentChunk;
    use qadesk_text::VocabularyBuilder;

    fn chunk(id: &str, content: &str) -> DocumentChunk {
        DocumentChunk {
            id: id.into(),
            doc_id: id.split(':').next().unwrap_or(id).into(),
            title: String::new(),
            content: content.into(),
            word_count: content.split_whitespace().count(),
            chunk_index: 0,
            total_chunks: 1,
        }
    }

    fn retriever(top_k: usize, floor: f32) -> Retriever {
        Retriever::new(RetrievalSettings { top_k, similarity_floor: floor })
    }

    #[test]
    fn empty_index_returns_nothing() {
        let r = retriever(5, 0.0).retrieve(&Index::empty(), "When are the exams?");
        assert!(r.is_empty());
        assert_eq!(r.max_similarity, 0.0);
        assert_eq!(r.average_similarity, 0.0);
    }

    #[test]
    fn ties_keep_insertion_order_and_truncate() {
        let chunks = vec![
            chunk("a:0", "library hours posted"),
            chunk("b:0", "library hours posted"),
            chunk("c:0", "canteen menu today"),
            chunk("d:0", "canteen menu tomorrow"),
        ];
        let index = Index::build(1, chunks, &VocabularyBuilder::default());
        let r = retriever(1, 0.0).retrieve(&index, "library hours");
        assert_eq!(r.results.len(), 1);
        assert_eq!(r.results[0].chunk_id, "a:0");

        let r = retriever(10, 0.01).retrieve(&index, "library hours");
        let ids: Vec<&str> = r.results.iter().map(|x| x.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["a:0", "b:0"]);
        assert!((r.results[0].similarity - r.results[1].similarity).abs() < 1e-6);
        assert!((r.average_similarity - r.max_similarity).abs() < 1e-6);
    }

    #[test]
    fn floor_filters_weak_matches() {
        let chunks = vec![chunk("a:0", "exam timetable"), chunk("b:0", "sports timetable"), chunk("c:0", "exam rooms")];
        let index = Index::build(1, chunks, &VocabularyBuilder::default());
        let r = retriever(5, 0.99).retrieve(&index, "sports");
        assert!(r.results.iter().all(|x| x.similarity >= 0.99));
    }

    #[test]
    fn similarities_are_bounded_and_sorted() {
        let chunks = vec![
            chunk("a:0", "exams start in october"),
            chunk("b:0", "exams results in december"),
            chunk("c:0", "sports day in october"),
            chunk("d:0", "sports results posted"),
        ];
        let index = Index::build(1, chunks, &VocabularyBuilder::default());
        let r = retriever(10, 0.0).retrieve(&index, "exams october results");
        for pair in r.results.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
        assert!(r.results.iter().all(|x| (0.0..=1.0).contains(&x.similarity)));
    }
}
