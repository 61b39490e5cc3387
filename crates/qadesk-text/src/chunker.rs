//! Sentence-boundary chunker with word-level overlap.
//!
//! Sentences (terminated by `.`, `!` or `?` followed by whitespace, or by a
//! blank line) are accumulated until the next one would push the chunk past
//! `target_chars`. The following chunk then opens with the last
//! `overlap_words` words of the previous one. A single sentence longer than the
//! target becomes its own chunk rather than being cut. Chunks with fewer than
//! `min_chunk_chars` alphanumeric characters are dropped.

use qadesk_core::config::ChunkingSettings;
use qadesk_core::types::{Document, DocumentChunk};

#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    target_chars: usize,
    overlap_words: usize,
    min_chunk_chars: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(ChunkingSettings::default())
    }
}

impl Chunker {
    pub fn new(settings: ChunkingSettings) -> Self {
        Self {
            target_chars: settings.target_chars.max(1),
            overlap_words: settings.overlap_words,
            min_chunk_chars: settings.min_chunk_chars,
        }
    }

    /// Split `text` into chunk payloads. Empty or whitespace-only text yields none.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        // Whether `current` holds anything beyond the carried-over overlap.
        let mut fresh = false;

        for sentence in split_sentences(text) {
            let sentence = normalize_whitespace(sentence);
            let would_be = if current.is_empty() {
                char_len(&sentence)
            } else {
                char_len(&current) + 1 + char_len(&sentence)
            };

            if would_be > self.target_chars && fresh {
                self.flush(&mut chunks, &current);
                current = tail_words(&current, self.overlap_words);
                fresh = false;
            }

            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&sentence);
            fresh = true;
        }

        if fresh {
            self.flush(&mut chunks, &current);
        }
        chunks
    }

    /// Chunk one document into indexed [`DocumentChunk`]s with ids `<doc_id>:<n>`.
    pub fn chunk_document(&self, doc: &Document) -> Vec<DocumentChunk> {
        let pieces = self.chunk(&doc.content);
        let total_chunks = pieces.len();
        pieces
            .into_iter()
            .enumerate()
            .map(|(chunk_index, content)| DocumentChunk {
                id: format!("{}:{}", doc.id, chunk_index),
                doc_id: doc.id.clone(),
                title: doc.title.clone(),
                word_count: content.split_whitespace().count(),
                content,
                chunk_index,
                total_chunks,
            })
            .collect()
    }

    fn flush(&self, chunks: &mut Vec<String>, current: &str) {
        let content_chars = current.chars().filter(|c| c.is_alphanumeric()).count();
        if content_chars >= self.min_chunk_chars && content_chars > 0 {
            chunks.push(current.to_string());
        }
    }
}

/// Chunk every document in order; chunk insertion order follows document order.
pub fn chunk_documents(documents: &[Document], chunker: &Chunker) -> Vec<DocumentChunk> {
    documents.iter().flat_map(|doc| chunker.chunk_document(doc)).collect()
}

/// Split text into trimmed, non-empty sentences.
///
/// A sentence ends at `.`, `!` or `?` when followed by whitespace or the end of
/// the text (so `3.5` and `e.g.x` stay whole), and at every blank line.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    for paragraph in split_paragraphs(text) {
        let mut start = 0usize;
        let mut chars = paragraph.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if matches!(c, '.' | '!' | '?') {
                let at_boundary = match chars.peek() {
                    None => true,
                    Some((_, next)) => next.is_whitespace(),
                };
                if at_boundary {
                    let end = i + c.len_utf8();
                    push_trimmed(&mut sentences, &paragraph[start..end]);
                    start = end;
                }
            }
        }
        push_trimmed(&mut sentences, &paragraph[start..]);
    }
    sentences
}

fn split_paragraphs(text: &str) -> Vec<&str> {
    let mut paragraphs = Vec::new();
    let mut start = 0usize;
    let mut blank_run = false;
    let mut line_start = 0usize;
    for (i, c) in text.char_indices() {
        if c == '\n' {
            let line = &text[line_start..i];
            if line.trim().is_empty() && !blank_run && line_start > start {
                paragraphs.push(&text[start..line_start]);
                start = line_start;
                blank_run = true;
            } else if !line.trim().is_empty() {
                blank_run = false;
            }
            line_start = i + 1;
        }
    }
    paragraphs.push(&text[start..]);
    paragraphs
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, piece: &'a str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        out.push(trimmed);
    }
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn tail_words(text: &str, n: usize) -> String {
    if n == 0 {
        return String::new();
    }
    let words: Vec<&str> = text.split_whitespace().collect();
    let start = words.len().saturating_sub(n);
    words[start..].join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(target_chars: usize, overlap_words: usize, min_chunk_chars: usize) -> Chunker {
        Chunker::new(ChunkingSettings { target_chars, overlap_words, min_chunk_chars })
    }

    #[test]
    fn sentences_split_on_terminators() {
        let s = split_sentences("Exams start soon. Are you ready? Yes!  Version 3.5 ships");
        assert_eq!(s, vec!["Exams start soon.", "Are you ready?", "Yes!", "Version 3.5 ships"]);
    }

    #[test]
    fn blank_lines_end_sentences() {
        let s = split_sentences("# Timetable\n\nExams start soon.\nLabs follow.");
        assert_eq!(s, vec!["# Timetable", "Exams start soon.", "Labs follow."]);
    }

    #[test]
    fn short_text_single_chunk() {
        let chunks = chunker(500, 5, 5).chunk("Mid semester exams start on 15th October 2025.");
        assert_eq!(chunks, vec!["Mid semester exams start on 15th October 2025."]);
    }

    #[test]
    fn empty_and_whitespace_yield_no_chunks() {
        let c = chunker(100, 3, 5);
        assert!(c.chunk("").is_empty());
        assert!(c.chunk("   \n\t  ").is_empty());
    }

    #[test]
    fn punctuation_only_chunk_discarded() {
        let c = chunker(100, 0, 3);
        assert!(c.chunk("... ?! ...").is_empty());
    }

    #[test]
    fn chunks_respect_target_and_carry_overlap() {
        let text = "Alpha bravo charlie delta. Echo foxtrot golf hotel. India juliet kilo lima.";
        let chunks = chunker(30, 2, 1).chunk(text);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], "Alpha bravo charlie delta.");
        assert_eq!(chunks[1], "charlie delta. Echo foxtrot golf hotel.");
        assert!(chunks[2].starts_with("golf hotel. India"));
    }

    #[test]
    fn oversize_sentence_kept_whole() {
        let long = "This single sentence is much longer than the tiny target size allows.";
        let chunks = chunker(10, 0, 1).chunk(long);
        assert_eq!(chunks, vec![long]);
    }

    #[test]
    fn document_chunk_ids_and_counts() {
        let doc = Document {
            id: "calendar".into(),
            title: "Calendar".into(),
            content: "Exams begin Monday. Results follow in two weeks.".into(),
            language: "en".into(),
        };
        let chunks = chunker(25, 0, 1).chunk_document(&doc);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].id, "calendar:0");
        assert_eq!(chunks[1].id, "calendar:1");
        assert_eq!(chunks[0].word_count, 3);
        assert!(chunks.iter().all(|c| c.total_chunks == 2 && c.doc_id == "calendar"));
    }

    #[test]
    fn deterministic() {
        let text = "One two three. Four five six. Seven eight nine. Ten eleven twelve.";
        let c = chunker(20, 1, 1);
        assert_eq!(c.chunk(text), c.chunk(text));
    }
}
