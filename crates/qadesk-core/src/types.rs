//! Domain types shared by the text, vector and arbiter crates.

use serde::{Deserialize, Serialize};
use std::fmt;

pub type ChunkId = String;
pub type DocId = String;

/// A source document as supplied by a [`DocumentSource`](crate::traits::DocumentSource).
///
/// - `id`: stable document identity (relative path stem or external id)
/// - `title`: human-readable title, carried into chunk metadata
/// - `content`: the raw text payload
/// - `language`: declared language tag (e.g. "en")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub title: String,
    pub content: String,
    pub language: String,
}

/// A chunk of a source document that is independently indexed.
///
/// - `id`: globally unique chunk identifier (`<doc_id>:<chunk_index>`)
/// - `doc_id`: parent document identity
/// - `title`: parent document title
/// - `content`: the text payload of the chunk
/// - `word_count`: whitespace-delimited words in `content`
/// - `chunk_index`/`total_chunks`: position within the parent document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: ChunkId,
    pub doc_id: DocId,
    pub title: String,
    pub content: String,
    pub word_count: usize,
    pub chunk_index: usize,
    pub total_chunks: usize,
}

/// One ranked passage returned by the retriever.
///
/// `similarity` is the cosine similarity to the query, in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub chunk_id: ChunkId,
    pub doc_id: DocId,
    pub content: String,
    pub similarity: f32,
}

/// The three response modes the arbiter can choose between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    /// Confident enough to answer autonomously.
    Answer,
    /// Answer with a caveat.
    Partial,
    /// Hand the question to a human.
    Escalate,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Strategy::Answer => "ANSWER",
            Strategy::Partial => "PARTIAL",
            Strategy::Escalate => "ESCALATE",
        };
        f.write_str(tag)
    }
}

/// A strategy plus the confidence value that triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyDecision {
    pub strategy: Strategy,
    pub confidence: f32,
}

/// A free-text question, optionally tagged with the asker's language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    pub language: Option<String>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), language: None }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// A passage the retriever considered, as reported to the escalation sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsideredPassage {
    pub chunk_id: ChunkId,
    pub doc_id: DocId,
    pub similarity: f32,
    pub excerpt: String,
}

/// The payload handed to an escalation sink for human follow-up.
///
/// Built purely from the query and the retrieval output, so two identical
/// inputs always produce identical tickets. Delivery timestamps belong to the
/// sink, not the ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationTicket {
    pub query: String,
    pub language: String,
    pub decision: StrategyDecision,
    pub max_similarity: f32,
    pub average_similarity: f32,
    pub passages: Vec<ConsideredPassage>,
}
