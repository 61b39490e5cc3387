//! Escalation tickets and the append-only JSONL sink.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;

use qadesk_core::traits::EscalationSink;
use qadesk_core::types::{ConsideredPassage, EscalationTicket, Query, StrategyDecision};
use qadesk_vector::Retrieval;

/// Longest passage excerpt carried in a ticket, in characters.
pub const EXCERPT_CHARS: usize = 280;

/// Build the ticket for `query` from the retrieval that produced `decision`.
/// Depends only on its inputs.
pub fn build_ticket(query: &Query, default_language: &str, decision: StrategyDecision, retrieval: &Retrieval) -> EscalationTicket {
    EscalationTicket {
        query: query.text.clone(),
        language: query.language.clone().unwrap_or_else(|| default_language.to_string()),
        decision,
        max_similarity: retrieval.max_similarity,
        average_similarity: retrieval.average_similarity,
        passages: retrieval
            .results
            .iter()
            .map(|r| ConsideredPassage {
                chunk_id: r.chunk_id.clone(),
                doc_id: r.doc_id.clone(),
                similarity: r.similarity,
                excerpt: excerpt(&r.content, EXCERPT_CHARS),
            })
            .collect(),
    }
}

fn excerpt(content: &str, max_chars: usize) -> String {
    let content = content.trim();
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let mut cut: String = content.chars().take(max_chars).collect();
    if let Some(space) = cut.rfind(char::is_whitespace) {
        cut.truncate(space);
    }
    cut.push('…');
    cut
}

/// One line of the escalation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationRecord {
    pub escalated_at: DateTime<Utc>,
    pub ticket: EscalationTicket,
}

/// Appends one JSON object per escalation to a file.
pub struct JsonlEscalationSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlEscalationSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl EscalationSink for JsonlEscalationSink {
    async fn escalate(&self, ticket: &EscalationTicket) -> Result<()> {
        let record = EscalationRecord { escalated_at: Utc::now(), ticket: ticket.clone() };
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        let mut file = tokio::fs::OpenOptions::new().create(true).append(true).open(&self.path).await?;
        file.write_all(&line).await?;
        file.flush().await?;

        info!(path = %self.path.display(), strategy = %ticket.decision.strategy, "escalated question");
        Ok(())
    }
}
