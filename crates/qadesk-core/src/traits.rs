//! Contracts for the collaborators that sit outside the retrieval core.

use async_trait::async_trait;

use crate::types::{Document, EscalationTicket};

/// Supplies the documents for one index build.
pub trait DocumentSource: Send + Sync {
    fn documents(&self) -> anyhow::Result<Vec<Document>>;
}

/// A generative answer service, called only on the ANSWER path.
///
/// `context` is the already-budgeted concatenation of ranked passages.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Stable identifier for the provider/model (e.g. `http:gpt-4o-mini`).
    fn model_id(&self) -> &str;
    async fn generate(&self, query: &str, context: &str) -> anyhow::Result<String>;
}

/// Receives questions that need human follow-up.
#[async_trait]
pub trait EscalationSink: Send + Sync {
    async fn escalate(&self, ticket: &EscalationTicket) -> anyhow::Result<()>;
}
