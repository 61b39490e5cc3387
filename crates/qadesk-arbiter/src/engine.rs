//! Query → retrieval → decision → outcome.
//!
//! The decision is made once per question from one index snapshot. Whatever
//! happens downstream (generator error, timeout, sink failure) is reported
//! with that decision attached; nothing is retried or re-decided here.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use qadesk_core::config::Settings;
use qadesk_core::traits::{AnswerGenerator, EscalationSink};
use qadesk_core::types::{EscalationTicket, Query, Strategy, StrategyDecision};
use qadesk_generate::build_context;
use qadesk_vector::{LiveIndex, Retrieval, Retriever};

use crate::escalation::build_ticket;
use crate::extract::HeuristicExtractor;
use crate::strategy::StrategySelector;

#[derive(Debug, Error)]
pub enum AskError {
    #[error("answer generation failed ({} at {:.3}): {source}", .decision.strategy, .decision.confidence)]
    Generation {
        decision: StrategyDecision,
        #[source]
        source: anyhow::Error,
    },

    #[error("escalation failed ({} at {:.3}): {source}", .decision.strategy, .decision.confidence)]
    Escalation {
        decision: StrategyDecision,
        #[source]
        source: anyhow::Error,
    },
}

impl AskError {
    pub fn decision(&self) -> StrategyDecision {
        match self {
            AskError::Generation { decision, .. } | AskError::Escalation { decision, .. } => *decision,
        }
    }
}

/// What the asker gets back.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    /// Produced by the generative service.
    Generated { text: String, model_id: String },
    /// Best matching sentence of the top passage.
    Extracted { text: String },
    /// Handed to a human; no answer text.
    Escalated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub decision: StrategyDecision,
    pub body: ReplyBody,
    pub retrieval: Retrieval,
    /// Index generation the question was answered against.
    pub generation: u64,
    /// Ticket delivered to the sink, if any (ESCALATE, or PARTIAL with
    /// `strategy.escalate_partial`).
    pub ticket: Option<EscalationTicket>,
}

impl Reply {
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            ReplyBody::Generated { text, .. } | ReplyBody::Extracted { text } => Some(text),
            ReplyBody::Escalated => None,
        }
    }
}

pub struct QaEngine {
    index: Arc<LiveIndex>,
    retriever: Retriever,
    selector: StrategySelector,
    generator: Option<Box<dyn AnswerGenerator>>,
    sink: Box<dyn EscalationSink>,
    max_context_chars: usize,
    generation_timeout: Duration,
    escalate_partial: bool,
    default_language: String,
}

impl QaEngine {
    pub fn new(
        index: Arc<LiveIndex>,
        settings: &Settings,
        generator: Option<Box<dyn AnswerGenerator>>,
        sink: Box<dyn EscalationSink>,
    ) -> Self {
        Self {
            index,
            retriever: Retriever::new(settings.retrieval),
            selector: StrategySelector::new(settings.strategy),
            generator,
            sink,
            max_context_chars: settings.generation.max_context_chars,
            generation_timeout: Duration::from_secs(settings.generation.timeout_secs),
            escalate_partial: settings.strategy.escalate_partial,
            default_language: settings.data.default_language.clone(),
        }
    }

    pub fn live_index(&self) -> &Arc<LiveIndex> {
        &self.index
    }

    pub async fn ask(&self, query: &Query) -> Result<Reply, AskError> {
        let snapshot = self.index.snapshot();
        let retrieval = self.retriever.retrieve(&snapshot, &query.text);
        let decision = self.selector.select_for(&retrieval);
        info!(
            generation = snapshot.generation(),
            strategy = %decision.strategy,
            confidence = decision.confidence,
            hits = retrieval.results.len(),
            "decided"
        );

        let extractor = HeuristicExtractor::new(snapshot.tokenizer());
        let extract = |retrieval: &Retrieval| {
            retrieval.top().map(|top| extractor.extract(&top.content, &query.text)).unwrap_or_default()
        };

        let (body, ticket) = match decision.strategy {
            Strategy::Answer => match &self.generator {
                Some(generator) => {
                    let context = build_context(&retrieval.results, self.max_context_chars);
                    debug!(model = generator.model_id(), context_chars = context.chars().count(), "calling generator");
                    let text = match tokio::time::timeout(self.generation_timeout, generator.generate(&query.text, &context)).await {
                        Ok(Ok(text)) => text,
                        Ok(Err(source)) => return Err(AskError::Generation { decision, source }),
                        Err(_) => {
                            warn!(timeout_secs = self.generation_timeout.as_secs(), "generator timed out");
                            return Err(AskError::Generation {
                                decision,
                                source: anyhow::anyhow!("timed out after {:?}", self.generation_timeout),
                            });
                        }
                    };
                    (ReplyBody::Generated { text, model_id: generator.model_id().to_string() }, None)
                }
                None => (ReplyBody::Extracted { text: extract(&retrieval) }, None),
            },
            Strategy::Partial => {
                let body = ReplyBody::Extracted { text: extract(&retrieval) };
                let ticket = if self.escalate_partial {
                    Some(self.escalate(query, decision, &retrieval).await?)
                } else {
                    None
                };
                (body, ticket)
            }
            Strategy::Escalate => (ReplyBody::Escalated, Some(self.escalate(query, decision, &retrieval).await?)),
        };

        Ok(Reply { decision, body, retrieval, generation: snapshot.generation(), ticket })
    }

    async fn escalate(&self, query: &Query, decision: StrategyDecision, retrieval: &Retrieval) -> Result<EscalationTicket, AskError> {
        let ticket = build_ticket(query, &self.default_language, decision, retrieval);
        self.sink
            .escalate(&ticket)
            .await
            .map_err(|source| AskError::Escalation { decision, source })?;
        Ok(ticket)
    }
}
