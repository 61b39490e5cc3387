//! qadesk-arbiter
//!
//! Turns a ranked retrieval into one of three outcomes: a generated answer, a
//! caveated extract, or a ticket for a human.

pub mod engine;
pub mod escalation;
pub mod extract;
pub mod strategy;

pub use engine::{AskError, QaEngine, Reply, ReplyBody};
pub use escalation::{build_ticket, EscalationRecord, JsonlEscalationSink};
pub use extract::HeuristicExtractor;
pub use strategy::StrategySelector;
