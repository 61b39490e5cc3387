use qadesk_core::config::StrategySettings;
use qadesk_core::types::{Strategy, StrategyDecision};
use qadesk_vector::Retrieval;

/// Three-way threshold decision over the best retrieval similarity.
///
/// With `high > medium >= 0`:
/// - no results → ESCALATE
/// - `max >= high` → ANSWER
/// - `medium <= max < high` → PARTIAL
/// - otherwise → ESCALATE
///
/// Equality goes to the more confident branch.
#[derive(Debug, Clone, Copy)]
pub struct StrategySelector {
    high_confidence: f32,
    medium_confidence: f32,
}

impl Default for StrategySelector {
    fn default() -> Self {
        Self::new(StrategySettings::default())
    }
}

impl StrategySelector {
    pub fn new(settings: StrategySettings) -> Self {
        Self { high_confidence: settings.high_confidence, medium_confidence: settings.medium_confidence }
    }

    pub fn select(&self, max_similarity: f32, result_count: usize) -> StrategyDecision {
        let strategy = if result_count == 0 {
            Strategy::Escalate
        } else if max_similarity >= self.high_confidence {
            Strategy::Answer
        } else if max_similarity >= self.medium_confidence {
            Strategy::Partial
        } else {
            Strategy::Escalate
        };
        StrategyDecision { strategy, confidence: max_similarity }
    }

    pub fn select_for(&self, retrieval: &Retrieval) -> StrategyDecision {
        self.select(retrieval.max_similarity, retrieval.results.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(high: f32, medium: f32) -> StrategySelector {
        StrategySelector::new(StrategySettings { high_confidence: high, medium_confidence: medium, escalate_partial: false })
    }

    #[test]
    fn boundaries_resolve_upward() {
        let s = selector(0.7, 0.4);
        assert_eq!(s.select(0.7, 3).strategy, Strategy::Answer);
        assert_eq!(s.select(0.4, 3).strategy, Strategy::Partial);
        assert_eq!(s.select(0.69, 3).strategy, Strategy::Partial);
        assert_eq!(s.select(0.39, 3).strategy, Strategy::Escalate);
        assert_eq!(s.select(1.0, 1).strategy, Strategy::Answer);
    }

    #[test]
    fn no_results_always_escalate() {
        let s = selector(0.7, 0.4);
        assert_eq!(s.select(0.0, 0).strategy, Strategy::Escalate);
        assert_eq!(s.select(0.9, 0).strategy, Strategy::Escalate);
    }

    #[test]
    fn confidence_is_the_max_similarity() {
        let d = selector(0.7, 0.4).select(0.55, 2);
        assert_eq!(d.confidence, 0.55);
        assert_eq!(d.strategy.to_string(), "PARTIAL");
    }

    #[test]
    fn zero_medium_accepts_any_nonempty_result() {
        let s = selector(0.5, 0.0);
        assert_eq!(s.select(0.0, 1).strategy, Strategy::Partial);
    }

    #[test]
    fn pure_function() {
        let s = StrategySelector::default();
        assert_eq!(s.select(0.42, 4), s.select(0.42, 4));
        assert_eq!(s.select_for(&Retrieval::default()).strategy, Strategy::Escalate);
    }
}
