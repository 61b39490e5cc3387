//! Keyword-anchored sentence extraction, used when no generated answer is
//! wanted or available.

use std::collections::HashSet;

use qadesk_text::chunker::split_sentences;
use qadesk_text::Tokenizer;

#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicExtractor {
    tokenizer: Tokenizer,
}

impl HeuristicExtractor {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }

    /// Pick the sentence of `content` containing the most distinct query
    /// tokens; the earliest wins ties. With no overlap at all, the first
    /// sentence with any alphanumeric content is returned. Empty content
    /// yields an empty string.
    pub fn extract(&self, content: &str, query: &str) -> String {
        let query_tokens: HashSet<String> = self.tokenizer.tokenize(query).into_iter().collect();
        let sentences = split_sentences(content);

        let mut best: Option<(usize, &str)> = None;
        for sentence in &sentences {
            let sentence_tokens: HashSet<String> = self.tokenizer.tokenize(sentence).into_iter().collect();
            let score = query_tokens.iter().filter(|t| sentence_tokens.contains(*t)).count();
            if score > 0 && best.map_or(true, |(s, _)| score > s) {
                best = Some((score, sentence));
            }
        }

        match best {
            Some((_, sentence)) => sentence.to_string(),
            None => sentences
                .into_iter()
                .find(|s| s.chars().any(char::is_alphanumeric))
                .unwrap_or_default()
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT: &str = "Welcome to the registry. Mid semester exams start on 15th October. \
                           Exam rooms are listed online. Results follow in December.";

    #[test]
    fn picks_sentence_with_most_query_tokens() {
        let e = HeuristicExtractor::default();
        assert_eq!(e.extract(CONTENT, "When do mid semester exams start?"), "Mid semester exams start on 15th October.");
        assert_eq!(e.extract(CONTENT, "where are exam rooms"), "Exam rooms are listed online.");
    }

    #[test]
    fn earliest_sentence_wins_ties() {
        let e = HeuristicExtractor::default();
        assert_eq!(e.extract("Library opens early. Library closes late.", "library"), "Library opens early.");
    }

    #[test]
    fn falls_back_to_first_real_sentence() {
        let e = HeuristicExtractor::default();
        assert_eq!(e.extract("... Parking is free on Sundays. Gates close at ten.", "tuition"), "Parking is free on Sundays.");
    }

    #[test]
    fn empty_content_is_not_an_error() {
        let e = HeuristicExtractor::default();
        assert_eq!(e.extract("", "anything"), "");
        assert_eq!(e.extract("  ?! ", "anything"), "");
    }
}
