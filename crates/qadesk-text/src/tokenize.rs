//! The one tokenizer shared by vocabulary construction, vectorization and the
//! heuristic extractor.
//!
//! Lower-cases, treats every non-alphanumeric character as a separator, splits
//! on whitespace, then drops tokens shorter than `min_token_len` and a fixed
//! English stop-word list.

use serde::{Deserialize, Serialize};

pub const STOP_WORDS: &[&str] = &[
	"a","an","and","are","as","at","be","by","for","from","has","he","in","is","it","its","of","on","that","the","to","was","will","with","or","but","not","this","these","they","them","their","there","then","than","so","if","when","where","why","how","what","which","who","whom","whose","can","could","should","would","may","might","must","shall","do","does","did","have","had","having",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokenizer {
	min_token_len: usize,
}

impl Default for Tokenizer {
	fn default() -> Self { Self { min_token_len: 3 } }
}

impl Tokenizer {
	pub fn new(min_token_len: usize) -> Self { Self { min_token_len } }

	pub fn min_token_len(&self) -> usize { self.min_token_len }

	pub fn tokenize(&self, text: &str) -> Vec<String> {
		let lowered = text.to_lowercase();
		let cleaned: String = lowered.chars().map(|c| if c.is_alphanumeric() { c } else { ' ' }).collect();
		cleaned
			.split_whitespace()
			.filter(|t| t.chars().count() >= self.min_token_len)
			.filter(|t| !is_stop_word(t))
			.map(str::to_string)
			.collect()
	}
}

pub fn is_stop_word(token: &str) -> bool {
	STOP_WORDS.contains(&token)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lowercases_and_strips_punctuation() {
		let t = Tokenizer::new(3);
		assert_eq!(t.tokenize("When are the EXAMS?"), vec!["exams"]);
		assert_eq!(t.tokenize("Mid-semester exams, 15th October!"), vec!["mid", "semester", "exams", "15th", "october"]);
	}

	#[test]
	fn short_tokens_dropped() {
		let t = Tokenizer::new(4);
		assert_eq!(t.tokenize("go run fast quickly"), vec!["fast", "quickly"]);
	}

	#[test]
	fn empty_and_punctuation_only_give_nothing() {
		let t = Tokenizer::default();
		assert!(t.tokenize("").is_empty());
		assert!(t.tokenize("  ?!... --- ").is_empty());
	}

	#[test]
	fn unicode_letters_are_kept() {
		let t = Tokenizer::new(3);
		assert_eq!(t.tokenize("Prüfung café"), vec!["prüfung", "café"]);
	}
}
