//! Bounded context assembly for the generative service.
//!
//! Passages are appended in rank order, separated by a blank line, until the
//! character budget runs out. A passage that does not fit whole contributes as
//! many of its leading sentences as fit, and assembly stops there. Only when
//! not even the first sentence of the first passage fits is the text cut at
//! the budget.

use qadesk_core::types::RetrievalResult;
use qadesk_text::chunker::split_sentences;

pub const PASSAGE_SEPARATOR: &str = "\n\n";

pub fn build_context(results: &[RetrievalResult], max_chars: usize) -> String {
    let mut context = String::new();
    let mut used = 0usize;

    for result in results {
        let passage = result.content.trim();
        if passage.is_empty() {
            continue;
        }
        let sep = if context.is_empty() { 0 } else { char_len(PASSAGE_SEPARATOR) };

        let len = char_len(passage);
        if used + sep + len <= max_chars {
            push_piece(&mut context, passage);
            used += sep + len;
            continue;
        }

        let mut partial = String::new();
        let mut partial_len = 0usize;
        for sentence in split_sentences(passage) {
            let extra = if partial.is_empty() { 0 } else { 1 };
            let next = partial_len + extra + char_len(sentence);
            if used + sep + next > max_chars {
                break;
            }
            if !partial.is_empty() {
                partial.push(' ');
            }
            partial.push_str(sentence);
            partial_len = next;
        }

        if !partial.is_empty() {
            push_piece(&mut context, &partial);
        } else if context.is_empty() {
            context = passage.chars().take(max_chars).collect();
        }
        break;
    }

    context
}

fn push_piece(context: &mut String, piece: &str) {
    if !context.is_empty() {
        context.push_str(PASSAGE_SEPARATOR);
    }
    context.push_str(piece);
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(content: &str) -> RetrievalResult {
        RetrievalResult { chunk_id: "c".into(), doc_id: "d".into(), content: content.into(), similarity: 0.5 }
    }

    #[test]
    fn whole_passages_in_rank_order() {
        let ctx = build_context(&[passage("First one."), passage("Second one.")], 100);
        assert_eq!(ctx, "First one.\n\nSecond one.");
    }

    #[test]
    fn overflowing_passage_contributes_leading_sentences() {
        let ctx = build_context(&[passage("Alpha here."), passage("Bravo here. Charlie is a much longer sentence.")], 26);
        assert_eq!(ctx, "Alpha here.\n\nBravo here.");
        assert!(ctx.chars().count() <= 26);
    }

    #[test]
    fn stops_after_first_partial_passage() {
        let ctx = build_context(&[passage("Short. Then a long tail sentence."), passage("Tiny.")], 10);
        assert_eq!(ctx, "Short.");
    }

    #[test]
    fn hard_cut_when_first_sentence_too_long() {
        let ctx = build_context(&[passage("Averyveryverylongsentencewithoutbreaks.")], 8);
        assert_eq!(ctx, "Averyver");
    }

    #[test]
    fn deterministic_and_empty_safe() {
        assert_eq!(build_context(&[], 100), "");
        let results = [passage("One. Two."), passage("Three.")];
        assert_eq!(build_context(&results, 12), build_context(&results, 12));
    }
}
