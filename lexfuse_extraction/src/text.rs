//! Sentence segmentation and clause cleanup.

use std::ops::Range;

/// Byte ranges of the sentences in `text`.
///
/// A sentence ends at `.`, `!` or `?` followed by whitespace (or the end of
/// the text), or at a line break. Ranges are trimmed and never empty.
#[must_use]
pub fn sentence_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((index, c)) = chars.next() {
        let boundary = match c {
            '\n' => Some(index),
            '.' | '!' | '?' => match chars.peek() {
                None => Some(index + c.len_utf8()),
                Some((_, next)) if next.is_whitespace() => Some(index + c.len_utf8()),
                Some(_) => None,
            },
            _ => None,
        };
        if let Some(end) = boundary {
            push_trimmed(text, start..end, &mut spans);
            start = end;
        }
    }
    push_trimmed(text, start..text.len(), &mut spans);
    spans
}

fn push_trimmed(text: &str, range: Range<usize>, spans: &mut Vec<Range<usize>>) {
    let slice = &text[range.clone()];
    let leading = slice.len() - slice.trim_start().len();
    let trailing = slice.len() - slice.trim_end().len();
    let trimmed = range.start + leading..range.end - trailing;
    if trimmed.start < trimmed.end {
        spans.push(trimmed);
    }
}

/// The sentences of `text`, trimmed.
#[must_use]
pub fn sentences(text: &str) -> Vec<&str> {
    sentence_spans(text)
        .into_iter()
        .map(|span| &text[span])
        .collect()
}

/// The sentence containing byte offset `at`, or the whole text if none does.
#[must_use]
pub fn enclosing_sentence(text: &str, at: usize) -> &str {
    sentence_spans(text)
        .into_iter()
        .find(|span| span.start <= at && at < span.end)
        .map_or(text, |span| &text[span])
}

/// Collapse runs of whitespace into single spaces.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse whitespace and strip trailing clause punctuation.
#[must_use]
pub fn clean_clause(raw: &str) -> String {
    collapse_whitespace(raw)
        .trim_end_matches(|c: char| matches!(c, '.' | ';' | ',' | ':') || c.is_whitespace())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_terminal_punctuation_and_newlines() {
        let text = "Sec. 1. Purpose.\nThe Secretary shall act. Costs fell 1.5 percent! Done";
        assert_eq!(
            sentences(text),
            vec![
                "Sec.",
                "1.",
                "Purpose.",
                "The Secretary shall act.",
                "Costs fell 1.5 percent!",
                "Done"
            ]
        );
    }

    #[test]
    fn enclosing_sentence_finds_containing_span() {
        let text = "First sentence. Within 90 days, the Secretary shall report.";
        let at = text.find("Secretary").unwrap_or_default();
        assert_eq!(
            enclosing_sentence(text, at),
            "Within 90 days, the Secretary shall report."
        );
    }

    #[test]
    fn clean_clause_trims_punctuation_and_spacing() {
        assert_eq!(
            clean_clause("shall  submit\n a report by March 1, 2025. "),
            "shall submit a report by March 1, 2025"
        );
    }
}
