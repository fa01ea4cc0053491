//! Whitespace-collapsed view of a text that remembers where every byte came from.
//!
//! Collapsing runs of whitespace shifts offsets, so a match found in the
//! collapsed text cannot be spliced into the original directly. The view is built
//! by walking the original once, in lock-step with the collapsed output, and
//! recording the original byte offset of each collapsed byte.

use std::ops::Range;

/// Collapsed text plus an offset map back into the original.
#[derive(Debug, Clone)]
pub struct NormalizedText {
    text: String,
    /// `offsets[i]` is the original byte offset of collapsed byte `i`. A
    /// collapsed space maps to the first byte of the whitespace run it replaced.
    offsets: Vec<usize>,
}

impl NormalizedText {
    /// Collapse every whitespace run of `original` to one space and trim both ends.
    pub fn new(original: &str) -> Self {
        let mut text = String::with_capacity(original.len());
        let mut offsets = Vec::with_capacity(original.len());
        let mut pending_run: Option<usize> = None;

        for (i, c) in original.char_indices() {
            if c.is_whitespace() {
                // Leading whitespace never opens a run.
                if !text.is_empty() && pending_run.is_none() {
                    pending_run = Some(i);
                }
                continue;
            }

            if let Some(run_start) = pending_run.take() {
                text.push(' ');
                offsets.push(run_start);
            }
            text.push(c);
            offsets.extend(i..i + c.len_utf8());
        }
        // A run still pending here is trailing whitespace, which is trimmed.

        Self { text, offsets }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Locate `quote` (after collapsing its own whitespace) and return the byte
    /// range of the matching span in the original text.
    ///
    /// The range starts at the first non-whitespace character of the match and
    /// ends after the last one, so whitespace around the span is never consumed.
    /// Returns `None` for a blank quote or when there is no match.
    pub fn find_original_span(&self, quote: &str) -> Option<Range<usize>> {
        let needle = normalize_whitespace(quote);
        if needle.is_empty() {
            return None;
        }

        let start = self.text.find(&needle)?;
        let last = start + needle.len() - 1;

        let original_start = *self.offsets.get(start)?;
        let original_end = *self.offsets.get(last)? + 1;
        Some(original_start..original_end)
    }
}

/// Collapse whitespace runs to single spaces and trim.
pub fn normalize_whitespace(s: &str) -> String {
    NormalizedText::new(s).text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span<'a>(original: &'a str, quote: &str) -> Option<&'a str> {
        NormalizedText::new(original)
            .find_original_span(quote)
            .map(|r| &original[r])
    }

    #[test]
    fn test_normalize_matches_split_whitespace() {
        let inputs = [
            "",
            "   ",
            "a",
            "  a  b  ",
            "line one\r\n\r\n\tline two",
            "tabs\t\tand\u{00A0}nbsp",
            "ünïcödé   wörds\n",
        ];
        for input in inputs {
            let expected = input.split_whitespace().collect::<Vec<_>>().join(" ");
            assert_eq!(normalize_whitespace(input), expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_offsets_cover_every_byte() {
        let original = "  Über \n\n cost  ";
        let normalized = NormalizedText::new(original);
        assert_eq!(normalized.as_str(), "Über cost");
        assert_eq!(normalized.offsets.len(), normalized.as_str().len());
        // The collapsed space points at the first whitespace byte after "Über".
        let space = normalized.as_str().find(' ').unwrap();
        assert_eq!(normalized.offsets[space], 2 + "Über".len());
    }

    #[test]
    fn test_span_with_irregular_inner_whitespace() {
        let original = "Intro. Revenue   grew\nsignificantly. Outro.";
        assert_eq!(
            span(original, "Revenue grew significantly."),
            Some("Revenue   grew\nsignificantly.")
        );
    }

    #[test]
    fn test_span_excludes_surrounding_whitespace_runs() {
        let original = "Intro.\n\n   \t Revenue grew\r\n\r\n significantly. \n\n  \tOutro.";
        assert_eq!(
            span(original, "Revenue grew significantly."),
            Some("Revenue grew\r\n\r\n significantly.")
        );
    }

    #[test]
    fn test_quote_with_padding_and_own_irregular_whitespace() {
        let original = "Revenue grew significantly.";
        assert_eq!(
            span(original, " \n Revenue\t\tgrew  significantly. \n"),
            Some("Revenue grew significantly.")
        );
    }

    #[test]
    fn test_span_at_text_boundaries() {
        let original = "\n\nRevenue  grew";
        assert_eq!(span(original, "Revenue grew"), Some("Revenue  grew"));

        let original = "Revenue  grew\n\n";
        assert_eq!(span(original, "Revenue grew"), Some("Revenue  grew"));
    }

    #[test]
    fn test_span_with_multibyte_characters() {
        let original = "Le chiffre d’affaires a\u{00A0}augmenté — fortement. Fin.";
        assert_eq!(
            span(original, "a augmenté — fortement."),
            Some("a\u{00A0}augmenté — fortement.")
        );
    }

    #[test]
    fn test_quote_mid_word_boundary() {
        // Collapsed matching is plain substring matching; it can start inside a word.
        let original = "Unrevenue   grew";
        assert_eq!(span(original, "revenue grew"), Some("revenue   grew"));
    }

    #[test]
    fn test_blank_or_missing_quote() {
        let normalized = NormalizedText::new("some text");
        assert_eq!(normalized.find_original_span(""), None);
        assert_eq!(normalized.find_original_span(" \n\t "), None);
        assert_eq!(normalized.find_original_span("other"), None);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let original = "a  b then a\nb";
        let range = NormalizedText::new(original).find_original_span("a b").unwrap();
        assert_eq!(range, 0..4);
    }
}
