//! Page text segmentation into text units.
//!
//! Two modes, chosen once per run:
//!
//! - [`SegmentationMode::Naive`]: one prose row per non-blank line, no table
//!   detection at all.
//! - [`SegmentationMode::Sentences`]: tabular blocks are cut out as units of
//!   their own, the text between them is split by a [`SentenceBoundary`], and
//!   every unit goes through [`crate::table::extract_rows`].

use crate::table::{self, Segment};
use crate::types::RowContent;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// How page text is cut into units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentationMode {
    /// Split on line breaks; every kept line is prose
    #[default]
    Naive,
    /// Sentence-boundary segmentation with tabular block detection
    Sentences,
}

/// Sentence-boundary capability.
///
/// Implementations return consecutive, non-overlapping slices of `text` in
/// order. Slices may keep surrounding whitespace; the table extractor
/// normalizes it.
///
/// [`Segmenter`] cuts tabular blocks out of the page before calling a
/// boundary, so `text` is never the whole page: it is one stretch of text
/// between blocks (or the whole page only when it has no block). A sentence
/// that runs across a block arrives as two separate calls.
pub trait SentenceBoundary: Send + Sync {
    /// Split `text` into sentence-level units
    fn split<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

/// UAX #29 sentence boundaries that do not break on bare line wraps.
///
/// UAX #29 ends a sentence at every line feed. PDF text is hard-wrapped, so a
/// piece that ends in a line break without sentence-final punctuation is
/// joined with the piece that follows it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UnicodeSentences;

fn ends_sentence(piece: &str) -> bool {
    piece
        .trim_end()
        .trim_end_matches(['"', '\'', ')', ']', '\u{201d}', '\u{2019}'])
        .ends_with(['.', '!', '?'])
}

impl SentenceBoundary for UnicodeSentences {
    fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut units = Vec::new();
        let mut start: Option<usize> = None;

        for (offset, piece) in text.split_sentence_bound_indices() {
            let unit_start = *start.get_or_insert(offset);
            if ends_sentence(piece) || !piece.ends_with('\n') {
                units.push(&text[unit_start..offset + piece.len()]);
                start = None;
            }
        }
        if let Some(unit_start) = start {
            units.push(&text[unit_start..]);
        }
        units
    }
}

/// Cuts page text into rows according to the run's [`SegmentationMode`].
pub struct Segmenter {
    mode: SegmentationMode,
    boundary: Box<dyn SentenceBoundary>,
}

impl std::fmt::Debug for Segmenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Segmenter").field("mode", &self.mode).finish()
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(SegmentationMode::default())
    }
}

impl Segmenter {
    /// Create a segmenter using [`UnicodeSentences`] for sentence mode
    #[inline]
    #[must_use = "creates a segmenter that should be used"]
    pub fn new(mode: SegmentationMode) -> Self {
        Self::with_boundary(mode, Box::new(UnicodeSentences))
    }

    /// Create a segmenter with a custom sentence-boundary capability
    #[must_use = "creates a segmenter that should be used"]
    pub fn with_boundary(mode: SegmentationMode, boundary: Box<dyn SentenceBoundary>) -> Self {
        Self { mode, boundary }
    }

    /// The mode this segmenter runs in
    #[inline]
    #[must_use = "returns the segmentation mode"]
    pub const fn mode(&self) -> SegmentationMode {
        self.mode
    }

    /// Text units of a page, in textual order.
    ///
    /// In naive mode these are the kept lines; empty lines and lines made of a
    /// single space are dropped.
    #[must_use = "returns the text units"]
    pub fn units<'a>(&self, page_text: &'a str) -> Vec<&'a str> {
        match self.mode {
            SegmentationMode::Naive => page_text
                .split('\n')
                .filter(|line| !line.is_empty() && *line != " ")
                .collect(),
            SegmentationMode::Sentences => {
                let mut units = Vec::new();
                for segment in table::segments(page_text) {
                    match segment {
                        Segment::Block(block) => units.push(block),
                        Segment::Text(text) => units.extend(self.boundary.split(text)),
                    }
                }
                units
            }
        }
    }

    /// Rows of a page, in textual order.
    #[must_use = "returns the rows of the page"]
    pub fn segment(&self, page_text: &str) -> Vec<RowContent> {
        let units = self.units(page_text);
        match self.mode {
            // Naive rows never go through table detection, even for numeric lines.
            SegmentationMode::Naive => units
                .into_iter()
                .map(|line| RowContent::Prose(line.to_string()))
                .collect(),
            SegmentationMode::Sentences => {
                units.into_iter().flat_map(table::extract_rows).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = "Revenue increased.\n1,234\n(567)\n89.5\nNet effect stated above.";

    fn prose(text: &str) -> RowContent {
        RowContent::Prose(text.to_string())
    }

    fn value(text: &str) -> RowContent {
        RowContent::TableValue(text.to_string())
    }

    #[test]
    fn test_sentence_mode_worked_example() {
        let rows = Segmenter::new(SegmentationMode::Sentences).segment(EXAMPLE);
        assert_eq!(
            rows,
            vec![
                prose("Revenue increased."),
                value("1,234"),
                value("(567)"),
                value("89.5"),
                prose("Net effect stated above."),
            ]
        );
    }

    #[test]
    fn test_naive_mode_never_classifies_tables() {
        let rows = Segmenter::new(SegmentationMode::Naive).segment(EXAMPLE);
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|row| !row.is_table_value()));
        assert_eq!(rows[1], prose("1,234"));
    }

    #[test]
    fn test_naive_mode_drops_empty_and_single_space_lines() {
        let rows = Segmenter::new(SegmentationMode::Naive).segment("a\n\n \nb\n  \n");
        assert_eq!(rows, vec![prose("a"), prose("b"), prose("  ")]);
    }

    #[test]
    fn test_unicode_sentences_joins_wrapped_lines() {
        let units = UnicodeSentences.split("First line\ncontinues here. Second sentence.");
        assert_eq!(units, vec!["First line\ncontinues here. ", "Second sentence."]);
    }

    #[test]
    fn test_unicode_sentences_breaks_after_terminal_line() {
        let units = UnicodeSentences.split("He said \"stop.\"\nThen left.");
        assert_eq!(units, vec!["He said \"stop.\"\n", "Then left."]);
    }

    #[test]
    fn test_unicode_sentences_keeps_unterminated_tail() {
        let units = UnicodeSentences.split("Heading without period\n");
        assert_eq!(units, vec!["Heading without period\n"]);
    }

    #[test]
    fn test_sentence_mode_lone_number_stays_in_sentence() {
        let rows = Segmenter::new(SegmentationMode::Sentences).segment("See note\n12\nfor details.");
        assert_eq!(rows, vec![prose("See note 12 for details.")]);
    }

    #[test]
    fn test_sentence_mode_block_inside_sentence_splits_it() {
        let rows = Segmenter::new(SegmentationMode::Sentences)
            .segment("Totals were\n1\n2\nrespectively.");
        assert_eq!(
            rows,
            vec![prose("Totals were"), value("1"), value("2"), prose("respectively.")]
        );
    }

    #[test]
    fn test_sentence_mode_empty_page() {
        let segmenter = Segmenter::new(SegmentationMode::Sentences);
        assert!(segmenter.segment("").is_empty());
        assert!(segmenter.segment(" \n ").is_empty());
    }

    struct WholeText;

    impl SentenceBoundary for WholeText {
        fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
            vec![text]
        }
    }

    #[test]
    fn test_custom_boundary_is_used_between_blocks() {
        let segmenter = Segmenter::with_boundary(SegmentationMode::Sentences, Box::new(WholeText));
        let units = segmenter.units("One. Two.\n1\n2\nThree.");
        assert_eq!(units, vec!["One. Two.", "1\n2", "Three."]);
        assert_eq!(segmenter.mode(), SegmentationMode::Sentences);
    }
}
