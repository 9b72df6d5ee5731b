//! Tabular block detection over text units.
//!
//! A tabular block is a maximal run of two or more numeric-looking lines
//! separated by single line breaks. Detection is a two-level lexer: a per-line
//! state machine decides whether a line is numeric-looking, and a run tracker
//! groups consecutive numeric lines. A single numeric line never forms a block
//! and stays in the prose.
//!
//! A numeric-looking line is, after trimming spaces, tabs and a trailing
//! carriage return: an optional `(`, one or more comma-separated groups of one
//! to three digits, an optional `.` fraction, and an optional `)`.
//!
//! | line          | numeric |
//! |---------------|---------|
//! | `1,234`       | yes     |
//! | `(567)`       | yes     |
//! | `89.5`        | yes     |
//! | `1234`        | no      |
//! | `$1,234`      | no      |
//! | `12 months`   | no      |

use crate::types::RowContent;

/// Lexer states for one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineState {
    Start,
    OpenParen,
    /// Inside a digit group, with the number of digits seen so far
    Group(u8),
    Comma,
    Dot,
    Fraction,
    CloseParen,
}

const fn is_padding(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r')
}

/// Whether a single line is numeric-looking.
#[must_use = "returns whether the line is numeric-looking"]
pub fn is_numeric_line(line: &str) -> bool {
    let mut state = LineState::Start;
    for ch in line.trim_matches(is_padding).chars() {
        state = match (state, ch) {
            (LineState::Start, '(') => LineState::OpenParen,
            (LineState::Start | LineState::OpenParen | LineState::Comma, '0'..='9') => {
                LineState::Group(1)
            }
            (LineState::Group(n), '0'..='9') if n < 3 => LineState::Group(n + 1),
            (LineState::Group(_), ',') => LineState::Comma,
            (LineState::Group(_), '.') => LineState::Dot,
            (LineState::Dot | LineState::Fraction, '0'..='9') => LineState::Fraction,
            (LineState::Group(_) | LineState::Fraction, ')') => LineState::CloseParen,
            _ => return false,
        };
    }
    matches!(
        state,
        LineState::Group(_) | LineState::Fraction | LineState::CloseParen
    )
}

/// A contiguous piece of a text unit: either a tabular block or the text
/// between blocks.
///
/// `Block` and `Text` both borrow the exact byte range of their lines in the
/// original text, without the line breaks that separate them from neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Prose (lone numeric lines included)
    Text(&'a str),
    /// Two or more consecutive numeric-looking lines
    Block(&'a str),
}

#[derive(Debug, Clone, Copy)]
struct Line {
    start: usize,
    end: usize,
    numeric: bool,
}

fn lex_lines(text: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut start = 0;
    for raw in text.split('\n') {
        let end = start + raw.len();
        lines.push(Line {
            start,
            end,
            numeric: is_numeric_line(raw),
        });
        start = end + 1;
    }
    lines
}

/// Split text into alternating text and block segments, in textual order.
///
/// Block segments are maximal: a run of numeric lines is never split, and two
/// blocks are always separated by at least one non-numeric line.
#[must_use = "returns the segments of the text"]
pub fn segments(text: &str) -> Vec<Segment<'_>> {
    let lines = lex_lines(text);
    let mut out = Vec::new();
    let mut text_start: Option<usize> = None;
    let mut text_end = 0;
    let mut i = 0;

    while i < lines.len() {
        let run_len = lines[i..].iter().take_while(|line| line.numeric).count();
        if run_len >= 2 {
            if let Some(start) = text_start.take() {
                out.push(Segment::Text(&text[start..text_end]));
            }
            let block = &text[lines[i].start..lines[i + run_len - 1].end];
            out.push(Segment::Block(block));
            i += run_len;
        } else {
            // Covers both a prose line and a lone numeric line.
            text_start.get_or_insert(lines[i].start);
            text_end = lines[i].end;
            i += 1;
        }
    }
    if let Some(start) = text_start {
        out.push(Segment::Text(&text[start..text_end]));
    }
    out
}

/// Result of classifying one text unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSplit {
    /// Text left after every block is removed, whitespace-collapsed and
    /// trimmed; `None` when nothing meaningful remains
    pub prose: Option<String>,
    /// Block lines (trimmed), one inner vector per block, in textual order
    pub blocks: Vec<Vec<String>>,
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Separate a text unit into its prose remainder and its tabular blocks.
#[must_use = "returns the classified unit"]
pub fn extract_blocks(unit: &str) -> TableSplit {
    let mut remainder = Vec::new();
    let mut blocks = Vec::new();

    for segment in segments(unit) {
        match segment {
            Segment::Text(text) => remainder.push(text),
            Segment::Block(block) => blocks.push(
                block
                    .split('\n')
                    .map(|line| line.trim_matches(is_padding).to_string())
                    .collect(),
            ),
        }
    }

    let prose = collapse_whitespace(&remainder.join("\n"));
    TableSplit {
        prose: (!prose.is_empty()).then_some(prose),
        blocks,
    }
}

/// Rows for one text unit: the prose remainder first (if any), then one
/// tabular row per block line.
#[must_use = "returns the rows of the unit"]
pub fn extract_rows(unit: &str) -> Vec<RowContent> {
    let split = extract_blocks(unit);
    split
        .prose
        .map(RowContent::Prose)
        .into_iter()
        .chain(split.blocks.into_iter().flatten().map(RowContent::TableValue))
        .collect()
}
