//! Flashcard parser for free-form markdown documents.
//!
//! # Format
//! ```markdown
//! What is Rust? :: A systems programming language.
//! <!--OBOERU:{...}-->
//!
//! Explain borrowing
//! <!--OBOERU:{...}-->
//! ?
//! Borrowing allows references without ownership.
//! Multiple lines are supported.
//! +++
//! ```
//!
//! Parsing never fails. Text that is not a card is skipped.

use crate::metadata;
use crate::types::{Card, CardFormat};

const SEPARATOR: &str = "::";
const ANSWER_MARKER: &str = "?";
const END_MARKER: &str = "+++";

/// Split a document into lines, accepting both `\n` and `\r\n`.
///
/// A trailing line terminator produces a trailing empty line, so joining the
/// result with the original terminator reproduces the document.
pub fn split_lines(content: &str) -> Vec<&str> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Line terminator used by a document.
pub fn line_ending(content: &str) -> &'static str {
    if content.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Parse document text into cards, in document order.
pub fn parse(content: &str) -> Vec<Card> {
    let lines = split_lines(content);
    let mut parser = Parser::new(&lines);
    parser.run();
    tracing::debug!(cards = parser.cards.len(), lines = lines.len(), "parsed document");
    parser.cards
}

struct Parser<'a> {
    lines: &'a [&'a str],
    cursor: usize,
    cards: Vec<Card>,
}

impl<'a> Parser<'a> {
    fn new(lines: &'a [&'a str]) -> Self {
        Self {
            lines,
            cursor: 0,
            cards: Vec::new(),
        }
    }

    fn run(&mut self) {
        while self.cursor < self.lines.len() {
            let line = self.lines[self.cursor];
            self.cursor = match Self::classify(line) {
                LineType::Skip => self.cursor + 1,
                LineType::Single(question, answer) => self.single(question, answer),
                LineType::Text => self.multi().unwrap_or(self.cursor + 1),
            };
        }
    }

    fn classify(line: &str) -> LineType<'_> {
        if line.trim().is_empty() || metadata::is_marker(line) {
            return LineType::Skip;
        }
        if let Some((left, right)) = line.split_once(SEPARATOR) {
            let (question, answer) = (left.trim(), right.trim());
            if !question.is_empty() && !answer.is_empty() {
                return LineType::Single(question, answer);
            }
        }
        LineType::Text
    }

    fn line(&self, index: usize) -> Option<&'a str> {
        self.lines.get(index).copied()
    }

    fn marker_at(&self, index: usize) -> Option<usize> {
        self.line(index)
            .filter(|line| metadata::is_marker(line))
            .map(|_| index)
    }

    /// Record a one-line card and return the next line to scan.
    fn single(&mut self, question: &str, answer: &str) -> usize {
        let question_line = self.cursor;
        let meta_line = self.marker_at(question_line + 1);
        self.push(CardFormat::Single, question.to_string(), answer.to_string(), question_line, meta_line);
        question_line + 1
    }

    /// Try the current line as a multi-line card header.
    ///
    /// Returns the line after the `+++` terminator, or `None` when the block
    /// is not a complete card.
    fn multi(&mut self) -> Option<usize> {
        let question_line = self.cursor;
        let meta_line = self.marker_at(question_line + 1);
        let marker_index = meta_line.map_or(question_line + 1, |line| line + 1);

        if self.line(marker_index)?.trim() != ANSWER_MARKER {
            return None;
        }

        let answer_start = marker_index + 1;
        let end = (answer_start..self.lines.len()).find(|&i| self.lines[i].trim() == END_MARKER)?;

        let answer = self.lines[answer_start..end].join("\n").trim().to_string();
        let question = self.lines[question_line].trim().to_string();
        self.push(CardFormat::Multi, question, answer, question_line, meta_line);
        Some(end + 1)
    }

    fn push(
        &mut self,
        format: CardFormat,
        question: String,
        answer: String,
        question_line: usize,
        meta_line: Option<usize>,
    ) {
        let metadata = meta_line.and_then(|line| metadata::decode(self.lines[line]));
        self.cards.push(Card {
            order: self.cards.len(),
            format,
            question,
            answer,
            question_line,
            meta_line,
            metadata,
        });
    }
}

enum LineType<'a> {
    Skip,
    Single(&'a str, &'a str),
    Text,
}

/// Write a marker for a card into the document, returning the new text.
///
/// `meta_line` replaces an existing marker; otherwise the marker is inserted
/// directly below `question_line`. Indices refer to `split_lines(content)`.
pub fn patch_metadata(
    content: &str,
    question_line: usize,
    meta_line: Option<usize>,
    marker: &str,
) -> String {
    let mut lines = split_lines(content);
    match meta_line {
        Some(index) if index < lines.len() => lines[index] = marker,
        _ => {
            let insert_at = (question_line + 1).min(lines.len());
            lines.insert(insert_at, marker);
        }
    }
    lines.join(line_ending(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MARKER: &str = "<!--OBOERU:{\"v\":1,\"algo\":\"fsrs-6\",\"reviewedAt\":\"2024-05-01T09:15:00.000Z\",\"dueAt\":\"2024-05-04T09:15:00.000Z\",\"s\":2.31,\"d\":5,\"rating\":3,\"reviews\":1,\"lapses\":0}-->";

    #[test]
    fn parse_single_card() {
        let cards = parse("What is Rust? :: A systems programming language.");
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].order, 0);
        assert_eq!(cards[0].format, CardFormat::Single);
        assert_eq!(cards[0].question, "What is Rust?");
        assert_eq!(cards[0].answer, "A systems programming language.");
        assert_eq!(cards[0].question_line, 0);
        assert_eq!(cards[0].meta_line, None);
        assert_eq!(cards[0].metadata, None);
    }

    #[test]
    fn parse_single_card_with_metadata() {
        let input = format!("# Deck #flashcards\n\nQ1 :: A1\n{MARKER}\nQ2 :: A2");
        let cards = parse(&input);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].question_line, 2);
        assert_eq!(cards[0].meta_line, Some(3));
        assert_eq!(cards[0].metadata.as_ref().map(|m| m.reviews), Some(1));
        assert_eq!(cards[1].question_line, 4);
        assert_eq!(cards[1].meta_line, None);
    }

    #[test]
    fn parse_multiline_card() {
        let input = "Explain borrowing\n?\nLine 1\nLine 2\n\nLine 4\n+++\nafter :: card";
        let cards = parse(input);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].format, CardFormat::Multi);
        assert_eq!(cards[0].question, "Explain borrowing");
        assert_eq!(cards[0].answer, "Line 1\nLine 2\n\nLine 4");
        assert_eq!(cards[1].order, 1);
        assert_eq!(cards[1].question, "after");
    }

    #[test]
    fn parse_multiline_card_with_metadata() {
        let input = format!("  Explain moves  \n{MARKER}\n ? \n  answer  \n +++ ");
        let cards = parse(&input);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].question, "Explain moves");
        assert_eq!(cards[0].answer, "answer");
        assert_eq!(cards[0].meta_line, Some(1));
        assert!(cards[0].metadata.is_some());
    }

    #[test]
    fn missing_terminator_does_not_swallow_document() {
        let input = "Broken header\n?\nanswer without end\n\nQ1 :: A1\nQ2 :: A2";
        let cards = parse(input);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].question, "Q1");
        assert_eq!(cards[0].order, 0);
        assert_eq!(cards[1].question, "Q2");
        assert_eq!(cards[1].order, 1);
    }

    #[test]
    fn prose_is_not_a_card() {
        let input = "Some notes\nmore notes\n\n?\n\nnot :: \n:: nothing";
        assert!(parse(input).is_empty());
    }

    #[test]
    fn empty_side_separator_line_can_head_a_multi_card() {
        let input = "Translate :: \n?\nanswer\n+++";
        let cards = parse(input);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].format, CardFormat::Multi);
        assert_eq!(cards[0].question, "Translate ::");
    }

    #[test]
    fn separator_splits_on_first_occurrence() {
        let cards = parse("Path separator in Rust :: std::path::MAIN_SEPARATOR");
        assert_eq!(cards[0].question, "Path separator in Rust");
        assert_eq!(cards[0].answer, "std::path::MAIN_SEPARATOR");
    }

    #[test]
    fn foreign_marker_is_captured_but_not_decoded() {
        let foreign = MARKER.replace("fsrs-6", "fsrs-7");
        let cards = parse(&format!("Q :: A\n{foreign}"));
        assert_eq!(cards[0].meta_line, Some(1));
        assert_eq!(cards[0].metadata, None);
    }

    #[test]
    fn crlf_documents_use_the_same_line_indices() {
        let lf = parse("Q1 :: A1\n\nQ2\n?\nA2\n+++\n");
        let crlf = parse("Q1 :: A1\r\n\r\nQ2\r\n?\r\nA2\r\n+++\r\n");
        assert_eq!(lf, crlf);
        assert_eq!(crlf[1].answer, "A2");
    }

    #[test]
    fn parsing_is_deterministic() {
        let input = format!("Q1 :: A1\n{MARKER}\nQ2\n?\nA2\n+++\nbroken\n?\nQ3 :: A3");
        assert_eq!(parse(&input), parse(&input));
    }

    #[test]
    fn parse_empty_content() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n").is_empty());
    }

    #[test]
    fn split_and_join_preserve_document() {
        let content = "a\r\nb\r\n";
        assert_eq!(split_lines(content), vec!["a", "b", ""]);
        assert_eq!(split_lines(content).join(line_ending(content)), content);
    }

    #[test]
    fn patch_replaces_existing_marker() {
        let content = "Q1 :: A1\n<!--OBOERU:old-->\nQ2 :: A2";
        let patched = patch_metadata(content, 0, Some(1), "<!--OBOERU:new-->");
        assert_eq!(patched, "Q1 :: A1\n<!--OBOERU:new-->\nQ2 :: A2");
    }

    #[test]
    fn patch_inserts_after_question_line() {
        let content = "Q1 :: A1\r\nQ2 :: A2\r\n";
        let patched = patch_metadata(content, 0, None, "<!--OBOERU:new-->");
        assert_eq!(patched, "Q1 :: A1\r\n<!--OBOERU:new-->\r\nQ2 :: A2\r\n");
    }
}
