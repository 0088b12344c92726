//! Normalization of raw extracted text.
//!
//! The pipeline runs a fixed sequence of repairs: whitespace collapsing,
//! OCR word-boundary repair, sentence spacing, and line-level cleanup with
//! sentence capitalization. Order matters: each step consumes the previous
//! step's output. The whole function is pure and idempotent.

use once_cell::sync::Lazy;
use regex::Regex;

static EXCESS_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n\s*\n").expect("excess newline pattern is valid"));
static HORIZONTAL_WS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+").expect("horizontal whitespace pattern is valid"));
static WS_AROUND_NEWLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]*\n[ \t]*").expect("newline padding pattern is valid"));
static LOST_WORD_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z])([A-Z])").expect("word boundary pattern is valid"));
static LOST_SENTENCE_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w)([.!?])(\w)").expect("sentence spacing pattern is valid"));
static SENTENCE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|\. )([a-z])").expect("sentence start pattern is valid"));
static PAGE_MARKER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)\n?^--- PAGE \d+ ---$\n?").expect("page marker pattern is valid")
});

/// Page-boundary marker inserted between pages in the raw extraction
/// stream. Both extraction adapters emit the identical format.
pub fn page_marker(page: usize) -> String {
    format!("\n--- PAGE {page} ---\n")
}

/// Remove page-boundary marker lines from a raw extraction stream. The
/// marker's surrounding newlines go with it, so adjacent pages join with
/// the single newline the page content already carries.
pub fn strip_page_markers(text: &str) -> String {
    PAGE_MARKER_LINE.replace_all(text, "").into_owned()
}

/// Clean and reformat extracted text.
///
/// Steps, in order:
/// 1. collapse runs of three or more newlines (whitespace-separated) to two
/// 2. collapse runs of horizontal whitespace to a single space
/// 3. trim horizontal whitespace adjacent to newlines
/// 4. insert a space where a lowercase letter runs into an uppercase one
/// 5. insert a space after sentence punctuation glued to the next word
/// 6. trim lines, collapse blank lines to one between paragraphs, and
///    capitalize the first letter of each line and each sentence
pub fn normalize(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let text = EXCESS_NEWLINES.replace_all(text, "\n\n");
    let text = HORIZONTAL_WS.replace_all(&text, " ");
    let text = WS_AROUND_NEWLINE.replace_all(&text, "\n");
    let text = LOST_WORD_BOUNDARY.replace_all(&text, "${1} ${2}");
    let text = LOST_SENTENCE_SPACE.replace_all(&text, "${1}${2} ${3}");

    let mut lines: Vec<String> = Vec::new();
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            // single blank line between paragraphs, never at the start
            if lines.last().is_some_and(|prev| !prev.is_empty()) {
                lines.push(String::new());
            }
        } else {
            let capitalized = SENTENCE_START.replace_all(line, |caps: &regex::Captures<'_>| {
                format!("{}{}", &caps[1], caps[2].to_uppercase())
            });
            lines.push(capitalized.into_owned());
        }
    }
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_whitespace_only() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\t \n"), "");
    }

    #[test]
    fn test_collapses_excess_newlines() {
        assert_eq!(normalize("First.\n\n\n\n\nSecond."), "First.\n\nSecond.");
        assert_eq!(normalize("First.\n \n\t\nSecond."), "First.\n\nSecond.");
    }

    #[test]
    fn test_collapses_horizontal_whitespace() {
        assert_eq!(normalize("Spaced   out\t\twords"), "Spaced out words");
    }

    #[test]
    fn test_trims_whitespace_around_newlines() {
        assert_eq!(normalize("Line one   \n   line two"), "Line one\nLine two");
    }

    #[test]
    fn test_repairs_lost_word_boundaries() {
        assert_eq!(normalize("wordBoundary lost"), "Word Boundary lost");
    }

    #[test]
    fn test_inserts_space_after_sentence_punctuation() {
        assert_eq!(normalize("First.Second!Third?Done"), "First. Second! Third? Done");
    }

    #[test]
    fn test_capitalizes_line_and_sentence_starts() {
        assert_eq!(normalize("the start. of sentences"), "The start. Of sentences");
        assert_eq!(normalize("one\ntwo"), "One\nTwo");
    }

    #[test]
    fn test_preserves_single_paragraph_break() {
        assert_eq!(normalize("Para one.\n\nPara two."), "Para one.\n\nPara two.");
    }

    #[test]
    fn test_drops_leading_and_trailing_blank_lines() {
        assert_eq!(normalize("\n\nBody text\n\n"), "Body text");
    }

    #[test]
    fn test_idempotent_on_samples() {
        let samples = [
            "a messy   OCRoutput.with\tglued words\n\n\n\nand paragraphs\n",
            "Hello World",
            "line one\nline two\n\n\nline three",
            "sentence.end! next?one",
            "  padded \n\n  lines  \n",
        ];
        for sample in samples {
            let once = normalize(sample);
            let twice = normalize(&once);
            assert_eq!(once, twice, "normalize not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_page_marker_format() {
        assert_eq!(page_marker(7), "\n--- PAGE 7 ---\n");
    }

    #[test]
    fn test_strip_page_markers() {
        let raw = format!("{}Hello World\n{}Second page\n", page_marker(1), page_marker(2));
        let stripped = strip_page_markers(&raw);
        assert!(!stripped.contains("--- PAGE"));
        assert_eq!(normalize(&stripped), "Hello World\nSecond page");
    }

    #[test]
    fn test_strip_leaves_regular_text_alone() {
        assert_eq!(strip_page_markers("no markers here"), "no markers here");
    }
}
