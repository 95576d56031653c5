//! Text helpers shared by the checkers: line resolution, proximity windows,
//! context snippets, pattern compilation and identifier generation.
//!
//! Offsets are byte offsets as produced by `regex`; window radii are counted
//! in characters so multi-byte text never splits a code point.

use invariant_gate_types::{InvariantId, Location};
use regex::{Regex, RegexBuilder};

use crate::error::{GateError, Result};

/// Characters of surrounding text kept on each side of a match in a snippet.
pub const CONTEXT_RADIUS: usize = 50;

const ELLIPSIS: &str = "...";

/// 1-indexed line containing byte offset `offset`.
pub fn line_number(text: &str, offset: usize) -> usize {
    let offset = offset.min(text.len());
    text.as_bytes()[..offset].iter().filter(|b| **b == b'\n').count() + 1
}

/// Byte range spanning `radius` characters before `start` and after `end`.
pub fn window_bounds(text: &str, start: usize, end: usize, radius: usize) -> (usize, usize) {
    let lo = if radius == 0 {
        start
    } else {
        text[..start]
            .char_indices()
            .rev()
            .nth(radius - 1)
            .map(|(i, _)| i)
            .unwrap_or(0)
    };
    let hi = text[end..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    (lo, hi)
}

/// Slice of `text` within `radius` characters of the match `start..end`.
pub fn window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let (lo, hi) = window_bounds(text, start, end, radius);
    &text[lo..hi]
}

/// First `max_chars` characters of `s`.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

/// Whitespace-normalized snippet around a match, cut at `max_len`
/// characters with a trailing ellipsis.
pub fn context_snippet(text: &str, start: usize, end: usize, max_len: usize) -> String {
    let raw = window(text, start, end, CONTEXT_RADIUS);
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.chars().count() > max_len {
        format!("{}{}", truncate_chars(&normalized, max_len), ELLIPSIS)
    } else {
        normalized
    }
}

/// Location of a match with its line and context snippet.
pub fn locate(text: &str, file: &str, start: usize, end: usize, max_context: usize) -> Location {
    Location::at_line(file, line_number(text, start))
        .with_context(context_snippet(text, start, end, max_context))
}

/// Fresh `V-XXXX` identifier (4 uppercase hex digits).
pub fn violation_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("V-{}", hex[..4].to_uppercase())
}

/// Fresh `VR-xxxxxxxx` report identifier.
pub fn report_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("VR-{}", &hex[..8])
}

/// Compile a configured pattern: case-insensitive, optionally letting `.`
/// cross newlines.
pub fn compile_pattern(invariant: InvariantId, pattern: &str, dot_all: bool) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .dot_matches_new_line(dot_all)
        .build()
        .map_err(|source| GateError::InvalidPattern {
            invariant,
            pattern: pattern.to_string(),
            source,
        })
}

/// Alternation of literal keywords. `None` when the list is empty, so an
/// empty list never counts as "keyword present".
pub fn keyword_regex(keywords: &[String], case_insensitive: bool) -> Option<Regex> {
    let alternatives: Vec<String> = keywords
        .iter()
        .filter(|k| !k.is_empty())
        .map(|k| regex::escape(k))
        .collect();
    if alternatives.is_empty() {
        return None;
    }
    RegexBuilder::new(&format!("(?:{})", alternatives.join("|")))
        .case_insensitive(case_insensitive)
        .build()
        .ok()
}

/// Matches any of `tags` written as `[TAG]`. Case-sensitive.
pub fn epistemic_tag_regex(tags: &[String]) -> Option<Regex> {
    let alternatives: Vec<String> = tags
        .iter()
        .filter(|t| !t.is_empty())
        .map(|t| regex::escape(t))
        .collect();
    if alternatives.is_empty() {
        return None;
    }
    Regex::new(&format!(r"\[(?:{})\]", alternatives.join("|"))).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_numbers_are_one_indexed() {
        let text = "first\nsecond\nthird";
        assert_eq!(line_number(text, 0), 1);
        assert_eq!(line_number(text, 6), 2);
        assert_eq!(line_number(text, text.len()), 3);
        assert_eq!(line_number(text, 10_000), 3);
    }

    #[test]
    fn window_counts_characters() {
        let text = "ééé MATCH ééé";
        let start = text.find("MATCH").unwrap();
        let end = start + "MATCH".len();
        assert_eq!(window(text, start, end, 2), "é MATCH é");
        assert_eq!(window(text, start, end, 100), text);
        assert_eq!(window(text, start, end, 0), "MATCH");
    }

    #[test]
    fn snippet_normalizes_and_truncates() {
        let text = "alpha\n\n   beta\tgamma";
        let start = text.find("beta").unwrap();
        assert_eq!(context_snippet(text, start, start + 4, 200), "alpha beta gamma");

        let long = "x".repeat(400);
        let snippet = context_snippet(&long, 150, 160, 20);
        assert_eq!(snippet, format!("{}...", "x".repeat(20)));
    }

    #[test]
    fn violation_ids_match_format() {
        for _ in 0..50 {
            let id = violation_id();
            assert_eq!(id.len(), 6);
            assert!(id.starts_with("V-"));
            assert!(id[2..]
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
        }
        assert!(report_id().starts_with("VR-"));
        assert_eq!(report_id().len(), 11);
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = compile_pattern(InvariantId::I1, "(unclosed", false).unwrap_err();
        assert!(matches!(err, GateError::InvalidPattern { invariant: InvariantId::I1, .. }));
    }

    #[test]
    fn keyword_and_tag_regexes() {
        let kw = keyword_regex(&["verified".into(), "c++".into()], true).unwrap();
        assert!(kw.is_match("VERIFIED by hand"));
        assert!(kw.is_match("written in c++"));
        assert!(keyword_regex(&[], true).is_none());

        let tags = epistemic_tag_regex(&["OBSERVED".into(), "INFERRED".into()]).unwrap();
        assert!(tags.is_match("[OBSERVED] the run passed"));
        assert!(!tags.is_match("[observed] lowercase"));
        assert!(!tags.is_match("OBSERVED without brackets"));
    }
}
