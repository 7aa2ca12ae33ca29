//! Query-term highlighting for search result titles and summaries.
//!
//! Every whitespace-delimited query term of at least two characters is
//! matched case-insensitively. Matches of different terms that overlap or
//! touch are merged into a single span, so markers never nest.

use regex::RegexBuilder;
use serde::Serialize;
use std::ops::Range;

use crate::search::MIN_QUERY_LEN;

pub const MARK_OPEN: &str = "<mark>";
pub const MARK_CLOSE: &str = "</mark>";

/// A run of text that is either emphasised or plain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

/// Terms eligible for highlighting.
pub fn highlight_terms(query: &str) -> Vec<&str> {
    query
        .split_whitespace()
        .filter(|t| t.chars().count() >= MIN_QUERY_LEN)
        .collect()
}

/// Byte ranges of all term matches, sorted and merged.
pub fn match_ranges(text: &str, query: &str) -> Vec<Range<usize>> {
    let mut ranges: Vec<Range<usize>> = highlight_terms(query)
        .into_iter()
        .filter_map(|term| {
            RegexBuilder::new(&regex::escape(term))
                .case_insensitive(true)
                .build()
                .ok()
        })
        .flat_map(|re| re.find_iter(text).map(|m| m.range()).collect::<Vec<_>>())
        .collect();

    ranges.sort_by_key(|r| (r.start, r.end));

    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}

/// Split `text` into plain and highlighted segments.
pub fn highlight_segments(text: &str, query: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;
    for range in match_ranges(text, query) {
        if range.start > cursor {
            segments.push(Segment {
                text: text[cursor..range.start].to_string(),
                highlighted: false,
            });
        }
        segments.push(Segment {
            text: text[range.clone()].to_string(),
            highlighted: true,
        });
        cursor = range.end;
    }
    if cursor < text.len() {
        segments.push(Segment {
            text: text[cursor..].to_string(),
            highlighted: false,
        });
    }
    segments
}

/// Wrap matches in caller-chosen markers.
pub fn highlight_with(text: &str, query: &str, open: &str, close: &str) -> String {
    highlight_segments(text, query)
        .into_iter()
        .map(|s| {
            if s.highlighted {
                format!("{}{}{}", open, s.text, close)
            } else {
                s.text
            }
        })
        .collect()
}

/// Wrap matches in `<mark>` tags. Text without matches comes back unchanged.
pub fn highlight_text(text: &str, query: &str) -> String {
    highlight_with(text, query, MARK_OPEN, MARK_CLOSE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_match_is_identity() {
        let text = "Licensing <b>server</b> & client";
        assert_eq!(highlight_text(text, "install setup"), text);
        assert_eq!(highlight_text("", "install"), "");
    }

    #[test]
    fn test_case_insensitive_every_occurrence() {
        assert_eq!(
            highlight_text("Install, then install again", "INSTALL"),
            "<mark>Install</mark>, then <mark>install</mark> again"
        );
    }

    #[test]
    fn test_short_terms_ignored() {
        assert_eq!(highlight_text("a cat", "a cat"), "a <mark>cat</mark>");
    }

    #[test]
    fn test_overlapping_terms_merge() {
        assert_eq!(
            highlight_text("installation guide", "install stall"),
            "<mark>install</mark>ation guide"
        );
        assert_eq!(
            highlight_text("licenseserver", "license server"),
            "<mark>licenseserver</mark>"
        );
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        assert_eq!(highlight_text("use c++ here", "c++"), "use <mark>c++</mark> here");
        assert_eq!(highlight_text("a.b", ".*"), "a.b");
    }

    #[test]
    fn test_segments_roundtrip_text() {
        let text = "Setup Guide for setup";
        let joined: String = highlight_segments(text, "setup")
            .into_iter()
            .map(|s| s.text)
            .collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn test_custom_markers() {
        assert_eq!(highlight_with("see docs", "docs", "**", "**"), "see **docs**");
    }
}
