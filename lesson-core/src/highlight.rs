//! Inline highlighting of target words

use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// Words shorter than this are never highlighted
pub const MIN_HIGHLIGHT_CHARS: usize = 2;

/// A run of display text. Target runs are clickable and speak their own text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    Plain { text: String },
    Target { text: String },
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Segment::Plain { text } | Segment::Target { text } => text,
        }
    }
}

/// Case-insensitive whole-word matcher for a learner's word list
#[derive(Debug, Clone)]
pub struct Highlighter {
    pattern: Option<Regex>,
    /// One start-anchored matcher per word, longest first
    anchored: Vec<Regex>,
}

impl Highlighter {
    pub fn new<S: AsRef<str>>(words: &[S]) -> Self {
        let mut candidates: Vec<String> = words
            .iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| w.chars().count() >= MIN_HIGHLIGHT_CHARS)
            .collect();
        // Longest first so a phrase wins over a word it contains
        candidates.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        candidates.dedup();

        if candidates.is_empty() {
            return Self {
                pattern: None,
                anchored: Vec::new(),
            };
        }

        let escaped: Vec<String> = candidates.iter().map(|w| regex::escape(w)).collect();
        // `\b` would refuse words that begin or end with punctuation, so
        // boundaries are checked by hand in `segments`
        let pattern = case_insensitive(&format!("(?:{})", escaped.join("|")));
        let anchored = escaped
            .iter()
            .filter_map(|w| case_insensitive(&format!("^(?:{})", w)))
            .collect();

        Self { pattern, anchored }
    }

    /// Longest word that matches at `start` and ends on a word boundary
    fn fallback_at(&self, text: &str, start: usize) -> Option<usize> {
        self.anchored.iter().find_map(|re| {
            let end = start + re.find(&text[start..])?.end();
            (end > start && is_word_boundary(text, end)).then_some(end)
        })
    }

    /// Splits `text` into plain and target runs. Matches never start or end
    /// inside a word, so "cat" does not light up in "category".
    pub fn segments(&self, text: &str) -> Vec<Segment> {
        let Some(pattern) = &self.pattern else {
            return plain_only(text);
        };

        let mut segments = Vec::new();
        let mut cursor = 0;
        let mut search_from = 0;

        while search_from <= text.len() {
            let Some(found) = pattern.find_at(text, search_from) else {
                break;
            };
            let start = found.start();
            if start == found.end() {
                break;
            }

            let end = if !is_word_boundary(text, start) {
                None
            } else if is_word_boundary(text, found.end()) {
                Some(found.end())
            } else {
                self.fallback_at(text, start)
            };

            match end {
                Some(end) => {
                    if cursor < start {
                        segments.push(Segment::Plain {
                            text: text[cursor..start].to_string(),
                        });
                    }
                    segments.push(Segment::Target {
                        text: text[start..end].to_string(),
                    });
                    cursor = end;
                    search_from = end;
                }
                None => search_from = next_char_boundary(text, start),
            }
        }

        if cursor < text.len() {
            segments.push(Segment::Plain {
                text: text[cursor..].to_string(),
            });
        }
        segments
    }
}

fn case_insensitive(pattern: &str) -> Option<Regex> {
    RegexBuilder::new(pattern).case_insensitive(true).build().ok()
}

fn plain_only(text: &str) -> Vec<Segment> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![Segment::Plain {
            text: text.to_string(),
        }]
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True when the byte offset does not sit between two word characters
fn is_word_boundary(text: &str, at: usize) -> bool {
    let before = text[..at].chars().next_back().is_some_and(is_word_char);
    let after = text[at..].chars().next().is_some_and(is_word_char);
    !(before && after)
}

fn next_char_boundary(text: &str, at: usize) -> usize {
    text[at..]
        .chars()
        .next()
        .map_or(text.len() + 1, |c| at + c.len_utf8())
}

/// Plain text of a segmented run, as read aloud
pub fn plain_text(segments: &[Segment]) -> String {
    segments.iter().map(Segment::text).collect()
}
