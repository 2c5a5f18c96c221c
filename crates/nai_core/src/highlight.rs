//! Exact-substring highlighting of sentence matches.
//!
//! Each match index becomes a highlight group. Fragments that do not occur
//! verbatim in the text are not highlighted; they are reported through
//! [`Highlighted::unmatched`] instead of failing the render.

use std::fmt::Write;

use crate::types::SentenceMatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: usize,
    end: usize,
    group: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub group: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlighted<'a> {
    text: &'a str,
    spans: Vec<Span>,
    groups: usize,
    pub unmatched: Vec<String>,
}

/// Highlights the supporting article sentences of every match.
pub fn highlight_article<'a>(article: &'a str, matches: &[SentenceMatch]) -> Highlighted<'a> {
    let fragments = matches.iter().enumerate().flat_map(|(group, m)| {
        m.article_sentences
            .iter()
            .map(move |sentence| (group, sentence.as_str()))
    });
    highlight(article, fragments, matches.len())
}

/// Highlights each summary sentence with its match's group.
pub fn highlight_summary<'a>(summary: &'a str, matches: &[SentenceMatch]) -> Highlighted<'a> {
    let fragments = matches
        .iter()
        .enumerate()
        .map(|(group, m)| (group, m.summary_sentence.as_str()));
    highlight(summary, fragments, matches.len())
}

fn highlight<'a, 'f>(
    text: &'a str,
    fragments: impl Iterator<Item = (usize, &'f str)>,
    groups: usize,
) -> Highlighted<'a> {
    // Identical fragments collapse to one entry; the last group wins.
    let mut unique: Vec<(&str, usize)> = Vec::new();
    for (group, fragment) in fragments {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }
        match unique.iter_mut().find(|(f, _)| *f == fragment) {
            Some(entry) => entry.1 = group,
            None => unique.push((fragment, group)),
        }
    }

    let mut spans: Vec<Span> = Vec::new();
    let mut unmatched = Vec::new();
    for (fragment, group) in unique {
        let free = text.match_indices(fragment).map(|(start, _)| Span {
            start,
            end: start + fragment.len(),
            group,
        });
        let found = free
            .into_iter()
            .find(|candidate| {
                spans
                    .iter()
                    .all(|s| candidate.end <= s.start || candidate.start >= s.end)
            });
        match found {
            Some(span) => spans.push(span),
            None => unmatched.push(fragment.to_string()),
        }
    }
    spans.sort_by_key(|s| s.start);

    Highlighted {
        text,
        spans,
        groups,
        unmatched,
    }
}

impl<'a> Highlighted<'a> {
    pub fn highlighted_count(&self) -> usize {
        self.spans.len()
    }

    pub fn segments(&self) -> Vec<Segment<'a>> {
        let mut segments = Vec::with_capacity(self.spans.len() * 2 + 1);
        let mut cursor = 0;
        for span in &self.spans {
            if span.start > cursor {
                segments.push(Segment {
                    text: &self.text[cursor..span.start],
                    group: None,
                });
            }
            segments.push(Segment {
                text: &self.text[span.start..span.end],
                group: Some(span.group),
            });
            cursor = span.end;
        }
        if cursor < self.text.len() {
            segments.push(Segment {
                text: &self.text[cursor..],
                group: None,
            });
        }
        segments
    }

    /// Renders escaped HTML with one `<mark>` per highlighted span.
    pub fn render_html(&self) -> String {
        let colors = group_colors(self.groups);
        let mut html = String::with_capacity(self.text.len() + self.spans.len() * 64);
        for segment in self.segments() {
            match segment.group {
                Some(group) => {
                    let _ = write!(
                        html,
                        "<mark data-match=\"{}\" style=\"background-color: {};\">{}</mark>",
                        group,
                        colors[group],
                        escape_html(segment.text)
                    );
                }
                None => html.push_str(&escape_html(segment.text)),
            }
        }
        html
    }
}

/// Evenly spaced hues, one per group.
pub fn group_colors(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("hsl({}, 65%, 40%)", i * 360 / count))
        .collect()
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
