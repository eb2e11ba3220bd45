//! Per-line markdown highlighting for the editor screen.
//!
//! Regex-driven and line-local, so it stays cheap enough to run on every
//! frame. The returned spans concatenate to the input line verbatim; the wrap
//! transform relies on that to keep source offsets aligned.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use regex::Regex;
use std::sync::OnceLock;

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{1,6}\s+)(.*)$").expect("valid heading regex"))
}

fn inline_patterns() -> &'static [(Regex, Style)] {
    static PATTERNS: OnceLock<Vec<(Regex, Style)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            (
                Regex::new(r"\*\*[^*]+\*\*").expect("valid bold regex"),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            (
                // Single-star emphasis; double-star runs are claimed by the
                // bold pattern first, so no lookaround is needed.
                Regex::new(r"\*[^*]+\*").expect("valid italic regex"),
                Style::default().add_modifier(Modifier::ITALIC),
            ),
            (
                Regex::new(r"`[^`]+`").expect("valid code regex"),
                Style::default().fg(Color::LightCyan),
            ),
            (
                Regex::new(r"\^\[[^\]]*\]").expect("valid footnote regex"),
                Style::default().fg(Color::Magenta),
            ),
            (
                Regex::new(r"\[@[A-Za-z0-9_:.#$%&+?<>~/-]+\]").expect("valid citation regex"),
                Style::default().fg(Color::Green),
            ),
            (
                Regex::new(r"\[[^\]]+\]\([^)]+\)").expect("valid link regex"),
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        ]
    })
}

/// Highlights one logical line into styled spans whose concatenated text is
/// exactly the input.
pub fn highlight_line(line: &str) -> Vec<Span<'static>> {
    if line.is_empty() {
        return vec![Span::raw(String::new())];
    }

    if let Some(caps) = heading_re().captures(line) {
        let marker = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let rest = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        let mut spans = vec![Span::styled(
            marker.to_string(),
            Style::default().fg(Color::DarkGray),
        )];
        if !rest.is_empty() {
            spans.push(Span::styled(
                rest.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        }
        return spans;
    }

    // Earlier patterns claim their byte ranges; later matches that overlap
    // a claimed range are dropped.
    let mut marks: Vec<(usize, usize, Style)> = Vec::new();
    for (re, style) in inline_patterns() {
        for m in re.find_iter(line) {
            let overlaps = marks
                .iter()
                .any(|&(start, end, _)| m.start() < end && start < m.end());
            if !overlaps {
                marks.push((m.start(), m.end(), *style));
            }
        }
    }
    marks.sort_by_key(|&(start, _, _)| start);

    let mut spans = Vec::with_capacity(marks.len() * 2 + 1);
    let mut pos = 0;
    for (start, end, style) in marks {
        if start > pos {
            spans.push(Span::raw(line[pos..start].to_string()));
        }
        spans.push(Span::styled(line[start..end].to_string(), style));
        pos = end;
    }
    if pos < line.len() {
        spans.push(Span::raw(line[pos..].to_string()));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(spans: &[Span<'_>]) -> String {
        spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn spans_reproduce_the_line_verbatim() {
        let cases = [
            "plain text with nothing special",
            "## A heading with **nested** markers",
            "mix of `code`, **bold**, *italic* and [a link](https://x.y)",
            "footnote here^[see appendix] and after",
            "unterminated **bold and lone * star",
            "日本語 with **太字** inline",
        ];
        for line in cases {
            assert_eq!(flat(&highlight_line(line)), line, "{line:?}");
        }
    }

    #[test]
    fn heading_marker_and_text_get_distinct_styles() {
        let spans = highlight_line("### Section title");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].content.as_ref(), "### ");
        assert_eq!(spans[1].content.as_ref(), "Section title");
        assert!(spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn bold_run_is_claimed_before_italic() {
        let spans = highlight_line("say **loud** here");
        let bold: Vec<_> = spans
            .iter()
            .filter(|s| s.style.add_modifier.contains(Modifier::BOLD))
            .collect();
        assert_eq!(bold.len(), 1);
        assert_eq!(bold[0].content.as_ref(), "**loud**");
        assert!(
            !spans
                .iter()
                .any(|s| s.style.add_modifier.contains(Modifier::ITALIC))
        );
    }

    #[test]
    fn inline_code_and_citations_are_styled() {
        let spans = highlight_line("run `cargo doc` per [@knuth1984]");
        assert!(
            spans
                .iter()
                .any(|s| s.content.as_ref() == "`cargo doc`"
                    && s.style.fg == Some(Color::LightCyan))
        );
        assert!(
            spans
                .iter()
                .any(|s| s.content.as_ref() == "[@knuth1984]"
                    && s.style.fg == Some(Color::Green))
        );
    }

    #[test]
    fn empty_line_yields_a_single_empty_span() {
        let spans = highlight_line("");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content.as_ref(), "");
    }
}
