//! Word wrap and cursor coordinate mapping for the editor view.
//!
//! Terminal backends wrap at the character level, which splits words and
//! leaves ragged right edges. This module decides word-boundary breakpoints
//! for one logical line, pads wrapped rows out to the target width, and keeps
//! a bidirectional mapping between source character offsets and on-screen
//! offsets so the cursor and mouse clicks stay on the right character.
//!
//! Everything here is recomputed per frame from the current line and width;
//! nothing is cached, so a resize or an edit can never leave stale geometry.

use ratatui::text::Span;
use std::collections::HashMap;
use unicode_width::UnicodeWidthChar;

/// Terminal cell width of a single character (1, or 2 for wide/CJK).
pub fn terminal_cell_width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(1)
}

/// Computes where a logical line breaks into visual lines at `width` columns.
///
/// Returns `(breakpoints, paddings)`:
/// - `breakpoints[k]` is the source char index where visual line `k` starts;
///   the first is always 0 and the list is strictly increasing.
/// - each padding is `(space_index, pad_count)`: `pad_count` blank columns are
///   shown right after the space at `space_index` so the wrapped row reaches
///   the full width.
///
/// Breaks prefer the most recent space; a run with no space since the last
/// break is hard-broken at the overflowing character. A wide character that
/// would straddle the last column is pushed to the next row whole. Width
/// accounting uses `col_width` per character, not char counts.
///
/// `width == 0` (a transient resize glitch) degrades to no wrapping at all.
pub fn compute_breakpoints<F>(line: &str, width: usize, col_width: F) -> (Vec<usize>, Vec<(usize, usize)>)
where
    F: Fn(char) -> usize,
{
    let chars: Vec<char> = line.chars().collect();
    if chars.is_empty() || width == 0 {
        return (vec![0], Vec::new());
    }
    let total: usize = chars.iter().map(|&c| col_width(c)).sum();
    if total <= width {
        return (vec![0], Vec::new());
    }

    let mut starts = vec![0usize];
    let mut paddings: Vec<(usize, usize)> = Vec::new();
    let mut x = 0usize;
    let mut last_space: Option<(usize, usize)> = None;

    for (i, &c) in chars.iter().enumerate() {
        let cw = col_width(c);
        if x + cw > width {
            if let Some((space_i, space_x)) = last_space.take() {
                // Break after the space; pad the row out to the full width.
                let pad = width - space_x - 1;
                if pad > 0 {
                    paddings.push((space_i, pad));
                }
                starts.push(space_i + 1);
                x -= space_x + 1;
            } else if i > *starts.last().unwrap_or(&0) {
                // No space since the last break: hard-break mid-word.
                starts.push(i);
                x = 0;
            }
            // A character wider than the whole width overflows visually
            // rather than producing a non-increasing breakpoint.
        }
        if c == ' ' {
            last_space = Some((i, x));
        }
        x += cw;
    }

    (starts, paddings)
}

/// Index of the visual line containing source column `col`
/// (the greatest breakpoint `<= col`).
pub fn segment_index(breakpoints: &[usize], col: usize) -> usize {
    let mut seg = 0;
    for (idx, &start) in breakpoints.iter().enumerate() {
        if col >= start {
            seg = idx;
        }
    }
    seg
}

/// Immutable source ↔ display offset mapping for one transformed line.
///
/// Holds the sorted padding table by value, so lookups stay valid and pure
/// regardless of what the buffer does afterwards. Callers must still request
/// a fresh transform after any edit; this struct just guarantees the old one
/// cannot silently read new state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapMapping {
    /// `(segment_start, cumulative_pad, pad)` per padding insertion, where
    /// `segment_start` is the source index right after the padded space.
    boundaries: Vec<(usize, usize, usize)>,
    source_len: usize,
    display_len: usize,
}

impl WrapMapping {
    /// Mapping for a line with no padding: both directions are the identity.
    pub fn identity(source_len: usize) -> Self {
        Self {
            boundaries: Vec::new(),
            source_len,
            display_len: source_len,
        }
    }

    /// Builds a mapping from `(space_index, pad_count)` insertions sorted by
    /// source index, for a line of `source_len` characters.
    pub fn from_paddings(paddings: &[(usize, usize)], source_len: usize) -> Self {
        let mut boundaries = Vec::with_capacity(paddings.len());
        let mut cum = 0;
        for &(space_i, pad) in paddings {
            cum += pad;
            boundaries.push((space_i + 1, cum, pad));
        }
        Self {
            boundaries,
            source_len,
            display_len: source_len + cum,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Display offset of source char index `i`. Out-of-range input clamps to
    /// the line end rather than failing; stale coordinates can arrive between
    /// a resize and the next cursor read.
    pub fn source_to_display(&self, i: usize) -> usize {
        let i = i.min(self.source_len);
        let mut offset = 0;
        for &(segment_start, cum, _) in &self.boundaries {
            if i >= segment_start {
                offset = cum;
            } else {
                break;
            }
        }
        i + offset
    }

    /// Source char index for display offset `j`. A `j` inside an inserted
    /// padding run maps to the first source index of the following visual
    /// line, so clicks on padding land at the wrap point instead of inside a
    /// word. Out-of-range input clamps.
    pub fn display_to_source(&self, j: usize) -> usize {
        let j = j.min(self.display_len);
        let mut prev_cum = 0;
        for &(segment_start, cum, pad) in &self.boundaries {
            let display_boundary = segment_start + prev_cum;
            if j >= display_boundary && j < display_boundary + pad {
                return segment_start;
            } else if j >= display_boundary + pad {
                prev_cum = cum;
            } else {
                break;
            }
        }
        j.saturating_sub(prev_cum).min(self.source_len)
    }
}

/// Applies word-wrap padding to a line of styled spans.
///
/// Reconstructs the flat text, computes breakpoints, and splices unstyled
/// pad spans in after each padded wrap space, splitting the styled span that
/// contains it. Style runs are never merged or dropped. When no padding is
/// needed (the dominant case) the spans come back unchanged with an identity
/// mapping and no extra allocation per span content.
pub fn transform<F>(fragments: &[Span<'_>], width: usize, col_width: F) -> (Vec<Span<'static>>, WrapMapping)
where
    F: Fn(char) -> usize,
{
    let text: String = fragments.iter().map(|s| s.content.as_ref()).collect();
    let source_len = text.chars().count();

    let (_, paddings) = compute_breakpoints(&text, width, col_width);
    if paddings.is_empty() {
        let owned = fragments
            .iter()
            .map(|s| Span::styled(s.content.to_string(), s.style))
            .collect();
        return (owned, WrapMapping::identity(source_len));
    }

    let pad_at: HashMap<usize, usize> = paddings.iter().copied().collect();
    let mut out: Vec<Span<'static>> = Vec::new();
    let mut source_pos = 0usize;

    for frag in fragments {
        let mut run = String::new();
        for c in frag.content.chars() {
            run.push(c);
            if let Some(&pad) = pad_at.get(&source_pos) {
                out.push(Span::styled(std::mem::take(&mut run), frag.style));
                out.push(Span::raw(" ".repeat(pad)));
            }
            source_pos += 1;
        }
        if !run.is_empty() {
            out.push(Span::styled(run, frag.style));
        }
    }

    (out, WrapMapping::from_paddings(&paddings, source_len))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalDirection {
    Up,
    Down,
}

/// Read-only view of a document's logical lines, supplied by the buffer.
pub trait LineProvider {
    fn line(&self, index: usize) -> Option<&str>;
    fn line_count(&self) -> usize;
}

impl LineProvider for [String] {
    fn line(&self, index: usize) -> Option<&str> {
        self.get(index).map(|s| s.as_str())
    }

    fn line_count(&self) -> usize {
        self.len()
    }
}

impl LineProvider for Vec<String> {
    fn line(&self, index: usize) -> Option<&str> {
        self.get(index).map(|s| s.as_str())
    }

    fn line_count(&self) -> usize {
        self.len()
    }
}

/// Moves the cursor one *visual* line up or down, the way users expect in a
/// wrapped editor: within the current logical line first, then across the
/// logical-line boundary. Breakpoints are recomputed fresh for the one or
/// two lines touched.
///
/// Landing in a segment shorter than the current visual column snaps to that
/// segment's end. At the document edge the move is a no-op and the input
/// coordinates come back unchanged.
pub fn move_vertical<L, F>(
    direction: VerticalDirection,
    row: usize,
    col: usize,
    lines: &L,
    width: usize,
    col_width: F,
) -> (usize, usize)
where
    L: LineProvider + ?Sized,
    F: Fn(char) -> usize,
{
    let line = lines.line(row).unwrap_or("");
    let len = line.chars().count();
    let col = col.min(len);

    let (starts, _) = compute_breakpoints(line, width, &col_width);
    let seg = segment_index(&starts, col);
    let visual_col = col - starts[seg];

    match direction {
        VerticalDirection::Up => {
            if seg > 0 {
                let prev_start = starts[seg - 1];
                let prev_end = starts[seg] - 1;
                (row, (prev_start + visual_col).min(prev_end))
            } else if row > 0 {
                let prev_line = lines.line(row - 1).unwrap_or("");
                let prev_len = prev_line.chars().count();
                let (prev_starts, _) = compute_breakpoints(prev_line, width, &col_width);
                let last_start = *prev_starts.last().unwrap_or(&0);
                (row - 1, (last_start + visual_col).min(prev_len))
            } else {
                (row, col)
            }
        }
        VerticalDirection::Down => {
            if seg + 1 < starts.len() {
                let next_start = starts[seg + 1];
                let next_end = if seg + 2 < starts.len() {
                    starts[seg + 2] - 1
                } else {
                    len
                };
                (row, (next_start + visual_col).min(next_end))
            } else if row + 1 < lines.line_count() {
                let next_line = lines.line(row + 1).unwrap_or("");
                let next_len = next_line.chars().count();
                let (next_starts, _) = compute_breakpoints(next_line, width, &col_width);
                let first_end = if next_starts.len() > 1 {
                    next_starts[1] - 1
                } else {
                    next_len
                };
                (row + 1, visual_col.min(first_end))
            } else {
                (row, col)
            }
        }
    }
}
