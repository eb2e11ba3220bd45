pub mod popups;
pub mod theme;

use crate::app::{App, Popup};
use crate::editor::highlight::highlight_line;
use crate::editor::wrap;
use crate::models::{InputMode, Screen};
use crate::ui::theme::ThemeTokens;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

pub fn ui(f: &mut Frame, app: &mut App) {
    let tokens = ThemeTokens::from_theme(&app.config.theme);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(f.area());

    match app.screen {
        Screen::Browser => render_browser(f, app, chunks[0], &tokens),
        Screen::Editor => render_editor(f, app, chunks[0], &tokens),
    }
    render_status_bar(f, app, chunks[1], &tokens);

    match &mut app.popup {
        Some(Popup::Input { title, value, .. }) => {
            popups::render_input_popup(f, title, value, &tokens);
        }
        Some(Popup::Confirm { question, .. }) => {
            popups::render_confirm_popup(f, question, &tokens);
        }
        Some(Popup::Export { formats, state }) => {
            popups::render_export_popup(f, formats, state, &tokens);
        }
        Some(Popup::Citation {
            query,
            filtered,
            state,
            ..
        }) => {
            popups::render_citation_popup(f, query, filtered, state, &tokens);
        }
        Some(Popup::Help) => popups::render_help_popup(f, &tokens),
        None => {}
    }
}

fn render_browser(f: &mut Frame, app: &mut App, area: Rect, tokens: &ThemeTokens) {
    let filtering = app.input_mode == InputMode::Search || !app.search_query.is_empty();
    let (search_area, list_area) = if filtering {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(area);
        (Some(chunks[0]), chunks[1])
    } else {
        (None, area)
    };

    if let Some(search_area) = search_area {
        let editing = app.input_mode == InputMode::Search;
        let border = if editing {
            tokens.border_editing
        } else {
            tokens.border_default
        };
        let block = Block::default()
            .title(" Filter ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));
        let inner = block.inner(search_area);
        f.render_widget(block, search_area);
        f.render_widget(Paragraph::new(app.search_query.clone()), inner);
        if editing {
            let x = inner.x
                + (app.search_query.chars().count() as u16).min(inner.width.saturating_sub(1));
            f.set_cursor_position((x, inner.y));
        }
    }

    let title = format!(" vellum · {} entries ", app.filtered_entries.len());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tokens.border_default));

    if app.filtered_entries.is_empty() {
        let hint = if app.entries.is_empty() {
            "The vault is empty. Press n to create an entry."
        } else {
            "No entries match the filter."
        };
        let message = Paragraph::new(Span::styled(hint, Style::default().fg(tokens.muted)))
            .block(block)
            .alignment(Alignment::Center);
        f.render_widget(message, list_area);
        return;
    }

    let items: Vec<ListItem> = app
        .filtered_entries
        .iter()
        .map(|entry| {
            ListItem::new(Line::from(vec![
                Span::raw(entry.name.clone()),
                Span::styled(
                    format!("  {}", entry.modified.format("%Y-%m-%d %H:%M")),
                    Style::default().fg(tokens.timestamp),
                ),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(tokens.highlight)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    f.render_stateful_widget(list, list_area, &mut app.browser_state);
}

fn render_editor(f: &mut Frame, app: &mut App, area: Rect, tokens: &ThemeTokens) {
    let name = app
        .current_entry
        .as_ref()
        .map(|e| e.name.as_str())
        .unwrap_or("untitled");
    let title = if app.buffer.is_dirty() {
        format!(" {name} * ")
    } else {
        format!(" {name} ")
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tokens.border_editing));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let width = inner.width.max(1) as usize;
    let height = inner.height.max(1) as usize;
    app.editor_view_width = width;

    let (cursor_row, cursor_col) = app.buffer.cursor();
    let mut rows: Vec<Line<'static>> = Vec::new();
    let mut cursor_visual = 0usize;
    let mut cursor_x = 0usize;

    for (row, line) in app.buffer.lines().iter().enumerate() {
        let spans = highlight_line(line);
        let (padded, mapping) = wrap::transform(&spans, width, wrap::terminal_cell_width);
        let (starts, _) = wrap::compute_breakpoints(line, width, wrap::terminal_cell_width);
        // Display offsets where each later visual row begins, pad runs included.
        let cuts: Vec<usize> = starts
            .iter()
            .skip(1)
            .map(|&s| mapping.source_to_display(s))
            .collect();

        if row == cursor_row {
            let col = cursor_col.min(line.chars().count());
            let seg = wrap::segment_index(&starts, col);
            cursor_visual = rows.len() + seg;
            let display_col = mapping.source_to_display(col);
            let row_start = if seg == 0 { 0 } else { cuts[seg - 1] };
            cursor_x = display_cells(&padded, row_start, display_col);
        }

        rows.extend(split_visual_rows(padded, &cuts));
    }

    // Keep the cursor inside the viewport; everything else about scrolling
    // follows from the cursor position.
    let max_scroll = rows.len().saturating_sub(height);
    app.editor_scroll = app.editor_scroll.min(max_scroll);
    if cursor_visual < app.editor_scroll {
        app.editor_scroll = cursor_visual;
    } else if cursor_visual >= app.editor_scroll + height {
        app.editor_scroll = cursor_visual + 1 - height;
    }

    let visible: Vec<Line> = rows
        .into_iter()
        .skip(app.editor_scroll)
        .take(height)
        .collect();
    f.render_widget(Paragraph::new(visible), inner);

    if app.popup.is_none() {
        let x = inner.x + (cursor_x as u16).min(inner.width.saturating_sub(1));
        let y = inner.y + (cursor_visual - app.editor_scroll) as u16;
        f.set_cursor_position((x, y));
    }
}

/// Column width of the display chars in `[from, to)` across the padded spans.
fn display_cells(padded: &[Span<'_>], from: usize, to: usize) -> usize {
    padded
        .iter()
        .flat_map(|s| s.content.chars())
        .skip(from)
        .take(to.saturating_sub(from))
        .map(wrap::terminal_cell_width)
        .sum()
}

/// Splits one padded logical line into its visual rows at the given display
/// char offsets, preserving span styles across the splits.
fn split_visual_rows(padded: Vec<Span<'static>>, cuts: &[usize]) -> Vec<Line<'static>> {
    let mut rows: Vec<Line<'static>> = Vec::with_capacity(cuts.len() + 1);
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut pos = 0usize;
    let mut cut_iter = cuts.iter().copied().peekable();

    for span in padded {
        let style = span.style;
        let mut rest = span.content.into_owned();
        while let Some(&cut) = cut_iter.peek() {
            let rest_len = rest.chars().count();
            if cut > pos + rest_len {
                break;
            }
            let take = cut - pos;
            let byte = rest
                .char_indices()
                .nth(take)
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            let tail = rest.split_off(byte);
            if !rest.is_empty() {
                current.push(Span::styled(std::mem::take(&mut rest), style));
            }
            rows.push(Line::from(std::mem::take(&mut current)));
            pos = cut;
            rest = tail;
            cut_iter.next();
        }
        let rest_len = rest.chars().count();
        if !rest.is_empty() {
            current.push(Span::styled(rest, style));
        }
        pos += rest_len;
    }
    rows.push(Line::from(current));
    rows
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect, tokens: &ThemeTokens) {
    let left: Span = if let Some(toast) = &app.toast_message {
        Span::styled(toast.clone(), Style::default().fg(tokens.accent))
    } else if app.screen == Screen::Editor && app.show_counts {
        let (words, paras) = app.counts();
        Span::styled(
            format!("{words} words · {paras} paragraphs"),
            Style::default().fg(tokens.accent),
        )
    } else {
        let hint = match (app.screen, app.input_mode) {
            (Screen::Browser, InputMode::Search) => "type to filter · enter keep · esc clear",
            (Screen::Browser, _) => "n new · enter open · / filter · e export · ^G keys",
            (Screen::Editor, _) => "^S save · ^E export · ^R cite · esc back · ^G keys",
        };
        Span::styled(hint, Style::default().fg(tokens.muted))
    };
    f.render_widget(Paragraph::new(Line::from(left)), area);

    if app.screen == Screen::Editor {
        let (row, col) = app.buffer.cursor();
        let position = Span::styled(
            format!("{}:{}", row + 1, col + 1),
            Style::default().fg(tokens.muted),
        );
        f.render_widget(
            Paragraph::new(Line::from(position)).alignment(Alignment::Right),
            area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn flat(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn split_without_cuts_yields_one_row() {
        let rows = split_visual_rows(vec![Span::raw("hello world")], &[]);
        assert_eq!(rows.len(), 1);
        assert_eq!(flat(&rows[0]), "hello world");
    }

    #[test]
    fn split_at_cuts_reproduces_the_text() {
        let spans = vec![Span::raw("the      "), Span::raw("quick brown")];
        let rows = split_visual_rows(spans, &[9]);
        assert_eq!(rows.len(), 2);
        assert_eq!(flat(&rows[0]), "the      ");
        assert_eq!(flat(&rows[1]), "quick brown");
    }

    #[test]
    fn split_preserves_styles_across_a_cut() {
        let bold = Style::default().fg(Color::Yellow);
        let spans = vec![Span::styled("abcdef", bold)];
        let rows = split_visual_rows(spans, &[3]);
        assert_eq!(flat(&rows[0]), "abc");
        assert_eq!(flat(&rows[1]), "def");
        assert_eq!(rows[0].spans[0].style, bold);
        assert_eq!(rows[1].spans[0].style, bold);
    }

    #[test]
    fn split_handles_a_cut_on_a_span_boundary() {
        let spans = vec![Span::raw("one"), Span::raw("two")];
        let rows = split_visual_rows(spans, &[3]);
        assert_eq!(rows.len(), 2);
        assert_eq!(flat(&rows[0]), "one");
        assert_eq!(flat(&rows[1]), "two");
    }

    #[test]
    fn split_counts_chars_not_bytes() {
        let spans = vec![Span::raw("日本語のテキスト")];
        let rows = split_visual_rows(spans, &[3]);
        assert_eq!(flat(&rows[0]), "日本語");
        assert_eq!(flat(&rows[1]), "のテキスト");
    }

    #[test]
    fn display_cells_accounts_for_wide_chars() {
        let spans = vec![Span::raw("ab日本cd")];
        assert_eq!(display_cells(&spans, 0, 2), 2);
        assert_eq!(display_cells(&spans, 0, 4), 6);
        assert_eq!(display_cells(&spans, 2, 5), 5);
    }
}
