use crate::models::{BibEntry, ExportFormat};
use crate::ui::theme::ThemeTokens;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use unicode_width::UnicodeWidthStr;

/// Helper function to calculate centered popup position
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn centered_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}

pub fn render_input_popup(f: &mut Frame, title: &str, value: &str, tokens: &ThemeTokens) {
    let area = centered_fixed(50, 3, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tokens.border_editing));
    let inner = block.inner(area);
    f.render_widget(block, area);

    f.render_widget(Paragraph::new(value.to_string()), inner);
    let cursor_x =
        inner.x + (UnicodeWidthStr::width(value) as u16).min(inner.width.saturating_sub(1));
    f.set_cursor_position((cursor_x, inner.y));
}

pub fn render_confirm_popup(f: &mut Frame, question: &str, tokens: &ThemeTokens) {
    let width = (UnicodeWidthStr::width(question) as u16 + 4).clamp(30, 70);
    let area = centered_fixed(width, 5, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Confirm ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tokens.accent));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = vec![
        Line::from(question.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Enter/y confirm · Esc/n cancel",
            Style::default().fg(tokens.muted),
        )),
    ];
    f.render_widget(Paragraph::new(lines), inner);
}

pub fn render_export_popup(
    f: &mut Frame,
    formats: &[ExportFormat],
    state: &mut ListState,
    tokens: &ThemeTokens,
) {
    let area = centered_fixed(40, formats.len() as u16 + 2, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Export as ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tokens.accent));

    let items: Vec<ListItem> = formats
        .iter()
        .map(|format| ListItem::new(format.label()))
        .collect();
    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(tokens.highlight)
            .add_modifier(Modifier::BOLD),
    );
    f.render_stateful_widget(list, area, state);
}

pub fn render_citation_popup(
    f: &mut Frame,
    query: &str,
    filtered: &[BibEntry],
    state: &mut ListState,
    tokens: &ThemeTokens,
) {
    let area = centered_rect(50, 60, f.area());
    f.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let search_block = Block::default()
        .title(" Insert citation ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tokens.border_editing));
    let search_inner = search_block.inner(chunks[0]);
    f.render_widget(Clear, chunks[0]);
    f.render_widget(search_block, chunks[0]);
    f.render_widget(Paragraph::new(query.to_string()), search_inner);
    let cursor_x = search_inner.x
        + (UnicodeWidthStr::width(query) as u16).min(search_inner.width.saturating_sub(1));
    f.set_cursor_position((cursor_x, search_inner.y));

    let list_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tokens.border_default));
    let items: Vec<ListItem> = if filtered.is_empty() {
        vec![ListItem::new(Span::styled(
            "No matching citekeys",
            Style::default().fg(tokens.muted),
        ))]
    } else {
        filtered
            .iter()
            .map(|bib| ListItem::new(format!("@{}", bib.citekey)))
            .collect()
    };
    let list = List::new(items).block(list_block).highlight_style(
        Style::default()
            .bg(tokens.highlight)
            .add_modifier(Modifier::BOLD),
    );
    f.render_stateful_widget(list, chunks[1], state);
}

const HELP_INTRO: &str =
    "vellum keeps one markdown file per entry. The editor wraps long lines at word \
     boundaries and the arrow keys move by visual line.";

const HELP_KEYS: &[(&str, &str)] = &[
    ("", "Browser"),
    ("j/k", "Move selection"),
    ("Enter", "Open entry"),
    ("n", "New entry"),
    ("r", "Rename entry"),
    ("d", "Delete entry"),
    ("e", "Export entry"),
    ("/", "Filter entries"),
    ("o", "Open vault directory"),
    ("", ""),
    ("", "Editor"),
    ("^S", "Save"),
    ("Esc", "Save and return"),
    ("^E", "Export"),
    ("^R", "Insert citation"),
    ("^W", "Toggle word/paragraph count"),
    ("^Up/^Dn", "Document start/end"),
    ("", ""),
    ("^G", "Toggle this help"),
    ("^Q", "Quit"),
];

pub fn render_help_popup(f: &mut Frame, tokens: &ThemeTokens) {
    let area = centered_fixed(46, (HELP_KEYS.len() as u16) + 6, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Keys ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tokens.accent));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    for wrapped in textwrap::wrap(HELP_INTRO, inner.width.max(1) as usize) {
        lines.push(Line::from(Span::styled(
            wrapped.into_owned(),
            Style::default().fg(tokens.muted),
        )));
    }
    lines.push(Line::from(""));

    for (key, desc) in HELP_KEYS {
        if key.is_empty() && desc.is_empty() {
            lines.push(Line::from(""));
        } else if key.is_empty() {
            lines.push(Line::from(Span::styled(
                desc.to_string(),
                Style::default()
                    .fg(tokens.accent)
                    .add_modifier(Modifier::BOLD),
            )));
        } else {
            lines.push(Line::from(vec![
                Span::styled(
                    format!(" {key:>7}  "),
                    Style::default()
                        .fg(tokens.accent)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(desc.to_string()),
            ]));
        }
    }
    f.render_widget(Paragraph::new(lines), inner);
}
