use crate::{
    app::App,
    config::key_match,
    editor::wrap::{self, VerticalDirection},
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub fn handle_editor_key(app: &mut App, key: KeyEvent) {
    if key_match(&key, &app.config.keybindings.editor.save) {
        app.save_current(true);
        return;
    }
    if key_match(&key, &app.config.keybindings.editor.back) {
        app.close_editor();
        return;
    }
    if key_match(&key, &app.config.keybindings.editor.export) {
        app.open_export_dialog();
        return;
    }
    if key_match(&key, &app.config.keybindings.editor.cite) {
        app.open_citation_picker();
        return;
    }
    if key_match(&key, &app.config.keybindings.editor.doc_start) {
        app.buffer.move_doc_start();
        return;
    }
    if key_match(&key, &app.config.keybindings.editor.doc_end) {
        app.buffer.move_doc_end();
        return;
    }
    if key_match(&key, &app.config.keybindings.editor.counts) {
        app.show_counts = !app.show_counts;
        return;
    }

    match key.code {
        KeyCode::Up => move_visual(app, VerticalDirection::Up),
        KeyCode::Down => move_visual(app, VerticalDirection::Down),
        KeyCode::Left => app.buffer.move_left(),
        KeyCode::Right => app.buffer.move_right(),
        KeyCode::Home => app.buffer.move_line_start(),
        KeyCode::End => app.buffer.move_line_end(),
        KeyCode::Enter => {
            app.buffer.insert_newline();
            app.note_edit();
        }
        KeyCode::Backspace => {
            app.buffer.backspace();
            app.note_edit();
        }
        KeyCode::Delete => {
            app.buffer.delete_forward();
            app.note_edit();
        }
        KeyCode::Tab => {
            app.buffer.insert_str("    ");
            app.note_edit();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.buffer.insert_char(c);
            app.note_edit();
        }
        _ => {}
    }
}

/// Up/Down step by visual line, wrapping at the width the renderer last drew.
fn move_visual(app: &mut App, direction: VerticalDirection) {
    let (row, col) = app.buffer.cursor();
    let (new_row, new_col) = wrap::move_vertical(
        direction,
        row,
        col,
        app.buffer.lines(),
        app.editor_view_width,
        wrap::terminal_cell_width,
    );
    app.buffer.set_cursor(new_row, new_col);
}
