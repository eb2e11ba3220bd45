use crate::{app::App, models::InputMode};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub fn handle_search_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.search_query.clear();
            app.input_mode = InputMode::Navigate;
            app.apply_filter();
        }
        // Enter keeps the filter and returns focus to the list.
        KeyCode::Enter => app.input_mode = InputMode::Navigate,
        KeyCode::Backspace => {
            app.search_query.pop();
            app.apply_filter();
        }
        KeyCode::Up => app.select_prev(),
        KeyCode::Down => app.select_next(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.search_query.push(c);
            app.apply_filter();
        }
        _ => {}
    }
}
