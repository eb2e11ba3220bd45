use crate::{app::App, config::key_match, models::InputMode};
use crossterm::event::{KeyCode, KeyEvent};

pub fn handle_browser_key(app: &mut App, key: KeyEvent) {
    if key_match(&key, &app.config.keybindings.browser.up) {
        app.select_prev();
    } else if key_match(&key, &app.config.keybindings.browser.down) {
        app.select_next();
    } else if key_match(&key, &app.config.keybindings.browser.top) {
        app.select_top();
    } else if key_match(&key, &app.config.keybindings.browser.bottom) {
        app.select_bottom();
    } else if key_match(&key, &app.config.keybindings.browser.open) {
        app.open_selected();
    } else if key_match(&key, &app.config.keybindings.browser.new) {
        app.open_new_entry_dialog();
    } else if key_match(&key, &app.config.keybindings.browser.rename) {
        app.open_rename_dialog();
    } else if key_match(&key, &app.config.keybindings.browser.delete) {
        app.open_delete_dialog();
    } else if key_match(&key, &app.config.keybindings.browser.export) {
        app.open_export_dialog();
    } else if key_match(&key, &app.config.keybindings.browser.search) {
        app.input_mode = InputMode::Search;
    } else if key_match(&key, &app.config.keybindings.browser.open_vault) {
        app.open_vault_dir();
    } else if key.code == KeyCode::Esc && !app.search_query.is_empty() {
        app.search_query.clear();
        app.apply_filter();
    }
}
