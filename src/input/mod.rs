pub(crate) mod editing;
pub(crate) mod navigate;
pub(crate) mod popups;
pub(crate) mod search;

use crate::{
    app::App,
    config::key_match,
    models::{InputMode, Screen},
};
use crossterm::event::{self, Event, KeyEventKind};

pub fn handle_event(app: &mut App, event: Event) {
    match event {
        Event::Mouse(mouse_event) => match mouse_event.kind {
            event::MouseEventKind::ScrollUp => app.scroll_up(),
            event::MouseEventKind::ScrollDown => app.scroll_down(),
            _ => {}
        },
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            if popups::handle_popup_events(app, key) {
                return;
            }

            if key_match(&key, &app.config.keybindings.global.quit) {
                if app.screen == Screen::Editor && app.buffer.is_dirty() {
                    app.save_current(false);
                }
                app.should_quit = true;
                return;
            }
            if key_match(&key, &app.config.keybindings.global.help) {
                app.toggle_help();
                return;
            }

            match app.screen {
                Screen::Browser => match app.input_mode {
                    InputMode::Navigate => navigate::handle_browser_key(app, key),
                    InputMode::Search => search::handle_search_key(app, key),
                },
                Screen::Editor => editing::handle_editor_key(app, key),
            }
        }
        _ => {}
    }
}
