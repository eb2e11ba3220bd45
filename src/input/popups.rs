use crate::{
    app::{App, Popup},
    config::key_match,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;

/// Routes a key press to the open popup. Returns true when a popup consumed
/// the key (a popup being open consumes everything).
pub fn handle_popup_events(app: &mut App, key: KeyEvent) -> bool {
    // Take the popup out so handlers can borrow `app` freely; every branch
    // that keeps the dialog open puts it back.
    let Some(popup) = app.popup.take() else {
        return false;
    };

    match popup {
        Popup::Help => {
            // Any key closes.
        }
        Popup::Input {
            purpose,
            title,
            mut value,
        } => match key.code {
            KeyCode::Esc => {}
            KeyCode::Enter => {
                let trimmed = value.trim().to_string();
                app.submit_input_dialog(purpose, &trimmed);
            }
            KeyCode::Backspace => {
                value.pop();
                app.popup = Some(Popup::Input { purpose, title, value });
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                value.push(c);
                app.popup = Some(Popup::Input { purpose, title, value });
            }
            _ => app.popup = Some(Popup::Input { purpose, title, value }),
        },
        Popup::Confirm { question, action } => {
            if key_match(&key, &app.config.keybindings.popup.confirm)
                || key.code == KeyCode::Char('y')
            {
                app.confirm_action(action);
            } else if key_match(&key, &app.config.keybindings.popup.cancel)
                || key.code == KeyCode::Char('n')
            {
                // Dropped.
            } else {
                app.popup = Some(Popup::Confirm { question, action });
            }
        }
        Popup::Export { formats, mut state } => {
            if key_match(&key, &app.config.keybindings.popup.up) {
                select_prev(&mut state, formats.len());
                app.popup = Some(Popup::Export { formats, state });
            } else if key_match(&key, &app.config.keybindings.popup.down) {
                select_next(&mut state, formats.len());
                app.popup = Some(Popup::Export { formats, state });
            } else if key_match(&key, &app.config.keybindings.popup.confirm) {
                if let Some(format) = state.selected().and_then(|i| formats.get(i)).copied() {
                    app.run_export(format);
                }
            } else if !key_match(&key, &app.config.keybindings.popup.cancel) {
                app.popup = Some(Popup::Export { formats, state });
            }
        }
        Popup::Citation {
            mut query,
            all,
            filtered,
            mut state,
        } => match key.code {
            KeyCode::Esc => {}
            KeyCode::Enter => {
                if let Some(citekey) = state
                    .selected()
                    .and_then(|i| filtered.get(i))
                    .map(|bib| bib.citekey.clone())
                {
                    app.insert_citation(&citekey);
                }
            }
            KeyCode::Up => {
                select_prev(&mut state, filtered.len());
                app.popup = Some(Popup::Citation { query, all, filtered, state });
            }
            KeyCode::Down => {
                select_next(&mut state, filtered.len());
                app.popup = Some(Popup::Citation { query, all, filtered, state });
            }
            KeyCode::Backspace => {
                query.pop();
                app.popup = Some(Popup::Citation { query, all, filtered, state });
                app.refilter_citations();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                query.push(c);
                app.popup = Some(Popup::Citation { query, all, filtered, state });
                app.refilter_citations();
            }
            _ => app.popup = Some(Popup::Citation { query, all, filtered, state }),
        },
    }

    true
}

fn select_prev(state: &mut ListState, len: usize) {
    if len == 0 {
        return;
    }
    let i = state.selected().map(|i| i.saturating_sub(1)).unwrap_or(0);
    state.select(Some(i));
}

fn select_next(state: &mut ListState, len: usize) {
    if len == 0 {
        return;
    }
    let i = state.selected().map(|i| (i + 1).min(len - 1)).unwrap_or(0);
    state.select(Some(i));
}
