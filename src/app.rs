use crate::config::Config;
use crate::editor::buffer::EditBuffer;
use crate::export;
use crate::models::{BibEntry, Entry, ExportFormat, InputMode, Screen};
use crate::search::{fuzzy_filter_citekeys, fuzzy_filter_entries};
use crate::storage::{self, VaultStorage};
use chrono::{DateTime, Duration, Local};
use ratatui::widgets::ListState;
use std::io;

const TOAST_SECONDS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPurpose {
    NewEntry,
    RenameEntry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteEntry,
}

/// Modal state; at most one popup is open, and popups see keys first.
pub enum Popup {
    Input {
        purpose: InputPurpose,
        title: String,
        value: String,
    },
    Confirm {
        question: String,
        action: ConfirmAction,
    },
    Export {
        formats: Vec<ExportFormat>,
        state: ListState,
    },
    Citation {
        query: String,
        all: Vec<BibEntry>,
        filtered: Vec<BibEntry>,
        state: ListState,
    },
    Help,
}

pub struct App {
    pub config: Config,
    pub storage: VaultStorage,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub should_quit: bool,

    pub entries: Vec<Entry>,
    pub filtered_entries: Vec<Entry>,
    pub browser_state: ListState,
    pub search_query: String,

    pub current_entry: Option<Entry>,
    pub buffer: EditBuffer,
    /// First visible visual row of the editor viewport; the renderer nudges
    /// this each frame to keep the cursor on screen.
    pub editor_scroll: usize,
    /// Inner width of the editor pane, recorded by the renderer each frame so
    /// vertical cursor movement wraps at the same column the screen does.
    pub editor_view_width: usize,
    pub show_counts: bool,
    dirty_since: Option<DateTime<Local>>,

    pub popup: Option<Popup>,
    pub toast_message: Option<String>,
    pub toast_expiry: Option<DateTime<Local>>,
}

impl App {
    pub fn new() -> io::Result<Self> {
        let config = Config::load();
        let storage = VaultStorage::open(&config.vault.path)?;
        Ok(Self::with_parts(config, storage))
    }

    pub fn with_parts(config: Config, storage: VaultStorage) -> Self {
        let mut app = Self {
            config,
            storage,
            screen: Screen::Browser,
            input_mode: InputMode::Navigate,
            should_quit: false,
            entries: Vec::new(),
            filtered_entries: Vec::new(),
            browser_state: ListState::default(),
            search_query: String::new(),
            current_entry: None,
            buffer: EditBuffer::from_text(""),
            editor_scroll: 0,
            editor_view_width: 80,
            show_counts: false,
            dirty_since: None,
            popup: None,
            toast_message: Some("Welcome to vellum. Ctrl+G for keys.".to_string()),
            toast_expiry: Some(Local::now() + Duration::seconds(TOAST_SECONDS)),
        };
        app.refresh_entries();
        app
    }

    pub fn toast(&mut self, message: impl Into<String>) {
        self.toast_message = Some(message.into());
        self.toast_expiry = Some(Local::now() + Duration::seconds(TOAST_SECONDS));
    }

    /// Periodic upkeep between input events: toast expiry and autosave.
    pub fn tick(&mut self) {
        if let Some(expiry) = self.toast_expiry
            && Local::now() >= expiry
        {
            self.toast_expiry = None;
            self.toast_message = None;
        }

        let autosave = self.config.editor.autosave_seconds;
        if autosave > 0
            && self.screen == Screen::Editor
            && let Some(since) = self.dirty_since
            && Local::now() >= since + Duration::seconds(autosave as i64)
        {
            self.save_current(false);
        }
    }

    pub fn note_edit(&mut self) {
        if self.dirty_since.is_none() {
            self.dirty_since = Some(Local::now());
        }
    }

    // ── Browser ──────────────────────────────────────────────────────

    pub fn refresh_entries(&mut self) {
        match self.storage.list_entries() {
            Ok(entries) => self.entries = entries,
            Err(e) => {
                self.entries.clear();
                self.toast(format!("Could not read vault: {e}"));
            }
        }
        self.apply_filter();
    }

    pub fn apply_filter(&mut self) {
        self.filtered_entries = fuzzy_filter_entries(&self.entries, &self.search_query);
        if self.filtered_entries.is_empty() {
            self.browser_state.select(None);
        } else {
            let selected = self
                .browser_state
                .selected()
                .unwrap_or(0)
                .min(self.filtered_entries.len() - 1);
            self.browser_state.select(Some(selected));
        }
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.browser_state
            .selected()
            .and_then(|i| self.filtered_entries.get(i))
    }

    pub fn select_next(&mut self) {
        if self.filtered_entries.is_empty() {
            return;
        }
        let next = self
            .browser_state
            .selected()
            .map(|i| (i + 1).min(self.filtered_entries.len() - 1))
            .unwrap_or(0);
        self.browser_state.select(Some(next));
    }

    pub fn select_prev(&mut self) {
        if self.filtered_entries.is_empty() {
            return;
        }
        let prev = self
            .browser_state
            .selected()
            .map(|i| i.saturating_sub(1))
            .unwrap_or(0);
        self.browser_state.select(Some(prev));
    }

    pub fn select_top(&mut self) {
        if !self.filtered_entries.is_empty() {
            self.browser_state.select(Some(0));
        }
    }

    pub fn select_bottom(&mut self) {
        if !self.filtered_entries.is_empty() {
            self.browser_state
                .select(Some(self.filtered_entries.len() - 1));
        }
    }

    pub fn scroll_up(&mut self) {
        if self.screen == Screen::Browser {
            self.select_prev();
        } else {
            self.editor_scroll = self.editor_scroll.saturating_sub(1);
        }
    }

    pub fn scroll_down(&mut self) {
        if self.screen == Screen::Browser {
            self.select_next();
        } else {
            self.editor_scroll = self.editor_scroll.saturating_add(1);
        }
    }

    // ── Editor lifecycle ─────────────────────────────────────────────

    pub fn open_selected(&mut self) {
        let Some(entry) = self.selected_entry().cloned() else {
            return;
        };
        match self.storage.read_entry(&entry) {
            Ok(content) => {
                self.buffer = EditBuffer::from_text(&content);
                self.current_entry = Some(entry);
                self.screen = Screen::Editor;
                self.editor_scroll = 0;
                self.dirty_since = None;
            }
            Err(e) => self.toast(format!("Could not open \"{}\": {e}", entry.name)),
        }
    }

    pub fn save_current(&mut self, notify: bool) {
        let Some(entry) = self.current_entry.clone() else {
            return;
        };
        match self.storage.save_entry(&entry, &self.buffer.to_text()) {
            Ok(()) => {
                self.buffer.mark_clean();
                self.dirty_since = None;
                if notify {
                    self.toast("Saved.");
                }
            }
            Err(e) => self.toast(format!("Save failed: {e}")),
        }
    }

    pub fn close_editor(&mut self) {
        if self.buffer.is_dirty() {
            self.save_current(false);
        }
        self.screen = Screen::Browser;
        self.current_entry = None;
        self.refresh_entries();
    }

    // ── Popups ───────────────────────────────────────────────────────

    pub fn open_new_entry_dialog(&mut self) {
        self.popup = Some(Popup::Input {
            purpose: InputPurpose::NewEntry,
            title: "New entry".to_string(),
            value: String::new(),
        });
    }

    pub fn open_rename_dialog(&mut self) {
        let Some(entry) = self.selected_entry().cloned() else {
            return;
        };
        self.popup = Some(Popup::Input {
            purpose: InputPurpose::RenameEntry,
            title: "Rename entry".to_string(),
            value: entry.name,
        });
    }

    pub fn open_delete_dialog(&mut self) {
        let Some(entry) = self.selected_entry().cloned() else {
            return;
        };
        self.popup = Some(Popup::Confirm {
            question: format!("Delete \"{}\"? This cannot be undone.", entry.name),
            action: ConfirmAction::DeleteEntry,
        });
    }

    pub fn open_export_dialog(&mut self) {
        let mut state = ListState::default();
        state.select(Some(0));
        self.popup = Some(Popup::Export {
            formats: ExportFormat::all(),
            state,
        });
    }

    pub fn open_citation_picker(&mut self) {
        let (all, path) = storage::load_bib_entries(self.storage.vault_dir());
        if path.is_none() {
            self.toast("No .bib file found in the vault.");
            return;
        }
        if all.is_empty() {
            self.toast("The .bib file has no entries.");
            return;
        }
        let mut state = ListState::default();
        state.select(Some(0));
        self.popup = Some(Popup::Citation {
            query: String::new(),
            filtered: all.clone(),
            all,
            state,
        });
    }

    pub fn toggle_help(&mut self) {
        match self.popup {
            Some(Popup::Help) => self.popup = None,
            None => self.popup = Some(Popup::Help),
            _ => {}
        }
    }

    // ── Popup completions ────────────────────────────────────────────

    pub fn submit_input_dialog(&mut self, purpose: InputPurpose, value: &str) {
        match purpose {
            InputPurpose::NewEntry => match self.storage.create_entry(value) {
                Ok(entry) => {
                    self.search_query.clear();
                    self.refresh_entries();
                    let pos = self.filtered_entries.iter().position(|e| e.path == entry.path);
                    self.browser_state.select(pos.or(Some(0)));
                    self.toast(format!("Created \"{}\".", entry.name));
                }
                Err(e) => self.toast(format!("Create failed: {e}")),
            },
            InputPurpose::RenameEntry => {
                let Some(entry) = self.selected_entry().cloned() else {
                    return;
                };
                match self.storage.rename_entry(&entry, value) {
                    Ok(renamed) => {
                        self.refresh_entries();
                        let pos = self
                            .filtered_entries
                            .iter()
                            .position(|e| e.path == renamed.path);
                        self.browser_state.select(pos.or(Some(0)));
                        self.toast(format!("Renamed to \"{}\".", renamed.name));
                    }
                    Err(e) => self.toast(format!("Rename failed: {e}")),
                }
            }
        }
    }

    pub fn confirm_action(&mut self, action: ConfirmAction) {
        match action {
            ConfirmAction::DeleteEntry => {
                let Some(entry) = self.selected_entry().cloned() else {
                    return;
                };
                match self.storage.delete_entry(&entry) {
                    Ok(()) => {
                        self.refresh_entries();
                        self.toast(format!("Deleted \"{}\".", entry.name));
                    }
                    Err(e) => self.toast(format!("Delete failed: {e}")),
                }
            }
        }
    }

    pub fn insert_citation(&mut self, citekey: &str) {
        self.buffer.insert_str(&format!("[@{citekey}]"));
        self.note_edit();
    }

    pub fn refilter_citations(&mut self) {
        if let Some(Popup::Citation {
            query,
            all,
            filtered,
            state,
        }) = &mut self.popup
        {
            *filtered = fuzzy_filter_citekeys(all, query);
            if filtered.is_empty() {
                state.select(None);
            } else {
                let selected = state.selected().unwrap_or(0).min(filtered.len() - 1);
                state.select(Some(selected));
            }
        }
    }

    // ── Export ───────────────────────────────────────────────────────

    pub fn run_export(&mut self, format: ExportFormat) {
        let (entry, content) = match self.screen {
            Screen::Editor => {
                let Some(entry) = self.current_entry.clone() else {
                    return;
                };
                (entry, self.buffer.to_text())
            }
            Screen::Browser => {
                let Some(entry) = self.selected_entry().cloned() else {
                    return;
                };
                match self.storage.read_entry(&entry) {
                    Ok(content) => (entry, content),
                    Err(e) => {
                        self.toast(format!("Export failed: {e}"));
                        return;
                    }
                }
            }
        };

        self.toast(format!("Exporting {}…", format.extension()));
        match export::export_entry(&self.storage, &entry, &content, format) {
            Ok(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                self.toast(format!("Exported: {name}"));
            }
            Err(e) => self.toast(format!("Export failed: {e}")),
        }
    }

    pub fn open_vault_dir(&mut self) {
        if let Err(e) = open::that(self.storage.vault_dir()) {
            self.toast(format!("Could not open vault directory: {e}"));
        }
    }

    /// `(words, paragraphs)` of the buffer, frontmatter excluded.
    pub fn counts(&self) -> (usize, usize) {
        let text = self.buffer.to_text();
        (export::word_count(&text), export::para_count(&text))
    }
}
