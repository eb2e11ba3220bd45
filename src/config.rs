use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub fn key_match(key: &KeyEvent, bindings: &[String]) -> bool {
    bindings.iter().any(|binding| is_match(key, binding))
}

fn is_match(key: &KeyEvent, binding: &str) -> bool {
    let binding = binding.to_lowercase();
    let parts: Vec<&str> = binding.split('+').collect();

    let mut target_modifiers = KeyModifiers::NONE;
    let mut target_code = KeyCode::Null;

    for part in parts {
        match part {
            "ctrl" => target_modifiers.insert(KeyModifiers::CONTROL),
            "opt" | "alt" => target_modifiers.insert(KeyModifiers::ALT),
            "shift" => target_modifiers.insert(KeyModifiers::SHIFT),
            "enter" => target_code = KeyCode::Enter,
            "esc" => target_code = KeyCode::Esc,
            "backspace" => target_code = KeyCode::Backspace,
            "tab" => target_code = KeyCode::Tab,
            "backtab" => target_code = KeyCode::BackTab,
            "space" => target_code = KeyCode::Char(' '),
            "up" => target_code = KeyCode::Up,
            "down" => target_code = KeyCode::Down,
            "left" => target_code = KeyCode::Left,
            "right" => target_code = KeyCode::Right,
            "home" => target_code = KeyCode::Home,
            "end" => target_code = KeyCode::End,
            "pageup" => target_code = KeyCode::PageUp,
            "pagedown" => target_code = KeyCode::PageDown,
            "delete" => target_code = KeyCode::Delete,
            "insert" => target_code = KeyCode::Insert,
            c if c.chars().count() == 1 => {
                if let Some(ch) = c.chars().next() {
                    target_code = KeyCode::Char(ch);
                }
            }
            _ => {}
        }
    }

    // KeyCode match (case-insensitive for Char).
    let code_matches = if key.code == target_code {
        true
    } else if let (KeyCode::Char(c), KeyCode::Char(tc)) = (key.code, target_code) {
        c.to_lowercase().next() == Some(tc)
    } else {
        false
    };
    if !code_matches {
        return false;
    }

    // Modifier match:
    // - Enter must match modifiers exactly so `enter` and `shift+enter` can coexist.
    // - For other keys, ignore Shift unless explicitly requested (helps BackTab and char keys like '?').
    if target_code == KeyCode::Enter {
        return key.modifiers == target_modifiers;
    }

    let mut key_mods = key.modifiers;
    let mut target_mods = target_modifiers;

    if !target_mods.contains(KeyModifiers::SHIFT) {
        key_mods.remove(KeyModifiers::SHIFT);
    }

    if !target_mods.contains(KeyModifiers::SHIFT) {
        target_mods.remove(KeyModifiers::SHIFT);
    }

    key_mods.contains(target_mods)
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "vellum", "vellum")
}

fn default_vault_dir() -> PathBuf {
    if let Some(path) = std::env::var_os("VELLUM_VAULT_DIR") {
        return PathBuf::from(path);
    }
    if let Some(dirs) = project_dirs() {
        return dirs.data_dir().join("vault");
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".vellum")
}

pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os("VELLUM_CONFIG") {
        return PathBuf::from(path);
    }
    if let Some(dirs) = project_dirs() {
        return dirs.config_dir().join("config.toml");
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".vellum-config.toml")
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub keybindings: KeyBindings,
    pub theme: Theme,
    pub vault: VaultConfig,
    pub editor: EditorConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct VaultConfig {
    pub path: PathBuf,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            path: default_vault_dir(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EditorConfig {
    /// Seconds of inactivity after which a dirty buffer is saved; 0 disables.
    pub autosave_seconds: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_seconds: 30,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct KeyBindings {
    pub global: GlobalBindings,
    pub browser: BrowserBindings,
    pub editor: EditorBindings,
    pub popup: PopupBindings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GlobalBindings {
    pub quit: Vec<String>,
    pub help: Vec<String>,
}

impl Default for GlobalBindings {
    fn default() -> Self {
        Self {
            quit: vec!["ctrl+q".to_string()],
            help: vec!["ctrl+g".to_string()],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct BrowserBindings {
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub top: Vec<String>,
    pub bottom: Vec<String>,
    pub open: Vec<String>,
    pub new: Vec<String>,
    pub rename: Vec<String>,
    pub delete: Vec<String>,
    pub export: Vec<String>,
    pub search: Vec<String>,
    pub open_vault: Vec<String>,
}

impl Default for BrowserBindings {
    fn default() -> Self {
        Self {
            up: vec!["k".to_string(), "up".to_string()],
            down: vec!["j".to_string(), "down".to_string()],
            top: vec!["home".to_string()],
            bottom: vec!["end".to_string()],
            open: vec!["enter".to_string()],
            new: vec!["n".to_string()],
            rename: vec!["r".to_string()],
            delete: vec!["d".to_string()],
            export: vec!["e".to_string()],
            search: vec!["/".to_string()],
            open_vault: vec!["o".to_string()],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EditorBindings {
    pub save: Vec<String>,
    pub back: Vec<String>,
    pub export: Vec<String>,
    pub cite: Vec<String>,
    pub doc_start: Vec<String>,
    pub doc_end: Vec<String>,
    pub counts: Vec<String>,
}

impl Default for EditorBindings {
    fn default() -> Self {
        Self {
            save: vec!["ctrl+s".to_string()],
            back: vec!["esc".to_string()],
            export: vec!["ctrl+e".to_string()],
            cite: vec!["ctrl+r".to_string()],
            doc_start: vec!["ctrl+up".to_string()],
            doc_end: vec!["ctrl+down".to_string()],
            counts: vec!["ctrl+w".to_string()],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PopupBindings {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub up: Vec<String>,
    pub down: Vec<String>,
}

impl Default for PopupBindings {
    fn default() -> Self {
        Self {
            confirm: vec!["enter".to_string()],
            cancel: vec!["esc".to_string()],
            up: vec!["up".to_string()],
            down: vec!["down".to_string()],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Theme {
    pub border_default: String,
    pub border_editing: String,
    pub accent: String,
    pub muted: String,
    pub highlight: String,
    pub timestamp: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            border_default: "Reset".to_string(),
            border_editing: "Green".to_string(),
            accent: "Cyan".to_string(),
            muted: "DarkGray".to_string(),
            highlight: "50,50,50".to_string(),
            timestamp: "Blue".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let config_path = config_path();

        let mut config = if let Ok(content) = fs::read_to_string(&config_path) {
            match toml::from_str::<Config>(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Failed to parse config.toml ({config_path:?}), using defaults: {e}");
                    Config::default()
                }
            }
        } else {
            Config::default()
        };

        let changed = config.normalize_paths();

        if changed || !config_path.exists() {
            let _ = config.save_to_path(&config_path);
        }

        config
    }

    pub fn save_to_path(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).unwrap_or_default();
        fs::write(path, content)
    }

    fn normalize_paths(&mut self) -> bool {
        let mut changed = false;

        if self.vault.path.as_os_str().is_empty() {
            self.vault.path = default_vault_dir();
            changed = true;
        }

        if self.vault.path.is_relative() {
            self.vault.path = default_vault_dir()
                .parent()
                .map(|p| p.join(&self.vault.path))
                .unwrap_or_else(|| self.vault.path.clone());
            changed = true;
        }

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        }
    }

    #[test]
    fn matches_plain_character_chords() {
        let bindings = vec!["j".to_string()];
        assert!(key_match(&key(KeyCode::Char('j'), KeyModifiers::NONE), &bindings));
        assert!(key_match(&key(KeyCode::Char('J'), KeyModifiers::SHIFT), &bindings));
        assert!(!key_match(&key(KeyCode::Char('k'), KeyModifiers::NONE), &bindings));
    }

    #[test]
    fn matches_ctrl_chords() {
        let bindings = vec!["ctrl+s".to_string()];
        assert!(key_match(&key(KeyCode::Char('s'), KeyModifiers::CONTROL), &bindings));
        assert!(!key_match(&key(KeyCode::Char('s'), KeyModifiers::NONE), &bindings));
    }

    #[test]
    fn enter_requires_exact_modifiers() {
        let plain = vec!["enter".to_string()];
        assert!(key_match(&key(KeyCode::Enter, KeyModifiers::NONE), &plain));
        assert!(!key_match(&key(KeyCode::Enter, KeyModifiers::SHIFT), &plain));
    }

    #[test]
    fn matches_named_navigation_keys() {
        assert!(key_match(
            &key(KeyCode::Up, KeyModifiers::CONTROL),
            &["ctrl+up".to_string()]
        ));
        assert!(key_match(&key(KeyCode::Esc, KeyModifiers::NONE), &["esc".to_string()]));
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).expect("serialize");
        let parsed: Config = toml::from_str(&text).expect("parse");
        assert_eq!(parsed.editor.autosave_seconds, 30);
        assert_eq!(parsed.keybindings.browser.open, vec!["enter".to_string()]);
    }

    #[test]
    fn unknown_fields_fall_back_to_defaults() {
        let parsed: Config = toml::from_str("[vault]\n").expect("parse");
        assert!(!parsed.keybindings.global.quit.is_empty());
    }
}
