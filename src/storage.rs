//! Vault storage: a directory of top-level markdown entries plus export
//! subdirectories, and lightweight `.bib` discovery for citations.

use crate::models::{BibEntry, Entry};
use chrono::{DateTime, Local};
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct VaultStorage {
    vault_dir: PathBuf,
    pdf_dir: PathBuf,
    docx_dir: PathBuf,
}

fn modified_time(path: &Path) -> DateTime<Local> {
    path.metadata()
        .and_then(|m| m.modified())
        .map(DateTime::<Local>::from)
        .unwrap_or_else(|_| Local::now())
}

fn entry_at(path: PathBuf) -> Entry {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let modified = modified_time(&path);
    Entry { path, name, modified }
}

impl VaultStorage {
    /// Opens (creating if needed) the vault plus its `pdf/` and `docx/`
    /// export subdirectories.
    pub fn open(vault_dir: &Path) -> io::Result<Self> {
        let vault_dir = vault_dir.to_path_buf();
        let pdf_dir = vault_dir.join("pdf");
        let docx_dir = vault_dir.join("docx");
        fs::create_dir_all(&vault_dir)?;
        fs::create_dir_all(&pdf_dir)?;
        fs::create_dir_all(&docx_dir)?;
        Ok(Self {
            vault_dir,
            pdf_dir,
            docx_dir,
        })
    }

    pub fn vault_dir(&self) -> &Path {
        &self.vault_dir
    }

    pub fn pdf_dir(&self) -> &Path {
        &self.pdf_dir
    }

    pub fn docx_dir(&self) -> &Path {
        &self.docx_dir
    }

    /// Top-level `.md` files, newest modification first.
    pub fn list_entries(&self) -> io::Result<Vec<Entry>> {
        let mut entries: Vec<Entry> = fs::read_dir(&self.vault_dir)?
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "md"))
            .map(entry_at)
            .collect();
        entries.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));
        Ok(entries)
    }

    pub fn read_entry(&self, entry: &Entry) -> io::Result<String> {
        fs::read_to_string(&entry.path)
    }

    pub fn save_entry(&self, entry: &Entry, content: &str) -> io::Result<()> {
        fs::write(&entry.path, content)
    }

    pub fn create_entry(&self, name: &str) -> io::Result<Entry> {
        let name = valid_entry_name(name)?;
        let path = self.vault_dir.join(format!("{name}.md"));
        if path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("an entry named \"{name}\" already exists"),
            ));
        }
        fs::write(&path, "")?;
        Ok(entry_at(path))
    }

    pub fn rename_entry(&self, entry: &Entry, new_name: &str) -> io::Result<Entry> {
        let new_name = valid_entry_name(new_name)?;
        let new_path = self.vault_dir.join(format!("{new_name}.md"));
        if new_path.exists() && new_path != entry.path {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("an entry named \"{new_name}\" already exists"),
            ));
        }
        fs::rename(&entry.path, &new_path)?;
        Ok(entry_at(new_path))
    }

    pub fn delete_entry(&self, entry: &Entry) -> io::Result<()> {
        fs::remove_file(&entry.path)
    }
}

fn valid_entry_name(name: &str) -> io::Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "entry name cannot be empty",
        ));
    }
    if name.contains(['/', '\\']) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "entry name cannot contain path separators",
        ));
    }
    Ok(name)
}

fn citekey_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@\w+\s*\{([^,\s}]+)").expect("valid citekey regex"))
}

/// Extracts citekeys from `.bib` text. Deliberately shallow: only the key of
/// each `@type{key,` header is needed for the picker.
pub fn parse_bib_lightweight(text: &str) -> Vec<BibEntry> {
    citekey_re()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|key| !key.is_empty())
        .map(|key| BibEntry {
            citekey: key.to_string(),
        })
        .collect()
}

fn is_usable_bib(path: &Path) -> bool {
    let hidden_copy = path
        .file_name()
        .map(|n| n.to_string_lossy().starts_with("._"))
        .unwrap_or(true);
    let trashed = path
        .components()
        .any(|c| c.as_os_str().to_string_lossy() == ".Trash");
    !hidden_copy && !trashed
}

fn bib_files_in(dir: &Path, recursive: bool, out: &mut Vec<PathBuf>) {
    let Ok(read) = fs::read_dir(dir) else {
        return;
    };
    let mut children: Vec<PathBuf> = read.flatten().map(|e| e.path()).collect();
    children.sort();
    for child in children {
        if child.is_dir() {
            if recursive {
                bib_files_in(&child, true, out);
            }
        } else if child.extension().is_some_and(|ext| ext == "bib") && is_usable_bib(&child) {
            out.push(child);
        }
    }
}

/// Finds the vault's `.bib` file: `sources/` first, then anywhere below the
/// vault root.
pub fn find_bib_file(vault_dir: &Path) -> Option<PathBuf> {
    let mut found = Vec::new();
    bib_files_in(&vault_dir.join("sources"), false, &mut found);
    if let Some(p) = found.into_iter().next() {
        return Some(p);
    }
    let mut found = Vec::new();
    bib_files_in(vault_dir, true, &mut found);
    found.into_iter().next()
}

/// Loads citekeys for the citation picker; `None` path means no `.bib` file
/// exists anywhere in the vault.
pub fn load_bib_entries(vault_dir: &Path) -> (Vec<BibEntry>, Option<PathBuf>) {
    let Some(path) = find_bib_file(vault_dir) else {
        return (Vec::new(), None);
    };
    let entries = fs::read_to_string(&path)
        .map(|text| parse_bib_lightweight(&text))
        .unwrap_or_default();
    (entries, Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_vault() -> PathBuf {
        let stamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("vellum-test-{}-{}", std::process::id(), stamp));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn open_creates_export_subdirectories() {
        let dir = temp_vault();
        let storage = VaultStorage::open(&dir).expect("open vault");
        assert!(storage.pdf_dir().is_dir());
        assert!(storage.docx_dir().is_dir());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn entry_lifecycle_roundtrips() {
        let dir = temp_vault();
        let storage = VaultStorage::open(&dir).expect("open vault");

        let entry = storage.create_entry("draft").expect("create");
        assert_eq!(entry.name, "draft");
        storage.save_entry(&entry, "# Hello\n").expect("save");
        assert_eq!(storage.read_entry(&entry).expect("read"), "# Hello\n");

        let renamed = storage.rename_entry(&entry, "final").expect("rename");
        assert_eq!(renamed.name, "final");
        assert!(!entry.path.exists());
        assert_eq!(storage.read_entry(&renamed).expect("read"), "# Hello\n");

        storage.delete_entry(&renamed).expect("delete");
        assert!(storage.list_entries().expect("list").is_empty());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn list_only_returns_top_level_markdown() {
        let dir = temp_vault();
        let storage = VaultStorage::open(&dir).expect("open vault");
        storage.create_entry("one").unwrap();
        fs::write(dir.join("notes.txt"), "x").unwrap();
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("nested/two.md"), "x").unwrap();

        let names: Vec<String> = storage
            .list_entries()
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["one"]);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn create_rejects_empty_and_duplicate_names() {
        let dir = temp_vault();
        let storage = VaultStorage::open(&dir).expect("open vault");
        assert!(storage.create_entry("   ").is_err());
        assert!(storage.create_entry("a/b").is_err());
        storage.create_entry("taken").unwrap();
        let err = storage.create_entry("taken").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn parse_bib_extracts_citekeys() {
        let text = "@article{smith2020,\n  title={T}\n}\n@book {  jones1999 ,\n}\n% comment\n@misc{}\n";
        let keys: Vec<String> = parse_bib_lightweight(text)
            .into_iter()
            .map(|b| b.citekey)
            .collect();
        assert_eq!(keys, vec!["smith2020", "jones1999"]);
    }

    #[test]
    fn bib_discovery_prefers_sources_dir() {
        let dir = temp_vault();
        fs::create_dir_all(dir.join("sources")).unwrap();
        fs::create_dir_all(dir.join("deep/nested")).unwrap();
        fs::write(dir.join("deep/nested/other.bib"), "@a{x,}").unwrap();
        fs::write(dir.join("sources/main.bib"), "@a{y,}").unwrap();

        assert_eq!(find_bib_file(&dir), Some(dir.join("sources/main.bib")));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn bib_discovery_skips_apple_double_files() {
        let dir = temp_vault();
        fs::write(dir.join("._junk.bib"), "@a{x,}").unwrap();
        fs::write(dir.join("real.bib"), "@a{y,}").unwrap();

        assert_eq!(find_bib_file(&dir), Some(dir.join("real.bib")));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_bib_entries_reports_missing_file() {
        let dir = temp_vault();
        let (entries, path) = load_bib_entries(&dir);
        assert!(entries.is_empty());
        assert!(path.is_none());
        fs::remove_dir_all(&dir).unwrap();
    }
}
