//! Frontmatter parsing and the pandoc/LibreOffice export pipeline.
//!
//! Exports shell out to external converters: pandoc turns the markdown into
//! a DOCX (honoring a reference document from the vault's `refs/` directory),
//! and LibreOffice converts that DOCX to PDF when asked.

use crate::models::{Entry, ExportFormat};
use crate::storage::VaultStorage;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

const DEFAULT_SPACING: &str = "double";

fn frontmatter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\A---\n(.*?)\n---\n?").expect("valid frontmatter regex"))
}

/// Extracts flat `key: value` pairs from a leading `---` fence. Not a YAML
/// parser; nested structures are ignored, surrounding quotes are stripped.
pub fn parse_yaml_frontmatter(content: &str) -> HashMap<String, String> {
    let mut yaml = HashMap::new();
    let Some(caps) = frontmatter_re().captures(content) else {
        return yaml;
    };
    for line in caps.get(1).map(|m| m.as_str()).unwrap_or("").lines() {
        if let Some(idx) = line.find(':') {
            if idx == 0 {
                continue;
            }
            let key = line[..idx].trim();
            let mut val = line[idx + 1..].trim();
            if val.len() >= 2 {
                let first = val.chars().next();
                let last = val.chars().last();
                if first == last && (first == Some('"') || first == Some('\'')) {
                    val = &val[1..val.len() - 1];
                }
            }
            yaml.insert(key.to_string(), val.to_string());
        }
    }
    yaml
}

/// The document body with any leading frontmatter fence removed.
pub fn strip_frontmatter(content: &str) -> &str {
    match frontmatter_re().find(content) {
        Some(m) => &content[m.end()..],
        None => content,
    }
}

pub fn word_count(content: &str) -> usize {
    strip_frontmatter(content).split_whitespace().count()
}

pub fn para_count(content: &str) -> usize {
    static BLANK: OnceLock<Regex> = OnceLock::new();
    let blank = BLANK.get_or_init(|| Regex::new(r"\n\s*\n").expect("valid blank-line regex"));
    blank
        .split(strip_frontmatter(content))
        .filter(|p| !p.trim().is_empty())
        .count()
}

fn find_in_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Locates the pandoc binary: `$PATH` first, then well-known install spots.
pub fn detect_pandoc() -> Option<PathBuf> {
    find_in_path("pandoc").or_else(|| {
        [
            "/usr/local/bin/pandoc",
            "/opt/homebrew/bin/pandoc",
            "/usr/bin/pandoc",
            "/snap/bin/pandoc",
        ]
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
    })
}

/// Locates a LibreOffice binary for the DOCX → PDF step.
pub fn detect_libreoffice() -> Option<PathBuf> {
    let candidates: &[&str] = if cfg!(target_os = "macos") {
        &[
            "/Applications/LibreOffice.app/Contents/MacOS/soffice",
            "/usr/local/bin/soffice",
        ]
    } else {
        &[
            "/usr/bin/libreoffice",
            "/usr/bin/soffice",
            "/usr/local/bin/libreoffice",
            "/snap/bin/libreoffice",
        ]
    };
    candidates
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
        .or_else(|| find_in_path("libreoffice"))
        .or_else(|| find_in_path("soffice"))
}

/// Picks the pandoc reference `.docx` from `<vault>/refs/`: an explicit
/// `spacing:` frontmatter field first, then `double.docx`, then any.
pub fn resolve_reference_doc(vault_dir: &Path, yaml: &HashMap<String, String>) -> Option<PathBuf> {
    let refs_dir = vault_dir.join("refs");
    if !refs_dir.is_dir() {
        return None;
    }
    if let Some(spacing) = yaml.get("spacing") {
        let p = refs_dir.join(format!("{spacing}.docx"));
        if p.exists() {
            return Some(p);
        }
    }
    let p = refs_dir.join(format!("{DEFAULT_SPACING}.docx"));
    if p.exists() {
        return Some(p);
    }
    let mut docs: Vec<PathBuf> = fs::read_dir(&refs_dir)
        .ok()?
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "docx"))
        .collect();
    docs.sort();
    docs.into_iter().next()
}

fn scratch_dir() -> io::Result<PathBuf> {
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("vellum-export-{}-{}", std::process::id(), stamp));
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn tool_error(tool: &str, output: &std::process::Output) -> io::Error {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail: String = stderr.trim().chars().take(120).collect();
    io::Error::other(format!("{tool} failed: {detail}"))
}

/// Exports `content` as DOCX or PDF, returning the written file's path.
///
/// The editor content is written to a scratch directory rather than read from
/// disk so unsaved changes export too. The scratch directory is removed on
/// every path out.
pub fn export_entry(
    storage: &VaultStorage,
    entry: &Entry,
    content: &str,
    format: ExportFormat,
) -> io::Result<PathBuf> {
    let yaml = parse_yaml_frontmatter(content);
    let pandoc = detect_pandoc()
        .ok_or_else(|| io::Error::other("pandoc not found; install pandoc for export"))?;
    let libreoffice = match format {
        ExportFormat::Pdf => Some(
            detect_libreoffice()
                .ok_or_else(|| io::Error::other("LibreOffice not found for PDF export"))?,
        ),
        ExportFormat::Docx => None,
    };

    let safe_name = if entry.name.is_empty() { "export" } else { &entry.name };
    let tmp = scratch_dir()?;
    let result = run_export(storage, safe_name, content, &yaml, &pandoc, libreoffice, format, &tmp);
    let _ = fs::remove_dir_all(&tmp);
    result
}

#[allow(clippy::too_many_arguments)]
fn run_export(
    storage: &VaultStorage,
    safe_name: &str,
    content: &str,
    yaml: &HashMap<String, String>,
    pandoc: &Path,
    libreoffice: Option<PathBuf>,
    format: ExportFormat,
    tmp: &Path,
) -> io::Result<PathBuf> {
    let md_path = tmp.join("source.md");
    fs::write(&md_path, content)?;

    let docx_path = match format {
        ExportFormat::Docx => storage.docx_dir().join(format!("{safe_name}.docx")),
        ExportFormat::Pdf => tmp.join(format!("{safe_name}.docx")),
    };

    let mut cmd = Command::new(pandoc);
    cmd.arg(&md_path).arg("--standalone");
    if let Some(ref_doc) = resolve_reference_doc(storage.vault_dir(), yaml) {
        cmd.arg(format!("--reference-doc={}", ref_doc.display()));
    }
    if yaml.contains_key("bibliography") {
        cmd.arg("--citeproc");
    }
    cmd.arg("-o").arg(&docx_path);

    let output = cmd.output()?;
    if !output.status.success() {
        return Err(tool_error("pandoc", &output));
    }

    let Some(libreoffice) = libreoffice else {
        return Ok(docx_path);
    };

    let pdf_dir = storage.pdf_dir();
    let output = Command::new(libreoffice)
        .args(["--headless", "--convert-to", "pdf", "--outdir"])
        .arg(pdf_dir)
        .arg(&docx_path)
        .output()?;
    if !output.status.success() {
        return Err(tool_error("LibreOffice", &output));
    }
    Ok(pdf_dir.join(format!("{safe_name}.pdf")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "---\ntitle: \"My Essay\"\nspacing: single\nbibliography: sources.bib\n---\nFirst paragraph here.\n\nSecond one.\n";

    #[test]
    fn frontmatter_pairs_are_extracted_with_quotes_stripped() {
        let yaml = parse_yaml_frontmatter(DOC);
        assert_eq!(yaml.get("title").map(String::as_str), Some("My Essay"));
        assert_eq!(yaml.get("spacing").map(String::as_str), Some("single"));
        assert_eq!(
            yaml.get("bibliography").map(String::as_str),
            Some("sources.bib")
        );
    }

    #[test]
    fn missing_frontmatter_yields_empty_map() {
        assert!(parse_yaml_frontmatter("no fence here\n---\nlate: fence\n---").is_empty());
    }

    #[test]
    fn frontmatter_must_start_at_the_top() {
        let yaml = parse_yaml_frontmatter("text\n---\nkey: value\n---\n");
        assert!(yaml.is_empty());
    }

    #[test]
    fn strip_frontmatter_removes_only_the_fence() {
        assert_eq!(strip_frontmatter(DOC), "First paragraph here.\n\nSecond one.\n");
        assert_eq!(strip_frontmatter("plain body"), "plain body");
    }

    #[test]
    fn word_count_excludes_frontmatter() {
        assert_eq!(word_count(DOC), 5);
        assert_eq!(word_count("one two  three"), 3);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn para_count_splits_on_blank_lines() {
        assert_eq!(para_count(DOC), 2);
        assert_eq!(para_count("a\nb\nc"), 1);
        assert_eq!(para_count("a\n\n   \n\nb"), 2);
        assert_eq!(para_count("\n\n"), 0);
    }

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
    fn reference_doc_prefers_spacing_field_then_default() {
        let vault = temp_vault();
        let refs = vault.join("refs");
        fs::create_dir_all(&refs).unwrap();
        fs::write(refs.join("double.docx"), b"d").unwrap();
        fs::write(refs.join("single.docx"), b"s").unwrap();

        let mut yaml = HashMap::new();
        yaml.insert("spacing".to_string(), "single".to_string());
        assert_eq!(
            resolve_reference_doc(&vault, &yaml),
            Some(refs.join("single.docx"))
        );

        yaml.remove("spacing");
        assert_eq!(
            resolve_reference_doc(&vault, &yaml),
            Some(refs.join("double.docx"))
        );

        fs::remove_dir_all(&vault).unwrap();
    }

    #[test]
    fn reference_doc_falls_back_to_any_docx() {
        let vault = temp_vault();
        let refs = vault.join("refs");
        fs::create_dir_all(&refs).unwrap();
        fs::write(refs.join("apa.docx"), b"a").unwrap();

        assert_eq!(
            resolve_reference_doc(&vault, &HashMap::new()),
            Some(refs.join("apa.docx"))
        );

        fs::remove_dir_all(&vault).unwrap();
    }

    #[test]
    fn reference_doc_requires_a_refs_dir() {
        let vault = temp_vault();
        assert_eq!(resolve_reference_doc(&vault, &HashMap::new()), None);
        fs::remove_dir_all(&vault).unwrap();
    }
}
