use chrono::{DateTime, Local};
use std::path::PathBuf;

/// A markdown file in the vault.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Full path to the `.md` file.
    pub path: PathBuf,
    /// Filename without the `.md` extension.
    pub name: String,
    pub modified: DateTime<Local>,
}

/// Minimal `.bib` entry for search and insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibEntry {
    pub citekey: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Browser,
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Navigate,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Docx,
    Pdf,
}

impl ExportFormat {
    pub fn all() -> Vec<ExportFormat> {
        vec![ExportFormat::Docx, ExportFormat::Pdf]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Docx => "Word document (.docx)",
            ExportFormat::Pdf => "PDF (via LibreOffice)",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Docx => "docx",
            ExportFormat::Pdf => "pdf",
        }
    }
}
