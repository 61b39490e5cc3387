//! Filesystem document source.
//!
//! Walks a directory for `.txt` / `.md` files and turns each into a
//! [`Document`]. Files are visited in sorted order so that repeated loads of an
//! unchanged tree produce identical document lists.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::traits::DocumentSource;
use crate::types::Document;

const TITLE_MAX_CHARS: usize = 120;

pub struct DirectorySource {
    root: PathBuf,
    default_language: String,
    limit: Option<usize>,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>, default_language: impl Into<String>) -> Self {
        Self { root: root.into(), default_language: default_language.into(), limit: None }
    }

    /// Only read the first `limit` files (in sorted order).
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn load_directory(&self) -> Result<Vec<Document>> {
        let mut files = self.list_text_files(&self.root);
        if files.is_empty() {
            info!(root = %self.root.display(), "no .txt or .md files found");
            return Ok(vec![]);
        }
        if let Some(limit) = self.limit {
            if files.len() > limit {
                files.truncate(limit);
                info!(limit, "limited document load");
            }
        }
        let mut documents = Vec::with_capacity(files.len());
        for file_path in &files {
            debug!(path = %file_path.display(), "reading document");
            let content = self.read_file_content(file_path)?;
            let id = self.extract_doc_id(file_path);
            let title = extract_title(&content).unwrap_or_else(|| id.clone());
            documents.push(Document { id, title, content, language: self.default_language.clone() });
        }
        info!(files = documents.len(), root = %self.root.display(), "loaded documents");
        Ok(documents)
    }

    fn read_file_content(&self, file_path: &Path) -> Result<String> {
        match fs::read_to_string(file_path) {
            Ok(content) => Ok(content),
            Err(_) => Ok(String::from_utf8_lossy(&fs::read(file_path)?).to_string()),
        }
    }

    /// Relative path including the extension, `/`-separated on every
    /// platform. `notes.txt` and `notes.md` stay distinct.
    fn extract_doc_id(&self, file_path: &Path) -> String {
        let relative = file_path.strip_prefix(&self.root).unwrap_or(file_path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn list_text_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut text_files = Vec::new();
        for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
            let path = entry.path();
            if matches!(path.extension().and_then(|s| s.to_str()), Some("txt") | Some("md")) {
                text_files.push(path.to_path_buf());
            }
        }
        text_files.sort();
        text_files
    }
}

impl DocumentSource for DirectorySource {
    fn documents(&self) -> Result<Vec<Document>> {
        self.load_directory()
    }
}

/// First non-empty line, stripped of markdown heading markers.
fn extract_title(content: &str) -> Option<String> {
    let line = content.lines().map(str::trim).find(|l| !l.is_empty())?;
    let line = line.trim_start_matches('#').trim();
    if line.is_empty() {
        return None;
    }
    Some(line.chars().take(TITLE_MAX_CHARS).collect())
}
