//! Versioned JSON index file.
//!
//! Writes go to a temp file in the target directory which is then renamed over
//! the destination, so readers see either the old file or the new one. Any
//! problem while loading (missing file, unknown version, corrupt JSON, vector
//! length not matching the vocabulary) degrades to an empty index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use qadesk_core::error::{Error, Result};
use qadesk_core::types::DocumentChunk;
use qadesk_text::{IdfTable, Tokenizer, Vocabulary};

use crate::index_build::Index;

pub const INDEX_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexFile {
    version: u32,
    generation_id: u64,
    built_at: Option<DateTime<Utc>>,
    fingerprint: String,
    tokenizer: Tokenizer,
    vocabulary: BTreeMap<String, usize>,
    idf: BTreeMap<String, f64>,
    entries: Vec<StoredEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    chunk_id: String,
    doc_id: String,
    title: String,
    chunk_index: usize,
    total_chunks: usize,
    vector: Vec<f32>,
    text: String,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

impl IndexFile {
    fn from_index(index: &Index) -> Self {
        let entries = index
            .chunks()
            .iter()
            .zip(index.entries())
            .map(|(chunk, entry)| StoredEntry {
                chunk_id: chunk.id.clone(),
                doc_id: chunk.doc_id.clone(),
                title: chunk.title.clone(),
                chunk_index: chunk.chunk_index,
                total_chunks: chunk.total_chunks,
                vector: entry.vector.clone(),
                text: chunk.content.clone(),
            })
            .collect();
        Self {
            version: INDEX_FORMAT_VERSION,
            generation_id: index.generation(),
            built_at: index.built_at(),
            fingerprint: index.fingerprint().to_string(),
            tokenizer: index.tokenizer(),
            vocabulary: index.vocabulary().iter().map(|(t, i)| (t.to_string(), i)).collect(),
            idf: index.idf().iter().map(|(t, w)| (t.to_string(), w)).collect(),
            entries,
        }
    }

    fn into_index(self) -> Result<Index> {
        let vocabulary = Vocabulary::from_map(self.vocabulary)?;
        let idf = IdfTable::from_map(self.idf)?;
        let (chunks, vectors): (Vec<DocumentChunk>, Vec<Vec<f32>>) = self
            .entries
            .into_iter()
            .map(|e| {
                let chunk = DocumentChunk {
                    id: e.chunk_id,
                    doc_id: e.doc_id,
                    title: e.title,
                    word_count: e.text.split_whitespace().count(),
                    content: e.text,
                    chunk_index: e.chunk_index,
                    total_chunks: e.total_chunks,
                };
                (chunk, e.vector)
            })
            .unzip();
        Index::from_parts(self.generation_id, self.built_at, self.fingerprint, self.tokenizer, vocabulary, idf, chunks, vectors)
    }
}

/// Atomically write `index` to `path`, creating parent directories.
pub fn persist(index: &Index, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer(&mut writer, &IndexFile::from_index(index))?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;

    info!(path = %path.display(), generation = index.generation(), chunks = index.len(), "persisted index");
    Ok(())
}

/// Read and validate an index file.
pub fn load(path: &Path) -> Result<Index> {
    if !path.exists() {
        return Err(Error::NotFound(format!("index file {}", path.display())));
    }
    let bytes = fs::read(path)?;
    let probe: VersionProbe = serde_json::from_slice(&bytes)?;
    if probe.version != INDEX_FORMAT_VERSION {
        return Err(Error::UnsupportedVersion { found: probe.version, expected: INDEX_FORMAT_VERSION });
    }
    let file: IndexFile = serde_json::from_slice(&bytes)?;
    let index = file.into_index()?;
    info!(path = %path.display(), generation = index.generation(), chunks = index.len(), "loaded index");
    Ok(index)
}

/// Like [`load`], but any failure yields [`Index::empty`]. A missing file is
/// expected on first start and only logged at info level.
pub fn load_or_empty(path: &Path) -> Index {
    match load(path) {
        Ok(index) => index,
        Err(Error::NotFound(what)) => {
            info!("no persisted index ({}), starting empty", what);
            Index::empty()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unusable index file, starting empty");
            Index::empty()
        }
    }
}
