//! Shared plumbing for the `qadesk` and `qadesk-indexer` binaries.

use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use qadesk_core::config::{resolve_with_base, Settings};
use qadesk_core::data_processor::DirectorySource;
use qadesk_core::traits::DocumentSource;
use qadesk_core::types::{Document, DocumentChunk};
use qadesk_text::{Chunker, VocabularyBuilder};
use qadesk_vector::{corpus_fingerprint, load_or_empty, persist, LiveIndex};

/// `RUST_LOG`-driven subscriber, `info` by default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}

/// Configured paths, resolved against the working directory.
pub struct DataPaths {
    pub docs_dir: PathBuf,
    pub index_path: PathBuf,
    pub escalation_log: PathBuf,
}

impl DataPaths {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base = std::env::current_dir()?;
        Ok(Self::resolve(&base, settings))
    }

    pub fn resolve(base: &Path, settings: &Settings) -> Self {
        Self {
            docs_dir: resolve_with_base(base, &settings.data.docs_dir),
            index_path: resolve_with_base(base, &settings.data.index_path),
            escalation_log: resolve_with_base(base, &settings.data.escalation_log),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexRun {
    pub generation: u64,
    pub documents: usize,
    pub chunks: usize,
    pub fingerprint: String,
    /// The persisted generation already matched the corpus; nothing written.
    pub skipped: bool,
}

/// Load, chunk, build and persist. Skips the build when the persisted index
/// was made from the same chunks with the same tokenizer, unless `force`.
pub fn rebuild_index(settings: &Settings, docs_dir: &Path, index_path: &Path, force: bool) -> Result<IndexRun> {
    if !docs_dir.is_dir() {
        bail!("documents directory {} does not exist", docs_dir.display());
    }
    let documents = DirectorySource::new(docs_dir, settings.data.default_language.clone()).documents()?;
    let chunker = Chunker::new(settings.chunking);
    let chunks = chunk_with_progress(&documents, &chunker);
    let fingerprint = corpus_fingerprint(&chunks);
    let builder = VocabularyBuilder::new(settings.vocabulary);

    let previous = load_or_empty(index_path);
    let unchanged = !previous.is_empty() && previous.fingerprint() == fingerprint && previous.tokenizer() == builder.tokenizer();
    if unchanged && !force {
        info!(generation = previous.generation(), "corpus unchanged, keeping persisted index");
        return Ok(IndexRun {
            generation: previous.generation(),
            documents: documents.len(),
            chunks: chunks.len(),
            fingerprint,
            skipped: true,
        });
    }

    let live = LiveIndex::new(previous);
    let chunk_count = chunks.len();
    let index = live.rebuild(chunks, &builder);
    persist(&index, index_path)?;

    Ok(IndexRun {
        generation: index.generation(),
        documents: documents.len(),
        chunks: chunk_count,
        fingerprint,
        skipped: false,
    })
}

fn chunk_with_progress(documents: &[Document], chunker: &Chunker) -> Vec<DocumentChunk> {
    let pb = ProgressBar::new(documents.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents {msg}") {
        pb.set_style(style.progress_chars("#>-"));
    }
    let mut chunks = Vec::new();
    for doc in documents {
        pb.set_message(doc.id.clone());
        chunks.extend(chunker.chunk_document(doc));
        pb.inc(1);
    }
    pb.finish_and_clear();
    chunks
}
